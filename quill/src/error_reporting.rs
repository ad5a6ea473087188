// Source locations and snippet rendering for Quill diagnostics

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in the source text, 1-based, as reported by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Formats an optional location as a ` at line:col` suffix, or nothing.
pub fn location_suffix(location: &Option<SourceLocation>) -> String {
    match location {
        Some(loc) => format!(" at {}", loc),
        None => String::new(),
    }
}

/// Renders the offending source line with a caret under the reported column.
///
/// Returns `None` when the location points outside of `source`.
pub fn render_snippet(source: &str, location: &SourceLocation) -> Option<String> {
    let line_text = source.lines().nth(location.line.checked_sub(1)?)?;
    let gutter = location.line.to_string();
    let padding = " ".repeat(gutter.len());
    let caret_offset = " ".repeat(location.column.saturating_sub(1));
    Some(format!(
        "{padding} |\n{gutter} | {line_text}\n{padding} | {caret_offset}^"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_suffix() {
        assert_eq!(location_suffix(&None), "");
        assert_eq!(
            location_suffix(&Some(SourceLocation::new(3, 7))),
            " at 3:7"
        );
    }

    #[test]
    fn test_render_snippet_points_at_column() {
        let source = "let x = 1\nprint(y)\n";
        let snippet = render_snippet(source, &SourceLocation::new(2, 7)).unwrap();
        assert_eq!(snippet, "  |\n2 | print(y)\n  |       ^");
    }

    #[test]
    fn test_render_snippet_out_of_range() {
        assert!(render_snippet("x", &SourceLocation::new(5, 1)).is_none());
        assert!(render_snippet("x", &SourceLocation::new(0, 1)).is_none());
    }
}
