//! Glob patterns for excluding files from type checking.
//!
//! Patterns follow shell `fnmatch` rules: `*` (and `**`) match any run of
//! characters including `/`, `?` matches one character, `[...]` is a
//! character class and `[!...]` its negation. Patterns are translated to an
//! anchored regex once, when the configuration is built.

use regex::Regex;

#[derive(Debug, Clone)]
pub struct ExcludePattern {
    raw: String,
    regex: Option<Regex>,
}

impl ExcludePattern {
    pub fn new(pattern: &str) -> Self {
        let regex = match Regex::new(&glob_to_regex(pattern)) {
            Ok(regex) => Some(regex),
            Err(e) => {
                log::debug!("ignoring invalid exclude pattern '{}': {}", pattern, e);
                None
            }
        };
        Self {
            raw: pattern.to_string(),
            regex,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// An invalid pattern never matches.
    pub fn matches(&self, candidate: &str) -> bool {
        self.regex
            .as_ref()
            .map(|r| r.is_match(candidate))
            .unwrap_or(false)
    }
}

impl PartialEq for ExcludePattern {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

fn glob_to_regex(pattern: &str) -> String {
    let mut out = String::from("^");
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => {
                while chars.peek() == Some(&'*') {
                    chars.next();
                }
                out.push_str(".*");
            }
            '?' => out.push('.'),
            '[' => {
                let mut members = Vec::new();
                let mut literal = String::from("[");
                let mut negated = false;
                let mut closed = false;
                if chars.peek() == Some(&'!') {
                    chars.next();
                    negated = true;
                    literal.push('!');
                }
                for inner in chars.by_ref() {
                    if inner == ']' && !members.is_empty() {
                        closed = true;
                        break;
                    }
                    literal.push(inner);
                    members.push(inner);
                }
                if closed {
                    out.push('[');
                    if negated {
                        out.push('^');
                    }
                    out.push_str(&class_body(&members));
                    out.push(']');
                } else {
                    // Unterminated class: match the text literally.
                    out.push_str(&regex::escape(&literal));
                }
            }
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }
    out.push('$');
    out
}

// Only `!` negates an fnmatch class, and only `a-z` forms a range. Anything
// the regex crate would read as class syntax (`^`, nesting, `&&`, `--`,
// `~~`) is escaped.
fn class_body(members: &[char]) -> String {
    let mut body = String::new();
    for (i, &c) in members.iter().enumerate() {
        let is_range = c == '-'
            && i > 0
            && i + 1 < members.len()
            && members[i - 1] != '-'
            && members[i + 1] != '-';
        match c {
            '-' if is_range => body.push('-'),
            '\\' | '[' | ']' | '^' | '&' | '~' | '-' => {
                body.push('\\');
                body.push(c);
            }
            _ => body.push(c),
        }
    }
    body
}
