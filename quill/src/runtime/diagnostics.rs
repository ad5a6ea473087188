//! Reporting channel for type mismatches found in warn mode.

use crate::error_reporting::{location_suffix, SourceLocation};
use std::cell::RefCell;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticSite {
    Argument { parameter: String },
    Return,
}

/// One declared-vs-actual mismatch that did not stop execution.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDiagnostic {
    pub function: String,
    pub site: DiagnosticSite,
    pub expected: String,
    pub actual: String,
    pub path: String,
    pub location: Option<SourceLocation>,
    pub file: Option<PathBuf>,
}

impl fmt::Display for TypeDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{}: ", file.display())?;
        }
        match &self.site {
            DiagnosticSite::Argument { parameter } => write!(
                f,
                "type warning in {}: parameter '{}' expects {}, got {}",
                self.function, parameter, self.expected, self.actual
            )?,
            DiagnosticSite::Return => write!(
                f,
                "type warning in {}: return expects {}, got {}",
                self.function, self.expected, self.actual
            )?,
        }
        if !self.path.is_empty() {
            write!(f, " (at {})", self.path)?;
        }
        write!(f, "{}", location_suffix(&self.location))
    }
}

pub trait DiagnosticReporter {
    fn report(&mut self, diagnostic: TypeDiagnostic);
}

/// Sends diagnostics to the `log` facade at warn level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl DiagnosticReporter for LogReporter {
    fn report(&mut self, diagnostic: TypeDiagnostic) {
        log::warn!("{}", diagnostic);
    }
}

/// Keeps every diagnostic; clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct CollectingReporter {
    diagnostics: Rc<RefCell<Vec<TypeDiagnostic>>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> Vec<TypeDiagnostic> {
        self.diagnostics.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.borrow().is_empty()
    }
}

impl DiagnosticReporter for CollectingReporter {
    fn report(&mut self, diagnostic: TypeDiagnostic) {
        self.diagnostics.borrow_mut().push(diagnostic);
    }
}
