//! Quill Runtime System
//!
//! High-level entry points and small helpers. The heavy logic is
//! implemented in the submodules listed below.

pub mod diagnostics;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod execution_outcome;
pub mod param_binding;
pub mod stdlib;
pub mod type_checker;
pub mod values;

pub use diagnostics::{
    CollectingReporter, DiagnosticReporter, DiagnosticSite, LogReporter, TypeDiagnostic,
};
pub use environment::Environment;
pub use error::{RuntimeError, RuntimeResult};
pub use evaluator::Evaluator;
pub use execution_outcome::Flow;
pub use type_checker::{Enforcement, RuntimeTypeChecker, ValidationError, ValidationResult};
pub use values::{Arity, Function, Value};

use crate::parser::{self, ParseError};
use thiserror::Error;

/// Failure of a whole source-to-value run.
#[derive(Debug, Error)]
pub enum QuillError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

/// Parses and runs source text on one long-lived evaluator.
///
/// Bindings persist between calls to [`Runtime::evaluate`], so a later
/// snippet sees the functions an earlier one defined.
pub struct Runtime {
    evaluator: Evaluator,
}

impl Runtime {
    pub fn new(evaluator: Evaluator) -> Self {
        Self { evaluator }
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    pub fn evaluator_mut(&mut self) -> &mut Evaluator {
        &mut self.evaluator
    }

    pub fn evaluate(&mut self, input: &str) -> Result<Value, QuillError> {
        let program = parser::parse(input)?;
        Ok(self.evaluator.execute(&program)?)
    }
}
