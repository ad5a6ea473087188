// Error handling for the Quill runtime

use crate::error_reporting::{location_suffix, SourceLocation};
use thiserror::Error;

pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Runtime errors that can occur during Quill execution
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// Name failure: a variable that no scope holds.
    #[error("Undefined symbol: {name}{}", location_suffix(.location))]
    UndefinedSymbol {
        name: String,
        location: Option<SourceLocation>,
    },

    /// Arity failure: argument count outside what the callee accepts.
    #[error("Arity mismatch in {function}: expected {expected}, got {actual}{}", location_suffix(.location))]
    ArityMismatch {
        function: String,
        expected: String,
        actual: usize,
        location: Option<SourceLocation>,
    },

    /// A bound argument does not match its parameter's declared type.
    #[error(
        "Argument type mismatch in {function}: parameter '{parameter}' expects {expected}, got {actual}{}{}",
        path_suffix(.path),
        location_suffix(.location)
    )]
    ArgumentType {
        function: String,
        parameter: String,
        expected: String,
        actual: String,
        path: String,
        location: Option<SourceLocation>,
    },

    /// A function produced a value that does not match its declared
    /// return type.
    #[error(
        "Return type mismatch in {function}: expected {expected}, got {actual}{}{}",
        path_suffix(.path),
        location_suffix(.location)
    )]
    ReturnType {
        function: String,
        expected: String,
        actual: String,
        path: String,
        location: Option<SourceLocation>,
    },

    /// Operator applied to values it does not support.
    #[error("Type error in {operation}: expected {expected}, got {actual}")]
    TypeError {
        expected: String,
        actual: String,
        operation: String,
    },

    #[error("Not callable: {name} is a {kind}{}", location_suffix(.location))]
    NotCallable {
        name: String,
        kind: String,
        location: Option<SourceLocation>,
    },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Index out of bounds: index {index} is not in range [0, {length})")]
    IndexOutOfBounds { index: i64, length: usize },

    #[error("Unknown field '{field}'{}", location_suffix(.location))]
    UnknownField {
        field: String,
        location: Option<SourceLocation>,
    },

    /// `break` or `continue` with no enclosing loop in the current body.
    #[error("'{0}' outside of a loop")]
    BreakOutsideLoop(String),

    #[error("Stack overflow: call depth exceeded {0}")]
    StackOverflow(usize),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Runtime error: {0}")]
    Generic(String),
}

impl RuntimeError {
    pub fn new(message: &str) -> RuntimeError {
        RuntimeError::Generic(message.to_string())
    }

    /// Whether this is one of the declared-vs-actual type failures.
    pub fn is_type_mismatch(&self) -> bool {
        matches!(
            self,
            RuntimeError::ArgumentType { .. } | RuntimeError::ReturnType { .. }
        )
    }

    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            RuntimeError::UndefinedSymbol { location, .. }
            | RuntimeError::ArityMismatch { location, .. }
            | RuntimeError::ArgumentType { location, .. }
            | RuntimeError::ReturnType { location, .. }
            | RuntimeError::NotCallable { location, .. }
            | RuntimeError::UnknownField { location, .. } => location.as_ref(),
            _ => None,
        }
    }
}

fn path_suffix(path: &str) -> String {
    if path.is_empty() {
        String::new()
    } else {
        format!(" (at {})", path)
    }
}

impl From<std::io::Error> for RuntimeError {
    fn from(e: std::io::Error) -> Self {
        RuntimeError::IoError(e.to_string())
    }
}
