use thiserror::Error;

/// Failures raised by the type layer itself, independent of any program.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TypeError {
    /// Parts of the inference machinery that are deliberately absent.
    #[error("not implemented: {0}")]
    NotImplemented(String),
}
