// Quill Interpreter Library
// Main library crate for the Quill scripting language
pub mod ast;
pub mod config;
pub mod error_reporting;
pub mod parser;
pub mod runtime;
pub mod type_checking;

// Re-export the main parsing function and the AST.
pub use ast::*;
pub use config::{TypeCheckMode, TypeConfig};
pub use parser::{parse, parse_type_annotation, ParseError};
pub use runtime::evaluator::Evaluator;
pub use runtime::{QuillError, Runtime, RuntimeError, Value};
