//! Configuration for Quill.
//!
//! Currently this is only the type-check mode resolver and its file
//! exclusion patterns.

pub mod glob;
pub mod type_config;

pub use glob::ExcludePattern;
pub use type_config::{ConfigError, ModeSource, TypeCheckMode, TypeConfig};
