//! Type vocabulary for Quill's gradual checking.
//!
//! This module only describes types; enforcement lives in
//! [`crate::runtime::type_checker`]. There is no inference: schemes can be
//! generalized but not instantiated.

pub mod annotation;
pub mod env;
pub mod error;
pub mod ty;

pub use annotation::{builtin_type_name, resolve_annotation};
pub use env::TypeEnvironment;
pub use error::TypeError;
pub use ty::{Substitution, Type, TypeScheme};
