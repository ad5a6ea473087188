//! Runtime type checking at function-call boundaries.
//!
//! The evaluator asks [`Enforcement::from_config`] once per call. When it
//! yields `None`, nothing in this module runs. Otherwise each bound argument
//! and the produced value are validated against the resolved annotations:
//! under `Abort` the first mismatch becomes a [`RuntimeError`], under
//! `Report` it becomes a [`TypeDiagnostic`] and the call carries on.

use crate::config::TypeConfig;
use crate::error_reporting::SourceLocation;
use crate::runtime::diagnostics::{DiagnosticReporter, DiagnosticSite, TypeDiagnostic};
use crate::runtime::error::{RuntimeError, RuntimeResult};
use crate::runtime::param_binding::BoundParams;
use crate::runtime::values::{Function, Value};
use crate::type_checking::ty::{ANY, BOOL, FLOAT, INT, STR, UNIT};
use crate::type_checking::{resolve_annotation, Type, TypeEnvironment};
use std::fmt;

/// Validation error types
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    TypeMismatch {
        expected: Type,
        actual: String,
        path: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::TypeMismatch {
                expected,
                actual,
                path,
            } => {
                if path.is_empty() {
                    write!(f, "Type mismatch: expected {}, got {}", expected, actual)
                } else {
                    write!(
                        f,
                        "Type mismatch at {}: expected {}, got {}",
                        path, expected, actual
                    )
                }
            }
        }
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// What a mismatch does when checking is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enforcement {
    /// Raise an argument/return type failure.
    Abort,
    /// Report a diagnostic and keep going with the actual value.
    Report,
}

impl Enforcement {
    /// `None` when checking is off or the current file is excluded.
    pub fn from_config(config: &TypeConfig) -> Option<Self> {
        if !config.should_check_types() {
            None
        } else if config.should_exit_with_error() {
            Some(Enforcement::Abort)
        } else {
            Some(Enforcement::Report)
        }
    }
}

/// Everything a single checked call needs besides the values themselves.
pub struct CheckContext<'a> {
    pub enforcement: Enforcement,
    pub types: &'a TypeEnvironment,
    pub reporter: &'a mut dyn DiagnosticReporter,
    pub location: Option<SourceLocation>,
    pub file: Option<&'a std::path::Path>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RuntimeTypeChecker;

impl RuntimeTypeChecker {
    pub fn new() -> Self {
        RuntimeTypeChecker
    }

    /// Validates every annotated parameter of `function` against its bound
    /// value.
    pub fn check_arguments(
        &self,
        function: &Function,
        bound: &BoundParams,
        ctx: &mut CheckContext<'_>,
    ) -> RuntimeResult<()> {
        for (param, (_, value)) in function.params.iter().zip(bound.iter()) {
            let Some(annotation) = &param.annotation else {
                continue;
            };
            let expected = resolve_annotation(annotation, ctx.types);
            if let Err(ValidationError::TypeMismatch {
                expected,
                actual,
                path,
            }) = self.validate_value_at_path(value, &expected, &param.name)
            {
                match ctx.enforcement {
                    Enforcement::Abort => {
                        return Err(RuntimeError::ArgumentType {
                            function: function.name.clone(),
                            parameter: param.name.clone(),
                            expected: expected.to_string(),
                            actual,
                            path: nested_path(&path, &param.name),
                            location: ctx.location,
                        })
                    }
                    Enforcement::Report => ctx.reporter.report(TypeDiagnostic {
                        function: function.name.clone(),
                        site: DiagnosticSite::Argument {
                            parameter: param.name.clone(),
                        },
                        expected: expected.to_string(),
                        actual,
                        path: nested_path(&path, &param.name),
                        location: ctx.location,
                        file: ctx.file.map(|p| p.to_path_buf()),
                    }),
                }
            }
        }
        Ok(())
    }

    /// Validates the value a call produced against the declared return type.
    pub fn check_return(
        &self,
        function: &Function,
        value: &Value,
        ctx: &mut CheckContext<'_>,
    ) -> RuntimeResult<()> {
        let Some(annotation) = &function.return_type else {
            return Ok(());
        };
        let expected = resolve_annotation(annotation, ctx.types);
        if let Err(ValidationError::TypeMismatch {
            expected,
            actual,
            path,
        }) = self.validate_value(value, &expected)
        {
            match ctx.enforcement {
                Enforcement::Abort => {
                    return Err(RuntimeError::ReturnType {
                        function: function.name.clone(),
                        expected: expected.to_string(),
                        actual,
                        path,
                        location: ctx.location,
                    })
                }
                Enforcement::Report => ctx.reporter.report(TypeDiagnostic {
                    function: function.name.clone(),
                    site: DiagnosticSite::Return,
                    expected: expected.to_string(),
                    actual,
                    path,
                    location: ctx.location,
                    file: ctx.file.map(|p| p.to_path_buf()),
                }),
            }
        }
        Ok(())
    }

    /// Main validation entry point
    pub fn validate_value(&self, value: &Value, ty: &Type) -> ValidationResult<()> {
        self.validate_value_at_path(value, ty, "")
    }

    /// Validate value with path tracking for better error messages
    pub fn validate_value_at_path(
        &self,
        value: &Value,
        ty: &Type,
        path: &str,
    ) -> ValidationResult<()> {
        let mismatch = |actual: String| ValidationError::TypeMismatch {
            expected: ty.clone(),
            actual,
            path: path.to_string(),
        };

        match (value, ty) {
            (_, Type::Primitive(name)) => match (value, name.as_str()) {
                (Value::Integer(_), INT)
                | (Value::Float(_), FLOAT)
                | (Value::String(_), STR)
                | (Value::Boolean(_), BOOL)
                | (Value::Unit, UNIT)
                | (_, ANY) => Ok(()),
                // Built-in name, wrong kind.
                (_, INT | FLOAT | STR | BOOL | UNIT) => {
                    Err(mismatch(value.type_name().to_string()))
                }
                // Unknown names are accepted as-is.
                _ => Ok(()),
            },

            // No inference: variables accept anything.
            (_, Type::Variable(_)) => Ok(()),

            (Value::Tuple(items), Type::Tuple(types)) => {
                if items.len() != types.len() {
                    return Err(mismatch(format!("tuple of length {}", items.len())));
                }
                for (i, (item, expected)) in items.iter().zip(types.iter()).enumerate() {
                    self.validate_value_at_path(item, expected, &format!("{}[{}]", path, i))?;
                }
                Ok(())
            }
            (_, Type::Tuple(_)) => Err(mismatch(value.type_name().to_string())),

            (Value::Record(fields), Type::Record(expected_fields)) => {
                for (name, expected) in expected_fields {
                    let field_path = if path.is_empty() {
                        name.clone()
                    } else {
                        format!("{}.{}", path, name)
                    };
                    match fields.get(name) {
                        Some(field) => self.validate_value_at_path(field, expected, &field_path)?,
                        None => {
                            return Err(ValidationError::TypeMismatch {
                                expected: expected.clone(),
                                actual: "missing field".to_string(),
                                path: field_path,
                            })
                        }
                    }
                }
                Ok(())
            }
            (_, Type::Record(_)) => Err(mismatch(value.type_name().to_string())),

            (Value::List(items), Type::Generic { name, args })
                if name == "list" && args.len() == 1 =>
            {
                for (i, item) in items.iter().enumerate() {
                    self.validate_value_at_path(item, &args[0], &format!("{}[{}]", path, i))?;
                }
                Ok(())
            }
            (_, Type::Generic { name, .. })
                if name == "list" && !matches!(value, Value::List(_)) =>
            {
                Err(mismatch(value.type_name().to_string()))
            }
            // Other generic constructors are not checked.
            (_, Type::Generic { .. }) => Ok(()),

            (_, Type::Function { params, .. }) => match value.arity() {
                Some(arity) if arity.accepts(params.len()) => Ok(()),
                Some(arity) => Err(mismatch(format!("function of arity {}", arity))),
                None => Err(mismatch(value.type_name().to_string())),
            },
        }
    }
}

fn nested_path(path: &str, param: &str) -> String {
    if path == param {
        String::new()
    } else {
        path.to_string()
    }
}
