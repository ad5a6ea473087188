//! Quill Standard Library
//!
//! Built-in functions live in the global scope next to user definitions and
//! can be shadowed by them. Calling a builtin never pushes a scope and never
//! goes through runtime type checking.

use crate::runtime::environment::Environment;
use crate::runtime::error::{RuntimeError, RuntimeResult};
use crate::runtime::values::{Arity, BuiltinFunction, Value};
use itertools::Itertools;
use std::io::Write;

pub struct StandardLibrary;

impl StandardLibrary {
    /// Creates a new global environment holding every builtin.
    pub fn create_global_environment() -> Environment {
        let mut env = Environment::new();
        Self::load_builtins(&mut env);
        env
    }

    pub fn load_builtins(env: &mut Environment) {
        for builtin in Self::builtins() {
            env.define_global(builtin.name, Value::Builtin(builtin));
        }
    }

    pub fn builtins() -> Vec<BuiltinFunction> {
        vec![
            BuiltinFunction {
                name: "print",
                arity: Arity::Any,
                func: Self::print,
            },
            BuiltinFunction {
                name: "len",
                arity: Arity::Exact(1),
                func: Self::len,
            },
            BuiltinFunction {
                name: "str",
                arity: Arity::Exact(1),
                func: Self::str,
            },
            BuiltinFunction {
                name: "type_of",
                arity: Arity::Exact(1),
                func: Self::type_of,
            },
        ]
    }

    // `print(a, b, ...)` - writes the arguments separated by spaces, then a newline
    fn print(args: &[Value], out: &mut dyn Write) -> RuntimeResult<Value> {
        writeln!(out, "{}", args.iter().join(" "))?;
        Ok(Value::Unit)
    }

    // `len(x)` - element count of a list, tuple or record; character count of a string
    fn len(args: &[Value], _out: &mut dyn Write) -> RuntimeResult<Value> {
        let n = match &args[0] {
            Value::String(s) => s.chars().count(),
            Value::List(items) | Value::Tuple(items) => items.len(),
            Value::Record(fields) => fields.len(),
            other => {
                return Err(RuntimeError::TypeError {
                    expected: "str, list, tuple or record".to_string(),
                    actual: other.type_name().to_string(),
                    operation: "len".to_string(),
                })
            }
        };
        Ok(Value::Integer(n as i64))
    }

    fn str(args: &[Value], _out: &mut dyn Write) -> RuntimeResult<Value> {
        Ok(Value::String(args[0].to_string()))
    }

    fn type_of(args: &[Value], _out: &mut dyn Write) -> RuntimeResult<Value> {
        Ok(Value::String(args[0].type_name().to_string()))
    }
}
