// Runtime value system for Quill
// Represents values during execution (different from AST which represents parsed code)

use crate::ast::{ParamList, Statement, TypeAnnotation};
use crate::runtime::error::RuntimeResult;
use indexmap::IndexMap;
use itertools::Itertools;
use std::fmt;
use std::io::Write;
use std::rc::Rc;

#[derive(Debug, Clone)]
pub enum Value {
    Unit,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    Record(IndexMap<String, Value>),
    Function(Rc<Function>),
    Builtin(BuiltinFunction),
}

impl Value {
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Boolean(b) => *b,
            Value::Unit => false,
            Value::Integer(n) => *n != 0,
            _ => true,
        }
    }

    /// The runtime kind, as named in type diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Unit => "unit",
            Value::Boolean(_) => "bool",
            Value::Integer(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "str",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Record(_) => "record",
            Value::Function(_) | Value::Builtin(_) => "function",
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_) | Value::Builtin(_))
    }

    /// Arity of a callable value; `None` for anything else.
    pub fn arity(&self) -> Option<Arity> {
        match self {
            Value::Function(f) => Some(f.arity()),
            Value::Builtin(b) => Some(b.arity.clone()),
            _ => None,
        }
    }

    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{:?}", s),
            other => write!(f, "{}", other),
        }
    }
}

struct Nested<'a>(&'a Value);

impl fmt::Display for Nested<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt_nested(f)
    }
}

/// Strings print bare at the top level and quoted inside collections.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "()"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(fl) => {
                if fl.fract() == 0.0 && fl.is_finite() {
                    write!(f, "{:.1}", fl)
                } else {
                    write!(f, "{}", fl)
                }
            }
            Value::String(s) => write!(f, "{}", s),
            Value::List(items) => write!(f, "[{}]", items.iter().map(Nested).join(", ")),
            Value::Tuple(items) if items.len() == 1 => write!(f, "({},)", Nested(&items[0])),
            Value::Tuple(items) => write!(f, "({})", items.iter().map(Nested).join(", ")),
            Value::Record(fields) => write!(
                f,
                "{{{}}}",
                fields
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k, Nested(v)))
                    .join(", ")
            ),
            Value::Function(func) => write!(f, "<function {}>", func.name),
            Value::Builtin(b) => write!(f, "<builtin {}>", b.name),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Unit, Value::Unit) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Integer(a), Value::Float(b)) | (Value::Float(b), Value::Integer(a)) => {
                (*a as f64) == *b
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => a.name == b.name,
            _ => false,
        }
    }
}

/// How many arguments a callable accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    Range(usize, usize),
    Any,
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => count == *n,
            Arity::Range(min, max) => count >= *min && count <= *max,
            Arity::Any => true,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{}", n),
            Arity::Range(min, max) => write!(f, "{}-{}", min, max),
            Arity::Any => write!(f, "any number"),
        }
    }
}

/// A user-defined function. Immutable once created.
#[derive(Debug)]
pub struct Function {
    pub name: String,
    pub params: ParamList,
    pub return_type: Option<TypeAnnotation>,
    pub body: Rc<[Statement]>,
}

impl Function {
    pub fn new(
        name: &str,
        params: ParamList,
        return_type: Option<TypeAnnotation>,
        body: Vec<Statement>,
    ) -> Self {
        Function {
            name: name.to_string(),
            params,
            return_type,
            body: Rc::from(body),
        }
    }

    pub fn arity(&self) -> Arity {
        let required = self.params.required_count();
        let declared = self.params.len();
        if required == declared {
            Arity::Exact(declared)
        } else {
            Arity::Range(required, declared)
        }
    }

    /// Whether any parameter or the return carries an annotation.
    pub fn is_annotated(&self) -> bool {
        self.return_type.is_some() || self.params.iter().any(|p| p.annotation.is_some())
    }
}

pub type BuiltinFn = fn(&[Value], &mut dyn Write) -> RuntimeResult<Value>;

#[derive(Clone)]
pub struct BuiltinFunction {
    pub name: &'static str,
    pub arity: Arity,
    pub func: BuiltinFn,
}

impl fmt::Debug for BuiltinFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltinFunction")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}
