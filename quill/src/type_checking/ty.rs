//! Type representation for Quill.
//!
//! Types are immutable values. Equality and hashing go through the canonical
//! rendering produced by `Display`, so two types are equal exactly when they
//! print the same way. Record fields are kept sorted by name, which makes the
//! rendering independent of declaration order.

use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};

use super::error::TypeError;

/// A substitution maps type-variable names to types.
pub type Substitution = HashMap<String, Type>;

pub const INT: &str = "int";
pub const FLOAT: &str = "float";
pub const STR: &str = "str";
pub const BOOL: &str = "bool";
pub const UNIT: &str = "unit";
pub const ANY: &str = "any";

#[derive(Debug, Clone)]
pub enum Type {
    Primitive(String),
    Variable(String),
    Function { params: Vec<Type>, ret: Box<Type> },
    Generic { name: String, args: Vec<Type> },
    Tuple(Vec<Type>),
    Record(BTreeMap<String, Type>),
}

impl Type {
    pub fn primitive(name: &str) -> Self {
        Type::Primitive(name.to_string())
    }

    pub fn int() -> Self {
        Type::primitive(INT)
    }

    pub fn float() -> Self {
        Type::primitive(FLOAT)
    }

    pub fn string() -> Self {
        Type::primitive(STR)
    }

    pub fn boolean() -> Self {
        Type::primitive(BOOL)
    }

    pub fn unit() -> Self {
        Type::primitive(UNIT)
    }

    pub fn any() -> Self {
        Type::primitive(ANY)
    }

    pub fn var(name: &str) -> Self {
        Type::Variable(name.to_string())
    }

    pub fn function(params: Vec<Type>, ret: Type) -> Self {
        Type::Function {
            params,
            ret: Box::new(ret),
        }
    }

    pub fn generic(name: &str, args: Vec<Type>) -> Self {
        Type::Generic {
            name: name.to_string(),
            args,
        }
    }

    pub fn record<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, Type)>,
        S: Into<String>,
    {
        Type::Record(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Rewrites every free variable that `subst` maps, recursively.
    ///
    /// Replacement types are inserted as-is; they are not substituted again.
    pub fn substitute(&self, subst: &Substitution) -> Type {
        match self {
            Type::Primitive(_) => self.clone(),
            Type::Variable(name) => subst.get(name).cloned().unwrap_or_else(|| self.clone()),
            Type::Function { params, ret } => Type::Function {
                params: params.iter().map(|p| p.substitute(subst)).collect(),
                ret: Box::new(ret.substitute(subst)),
            },
            Type::Generic { name, args } => Type::Generic {
                name: name.clone(),
                args: args.iter().map(|a| a.substitute(subst)).collect(),
            },
            Type::Tuple(elems) => Type::Tuple(elems.iter().map(|e| e.substitute(subst)).collect()),
            Type::Record(fields) => Type::Record(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.substitute(subst)))
                    .collect(),
            ),
        }
    }

    pub fn free_variables(&self) -> BTreeSet<String> {
        let mut vars = BTreeSet::new();
        self.collect_variables(&mut vars);
        vars
    }

    fn collect_variables(&self, out: &mut BTreeSet<String>) {
        match self {
            Type::Primitive(_) => {}
            Type::Variable(name) => {
                out.insert(name.clone());
            }
            Type::Function { params, ret } => {
                params.iter().for_each(|p| p.collect_variables(out));
                ret.collect_variables(out);
            }
            Type::Generic { args, .. } => args.iter().for_each(|a| a.collect_variables(out)),
            Type::Tuple(elems) => elems.iter().for_each(|e| e.collect_variables(out)),
            Type::Record(fields) => fields.values().for_each(|v| v.collect_variables(out)),
        }
    }

    /// The canonical rendering; the basis of equality and hashing.
    pub fn canonical(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(name) => write!(f, "{}", name),
            Type::Variable(name) => write!(f, "'{}", name),
            Type::Function { params, ret } => {
                write!(f, "fn({}) -> {}", params.iter().join(", "), ret)
            }
            Type::Generic { name, args } => write!(f, "{}<{}>", name, args.iter().join(", ")),
            Type::Tuple(elems) if elems.len() == 1 => write!(f, "({},)", elems[0]),
            Type::Tuple(elems) => write!(f, "({})", elems.iter().join(", ")),
            Type::Record(fields) => write!(
                f,
                "{{{}}}",
                fields
                    .iter()
                    .map(|(name, ty)| format!("{}: {}", name, ty))
                    .join(", ")
            ),
        }
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Eq for Type {}

impl Hash for Type {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

/// `forall vars. ty`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeScheme {
    pub vars: BTreeSet<String>,
    pub ty: Type,
}

impl TypeScheme {
    pub fn monomorphic(ty: Type) -> Self {
        TypeScheme {
            vars: BTreeSet::new(),
            ty,
        }
    }

    /// Binds every free variable of `ty`.
    pub fn generalize(ty: Type) -> Self {
        TypeScheme {
            vars: ty.free_variables(),
            ty,
        }
    }

    pub fn is_monomorphic(&self) -> bool {
        self.vars.is_empty()
    }

    /// Variables of the body that the scheme does not bind.
    pub fn free_variables(&self) -> BTreeSet<String> {
        self.ty
            .free_variables()
            .into_iter()
            .filter(|v| !self.vars.contains(v))
            .collect()
    }

    /// Replacing the bound variables with fresh ones belongs to type
    /// inference, which Quill does not have.
    pub fn instantiate(&self) -> Result<Type, TypeError> {
        Err(TypeError::NotImplemented(format!(
            "instantiation of type scheme forall {}. {}",
            self.vars.iter().map(|v| format!("'{}", v)).join(" "),
            self.ty
        )))
    }
}

impl fmt::Display for TypeScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.vars.is_empty() {
            write!(f, "{}", self.ty)
        } else {
            write!(
                f,
                "forall {}. {}",
                self.vars.iter().map(|v| format!("'{}", v)).join(" "),
                self.ty
            )
        }
    }
}
