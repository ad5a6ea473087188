// Parse tree for Quill programs
//
// The parser builds these nodes; the evaluator walks them. Function bodies and
// default parameter expressions stay unevaluated until a call happens.

use crate::error_reporting::SourceLocation;
use serde::{Deserialize, Serialize};

// --- Literals ---

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Literal {
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Unit,
}

// --- Type annotations ---

/// A type annotation exactly as written in the source.
///
/// Annotations are resolved into [`crate::type_checking::Type`] only when the
/// runtime checker needs them.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeAnnotation {
    /// `int`, `str`, `Point`, ...
    Named(String),
    /// `'a`
    Variable(String),
    /// `list<int>`
    Generic {
        name: String,
        args: Vec<TypeAnnotation>,
    },
    /// `(int, str)`
    Tuple(Vec<TypeAnnotation>),
    /// `{x: int, y: int}`
    Record(Vec<(String, TypeAnnotation)>),
    /// `fn(int, int) -> int`
    Function {
        params: Vec<TypeAnnotation>,
        ret: Box<TypeAnnotation>,
    },
}

// --- Parameters ---

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub annotation: Option<TypeAnnotation>,
    /// Evaluated at call time, inside the callee's scope, only when the
    /// caller omits the argument.
    pub default: Option<Expression>,
}

impl Parameter {
    pub fn named(name: &str) -> Self {
        Parameter {
            name: name.to_string(),
            annotation: None,
            default: None,
        }
    }

    pub fn with_annotation(mut self, annotation: TypeAnnotation) -> Self {
        self.annotation = Some(annotation);
        self
    }

    pub fn with_default(mut self, default: Expression) -> Self {
        self.default = Some(default);
        self
    }
}

/// The shapes a parameter list can take while the tree is being built.
#[derive(Debug, PartialEq, Clone)]
pub enum ParamShape {
    List(Vec<Parameter>),
    Single(Parameter),
    Absent,
}

/// The canonical, ordered parameter sequence of a function.
///
/// Every [`ParamShape`] normalizes into this one form, so nothing downstream
/// of the parser has to care how the list was written.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamList(Vec<Parameter>);

impl ParamList {
    pub fn normalize(shape: ParamShape) -> Self {
        match shape {
            ParamShape::List(params) => ParamList(params),
            ParamShape::Single(param) => ParamList(vec![param]),
            ParamShape::Absent => ParamList(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.0.iter()
    }

    /// Number of leading parameters a caller must supply.
    pub fn required_count(&self) -> usize {
        self.0.iter().filter(|p| p.default.is_none()).count()
    }
}

impl From<ParamShape> for ParamList {
    fn from(shape: ParamShape) -> Self {
        ParamList::normalize(shape)
    }
}

impl<'a> IntoIterator for &'a ParamList {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// --- Operators ---

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

// --- Expressions ---

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Expression {
    Literal(Literal),
    Variable {
        name: String,
        location: Option<SourceLocation>,
    },
    List(Vec<Expression>),
    Tuple(Vec<Expression>),
    Record(Vec<(String, Expression)>),
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Field {
        target: Box<Expression>,
        field: String,
        location: Option<SourceLocation>,
    },
    Index {
        target: Box<Expression>,
        index: Box<Expression>,
        location: Option<SourceLocation>,
    },
    Call {
        callee: String,
        args: Vec<Expression>,
        location: Option<SourceLocation>,
    },
}

impl Expression {
    pub fn variable(name: &str) -> Self {
        Expression::Variable {
            name: name.to_string(),
            location: None,
        }
    }

    pub fn call(callee: &str, args: Vec<Expression>) -> Self {
        Expression::Call {
            callee: callee.to_string(),
            args,
            location: None,
        }
    }

    pub fn integer(n: i64) -> Self {
        Expression::Literal(Literal::Integer(n))
    }

    pub fn string(s: &str) -> Self {
        Expression::Literal(Literal::String(s.to_string()))
    }

    pub fn binary(op: BinaryOp, left: Expression, right: Expression) -> Self {
        Expression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

// --- Statements ---

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct FunctionDef {
    pub name: String,
    pub params: ParamList,
    pub return_type: Option<TypeAnnotation>,
    pub body: Vec<Statement>,
    pub location: Option<SourceLocation>,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Statement {
    /// The annotation is recorded for tooling; only call boundaries are
    /// checked at runtime.
    Let {
        name: String,
        annotation: Option<TypeAnnotation>,
        value: Expression,
    },
    Assign {
        name: String,
        value: Expression,
        location: Option<SourceLocation>,
    },
    FunctionDef(FunctionDef),
    TypeAlias {
        name: String,
        annotation: TypeAnnotation,
    },
    Return {
        value: Option<Expression>,
        location: Option<SourceLocation>,
    },
    If {
        condition: Expression,
        then_branch: Vec<Statement>,
        else_branch: Option<Vec<Statement>>,
    },
    While {
        condition: Expression,
        body: Vec<Statement>,
    },
    Break,
    Continue,
    Expression(Expression),
}

/// A whole parsed source file.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn new(statements: Vec<Statement>) -> Self {
        Program { statements }
    }
}
