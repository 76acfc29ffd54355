//! Expressions, annotated with their checked types.

use serde::{Deserialize, Serialize};

use crate::types::Type;

/// A literal constant value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Int(i32),
    Float(f32),
    Bool(bool),
}

/// A unary operator.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum UnaryOp {
    Negate,
    Not,
}

impl UnaryOp {
    /// Source-level spelling.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Negate => "-",
            Self::Not => "!",
        }
    }
}

/// A binary operator. Assignment and compound assignment are binary
/// operators in this language.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum BinaryOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    Add,
    Subtract,
    Multiply,
    Divide,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    LogicalAnd,
    LogicalOr,
}

impl BinaryOp {
    /// Source-level spelling.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Assign => "=",
            Self::AddAssign => "+=",
            Self::SubAssign => "-=",
            Self::MulAssign => "*=",
            Self::DivAssign => "/=",
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::LogicalAnd => "&&",
            Self::LogicalOr => "||",
        }
    }
}

/// An expression together with the type the front end assigned to it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Expr {
    pub ty: Type,
    pub kind: ExprKind,
}

/// The shape of an expression.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ExprKind {
    /// A literal constant.
    Literal(Literal),
    /// A reference to a global or local variable.
    Variable(String),
    /// Apply a unary operator.
    Unary { op: UnaryOp, expr: Box<Expr> },
    /// Apply a binary operator (including assignment).
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// A parenthesized sub-expression.
    Paren(Box<Expr>),
    /// Call a user-defined or built-in function.
    Call { name: String, args: Vec<Expr> },
    /// Field selection / swizzle: one or more of `x,y,z,w,r,g,b,a`.
    Field { base: Box<Expr>, fields: String },
    /// Array access. Code generation supports only the restricted form
    /// where both base and index are plain variable references.
    Index { base: Box<Expr>, index: Box<Expr> },
    /// Vector constructor; one scalar argument per lane of the annotated
    /// type.
    Construct { args: Vec<Expr> },
}

impl Expr {
    pub fn new(ty: Type, kind: ExprKind) -> Self {
        Self { ty, kind }
    }

    /// An `int` literal.
    pub fn int(value: i32) -> Self {
        Self::new(Type::INT, ExprKind::Literal(Literal::Int(value)))
    }

    /// A `float` literal.
    pub fn float(value: f32) -> Self {
        Self::new(Type::FLOAT, ExprKind::Literal(Literal::Float(value)))
    }

    /// A variable reference.
    pub fn var(name: impl Into<String>, ty: Type) -> Self {
        Self::new(ty, ExprKind::Variable(name.into()))
    }

    pub fn unary(ty: Type, op: UnaryOp, expr: Expr) -> Self {
        Self::new(
            ty,
            ExprKind::Unary {
                op,
                expr: Box::new(expr),
            },
        )
    }

    pub fn binary(ty: Type, op: BinaryOp, left: Expr, right: Expr) -> Self {
        Self::new(
            ty,
            ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
        )
    }

    pub fn paren(expr: Expr) -> Self {
        Self::new(expr.ty, ExprKind::Paren(Box::new(expr)))
    }

    pub fn call(ty: Type, name: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::new(
            ty,
            ExprKind::Call {
                name: name.into(),
                args,
            },
        )
    }

    pub fn field(ty: Type, base: Expr, fields: impl Into<String>) -> Self {
        Self::new(
            ty,
            ExprKind::Field {
                base: Box::new(base),
                fields: fields.into(),
            },
        )
    }

    pub fn index(ty: Type, base: Expr, index: Expr) -> Self {
        Self::new(
            ty,
            ExprKind::Index {
                base: Box::new(base),
                index: Box::new(index),
            },
        )
    }

    pub fn construct(ty: Type, args: Vec<Expr>) -> Self {
        Self::new(ty, ExprKind::Construct { args })
    }
}
