//! Abstract Syntax Tree for the modeling language
//!
//! This module defines the AST types produced by the parser. A model is a
//! list of declarations; expressions form a closed set of shapes that the
//! checker matches on exhaustively.

use crate::common::{NodeId, Span};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level AST
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub declarations: Vec<Declaration>,
}

/// `name type (= init)? ([[ invariant ]])?`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    pub id: NodeId,
    pub name: String,
    pub name_span: Span,
    pub ty: TypeExpr,
    pub init: Option<Expr>,
    pub invariant: Option<Expr>,
    pub span: Span,
}

// ==================== TYPES ====================

/// Declared type: a primitive name or a unit expression such as `mV/ms`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeExpr {
    /// `integer`, `real`, `mV`, ...
    Named { name: String, span: Span },
    /// The literal `1` in `1/ms`
    One { span: Span },
    Mul {
        left: Box<TypeExpr>,
        right: Box<TypeExpr>,
        span: Span,
    },
    Div {
        left: Box<TypeExpr>,
        right: Box<TypeExpr>,
        span: Span,
    },
    Pow {
        base: Box<TypeExpr>,
        exponent: i32,
        span: Span,
    },
}

impl TypeExpr {
    pub fn span(&self) -> Span {
        match self {
            TypeExpr::Named { span, .. }
            | TypeExpr::One { span }
            | TypeExpr::Mul { span, .. }
            | TypeExpr::Div { span, .. }
            | TypeExpr::Pow { span, .. } => *span,
        }
    }

    /// Display form, parenthesized unless atomic
    fn grouped(&self) -> String {
        match self {
            TypeExpr::Named { .. } | TypeExpr::One { .. } => self.to_string(),
            _ => format!("({})", self),
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Named { name, .. } => write!(f, "{}", name),
            TypeExpr::One { .. } => write!(f, "1"),
            TypeExpr::Mul { left, right, .. } => write!(f, "{}*{}", left, right.grouped()),
            TypeExpr::Div { left, right, .. } => write!(f, "{}/{}", left, right.grouped()),
            TypeExpr::Pow { base, exponent, .. } => write!(f, "{}**{}", base.grouped(), exponent),
        }
    }
}

// ==================== EXPRESSIONS ====================

/// Expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Literal, optionally carrying a unit: `10`, `1.5`, `10 mV`
    Literal {
        id: NodeId,
        value: Literal,
        unit: Option<String>,
        span: Span,
    },
    /// Variable or unit name used as a value
    Variable { id: NodeId, name: String, span: Span },
    /// `( inner )`
    Paren {
        id: NodeId,
        inner: Box<Expr>,
        span: Span,
    },
    Unary {
        id: NodeId,
        op: UnaryOp,
        operand: Box<Expr>,
        span: Span,
    },
    Binary {
        id: NodeId,
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
        span: Span,
    },
    /// `base ** exponent`
    Pow {
        id: NodeId,
        base: Box<Expr>,
        exponent: Box<Expr>,
        span: Span,
    },
}

impl Expr {
    pub fn id(&self) -> NodeId {
        match self {
            Expr::Literal { id, .. }
            | Expr::Variable { id, .. }
            | Expr::Paren { id, .. }
            | Expr::Unary { id, .. }
            | Expr::Binary { id, .. }
            | Expr::Pow { id, .. } => *id,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Expr::Literal { span, .. }
            | Expr::Variable { span, .. }
            | Expr::Paren { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Pow { span, .. } => *span,
        }
    }

    /// Visit this expression and all sub-expressions, parents first
    pub fn walk(&self, f: &mut impl FnMut(&Expr)) {
        f(self);
        match self {
            Expr::Literal { .. } | Expr::Variable { .. } => {}
            Expr::Paren { inner, .. } => inner.walk(f),
            Expr::Unary { operand, .. } => operand.walk(f),
            Expr::Binary { left, right, .. } => {
                left.walk(f);
                right.walk(f);
            }
            Expr::Pow { base, exponent, .. } => {
                base.walk(f);
                exponent.walk(f);
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal { value, unit, .. } => match unit {
                Some(unit) => write!(f, "{} {}", value, unit),
                None => write!(f, "{}", value),
            },
            Expr::Variable { name, .. } => write!(f, "{}", name),
            Expr::Paren { inner, .. } => write!(f, "({})", inner),
            Expr::Unary { op, operand, .. } => match op {
                UnaryOp::Not => write!(f, "not {}", operand),
                _ => write!(f, "{}{}", op.as_str(), operand),
            },
            Expr::Binary {
                op, left, right, ..
            } => write!(f, "{} {} {}", left, op.as_str(), right),
            Expr::Pow { base, exponent, .. } => write!(f, "{}**{}", base, exponent),
        }
    }
}

/// Literal values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(i) => write!(f, "{}", i),
            Literal::Float(x) => write!(f, "{:?}", x),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::String(s) => write!(f, "{:?}", s),
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Not => "not",
        }
    }
}

/// Binary operators (exponentiation is [`Expr::Pow`])
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
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
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }
}
