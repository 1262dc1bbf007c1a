//! Compile-time folding of unit exponents
//!
//! Only a closed grammar is folded: integer literals, parentheses and unary
//! negation. Anything else is rejected, including `+2` and names bound to
//! constant initializers.

use super::{TypeError, TypeErrorKind};
use crate::ast::{Expr, Literal, UnaryOp};

/// Fold an exponent expression to an integer.
///
/// The error span is the offending sub-expression.
pub fn fold_exponent(expr: &Expr) -> Result<i32, TypeError> {
    match expr {
        Expr::Paren { inner, .. } => fold_exponent(inner),
        Expr::Literal {
            value: Literal::Int(v),
            unit: None,
            span,
            ..
        } => i32::try_from(*v)
            .map_err(|_| TypeError::new(TypeErrorKind::ExponentOutOfRange { value: *v }, *span)),
        Expr::Literal {
            value: Literal::Float(_),
            unit: None,
            span,
            ..
        } => Err(TypeError::new(TypeErrorKind::FloatingPointExponent, *span)),
        Expr::Unary {
            op: UnaryOp::Neg,
            operand,
            span,
            ..
        } => {
            let n = fold_exponent(operand)?;
            n.checked_neg().ok_or_else(|| {
                TypeError::new(
                    TypeErrorKind::ExponentOutOfRange {
                        value: -i64::from(n),
                    },
                    *span,
                )
            })
        }
        other => Err(TypeError::new(
            TypeErrorKind::NonConstantExponent,
            other.span(),
        )),
    }
}
