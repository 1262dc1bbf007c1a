//! Typing of `base ** exponent`

use super::fold::fold_exponent;
use super::{TypeError, TypeErrorKind, TypeResult};
use crate::ast::Expr;
use crate::common::Span;
use crate::diagnostics::DiagnosticSink;
use crate::types::{TypeRef, TypeRegistry};

/// Result type of a power expression.
///
/// Failed operand types are passed through untouched. A failure found here
/// is reported to `sink` once, at `span`, and returned.
pub fn infer_power(
    registry: &TypeRegistry,
    base: &TypeResult,
    exponent: &Expr,
    exponent_ty: &TypeResult,
    span: Span,
    sink: &mut dyn DiagnosticSink,
) -> TypeResult {
    let base = base.as_ref().map_err(TypeError::clone)?;
    let exponent_ty = exponent_ty.as_ref().map_err(TypeError::clone)?;

    power_type(registry, base, exponent, exponent_ty, span).inspect_err(|err| {
        sink.error(err.to_string(), span);
    })
}

fn power_type(
    registry: &TypeRegistry,
    base: &TypeRef,
    exponent: &Expr,
    exponent_ty: &TypeRef,
    span: Span,
) -> TypeResult {
    if !base.is_numeric() || !exponent_ty.is_numeric() {
        return Err(TypeError::new(
            TypeErrorKind::IncompatiblePowerOperands {
                base: base.pretty_print(),
                exponent: exponent_ty.pretty_print(),
            },
            span,
        ));
    }

    if base.is_integer() && exponent_ty.is_integer() {
        return Ok(registry.integer_type());
    }

    let Some(dim) = base.unit() else {
        return Ok(registry.real_type());
    };

    if !exponent_ty.is_integer() {
        return Err(TypeError::new(
            TypeErrorKind::UnitBaseRequiresIntegerExponent {
                exponent: exponent_ty.pretty_print(),
            },
            span,
        ));
    }

    let n = fold_exponent(exponent).map_err(|err| TypeError::new(err.kind, span))?;
    let raised = dim.checked_power(n).ok_or_else(|| {
        TypeError::new(
            TypeErrorKind::ExponentOutOfRange {
                value: i64::from(n),
            },
            span,
        )
    })?;
    tracing::trace!("({}) ** {} = {}", dim, n, raised);

    Ok(registry.intern_unit(raised))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{Reporter, SourceFile};
    use crate::lexer::lex;
    use crate::parser::parse_expr;
    use crate::units::resolve_unit;
    use std::sync::Arc;

    fn exponent(source: &str) -> Expr {
        let tokens = lex(source).unwrap();
        parse_expr(&tokens, source).unwrap()
    }

    fn reporter() -> Reporter {
        Reporter::new(SourceFile::new("<test>", ""))
    }

    #[test]
    fn test_unit_base_integer_exponent() {
        let registry = TypeRegistry::new();
        let ms = registry.intern_unit(resolve_unit("ms").unwrap());
        let mut sink = reporter();

        let ty = infer_power(
            &registry,
            &Ok(ms),
            &exponent("2"),
            &Ok(registry.integer_type()),
            Span::dummy(),
            &mut sink,
        )
        .unwrap();

        assert_eq!(ty.name(), "[0, 2, 0, 0, 0, 0, 0, -6]");
        assert!(!sink.has_errors());
    }

    #[test]
    fn test_scalar_bases() {
        let registry = TypeRegistry::new();
        let mut sink = reporter();
        let int = registry.integer_type();
        let real = registry.real_type();
        let x = exponent("x");

        let ty = infer_power(
            &registry,
            &Ok(int.clone()),
            &x,
            &Ok(int.clone()),
            Span::dummy(),
            &mut sink,
        );
        assert!(Arc::ptr_eq(&ty.unwrap(), &int));

        let ty = infer_power(&registry, &Ok(int), &x, &Ok(real.clone()), Span::dummy(), &mut sink);
        assert!(Arc::ptr_eq(&ty.unwrap(), &real));
        assert!(!sink.has_errors());
    }

    #[test]
    fn test_non_numeric_operands() {
        let registry = TypeRegistry::new();
        let mut sink = reporter();

        let err = infer_power(
            &registry,
            &Ok(registry.boolean_type()),
            &exponent("2"),
            &Ok(registry.integer_type()),
            Span::new(3, 9),
            &mut sink,
        )
        .unwrap_err();

        assert!(matches!(
            err.kind,
            TypeErrorKind::IncompatiblePowerOperands { .. }
        ));
        assert_eq!(err.span, Span::new(3, 9));
        assert_eq!(sink.error_count(), 1);
    }

    #[test]
    fn test_failed_operand_is_passed_through() {
        let registry = TypeRegistry::new();
        let mut sink = reporter();
        let upstream = TypeError::new(
            TypeErrorKind::UnknownVariable {
                name: "y".to_string(),
            },
            Span::new(0, 1),
        );

        let err = infer_power(
            &registry,
            &Err(upstream.clone()),
            &exponent("2"),
            &Ok(registry.integer_type()),
            Span::new(0, 6),
            &mut sink,
        )
        .unwrap_err();

        assert_eq!(err, upstream);
        assert_eq!(sink.error_count(), 0);
    }

    #[test]
    fn test_exponent_overflow() {
        let registry = TypeRegistry::new();
        let mut sink = reporter();
        let ms = registry.intern_unit(resolve_unit("ms").unwrap());

        let err = infer_power(
            &registry,
            &Ok(ms),
            &exponent("2000000000"),
            &Ok(registry.integer_type()),
            Span::dummy(),
            &mut sink,
        )
        .unwrap_err();

        assert!(matches!(err.kind, TypeErrorKind::ExponentOutOfRange { .. }));
        assert_eq!(sink.error_count(), 1);
    }
}
