//! Context conditions on declarations
//!
//! These run after inference and only read the [`TypeTable`]; they never
//! infer anything themselves. A node whose type is an error was already
//! reported when it failed, so the checks below stay quiet about it or,
//! for invariants, downgrade it to a warning.

use super::{TypeResult, TypeTable};
use crate::ast::Declaration;
use crate::diagnostics::DiagnosticSink;

/// Run every declaration-level check on `decl`
pub fn check_declaration(
    decl: &Declaration,
    declared: &TypeResult,
    types: &TypeTable,
    sink: &mut dyn DiagnosticSink,
) {
    check_invariant(decl, types, sink);
    check_initializer(decl, declared, types, sink);
}

/// An invariant, if present, must be boolean.
///
/// If its type could not be computed, a warning is emitted instead of an
/// error.
pub fn check_invariant(decl: &Declaration, types: &TypeTable, sink: &mut dyn DiagnosticSink) {
    let Some(invariant) = &decl.invariant else {
        return;
    };

    match types.get(invariant.id()) {
        Some(Ok(ty)) if ty.is_boolean() => {}
        Some(Ok(ty)) => sink.error(
            format!("invariant must be of boolean type, found `{}`", ty),
            invariant.span(),
        ),
        Some(Err(_)) | None => sink.warn(
            format!("cannot compute type of invariant expression `{}`", invariant),
            invariant.span(),
        ),
    }
}

/// The initializer, if present, must be assignable to the declared type
pub fn check_initializer(
    decl: &Declaration,
    declared: &TypeResult,
    types: &TypeTable,
    sink: &mut dyn DiagnosticSink,
) {
    let (Some(init), Ok(target)) = (&decl.init, declared) else {
        return;
    };
    let Some(Ok(value)) = types.get(init.id()) else {
        return;
    };

    if target == value || (target.is_real() && value.is_integer()) {
        return;
    }

    match (target.unit(), value.unit()) {
        (Some(to), Some(from)) if to.same_dimensions(&from) => sink.warn(
            format!(
                "implicit magnitude conversion from `{}` to `{}` (factor 1e{})",
                value,
                target,
                i64::from(from.magnitude) - i64::from(to.magnitude)
            ),
            init.span(),
        ),
        (Some(_), None) if value.is_numeric() => sink.warn(
            format!("implicit conversion from `{}` to `{}`", value, target),
            init.span(),
        ),
        _ => sink.error(
            format!(
                "type mismatch in declaration of `{}`: expected `{}`, found `{}`",
                decl.name, target, value
            ),
            init.span(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::TypeChecker;
    use crate::diagnostics::{Reporter, SourceFile};
    use crate::lexer::lex;
    use crate::parser::parse;
    use crate::types::TypeRegistry;

    /// Infer everything in `source`, then run only the checks under test
    fn run(source: &str) -> Reporter {
        let registry = TypeRegistry::new();
        let tokens = lex(source).unwrap();
        let model = parse(&tokens, source).unwrap();

        let mut inference = Reporter::new(SourceFile::new("<test>", source));
        let mut checker = TypeChecker::new(&registry);
        let declared: Vec<_> = model
            .declarations
            .iter()
            .map(|d| {
                let ty = checker.lower_type(&d.ty, &mut inference);
                checker.declare(&d.name, ty.clone());
                ty
            })
            .collect();
        for decl in &model.declarations {
            for expr in decl.init.iter().chain(decl.invariant.iter()) {
                let _ = checker.infer(expr, &mut inference);
            }
        }

        let mut reporter = Reporter::new(SourceFile::new("<test>", source));
        for (decl, ty) in model.declarations.iter().zip(&declared) {
            check_declaration(decl, ty, checker.table(), &mut reporter);
        }
        reporter
    }

    #[test]
    fn test_boolean_invariant() {
        let reporter = run("V_m mV = -70 mV [[ V_m < 0 mV ]]");
        assert!(!reporter.has_errors());
        assert_eq!(reporter.warning_count(), 0);
    }

    #[test]
    fn test_non_boolean_invariant() {
        let reporter = run("tau ms = 10 ms [[ tau + 1 ms ]]");
        assert_eq!(
            reporter.error_messages(),
            vec!["invariant must be of boolean type, found `e-3*s`".to_string()]
        );
    }

    #[test]
    fn test_untypable_invariant_warns() {
        let reporter = run("tau ms [[ nope > 0 ]]");
        assert!(!reporter.has_errors());
        assert_eq!(
            reporter.warning_messages(),
            vec!["cannot compute type of invariant expression `nope > 0`".to_string()]
        );
    }

    #[test]
    fn test_assignable_initializers() {
        let reporter = run("a real = 1\nb integer = 2\nc ms = 3 ms\nd boolean = 1 < 2");
        assert!(!reporter.has_errors());
        assert_eq!(reporter.warning_count(), 0);
    }

    #[test]
    fn test_magnitude_conversion_warns() {
        let reporter = run("t ms = 1 s");
        assert!(!reporter.has_errors());
        assert_eq!(
            reporter.warning_messages(),
            vec!["implicit magnitude conversion from `s` to `e-3*s` (factor 1e3)".to_string()]
        );
    }

    #[test]
    fn test_magnitude_factor_past_i32() {
        let reporter = run("x 1/e2000000000 = 1 e2000000000");
        assert_eq!(
            reporter.warning_messages(),
            vec![
                "implicit magnitude conversion from `e2000000000*1` to `e-2000000000*1` (factor 1e4000000000)"
                    .to_string()
            ]
        );
    }

    #[test]
    fn test_scalar_to_unit_warns() {
        let reporter = run("t ms = 1.5");
        assert_eq!(
            reporter.warning_messages(),
            vec!["implicit conversion from `real` to `e-3*s`".to_string()]
        );
    }

    #[test]
    fn test_type_mismatch() {
        let reporter = run("t ms = 1 mV\nn integer = 1.5\nb boolean = 1");
        assert_eq!(reporter.error_count(), 3);
        assert!(reporter.error_messages()[0].starts_with("type mismatch in declaration of `t`"));
    }

    #[test]
    fn test_failed_initializer_is_not_rechecked() {
        let reporter = run("t ms = nope");
        assert!(!reporter.has_errors());
        assert_eq!(reporter.warning_count(), 0);
    }
}
