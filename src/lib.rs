//! dimcheck: dimensional type checking for model declarations
//!
//! Physical units are encoded as dimension vectors (seven SI base exponents
//! plus a power-of-ten magnitude). Unit types are interned in a shared
//! registry, so structurally equal units are one type. On top of that sits
//! inference for expressions over declared quantities, including the rule
//! for `**` with a unit base and the boolean check on invariants.
//!
//! # Architecture
//!
//! ```text
//! Source → Lexer → Parser → AST → TypeChecker (TypeTable) → declaration checks
//!                                      │
//!                         units::resolve → TypeRegistry
//! ```
//!
//! # Example
//!
//! ```text
//! tau_m  ms   = 10 ms                 [[ tau_m > 0 ms ]]
//! C_m    pF   = 250 pF
//! g_L    nS   = C_m / tau_m
//! rate   1/ms**2 = 1 / tau_m ** 2
//! ```

pub mod ast;
pub mod check;
pub mod common;
pub mod config;
pub mod diagnostics;
pub mod lexer;
pub mod parser;
pub mod types;
pub mod units;

// Re-export diagnostics for convenience
pub use diagnostics::{CompileError, DiagnosticSink, Reporter, SourceFile};

// Re-exports for convenience
pub use ast::Model;
pub use check::{CheckedModel, TypeError, TypeErrorKind, TypeResult};
pub use types::{TypeRef, TypeRegistry};
pub use units::{DimensionVector, UnitCatalogue, resolve_unit};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parse source code to a model
pub fn parse(source: &str) -> miette::Result<Model> {
    let tokens = lexer::lex(source)?;
    parser::parse(&tokens, source)
}

/// Parse and check `source`, collecting diagnostics instead of failing on them.
///
/// Only lexer and parser errors are returned as `Err`.
pub fn analyze(
    name: &str,
    source: &str,
    registry: &TypeRegistry,
) -> miette::Result<(Model, CheckedModel, Reporter)> {
    let model = parse(source)?;
    let mut reporter = Reporter::new(SourceFile::new(name, source));
    let checked = check::check(&model, registry, &mut reporter);
    Ok((model, checked, reporter))
}

/// Type-check source code against the global registry; any error fails
pub fn typecheck(source: &str) -> miette::Result<CheckedModel> {
    let (_, checked, reporter) = analyze("<input>", source, TypeRegistry::global())?;
    if reporter.has_errors() {
        return Err(miette::miette!(
            "Type errors:\n{}",
            reporter.error_messages().join("\n")
        ));
    }
    Ok(checked)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_typecheck() {
        let checked = typecheck("tau ms = 10 ms\nrate 1/ms = 1 / tau").unwrap();
        let rate = checked.declared_type("rate").unwrap().as_ref().unwrap();
        assert_eq!(rate.pretty_print(), "e3*1 / s");
    }

    #[test]
    fn test_typecheck_reports_errors() {
        let err = typecheck("x ms = 1 ms ** 1.5").unwrap_err();
        assert!(err.to_string().contains("Type errors"));
        assert!(typecheck("x ms = 1 s ** y").is_err());
    }
}
