//! Diagnostic reporting with source locations
//!
//! This module provides rich error messages with source locations using miette.
//! Inference code reports through [`DiagnosticSink`]; a [`Reporter`] collects
//! the diagnostics of one analysis run and is drained by the caller.

use crate::common::Span;
use miette::{Diagnostic, NamedSource, SourceSpan};
use std::sync::Arc;
use thiserror::Error;

/// Source file for error reporting
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub content: Arc<str>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: Arc::from(content.into()),
        }
    }

    pub fn to_named_source(&self) -> NamedSource<String> {
        NamedSource::new(self.name.clone(), self.content.to_string())
    }
}

/// Convert our Span to miette's SourceSpan
impl From<Span> for SourceSpan {
    fn from(span: Span) -> Self {
        SourceSpan::new(span.start.into(), span.len())
    }
}

/// Checker diagnostic
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CompileError {
    // === Lex/Parse Errors ===
    #[error("Unexpected character `{text}`")]
    #[diagnostic(code(lex::invalid_char))]
    InvalidCharacter {
        text: String,
        #[label("not valid here")]
        span: SourceSpan,
        #[source_code]
        src: NamedSource<String>,
    },

    #[error("Unexpected token: expected {expected}, found {found}")]
    #[diagnostic(code(parse::unexpected_token))]
    UnexpectedToken {
        expected: String,
        found: String,
        #[label("unexpected token here")]
        span: SourceSpan,
        #[source_code]
        src: NamedSource<String>,
    },

    #[error("Invalid literal `{text}`")]
    #[diagnostic(code(parse::invalid_literal))]
    InvalidLiteral {
        text: String,
        #[label("cannot be represented")]
        span: SourceSpan,
        #[source_code]
        src: NamedSource<String>,
    },

    // === Type Errors ===
    #[error("{message}")]
    #[diagnostic(code(typecheck::error))]
    Type {
        message: String,
        #[label("in this expression")]
        span: SourceSpan,
        #[source_code]
        src: NamedSource<String>,
    },

    #[error("{message}")]
    #[diagnostic(code(typecheck::warning), severity(Warning))]
    TypeWarning {
        message: String,
        #[label("in this expression")]
        span: SourceSpan,
        #[source_code]
        src: NamedSource<String>,
    },
}

/// Destination for diagnostics produced during type inference and checks
pub trait DiagnosticSink {
    fn error(&mut self, message: String, span: Span);
    fn warn(&mut self, message: String, span: Span);
}

/// Error reporter that collects the diagnostics of one run
pub struct Reporter {
    source: SourceFile,
    errors: Vec<CompileError>,
    warnings: Vec<CompileError>,
}

impl Reporter {
    pub fn new(source: SourceFile) -> Self {
        Self {
            source,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Record a diagnostic, routed by its severity
    pub fn report(&mut self, diagnostic: CompileError) {
        match diagnostic.severity() {
            Some(miette::Severity::Warning) | Some(miette::Severity::Advice) => {
                self.warnings.push(diagnostic)
            }
            _ => self.errors.push(diagnostic),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Create NamedSource for this file
    pub fn named_source(&self) -> NamedSource<String> {
        self.source.to_named_source()
    }

    /// Get the source file
    pub fn source(&self) -> &SourceFile {
        &self.source
    }

    /// Print all diagnostics
    pub fn emit_all(&self) {
        for warning in &self.warnings {
            eprintln!("{:?}", miette::Report::new(warning.clone()));
        }
        for error in &self.errors {
            eprintln!("{:?}", miette::Report::new(error.clone()));
        }
    }

    /// Consume and return errors and warnings
    pub fn into_diagnostics(self) -> (Vec<CompileError>, Vec<CompileError>) {
        (self.errors, self.warnings)
    }

    /// Get errors by reference
    pub fn errors(&self) -> &[CompileError] {
        &self.errors
    }

    pub fn warnings(&self) -> &[CompileError] {
        &self.warnings
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }
}

impl DiagnosticSink for Reporter {
    fn error(&mut self, message: String, span: Span) {
        tracing::debug!("error at {}: {}", span, message);
        let src = self.named_source();
        self.report(CompileError::Type {
            message,
            span: span.into(),
            src,
        });
    }

    fn warn(&mut self, message: String, span: Span) {
        tracing::debug!("warning at {}: {}", span, message);
        let src = self.named_source();
        self.report(CompileError::TypeWarning {
            message,
            span: span.into(),
            src,
        });
    }
}
