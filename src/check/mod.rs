//! Type checker for declaration models
//!
//! Checking runs in three passes over a [`Model`]:
//!
//! 1. every declared type is lowered to a registry type and bound in the
//!    environment,
//! 2. every initializer and invariant is inferred bottom-up, with the
//!    result of each expression node memoized in a [`TypeTable`],
//! 3. the declaration checks in [`cocos`] read the table back.
//!
//! A node whose type cannot be computed gets an `Err` entry. The failure is
//! reported once, where it is found; operators above it pass the same error
//! through without reporting again.

pub mod cocos;
pub mod fold;
pub mod pow;

use crate::ast::{BinaryOp, Expr, Literal, Model, TypeExpr, UnaryOp};
use crate::common::{NodeId, Span};
use crate::diagnostics::DiagnosticSink;
use crate::types::{TypeRef, TypeRegistry, TypeSymbol};
use crate::units::{DimensionVector, UnitCatalogue, try_resolve_unit_in};
use indexmap::IndexMap;
use indexmap::map::Entry;
use rustc_hash::FxHashMap;
use thiserror::Error;

/// Why a type could not be computed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeErrorKind {
    #[error("unit base requires integer exponent, found `{exponent}`")]
    UnitBaseRequiresIntegerExponent { exponent: String },

    #[error("floating-point exponent not allowed")]
    FloatingPointExponent,

    #[error("exponent is not a compile-time constant")]
    NonConstantExponent,

    #[error("exponent `{value}` is out of range")]
    ExponentOutOfRange { value: i64 },

    #[error("unit exponent overflow in `{left}` {op} `{right}`")]
    UnitOutOfRange {
        op: &'static str,
        left: String,
        right: String,
    },

    #[error("incompatible operand types for power operator: `{base}` and `{exponent}`")]
    IncompatiblePowerOperands { base: String, exponent: String },

    #[error("incompatible operand types for `{op}`: `{left}` and `{right}`")]
    IncompatibleOperands {
        op: &'static str,
        left: String,
        right: String,
    },

    #[error("operator `{op}` cannot be applied to `{operand}`")]
    InvalidOperand { op: &'static str, operand: String },

    #[error("unknown variable `{name}`")]
    UnknownVariable { name: String },

    #[error("unit `{name}` is not recognized")]
    UnknownUnit { name: String },

    #[error("`{name}` cannot be used inside a unit type")]
    PrimitiveInUnit { name: String },
}

/// A failed type computation and where it failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct TypeError {
    pub kind: TypeErrorKind,
    pub span: Span,
}

impl TypeError {
    pub fn new(kind: TypeErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Either a type or the error that prevented computing it
pub type TypeResult = Result<TypeRef, TypeError>;

/// Memoized expression types, keyed by node id
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    types: FxHashMap<NodeId, TypeResult>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: NodeId) -> Option<&TypeResult> {
        self.types.get(&id)
    }

    pub fn insert(&mut self, id: NodeId, result: TypeResult) {
        self.types.insert(id, result);
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Result of checking a whole model
#[derive(Debug)]
pub struct CheckedModel {
    /// Declared type of every name, in declaration order
    pub declarations: IndexMap<String, TypeResult>,
    /// Types of all initializer and invariant nodes
    pub types: TypeTable,
}

impl CheckedModel {
    pub fn declared_type(&self, name: &str) -> Option<&TypeResult> {
        self.declarations.get(name)
    }

    /// Type of an expression node, if it was inferred
    pub fn expr_type(&self, expr: &Expr) -> Option<&TypeResult> {
        self.types.get(expr.id())
    }
}

/// Check every declaration of `model`, reporting to `sink`
pub fn check(model: &Model, registry: &TypeRegistry, sink: &mut dyn DiagnosticSink) -> CheckedModel {
    let mut checker = TypeChecker::new(registry);

    let mut declared = Vec::with_capacity(model.declarations.len());
    for decl in &model.declarations {
        let ty = checker.lower_type(&decl.ty, sink);
        if !checker.declare(&decl.name, ty.clone()) {
            sink.error(
                format!("duplicate declaration of `{}`", decl.name),
                decl.name_span,
            );
        }
        declared.push(ty);
    }

    for decl in &model.declarations {
        for expr in decl.init.iter().chain(decl.invariant.iter()) {
            // Result lands in the table
            let _ = checker.infer(expr, sink);
        }
    }

    let (declarations, types) = checker.finish();
    for (decl, ty) in model.declarations.iter().zip(&declared) {
        cocos::check_declaration(decl, ty, &types, sink);
    }

    tracing::debug!(
        "checked {} declarations, {} typed nodes",
        declarations.len(),
        types.len()
    );
    CheckedModel {
        declarations,
        types,
    }
}

/// Expression type inference over one environment
pub struct TypeChecker<'r> {
    registry: &'r TypeRegistry,
    catalogue: &'r UnitCatalogue,
    /// Declared names; the first declaration of a name wins
    env: IndexMap<String, TypeResult>,
    table: TypeTable,
}

impl<'r> TypeChecker<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self::with_catalogue(registry, UnitCatalogue::standard())
    }

    pub fn with_catalogue(registry: &'r TypeRegistry, catalogue: &'r UnitCatalogue) -> Self {
        Self {
            registry,
            catalogue,
            env: IndexMap::new(),
            table: TypeTable::new(),
        }
    }

    /// Bind `name`; returns false if it was already bound
    pub fn declare(&mut self, name: &str, ty: TypeResult) -> bool {
        match self.env.entry(name.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(ty);
                true
            }
        }
    }

    pub fn table(&self) -> &TypeTable {
        &self.table
    }

    /// Split into the environment and the memo table
    pub fn finish(self) -> (IndexMap<String, TypeResult>, TypeTable) {
        (self.env, self.table)
    }

    fn fail(&self, kind: TypeErrorKind, span: Span, sink: &mut dyn DiagnosticSink) -> TypeResult {
        let err = TypeError::new(kind, span);
        sink.error(err.to_string(), span);
        Err(err)
    }

    // ==================== TYPE EXPRESSIONS ====================

    /// Lower a declared type: a primitive name or a unit expression
    pub fn lower_type(&self, ty: &TypeExpr, sink: &mut dyn DiagnosticSink) -> TypeResult {
        if let TypeExpr::Named { name, .. } = ty {
            if let Some(primitive) = self.registry.primitive(name) {
                return Ok(primitive);
            }
        }

        match self.unit_of(ty) {
            Ok(dim) => Ok(self.registry.intern_unit(dim)),
            Err(err) => {
                sink.error(err.to_string(), err.span);
                Err(err)
            }
        }
    }

    fn unit_of(&self, ty: &TypeExpr) -> Result<DimensionVector, TypeError> {
        match ty {
            TypeExpr::Named { name, span } => {
                if self.registry.primitive(name).is_some() {
                    return Err(TypeError::new(
                        TypeErrorKind::PrimitiveInUnit { name: name.clone() },
                        *span,
                    ));
                }
                self.resolve(name)
                    .ok_or_else(|| TypeError::new(TypeErrorKind::UnknownUnit { name: name.clone() }, *span))
            }
            TypeExpr::One { .. } => Ok(DimensionVector::DIMENSIONLESS),
            TypeExpr::Mul { left, right, span } => {
                let (l, r) = (self.unit_of(left)?, self.unit_of(right)?);
                l.checked_multiply(&r)
                    .ok_or_else(|| TypeError::new(unit_overflow("*", &l, &r), *span))
            }
            TypeExpr::Div { left, right, span } => {
                let (l, r) = (self.unit_of(left)?, self.unit_of(right)?);
                l.checked_divide(&r)
                    .ok_or_else(|| TypeError::new(unit_overflow("/", &l, &r), *span))
            }
            TypeExpr::Pow {
                base,
                exponent,
                span,
            } => self.unit_of(base)?.checked_power(*exponent).ok_or_else(|| {
                TypeError::new(
                    TypeErrorKind::ExponentOutOfRange {
                        value: i64::from(*exponent),
                    },
                    *span,
                )
            }),
        }
    }

    /// Resolve a unit token; malformed `e<int>` tokens are just unknown here
    fn resolve(&self, name: &str) -> Option<DimensionVector> {
        try_resolve_unit_in(self.catalogue, name).ok().flatten()
    }

    // ==================== EXPRESSIONS ====================

    /// Type of `expr`, computed once per node
    pub fn infer(&mut self, expr: &Expr, sink: &mut dyn DiagnosticSink) -> TypeResult {
        if let Some(result) = self.table.get(expr.id()) {
            return result.clone();
        }
        let result = self.infer_uncached(expr, sink);
        self.table.insert(expr.id(), result.clone());
        result
    }

    fn infer_uncached(&mut self, expr: &Expr, sink: &mut dyn DiagnosticSink) -> TypeResult {
        match expr {
            Expr::Literal {
                value, unit, span, ..
            } => self.infer_literal(value, unit.as_deref(), *span, sink),

            Expr::Variable { name, span, .. } => match self.lookup(name) {
                Some(result) => result,
                None => self.fail(
                    TypeErrorKind::UnknownVariable { name: name.clone() },
                    *span,
                    sink,
                ),
            },

            Expr::Paren { inner, .. } => self.infer(inner, sink),

            Expr::Unary {
                op, operand, span, ..
            } => {
                let operand = self.infer(operand, sink)?;
                let ok = match op {
                    UnaryOp::Neg | UnaryOp::Plus => operand.is_numeric(),
                    UnaryOp::Not => operand.is_boolean(),
                };
                if ok {
                    Ok(operand)
                } else {
                    self.fail(
                        TypeErrorKind::InvalidOperand {
                            op: op.as_str(),
                            operand: operand.pretty_print(),
                        },
                        *span,
                        sink,
                    )
                }
            }

            Expr::Binary {
                op,
                left,
                right,
                span,
                ..
            } => {
                let left = self.infer(left, sink);
                let right = self.infer(right, sink);
                let (left, right) = (left?, right?);
                self.binary_type(*op, &left, &right, *span, sink)
            }

            Expr::Pow {
                base,
                exponent,
                span,
                ..
            } => {
                let base_ty = self.infer(base, sink);
                let exponent_ty = self.infer(exponent, sink);
                pow::infer_power(self.registry, &base_ty, exponent, &exponent_ty, *span, sink)
            }
        }
    }

    /// A declared name, then a predefined variable, then a unit name used as a value
    fn lookup(&self, name: &str) -> Option<TypeResult> {
        if let Some(declared) = self.env.get(name) {
            return Some(declared.clone());
        }
        if let Some(predefined) = self.predefined(name) {
            return Some(Ok(predefined));
        }
        self.resolve(name)
            .map(|dim| Ok(self.registry.intern_unit(dim)))
    }

    /// Names every model can read without declaring them
    fn predefined(&self, name: &str) -> Option<TypeRef> {
        match name {
            // Euler's number
            "e" => Some(self.registry.real_type()),
            // simulation time
            "t" => Some(self.registry.intern_unit(SIMULATION_TIME)),
            _ => None,
        }
    }

    fn infer_literal(
        &self,
        value: &Literal,
        unit: Option<&str>,
        span: Span,
        sink: &mut dyn DiagnosticSink,
    ) -> TypeResult {
        match (value, unit) {
            (Literal::Int(_) | Literal::Float(_), Some(name)) => match self.resolve(name) {
                Some(dim) => Ok(self.registry.intern_unit(dim)),
                None => self.fail(
                    TypeErrorKind::UnknownUnit {
                        name: name.to_string(),
                    },
                    span,
                    sink,
                ),
            },
            (Literal::Int(_), None) => Ok(self.registry.integer_type()),
            (Literal::Float(_), None) => Ok(self.registry.real_type()),
            (Literal::Bool(_), _) => Ok(self.registry.boolean_type()),
            (Literal::String(_), _) => Ok(self.registry.string_type()),
        }
    }

    fn binary_type(
        &self,
        op: BinaryOp,
        left: &TypeRef,
        right: &TypeRef,
        span: Span,
        sink: &mut dyn DiagnosticSink,
    ) -> TypeResult {
        let registry = self.registry;
        let incompatible = || TypeErrorKind::IncompatibleOperands {
            op: op.as_str(),
            left: left.pretty_print(),
            right: right.pretty_print(),
        };
        let overflow = || TypeErrorKind::UnitOutOfRange {
            op: op.as_str(),
            left: left.pretty_print(),
            right: right.pretty_print(),
        };

        match op {
            BinaryOp::Add if left.is_string() && right.is_string() => Ok(registry.string_type()),

            BinaryOp::Add | BinaryOp::Sub => match numeric_compat(left, right) {
                Compat::Same => Ok(left.clone()),
                Compat::Widen => Ok(registry.real_type()),
                Compat::Rescale => {
                    warn_rescale(op, left, right, span, sink);
                    Ok(left.clone())
                }
                Compat::Incompatible => self.fail(incompatible(), span, sink),
            },

            _ if op.is_comparison() => {
                let equality = matches!(op, BinaryOp::Eq | BinaryOp::Ne);
                if equality && left == right && (left.is_boolean() || left.is_string()) {
                    return Ok(registry.boolean_type());
                }
                match numeric_compat(left, right) {
                    Compat::Same | Compat::Widen => Ok(registry.boolean_type()),
                    Compat::Rescale => {
                        warn_rescale(op, left, right, span, sink);
                        Ok(registry.boolean_type())
                    }
                    Compat::Incompatible => self.fail(incompatible(), span, sink),
                }
            }

            BinaryOp::Mul => match (left.unit(), right.unit()) {
                (Some(l), Some(r)) => self.intern_checked(l.checked_multiply(&r), span, sink, overflow),
                (Some(_), None) if right.is_numeric() => Ok(left.clone()),
                (None, Some(_)) if left.is_numeric() => Ok(right.clone()),
                _ => self.scalar_arithmetic(left, right, span, sink, incompatible),
            },

            BinaryOp::Div => match (left.unit(), right.unit()) {
                (Some(l), Some(r)) => self.intern_checked(l.checked_divide(&r), span, sink, overflow),
                (Some(_), None) if right.is_numeric() => Ok(left.clone()),
                (None, Some(r)) if left.is_numeric() => {
                    self.intern_checked(r.checked_power(-1), span, sink, overflow)
                }
                _ => self.scalar_arithmetic(left, right, span, sink, incompatible),
            },

            BinaryOp::Rem if left.is_integer() && right.is_integer() => Ok(left.clone()),

            BinaryOp::And | BinaryOp::Or if left.is_boolean() && right.is_boolean() => {
                Ok(registry.boolean_type())
            }

            _ => self.fail(incompatible(), span, sink),
        }
    }

    /// Intern the result of checked unit arithmetic
    fn intern_checked(
        &self,
        dim: Option<DimensionVector>,
        span: Span,
        sink: &mut dyn DiagnosticSink,
        overflow: impl FnOnce() -> TypeErrorKind,
    ) -> TypeResult {
        match dim {
            Some(dim) => Ok(self.registry.intern_unit(dim)),
            None => self.fail(overflow(), span, sink),
        }
    }

    /// `*` and `/` between integers and reals
    fn scalar_arithmetic(
        &self,
        left: &TypeRef,
        right: &TypeRef,
        span: Span,
        sink: &mut dyn DiagnosticSink,
        incompatible: impl FnOnce() -> TypeErrorKind,
    ) -> TypeResult {
        if left.is_integer() && right.is_integer() {
            Ok(self.registry.integer_type())
        } else if left.is_numeric() && right.is_numeric() {
            Ok(self.registry.real_type())
        } else {
            self.fail(incompatible(), span, sink)
        }
    }
}

/// Type of the predefined `t`, in milliseconds
const SIMULATION_TIME: DimensionVector = DimensionVector::TIME.with_magnitude_offset(-3);

fn unit_overflow(op: &'static str, left: &DimensionVector, right: &DimensionVector) -> TypeErrorKind {
    TypeErrorKind::UnitOutOfRange {
        op,
        left: left.pretty_print(),
        right: right.pretty_print(),
    }
}

/// How two operands of `+`, `-` or a comparison relate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Compat {
    Same,
    /// integer with real
    Widen,
    /// units of equal dimensions and different magnitude
    Rescale,
    Incompatible,
}

fn numeric_compat(left: &TypeSymbol, right: &TypeSymbol) -> Compat {
    if !left.is_numeric() || !right.is_numeric() {
        return Compat::Incompatible;
    }
    if left == right {
        return Compat::Same;
    }
    match (left.unit(), right.unit()) {
        (Some(l), Some(r)) if l.same_dimensions(&r) => Compat::Rescale,
        (None, None) => Compat::Widen,
        _ => Compat::Incompatible,
    }
}

fn warn_rescale(
    op: BinaryOp,
    left: &TypeSymbol,
    right: &TypeSymbol,
    span: Span,
    sink: &mut dyn DiagnosticSink,
) {
    sink.warn(
        format!(
            "implicit magnitude conversion in `{}`: `{}` to `{}`",
            op.as_str(),
            right,
            left
        ),
        span,
    );
}
