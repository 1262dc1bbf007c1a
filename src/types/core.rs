//! Core type definitions

use crate::units::DimensionVector;
use std::fmt;
use std::sync::Arc;

/// Shape of a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Boolean,
    Integer,
    Real,
    String,
    Void,
    /// Physical unit; always numeric, never integer
    Unit(DimensionVector),
}

/// A type as handed out by the registry
///
/// Unit types are named by their serialized dimension vector.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct TypeSymbol {
    name: String,
    kind: TypeKind,
}

/// Shared handle to an interned type
pub type TypeRef = Arc<TypeSymbol>;

impl TypeSymbol {
    pub(crate) fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Registry name (the interning key for unit types)
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Check if this type is numeric
    pub fn is_numeric(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::Integer | TypeKind::Real | TypeKind::Unit(_)
        )
    }

    /// Check if this type is an integer
    pub fn is_integer(&self) -> bool {
        self.kind == TypeKind::Integer
    }

    pub fn is_real(&self) -> bool {
        self.kind == TypeKind::Real
    }

    pub fn is_boolean(&self) -> bool {
        self.kind == TypeKind::Boolean
    }

    pub fn is_string(&self) -> bool {
        self.kind == TypeKind::String
    }

    /// Check if this type is backed by a dimension vector
    pub fn is_unit(&self) -> bool {
        matches!(self.kind, TypeKind::Unit(_))
    }

    /// Dimension vector of a unit type
    pub fn unit(&self) -> Option<DimensionVector> {
        match self.kind {
            TypeKind::Unit(dim) => Some(dim),
            _ => None,
        }
    }

    /// Human-readable form for diagnostics
    pub fn pretty_print(&self) -> String {
        match self.kind {
            TypeKind::Unit(dim) => dim.pretty_print(),
            _ => self.name.clone(),
        }
    }
}

impl fmt::Display for TypeSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pretty_print())
    }
}
