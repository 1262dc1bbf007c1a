//! Type registry
//!
//! Hands out one shared [`TypeRef`] per distinct type. Unit types are
//! interned by the serialized form of their dimension vector, so two
//! structurally equal units are the same `Arc`. The unit table is a
//! `DashMap`, which makes interning idempotent when the registry is shared
//! between threads.

use super::core::{TypeKind, TypeRef, TypeSymbol};
use crate::units::DimensionVector;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::{Arc, OnceLock};

#[derive(Debug)]
pub struct TypeRegistry {
    boolean: TypeRef,
    integer: TypeRef,
    real: TypeRef,
    string: TypeRef,
    void: TypeRef,
    units: DashMap<String, TypeRef>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        let primitive = |name: &str, kind| Arc::new(TypeSymbol::new(name, kind));
        Self {
            boolean: primitive("boolean", TypeKind::Boolean),
            integer: primitive("integer", TypeKind::Integer),
            real: primitive("real", TypeKind::Real),
            string: primitive("string", TypeKind::String),
            void: primitive("void", TypeKind::Void),
            units: DashMap::new(),
        }
    }

    /// Process-lifetime registry shared by every analysis run
    pub fn global() -> &'static TypeRegistry {
        static GLOBAL: OnceLock<TypeRegistry> = OnceLock::new();
        GLOBAL.get_or_init(TypeRegistry::new)
    }

    pub fn boolean_type(&self) -> TypeRef {
        self.boolean.clone()
    }

    pub fn integer_type(&self) -> TypeRef {
        self.integer.clone()
    }

    pub fn real_type(&self) -> TypeRef {
        self.real.clone()
    }

    pub fn string_type(&self) -> TypeRef {
        self.string.clone()
    }

    pub fn void_type(&self) -> TypeRef {
        self.void.clone()
    }

    /// Primitive type by its source name (`integer`, `real`, ...)
    pub fn primitive(&self, name: &str) -> Option<TypeRef> {
        match name {
            "boolean" => Some(self.boolean_type()),
            "integer" => Some(self.integer_type()),
            "real" => Some(self.real_type()),
            "string" => Some(self.string_type()),
            "void" => Some(self.void_type()),
            _ => None,
        }
    }

    pub fn is_numeric(&self, ty: &TypeSymbol) -> bool {
        ty.is_numeric()
    }

    pub fn is_integer(&self, ty: &TypeSymbol) -> bool {
        ty.is_integer()
    }

    pub fn is_unit(&self, ty: &TypeSymbol) -> bool {
        ty.is_unit()
    }

    pub fn is_boolean(&self, ty: &TypeSymbol) -> bool {
        ty.is_boolean()
    }

    /// Unit type for a serialized dimension vector, created on first use.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not a serialized dimension vector.
    pub fn intern_by_key(&self, key: &str) -> TypeRef {
        self.intern_unit(DimensionVector::parse(key))
    }

    /// Unit type for `dim`, created on first use
    pub fn intern_unit(&self, dim: DimensionVector) -> TypeRef {
        match self.units.entry(dim.serialize()) {
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => {
                tracing::debug!("interning unit type {} ({})", entry.key(), dim);
                let ty = Arc::new(TypeSymbol::new(entry.key().clone(), TypeKind::Unit(dim)));
                entry.insert(ty).value().clone()
            }
        }
    }

    /// Previously interned unit type, without creating one
    pub fn lookup_unit(&self, key: &str) -> Option<TypeRef> {
        let dim = key.parse::<DimensionVector>().ok()?;
        self.units.get(&dim.serialize()).map(|ty| ty.value().clone())
    }

    /// Number of interned unit types
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
