//! Type system for the modeling language
//!
//! - Core types (boolean, integer, real, string, void)
//! - Unit types backed by dimension vectors
//! - The registry that interns them

pub mod core;
pub mod registry;

pub use self::core::*;
pub use registry::TypeRegistry;
