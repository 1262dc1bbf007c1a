//! Physical units as dimension vectors
//!
//! - [`dimension`]: the eight-field vector and its algebra
//! - [`catalogue`]: SI prefixes and named units
//! - [`resolve`]: unit token to vector resolution

pub mod catalogue;
pub mod dimension;
pub mod resolve;

pub use catalogue::UnitCatalogue;
pub use dimension::{BaseDimension, DimensionParseError, DimensionVector};
pub use resolve::{MalformedMagnitude, resolve_unit, resolve_unit_in, try_resolve_unit_in};
