//! SI prefixes and named units
//!
//! Static lookup tables consumed by name resolution. Prefix order is
//! significant: resolution tries prefixes in declaration order and keeps
//! the first one whose remainder names a known unit.

use super::dimension::DimensionVector;
use indexmap::IndexMap;
use std::sync::OnceLock;

// =============================================================================
// Prefixes
// =============================================================================

/// SI prefixes with their power-of-ten offsets, in resolution order
pub const SI_PREFIXES: &[(&str, i32)] = &[
    ("da", 1),
    ("h", 2),
    ("k", 3),
    ("M", 6),
    ("G", 9),
    ("T", 12),
    ("P", 15),
    ("E", 18),
    ("Z", 21),
    ("Y", 24),
    ("d", -1),
    ("c", -2),
    ("m", -3),
    ("mu", -6),
    ("u", -6),
    ("n", -9),
    ("p", -12),
    ("f", -15),
    ("a", -18),
    ("z", -21),
    ("y", -24),
];

// =============================================================================
// Named Units
// =============================================================================

const KELVIN: DimensionVector = DimensionVector::TEMPERATURE;
const SECOND: DimensionVector = DimensionVector::TIME;
const METER: DimensionVector = DimensionVector::LENGTH;
const GRAM: DimensionVector = DimensionVector::MASS;
const CANDELA: DimensionVector = DimensionVector::LUMINOUS_INTENSITY;
const MOLE: DimensionVector = DimensionVector::AMOUNT_OF_SUBSTANCE;
const AMPERE: DimensionVector = DimensionVector::CURRENT;

const KILOGRAM: DimensionVector = GRAM.with_magnitude_offset(3);
const HERTZ: DimensionVector = SECOND.invert();
const NEWTON: DimensionVector = KILOGRAM.multiply(&METER).divide(&SECOND.power(2));
const PASCAL: DimensionVector = NEWTON.divide(&METER.power(2));
const JOULE: DimensionVector = NEWTON.multiply(&METER);
const WATT: DimensionVector = JOULE.divide(&SECOND);
const COULOMB: DimensionVector = AMPERE.multiply(&SECOND);
const VOLT: DimensionVector = WATT.divide(&AMPERE);
const FARAD: DimensionVector = COULOMB.divide(&VOLT);
const OHM: DimensionVector = VOLT.divide(&AMPERE);
const SIEMENS: DimensionVector = AMPERE.divide(&VOLT);
const WEBER: DimensionVector = VOLT.multiply(&SECOND);
const TESLA: DimensionVector = WEBER.divide(&METER.power(2));
const HENRY: DimensionVector = WEBER.divide(&AMPERE);
const LUX: DimensionVector = CANDELA.divide(&METER.power(2));
const GRAY: DimensionVector = JOULE.divide(&KILOGRAM);
const KATAL: DimensionVector = MOLE.divide(&SECOND);
const LITER: DimensionVector = METER.power(3).with_magnitude_offset(-3);

/// Unit names with their dimension vectors
pub const SI_UNITS: &[(&str, DimensionVector)] = &[
    ("K", KELVIN),
    ("s", SECOND),
    ("m", METER),
    ("g", GRAM),
    ("cd", CANDELA),
    ("mol", MOLE),
    ("A", AMPERE),
    ("Hz", HERTZ),
    ("N", NEWTON),
    ("Pa", PASCAL),
    ("J", JOULE),
    ("W", WATT),
    ("C", COULOMB),
    ("V", VOLT),
    ("F", FARAD),
    ("Ohm", OHM),
    ("S", SIEMENS),
    ("Wb", WEBER),
    ("T", TESLA),
    ("H", HENRY),
    ("lm", CANDELA),
    ("lx", LUX),
    ("Bq", HERTZ),
    ("Gy", GRAY),
    ("Sv", GRAY),
    ("kat", KATAL),
    ("L", LITER),
    ("e", DimensionVector::DIMENSIONLESS),
];

/// Read-only prefix and unit tables
#[derive(Debug, Clone)]
pub struct UnitCatalogue {
    prefixes: IndexMap<String, i32>,
    units: IndexMap<String, DimensionVector>,
}

impl UnitCatalogue {
    /// An empty catalogue
    pub fn empty() -> Self {
        Self {
            prefixes: IndexMap::new(),
            units: IndexMap::new(),
        }
    }

    /// The SI prefixes and units
    pub fn si() -> Self {
        let mut catalogue = Self::empty();
        for (prefix, magnitude) in SI_PREFIXES {
            catalogue.add_prefix(prefix, *magnitude);
        }
        for (name, dim) in SI_UNITS {
            catalogue.add_unit(name, *dim);
        }
        catalogue
    }

    /// Process-wide SI catalogue
    pub fn standard() -> &'static UnitCatalogue {
        static STANDARD: OnceLock<UnitCatalogue> = OnceLock::new();
        STANDARD.get_or_init(UnitCatalogue::si)
    }

    /// Append a prefix; it is tried after all existing prefixes
    pub fn add_prefix(&mut self, prefix: &str, magnitude: i32) {
        self.prefixes.insert(prefix.to_string(), magnitude);
    }

    /// Register a named unit
    pub fn add_unit(&mut self, name: &str, dim: DimensionVector) {
        self.units.insert(name.to_string(), dim);
    }

    /// Prefixes in resolution order
    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.prefixes.keys().map(String::as_str)
    }

    pub fn prefix_magnitude(&self, prefix: &str) -> Option<i32> {
        self.prefixes.get(prefix).copied()
    }

    pub fn base_unit(&self, name: &str) -> Option<DimensionVector> {
        self.units.get(name).copied()
    }

    /// Named units in registration order
    pub fn units(&self) -> impl Iterator<Item = (&str, &DimensionVector)> {
        self.units.iter().map(|(name, dim)| (name.as_str(), dim))
    }

    pub fn prefix_count(&self) -> usize {
        self.prefixes.len()
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }
}

impl Default for UnitCatalogue {
    fn default() -> Self {
        Self::si()
    }
}
