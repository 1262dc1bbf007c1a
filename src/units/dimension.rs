//! Dimension vectors
//!
//! Every unit is encoded as the exponents of the seven SI base dimensions
//! plus a power-of-ten magnitude. Two units with the same vector are the
//! same unit, and the canonical serialization of the vector is the key the
//! type registry interns unit types under.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Div, Mul, Neg};
use std::str::FromStr;
use thiserror::Error;

/// One of the seven SI base dimensions, in serialization order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseDimension {
    Temperature,
    Time,
    Length,
    Mass,
    LuminousIntensity,
    AmountOfSubstance,
    Current,
}

impl BaseDimension {
    /// All base dimensions in canonical order
    pub const ALL: [BaseDimension; 7] = [
        BaseDimension::Temperature,
        BaseDimension::Time,
        BaseDimension::Length,
        BaseDimension::Mass,
        BaseDimension::LuminousIntensity,
        BaseDimension::AmountOfSubstance,
        BaseDimension::Current,
    ];

    /// Symbol of the base unit measuring this dimension
    pub const fn symbol(self) -> &'static str {
        match self {
            BaseDimension::Temperature => "K",
            BaseDimension::Time => "s",
            BaseDimension::Length => "m",
            BaseDimension::Mass => "g",
            BaseDimension::LuminousIntensity => "cd",
            BaseDimension::AmountOfSubstance => "mol",
            BaseDimension::Current => "A",
        }
    }
}

/// Exponents of the seven base dimensions plus a decimal magnitude
///
/// Mass is measured in grams, so `kg` is `g` with magnitude 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DimensionVector {
    /// Thermodynamic temperature [K]
    pub temperature: i32,
    /// Time [s]
    pub time: i32,
    /// Length [m]
    pub length: i32,
    /// Mass [g]
    pub mass: i32,
    /// Luminous intensity [cd]
    pub luminous_intensity: i32,
    /// Amount of substance [mol]
    pub amount_of_substance: i32,
    /// Electric current [A]
    pub current: i32,
    /// Power-of-ten scale factor
    pub magnitude: i32,
}

impl DimensionVector {
    // ==========================================================================
    // Base Vectors
    // ==========================================================================

    /// Dimensionless, unscaled
    pub const DIMENSIONLESS: Self = Self::new(0, 0, 0, 0, 0, 0, 0, 0);

    pub const TEMPERATURE: Self = Self::new(1, 0, 0, 0, 0, 0, 0, 0);
    pub const TIME: Self = Self::new(0, 1, 0, 0, 0, 0, 0, 0);
    pub const LENGTH: Self = Self::new(0, 0, 1, 0, 0, 0, 0, 0);
    pub const MASS: Self = Self::new(0, 0, 0, 1, 0, 0, 0, 0);
    pub const LUMINOUS_INTENSITY: Self = Self::new(0, 0, 0, 0, 1, 0, 0, 0);
    pub const AMOUNT_OF_SUBSTANCE: Self = Self::new(0, 0, 0, 0, 0, 1, 0, 0);
    pub const CURRENT: Self = Self::new(0, 0, 0, 0, 0, 0, 1, 0);

    // ==========================================================================
    // Constructors
    // ==========================================================================

    /// Create a vector from its eight fields in canonical order
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        temperature: i32,
        time: i32,
        length: i32,
        mass: i32,
        luminous_intensity: i32,
        amount_of_substance: i32,
        current: i32,
        magnitude: i32,
    ) -> Self {
        Self {
            temperature,
            time,
            length,
            mass,
            luminous_intensity,
            amount_of_substance,
            current,
            magnitude,
        }
    }

    /// Dimensionless vector carrying only a power-of-ten scale
    pub const fn scale(magnitude: i32) -> Self {
        Self::new(0, 0, 0, 0, 0, 0, 0, magnitude)
    }

    /// The same dimensions with `delta` added to the magnitude
    pub const fn with_magnitude_offset(self, delta: i32) -> Self {
        Self {
            magnitude: self.magnitude + delta,
            ..self
        }
    }

    const fn from_array(fields: [i32; 8]) -> Self {
        Self::new(
            fields[0], fields[1], fields[2], fields[3], fields[4], fields[5], fields[6], fields[7],
        )
    }

    /// All eight fields in canonical order
    pub const fn to_array(&self) -> [i32; 8] {
        [
            self.temperature,
            self.time,
            self.length,
            self.mass,
            self.luminous_intensity,
            self.amount_of_substance,
            self.current,
            self.magnitude,
        ]
    }

    /// Exponent of a single base dimension
    pub const fn exponent(&self, dim: BaseDimension) -> i32 {
        match dim {
            BaseDimension::Temperature => self.temperature,
            BaseDimension::Time => self.time,
            BaseDimension::Length => self.length,
            BaseDimension::Mass => self.mass,
            BaseDimension::LuminousIntensity => self.luminous_intensity,
            BaseDimension::AmountOfSubstance => self.amount_of_substance,
            BaseDimension::Current => self.current,
        }
    }

    // ==========================================================================
    // Operations
    // ==========================================================================

    /// Multiply units (add all fields)
    pub const fn multiply(&self, other: &DimensionVector) -> DimensionVector {
        let (a, b) = (self.to_array(), other.to_array());
        let mut out = [0; 8];
        let mut i = 0;
        while i < 8 {
            out[i] = a[i] + b[i];
            i += 1;
        }
        Self::from_array(out)
    }

    /// Divide units (subtract all fields)
    pub const fn divide(&self, other: &DimensionVector) -> DimensionVector {
        self.multiply(&other.invert())
    }

    /// Reciprocal (negate all fields)
    pub const fn invert(&self) -> DimensionVector {
        self.power(-1)
    }

    /// Raise to an integer power (multiply all fields)
    pub const fn power(&self, n: i32) -> DimensionVector {
        let a = self.to_array();
        let mut out = [0; 8];
        let mut i = 0;
        while i < 8 {
            out[i] = a[i] * n;
            i += 1;
        }
        Self::from_array(out)
    }

    /// [`DimensionVector::power`], or `None` if any field overflows
    pub fn checked_power(&self, n: i32) -> Option<DimensionVector> {
        let mut out = [0; 8];
        for (field, value) in out.iter_mut().zip(self.to_array()) {
            *field = value.checked_mul(n)?;
        }
        Some(Self::from_array(out))
    }

    /// [`DimensionVector::multiply`], or `None` if any field overflows
    pub fn checked_multiply(&self, other: &DimensionVector) -> Option<DimensionVector> {
        let mut out = [0; 8];
        for ((field, a), b) in out.iter_mut().zip(self.to_array()).zip(other.to_array()) {
            *field = a.checked_add(b)?;
        }
        Some(Self::from_array(out))
    }

    /// [`DimensionVector::divide`], or `None` if any field overflows
    pub fn checked_divide(&self, other: &DimensionVector) -> Option<DimensionVector> {
        let mut out = [0; 8];
        for ((field, a), b) in out.iter_mut().zip(self.to_array()).zip(other.to_array()) {
            *field = a.checked_sub(b)?;
        }
        Some(Self::from_array(out))
    }

    // ==========================================================================
    // Predicates
    // ==========================================================================

    /// No base dimension has a nonzero exponent (magnitude is ignored)
    pub fn is_dimensionless(&self) -> bool {
        BaseDimension::ALL.iter().all(|d| self.exponent(*d) == 0)
    }

    /// Equal base exponents, possibly different magnitude
    pub fn same_dimensions(&self, other: &DimensionVector) -> bool {
        BaseDimension::ALL
            .iter()
            .all(|d| self.exponent(*d) == other.exponent(*d))
    }

    // ==========================================================================
    // Textual Forms
    // ==========================================================================

    /// Canonical key: `[K, s, m, g, cd, mol, A, magnitude]`
    pub fn serialize(&self) -> String {
        let fields: Vec<String> = self.to_array().iter().map(i32::to_string).collect();
        format!("[{}]", fields.join(", "))
    }

    /// Parse a canonical key produced by [`DimensionVector::serialize`].
    ///
    /// # Panics
    ///
    /// Panics if `text` does not hold exactly eight integers. Serialized keys
    /// are produced internally, so malformed input is a programming error.
    pub fn parse(text: &str) -> DimensionVector {
        match text.parse() {
            Ok(dim) => dim,
            Err(e) => panic!("malformed dimension vector `{}`: {}", text, e),
        }
    }

    /// Human-readable rendering for diagnostics, e.g. `e-3*s` or `(m**2 * g) / s`
    pub fn pretty_print(&self) -> String {
        let factor = |dim: BaseDimension, exp: i64| {
            if exp == 1 {
                dim.symbol().to_string()
            } else {
                format!("{}**{}", dim.symbol(), exp)
            }
        };
        let group = |parts: Vec<String>| {
            if parts.len() > 1 {
                format!("({})", parts.join(" * "))
            } else {
                parts.join(" * ")
            }
        };

        let numerator: Vec<String> = BaseDimension::ALL
            .iter()
            .filter(|d| self.exponent(**d) > 0)
            .map(|d| factor(*d, i64::from(self.exponent(*d))))
            .collect();
        let denominator: Vec<String> = BaseDimension::ALL
            .iter()
            .filter(|d| self.exponent(**d) < 0)
            .map(|d| factor(*d, -i64::from(self.exponent(*d))))
            .collect();

        let mut out = String::new();
        if self.magnitude != 0 {
            out.push_str(&format!("e{}*", self.magnitude));
        }
        if numerator.is_empty() {
            out.push('1');
        } else {
            out.push_str(&group(numerator));
        }
        if !denominator.is_empty() {
            out.push_str(" / ");
            out.push_str(&group(denominator));
        }
        out
    }
}

/// Error parsing a serialized dimension vector
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DimensionParseError {
    #[error("expected 8 integer fields, found {0}")]
    FieldCount(usize),
    #[error("integer field `{0}` out of range")]
    OutOfRange(String),
}

impl FromStr for DimensionVector {
    type Err = DimensionParseError;

    /// Extracts the signed integers of `text` in order; exactly eight are required.
    ///
    /// Trailing integers past the eighth are rejected rather than ignored, so
    /// a key with extra fields fails here even though its first eight parse.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut fields = Vec::with_capacity(8);
        for token in signed_integers(text) {
            let value = token
                .parse::<i32>()
                .map_err(|_| DimensionParseError::OutOfRange(token.to_string()))?;
            fields.push(value);
        }
        let fields: [i32; 8] = fields
            .as_slice()
            .try_into()
            .map_err(|_| DimensionParseError::FieldCount(fields.len()))?;
        Ok(Self::from_array(fields))
    }
}

/// Maximal `-?[0-9]+` runs of `text`
fn signed_integers(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let negative = bytes[i] == b'-' && bytes.get(i + 1).is_some_and(u8::is_ascii_digit);
        if negative || bytes[i].is_ascii_digit() {
            let start = i;
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            out.push(&text[start..i]);
        } else {
            i += 1;
        }
    }
    out
}

impl fmt::Display for DimensionVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pretty_print())
    }
}

impl Mul for DimensionVector {
    type Output = DimensionVector;

    fn mul(self, rhs: DimensionVector) -> DimensionVector {
        self.multiply(&rhs)
    }
}

impl Div for DimensionVector {
    type Output = DimensionVector;

    fn div(self, rhs: DimensionVector) -> DimensionVector {
        self.divide(&rhs)
    }
}

impl Neg for DimensionVector {
    type Output = DimensionVector;

    fn neg(self) -> DimensionVector {
        self.invert()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn volt() -> DimensionVector {
        DimensionVector::new(0, -3, 2, 1, 0, 0, -1, 3)
    }

    #[test]
    fn test_multiply_adds_fields() {
        let velocity = DimensionVector::LENGTH.divide(&DimensionVector::TIME);
        assert_eq!(velocity, DimensionVector::new(0, -1, 1, 0, 0, 0, 0, 0));

        let km = DimensionVector::LENGTH.with_magnitude_offset(3);
        let area = km.multiply(&km);
        assert_eq!(area.length, 2);
        assert_eq!(area.magnitude, 6);
    }

    #[test]
    fn test_divide_is_multiply_by_inverse() {
        let a = volt();
        let b = DimensionVector::TIME.with_magnitude_offset(-3);
        assert_eq!(a.divide(&b), a.multiply(&b.invert()));
        assert_eq!(a / b, a * -b);
    }

    #[test]
    fn test_power() {
        let ms = DimensionVector::TIME.with_magnitude_offset(-3);
        assert_eq!(ms.power(2), DimensionVector::new(0, 2, 0, 0, 0, 0, 0, -6));
        assert_eq!(ms.power(0), DimensionVector::DIMENSIONLESS);
        assert_eq!(ms.power(-1), ms.invert());
        assert_eq!(ms.checked_power(3), Some(ms.power(3)));
        assert_eq!(ms.checked_power(i32::MAX), None);
    }

    #[test]
    fn test_checked_multiply_and_divide() {
        let ms = DimensionVector::TIME.with_magnitude_offset(-3);
        assert_eq!(volt().checked_multiply(&ms), Some(volt() * ms));
        assert_eq!(volt().checked_divide(&ms), Some(volt() / ms));

        let big = DimensionVector::scale(2_000_000_000);
        assert_eq!(big.checked_multiply(&big), None);
        assert_eq!(big.checked_divide(&DimensionVector::scale(-2_000_000_000)), None);
        assert_eq!(
            DimensionVector::scale(-2_000_000_000).checked_multiply(&DimensionVector::scale(-147_483_648)),
            Some(DimensionVector::scale(i32::MIN))
        );
    }

    #[test]
    fn test_pretty_print_extreme_exponents() {
        let dim = DimensionVector::new(0, i32::MIN, 0, 0, 0, 0, 0, 0);
        assert_eq!(dim.pretty_print(), "1 / s**2147483648");
    }

    #[test]
    fn test_serialize_format() {
        let ms = DimensionVector::TIME.with_magnitude_offset(-3);
        assert_eq!(ms.serialize(), "[0, 1, 0, 0, 0, 0, 0, -3]");
        assert_eq!(
            DimensionVector::DIMENSIONLESS.serialize(),
            "[0, 0, 0, 0, 0, 0, 0, 0]"
        );
    }

    #[test]
    fn test_parse_round_trip() {
        let v = volt();
        assert_eq!(DimensionVector::parse(&v.serialize()), v);
    }

    #[test]
    fn test_parse_field_count() {
        let err = "[1, 2, 3]".parse::<DimensionVector>().unwrap_err();
        assert_eq!(err, DimensionParseError::FieldCount(3));

        let err = "1 2 3 4 5 6 7 8 9".parse::<DimensionVector>().unwrap_err();
        assert_eq!(err, DimensionParseError::FieldCount(9));
    }

    #[test]
    #[should_panic(expected = "malformed dimension vector")]
    fn test_parse_panics_on_malformed() {
        DimensionVector::parse("[0, 1]");
    }

    #[test]
    fn test_signed_integers_ignores_lone_dashes() {
        assert_eq!(signed_integers("[-1, - 2,3-4]"), vec!["-1", "2", "3", "-4"]);
    }

    #[test]
    fn test_pretty_print() {
        let ms = DimensionVector::TIME.with_magnitude_offset(-3);
        assert_eq!(ms.pretty_print(), "e-3*s");
        assert_eq!(volt().pretty_print(), "e3*(m**2 * g) / (s**3 * A)");
        assert_eq!(DimensionVector::TIME.invert().pretty_print(), "1 / s");
        assert_eq!(DimensionVector::DIMENSIONLESS.pretty_print(), "1");
        assert_eq!(DimensionVector::scale(3).pretty_print(), "e3*1");
        assert_eq!(
            DimensionVector::TIME.power(-2).pretty_print(),
            "1 / s**2"
        );
    }

    #[test]
    fn test_same_dimensions_ignores_magnitude() {
        let mv = volt().with_magnitude_offset(-3);
        assert!(mv.same_dimensions(&volt()));
        assert!(!mv.same_dimensions(&DimensionVector::TIME));
        assert!(DimensionVector::scale(-6).is_dimensionless());
    }
}
