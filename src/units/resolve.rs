//! Unit name resolution
//!
//! Turns a unit token such as `ms`, `mV` or `e3` into a dimension vector.
//! Resolution order:
//!
//! 1. prefix + unit name (`ms`, `kOhm`), first prefix in catalogue order wins
//! 2. explicit magnitude (`e3`, `e-6`)
//! 3. bare unit name (`s`, `V`)
//! 4. a serialized vector (`[0, 1, 0, 0, 0, 0, 0, -3]`)
//!
//! A token that several prefix/unit splits accept resolves to whichever
//! prefix comes first in the catalogue; there is no longest-match rule.

use super::catalogue::UnitCatalogue;
use super::dimension::DimensionVector;
use thiserror::Error;

/// A token of the form `e<int>` whose integer part does not parse
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{name}` is not a valid magnitude")]
pub struct MalformedMagnitude {
    pub name: String,
}

/// Resolve a unit token against the standard SI catalogue
pub fn resolve_unit(name: &str) -> Option<DimensionVector> {
    resolve_unit_in(UnitCatalogue::standard(), name)
}

/// Resolve a unit token against `catalogue`.
///
/// Returns `None` for unknown names; reporting is up to the caller.
///
/// # Panics
///
/// Panics if the token starts with `e` followed by a sign or digit but the
/// rest is not a valid integer (e.g. `e3x`). Use [`try_resolve_unit_in`]
/// for tokens taken straight from user input.
pub fn resolve_unit_in(catalogue: &UnitCatalogue, name: &str) -> Option<DimensionVector> {
    match try_resolve_unit_in(catalogue, name) {
        Ok(dim) => dim,
        Err(e) => panic!("{}", e),
    }
}

/// Like [`resolve_unit_in`], but reports a malformed magnitude as an error
pub fn try_resolve_unit_in(
    catalogue: &UnitCatalogue,
    name: &str,
) -> Result<Option<DimensionVector>, MalformedMagnitude> {
    if let Some(dim) = resolve_prefixed(catalogue, name) {
        return Ok(Some(dim));
    }

    if let Some(magnitude) = explicit_magnitude(name)? {
        return Ok(Some(DimensionVector::scale(magnitude)));
    }

    if let Some(dim) = catalogue.base_unit(name) {
        return Ok(Some(dim));
    }

    match name.parse::<DimensionVector>() {
        Ok(dim) => Ok(Some(dim)),
        Err(e) => {
            tracing::trace!("`{}` is not a unit: {}", name, e);
            Ok(None)
        }
    }
}

fn resolve_prefixed(catalogue: &UnitCatalogue, name: &str) -> Option<DimensionVector> {
    catalogue.prefixes().find_map(|prefix| {
        let unit = catalogue.base_unit(name.strip_prefix(prefix)?)?;
        let magnitude = catalogue.prefix_magnitude(prefix)?;
        Some(unit.with_magnitude_offset(magnitude))
    })
}

/// Magnitude of an `e<int>` token, `None` if the token is not in that form
fn explicit_magnitude(name: &str) -> Result<Option<i32>, MalformedMagnitude> {
    let Some(digits) = name.strip_prefix('e') else {
        return Ok(None);
    };
    match digits.chars().next() {
        Some(c) if c.is_ascii_digit() || c == '-' || c == '+' => {}
        _ => return Ok(None),
    }
    digits.parse::<i32>().map(Some).map_err(|_| MalformedMagnitude {
        name: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixed_unit() {
        let ms = resolve_unit("ms").unwrap();
        assert_eq!(ms, DimensionVector::TIME.with_magnitude_offset(-3));

        let kg = resolve_unit("kg").unwrap();
        assert_eq!(kg.mass, 1);
        assert_eq!(kg.magnitude, 3);
    }

    #[test]
    fn test_prefixed_derived_unit() {
        // V already carries e3 from the kilogram
        let mv = resolve_unit("mV").unwrap();
        assert_eq!(mv.magnitude, 0);
        assert_eq!(mv.time, -3);

        let mu_a = resolve_unit("muA").unwrap();
        assert_eq!(mu_a, DimensionVector::CURRENT.with_magnitude_offset(-6));
        assert_eq!(resolve_unit("uA"), Some(mu_a));
    }

    #[test]
    fn test_explicit_magnitude() {
        assert_eq!(resolve_unit("e3"), Some(DimensionVector::scale(3)));
        assert_eq!(resolve_unit("e-6"), Some(DimensionVector::scale(-6)));
        assert_eq!(resolve_unit("e+2"), Some(DimensionVector::scale(2)));
    }

    #[test]
    #[should_panic(expected = "not a valid magnitude")]
    fn test_malformed_magnitude_panics() {
        resolve_unit("e3x");
    }

    #[test]
    fn test_try_resolve_reports_malformed_magnitude() {
        let err = try_resolve_unit_in(UnitCatalogue::standard(), "e1x").unwrap_err();
        assert_eq!(err.name, "e1x");
        assert_eq!(
            try_resolve_unit_in(UnitCatalogue::standard(), "e-3"),
            Ok(Some(DimensionVector::scale(-3)))
        );
    }

    #[test]
    fn test_bare_names() {
        assert_eq!(resolve_unit("s"), Some(DimensionVector::TIME));
        assert_eq!(resolve_unit("m"), Some(DimensionVector::LENGTH));
        assert_eq!(resolve_unit("e"), Some(DimensionVector::DIMENSIONLESS));
        // `T` is tesla, not a dangling tera prefix
        assert_eq!(resolve_unit("T").map(|t| t.current), Some(-1));
        // `mol` is not milli-`ol`
        assert_eq!(resolve_unit("mol"), Some(DimensionVector::AMOUNT_OF_SUBSTANCE));
    }

    #[test]
    fn test_serialized_fallback() {
        let key = "[0, 2, 0, 0, 0, 0, 0, -6]";
        assert_eq!(
            resolve_unit(key),
            Some(DimensionVector::new(0, 2, 0, 0, 0, 0, 0, -6))
        );
    }

    #[test]
    fn test_unknown_names() {
        assert_eq!(resolve_unit("foo"), None);
        assert_eq!(resolve_unit("eV"), None);
        assert_eq!(resolve_unit(""), None);
        assert_eq!(resolve_unit("ms2"), None);
    }

    #[test]
    fn test_first_prefix_wins() {
        let mut catalogue = UnitCatalogue::empty();
        catalogue.add_prefix("m", -3);
        catalogue.add_prefix("mi", -6);
        catalogue.add_unit("is", DimensionVector::LENGTH);
        catalogue.add_unit("s", DimensionVector::TIME);

        // "mis" splits as m+is and mi+s; declaration order picks m+is
        let dim = resolve_unit_in(&catalogue, "mis").unwrap();
        assert_eq!(dim, DimensionVector::LENGTH.with_magnitude_offset(-3));
    }
}
