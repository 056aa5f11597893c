use crate::ingest::error::IngestError;
use crate::ingest::models::{Measurement, ParsedField};
use crate::units::{ConversionTable, Quantity};
use lazy_static::lazy_static;
use log::{debug, warn};
use regex::Regex;

lazy_static! {
    /// `(<name>:)? <number>(-<number>)* <unit>? (<note>)?`
    /// Examples: "330 m", "max: 10.9 km", "1.5-2 m", "8e9 (est.)"
    static ref CELL_PATTERN: Regex = Regex::new(
        r"^(?:(.*):)?\s*(-?(?:0|[1-9]\d*)(?:\.\d+)?(?:[eE][+-]?\d+)?)((?:-(?:0|[1-9]\d*)(?:\.\d+)?(?:[eE][+-]?\d+)?)*)\s*(\S*)\s*(\(.*\))?$"
    ).unwrap();
}

/// Parse and standardize a single cell. Kind and thing are left empty.
pub fn parse_cell(cell: &str, table: &ConversionTable) -> Result<Measurement, IngestError> {
    let cell = cell.trim();
    let caps = CELL_PATTERN
        .captures(cell)
        .ok_or_else(|| IngestError::Malformed(cell.to_string()))?;

    if caps.get(3).is_some_and(|range| !range.as_str().is_empty()) {
        return Err(IngestError::Range(cell.to_string()));
    }

    let number = caps.get(2).map_or("", |m| m.as_str());
    let value: f64 = number
        .parse()
        .map_err(|_| IngestError::InvalidNumber(cell.to_string()))?;
    if value == 0.0 {
        return Err(IngestError::ZeroValue(cell.to_string()));
    }

    let unit = caps.get(4).map_or("", |m| m.as_str());
    let units = table.parse_units(unit).map_err(|source| IngestError::Unit {
        cell: cell.to_string(),
        source,
    })?;
    let value = table
        .standardize(&Quantity::new(value, units))
        .map_err(|source| IngestError::Standardize {
            cell: cell.to_string(),
            source,
        })?;

    let mut measurement = Measurement::new(value);
    measurement.name = caps
        .get(1)
        .map_or("", |m| m.as_str())
        .trim()
        .to_lowercase();
    measurement.note = caps
        .get(5)
        .map_or("", |m| m.as_str())
        .trim_start_matches('(')
        .trim_end_matches(')')
        .trim()
        .to_string();
    measurement.original = cell.to_string();
    Ok(measurement)
}

/// Parse a comma-separated field. Cells that fail to parse are collected in
/// `broken`; a standardization failure aborts the field.
pub fn parse_field(
    field: &str,
    kind: &str,
    thing: &str,
    table: &ConversionTable,
) -> Result<ParsedField, IngestError> {
    let mut parsed = ParsedField::default();

    for cell in field.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        match parse_cell(cell, table) {
            Ok(mut measurement) => {
                measurement.kind = kind.to_string();
                measurement.thing = thing.to_string();
                debug!("{}/{}: '{}' -> {}", thing, kind, cell, measurement.value);
                parsed.measurements.push(measurement);
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!("{}/{}: {}", thing, kind, e);
                parsed.broken.push(cell.to_string());
            }
        }
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::UnitDefinition;
    use approx::assert_relative_eq;

    fn table() -> ConversionTable {
        ConversionTable::builtin().unwrap()
    }

    #[test]
    fn test_plain_cell() {
        let m = parse_cell("330 m", &table()).unwrap();
        assert_eq!(m.value.value, 330.0);
        assert_eq!(m.value.units.to_string(), "m");
        assert!(m.name.is_empty());
        assert_eq!(m.original, "330 m");
    }

    #[test]
    fn test_named_cell_with_note() {
        let m = parse_cell("Max Depth: 10.9 km (Challenger Deep)", &table()).unwrap();
        assert_eq!(m.name, "max depth");
        assert_eq!(m.note, "Challenger Deep");
        assert_relative_eq!(m.value.value, 10900.0, max_relative = 1e-12);
    }

    #[test]
    fn test_unitless_cell() {
        let m = parse_cell("8e9", &table()).unwrap();
        assert_eq!(m.value.value, 8e9);
        assert!(m.value.is_dimensionless());
    }

    #[test]
    fn test_range_rejected() {
        assert!(matches!(
            parse_cell("1.5-2 m", &table()),
            Err(IngestError::Range(_))
        ));
    }

    #[test]
    fn test_zero_rejected() {
        assert!(matches!(
            parse_cell("0 m", &table()),
            Err(IngestError::ZeroValue(_))
        ));
    }

    #[test]
    fn test_text_rejected() {
        assert!(matches!(
            parse_cell("about a mile", &table()),
            Err(IngestError::Malformed(_))
        ));
    }

    #[test]
    fn test_field_collects_broken_cells() {
        let parsed = parse_field("1 mi, 2-3 km, 5 ft", "length", "road", &table()).unwrap();
        assert_eq!(parsed.measurements.len(), 2);
        assert_eq!(parsed.broken, vec!["2-3 km"]);
        assert!(parsed
            .measurements
            .iter()
            .all(|m| m.kind == "length" && m.thing == "road"));
        assert_relative_eq!(parsed.measurements[0].value.value, 1609.344, max_relative = 1e-12);
    }

    #[test]
    fn test_huge_exponent_is_a_broken_cell() {
        assert!(matches!(
            parse_cell("1 km1000000000", &table()),
            Err(IngestError::Unit { .. })
        ));
        let parsed = parse_field("1 km1000000000, 2 km", "length", "road", &table()).unwrap();
        assert_eq!(parsed.broken, vec!["1 km1000000000"]);
        assert_eq!(parsed.measurements.len(), 1);
    }

    #[test]
    fn test_field_cycle_is_fatal() {
        let table = ConversionTable::build([
            ("a", UnitDefinition::Expression("2 b".to_string())),
            ("b", UnitDefinition::Expression("3 a".to_string())),
        ])
        .unwrap();
        let result = parse_field("1 a", "length", "loop", &table);
        assert!(matches!(result, Err(IngestError::Standardize { .. })));
    }
}
