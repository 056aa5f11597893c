use crate::units::error::ParseError;
use crate::units::parser::{parse_units, KnownUnits};
use crate::units::quantity::Quantity;
use crate::units::unit::{prefix_letter, Unit, Units};
use serde::{Deserialize, Serialize};
use std::fmt;

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.magnitude != 0 {
            match prefix_letter(self.magnitude) {
                Some(letter) => write!(f, "{}", letter)?,
                // Only reachable for hand-built units; the parser never produces it.
                None => write!(f, "[1e{}]", self.magnitude)?,
            }
        }
        write!(f, "{}", self.name)?;
        if self.power != 1 {
            write!(f, "{}", self.power)?;
        }
        Ok(())
    }
}

/// Canonical text: numerator terms by descending power, then `/` and the
/// denominator terms with positive powers. Equal powers are ordered by name so
/// equal units always render identically.
impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries = self.simplify().entries().to_vec();
        entries.sort_by(|a, b| {
            b.power
                .cmp(&a.power)
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.magnitude.cmp(&b.magnitude))
        });

        let split = entries
            .iter()
            .position(|u| u.power < 0)
            .unwrap_or(entries.len());
        let (numerator, denominator) = entries.split_at(split);

        let numerator: Vec<String> = numerator.iter().map(Unit::to_string).collect();
        write!(f, "{}", numerator.join(" "))?;

        if !denominator.is_empty() {
            let denominator: Vec<String> = denominator
                .iter()
                .map(|u| Unit::with_magnitude(u.name.clone(), -u.power, u.magnitude).to_string())
                .collect();
            write!(f, "/{}", denominator.join(" "))?;
        }
        Ok(())
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.units.is_dimensionless() {
            write!(f, "{}", self.value)
        } else {
            write!(f, "{} {}", self.value, self.units)
        }
    }
}

impl Quantity {
    /// Render with `digits` significant digits, switching to exponent notation
    /// outside `[1e-3, 1e6)`.
    pub fn to_string_precision(&self, digits: usize) -> String {
        let value = format_significant(self.value, digits);
        if self.units.is_dimensionless() {
            value
        } else {
            format!("{} {}", value, self.units)
        }
    }

    pub fn to_record(&self) -> QuantityRecord {
        QuantityRecord {
            value: self.value,
            units: self.units.to_string(),
        }
    }

    pub fn from_record<K: KnownUnits + ?Sized>(
        record: &QuantityRecord,
        known: &K,
    ) -> Result<Quantity, ParseError> {
        Ok(Quantity::new(record.value, parse_units(&record.units, known)?.simplify()))
    }
}

/// The `{value, units}` form handed to the ingestion layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantityRecord {
    pub value: f64,
    pub units: String,
}

pub fn format_significant(value: f64, digits: usize) -> String {
    let digits = digits.max(1);
    if value == 0.0 || !value.is_finite() {
        return format!("{}", value);
    }
    let exponent = value.abs().log10().floor() as i32;
    if (-3..6).contains(&exponent) {
        let decimals = (digits as i32 - 1 - exponent).max(0) as usize;
        format!("{:.*}", decimals, value)
    } else {
        format!("{:.*e}", digits - 1, value)
    }
}

/// A positive number split as `base × 10^magnitude`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scientific {
    pub magnitude: i32,
    /// `base` rounded to the nearest integer.
    pub digit: i64,
    /// `base` with `precision - 1` decimals.
    pub base: String,
}

/// Returns `None` for zero, negative and non-finite values.
pub fn scientific(value: f64, precision: usize) -> Option<Scientific> {
    if !(value.is_finite() && value > 0.0) {
        return None;
    }
    let magnitude = value.log10().floor() as i32;
    let base = value / 10f64.powi(magnitude);
    Some(Scientific {
        magnitude,
        digit: base.round() as i64,
        base: format!("{:.*}", precision.saturating_sub(1), base),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN: [&str; 6] = ["m", "s", "kg", "K", "h", "g"];

    fn units(expr: &str) -> Units {
        parse_units(expr, &KNOWN[..]).unwrap()
    }

    #[test]
    fn test_format_units() {
        assert_eq!(units("m").to_string(), "m");
        assert_eq!(units("m/s").to_string(), "m/s");
        assert_eq!(units("s-2 m kg m").to_string(), "m2 kg/s2");
        assert_eq!(units("km2/h").to_string(), "km2/h");
        assert_eq!(units("/s").to_string(), "/s");
        assert_eq!(units("m/m").to_string(), "");
        assert_eq!(units("mg/m3 s").to_string(), "mg/s m3");
    }

    #[test]
    fn test_format_is_canonical() {
        assert_eq!(units("kg m2").to_string(), units("m2 kg").to_string());
    }

    #[test]
    fn test_format_round_trips() {
        for expr in ["kg m2/s2", "km/h", "ug/m3", "K", "/s", "m s", "mg2 s-1 h"] {
            let original = units(expr);
            let reparsed = units(&original.to_string());
            assert_eq!(reparsed, original, "round trip of {}", expr);
        }
    }

    #[test]
    fn test_format_quantity() {
        let q = Quantity::new(3.0e8, units("m/s"));
        assert_eq!(q.to_string(), "300000000 m/s");
        assert_eq!(q.to_string_precision(2), "3.0e8 m/s");
        assert_eq!(Quantity::dimensionless(12.0).to_string(), "12");
        assert_eq!(
            Quantity::new(273.15, units("K")).to_string_precision(3),
            "273 K"
        );
    }

    #[test]
    fn test_format_significant() {
        assert_eq!(format_significant(0.00123456, 3), "0.00123");
        assert_eq!(format_significant(1.5e-7, 2), "1.5e-7");
        assert_eq!(format_significant(42.0, 4), "42.00");
        assert_eq!(format_significant(0.0, 3), "0");
    }

    #[test]
    fn test_record() {
        let q = Quantity::new(9.81, units("m/s2"));
        let record = q.to_record();
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            serde_json::json!({"value": 9.81, "units": "m/s2"})
        );
        let back = Quantity::from_record(&record, &KNOWN[..]).unwrap();
        assert_eq!(back, q);
    }

    #[test]
    fn test_scientific() {
        let s = scientific(3.0e8, 2).unwrap();
        assert_eq!(s.magnitude, 8);
        assert_eq!(s.digit, 3);
        assert_eq!(s.base, "3.0");

        let s = scientific(0.0072, 1).unwrap();
        assert_eq!(s.magnitude, -3);
        assert_eq!(s.digit, 7);
        assert_eq!(s.base, "7");

        assert!(scientific(0.0, 2).is_none());
        assert!(scientific(-5.0, 2).is_none());
    }
}
