use crate::units::error::ParseError;
use crate::units::parser::{parse_quantity, KnownUnits};
use crate::units::unit::Units;
use std::ops::{Div, Mul};

/// A numeric value tagged with units and an absolute uncertainty.
#[derive(Debug, Clone, PartialEq)]
pub struct Quantity {
    pub value: f64,
    pub units: Units,
    pub uncertainty: f64,
}

impl Quantity {
    pub fn new(value: f64, units: Units) -> Self {
        Self {
            value,
            units,
            uncertainty: 0.0,
        }
    }

    pub fn with_uncertainty(value: f64, units: Units, uncertainty: f64) -> Self {
        Self {
            value,
            units,
            uncertainty: uncertainty.abs(),
        }
    }

    pub fn dimensionless(value: f64) -> Self {
        Self::new(value, Units::dimensionless())
    }

    /// Parses `"<number>? <unit expression>"`, e.g. `"3.0e8 m/s"`.
    pub fn parse<K: KnownUnits + ?Sized>(text: &str, known: &K) -> Result<Self, ParseError> {
        parse_quantity(text, known)
    }

    pub fn is_dimensionless(&self) -> bool {
        self.units.is_dimensionless()
    }

    pub fn multiply(&self, other: &Quantity) -> Quantity {
        // First-order propagation: σ(ab)² = (σa·b)² + (a·σb)²
        // An exact side contributes nothing, even against an infinite value.
        let term = |sigma: f64, value: f64| if sigma == 0.0 { 0.0 } else { sigma * value };
        let uncertainty =
            term(self.uncertainty, other.value).hypot(term(other.uncertainty, self.value));
        Quantity {
            value: self.value * other.value,
            units: self.units.multiply(&other.units),
            uncertainty,
        }
    }

    pub fn divide(&self, other: &Quantity) -> Quantity {
        self.multiply(&other.power(-1))
    }

    pub fn power(&self, p: i32) -> Quantity {
        let uncertainty = if self.uncertainty == 0.0 {
            0.0
        } else {
            (f64::from(p) * self.value.powi(p.saturating_sub(1))).abs() * self.uncertainty
        };
        Quantity {
            value: self.value.powi(p),
            units: self.units.power(p),
            uncertainty,
        }
    }

    /// Multiplies by an exact dimensionless factor.
    pub fn scale(&self, factor: f64) -> Quantity {
        Quantity {
            value: self.value * factor,
            units: self.units.clone(),
            uncertainty: self.uncertainty * factor.abs(),
        }
    }

    /// Approximate equality: identical units, same sign, and the larger
    /// magnitude within a factor of `1 + eps` of the smaller one.
    ///
    /// Units are compared as-is; standardize both sides first if they may be
    /// expressed differently.
    pub fn close(&self, other: &Quantity, eps: f64) -> bool {
        if self.units != other.units {
            return false;
        }
        if self.value == 0.0 || other.value == 0.0 {
            return false;
        }
        if self.value.is_sign_positive() != other.value.is_sign_positive() {
            return false;
        }
        let a = self.value.abs();
        let b = other.value.abs();
        a.max(b) / a.min(b) < 1.0 + eps
    }
}

impl Mul for &Quantity {
    type Output = Quantity;

    fn mul(self, rhs: &Quantity) -> Quantity {
        self.multiply(rhs)
    }
}

impl Mul for Quantity {
    type Output = Quantity;

    fn mul(self, rhs: Quantity) -> Quantity {
        self.multiply(&rhs)
    }
}

impl Div for &Quantity {
    type Output = Quantity;

    fn div(self, rhs: &Quantity) -> Quantity {
        self.divide(rhs)
    }
}

impl Div for Quantity {
    type Output = Quantity;

    fn div(self, rhs: Quantity) -> Quantity {
        self.divide(&rhs)
    }
}

impl Mul<f64> for &Quantity {
    type Output = Quantity;

    fn mul(self, rhs: f64) -> Quantity {
        self.scale(rhs)
    }
}

impl Div<f64> for &Quantity {
    type Output = Quantity;

    fn div(self, rhs: f64) -> Quantity {
        self.scale(1.0 / rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::unit::Unit;
    use approx::assert_relative_eq;

    fn meters(value: f64) -> Quantity {
        Quantity::new(value, Units::unit("m"))
    }

    fn seconds(value: f64) -> Quantity {
        Quantity::new(value, Units::unit("s"))
    }

    #[test]
    fn test_multiply_and_divide() {
        let speed = &meters(100.0) / &seconds(20.0);
        assert_relative_eq!(speed.value, 5.0);
        assert_eq!(
            speed.units,
            Units::from_entries(vec![Unit::new("m", 1), Unit::new("s", -1)])
        );

        let distance = &speed * &seconds(4.0);
        assert_relative_eq!(distance.value, 20.0);
        assert_eq!(distance.units, Units::unit("m"));
    }

    #[test]
    fn test_power() {
        let volume = meters(3.0).power(3);
        assert_relative_eq!(volume.value, 27.0);
        assert_eq!(volume.units.entries(), &[Unit::new("m", 3)]);

        let inverse = meters(4.0).power(-1);
        assert_relative_eq!(inverse.value, 0.25);
        assert_eq!(inverse.units.entries(), &[Unit::new("m", -1)]);
    }

    #[test]
    fn test_uncertainty_propagation() {
        let a = Quantity::with_uncertainty(10.0, Units::unit("m"), 0.1);
        let b = Quantity::with_uncertainty(2.0, Units::unit("s"), 0.0);

        let product = &a * &b;
        assert_relative_eq!(product.uncertainty, 0.2);

        let squared = a.power(2);
        assert_relative_eq!(squared.uncertainty, 2.0);

        let halved = &a / 2.0;
        assert_relative_eq!(halved.uncertainty, 0.05);

        assert_eq!(meters(5.0).power(-2).uncertainty, 0.0);
    }

    #[test]
    fn test_close() {
        assert!(meters(100.0).close(&meters(100.0001), 1e-3));
        assert!(meters(100.0001).close(&meters(100.0), 1e-3));
        assert!(!meters(100.0).close(&meters(101.0), 1e-3));
        assert!(meters(-50.0).close(&meters(-50.01), 1e-3));
    }

    #[test]
    fn test_close_unit_mismatch_is_false() {
        assert!(!meters(100.0).close(&seconds(100.0), 1e-3));
    }

    #[test]
    fn test_close_sign_and_zero_guards() {
        assert!(!meters(1.0).close(&meters(-1.0), 1e-3));
        assert!(!meters(0.0).close(&meters(0.0), 1e-3));
        assert!(!meters(0.0).close(&meters(1e-12), 1e-3));
    }
}
