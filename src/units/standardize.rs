//! Reduce a quantity's units to base units by repeated substitution.
//!
//! Each step either applies one affine hop (only when the units are a single
//! unprefixed unit at power 1) or multiplies the quantity by a *simplifier*
//! that folds SI prefixes into the value and replaces every equivalence-defined
//! unit by its expansion. A quantity is standard once no step applies.

use crate::units::error::StandardizeError;
use crate::units::quantity::Quantity;
use crate::units::table::{ConversionTable, TableEntry};
use crate::units::unit::{Unit, Units};
use log::debug;

pub const DEFAULT_MAX_ITERATIONS: usize = 100;

pub fn standardize(
    quantity: &Quantity,
    table: &ConversionTable,
) -> Result<Quantity, StandardizeError> {
    standardize_with_limit(quantity, table, DEFAULT_MAX_ITERATIONS)
}

/// Like [`standardize`], giving up with [`StandardizeError::CycleDetected`]
/// after `max_iterations` rewrite steps.
pub fn standardize_with_limit(
    quantity: &Quantity,
    table: &ConversionTable,
    max_iterations: usize,
) -> Result<Quantity, StandardizeError> {
    let mut current = Quantity {
        units: quantity.units.simplify(),
        ..quantity.clone()
    };

    for step in 0..max_iterations {
        if let Some(name) = current.units.single() {
            if let Some(TableEntry::Affine(conversion)) = table.get(&name) {
                debug!("step {}: affine {} -> {}", step, name, conversion.to);
                current = conversion.apply(&current);
                continue;
            }
        }

        match simplifier(&current.units, table) {
            Some(factor) => {
                debug!("step {}: {} * ({})", step, current, factor);
                current = current.multiply(&factor);
            }
            None => return Ok(current),
        }
    }

    Err(StandardizeError::CycleDetected {
        iterations: max_iterations,
        units: current.units.to_string(),
    })
}

/// The product of every applicable substitution, or `None` when the units are
/// already standard.
fn simplifier(units: &Units, table: &ConversionTable) -> Option<Quantity> {
    let mut factor = Quantity::dimensionless(1.0);
    let mut substituted = false;

    for unit in units.iter() {
        if unit.magnitude != 0 {
            // 10^(magnitude·power) · unit^power / (prefixed unit)^power
            let fold = Quantity::new(
                10f64.powi(unit.magnitude.saturating_mul(unit.power)),
                Units::from_entries(vec![
                    unit.unprefixed(),
                    Unit::with_magnitude(unit.name.clone(), unit.power.saturating_neg(), unit.magnitude),
                ]),
            );
            factor = factor.multiply(&fold);
            substituted = true;
            continue;
        }

        match table.get(&unit.name) {
            Some(TableEntry::Equivalence(expansion)) => {
                factor = factor.multiply(&expansion.power(unit.power));
                substituted = true;
            }
            Some(_) => {}
            None => debug!("'{}' has no table entry, keeping it as a base unit", unit.name),
        }
    }

    substituted.then_some(factor)
}
