use crate::config::TableConfig;
use crate::units::error::{ParseError, StandardizeError, TableError};
use crate::units::parser::{parse_quantity, parse_units, KnownUnits};
use crate::units::quantity::Quantity;
use crate::units::standardize::standardize;
use crate::units::unit::Units;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Affine conversion `value' = (value + offset) * ratio`, e.g. Fahrenheit to Celsius.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Conversion {
    pub to: String,
    #[serde(default)]
    pub offset: f64,
    pub ratio: f64,
}

impl Conversion {
    pub fn new(to: impl Into<String>, offset: f64, ratio: f64) -> Self {
        Self {
            to: to.into(),
            offset,
            ratio,
        }
    }

    pub fn apply(&self, quantity: &Quantity) -> Quantity {
        Quantity::with_uncertainty(
            (quantity.value + self.offset) * self.ratio,
            Units::unit(self.to.clone()),
            quantity.uncertainty * self.ratio.abs(),
        )
    }
}

/// How a unit is declared before the table is built.
#[derive(Debug, Clone, PartialEq)]
pub enum UnitDefinition {
    Base,
    /// One unit of this name, written as a quantity string ("0.3048 m").
    Expression(String),
    Quantity(Quantity),
    Conversion(Conversion),
}

/// A resolved table entry.
#[derive(Debug, Clone, PartialEq)]
pub enum TableEntry {
    Base,
    /// Stored divided by the unit itself, so `entry^p` substitutes `unit^p`.
    Equivalence(Quantity),
    Affine(Conversion),
}

/// Read-only mapping from unit name to its definition.
#[derive(Debug, Clone, Default)]
pub struct ConversionTable {
    entries: HashMap<String, TableEntry>,
}

impl ConversionTable {
    /// Build a table from unit definitions. Every equivalence is parsed
    /// against the full set of names, so definitions may refer to each other
    /// in any order.
    pub fn build<I, S>(definitions: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = (S, UnitDefinition)>,
        S: Into<String>,
    {
        let definitions: Vec<(String, UnitDefinition)> = definitions
            .into_iter()
            .map(|(name, definition)| (name.into(), definition))
            .collect();
        let names: HashSet<String> = definitions.iter().map(|(name, _)| name.clone()).collect();

        let mut entries = HashMap::with_capacity(definitions.len());
        for (name, definition) in definitions {
            let entry = match definition {
                UnitDefinition::Base => TableEntry::Base,
                UnitDefinition::Expression(expr) => {
                    let quantity = parse_quantity(&expr, &names).map_err(|source| {
                        TableError::InvalidEquivalence {
                            name: name.clone(),
                            source,
                        }
                    })?;
                    equivalence(&name, quantity, &names)?
                }
                UnitDefinition::Quantity(quantity) => equivalence(&name, quantity, &names)?,
                UnitDefinition::Conversion(conversion) => {
                    if !names.contains(&conversion.to) {
                        return Err(TableError::UnknownTarget {
                            name,
                            target: conversion.to,
                        });
                    }
                    if conversion.ratio == 0.0 || !conversion.ratio.is_finite() {
                        return Err(TableError::InvalidConversion {
                            name,
                            ratio: conversion.ratio,
                        });
                    }
                    TableEntry::Affine(conversion)
                }
            };
            entries.insert(name, entry);
        }

        log::debug!("built conversion table with {} units", entries.len());
        Ok(Self { entries })
    }

    /// The default table shipped with the crate.
    pub fn builtin() -> Result<Self, TableError> {
        TableConfig::builtin()?.build_table()
    }

    pub fn get(&self, name: &str) -> Option<&TableEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by unit name.
    pub fn entries(&self) -> Vec<(&str, &TableEntry)> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|(name, entry)| (name.as_str(), entry))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    pub fn parse_units(&self, expr: &str) -> Result<Units, ParseError> {
        parse_units(expr, self)
    }

    pub fn parse_quantity(&self, text: &str) -> Result<Quantity, ParseError> {
        parse_quantity(text, self)
    }

    pub fn standardize(&self, quantity: &Quantity) -> Result<Quantity, StandardizeError> {
        standardize(quantity, self)
    }
}

impl KnownUnits for ConversionTable {
    fn is_known(&self, name: &str) -> bool {
        self.contains(name)
    }
}

fn equivalence(
    name: &str,
    quantity: Quantity,
    names: &HashSet<String>,
) -> Result<TableEntry, TableError> {
    if let Some(unknown) = quantity.units.iter().find(|u| !names.contains(&u.name)) {
        return Err(TableError::UnknownUnit {
            name: name.to_string(),
            unit: unknown.name.clone(),
        });
    }
    let one = Quantity::new(1.0, Units::unit(name));
    Ok(TableEntry::Equivalence(quantity.divide(&one)))
}
