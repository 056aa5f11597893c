use crate::units::{Conversion, ConversionTable, Quantity, TableError, UnitDefinition};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

const BUILTIN_TABLE: &str = include_str!("../../config/units.toml");

/// Conversion table as written in TOML.
///
/// ```toml
/// base = ["m", "s", "K"]
///
/// [equivalences]
/// ft = "0.3048 m"
/// dozen = 12
///
/// [conversions]
/// C = { to = "K", offset = 273.15, ratio = 1.0 }
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TableConfig {
    // Units with no further rewriting
    #[serde(default)]
    pub base: Vec<String>,

    #[serde(default)]
    pub equivalences: BTreeMap<String, EquivalenceValue>,

    // Affine conversions, keyed by the unit they convert from
    #[serde(default)]
    pub conversions: BTreeMap<String, Conversion>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum EquivalenceValue {
    // A quantity string: "0.3048 m"
    Expression(String),
    // A plain factor for dimensionless aliases: dozen = 12
    Factor(f64),
}

impl TableConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, TableError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, TableError> {
        let config: TableConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// The table shipped in `config/units.toml`.
    pub fn builtin() -> Result<Self, TableError> {
        Self::from_toml_str(BUILTIN_TABLE)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Flatten the three sections into one definition per unit name.
    pub fn definitions(&self) -> Result<Vec<(String, UnitDefinition)>, TableError> {
        let mut seen = HashSet::new();
        let mut definitions = Vec::new();

        let base = self
            .base
            .iter()
            .map(|name| (name, UnitDefinition::Base));
        let equivalences = self.equivalences.iter().map(|(name, value)| {
            let definition = match value {
                EquivalenceValue::Expression(expr) => UnitDefinition::Expression(expr.clone()),
                EquivalenceValue::Factor(factor) => {
                    UnitDefinition::Quantity(Quantity::dimensionless(*factor))
                }
            };
            (name, definition)
        });
        let conversions = self
            .conversions
            .iter()
            .map(|(name, conversion)| (name, UnitDefinition::Conversion(conversion.clone())));

        for (name, definition) in base.chain(equivalences).chain(conversions) {
            if !seen.insert(name.clone()) {
                return Err(TableError::DuplicateUnit(name.clone()));
            }
            definitions.push((name.clone(), definition));
        }
        Ok(definitions)
    }

    pub fn build_table(&self) -> Result<ConversionTable, TableError> {
        ConversionTable::build(self.definitions()?)
    }
}
