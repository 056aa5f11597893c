use crate::units::{Quantity, QuantityRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One standardized measurement of a thing.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub value: Quantity,
    // ie max depth, radius; empty for the canonical value
    pub name: String,
    // ie length, volume, density
    pub kind: String,
    // ie Eiffel tower, Pacific ocean
    pub thing: String,
    pub note: String,
    // The cell text this measurement was parsed from
    pub original: String,
}

impl Measurement {
    pub fn new(value: Quantity) -> Self {
        Self {
            value,
            name: String::new(),
            kind: String::new(),
            thing: String::new(),
            note: String::new(),
            original: String::new(),
        }
    }

    /// Identity of a measurement across runs: (thing, kind, name).
    pub fn key(&self) -> (&str, &str, &str) {
        (&self.thing, &self.kind, &self.name)
    }

    pub fn to_record(&self) -> MeasurementRecord {
        MeasurementRecord {
            value: self.value.to_record(),
            name: self.name.clone(),
            kind: self.kind.clone(),
            thing: self.thing.clone(),
            note: self.note.clone(),
        }
    }
}

impl Serialize for Measurement {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_record().serialize(serializer)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub value: QuantityRecord,
    pub name: String,
    pub kind: String,
    pub thing: String,
    pub note: String,
}

/// Measurements parsed from one comma-separated field.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParsedField {
    pub measurements: Vec<Measurement>,
    pub broken: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Thing {
    pub name: String,
    // ie sphere, building
    pub tags: Vec<String>,
    // kind -> measurements
    pub values: BTreeMap<String, Vec<Measurement>>,
    // kind -> cells that could not be parsed
    pub broken: BTreeMap<String, Vec<String>>,
    // Free-text attributes (image links, descriptions)
    pub attributes: BTreeMap<String, String>,
}

impl Thing {
    pub fn new(name: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            name: name.into(),
            tags,
            ..Default::default()
        }
    }

    /// The canonical measurement of a kind: the unnamed one, or the only one
    /// when `single` is set.
    pub fn canonical(&self, kind: &str, single: bool) -> Option<&Measurement> {
        let values = self.values.get(kind)?;
        if single && values.len() == 1 {
            return values.first();
        }
        values.iter().find(|m| m.name.is_empty())
    }

    pub fn add(&mut self, mut measurement: Measurement) {
        measurement.thing = self.name.clone();
        self.values
            .entry(measurement.kind.clone())
            .or_default()
            .push(measurement);
    }

    pub fn add_broken(&mut self, kind: &str, cell: impl Into<String>) {
        self.broken
            .entry(kind.to_string())
            .or_default()
            .push(cell.into());
    }

    pub fn measurements(&self) -> impl Iterator<Item = &Measurement> {
        self.values.values().flatten()
    }
}

// Broken cells are reported through validation, not exported
impl Serialize for Thing {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let fields = if self.attributes.is_empty() { 3 } else { 4 };
        let mut state = serializer.serialize_struct("Thing", fields)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("tags", &self.tags)?;
        state.serialize_field("values", &self.values)?;
        if !self.attributes.is_empty() {
            state.serialize_field("attributes", &self.attributes)?;
        }
        state.end()
    }
}

/// Canonical unit strings across all things, most frequent first.
pub fn unit_frequencies(things: &[Thing]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for measurement in things.iter().flat_map(Thing::measurements) {
        *counts.entry(measurement.value.units.to_string()).or_default() += 1;
    }
    let mut counts: Vec<_> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}
