use crate::ingest::cell::parse_field;
use crate::ingest::derive::derive_values;
use crate::ingest::error::IngestError;
use crate::ingest::models::{Measurement, Thing};
use crate::ingest::validation::ValidationResult;
use crate::units::{looks_like_measurement, ConversionTable, Quantity};
use log::{debug, info};
use std::fs;
use std::path::Path;
use toml::{Table, Value};

/// Turns a TOML catalog into standardized things.
///
/// ```toml
/// ["Eiffel tower"]
/// tags = ["building", "landmark"]
/// height = "330 m, antenna: 30 m"
/// mass = "7300 t"
/// image = "https://example.org/eiffel.jpg"
/// ```
///
/// `tags` may be an array or a comma-separated string. String fields that
/// look like measurements are parsed cell by cell; other strings are kept as
/// free-text attributes. Bare numbers become dimensionless measurements.
/// Derived values (sphere volume, average density) are added per thing once
/// its fields are parsed.
pub struct CatalogProcessor<'a> {
    table: &'a ConversionTable,
}

impl<'a> CatalogProcessor<'a> {
    pub fn new(table: &'a ConversionTable) -> Self {
        Self { table }
    }

    pub fn process_catalog(
        &self,
        catalog: &Table,
    ) -> Result<(Vec<Thing>, ValidationResult), IngestError> {
        let mut validation = ValidationResult::new();
        let things = self.process_into(catalog, &mut validation)?;
        Ok((things, validation))
    }

    fn process_into(
        &self,
        catalog: &Table,
        validation: &mut ValidationResult,
    ) -> Result<Vec<Thing>, IngestError> {
        let mut things = Vec::with_capacity(catalog.len());
        for (name, value) in catalog {
            match value {
                Value::Table(fields) => things.push(self.process_thing(name, fields, validation)?),
                other => validation.add_error(
                    format!("Expected a table of fields, found {}", other.type_str()),
                    Some(name.clone()),
                ),
            }
        }
        Ok(things)
    }

    pub fn process_thing(
        &self,
        name: &str,
        fields: &Table,
        validation: &mut ValidationResult,
    ) -> Result<Thing, IngestError> {
        let mut thing = Thing::new(name.trim(), Vec::new());

        for (key, value) in fields {
            let kind = key.trim().to_lowercase();
            if kind == "tags" {
                thing.tags = process_tags(&thing.name, value, validation);
            } else {
                self.process_value(&mut thing, &kind, value, validation)?;
            }
        }

        derive_values(&mut thing);

        debug!(
            "{}: {} measurements, {} broken",
            thing.name,
            thing.measurements().count(),
            thing.broken.values().map(Vec::len).sum::<usize>()
        );
        Ok(thing)
    }

    fn process_value(
        &self,
        thing: &mut Thing,
        kind: &str,
        value: &Value,
        validation: &mut ValidationResult,
    ) -> Result<(), IngestError> {
        match value {
            Value::String(text) if looks_like_measurement(text) => {
                let parsed = parse_field(text, kind, &thing.name, self.table)?;
                for cell in parsed.broken {
                    validation.add_broken(&thing.name, kind, &cell);
                    thing.add_broken(kind, cell);
                }
                for measurement in parsed.measurements {
                    thing.add(measurement);
                }
            }
            Value::String(text) => {
                thing
                    .attributes
                    .insert(kind.to_string(), text.trim().to_string());
            }
            Value::Integer(n) => add_number(thing, kind, *n as f64, n.to_string(), validation),
            Value::Float(x) => add_number(thing, kind, *x, x.to_string(), validation),
            Value::Array(items) => {
                for item in items {
                    self.process_value(thing, kind, item, validation)?;
                }
            }
            other => validation.add_warning(
                format!("Unsupported {} value", other.type_str()),
                Some(format!("{}/{}", thing.name, kind)),
            ),
        }
        Ok(())
    }
}

fn process_tags(thing: &str, value: &Value, validation: &mut ValidationResult) -> Vec<String> {
    let clean = |tag: &str| tag.trim().to_lowercase();
    match value {
        Value::String(tags) => tags
            .split(',')
            .map(clean)
            .filter(|t| !t.is_empty())
            .collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(tag) => Some(clean(tag)),
                other => {
                    validation.add_warning(
                        format!("Ignoring {} tag", other.type_str()),
                        Some(thing.to_string()),
                    );
                    None
                }
            })
            .filter(|t| !t.is_empty())
            .collect(),
        other => {
            validation.add_warning(
                format!("Tags must be a string or array, found {}", other.type_str()),
                Some(thing.to_string()),
            );
            Vec::new()
        }
    }
}

fn add_number(
    thing: &mut Thing,
    kind: &str,
    value: f64,
    original: String,
    validation: &mut ValidationResult,
) {
    if value == 0.0 || !value.is_finite() {
        validation.add_broken(&thing.name, kind, &original);
        thing.add_broken(kind, original);
        return;
    }
    let mut measurement = Measurement::new(Quantity::dimensionless(value));
    measurement.kind = kind.to_string();
    measurement.original = original;
    thing.add(measurement);
}

pub fn load_catalog_from_str(
    content: &str,
    table: &ConversionTable,
) -> Result<(Vec<Thing>, ValidationResult), IngestError> {
    let catalog: Table = toml::from_str(content)?;
    CatalogProcessor::new(table).process_catalog(&catalog)
}

pub fn load_catalog_from_file<P: AsRef<Path>>(
    path: P,
    table: &ConversionTable,
) -> Result<(Vec<Thing>, ValidationResult), IngestError> {
    let content = fs::read_to_string(path)?;
    load_catalog_from_str(&content, table)
}

/// Load every `*.toml` file in a directory as one catalog. Files that fail to
/// parse are reported as errors and skipped.
pub fn load_catalog_from_directory<P: AsRef<Path>>(
    directory: P,
    table: &ConversionTable,
) -> Result<(Vec<Thing>, ValidationResult), IngestError> {
    let processor = CatalogProcessor::new(table);
    let mut validation = ValidationResult::new();
    let mut things = Vec::new();

    let mut paths: Vec<_> = fs::read_dir(directory.as_ref())?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<_, _>>()?;
    paths.sort();

    for path in paths {
        if path.extension().and_then(|s| s.to_str()) != Some("toml") {
            continue;
        }
        let catalog = match fs::read_to_string(&path)
            .map_err(IngestError::from)
            .and_then(|content| toml::from_str::<Table>(&content).map_err(IngestError::from))
        {
            Ok(catalog) => catalog,
            Err(e) => {
                validation.add_error(
                    format!("Failed to parse {}: {}", path.display(), e),
                    Some(path.display().to_string()),
                );
                continue;
            }
        };
        things.extend(processor.process_into(&catalog, &mut validation)?);
    }

    info!(
        "loaded {} things from {}",
        things.len(),
        directory.as_ref().display()
    );
    Ok((things, validation))
}
