//! Values derived from a thing's own measurements.
//!
//! Rules run once per thing after its fields are parsed: first the rules for
//! each of its tags, then the rules every thing gets. Derived measurements
//! carry the note [`AUTO_NOTE`] and never replace a measured value.

use crate::ingest::models::{Measurement, Thing};
use crate::units::Quantity;
use log::debug;
use std::f64::consts::PI;

pub const AUTO_NOTE: &str = "auto";

/// A rule may rewrite the thing in place and returns the measurements to add.
pub type Rule = fn(&mut Thing) -> Vec<Measurement>;

const SPHERE_RULES: &[Rule] = &[sphere_volume_surface_area];
const COMMON_RULES: &[Rule] = &[density, qualify_min_max];

pub fn rules_for_tag(tag: &str) -> &'static [Rule] {
    match tag {
        "sphere" => SPHERE_RULES,
        _ => &[],
    }
}

/// Apply tag rules, then common rules, adding every derived measurement.
pub fn derive_values(thing: &mut Thing) {
    let tags = thing.tags.clone();
    for rules in tags
        .iter()
        .map(|tag| rules_for_tag(tag))
        .chain(std::iter::once(COMMON_RULES))
    {
        for rule in rules {
            for measurement in rule(thing) {
                debug!(
                    "{}: derived {} = {}",
                    thing.name, measurement.kind, measurement.value
                );
                thing.add(measurement);
            }
        }
    }
}

fn derived(value: Quantity, kind: &str, name: &str) -> Measurement {
    let mut measurement = Measurement::new(value);
    measurement.kind = kind.to_string();
    measurement.name = name.to_string();
    measurement.note = AUTO_NOTE.to_string();
    measurement
}

// The only length, or the first unnamed/diameter length halved, or a radius.
fn radius(thing: &Thing) -> Option<Quantity> {
    let lengths = thing.values.get("length")?;
    if let [only] = lengths.as_slice() {
        return Some(only.value.scale(0.5));
    }
    lengths.iter().find_map(|m| match m.name.as_str() {
        "" | "d" | "diameter" => Some(m.value.scale(0.5)),
        "r" | "radius" => Some(m.value.clone()),
        _ => None,
    })
}

/// Volume and surface area of a sphere from its length, unless measured.
pub fn sphere_volume_surface_area(thing: &mut Thing) -> Vec<Measurement> {
    let Some(radius) = radius(thing) else {
        debug!("{}: no usable length for sphere rules", thing.name);
        return Vec::new();
    };

    let mut extra = Vec::new();
    if !thing.values.contains_key("volume") {
        extra.push(derived(radius.power(3).scale(4.0 / 3.0 * PI), "volume", ""));
    }
    if !thing.values.contains_key("surface area") {
        extra.push(derived(radius.power(2).scale(4.0 * PI), "surface area", ""));
    }
    extra
}

/// Average density from the canonical mass and volume.
pub fn density(thing: &mut Thing) -> Vec<Measurement> {
    if thing.values.contains_key("density") {
        return Vec::new();
    }
    match (thing.canonical("mass", false), thing.canonical("volume", false)) {
        (Some(mass), Some(volume)) => vec![derived(
            mass.value.divide(&volume.value),
            "density",
            "avg density",
        )],
        _ => Vec::new(),
    }
}

/// Bare "min"/"max" names become "min <kind>"/"max <kind>".
pub fn qualify_min_max(thing: &mut Thing) -> Vec<Measurement> {
    for measurement in thing.values.values_mut().flatten() {
        if measurement.name == "min" || measurement.name == "max" {
            measurement.name = format!("{} {}", measurement.name, measurement.kind);
        }
    }
    Vec::new()
}
