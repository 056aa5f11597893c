use std::ops::Mul;

/// SI prefix letters and the power of ten each one contributes.
pub const PREFIXES: [(char, i32); 10] = [
    ('T', 12),
    ('G', 9),
    ('M', 6),
    ('k', 3),
    ('d', -1),
    ('c', -2),
    ('m', -3),
    ('u', -6),
    ('n', -9),
    ('p', -12),
];

pub fn prefix_magnitude(letter: char) -> Option<i32> {
    PREFIXES
        .iter()
        .find(|(l, _)| *l == letter)
        .map(|(_, magnitude)| *magnitude)
}

pub fn prefix_letter(magnitude: i32) -> Option<char> {
    PREFIXES
        .iter()
        .find(|(_, m)| *m == magnitude)
        .map(|(letter, _)| *letter)
}

/// One symbolic unit occurrence, e.g. `km^2` is `{name: "m", power: 2, magnitude: 3}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Unit {
    pub name: String,
    pub power: i32,
    /// Power of ten contributed by an SI prefix.
    pub magnitude: i32,
}

impl Unit {
    pub fn new(name: impl Into<String>, power: i32) -> Self {
        Self {
            name: name.into(),
            power,
            magnitude: 0,
        }
    }

    pub fn with_magnitude(name: impl Into<String>, power: i32, magnitude: i32) -> Self {
        Self {
            name: name.into(),
            power,
            magnitude,
        }
    }

    /// Same name and same prefix magnitude; the exponent is ignored.
    pub fn same_dimension(&self, other: &Unit) -> bool {
        self.name == other.name && self.magnitude == other.magnitude
    }

    /// The same unit without its prefix.
    pub fn unprefixed(&self) -> Unit {
        Unit::new(self.name.clone(), self.power)
    }
}

/// A compound unit.
///
/// Algebra operations always return the simplified form: no two entries share
/// a `(name, magnitude)` key and no entry has a zero power. Only the parser
/// hands out unsimplified values, and equality compares simplified forms.
#[derive(Debug, Clone, Default)]
pub struct Units {
    entries: Vec<Unit>,
}

impl Units {
    pub fn dimensionless() -> Self {
        Self::default()
    }

    /// Wraps the entries as-is, without simplifying.
    pub fn from_entries(entries: Vec<Unit>) -> Self {
        Self { entries }
    }

    /// `name^1` without prefix.
    pub fn unit(name: impl Into<String>) -> Self {
        Self {
            entries: vec![Unit::new(name, 1)],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Unit> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[Unit] {
        &self.entries
    }

    /// True when nothing survives simplification.
    pub fn is_dimensionless(&self) -> bool {
        self.simplify().entries.is_empty()
    }

    pub fn simplify(&self) -> Units {
        let mut merged: Vec<Unit> = Vec::with_capacity(self.entries.len());
        for unit in &self.entries {
            match merged.iter_mut().find(|u| u.same_dimension(unit)) {
                Some(existing) => existing.power = existing.power.saturating_add(unit.power),
                None => merged.push(unit.clone()),
            }
        }
        merged.retain(|u| u.power != 0);
        Units { entries: merged }
    }

    pub fn multiply(&self, other: &Units) -> Units {
        let entries = self
            .entries
            .iter()
            .chain(other.entries.iter())
            .cloned()
            .collect();
        Units { entries }.simplify()
    }

    pub fn power(&self, p: i32) -> Units {
        let entries = self
            .entries
            .iter()
            .map(|u| Unit::with_magnitude(u.name.clone(), u.power.saturating_mul(p), u.magnitude))
            .collect();
        Units { entries }.simplify()
    }

    pub fn inverse(&self) -> Units {
        self.power(-1)
    }

    /// The unit name when these units are exactly one unprefixed unit at power 1.
    pub fn single(&self) -> Option<String> {
        let simplified = self.simplify();
        match simplified.entries.as_slice() {
            [only] if only.power == 1 && only.magnitude == 0 => Some(only.name.clone()),
            _ => None,
        }
    }

    /// Entries ordered by `(name, magnitude)`, used for multiset comparison.
    fn sorted(&self) -> Vec<Unit> {
        let mut entries = self.simplify().entries;
        entries.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then(a.magnitude.cmp(&b.magnitude))
        });
        entries
    }
}

impl PartialEq for Units {
    fn eq(&self, other: &Self) -> bool {
        self.sorted() == other.sorted()
    }
}

impl Eq for Units {}

impl FromIterator<Unit> for Units {
    fn from_iter<I: IntoIterator<Item = Unit>>(iter: I) -> Self {
        Units {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Mul for &Units {
    type Output = Units;

    fn mul(self, rhs: &Units) -> Units {
        self.multiply(rhs)
    }
}

impl Mul for Units {
    type Output = Units;

    fn mul(self, rhs: Units) -> Units {
        self.multiply(&rhs)
    }
}
