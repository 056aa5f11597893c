use crate::units::error::ParseError;
use crate::units::quantity::Quantity;
use crate::units::unit::{prefix_magnitude, Unit, Units};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use std::hash::BuildHasher;

lazy_static! {
    /// One unit term: a name (no digits, separators, slashes or signs)
    /// followed by an optional signed exponent. Examples: "m", "km2", "s-1"
    static ref UNIT_TOKEN: Regex = Regex::new(r"([^\d\s*/+\-.]+)([+-]?\d+)?").unwrap();

    /// Optional leading number, then the unit expression
    static ref QUANTITY: Regex = Regex::new(
        r"^\s*([+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)?\s*(.*?)\s*$"
    ).unwrap();
}

/// Largest exponent magnitude accepted in a unit term.
pub const MAX_EXPONENT: i32 = 1000;

/// The set of unit names a parser may resolve prefixes and plurals against.
pub trait KnownUnits {
    fn is_known(&self, name: &str) -> bool;
}

impl<S: BuildHasher> KnownUnits for HashSet<String, S> {
    fn is_known(&self, name: &str) -> bool {
        self.contains(name)
    }
}

impl KnownUnits for BTreeSet<String> {
    fn is_known(&self, name: &str) -> bool {
        self.contains(name)
    }
}

impl KnownUnits for [&str] {
    fn is_known(&self, name: &str) -> bool {
        self.contains(&name)
    }
}

/// Parse a unit expression such as `"km2/h"` or `"kg m s-2"`.
///
/// Everything after the first `/` is the denominator. Names are resolved
/// against `known`; names that cannot be resolved are kept verbatim.
/// The result is not simplified.
pub fn parse_units<K: KnownUnits + ?Sized>(expr: &str, known: &K) -> Result<Units, ParseError> {
    let cleaned = expr.replace('^', "");
    let (numerator, denominator) = cleaned.split_once('/').unwrap_or((cleaned.as_str(), ""));

    let mut entries = Vec::new();
    tokenize(numerator, &cleaned, 0, 1, known, &mut entries)?;
    tokenize(
        denominator,
        &cleaned,
        numerator.len() + 1,
        -1,
        known,
        &mut entries,
    )?;

    Ok(Units::from_entries(entries))
}

/// Parse `"<number>? <unit expression>"`. A missing number means 1.
pub fn parse_quantity<K: KnownUnits + ?Sized>(text: &str, known: &K) -> Result<Quantity, ParseError> {
    if text.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    let caps = QUANTITY
        .captures(text)
        .ok_or_else(|| ParseError::InvalidNumber(text.to_string()))?;

    let value = match caps.get(1) {
        Some(number) => number
            .as_str()
            .parse::<f64>()
            .map_err(|_| ParseError::InvalidNumber(number.as_str().to_string()))?,
        None => 1.0,
    };
    let expr = caps.get(2).map_or("", |m| m.as_str());

    Ok(Quantity::new(value, parse_units(expr, known)?))
}

fn tokenize<K: KnownUnits + ?Sized>(
    part: &str,
    expr: &str,
    offset: usize,
    sign: i32,
    known: &K,
    out: &mut Vec<Unit>,
) -> Result<(), ParseError> {
    let mut cursor = 0;
    for caps in UNIT_TOKEN.captures_iter(part) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        check_separator(part, cursor, whole.start(), expr, offset)?;
        cursor = whole.end();

        let power = match caps.get(2) {
            Some(exponent) => exponent
                .as_str()
                .parse::<i32>()
                .ok()
                .filter(|p| p.abs() <= MAX_EXPONENT)
                .ok_or_else(|| ParseError::ExponentOutOfRange(exponent.as_str().to_string()))?,
            None => 1,
        };
        let (name, magnitude) = resolve_name(name.as_str(), known);
        out.push(Unit::with_magnitude(name, power * sign, magnitude));
    }
    check_separator(part, cursor, part.len(), expr, offset)
}

// Only whitespace and '*' may sit between two unit terms.
fn check_separator(
    part: &str,
    from: usize,
    to: usize,
    expr: &str,
    offset: usize,
) -> Result<(), ParseError> {
    let gap = &part[from..to];
    match gap
        .char_indices()
        .find(|(_, c)| !c.is_whitespace() && *c != '*')
    {
        Some((index, _)) => {
            let text = gap[index..]
                .split(|c: char| c.is_whitespace() || c == '*')
                .next()
                .unwrap_or_default();
            Err(ParseError::UnexpectedToken {
                expr: expr.to_string(),
                text: text.to_string(),
                position: offset + from + index,
            })
        }
        None => Ok(()),
    }
}

/// Strip plural `s` and SI prefixes until the name is known, or give up and
/// keep what is left.
///
/// Known names win over prefixes, so a table containing both `min` and `in`
/// resolves "min" to minutes, never milli-inches.
fn resolve_name<K: KnownUnits + ?Sized>(token: &str, known: &K) -> (String, i32) {
    let mut name = token;
    let mut magnitude = 0;
    loop {
        if known.is_known(name) {
            break;
        }
        if let Some(stem) = name.strip_suffix('s') {
            if known.is_known(stem) {
                name = stem;
                continue;
            }
        }
        let mut chars = name.chars();
        if let Some(prefix) = chars.next().and_then(prefix_magnitude) {
            let rest = chars.as_str();
            if known.is_known(rest) {
                magnitude = prefix.saturating_add(magnitude);
                name = rest;
                continue;
            }
        }
        break;
    }
    (name.to_string(), magnitude)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN: [&str; 9] = ["m", "s", "h", "ft", "g", "kg", "min", "in", "day"];

    fn parse(expr: &str) -> Units {
        parse_units(expr, &KNOWN[..]).unwrap()
    }

    #[test]
    fn test_parse_simple() {
        assert_eq!(parse("m").entries(), &[Unit::new("m", 1)]);
        assert_eq!(
            parse("m/s").entries(),
            &[Unit::new("m", 1), Unit::new("s", -1)]
        );
    }

    #[test]
    fn test_parse_exponents_and_carets() {
        assert_eq!(
            parse("km^2/h").entries(),
            &[Unit::with_magnitude("m", 2, 3), Unit::new("h", -1)]
        );
        assert_eq!(
            parse("ft2/h").entries(),
            &[Unit::new("ft", 2), Unit::new("h", -1)]
        );
        assert_eq!(
            parse("m s-2").entries(),
            &[Unit::new("m", 1), Unit::new("s", -2)]
        );
        assert_eq!(parse("m+3").entries(), &[Unit::new("m", 3)]);
    }

    #[test]
    fn test_denominator_is_everything_after_first_slash() {
        assert_eq!(
            parse("kg/m s2").entries(),
            &[Unit::new("kg", 1), Unit::new("m", -1), Unit::new("s", -2)]
        );
        assert_eq!(parse("/s").entries(), &[Unit::new("s", -1)]);
    }

    #[test]
    fn test_adjacent_terms_and_star_separator() {
        assert_eq!(
            parse("kg*m2").entries(),
            &[Unit::new("kg", 1), Unit::new("m", 2)]
        );
        assert_eq!(
            parse("m2s").entries(),
            &[Unit::new("m", 2), Unit::new("s", 1)]
        );
    }

    #[test]
    fn test_duplicates_kept_until_simplified() {
        let units = parse("m m/m");
        assert_eq!(units.entries().len(), 3);
        assert_eq!(units.simplify().entries(), &[Unit::new("m", 1)]);
    }

    #[test]
    fn test_resolve_prefix_and_plural() {
        assert_eq!(parse("ms").entries(), &[Unit::new("m", 1)]);
        assert_eq!(parse("days").entries(), &[Unit::new("day", 1)]);
        assert_eq!(parse("mg").entries(), &[Unit::with_magnitude("g", 1, -3)]);
        assert_eq!(parse("kg").entries(), &[Unit::new("kg", 1)]);
        assert_eq!(parse("min").entries(), &[Unit::new("min", 1)]);
        assert_eq!(parse("um").entries(), &[Unit::with_magnitude("m", 1, -6)]);
    }

    #[test]
    fn test_unknown_names_are_kept() {
        assert_eq!(parse("furlong").entries(), &[Unit::new("furlong", 1)]);
        // "kms" is neither a plural of a known name nor a prefix of one
        assert_eq!(parse("kms").entries(), &[Unit::new("kms", 1)]);
    }

    #[test]
    fn test_bare_exponent_is_an_error() {
        let err = parse_units("m 2", &KNOWN[..]).unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnexpectedToken { ref text, position: 2, .. } if text == "2"
        ));
    }

    #[test]
    fn test_second_slash_is_an_error() {
        let err = parse_units("m/s/s", &KNOWN[..]).unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnexpectedToken { ref text, position: 3, .. } if text == "/"
        ));
    }

    #[test]
    fn test_exponent_bound() {
        assert_eq!(parse("m1000").entries(), &[Unit::new("m", 1000)]);
        assert_eq!(parse("/s-1000").entries(), &[Unit::new("s", 1000)]);
        for expr in ["m1001", "/m-2147483648", "m2147483648", "km1000000000"] {
            assert!(
                matches!(
                    parse_units(expr, &KNOWN[..]),
                    Err(ParseError::ExponentOutOfRange(_))
                ),
                "{} should be rejected",
                expr
            );
        }
    }

    #[test]
    fn test_parse_quantity() {
        let q = parse_quantity("3.0e8 m/s", &KNOWN[..]).unwrap();
        assert_eq!(q.value, 3.0e8);
        assert_eq!(q.units, parse("m/s"));

        let q = parse_quantity("km2/h", &KNOWN[..]).unwrap();
        assert_eq!(q.value, 1.0);

        let q = parse_quantity("-20 s", &KNOWN[..]).unwrap();
        assert_eq!(q.value, -20.0);

        let q = parse_quantity("12", &KNOWN[..]).unwrap();
        assert_eq!(q.value, 12.0);
        assert!(q.is_dimensionless());

        let q = parse_quantity("10m", &KNOWN[..]).unwrap();
        assert_eq!(q.value, 10.0);
        assert_eq!(q.units, Units::unit("m"));
    }

    #[test]
    fn test_parse_quantity_errors() {
        assert_eq!(parse_quantity("   ", &KNOWN[..]), Err(ParseError::Empty));
        assert!(parse_quantity("1.2.3 m", &KNOWN[..]).is_err());
    }

    #[test]
    fn test_hash_set_lookup() {
        let known: HashSet<String> = ["m".to_string(), "s".to_string()].into_iter().collect();
        let units = parse_units("km/ns", &known).unwrap();
        assert_eq!(
            units.entries(),
            &[
                Unit::with_magnitude("m", 1, 3),
                Unit::with_magnitude("s", -1, -9)
            ]
        );
    }
}
