use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Optional "name:" label, then a number (optional decimal, optional exponent)
    /// Examples: "330 m", "max: 10.9 km", "-20 C", "8e9", "1.5-2 m"
    static ref MEASUREMENT_PATTERN: Regex = Regex::new(
        r"^(?:[^:,]*:)?\s*[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?"
    ).unwrap();
}

/// Check if a catalog field looks like a measurement rather than free text.
/// Only the first cell is inspected.
pub fn looks_like_measurement(s: &str) -> bool {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return false;
    }
    MEASUREMENT_PATTERN.is_match(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measurement_detection() {
        assert!(looks_like_measurement("330 m"));
        assert!(looks_like_measurement("max depth: 10.9 km (Mariana)"));
        assert!(looks_like_measurement("8e9"));
        assert!(looks_like_measurement("1-2 m, 3 m"));

        assert!(!looks_like_measurement("https://example.com/eiffel.jpg"));
        assert!(!looks_like_measurement("A wrought-iron lattice tower"));
        assert!(!looks_like_measurement("   "));
    }
}
