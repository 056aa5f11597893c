use thiserror::Error;

/// A unit expression or quantity string that does not match the grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty quantity string")]
    Empty,
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("unexpected '{text}' at position {position} in unit expression '{expr}'")]
    UnexpectedToken {
        expr: String,
        text: String,
        position: usize,
    },
    #[error("exponent '{0}' out of range")]
    ExponentOutOfRange(String),
}

/// Standardization failed to reach a fixed point.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StandardizeError {
    #[error("no fixed point after {iterations} iterations (last units: '{units}'); the conversion table likely contains a cycle")]
    CycleDetected { iterations: usize, units: String },
}

/// Problems found while building a conversion table or reading its configuration.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("equivalence for '{name}' does not parse: {source}")]
    InvalidEquivalence {
        name: String,
        #[source]
        source: ParseError,
    },
    #[error("equivalence for '{name}' refers to unknown unit '{unit}'")]
    UnknownUnit { name: String, unit: String },
    #[error("conversion from '{name}' targets unknown unit '{target}'")]
    UnknownTarget { name: String, target: String },
    #[error("conversion from '{name}' has unusable ratio {ratio}")]
    InvalidConversion { name: String, ratio: f64 },
    #[error("unit '{0}' is defined more than once")]
    DuplicateUnit(String),
    #[error("failed to read conversion table: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid conversion table file: {0}")]
    Toml(#[from] toml::de::Error),
}
