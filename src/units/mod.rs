//! Unit and quantity algebra: parsing unit expressions, compound-unit
//! arithmetic and table-driven standardization to base units.

pub mod detector;
pub mod error;
pub mod formatter;
pub mod parser;
pub mod quantity;
pub mod standardize;
pub mod table;
pub mod unit;

pub use detector::looks_like_measurement;
pub use error::{ParseError, StandardizeError, TableError};
pub use formatter::{format_significant, scientific, QuantityRecord, Scientific};
pub use parser::{parse_quantity, parse_units, KnownUnits};
pub use quantity::Quantity;
pub use standardize::{standardize, standardize_with_limit, DEFAULT_MAX_ITERATIONS};
pub use table::{Conversion, ConversionTable, TableEntry, UnitDefinition};
pub use unit::{prefix_letter, prefix_magnitude, Unit, Units, PREFIXES};
