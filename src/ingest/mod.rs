//! Catalog ingestion: measurement cells, derived values, things and TOML
//! catalogs.

pub mod cell;
pub mod derive;
pub mod error;
pub mod models;
pub mod processor;
pub mod validation;


pub use cell::{parse_cell, parse_field};
pub use derive::{derive_values, AUTO_NOTE};
pub use error::IngestError;
pub use models::*;
pub use processor::*;
pub use validation::*;
