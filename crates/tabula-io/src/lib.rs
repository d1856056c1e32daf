//! Plain-text sample tables for tabula.
//!
//! Tables are comma separated with one header row:
//! ```text
//! # comment lines and blank lines are ignored
//! time [s], position [m], velocity [m/s]
//! 0.0, 1.0, 0.0
//! 0.1, 0.995, -0.0998
//! ```
//!
//! - [`table`] parses tables into [`SampledSeries`](tabula_core::SampledSeries)
//!   and [`SampledDerivedSeries`](tabula_core::SampledDerivedSeries).
//! - [`writer`] writes results back out as CSV or pretty JSON.

pub mod table;
pub mod writer;

use tabula_core::SamplingError;
use thiserror::Error;

pub use table::{parse_derived_table, parse_label, parse_table, read_table, DerivedTable};
pub use writer::{write_csv, write_csv_to, write_json};

/// Errors while reading or writing sample tables.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to access file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    FormatError { line: usize, message: String },

    #[error("Invalid sample data: {0}")]
    Sampling(#[from] SamplingError),

    #[error("JSON serialisation error: {0}")]
    Json(#[from] serde_json::Error),
}
