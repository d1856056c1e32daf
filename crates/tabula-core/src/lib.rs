//! # Tabula Core
//!
//! Turns a sparse, irregularly stepped sequence of simulation samples into a
//! continuous function of the independent variable (usually time).
//!
//! ## Architecture
//!
//! Retrieval is a two-step pipeline shared by every container:
//!
//! 1. a [`search::TableSearch`] locates the bracket of the query in the
//!    monotonic independent sequence;
//! 2. an [`interp::Interpolator`] evaluates a small window of samples placed
//!    around that bracket.
//!
//! ## Modules
//!
//! - [`search`]: hunt-then-bisect and plain bisection bracketing.
//! - [`interp`]: Neville polynomial, rational and cubic Hermite interpolation.
//! - [`series`]: [`SampledSeries`], the append-only multi-channel store.
//! - [`derived`]: [`SampledDerivedSeries`], values plus derivatives.
//! - [`types`]: column metadata, snapshots and batch results.
//! - [`error`]: [`SamplingError`].
//!
//! ## Example
//!
//! ```
//! use tabula_core::SampledSeries;
//!
//! let mut series = SampledSeries::new(1)?;
//! for i in 0..5 {
//!     let t = i as f64;
//!     series.append(t, &[t * t])?;
//! }
//! let y = series.retrieve(2.5)?;
//! assert!((y[0] - 6.25).abs() < 1e-9);
//! # Ok::<(), tabula_core::SamplingError>(())
//! ```

pub mod derived;
pub mod error;
pub mod interp;
pub mod search;
pub mod series;
pub mod types;

pub use derived::SampledDerivedSeries;
pub use error::{Result, SamplingError};
pub use interp::{Interpolator, PolynomialInterpolator, RationalInterpolator};
pub use search::{BisectionSearch, Bracket, BracketSearch, Direction, TableSearch};
pub use series::SampledSeries;
pub use types::{Column, ColumnInfo, Interpolated, SeriesSnapshot};
