//! Plain data types shared by the series containers and their consumers.

use serde::{Deserialize, Serialize};

/// Name and unit of one column (the independent variable or a channel).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl ColumnInfo {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unit: None,
        }
    }

    /// `name` or `name [unit]`, as used in table headers.
    pub fn label(&self) -> String {
        match &self.unit {
            Some(unit) => format!("{} [{}]", self.name, unit),
            None => self.name.clone(),
        }
    }
}

/// A named column of values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    #[serde(flatten)]
    pub info: ColumnInfo,
    pub values: Vec<f64>,
}

/// Serialisable copy of a [`SampledSeries`](crate::series::SampledSeries).
///
/// Only the logical content is captured; the search cursor and the
/// interpolator configuration are not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSnapshot {
    pub independent: Column,
    pub channels: Vec<Column>,
}

/// Values interpolated at one target, one entry per channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interpolated {
    pub x: f64,
    pub values: Vec<f64>,
    pub error_estimates: Vec<f64>,
    /// The target lay outside the interpolation window.
    pub extrapolated: bool,
}

/// Default name of dependent channel `index`.
pub(crate) fn default_channel_name(index: usize) -> String {
    format!("y{}", index)
}
