//! TOML configuration deserialisation for resampling jobs.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level job configuration.
#[derive(Debug, Deserialize)]
pub struct JobConfig {
    pub input: InputConfig,
    #[serde(default)]
    pub interpolation: InterpolationConfig,
    pub query: QuerySpec,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Where the samples come from.
#[derive(Debug, Deserialize)]
pub struct InputConfig {
    /// Sample table, relative paths resolved against the job file.
    pub path: String,
    /// Name of the independent column (default: the first column).
    #[serde(default)]
    pub independent: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    #[default]
    Polynomial,
    Rational,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Search {
    /// Cursor-cached hunt then bisection.
    #[default]
    Hunt,
    Bisection,
}

/// Interpolation settings.
#[derive(Debug, Deserialize)]
pub struct InterpolationConfig {
    #[serde(default)]
    pub method: Method,
    /// Samples per interpolation window (default: 3).
    #[serde(default = "default_window")]
    pub window: usize,
    #[serde(default)]
    pub search: Search,
    /// Log a warning for every query outside its window (default: false).
    #[serde(default)]
    pub check_extrapolation: bool,
    /// Reject input whose independent column is not strictly monotonic (default: false).
    #[serde(default)]
    pub strict_ordering: bool,
}

impl Default for InterpolationConfig {
    fn default() -> Self {
        Self {
            method: Method::default(),
            window: default_window(),
            search: Search::default(),
            check_extrapolation: false,
            strict_ordering: false,
        }
    }
}

fn default_window() -> usize {
    tabula_core::interp::DEFAULT_WINDOW_SIZE
}

/// Query points: either an evenly spaced range or an explicit list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum QuerySpec {
    Range { range: [f64; 2], points: usize },
    List { values: Vec<f64> },
}

impl QuerySpec {
    /// Expand into the list of query points, in order.
    pub fn points(&self) -> Vec<f64> {
        match self {
            QuerySpec::Range { range, points } => {
                let [start, end] = *range;
                if *points == 1 {
                    return vec![start];
                }
                (0..*points)
                    .map(|i| start + (end - start) * i as f64 / (*points - 1) as f64)
                    .collect()
            }
            QuerySpec::List { values } => values.clone(),
        }
    }
}

/// Output configuration.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Output directory (default: "./output").
    #[serde(default = "default_output_dir")]
    pub directory: String,
    /// Whether to save the resampled table as CSV (default: true).
    #[serde(default = "default_true")]
    pub save_csv: bool,
    /// Whether to also save results with error estimates as JSON (default: false).
    #[serde(default)]
    pub save_json: bool,
    /// Resolve queries on the Rayon thread pool (default: false).
    #[serde(default)]
    pub parallel: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            save_csv: true,
            save_json: false,
            parallel: false,
        }
    }
}

fn default_output_dir() -> String {
    "./output".into()
}
fn default_true() -> bool {
    true
}

impl JobConfig {
    /// Reject settings that deserialise but cannot run.
    pub fn validate(&self) -> Result<()> {
        if self.interpolation.window < 2 {
            anyhow::bail!(
                "interpolation.window must be at least 2, got {}",
                self.interpolation.window
            );
        }
        match &self.query {
            QuerySpec::Range { range, points } => {
                if *points == 0 {
                    anyhow::bail!("query.points must be at least 1");
                }
                if !range.iter().all(|v| v.is_finite()) {
                    anyhow::bail!("query.range must be finite, got {:?}", range);
                }
            }
            QuerySpec::List { values } => {
                if values.is_empty() {
                    anyhow::bail!("query.values must not be empty");
                }
            }
        }
        Ok(())
    }

    /// Path of the input table, resolved against the job file's directory.
    pub fn input_path(&self, job_file: &Path) -> std::path::PathBuf {
        let path = Path::new(&self.input.path);
        match job_file.parent() {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }
}

/// Parse and validate a TOML job configuration.
pub fn parse_config(content: &str) -> Result<JobConfig> {
    let config: JobConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load, parse and validate a TOML job configuration file.
pub fn load_config(path: &Path) -> Result<JobConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read job file {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Invalid job file {}", path.display()))
}
