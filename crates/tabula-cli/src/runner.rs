//! Resampling runner: ties together table loading, series configuration,
//! batch retrieval, and output.

use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};
use serde::Serialize;

use tabula_core::{
    BisectionSearch, BracketSearch, ColumnInfo, Direction, Interpolated, Interpolator,
    PolynomialInterpolator, RationalInterpolator, SampledSeries, TableSearch,
};

use crate::config::{InterpolationConfig, JobConfig, Method, Search};

/// Results of a resampling run.
#[derive(Debug, Serialize)]
pub struct ResampleOutput {
    pub independent: ColumnInfo,
    pub channels: Vec<ColumnInfo>,
    pub results: Vec<Interpolated>,
}

impl ResampleOutput {
    pub fn extrapolated_count(&self) -> usize {
        self.results.iter().filter(|r| r.extrapolated).count()
    }
}

/// Summary of a sample table, as printed by `tabula inspect`.
#[derive(Debug)]
pub struct TableSummary {
    pub samples: usize,
    pub independent: ColumnInfo,
    pub range: Option<(f64, f64)>,
    /// `None` when the independent column is empty or not strictly monotonic.
    pub direction: Option<Direction>,
    pub channels: Vec<ChannelSummary>,
}

#[derive(Debug)]
pub struct ChannelSummary {
    pub info: ColumnInfo,
    /// `(x, value)` of the smallest and largest sample.
    pub min: Option<(f64, f64)>,
    pub max: Option<(f64, f64)>,
}

/// Apply the interpolation settings of a job to a freshly parsed series.
pub fn configure_series(
    mut series: SampledSeries,
    settings: &InterpolationConfig,
) -> Result<SampledSeries> {
    if settings.strict_ordering {
        series
            .check_monotonic()
            .context("Input is not strictly monotonic in the independent column")?;
        series.set_strict_ordering(true);
    }

    let search: Box<dyn TableSearch> = match settings.search {
        Search::Hunt => Box::new(BracketSearch::new()),
        Search::Bisection => Box::new(BisectionSearch::new()),
    };
    let interpolator: Box<dyn Interpolator> = match settings.method {
        Method::Polynomial => Box::new(PolynomialInterpolator::new(settings.window)?),
        Method::Rational => Box::new(RationalInterpolator::new(settings.window)?),
    };

    let mut series = series.with_search(search).with_interpolator(interpolator);
    series.set_check_extrapolation(settings.check_extrapolation);
    Ok(series)
}

/// Load the job's input table and configure it for interpolation.
pub fn load_series(job: &JobConfig, job_file: &Path) -> Result<SampledSeries> {
    let path = job.input_path(job_file);
    let series = tabula_io::read_table(&path, job.input.independent.as_deref())
        .with_context(|| format!("Failed to load samples from {}", path.display()))?;
    info!(
        "Loaded {} samples of {} channels from {}",
        series.len(),
        series.num_channels(),
        path.display()
    );
    configure_series(series, &job.interpolation)
}

/// Run a resampling job end to end, without writing output.
pub fn run_resample(job: &JobConfig, job_file: &Path) -> Result<ResampleOutput> {
    let mut series = load_series(job, job_file)?;
    let targets = job.query.points();

    println!(
        "  {} samples, {} channels, {} queries ({:?}, window {})",
        series.len(),
        series.num_channels(),
        targets.len(),
        job.interpolation.method,
        series.window_size()
    );

    let results = if job.output.parallel {
        series.par_retrieve_batch(&targets)
    } else {
        series.retrieve_batch(&targets)
    }
    .context("Interpolation failed")?;

    let output = ResampleOutput {
        independent: series.independent_info().clone(),
        channels: series.channel_info().to_vec(),
        results,
    };

    let extrapolated = output.extrapolated_count();
    if extrapolated > 0 {
        warn!(
            "{} of {} queries lie outside the sampled range and were extrapolated",
            extrapolated,
            output.results.len()
        );
    }
    Ok(output)
}

/// Summarise a sample table.
pub fn summarize(series: &SampledSeries) -> Result<TableSummary> {
    let mut channels = Vec::with_capacity(series.num_channels());
    for (c, info) in series.channel_info().iter().enumerate() {
        let sample = |index: Option<usize>| -> Result<Option<(f64, f64)>> {
            index
                .map(|i| -> Result<(f64, f64)> { Ok((series.independent(i)?, series.value(i, c)?)) })
                .transpose()
        };
        channels.push(ChannelSummary {
            info: info.clone(),
            min: sample(series.argmin(c)?)?,
            max: sample(series.argmax(c)?)?,
        });
    }

    Ok(TableSummary {
        samples: series.len(),
        independent: series.independent_info().clone(),
        range: series.independent_range(),
        direction: series.check_monotonic().ok(),
        channels,
    })
}

/// Write resampled values to a CSV file with a metadata header.
pub fn write_resampled_csv(output: &ResampleOutput, path: &Path, job: &JobConfig) -> Result<()> {
    let comments = vec![
        "tabula resampled table".to_string(),
        format!("Version: {}", env!("CARGO_PKG_VERSION")),
        format!("source: {}", job.input.path),
        format!(
            "method: {:?}, window: {}, search: {:?}",
            job.interpolation.method, job.interpolation.window, job.interpolation.search
        ),
        format!("extrapolated queries: {}", output.extrapolated_count()),
    ];
    let header: Vec<String> = std::iter::once(&output.independent)
        .chain(&output.channels)
        .map(ColumnInfo::label)
        .collect();
    let rows: Vec<Vec<f64>> = output
        .results
        .iter()
        .map(|r| std::iter::once(r.x).chain(r.values.iter().copied()).collect())
        .collect();

    tabula_io::write_csv(path, &comments, &header, &rows)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Resampled table written to: {}", path.display());
    Ok(())
}

/// Write resampled values, error estimates, and extrapolation flags as JSON.
pub fn write_resampled_json(output: &ResampleOutput, path: &Path) -> Result<()> {
    tabula_io::write_json(path, output)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Resampled table (JSON) written to: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use approx::assert_abs_diff_eq;
    use std::path::PathBuf;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tabula-cli-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_samples(dir: &Path) {
        let mut table = String::from("# t, t^2, 3t\nt [s], square, line\n");
        for i in 0..=10 {
            let t = 0.5 * i as f64;
            table.push_str(&format!("{}, {}, {}\n", t, t * t, 3.0 * t));
        }
        std::fs::write(dir.join("samples.csv"), table).unwrap();
    }

    #[test]
    fn test_resample_range_and_write() {
        let dir = scratch("resample");
        write_samples(&dir);
        let job_file = dir.join("job.toml");
        let job = parse_config(
            "[input]\npath = \"samples.csv\"\n[query]\nrange = [0.25, 6.0]\npoints = 24\n[output]\nsave_json = true\n",
        )
        .unwrap();

        let output = run_resample(&job, &job_file).unwrap();
        assert_eq!(output.results.len(), 24);
        assert_eq!(output.channels[0].name, "square");
        for r in &output.results {
            assert_abs_diff_eq!(r.values[0], r.x * r.x, epsilon = 1e-9);
            assert_abs_diff_eq!(r.values[1], 3.0 * r.x, epsilon = 1e-9);
        }
        // 5.0 is the last sample, so only queries beyond it extrapolate.
        let beyond = output.results.iter().filter(|r| r.x > 5.0).count();
        assert!(beyond > 0);
        assert_eq!(output.extrapolated_count(), beyond);

        let csv = dir.join("out").join("resampled.csv");
        write_resampled_csv(&output, &csv, &job).unwrap();
        let back = tabula_io::read_table(&csv, None).unwrap();
        assert_eq!(back.len(), 24);
        assert_eq!(back.independent_info().label(), "t [s]");

        let json = dir.join("out").join("resampled.json");
        write_resampled_json(&output, &json).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
        assert_eq!(value["results"].as_array().unwrap().len(), 24);
        assert!(value["results"][0]["error_estimates"].is_array());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let dir = scratch("parallel");
        write_samples(&dir);
        let job_file = dir.join("job.toml");
        let sequential = parse_config(
            "[input]\npath = \"samples.csv\"\n[interpolation]\nmethod = \"rational\"\nsearch = \"bisection\"\n[query]\nrange = [0.0, 5.0]\npoints = 700\n",
        )
        .unwrap();
        let parallel = parse_config(
            "[input]\npath = \"samples.csv\"\n[interpolation]\nmethod = \"rational\"\nsearch = \"bisection\"\n[query]\nrange = [0.0, 5.0]\npoints = 700\n[output]\nparallel = true\n",
        )
        .unwrap();

        let a = run_resample(&sequential, &job_file).unwrap();
        let b = run_resample(&parallel, &job_file).unwrap();
        assert_eq!(a.results, b.results);
        assert_eq!(a.extrapolated_count(), 0);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_strict_ordering_rejects_unsorted_input() {
        let series = tabula_io::parse_table("t, y\n0, 0\n2, 1\n1, 2\n", None).unwrap();
        let mut settings = InterpolationConfig::default();
        assert!(configure_series(series.clone(), &settings).is_ok());
        settings.strict_ordering = true;
        let err = configure_series(series, &settings).unwrap_err();
        assert!(err.to_string().contains("not strictly monotonic"));
    }

    #[test]
    fn test_summarize() {
        let series =
            tabula_io::parse_table("t, a, b\n0, 3, -1\n1, 7, -4\n2, -2, 5\n", None).unwrap();
        let summary = summarize(&series).unwrap();
        assert_eq!(summary.samples, 3);
        assert_eq!(summary.range, Some((0.0, 2.0)));
        assert_eq!(summary.direction, Some(Direction::Ascending));
        assert_eq!(summary.channels[0].min, Some((2.0, -2.0)));
        assert_eq!(summary.channels[0].max, Some((1.0, 7.0)));
        assert_eq!(summary.channels[1].max, Some((2.0, 5.0)));

        let empty = tabula_io::parse_table("t, y\n", None).unwrap();
        let summary = summarize(&empty).unwrap();
        assert_eq!(summary.direction, None);
        assert_eq!(summary.channels[0].min, None);
    }

    #[test]
    fn test_missing_input_is_reported() {
        let job = parse_config("[input]\npath = \"absent.csv\"\n[query]\nvalues = [1.0]\n").unwrap();
        let err = run_resample(&job, Path::new("/nonexistent/job.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to load samples"));
    }
}
