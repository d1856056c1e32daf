//! Append-only time series with interpolated retrieval.
//!
//! A [`SampledSeries`] stores one independent sequence `x` and a fixed number
//! of dependent channels `y_0 .. y_{n-1}`, each held as its own contiguous
//! vector. Samples are appended as a simulation steps forward and queried
//! later at arbitrary `x`:
//!
//! 1. the configured [`TableSearch`] finds the bracket of the target,
//! 2. [`interpolation_window_start`] places a window of
//!    [`Interpolator::window_size`] samples around it,
//! 3. the [`Interpolator`] runs once per channel over that shared window.
//!
//! Queries mutate only the search cursor, never the stored samples.

use log::trace;

use crate::error::{Result, SamplingError};
use crate::interp::{
    interpolation_window_start, is_extrapolation, warn_on_extrapolation, Interpolator,
    PolynomialInterpolator,
};
use crate::search::{check_monotonic, BracketSearch, Direction, TableSearch};
use crate::types::{default_channel_name, Column, ColumnInfo, Interpolated, SeriesSnapshot};

/// Number of targets each Rayon task resolves with its own cursor.
#[cfg(feature = "parallel")]
const PARALLEL_CHUNK: usize = 256;

/// Time-indexed multi-channel sample store.
#[derive(Debug, Clone)]
pub struct SampledSeries {
    x: Vec<f64>,
    channels: Vec<Vec<f64>>,
    search: Box<dyn TableSearch>,
    interpolator: Box<dyn Interpolator>,
    error_estimates: Vec<f64>,
    check_extrapolation: bool,
    strict_ordering: bool,
    independent_info: ColumnInfo,
    channel_info: Vec<ColumnInfo>,
}

impl SampledSeries {
    /// Create an empty series with `num_channels` dependent channels.
    ///
    /// Uses [`BracketSearch`] and a quadratic [`PolynomialInterpolator`].
    pub fn new(num_channels: usize) -> Result<Self> {
        if num_channels == 0 {
            return Err(SamplingError::NoChannels);
        }
        Ok(Self {
            x: Vec::new(),
            channels: vec![Vec::new(); num_channels],
            search: Box::new(BracketSearch::new()),
            interpolator: Box::new(PolynomialInterpolator::default()),
            error_estimates: vec![0.0; num_channels],
            check_extrapolation: false,
            strict_ordering: false,
            independent_info: ColumnInfo::named("x"),
            channel_info: (0..num_channels)
                .map(|i| ColumnInfo::named(default_channel_name(i)))
                .collect(),
        })
    }

    /// Use a polynomial interpolator over `window` samples.
    pub fn with_window_size(self, window: usize) -> Result<Self> {
        let interpolator = PolynomialInterpolator::new(window)?;
        Ok(self.with_interpolator(Box::new(interpolator)))
    }

    /// Replace the bracketing strategy.
    pub fn with_search(mut self, search: Box<dyn TableSearch>) -> Self {
        self.search = search;
        self
    }

    /// Replace the interpolator.
    ///
    /// The series owns the extrapolation diagnostic, so the interpolator's
    /// own check is switched off.
    pub fn with_interpolator(mut self, mut interpolator: Box<dyn Interpolator>) -> Self {
        interpolator.set_check_extrapolation(false);
        self.interpolator = interpolator;
        self
    }

    pub fn interpolator(&self) -> &dyn Interpolator {
        self.interpolator.as_ref()
    }

    /// Log a warning whenever a query falls outside its interpolation window.
    pub fn set_check_extrapolation(&mut self, check: bool) {
        self.check_extrapolation = check;
    }

    /// Reject appends that break strict monotonicity of `x`.
    ///
    /// Off by default: ordering is the caller's responsibility, and
    /// [`check_monotonic`](Self::check_monotonic) detects violations after
    /// the fact.
    pub fn set_strict_ordering(&mut self, strict: bool) {
        self.strict_ordering = strict;
    }

    pub fn strict_ordering(&self) -> bool {
        self.strict_ordering
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn window_size(&self) -> usize {
        self.interpolator.window_size()
    }

    /// Append one sample.
    pub fn append(&mut self, x: f64, y: &[f64]) -> Result<()> {
        if y.len() != self.channels.len() {
            return Err(SamplingError::ChannelCountMismatch {
                expected: self.channels.len(),
                got: y.len(),
            });
        }
        if self.strict_ordering {
            self.check_next(x)?;
        }

        self.x.push(x);
        for (channel, &value) in self.channels.iter_mut().zip(y) {
            channel.push(value);
        }
        Ok(())
    }

    fn check_next(&self, x: f64) -> Result<()> {
        let Some(&previous) = self.x.last() else {
            return Ok(());
        };
        let ordered = if self.x.len() == 1 {
            x > previous || x < previous
        } else {
            match Direction::of(&self.x) {
                Direction::Ascending => x > previous,
                Direction::Descending => x < previous,
            }
        };
        if ordered {
            Ok(())
        } else {
            Err(SamplingError::NonMonotonic {
                index: self.x.len(),
                previous,
                value: x,
            })
        }
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.x.len() {
            Ok(())
        } else {
            Err(SamplingError::OutOfRange {
                index,
                len: self.x.len(),
            })
        }
    }

    fn check_channel(&self, channel: usize) -> Result<()> {
        if channel < self.channels.len() {
            Ok(())
        } else {
            Err(SamplingError::ChannelOutOfRange {
                channel,
                num_channels: self.channels.len(),
            })
        }
    }

    /// The stored sample at `index`: `(x, [y_0, .., y_{n-1}])`.
    pub fn retrieve_by_index(&self, index: usize) -> Result<(f64, Vec<f64>)> {
        self.check_index(index)?;
        let y = self.channels.iter().map(|channel| channel[index]).collect();
        Ok((self.x[index], y))
    }

    /// Independent value of sample `index`.
    pub fn independent(&self, index: usize) -> Result<f64> {
        self.check_index(index)?;
        Ok(self.x[index])
    }

    /// Channel `channel` of sample `index`.
    pub fn value(&self, index: usize, channel: usize) -> Result<f64> {
        self.check_channel(channel)?;
        self.check_index(index)?;
        Ok(self.channels[channel][index])
    }

    pub fn x_values(&self) -> &[f64] {
        &self.x
    }

    pub fn channel(&self, channel: usize) -> Result<&[f64]> {
        self.check_channel(channel)?;
        Ok(&self.channels[channel])
    }

    /// Interpolate every channel at `x_target`.
    pub fn retrieve(&mut self, x_target: f64) -> Result<Vec<f64>> {
        let mut values = vec![0.0; self.channels.len()];
        self.retrieve_into(x_target, &mut values)?;
        Ok(values)
    }

    /// Interpolate every channel at `x_target` into `out`.
    ///
    /// `out` must hold exactly [`num_channels`](Self::num_channels) values.
    pub fn retrieve_into(&mut self, x_target: f64, out: &mut [f64]) -> Result<()> {
        if out.len() != self.channels.len() {
            return Err(SamplingError::ChannelCountMismatch {
                expected: self.channels.len(),
                got: out.len(),
            });
        }
        interpolate_channels(
            x_target,
            &self.x,
            &self.channels,
            self.search.as_mut(),
            self.interpolator.as_mut(),
            self.check_extrapolation,
            out,
            &mut self.error_estimates,
        )?;
        Ok(())
    }

    /// Interpolate a single channel at `x_target`.
    pub fn retrieve_channel(&mut self, x_target: f64, channel: usize) -> Result<f64> {
        self.check_channel(channel)?;
        let mut value = [0.0];
        interpolate_channels(
            x_target,
            &self.x,
            std::slice::from_ref(&self.channels[channel]),
            self.search.as_mut(),
            self.interpolator.as_mut(),
            self.check_extrapolation,
            &mut value,
            &mut self.error_estimates[channel..=channel],
        )?;
        Ok(value[0])
    }

    /// Per-channel error estimates from the most recent retrieval.
    pub fn last_error_estimates(&self) -> &[f64] {
        &self.error_estimates
    }

    /// Interpolate at each target in turn, reusing the search cursor.
    ///
    /// Fastest when `targets` is sorted the same way as `x`.
    pub fn retrieve_batch(&mut self, targets: &[f64]) -> Result<Vec<Interpolated>> {
        targets
            .iter()
            .map(|&target| {
                let mut values = vec![0.0; self.channels.len()];
                let mut errors = vec![0.0; self.channels.len()];
                let extrapolated = interpolate_channels(
                    target,
                    &self.x,
                    &self.channels,
                    self.search.as_mut(),
                    self.interpolator.as_mut(),
                    self.check_extrapolation,
                    &mut values,
                    &mut errors,
                )?;
                self.error_estimates.copy_from_slice(&errors);
                Ok(Interpolated {
                    x: target,
                    values,
                    error_estimates: errors,
                    extrapolated,
                })
            })
            .collect()
    }

    /// Interpolate at many targets in parallel.
    ///
    /// Each Rayon task works on a contiguous chunk of `targets` with its own
    /// copy of the search cursor and interpolator, so the series itself is
    /// only read. Results come back in the order of `targets`.
    #[cfg(feature = "parallel")]
    pub fn par_retrieve_batch(&self, targets: &[f64]) -> Result<Vec<Interpolated>> {
        use rayon::prelude::*;

        let chunks = targets
            .par_chunks(PARALLEL_CHUNK)
            .map(|chunk| {
                let mut search = self.search.box_clone();
                let mut interpolator = self.interpolator.box_clone();
                chunk
                    .iter()
                    .map(|&target| {
                        let mut values = vec![0.0; self.channels.len()];
                        let mut errors = vec![0.0; self.channels.len()];
                        let extrapolated = interpolate_channels(
                            target,
                            &self.x,
                            &self.channels,
                            search.as_mut(),
                            interpolator.as_mut(),
                            self.check_extrapolation,
                            &mut values,
                            &mut errors,
                        )?;
                        Ok(Interpolated {
                            x: target,
                            values,
                            error_estimates: errors,
                            extrapolated,
                        })
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(chunks.into_iter().flatten().collect())
    }

    /// Index of the largest value in `channel` (first one on ties).
    pub fn argmax(&self, channel: usize) -> Result<Option<usize>> {
        self.check_channel(channel)?;
        Ok(extreme_index(&self.channels[channel], |candidate, best| candidate > best))
    }

    /// Index of the smallest value in `channel` (first one on ties).
    pub fn argmin(&self, channel: usize) -> Result<Option<usize>> {
        self.check_channel(channel)?;
        Ok(extreme_index(&self.channels[channel], |candidate, best| candidate < best))
    }

    /// Drop every sample and reset the search cursor. Metadata is kept.
    pub fn clear(&mut self) {
        self.x.clear();
        for channel in &mut self.channels {
            channel.clear();
        }
        self.search.reset();
        self.error_estimates.fill(0.0);
    }

    /// Verify that the stored `x` values are strictly monotonic.
    pub fn check_monotonic(&self) -> Result<Direction> {
        check_monotonic(&self.x)
    }

    /// `(min, max)` of the stored `x` values.
    pub fn independent_range(&self) -> Option<(f64, f64)> {
        let first = *self.x.first()?;
        let last = *self.x.last()?;
        Some(if first <= last { (first, last) } else { (last, first) })
    }

    pub fn independent_info(&self) -> &ColumnInfo {
        &self.independent_info
    }

    pub fn channel_info(&self) -> &[ColumnInfo] {
        &self.channel_info
    }

    pub fn set_independent_info(&mut self, info: ColumnInfo) {
        self.independent_info = info;
    }

    /// Replace the metadata of every channel at once.
    pub fn set_channel_info(&mut self, info: Vec<ColumnInfo>) -> Result<()> {
        self.check_labels(info.len())?;
        self.channel_info = info;
        Ok(())
    }

    pub fn set_independent_name(&mut self, name: impl Into<String>) {
        self.independent_info.name = name.into();
    }

    pub fn set_independent_unit(&mut self, unit: impl Into<String>) {
        self.independent_info.unit = Some(unit.into());
    }

    /// Name every channel. `names` must have one entry per channel.
    pub fn set_channel_names<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        self.check_labels(names.len())?;
        for (info, name) in self.channel_info.iter_mut().zip(names) {
            info.name = name.as_ref().to_string();
        }
        Ok(())
    }

    /// Set the unit of every channel. `units` must have one entry per channel.
    pub fn set_channel_units<S: AsRef<str>>(&mut self, units: &[S]) -> Result<()> {
        self.check_labels(units.len())?;
        for (info, unit) in self.channel_info.iter_mut().zip(units) {
            info.unit = Some(unit.as_ref().to_string());
        }
        Ok(())
    }

    fn check_labels(&self, got: usize) -> Result<()> {
        if got == self.channels.len() {
            Ok(())
        } else {
            Err(SamplingError::ChannelCountMismatch {
                expected: self.channels.len(),
                got,
            })
        }
    }

    /// Copy the logical content into a serialisable snapshot.
    pub fn snapshot(&self) -> SeriesSnapshot {
        SeriesSnapshot {
            independent: Column {
                info: self.independent_info.clone(),
                values: self.x.clone(),
            },
            channels: self
                .channel_info
                .iter()
                .zip(&self.channels)
                .map(|(info, values)| Column {
                    info: info.clone(),
                    values: values.clone(),
                })
                .collect(),
        }
    }

    /// Rebuild a series (default search and interpolator) from a snapshot.
    pub fn from_snapshot(snapshot: SeriesSnapshot) -> Result<Self> {
        let mut series = Self::new(snapshot.channels.len())?;
        let len = snapshot.independent.values.len();
        for column in &snapshot.channels {
            if column.values.len() != len {
                return Err(SamplingError::ColumnLengthMismatch {
                    column: column.info.name.clone(),
                    expected: len,
                    got: column.values.len(),
                });
            }
        }

        series.independent_info = snapshot.independent.info;
        series.x = snapshot.independent.values;
        series.channel_info = snapshot.channels.iter().map(|c| c.info.clone()).collect();
        series.channels = snapshot.channels.into_iter().map(|c| c.values).collect();
        Ok(series)
    }

    /// Pretty JSON of [`snapshot`](Self::snapshot).
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.snapshot())
    }
}

/// Bracket `x_target` and choose where its interpolation window starts.
fn locate_window(
    x_target: f64,
    x: &[f64],
    search: &mut dyn TableSearch,
    window: usize,
) -> Result<usize> {
    if x.is_empty() {
        return Err(SamplingError::EmptySequence);
    }
    if x.len() < window {
        return Err(SamplingError::InsufficientSamples {
            available: x.len(),
            required: window,
        });
    }
    let bracket = search.find(x_target, x)?;
    let start = interpolation_window_start(x.len(), bracket.as_index(), window);
    trace!("x = {} bracket {:?} window start {}", x_target, bracket, start);
    Ok(start)
}

/// Interpolate every channel over the shared window. Returns whether the
/// target lay outside that window.
#[allow(clippy::too_many_arguments)]
fn interpolate_channels(
    x_target: f64,
    x: &[f64],
    channels: &[Vec<f64>],
    search: &mut dyn TableSearch,
    interpolator: &mut dyn Interpolator,
    check_extrapolation: bool,
    values: &mut [f64],
    errors: &mut [f64],
) -> Result<bool> {
    let window = interpolator.window_size();
    let start = locate_window(x_target, x, search, window)?;
    let xw = &x[start..start + window];

    let extrapolated = if check_extrapolation {
        warn_on_extrapolation(x_target, xw)
    } else {
        is_extrapolation(x_target, xw)
    };

    for (c, channel) in channels.iter().enumerate() {
        let (value, error) = interpolator.interpolate(x_target, xw, &channel[start..start + window])?;
        values[c] = value;
        errors[c] = error;
    }
    Ok(extrapolated)
}

fn extreme_index(values: &[f64], better: impl Fn(f64, f64) -> bool) -> Option<usize> {
    let mut iter = values.iter().enumerate();
    let (mut best_index, mut best) = iter.next().map(|(i, &v)| (i, v))?;
    for (i, &v) in iter {
        if better(v, best) {
            best_index = i;
            best = v;
        }
    }
    Some(best_index)
}
