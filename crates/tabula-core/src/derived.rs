//! Sampled data that carries its own derivatives.
//!
//! When a simulation can supply $dy/dx$ alongside $y$ (an ODE state and its
//! right-hand side, say), two neighbouring samples already determine a cubic
//! Hermite segment. [`SampledDerivedSeries`] stores both and interpolates with
//! [`HermiteSegment`] over the bracketing pair, which needs only two samples
//! instead of the three a quadratic window uses.

use crate::error::{Result, SamplingError};
use crate::interp::{interpolation_window_start, HermiteSegment};
use crate::search::{BracketSearch, TableSearch};

const HERMITE_WINDOW: usize = 2;

/// Time series of values and their first derivatives.
#[derive(Debug, Clone)]
pub struct SampledDerivedSeries {
    x: Vec<f64>,
    values: Vec<Vec<f64>>,
    derivatives: Vec<Vec<f64>>,
    search: Box<dyn TableSearch>,
}

impl SampledDerivedSeries {
    pub fn new(num_channels: usize) -> Result<Self> {
        if num_channels == 0 {
            return Err(SamplingError::NoChannels);
        }
        Ok(Self {
            x: Vec::new(),
            values: vec![Vec::new(); num_channels],
            derivatives: vec![Vec::new(); num_channels],
            search: Box::new(BracketSearch::new()),
        })
    }

    pub fn with_search(mut self, search: Box<dyn TableSearch>) -> Self {
        self.search = search;
        self
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn num_channels(&self) -> usize {
        self.values.len()
    }

    pub fn x_values(&self) -> &[f64] {
        &self.x
    }

    /// Append one sample with its derivatives.
    pub fn append(&mut self, x: f64, y: &[f64], dy: &[f64]) -> Result<()> {
        let expected = self.values.len();
        for got in [y.len(), dy.len()] {
            if got != expected {
                return Err(SamplingError::ChannelCountMismatch { expected, got });
            }
        }
        self.x.push(x);
        for c in 0..expected {
            self.values[c].push(y[c]);
            self.derivatives[c].push(dy[c]);
        }
        Ok(())
    }

    /// The stored sample at `index`: `(x, y, dy)`.
    pub fn retrieve_by_index(&self, index: usize) -> Result<(f64, Vec<f64>, Vec<f64>)> {
        if index >= self.x.len() {
            return Err(SamplingError::OutOfRange {
                index,
                len: self.x.len(),
            });
        }
        Ok((
            self.x[index],
            self.values.iter().map(|v| v[index]).collect(),
            self.derivatives.iter().map(|d| d[index]).collect(),
        ))
    }

    fn segment_start(&mut self, x_target: f64) -> Result<usize> {
        if self.x.is_empty() {
            return Err(SamplingError::EmptySequence);
        }
        if self.x.len() < HERMITE_WINDOW {
            return Err(SamplingError::InsufficientSamples {
                available: self.x.len(),
                required: HERMITE_WINDOW,
            });
        }
        let bracket = self.search.find(x_target, &self.x)?;
        Ok(interpolation_window_start(
            self.x.len(),
            bracket.as_index(),
            HERMITE_WINDOW,
        ))
    }

    fn segment(&self, start: usize, channel: usize) -> Result<HermiteSegment> {
        let (y, dy) = (&self.values[channel], &self.derivatives[channel]);
        HermiteSegment::new(
            self.x[start],
            self.x[start + 1],
            y[start],
            y[start + 1],
            dy[start],
            dy[start + 1],
        )
    }

    /// Interpolate every channel at `x_target`.
    pub fn retrieve(&mut self, x_target: f64) -> Result<Vec<f64>> {
        let start = self.segment_start(x_target)?;
        (0..self.values.len())
            .map(|c| Ok(self.segment(start, c)?.evaluate(x_target)))
            .collect()
    }

    /// Interpolate one channel at `x_target`.
    pub fn retrieve_channel(&mut self, x_target: f64, channel: usize) -> Result<f64> {
        if channel >= self.values.len() {
            return Err(SamplingError::ChannelOutOfRange {
                channel,
                num_channels: self.values.len(),
            });
        }
        let start = self.segment_start(x_target)?;
        Ok(self.segment(start, channel)?.evaluate(x_target))
    }

    /// Interpolated values and derivatives of every channel at `x_target`.
    pub fn retrieve_with_derivatives(&mut self, x_target: f64) -> Result<(Vec<f64>, Vec<f64>)> {
        let start = self.segment_start(x_target)?;
        let mut values = Vec::with_capacity(self.values.len());
        let mut derivatives = Vec::with_capacity(self.values.len());
        for c in 0..self.values.len() {
            let segment = self.segment(start, c)?;
            values.push(segment.evaluate(x_target));
            derivatives.push(segment.derivative(x_target));
        }
        Ok((values, derivatives))
    }

    /// Drop every sample and reset the search cursor.
    pub fn clear(&mut self) {
        self.x.clear();
        self.values.iter_mut().for_each(Vec::clear);
        self.derivatives.iter_mut().for_each(Vec::clear);
        self.search.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn oscillator() -> SampledDerivedSeries {
        // x(t) = cos t, v(t) = -sin t, stored with their derivatives.
        let mut series = SampledDerivedSeries::new(2).unwrap();
        for i in 0..=20 {
            let t = 0.1 * i as f64;
            series
                .append(t, &[t.cos(), -t.sin()], &[-t.sin(), -t.cos()])
                .unwrap();
        }
        series
    }

    #[test]
    fn test_hermite_tracks_smooth_motion() {
        let mut series = oscillator();
        for t in [0.05, 0.73, 1.41, 1.99] {
            let y = series.retrieve(t).unwrap();
            assert_abs_diff_eq!(y[0], t.cos(), epsilon = 1e-6);
            assert_abs_diff_eq!(y[1], -t.sin(), epsilon = 1e-6);
        }
        let (values, derivatives) = series.retrieve_with_derivatives(0.73).unwrap();
        assert_abs_diff_eq!(values[0], 0.73_f64.cos(), epsilon = 1e-6);
        assert_abs_diff_eq!(derivatives[0], -0.73_f64.sin(), epsilon = 1e-4);
        assert_abs_diff_eq!(series.retrieve_channel(1.41, 1).unwrap(), -1.41_f64.sin(), epsilon = 1e-6);
    }

    #[test]
    fn test_exact_at_samples() {
        let mut series = oscillator();
        let (x, y, dy) = series.retrieve_by_index(7).unwrap();
        assert_abs_diff_eq!(x, 0.7, epsilon = 1e-15);
        let interpolated = series.retrieve(x).unwrap();
        assert_abs_diff_eq!(interpolated[0], y[0], epsilon = 1e-14);
        assert_eq!(dy.len(), 2);
    }

    #[test]
    fn test_needs_two_samples() {
        let mut series = SampledDerivedSeries::new(1).unwrap();
        assert_eq!(series.retrieve(0.0), Err(SamplingError::EmptySequence));
        series.append(0.0, &[1.0], &[0.0]).unwrap();
        assert_eq!(
            series.retrieve(0.0),
            Err(SamplingError::InsufficientSamples { available: 1, required: 2 })
        );
        assert!(series.append(1.0, &[1.0], &[0.0, 2.0]).is_err());
        series.append(1.0, &[3.0], &[2.0]).unwrap();
        assert_abs_diff_eq!(series.retrieve(1.0).unwrap()[0], 3.0, epsilon = 1e-14);

        series.clear();
        assert!(series.is_empty());
    }
}
