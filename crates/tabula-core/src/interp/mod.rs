//! One-dimensional interpolation over small sample windows.
//!
//! An [`Interpolator`] consumes a window of `window_size()` neighbouring
//! samples and returns the interpolated value together with an error
//! estimate (the size of the last correction applied). The window is chosen
//! by the caller, normally via [`interpolation_window_start`] after a
//! bracketing search.
//!
//! ## Implementations
//!
//! - [`polynomial::PolynomialInterpolator`]: Neville's algorithm.
//! - [`rational::RationalInterpolator`]: Bulirsch–Stoer diagonal rational
//!   functions, for data with nearby poles.
//! - [`hermite`]: two-point cubic Hermite using stored derivatives.

pub mod hermite;
pub mod polynomial;
pub mod rational;

use log::warn;

use crate::error::{Result, SamplingError};

pub use hermite::{hermite, HermiteSegment};
pub use polynomial::PolynomialInterpolator;
pub use rational::RationalInterpolator;

/// Default window: three samples, i.e. quadratic interpolation.
pub const DEFAULT_WINDOW_SIZE: usize = 3;

/// Seed offset applied to the `d` tableau column so that degenerate data
/// never yields an exact-zero denominator.
pub(crate) const TINY: f64 = 1.0e-25;

/// Interpolation over a fixed-size window of samples.
pub trait Interpolator: Send + Sync + std::fmt::Debug {
    /// Number of samples consumed per call.
    fn window_size(&self) -> usize;

    /// Interpolate at `x_target` from `x[..window_size()]`, `y[..window_size()]`.
    ///
    /// Returns `(value, error_estimate)`.
    fn interpolate(&mut self, x_target: f64, x: &[f64], y: &[f64]) -> Result<(f64, f64)>;

    /// Error estimate from the last successful call.
    fn error_estimate(&self) -> f64;

    /// Enable the extrapolation diagnostic.
    fn set_check_extrapolation(&mut self, check: bool);

    /// Whether the extrapolation diagnostic is enabled.
    fn checks_extrapolation(&self) -> bool;

    fn box_clone(&self) -> Box<dyn Interpolator>;
}

impl Clone for Box<dyn Interpolator> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// True when `x_target` lies outside the closed range spanned by the window.
pub fn is_extrapolation(x_target: f64, x: &[f64]) -> bool {
    match (x.first(), x.last()) {
        (Some(&first), Some(&last)) => {
            let (lo, hi) = if first <= last { (first, last) } else { (last, first) };
            x_target < lo || x_target > hi
        }
        _ => false,
    }
}

/// Emit the extrapolation warning if `x_target` falls outside the window.
///
/// Advisory only: the interpolated result is still returned.
pub(crate) fn warn_on_extrapolation(x_target: f64, x: &[f64]) -> bool {
    let outside = is_extrapolation(x_target, x);
    if outside {
        warn!(
            "Attempted extrapolation to {} (window range {} to {})",
            x_target,
            x[0],
            x[x.len() - 1]
        );
    }
    outside
}

/// Validate a window size and the lengths of the slices handed to an
/// interpolator.
pub(crate) fn check_window(window: usize, x: &[f64], y: &[f64]) -> Result<()> {
    if x.len() < window {
        return Err(SamplingError::InsufficientSamples {
            available: x.len(),
            required: window,
        });
    }
    if y.len() < window {
        return Err(SamplingError::ChannelCountMismatch {
            expected: window,
            got: y.len(),
        });
    }
    Ok(())
}

/// Reject windows with repeated abscissae.
///
/// Runs before the exact-hit shortcut, so a target sitting on a duplicated
/// sample is rejected too.
pub(crate) fn check_distinct(x: &[f64]) -> Result<()> {
    for i in 0..x.len() {
        for j in i + 1..x.len() {
            if x[i] == x[j] {
                return Err(SamplingError::DuplicateAbscissa {
                    first: i,
                    second: j,
                    x: x[i],
                });
            }
        }
    }
    Ok(())
}

/// Index of the window sample closest to `x_target`, with its distance.
///
/// The first of several equidistant samples wins.
pub(crate) fn closest_sample(x_target: f64, x: &[f64]) -> (usize, f64) {
    let mut best = 0;
    let mut best_diff = (x[0] - x_target).abs();
    for (i, xi) in x.iter().enumerate().skip(1) {
        let diff = (xi - x_target).abs();
        if diff < best_diff {
            best = i;
            best_diff = diff;
        }
    }
    (best, best_diff)
}

/// Choose the first sample of an interpolation window.
///
/// Centres a window of `window` samples on the bracket `index_low` (as
/// returned by [`Bracket::as_index`](crate::search::Bracket::as_index)) and
/// clamps it so that it fits inside `len` samples. Requires `len >= window`.
///
/// For the default window of 3 this is `min(index_low, len - 3)` with `-1`
/// raised to 0.
pub fn interpolation_window_start(len: usize, index_low: isize, window: usize) -> usize {
    let centred = index_low - (window / 2) as isize + 1;
    let last_start = len.saturating_sub(window);
    centred.clamp(0, last_start as isize) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_start_default_size_matches_simple_clamp() {
        let len = 10;
        for index in -1..10_isize {
            let expected = index.clamp(0, (len - 3) as isize) as usize;
            assert_eq!(interpolation_window_start(len, index, 3), expected);
        }
    }

    #[test]
    fn test_window_start_centres_larger_windows() {
        assert_eq!(interpolation_window_start(20, 10, 4), 9);
        assert_eq!(interpolation_window_start(20, 10, 5), 9);
        assert_eq!(interpolation_window_start(20, 0, 5), 0);
        assert_eq!(interpolation_window_start(20, 19, 5), 15);
        assert_eq!(interpolation_window_start(20, 10, 2), 10);
    }

    #[test]
    fn test_is_extrapolation_both_directions() {
        let up = [1.0, 2.0, 3.0];
        assert!(!is_extrapolation(1.0, &up));
        assert!(!is_extrapolation(2.5, &up));
        assert!(is_extrapolation(0.5, &up));
        assert!(is_extrapolation(3.5, &up));

        let down = [3.0, 2.0, 1.0];
        assert!(!is_extrapolation(1.5, &down));
        assert!(is_extrapolation(3.01, &down));
        assert!(is_extrapolation(-1.0, &down));
    }

    #[test]
    fn test_closest_sample_prefers_first_tie() {
        assert_eq!(closest_sample(2.5, &[2.0, 3.0, 4.0]), (0, 0.5));
        assert_eq!(closest_sample(3.9, &[2.0, 3.0, 4.0]).0, 2);
    }
}
