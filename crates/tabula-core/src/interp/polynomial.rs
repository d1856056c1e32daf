//! Polynomial interpolation by Neville's algorithm.
//!
//! For a window of $n$ samples the unique polynomial of degree $n - 1$
//! through them is evaluated at the target by building the Neville tableau
//! column by column. Each column adds a correction $\delta_m$ taken from
//! either the `c` (up) or `d` (down) differences, choosing whichever keeps
//! the path through the tableau closest to the centre. The last correction
//! is the error estimate.

use crate::error::{Result, SamplingError};

use super::{
    check_distinct, check_window, closest_sample, warn_on_extrapolation, Interpolator,
    DEFAULT_WINDOW_SIZE, TINY,
};

/// Neville polynomial interpolator over a fixed window.
#[derive(Debug, Clone)]
pub struct PolynomialInterpolator {
    window: usize,
    c: Vec<f64>,
    d: Vec<f64>,
    error_estimate: f64,
    check_extrapolation: bool,
}

impl Default for PolynomialInterpolator {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW_SIZE,
            c: vec![0.0; DEFAULT_WINDOW_SIZE],
            d: vec![0.0; DEFAULT_WINDOW_SIZE],
            error_estimate: 0.0,
            check_extrapolation: false,
        }
    }
}

impl PolynomialInterpolator {
    /// Create an interpolator using `window` samples (degree `window - 1`).
    pub fn new(window: usize) -> Result<Self> {
        if window < 2 {
            return Err(SamplingError::InvalidWindowSize(window));
        }
        Ok(Self {
            window,
            c: vec![0.0; window],
            d: vec![0.0; window],
            ..Default::default()
        })
    }
}

impl Interpolator for PolynomialInterpolator {
    fn window_size(&self) -> usize {
        self.window
    }

    fn interpolate(&mut self, x_target: f64, x: &[f64], y: &[f64]) -> Result<(f64, f64)> {
        let n = self.window;
        check_window(n, x, y)?;
        let x = &x[..n];
        let y = &y[..n];
        check_distinct(x)?;

        if self.check_extrapolation {
            warn_on_extrapolation(x_target, x);
        }

        for i in 0..n {
            self.c[i] = y[i];
            self.d[i] = y[i] + TINY;
        }

        let (closest, distance) = closest_sample(x_target, x);
        if distance == 0.0 {
            self.error_estimate = 0.0;
            return Ok((y[closest], 0.0));
        }

        let mut value = y[closest];
        let mut ns = closest as isize - 1;

        for m in 1..n {
            for i in 0..n - m {
                let idif = x[i] - x_target;
                let imdif = x[i + m] - x_target;
                let width = self.c[i + 1] - self.d[i];
                let denominator = idif - imdif;

                if denominator == 0.0 {
                    return Err(SamplingError::DuplicateAbscissa {
                        first: i,
                        second: i + m,
                        x: x[i],
                    });
                }

                let ratio = width / denominator;
                self.c[i] = idif * ratio;
                self.d[i] = imdif * ratio;
            }

            let correction = if 2 * (ns + 1) < (n - m) as isize {
                self.c[(ns + 1) as usize]
            } else {
                let d = self.d[ns as usize];
                ns -= 1;
                d
            };
            self.error_estimate = correction;
            value += correction;
        }

        Ok((value, self.error_estimate))
    }

    fn error_estimate(&self) -> f64 {
        self.error_estimate
    }

    fn set_check_extrapolation(&mut self, check: bool) {
        self.check_extrapolation = check;
    }

    fn checks_extrapolation(&self) -> bool {
        self.check_extrapolation
    }

    fn box_clone(&self) -> Box<dyn Interpolator> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_quadratic_reproduced_between_samples() {
        let mut interp = PolynomialInterpolator::default();
        let (value, _) = interp.interpolate(2.5, &[2.0, 3.0, 4.0], &[4.0, 9.0, 16.0]).unwrap();
        assert_abs_diff_eq!(value, 6.25, epsilon = 1e-9);
    }

    #[test]
    fn test_exact_hit_returns_sample_with_zero_error() {
        let mut interp = PolynomialInterpolator::default();
        let x = [0.0, 1.5, 4.0];
        let y = [3.0, -2.0, 7.5];
        for (xi, yi) in x.iter().zip(y.iter()) {
            let (value, error) = interp.interpolate(*xi, &x, &y).unwrap();
            assert_eq!(value, *yi);
            assert_eq!(error, 0.0);
            assert_eq!(interp.error_estimate(), 0.0);
        }
    }

    #[test]
    fn test_cubic_reproduced_by_four_point_window() {
        let f = |x: f64| 2.0 * x * x * x - x * x + 0.5 * x - 3.0;
        let x = [-1.0, 0.3, 1.1, 2.0];
        let y: Vec<f64> = x.iter().map(|&v| f(v)).collect();
        let mut interp = PolynomialInterpolator::new(4).unwrap();
        for target in [-0.7, 0.0, 0.9, 1.7, 2.5, -1.5] {
            let (value, _) = interp.interpolate(target, &x, &y).unwrap();
            assert_abs_diff_eq!(value, f(target), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_descending_window() {
        let mut interp = PolynomialInterpolator::default();
        let (value, _) = interp.interpolate(1.5, &[3.0, 2.0, 1.0], &[9.0, 4.0, 1.0]).unwrap();
        assert_abs_diff_eq!(value, 2.25, epsilon = 1e-12);
    }

    #[test]
    fn test_error_estimate_is_last_correction() {
        // Quadratic data: the second correction is the curvature term.
        let mut interp = PolynomialInterpolator::default();
        let (_, error) = interp.interpolate(2.5, &[2.0, 3.0, 4.0], &[4.0, 9.0, 16.0]).unwrap();
        assert_abs_diff_eq!(error, -0.25, epsilon = 1e-12);

        // Linear data has no curvature, so the estimate vanishes.
        let (_, error) = interp.interpolate(2.5, &[2.0, 3.0, 4.0], &[1.0, 2.0, 3.0]).unwrap();
        assert_abs_diff_eq!(error, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_duplicate_abscissa_is_an_error() {
        let mut interp = PolynomialInterpolator::default();
        let result = interp.interpolate(1.5, &[1.0, 1.0, 2.0], &[1.0, 2.0, 3.0]);
        assert!(matches!(
            result,
            Err(SamplingError::DuplicateAbscissa { first: 0, second: 1, .. })
        ));
    }

    #[test]
    fn test_target_on_duplicate_is_an_error() {
        // The exact-hit shortcut must not hide a repeated abscissa.
        let mut interp = PolynomialInterpolator::default();
        for target in [1.0, 2.0] {
            assert!(matches!(
                interp.interpolate(target, &[1.0, 1.0, 2.0], &[0.0, 1.0, 2.0]),
                Err(SamplingError::DuplicateAbscissa { first: 0, second: 1, .. })
            ));
        }
    }

    #[test]
    fn test_invalid_window_and_short_slices() {
        assert_eq!(
            PolynomialInterpolator::new(1).unwrap_err(),
            SamplingError::InvalidWindowSize(1)
        );
        let mut interp = PolynomialInterpolator::default();
        assert!(matches!(
            interp.interpolate(0.5, &[0.0, 1.0], &[0.0, 1.0]),
            Err(SamplingError::InsufficientSamples { available: 2, required: 3 })
        ));
    }

    #[test]
    fn test_extrapolation_still_returns_value() {
        let mut interp = PolynomialInterpolator::default();
        interp.set_check_extrapolation(true);
        assert!(interp.checks_extrapolation());
        let (value, _) = interp.interpolate(5.0, &[2.0, 3.0, 4.0], &[4.0, 9.0, 16.0]).unwrap();
        assert_abs_diff_eq!(value, 25.0, epsilon = 1e-9);
    }
}
