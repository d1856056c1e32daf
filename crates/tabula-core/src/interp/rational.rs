//! Diagonal rational interpolation (Bulirsch–Stoer).
//!
//! Builds the same kind of tableau as [`PolynomialInterpolator`] but the
//! corrections describe a ratio of polynomials of (nearly) equal degree, which
//! tracks functions with poles close to the sampled range far better than a
//! polynomial of the same order.
//!
//! When the rational tableau breaks down (a zero denominator, either from a
//! pole at the target or a 0/0 such as constant data) the same window is
//! interpolated with a polynomial instead.

use log::debug;

use crate::error::{Result, SamplingError};

use super::{
    check_distinct, check_window, closest_sample, warn_on_extrapolation, Interpolator,
    PolynomialInterpolator, DEFAULT_WINDOW_SIZE, TINY,
};

/// Rational-function interpolator over a fixed window.
#[derive(Debug, Clone)]
pub struct RationalInterpolator {
    window: usize,
    c: Vec<f64>,
    d: Vec<f64>,
    error_estimate: f64,
    check_extrapolation: bool,
}

impl Default for RationalInterpolator {
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

impl RationalInterpolator {
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

    fn polynomial_fallback(&mut self, x_target: f64, x: &[f64], y: &[f64]) -> Result<(f64, f64)> {
        debug!("rational tableau broke down at x = {}, using polynomial", x_target);
        let mut fallback = PolynomialInterpolator::new(self.window)?;
        let result = fallback.interpolate(x_target, x, y)?;
        self.error_estimate = result.1;
        Ok(result)
    }
}

impl Interpolator for RationalInterpolator {
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
                let width = self.c[i + 1] - self.d[i];
                let imdif = x[i + m] - x_target;
                let scaled = (x[i] - x_target) * self.d[i] / imdif;
                let denominator = scaled - self.c[i + 1];

                if denominator == 0.0 {
                    return self.polynomial_fallback(x_target, x, y);
                }

                let ratio = width / denominator;
                self.d[i] = self.c[i + 1] * ratio;
                self.c[i] = scaled * ratio;
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
