//! Two-point cubic Hermite interpolation.
//!
//! With values $y_0, y_1$ and derivatives $y'_0, y'_1$ at $x_0, x_1$, and
//! $s = (x - x_0) / h$ where $h = x_1 - x_0$:
//!
//! $$
//! p(x) = (1 - 3s^2 + 2s^3)\,y_0 + (3s^2 - 2s^3)\,y_1
//!      + (s^3 - 2s^2 + s)\,h\,y'_0 + (s^3 - s^2)\,h\,y'_1
//! $$

use crate::error::{Result, SamplingError};

/// A cubic Hermite segment between two samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HermiteSegment {
    x0: f64,
    range: f64,
    y0: f64,
    y1: f64,
    dy0: f64,
    dy1: f64,
}

impl HermiteSegment {
    /// Build a segment. Fails if `x0 == x1`.
    pub fn new(x0: f64, x1: f64, y0: f64, y1: f64, dy0: f64, dy1: f64) -> Result<Self> {
        let range = x1 - x0;
        if range == 0.0 {
            return Err(SamplingError::DuplicateAbscissa {
                first: 0,
                second: 1,
                x: x0,
            });
        }
        Ok(Self {
            x0,
            range,
            y0,
            y1,
            dy0,
            dy1,
        })
    }

    /// Value of the cubic at `x`.
    pub fn evaluate(&self, x: f64) -> f64 {
        let s = (x - self.x0) / self.range;
        let s2 = s * s;
        let s3 = s2 * s;
        let coeff2 = 3.0 * s2 - 2.0 * s3;
        let coeff1 = 1.0 - coeff2;
        let coeff4 = (s3 - s2) * self.range;
        let coeff3 = coeff4 + (s - s2) * self.range;
        coeff1 * self.y0 + coeff2 * self.y1 + coeff3 * self.dy0 + coeff4 * self.dy1
    }

    /// First derivative of the cubic at `x`.
    pub fn derivative(&self, x: f64) -> f64 {
        let s = (x - self.x0) / self.range;
        let s2 = s * s;
        let dcoeff2 = (6.0 * s - 6.0 * s2) / self.range;
        let dcoeff3 = 3.0 * s2 - 4.0 * s + 1.0;
        let dcoeff4 = 3.0 * s2 - 2.0 * s;
        dcoeff2 * (self.y1 - self.y0) + dcoeff3 * self.dy0 + dcoeff4 * self.dy1
    }
}

/// One-shot cubic Hermite evaluation.
pub fn hermite(x: f64, x0: f64, x1: f64, y0: f64, y1: f64, dy0: f64, dy1: f64) -> Result<f64> {
    Ok(HermiteSegment::new(x0, x1, y0, y1, dy0, dy1)?.evaluate(x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_matches_endpoints_and_slopes() {
        let seg = HermiteSegment::new(1.0, 3.0, 2.0, -1.0, 0.5, 4.0).unwrap();
        assert_abs_diff_eq!(seg.evaluate(1.0), 2.0, epsilon = 1e-14);
        assert_abs_diff_eq!(seg.evaluate(3.0), -1.0, epsilon = 1e-14);
        assert_abs_diff_eq!(seg.derivative(1.0), 0.5, epsilon = 1e-14);
        assert_abs_diff_eq!(seg.derivative(3.0), 4.0, epsilon = 1e-14);
    }

    #[test]
    fn test_reproduces_cubic() {
        let f = |x: f64| x * x * x - 2.0 * x + 1.0;
        let df = |x: f64| 3.0 * x * x - 2.0;
        let (a, b) = (-0.5, 1.5);
        let seg = HermiteSegment::new(a, b, f(a), f(b), df(a), df(b)).unwrap();
        for x in [-0.4, 0.0, 0.3, 1.1] {
            assert_abs_diff_eq!(seg.evaluate(x), f(x), epsilon = 1e-12);
            assert_abs_diff_eq!(seg.derivative(x), df(x), epsilon = 1e-12);
        }
        assert_abs_diff_eq!(hermite(0.3, a, b, f(a), f(b), df(a), df(b)).unwrap(), f(0.3), epsilon = 1e-12);
    }

    #[test]
    fn test_zero_width_segment_rejected() {
        assert!(matches!(
            HermiteSegment::new(2.0, 2.0, 0.0, 1.0, 0.0, 0.0),
            Err(SamplingError::DuplicateAbscissa { .. })
        ));
    }
}
