//! Log-cubic interpolation.

use super::{CubicSpline, Interpolator};
use crate::error::{MathError, MathResult};

/// Natural cubic spline through `ln(y)`.
///
/// Smoother forwards than [`super::LogLinearInterpolator`], but the spline can overshoot
/// between knots, so callers that need monotone output must check it.
#[derive(Debug, Clone)]
pub struct LogCubicInterpolator {
    spline: CubicSpline,
}

impl LogCubicInterpolator {
    /// Builds the interpolator.
    ///
    /// # Errors
    ///
    /// Fewer than 3 points, unsorted `xs`, mismatched lengths, or a non-positive `y`.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Self> {
        if let Some((i, y)) = ys.iter().enumerate().find(|(_, y)| **y <= 0.0) {
            return Err(MathError::invalid_input(format!(
                "y[{i}] = {y} is not positive; log-cubic requires positive values"
            )));
        }
        let log_ys = ys.iter().map(|y| y.ln()).collect();
        Ok(Self {
            spline: CubicSpline::new(xs, log_ys)?,
        })
    }
}

impl Interpolator for LogCubicInterpolator {
    fn interpolate(&self, x: f64) -> MathResult<f64> {
        self.spline.interpolate(x).map(f64::exp)
    }

    fn derivative(&self, x: f64) -> MathResult<f64> {
        Ok(self.interpolate(x)? * self.spline.derivative(x)?)
    }

    fn min_x(&self) -> f64 {
        self.spline.min_x()
    }

    fn max_x(&self) -> f64 {
        self.spline.max_x()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_exact_on_flat_continuous_rate() {
        // ln(df) linear in t is reproduced exactly by a natural spline
        let xs: Vec<f64> = vec![0.0, 1.0, 2.0, 5.0, 10.0];
        let ys: Vec<f64> = xs.iter().map(|t| (-0.04 * t).exp()).collect();
        let interp = LogCubicInterpolator::new(xs, ys).unwrap();
        assert_relative_eq!(interp.interpolate(3.7).unwrap(), (-0.04f64 * 3.7).exp(), epsilon = 1e-13);
        let fwd = -interp.derivative(7.5).unwrap() / interp.interpolate(7.5).unwrap();
        assert_relative_eq!(fwd, 0.04, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_non_positive() {
        assert!(LogCubicInterpolator::new(vec![0.0, 1.0, 2.0], vec![1.0, 0.0, 0.9]).is_err());
    }

    #[test]
    fn test_needs_three_points() {
        let err = LogCubicInterpolator::new(vec![0.0, 1.0], vec![1.0, 0.9]).unwrap_err();
        assert_eq!(err, MathError::insufficient_data(3, 2));
    }
}
