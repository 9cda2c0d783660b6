//! Log-linear interpolation.

use super::{check_knots, out_of_range, segment, Interpolator};
use crate::error::{MathError, MathResult};

/// Linear interpolation of `ln(y)`.
///
/// On discount factors this gives piecewise constant continuously compounded forwards.
///
/// # Example
///
/// ```rust
/// use curvewatch_math::interpolation::{Interpolator, LogLinearInterpolator};
///
/// let interp = LogLinearInterpolator::new(vec![0.0, 1.0, 2.0], vec![1.0, 0.96, 0.92]).unwrap();
/// let df = interp.interpolate(1.5).unwrap();
/// assert!(df < 0.96 && df > 0.92);
/// ```
#[derive(Debug, Clone)]
pub struct LogLinearInterpolator {
    xs: Vec<f64>,
    log_ys: Vec<f64>,
}

impl LogLinearInterpolator {
    /// Builds the interpolator.
    ///
    /// # Errors
    ///
    /// Fewer than 2 points, unsorted `xs`, mismatched lengths, or a non-positive `y`.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Self> {
        check_knots(&xs, &ys, 2)?;
        let log_ys = ys
            .iter()
            .enumerate()
            .map(|(i, &y)| {
                if y > 0.0 {
                    Ok(y.ln())
                } else {
                    Err(MathError::invalid_input(format!(
                        "y[{i}] = {y} is not positive; log-linear requires positive values"
                    )))
                }
            })
            .collect::<MathResult<Vec<_>>>()?;

        Ok(Self { xs, log_ys })
    }

    /// Slope of `ln(y)` on segment `i`.
    fn slope(&self, i: usize) -> f64 {
        (self.log_ys[i + 1] - self.log_ys[i]) / (self.xs[i + 1] - self.xs[i])
    }

    fn log_value(&self, x: f64) -> MathResult<(f64, usize)> {
        if !self.in_range(x) {
            return Err(out_of_range(&self.xs, x));
        }
        let i = segment(&self.xs, x);
        Ok((self.log_ys[i] + self.slope(i) * (x - self.xs[i]), i))
    }
}

impl Interpolator for LogLinearInterpolator {
    fn interpolate(&self, x: f64) -> MathResult<f64> {
        self.log_value(x).map(|(log_y, _)| log_y.exp())
    }

    fn derivative(&self, x: f64) -> MathResult<f64> {
        let (log_y, i) = self.log_value(x)?;
        Ok(log_y.exp() * self.slope(i))
    }

    fn min_x(&self) -> f64 {
        self.xs[0]
    }

    fn max_x(&self) -> f64 {
        self.xs[self.xs.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_passes_through_knots() {
        let xs = vec![0.0, 1.0, 2.0, 3.0];
        let ys = vec![1.0, 0.97, 0.94, 0.91];
        let interp = LogLinearInterpolator::new(xs.clone(), ys.clone()).unwrap();
        for (x, y) in xs.iter().zip(&ys) {
            assert_relative_eq!(interp.interpolate(*x).unwrap(), *y, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_geometric_midpoint() {
        let interp = LogLinearInterpolator::new(vec![0.0, 2.0], vec![1.0, 0.81]).unwrap();
        assert_relative_eq!(interp.interpolate(1.0).unwrap(), 0.9, epsilon = 1e-14);
    }

    #[test]
    fn test_constant_forward_within_segment() {
        let interp = LogLinearInterpolator::new(vec![0.0, 1.0, 3.0], vec![1.0, 0.96, 0.90]).unwrap();
        let f1 = -interp.derivative(1.2).unwrap() / interp.interpolate(1.2).unwrap();
        let f2 = -interp.derivative(2.8).unwrap() / interp.interpolate(2.8).unwrap();
        assert_relative_eq!(f1, f2, epsilon = 1e-12);
        assert_relative_eq!(f1, (0.96f64 / 0.90).ln() / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_non_positive() {
        assert!(LogLinearInterpolator::new(vec![0.0, 1.0], vec![1.0, 0.0]).is_err());
        assert!(LogLinearInterpolator::new(vec![0.0, 1.0], vec![1.0, -0.5]).is_err());
    }

    #[test]
    fn test_out_of_range() {
        let interp = LogLinearInterpolator::new(vec![0.0, 1.0], vec![1.0, 0.95]).unwrap();
        assert!(interp.interpolate(-0.1).is_err());
        assert!(interp.interpolate(1.1).is_err());
    }
}
