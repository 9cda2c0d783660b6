//! Natural cubic spline interpolation.

use super::{check_knots, out_of_range, segment, Interpolator};
use crate::error::MathResult;

/// Natural cubic spline (zero second derivative at both ends).
#[derive(Debug, Clone)]
pub struct CubicSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// Second derivatives at each knot
    y2s: Vec<f64>,
}

impl CubicSpline {
    /// Builds the spline.
    ///
    /// # Errors
    ///
    /// Fewer than 3 points, unsorted `xs` or mismatched lengths.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Self> {
        check_knots(&xs, &ys, 3)?;
        let y2s = second_derivatives(&xs, &ys);
        Ok(Self { xs, ys, y2s })
    }

    /// Position inside segment `i`: (h, a, b) with a + b = 1.
    fn weights(&self, i: usize, x: f64) -> (f64, f64, f64) {
        let h = self.xs[i + 1] - self.xs[i];
        let a = (self.xs[i + 1] - x) / h;
        (h, a, 1.0 - a)
    }
}

impl Interpolator for CubicSpline {
    fn interpolate(&self, x: f64) -> MathResult<f64> {
        if !self.in_range(x) {
            return Err(out_of_range(&self.xs, x));
        }
        let i = segment(&self.xs, x);
        let (h, a, b) = self.weights(i, x);

        Ok(a * self.ys[i]
            + b * self.ys[i + 1]
            + ((a * a * a - a) * self.y2s[i] + (b * b * b - b) * self.y2s[i + 1]) * h * h / 6.0)
    }

    fn derivative(&self, x: f64) -> MathResult<f64> {
        if !self.in_range(x) {
            return Err(out_of_range(&self.xs, x));
        }
        let i = segment(&self.xs, x);
        let (h, a, b) = self.weights(i, x);

        Ok((self.ys[i + 1] - self.ys[i]) / h
            - (3.0 * a * a - 1.0) / 6.0 * h * self.y2s[i]
            + (3.0 * b * b - 1.0) / 6.0 * h * self.y2s[i + 1])
    }

    fn min_x(&self) -> f64 {
        self.xs[0]
    }

    fn max_x(&self) -> f64 {
        self.xs[self.xs.len() - 1]
    }
}

/// Tridiagonal solve for knot second derivatives.
fn second_derivatives(xs: &[f64], ys: &[f64]) -> Vec<f64> {
    let n = xs.len();
    let mut y2s = vec![0.0; n];
    let mut u = vec![0.0; n - 1];

    for i in 1..n - 1 {
        let sig = (xs[i] - xs[i - 1]) / (xs[i + 1] - xs[i - 1]);
        let p = sig * y2s[i - 1] + 2.0;
        y2s[i] = (sig - 1.0) / p;
        let slope_jump =
            (ys[i + 1] - ys[i]) / (xs[i + 1] - xs[i]) - (ys[i] - ys[i - 1]) / (xs[i] - xs[i - 1]);
        u[i] = (6.0 * slope_jump / (xs[i + 1] - xs[i - 1]) - sig * u[i - 1]) / p;
    }

    y2s[n - 1] = 0.0;
    for i in (0..n - 1).rev() {
        y2s[i] = y2s[i] * y2s[i + 1] + u[i];
    }
    y2s
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_passes_through_knots() {
        let xs = vec![0.0, 1.0, 2.0, 3.0];
        let ys = vec![0.0, 1.0, 4.0, 9.0];
        let spline = CubicSpline::new(xs.clone(), ys.clone()).unwrap();
        for (x, y) in xs.iter().zip(&ys) {
            assert_relative_eq!(spline.interpolate(*x).unwrap(), *y, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_reproduces_straight_line() {
        let spline = CubicSpline::new(vec![0.0, 1.0, 2.5, 4.0], vec![1.0, 3.0, 6.0, 9.0]).unwrap();
        assert_relative_eq!(spline.interpolate(1.7).unwrap(), 4.4, epsilon = 1e-12);
        assert_relative_eq!(spline.derivative(3.3).unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_derivative_matches_finite_difference() {
        let spline = CubicSpline::new(vec![0.0, 1.0, 2.0, 3.0, 4.0], vec![0.0, 1.0, 0.0, 1.0, 0.0]).unwrap();
        let x = 1.37;
        let h = 1e-6;
        let fd = (spline.interpolate(x + h).unwrap() - spline.interpolate(x - h).unwrap()) / (2.0 * h);
        assert_relative_eq!(spline.derivative(x).unwrap(), fd, epsilon = 1e-6);
    }

    #[test]
    fn test_needs_three_points() {
        assert!(CubicSpline::new(vec![0.0, 1.0], vec![0.0, 1.0]).is_err());
    }
}
