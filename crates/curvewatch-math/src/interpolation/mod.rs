//! Interpolation of strictly positive values.
//!
//! | Method | Smoothness | Forward rates on DFs |
//! |--------|------------|----------------------|
//! | [`LogLinearInterpolator`] | C0 | piecewise constant, never negative between non-increasing knots |
//! | [`LogCubicInterpolator`] | C2 | smooth, may overshoot between knots |
//!
//! [`CubicSpline`] is the natural spline used underneath the log-cubic method.

mod cubic_spline;
mod log_cubic;
mod log_linear;

pub use cubic_spline::CubicSpline;
pub use log_cubic::LogCubicInterpolator;
pub use log_linear::LogLinearInterpolator;

use crate::error::{MathError, MathResult};

/// Common interface for the interpolators.
pub trait Interpolator: Send + Sync {
    /// Interpolated value at `x`.
    fn interpolate(&self, x: f64) -> MathResult<f64>;

    /// First derivative at `x`.
    fn derivative(&self, x: f64) -> MathResult<f64>;

    /// Smallest knot.
    fn min_x(&self) -> f64;

    /// Largest knot.
    fn max_x(&self) -> f64;

    /// True if `x` lies within the knots.
    fn in_range(&self, x: f64) -> bool {
        x >= self.min_x() && x <= self.max_x()
    }
}

/// Validates knot vectors shared by all interpolators.
pub(crate) fn check_knots(xs: &[f64], ys: &[f64], required: usize) -> MathResult<()> {
    if xs.len() < required {
        return Err(MathError::insufficient_data(required, xs.len()));
    }
    if xs.len() != ys.len() {
        return Err(MathError::invalid_input(format!(
            "xs and ys must have same length: {} vs {}",
            xs.len(),
            ys.len()
        )));
    }
    if xs.windows(2).any(|w| w[1] <= w[0]) {
        return Err(MathError::invalid_input("x values must be strictly increasing"));
    }
    if xs.iter().chain(ys).any(|v| !v.is_finite()) {
        return Err(MathError::invalid_input("knots must be finite"));
    }
    Ok(())
}

/// Index `i` with `xs[i] <= x < xs[i+1]`, clamped to the outer segments.
pub(crate) fn segment(xs: &[f64], x: f64) -> usize {
    let upper = xs.partition_point(|&probe| probe <= x);
    upper.saturating_sub(1).min(xs.len() - 2)
}

pub(crate) fn out_of_range(xs: &[f64], x: f64) -> MathError {
    MathError::ExtrapolationNotAllowed {
        x,
        min: xs[0],
        max: xs[xs.len() - 1],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_lookup() {
        let xs = [0.0, 1.0, 2.0, 5.0];
        assert_eq!(segment(&xs, -1.0), 0);
        assert_eq!(segment(&xs, 0.0), 0);
        assert_eq!(segment(&xs, 1.0), 1);
        assert_eq!(segment(&xs, 4.9), 2);
        assert_eq!(segment(&xs, 5.0), 2);
        assert_eq!(segment(&xs, 9.0), 2);
    }

    #[test]
    fn test_check_knots() {
        assert!(check_knots(&[0.0, 1.0], &[1.0, 0.9], 2).is_ok());
        assert!(check_knots(&[0.0], &[1.0], 2).is_err());
        assert!(check_knots(&[0.0, 0.0], &[1.0, 0.9], 2).is_err());
        assert!(check_knots(&[0.0, 1.0], &[1.0], 2).is_err());
        assert!(check_knots(&[0.0, 1.0], &[1.0, f64::NAN], 2).is_err());
    }
}
