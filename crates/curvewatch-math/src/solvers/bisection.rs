//! Bisection.

use crate::error::{MathError, MathResult};
use crate::solvers::{SolverConfig, SolverResult};

/// Halves `[a, b]` until the bracket is narrower than the tolerance.
///
/// # Errors
///
/// `InvalidBracket` if `f(a)` and `f(b)` share a sign, `ConvergenceFailed` if the
/// iteration budget runs out.
pub fn bisection<F>(f: F, a: f64, b: f64, config: &SolverConfig) -> MathResult<SolverResult>
where
    F: Fn(f64) -> f64,
{
    let (mut lo, mut hi) = if a <= b { (a, b) } else { (b, a) };
    let mut f_lo = f(lo);
    let f_hi = f(hi);

    if f_lo == 0.0 {
        return Ok(SolverResult { root: lo, iterations: 0, residual: 0.0 });
    }
    if f_hi == 0.0 {
        return Ok(SolverResult { root: hi, iterations: 0, residual: 0.0 });
    }
    if f_lo.signum() == f_hi.signum() || !f_lo.is_finite() || !f_hi.is_finite() {
        return Err(MathError::InvalidBracket { a: lo, b: hi, fa: f_lo, fb: f_hi });
    }

    for iteration in 1..=config.max_iterations {
        let mid = 0.5 * (lo + hi);
        let f_mid = f(mid);
        if f_mid == 0.0 || 0.5 * (hi - lo) < config.tolerance {
            return Ok(SolverResult { root: mid, iterations: iteration, residual: f_mid });
        }
        if f_mid.signum() == f_lo.signum() {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
    }

    let mid = 0.5 * (lo + hi);
    Err(MathError::convergence_failed(config.max_iterations, f(mid).abs()))
}
