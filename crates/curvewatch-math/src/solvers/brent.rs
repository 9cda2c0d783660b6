//! Brent's root-finding algorithm.

use crate::error::{MathError, MathResult};
use crate::solvers::{SolverConfig, SolverResult};

/// Finds a root of `f` in `[a, b]` with Brent's method.
///
/// # Example
///
/// ```rust
/// use curvewatch_math::solvers::{brent, SolverConfig};
///
/// // Discount factor that prices a 1Y deposit at 5% ACT/365
/// let f = |df: f64| df * 1.05 - 1.0;
/// let result = brent(f, 0.5, 1.0, &SolverConfig::default()).unwrap();
/// assert!((result.root - 1.0 / 1.05).abs() < 1e-12);
/// ```
///
/// # Errors
///
/// `InvalidBracket` if `f(a)` and `f(b)` share a sign, `ConvergenceFailed` if the
/// iteration budget runs out.
pub fn brent<F>(f: F, a: f64, b: f64, config: &SolverConfig) -> MathResult<SolverResult>
where
    F: Fn(f64) -> f64,
{
    let (mut a, mut b) = (a, b);
    let (mut fa, mut fb) = (f(a), f(b));

    if fa == 0.0 {
        return Ok(SolverResult { root: a, iterations: 0, residual: 0.0 });
    }
    if fb == 0.0 {
        return Ok(SolverResult { root: b, iterations: 0, residual: 0.0 });
    }
    if fa.signum() == fb.signum() || !fa.is_finite() || !fb.is_finite() {
        return Err(MathError::InvalidBracket { a, b, fa, fb });
    }

    // c is the previous iterate on the other side of the root from b.
    let (mut c, mut fc) = (a, fa);
    let mut d = b - a;
    let mut e = d;

    for iteration in 1..=config.max_iterations {
        if fb.signum() == fc.signum() {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }

        let tol = 2.0 * f64::EPSILON * b.abs() + 0.5 * config.tolerance;
        let half = 0.5 * (c - b);
        if half.abs() <= tol || fb.abs() < config.tolerance {
            return Ok(SolverResult { root: b, iterations: iteration, residual: fb });
        }

        if e.abs() >= tol && fa.abs() > fb.abs() {
            let s = fb / fa;
            let (mut p, mut q) = if a == c {
                (2.0 * half * s, 1.0 - s)
            } else {
                let q0 = fa / fc;
                let r = fb / fc;
                (
                    s * (2.0 * half * q0 * (q0 - r) - (b - a) * (r - 1.0)),
                    (q0 - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };
            if p > 0.0 {
                q = -q;
            }
            p = p.abs();

            if 2.0 * p < (3.0 * half * q - (tol * q).abs()).min((e * q).abs()) {
                e = d;
                d = p / q;
            } else {
                d = half;
                e = d;
            }
        } else {
            d = half;
            e = d;
        }

        a = b;
        fa = fb;
        b += if d.abs() > tol { d } else { tol.copysign(half) };
        fb = f(b);
    }

    log::debug!(
        "brent: no convergence after {} iterations, residual {:.3e}",
        config.max_iterations,
        fb
    );
    Err(MathError::convergence_failed(config.max_iterations, fb.abs()))
}
