//! # Curvewatch Math
//!
//! Numerical building blocks for discount curve construction.
//!
//! - **Interpolation**: log-linear and log-cubic interpolation of positive values
//!   (discount factors), backed by a natural cubic spline
//! - **Solvers**: bracketed root-finding (Brent, bisection)
//!
//! All routines work on `f64`. Diagnostics go through the `log` facade.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::similar_names)]

pub mod error;
pub mod interpolation;
pub mod solvers;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{MathError, MathResult};
    pub use crate::interpolation::{
        CubicSpline, Interpolator, LogCubicInterpolator, LogLinearInterpolator,
    };
    pub use crate::solvers::{bisection, brent, SolverConfig, SolverResult};
}

pub use error::{MathError, MathResult};
