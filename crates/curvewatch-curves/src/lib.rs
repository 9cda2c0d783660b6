//! # Curvewatch Curves
//!
//! From streaming rate quotes to immutable discount curves.
//!
//! ```text
//!   market event ──► QuoteStore::apply ──► QuoteSnapshot ──┐
//!                                                          │
//!                          MarketQuotes { discount, forecast? }
//!                                                          │
//!                              CurveBuilder::rebuild ◄─────┘
//!                                        │
//!                    CurveSet { discount: Arc<DiscountCurve>, forecast: Arc<DiscountCurve> }
//! ```
//!
//! - [`QuoteStore`] holds one mutable rate per configured tenor. Unknown labels are
//!   reported back to the caller and never stored.
//! - [`CurveBuilder`] bootstraps discount factors tenor by tenor: deposits up to one
//!   year, par swaps beyond. Any pillar whose discount factor rises above its
//!   predecessor fails the build with [`CurveError::Inversion`].
//! - [`DiscountCurve`] interpolates log discount factors (linear or natural cubic) and
//!   extrapolates with the last segment's flat forward.
//!
//! ## Example
//!
//! ```rust
//! use curvewatch_core::{Date, Tenor};
//! use curvewatch_curves::{CurveBuilder, MarketQuotes, QuoteStore};
//!
//! let tenors: Vec<Tenor> = ["1Y", "2Y", "5Y"].iter().map(|t| t.parse().unwrap()).collect();
//! let mut store = QuoteStore::new(tenors).unwrap();
//! let report = store.apply([("1Y", 0.04), ("2Y", 0.041), ("5Y", 0.042), ("99Y", 0.05)]);
//! assert_eq!(report.applied, 3);
//! assert_eq!(report.rejected.len(), 1);
//!
//! let valuation = Date::from_ymd(2026, 1, 28).unwrap();
//! let curves = CurveBuilder::default()
//!     .rebuild(&MarketQuotes::shared(store.snapshot()), valuation)
//!     .unwrap();
//! assert!(curves.discount.df(5.0) < curves.discount.df(2.0));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

mod bootstrap;
pub mod builder;
pub mod conventions;
pub mod discount;
pub mod error;
pub mod interpolation;
pub mod quotes;

pub use builder::{CurveBuilder, CurveSet};
pub use conventions::CurveConventions;
pub use discount::{CurvePillar, DiscountCurve};
pub use error::{CurveError, CurveResult};
pub use interpolation::InterpolationMethod;
pub use quotes::{ApplyReport, MarketQuotes, Quote, QuoteSnapshot, QuoteStore, RejectedQuote};
