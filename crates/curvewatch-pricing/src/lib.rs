//! # Curvewatch Pricing
//!
//! Present values for the two instrument families in a Curvewatch portfolio.
//!
//! - [`FixedRateBond`]: coupons and principal discounted on the discount curve
//! - [`VanillaSwap`]: fixed leg on the discount curve, floating leg projected off the
//!   forecast curve and discounted on the discount curve
//!
//! Pricing is a pure function of (instrument, curves, fixings). A swap whose current
//! floating period started before the valuation date is priced only if the matching
//! fixing is supplied; otherwise it fails with [`PricingError::MissingFixing`].
//!
//! ## Sign convention
//!
//! | Side      | NPV                          |
//! |-----------|------------------------------|
//! | `Pay`     | PV(floating) - PV(fixed)     |
//! | `Receive` | PV(fixed) - PV(floating)     |

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bond;
pub mod error;
pub mod fixings;
pub mod instrument;
pub mod pricer;
pub mod swap;

pub use bond::FixedRateBond;
pub use error::{PricingError, PricingResult};
pub use fixings::Fixings;
pub use instrument::Instrument;
pub use pricer::InstrumentPricer;
pub use swap::{FloatIndex, PayReceive, VanillaSwap};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use super::bond::FixedRateBond;
    pub use super::error::{PricingError, PricingResult};
    pub use super::fixings::Fixings;
    pub use super::instrument::Instrument;
    pub use super::pricer::InstrumentPricer;
    pub use super::swap::{FloatIndex, PayReceive, VanillaSwap};
}
