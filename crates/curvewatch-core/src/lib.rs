//! # Curvewatch Core
//!
//! Calendar and convention primitives shared by every Curvewatch crate.
//!
//! - **Types**: [`Date`], [`Tenor`], [`Frequency`] and the identifier newtypes
//! - **Day Count Conventions**: ACT/ACT, ACT/360, ACT/365F and 30/360 year fractions
//! - **Schedules**: unadjusted coupon and reset schedules with reference periods
//!
//! ## Example
//!
//! ```rust
//! use curvewatch_core::prelude::*;
//!
//! let maturity = Date::from_ymd(2031, 1, 15).unwrap();
//! let issue = Date::from_ymd(2026, 1, 15).unwrap();
//! let schedule = Schedule::backward(issue, maturity, Frequency::Annual).unwrap();
//! assert_eq!(schedule.len(), 5);
//!
//! let tenor: Tenor = "10Y".parse().unwrap();
//! assert_eq!(tenor.advance(issue).unwrap(), Date::from_ymd(2036, 1, 15).unwrap());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod daycounts;
pub mod error;
pub mod schedule;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::daycounts::DayCountConvention;
    pub use crate::error::{CoreError, CoreResult};
    pub use crate::schedule::{Schedule, SchedulePeriod};
    pub use crate::types::{CurveId, Date, Frequency, InstrumentId, Tenor, TenorUnit};
}

pub use daycounts::DayCountConvention;
pub use error::{CoreError, CoreResult};
pub use schedule::{Schedule, SchedulePeriod};
pub use types::{CurveId, Date, Frequency, InstrumentId, Tenor, TenorUnit};
