//! # Curvewatch Risk
//!
//! Bump-and-reprice sensitivities for a portfolio of bonds and swaps.
//!
//! ```text
//!   MarketQuotes ──► ScenarioSet::build ──► base + parallel ± + key rate ± curve sets
//!                                                   │
//!   Instrument ─────────► SensitivityEngine::evaluate ──► RiskRecord { npv, dv01, krd, flags }
//! ```
//!
//! One scenario set is built per market event and shared by every instrument. DV01 and
//! each KRD are reported per basis point whatever the configured bump size:
//!
//! - central (default): `(NPV_down - NPV_up) / 2 × 1bp / size`
//! - one-sided: `(NPV_base - NPV_up) × 1bp / size`
//!
//! A bumped scenario whose curves fail to build is omitted from the record and flagged.
//! Only a failure of the unbumped curves is an error.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod record;
pub mod scenario;
pub mod sensitivity;

pub use config::{BumpConfig, BumpMethod, BASIS_POINT};
pub use error::{RiskError, RiskResult};
pub use record::{RiskRecord, SensitivityFlag};
pub use scenario::{BumpedCurves, Scenario, ScenarioPair, ScenarioSet};
pub use sensitivity::{InstrumentOutcome, SensitivityEngine};
