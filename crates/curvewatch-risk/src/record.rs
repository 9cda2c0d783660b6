//! Per-instrument risk output.

use std::collections::BTreeMap;
use std::fmt;

use curvewatch_core::{Date, InstrumentId, Tenor};
use serde::{Deserialize, Serialize};

/// Why a sensitivity is missing from a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SensitivityFlag {
    /// A bumped scenario could not be built or priced.
    ScenarioFailed {
        /// Scenario label, e.g. `key_rate 5Y +1.00bp`.
        scenario: String,
        /// Underlying error.
        reason: String,
    },
    /// A key tenor had no quote to bump.
    KeyTenorMissing {
        /// The missing tenor.
        tenor: Tenor,
    },
}

impl fmt::Display for SensitivityFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensitivityFlag::ScenarioFailed { scenario, reason } => {
                write!(f, "scenario '{scenario}' failed: {reason}")
            }
            SensitivityFlag::KeyTenorMissing { tenor } => write!(f, "key tenor {tenor} not quoted"),
        }
    }
}

/// NPV and sensitivities of one instrument at one event.
///
/// All sensitivities are in currency units per basis point. Positive DV01 means the
/// instrument loses value when rates rise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskRecord {
    /// Instrument identifier.
    pub instrument_id: InstrumentId,
    /// Market event timestamp, epoch milliseconds.
    pub timestamp: i64,
    /// Curve valuation date.
    pub valuation_date: Date,
    /// Base net present value.
    pub npv: f64,
    /// Parallel DV01; absent if its scenario failed.
    pub dv01: Option<f64>,
    /// Key rate DV01s; failed or unquoted tenors are omitted.
    pub krd: BTreeMap<Tenor, f64>,
    /// One entry per omitted sensitivity.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<SensitivityFlag>,
}

impl RiskRecord {
    /// Sum of the key rate entries present.
    #[must_use]
    pub fn krd_sum(&self) -> f64 {
        self.krd.values().sum()
    }

    /// True if no sensitivity was omitted.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.flags.is_empty()
    }
}
