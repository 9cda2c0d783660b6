//! Conventions of the instruments implied by curve quotes.

use curvewatch_core::{DayCountConvention, Frequency};
use serde::{Deserialize, Serialize};

/// How a quoted rate is turned into a bootstrap constraint.
///
/// Tenors up to one year are simple-interest deposits. Longer tenors are par swaps whose
/// fixed leg starts on the valuation date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveConventions {
    /// Accrual basis for deposit quotes.
    pub deposit_day_count: DayCountConvention,
    /// Accrual basis for the par swap fixed leg.
    pub swap_fixed_day_count: DayCountConvention,
    /// Payment frequency of the par swap fixed leg.
    pub swap_fixed_frequency: Frequency,
}

impl Default for CurveConventions {
    fn default() -> Self {
        Self {
            deposit_day_count: DayCountConvention::Act360,
            swap_fixed_day_count: DayCountConvention::Act360,
            swap_fixed_frequency: Frequency::Annual,
        }
    }
}
