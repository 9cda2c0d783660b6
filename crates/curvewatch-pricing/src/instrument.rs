//! Instrument families held in the portfolio.

use curvewatch_core::{Date, InstrumentId};
use serde::{Deserialize, Serialize};

use crate::bond::FixedRateBond;
use crate::error::PricingResult;
use crate::swap::VanillaSwap;

/// A priceable instrument. New families are added as variants and matched exhaustively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "instrument_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Instrument {
    /// Fixed-rate bullet bond.
    Bond(FixedRateBond),
    /// Vanilla fixed-for-floating swap.
    Swap(VanillaSwap),
}

impl Instrument {
    /// Instrument identifier.
    #[must_use]
    pub fn id(&self) -> &InstrumentId {
        match self {
            Instrument::Bond(bond) => &bond.id,
            Instrument::Swap(swap) => &swap.id,
        }
    }

    /// Family name as used by the reference-data service.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Instrument::Bond(_) => "BOND",
            Instrument::Swap(_) => "SWAP",
        }
    }

    /// Notional amount.
    #[must_use]
    pub fn notional(&self) -> f64 {
        match self {
            Instrument::Bond(bond) => bond.notional,
            Instrument::Swap(swap) => swap.notional,
        }
    }

    /// Final payment date.
    #[must_use]
    pub fn maturity(&self) -> Date {
        match self {
            Instrument::Bond(bond) => bond.maturity,
            Instrument::Swap(swap) => swap.maturity,
        }
    }

    /// Checks that the terms can be priced.
    ///
    /// # Errors
    ///
    /// `InvalidInstrument` describing the first problem found.
    pub fn validate(&self) -> PricingResult<()> {
        match self {
            Instrument::Bond(bond) => bond.validate(),
            Instrument::Swap(swap) => swap.validate(),
        }
    }
}

impl From<FixedRateBond> for Instrument {
    fn from(bond: FixedRateBond) -> Self {
        Instrument::Bond(bond)
    }
}

impl From<VanillaSwap> for Instrument {
    fn from(swap: VanillaSwap) -> Self {
        Instrument::Swap(swap)
    }
}
