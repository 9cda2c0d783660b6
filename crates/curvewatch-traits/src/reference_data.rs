//! Reference data contracts.
//!
//! Instrument terms arrive as [`InstrumentRecord`]s in the security master's wire shape.
//! Numeric fields may be JSON numbers or decimal strings. Conversion to a validated
//! [`Instrument`] happens per record, so one bad item never poisons a fetch.

use std::fmt;

use async_trait::async_trait;
use curvewatch_core::{Date, DayCountConvention, Frequency};
use curvewatch_pricing::{FixedRateBond, FloatIndex, Instrument, PayReceive, VanillaSwap};
use serde::{Deserialize, Serialize};

use crate::error::TraitError;

// =============================================================================
// WIRE RECORD
// =============================================================================

/// One instrument as served by the reference data service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentRecord {
    /// Stable instrument id
    pub id: String,
    /// `BOND` or `SWAP`
    pub instrument_type: String,
    /// ISIN (bonds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isin: Option<String>,
    /// Face value or swap notional
    #[serde(deserialize_with = "lenient::f64")]
    pub notional: f64,
    /// ISO currency code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// Bond coupon rate as a decimal
    #[serde(default, deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub coupon_rate: Option<f64>,
    /// Swap fixed rate as a decimal
    #[serde(default, deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub fixed_rate: Option<f64>,
    /// Final payment date
    pub maturity_date: Date,
    /// Bond issue date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<Date>,
    /// Coupon or fixed leg frequency
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_frequency: Option<String>,
    /// Bond accrual basis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_count_convention: Option<String>,
    /// Swap tenor label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenor: Option<String>,
    /// Swap trade date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_date: Option<Date>,
    /// Swap effective date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_date: Option<Date>,
    /// `PAY` or `RECEIVE` fixed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pay_receive: Option<String>,
    /// Floating index name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub float_index: Option<String>,
}

/// A record that could not be turned into an instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedInstrument {
    /// Id as received, or `<unknown>`
    pub id: String,
    /// Why it was rejected
    pub reason: String,
}

impl RejectedInstrument {
    /// Creates a rejection.
    pub fn new(id: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            id: id.into(),
            reason: reason.to_string(),
        }
    }

    /// Rejection for a raw item that did not parse as a record at all.
    #[must_use]
    pub fn from_raw(item: &serde_json::Value, error: &serde_json::Error) -> Self {
        let id = match item.get("id") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => "<unknown>".to_string(),
        };
        Self::new(id, error)
    }
}

impl fmt::Display for RejectedInstrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.reason)
    }
}

impl InstrumentRecord {
    fn parse_or<T>(&self, value: Option<&str>, default: T) -> Result<T, RejectedInstrument>
    where
        T: std::str::FromStr,
        T::Err: fmt::Display,
    {
        match value {
            Some(s) => s.parse().map_err(|e| RejectedInstrument::new(&self.id, e)),
            None => Ok(default),
        }
    }

    fn required<T: Copy>(&self, value: Option<T>, field: &str) -> Result<T, RejectedInstrument> {
        value.ok_or_else(|| RejectedInstrument::new(&self.id, format!("missing {field}")))
    }

    fn into_bond(self) -> Result<Instrument, RejectedInstrument> {
        let coupon = self.required(self.coupon_rate, "coupon_rate")?;
        let frequency = self.parse_or(self.payment_frequency.as_deref(), Frequency::SemiAnnual)?;
        let day_count =
            self.parse_or(self.day_count_convention.as_deref(), DayCountConvention::ActAct)?;

        let mut bond = FixedRateBond::new(self.id.as_str(), self.notional, coupon, self.maturity_date)
            .with_frequency(frequency)
            .with_day_count(day_count);
        bond.isin = self.isin;
        bond.issue_date = self.issue_date;
        if let Some(currency) = self.currency {
            bond.currency = currency;
        }
        Ok(bond.into())
    }

    fn into_swap(self) -> Result<Instrument, RejectedInstrument> {
        let fixed_rate = self.required(self.fixed_rate, "fixed_rate")?;
        let trade_date = self.required(self.trade_date, "trade_date")?;
        let pay_receive = self
            .pay_receive
            .as_deref()
            .ok_or_else(|| RejectedInstrument::new(&self.id, "missing pay_receive"))?;
        let side: PayReceive = self.parse_or(Some(pay_receive), PayReceive::Pay)?;
        let index = self.parse_or(self.float_index.as_deref(), FloatIndex::Sofr)?;
        let frequency = self.parse_or(self.payment_frequency.as_deref(), Frequency::Quarterly)?;

        let mut swap =
            VanillaSwap::new(self.id.as_str(), self.notional, fixed_rate, trade_date, self.maturity_date)
                .with_side(side)
                .with_index(index)
                .with_fixed_frequency(frequency);
        swap.tenor = self.tenor;
        swap.effective_date = self.effective_date;
        if let Some(currency) = self.currency {
            swap.currency = currency;
        }
        Ok(swap.into())
    }
}

impl TryFrom<InstrumentRecord> for Instrument {
    type Error = RejectedInstrument;

    fn try_from(record: InstrumentRecord) -> Result<Self, Self::Error> {
        let id = record.id.clone();
        let instrument = match record.instrument_type.trim().to_uppercase().as_str() {
            "BOND" => record.into_bond()?,
            "SWAP" => record.into_swap()?,
            other => {
                return Err(RejectedInstrument::new(
                    id,
                    format!("unsupported instrument type '{other}'"),
                ))
            }
        };
        instrument.validate().map_err(|e| RejectedInstrument::new(id, e))?;
        Ok(instrument)
    }
}

impl From<&Instrument> for InstrumentRecord {
    fn from(instrument: &Instrument) -> Self {
        match instrument {
            Instrument::Bond(bond) => Self {
                id: bond.id.to_string(),
                instrument_type: "BOND".to_string(),
                isin: bond.isin.clone(),
                notional: bond.notional,
                currency: Some(bond.currency.clone()),
                coupon_rate: Some(bond.coupon_rate),
                fixed_rate: None,
                maturity_date: bond.maturity,
                issue_date: bond.issue_date,
                payment_frequency: Some(bond.frequency.to_string()),
                day_count_convention: Some(bond.day_count.to_string()),
                tenor: None,
                trade_date: None,
                effective_date: None,
                pay_receive: None,
                float_index: None,
            },
            Instrument::Swap(swap) => Self {
                id: swap.id.to_string(),
                instrument_type: "SWAP".to_string(),
                isin: None,
                notional: swap.notional,
                currency: Some(swap.currency.clone()),
                coupon_rate: None,
                fixed_rate: Some(swap.fixed_rate),
                maturity_date: swap.maturity,
                issue_date: None,
                payment_frequency: Some(swap.fixed_frequency.to_string()),
                day_count_convention: None,
                tenor: swap.tenor.clone(),
                trade_date: Some(swap.trade_date),
                effective_date: swap.effective_date,
                pay_receive: Some(swap.side.to_string()),
                float_index: Some(swap.index.to_string()),
            },
        }
    }
}

/// Deserializers for numbers that may arrive as decimal strings.
mod lenient {
    use serde::{de::Error, Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Numeric {
        Number(f64),
        Text(String),
    }

    impl Numeric {
        fn value<E: Error>(self) -> Result<f64, E> {
            match self {
                Numeric::Number(n) => Ok(n),
                Numeric::Text(s) => s
                    .trim()
                    .parse()
                    .map_err(|_| E::custom(format!("not a number: '{s}'"))),
            }
        }
    }

    pub(super) fn f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Numeric::deserialize(deserializer)?.value()
    }

    pub(super) fn opt_f64<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<f64>, D::Error> {
        Option::<Numeric>::deserialize(deserializer)?
            .map(Numeric::value)
            .transpose()
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Result of one full reference data fetch.
#[derive(Debug, Clone, Default)]
pub struct ReferenceSnapshot {
    /// Validated instruments
    pub instruments: Vec<Instrument>,
    /// Items refused during conversion
    pub rejected: Vec<RejectedInstrument>,
    /// Item count the source claims to hold, if it reports one
    pub reported_total: Option<usize>,
}

impl ReferenceSnapshot {
    /// Converts raw records, sorting them into accepted and rejected.
    pub fn from_records(
        records: impl IntoIterator<Item = InstrumentRecord>,
        reported_total: Option<usize>,
    ) -> Self {
        let mut snapshot = Self {
            reported_total,
            ..Self::default()
        };
        for record in records {
            snapshot.push(record);
        }
        snapshot
    }

    /// Converts and files one record.
    pub fn push(&mut self, record: InstrumentRecord) {
        match Instrument::try_from(record) {
            Ok(instrument) => self.instruments.push(instrument),
            Err(rejected) => self.rejected.push(rejected),
        }
    }

    /// Parses and files one raw JSON item. Items that are not records at all are rejected
    /// with the id they carry, if any.
    pub fn push_raw(&mut self, item: serde_json::Value) {
        match InstrumentRecord::deserialize(&item) {
            Ok(record) => self.push(record),
            Err(e) => self.rejected.push(RejectedInstrument::from_raw(&item, &e)),
        }
    }

    /// Items accounted for, accepted or rejected.
    #[must_use]
    pub fn accounted(&self) -> usize {
        self.instruments.len() + self.rejected.len()
    }

    /// True if the source reported more items than were received.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.reported_total.is_some_and(|total| self.accounted() < total)
    }
}

// =============================================================================
// SOURCE
// =============================================================================

/// Provider of the full instrument universe. Fetches must be idempotent.
#[async_trait]
pub trait ReferenceDataSource: Send + Sync {
    /// Fetches every instrument.
    async fn fetch_instruments(&self) -> Result<ReferenceSnapshot, TraitError>;

    /// Human-readable description for logs.
    fn describe(&self) -> String;
}

// =============================================================================
// TESTS
// =============================================================================
