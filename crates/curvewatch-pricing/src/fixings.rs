//! Historical index fixings.

use std::collections::HashMap;

use curvewatch_core::Date;

use crate::swap::FloatIndex;

/// Published fixings keyed by index and accrual start date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fixings {
    rates: HashMap<(FloatIndex, Date), f64>,
}

impl Fixings {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a fixing, returning the value it replaced.
    pub fn insert(&mut self, index: FloatIndex, date: Date, rate: f64) -> Option<f64> {
        self.rates.insert((index, date), rate)
    }

    /// Fixing for `index` on `date`.
    #[must_use]
    pub fn get(&self, index: FloatIndex, date: Date) -> Option<f64> {
        self.rates.get(&(index, date)).copied()
    }

    /// Number of fixings held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// True when no fixings are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl FromIterator<(FloatIndex, Date, f64)> for Fixings {
    fn from_iter<I: IntoIterator<Item = (FloatIndex, Date, f64)>>(iter: I) -> Self {
        Self {
            rates: iter
                .into_iter()
                .map(|(index, date, rate)| ((index, date), rate))
                .collect(),
        }
    }
}

impl Extend<(FloatIndex, Date, f64)> for Fixings {
    fn extend<I: IntoIterator<Item = (FloatIndex, Date, f64)>>(&mut self, iter: I) {
        self.rates
            .extend(iter.into_iter().map(|(index, date, rate)| ((index, date), rate)));
    }
}
