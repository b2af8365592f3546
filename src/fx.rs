// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! In-memory currency conversion through a shared reference unit.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use crate::error::{LedgerError, Result};
use crate::models::Currency;

/// Each rate is the value of one unit of that currency in the reference unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RateTable(BTreeMap<Currency, Decimal>);

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, currency: Currency, rate: Decimal) -> Self {
        self.0.insert(currency, rate);
        self
    }

    pub fn get(&self, currency: Currency) -> Option<Decimal> {
        self.0.get(&currency).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Currency, Decimal)> + '_ {
        self.0.iter().map(|(c, r)| (*c, *r))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `amount * rate[from] / rate[to]`.
    pub fn convert(&self, amount: Decimal, from: Currency, to: Currency) -> Result<Decimal> {
        let from_rate = self.require(from)?;
        let to_rate = self.require(to)?;
        if from == to {
            return Ok(amount);
        }
        amount
            .checked_mul(from_rate)
            .and_then(|v| v.checked_div(to_rate))
            .ok_or_else(|| {
                LedgerError::Overflow(format!(
                    "{} {} does not fit in {} at rates {} / {}",
                    amount, from, to, from_rate, to_rate
                ))
            })
    }

    fn require(&self, currency: Currency) -> Result<Decimal> {
        self.get(currency).filter(|r| *r > Decimal::ZERO).ok_or_else(|| {
            LedgerError::RatesUnavailable(format!(
                "no rate for {}; fetch rates for USD, ILS, GBP and EURO first",
                currency
            ))
        })
    }
}

impl FromIterator<(Currency, Decimal)> for RateTable {
    fn from_iter<I: IntoIterator<Item = (Currency, Decimal)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Holds the active rate table. Replacing it swaps the whole table at once,
/// so a reader sees either the old or the new table, never a mix.
#[derive(Debug, Default)]
pub struct ConversionService {
    table: RwLock<Option<Arc<RateTable>>>,
}

impl ConversionService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_rates(&self, table: RateTable) {
        let currencies = table.len();
        let next = Some(Arc::new(table));
        match self.table.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
        info!(currencies, "exchange rates applied");
    }

    /// The active table, if any.
    pub fn snapshot(&self) -> Option<Arc<RateTable>> {
        match self.table.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn is_set(&self) -> bool {
        self.snapshot().is_some()
    }

    pub fn convert(&self, amount: Decimal, from: Currency, to: Currency) -> Result<Decimal> {
        self.require()?.convert(amount, from, to)
    }

    pub(crate) fn require(&self) -> Result<Arc<RateTable>> {
        self.snapshot().ok_or_else(|| {
            LedgerError::RatesUnavailable(
                "rates are not set; fetch rates for USD, ILS, GBP and EURO first".into(),
            )
        })
    }
}
