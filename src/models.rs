// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::utils::decimal_from_json;

pub const RECOMMENDED_CATEGORIES: [&str; 6] = [
    "Food",
    "Transportation",
    "Rent",
    "Utilities",
    "Entertainment",
    "Other",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Ils,
    Gbp,
    Euro,
}

#[derive(Debug, Error)]
#[error("Unknown currency '{0}', expected one of USD, ILS, GBP, EURO")]
pub struct UnknownCurrency(pub String);

impl Currency {
    pub const ALL: [Currency; 4] = [Currency::Usd, Currency::Ils, Currency::Gbp, Currency::Euro];

    pub fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Ils => "ILS",
            Currency::Gbp => "GBP",
            Currency::Euro => "EURO",
        }
    }

    /// Lenient read used for drafts and older rows: anything unrecognised becomes USD.
    pub fn coerce(raw: Option<&str>) -> Currency {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            None => Currency::Usd,
            Some(s) => s.parse().unwrap_or_else(|_| {
                tracing::warn!(currency = s, "unknown currency, defaulting to USD");
                Currency::Usd
            }),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = UnknownCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "ILS" => Ok(Currency::Ils),
            "GBP" => Ok(Currency::Gbp),
            "EURO" | "EUR" => Ok(Currency::Euro),
            _ => Err(UnknownCurrency(s.to_string())),
        }
    }
}

/// Caller-supplied fields for a new entry. Every field is optional; the
/// repository fills the gaps when it writes the row.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EntryDraft {
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
}

impl EntryDraft {
    pub fn new(
        amount: Decimal,
        currency: Currency,
        category: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            amount: Some(amount),
            currency: Some(currency.code().to_string()),
            category: Some(category.into()),
            description: Some(description.into()),
        }
    }

    /// Builds a draft from loosely typed JSON, e.g. a form payload.
    /// Numeric strings are accepted for `amount`; scalars are stringified for text fields.
    pub fn from_json(v: &Value) -> Self {
        let text = |key: &str| match v.get(key) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::Bool(b)) => Some(b.to_string()),
            _ => None,
        };
        let amount = match v.get("amount") {
            Some(Value::Number(n)) => decimal_from_json(n),
            Some(Value::String(s)) => s.trim().parse::<Decimal>().ok(),
            _ => None,
        };
        Self {
            amount,
            currency: text("currency"),
            category: text("category"),
            description: text("description"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub id: i64,
    pub amount: Decimal,
    pub currency: Currency,
    pub category: String,
    pub description: String,
    pub created_at: Option<DateTime<FixedOffset>>,
    pub created_year: Option<i32>,
    pub created_month: Option<u32>,
    pub created_day: Option<u32>,
    /// Date-only column; the sole date source on schema version 1 rows.
    pub date: Option<NaiveDate>,
}

impl LedgerEntry {
    pub fn year(&self) -> Option<i32> {
        self.created_year.or_else(|| self.date.map(|d| d.year()))
    }

    pub fn month(&self) -> Option<u32> {
        self.created_month.or_else(|| self.date.map(|d| d.month()))
    }

    pub fn day(&self) -> Option<u32> {
        self.created_day.or_else(|| self.date.map(|d| d.day()))
    }

    /// Insertion instant, or midnight UTC of the legacy date.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.created_at.map(|t| t.with_timezone(&Utc)).or_else(|| {
            self.date
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
        })
    }

    pub(crate) fn sort_millis(&self) -> Option<i64> {
        self.timestamp().map(|t| t.timestamp_millis())
    }

    pub fn summary(&self) -> EntrySummary {
        EntrySummary {
            amount: self.amount,
            currency: self.currency,
            category: self.category.clone(),
            description: self.description.clone(),
        }
    }
}

/// What `add_cost` hands back: the written values without the store id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntrySummary {
    pub amount: Decimal,
    pub currency: Currency,
    pub category: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    pub amount: Decimal,
    pub currency: Currency,
    pub category: String,
    pub description: String,
    pub day: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportTotal {
    pub currency: Currency,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub year: i32,
    pub month: u32,
    pub entries: Vec<ReportEntry>,
    pub total: ReportTotal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthTotal {
    pub month: u32,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
}
