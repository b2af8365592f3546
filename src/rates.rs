// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Fetches the rate table from a URL, keeps the last good copy in settings
//! and applies it to the conversion service.
//!
//! Expected payload: `{"USD": 1, "GBP": 1.8, "EURO": 0.7, "ILS": 3.4}`.
//! Extra keys are ignored.

use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::{Map, Number, Value};
use tracing::{debug, info};

use crate::error::{LedgerError, Result};
use crate::fx::{ConversionService, RateTable};
use crate::models::Currency;
use crate::settings::Settings;
use crate::utils::{decimal_from_json, http_client};

pub fn validate_rates(v: &Value) -> Result<RateTable> {
    let obj = v
        .as_object()
        .ok_or_else(|| LedgerError::InvalidRates("expected a JSON object".into()))?;
    Currency::ALL
        .iter()
        .map(|c| {
            let rate = match obj.get(c.code()) {
                Some(Value::Number(n)) => decimal_from_json(n),
                _ => None,
            };
            match rate {
                Some(r) if r > Decimal::ZERO => Ok((*c, r)),
                _ => Err(LedgerError::InvalidRates(format!(
                    "missing or invalid rate: {}",
                    c
                ))),
            }
        })
        .collect()
}

pub fn rates_to_json(table: &RateTable) -> Value {
    let mut obj = Map::new();
    for (c, r) in table.iter() {
        let n = Number::from_str(&r.to_string())
            .map(Value::Number)
            .unwrap_or(Value::Null);
        obj.insert(c.code().to_string(), n);
    }
    Value::Object(obj)
}

pub struct RatesBridge {
    client: reqwest::Client,
    settings: Settings,
    fx: Arc<ConversionService>,
}

impl RatesBridge {
    pub fn new(settings: Settings, fx: Arc<ConversionService>) -> Result<Self> {
        Ok(Self::with_client(http_client()?, settings, fx))
    }

    pub fn with_client(
        client: reqwest::Client,
        settings: Settings,
        fx: Arc<ConversionService>,
    ) -> Self {
        Self {
            client,
            settings,
            fx,
        }
    }

    /// GETs `url`, validates the payload, saves it and applies it.
    /// Nothing is saved or applied unless every step succeeds.
    pub async fn fetch_rates(&self, url: &str) -> Result<RateTable> {
        let url = url.trim();
        if url.is_empty() {
            return Err(LedgerError::Fetch("rates URL is empty".into()));
        }
        debug!(url, "fetching rates");
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(LedgerError::Fetch(status.to_string()));
        }
        let body = resp.text().await?;
        let value: Value = serde_json::from_str(&body)
            .map_err(|e| LedgerError::InvalidRates(format!("malformed JSON: {}", e)))?;
        let table = validate_rates(&value)?;

        self.settings.save_rates(&table).await?;
        self.fx.set_rates(table.clone());
        info!(url, "rates fetched and applied");
        Ok(table)
    }

    /// Fetches from the saved URL.
    pub async fn refresh(&self) -> Result<RateTable> {
        let url = self.settings.rates_url().await?;
        self.fetch_rates(&url).await
    }

    /// Re-applies the last fetched table, if there is one.
    pub async fn apply_saved_rates(&self) -> Result<bool> {
        match self.settings.saved_rates().await? {
            Some(table) => {
                self.fx.set_rates(table);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub async fn save_url(&self, url: &str) -> Result<()> {
        self.settings.save_rates_url(url).await
    }

    pub async fn url(&self) -> Result<String> {
        self.settings.rates_url().await
    }
}
