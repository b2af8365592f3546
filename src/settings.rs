// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::Arc;

use rusqlite::{params, OptionalExtension};
use tracing::warn;

use crate::db::LazyStore;
use crate::error::Result;
use crate::fx::RateTable;
use crate::rates::{rates_to_json, validate_rates};

pub const RATES_KEY: &str = "rates";
pub const RATES_URL_KEY: &str = "rates_url";

/// Small key/value settings kept next to the ledger.
#[derive(Clone)]
pub struct Settings {
    store: Arc<LazyStore>,
}

impl Settings {
    pub fn new(store: Arc<LazyStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let store = self.store.handle().await?;
        let key = key.to_string();
        store
            .read(move |tx| {
                Ok(tx
                    .query_row("SELECT value FROM settings WHERE key=?1", params![key], |r| {
                        r.get(0)
                    })
                    .optional()?)
            })
            .await
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        let store = self.store.handle().await?;
        let (key, value) = (key.to_string(), value.to_string());
        store
            .write(move |tx| {
                tx.execute(
                    "INSERT INTO settings(key, value) VALUES(?1, ?2)
                     ON CONFLICT(key) DO UPDATE SET value=excluded.value",
                    params![key, value],
                )?;
                Ok(())
            })
            .await
    }

    pub async fn rates_url(&self) -> Result<String> {
        Ok(self.get(RATES_URL_KEY).await?.unwrap_or_default())
    }

    pub async fn save_rates_url(&self, url: &str) -> Result<()> {
        self.set(RATES_URL_KEY, url.trim()).await
    }

    /// Last fetched table. Unreadable saved data counts as none.
    pub async fn saved_rates(&self) -> Result<Option<RateTable>> {
        let Some(raw) = self.get(RATES_KEY).await? else {
            return Ok(None);
        };
        let parsed = serde_json::from_str::<serde_json::Value>(&raw)
            .map_err(|e| e.to_string())
            .and_then(|v| validate_rates(&v).map_err(|e| e.to_string()));
        match parsed {
            Ok(table) => Ok(Some(table)),
            Err(e) => {
                warn!(error = %e, "ignoring unreadable saved rates");
                Ok(None)
            }
        }
    }

    pub async fn save_rates(&self, table: &RateTable) -> Result<()> {
        let raw = serde_json::to_string(&rates_to_json(table))?;
        self.set(RATES_KEY, &raw).await
    }
}
