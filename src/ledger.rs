// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::Arc;

use tracing::debug;

use crate::db::{LazyStore, Location, StoreHandle};
use crate::error::Result;
use crate::fx::ConversionService;
use crate::models::{EntryDraft, EntrySummary};
use crate::rates::RatesBridge;
use crate::repo::{Clock, CostRepository, SystemClock};
use crate::report::ReportGenerator;
use crate::settings::Settings;

/// One store, shared by the repository and settings, wired to a single
/// conversion service. Nothing touches the disk until the first call.
pub struct Ledger {
    store: Arc<LazyStore>,
    repo: Arc<CostRepository>,
    fx: Arc<ConversionService>,
    reports: ReportGenerator,
    settings: Settings,
    rates: RatesBridge,
}

impl Ledger {
    pub fn new(location: Location, name: &str, version: Option<u32>) -> Result<Self> {
        Self::with_clock(location, name, version, Arc::new(SystemClock))
    }

    pub fn with_clock(
        location: Location,
        name: &str,
        version: Option<u32>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let store = Arc::new(LazyStore::new(location, name, version));
        let repo = Arc::new(CostRepository::with_clock(Arc::clone(&store), clock));
        let fx = Arc::new(ConversionService::new());
        let settings = Settings::new(Arc::clone(&store));
        Ok(Self {
            reports: ReportGenerator::new(Arc::clone(&repo), Arc::clone(&fx)),
            rates: RatesBridge::new(settings.clone(), Arc::clone(&fx))?,
            store,
            repo,
            fx,
            settings,
        })
    }

    /// Opens the store and re-applies the last saved rate table.
    pub async fn bootstrap(&self) -> Result<&StoreHandle> {
        let handle = self.store.handle().await?;
        let applied = self.rates.apply_saved_rates().await?;
        debug!(applied, version = handle.version(), "ledger ready");
        Ok(handle)
    }

    /// Records an entry and returns its written fields.
    pub async fn add_cost(&self, draft: EntryDraft) -> Result<EntrySummary> {
        Ok(self.repo.insert(draft).await?.summary())
    }

    pub async fn handle(&self) -> Result<&StoreHandle> {
        self.store.handle().await
    }

    pub fn repo(&self) -> &CostRepository {
        &self.repo
    }

    pub fn fx(&self) -> &ConversionService {
        &self.fx
    }

    pub fn reports(&self) -> &ReportGenerator {
        &self.reports
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn rates(&self) -> &RatesBridge {
        &self.rates
    }
}
