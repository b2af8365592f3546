// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::Arc;

use futures::future::try_join_all;
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{LedgerError, Result};
use crate::fx::ConversionService;
use crate::models::{CategoryTotal, Currency, MonthTotal, Report, ReportEntry, ReportTotal};
use crate::repo::CostRepository;
use crate::utils::round2;

/// Builds reports from the repository and the active rate table. Holds no
/// state of its own; every call reads the store and rates afresh.
#[derive(Clone)]
pub struct ReportGenerator {
    repo: Arc<CostRepository>,
    fx: Arc<ConversionService>,
}

impl ReportGenerator {
    pub fn new(repo: Arc<CostRepository>, fx: Arc<ConversionService>) -> Self {
        Self { repo, fx }
    }

    /// Entries for one month plus their total in `target`, rounded to cents.
    /// Fails as a whole if any entry cannot be converted.
    pub async fn get_report(&self, year: i32, month: u32, target: Currency) -> Result<Report> {
        let items = self.repo.find_by_month(year, month).await?;
        let entries: Vec<ReportEntry> = items
            .iter()
            .map(|e| ReportEntry {
                amount: e.amount,
                currency: e.currency,
                category: e.category.clone(),
                description: e.description.clone(),
                day: e.day().unwrap_or(1),
            })
            .collect();

        let mut total = Decimal::ZERO;
        if !entries.is_empty() {
            let rates = self.fx.require()?;
            for e in &entries {
                total = add(total, rates.convert(e.amount, e.currency, target)?, target)?;
            }
        }
        debug!(year, month, %target, entries = entries.len(), "report built");

        Ok(Report {
            year,
            month,
            entries,
            total: ReportTotal {
                currency: target,
                amount: round2(total),
            },
        })
    }

    /// Twelve month totals for `year`, January first. The month reports run
    /// concurrently; results are placed by month, not by completion.
    pub async fn get_year_totals(&self, year: i32, target: Currency) -> Result<Vec<MonthTotal>> {
        let reports = try_join_all((1..=12).map(|m| self.get_report(year, m, target))).await?;
        Ok(reports
            .into_iter()
            .map(|r| MonthTotal {
                month: r.month,
                total: r.total.amount,
            })
            .collect())
    }

    /// Per-category totals of a report in the report's currency, in order of
    /// first appearance.
    pub fn category_totals(&self, report: &Report) -> Result<Vec<CategoryTotal>> {
        let target = report.total.currency;
        if report.entries.is_empty() {
            return Ok(Vec::new());
        }
        let rates = self.fx.require()?;
        let mut sums: Vec<(String, Decimal)> = Vec::new();
        for e in &report.entries {
            let v = rates.convert(e.amount, e.currency, target)?;
            match sums.iter_mut().find(|(c, _)| *c == e.category) {
                Some((_, acc)) => *acc = add(*acc, v, target)?,
                None => sums.push((e.category.clone(), v)),
            }
        }
        Ok(sums
            .into_iter()
            .map(|(category, total)| CategoryTotal {
                category,
                total: round2(total),
            })
            .collect())
    }
}

fn add(acc: Decimal, v: Decimal, target: Currency) -> Result<Decimal> {
    acc.checked_add(v)
        .ok_or_else(|| LedgerError::Overflow(format!("{} total exceeds the decimal range", target)))
}
