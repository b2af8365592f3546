// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;

use super::{costs::when, required, year_or_current};
use crate::Ledger;
use crate::models::LedgerEntry;

pub async fn handle(ledger: &Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let year = year_or_current(sub);
    let fmt = required(sub, "format")?.to_lowercase();
    let out = required(sub, "out")?;
    let items = ledger.repo().find_by_year(year).await?;
    export_entries(&items, &fmt, Path::new(out))?;
    println!("Exported {} expenses for {} to {}", items.len(), year, out);
    Ok(())
}

pub fn export_entries(items: &[LedgerEntry], fmt: &str, out: &Path) -> Result<()> {
    match fmt {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)
                .with_context(|| format!("Create {}", out.display()))?;
            wtr.write_record([
                "id",
                "when",
                "amount",
                "currency",
                "category",
                "description",
            ])?;
            for e in items {
                wtr.write_record([
                    e.id.to_string(),
                    when(e),
                    e.amount.to_string(),
                    e.currency.to_string(),
                    e.category.clone(),
                    e.description.clone(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let rows: Vec<_> = items
                .iter()
                .map(|e| {
                    json!({
                        "id": e.id, "when": when(e), "amount": e.amount, "currency": e.currency,
                        "category": e.category, "description": e.description
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&rows)?)
                .with_context(|| format!("Write {}", out.display()))?;
        }
        other => anyhow::bail!("Unknown format: {} (use csv|json)", other),
    }
    Ok(())
}
