// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rust_decimal::Decimal;

use super::{currency_or, required, year_or_current};
use crate::Ledger;
use crate::config::DefaultsConfig;
use crate::models::{EntryDraft, LedgerEntry, RECOMMENDED_CATEGORIES};
use crate::utils::{maybe_print_json, parse_decimal, parse_month, pretty_table};

pub async fn add(ledger: &Ledger, sub: &clap::ArgMatches, defaults: &DefaultsConfig) -> Result<()> {
    let amount = parse_decimal(required(sub, "amount")?)?;
    if amount <= Decimal::ZERO {
        anyhow::bail!("Amount must be positive, got {}", amount);
    }
    let currency = currency_or(sub, defaults.currency)?;
    let category = required(sub, "category")?.trim().to_string();
    if category.is_empty() {
        anyhow::bail!("Category is required");
    }
    let description = sub
        .get_one::<String>("description")
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    let added = ledger
        .add_cost(EntryDraft::new(amount, currency, category, description))
        .await?;
    println!(
        "Recorded {} {} ({}{}{})",
        added.amount,
        added.currency,
        added.category,
        if added.description.is_empty() { "" } else { ": " },
        added.description
    );
    Ok(())
}

pub async fn recent(
    ledger: &Ledger,
    sub: &clap::ArgMatches,
    defaults: &DefaultsConfig,
) -> Result<()> {
    let limit = sub
        .get_one::<usize>("limit")
        .copied()
        .unwrap_or(defaults.recent);
    let items = ledger.repo().find_recent(limit).await?;
    print_entries(sub, &items)
}

pub async fn list(ledger: &Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let items = if let Some(cat) = sub.get_one::<String>("category") {
        let mut items = ledger.repo().find_by_category(cat).await?;
        if let Some(y) = sub.get_one::<i32>("year") {
            items.retain(|e| e.year() == Some(*y));
        }
        items
    } else {
        let year = year_or_current(sub);
        match sub.get_one::<String>("month") {
            Some(m) => ledger.repo().find_by_month(year, parse_month(m)?).await?,
            None => ledger.repo().find_by_year(year).await?,
        }
    };
    print_entries(sub, &items)
}

pub async fn remove(ledger: &Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub
        .get_one::<i64>("id")
        .copied()
        .ok_or_else(|| anyhow::anyhow!("Missing argument 'id'"))?;
    ledger.repo().delete_by_id(id).await?;
    println!("Deleted expense {}", id);
    Ok(())
}

pub fn categories() -> Result<()> {
    let rows = RECOMMENDED_CATEGORIES
        .iter()
        .map(|c| vec![c.to_string()])
        .collect();
    println!("{}", pretty_table(&["Category"], rows));
    Ok(())
}

pub(crate) fn when(e: &LedgerEntry) -> String {
    match (e.created_at, e.date) {
        (Some(t), _) => t.format("%Y-%m-%d %H:%M").to_string(),
        (None, Some(d)) => d.to_string(),
        (None, None) => String::new(),
    }
}

fn print_entries(sub: &clap::ArgMatches, items: &[LedgerEntry]) -> Result<()> {
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &items)? {
        return Ok(());
    }
    let rows: Vec<Vec<String>> = items
        .iter()
        .map(|e| {
            vec![
                e.id.to_string(),
                when(e),
                e.amount.to_string(),
                e.currency.to_string(),
                e.category.clone(),
                e.description.clone(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Id", "When", "Amount", "CCY", "Category", "Description"],
            rows
        )
    );
    Ok(())
}
