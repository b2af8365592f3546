// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use serde_json::json;

use super::{currency_or, year_or_current};
use crate::Ledger;
use crate::config::DefaultsConfig;
use crate::utils::{fmt_money, maybe_print_json, month_abbr, parse_month, pretty_table};

pub async fn monthly(
    ledger: &Ledger,
    sub: &clap::ArgMatches,
    defaults: &DefaultsConfig,
) -> Result<()> {
    let year = year_or_current(sub);
    let month = match sub.get_one::<String>("month") {
        Some(m) => parse_month(m)?,
        None => Local::now().month(),
    };
    let target = currency_or(sub, defaults.currency)?;

    let report = ledger
        .reports()
        .get_report(year, month, target)
        .await
        .with_context(|| format!("Report for {}-{:02} in {}", year, month, target))?;
    let by_category = ledger.reports().category_totals(&report)?;

    let out = json!({ "report": report, "categories": by_category });
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &out)? {
        return Ok(());
    }

    let rows: Vec<Vec<String>> = report
        .entries
        .iter()
        .map(|e| {
            vec![
                format!("{}-{:02}-{:02}", year, month, e.day),
                e.category.clone(),
                e.description.clone(),
                e.amount.to_string(),
                e.currency.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Date", "Category", "Description", "Amount", "CCY"], rows)
    );
    println!(
        "Total: {}",
        fmt_money(&report.total.amount, report.total.currency.code())
    );

    if !by_category.is_empty() {
        let hdr = format!("Total ({})", target);
        let rows = by_category
            .iter()
            .map(|c| vec![c.category.clone(), format!("{:.2}", c.total)])
            .collect();
        println!("{}", pretty_table(&["Category", &hdr], rows));
    }
    Ok(())
}

pub async fn yearly(
    ledger: &Ledger,
    sub: &clap::ArgMatches,
    defaults: &DefaultsConfig,
) -> Result<()> {
    let year = year_or_current(sub);
    let target = currency_or(sub, defaults.currency)?;
    let totals = ledger
        .reports()
        .get_year_totals(year, target)
        .await
        .with_context(|| format!("Yearly report for {} in {}", year, target))?;

    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &totals)? {
        return Ok(());
    }
    let hdr = format!("Total ({})", target);
    let rows = totals
        .iter()
        .map(|t| vec![month_abbr(t.month).to_string(), format!("{:.2}", t.total)])
        .collect();
    println!("{}", pretty_table(&["Month", &hdr], rows));
    Ok(())
}
