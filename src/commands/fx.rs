// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use serde_json::json;

use super::required;
use crate::Ledger;
use crate::fx::RateTable;
use crate::models::Currency;
use crate::utils::{maybe_print_json, parse_decimal, pretty_table};

pub async fn handle(ledger: &Ledger, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set-url", sub)) => {
            let url = required(sub, "url")?;
            ledger.rates().save_url(url).await?;
            println!("Saved rates URL.");
        }
        Some(("fetch", sub)) => fetch(ledger, sub).await?,
        Some(("show", sub)) => show(ledger, sub).await?,
        Some(("convert", sub)) => convert_amount(ledger, sub)?,
        _ => {}
    }
    Ok(())
}

async fn fetch(ledger: &Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let table = match sub.get_one::<String>("url") {
        Some(url) => {
            let t = ledger.rates().fetch_rates(url).await?;
            ledger.rates().save_url(url).await?;
            t
        }
        None => ledger
            .rates()
            .refresh()
            .await
            .context("No usable rates URL; pass --url or run `rates set-url`")?,
    };
    println!("Rates fetched & applied.");
    println!("{}", rates_table(&table));
    Ok(())
}

async fn show(ledger: &Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let url = ledger.rates().url().await?;
    let saved = ledger.settings().saved_rates().await?;
    let out = json!({ "url": url, "rates": saved });
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &out)? {
        return Ok(());
    }
    println!(
        "URL: {}",
        if url.is_empty() { "(not set)" } else { url.as_str() }
    );
    match saved {
        Some(t) => println!("{}", rates_table(&t)),
        None => println!("No exchange rates saved. Run `costbook rates fetch`."),
    }
    Ok(())
}

fn convert_amount(ledger: &Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let amount = parse_decimal(required(sub, "amount")?)?;
    let from = required(sub, "from")?.parse::<Currency>()?;
    let to = required(sub, "to")?.parse::<Currency>()?;
    let res = ledger.fx().convert(amount, from, to)?;
    println!("{} {} -> {:.4} {}", amount, from, res, to);
    Ok(())
}

fn rates_table(table: &RateTable) -> comfy_table::Table {
    let rows = table
        .iter()
        .map(|(c, r)| vec![c.to_string(), r.to_string()])
        .collect();
    pretty_table(&["Currency", "Rate"], rows)
}
