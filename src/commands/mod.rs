// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{Datelike, Local};

use crate::models::Currency;

pub mod costs;
pub mod exporter;
pub mod fx;
pub mod reports;

pub(crate) fn required<'a>(m: &'a clap::ArgMatches, name: &str) -> Result<&'a String> {
    m.get_one::<String>(name)
        .with_context(|| format!("Missing argument '{}'", name))
}

pub(crate) fn year_or_current(m: &clap::ArgMatches) -> i32 {
    m.get_one::<i32>("year")
        .copied()
        .unwrap_or_else(|| Local::now().year())
}

pub(crate) fn currency_or(m: &clap::ArgMatches, fallback: Currency) -> Result<Currency> {
    match m.get_one::<String>("currency") {
        Some(s) => Ok(s.parse::<Currency>()?),
        None => Ok(fallback),
    }
}
