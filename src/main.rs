// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::PathBuf;

use anyhow::Result;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use costbook::config::{Config, LoggingConfig};
use costbook::{Ledger, cli, commands};

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("costbook={}", logging.level)));
    let registry = tracing_subscriber::registry().with(filter);
    if logging.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli::build_cli().get_matches();

    let mut config = Config::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;
    if let Some(dir) = matches.get_one::<PathBuf>("db-dir") {
        config.database.dir = Some(dir.clone());
    }
    if let Some(level) = matches.get_one::<String>("log-level") {
        config.logging.level = level.clone();
    }
    init_tracing(&config.logging);

    let ledger = Ledger::new(
        config.location(),
        &config.database.name,
        Some(config.database.version),
    )?;
    let handle = ledger.bootstrap().await?;
    let defaults = &config.defaults;

    match matches.subcommand() {
        Some(("init", _)) => match handle.path() {
            Some(p) => println!(
                "Database ready at {} (schema v{})",
                p.display(),
                handle.version()
            ),
            None => println!("In-memory database ready (schema v{})", handle.version()),
        },
        Some(("add", sub)) => commands::costs::add(&ledger, sub, defaults).await?,
        Some(("recent", sub)) => commands::costs::recent(&ledger, sub, defaults).await?,
        Some(("list", sub)) => commands::costs::list(&ledger, sub).await?,
        Some(("rm", sub)) => commands::costs::remove(&ledger, sub).await?,
        Some(("categories", _)) => commands::costs::categories()?,
        Some(("report", sub)) => commands::reports::monthly(&ledger, sub, defaults).await?,
        Some(("yearly", sub)) => commands::reports::yearly(&ledger, sub, defaults).await?,
        Some(("export", sub)) => commands::exporter::handle(&ledger, sub).await?,
        Some(("rates", sub)) => commands::fx::handle(&ledger, sub).await?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
