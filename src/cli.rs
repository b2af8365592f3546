// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn year_arg() -> Arg {
    Arg::new("year")
        .long("year")
        .short('y')
        .value_parser(value_parser!(i32))
        .help("Year (defaults to the current year)")
}

fn currency_arg() -> Arg {
    Arg::new("currency")
        .long("currency")
        .short('c')
        .help("USD, ILS, GBP or EURO")
}

pub fn build_cli() -> Command {
    Command::new("costbook")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Multi-currency personal expense tracker")
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(std::path::PathBuf))
                .help("Config file (TOML)"),
        )
        .arg(
            Arg::new("db-dir")
                .long("db-dir")
                .global(true)
                .value_parser(value_parser!(std::path::PathBuf))
                .help("Directory holding the database"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .help("trace, debug, info, warn or error"),
        )
        .subcommand(Command::new("init").about("Create or upgrade the database"))
        .subcommand(
            Command::new("add")
                .about("Record an expense")
                .arg(Arg::new("amount").long("amount").short('a').required(true))
                .arg(currency_arg())
                .arg(Arg::new("category").long("category").short('k').required(true))
                .arg(
                    Arg::new("description")
                        .long("description")
                        .short('d')
                        .default_value(""),
                ),
        )
        .subcommand(json_flags(
            Command::new("recent").about("Most recent expenses").arg(
                Arg::new("limit")
                    .long("limit")
                    .short('n')
                    .value_parser(value_parser!(usize)),
            ),
        ))
        .subcommand(json_flags(
            Command::new("list")
                .about("Expenses for a year, a month or a category")
                .arg(year_arg())
                .arg(Arg::new("month").long("month").short('m'))
                .arg(
                    Arg::new("category")
                        .long("category")
                        .short('k')
                        .conflicts_with("month"),
                ),
        ))
        .subcommand(
            Command::new("rm").about("Delete an expense by id").arg(
                Arg::new("id")
                    .required(true)
                    .value_parser(value_parser!(i64)),
            ),
        )
        .subcommand(json_flags(
            Command::new("report")
                .about("Monthly report with category totals")
                .arg(year_arg())
                .arg(Arg::new("month").long("month").short('m'))
                .arg(currency_arg()),
        ))
        .subcommand(json_flags(
            Command::new("yearly")
                .about("Month totals for a year")
                .arg(year_arg())
                .arg(currency_arg()),
        ))
        .subcommand(Command::new("categories").about("Recommended categories"))
        .subcommand(
            Command::new("export")
                .about("Export a year of expenses")
                .arg(year_arg())
                .arg(
                    Arg::new("format")
                        .long("format")
                        .default_value("csv")
                        .value_parser(["csv", "json"]),
                )
                .arg(Arg::new("out").long("out").short('o').required(true)),
        )
        .subcommand(
            Command::new("rates")
                .about("Exchange rates")
                .subcommand(
                    Command::new("set-url")
                        .about("Remember the rates URL")
                        .arg(Arg::new("url").required(true)),
                )
                .subcommand(
                    Command::new("fetch")
                        .about("Fetch, save and apply rates")
                        .arg(Arg::new("url").long("url")),
                )
                .subcommand(json_flags(
                    Command::new("show").about("Show the saved URL and rates"),
                ))
                .subcommand(
                    Command::new("convert")
                        .about("Convert an amount with the saved rates")
                        .arg(Arg::new("amount").required(true))
                        .arg(Arg::new("from").required(true))
                        .arg(Arg::new("to").required(true)),
                ),
        )
}
