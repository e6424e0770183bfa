// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

use crate::db::DB_ENV;
use crate::utils::MAX_INTERVAL_MINUTES;

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn id_arg() -> Arg {
    Arg::new("id")
        .long("id")
        .required(true)
        .help("Recurring definition id")
}

pub fn build_cli() -> Command {
    Command::new("pennywise")
        .about("Personal ledger with recurring transaction catch-up")
        .version(clap::crate_version!())
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .env(DB_ENV)
                .help("Path to the SQLite database file"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Debug logging"),
        )
        .subcommand(Command::new("init").about("Create the database if missing"))
        .subcommand(
            Command::new("tx")
                .about("Income and expense entries")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("date").long("date").required(true))
                        .arg(
                            Arg::new("kind")
                                .long("kind")
                                .required(true)
                                .help("income|expense"),
                        )
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("note").long("note")),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(Arg::new("from").long("from"))
                        .arg(Arg::new("to").long("to"))
                        .arg(Arg::new("kind").long("kind"))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                )),
        )
        .subcommand(
            Command::new("asset")
                .about("Asset and liability snapshots")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("date").long("date").required(true))
                        .arg(
                            Arg::new("kind")
                                .long("kind")
                                .required(true)
                                .help("cash|credit-card-debt|investment|property"),
                        )
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("amount").long("amount").required(true)),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(json_flags(
                    Command::new("latest").about("Latest value per asset"),
                )),
        )
        .subcommand(
            Command::new("recurring")
                .about("Recurring income and expenses")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(Arg::new("kind").long("kind").required(true))
                        .arg(
                            Arg::new("frequency")
                                .long("frequency")
                                .required(true)
                                .help("daily|weekly|monthly|yearly"),
                        )
                        .arg(Arg::new("start").long("start").required(true))
                        .arg(
                            Arg::new("inactive")
                                .long("inactive")
                                .action(ArgAction::SetTrue)
                                .help("Create paused"),
                        ),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(json_flags(Command::new("show").arg(id_arg())))
                .subcommand(
                    Command::new("edit")
                        .arg(id_arg())
                        .arg(Arg::new("name").long("name"))
                        .arg(Arg::new("amount").long("amount"))
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("kind").long("kind"))
                        .arg(Arg::new("frequency").long("frequency"))
                        .arg(Arg::new("start").long("start"))
                        .arg(Arg::new("active").long("active").help("true|false"))
                        .arg(
                            Arg::new("policy")
                                .long("policy")
                                .help("preserve|recompute (defaults to the stored setting)"),
                        ),
                )
                .subcommand(Command::new("rm").arg(id_arg()))
                .subcommand(json_flags(
                    Command::new("run")
                        .about("Materialize due entries now")
                        .arg(
                            Arg::new("as_of")
                                .long("as-of")
                                .help("Process as of this date (default: today)"),
                        ),
                )),
        )
        .subcommand(
            Command::new("report")
                .about("Summaries")
                .subcommand(json_flags(Command::new("networth")))
                .subcommand(json_flags(
                    Command::new("cashflow")
                        .arg(Arg::new("from").long("from"))
                        .arg(Arg::new("to").long("to")),
                ))
                .subcommand(json_flags(
                    Command::new("monthly").arg(
                        Arg::new("months")
                            .long("months")
                            .value_parser(value_parser!(usize)),
                    ),
                )),
        )
        .subcommand(
            Command::new("export").subcommand(
                Command::new("ledger")
                    .arg(
                        Arg::new("format")
                            .long("format")
                            .default_value("csv")
                            .help("csv|json"),
                    )
                    .arg(Arg::new("out").long("out").required(true)),
            ),
        )
        .subcommand(
            Command::new("settings")
                .subcommand(Command::new("show"))
                .subcommand(
                    Command::new("set")
                        .arg(
                            Arg::new("key")
                                .long("key")
                                .required(true)
                                .help("reschedule_policy|scheduler_interval_minutes"),
                        )
                        .arg(Arg::new("value").long("value").required(true)),
                ),
        )
        .subcommand(Command::new("doctor").about("Check recurring definitions for bad data"))
        .subcommand(
            Command::new("watch")
                .about("Run the catch-up engine on a timer")
                .arg(
                    Arg::new("every_minutes")
                        .long("every-minutes")
                        .value_parser(value_parser!(u64).range(1..=MAX_INTERVAL_MINUTES)),
                ),
        )
}
