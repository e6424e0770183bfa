// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::PathBuf;

use anyhow::{Context, Result};

use pennywise::{cli, commands, db, logging, scheduler, utils};

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    logging::init(matches.get_flag("verbose"));

    let explicit = matches.get_one::<String>("db").map(PathBuf::from);
    let path = db::db_path(explicit.as_deref())?;
    let mut conn = db::open_at(&path)?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", path.display());
        }
        Some(("tx", sub)) => commands::transactions::handle(&conn, sub)?,
        Some(("asset", sub)) => commands::assets::handle(&conn, sub)?,
        Some(("recurring", sub)) => commands::recurring::handle(&mut conn, sub)?,
        Some(("report", sub)) => commands::reports::handle(&conn, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, sub)?,
        Some(("settings", sub)) => commands::settings::handle(&conn, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&conn)?,
        Some(("watch", sub)) => {
            let minutes = match sub.get_one::<u64>("every_minutes") {
                Some(m) => *m,
                None => utils::get_scheduler_interval(&conn)?,
            };
            // Each tick opens its own connection.
            drop(conn);
            let rt = tokio::runtime::Runtime::new().context("Start async runtime")?;
            rt.block_on(scheduler::watch(path, scheduler::tick_interval(minutes)))?;
        }
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
