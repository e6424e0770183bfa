// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::assets;
use crate::models::{AssetKind, AssetSnapshot, NewAssetSnapshot};
use crate::utils::{fmt_money, maybe_print_json, parse_date, parse_decimal, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let date = parse_date(sub.get_one::<String>("date").unwrap())?;
            let kind: AssetKind = sub.get_one::<String>("kind").unwrap().parse()?;
            let name = sub.get_one::<String>("name").unwrap().trim().to_string();
            let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
            assets::insert(
                conn,
                &NewAssetSnapshot {
                    date,
                    kind,
                    name: name.clone(),
                    amount,
                },
            )?;
            println!("Recorded {} '{}' = {} on {}", kind, name, amount, date);
        }
        Some(("list", sub)) => print_snapshots(assets::list(conn)?, sub)?,
        Some(("latest", sub)) => print_snapshots(assets::latest(conn)?, sub)?,
        _ => {}
    }
    Ok(())
}

fn print_snapshots(data: Vec<AssetSnapshot>, sub: &clap::ArgMatches) -> Result<()> {
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    let rows = data
        .into_iter()
        .map(|s| {
            vec![
                s.date.to_string(),
                s.kind.to_string(),
                s.name,
                fmt_money(&s.amount),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Date", "Type", "Name", "Value"], rows)
    );
    Ok(())
}
