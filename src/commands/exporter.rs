// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger;
use anyhow::{Result, anyhow};
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("ledger", sub)) => export_ledger(conn, sub),
        _ => Ok(()),
    }
}

fn export_ledger(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().trim().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap().trim();

    let entries = ledger::all(conn)?;
    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record(["date", "kind", "category", "amount", "note", "recurring_id"])?;
            for e in &entries {
                wtr.write_record([
                    e.date.to_string(),
                    e.kind.to_string(),
                    e.category.clone(),
                    e.amount.to_string(),
                    e.note.clone().unwrap_or_default(),
                    e.recurring_id.map(|id| id.to_string()).unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let items: Vec<_> = entries
                .iter()
                .map(|e| {
                    json!({
                        "date": e.date.to_string(), "kind": e.kind, "category": e.category,
                        "amount": e.amount.to_string(), "note": e.note, "recurring_id": e.recurring_id
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        _ => return Err(anyhow!("Unknown format: {} (use csv|json)", fmt)),
    }
    tracing::info!(count = entries.len(), out, "exported ledger");
    println!("Exported {} ledger entries to {}", entries.len(), out);
    Ok(())
}
