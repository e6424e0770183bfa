// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::{self, LedgerFilter};
use crate::models::{Kind, NewLedgerEntry};
use crate::utils::{fmt_money, maybe_print_json, parse_date, parse_decimal, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let kind: Kind = sub.get_one::<String>("kind").unwrap().parse()?;
    let category = sub.get_one::<String>("category").unwrap().trim().to_string();
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let note = sub
        .get_one::<String>("note")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string());

    ledger::record(
        conn,
        &NewLedgerEntry {
            date,
            kind,
            category: category.clone(),
            amount,
            note,
            recurring_id: None,
        },
    )?;
    println!("Recorded {} {} on {} ({})", kind, amount, date, category);
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.date.clone(),
                    r.kind.clone(),
                    r.category.clone(),
                    r.amount.clone(),
                    r.note.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Date", "Kind", "Category", "Amount", "Note"], rows)
        );
    }
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub date: String,
    pub kind: String,
    pub category: String,
    pub amount: String,
    pub note: String,
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<TransactionRow>> {
    let filter = LedgerFilter {
        from: sub.get_one::<String>("from").map(|s| parse_date(s)).transpose()?,
        to: sub.get_one::<String>("to").map(|s| parse_date(s)).transpose()?,
        kind: sub
            .get_one::<String>("kind")
            .map(|s| s.parse::<Kind>())
            .transpose()?,
        limit: sub.get_one::<usize>("limit").copied(),
    };
    let data = ledger::list(conn, &filter)?
        .into_iter()
        .map(|e| TransactionRow {
            date: e.date.to_string(),
            kind: e.kind.to_string(),
            category: e.category,
            amount: fmt_money(&e.amount),
            note: e.note.unwrap_or_default(),
        })
        .collect();
    Ok(data)
}
