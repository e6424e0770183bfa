// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine;
use crate::models::{Frequency, Kind, NewRecurring, RecurringDefinition, RecurringPatch};
use crate::recurring::{self, RawRecurring, ReschedulePolicy};
use crate::utils::{
    get_reschedule_policy, maybe_print_json, parse_bool, parse_date, parse_decimal,
    pretty_table, today,
};
use anyhow::{Context, Result, anyhow};
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => {
            let id = parse_id(sub)?;
            recurring::delete(conn, id)?;
            println!("Removed recurring definition {}", id);
        }
        Some(("run", sub)) => run(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn parse_id(sub: &clap::ArgMatches) -> Result<i64> {
    let raw = sub.get_one::<String>("id").unwrap();
    raw.trim()
        .parse::<i64>()
        .with_context(|| format!("Invalid id '{}'", raw))
}

fn trimmed(sub: &clap::ArgMatches, key: &str) -> Option<String> {
    sub.get_one::<String>(key)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let new = NewRecurring {
        name: sub.get_one::<String>("name").unwrap().trim().to_string(),
        amount: parse_decimal(sub.get_one::<String>("amount").unwrap())?,
        category: sub.get_one::<String>("category").unwrap().trim().to_string(),
        kind: sub.get_one::<String>("kind").unwrap().parse()?,
        frequency: sub.get_one::<String>("frequency").unwrap().parse()?,
        start_date: parse_date(sub.get_one::<String>("start").unwrap())?,
        active: !sub.get_flag("inactive"),
    };
    let def = recurring::create(conn, &new)?;
    println!(
        "Added recurring '{}' (id {}): {} {} {}, first due {}",
        def.name, def.id, def.frequency, def.kind, def.amount, def.next_due_date
    );
    Ok(())
}

fn raw_row(r: &RawRecurring) -> Vec<String> {
    vec![
        r.id.to_string(),
        r.name.clone(),
        r.amount.clone(),
        r.kind.clone(),
        r.category.clone(),
        r.frequency.clone(),
        r.start_date.clone(),
        r.next_due_date.clone(),
        if r.active { "yes".into() } else { "paused".into() },
    ]
}

const HEADERS: [&str; 9] = [
    "ID", "Name", "Amount", "Kind", "Category", "Frequency", "Start", "Next Due", "Active",
];

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    // Raw rows so a malformed definition is still visible here.
    let data = recurring::list_raw(conn)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data.iter().map(raw_row).collect();
        println!("{}", pretty_table(&HEADERS, rows));
    }
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let raw = recurring::get_raw(conn, parse_id(sub)?)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &raw)? {
        println!("{}", pretty_table(&HEADERS, vec![raw_row(&raw)]));
    }
    Ok(())
}

pub fn patch_from_args(sub: &clap::ArgMatches) -> Result<RecurringPatch> {
    Ok(RecurringPatch {
        name: trimmed(sub, "name"),
        amount: trimmed(sub, "amount")
            .map(|s| parse_decimal(&s))
            .transpose()?,
        category: trimmed(sub, "category"),
        kind: trimmed(sub, "kind").map(|s| s.parse::<Kind>()).transpose()?,
        frequency: trimmed(sub, "frequency")
            .map(|s| s.parse::<Frequency>())
            .transpose()?,
        start_date: trimmed(sub, "start").map(|s| parse_date(&s)).transpose()?,
        active: trimmed(sub, "active").map(|s| parse_bool(&s)).transpose()?,
    })
}

fn edit(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = parse_id(sub)?;
    let patch = patch_from_args(sub)?;
    if patch.is_empty() {
        return Err(anyhow!("Nothing to change for recurring definition {}", id));
    }
    let policy = match trimmed(sub, "policy") {
        Some(p) => p.parse::<ReschedulePolicy>().map_err(|e| anyhow!(e))?,
        None => get_reschedule_policy(conn)?,
    };
    let def: RecurringDefinition = recurring::update(conn, id, &patch, policy)?;
    println!(
        "Updated recurring '{}' (id {}), next due {}",
        def.name, def.id, def.next_due_date
    );
    Ok(())
}

fn run(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let as_of = match sub.get_one::<String>("as_of") {
        Some(s) => parse_date(s)?,
        None => today(),
    };
    let report = engine::process_due(conn, as_of)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
        return Ok(());
    }
    println!(
        "Processed recurring definitions as of {}: {} entries created across {} definitions",
        report.as_of, report.created, report.advanced
    );
    if !report.failures.is_empty() {
        let rows = report
            .failures
            .iter()
            .map(|f| {
                vec![
                    f.id.to_string(),
                    f.attempted.map(|d| d.to_string()).unwrap_or_default(),
                    f.reason.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Skipped ID", "Due Date", "Reason"], rows)
        );
    }
    Ok(())
}
