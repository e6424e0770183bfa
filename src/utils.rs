// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;

use crate::recurring::ReschedulePolicy;

pub const RESCHEDULE_POLICY_KEY: &str = "reschedule_policy";
pub const SCHEDULER_INTERVAL_KEY: &str = "scheduler_interval_minutes";
pub const DEFAULT_INTERVAL_MINUTES: u64 = 60;
/// One year.
pub const MAX_INTERVAL_MINUTES: u64 = 525_600;

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

pub fn parse_bool(s: &str) -> Result<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        other => Err(anyhow!("Invalid boolean '{}', expected true|false", other)),
    }
}

/// Today's date on the local calendar.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn fmt_money(d: &Decimal) -> String {
    format!("{:.2}", d.round_dp(2))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub fn get_reschedule_policy(conn: &Connection) -> Result<ReschedulePolicy> {
    match get_setting(conn, RESCHEDULE_POLICY_KEY)? {
        Some(v) => v.parse::<ReschedulePolicy>().map_err(|e| anyhow!(e)),
        None => Ok(ReschedulePolicy::default()),
    }
}

pub fn set_reschedule_policy(conn: &Connection, policy: ReschedulePolicy) -> Result<()> {
    set_setting(conn, RESCHEDULE_POLICY_KEY, policy.as_str())
}

pub fn get_scheduler_interval(conn: &Connection) -> Result<u64> {
    match get_setting(conn, SCHEDULER_INTERVAL_KEY)? {
        Some(v) => v
            .trim()
            .parse::<u64>()
            .with_context(|| format!("Invalid {} setting '{}'", SCHEDULER_INTERVAL_KEY, v)),
        None => Ok(DEFAULT_INTERVAL_MINUTES),
    }
}

pub fn set_scheduler_interval(conn: &Connection, minutes: u64) -> Result<()> {
    if !(1..=MAX_INTERVAL_MINUTES).contains(&minutes) {
        return Err(anyhow!(
            "Scheduler interval must be between 1 and {} minutes",
            MAX_INTERVAL_MINUTES
        ));
    }
    set_setting(conn, SCHEDULER_INTERVAL_KEY, &minutes.to_string())
}
