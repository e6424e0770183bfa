// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Append-only store of dated income/expense events.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{Connection, Row, params};
use rust_decimal::Decimal;

use crate::models::{Kind, LedgerEntry, NewLedgerEntry, ensure_non_negative};

#[derive(Debug, Clone, Default)]
pub struct LedgerFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub kind: Option<Kind>,
    pub limit: Option<usize>,
}

pub fn insert(conn: &Connection, entry: &NewLedgerEntry) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO ledger(date, kind, category, amount, note, recurring_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            entry.date.to_string(),
            entry.kind.as_str(),
            entry.category,
            entry.amount.to_string(),
            entry.note,
            entry.recurring_id
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Validate and record a user-entered event.
pub fn record(conn: &Connection, entry: &NewLedgerEntry) -> Result<i64> {
    ensure_non_negative(entry.amount)?;
    let id = insert(conn, entry)?;
    tracing::info!(id, date = %entry.date, kind = %entry.kind, amount = %entry.amount, "recorded ledger entry");
    Ok(id)
}

fn from_row(r: &Row<'_>) -> Result<LedgerEntry> {
    let id: i64 = r.get(0)?;
    let d: String = r.get(1)?;
    let k: String = r.get(2)?;
    let amount_s: String = r.get(4)?;
    Ok(LedgerEntry {
        id,
        date: NaiveDate::parse_from_str(&d, "%Y-%m-%d")
            .with_context(|| format!("Invalid date '{}' in ledger row {}", d, id))?,
        kind: k.parse()?,
        category: r.get(3)?,
        amount: amount_s
            .parse::<Decimal>()
            .with_context(|| format!("Invalid amount '{}' in ledger row {}", amount_s, id))?,
        note: r.get(5)?,
        recurring_id: r.get(6)?,
    })
}

/// Entries matching `filter`, newest first.
pub fn list(conn: &Connection, filter: &LedgerFilter) -> Result<Vec<LedgerEntry>> {
    let mut sql = String::from(
        "SELECT id, date, kind, category, amount, note, recurring_id FROM ledger WHERE 1=1",
    );
    let mut params_vec: Vec<String> = Vec::new();
    if let Some(from) = filter.from {
        sql.push_str(" AND date>=?");
        params_vec.push(from.to_string());
    }
    if let Some(to) = filter.to {
        sql.push_str(" AND date<=?");
        params_vec.push(to.to_string());
    }
    if let Some(kind) = filter.kind {
        sql.push_str(" AND kind=?");
        params_vec.push(kind.as_str().to_string());
    }
    sql.push_str(" ORDER BY date DESC, id DESC");
    if let Some(limit) = filter.limit {
        sql.push_str(" LIMIT ?");
        params_vec.push(limit.to_string());
    }

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(rusqlite::params_from_iter(params_vec.iter()))?;
    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        data.push(from_row(r)?);
    }
    Ok(data)
}

/// Entries dated within `[from, to]`, oldest first. A missing bound is open.
pub fn range(
    conn: &Connection,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<Vec<LedgerEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, date, kind, category, amount, note, recurring_id FROM ledger
         WHERE (?1 IS NULL OR date>=?1) AND (?2 IS NULL OR date<=?2)
         ORDER BY date, id",
    )?;
    let mut rows = stmt.query(params![
        from.map(|d| d.to_string()),
        to.map(|d| d.to_string())
    ])?;
    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        data.push(from_row(r)?);
    }
    Ok(data)
}

/// Every entry, oldest first.
pub fn all(conn: &Connection) -> Result<Vec<LedgerEntry>> {
    range(conn, None, None)
}
