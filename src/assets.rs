// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{Connection, Row, params};
use rust_decimal::Decimal;

use crate::models::{AssetSnapshot, NewAssetSnapshot, ensure_non_negative};

pub fn insert(conn: &Connection, snap: &NewAssetSnapshot) -> Result<i64> {
    ensure_non_negative(snap.amount)?;
    conn.execute(
        "INSERT INTO assets(date, kind, name, amount) VALUES (?1, ?2, ?3, ?4)",
        params![
            snap.date.to_string(),
            snap.kind.as_str(),
            snap.name,
            snap.amount.to_string()
        ],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(id, kind = %snap.kind, name = %snap.name, amount = %snap.amount, "recorded asset snapshot");
    Ok(id)
}

fn from_row(r: &Row<'_>) -> Result<AssetSnapshot> {
    let id: i64 = r.get(0)?;
    let d: String = r.get(1)?;
    let k: String = r.get(2)?;
    let amount_s: String = r.get(4)?;
    Ok(AssetSnapshot {
        id,
        date: NaiveDate::parse_from_str(&d, "%Y-%m-%d")
            .with_context(|| format!("Invalid date '{}' in asset row {}", d, id))?,
        kind: k.parse()?,
        name: r.get(3)?,
        amount: amount_s
            .parse::<Decimal>()
            .with_context(|| format!("Invalid amount '{}' in asset row {}", amount_s, id))?,
    })
}

/// Snapshot history, newest first.
pub fn list(conn: &Connection) -> Result<Vec<AssetSnapshot>> {
    let mut stmt = conn
        .prepare("SELECT id, date, kind, name, amount FROM assets ORDER BY date DESC, id DESC")?;
    let mut rows = stmt.query([])?;
    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        data.push(from_row(r)?);
    }
    Ok(data)
}

/// The most recent snapshot of each `(kind, name)` bucket.
///
/// Ties on date go to the later insert.
pub fn latest(conn: &Connection) -> Result<Vec<AssetSnapshot>> {
    let mut stmt = conn.prepare(
        "SELECT a.id, a.date, a.kind, a.name, a.amount FROM assets a
         WHERE a.id = (
             SELECT b.id FROM assets b WHERE b.kind=a.kind AND b.name=a.name
             ORDER BY b.date DESC, b.id DESC LIMIT 1
         )
         ORDER BY a.kind, a.name",
    )?;
    let mut rows = stmt.query([])?;
    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        data.push(from_row(r)?);
    }
    Ok(data)
}
