// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Storage of recurring definitions.
//!
//! Rows are read as raw text first and decoded separately, so one row with an
//! unknown frequency or a mangled date can be reported without failing the
//! whole read.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::models::{
    Frequency, Kind, ModelError, NewRecurring, RecurringDefinition, RecurringPatch,
    ensure_non_negative,
};
use crate::schedule::{ScheduleError, first_on_or_after};

#[derive(Debug, Error)]
pub enum RecurringError {
    #[error("no such recurring definition: {0}")]
    NotFound(i64),
    #[error("recurring definition {id} is malformed: {reason}")]
    Malformed { id: i64, reason: String },
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error(transparent)]
    Sql(#[from] rusqlite::Error),
}

/// What an edit to `start_date` or `frequency` does to `next_due_date`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ReschedulePolicy {
    /// Keep the current due date, raised to the start date if it fell behind.
    #[default]
    Preserve,
    /// Re-anchor the due date on the edited schedule.
    Recompute,
}

impl ReschedulePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReschedulePolicy::Preserve => "preserve",
            ReschedulePolicy::Recompute => "recompute",
        }
    }
}

impl fmt::Display for ReschedulePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReschedulePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "preserve" => Ok(ReschedulePolicy::Preserve),
            "recompute" => Ok(ReschedulePolicy::Recompute),
            other => Err(format!(
                "unknown reschedule policy '{}' (use preserve|recompute)",
                other
            )),
        }
    }
}

/// A `recurring` row exactly as stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawRecurring {
    pub id: i64,
    pub name: String,
    pub amount: String,
    pub category: String,
    pub kind: String,
    pub frequency: String,
    pub start_date: String,
    pub next_due_date: String,
    pub active: bool,
}

pub(crate) const COLUMNS: &str =
    "id, name, amount, category, kind, frequency, start_date, next_due_date, active";

impl RawRecurring {
    pub(crate) fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: r.get(0)?,
            name: r.get(1)?,
            amount: r.get(2)?,
            category: r.get(3)?,
            kind: r.get(4)?,
            frequency: r.get(5)?,
            start_date: r.get(6)?,
            next_due_date: r.get(7)?,
            active: r.get(8)?,
        })
    }

    /// The stored due date, if it parses.
    pub fn attempted_date(&self) -> Option<NaiveDate> {
        parse_stored_date(&self.next_due_date).ok()
    }

    pub fn decode(&self) -> Result<RecurringDefinition, RecurringError> {
        let malformed = |reason: String| RecurringError::Malformed {
            id: self.id,
            reason,
        };
        let frequency = self
            .frequency
            .parse::<Frequency>()
            .map_err(|e| malformed(e.to_string()))?;
        let kind = self
            .kind
            .parse::<Kind>()
            .map_err(|e| malformed(e.to_string()))?;
        let amount = self
            .amount
            .parse::<Decimal>()
            .map_err(|e| malformed(format!("amount '{}': {}", self.amount, e)))
            .and_then(|a| ensure_non_negative(a).map_err(|e| malformed(e.to_string())))?;
        let start_date = parse_stored_date(&self.start_date)
            .map_err(|e| malformed(format!("start_date '{}': {}", self.start_date, e)))?;
        let next_due_date = parse_stored_date(&self.next_due_date)
            .map_err(|e| malformed(format!("next_due_date '{}': {}", self.next_due_date, e)))?;
        Ok(RecurringDefinition {
            id: self.id,
            name: self.name.clone(),
            amount,
            category: self.category.clone(),
            kind,
            frequency,
            start_date,
            next_due_date,
            active: self.active,
        })
    }
}

/// Strict `YYYY-MM-DD`; unpadded forms such as `2024-1-5` are rejected.
fn parse_stored_date(s: &str) -> Result<NaiveDate, String> {
    if s.len() != 10 {
        return Err("expected YYYY-MM-DD".to_string());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| e.to_string())
}

pub fn create(conn: &Connection, new: &NewRecurring) -> Result<RecurringDefinition, RecurringError> {
    let amount = ensure_non_negative(new.amount)?;
    conn.execute(
        "INSERT INTO recurring(name, amount, category, kind, frequency, start_date, next_due_date, active)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6, ?7)",
        params![
            new.name,
            amount.to_string(),
            new.category,
            new.kind.as_str(),
            new.frequency.as_str(),
            new.start_date.to_string(),
            new.active
        ],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(id, name = %new.name, frequency = %new.frequency, start = %new.start_date, "created recurring definition");
    get(conn, id)
}

pub fn list_raw(conn: &Connection) -> Result<Vec<RawRecurring>, RecurringError> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM recurring ORDER BY id", COLUMNS))?;
    let rows = stmt.query_map([], RawRecurring::from_row)?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}

/// Every definition, failing on the first row that does not decode.
pub fn list(conn: &Connection) -> Result<Vec<RecurringDefinition>, RecurringError> {
    list_raw(conn)?.iter().map(RawRecurring::decode).collect()
}

pub fn get_raw(conn: &Connection, id: i64) -> Result<RawRecurring, RecurringError> {
    conn.query_row(
        &format!("SELECT {} FROM recurring WHERE id=?1", COLUMNS),
        params![id],
        RawRecurring::from_row,
    )
    .optional()?
    .ok_or(RecurringError::NotFound(id))
}

pub fn get(conn: &Connection, id: i64) -> Result<RecurringDefinition, RecurringError> {
    get_raw(conn, id)?.decode()
}

/// Active definitions due on or before `as_of`.
///
/// Dates compare as text, so a row whose `next_due_date` is not a canonical
/// `YYYY-MM-DD` is always selected and left for the caller to reject.
pub fn due(conn: &Connection, as_of: NaiveDate) -> rusqlite::Result<Vec<RawRecurring>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {} FROM recurring
         WHERE active=1 AND (next_due_date<=?1 OR date(next_due_date) IS NOT next_due_date)
         ORDER BY id",
        COLUMNS
    ))?;
    let rows = stmt.query_map(params![as_of.to_string()], RawRecurring::from_row)?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}

/// Move a definition's due date; returns whether a row was updated.
pub fn set_next_due(conn: &Connection, id: i64, next_due: NaiveDate) -> rusqlite::Result<bool> {
    let n = conn.execute(
        "UPDATE recurring SET next_due_date=?1 WHERE id=?2",
        params![next_due.to_string(), id],
    )?;
    Ok(n > 0)
}

pub fn update(
    conn: &mut Connection,
    id: i64,
    patch: &RecurringPatch,
    policy: ReschedulePolicy,
) -> Result<RecurringDefinition, RecurringError> {
    // Immediate so a concurrent catch-up run cannot advance the due date underneath us.
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let before = get(&tx, id)?;
    let mut after = apply_patch(&before, patch)?;

    let schedule_changed =
        after.start_date != before.start_date || after.frequency != before.frequency;
    match policy {
        ReschedulePolicy::Recompute if schedule_changed => {
            let fired: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM ledger WHERE recurring_id=?1)",
                params![id],
                |r| r.get(0),
            )?;
            after.next_due_date = if fired {
                first_on_or_after(after.start_date, after.frequency, before.next_due_date)?
            } else {
                after.start_date
            };
        }
        _ => {
            if after.next_due_date < after.start_date {
                after.next_due_date = after.start_date;
            }
        }
    }

    tx.execute(
        "UPDATE recurring SET name=?1, amount=?2, category=?3, kind=?4, frequency=?5,
         start_date=?6, next_due_date=?7, active=?8 WHERE id=?9",
        params![
            after.name,
            after.amount.to_string(),
            after.category,
            after.kind.as_str(),
            after.frequency.as_str(),
            after.start_date.to_string(),
            after.next_due_date.to_string(),
            after.active,
            id
        ],
    )?;
    tx.commit()?;
    if after.next_due_date != before.next_due_date {
        tracing::info!(id, from = %before.next_due_date, to = %after.next_due_date, %policy, "rescheduled recurring definition");
    }
    Ok(after)
}

fn apply_patch(
    def: &RecurringDefinition,
    patch: &RecurringPatch,
) -> Result<RecurringDefinition, RecurringError> {
    let mut out = def.clone();
    if let Some(ref name) = patch.name {
        out.name = name.clone();
    }
    if let Some(amount) = patch.amount {
        out.amount = ensure_non_negative(amount)?;
    }
    if let Some(ref category) = patch.category {
        out.category = category.clone();
    }
    if let Some(kind) = patch.kind {
        out.kind = kind;
    }
    if let Some(frequency) = patch.frequency {
        out.frequency = frequency;
    }
    if let Some(start) = patch.start_date {
        out.start_date = start;
    }
    if let Some(active) = patch.active {
        out.active = active;
    }
    Ok(out)
}

pub fn delete(conn: &Connection, id: i64) -> Result<(), RecurringError> {
    let n = conn.execute("DELETE FROM recurring WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(RecurringError::NotFound(id));
    }
    tracing::info!(id, "deleted recurring definition");
    Ok(())
}
