// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Catch-up of recurring definitions into ledger entries.
//!
//! [`process_due`] is the single entry point for both the periodic timer and
//! on-demand runs. Each call is one `BEGIN IMMEDIATE` transaction: SQLite
//! grants one writer at a time, so an overlapping call waits and then sees
//! the due dates the first call already advanced.
//!
//! A definition that cannot be decoded or scheduled is skipped and reported
//! in [`CatchUpReport::failures`]; its row is left untouched and the other
//! definitions still commit. Rows with an unparseable due date are selected
//! on every run so they keep showing up there until fixed. A storage error aborts the run and rolls back
//! every insert and advance made so far.

use chrono::NaiveDate;
use rusqlite::{Connection, TransactionBehavior};
use serde::Serialize;
use thiserror::Error;

use crate::ledger;
use crate::models::NewLedgerEntry;
use crate::recurring::{self, RawRecurring};
use crate::schedule::{self, DuePlan};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("catch-up run for {as_of} failed, nothing was committed: {source}")]
    Storage {
        as_of: NaiveDate,
        #[source]
        source: rusqlite::Error,
    },
}

/// A definition that was skipped during a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefinitionFailure {
    pub id: i64,
    /// Due date the run was attempting, when it could be read.
    pub attempted: Option<NaiveDate>,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatchUpReport {
    pub as_of: NaiveDate,
    /// Ledger entries created.
    pub created: usize,
    /// Definitions whose due date moved forward.
    pub advanced: usize,
    pub failures: Vec<DefinitionFailure>,
}

impl CatchUpReport {
    fn new(as_of: NaiveDate) -> Self {
        Self {
            as_of,
            created: 0,
            advanced: 0,
            failures: Vec::new(),
        }
    }
}

enum Outcome {
    Done(usize),
    Skipped(DefinitionFailure),
}

/// Materialize every ledger entry owed up to and including `as_of`.
pub fn process_due(conn: &mut Connection, as_of: NaiveDate) -> Result<CatchUpReport, EngineError> {
    let storage = |source: rusqlite::Error| EngineError::Storage { as_of, source };

    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(storage)?;
    let due = recurring::due(&tx, as_of).map_err(storage)?;
    tracing::debug!(%as_of, due = due.len(), "selected due recurring definitions");

    let mut report = CatchUpReport::new(as_of);
    for raw in &due {
        match catch_up(&tx, raw, as_of).map_err(storage)? {
            Outcome::Done(0) => {}
            Outcome::Done(n) => {
                report.created += n;
                report.advanced += 1;
            }
            Outcome::Skipped(failure) => {
                tracing::warn!(
                    id = failure.id,
                    attempted = ?failure.attempted,
                    reason = %failure.reason,
                    "skipping recurring definition"
                );
                report.failures.push(failure);
            }
        }
    }

    if report.created == 0 {
        tx.rollback().map_err(storage)?;
    } else {
        tx.commit().map_err(storage)?;
    }
    if report.created > 0 || !report.failures.is_empty() {
        tracing::info!(
            %as_of,
            created = report.created,
            advanced = report.advanced,
            skipped = report.failures.len(),
            "processed recurring definitions"
        );
    }
    Ok(report)
}

fn catch_up(conn: &Connection, raw: &RawRecurring, as_of: NaiveDate) -> rusqlite::Result<Outcome> {
    let skipped = |reason: String| {
        Outcome::Skipped(DefinitionFailure {
            id: raw.id,
            attempted: raw.attempted_date(),
            reason,
        })
    };

    let def = match raw.decode() {
        Ok(def) => def,
        Err(e) => return Ok(skipped(e.to_string())),
    };
    // Plan before writing so a schedule error leaves this definition untouched.
    let DuePlan { dates, next_due } =
        match schedule::due_dates(def.next_due_date, def.frequency, as_of) {
            Ok(plan) => plan,
            Err(e) => return Ok(skipped(e.to_string())),
        };
    if dates.is_empty() {
        return Ok(Outcome::Done(0));
    }

    for date in &dates {
        let entry_id = ledger::insert(conn, &NewLedgerEntry::from_recurring(&def, *date))?;
        tracing::debug!(recurring_id = def.id, entry_id, %date, "materialized recurring entry");
    }
    recurring::set_next_due(conn, def.id, next_due)?;
    Ok(Outcome::Done(dates.len()))
}
