// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::{Arc, Barrier};
use std::thread;

use chrono::{Days, NaiveDate};
use pennywise::engine::{EngineError, process_due};
use pennywise::models::{Frequency, Kind, NewRecurring};
use pennywise::{db, ledger, recurring};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use tempfile::tempdir;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn
}

fn add(conn: &Connection, name: &str, frequency: Frequency, start: NaiveDate, active: bool) -> i64 {
    recurring::create(
        conn,
        &NewRecurring {
            name: name.to_string(),
            amount: Decimal::from(1500),
            category: "Housing".to_string(),
            kind: Kind::Expense,
            frequency,
            start_date: start,
            active,
        },
    )
    .unwrap()
    .id
}

fn ledger_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM ledger", [], |r| r.get(0))
        .unwrap()
}

fn next_due(conn: &Connection, id: i64) -> String {
    conn.query_row(
        "SELECT next_due_date FROM recurring WHERE id=?1",
        params![id],
        |r| r.get(0),
    )
    .unwrap()
}

#[test]
fn rent_is_caught_up_for_every_missed_month() {
    let mut conn = setup();
    let id = add(&conn, "Rent", Frequency::Monthly, d(2024, 1, 15), true);

    let report = process_due(&mut conn, d(2024, 4, 20)).unwrap();
    assert_eq!(report.created, 4);
    assert_eq!(report.advanced, 1);
    assert!(report.failures.is_empty());

    let entries = ledger::all(&conn).unwrap();
    let dates: Vec<NaiveDate> = entries.iter().map(|e| e.date).collect();
    assert_eq!(
        dates,
        vec![d(2024, 1, 15), d(2024, 2, 15), d(2024, 3, 15), d(2024, 4, 15)]
    );
    for e in &entries {
        assert_eq!(e.amount, Decimal::from(1500));
        assert_eq!(e.kind, Kind::Expense);
        assert_eq!(e.category, "Housing");
        assert_eq!(e.note.as_deref(), Some("Auto-generated: Rent"));
        assert_eq!(e.recurring_id, Some(id));
    }
    assert_eq!(recurring::get(&conn, id).unwrap().next_due_date, d(2024, 5, 15));
}

#[test]
fn daily_definition_creates_one_entry_per_elapsed_day() {
    let mut conn = setup();
    let start = d(2024, 2, 26);
    let id = add(&conn, "Coffee", Frequency::Daily, start, true);

    let as_of = start.checked_add_days(Days::new(5)).unwrap();
    let report = process_due(&mut conn, as_of).unwrap();
    assert_eq!(report.created, 6);

    let dates: Vec<NaiveDate> = ledger::all(&conn).unwrap().iter().map(|e| e.date).collect();
    let expected: Vec<NaiveDate> = (0..=5)
        .map(|i| start.checked_add_days(Days::new(i)).unwrap())
        .collect();
    assert_eq!(dates, expected);
    assert_eq!(
        recurring::get(&conn, id).unwrap().next_due_date,
        start.checked_add_days(Days::new(6)).unwrap()
    );
}

#[test]
fn second_run_with_same_date_creates_nothing() {
    let mut conn = setup();
    add(&conn, "Rent", Frequency::Monthly, d(2024, 1, 15), true);
    add(&conn, "Gym", Frequency::Weekly, d(2024, 3, 1), true);

    let first = process_due(&mut conn, d(2024, 3, 20)).unwrap();
    assert!(first.created > 0);
    let after_first = ledger_count(&conn);

    let second = process_due(&mut conn, d(2024, 3, 20)).unwrap();
    assert_eq!(second.created, 0);
    assert_eq!(second.advanced, 0);
    assert_eq!(ledger_count(&conn), after_first);
}

#[test]
fn not_yet_due_definition_is_left_alone() {
    let mut conn = setup();
    let id = add(&conn, "Insurance", Frequency::Yearly, d(2024, 6, 1), true);

    let report = process_due(&mut conn, d(2024, 5, 31)).unwrap();
    assert_eq!(report.created, 0);
    assert_eq!(ledger_count(&conn), 0);
    assert_eq!(next_due(&conn, id), "2024-06-01");
}

#[test]
fn paused_definition_never_generates_entries() {
    let mut conn = setup();
    let id = add(&conn, "Netflix", Frequency::Monthly, d(2023, 1, 1), false);

    for _ in 0..3 {
        let report = process_due(&mut conn, d(2024, 12, 31)).unwrap();
        assert_eq!(report.created, 0);
    }
    assert_eq!(ledger_count(&conn), 0);
    assert_eq!(next_due(&conn, id), "2023-01-01");
}

#[test]
fn deleted_definition_generates_nothing() {
    let mut conn = setup();
    let id = add(&conn, "Rent", Frequency::Monthly, d(2024, 1, 15), true);
    recurring::delete(&conn, id).unwrap();

    let report = process_due(&mut conn, d(2024, 12, 31)).unwrap();
    assert_eq!(report.created, 0);
    assert_eq!(ledger_count(&conn), 0);
}

#[test]
fn month_end_schedule_clamps_and_keeps_walking_from_clamped_date() {
    let mut conn = setup();
    let id = add(&conn, "Card bill", Frequency::Monthly, d(2024, 1, 31), true);

    process_due(&mut conn, d(2024, 4, 30)).unwrap();
    let dates: Vec<NaiveDate> = ledger::all(&conn).unwrap().iter().map(|e| e.date).collect();
    assert_eq!(
        dates,
        vec![d(2024, 1, 31), d(2024, 2, 29), d(2024, 3, 29), d(2024, 4, 29)]
    );
    assert_eq!(recurring::get(&conn, id).unwrap().next_due_date, d(2024, 5, 29));
}

#[test]
fn unknown_frequency_skips_only_that_definition() {
    let mut conn = setup();
    let good = add(&conn, "Rent", Frequency::Monthly, d(2024, 1, 15), true);
    conn.execute(
        "INSERT INTO recurring(name, amount, category, kind, frequency, start_date, next_due_date, active)
         VALUES ('Legacy', '20', 'Misc', 'Expense', 'Fortnightly', '2024-01-01', '2024-01-01', 1)",
        [],
    )
    .unwrap();
    let bad = conn.last_insert_rowid();

    let report = process_due(&mut conn, d(2024, 2, 20)).unwrap();
    assert_eq!(report.created, 2);
    assert_eq!(report.advanced, 1);
    assert_eq!(report.failures.len(), 1);
    let failure = &report.failures[0];
    assert_eq!(failure.id, bad);
    assert_eq!(failure.attempted, Some(d(2024, 1, 1)));
    assert!(failure.reason.contains("Fortnightly"));

    assert_eq!(next_due(&conn, bad), "2024-01-01");
    assert_eq!(next_due(&conn, good), "2024-03-15");
    let bad_entries: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM ledger WHERE recurring_id=?1",
            params![bad],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(bad_entries, 0);
}

#[test]
fn malformed_due_date_is_reported_without_a_date() {
    let mut conn = setup();
    conn.execute(
        "INSERT INTO recurring(name, amount, category, kind, frequency, start_date, next_due_date, active)
         VALUES ('Broken', '5', 'Misc', 'Income', 'Daily', '2024-01-01', '2024-01-0x', 1)",
        [],
    )
    .unwrap();

    let report = process_due(&mut conn, d(2024, 2, 1)).unwrap();
    assert_eq!(report.created, 0);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].attempted, None);
    assert_eq!(ledger_count(&conn), 0);
}

#[test]
fn unpadded_due_date_is_still_reported() {
    let mut conn = setup();
    conn.execute(
        "INSERT INTO recurring(name, amount, category, kind, frequency, start_date, next_due_date, active)
         VALUES ('Sloppy', '5', 'Misc', 'Income', 'Daily', '2024-01-01', '2024-1-5', 1)",
        [],
    )
    .unwrap();
    let id = conn.last_insert_rowid();

    for _ in 0..2 {
        let report = process_due(&mut conn, d(2024, 2, 1)).unwrap();
        assert_eq!(report.created, 0);
        assert_eq!(report.advanced, 0);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].id, id);
        assert_eq!(report.failures[0].attempted, None);
    }
    assert_eq!(next_due(&conn, id), "2024-1-5");
}

#[test]
fn negative_amount_definition_is_skipped() {
    let mut conn = setup();
    let good = add(&conn, "Rent", Frequency::Monthly, d(2024, 1, 15), true);
    conn.execute(
        "INSERT INTO recurring(name, amount, category, kind, frequency, start_date, next_due_date, active)
         VALUES ('Refund', '-50', 'Misc', 'Expense', 'Monthly', '2024-01-01', '2024-01-01', 1)",
        [],
    )
    .unwrap();
    let bad = conn.last_insert_rowid();

    let report = process_due(&mut conn, d(2024, 3, 1)).unwrap();
    assert_eq!(report.created, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].id, bad);
    assert_eq!(report.failures[0].attempted, Some(d(2024, 1, 1)));
    assert!(report.failures[0].reason.contains("negative"));

    let negative: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM ledger WHERE amount LIKE '-%'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(negative, 0);
    assert_eq!(next_due(&conn, bad), "2024-01-01");
    assert_eq!(next_due(&conn, good), "2024-03-15");
}

#[test]
fn storage_failure_mid_run_rolls_everything_back() {
    let mut conn = setup();
    let rent = add(&conn, "Rent", Frequency::Monthly, d(2024, 1, 15), true);
    let coffee = add(&conn, "Coffee", Frequency::Daily, d(2024, 4, 1), true);
    conn.execute_batch(
        "CREATE TRIGGER fail_third_insert BEFORE INSERT ON ledger
         WHEN (SELECT COUNT(*) FROM ledger) >= 2
         BEGIN SELECT RAISE(ABORT, 'simulated disk failure'); END;",
    )
    .unwrap();

    let err = process_due(&mut conn, d(2024, 4, 5)).unwrap_err();
    let EngineError::Storage { as_of, .. } = err;
    assert_eq!(as_of, d(2024, 4, 5));

    assert_eq!(ledger_count(&conn), 0);
    assert_eq!(next_due(&conn, rent), "2024-01-15");
    assert_eq!(next_due(&conn, coffee), "2024-04-01");

    // Retrying once storage recovers produces the full set.
    conn.execute_batch("DROP TRIGGER fail_third_insert;").unwrap();
    let report = process_due(&mut conn, d(2024, 4, 5)).unwrap();
    // Rent for Jan..Mar 15 plus Coffee for Apr 1..5.
    assert_eq!(report.created, 3 + 5);
    assert_eq!(ledger_count(&conn), 8);
}

#[test]
fn concurrent_runs_do_not_duplicate_entries() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("pennywise.sqlite");
    {
        let conn = db::open_at(&path).unwrap();
        add(&conn, "Coffee", Frequency::Daily, d(2024, 1, 1), true);
        add(&conn, "Rent", Frequency::Monthly, d(2024, 1, 15), true);
    }
    let as_of = d(2024, 1, 31);

    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = (0..2)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            let path = path.clone();
            thread::spawn(move || {
                let mut conn = db::open_at(&path).unwrap();
                barrier.wait();
                process_due(&mut conn, as_of).unwrap().created
            })
        })
        .collect();
    let total: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

    // 31 daily entries plus one monthly, exactly as a single run would produce.
    assert_eq!(total, 32);
    let conn = db::open_at(&path).unwrap();
    assert_eq!(ledger_count(&conn), 32);
    let dupes: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM (SELECT recurring_id, date FROM ledger GROUP BY recurring_id, date HAVING COUNT(*) > 1)",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(dupes, 0);
}
