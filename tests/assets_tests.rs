// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use pennywise::models::AssetKind;
use pennywise::{assets, cli, commands, db};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn
}

fn run(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["pennywise", "asset"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("asset", sub)) = matches.subcommand() {
        commands::assets::handle(conn, sub)
    } else {
        panic!("no asset subcommand");
    }
}

fn add(conn: &Connection, date: &str, kind: &str, name: &str, amount: &str) -> anyhow::Result<()> {
    run(
        conn,
        &[
            "add", "--date", date, "--kind", kind, "--name", name, "--amount", amount,
        ],
    )
}

#[test]
fn add_parses_kind_spellings() {
    let conn = setup();
    add(&conn, "2025-01-01", "cash", "Checking", "100").unwrap();
    add(&conn, "2025-01-01", "credit-card-debt", "Amex", "40").unwrap();
    add(&conn, "2025-01-02", "Debt", "Visa", "10").unwrap();
    add(&conn, "2025-01-03", " Investment ", " Index Fund ", " 250.75 ").unwrap();

    let snaps = assets::list(&conn).unwrap();
    let kinds: Vec<AssetKind> = snaps.iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        vec![
            AssetKind::Investment,
            AssetKind::CreditCardDebt,
            AssetKind::CreditCardDebt,
            AssetKind::Cash,
        ]
    );
    assert_eq!(snaps[0].name, "Index Fund");
    assert_eq!(snaps[0].amount, Decimal::new(25075, 2));
    assert_eq!(snaps[0].date, NaiveDate::from_ymd_opt(2025, 1, 3).unwrap());

    let stored: String = conn
        .query_row("SELECT kind FROM assets WHERE name='Amex'", [], |r| r.get(0))
        .unwrap();
    assert_eq!(stored, "Credit Card Debt");
}

#[test]
fn add_rejects_bad_input() {
    let conn = setup();
    assert!(
        run(
            &conn,
            &[
                "add", "--date", "2025-01-01", "--kind", "cash", "--name", "Checking",
                "--amount=-1",
            ],
        )
        .is_err()
    );
    assert!(add(&conn, "2025-01-01", "crypto", "Wallet", "1").is_err());
    assert!(add(&conn, "01/01/2025", "cash", "Checking", "1").is_err());
    assert!(assets::list(&conn).unwrap().is_empty());
}

#[test]
fn latest_keeps_newest_snapshot_per_asset() {
    let conn = setup();
    add(&conn, "2025-01-01", "cash", "Checking", "100").unwrap();
    add(&conn, "2025-03-01", "cash", "Checking", "300").unwrap();
    add(&conn, "2025-02-01", "cash", "Checking", "200").unwrap();
    add(&conn, "2025-02-01", "property", "House", "1000").unwrap();
    add(&conn, "2025-02-01", "property", "House", "1100").unwrap();

    let latest = assets::latest(&conn).unwrap();
    let got: Vec<(String, Decimal)> = latest.iter().map(|s| (s.name.clone(), s.amount)).collect();
    assert_eq!(
        got,
        vec![
            ("Checking".to_string(), Decimal::from(300)),
            ("House".to_string(), Decimal::from(1100)),
        ]
    );

    run(&conn, &["latest", "--json"]).unwrap();
    run(&conn, &["list"]).unwrap();
}
