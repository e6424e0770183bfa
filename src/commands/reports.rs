// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;

use crate::models::{AssetKind, Kind};
use crate::utils::{fmt_money, maybe_print_json, parse_date, pretty_table};
use crate::{assets, ledger};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("networth", sub)) => {
            let nw = net_worth(conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &nw)? {
                let rows = vec![
                    vec!["Cash".into(), fmt_money(&nw.cash)],
                    vec!["Investment".into(), fmt_money(&nw.investment)],
                    vec!["Property".into(), fmt_money(&nw.property)],
                    vec!["Credit Card Debt".into(), fmt_money(&nw.debt)],
                    vec!["Net Worth".into(), fmt_money(&nw.net)],
                ];
                println!("{}", pretty_table(&["Bucket", "Value"], rows));
            }
        }
        Some(("cashflow", sub)) => {
            let from = sub.get_one::<String>("from").map(|s| parse_date(s)).transpose()?;
            let to = sub.get_one::<String>("to").map(|s| parse_date(s)).transpose()?;
            let points = cash_flow(conn, from, to)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &points)? {
                let rows = points
                    .iter()
                    .map(|p| vec![p.date.to_string(), fmt_money(&p.net), fmt_money(&p.balance)])
                    .collect();
                println!("{}", pretty_table(&["Date", "Net", "Cumulative"], rows));
            }
        }
        Some(("monthly", sub)) => {
            let months: usize = *sub.get_one::<usize>("months").unwrap_or(&12);
            let data = monthly(conn, months)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|r| {
                        vec![
                            r.month.clone(),
                            fmt_money(&r.income),
                            fmt_money(&r.expense),
                            fmt_money(&r.net),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Month", "Income", "Expense", "Net"], rows)
                );
            }
        }
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct NetWorth {
    pub cash: Decimal,
    pub investment: Decimal,
    pub property: Decimal,
    pub debt: Decimal,
    pub net: Decimal,
}

/// Totals over the latest snapshot of every asset; debt is subtracted.
pub fn net_worth(conn: &Connection) -> Result<NetWorth> {
    let mut nw = NetWorth::default();
    for snap in assets::latest(conn)? {
        match snap.kind {
            AssetKind::Cash => nw.cash += snap.amount,
            AssetKind::Investment => nw.investment += snap.amount,
            AssetKind::Property => nw.property += snap.amount,
            AssetKind::CreditCardDebt => nw.debt += snap.amount,
        }
    }
    nw.net = nw.cash + nw.investment + nw.property - nw.debt;
    Ok(nw)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CashFlowPoint {
    pub date: NaiveDate,
    pub net: Decimal,
    pub balance: Decimal,
}

/// Signed daily totals with a running balance, oldest first.
///
/// The balance starts at zero on the first day of the window.
pub fn cash_flow(
    conn: &Connection,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<Vec<CashFlowPoint>> {
    let mut by_day: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for e in ledger::range(conn, from, to)? {
        *by_day.entry(e.date).or_insert(Decimal::ZERO) += e.kind.signed(e.amount);
    }
    let mut balance = Decimal::ZERO;
    Ok(by_day
        .into_iter()
        .map(|(date, net)| {
            balance += net;
            CashFlowPoint { date, net, balance }
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthRow {
    pub month: String, // YYYY-MM
    pub income: Decimal,
    pub expense: Decimal,
    pub net: Decimal,
}

/// Income and expense per month for the latest `months` months with activity, newest first.
pub fn monthly(conn: &Connection, months: usize) -> Result<Vec<MonthRow>> {
    let mut map: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
    for e in ledger::all(conn)? {
        let entry = map
            .entry(e.date.format("%Y-%m").to_string())
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        match e.kind {
            Kind::Income => entry.0 += e.amount,
            Kind::Expense => entry.1 += e.amount,
        }
    }
    Ok(map
        .into_iter()
        .rev()
        .take(months)
        .map(|(month, (income, expense))| MonthRow {
            month,
            income,
            expense,
            net: income - expense,
        })
        .collect())
}
