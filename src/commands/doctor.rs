// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::recurring;
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;

/// Problems with stored recurring definitions, as `(issue, detail)` pairs.
pub fn issues(conn: &Connection) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();
    for raw in recurring::list_raw(conn)? {
        match raw.decode() {
            Err(e) => rows.push(vec!["malformed_recurring".into(), e.to_string()]),
            Ok(def) => {
                if def.next_due_date < def.start_date {
                    rows.push(vec![
                        "due_before_start".into(),
                        format!(
                            "recurring {} due {} before start {}",
                            def.id, def.next_due_date, def.start_date
                        ),
                    ]);
                }
            }
        }
    }
    Ok(rows)
}

pub fn handle(conn: &Connection) -> Result<()> {
    let rows = issues(conn)?;
    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
