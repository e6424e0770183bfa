// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::recurring::ReschedulePolicy;
use crate::utils::{
    RESCHEDULE_POLICY_KEY, SCHEDULER_INTERVAL_KEY, get_reschedule_policy,
    get_scheduler_interval, pretty_table, set_reschedule_policy, set_scheduler_interval,
};
use anyhow::{Context, Result, anyhow};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", _)) => {
            let rows = vec![
                vec![
                    RESCHEDULE_POLICY_KEY.to_string(),
                    get_reschedule_policy(conn)?.to_string(),
                ],
                vec![
                    SCHEDULER_INTERVAL_KEY.to_string(),
                    get_scheduler_interval(conn)?.to_string(),
                ],
            ];
            println!("{}", pretty_table(&["Setting", "Value"], rows));
        }
        Some(("set", sub)) => {
            let key = sub.get_one::<String>("key").unwrap().trim();
            let value = sub.get_one::<String>("value").unwrap().trim();
            match key {
                RESCHEDULE_POLICY_KEY => {
                    let policy = value.parse::<ReschedulePolicy>().map_err(|e| anyhow!(e))?;
                    set_reschedule_policy(conn, policy)?;
                }
                SCHEDULER_INTERVAL_KEY => {
                    let minutes = value
                        .parse::<u64>()
                        .with_context(|| format!("Invalid minutes '{}'", value))?;
                    set_scheduler_interval(conn, minutes)?;
                }
                other => return Err(anyhow!("Unknown setting '{}'", other)),
            }
            println!("Set {} = {}", key, value);
        }
        _ => {}
    }
    Ok(())
}
