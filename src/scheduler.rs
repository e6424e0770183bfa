// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Periodic driver for the catch-up engine.
//!
//! Every tick opens a fresh connection and calls [`engine::process_due`] for
//! the current local date. The first tick fires immediately so definitions
//! missed while the process was down are caught up at startup. Nothing is
//! carried between ticks.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::time::{self, MissedTickBehavior};

use crate::engine::{self, CatchUpReport};
use crate::{db, utils};

/// Run one catch-up pass against the database at `path`.
pub fn run_once(path: &std::path::Path) -> Result<CatchUpReport> {
    let mut conn = db::open_at(path)?;
    let report = engine::process_due(&mut conn, utils::today())?;
    Ok(report)
}

/// Period for a `minutes` setting, clamped to `1..=MAX_INTERVAL_MINUTES`.
pub fn tick_interval(minutes: u64) -> Duration {
    let minutes = minutes.clamp(1, utils::MAX_INTERVAL_MINUTES);
    Duration::from_secs(minutes.saturating_mul(60))
}

/// Tick every `every` until Ctrl+C or SIGTERM.
pub async fn watch(path: PathBuf, every: Duration) -> Result<()> {
    let mut ticker = time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    tracing::info!(db = %path.display(), every_secs = every.as_secs(), "scheduler started");
    loop {
        tokio::select! {
            _ = ticker.tick() => tick(path.clone()).await,
            _ = &mut shutdown => {
                tracing::info!("scheduler stopping");
                break;
            }
        }
    }
    Ok(())
}

async fn tick(path: PathBuf) {
    let outcome = tokio::task::spawn_blocking(move || run_once(&path))
        .await
        .context("catch-up task panicked");
    match outcome {
        Ok(Ok(report)) => {
            if report.created > 0 {
                tracing::info!(created = report.created, "scheduler materialized recurring entries");
            }
            for failure in &report.failures {
                tracing::warn!(id = failure.id, attempted = ?failure.attempted, reason = %failure.reason, "recurring definition needs attention");
            }
        }
        // Retried on the next tick.
        Ok(Err(e)) | Err(e) => tracing::error!("scheduler run failed: {:#}", e),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::debug!("received Ctrl+C"),
        _ = terminate => tracing::debug!("received terminate signal"),
    }
}
