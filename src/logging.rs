// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_ENV: &str = "PENNYWISE_LOG";

/// Install the global subscriber. Logs go to stderr so tables and JSON on stdout stay clean.
///
/// `verbose` raises the default level to `debug`; `PENNYWISE_LOG` overrides both.
pub fn init(verbose: bool) {
    let default = if verbose { "pennywise=debug" } else { "pennywise=info" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}
