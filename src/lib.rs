// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod assets;
pub mod cli;
pub mod commands;
pub mod db;
pub mod engine;
pub mod ledger;
pub mod logging;
pub mod models;
pub mod recurring;
pub mod schedule;
pub mod scheduler;
pub mod utils;
