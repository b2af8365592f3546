// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod fx;
pub mod ledger;
pub mod models;
pub mod rates;
pub mod repo;
pub mod report;
pub mod settings;
pub mod utils;

pub use error::{ErrorKind, LedgerError, Result};
pub use ledger::Ledger;
