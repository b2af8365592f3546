// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Coarse failure classes callers can branch on without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    EnvironmentUnsupported,
    Storage,
    RatesUnavailable,
    InvalidRates,
    Fetch,
    Overflow,
}

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Storage not supported in this environment: {0}")]
    Unsupported(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Storage worker failed: {0}")]
    Task(String),

    #[error("Exchange rates unavailable: {0}")]
    RatesUnavailable(String),

    #[error("Invalid rates: {0}")]
    InvalidRates(String),

    #[error("Rates fetch failed: {0}")]
    Fetch(String),

    #[error("Amount out of range: {0}")]
    Overflow(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unsupported(_) => ErrorKind::EnvironmentUnsupported,
            Self::Storage(_) | Self::Task(_) | Self::Json(_) | Self::Io(_) => ErrorKind::Storage,
            Self::RatesUnavailable(_) => ErrorKind::RatesUnavailable,
            Self::InvalidRates(_) => ErrorKind::InvalidRates,
            Self::Fetch(_) | Self::Http(_) => ErrorKind::Fetch,
            Self::Overflow(_) => ErrorKind::Overflow,
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
