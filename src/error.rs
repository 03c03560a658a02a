// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Error types for the ledger repositories and currency lookups.
//!
//! Engine computations never fail; only the seams around them do.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Data directory error: {0}")]
    DataDir(String),
}

pub type Result<T> = std::result::Result<T, Error>;
