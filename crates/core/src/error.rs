// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for stock-core operations.

use thiserror::Error;

/// All possible errors that can occur in stock-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("product not found: {0}")]
    ProductNotFound(i64),

    #[error("{field} {reason}")]
    Validation {
        field: &'static str,
        reason: &'static str,
    },

    #[error("invalid operation type: '{0}'\n  hint: valid types are: add, update, delete")]
    InvalidOpType(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

/// A specialized Result type for stock-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
