// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::sync::{RemoteError, SyncError};

/// All possible errors that can occur in the stock CLI.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not initialized: run 'stock init' first")]
    NotInitialized,

    #[error("already initialized at {0}")]
    AlreadyInitialized(String),

    #[error("product not found: {0}")]
    ProductNotFound(i64),

    #[error("{field} {reason}")]
    Validation {
        field: &'static str,
        reason: &'static str,
    },

    #[error("invalid API url '{0}'\n  hint: use an http:// or https:// URL with a host")]
    InvalidApiUrl(String),

    #[error("nothing to change\n  hint: pass at least one of --name, --price, --description, --barcode, --image")]
    NothingToEdit,

    #[error("cannot read image {path}: {source}")]
    ImageRead {
        path: String,
        source: std::io::Error,
    },

    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("corrupted data in database: {0}")]
    CorruptedData(String),
}

/// A specialized Result type for stock CLI operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<stock_core::Error> for Error {
    fn from(e: stock_core::Error) -> Self {
        match e {
            stock_core::Error::ProductNotFound(id) => Error::ProductNotFound(id),
            stock_core::Error::Validation { field, reason } => Error::Validation { field, reason },
            stock_core::Error::InvalidOpType(s) => {
                Error::CorruptedData(format!("invalid operation type: {}", s))
            }
            stock_core::Error::Database(e) => Error::Database(e),
            stock_core::Error::Io(e) => Error::Io(e),
            stock_core::Error::CorruptedData(s) => Error::CorruptedData(s),
        }
    }
}

impl From<SyncError> for Error {
    fn from(e: SyncError) -> Self {
        match e {
            SyncError::Local(e) => e.into(),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
