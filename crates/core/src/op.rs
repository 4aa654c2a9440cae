// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Pending operations queued while the server could not be reached.
//!
//! Each op records what the user did (`add`, `update` or `delete`) and the
//! product as it was at that moment. Ops are replayed oldest first and are
//! removed only once the server accepted them; they are never edited in place.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::product::Product;

/// Kind of mutation waiting to be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpType {
    Add,
    Update,
    Delete,
}

impl OpType {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            OpType::Add => "add",
            OpType::Update => "update",
            OpType::Delete => "delete",
        }
    }
}

impl fmt::Display for OpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OpType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "add" => Ok(OpType::Add),
            "update" => Ok(OpType::Update),
            "delete" => Ok(OpType::Delete),
            _ => Err(Error::InvalidOpType(s.to_string())),
        }
    }
}

/// A queued mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingOperation {
    /// Sequence number; queue order key.
    pub id: i64,
    pub op_type: OpType,
    /// Product at enqueue time. For deletes only `product.id` matters.
    pub product: Product,
    pub queued_at: DateTime<Utc>,
}

impl PendingOperation {
    /// Id of the product this op targets.
    pub fn product_id(&self) -> i64 {
        self.product.id
    }
}

#[cfg(test)]
#[path = "op_tests.rs"]
mod tests;
