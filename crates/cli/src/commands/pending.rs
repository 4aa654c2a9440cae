// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use serde::Serialize;
use stock_core::{Database, PendingOperation, Product};

use crate::cli::OutputFormat;
use crate::display::format_operation;
use crate::error::Result;

use super::open_db;

#[derive(Serialize)]
struct OperationJson<'a> {
    id: i64,
    #[serde(rename = "type")]
    op_type: &'static str,
    product_id: i64,
    product: &'a Product,
    queued_at: DateTime<Utc>,
}

impl<'a> From<&'a PendingOperation> for OperationJson<'a> {
    fn from(op: &'a PendingOperation) -> Self {
        OperationJson {
            id: op.id,
            op_type: op.op_type.as_str(),
            product_id: op.product_id(),
            product: &op.product,
            queued_at: op.queued_at,
        }
    }
}

pub fn run(output: OutputFormat) -> Result<()> {
    let (db, _, _) = open_db()?;
    let ops = run_impl(&db)?;

    match output {
        OutputFormat::Text => {
            if ops.is_empty() {
                println!("No pending operations.");
            }
            for op in &ops {
                println!("{}", format_operation(op));
            }
        }
        OutputFormat::Json => println!("{}", to_json(&ops)?),
    }
    Ok(())
}

/// Internal implementation that accepts db for testing.
pub(crate) fn run_impl(db: &Database) -> Result<Vec<PendingOperation>> {
    Ok(db.list_operations()?)
}

pub(crate) fn to_json(ops: &[PendingOperation]) -> Result<String> {
    let rows: Vec<OperationJson<'_>> = ops.iter().map(OperationJson::from).collect();
    Ok(serde_json::to_string_pretty(&rows)?)
}

#[cfg(test)]
#[path = "pending_tests.rs"]
mod tests;
