// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! stock-core: Shared library for the stock inventory client
//!
//! This crate provides the product data model, the pending-operation types
//! and the SQLite local store used by the `stock` CLI and its sync engine.

pub mod db;
pub mod error;
pub mod op;
pub mod product;

pub use db::Database;
pub use error::{Error, Result};
pub use op::{OpType, PendingOperation};
pub use product::{
    is_temp_id, paginate, sort_products, temp_id, Image, Page, Product, ProductDraft, SortKey,
};
