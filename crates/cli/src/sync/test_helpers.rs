// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync module tests.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use stock_core::{Database, Product, ProductDraft};

use super::connectivity::NetworkMonitor;
use super::manager::SyncManager;
use super::remote_tests::MockRemote;

/// A server-side product with the given id.
pub fn product(id: i64, name: &str, price: f64) -> Product {
    Product::with_id(id, ProductDraft::new(name, price))
}

/// A manager over an in-memory store and a clone of `remote`.
pub fn manager(
    remote: &MockRemote,
    online: bool,
) -> (SyncManager<MockRemote>, Arc<NetworkMonitor>) {
    let monitor = Arc::new(NetworkMonitor::new(online));
    let db = Database::open_in_memory().unwrap();
    let manager = SyncManager::new(db, remote.clone(), monitor.clone());
    (manager, monitor)
}
