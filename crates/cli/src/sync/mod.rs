// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline-first sync for the product catalog.
//!
//! Keeps the local store usable without a network and pushes queued changes
//! to the REST API once connectivity returns.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Manager    │────►│  RemoteApi  │────►│  REST API   │
//! │(SyncManager) │◄────│   (trait)   │◄────│   Server    │
//! └──────────────┘     └─────────────┘     └─────────────┘
//!    │        ▲
//!    ▼        │ events
//! ┌────────┐ ┌──────────────┐
//! │ Store  │ │ Connectivity │  (online/offline oracle)
//! │(SQLite)│ │   (trait)    │
//! └────────┘ └──────────────┘
//! ```
//!
//! # Features
//!
//! - Optimistic local writes with temporary negative ids
//! - Persistent FIFO queue of pending add/update/delete operations
//! - Drain on reconnect, then a full refresh from the server
//! - Configurable retry policy, unlimited by default
//! - Injectable remote and connectivity traits for testing

mod connectivity;
mod manager;
mod remote;

pub use connectivity::{Connectivity, ConnectivityEvent, NetworkMonitor};
pub use manager::{
    overlay_pending, Intent, Mutation, MutationStatus, RefreshCallback, RefreshOutcome,
    RetryPolicy, SyncError, SyncManager, SyncOutcome, SyncReport, SyncResult, SyncState,
};
pub use remote::{
    decode_body, form_fields, parse_base_url, Endpoint, FormValue, HttpRemote, RemoteApi, RemoteError,
    RemoteFuture, RemoteResult, PRODUCTS_PATH,
};

#[cfg(test)]
pub(crate) mod test_helpers;
