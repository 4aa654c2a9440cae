// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync manager: optimistic mutations, queue replay and refresh.
//!
//! Every mutation is written to the local store first. When the oracle says
//! online the matching remote call is attempted right away; if that is not
//! possible or fails, a pending operation is queued instead. A sync cycle then
//! drains the queue oldest first and replaces the local product table with the
//! server's list.
//!
//! ```text
//! IDLE ──(reconnect / manual)──► DRAINING ──► REFRESHING ──► IDLE
//! ```
//!
//! Only one cycle runs at a time. A trigger that arrives while a cycle is in
//! progress is dropped; ops it would have covered stay queued for the next one.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use chrono::Utc;
use stock_core::{is_temp_id, Database, OpType, PendingOperation, Product, ProductDraft};
use tokio::sync::broadcast::{self, error::RecvError};

use super::connectivity::{Connectivity, ConnectivityEvent};
use super::remote::{RemoteApi, RemoteError};

/// Error type for sync manager operations.
///
/// Remote failures never show up here; they degrade to queued operations.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Validation or local store failure.
    #[error(transparent)]
    Local(#[from] stock_core::Error),
}

/// Result type for sync manager operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Called with the complete product list after every refresh.
pub type RefreshCallback = Box<dyn Fn(&[Product]) + Send + Sync>;

/// Phase of the current sync cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Draining,
    Refreshing,
}

/// When queued operations may be retried.
///
/// The default never gives up and never waits, so an op the server keeps
/// rejecting is retried on every cycle. Ops held back by the policy stay
/// queued; nothing is dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Stop attempting an op after this many failures in this process.
    pub max_attempts: Option<u32>,
    /// Minimum time between two attempts of the same op.
    pub min_interval: Duration,
}

/// What happened to the refresh step of a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Local products replaced by this many rows.
    Refreshed(usize),
    SkippedOffline,
    /// The list call failed; the local table was left untouched.
    Failed,
}

/// Counters for one sync cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Ops left alone this pass (retry policy, or waiting on an unsynced add).
    pub deferred: usize,
    pub refresh: RefreshOutcome,
}

impl SyncReport {
    fn new() -> Self {
        SyncReport {
            attempted: 0,
            succeeded: 0,
            failed: 0,
            deferred: 0,
            refresh: RefreshOutcome::SkippedOffline,
        }
    }
}

/// Result of a call to [`SyncManager::sync`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Completed(SyncReport),
    /// Another cycle was already running.
    Skipped,
    /// The oracle reported offline; nothing was attempted.
    Offline,
}

/// A user-initiated change.
#[derive(Debug, Clone)]
pub enum Intent {
    /// Create (`existing_id` is `None`) or edit a product.
    Save {
        draft: ProductDraft,
        existing_id: Option<i64>,
    },
    Delete { id: i64 },
}

/// How far a mutation got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationStatus {
    /// The server accepted it.
    Synced,
    /// Written locally and queued for the next sync.
    Queued,
    /// Only local state changed and nothing needs to reach the server.
    LocalOnly,
}

/// Result of [`SyncManager::mutate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Mutation {
    /// The product as now stored locally (the removed row for deletes).
    pub product: Product,
    pub status: MutationStatus,
}

#[derive(Debug, Clone, Copy)]
struct Attempts {
    failures: u32,
    last: Instant,
}

/// Failure while replaying a single op.
enum ReplayError {
    Remote(RemoteError),
    Local(stock_core::Error),
}

impl From<RemoteError> for ReplayError {
    fn from(e: RemoteError) -> Self {
        ReplayError::Remote(e)
    }
}

impl From<stock_core::Error> for ReplayError {
    fn from(e: stock_core::Error) -> Self {
        ReplayError::Local(e)
    }
}

/// Marks a cycle as running; puts the state back to idle when dropped.
struct CycleGuard<'a> {
    state: &'a Mutex<SyncState>,
}

impl<'a> CycleGuard<'a> {
    fn begin(state: &'a Mutex<SyncState>) -> Option<Self> {
        let mut current = lock(state);
        if *current != SyncState::Idle {
            return None;
        }
        *current = SyncState::Draining;
        Some(CycleGuard { state })
    }

    fn advance(&self, next: SyncState) {
        *lock(self.state) = next;
    }
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        *lock(self.state) = SyncState::Idle;
    }
}

/// Lock a mutex, recovering the data if a previous holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A row for a delete whose product is no longer cached.
fn tombstone(id: i64) -> Product {
    Product::with_id(id, ProductDraft::new(String::new(), 0.0))
}

/// Apply still-queued ops on top of a fresh server list.
///
/// Pending adds and updates win over the server's copy, pending deletes hide
/// the server row, so a refresh never undoes an optimistic write that has not
/// reached the server yet. A queued delete also hides every add or update
/// queued for the same id.
pub fn overlay_pending(server: Vec<Product>, ops: &[PendingOperation]) -> Vec<Product> {
    let deleted: HashSet<i64> = ops
        .iter()
        .filter(|op| op.op_type == OpType::Delete)
        .map(PendingOperation::product_id)
        .collect();
    let mut by_id: BTreeMap<i64, Product> = server
        .into_iter()
        .filter(|p| !deleted.contains(&p.id))
        .map(|p| (p.id, p))
        .collect();
    for op in ops {
        let upsert = matches!(op.op_type, OpType::Add | OpType::Update);
        if upsert && !deleted.contains(&op.product_id()) {
            by_id.insert(op.product.id, op.product.clone());
        }
    }
    by_id.into_values().collect()
}

/// Offline-first sync engine over a local store and a remote API.
pub struct SyncManager<R: RemoteApi> {
    store: Mutex<Database>,
    remote: R,
    connectivity: Arc<dyn Connectivity>,
    state: Mutex<SyncState>,
    policy: RetryPolicy,
    attempts: Mutex<HashMap<i64, Attempts>>,
    on_refresh: Option<RefreshCallback>,
}

impl<R: RemoteApi> SyncManager<R> {
    pub fn new(store: Database, remote: R, connectivity: Arc<dyn Connectivity>) -> Self {
        SyncManager {
            store: Mutex::new(store),
            remote,
            connectivity,
            state: Mutex::new(SyncState::Idle),
            policy: RetryPolicy::default(),
            attempts: Mutex::new(HashMap::new()),
            on_refresh: None,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Register the callback invoked once per successful refresh.
    pub fn on_refresh(mut self, callback: RefreshCallback) -> Self {
        self.on_refresh = Some(callback);
        self
    }

    /// Exclusive access to the local store.
    ///
    /// Do not hold the guard across an `.await`.
    pub fn store(&self) -> MutexGuard<'_, Database> {
        lock(&self.store)
    }

    pub fn state(&self) -> SyncState {
        *lock(&self.state)
    }

    pub fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }

    /// Forget all retry bookkeeping so every queued op is eligible again.
    pub fn reset_retries(&self) {
        lock(&self.attempts).clear();
    }

    // ─────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────

    /// Create or edit a product. See [`SyncManager::mutate`].
    pub async fn save_product(
        &self,
        draft: ProductDraft,
        existing_id: Option<i64>,
    ) -> SyncResult<Mutation> {
        self.mutate(Intent::Save { draft, existing_id }).await
    }

    /// Delete a product. See [`SyncManager::mutate`].
    pub async fn delete_product(&self, id: i64) -> SyncResult<Mutation> {
        self.mutate(Intent::Delete { id }).await
    }

    /// Apply a user change locally, then push it or queue it.
    ///
    /// # Errors
    ///
    /// Only validation and local store failures are returned. Remote failures
    /// are logged and turn into queued operations.
    pub async fn mutate(&self, intent: Intent) -> SyncResult<Mutation> {
        match intent {
            Intent::Save {
                draft,
                existing_id: None,
            } => {
                let draft = draft.validate()?;
                self.save_new(draft, None).await
            }
            Intent::Save {
                draft,
                existing_id: Some(id),
            } if is_temp_id(id) => {
                let draft = draft.validate()?;
                self.store().require_product(id)?;
                self.save_new(draft, Some(id)).await
            }
            Intent::Save {
                draft,
                existing_id: Some(id),
            } => {
                let draft = draft.validate()?;
                self.save_existing(id, draft).await
            }
            Intent::Delete { id } => self.delete(id).await,
        }
    }

    /// Save a product the server has not seen, reusing `temp` when editing one.
    async fn save_new(&self, draft: ProductDraft, temp: Option<i64>) -> SyncResult<Mutation> {
        let local = {
            let store = self.store();
            let id = match temp {
                Some(id) => {
                    // The earlier add is superseded by this payload
                    store.remove_operations_for_product(id)?;
                    id
                }
                None => store.next_temp_id(Utc::now())?,
            };
            let product = Product::with_id(id, draft);
            store.put_product(&product)?;
            product
        };

        if self.is_online() {
            match self.remote.create(&local.to_draft()).await {
                Ok(saved) => {
                    let store = self.store();
                    store.delete_product(local.id)?;
                    store.put_product(&saved)?;
                    tracing::debug!(temp_id = local.id, id = saved.id, "product created");
                    return Ok(Mutation {
                        product: saved,
                        status: MutationStatus::Synced,
                    });
                }
                Err(e) => {
                    tracing::warn!(id = local.id, "create failed, queued for sync: {}", e);
                }
            }
        }

        self.store().enqueue_operation(OpType::Add, &local)?;
        Ok(Mutation {
            product: local,
            status: MutationStatus::Queued,
        })
    }

    async fn save_existing(&self, id: i64, draft: ProductDraft) -> SyncResult<Mutation> {
        let local = Product::with_id(id, draft);
        {
            let store = self.store();
            store.require_product(id)?;
            store.put_product(&local)?;
        }

        if self.is_online() {
            match self.remote.update(id, &local.to_draft()).await {
                Ok(returned) => {
                    let product = returned.unwrap_or_else(|| local.clone());
                    self.store().put_product(&product)?;
                    return Ok(Mutation {
                        product,
                        status: MutationStatus::Synced,
                    });
                }
                Err(e) => {
                    tracing::warn!(id, "update failed, queued for sync: {}", e);
                }
            }
        }

        self.store().enqueue_operation(OpType::Update, &local)?;
        Ok(Mutation {
            product: local,
            status: MutationStatus::Queued,
        })
    }

    async fn delete(&self, id: i64) -> SyncResult<Mutation> {
        let (removed, cancelled) = {
            let store = self.store();
            let existing = store.get_product(id)?;
            store.delete_product(id)?;
            // The delete supersedes every queued add or update for this id
            let cancelled = store.remove_operations_for_product(id)?;
            (existing.unwrap_or_else(|| tombstone(id)), cancelled)
        };

        if is_temp_id(id) {
            tracing::debug!(id, cancelled, "deleted local-only product");
            return Ok(Mutation {
                product: removed,
                status: MutationStatus::LocalOnly,
            });
        }

        if self.is_online() {
            match self.remote.delete(id).await {
                Ok(()) => {
                    return Ok(Mutation {
                        product: removed,
                        status: MutationStatus::Synced,
                    });
                }
                Err(e) => {
                    tracing::warn!(id, "delete failed, queued for sync: {}", e);
                }
            }
        }

        self.store().enqueue_operation(OpType::Delete, &removed)?;
        Ok(Mutation {
            product: removed,
            status: MutationStatus::Queued,
        })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Sync cycle
    // ─────────────────────────────────────────────────────────────────────

    /// Run one drain + refresh cycle.
    ///
    /// # Errors
    ///
    /// Returns an error only when the local store fails; the state still goes
    /// back to idle.
    pub async fn sync(&self) -> SyncResult<SyncOutcome> {
        let Some(cycle) = CycleGuard::begin(&self.state) else {
            tracing::debug!("sync already in progress, trigger dropped");
            return Ok(SyncOutcome::Skipped);
        };

        if !self.is_online() {
            tracing::debug!("offline, sync skipped");
            return Ok(SyncOutcome::Offline);
        }

        let mut report = SyncReport::new();
        self.drain(&mut report).await?;

        cycle.advance(SyncState::Refreshing);
        report.refresh = self.refresh().await?;

        tracing::info!(
            attempted = report.attempted,
            succeeded = report.succeeded,
            failed = report.failed,
            deferred = report.deferred,
            "sync finished"
        );
        Ok(SyncOutcome::Completed(report))
    }

    /// Replay a snapshot of the queue, oldest first.
    async fn drain(&self, report: &mut SyncReport) -> SyncResult<()> {
        let ops = self.store().list_operations()?;
        if !ops.is_empty() {
            tracing::info!("replaying {} queued operations", ops.len());
        }

        // Temp id → server id for adds that succeeded earlier in this pass
        let mut created: HashMap<i64, i64> = HashMap::new();

        for op in ops {
            if !self.retry_allowed(op.id) {
                tracing::debug!(op = op.id, "held back by retry policy");
                report.deferred += 1;
                continue;
            }

            let target = match op.op_type {
                OpType::Add => op.product_id(),
                _ if is_temp_id(op.product_id()) => match created.get(&op.product_id()) {
                    Some(&server_id) => server_id,
                    None => {
                        tracing::debug!(op = op.id, "waiting for its add to sync");
                        report.deferred += 1;
                        continue;
                    }
                },
                _ => op.product_id(),
            };

            report.attempted += 1;
            match self.replay(&op, target).await {
                Ok(Some(server_id)) => {
                    created.insert(op.product_id(), server_id);
                    self.record_success(op.id);
                    report.succeeded += 1;
                }
                Ok(None) => {
                    self.record_success(op.id);
                    report.succeeded += 1;
                }
                Err(ReplayError::Remote(e)) => {
                    tracing::warn!(
                        op = op.id,
                        kind = %op.op_type,
                        product = op.product_id(),
                        "replay failed, kept in queue: {}",
                        e
                    );
                    self.record_failure(op.id);
                    report.failed += 1;
                }
                Err(ReplayError::Local(e)) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Send one op to the server and reconcile the store.
    ///
    /// Returns the server id when an add created a product.
    async fn replay(&self, op: &PendingOperation, target: i64) -> Result<Option<i64>, ReplayError> {
        match op.op_type {
            OpType::Add => {
                let saved = self.remote.create(&op.product.to_draft()).await?;
                let store = self.store();
                store.delete_product(op.product_id())?;
                store.put_product(&saved)?;
                store.remove_operation(op.id)?;
                Ok(Some(saved.id))
            }
            OpType::Update => {
                let draft = op.product.to_draft();
                let returned = self.remote.update(target, &draft).await?;
                let product = returned.unwrap_or_else(|| Product::with_id(target, draft));
                let store = self.store();
                if target != op.product_id() {
                    store.delete_product(op.product_id())?;
                }
                store.put_product(&product)?;
                store.remove_operation(op.id)?;
                Ok(None)
            }
            OpType::Delete => {
                self.remote.delete(target).await?;
                self.store().remove_operation(op.id)?;
                Ok(None)
            }
        }
    }

    /// Replace local products with the server's list.
    async fn refresh(&self) -> SyncResult<RefreshOutcome> {
        if !self.is_online() {
            return Ok(RefreshOutcome::SkippedOffline);
        }

        let server = match self.remote.list().await {
            Ok(products) => products,
            Err(e) => {
                tracing::warn!("refresh failed, keeping local products: {}", e);
                return Ok(RefreshOutcome::Failed);
            }
        };

        let products = {
            let store = self.store();
            let pending = store.list_operations()?;
            let merged = overlay_pending(server, &pending);
            store.replace_products(&merged)?;
            merged
        };

        if let Some(callback) = &self.on_refresh {
            callback(&products);
        }
        Ok(RefreshOutcome::Refreshed(products.len()))
    }

    fn retry_allowed(&self, op_id: i64) -> bool {
        let attempts = lock(&self.attempts);
        let Some(entry) = attempts.get(&op_id) else {
            return true;
        };
        if self
            .policy
            .max_attempts
            .is_some_and(|max| entry.failures >= max)
        {
            return false;
        }
        entry.last.elapsed() >= self.policy.min_interval
    }

    fn record_failure(&self, op_id: i64) {
        let mut attempts = lock(&self.attempts);
        let entry = attempts.entry(op_id).or_insert(Attempts {
            failures: 0,
            last: Instant::now(),
        });
        entry.failures += 1;
        entry.last = Instant::now();
    }

    fn record_success(&self, op_id: i64) {
        lock(&self.attempts).remove(&op_id);
    }

    /// Sync on every reconnect until the event channel closes.
    pub async fn run(&self, mut events: broadcast::Receiver<ConnectivityEvent>) {
        loop {
            match events.recv().await {
                Ok(ConnectivityEvent::Online) => {
                    tracing::info!("connection restored, syncing");
                    self.sync_logged().await;
                }
                Ok(ConnectivityEvent::Offline) => {
                    tracing::warn!("connection lost, working offline");
                }
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "connectivity events dropped");
                    if self.is_online() {
                        self.sync_logged().await;
                    }
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    async fn sync_logged(&self) {
        match self.sync().await {
            Ok(outcome) => tracing::debug!(?outcome, "sync cycle ended"),
            Err(e) => tracing::error!("sync failed: {}", e),
        }
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
