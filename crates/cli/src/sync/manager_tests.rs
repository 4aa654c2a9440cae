// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use super::*;
use crate::sync::remote::FormValue;
use crate::sync::remote_tests::{Call, MockRemote};
use crate::sync::test_helpers::{manager, product};
use std::sync::Arc;
use std::time::Duration;
use stock_core::{Image, OpType, ProductDraft};
use tokio::sync::Notify;

fn completed(outcome: SyncOutcome) -> SyncReport {
    match outcome {
        SyncOutcome::Completed(report) => report,
        other => panic!("expected a completed cycle, got {:?}", other),
    }
}

fn local_names(manager: &SyncManager<MockRemote>) -> Vec<String> {
    manager
        .store()
        .get_all_products()
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Mutations
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn offline_add_gets_temp_id_and_queues_one_add() {
    let remote = MockRemote::new();
    let (manager, _) = manager(&remote, false);

    let mutation = manager
        .save_product(ProductDraft::new("Pen", 1.5), None)
        .await
        .unwrap();

    assert_eq!(mutation.status, MutationStatus::Queued);
    assert!(mutation.product.id < 0);

    let stored = manager.store().get_all_products().unwrap();
    assert_eq!(stored, vec![mutation.product.clone()]);

    let ops = manager.store().list_operations().unwrap();
    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0].op_type, OpType::Add);
    assert_eq!(ops[0].product_id(), mutation.product.id);
    assert!(remote.calls().is_empty());
}

#[tokio::test]
async fn online_add_sends_multipart_fields_and_stores_server_row() {
    let remote = MockRemote::new();
    remote.set_next_id(7);
    let (manager, _) = manager(&remote, true);

    let draft = ProductDraft::new("Mouse", 25.0)
        .with_description("Wireless")
        .with_barcode("123")
        .with_image(Image::pending_upload(vec![1, 2, 3], "mouse.png", "image/png"));
    let mutation = manager.save_product(draft, None).await.unwrap();

    assert_eq!(mutation.status, MutationStatus::Synced);
    assert_eq!(mutation.product.id, 7);
    assert_eq!(mutation.product.image.url(), Some("/uploads/mouse.png"));

    let fields = remote.last_fields();
    let names: Vec<&str> = fields.iter().map(|(name, _)| *name).collect();
    assert_eq!(names, vec!["name", "price", "description", "barcode", "image"]);
    assert_eq!(fields[0].1, FormValue::Text("Mouse".into()));
    assert_eq!(fields[1].1, FormValue::Text("25".into()));
    assert!(matches!(
        &fields[4].1,
        FormValue::File { filename, mime_type, .. }
            if filename == "mouse.png" && mime_type == "image/png"
    ));

    let stored = manager.store().get_all_products().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, 7);
    assert_eq!(manager.store().pending_count().unwrap(), 0);
}

#[tokio::test]
async fn online_add_failure_falls_back_to_queue() {
    let remote = MockRemote::new();
    remote.fail_name("Pen");
    let (manager, _) = manager(&remote, true);

    let mutation = manager
        .save_product(ProductDraft::new("Pen", 1.0), None)
        .await
        .unwrap();

    assert_eq!(mutation.status, MutationStatus::Queued);
    assert!(mutation.product.is_local_only());
    assert_eq!(remote.mutating_calls(), vec![Call::Create("Pen".into())]);
    assert_eq!(manager.store().pending_count().unwrap(), 1);
}

#[tokio::test]
async fn invalid_draft_writes_nothing() {
    let remote = MockRemote::new();
    let (manager, _) = manager(&remote, true);

    let err = manager
        .save_product(ProductDraft::new("   ", 3.0), None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SyncError::Local(stock_core::Error::Validation { field: "name", .. })
    ));

    let err = manager
        .save_product(ProductDraft::new("Pen", 0.0), None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SyncError::Local(stock_core::Error::Validation { field: "price", .. })
    ));

    assert!(manager.store().get_all_products().unwrap().is_empty());
    assert_eq!(manager.store().pending_count().unwrap(), 0);
    assert!(remote.calls().is_empty());
}

#[tokio::test]
async fn offline_update_of_server_product_queues_update() {
    let remote = MockRemote::new().with_products(vec![product(3, "Desk", 120.0)]);
    let (manager, _) = manager(&remote, false);
    manager.store().put_product(&product(3, "Desk", 120.0)).unwrap();

    let mutation = manager
        .save_product(ProductDraft::new("Standing desk", 180.0), Some(3))
        .await
        .unwrap();

    assert_eq!(mutation.status, MutationStatus::Queued);
    assert_eq!(
        manager.store().require_product(3).unwrap().name,
        "Standing desk"
    );
    let ops = manager.store().list_operations().unwrap();
    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0].op_type, OpType::Update);
    assert_eq!(ops[0].product_id(), 3);
}

#[tokio::test]
async fn online_update_without_body_keeps_local_payload() {
    let remote = MockRemote::new().with_products(vec![product(3, "Desk", 120.0)]);
    remote.empty_updates();
    let (manager, _) = manager(&remote, true);
    manager.store().put_product(&product(3, "Desk", 120.0)).unwrap();

    let mutation = manager
        .save_product(ProductDraft::new("Desk", 99.0), Some(3))
        .await
        .unwrap();

    assert_eq!(mutation.status, MutationStatus::Synced);
    assert_eq!(mutation.product.price, 99.0);
    assert_eq!(manager.store().require_product(3).unwrap().price, 99.0);
    assert_eq!(remote.mutating_calls(), vec![Call::Update(3, "Desk".into())]);
}

#[tokio::test]
async fn online_update_failure_queues_update() {
    let remote = MockRemote::new().with_products(vec![product(3, "Desk", 120.0)]);
    remote.fail_id(3);
    let (manager, _) = manager(&remote, true);
    manager.store().put_product(&product(3, "Desk", 120.0)).unwrap();

    let mutation = manager
        .save_product(ProductDraft::new("Desk", 99.0), Some(3))
        .await
        .unwrap();

    assert_eq!(mutation.status, MutationStatus::Queued);
    assert_eq!(manager.store().require_product(3).unwrap().price, 99.0);
    assert_eq!(manager.store().pending_count().unwrap(), 1);
}

#[tokio::test]
async fn editing_unknown_product_is_not_found() {
    let remote = MockRemote::new();
    let (manager, _) = manager(&remote, false);

    let err = manager
        .save_product(ProductDraft::new("Desk", 1.0), Some(42))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SyncError::Local(stock_core::Error::ProductNotFound(42))
    ));

    let err = manager
        .save_product(ProductDraft::new("Desk", 1.0), Some(-42))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SyncError::Local(stock_core::Error::ProductNotFound(-42))
    ));
    assert_eq!(manager.store().pending_count().unwrap(), 0);
}

#[tokio::test]
async fn editing_local_only_product_replaces_its_queued_add() {
    let remote = MockRemote::new();
    let (manager, _) = manager(&remote, false);

    let created = manager
        .save_product(ProductDraft::new("Pen", 1.0), None)
        .await
        .unwrap()
        .product;
    let edited = manager
        .save_product(ProductDraft::new("Fountain pen", 12.0), Some(created.id))
        .await
        .unwrap();

    assert_eq!(edited.status, MutationStatus::Queued);
    assert_eq!(edited.product.id, created.id);

    let ops = manager.store().list_operations().unwrap();
    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0].op_type, OpType::Add);
    assert_eq!(ops[0].product.name, "Fountain pen");
    assert_eq!(local_names(&manager), vec!["Fountain pen"]);
}

#[tokio::test]
async fn offline_delete_of_server_product_queues_delete() {
    let remote = MockRemote::new().with_products(vec![product(3, "Desk", 120.0)]);
    let (manager, _) = manager(&remote, false);
    manager.store().put_product(&product(3, "Desk", 120.0)).unwrap();

    let mutation = manager.delete_product(3).await.unwrap();

    assert_eq!(mutation.status, MutationStatus::Queued);
    assert_eq!(mutation.product.name, "Desk");
    assert!(manager.store().get_product(3).unwrap().is_none());

    let ops = manager.store().list_operations().unwrap();
    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0].op_type, OpType::Delete);
    assert_eq!(ops[0].product_id(), 3);
    assert!(remote.calls().is_empty());
}

#[tokio::test]
async fn online_delete_reaches_server() {
    let remote = MockRemote::new().with_products(vec![product(3, "Desk", 120.0)]);
    let (manager, _) = manager(&remote, true);
    manager.store().put_product(&product(3, "Desk", 120.0)).unwrap();

    let mutation = manager.delete_product(3).await.unwrap();

    assert_eq!(mutation.status, MutationStatus::Synced);
    assert!(remote.server_products().is_empty());
    assert_eq!(manager.store().pending_count().unwrap(), 0);
}

#[tokio::test]
async fn delete_cancels_queued_update_of_same_product() {
    let remote = MockRemote::new().with_products(vec![product(3, "Desk", 120.0)]);
    let (manager, monitor) = manager(&remote, false);
    manager.store().put_product(&product(3, "Desk", 120.0)).unwrap();
    manager
        .save_product(ProductDraft::new("Desk v2", 130.0), Some(3))
        .await
        .unwrap();

    monitor.set_online(true);
    let mutation = manager.delete_product(3).await.unwrap();
    assert_eq!(mutation.status, MutationStatus::Synced);
    assert_eq!(manager.store().pending_count().unwrap(), 0);

    for _ in 0..2 {
        let report = completed(manager.sync().await.unwrap());
        assert_eq!(report.attempted, 0);
        assert_eq!(report.refresh, RefreshOutcome::Refreshed(0));
    }
    assert!(manager.store().get_product(3).unwrap().is_none());
    assert_eq!(remote.mutating_calls(), vec![Call::Delete(3)]);
}

#[tokio::test]
async fn offline_delete_replaces_queued_update() {
    let remote = MockRemote::new().with_products(vec![product(3, "Desk", 120.0)]);
    let (manager, monitor) = manager(&remote, false);
    manager.store().put_product(&product(3, "Desk", 120.0)).unwrap();
    manager
        .save_product(ProductDraft::new("Desk v2", 130.0), Some(3))
        .await
        .unwrap();
    remote.fail_name("Desk v2");

    manager.delete_product(3).await.unwrap();
    let ops = manager.store().list_operations().unwrap();
    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0].op_type, OpType::Delete);

    monitor.set_online(true);
    let report = completed(manager.sync().await.unwrap());

    assert_eq!((report.attempted, report.succeeded), (1, 1));
    assert_eq!(remote.mutating_calls(), vec![Call::Delete(3)]);
    assert!(manager.store().get_all_products().unwrap().is_empty());
}

#[tokio::test]
async fn delete_of_uncached_id_still_queues() {
    let remote = MockRemote::new();
    let (manager, _) = manager(&remote, false);

    let mutation = manager.delete_product(9).await.unwrap();

    assert_eq!(mutation.status, MutationStatus::Queued);
    assert_eq!(mutation.product.id, 9);
    let ops = manager.store().list_operations().unwrap();
    assert_eq!(ops[0].product_id(), 9);
}

#[tokio::test]
async fn deleting_local_only_product_cancels_its_ops() {
    let remote = MockRemote::new();
    let (manager, _) = manager(&remote, true);
    remote.fail_name("Pen");

    let created = manager
        .save_product(ProductDraft::new("Pen", 1.0), None)
        .await
        .unwrap()
        .product;
    let calls_before = remote.calls().len();

    let mutation = manager.delete_product(created.id).await.unwrap();

    assert_eq!(mutation.status, MutationStatus::LocalOnly);
    assert_eq!(manager.store().pending_count().unwrap(), 0);
    assert!(manager.store().get_all_products().unwrap().is_empty());
    assert_eq!(remote.calls().len(), calls_before);
}

// ─────────────────────────────────────────────────────────────────────────────
// Sync cycle
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn sync_while_offline_does_nothing() {
    let remote = MockRemote::new();
    let (manager, _) = manager(&remote, false);
    manager
        .save_product(ProductDraft::new("Pen", 1.0), None)
        .await
        .unwrap();

    assert_eq!(manager.sync().await.unwrap(), SyncOutcome::Offline);
    assert!(remote.calls().is_empty());
    assert_eq!(manager.store().pending_count().unwrap(), 1);
    assert_eq!(manager.state(), SyncState::Idle);
}

#[tokio::test]
async fn queued_ops_replay_in_fifo_order() {
    let remote = MockRemote::new();
    let (manager, monitor) = manager(&remote, false);
    for name in ["A", "B", "C"] {
        manager
            .save_product(ProductDraft::new(name, 1.0), None)
            .await
            .unwrap();
    }

    monitor.set_online(true);
    let report = completed(manager.sync().await.unwrap());

    assert_eq!(report.attempted, 3);
    assert_eq!(report.succeeded, 3);
    assert_eq!(
        remote.mutating_calls(),
        vec![
            Call::Create("A".into()),
            Call::Create("B".into()),
            Call::Create("C".into()),
        ]
    );
}

#[tokio::test]
async fn successful_replay_is_not_repeated() {
    let remote = MockRemote::new();
    let (manager, monitor) = manager(&remote, false);
    manager
        .save_product(ProductDraft::new("Pen", 1.0), None)
        .await
        .unwrap();

    monitor.set_online(true);
    completed(manager.sync().await.unwrap());
    let second = completed(manager.sync().await.unwrap());

    assert_eq!(second.attempted, 0);
    assert_eq!(remote.mutating_calls(), vec![Call::Create("Pen".into())]);
    assert_eq!(remote.server_products().len(), 1);
}

#[tokio::test]
async fn reconciled_create_leaves_no_duplicate() {
    let remote = MockRemote::new();
    remote.set_next_id(41);
    let (manager, monitor) = manager(&remote, false);
    let temp = manager
        .save_product(ProductDraft::new("Mouse", 25.0), None)
        .await
        .unwrap()
        .product;

    monitor.set_online(true);
    completed(manager.sync().await.unwrap());

    let stored = manager.store().get_all_products().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, 41);
    assert_eq!(stored[0].name, "Mouse");
    assert!(manager.store().get_product(temp.id).unwrap().is_none());
    assert_eq!(manager.store().pending_count().unwrap(), 0);
}

#[tokio::test]
async fn partial_failure_keeps_failed_op_for_next_cycle() {
    let remote = MockRemote::new();
    let (manager, monitor) = manager(&remote, false);
    for name in ["A", "B", "C"] {
        manager
            .save_product(ProductDraft::new(name, 1.0), None)
            .await
            .unwrap();
    }
    remote.fail_name("B");

    monitor.set_online(true);
    let first = completed(manager.sync().await.unwrap());
    assert_eq!((first.succeeded, first.failed), (2, 1));

    let ops = manager.store().list_operations().unwrap();
    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0].product.name, "B");

    // Refresh keeps the still-unsynced row visible
    let stored = manager.store().get_all_products().unwrap();
    assert_eq!(stored.len(), 3);
    assert_eq!(stored.iter().filter(|p| p.is_local_only()).count(), 1);

    remote.heal_name("B");
    let second = completed(manager.sync().await.unwrap());
    assert_eq!((second.attempted, second.succeeded), (1, 1));
    assert_eq!(manager.store().pending_count().unwrap(), 0);
    let stored = manager.store().get_all_products().unwrap();
    assert_eq!(stored.len(), 3);
    assert!(stored.iter().all(|p| !p.is_local_only()));
}

#[tokio::test]
async fn offline_delete_replays_against_server() {
    let remote = MockRemote::new().with_products(vec![product(3, "Desk", 120.0)]);
    let (manager, monitor) = manager(&remote, false);
    manager.store().put_product(&product(3, "Desk", 120.0)).unwrap();
    manager.delete_product(3).await.unwrap();

    monitor.set_online(true);
    let report = completed(manager.sync().await.unwrap());

    assert_eq!(report.succeeded, 1);
    assert_eq!(remote.mutating_calls(), vec![Call::Delete(3)]);
    assert!(remote.server_products().is_empty());
    assert!(manager.store().get_all_products().unwrap().is_empty());
}

#[tokio::test]
async fn later_ops_on_temp_id_follow_the_created_row() {
    let remote = MockRemote::new();
    remote.set_next_id(50);
    let (manager, monitor) = manager(&remote, false);
    {
        let store = manager.store();
        let temp = product(-5, "Lamp", 10.0);
        store.put_product(&temp).unwrap();
        store.enqueue_operation(OpType::Add, &temp).unwrap();
        store
            .enqueue_operation(OpType::Update, &product(-5, "Desk lamp", 12.0))
            .unwrap();
    }

    monitor.set_online(true);
    let report = completed(manager.sync().await.unwrap());

    assert_eq!(report.succeeded, 2);
    assert_eq!(
        remote.mutating_calls(),
        vec![
            Call::Create("Lamp".into()),
            Call::Update(50, "Desk lamp".into()),
        ]
    );
    assert_eq!(local_names(&manager), vec!["Desk lamp"]);
}

#[tokio::test]
async fn op_on_unsynced_temp_id_is_deferred() {
    let remote = MockRemote::new();
    let (manager, monitor) = manager(&remote, false);
    manager
        .store()
        .enqueue_operation(OpType::Update, &product(-5, "Lamp", 10.0))
        .unwrap();

    monitor.set_online(true);
    let report = completed(manager.sync().await.unwrap());

    assert_eq!((report.attempted, report.deferred), (0, 1));
    assert!(remote.mutating_calls().is_empty());
    assert_eq!(manager.store().pending_count().unwrap(), 1);
}

#[tokio::test]
async fn refresh_callback_runs_once_with_full_list() {
    let remote = MockRemote::new()
        .with_products(vec![product(1, "Desk", 120.0), product(2, "Chair", 60.0)]);
    let seen: Arc<std::sync::Mutex<Vec<Vec<Product>>>> = Arc::default();
    let sink = Arc::clone(&seen);
    let (manager, _) = manager(&remote, true);
    let manager = manager.on_refresh(Box::new(move |products: &[Product]| {
        sink.lock().unwrap().push(products.to_vec());
    }));

    let report = completed(manager.sync().await.unwrap());

    assert_eq!(report.refresh, RefreshOutcome::Refreshed(2));
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].len(), 2);
    assert_eq!(local_names(&manager), vec!["Desk", "Chair"]);
}

#[tokio::test]
async fn refresh_replaces_stale_local_rows() {
    let remote = MockRemote::new().with_products(vec![product(2, "Chair", 60.0)]);
    let (manager, _) = manager(&remote, true);
    manager.store().put_product(&product(1, "Gone", 1.0)).unwrap();

    completed(manager.sync().await.unwrap());

    assert_eq!(local_names(&manager), vec!["Chair"]);
}

#[tokio::test]
async fn failed_refresh_keeps_local_rows() {
    let remote = MockRemote::new();
    remote.fail_list(true);
    let called = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let counter = Arc::clone(&called);
    let (manager, _) = manager(&remote, true);
    let manager = manager.on_refresh(Box::new(move |_: &[Product]| {
        counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }));
    manager.store().put_product(&product(1, "Desk", 1.0)).unwrap();

    let report = completed(manager.sync().await.unwrap());

    assert_eq!(report.refresh, RefreshOutcome::Failed);
    assert_eq!(local_names(&manager), vec!["Desk"]);
    assert_eq!(called.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn trigger_during_cycle_is_dropped() {
    let remote = MockRemote::new();
    let gate = Arc::new(Notify::new());
    let (manager, monitor) = manager(&remote, false);
    manager
        .save_product(ProductDraft::new("Pen", 1.0), None)
        .await
        .unwrap();
    remote.gate_creates(Arc::clone(&gate));
    monitor.set_online(true);

    let (first, second) = tokio::join!(manager.sync(), async {
        tokio::task::yield_now().await;
        let state = manager.state();
        let outcome = manager.sync().await;
        gate.notify_one();
        (state, outcome)
    });

    let (state_during, second) = second;
    assert_eq!(state_during, SyncState::Draining);
    assert_eq!(second.unwrap(), SyncOutcome::Skipped);
    assert_eq!(completed(first.unwrap()).succeeded, 1);
    assert_eq!(manager.state(), SyncState::Idle);
    assert_eq!(remote.mutating_calls().len(), 1);
}

#[test]
fn cycle_guard_resets_state() {
    let state = std::sync::Mutex::new(SyncState::Idle);
    {
        let guard = CycleGuard::begin(&state).unwrap();
        assert!(CycleGuard::begin(&state).is_none());
        guard.advance(SyncState::Refreshing);
        assert_eq!(*state.lock().unwrap(), SyncState::Refreshing);
    }
    assert_eq!(*state.lock().unwrap(), SyncState::Idle);
}

// ─────────────────────────────────────────────────────────────────────────────
// Retry policy
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn default_policy_retries_every_cycle() {
    let remote = MockRemote::new();
    remote.fail_name("Pen");
    let (manager, monitor) = manager(&remote, false);
    manager
        .save_product(ProductDraft::new("Pen", 1.0), None)
        .await
        .unwrap();

    monitor.set_online(true);
    for _ in 0..3 {
        let report = completed(manager.sync().await.unwrap());
        assert_eq!((report.failed, report.deferred), (1, 0));
    }
    assert_eq!(remote.mutating_calls().len(), 3);
}

#[tokio::test]
async fn max_attempts_defers_without_dropping() {
    let remote = MockRemote::new();
    remote.fail_name("Pen");
    let (manager, monitor) = manager(&remote, false);
    let manager = manager.with_policy(RetryPolicy {
        max_attempts: Some(2),
        min_interval: Duration::ZERO,
    });
    manager
        .save_product(ProductDraft::new("Pen", 1.0), None)
        .await
        .unwrap();

    monitor.set_online(true);
    completed(manager.sync().await.unwrap());
    completed(manager.sync().await.unwrap());
    let third = completed(manager.sync().await.unwrap());

    assert_eq!((third.attempted, third.deferred), (0, 1));
    assert_eq!(remote.mutating_calls().len(), 2);
    assert_eq!(manager.store().pending_count().unwrap(), 1);

    remote.heal_name("Pen");
    manager.reset_retries();
    let after_reset = completed(manager.sync().await.unwrap());
    assert_eq!(after_reset.succeeded, 1);
    assert_eq!(manager.store().pending_count().unwrap(), 0);
}

#[tokio::test]
async fn min_interval_defers_recent_failures() {
    let remote = MockRemote::new();
    remote.fail_name("Pen");
    let (manager, monitor) = manager(&remote, false);
    let manager = manager.with_policy(RetryPolicy {
        max_attempts: None,
        min_interval: Duration::from_secs(3600),
    });
    manager
        .save_product(ProductDraft::new("Pen", 1.0), None)
        .await
        .unwrap();

    monitor.set_online(true);
    let first = completed(manager.sync().await.unwrap());
    let second = completed(manager.sync().await.unwrap());

    assert_eq!(first.failed, 1);
    assert_eq!((second.attempted, second.deferred), (0, 1));
}

// ─────────────────────────────────────────────────────────────────────────────
// Overlay and event loop
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn overlay_applies_pending_ops_over_server_list() {
    let now = chrono::Utc::now();
    let op = |id, op_type, product| PendingOperation {
        id,
        op_type,
        product,
        queued_at: now,
    };
    let server = vec![product(1, "Desk", 1.0), product(2, "Chair", 2.0)];
    let pending = vec![
        op(1, OpType::Update, product(1, "Big desk", 3.0)),
        op(2, OpType::Delete, product(2, "Chair", 2.0)),
        op(3, OpType::Add, product(-9, "Lamp", 4.0)),
    ];

    let merged = overlay_pending(server, &pending);
    let names: Vec<&str> = merged.iter().map(|p| p.name.as_str()).collect();

    assert_eq!(names, vec!["Lamp", "Big desk"]);
}

#[test]
fn overlay_queued_delete_hides_queued_update() {
    let now = chrono::Utc::now();
    let op = |id, op_type, product| PendingOperation {
        id,
        op_type,
        product,
        queued_at: now,
    };
    let pending = vec![
        op(1, OpType::Update, product(3, "Desk v2", 130.0)),
        op(2, OpType::Delete, product(3, "Desk v2", 130.0)),
    ];

    let merged = overlay_pending(vec![product(3, "Desk", 120.0)], &pending);

    assert!(merged.is_empty());
}

#[tokio::test]
async fn run_syncs_on_reconnect_until_channel_closes() {
    let remote = MockRemote::new();
    let (manager, monitor) = manager(&remote, false);
    manager
        .save_product(ProductDraft::new("Pen", 1.0), None)
        .await
        .unwrap();

    let (tx, rx) = tokio::sync::broadcast::channel(4);
    monitor.set_online(true);
    tx.send(ConnectivityEvent::Offline).unwrap();
    tx.send(ConnectivityEvent::Online).unwrap();
    drop(tx);

    tokio::time::timeout(Duration::from_secs(5), manager.run(rx))
        .await
        .expect("run should end when the channel closes");

    assert_eq!(remote.mutating_calls(), vec![Call::Create("Pen".into())]);
    assert_eq!(manager.store().pending_count().unwrap(), 0);
}
