//! Transaction Lifecycle Tests
//!
//! Tests for complete transaction workflows:
//! - Begin / add-operation / commit cycle
//! - Cancellation
//! - Terminal states as false no-ops

use crate::common::{apply_ops, remove_op, text_store, update_op};
use redline::{ConflictStrategy, SectionId, TransactionId, TransactionManager};
use std::sync::Arc;

// ============================================================================
// Begin-Commit Cycle
// ============================================================================

#[tokio::test]
async fn begin_commit_applies_batch_through_callback() {
    let manager = TransactionManager::new(ConflictStrategy::ServerWins);
    let store = text_store();

    let txn = manager.begin_transaction();
    assert!(manager.add_operation(txn, update_op("intro", "hello")));
    assert!(manager.add_operation(txn, update_op("body", "world")));

    let s = Arc::clone(&store);
    let committed = manager
        .commit_transaction(txn, move |ops| async move {
            apply_ops(&s, &ops);
            anyhow::Ok(())
        })
        .await;

    assert!(committed);
    assert_eq!(store.lock().get("intro").unwrap(), "hello");
    assert_eq!(store.lock().get("body").unwrap(), "world");
}

#[tokio::test]
async fn empty_transaction_commits_and_advances_global_only() {
    let manager = TransactionManager::default();
    let txn = manager.begin_transaction();

    let committed = manager
        .commit_transaction(txn, |ops| async move {
            assert!(ops.is_empty());
            anyhow::Ok(())
        })
        .await;

    assert!(committed);
    assert_eq!(manager.version_info().global_version(), 1);
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test]
async fn cancel_only_works_while_pending() {
    let manager = TransactionManager::default();
    let txn = manager.begin_transaction();
    manager.add_operation(txn, update_op("a", "x"));

    assert!(manager.cancel_transaction(txn));
    assert_eq!(manager.pending_count(), 0);

    // Cancel again, and every other call, is a false no-op.
    assert!(!manager.cancel_transaction(txn));
    assert!(!manager.add_operation(txn, update_op("a", "y")));
    assert!(
        !manager
            .commit_transaction(txn, |_| async { anyhow::Ok(()) })
            .await
    );
}

#[test]
fn cancel_unknown_id_is_false() {
    let manager = TransactionManager::default();
    assert!(!manager.cancel_transaction(TransactionId::new()));
}

// ============================================================================
// Terminal States
// ============================================================================

#[tokio::test]
async fn committed_transaction_rejects_every_further_call() {
    let manager = TransactionManager::default();
    let txn = manager.begin_transaction();
    manager.add_operation(txn, update_op("a", "x"));
    assert!(
        manager
            .commit_transaction(txn, |_| async { anyhow::Ok(()) })
            .await
    );

    let global_before = manager.version_info().global_version();

    assert!(!manager.add_operation(txn, update_op("a", "y")));
    assert!(
        !manager
            .commit_transaction(txn, |_| async { anyhow::Ok(()) })
            .await
    );
    assert!(!manager.rollback_transaction(txn));
    assert!(!manager.cancel_transaction(txn));

    // None of the rejected calls mutated anything.
    assert_eq!(manager.version_info().global_version(), global_before);
    assert_eq!(manager.section_version(&SectionId::from("a")), 1);
}

#[tokio::test]
async fn failed_validation_is_terminal_too() {
    let manager = TransactionManager::default();
    let txn = manager.begin_transaction();
    manager.add_operation(txn, update_op("a", "x"));
    manager.add_operation(txn, remove_op("a"));

    assert!(
        !manager
            .commit_transaction(txn, |_| async { anyhow::Ok(()) })
            .await
    );
    assert!(!manager.add_operation(txn, update_op("a", "y")));
    assert!(!manager.cancel_transaction(txn));
}
