//! Rollback Tests
//!
//! Compensation derivation and its interaction with the external store:
//! - Update is undone by restoring the captured prior content
//! - Remove is undone by re-adding the captured section
//! - Undo order is last-applied-first
//! - A failed compensation parks the transaction for manual recovery

use crate::common::{add_op, apply_ops, remove_op, text_store, update_op};
use redline::{SectionEdit, TransactionManager, TransactionStatus};
use std::sync::Arc;

#[tokio::test]
async fn rollback_restores_prior_content_through_callback() {
    let manager = TransactionManager::default();
    let store = text_store();

    // Seed the section at "old" through a committed transaction so the
    // coordinator knows its content.
    let seed = manager.begin_transaction();
    manager.add_operation(seed, add_op("intro", "old"));
    let s = Arc::clone(&store);
    assert!(
        manager
            .commit_transaction(seed, move |ops| async move {
                apply_ops(&s, &ops);
                anyhow::Ok(())
            })
            .await
    );
    assert_eq!(store.lock().get("intro").unwrap(), "old");

    // A pending update captured previous = "old". Its apply already ran
    // against the store when things went sideways elsewhere; compensation
    // must put "old" back.
    let txn = manager.begin_transaction();
    manager.add_operation(txn, update_op("intro", "new"));
    {
        let txn = manager.transaction(txn).unwrap();
        let previous = txn.operations[0].previous.as_ref().unwrap();
        assert_eq!(previous.spec.text, "old");
    }
    store
        .lock()
        .insert("intro".to_string(), "new".to_string());

    let s = Arc::clone(&store);
    let rolled = manager
        .rollback_transaction_with(txn, move |ops| async move {
            apply_ops(&s, &ops);
            anyhow::Ok(())
        })
        .await;

    assert!(rolled);
    assert_eq!(store.lock().get("intro").unwrap(), "old");
}

#[tokio::test]
async fn removed_section_is_readded_with_captured_content() {
    let manager = TransactionManager::default();
    let store = text_store();

    let seed = manager.begin_transaction();
    manager.add_operation(seed, add_op("appendix", "keep me"));
    let s = Arc::clone(&store);
    assert!(
        manager
            .commit_transaction(seed, move |ops| async move {
                apply_ops(&s, &ops);
                anyhow::Ok(())
            })
            .await
    );

    let txn = manager.begin_transaction();
    manager.add_operation(txn, remove_op("appendix"));
    store.lock().remove("appendix");

    let s = Arc::clone(&store);
    assert!(
        manager
            .rollback_transaction_with(txn, move |ops| async move {
                apply_ops(&s, &ops);
                anyhow::Ok(())
            })
            .await
    );

    assert_eq!(store.lock().get("appendix").unwrap(), "keep me");
}

#[tokio::test]
async fn compensation_undoes_last_operation_first() {
    let manager = TransactionManager::default();
    let txn = manager.begin_transaction();
    manager.add_operation(txn, add_op("a", "1"));
    manager.add_operation(txn, add_op("b", "2"));
    manager.add_operation(txn, add_op("c", "3"));

    let seen: Arc<parking_lot::Mutex<Vec<String>>> = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    assert!(
        manager
            .rollback_transaction_with(txn, move |ops| {
                let mut order = sink.lock();
                for op in &ops {
                    assert_eq!(op.edit, SectionEdit::Remove);
                    order.push(op.section.as_str().to_string());
                }
                async { anyhow::Ok(()) }
            })
            .await
    );

    assert_eq!(*seen.lock(), ["c", "b", "a"]);
}

#[tokio::test]
async fn failed_compensation_parks_the_transaction() {
    let manager = TransactionManager::default();
    let txn = manager.begin_transaction();
    manager.add_operation(txn, update_op("intro", "x"));

    let rolled = manager
        .rollback_transaction_with(txn, |_| async {
            Err::<(), _>(anyhow::anyhow!("compensation endpoint down"))
        })
        .await;

    assert!(!rolled);
    let parked = manager.transaction(txn).unwrap();
    assert_eq!(parked.status, TransactionStatus::Failed);
    assert!(parked.error.as_ref().unwrap().contains("endpoint down"));

    // Not pending anymore, so the ordinary lifecycle calls refuse it...
    assert!(!manager.add_operation(txn, update_op("intro", "y")));
    assert!(!manager.cancel_transaction(txn));

    // ...but a manual re-attempt at compensation is still possible.
    assert!(
        manager
            .rollback_transaction_with(txn, |_| async { anyhow::Ok(()) })
            .await
    );
    assert!(manager.transaction(txn).is_none());
}

#[tokio::test]
async fn apply_failure_triggers_bookkeeping_rollback() {
    let manager = TransactionManager::default();
    let txn = manager.begin_transaction();
    manager.add_operation(txn, update_op("intro", "x"));

    assert!(
        !manager
            .commit_transaction(txn, |_| async {
                Err::<(), _>(anyhow::anyhow!("wire dropped"))
            })
            .await
    );

    // The failure and the discard are both on the record.
    let log = manager.transaction_log(None, None);
    let statuses: Vec<_> = log.iter().map(|e| e.status).collect();
    assert_eq!(
        statuses,
        [TransactionStatus::Failed, TransactionStatus::RolledBack]
    );
}
