//! Redline - optimistic-concurrency transaction coordinator for shared,
//! versioned documents
//!
//! Redline governs multi-step edits to a document made of named sections
//! (the shape of a collaboratively edited specification). Edits are batched
//! into transactions, validated, applied through an externally supplied
//! async callback, version-tracked per section for staleness detection,
//! audited in a bounded log, and serialized through a FIFO retry queue.
//!
//! # Quick Start
//!
//! ```ignore
//! use redline::{ConflictStrategy, Operation, SectionEdit, TransactionManager};
//!
//! let manager = TransactionManager::new(ConflictStrategy::ServerWins);
//!
//! let txn = manager.begin_transaction();
//! manager.add_operation(txn, Operation::new("intro", SectionEdit::Update {
//!     html: "<p>hello</p>".into(),
//!     text: "hello".into(),
//! }));
//!
//! // The apply callback persists/transmits the batch; Redline itself
//! // performs no I/O.
//! let committed = manager
//!     .commit_transaction(txn, |ops| async move { persist(ops).await })
//!     .await;
//! ```
//!
//! # Architecture
//!
//! Business rules (validation, versions, rollback derivation, audit) live
//! in the manager; execution discipline (FIFO, at-most-one-in-flight,
//! bounded retry with linear backoff) lives in the queue. The two meet only
//! through the closures callers hand to the queue.

// Re-export the public API from the member crates
pub use redline_concurrency::*;
pub use redline_core::*;
pub use redline_queue::*;
