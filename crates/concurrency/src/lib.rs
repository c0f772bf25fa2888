//! Concurrency layer for Redline
//!
//! This crate implements the optimistic-concurrency transaction
//! coordinator for shared, versioned documents:
//! - Transaction / Operation: atomic batches of section edits
//! - TransactionManager: begin / add-operation / commit / rollback / cancel
//! - VersionInfo: global and per-section version ledger
//! - TransactionLog: bounded audit ring of transaction outcomes
//! - ConflictStrategy: client-wins / server-wins / merge / manual
//!
//! The coordinator performs no I/O. Persistence and transport are
//! externally supplied async callbacks invoked per commit/rollback; the
//! companion queue crate provides the serialized execution discipline
//! those callbacks are expected to run under.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod audit;
pub mod conflict;
pub mod manager;
pub mod transaction;
pub mod validation;
pub mod version;

// Re-export commonly used types
pub use audit::{LogEntry, TransactionLog, DEFAULT_MAX_LOG_SIZE};
pub use conflict::ConflictStrategy;
pub use manager::TransactionManager;
pub use transaction::{compensating_operations, Operation, Transaction, TransactionStatus};
pub use validation::{validate_operations, ValidationOutcome};
pub use version::VersionInfo;
