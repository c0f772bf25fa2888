//! Serialized retry queue for Redline
//!
//! This crate provides the execution discipline for coordinator commits:
//! - TransactionQueue: FIFO, strictly one task in flight at a time
//! - QueueConfig: bounded retry with linear backoff
//! - Completion: per-task future resolving with the final outcome
//!
//! The queue knows nothing about transactions; it runs whatever async
//! closures it is handed. Funnel every state mutation through one queue
//! instance and no explicit locking is needed around coordinator state.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod queue;

// Re-export commonly used types
pub use queue::{Completion, QueueConfig, TransactionQueue};
