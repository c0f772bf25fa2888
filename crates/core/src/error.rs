//! Error types for the Redline coordinator
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use crate::types::{SectionId, TransactionId};
use thiserror::Error;

/// Result type alias for coordinator operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the Redline coordinator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A transaction paired a remove with another edit on the same section.
    ///
    /// Detected before apply; the transaction is marked failed and the
    /// apply callback is never invoked.
    #[error("irreconcilable edits for section {section}: remove combined with another edit")]
    RemoveConflict {
        /// Section carrying the conflicting operations
        section: SectionId,
    },

    /// The externally supplied apply callback rejected
    #[error("apply failed for transaction {transaction}: {message}")]
    Apply {
        /// Transaction whose apply failed
        transaction: TransactionId,
        /// Failure text reported by the collaborator
        message: String,
    },

    /// The externally supplied rollback callback rejected
    ///
    /// Never retried automatically; the resulting inconsistency must be
    /// resolved by the caller.
    #[error("rollback failed for transaction {transaction}: {message}")]
    Rollback {
        /// Transaction whose rollback failed
        transaction: TransactionId,
        /// Failure text reported by the collaborator
        message: String,
    },

    /// A conflict under the `Manual` strategy; the coordinator never picks
    /// a side on its own
    #[error("section {section} requires manual conflict resolution")]
    ManualResolutionRequired {
        /// Section with two incompatible proposed states
        section: SectionId,
    },

    /// A queued task consumed all of its retry attempts
    #[error("task failed after {attempts} attempt(s): {last_error}")]
    RetriesExhausted {
        /// Number of attempts made
        attempts: u32,
        /// Failure text of the final attempt
        last_error: String,
    },

    /// A queued task was removed by `clear()` before it started
    #[error("task removed from queue before it started")]
    QueueCleared,
}
