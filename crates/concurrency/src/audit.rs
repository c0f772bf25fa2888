//! Bounded audit log of transaction outcomes
//!
//! Every terminal transaction outcome (committed, failed, rolled back) is
//! appended here regardless of whether the caller inspected the return
//! value, enabling post-hoc diagnosis. The log is a FIFO ring: once full,
//! the oldest entry is evicted first. Cancellation of a pending
//! transaction is deliberately unlogged.

use crate::transaction::{Operation, Transaction, TransactionStatus};
use chrono::{DateTime, Utc};
use redline_core::TransactionId;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default bound on the number of retained entries
pub const DEFAULT_MAX_LOG_SIZE: usize = 100;

/// Record of one terminal transaction outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Transaction the entry describes
    pub transaction_id: TransactionId,
    /// Time the outcome was recorded
    pub timestamp: DateTime<Utc>,
    /// Snapshot of the transaction's operations at that moment
    pub operations: Vec<Operation>,
    /// Final (or intermediate, for the failed-then-rolled-back path) status
    pub status: TransactionStatus,
    /// Failure text, when the outcome was a failure
    pub error: Option<String>,
}

impl LogEntry {
    /// Build an entry from a transaction's current state
    pub fn from_transaction(txn: &Transaction) -> Self {
        Self {
            transaction_id: txn.id,
            timestamp: Utc::now(),
            operations: txn.operations.clone(),
            status: txn.status,
            error: txn.error.clone(),
        }
    }
}

/// Bounded, append-only ring of transaction outcomes
#[derive(Debug, Clone)]
pub struct TransactionLog {
    entries: VecDeque<LogEntry>,
    max_size: usize,
}

impl Default for TransactionLog {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionLog {
    /// Create a log bounded at [`DEFAULT_MAX_LOG_SIZE`] entries
    pub fn new() -> Self {
        Self::with_max_size(DEFAULT_MAX_LOG_SIZE)
    }

    /// Create a log bounded at `max_size` entries
    ///
    /// A bound of 0 disables retention entirely.
    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_size.min(DEFAULT_MAX_LOG_SIZE)),
            max_size,
        }
    }

    /// Append an entry, evicting the oldest if the ring is full
    pub fn record(&mut self, entry: LogEntry) {
        if self.max_size == 0 {
            return;
        }
        if self.entries.len() == self.max_size {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Number of retained entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Configured retention bound
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Drop all entries
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Copy out entries, optionally filtered then tail-limited
    ///
    /// The live buffer is never exposed; callers receive clones and cannot
    /// mutate the log. The filter runs first, then `limit` keeps the most
    /// recent matches.
    pub fn snapshot(
        &self,
        limit: Option<usize>,
        filter: Option<&dyn Fn(&LogEntry) -> bool>,
    ) -> Vec<LogEntry> {
        let filtered: Vec<LogEntry> = self
            .entries
            .iter()
            .filter(|entry| filter.map_or(true, |f| f(entry)))
            .cloned()
            .collect();
        match limit {
            Some(n) if n < filtered.len() => filtered[filtered.len() - n..].to_vec(),
            _ => filtered,
        }
    }
}
