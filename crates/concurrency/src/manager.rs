//! Transaction manager for coordinating multi-step document edits
//!
//! Orchestrates the optimistic-concurrency commit protocol:
//! 1. Validation (remove paired with another edit is irreconcilable)
//! 2. Apply (externally supplied effect: persistence, transport)
//! 3. Version advance (global + per touched section)
//! 4. Audit log append
//!
//! ## Commit Sequence
//!
//! ```text
//! 1. Look up the transaction; must be pending (a dequeued commit is
//!    uncancelable, so it leaves the active set here)
//! 2. validate_operations() - reject remove-plus-edit pairings
//! 3. IF invalid: mark failed, log, return false; apply is never invoked
//! 4. apply(operations) - the collaborator's async effect
//! 5. IF apply fails: mark failed, log, perform the bookkeeping rollback,
//!    return false (rollback outcome never changes the return value)
//! 6. Advance global version and each distinct touched section by 1
//! 7. Refresh the last-committed snapshot map, mark committed, log
//! ```
//!
//! The manager performs no I/O of its own: every durable effect flows
//! through the apply and rollback callbacks supplied per call. One manager
//! instance owns the coordinator state for one document/session.

use crate::audit::{LogEntry, TransactionLog, DEFAULT_MAX_LOG_SIZE};
use crate::conflict::ConflictStrategy;
use crate::transaction::{
    compensating_operations, Operation, Transaction, TransactionStatus,
};
use crate::validation::validate_operations;
use crate::version::VersionInfo;
use parking_lot::Mutex;
use redline_core::{Result, SectionEdit, SectionId, SectionSnapshot, SectionSpec, TransactionId};
use std::collections::HashMap;
use std::future::Future;

/// Everything the manager guards with one lock
///
/// A single mutex keeps the active set, the version ledger, the snapshot
/// map, and the audit log mutually consistent without lock ordering rules.
#[derive(Debug, Default)]
struct CoordinatorState {
    /// Transactions still owned by the manager (pending, plus transactions
    /// parked in `Failed` after a rollback callback error)
    active: HashMap<TransactionId, Transaction>,
    /// Version ledger
    versions: VersionInfo,
    /// Last-committed content per section, used to capture `previous`
    /// snapshots when operations are attached
    sections: HashMap<SectionId, SectionSpec>,
    /// Bounded audit ring
    log: TransactionLog,
}

/// Coordinates atomic batches of section edits with optimistic concurrency
///
/// Instantiate one manager per document/session. All state is owned by the
/// instance; the manager is `Sync` and methods take `&self`, but callers
/// are expected to funnel commits through a serialized queue so no two
/// apply callbacks run concurrently.
pub struct TransactionManager {
    state: Mutex<CoordinatorState>,
    strategy: ConflictStrategy,
}

impl TransactionManager {
    /// Create a manager with the given conflict-resolution strategy and the
    /// default audit log bound
    pub fn new(strategy: ConflictStrategy) -> Self {
        Self::with_log_size(strategy, DEFAULT_MAX_LOG_SIZE)
    }

    /// Create a manager with an explicit audit log bound
    pub fn with_log_size(strategy: ConflictStrategy, max_log_size: usize) -> Self {
        TransactionManager {
            state: Mutex::new(CoordinatorState {
                log: TransactionLog::with_max_size(max_log_size),
                ..CoordinatorState::default()
            }),
            strategy,
        }
    }

    /// The conflict-resolution strategy this manager was configured with
    pub fn strategy(&self) -> ConflictStrategy {
        self.strategy
    }

    /// Open a new pending transaction and return its id
    ///
    /// Always succeeds.
    pub fn begin_transaction(&self) -> TransactionId {
        let txn = Transaction::new();
        let id = txn.id;
        self.state.lock().active.insert(id, txn);
        tracing::debug!(transaction = %id, "transaction opened");
        id
    }

    /// Attach an operation to a pending transaction
    ///
    /// Returns false without mutating anything if the transaction is
    /// unknown or no longer pending. For update and remove edits the
    /// current content and version of the section are captured into the
    /// operation's `previous` snapshot (unless the caller already set one);
    /// this is what makes later rollback possible. Operations are appended
    /// in call order, and order is significant for commit and rollback.
    pub fn add_operation(&self, id: TransactionId, mut operation: Operation) -> bool {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let Some(txn) = state.active.get_mut(&id) else {
            return false;
        };
        if !txn.is_pending() {
            return false;
        }

        if operation.previous.is_none()
            && matches!(
                operation.edit,
                SectionEdit::Update { .. } | SectionEdit::Remove
            )
        {
            if let Some(spec) = state.sections.get(&operation.section) {
                let version = state.versions.section_version(&operation.section);
                operation.previous = Some(SectionSnapshot::new(spec.clone(), version));
            }
        }

        txn.operations.push(operation);
        true
    }

    /// Validate and apply a pending transaction
    ///
    /// `apply` is the externally supplied effect that persists or transmits
    /// the operation batch; the manager awaits it without any timeout.
    ///
    /// Returns false if the transaction is unknown or not pending, if
    /// validation rejects it (apply is never invoked), or if apply fails.
    /// On apply failure the transaction is marked failed, the failure is
    /// logged, and a bookkeeping rollback discards the transaction; the
    /// rollback outcome does not change the false return. On success the
    /// global version and each distinct touched section advance by exactly
    /// 1 and the outcome is logged.
    pub async fn commit_transaction<F, Fut>(&self, id: TransactionId, apply: F) -> bool
    where
        F: FnOnce(Vec<Operation>) -> Fut,
        Fut: Future<Output = anyhow::Result<()>>,
    {
        let mut txn = {
            let mut state = self.state.lock();
            if !state.active.get(&id).map_or(false, |t| t.is_pending()) {
                return false;
            }
            match state.active.remove(&id) {
                Some(t) => t,
                None => return false,
            }
        };

        let outcome = validate_operations(&txn.operations);
        if !outcome.is_valid() {
            txn.status = TransactionStatus::Failed;
            if let Some(section) = outcome.conflicts.first() {
                txn.error = Some(
                    redline_core::Error::RemoveConflict {
                        section: section.clone(),
                    }
                    .to_string(),
                );
            }
            tracing::warn!(
                transaction = %id,
                conflicts = outcome.conflict_count(),
                "validation rejected transaction"
            );
            self.state.lock().log.record(LogEntry::from_transaction(&txn));
            return false;
        }

        match apply(txn.operations.clone()).await {
            Ok(()) => {
                let mut state = self.state.lock();
                state.versions.record_commit(txn.touched_sections());
                for op in &txn.operations {
                    apply_to_snapshot(&mut state.sections, op);
                }
                txn.status = TransactionStatus::Committed;
                state.log.record(LogEntry::from_transaction(&txn));
                tracing::debug!(
                    transaction = %id,
                    operations = txn.operations.len(),
                    global_version = state.versions.global_version(),
                    "transaction committed"
                );
                true
            }
            Err(e) => {
                txn.status = TransactionStatus::Failed;
                txn.error = Some(e.to_string());
                tracing::error!(transaction = %id, error = %e, "apply rejected, rolling back");
                {
                    let mut state = self.state.lock();
                    state.log.record(LogEntry::from_transaction(&txn));
                }
                // No compensation callback exists on this path; the
                // bookkeeping rollback mirrors rollback_transaction's
                // no-callback discard and leaves its own log entry.
                txn.status = TransactionStatus::RolledBack;
                self.state.lock().log.record(LogEntry::from_transaction(&txn));
                false
            }
        }
    }

    /// Roll back a transaction without a compensation callback
    ///
    /// Discards the transaction: it is marked rolled back, logged, and
    /// removed from the active set. Returns false if the id is unknown.
    pub fn rollback_transaction(&self, id: TransactionId) -> bool {
        let mut state = self.state.lock();
        let Some(mut txn) = state.active.remove(&id) else {
            return false;
        };
        txn.status = TransactionStatus::RolledBack;
        state.log.record(LogEntry::from_transaction(&txn));
        tracing::debug!(transaction = %id, "transaction rolled back without compensation");
        true
    }

    /// Roll back a transaction through a compensation callback
    ///
    /// The compensating list is the transaction's operations reversed
    /// (last applied is undone first) with each operation inverted; see
    /// [`compensating_operations`]. On callback success the transaction is
    /// marked rolled back, logged, and removed. On callback failure the
    /// error is logged, the transaction is parked in `Failed` state for
    /// manual recovery, and false is returned; the manager never retries
    /// the compensation on its own.
    pub async fn rollback_transaction_with<F, Fut>(&self, id: TransactionId, compensate: F) -> bool
    where
        F: FnOnce(Vec<Operation>) -> Fut,
        Fut: Future<Output = anyhow::Result<()>>,
    {
        let compensation = {
            let state = self.state.lock();
            let Some(txn) = state.active.get(&id) else {
                return false;
            };
            compensating_operations(&txn.operations)
        };

        match compensate(compensation).await {
            Ok(()) => {
                let mut state = self.state.lock();
                let Some(mut txn) = state.active.remove(&id) else {
                    return false;
                };
                txn.status = TransactionStatus::RolledBack;
                state.log.record(LogEntry::from_transaction(&txn));
                tracing::debug!(transaction = %id, "transaction rolled back");
                true
            }
            Err(e) => {
                tracing::error!(
                    transaction = %id,
                    error = %e,
                    "rollback compensation failed; transaction parked for manual recovery"
                );
                let mut state = self.state.lock();
                if let Some(txn) = state.active.get_mut(&id) {
                    txn.status = TransactionStatus::Failed;
                    txn.error = Some(e.to_string());
                }
                false
            }
        }
    }

    /// Drop a pending transaction without any trace in the audit log
    ///
    /// Returns false if the transaction is unknown or already past
    /// pending. The missing log entry is what distinguishes cancellation
    /// from failure and rollback, which are always logged.
    pub fn cancel_transaction(&self, id: TransactionId) -> bool {
        let mut state = self.state.lock();
        let pending = state.active.get(&id).map_or(false, |t| t.is_pending());
        if pending {
            state.active.remove(&id);
            tracing::debug!(transaction = %id, "transaction canceled");
        }
        pending
    }

    /// Current version of one section, or 0 if it was never touched
    pub fn section_version(&self, section: &SectionId) -> u64 {
        self.state.lock().versions.section_version(section)
    }

    /// Staleness test: true iff `client_version` lags the ledger
    pub fn has_version_conflict(&self, section: &SectionId, client_version: u64) -> bool {
        self.state.lock().versions.has_conflict(section, client_version)
    }

    /// Reconcile two proposed states for a section per the configured
    /// strategy
    ///
    /// See [`ConflictStrategy::resolve`]; under `Manual` this fails rather
    /// than picking a side.
    pub fn resolve_conflict(
        &self,
        section: &SectionId,
        client: SectionSpec,
        server: SectionSpec,
        merge: Option<&dyn Fn(SectionSpec, SectionSpec) -> SectionSpec>,
    ) -> Result<SectionSpec> {
        self.strategy.resolve(section, client, server, merge)
    }

    /// Copy out the audit log, optionally filtered then tail-limited
    pub fn transaction_log(
        &self,
        limit: Option<usize>,
        filter: Option<&dyn Fn(&LogEntry) -> bool>,
    ) -> Vec<LogEntry> {
        self.state.lock().log.snapshot(limit, filter)
    }

    /// Clone out the current version ledger
    pub fn version_info(&self) -> VersionInfo {
        self.state.lock().versions.clone()
    }

    /// Number of transactions still accepting operations
    pub fn pending_count(&self) -> usize {
        self.state
            .lock()
            .active
            .values()
            .filter(|t| t.is_pending())
            .count()
    }

    /// Clone out one transaction still owned by the manager
    pub fn transaction(&self, id: TransactionId) -> Option<Transaction> {
        self.state.lock().active.get(&id).cloned()
    }

    /// Discard all coordinator state and restart the ledger
    ///
    /// Clears active transactions, the snapshot map, and the audit log;
    /// the global version restarts at `initial_version`. Intended for test
    /// harnesses and full resynchronization after catastrophic desync, not
    /// for normal operation.
    pub fn reset(&self, initial_version: u64) {
        let mut state = self.state.lock();
        state.active.clear();
        state.sections.clear();
        state.versions = VersionInfo::new(initial_version);
        state.log.clear();
        tracing::info!(initial_version, "coordinator state reset");
    }
}

impl Default for TransactionManager {
    fn default() -> Self {
        Self::new(ConflictStrategy::ServerWins)
    }
}

/// Fold one committed operation into the last-committed snapshot map
fn apply_to_snapshot(sections: &mut HashMap<SectionId, SectionSpec>, op: &Operation) {
    match &op.edit {
        SectionEdit::Add { spec } => {
            sections.insert(op.section.clone(), spec.clone());
        }
        SectionEdit::Update { html, text } => {
            let entry = sections.entry(op.section.clone()).or_default();
            entry.html = html.clone();
            entry.text = text.clone();
        }
        SectionEdit::Remove => {
            sections.remove(&op.section);
        }
        SectionEdit::Reorder { .. } => {}
    }
}
