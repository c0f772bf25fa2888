//! Transaction data structures
//!
//! Defines the fundamental types for transaction management:
//! - TransactionStatus: transaction lifecycle states
//! - Operation: one edit intent plus the snapshot needed to undo it
//! - Transaction: an atomic batch of operations
//! - compensating_operations: derivation of the undo list for rollback

use chrono::{DateTime, Utc};
use redline_core::{SectionEdit, SectionId, SectionSnapshot};
use serde::{Deserialize, Serialize};

/// Represents the state of a transaction
///
/// State transitions:
/// - `Pending` → `Committed` (validation and apply both succeeded)
/// - `Pending` → `Failed` (validation rejected, or apply rejected)
/// - `Pending` → `RolledBack` (caller-driven rollback)
/// - `Failed` → `RolledBack` (bookkeeping rollback after an apply failure)
///
/// `Committed`, `RolledBack`, and `Failed` are terminal; operations against
/// a transaction in a terminal state return false rather than raising.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Transaction is actively receiving operations
    Pending,
    /// All operations were applied and versions advanced
    Committed,
    /// Transaction was undone (with or without a compensation callback)
    RolledBack,
    /// Validation or apply rejected the transaction
    Failed,
}

impl TransactionStatus {
    /// Whether this state admits no further transitions
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }
}

/// One mutation intent against a single section
///
/// `previous` is a snapshot captured at the moment the operation is
/// attached, used exclusively to derive compensating operations for
/// rollback. It is immutable once set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// Section the edit targets
    pub section: SectionId,
    /// The edit itself
    pub edit: SectionEdit,
    /// State of the section before this edit, if known
    pub previous: Option<SectionSnapshot>,
}

impl Operation {
    /// Create an operation with no prior-state snapshot
    ///
    /// The manager fills the snapshot for update and remove edits when the
    /// operation is attached to a transaction.
    pub fn new(section: impl Into<SectionId>, edit: SectionEdit) -> Self {
        Self {
            section: section.into(),
            edit,
            previous: None,
        }
    }

    /// Create an operation carrying an explicit prior-state snapshot
    pub fn with_previous(
        section: impl Into<SectionId>,
        edit: SectionEdit,
        previous: SectionSnapshot,
    ) -> Self {
        Self {
            section: section.into(),
            edit,
            previous: Some(previous),
        }
    }
}

/// An atomic batch of operations committed or failed together
///
/// Owned exclusively by the manager for its pending lifetime; callers only
/// ever see clones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction identifier
    pub id: redline_core::TransactionId,
    /// Operations in attach order; order is significant for commit and rollback
    pub operations: Vec<Operation>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Lifecycle state
    pub status: TransactionStatus,
    /// Failure text, set when the transaction fails
    pub error: Option<String>,
}

impl Transaction {
    /// Create a fresh pending transaction
    pub fn new() -> Self {
        Self {
            id: redline_core::TransactionId::new(),
            operations: Vec::new(),
            created_at: Utc::now(),
            status: TransactionStatus::Pending,
            error: None,
        }
    }

    /// Whether the transaction still accepts operations
    pub fn is_pending(&self) -> bool {
        self.status == TransactionStatus::Pending
    }

    /// Distinct sections touched by this transaction, in first-touch order
    pub fn touched_sections(&self) -> Vec<&SectionId> {
        let mut seen = Vec::new();
        for op in &self.operations {
            if !seen.contains(&&op.section) {
                seen.push(&op.section);
            }
        }
        seen
    }
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}

/// Derive the compensating operation list for a rollback
///
/// The original order is reversed (last applied is undone first) and each
/// operation is inverted:
/// - `Add` becomes `Remove`
/// - `Remove` becomes `Add` carrying the snapshot's content
/// - `Update` becomes an `Update` carrying the snapshot's content
/// - `Reorder` passes through unchanged
///
/// An `Update` or `Remove` that carries no snapshot has nothing to restore
/// and is omitted from the list. The reversal is literal LIFO; it makes no
/// attempt to order undos across sections beyond that.
pub fn compensating_operations(operations: &[Operation]) -> Vec<Operation> {
    let mut compensation = Vec::with_capacity(operations.len());
    for op in operations.iter().rev() {
        match &op.edit {
            SectionEdit::Add { .. } => {
                compensation.push(Operation::new(op.section.clone(), SectionEdit::Remove));
            }
            SectionEdit::Remove => match &op.previous {
                Some(snapshot) => compensation.push(Operation::new(
                    op.section.clone(),
                    SectionEdit::Add {
                        spec: snapshot.spec.clone(),
                    },
                )),
                None => {
                    tracing::debug!(section = %op.section, "remove without snapshot, nothing to restore");
                }
            },
            SectionEdit::Update { .. } => match &op.previous {
                Some(snapshot) => compensation.push(Operation::new(
                    op.section.clone(),
                    SectionEdit::Update {
                        html: snapshot.spec.html.clone(),
                        text: snapshot.spec.text.clone(),
                    },
                )),
                None => {
                    tracing::debug!(section = %op.section, "update without snapshot, nothing to restore");
                }
            },
            SectionEdit::Reorder { .. } => {
                compensation.push(op.clone());
            }
        }
    }
    compensation
}
