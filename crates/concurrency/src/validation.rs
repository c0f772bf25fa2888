//! Transaction validation
//!
//! Runs at commit time, before the apply callback is invoked. The one
//! irreconcilable combination is a `Remove` paired with any other edit on
//! the same section within a single transaction: the batch both deletes
//! the section and assumes it survives. Every other combination, including
//! multiple updates to one section, is compatible.

use crate::transaction::Operation;
use redline_core::SectionId;
use std::collections::HashMap;

/// Result of validating a transaction's operation list
///
/// Accumulates every section with conflicting operations. A transaction
/// commits only if `is_valid()` returns true.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    /// Sections carrying both a remove and a non-remove edit
    pub conflicts: Vec<SectionId>,
}

impl ValidationOutcome {
    /// A passing outcome with no conflicts
    pub fn ok() -> Self {
        ValidationOutcome {
            conflicts: Vec::new(),
        }
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Number of conflicting sections
    pub fn conflict_count(&self) -> usize {
        self.conflicts.len()
    }
}

/// Validate a transaction's operations
///
/// Groups operations by section and flags any section that has both a
/// `Remove` and a non-`Remove` edit.
pub fn validate_operations(operations: &[Operation]) -> ValidationOutcome {
    let mut per_section: HashMap<&SectionId, (bool, bool)> = HashMap::new();
    for op in operations {
        let entry = per_section.entry(&op.section).or_insert((false, false));
        if op.edit.is_remove() {
            entry.0 = true;
        } else {
            entry.1 = true;
        }
    }

    let mut conflicts: Vec<SectionId> = per_section
        .into_iter()
        .filter(|(_, (removed, edited))| *removed && *edited)
        .map(|(section, _)| section.clone())
        .collect();
    conflicts.sort();

    ValidationOutcome { conflicts }
}
