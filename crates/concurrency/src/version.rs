//! Version ledger for staleness detection
//!
//! Tracks a global commit counter plus one counter per section, together
//! with the wall-clock time of the last successful commit. Versions are
//! the sole staleness signal: a client holding an older per-section
//! version than the ledger is stale, regardless of content.

use chrono::{DateTime, Utc};
use redline_core::SectionId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// In-memory version ledger
///
/// Invariants:
/// - `global_version` increases by exactly 1 per committed transaction.
/// - A section's version increases by exactly 1 per committed transaction
///   that touched it, regardless of how many operations within that
///   transaction targeted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    global_version: u64,
    section_versions: HashMap<SectionId, u64>,
    last_modified: DateTime<Utc>,
}

impl VersionInfo {
    /// Create a ledger starting at the given global version
    ///
    /// Typically 0 for a fresh document; a resynchronizing caller may seed
    /// the counter from an authoritative source.
    pub fn new(initial_version: u64) -> Self {
        Self {
            global_version: initial_version,
            section_versions: HashMap::new(),
            last_modified: Utc::now(),
        }
    }

    /// Current global commit counter
    pub fn global_version(&self) -> u64 {
        self.global_version
    }

    /// Current version of one section, or 0 if it was never touched
    pub fn section_version(&self, section: &SectionId) -> u64 {
        self.section_versions.get(section).copied().unwrap_or(0)
    }

    /// Wall-clock time of the most recent commit (or ledger creation)
    pub fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }

    /// Staleness test: true iff the client's version lags the ledger
    ///
    /// Strictly `client < server`; equal versions are current and a client
    /// can never legitimately be ahead.
    pub fn has_conflict(&self, section: &SectionId, client_version: u64) -> bool {
        client_version < self.section_version(section)
    }

    /// Record one committed transaction touching the given sections
    ///
    /// Duplicate section ids in the input are collapsed so each touched
    /// section advances exactly once.
    pub fn record_commit<'a, I>(&mut self, touched: I)
    where
        I: IntoIterator<Item = &'a SectionId>,
    {
        let mut seen: HashSet<&SectionId> = HashSet::new();
        for section in touched {
            if seen.insert(section) {
                *self.section_versions.entry(section.clone()).or_insert(0) += 1;
            }
        }
        self.global_version += 1;
        self.last_modified = Utc::now();
    }

    /// Number of sections the ledger has seen at least one commit for
    pub fn tracked_sections(&self) -> usize {
        self.section_versions.len()
    }
}

impl Default for VersionInfo {
    fn default() -> Self {
        Self::new(0)
    }
}
