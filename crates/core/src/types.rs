//! Core types for the Redline coordinator
//!
//! This module defines the foundational types:
//! - SectionId: name of one section of a shared document
//! - TransactionId: unique identifier for an edit transaction
//! - SectionSpec: full definition of a section (title + rendered content)
//! - SectionEdit: tagged union over the concrete edit kinds
//! - SectionSnapshot: prior state captured when an operation is attached

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of one named section within a shared document
///
/// Sections are the unit of version tracking and conflict detection.
/// The id is an opaque name chosen by the document layer; the coordinator
/// never interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SectionId(String);

impl SectionId {
    /// Create a section id from any string-like value
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the section name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SectionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SectionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an edit transaction
///
/// A TransactionId is a wrapper around a UUID v4. No property of the id
/// beyond uniqueness is load-bearing; callers should treat it as opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(Uuid);

impl TransactionId {
    /// Create a new random TransactionId using UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a TransactionId from a string representation
    ///
    /// Accepts standard UUID format (with or without hyphens).
    /// Returns None if the string is not a valid UUID.
    pub fn from_string(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Full definition of a section
///
/// Carried by `SectionEdit::Add` for newly created sections and by
/// snapshots used to restore removed or overwritten content on rollback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSpec {
    /// Section heading shown in the document outline
    pub title: String,
    /// Rendered rich-text markup
    pub html: String,
    /// Plain-text projection of the same content
    pub text: String,
}

impl SectionSpec {
    /// Create a section spec from its three components
    pub fn new(
        title: impl Into<String>,
        html: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            html: html.into(),
            text: text.into(),
        }
    }
}

/// One edit intent against a single section
///
/// The edit kinds are a closed set so validation and application can
/// pattern-match exhaustively instead of branching on a string tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectionEdit {
    /// Replace the section's content
    Update {
        /// New rich-text markup
        html: String,
        /// New plain-text projection
        text: String,
    },
    /// Create the section
    Add {
        /// Definition of the new section
        spec: SectionSpec,
    },
    /// Delete the section
    Remove,
    /// Move the section to a new position in the document
    Reorder {
        /// Target position (0-based)
        index: usize,
    },
}

impl SectionEdit {
    /// Whether this edit deletes the section
    pub fn is_remove(&self) -> bool {
        matches!(self, SectionEdit::Remove)
    }

    /// Short kind name used in log output
    pub fn kind(&self) -> &'static str {
        match self {
            SectionEdit::Update { .. } => "update",
            SectionEdit::Add { .. } => "add",
            SectionEdit::Remove => "remove",
            SectionEdit::Reorder { .. } => "reorder",
        }
    }
}

/// Prior state of a section, captured at the moment an operation is attached
///
/// Snapshots exist solely so a later rollback can derive compensating
/// operations. They are immutable once set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSnapshot {
    /// Content of the section at capture time
    pub spec: SectionSpec,
    /// Per-section version at capture time
    pub version: u64,
}

impl SectionSnapshot {
    /// Create a snapshot of a section's content at the given version
    pub fn new(spec: SectionSpec, version: u64) -> Self {
        Self { spec, version }
    }
}
