//! Core types for Redline
//!
//! This crate defines the foundational types used throughout the system:
//! - SectionId: name of one section of a shared document
//! - TransactionId: unique identifier for an edit transaction
//! - SectionSpec / SectionEdit / SectionSnapshot: edit payloads
//! - Error: error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::{SectionEdit, SectionId, SectionSnapshot, SectionSpec, TransactionId};
