//! Conflict resolution strategies
//!
//! When a client and the server hold two proposed states for the same
//! section at incompatible versions, the manager's configured strategy
//! decides which content survives. The strategy is fixed per manager
//! instance, not per call.

use redline_core::{Error, Result, SectionId, SectionSpec};
use serde::{Deserialize, Serialize};

/// How two incompatible proposed states for a section are reconciled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConflictStrategy {
    /// The client's content survives unchanged
    ClientWins,
    /// The server's content survives unchanged
    ServerWins,
    /// A caller-supplied merge function combines both sides; without one,
    /// the server's content is kept
    Merge,
    /// Neither side is chosen; resolution happens out of band
    Manual,
}

impl ConflictStrategy {
    /// Resolve a conflict between a client's and the server's content
    ///
    /// Under `Manual` this fails with
    /// [`Error::ManualResolutionRequired`] instead of picking a side.
    pub fn resolve(
        &self,
        section: &SectionId,
        client: SectionSpec,
        server: SectionSpec,
        merge: Option<&dyn Fn(SectionSpec, SectionSpec) -> SectionSpec>,
    ) -> Result<SectionSpec> {
        match self {
            ConflictStrategy::ClientWins => Ok(client),
            ConflictStrategy::ServerWins => Ok(server),
            ConflictStrategy::Merge => Ok(match merge {
                Some(f) => f(client, server),
                None => server,
            }),
            ConflictStrategy::Manual => Err(Error::ManualResolutionRequired {
                section: section.clone(),
            }),
        }
    }
}
