//! Dispute arbitration types.

use chrono::{DateTime, Utc};
use kiln_core::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::job::JobId;

/// Unique, monotonic dispute identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DisputeId(pub u64);

impl fmt::Display for DisputeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dispute-{}", self.0)
    }
}

/// A dispute over a completed job.
///
/// Opened by either party from the `Completed` status, closed exactly once
/// by an arbitrator. A resolved dispute is immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dispute {
    /// Unique dispute id.
    pub id: DisputeId,
    /// The disputed job.
    pub job_id: JobId,
    /// The party who opened the dispute.
    pub initiator: Address,
    /// Free-text reason supplied at creation.
    pub reason: String,
    /// Whether an arbitrator has ruled.
    pub resolved: bool,
    /// The winning party, once resolved.
    pub winner: Option<Address>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Dispute {
    /// Open a new dispute.
    #[must_use]
    pub fn new(id: DisputeId, job_id: JobId, initiator: Address, reason: String) -> Self {
        Self {
            id,
            job_id,
            initiator,
            reason,
            resolved: false,
            winner: None,
            created_at: Utc::now(),
        }
    }

    /// Record the arbitrator's ruling. Called exactly once.
    pub(crate) fn resolve(&mut self, winner: Address) {
        self.resolved = true;
        self.winner = Some(winner);
    }
}
