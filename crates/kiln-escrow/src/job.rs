//! Job lifecycle types.
//!
//! A job moves through a fixed state machine:
//!
//! ```text
//! Created ──► Active ──► Completed ──► Resolved
//!    │                        │            ▲
//!    ▼                        ▼            │
//! Cancelled               Disputed ────────┘
//! ```
//!
//! `Resolved` and `Cancelled` are terminal; jobs are never deleted.

use chrono::{DateTime, Utc};
use kiln_core::{Address, Amount};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::dispute::DisputeId;

/// Unique, monotonic job identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job-{}", self.0)
    }
}

/// The status of a job in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Posted and funded, awaiting a provider.
    Created,
    /// Accepted by a provider, work in progress.
    Active,
    /// Proof submitted, awaiting buyer approval.
    Completed,
    /// Under dispute, awaiting arbitration.
    Disputed,
    /// Settled: funds released to one party. Terminal.
    Resolved,
    /// Cancelled before acceptance, buyer refunded. Terminal.
    Cancelled,
}

impl JobStatus {
    /// Checks if a transition to the target status is valid.
    #[must_use]
    pub const fn can_transition_to(&self, target: &Self) -> bool {
        use JobStatus::{Active, Cancelled, Completed, Created, Disputed, Resolved};

        matches!(
            (self, target),
            (Created, Active | Cancelled)
                | (Active, Completed)
                | (Completed, Resolved | Disputed)
                | (Disputed, Resolved)
        )
    }

    /// Returns true if no further transition is possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved | Self::Cancelled)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "Created"),
            Self::Active => write!(f, "Active"),
            Self::Completed => write!(f, "Completed"),
            Self::Disputed => write!(f, "Disputed"),
            Self::Resolved => write!(f, "Resolved"),
            Self::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// A pay-per-job compute engagement.
///
/// While the job is non-terminal the escrow vault holds `amount + fee`,
/// debited from the buyer exactly once at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Unique job id.
    pub id: JobId,
    /// The buyer who posted and funded the job.
    pub buyer: Address,
    /// The provider, once the job is accepted.
    pub provider: Option<Address>,
    /// Work price; paid to the winning party on settlement.
    pub amount: Amount,
    /// Platform fee, fixed at creation; paid to the fee collector.
    pub fee: Amount,
    /// Content hash of the input dataset.
    pub dataset_hash: String,
    /// Content hash of the completion proof, once submitted.
    pub proof_hash: Option<String>,
    /// Current lifecycle status.
    pub status: JobStatus,
    /// Back-reference to the dispute, if one was opened.
    pub dispute_id: Option<DisputeId>,
    /// Buyer-supplied reason, if the job was cancelled.
    pub cancel_reason: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Create a new funded job in the `Created` status.
    #[must_use]
    pub fn new(id: JobId, buyer: Address, amount: Amount, fee: Amount, dataset_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            buyer,
            provider: None,
            amount,
            fee,
            dataset_hash,
            proof_hash: None,
            status: JobStatus::Created,
            dispute_id: None,
            cancel_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Total locked in escrow for this job.
    #[must_use]
    pub const fn escrowed(&self) -> Amount {
        self.amount.saturating_add(self.fee)
    }

    /// Move to a new status and refresh the update timestamp.
    ///
    /// Callers validate the transition; this only records it.
    pub(crate) fn advance(&mut self, status: JobStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}
