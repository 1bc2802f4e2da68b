//! Events emitted on successful job transitions.
//!
//! The notification layer subscribes to these over a broadcast channel to
//! drive dashboards; the escrow core never depends on delivery.

use kiln_core::{Address, Amount};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::dispute::DisputeId;
use crate::job::JobId;

/// A successful job-lifecycle transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobEvent {
    /// A job was posted and funded.
    JobCreated {
        /// The new job.
        job_id: JobId,
        /// The funding buyer.
        buyer: Address,
        /// Work price.
        amount: Amount,
        /// Platform fee locked alongside the price.
        fee: Amount,
    },
    /// A provider accepted a job.
    JobAccepted {
        /// The accepted job.
        job_id: JobId,
        /// The accepting provider.
        provider: Address,
    },
    /// The provider submitted a completion proof.
    JobCompleted {
        /// The completed job.
        job_id: JobId,
        /// The submitting provider.
        provider: Address,
        /// Content hash of the proof.
        proof_hash: String,
    },
    /// The buyer approved the work and funds were released.
    JobApproved {
        /// The approved job.
        job_id: JobId,
        /// The paid provider.
        provider: Address,
        /// Amount released to the provider.
        payout: Amount,
        /// Fee released to the collector.
        fee: Amount,
    },
    /// The buyer cancelled before acceptance and was refunded.
    JobCancelled {
        /// The cancelled job.
        job_id: JobId,
        /// The refunded buyer.
        buyer: Address,
        /// Total refunded (price plus fee).
        refund: Amount,
    },
    /// A party opened a dispute.
    JobDisputed {
        /// The disputed job.
        job_id: JobId,
        /// The new dispute.
        dispute_id: DisputeId,
        /// The party who opened it.
        initiator: Address,
    },
    /// An arbitrator resolved a dispute and funds were released.
    JobResolved {
        /// The settled job.
        job_id: JobId,
        /// The resolved dispute.
        dispute_id: DisputeId,
        /// The winning party.
        winner: Address,
        /// Amount released to the winner.
        payout: Amount,
    },
}

impl JobEvent {
    /// The job this event concerns.
    #[must_use]
    pub const fn job_id(&self) -> JobId {
        match self {
            Self::JobCreated { job_id, .. }
            | Self::JobAccepted { job_id, .. }
            | Self::JobCompleted { job_id, .. }
            | Self::JobApproved { job_id, .. }
            | Self::JobCancelled { job_id, .. }
            | Self::JobDisputed { job_id, .. }
            | Self::JobResolved { job_id, .. } => *job_id,
        }
    }

    /// Short machine-readable name of the event kind.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::JobCreated { .. } => "job_created",
            Self::JobAccepted { .. } => "job_accepted",
            Self::JobCompleted { .. } => "job_completed",
            Self::JobApproved { .. } => "job_approved",
            Self::JobCancelled { .. } => "job_cancelled",
            Self::JobDisputed { .. } => "job_disputed",
            Self::JobResolved { .. } => "job_resolved",
        }
    }
}

impl fmt::Display for JobEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.job_id())
    }
}
