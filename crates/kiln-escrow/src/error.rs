//! Error types for kiln-escrow.

use kiln_core::{Address, Amount};
use kiln_ledger::LedgerError;
use kiln_reputation::ReputationError;
use thiserror::Error;

use crate::dispute::DisputeId;
use crate::job::{JobId, JobStatus};

/// Result type alias for escrow operations.
pub type Result<T> = std::result::Result<T, EscrowError>;

/// Errors that can occur in escrow commands.
#[derive(Debug, Error)]
pub enum EscrowError {
    /// Job does not exist.
    #[error("job not found: {0}")]
    JobNotFound(JobId),

    /// Dispute does not exist.
    #[error("dispute not found: {0}")]
    DisputeNotFound(DisputeId),

    /// Job price below the configured minimum.
    #[error("amount below minimum: {amount} < {minimum}")]
    BelowMinimum {
        /// Offered job price.
        amount: Amount,
        /// Configured minimum.
        minimum: Amount,
    },

    /// Price plus fee does not fit in the token range.
    #[error("amount plus fee overflows")]
    AmountOverflow,

    /// Buyer tried to accept their own job.
    #[error("buyer cannot accept their own job")]
    SelfAccept,

    /// Dispute winner is neither the buyer nor the provider.
    #[error("invalid winner: {winner} is not a party to the job")]
    InvalidWinner {
        /// The proposed winner.
        winner: Address,
    },

    /// Caller lacks the required identity or capability.
    #[error("unauthorized: {caller} cannot {action}")]
    Unauthorized {
        /// The rejected caller.
        caller: Address,
        /// The attempted action.
        action: String,
    },

    /// Command issued while the job is in the wrong status.
    #[error("cannot {command} while job is {status}")]
    InvalidState {
        /// The attempted command.
        command: &'static str,
        /// The job's current status.
        status: JobStatus,
    },

    /// Ledger operation failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Reputation operation failed.
    #[error(transparent)]
    Reputation(#[from] ReputationError),
}

/// Coarse error taxonomy for callers that branch on failure class
/// rather than individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or out-of-range input (minimum amount, self-action,
    /// unknown id, bad winner).
    Validation,
    /// Caller lacks the required role or identity match.
    Authorization,
    /// Command invalid for the job's current status.
    State,
    /// Ledger debit exceeds the available balance.
    InsufficientFunds,
}

impl EscrowError {
    /// Classify this error into the coarse taxonomy.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::JobNotFound(_)
            | Self::DisputeNotFound(_)
            | Self::BelowMinimum { .. }
            | Self::AmountOverflow
            | Self::SelfAccept
            | Self::InvalidWinner { .. } => ErrorKind::Validation,
            Self::Unauthorized { .. } => ErrorKind::Authorization,
            Self::InvalidState { .. } => ErrorKind::State,
            Self::Ledger(e) => match e {
                LedgerError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
                LedgerError::Unauthorized { .. } => ErrorKind::Authorization,
            },
            Self::Reputation(e) => match e {
                ReputationError::Unauthorized { .. } => ErrorKind::Authorization,
                ReputationError::InvalidStars(_)
                | ReputationError::SelfRating
                | ReputationError::NotRegistered(_) => ErrorKind::Validation,
            },
        }
    }

    /// Create an unauthorized error.
    #[must_use]
    pub fn unauthorized(caller: &Address, action: impl Into<String>) -> Self {
        Self::Unauthorized {
            caller: caller.clone(),
            action: action.into(),
        }
    }
}
