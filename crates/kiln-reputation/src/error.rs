//! Error types for kiln-reputation.

use kiln_core::Address;
use thiserror::Error;

/// Result type alias for reputation operations.
pub type Result<T> = std::result::Result<T, ReputationError>;

/// Errors that can occur in reputation operations.
#[derive(Debug, Error)]
pub enum ReputationError {
    /// Rating outside the 1..=5 star range.
    #[error("invalid rating: {0} stars (must be 1-5)")]
    InvalidStars(u8),

    /// An identity tried to rate itself.
    #[error("cannot rate yourself")]
    SelfRating,

    /// The rating target has no reputation record.
    #[error("not registered: {0}")]
    NotRegistered(Address),

    /// Caller is not the configured reputation manager.
    #[error("unauthorized: {caller} is not the reputation manager")]
    Unauthorized {
        /// The rejected caller.
        caller: Address,
    },
}
