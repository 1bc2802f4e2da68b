//! Score-delta policies for job outcomes.
//!
//! The exact magnitude of the score change after a job settles is a
//! deployment decision, so it is expressed as a trait rather than baked
//! into the registry. [`FixedDeltaPolicy`] is the default.

use kiln_core::Amount;

/// Signed score deltas produced by a job outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutcomeDeltas {
    /// Delta applied to the provider's score.
    pub provider: i32,
    /// Delta applied to the developer's (buyer's) score.
    pub developer: i32,
}

/// Maps a job outcome to score deltas for both parties.
pub trait JobOutcomePolicy: Send + Sync {
    /// Deltas for a settled job. `successful` is true when the provider
    /// was paid (approval, or a dispute resolved in their favor);
    /// `amount` is the job price, available for value-weighted policies.
    fn deltas(&self, successful: bool, amount: Amount) -> OutcomeDeltas;
}

/// Fixed deltas regardless of job value.
///
/// Defaults: success raises the provider by 25 and the developer by 5;
/// failure lowers the provider by 25 and leaves the developer unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDeltaPolicy {
    /// Provider delta on success.
    pub provider_success: i32,
    /// Provider delta on failure.
    pub provider_failure: i32,
    /// Developer delta on success.
    pub developer_success: i32,
    /// Developer delta on failure.
    pub developer_failure: i32,
}

impl Default for FixedDeltaPolicy {
    fn default() -> Self {
        Self {
            provider_success: 25,
            provider_failure: -25,
            developer_success: 5,
            developer_failure: 0,
        }
    }
}

impl JobOutcomePolicy for FixedDeltaPolicy {
    fn deltas(&self, successful: bool, _amount: Amount) -> OutcomeDeltas {
        if successful {
            OutcomeDeltas {
                provider: self.provider_success,
                developer: self.developer_success,
            }
        } else {
            OutcomeDeltas {
                provider: self.provider_failure,
                developer: self.developer_failure,
            }
        }
    }
}
