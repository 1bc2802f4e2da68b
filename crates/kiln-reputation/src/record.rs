//! Per-identity reputation records.

use kiln_core::Address;
use serde::{Deserialize, Serialize};

/// Lowest possible score.
pub const MIN_SCORE: u32 = 0;

/// Highest possible score.
pub const MAX_SCORE: u32 = 1000;

/// Neutral score assigned on registration.
pub const DEFAULT_SCORE: u32 = 500;

/// Reputation state for one identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReputationRecord {
    /// The identity this record belongs to.
    pub address: Address,
    /// Current score in `[MIN_SCORE, MAX_SCORE]`.
    pub score: u32,
    /// Whether this identity offers compute.
    pub is_provider: bool,
    /// Whether this identity buys compute.
    pub is_developer: bool,
    /// Jobs completed successfully as provider.
    pub successful_jobs: u64,
    /// Jobs lost or failed as provider.
    pub failed_jobs: u64,
    /// Sum of all stars received.
    pub total_ratings: u64,
    /// Number of ratings received.
    pub rating_count: u64,
}

impl ReputationRecord {
    /// Create a fresh record at the neutral score.
    #[must_use]
    pub const fn new(address: Address, is_provider: bool, is_developer: bool) -> Self {
        Self {
            address,
            score: DEFAULT_SCORE,
            is_provider,
            is_developer,
            successful_jobs: 0,
            failed_jobs: 0,
            total_ratings: 0,
            rating_count: 0,
        }
    }

    /// Apply a signed delta to the score, clamping to the valid range.
    pub fn apply_delta(&mut self, delta: i32) {
        let shifted = i64::from(self.score) + i64::from(delta);
        self.score = shifted.clamp(i64::from(MIN_SCORE), i64::from(MAX_SCORE)) as u32;
    }

    /// Average stars received, if any ratings were recorded.
    #[must_use]
    pub fn average_rating(&self) -> Option<f64> {
        if self.rating_count == 0 {
            return None;
        }
        Some(self.total_ratings as f64 / self.rating_count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_core::Wallet;

    fn record() -> ReputationRecord {
        let address = Wallet::generate().expect("wallet").address().clone();
        ReputationRecord::new(address, true, false)
    }

    #[test]
    fn new_record_is_neutral() {
        let rec = record();
        assert_eq!(rec.score, DEFAULT_SCORE);
        assert_eq!(rec.successful_jobs, 0);
        assert_eq!(rec.failed_jobs, 0);
        assert!(rec.average_rating().is_none());
    }

    #[test]
    fn delta_clamps_at_max() {
        let mut rec = record();
        rec.apply_delta(2_000);
        assert_eq!(rec.score, MAX_SCORE);
    }

    #[test]
    fn delta_clamps_at_min() {
        let mut rec = record();
        rec.apply_delta(-2_000);
        assert_eq!(rec.score, MIN_SCORE);
    }

    #[test]
    fn delta_moves_score() {
        let mut rec = record();
        rec.apply_delta(40);
        assert_eq!(rec.score, 540);
        rec.apply_delta(-100);
        assert_eq!(rec.score, 440);
    }

    #[test]
    fn average_rating_computed() {
        let mut rec = record();
        rec.total_ratings = 9;
        rec.rating_count = 2;
        assert!((rec.average_rating().unwrap_or_default() - 4.5).abs() < f64::EPSILON);
    }

    #[test]
    fn record_serialization() {
        let rec = record();
        let json = serde_json::to_string(&rec).expect("serialize");
        let parsed: ReputationRecord = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(rec, parsed);
    }
}
