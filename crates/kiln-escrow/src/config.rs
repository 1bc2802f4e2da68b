//! Escrow configuration.

use kiln_core::Amount;
use serde::{Deserialize, Serialize};

/// Deployment-time escrow parameters.
///
/// Fixed at construction of the [`crate::JobEscrow`] service; not mutable
/// at runtime by any caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowConfig {
    /// Platform fee in basis points (1 bps = 0.01%).
    pub fee_rate_bps: u32,
    /// Smallest accepted job price.
    pub min_job_amount: Amount,
}

impl EscrowConfig {
    /// Default platform fee: 250 bps (2.5%).
    pub const DEFAULT_FEE_RATE_BPS: u32 = 250;

    /// Default minimum job price, in grains.
    pub const DEFAULT_MIN_JOB_GRAINS: u64 = 100;

    /// Fee for a given job price under this configuration (floored).
    #[must_use]
    pub const fn fee(&self, amount: Amount) -> Amount {
        amount.fee_bps(self.fee_rate_bps)
    }
}

impl Default for EscrowConfig {
    fn default() -> Self {
        Self {
            fee_rate_bps: Self::DEFAULT_FEE_RATE_BPS,
            min_job_amount: Amount::from_grains(Self::DEFAULT_MIN_JOB_GRAINS),
        }
    }
}
