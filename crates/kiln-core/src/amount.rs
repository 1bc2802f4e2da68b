//! KILN token amount representation.
//!
//! Amounts are stored as grains (base units) internally for precision,
//! with convenient conversion to/from KILN (decimal) representation.
//! All fee arithmetic is integer-only; see [`Amount::fee_bps`].

use crate::error::{CoreError, Result};
use crate::{BPS_DENOMINATOR, GRAINS_PER_KILN};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// An amount of KILN tokens.
///
/// Internally stored as grains (1 KILN = 10^9 grains) for precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Amount {
    grains: u64,
}

impl Amount {
    /// Zero KILN.
    pub const ZERO: Self = Self { grains: 0 };

    /// Maximum amount (`u64::MAX` grains).
    pub const MAX: Self = Self { grains: u64::MAX };

    /// Create an amount from grains (base units).
    #[must_use]
    pub const fn from_grains(grains: u64) -> Self {
        Self { grains }
    }

    /// Create an amount from KILN (decimal representation).
    ///
    /// # Panics
    ///
    /// Panics if the amount is negative.
    #[must_use]
    pub fn kiln(amount: f64) -> Self {
        assert!(amount >= 0.0, "amount must be non-negative");
        let grains = (amount * GRAINS_PER_KILN as f64).round() as u64;
        Self { grains }
    }

    /// Try to create an amount from KILN.
    ///
    /// # Errors
    ///
    /// Returns error if amount is negative.
    pub fn try_kiln(amount: f64) -> Result<Self> {
        if amount < 0.0 {
            return Err(CoreError::InvalidAmount(
                "amount must be non-negative".to_string(),
            ));
        }
        Ok(Self::kiln(amount))
    }

    /// Get the amount in grains.
    #[must_use]
    pub const fn grains(&self) -> u64 {
        self.grains
    }

    /// Get the amount in KILN (decimal).
    #[must_use]
    pub fn as_kiln(&self) -> f64 {
        self.grains as f64 / GRAINS_PER_KILN as f64
    }

    /// Check if the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.grains == 0
    }

    /// Compute a fee in basis points of this amount, rounded down.
    ///
    /// The result is `floor(grains * bps / 10_000)`, computed in `u128`
    /// so the intermediate product cannot overflow. This is the single
    /// rounding rule used for all platform fees: 100 grains at 250 bps
    /// (2.5%) yields a fee of 2 grains.
    #[must_use]
    pub const fn fee_bps(&self, bps: u32) -> Self {
        let fee = self.grains as u128 * bps as u128 / BPS_DENOMINATOR as u128;
        // bps values in practice are far below 10_000, so the floor fits u64;
        // saturate anyway rather than truncate.
        if fee > u64::MAX as u128 {
            Self::MAX
        } else {
            Self {
                grains: fee as u64,
            }
        }
    }

    /// Saturating addition.
    #[must_use]
    pub const fn saturating_add(&self, other: Self) -> Self {
        Self {
            grains: self.grains.saturating_add(other.grains),
        }
    }

    /// Saturating subtraction.
    #[must_use]
    pub const fn saturating_sub(&self, other: Self) -> Self {
        Self {
            grains: self.grains.saturating_sub(other.grains),
        }
    }

    /// Checked addition.
    #[must_use]
    pub const fn checked_add(&self, other: Self) -> Option<Self> {
        match self.grains.checked_add(other.grains) {
            Some(grains) => Some(Self { grains }),
            None => None,
        }
    }

    /// Checked subtraction.
    #[must_use]
    pub const fn checked_sub(&self, other: Self) -> Option<Self> {
        match self.grains.checked_sub(other.grains) {
            Some(grains) => Some(Self { grains }),
            None => None,
        }
    }
}

impl Default for Amount {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.9} KILN", self.as_kiln())
    }
}

impl Add for Amount {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            grains: self.grains + other.grains,
        }
    }
}

impl Sub for Amount {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            grains: self.grains - other.grains,
        }
    }
}

impl From<u64> for Amount {
    fn from(grains: u64) -> Self {
        Self::from_grains(grains)
    }
}
