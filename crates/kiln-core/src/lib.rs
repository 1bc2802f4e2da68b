//! # kiln-core
//!
//! KILN token primitives for the pay-per-job compute marketplace.
//!
//! This crate provides:
//! - [`Amount`] — Token amount with fixed-point precision and basis-point fee math
//! - [`Address`] / [`Wallet`] — Ed25519 identities with base58 addresses
//! - [`CoreError`] — Shared error type for primitive operations
//!
//! ## Token Details
//!
//! - **Name**: KILN
//! - **Decimals**: 9 (1 KILN = `1_000_000_000` grains)
//! - **Use**: Payment for compute jobs on the KILN network

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod amount;
pub mod error;
pub mod identity;

pub use amount::Amount;
pub use error::{CoreError, Result};
pub use identity::{Address, Wallet};

/// KILN token decimals.
pub const KILN_DECIMALS: u8 = 9;

/// One KILN in base units (grains).
pub const GRAINS_PER_KILN: u64 = 1_000_000_000;

/// Basis points in one whole (100%).
pub const BPS_DENOMINATOR: u64 = 10_000;
