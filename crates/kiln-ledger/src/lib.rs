//! # kiln-ledger
//!
//! Fungible balance accounting for the KILN compute marketplace.
//!
//! This crate provides:
//!
//! - [`Account`] — Per-identity balance and minter flag
//! - [`Ledger`] — Atomic debits, credits, transfers, and controlled minting
//!
//! Every mutating operation either commits fully or leaves every balance
//! unchanged. Multi-leg movements ([`Ledger::transfer`],
//! [`Ledger::disburse`]) hold a single write lock for their whole duration,
//! so no observer ever sees a half-applied movement.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod account;
pub mod error;
pub mod ledger;

pub use account::Account;
pub use error::{LedgerError, Result};
pub use ledger::Ledger;
