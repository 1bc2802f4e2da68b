//! # kiln-escrow
//!
//! Job escrow for the KILN pay-per-job compute marketplace.
//!
//! This crate provides:
//!
//! - [`Job`] / [`JobStatus`] — The job lifecycle state machine
//! - [`Dispute`] — Third-party arbitration over completed jobs
//! - [`JobEscrow`] — The command surface tying ledger, reputation, and jobs together
//! - [`JobEvent`] — Broadcast notifications for each successful transition
//!
//! Funds are locked in the escrow vault before work starts, released only
//! through well-defined transitions, refunded on early cancellation, and
//! disputes resolve to exactly one winner. Every command commits fully or
//! leaves every balance, job, dispute, and reputation record unchanged.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod dispute;
pub mod error;
pub mod event;
pub mod job;
pub mod market;

pub use config::EscrowConfig;
pub use dispute::{Dispute, DisputeId};
pub use error::{ErrorKind, EscrowError, Result};
pub use event::JobEvent;
pub use job::{Job, JobId, JobStatus};
pub use market::JobEscrow;
