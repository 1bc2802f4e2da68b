//! # kiln-reputation
//!
//! Reputation registry for KILN marketplace participants.
//!
//! This crate provides:
//!
//! - [`ReputationRecord`] — Per-identity score, role flags, and job counters
//! - [`ReputationRegistry`] — Registration, peer ratings, job-outcome updates
//! - [`JobOutcomePolicy`] — Pluggable score deltas for job outcomes
//!
//! Scores live in `[0, 1000]` with 500 as the neutral starting point.
//! Peer ratings move a score by `(stars - 3) * 20`; job outcomes move it
//! by policy-defined deltas. Only the configured reputation manager (the
//! escrow service) may record job outcomes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod policy;
pub mod record;
pub mod registry;

pub use error::{ReputationError, Result};
pub use policy::{FixedDeltaPolicy, JobOutcomePolicy, OutcomeDeltas};
pub use record::{ReputationRecord, DEFAULT_SCORE, MAX_SCORE, MIN_SCORE};
pub use registry::ReputationRegistry;
