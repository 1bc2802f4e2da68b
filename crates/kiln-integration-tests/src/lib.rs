//! Integration test crate for KILN marketplace components.
//!
//! This crate exists solely to run integration tests that span multiple KILN
//! crates. It has no public API - all functionality is in the test modules.

#![forbid(unsafe_code)]
