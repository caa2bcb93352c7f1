//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`domain`] - Builders for wanted items, listings and problems.
//! - [`config`] - Canonical optimizer configurations for fast, seeded runs.

pub mod config;
pub mod domain;
