//! Integration test suite for FAAS
//!
//! End-to-end tests driving the `faas` binary against a release index served
//! from localhost. Nothing here talks to the real download site or systemd.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **config**: configuration loading and validation failures
//! - **service**: `create-service` privilege handling
//! - **update**: the update sequence
//! - **versions**: `local-version` and `latest-version`

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod config;
mod service;
mod update;
mod versions;
