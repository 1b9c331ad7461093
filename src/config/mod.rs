//! Configuration management for FAAS.
//!
//! FAAS reads a single TOML file describing the managed server:
//!
//! | Key | Required | Default |
//! |-----|----------|---------|
//! | `factorio-path` | yes | |
//! | `save-path` | yes | |
//! | `user` | yes | |
//! | `service-name` | no | `factorio.service` |
//! | `bin-path` | no | `bin/x64/factorio` |
//! | `experimental` | no | `false` |
//! | `settings-path` | no | none |
//! | `[website]` | no | `https://www.factorio.com` pages |
//!
//! **Location:** `--config <PATH>`, then the `FAAS_CONFIG` environment
//! variable, then `config.toml` next to the `faas` executable.
//!
//! The file is loaded once at startup and validated before any network or file
//! operation runs; a missing required key aborts the command with
//! [`FaasError::ConfigInvalid`](crate::core::FaasError::ConfigInvalid).

pub mod server;

pub use server::{DEFAULT_CONFIG_FILE, ServerConfig, WebsiteConfig};
