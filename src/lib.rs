//! FAAS - Factorio As A Service
//!
//! Keeps a headless Factorio server on a Linux host up to date and runs it as a
//! systemd service.
//!
//! # Architecture Overview
//!
//! A single TOML file describes the managed server. From there:
//! - the **version resolver** reads the installed release from the server
//!   binary and the latest release from the official download page
//! - the **updater** downloads and unpacks a new release when the two differ,
//!   stopping and starting the service around the swap
//! - the **service writer** renders the systemd unit and installs it together
//!   with sudoers rules allowing unprivileged updates
//!
//! Every step runs in sequence; nothing is retried and nothing is rolled back.
//!
//! # Core Modules
//!
//! - [`cli`] - Command-line interface (`update`, `create-service`,
//!   `local-version`, `latest-version`)
//! - [`config`] - Configuration file loading and validation
//! - [`core`] - Error types and user-facing error reporting
//! - [`release`] - Release identifiers, index page parsing, version resolution
//! - [`installer`] - Artifact download, extraction and the update sequence
//! - [`service`] - systemd unit rendering, installation and service control
//! - [`utils`] - Path resolution, host queries, process execution, progress
//!
//! # Example
//!
//! ```rust,no_run
//! use faas::config::ServerConfig;
//! use faas::installer::Updater;
//! use faas::release::VersionResolver;
//! use faas::service::Systemctl;
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServerConfig::load(Path::new("/opt/faas/config.toml")).await?;
//! let resolver = VersionResolver::new(config.website.clone(), config.experimental)?;
//! let control = Systemctl::new();
//!
//! let outcome = Updater::new(&config, &resolver, &control).run().await?;
//! println!("{outcome}");
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod installer;
pub mod release;
pub mod service;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
