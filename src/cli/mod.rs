//! Command-line interface for FAAS (Factorio As A Service).
//!
//! # Available Commands
//!
//! - `update` - Install or update the server to the latest release
//! - `create-service` - Install the systemd unit for the server (root only)
//! - `local-version` - Print the installed server version
//! - `latest-version` - Print the latest published server version
//!
//! # Global Options
//!
//! - `--verbose` - Enable debug output
//! - `--quiet` - Only report errors
//! - `--config <PATH>` - Configuration file (also `FAAS_CONFIG`)
//! - `--experimental` - Follow the experimental channel
//! - `--no-progress` - Hide the download progress bar
//!
//! # Examples
//!
//! ```bash
//! # Hourly cron job keeping the server current
//! faas --quiet --config /opt/faas/config.toml update
//!
//! # One-time setup
//! sudo faas create-service
//!
//! # Inspect versions
//! faas local-version
//! faas --verbose latest-version
//! ```
//!
//! # Logging
//!
//! Logs go to stderr. `RUST_LOG` wins when set; otherwise `--verbose` enables
//! `faas=debug`, `--quiet` limits output to errors, and the default shows
//! warnings.

mod service;
mod update;
mod version;

pub use service::CreateServiceCommand;
pub use update::UpdateCommand;
pub use version::{LatestVersionCommand, LocalVersionCommand};

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

/// Runtime options carried from argument parsing into command execution.
///
/// Tests build one directly to run commands without touching process-wide
/// state.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter used when `RUST_LOG` is not set; `None` keeps logging off.
    pub log_level: Option<String>,

    /// Hide the download progress bar.
    pub no_progress: bool,

    /// Explicit configuration file; defaults to `config.toml` next to the
    /// executable.
    pub config_path: Option<PathBuf>,

    /// Follow the experimental channel regardless of the configuration file.
    pub experimental: bool,

    /// Print extra detail on stdout (the full release listing).
    pub verbose: bool,

    /// Suppress status lines on stdout.
    pub quiet: bool,
}

impl CliConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Path of the configuration file to load.
    #[must_use]
    pub fn resolved_config_path(&self) -> PathBuf {
        self.config_path.clone().unwrap_or_else(ServerConfig::default_path)
    }

    /// Install the global tracing subscriber writing to stderr.
    ///
    /// Does nothing if a subscriber is already installed.
    pub fn init_logging(&self) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(self.log_level.as_deref().unwrap_or("off"))
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Everything a command needs once the configuration file is loaded.
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Validated server configuration
    pub server: ServerConfig,
    /// Experimental channel requested by the file or the command line
    pub experimental: bool,
    /// Show the download progress bar
    pub show_progress: bool,
    /// Verbose stdout output
    pub verbose: bool,
    /// Quiet stdout output
    pub quiet: bool,
}

impl CommandContext {
    /// Load the configuration file named by `config`.
    ///
    /// # Errors
    ///
    /// Configuration errors from [`ServerConfig::load`].
    pub async fn load(config: &CliConfig) -> Result<Self> {
        let server = ServerConfig::load(&config.resolved_config_path()).await?;
        let experimental = server.experimental || config.experimental;
        Ok(Self {
            server,
            experimental,
            show_progress: !config.no_progress && !config.quiet,
            verbose: config.verbose,
            quiet: config.quiet,
        })
    }
}

/// Factorio As A Service - keep a headless Factorio server up to date.
#[derive(Parser)]
#[command(
    name = "faas",
    about = "Factorio As A Service - manage a headless Factorio server on Linux",
    version,
    long_about = "FAAS installs and updates a headless Factorio server from the official \
                  download pages and runs it as a systemd service."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only report errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file [default: config.toml next to the executable]
    #[arg(short, long, global = true, env = "FAAS_CONFIG")]
    config: Option<PathBuf>,

    /// Use the experimental releases instead of stable ones
    #[arg(short = 'x', long, global = true)]
    experimental: bool,

    /// Hide the download progress bar
    #[arg(long, global = true)]
    no_progress: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Install or update the server if a new release is available
    Update(UpdateCommand),

    /// Configure the server as a systemd service (requires root)
    CreateService(CreateServiceCommand),

    /// Print the version of the installed server
    LocalVersion(LocalVersionCommand),

    /// Print the latest available server version
    LatestVersion(LatestVersionCommand),
}

impl Cli {
    /// Parse-time options turned into a [`CliConfig`], then executed.
    ///
    /// # Errors
    ///
    /// Any error from loading the configuration or running the command.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Build the runtime configuration from the parsed flags.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "faas=debug"
        } else if self.quiet {
            "error"
        } else {
            "faas=warn"
        };

        CliConfig {
            log_level: Some(log_level.to_string()),
            no_progress: self.no_progress,
            config_path: self.config.clone(),
            experimental: self.experimental,
            verbose: self.verbose,
            quiet: self.quiet,
        }
    }

    /// Run the selected command with an explicit runtime configuration.
    ///
    /// The configuration file is loaded and validated before the command
    /// touches the network or the filesystem.
    ///
    /// # Errors
    ///
    /// Any error from loading the configuration or running the command.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();
        let ctx = CommandContext::load(&config).await?;

        match self.command {
            Commands::Update(cmd) => cmd.execute(&ctx).await,
            Commands::CreateService(cmd) => cmd.execute(&ctx).await,
            Commands::LocalVersion(cmd) => cmd.execute(&ctx).await,
            Commands::LatestVersion(cmd) => cmd.execute(&ctx).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FaasError;
    use tempfile::TempDir;

    #[test]
    fn test_build_config_levels() {
        let cli = Cli::parse_from(["faas", "--verbose", "update"]);
        let config = cli.build_config();
        assert_eq!(config.log_level.as_deref(), Some("faas=debug"));
        assert!(config.verbose);

        let cli = Cli::parse_from(["faas", "update", "--quiet", "--no-progress"]);
        let config = cli.build_config();
        assert_eq!(config.log_level.as_deref(), Some("error"));
        assert!(config.quiet);
        assert!(config.no_progress);

        let cli = Cli::parse_from(["faas", "-x", "-c", "/etc/faas.toml", "latest-version"]);
        let config = cli.build_config();
        assert_eq!(config.log_level.as_deref(), Some("faas=warn"));
        assert!(config.experimental);
        assert_eq!(config.config_path, Some(PathBuf::from("/etc/faas.toml")));
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["faas", "-v", "-q", "update"]).is_err());
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["faas"]).is_err());
    }

    #[tokio::test]
    async fn test_context_merges_experimental_flag() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "factorio-path = \"f\"\nsave-path = \"s.zip\"\nuser = \"factorio\"\n")
            .unwrap();

        let mut config = CliConfig::new();
        config.config_path = Some(path);
        let ctx = CommandContext::load(&config).await.unwrap();
        assert!(!ctx.experimental);
        assert!(ctx.show_progress);

        config.experimental = true;
        config.quiet = true;
        let ctx = CommandContext::load(&config).await.unwrap();
        assert!(ctx.experimental);
        assert!(!ctx.show_progress);
    }

    #[tokio::test]
    async fn test_missing_config_fails_before_command() {
        let temp = TempDir::new().unwrap();
        let cli = Cli::parse_from(["faas", "update"]);
        let mut config = cli.build_config();
        config.config_path = Some(temp.path().join("absent.toml"));

        let err = cli.execute_with_config(config).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FaasError>(),
            Some(FaasError::ConfigNotFound { .. })
        ));
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
    }
}
