//! Error handling for FAAS
//!
//! This module provides the error types and user-friendly error reporting for the
//! Factorio server manager. The error system is built around two ideas:
//! 1. **Strongly-typed errors** ([`FaasError`]) so callers can tell failure kinds apart
//! 2. **User-friendly messages** ([`ErrorContext`]) with details and a suggestion for the CLI
//!
//! # Error Categories
//!
//! - **Configuration**: [`FaasError::ConfigNotFound`], [`FaasError::ConfigInvalid`]
//! - **Network**: [`FaasError::NetworkUnreachable`], [`FaasError::ReleaseIndexEmpty`]
//! - **Installation**: [`FaasError::ExtractionFailed`], [`FaasError::InstallPathNotDirectory`]
//! - **Service management**: [`FaasError::PrivilegeRequired`], [`FaasError::ProcessControlFailed`]
//! - **Preconditions**: missing binary, save file, settings file, systemd or user
//!
//! Every category maps to a process exit code through [`FaasError::exit_code`], so a
//! cron job or wrapper script can react to the kind of failure without parsing output.
//!
//! # Examples
//!
//! ```rust,no_run
//! use faas::core::{FaasError, user_friendly_error};
//!
//! let error = anyhow::Error::from(FaasError::PrivilegeRequired {
//!     operation: "create the systemd service".to_string(),
//! });
//! let context = user_friendly_error(error);
//! context.display();
//! std::process::exit(context.error.exit_code());
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// Exit code for failures without a more specific category.
pub const EXIT_GENERIC: i32 = 1;
/// Exit code for a missing or invalid configuration file.
pub const EXIT_CONFIG: i32 = 2;
/// Exit code when the release index or artifact cannot be fetched.
pub const EXIT_NETWORK: i32 = 3;
/// Exit code when the release archive cannot be unpacked.
pub const EXIT_EXTRACTION: i32 = 4;
/// Exit code when systemd rejects a start/stop request.
pub const EXIT_PROCESS_CONTROL: i32 = 5;
/// Exit code when root permissions are required but missing.
pub const EXIT_PRIVILEGE: i32 = 13;

/// Errors produced by FAAS operations.
///
/// All fields are plain strings so the enum stays `Clone` and can be rebuilt into
/// an [`ErrorContext`] after being downcast out of an [`anyhow::Error`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FaasError {
    /// The configuration file does not exist
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// Path that was looked up
        path: String,
    },

    /// The configuration file exists but is unreadable, malformed, or misses a required key
    #[error("Invalid configuration in {path}: {reason}")]
    ConfigInvalid {
        /// Path of the configuration file
        path: String,
        /// What is wrong with it
        reason: String,
    },

    /// A remote page or artifact could not be fetched
    #[error("Unable to reach {url}: {reason}")]
    NetworkUnreachable {
        /// The URL that failed
        url: String,
        /// Transport error or HTTP status
        reason: String,
    },

    /// The release index page was fetched but lists no release
    #[error("No available version found on {url}")]
    ReleaseIndexEmpty {
        /// The index page URL
        url: String,
    },

    /// `tar` exited with a failure while unpacking a release
    #[error("Error during archive extraction into {target}")]
    ExtractionFailed {
        /// The directory being extracted into
        target: String,
        /// Output of the extraction command
        stderr: String,
    },

    /// The operation needs root permissions
    #[error("Root permissions are required to {operation}")]
    PrivilegeRequired {
        /// The operation that was attempted
        operation: String,
    },

    /// systemd refused a start or stop request
    #[error("Unable to {action} {service}")]
    ProcessControlFailed {
        /// `start`, `stop` or `daemon-reload`
        action: String,
        /// The unit name
        service: String,
        /// Output of the systemctl command
        stderr: String,
    },

    /// A required external command is not installed
    #[error("Command '{command}' is not installed or not found in PATH")]
    CommandNotFound {
        /// Name of the missing executable
        command: String,
    },

    /// The install path exists but is a file
    #[error("Path {path} already exists and is not a directory")]
    InstallPathNotDirectory {
        /// The configured install path
        path: String,
    },

    /// The server binary is missing or not executable
    #[error("File \"{path}\" does not exist or is not executable")]
    BinaryNotFound {
        /// Expected binary location
        path: String,
    },

    /// The configured save file does not exist
    #[error("Unable to find save file at: {path}")]
    SaveFileNotFound {
        /// The configured save path
        path: String,
    },

    /// The configured server settings file does not exist
    #[error("Unable to find settings file at: {path}")]
    SettingsFileNotFound {
        /// The configured settings path
        path: String,
    },

    /// The host has no systemd unit directory
    #[error("Your system seems not compatible with systemd ({path} is missing)")]
    SystemdUnavailable {
        /// The unit directory that was checked
        path: String,
    },

    /// The configured OS user does not exist
    #[error("User \"{user}\" does not exist")]
    UserNotFound {
        /// The configured user name
        user: String,
    },

    /// Anything else, with the full message
    #[error("{message}")]
    Other {
        /// Error message, including its cause chain
        message: String,
    },
}

impl FaasError {
    /// Process exit code for this error kind.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::ConfigNotFound { .. } | Self::ConfigInvalid { .. } => EXIT_CONFIG,
            Self::NetworkUnreachable { .. } | Self::ReleaseIndexEmpty { .. } => EXIT_NETWORK,
            Self::ExtractionFailed { .. } => EXIT_EXTRACTION,
            Self::ProcessControlFailed { .. } => EXIT_PROCESS_CONTROL,
            Self::PrivilegeRequired { .. } => EXIT_PRIVILEGE,
            _ => EXIT_GENERIC,
        }
    }
}

/// An error paired with optional details and a suggestion for the user.
///
/// This is what the CLI prints when a command fails. Build one with
/// [`ErrorContext::new`] and the `with_*` methods, or let [`user_friendly_error`]
/// derive it from any [`anyhow::Error`].
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: FaasError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a context with no suggestion or details.
    #[must_use]
    pub const fn new(error: FaasError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add an actionable suggestion, shown in green.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error, shown in yellow.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error, details and suggestion to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] suitable for CLI display.
///
/// [`FaasError`]s are recognised anywhere in the context chain and get tailored
/// suggestions. I/O permission errors get a hint about directory ownership.
/// Everything else becomes [`FaasError::Other`] carrying the full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(faas_error) = error.downcast_ref::<FaasError>() {
        return create_error_context(faas_error.clone());
    }

    let permission_denied = error
        .downcast_ref::<std::io::Error>()
        .is_some_and(|e| e.kind() == std::io::ErrorKind::PermissionDenied);
    if permission_denied {
        return ErrorContext::new(FaasError::Other {
            message: format_chain(&error),
        })
        .with_suggestion("Check the ownership of the Factorio directory or run with sudo")
        .with_details(
            "Extraction and file writes commonly fail because the install path belongs to another user",
        );
    }

    ErrorContext::new(FaasError::Other {
        message: format_chain(&error),
    })
}

fn format_chain(error: &anyhow::Error) -> String {
    let mut message = error.to_string();
    let chain: Vec<String> =
        error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }
    message
}

fn create_error_context(error: FaasError) -> ErrorContext {
    match &error {
        FaasError::ConfigNotFound { .. } => ErrorContext::new(error)
            .with_suggestion("Create the file or point to it with --config <PATH> (or FAAS_CONFIG)")
            .with_details("By default faas reads config.toml next to its executable"),

        FaasError::ConfigInvalid { .. } => ErrorContext::new(error)
            .with_suggestion("Check that factorio-path, save-path and user are set and the TOML syntax is valid"),

        FaasError::NetworkUnreachable { .. } | FaasError::ReleaseIndexEmpty { .. } => {
            ErrorContext::new(error)
                .with_suggestion("Check your internet connection and the [website] settings, then run the update again")
                .with_details("Nothing was changed on disk; the update was aborted before downloading")
        }

        FaasError::ExtractionFailed { stderr, .. } => {
            let details = stderr.trim().to_string();
            ErrorContext::new(error)
                .with_suggestion("This is commonly a permissions problem: make sure the configured user owns the Factorio directory")
                .with_details(details)
        }

        FaasError::PrivilegeRequired { .. } => ErrorContext::new(error)
            .with_suggestion("Run the command again with sudo"),

        FaasError::ProcessControlFailed { stderr, .. } => {
            let details = stderr.trim().to_string();
            ErrorContext::new(error)
                .with_suggestion("Inspect the service with 'systemctl status' and 'journalctl -u'")
                .with_details(details)
        }

        FaasError::CommandNotFound { command } => {
            let suggestion = format!("Install '{command}' with your package manager");
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        FaasError::BinaryNotFound { .. } => ErrorContext::new(error)
            .with_suggestion("Run 'faas update' first to install the server, or check factorio-path and bin-path"),

        FaasError::UserNotFound { .. } => ErrorContext::new(error)
            .with_suggestion("Create the user with 'useradd' or change the user key in the configuration"),

        _ => ErrorContext::new(error),
    }
}
