//! Installation of the systemd unit and its sudoers rules.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::control::ServiceControl;
use super::unit::render_unit;
use super::{SUDOERS_DIR, SUDOERS_FILE_NAME, SYSTEMD_UNIT_DIR};
use crate::config::ServerConfig;
use crate::core::FaasError;
use crate::utils::platform::{is_root, user_exists};

/// Writes the unit file for the configured server and registers it.
///
/// Every precondition is checked before anything is written: without root
/// permissions, a systemd unit directory, the server binary, the save file (and
/// settings file when configured) and the service user, the writer fails and
/// leaves the host untouched.
pub struct ServiceDefinitionWriter<'a, S: ServiceControl> {
    config: &'a ServerConfig,
    control: &'a S,
    unit_dir: PathBuf,
    sudoers_dir: PathBuf,
    privileged: Option<bool>,
}

impl<'a, S: ServiceControl> ServiceDefinitionWriter<'a, S> {
    /// Writer targeting the standard system locations.
    pub fn new(config: &'a ServerConfig, control: &'a S) -> Self {
        Self {
            config,
            control,
            unit_dir: PathBuf::from(SYSTEMD_UNIT_DIR),
            sudoers_dir: PathBuf::from(SUDOERS_DIR),
            privileged: None,
        }
    }

    /// Write unit files into `dir` instead of `/etc/systemd/system`.
    #[must_use]
    pub fn with_unit_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.unit_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Write sudoers rules into `dir` instead of `/etc/sudoers.d`.
    #[must_use]
    pub fn with_sudoers_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.sudoers_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Override the effective-uid check.
    #[must_use]
    pub const fn with_privileged(mut self, privileged: bool) -> Self {
        self.privileged = Some(privileged);
        self
    }

    /// Path the unit file is written to.
    #[must_use]
    pub fn unit_path(&self) -> PathBuf {
        self.unit_dir.join(&self.config.service_name)
    }

    /// Path the sudoers rules are written to.
    #[must_use]
    pub fn sudoers_path(&self) -> PathBuf {
        self.sudoers_dir.join(SUDOERS_FILE_NAME)
    }

    /// Check preconditions, write the unit and sudoers rules, reload systemd and
    /// start the service.
    ///
    /// # Errors
    ///
    /// Everything [`Self::install`] reports, and
    /// [`FaasError::ProcessControlFailed`] if the final start is refused.
    pub async fn create(&self) -> Result<()> {
        self.install().await?;
        self.start().await
    }

    /// Check preconditions, write the unit and sudoers rules and reload
    /// systemd, leaving the service stopped.
    ///
    /// # Errors
    ///
    /// - [`FaasError::PrivilegeRequired`] when not running as root
    /// - [`FaasError::SystemdUnavailable`] when the unit directory is missing
    /// - [`FaasError::BinaryNotFound`], [`FaasError::SaveFileNotFound`],
    ///   [`FaasError::SettingsFileNotFound`], [`FaasError::UserNotFound`] for
    ///   missing prerequisites
    /// - I/O errors while writing
    pub async fn install(&self) -> Result<()> {
        self.check_preconditions()?;

        if let Err(e) = self.control.stop(&self.config.service_name).await {
            warn!("Unable to stop {}: {:#}", self.config.service_name, e);
        }

        self.write_unit()?;
        self.write_sudoers_rules()?;

        if let Err(e) = self.control.daemon_reload().await {
            debug!("{:#}", e);
            eprintln!("{}", "Unable to restart systemctl daemon, continuing anyway ...".yellow());
            eprintln!("Please consider running 'systemctl daemon-reload' to reload units");
        }
        Ok(())
    }

    /// Start the configured service.
    ///
    /// # Errors
    ///
    /// [`FaasError::ProcessControlFailed`] if systemd refuses.
    pub async fn start(&self) -> Result<()> {
        self.control.start(&self.config.service_name).await
    }

    fn check_preconditions(&self) -> Result<()> {
        let privileged = self.privileged.unwrap_or_else(is_root);
        if !privileged {
            return Err(FaasError::PrivilegeRequired {
                operation: "create the systemd service".to_string(),
            }
            .into());
        }
        debug!("You have root permissions");

        if !self.unit_dir.is_dir() {
            return Err(FaasError::SystemdUnavailable {
                path: self.unit_dir.display().to_string(),
            }
            .into());
        }

        if !self.config.bin_path.is_file() {
            return Err(FaasError::BinaryNotFound {
                path: self.config.bin_path.display().to_string(),
            }
            .into());
        }

        if !self.config.save_path.is_file() {
            return Err(FaasError::SaveFileNotFound {
                path: self.config.save_path.display().to_string(),
            }
            .into());
        }

        match &self.config.settings_path {
            Some(settings) if !settings.is_file() => {
                return Err(FaasError::SettingsFileNotFound {
                    path: settings.display().to_string(),
                }
                .into());
            }
            Some(_) => {}
            None => debug!("No settings file specified"),
        }

        if !user_exists(&self.config.user) {
            return Err(FaasError::UserNotFound {
                user: self.config.user.clone(),
            }
            .into());
        }

        Ok(())
    }

    fn write_unit(&self) -> Result<()> {
        let unit = render_unit(self.config)?;
        let path = self.unit_path();
        debug!("Creating service file at: {}", path.display());
        std::fs::write(&path, unit)
            .with_context(|| format!("Failed to write service file {}", path.display()))
    }

    fn write_sudoers_rules(&self) -> Result<()> {
        let path = self.sudoers_path();
        debug!("Adding rules in sudoers to allow all users to use service at: {}", path.display());
        std::fs::write(&path, sudoers_rules(&self.config.service_name))
            .with_context(|| format!("Failed to write sudoers rules {}", path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o440))
                .with_context(|| format!("Failed to change mode of {}", path.display()))?;
        }
        Ok(())
    }
}

/// Rules letting any user start, query and stop `service` through sudo.
#[must_use]
pub fn sudoers_rules(service: &str) -> String {
    ["start", "status", "stop"]
        .iter()
        .map(|action| format!("ALL ALL=(ALL) NOPASSWD: /bin/systemctl {action} {service}\n"))
        .collect()
}
