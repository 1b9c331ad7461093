//! Requests to the init system.

use anyhow::Result;
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::SYSTEMD_UNIT_DIR;
use crate::core::FaasError;
use crate::utils::process::ProcessCommand;

/// Start/stop requests for the managed service.
///
/// FAAS never tracks the server process itself; it only asks the init system
/// to change its state. Update and service creation are written against this
/// trait so they can run without systemd.
pub trait ServiceControl: Send + Sync {
    /// Ask the init system to stop `service`.
    fn stop(&self, service: &str) -> impl Future<Output = Result<()>> + Send;

    /// Ask the init system to start `service`.
    fn start(&self, service: &str) -> impl Future<Output = Result<()>> + Send;

    /// Make the init system re-read its unit files.
    fn daemon_reload(&self) -> impl Future<Output = Result<()>> + Send;
}

/// [`ServiceControl`] backed by `systemctl`.
///
/// Start and stop go through `sudo /bin/systemctl` so an unprivileged user
/// allowed by the sudoers rules can update the server. Both are skipped when
/// no unit file exists for the service yet.
#[derive(Debug, Clone)]
pub struct Systemctl {
    unit_dir: PathBuf,
}

impl Default for Systemctl {
    fn default() -> Self {
        Self::new()
    }
}

impl Systemctl {
    /// Controller for units installed in `/etc/systemd/system`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_unit_dir(SYSTEMD_UNIT_DIR)
    }

    /// Controller looking for unit files in `unit_dir`.
    #[must_use]
    pub fn with_unit_dir(unit_dir: impl AsRef<Path>) -> Self {
        Self {
            unit_dir: unit_dir.as_ref().to_path_buf(),
        }
    }

    /// Location of the unit file for `service`.
    #[must_use]
    pub fn unit_path(&self, service: &str) -> PathBuf {
        self.unit_dir.join(service)
    }

    /// Whether a unit file exists for `service`.
    #[must_use]
    pub fn is_installed(&self, service: &str) -> bool {
        self.unit_path(service).is_file()
    }

    async fn request(&self, action: &str, service: &str) -> Result<()> {
        if !self.is_installed(service) {
            debug!("Service is not configured yet (unable to {} it)", action);
            return Ok(());
        }

        let output = ProcessCommand::new("sudo")
            .args(["/bin/systemctl", action, service])
            .with_context(format!("{action} service"))
            .output()
            .await?;

        if output.success {
            Ok(())
        } else {
            Err(FaasError::ProcessControlFailed {
                action: action.to_string(),
                service: service.to_string(),
                stderr: output.stderr.trim().to_string(),
            }
            .into())
        }
    }
}

impl ServiceControl for Systemctl {
    async fn stop(&self, service: &str) -> Result<()> {
        debug!("Stopping service {}...", service);
        self.request("stop", service).await
    }

    async fn start(&self, service: &str) -> Result<()> {
        debug!("Starting service {}...", service);
        self.request("start", service).await
    }

    async fn daemon_reload(&self) -> Result<()> {
        let output = ProcessCommand::new("systemctl")
            .arg("daemon-reload")
            .with_context("reload units")
            .output()
            .await?;

        if output.success {
            debug!("Systemctl daemon reloaded");
            Ok(())
        } else {
            Err(FaasError::ProcessControlFailed {
                action: "daemon-reload".to_string(),
                service: "systemd".to_string(),
                stderr: output.stderr.trim().to_string(),
            }
            .into())
        }
    }
}
