//! Server installation and updates.
//!
//! An update runs strictly in sequence:
//!
//! 1. make sure the install directory exists
//! 2. resolve the latest published release, then the installed one
//! 3. if they are equal, stop here without touching anything
//! 4. make sure `tar` is available, before the server goes down
//! 5. stop the service (best effort)
//! 6. download the release archive into a temporary file
//! 7. unpack it over the install directory
//! 8. start the service
//!
//! Nothing is rolled back when a step fails. The save file lives outside the
//! install directory, so unpacking a release never touches it.

pub mod archive;

pub use archive::{
    TAR, download_artifact, extract_archive, extract_archive_with, require_extractor,
};

use anyhow::{Context, Result};
use std::fmt;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::core::FaasError;
use crate::release::{ReleaseVersion, VersionResolver, is_update_needed, local_release};
use crate::service::ServiceControl;

/// What an update run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The installed release already matches the latest one
    UpToDate(ReleaseVersion),
    /// A release was downloaded and unpacked
    Updated {
        /// Identifier installed before the update, if any
        previous: Option<ReleaseVersion>,
        /// Identifier installed now
        installed: ReleaseVersion,
    },
}

impl fmt::Display for UpdateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UpToDate(_) => write!(f, "No update required"),
            Self::Updated {
                ..
            } => write!(f, "Server updated successfully!"),
        }
    }
}

/// Brings the installation in line with the latest published release.
pub struct Updater<'a, S: ServiceControl> {
    config: &'a ServerConfig,
    resolver: &'a VersionResolver,
    control: &'a S,
    show_progress: bool,
    extractor: &'a str,
}

impl<'a, S: ServiceControl> Updater<'a, S> {
    /// Create an updater with the download progress bar enabled.
    pub const fn new(config: &'a ServerConfig, resolver: &'a VersionResolver, control: &'a S) -> Self {
        Self {
            config,
            resolver,
            control,
            show_progress: true,
            extractor: TAR,
        }
    }

    /// Show or hide the download progress bar.
    #[must_use]
    pub const fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Unpack releases with `program` instead of `tar`.
    #[must_use]
    pub const fn with_extractor(mut self, program: &'a str) -> Self {
        self.extractor = program;
        self
    }

    /// Run the update sequence.
    ///
    /// # Errors
    ///
    /// - [`FaasError::InstallPathNotDirectory`] if the install path is a file
    /// - network errors from the release index or the artifact download
    /// - [`FaasError::CommandNotFound`] if `tar` is missing; the service is
    ///   left running
    /// - [`FaasError::ExtractionFailed`] if the archive cannot be unpacked
    /// - [`FaasError::ProcessControlFailed`] if the service refuses to start
    pub async fn run(&self) -> Result<UpdateOutcome> {
        ensure_install_dir(&self.config.factorio_path)?;

        let latest = self.resolver.latest_release().await?;
        let local = local_release(&self.config.bin_path).await?;

        if !is_update_needed(local.as_ref(), &latest.version) {
            debug!("Local version is up-to-date");
            return Ok(UpdateOutcome::UpToDate(latest.version));
        }
        info!(
            "Updating {} from {} to {}",
            self.config.factorio_path.display(),
            local.as_ref().map_or_else(|| "nothing".to_string(), ToString::to_string),
            latest.version
        );
        require_extractor(self.extractor)?;

        if let Err(e) = self.control.stop(&self.config.service_name).await {
            warn!("Unable to stop {}: {:#}", self.config.service_name, e);
        }

        let url = self.resolver.website().artifact_url(&latest.path);
        let archive = download_artifact(self.resolver.client(), &url, self.show_progress).await?;
        extract_archive_with(self.extractor, archive.path(), &self.config.factorio_path).await?;
        drop(archive);
        debug!("Archive deleted");

        self.control.start(&self.config.service_name).await?;

        Ok(UpdateOutcome::Updated {
            previous: local,
            installed: latest.version,
        })
    }
}

/// Create the install directory if needed.
///
/// # Errors
///
/// [`FaasError::InstallPathNotDirectory`] if something other than a directory
/// already exists at `path`, or an I/O error if it cannot be created.
pub fn ensure_install_dir(path: &Path) -> Result<()> {
    if path.exists() {
        if !path.is_dir() {
            return Err(FaasError::InstallPathNotDirectory {
                path: path.display().to_string(),
            }
            .into());
        }
        return Ok(());
    }

    debug!("Directory does not exist");
    std::fs::create_dir_all(path)
        .with_context(|| format!("Failed to create directory {}", path.display()))?;
    debug!("Directory created: {}", path.display());
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::config::WebsiteConfig;
    use crate::test_utils::{
        RecordingControl, ReleaseServer, build_release_archive, init_test_logging,
        write_fake_server_binary,
    };
    use tempfile::TempDir;

    struct Fixture {
        temp: TempDir,
        config: ServerConfig,
        resolver: VersionResolver,
        server: ReleaseServer,
    }

    fn fixture(versions: &[&str]) -> Fixture {
        init_test_logging(None);
        let temp = TempDir::new().unwrap();
        let archive = build_release_archive(temp.path(), versions[0]);
        let server = ReleaseServer::start(versions, archive);

        let saves = temp.path().join("saves");
        std::fs::create_dir_all(&saves).unwrap();
        std::fs::write(saves.join("fsave.zip"), b"precious save").unwrap();

        let config = ServerConfig::parse(
            "factorio-path = \"factorio\"\nsave-path = \"saves/fsave.zip\"\nuser = \"factorio\"\n",
            temp.path(),
            &temp.path().join("config.toml"),
        )
        .unwrap();
        let website = WebsiteConfig {
            base_url: server.base_url().to_string(),
            ..WebsiteConfig::default()
        };
        let resolver = VersionResolver::new(website, false).unwrap();

        Fixture {
            temp,
            config,
            resolver,
            server,
        }
    }

    #[tokio::test]
    async fn test_fresh_install() {
        let fx = fixture(&["1.1.110", "1.1.109"]);
        let control = RecordingControl::default();

        let outcome =
            Updater::new(&fx.config, &fx.resolver, &control).with_progress(false).run().await.unwrap();

        assert_eq!(
            outcome,
            UpdateOutcome::Updated {
                previous: None,
                installed: ReleaseVersion::extract("1.1.110").unwrap(),
            }
        );
        assert_eq!(outcome.to_string(), "Server updated successfully!");
        let installed = local_release(&fx.config.bin_path).await.unwrap();
        assert_eq!(installed.unwrap().as_str(), "1.1.110");
        assert_eq!(control.calls(), vec!["stop factorio.service", "start factorio.service"]);
        assert_eq!(
            std::fs::read(fx.temp.path().join("saves/fsave.zip")).unwrap(),
            b"precious save"
        );
    }

    #[tokio::test]
    async fn test_up_to_date_touches_nothing() {
        let fx = fixture(&["1.1.110"]);
        write_fake_server_binary(&fx.config.factorio_path, "bin/x64/factorio", "1.1.110");
        let control = RecordingControl::default();

        let outcome =
            Updater::new(&fx.config, &fx.resolver, &control).with_progress(false).run().await.unwrap();

        assert!(matches!(outcome, UpdateOutcome::UpToDate(_)));
        assert_eq!(outcome.to_string(), "No update required");
        assert_eq!(fx.server.archive_requests(), 0);
        assert!(control.calls().is_empty());
        assert!(!fx.config.factorio_path.join("data").exists());
    }

    #[tokio::test]
    async fn test_second_run_is_noop() {
        let fx = fixture(&["2.0.7"]);
        let control = RecordingControl::default();
        let updater = Updater::new(&fx.config, &fx.resolver, &control).with_progress(false);

        assert!(matches!(updater.run().await.unwrap(), UpdateOutcome::Updated { .. }));
        assert!(matches!(updater.run().await.unwrap(), UpdateOutcome::UpToDate(_)));
        assert_eq!(fx.server.archive_requests(), 1);
    }

    #[tokio::test]
    async fn test_stop_failure_does_not_abort() {
        let fx = fixture(&["1.1.110"]);
        let control = RecordingControl::failing_on("stop");

        let outcome =
            Updater::new(&fx.config, &fx.resolver, &control).with_progress(false).run().await.unwrap();
        assert!(matches!(outcome, UpdateOutcome::Updated { .. }));
    }

    #[tokio::test]
    async fn test_start_failure_is_process_control_error() {
        let fx = fixture(&["1.1.110"]);
        let control = RecordingControl::failing_on("start");

        let err = Updater::new(&fx.config, &fx.resolver, &control)
            .with_progress(false)
            .run()
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FaasError>(),
            Some(FaasError::ProcessControlFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_tar_leaves_service_running() {
        let fx = fixture(&["1.1.110"]);
        let control = RecordingControl::default();

        let err = Updater::new(&fx.config, &fx.resolver, &control)
            .with_progress(false)
            .with_extractor("faas-no-such-tar")
            .run()
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<FaasError>(),
            Some(FaasError::CommandNotFound { command }) if command == "faas-no-such-tar"
        ));
        assert!(control.calls().is_empty());
        assert_eq!(fx.server.archive_requests(), 0);
    }

    #[test]
    fn test_install_path_must_be_directory() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("factorio");
        std::fs::write(&file, "").unwrap();

        let err = ensure_install_dir(&file).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FaasError>(),
            Some(FaasError::InstallPathNotDirectory { .. })
        ));

        let dir = temp.path().join("a/b");
        ensure_install_dir(&dir).unwrap();
        assert!(dir.is_dir());
    }
}
