//! Test utilities for FAAS
//!
//! Helpers shared by the unit tests and, through the `test-utils` feature, the
//! integration tests: logging setup, a fake server binary, a release archive
//! builder, a local release index and a recording [`ServiceControl`].
//!
//! # Example
//!
//! ```rust,ignore
//! let temp = tempfile::TempDir::new().unwrap();
//! let archive = build_release_archive(temp.path(), "1.1.110");
//! let server = ReleaseServer::start(&["1.1.110"], archive);
//! assert!(server.base_url().starts_with("http://127.0.0.1:"));
//! ```

pub mod release_server;

pub use release_server::ReleaseServer;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::core::FaasError;
use crate::service::ServiceControl;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Respects `RUST_LOG` when `level` is `None`; does nothing if neither is set.
///
/// ```bash
/// RUST_LOG=faas=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

/// Write a shell script at `dir/relative` that answers `--version` like the
/// headless server does.
pub fn write_fake_server_binary(dir: &Path, relative: &str, version: &str) -> PathBuf {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(
        &path,
        format!(
            "#!/bin/sh\necho \"Version: {version} (build 62232, linux64, headless)\"\necho \"Binary version: 64\"\n"
        ),
    )
    .unwrap();

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
    path
}

/// Build a gzipped release archive laid out like the official one: a single
/// top-level `factorio/` directory holding the binary and a data marker.
///
/// Returns the archive bytes.
pub fn build_release_archive(work_dir: &Path, version: &str) -> Vec<u8> {
    let staging = work_dir.join(format!("staging-{version}"));
    write_fake_server_binary(&staging, "factorio/bin/x64/factorio", version);
    std::fs::create_dir_all(staging.join("factorio/data")).unwrap();
    std::fs::write(staging.join("factorio/data/changelog.txt"), format!("Version: {version}\n"))
        .unwrap();

    let archive = work_dir.join(format!("factorio_headless_{version}.tar.gz"));
    let status = std::process::Command::new("tar")
        .arg("-czf")
        .arg(&archive)
        .arg("-C")
        .arg(&staging)
        .arg("factorio")
        .status()
        .unwrap();
    assert!(status.success(), "failed to build test archive");

    std::fs::read(archive).unwrap()
}

/// [`ServiceControl`] that records requests instead of talking to systemd.
#[derive(Debug, Default)]
pub struct RecordingControl {
    calls: Mutex<Vec<String>>,
    failing: Option<String>,
}

impl RecordingControl {
    /// A controller whose requests starting with `action` fail.
    pub fn failing_on(action: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failing: Some(action.to_string()),
        }
    }

    /// Requests received so far, e.g. `stop factorio.service`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<()> {
        let fails = self.failing.as_ref().is_some_and(|action| call.starts_with(action.as_str()));
        self.calls.lock().unwrap().push(call.clone());
        if fails {
            return Err(FaasError::ProcessControlFailed {
                action: call,
                service: "test".to_string(),
                stderr: "refused".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

impl ServiceControl for RecordingControl {
    async fn stop(&self, service: &str) -> Result<()> {
        self.record(format!("stop {service}"))
    }

    async fn start(&self, service: &str) -> Result<()> {
        self.record(format!("start {service}"))
    }

    async fn daemon_reload(&self) -> Result<()> {
        self.record("daemon-reload".to_string())
    }
}
