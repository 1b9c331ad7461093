//! Shared helpers for the integration tests.
//!
//! [`TestHost`] lays out a throwaway server host in a temporary directory: a
//! configuration file, a save directory and an install directory, plus a local
//! release index served over HTTP. Commands are run through the real `faas`
//! binary with [`TestHost::faas`].

#![allow(dead_code)]

use assert_cmd::Command;
use faas::test_utils::{
    ReleaseServer, build_release_archive, init_test_logging, write_fake_server_binary,
};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Unit name used by the tests; never installed on the host, so start and
/// stop requests are skipped.
pub const TEST_SERVICE: &str = "faas-integration-test.service";

/// A temporary host with a configuration file and a release server.
pub struct TestHost {
    pub temp: TempDir,
    pub server: ReleaseServer,
}

impl TestHost {
    /// Host whose release index lists `versions` (newest first) and serves an
    /// archive of the first one.
    pub fn new(versions: &[&str]) -> Self {
        init_test_logging(None);
        let temp = TempDir::new().unwrap();
        let archive = build_release_archive(temp.path(), versions[0]);
        let server = ReleaseServer::start(versions, archive);

        let host = Self {
            temp,
            server,
        };
        std::fs::create_dir_all(host.root().join("saves")).unwrap();
        std::fs::write(host.save_path(), b"map data").unwrap();
        host.write_config(&host.default_config());
        host
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.root().join("config.toml")
    }

    pub fn install_dir(&self) -> PathBuf {
        self.root().join("factorio")
    }

    pub fn save_path(&self) -> PathBuf {
        self.root().join("saves/fsave.zip")
    }

    pub fn bin_path(&self) -> PathBuf {
        self.install_dir().join("bin/x64/factorio")
    }

    pub fn default_config(&self) -> String {
        format!(
            r#"factorio-path = "factorio"
save-path = "saves/fsave.zip"
user = "factorio"
service-name = "{TEST_SERVICE}"

[website]
base-url = "{}"
"#,
            self.server.base_url()
        )
    }

    pub fn write_config(&self, content: &str) {
        std::fs::write(self.config_path(), content).unwrap();
    }

    /// Install a fake server reporting `version`.
    pub fn install_version(&self, version: &str) {
        write_fake_server_binary(&self.install_dir(), "bin/x64/factorio", version);
    }

    /// `faas --config <host config> --no-progress` ready for more arguments.
    pub fn faas(&self) -> Command {
        let mut cmd = Command::cargo_bin("faas").unwrap();
        cmd.env_remove("RUST_LOG")
            .env_remove("FAAS_CONFIG")
            .arg("--config")
            .arg(self.config_path())
            .arg("--no-progress");
        cmd
    }
}
