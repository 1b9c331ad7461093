//! Server configuration file (`config.toml`).
//!
//! The configuration is a flat TOML document naming where the server lives,
//! where its save file is and which OS user runs it, plus an optional
//! `[website]` table describing the release index.
//!
//! ```toml
//! factorio-path = "/opt/factorio"
//! save-path = "/opt/factorio-saves/fsave.zip"
//! user = "factorio"
//! service-name = "factorio.service"    # optional
//! bin-path = "bin/x64/factorio"         # optional, relative to factorio-path
//! experimental = false                  # optional
//! settings-path = "server-settings.json" # optional
//!
//! [website]                             # optional
//! base-url = "https://www.factorio.com"
//! stable-page = "/download-headless/stable"
//! experimental-page = "/download-headless/experimental"
//! ```
//!
//! Relative paths are resolved against the directory holding the configuration
//! file, after `~` and environment variable expansion.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::core::FaasError;
use crate::utils::platform::resolve_path;

/// File name looked up next to the executable when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";
/// Unit name used when `service-name` is not configured.
pub const DEFAULT_SERVICE_NAME: &str = "factorio.service";
/// Binary location inside the install directory of the Linux headless build.
pub const DEFAULT_BIN_PATH: &str = "bin/x64/factorio";
/// Site hosting the release index pages.
pub const DEFAULT_BASE_URL: &str = "https://www.factorio.com";
/// Index page listing stable headless releases.
pub const DEFAULT_STABLE_PAGE: &str = "/download-headless/stable";
/// Index page listing experimental headless releases.
pub const DEFAULT_EXPERIMENTAL_PAGE: &str = "/download-headless/experimental";

fn default_service_name() -> String {
    DEFAULT_SERVICE_NAME.to_string()
}

fn default_bin_path() -> String {
    DEFAULT_BIN_PATH.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_stable_page() -> String {
    DEFAULT_STABLE_PAGE.to_string()
}

fn default_experimental_page() -> String {
    DEFAULT_EXPERIMENTAL_PAGE.to_string()
}

/// Location of the release index pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WebsiteConfig {
    /// Scheme and host, without trailing slash (e.g. `https://www.factorio.com`)
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Path of the stable release listing
    #[serde(default = "default_stable_page")]
    pub stable_page: String,
    /// Path of the experimental release listing
    #[serde(default = "default_experimental_page")]
    pub experimental_page: String,
}

impl Default for WebsiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            stable_page: default_stable_page(),
            experimental_page: default_experimental_page(),
        }
    }
}

impl WebsiteConfig {
    /// URL of the release listing for the chosen channel.
    #[must_use]
    pub fn index_url(&self, experimental: bool) -> String {
        let page = if experimental {
            &self.experimental_page
        } else {
            &self.stable_page
        };
        self.join(page)
    }

    /// Absolute download URL for a link found on an index page.
    ///
    /// Links are usually site-relative (`/get-download/...`); absolute links are
    /// kept untouched.
    #[must_use]
    pub fn artifact_url(&self, link: &str) -> String {
        if link.starts_with("http://") || link.starts_with("https://") {
            link.to_string()
        } else {
            self.join(link)
        }
    }

    fn join(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }
}

/// The configuration file as written on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawServerConfig {
    factorio_path: String,
    save_path: String,
    user: String,
    #[serde(default = "default_service_name")]
    service_name: String,
    #[serde(default = "default_bin_path")]
    bin_path: String,
    #[serde(default)]
    experimental: bool,
    #[serde(default)]
    settings_path: Option<String>,
    #[serde(default)]
    website: WebsiteConfig,
}

/// Validated configuration with every path resolved.
///
/// Created once at startup and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Directory the server release is unpacked into
    pub factorio_path: PathBuf,
    /// Save file passed to `--start-server`; lives outside `factorio_path`
    pub save_path: PathBuf,
    /// OS user the service runs as
    pub user: String,
    /// systemd unit name, always ending in `.service`
    pub service_name: String,
    /// Absolute path of the server binary
    pub bin_path: PathBuf,
    /// Follow the experimental channel instead of stable
    pub experimental: bool,
    /// Optional `--server-settings` file
    pub settings_path: Option<PathBuf>,
    /// Release index location
    pub website: WebsiteConfig,
}

impl ServerConfig {
    /// Load and validate the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// - [`FaasError::ConfigNotFound`] if the file does not exist
    /// - [`FaasError::ConfigInvalid`] if it cannot be read, is not valid TOML,
    ///   misses a required key, or has an empty required value
    pub async fn load(path: &Path) -> Result<Self> {
        debug!("Reading config from \"{}\"", path.display());

        if !path.is_file() {
            return Err(FaasError::ConfigNotFound {
                path: path.display().to_string(),
            }
            .into());
        }

        let content = fs::read_to_string(path).await.map_err(|e| FaasError::ConfigInvalid {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let base_dir = path.parent().map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        Self::parse(&content, &base_dir, path)
    }

    /// Parse configuration text, resolving relative paths against `base_dir`.
    ///
    /// `source` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`FaasError::ConfigInvalid`] for malformed or incomplete content.
    pub fn parse(content: &str, base_dir: &Path, source: &Path) -> Result<Self> {
        let invalid = |reason: String| FaasError::ConfigInvalid {
            path: source.display().to_string(),
            reason,
        };

        let raw: RawServerConfig =
            toml::from_str(content).map_err(|e| invalid(e.message().to_string()))?;

        for (key, value) in [
            ("factorio-path", &raw.factorio_path),
            ("save-path", &raw.save_path),
            ("user", &raw.user),
            ("service-name", &raw.service_name),
            ("bin-path", &raw.bin_path),
        ] {
            if value.trim().is_empty() {
                return Err(invalid(format!("`{key}` must not be empty")).into());
            }
        }

        let resolve = |value: &str| resolve_path(value, base_dir).map_err(|e| invalid(format!("{e:#}")));

        let factorio_path = resolve(&raw.factorio_path)?;
        let save_path = resolve(&raw.save_path)?;
        let bin_path = factorio_path.join(raw.bin_path.trim());
        let settings_path = match raw.settings_path.as_deref().map(str::trim) {
            Some(p) if !p.is_empty() => Some(resolve(p)?),
            _ => None,
        };

        let service_name = normalize_service_name(raw.service_name.trim());

        let config = Self {
            factorio_path,
            save_path,
            user: raw.user.trim().to_string(),
            service_name,
            bin_path,
            experimental: raw.experimental,
            settings_path,
            website: raw.website,
        };
        debug!("Factorio directory path: {}", config.factorio_path.display());
        debug!("Factorio binary path: {}", config.bin_path.display());
        Ok(config)
    }

    /// Default configuration location: `config.toml` next to the executable.
    ///
    /// Falls back to the current directory when the executable path is unknown.
    #[must_use]
    pub fn default_path() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(DEFAULT_CONFIG_FILE)))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }
}

fn normalize_service_name(name: &str) -> String {
    if name.ends_with(".service") {
        name.to_string()
    } else {
        format!("{name}.service")
    }
}
