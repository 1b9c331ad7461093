use anyhow::Result;
use std::path::Path;
use tracing::{debug, info, warn};

use super::index::{ReleaseListing, parse_index_page};
use super::{Release, ReleaseVersion};
use crate::config::WebsiteConfig;
use crate::core::FaasError;
use crate::utils::platform::ensure_executable;
use crate::utils::process::ProcessCommand;

/// User agent sent with every request.
const USER_AGENT: &str = concat!("faas/", env!("CARGO_PKG_VERSION"));

/// Resolves the latest published release from the remote index.
///
/// The resolver owns the HTTP client; the installer borrows it through
/// [`VersionResolver::client`] so the index page and the archive are fetched
/// with the same settings.
///
/// # Examples
///
/// ```rust,no_run
/// use faas::config::WebsiteConfig;
/// use faas::release::VersionResolver;
///
/// # async fn example() -> anyhow::Result<()> {
/// let resolver = VersionResolver::new(WebsiteConfig::default(), false)?;
/// let latest = resolver.latest_release().await?;
/// println!("Latest stable release: {}", latest.version);
/// # Ok(())
/// # }
/// ```
pub struct VersionResolver {
    /// Shared HTTP client
    client: reqwest::Client,
    /// Where the index pages live
    website: WebsiteConfig,
    /// Follow the experimental listing instead of stable
    experimental: bool,
}

impl VersionResolver {
    /// Create a resolver for the given site and channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialised (TLS backend).
    pub fn new(website: WebsiteConfig, experimental: bool) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build().map_err(|e| {
            FaasError::Other {
                message: format!("Failed to initialise HTTP client: {e}"),
            }
        })?;

        Ok(Self {
            client,
            website,
            experimental,
        })
    }

    /// The HTTP client used for index and artifact downloads.
    #[must_use]
    pub const fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// The website configuration this resolver reads from.
    #[must_use]
    pub const fn website(&self) -> &WebsiteConfig {
        &self.website
    }

    /// URL of the listing for the configured channel.
    #[must_use]
    pub fn index_url(&self) -> String {
        self.website.index_url(self.experimental)
    }

    /// Download and parse the release listing.
    ///
    /// # Errors
    ///
    /// [`FaasError::NetworkUnreachable`] when the page cannot be fetched or the
    /// server answers with a non-success status.
    pub async fn fetch_listing(&self) -> Result<ReleaseListing> {
        let url = self.index_url();
        debug!("Downloading page: {}", url);

        let unreachable = |reason: String| FaasError::NetworkUnreachable {
            url: url.clone(),
            reason,
        };

        let response =
            self.client.get(&url).send().await.map_err(|e| unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(unreachable(format!("HTTP {status}")).into());
        }

        let body = response.text().await.map_err(|e| unreachable(e.to_string()))?;
        let releases = parse_index_page(&body);
        debug!("Found {} release(s) on {}", releases.len(), url);

        Ok(ReleaseListing {
            url,
            releases,
        })
    }

    /// The newest release on the listing.
    ///
    /// # Errors
    ///
    /// Network failures as in [`fetch_listing`](Self::fetch_listing), and
    /// [`FaasError::ReleaseIndexEmpty`] when the page lists nothing.
    pub async fn latest_release(&self) -> Result<Release> {
        let listing = self.fetch_listing().await?;
        match listing.releases.into_iter().next() {
            Some(latest) => {
                debug!("Latest version: {}", latest.version);
                Ok(latest)
            }
            None => Err(FaasError::ReleaseIndexEmpty {
                url: listing.url,
            }
            .into()),
        }
    }
}

/// Read the installed release identifier from the server binary.
///
/// Runs `<binary> --version` and extracts the identifier from its output. A
/// binary without execute permission is made executable first.
///
/// Returns `Ok(None)` when nothing is installed yet, or when the binary cannot
/// report a version; both cases mean "update required".
///
/// # Errors
///
/// Only fails when the binary exists but its permissions cannot be fixed.
pub async fn local_release(bin_path: &Path) -> Result<Option<ReleaseVersion>> {
    if !bin_path.is_file() {
        debug!("{} is not a file", bin_path.display());
        return Ok(None);
    }

    if ensure_executable(bin_path)? {
        info!("Binary was not executable, changed mode of {} to 0755", bin_path.display());
    }

    let output = match ProcessCommand::new(bin_path.display().to_string())
        .arg("--version")
        .with_context("local version")
        .output()
        .await
    {
        Ok(output) => output,
        Err(e) => {
            warn!("Unable to run {}: {:#}", bin_path.display(), e);
            return Ok(None);
        }
    };

    if !output.success {
        debug!("Unable to find local version");
        return Ok(None);
    }

    let version = ReleaseVersion::extract(&output.stdout);
    if version.is_none() {
        debug!("No version found in output of {} --version", bin_path.display());
    }
    Ok(version)
}

/// Whether the installed release differs from the latest one.
///
/// An empty installation always needs an update; otherwise only equality
/// matters, never ordering.
#[must_use]
pub fn is_update_needed(local: Option<&ReleaseVersion>, latest: &ReleaseVersion) -> bool {
    match local {
        None => {
            debug!("No local version found, update required");
            true
        }
        Some(local) => {
            debug!("Latest version: {}", latest);
            debug!("Local  version: {}", local);
            local != latest
        }
    }
}
