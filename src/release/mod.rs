//! Release identifiers and the version resolver.
//!
//! A Factorio release is identified by a dotted version token such as
//! `1.1.110`. FAAS treats that token as opaque when deciding whether to update:
//! the server is up to date exactly when the installed identifier equals the
//! latest published one. Numeric ordering is only used to pick the newest entry
//! from a release listing.
//!
//! # Module Structure
//!
//! - [`index`]: parses the HTML release listing into [`Release`] entries
//! - [`resolver`]: queries the local binary and the remote listing

pub mod index;
pub mod resolver;

pub use index::{ReleaseListing, parse_index_page};
pub use resolver::{VersionResolver, is_update_needed, local_release};

use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

/// First dotted numeric token, e.g. `1.1.110` in `Version: 1.1.110 (build 62232)`.
static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(\.\d+)+").expect("version regex must compile"));

/// Opaque release identifier (e.g. `1.1.110`).
///
/// Equality is textual. [`ReleaseVersion::cmp_numeric`] compares dotted
/// components numerically and exists only to sort release listings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReleaseVersion {
    raw: String,
}

impl ReleaseVersion {
    /// Extract the first dotted version token from arbitrary text.
    ///
    /// Works on headings like `1.1.110 (stable)` and on the server's
    /// `--version` output (`Version: 1.1.110 (build 62232, linux64, headless)`).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use faas::release::ReleaseVersion;
    ///
    /// let v = ReleaseVersion::extract("Version: 1.1.110 (build 62232)").unwrap();
    /// assert_eq!(v.as_str(), "1.1.110");
    /// assert!(ReleaseVersion::extract("no version here").is_none());
    /// ```
    #[must_use]
    pub fn extract(text: &str) -> Option<Self> {
        VERSION_RE.find(text.trim()).map(|m| Self {
            raw: m.as_str().to_string(),
        })
    }

    /// The identifier as text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Compare dotted components numerically (`1.10.0` > `1.9.3`).
    #[must_use]
    pub fn cmp_numeric(&self, other: &Self) -> Ordering {
        self.components().cmp(&other.components())
    }

    fn components(&self) -> Vec<u64> {
        self.raw.split('.').map(|part| part.parse().unwrap_or(0)).collect()
    }
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// A published release: its identifier and the link to its archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    /// Release identifier
    pub version: ReleaseVersion,
    /// Download link as listed on the index page (usually site-relative)
    pub path: String,
}

impl fmt::Display for Release {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.version, self.path)
    }
}
