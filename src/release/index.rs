//! Parser for the headless-server download pages.
//!
//! The download pages list releases as a heading carrying the version followed
//! by a link to the archive:
//!
//! ```html
//! <h3>1.1.110 (stable)</h3>
//! <ul><li><a href="/get-download/1.1.110/headless/linux64">Linux 64</a></li></ul>
//! ```
//!
//! Parsing walks the `<h3>` and `<a>` elements in document order: an `<h3>`
//! whose text carries a version opens an entry, and the next `<a href>` closes
//! it. Headings without a version and links outside an open entry are ignored,
//! as is anything inside HTML comments.

use scraper::{Html, Selector};
use std::fmt;

use super::{Release, ReleaseVersion};

/// All releases found on one index page, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseListing {
    /// Page the listing was read from
    pub url: String,
    /// Releases sorted newest first
    pub releases: Vec<Release>,
}

impl ReleaseListing {
    /// The newest release, if the page listed any.
    #[must_use]
    pub fn latest(&self) -> Option<&Release> {
        self.releases.first()
    }
}

impl fmt::Display for ReleaseListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some((latest, others)) = self.releases.split_first() else {
            return write!(f, "No available version found :(");
        };

        write!(f, "Latest version:\n{latest}")?;
        if !others.is_empty() {
            write!(f, "\n-- Other versions --")?;
            for release in others {
                write!(f, "\n{release}")?;
            }
        }
        Ok(())
    }
}

/// Extract every release from an index page, sorted newest first.
///
/// Returns an empty list when the page is not in the expected shape.
#[must_use]
pub fn parse_index_page(html: &str) -> Vec<Release> {
    let Ok(selector) = Selector::parse("h3, a") else {
        return Vec::new();
    };
    let document = Html::parse_document(html);

    let mut releases = Vec::new();
    let mut current: Option<ReleaseVersion> = None;

    for element in document.select(&selector) {
        if element.value().name() == "h3" {
            let text = element.text().collect::<String>();
            if let Some(version) = ReleaseVersion::extract(&text) {
                current = Some(version);
            }
            continue;
        }

        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if let Some(version) = current.take() {
            releases.push(Release {
                version,
                path: href.to_string(),
            });
        }
    }

    // Stable sort keeps page order for equal versions
    releases.sort_by(|a, b| b.version.cmp_numeric(&a.version));
    releases
}
