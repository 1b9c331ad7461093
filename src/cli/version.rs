//! Version reporting commands.
//!
//! ```bash
//! faas local-version
//! faas latest-version
//! faas --verbose --experimental latest-version
//! ```

use anyhow::Result;
use clap::Args;

use super::CommandContext;
use crate::core::FaasError;
use crate::release::{VersionResolver, local_release};

/// Print the version of the installed server.
#[derive(Args, Debug, Default)]
pub struct LocalVersionCommand {}

impl LocalVersionCommand {
    /// Print `Version of <binary>: <id>`.
    ///
    /// # Errors
    ///
    /// [`FaasError::BinaryNotFound`] when nothing is installed, or when the
    /// binary does not report a version.
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let bin_path = &ctx.server.bin_path;
        if !bin_path.is_file() {
            return Err(FaasError::BinaryNotFound {
                path: bin_path.display().to_string(),
            }
            .into());
        }

        let Some(version) = local_release(bin_path).await? else {
            return Err(FaasError::Other {
                message: format!("Unable to find the version of {}", bin_path.display()),
            }
            .into());
        };

        println!("Version of {}: {}", bin_path.display(), version);
        Ok(())
    }
}

/// Print the latest published version.
#[derive(Args, Debug, Default)]
pub struct LatestVersionCommand {}

impl LatestVersionCommand {
    /// Print the newest identifier, or the whole listing with `--verbose`.
    ///
    /// # Errors
    ///
    /// Network failures, or [`FaasError::ReleaseIndexEmpty`].
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let resolver = VersionResolver::new(ctx.server.website.clone(), ctx.experimental)?;
        let listing = resolver.fetch_listing().await?;

        let Some(latest) = listing.latest() else {
            return Err(FaasError::ReleaseIndexEmpty {
                url: listing.url.clone(),
            }
            .into());
        };

        if ctx.verbose {
            println!("{listing}");
        } else {
            println!("{}", latest.version);
        }
        Ok(())
    }
}
