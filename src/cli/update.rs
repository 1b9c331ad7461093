//! Install or update the server to the latest published release.
//!
//! ```bash
//! faas update
//! faas --experimental update
//! ```
//!
//! Exits with 0 both when the server was updated and when it was already
//! current, so the command can run from cron unattended.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::CommandContext;
use crate::installer::{UpdateOutcome, Updater};
use crate::release::VersionResolver;
use crate::service::Systemctl;

/// Command to install or update the server.
#[derive(Args, Debug, Default)]
pub struct UpdateCommand {}

impl UpdateCommand {
    /// Run the update against the real systemd controller.
    ///
    /// # Errors
    ///
    /// Any failure of the update sequence.
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let resolver = VersionResolver::new(ctx.server.website.clone(), ctx.experimental)?;
        let control = Systemctl::new();

        let outcome = Updater::new(&ctx.server, &resolver, &control)
            .with_progress(ctx.show_progress)
            .run()
            .await?;

        if !ctx.quiet {
            match &outcome {
                UpdateOutcome::UpToDate(_) => println!("{outcome}"),
                UpdateOutcome::Updated {
                    ..
                } => println!("{}", outcome.to_string().green()),
            }
        }
        Ok(())
    }
}
