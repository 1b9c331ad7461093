//! Configure the server as a systemd service.
//!
//! ```bash
//! sudo faas create-service
//! ```
//!
//! Requires root. Writes `/etc/systemd/system/<service-name>` and
//! `/etc/sudoers.d/99_factorio`, reloads systemd and starts the service.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::CommandContext;
use crate::service::{ServiceDefinitionWriter, Systemctl};

/// Command to install the systemd unit.
#[derive(Args, Debug, Default)]
pub struct CreateServiceCommand {}

impl CreateServiceCommand {
    /// Install the unit for the configured server.
    ///
    /// # Errors
    ///
    /// Missing privileges or prerequisites, and write failures.
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let control = Systemctl::new();
        let writer = ServiceDefinitionWriter::new(&ctx.server, &control);

        writer.install().await?;
        if !ctx.quiet {
            println!("{}", "Service successfully created".green());
        }
        writer.start().await
    }
}
