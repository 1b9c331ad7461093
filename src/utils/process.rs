//! Builder for running external commands (`tar`, `systemctl`, the server binary).
//!
//! Every external program FAAS touches goes through [`ProcessCommand`] so that
//! invocations are logged the same way and spawn failures are reported with a
//! typed error. Callers decide what a non-zero exit means for their operation by
//! inspecting [`ProcessOutput::success`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use faas::utils::process::ProcessCommand;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let output = ProcessCommand::new("tar")
//!     .args(["-xf", "/tmp/release.tar.xz", "-C", "/opt/factorio", "--strip-components=1"])
//!     .with_context("extract release")
//!     .output()
//!     .await?;
//!
//! if !output.success {
//!     eprintln!("tar failed: {}", output.stderr);
//! }
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use std::process::Stdio;
use tokio::process::Command;

use crate::core::FaasError;

/// Fluent builder around [`tokio::process::Command`] with captured output.
#[derive(Debug, Clone)]
pub struct ProcessCommand {
    /// Program to execute
    program: String,
    /// Arguments passed to the program
    args: Vec<String>,
    /// Label used in log lines
    context: Option<String>,
}

/// Captured result of a finished command.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    /// Whether the command exited with status 0
    pub success: bool,
    /// Exit code, if the process was not killed by a signal
    pub code: Option<i32>,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

impl ProcessCommand {
    /// Start building an invocation of `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            context: None,
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Label the command in log output.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// The command line as it would be typed in a shell, for logs and errors.
    #[must_use]
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run the command to completion and capture its output.
    ///
    /// # Errors
    ///
    /// Fails only when the process cannot be spawned: [`FaasError::CommandNotFound`]
    /// if the program does not exist, an I/O error with context otherwise. A
    /// non-zero exit status is reported through [`ProcessOutput::success`].
    pub async fn output(self) -> Result<ProcessOutput> {
        let command_line = self.display();
        match &self.context {
            Some(ctx) => tracing::debug!("({}) Executing command: {}", ctx, command_line),
            None => tracing::debug!("Executing command: {}", command_line),
        }

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());

        let output = match cmd.output().await {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(FaasError::CommandNotFound {
                    command: self.program,
                }
                .into());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to execute {command_line}"));
            }
        };

        let result = ProcessOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        if result.success {
            if !result.stdout.trim().is_empty() {
                tracing::trace!("{}", result.stdout.trim());
            }
        } else {
            tracing::debug!("Command failed with exit code: {:?}", result.code);
            if !result.stderr.trim().is_empty() {
                tracing::debug!("Error: {}", result.stderr.trim());
            }
        }

        Ok(result)
    }
}
