//! Release archive download and extraction.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::core::FaasError;
use crate::utils::platform::command_exists;
use crate::utils::process::ProcessCommand;
use crate::utils::progress::DownloadProgress;

/// Download `url` into a temporary file.
///
/// The file is removed when the returned handle is dropped.
///
/// # Errors
///
/// [`FaasError::NetworkUnreachable`] for transport failures and non-success
/// statuses; an I/O error if the temporary file cannot be written.
pub async fn download_artifact(
    client: &reqwest::Client,
    url: &str,
    show_progress: bool,
) -> Result<NamedTempFile> {
    debug!("Downloading file: {}", url);
    let unreachable = |reason: String| FaasError::NetworkUnreachable {
        url: url.to_string(),
        reason,
    };

    let mut response = client.get(url).send().await.map_err(|e| unreachable(e.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(unreachable(format!("HTTP {status}")).into());
    }

    let mut archive = tempfile::Builder::new()
        .prefix("factorio_headless")
        .tempfile()
        .context("Failed to create temporary archive")?;
    debug!("Creation of the archive at: {}", archive.path().display());

    let progress = DownloadProgress::new(response.content_length(), show_progress);
    progress.set_message("Downloading");

    while let Some(chunk) = response.chunk().await.map_err(|e| unreachable(e.to_string()))? {
        archive
            .write_all(&chunk)
            .with_context(|| format!("Failed to write {}", archive.path().display()))?;
        progress.inc(chunk.len() as u64);
    }
    archive.flush().context("Failed to flush temporary archive")?;
    progress.finish_and_clear();

    debug!("Downloaded {} bytes", progress.position());
    Ok(archive)
}

/// Program used to unpack release archives.
pub const TAR: &str = "tar";

/// Fail unless `program` can be found on `PATH`.
///
/// # Errors
///
/// [`FaasError::CommandNotFound`] naming `program`.
pub fn require_extractor(program: &str) -> Result<()> {
    if !command_exists(program) {
        return Err(FaasError::CommandNotFound {
            command: program.to_string(),
        }
        .into());
    }
    Ok(())
}

/// Unpack `archive` over `target`, dropping the archive's top-level directory.
///
/// Files already in `target` that the archive does not contain are left alone.
///
/// # Errors
///
/// [`FaasError::CommandNotFound`] if `tar` is not installed and
/// [`FaasError::ExtractionFailed`] if it exits with a failure.
pub async fn extract_archive(archive: &Path, target: &Path) -> Result<()> {
    extract_archive_with(TAR, archive, target).await
}

/// [`extract_archive`] with a tar-compatible `program` in place of `tar`.
///
/// # Errors
///
/// Same as [`extract_archive`].
pub async fn extract_archive_with(program: &str, archive: &Path, target: &Path) -> Result<()> {
    require_extractor(program)?;

    debug!("Extracting data to {}", target.display());
    let output = ProcessCommand::new(program)
        .arg("-xf")
        .arg(archive.display().to_string())
        .arg("-C")
        .arg(target.display().to_string())
        .arg("--strip-components=1")
        .with_context("extract release")
        .output()
        .await?;

    if !output.success {
        return Err(FaasError::ExtractionFailed {
            target: target.display().to_string(),
            stderr: output.stderr.trim().to_string(),
        }
        .into());
    }

    debug!("Extraction succeeded");
    Ok(())
}
