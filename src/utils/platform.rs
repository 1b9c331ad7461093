//! Host platform helpers: path resolution, privilege and user lookups.
//!
//! FAAS only targets Linux hosts running systemd, but the helpers degrade
//! gracefully on other platforms so the crate still builds and tests there.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Resolve a configured path against the directory of the configuration file.
///
/// The path is trimmed, `~` and `$VAR`/`${VAR}` references are expanded, and a
/// relative result is joined onto `base_dir`. Absolute paths are returned as-is.
///
/// # Examples
///
/// ```rust,no_run
/// use faas::utils::platform::resolve_path;
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// let save = resolve_path("../saves/fsave.zip", Path::new("/opt/faas"))?;
/// assert_eq!(save, Path::new("/opt/faas/../saves/fsave.zip"));
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns an error if the path references an undefined environment variable.
pub fn resolve_path(path: &str, base_dir: &Path) -> Result<PathBuf> {
    let trimmed = path.trim();
    let expanded = shellexpand::full(trimmed).with_context(|| {
        format!(
            "Failed to expand path: {trimmed}\n\n\
            Use ~/ for the home directory and $VAR or ${{VAR}} for environment variables"
        )
    })?;

    let expanded = PathBuf::from(expanded.into_owned());
    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        Ok(base_dir.join(expanded))
    }
}

/// Whether the current process runs with an effective uid of 0.
#[cfg(unix)]
#[must_use]
pub fn is_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail.
    unsafe { libc::geteuid() == 0 }
}

/// Whether the current process runs with an effective uid of 0.
#[cfg(not(unix))]
#[must_use]
pub fn is_root() -> bool {
    false
}

/// Whether `name` is a user account known to the host.
#[cfg(unix)]
#[must_use]
pub fn user_exists(name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    let Ok(c_name) = std::ffi::CString::new(name) else {
        return false;
    };
    // SAFETY: c_name is a valid NUL-terminated string that outlives the call; the
    // returned record is only checked for null and never dereferenced.
    let entry = unsafe { libc::getpwnam(c_name.as_ptr()) };
    !entry.is_null()
}

/// Whether `name` is a user account known to the host.
#[cfg(not(unix))]
#[must_use]
pub fn user_exists(name: &str) -> bool {
    !name.is_empty()
}

/// Whether `cmd` can be found on `PATH`.
#[must_use]
pub fn command_exists(cmd: &str) -> bool {
    which::which(cmd).is_ok()
}

/// Make `path` executable by everyone (mode 0755) if it is not already.
///
/// Returns `true` when the mode had to be changed.
#[cfg(unix)]
pub fn ensure_executable(path: &Path) -> Result<bool> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = std::fs::metadata(path)
        .with_context(|| format!("Failed to read permissions for {}", path.display()))?;
    let mut perms = metadata.permissions();
    if perms.mode() & 0o111 != 0 {
        return Ok(false);
    }

    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms)
        .with_context(|| format!("Failed to make {} executable", path.display()))?;
    Ok(true)
}

/// Make `path` executable by everyone (mode 0755) if it is not already.
#[cfg(not(unix))]
pub fn ensure_executable(_path: &Path) -> Result<bool> {
    Ok(false)
}
