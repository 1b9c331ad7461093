//! Supporting utilities: host platform queries, external process execution and
//! download progress.

pub mod platform;
pub mod process;
pub mod progress;

pub use platform::{command_exists, is_root, resolve_path, user_exists};
pub use process::{ProcessCommand, ProcessOutput};
pub use progress::DownloadProgress;
