//! systemd integration: unit rendering, unit installation and service control.
//!
//! # Module Structure
//!
//! - [`control`]: the [`ServiceControl`] seam and its `systemctl` implementation
//! - [`unit`]: renders the unit definition from the configuration
//! - [`writer`]: checks prerequisites and installs the unit and sudoers rules

pub mod control;
pub mod unit;
pub mod writer;

pub use control::{ServiceControl, Systemctl};
pub use unit::render_unit;
pub use writer::{ServiceDefinitionWriter, sudoers_rules};

/// Directory holding locally installed unit files.
pub const SYSTEMD_UNIT_DIR: &str = "/etc/systemd/system";
/// Directory holding drop-in sudoers rules.
pub const SUDOERS_DIR: &str = "/etc/sudoers.d";
/// File name of the sudoers rules written for the service.
pub const SUDOERS_FILE_NAME: &str = "99_factorio";
