//! The `create-service` command.

use predicates::prelude::*;

use crate::common::{TEST_SERVICE, TestHost};

#[cfg(unix)]
fn running_as_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail.
    unsafe { libc::geteuid() == 0 }
}

#[cfg(unix)]
#[test]
fn test_create_service_requires_root() {
    if running_as_root() {
        return;
    }
    let host = TestHost::new(&["1.1.110"]);
    host.install_version("1.1.110");

    host.faas()
        .arg("create-service")
        .assert()
        .failure()
        .code(13)
        .stderr(predicate::str::contains("Root permissions are required"))
        .stderr(predicate::str::contains("sudo"));

    assert!(!std::path::Path::new("/etc/systemd/system").join(TEST_SERVICE).exists());
}
