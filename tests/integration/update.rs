//! The `update` command.

use predicates::prelude::*;

use crate::common::TestHost;

#[test]
fn test_fresh_install_lands_latest_release() {
    let host = TestHost::new(&["1.1.110", "1.1.109"]);

    host.faas()
        .arg("update")
        .assert()
        .success()
        .stdout(predicate::str::contains("Server updated successfully!"));

    assert!(host.bin_path().is_file());
    let changelog =
        std::fs::read_to_string(host.install_dir().join("data/changelog.txt")).unwrap();
    assert_eq!(changelog, "Version: 1.1.110\n");
    assert_eq!(host.server.archive_requests(), 1);

    host.faas()
        .arg("local-version")
        .assert()
        .success()
        .stdout(predicate::str::ends_with(": 1.1.110\n"));
}

#[test]
fn test_equal_versions_skip_download() {
    let host = TestHost::new(&["1.1.110"]);
    host.install_version("1.1.110");

    host.faas()
        .arg("update")
        .assert()
        .success()
        .stdout(predicate::str::contains("No update required"));

    assert_eq!(host.server.index_requests(), 1);
    assert_eq!(host.server.archive_requests(), 0);
    assert!(!host.install_dir().join("data").exists());
}

#[test]
fn test_different_version_is_replaced() {
    // Only equality matters: a locally newer identifier is still replaced
    let host = TestHost::new(&["1.1.110"]);
    host.install_version("1.1.111");

    host.faas().arg("update").assert().success();

    assert_eq!(host.server.archive_requests(), 1);
    host.faas()
        .arg("local-version")
        .assert()
        .success()
        .stdout(predicate::str::contains("1.1.110"));
}

#[test]
fn test_save_file_is_untouched() {
    let host = TestHost::new(&["2.0.7"]);
    let before = std::fs::read(host.save_path()).unwrap();

    host.faas().arg("update").assert().success();

    assert_eq!(std::fs::read(host.save_path()).unwrap(), before);
}

#[test]
fn test_update_is_idempotent() {
    let host = TestHost::new(&["2.0.7"]);

    host.faas().arg("update").assert().success();
    host.faas()
        .arg("update")
        .assert()
        .success()
        .stdout(predicate::str::contains("No update required"));

    assert_eq!(host.server.archive_requests(), 1);
}

#[test]
fn test_quiet_update_prints_nothing() {
    let host = TestHost::new(&["2.0.7"]);

    host.faas().arg("--quiet").arg("update").assert().success().stdout("");
}

#[test]
fn test_install_path_is_a_file() {
    let host = TestHost::new(&["1.1.110"]);
    std::fs::write(host.install_dir(), "not a directory").unwrap();

    host.faas()
        .arg("update")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("is not a directory"));

    assert_eq!(host.server.index_requests(), 0);
}

#[test]
fn test_unreachable_index_exits_with_network_code() {
    let host = TestHost::new(&["1.1.110"]);
    let config = host.default_config().replace(host.server.base_url(), "http://127.0.0.1:9");
    host.write_config(&config);

    host.faas()
        .arg("update")
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("Unable to reach"));

    assert!(!host.bin_path().exists());
}

#[test]
fn test_experimental_channel_flag() {
    let host = TestHost::new(&["1.2.0"]);

    host.faas().arg("--experimental").arg("update").assert().success();
    assert!(host.bin_path().is_file());
}
