//! The `local-version` and `latest-version` commands.

use predicates::prelude::*;

use faas::test_utils::ReleaseServer;

use crate::common::TestHost;

#[test]
fn test_latest_version_prints_newest() {
    let host = TestHost::new(&["1.1.109", "1.1.110", "1.0.0"]);

    host.faas().arg("latest-version").assert().success().stdout("1.1.110\n");
}

#[test]
fn test_latest_version_verbose_lists_all() {
    let host = TestHost::new(&["1.1.110", "1.1.109"]);

    host.faas()
        .arg("--verbose")
        .arg("latest-version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "Latest version:\n1.1.110 [/get-download/1.1.110/headless/linux64]\n-- Other versions --\n1.1.109",
        ));
}

#[test]
fn test_empty_index_is_an_error() {
    let host = TestHost::new(&["1.1.110"]);
    let empty = ReleaseServer::start(&[], Vec::new());
    let config = host.default_config().replace(host.server.base_url(), empty.base_url());
    host.write_config(&config);

    host.faas()
        .arg("latest-version")
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("No available version found"));
}

#[test]
fn test_local_version_without_install() {
    let host = TestHost::new(&["1.1.110"]);

    host.faas()
        .arg("local-version")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("does not exist or is not executable"));
}

#[test]
fn test_local_version_reports_installed() {
    let host = TestHost::new(&["1.1.110"]);
    host.install_version("1.1.107");

    host.faas()
        .arg("local-version")
        .assert()
        .success()
        .stdout(format!("Version of {}: 1.1.107\n", host.bin_path().display()));
}
