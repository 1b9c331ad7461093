//! Configuration failures abort before any other work.

use predicates::prelude::*;

use crate::common::TestHost;

#[test]
fn test_missing_required_key_exits_with_config_code() {
    let host = TestHost::new(&["1.1.110"]);
    let config = host.default_config().replace("user = \"factorio\"\n", "");
    host.write_config(&config);

    host.faas()
        .arg("update")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("user"));

    assert_eq!(host.server.index_requests(), 0);
    assert!(!host.install_dir().exists());
}

#[test]
fn test_missing_config_file() {
    let host = TestHost::new(&["1.1.110"]);
    std::fs::remove_file(host.config_path()).unwrap();

    host.faas()
        .arg("latest-version")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Configuration file not found"))
        .stderr(predicate::str::contains("--config"));

    assert_eq!(host.server.index_requests(), 0);
}

#[test]
fn test_malformed_toml() {
    let host = TestHost::new(&["1.1.110"]);
    host.write_config("factorio-path = \"factorio\"\nsave-path = [\n");

    host.faas().arg("local-version").assert().failure().code(2);
}

#[test]
fn test_config_from_environment() {
    let host = TestHost::new(&["1.2.3"]);
    let mut cmd = assert_cmd::Command::cargo_bin("faas").unwrap();

    cmd.env_remove("RUST_LOG")
        .env("FAAS_CONFIG", host.config_path())
        .arg("latest-version")
        .assert()
        .success()
        .stdout("1.2.3\n");
}
