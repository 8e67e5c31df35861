mod common;

use common::{TestEnv, SAMPLE_CONFIG};
use predicates::str::contains;

#[test]
fn devices_add_list_remove() {
    let env = TestEnv::empty();

    env.cmd()
        .args(["devices", "add", "headphones", "00:11:22:33:44:55", "Test Headphones"])
        .assert()
        .success()
        .stdout(contains("Device 'headphones' added."));
    assert!(env.read_config().contains("[devices.headphones]"));

    env.cmd()
        .args(["devices", "list"])
        .assert()
        .success()
        .stdout(contains("headphones"))
        .stdout(contains("00:11:22:33:44:55"));

    env.cmd()
        .args(["devices", "remove", "headphones"])
        .assert()
        .success();
    env.cmd()
        .args(["devices", "list"])
        .assert()
        .success()
        .stdout(contains("No devices configured."));
}

#[test]
fn devices_add_normalizes_mac() {
    let env = TestEnv::empty();
    env.cmd()
        .args(["devices", "add", "mouse", "aa:bb:cc:dd:ee:ff", "Mouse"])
        .assert()
        .success();

    let listing = env.run_json(&["devices", "list"]);
    assert_eq!(listing["ok"], true);
    assert_eq!(listing["data"]["mouse"]["mac"], "AA:BB:CC:DD:EE:FF");
}

#[test]
fn duplicate_device_is_rejected() {
    let env = TestEnv::with_config(SAMPLE_CONFIG);
    env.cmd()
        .args(["devices", "add", "headphones", "00:11:22:33:44:66", "Other"])
        .assert()
        .code(1)
        .stderr(contains("already exists"));
}

#[test]
fn malformed_mac_is_rejected() {
    let env = TestEnv::empty();
    env.cmd()
        .args(["devices", "add", "bad", "00:11:22:33:44", "Bad"])
        .assert()
        .code(1);
    assert!(!env.config.exists());
}

#[test]
fn hosts_add_with_port_and_list() {
    let env = TestEnv::empty();
    env.cmd()
        .args(["hosts", "add", "desktop", "10.0.0.2", "me", "--port", "2222"])
        .assert()
        .success();

    env.cmd()
        .args(["hosts", "list"])
        .assert()
        .success()
        .stdout(contains("10.0.0.2:2222"))
        .stdout(contains("ssh"));

    let hosts = env.run_json(&["hosts", "list"]);
    assert_eq!(hosts["data"]["desktop"]["user"], "me");
    assert_eq!(hosts["data"]["desktop"]["driver"], "bluez");
}

#[test]
fn defaults_must_reference_known_entries() {
    let env = TestEnv::with_config(SAMPLE_CONFIG);
    env.cmd()
        .args(["defaults", "set", "desktop", "speaker", "desktop"])
        .assert()
        .code(1)
        .stderr(contains("speaker"));

    env.cmd()
        .args(["defaults", "set", "desktop", "mouse", "desktop"])
        .assert()
        .success();
    let defaults = env.run_json(&["defaults", "list"]);
    assert_eq!(defaults["data"]["desktop"]["device"], "mouse");
    assert_eq!(defaults["data"]["laptop"]["peer"], "desktop");
}

#[test]
fn removing_unknown_host_fails() {
    let env = TestEnv::with_config(SAMPLE_CONFIG);
    env.cmd()
        .args(["hosts", "remove", "server"])
        .assert()
        .code(1)
        .stderr(contains("not found"));
}

#[test]
fn switch_without_config_is_a_usage_error() {
    let env = TestEnv::empty();
    env.cmd()
        .args(["--local", "laptop", "switch"])
        .assert()
        .code(1)
        .stderr(contains("config not found"));
}

#[test]
fn status_without_config_is_a_usage_error() {
    let env = TestEnv::empty();
    env.cmd()
        .args(["--local", "laptop", "status"])
        .assert()
        .code(1)
        .stderr(contains("config not found"));
}

#[test]
fn listing_without_config_is_empty() {
    let env = TestEnv::empty();
    env.cmd()
        .args(["hosts", "list"])
        .assert()
        .success()
        .stdout(contains("No hosts configured."));
    assert!(!env.config.exists());
}

#[test]
fn switch_without_defaults_names_the_machine() {
    let env = TestEnv::with_config(SAMPLE_CONFIG);
    env.cmd()
        .args(["--local", "workstation"])
        .assert()
        .code(1)
        .stderr(contains("[defaults.workstation]"));
}

#[test]
fn switch_to_unknown_host_is_rejected() {
    let env = TestEnv::with_config(SAMPLE_CONFIG);
    env.cmd()
        .args(["--local", "laptop", "--to", "server"])
        .assert()
        .code(1)
        .stderr(contains("Host 'server' not in [hosts]"));
}

#[test]
fn broken_config_reports_parse_error() {
    let env = TestEnv::with_config("[devices.headphones]\nmac = \"nope\"\nname = \"x\"\n");
    env.cmd()
        .args(["devices", "list"])
        .assert()
        .code(1)
        .stderr(contains("config parse error"));
}
