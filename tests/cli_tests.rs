//! CLI integration tests.
//!
//! These run the compiled binary against a temporary working directory. Only
//! the offline subcommands are exercised; apply is covered by the library
//! tests up to the provider boundary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn rustform(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("rustform").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env_remove("RUSTFORM_CONFIG")
        .env_remove("RUSTFORM_STATE")
        .env_remove("RUSTFORM_REGION")
        .env_remove("RUSTFORM_STATE_PATH")
        .env_remove("RUSTFORM_VAR_SSH_CIDR")
        .env_remove("RUSTFORM_VAR_KEY_NAME")
        .arg("--no-color");
    cmd
}

const VARS: [&str; 4] = ["-v", "ssh_cidr=203.0.113.0/24", "-v", "key_name=deployer"];

#[test]
fn validate_succeeds_with_both_inputs() {
    let dir = TempDir::new().unwrap();
    rustform(&dir)
        .arg("validate")
        .args(VARS)
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid"));
}

#[test]
fn validate_fails_without_inputs() {
    let dir = TempDir::new().unwrap();
    rustform(&dir)
        .arg("validate")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Missing required input"));
}

#[test]
fn validate_rejects_malformed_cidr() {
    let dir = TempDir::new().unwrap();
    rustform(&dir)
        .arg("validate")
        .args(["-v", "ssh_cidr=not-a-range", "-v", "key_name=deployer"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("ssh_cidr"));
}

#[test]
fn plan_on_fresh_state_reports_three_to_add() {
    let dir = TempDir::new().unwrap();
    rustform(&dir)
        .arg("plan")
        .args(VARS)
        .assert()
        .success()
        .stdout(predicate::str::contains("3 resource(s) to add"))
        .stdout(predicate::str::contains("+ ami.web"))
        .stdout(predicate::str::contains("+ security_group.web_ssh"))
        .stdout(predicate::str::contains("+ instance.web"));
}

#[test]
fn plan_json_is_machine_readable() {
    let dir = TempDir::new().unwrap();
    let assert = rustform(&dir)
        .arg("plan")
        .arg("--json")
        .args(VARS)
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let plan: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(plan["actions"].as_array().unwrap().len(), 3);
}

#[test]
fn plan_fails_before_touching_state_when_inputs_are_missing() {
    let dir = TempDir::new().unwrap();
    rustform(&dir).arg("plan").assert().failure().code(2);
    // Validation failed first, so no state file appeared.
    assert!(!dir.path().join("rustform.state.json").exists());
}

#[test]
fn graph_lists_the_instance_after_its_dependencies() {
    let dir = TempDir::new().unwrap();
    let assert = rustform(&dir).arg("graph").args(VARS).assert().success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let pos = |needle: &str| stdout.find(needle).unwrap();
    assert!(pos("ami.web") < pos("3. instance.web"));
    assert!(pos("security_group.web_ssh") < pos("3. instance.web"));
    assert!(stdout.contains("after"));
}

#[test]
fn output_warns_when_nothing_is_recorded() {
    let dir = TempDir::new().unwrap();
    rustform(&dir)
        .arg("output")
        .assert()
        .success()
        .stderr(predicate::str::contains("No outputs recorded"));
}

#[test]
fn output_fails_for_an_unknown_name() {
    let dir = TempDir::new().unwrap();
    rustform(&dir)
        .arg("output")
        .arg("public_dns")
        .assert()
        .failure()
        .code(5)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn apply_on_converged_state_reports_every_resource_ok() {
    use rustform::resources::ResourceKind;
    use rustform::state::{RecordedResource, StateFile};

    let dir = TempDir::new().unwrap();
    let mut state = StateFile::default();
    state.record(
        &"ami.web".parse().unwrap(),
        RecordedResource::new(ResourceKind::Ami, "ami-0abc1234"),
    );
    state.record(
        &"security_group.web_ssh".parse().unwrap(),
        RecordedResource::new(ResourceKind::SecurityGroup, "sg-0abc1234"),
    );
    state.record(
        &"instance.web".parse().unwrap(),
        RecordedResource::new(ResourceKind::Instance, "i-0abc1234"),
    );
    state.save(&dir.path().join("rustform.state.json")).unwrap();

    // The plan is empty, so this never reaches the provider.
    rustform(&dir)
        .arg("apply")
        .args(VARS)
        .assert()
        .success()
        .stdout(predicate::str::contains("ok: [ami.web]"))
        .stdout(predicate::str::contains("ok: [security_group.web_ssh]"))
        .stdout(predicate::str::contains("ok: [instance.web]"))
        .stdout(predicate::str::contains("Nothing to do"));
}

#[test]
fn apply_check_mode_makes_no_changes() {
    let dir = TempDir::new().unwrap();
    rustform(&dir)
        .arg("apply")
        .arg("--check")
        .args(VARS)
        .assert()
        .success()
        .stdout(predicate::str::contains("add=3"))
        .stderr(predicate::str::contains("No changes will be made"));
    assert!(!dir.path().join("rustform.state.json").exists());
}
