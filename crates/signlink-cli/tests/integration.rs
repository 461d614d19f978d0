#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

fn signlink(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("signlink").unwrap();
    cmd.current_dir(dir.path())
        .env("SIGNLINK_ROOT", dir.path())
        .env_remove("SIGNLINK_API_TOKEN")
        .env_remove("SIGNLINK_PORTAL_ID");
    cmd
}

fn write_config(dir: &TempDir, yaml: &str) {
    std::fs::write(dir.path().join("signlink.yaml"), yaml).unwrap();
}

fn stored_file(dir: &TempDir, name: &str, age: Duration) -> std::path::PathBuf {
    let store = dir.path().join(".signlink/signatures");
    std::fs::create_dir_all(&store).unwrap();
    let path = store.join(name);
    std::fs::write(&path, b"png").unwrap();
    let file = std::fs::File::options().write(true).open(&path).unwrap();
    file.set_modified(SystemTime::now() - age).unwrap();
    path
}

// ---------------------------------------------------------------------------
// signlink config
// ---------------------------------------------------------------------------

#[test]
fn config_check_fails_without_credentials() {
    let dir = TempDir::new().unwrap();
    signlink(&dir)
        .args(["config", "check"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("[error] api_token is empty"))
        .stderr(predicate::str::contains("config validation found errors"));
}

#[test]
fn config_check_accepts_env_credentials() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "folder_id: '777'\n");
    signlink(&dir)
        .env("SIGNLINK_API_TOKEN", "pat-env")
        .env("SIGNLINK_PORTAL_ID", "4455")
        .args(["config", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config is valid"));
}

#[test]
fn config_check_json_lists_warnings() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "api_token: t\nportal_id: '1'\n");
    let output = signlink(&dir)
        .args(["--json", "config", "check"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let warnings = value["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0]["level"], "warning");
}

#[test]
fn config_init_writes_defaults_once() {
    let dir = TempDir::new().unwrap();
    signlink(&dir)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));
    let yaml = std::fs::read_to_string(dir.path().join("signlink.yaml")).unwrap();
    let parsed: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(parsed["retention_days"], serde_yaml::Value::from(7));

    signlink(&dir)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("left unchanged"));
}

#[test]
fn config_show_redacts_token() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "api_token: pat-very-secret\nportal_id: '1'\n");
    signlink(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pat-very-secret").not())
        .stdout(predicate::str::contains("portal_id"));
}

#[test]
fn malformed_config_is_reported() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "retention_days: [not, a, number]\n");
    signlink(&dir)
        .args(["config", "check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load signlink.yaml"));
}

// ---------------------------------------------------------------------------
// signlink sweep
// ---------------------------------------------------------------------------

#[test]
fn sweep_removes_only_expired_signatures() {
    let dir = TempDir::new().unwrap();
    let old = stored_file(
        &dir,
        "signature_1600000000_abcDEF123456.png",
        Duration::from_secs(8 * 24 * 3600),
    );
    let fresh = stored_file(
        &dir,
        "signature_1700000000_ghiJKL789012.gif",
        Duration::from_secs(3600),
    );
    let foreign = stored_file(&dir, "keep-me.txt", Duration::from_secs(30 * 24 * 3600));

    signlink(&dir)
        .arg("sweep")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 of 2 stored signature(s) removed"));

    assert!(!old.exists());
    assert!(fresh.exists());
    assert!(foreign.exists());
}

#[test]
fn sweep_retention_override() {
    let dir = TempDir::new().unwrap();
    let path = stored_file(
        &dir,
        "signature_1700000000_abcDEF123456.jpg",
        Duration::from_secs(2 * 24 * 3600),
    );

    let output = signlink(&dir)
        .args(["--json", "sweep", "--retention-days", "1"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["scanned"], 1);
    assert_eq!(
        report["deleted"],
        serde_json::json!(["signature_1700000000_abcDEF123456.jpg"])
    );
    assert!(!path.exists());
}

#[test]
fn sweep_without_storage_is_a_no_op() {
    let dir = TempDir::new().unwrap();
    signlink(&dir)
        .arg("sweep")
        .assert()
        .success()
        .stdout(predicate::str::contains("0 of 0"));
}
