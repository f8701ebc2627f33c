use std::path::Path;
use std::process::{Command, Output};

fn statuspanel(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_statuspanel"))
        .env("HOME", home)
        .env_remove("STATUSPANEL_LOG_LEVEL")
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn help_lists_modes() {
    let home = tempfile::tempdir().unwrap();
    let out = statuspanel(home.path(), &["--help"]);
    assert!(out.status.success());
    let text = String::from_utf8_lossy(&out.stdout);
    assert!(text.contains("--mode <mode>"));
    assert!(text.contains("--snapshot"));
}

#[test]
fn version_matches_package() {
    let home = tempfile::tempdir().unwrap();
    let out = statuspanel(home.path(), &["--version"]);
    assert!(out.status.success());
    assert_eq!(
        String::from_utf8_lossy(&out.stdout).trim(),
        env!("CARGO_PKG_VERSION")
    );
}

#[test]
fn snapshot_prints_json() {
    let home = tempfile::tempdir().unwrap();
    let out = statuspanel(home.path(), &["--snapshot"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    for key in ["cpu_percent", "temperature", "memory_percent", "wifi", "time"] {
        assert!(json.get(key).is_some(), "missing {key}");
    }
}

#[test]
fn snapshot_without_home_uses_defaults() {
    let out = Command::new(env!("CARGO_BIN_EXE_statuspanel"))
        .env_remove("HOME")
        .env("STATUSPANEL_LOG_LEVEL", "debug")
        .arg("--snapshot")
        .output()
        .unwrap();
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert!(json.get("wifi").is_some());
    assert!(String::from_utf8_lossy(&out.stderr).contains("HOME not set"));
}

#[test]
fn unknown_flag_fails_with_message() {
    let home = tempfile::tempdir().unwrap();
    let out = statuspanel(home.path(), &["--bogus"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("unknown flag '--bogus'"));
}

#[test]
fn bad_config_file_is_reported() {
    let home = tempfile::tempdir().unwrap();
    let dir = home.path().join(".status_panel");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), "smoothing_factor = 2\n").unwrap();
    let out = statuspanel(home.path(), &["--snapshot"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("smoothing_factor"));
}
