//! Integration tests for Routerus.
//!
//! These run the compiled binary. None of them touch the network: generation
//! is driven from saved resolved sets.

use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Helper to get the path to the compiled binary
fn get_binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_routerus"))
}

/// Run routerus command and return output
fn run_routerus(args: &[&str]) -> std::process::Output {
    let binary = get_binary_path();
    Command::new(&binary)
        .args(args)
        .output()
        .expect("Failed to execute routerus")
}

const RESOLVED: &str = r#"{
  "categories": {
    "Banks": {
      "sber.ru": ["194.54.14.1", "194.54.14.2", "194.54.14.3", "194.54.14.4", "194.54.14.5", "194.54.14.6"],
      "vtb.ru": ["212.48.202.10"]
    },
    "Maps/Navigation": {
      "yandex.ru": ["5.255.255.5"]
    }
  },
  "failed": ["dead.ru"]
}"#;

fn write_resolved(dir: &Path) -> PathBuf {
    let path = dir.join("resolved.json");
    std::fs::write(&path, RESOLVED).unwrap();
    path
}

#[test]
fn test_version_command() {
    let output = run_routerus(&["version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("routerus"));
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_command() {
    let output = run_routerus(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("generate"));
    assert!(stdout.contains("formats"));
}

#[test]
fn test_formats_command_lists_all() {
    let output = run_routerus(&["formats"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for id in [
        "windows", "linux", "mikrotik", "keenetic", "openvpn", "wireguard", "cisco", "huawei",
        "dlink", "openwrt", "tplink", "asus", "cidr",
    ] {
        assert!(stdout.contains(id), "missing format {}", id);
    }
}

#[test]
fn test_generate_from_resolved() {
    let dir = TempDir::new().unwrap();
    let resolved = write_resolved(dir.path());
    let out = dir.path().join("out");

    let output = run_routerus(&[
        "-q",
        "generate",
        "--from-resolved",
        resolved.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
        "-f",
        "cidr",
        "-f",
        "mikrotik",
    ]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1 of 4 domains failed"), "stdout: {}", stdout);

    let banks = std::fs::read_to_string(out.join("cidr/Banks.txt")).unwrap();
    assert_eq!(
        banks,
        "# Routes for category Banks\n\n\
         194.54.14.0/24 # Banks subnet 194.54.14.0/24\n\
         212.48.202.10/32 # Banks vtb.ru\n"
    );

    let maps = std::fs::read_to_string(out.join("mikrotik/Maps_Navigation.txt")).unwrap();
    assert!(maps.contains(
        "add list=Maps/Navigation address=5.255.255.5/32 comment=\"Maps/Navigation yandex.ru\"\n"
    ));

    let all = std::fs::read_to_string(out.join("cidr/all_routes.txt")).unwrap();
    assert!(all.starts_with("# Routes for all categories\n\n"));
    assert_eq!(all.lines().filter(|l| l.contains(" # ")).count(), 3);

    assert!(out.join("summary.json").exists());
    assert!(!out.join("windows").exists());
}

#[test]
fn test_generate_save_resolved_round_trip() {
    let dir = TempDir::new().unwrap();
    let resolved = write_resolved(dir.path());
    let saved = dir.path().join("saved.json");
    let out = dir.path().join("out");

    let output = run_routerus(&[
        "-q",
        "generate",
        "--from-resolved",
        resolved.to_str().unwrap(),
        "--save-resolved",
        saved.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
        "-f",
        "linux",
    ]);
    assert!(output.status.success());

    let content = std::fs::read_to_string(&saved).unwrap();
    let value: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(value["failed"][0], "dead.ru");
    assert_eq!(value["categories"]["Banks"]["vtb.ru"][0], "212.48.202.10");
}

#[test]
fn test_generate_all_formats_by_default() {
    let dir = TempDir::new().unwrap();
    let resolved = write_resolved(dir.path());
    let out = dir.path().join("out");

    let output = run_routerus(&[
        "-q",
        "generate",
        "--from-resolved",
        resolved.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
    ]);
    assert!(output.status.success());

    let dirs = std::fs::read_dir(&out)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .count();
    assert_eq!(dirs, 13);
}

#[test]
fn test_generate_unknown_format_fails() {
    let dir = TempDir::new().unwrap();
    let resolved = write_resolved(dir.path());

    let output = run_routerus(&[
        "generate",
        "--from-resolved",
        resolved.to_str().unwrap(),
        "-o",
        dir.path().join("out").to_str().unwrap(),
        "-f",
        "junos",
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("junos"), "stderr: {}", stderr);
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_generate_without_input_fails() {
    let output = run_routerus(&["generate"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No input file"), "stderr: {}", stderr);
}

#[test]
fn test_generate_with_config_file() {
    let dir = TempDir::new().unwrap();
    let resolved = write_resolved(dir.path());
    let out = dir.path().join("from-config");
    let config = dir.path().join("routerus.yaml");
    std::fs::write(
        &config,
        format!(
            "output_dir: {}\nformats: [wireguard]\nwrite_summary: false\n",
            out.display()
        ),
    )
    .unwrap();

    let output = run_routerus(&[
        "-q",
        "-c",
        config.to_str().unwrap(),
        "generate",
        "--from-resolved",
        resolved.to_str().unwrap(),
    ]);
    assert!(output.status.success());

    let all = std::fs::read_to_string(out.join("wireguard/all_routes.txt")).unwrap();
    assert!(all.contains("AllowedIPs = 194.54.14.0/24, 212.48.202.10/32, 5.255.255.5/32\n"));
    assert!(!out.join("summary.json").exists());
}

#[test]
fn test_invalid_config_rejected() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("routerus.yaml");
    std::fs::write(&config, "lookup:\n  base_url: http://rapiddns.io\n").unwrap();

    let output = run_routerus(&["-c", config.to_str().unwrap(), "generate", "-i", "domains.txt"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("HTTPS"), "stderr: {}", stderr);
}
