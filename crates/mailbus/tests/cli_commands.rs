#![cfg(feature = "cli")]

use std::path::PathBuf;
use std::process::{Command, Output};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = PathBuf::from(format!(
        "/tmp/mailbus-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn write_archive_schema(dir: &PathBuf) {
    std::fs::write(
        dir.join("ArchiveIngested.schema.json"),
        r#"{
            "type": "object",
            "properties": {
                "archive_url": { "type": "string" },
                "message_count": { "type": "integer", "minimum": 0 }
            },
            "required": ["archive_url"]
        }"#,
    )
    .expect("schema file should be writable");
}

fn mailbus(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_mailbus"))
        .args(["--log-level", "error", "--format", "json"])
        .args(args)
        .output()
        .expect("mailbus binary should run")
}

#[test]
fn validate_accepts_a_conforming_payload() {
    let dir = unique_temp_dir("validate-ok");
    write_archive_schema(&dir);

    let output = mailbus(&[
        "validate",
        "--schemas",
        dir.to_str().expect("temp path should be utf-8"),
        "--event-type",
        "ArchiveIngested",
        "--json",
        r#"{"archive_url": "mbox://lists/rust-dev", "message_count": 12}"#,
    ]);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be json");
    assert_eq!(report["valid"], true);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn validate_surfaces_every_violation_and_exits_nonzero() {
    let dir = unique_temp_dir("validate-bad");
    write_archive_schema(&dir);

    let output = mailbus(&[
        "validate",
        "--schemas",
        dir.to_str().expect("temp path should be utf-8"),
        "--event-type",
        "ArchiveIngested",
        "--json",
        r#"{"archive_url": 7, "message_count": -1, "stray": true}"#,
    ]);

    assert_eq!(output.status.code(), Some(60));
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be json");
    assert_eq!(report["valid"], false);
    let violations = report["violations"]
        .as_array()
        .expect("violations should be an array");
    assert!(violations.len() >= 3, "got: {violations:?}");
    assert!(violations
        .iter()
        .all(|v| v["path"].as_str().unwrap_or("").starts_with("$.payload")));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn validate_rejects_an_unknown_event_type() {
    let dir = unique_temp_dir("validate-unknown");
    write_archive_schema(&dir);

    let output = mailbus(&[
        "validate",
        "--schemas",
        dir.to_str().expect("temp path should be utf-8"),
        "--event-type",
        "GhostEvent",
        "--json",
        "{}",
    ]);

    assert_eq!(output.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown event type"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn schemas_lists_loaded_event_types() {
    let dir = unique_temp_dir("schemas-list");
    write_archive_schema(&dir);

    let output = mailbus(&[
        "schemas",
        "--schemas",
        dir.to_str().expect("temp path should be utf-8"),
    ]);

    assert_eq!(output.status.code(), Some(0));
    let listing: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be json");
    assert_eq!(listing["count"], 1);
    assert_eq!(listing["event_types"][0], "ArchiveIngested");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn demo_round_trips_over_the_memory_driver() {
    let output = mailbus(&["demo", "--driver", "memory", "--count", "2"]);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("published=2 received=2 invalid_rejected=true"));
}

#[test]
fn demo_fails_fast_on_an_unknown_driver() {
    let output = mailbus(&["demo", "--driver", "kafka"]);
    assert_eq!(output.status.code(), Some(64));
    assert!(String::from_utf8_lossy(&output.stderr).contains("kafka"));
}

#[test]
fn version_prints_the_package_version() {
    let output = mailbus(&["version"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn extended_version_carries_build_provenance() {
    let output = mailbus(&["version", "--extended"]);
    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("build_target:"));
    assert!(stdout.contains("envelope_schema_version: 1"));
    for line in stdout.lines() {
        if let Some(rustc) = line.strip_prefix("rustc: ") {
            assert_ne!(rustc, "unknown", "build script should capture rustc");
        }
    }
}
