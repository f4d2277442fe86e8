use std::fs;

use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

const MANAGEMENT: &str = "0200105e5f2a00ffffffffff000000070054fbff";
const GPS_ZERO_COUNT: &str = "0100105e5f108000008000003c00ffffff000000";

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("trackdecode"))
}

fn repo_root() -> std::path::PathBuf {
    let manifest = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest
        .parent()
        .and_then(|p| p.parent())
        .expect("repo root")
        .to_path_buf()
}

fn sample_webhook(case: &str) -> std::path::PathBuf {
    repo_root()
        .join("tests")
        .join("golden")
        .join(case)
        .join("input.json")
}

fn stdout_json(assert: assert_cmd::assert::Assert) -> Value {
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    serde_json::from_str(&stdout).expect("valid json")
}

#[test]
fn help_lists_subcommands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("decode").and(contains("webhook")));
    cmd().arg("webhook").arg("--help").assert().success();
}

#[test]
fn decode_prints_management_record() {
    let assert = cmd().arg("decode").arg(MANAGEMENT).assert().success();
    let value = stdout_json(assert);
    let record = &value[0];
    assert_eq!(record["MessageType"], "Management Message");
    assert_eq!(record["BatteryVoltageV"], 8.4);
    assert_eq!(record["NumberOfErrors"], -1);
}

#[test]
fn decode_accepts_several_packets() {
    let assert = cmd()
        .arg("decode")
        .arg(MANAGEMENT)
        .arg(GPS_ZERO_COUNT)
        .assert()
        .success();
    let value = stdout_json(assert);
    assert_eq!(value.as_array().map(Vec::len), Some(2));
    assert_eq!(value[1]["MessageType"], "GPS Message");
    assert!(value[1].get("GPSData1Location").is_none());
}

#[test]
fn decode_odd_hex_shows_error_and_hint() {
    cmd()
        .arg("decode")
        .arg("020")
        .assert()
        .code(2)
        .stderr(contains("error:").and(contains("hint:")).and(contains("malformed hex")));
}

#[test]
fn invalid_log_level_shows_error_and_hint() {
    cmd()
        .arg("--log-level")
        .arg("trackdecode_core=loudest")
        .arg("decode")
        .arg(MANAGEMENT)
        .assert()
        .code(2)
        .stderr(
            contains("error:")
                .and(contains("invalid log filter"))
                .and(contains("hint:")),
        );

    cmd()
        .env("TRACKDECODE_LOG", "trackdecode_core=loudest")
        .arg("decode")
        .arg(MANAGEMENT)
        .assert()
        .code(2)
        .stderr(contains("invalid log filter"));
}

#[test]
fn decode_truncated_packet_fails() {
    cmd()
        .arg("decode")
        .arg("0200105e5f")
        .assert()
        .failure()
        .stderr(contains("truncated packet: need 20 bytes, got 5"));
}

#[test]
fn strict_rejects_zero_sample_count() {
    cmd()
        .arg("decode")
        .arg("--strict")
        .arg(GPS_ZERO_COUNT)
        .assert()
        .failure()
        .stderr(contains("GPS sample count 0 out of range"));
}

#[test]
fn webhook_stdout_outputs_json() {
    let assert = cmd()
        .arg("webhook")
        .arg(sample_webhook("mixed_batch"))
        .arg("--stdout")
        .assert()
        .success();
    let value = stdout_json(assert);
    assert_eq!(value.as_array().map(Vec::len), Some(3));
    assert_eq!(value[2]["device_id"], "353456789012347");
    assert_eq!(value[2]["schema_version"], 1);
}

#[test]
fn webhook_reads_stdin() {
    let body = fs::read_to_string(sample_webhook("management")).expect("read sample");
    let assert = cmd()
        .arg("webhook")
        .arg("-")
        .arg("--stdout")
        .write_stdin(body)
        .assert()
        .success();
    let value = stdout_json(assert);
    assert_eq!(value[0]["measurements"]["TemperatureDegC"], -5);
}

#[test]
fn webhook_glob_decodes_all_matches() {
    let temp = TempDir::new().expect("tempdir");
    for case in ["gps", "sensor"] {
        fs::copy(sample_webhook(case), temp.path().join(format!("{case}.json")))
            .expect("copy sample");
    }
    let pattern = temp.path().join("*.json");

    let assert = cmd()
        .arg("webhook")
        .arg(pattern.to_string_lossy().to_string())
        .arg("--stdout")
        .assert()
        .success();
    let value = stdout_json(assert);
    assert_eq!(value.as_array().map(Vec::len), Some(2));
    assert_eq!(value[0]["measurements"]["MessageType"], "GPS Message");
    assert_eq!(value[1]["measurements"]["MessageType"], "Sensor Message");
}

#[test]
fn webhook_writes_report_file() {
    let temp = TempDir::new().expect("tempdir");
    let report = temp.path().join("out").join("measurements.json");

    cmd()
        .arg("webhook")
        .arg(sample_webhook("gps"))
        .arg("-o")
        .arg(&report)
        .assert()
        .success()
        .stderr(contains("OK:"));

    let written = fs::read_to_string(&report).expect("read report");
    let value: Value = serde_json::from_str(&written).expect("valid json");
    assert_eq!(value[0]["measurements"]["DataCount"], 2);
}

#[test]
fn quiet_suppresses_ok_message() {
    let temp = TempDir::new().expect("tempdir");
    let report = temp.path().join("measurements.json");

    cmd()
        .arg("webhook")
        .arg(sample_webhook("sensor"))
        .arg("-o")
        .arg(report)
        .arg("--quiet")
        .assert()
        .success()
        .stderr(contains("OK:").not());
}

#[test]
fn missing_input_shows_error_and_hint() {
    let temp = TempDir::new().expect("tempdir");
    let missing = temp.path().join("missing.json");
    let report = temp.path().join("measurements.json");

    cmd()
        .arg("webhook")
        .arg(missing)
        .arg("-o")
        .arg(report)
        .assert()
        .failure()
        .stderr(contains("error:").and(contains("hint:")));
}

#[test]
fn report_must_differ_from_input() {
    let temp = TempDir::new().expect("tempdir");
    let input = temp.path().join("capture.json");
    fs::copy(sample_webhook("gps"), &input).expect("copy sample");

    cmd()
        .arg("webhook")
        .arg(&input)
        .arg("-o")
        .arg(&input)
        .assert()
        .failure()
        .stderr(contains("output path must differ from input"));
}

#[test]
fn invalid_webhook_body_fails() {
    let temp = TempDir::new().expect("tempdir");
    let input = temp.path().join("broken.json");
    fs::write(&input, r#"{"Data": "{\"Packets\": []}"}"#).expect("write input");

    cmd()
        .arg("webhook")
        .arg(&input)
        .arg("--stdout")
        .assert()
        .failure()
        .stderr(contains("webhook carries no packets"));
}

#[test]
fn stdout_and_report_conflict() {
    let temp = TempDir::new().expect("tempdir");
    let report = temp.path().join("measurements.json");

    cmd()
        .arg("webhook")
        .arg(sample_webhook("gps"))
        .arg("--stdout")
        .arg("-o")
        .arg(report)
        .assert()
        .failure()
        .stderr(contains("error:"));
}

#[test]
fn pretty_and_compact_conflict() {
    cmd()
        .arg("decode")
        .arg(MANAGEMENT)
        .arg("--pretty")
        .arg("--compact")
        .assert()
        .failure()
        .stderr(contains("error:"));
}
