use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

const SNAPSHOT: &str = r#"{
  "title": "Cup final",
  "meeting_spot": { "label": "Stadium", "location": { "lat": 35.0, "lng": 139.0 } },
  "households": [
    { "name": "Aoki", "lat": 35.03, "lng": 139.0, "children": "Ken",
      "capacity": 4, "go_ok": true, "back_ok": true },
    { "name": "Baba", "lat": 35.02, "lng": 139.0, "children": "Mio, Rin" },
    { "name": "Chiba", "address": "Harbour 3", "children": "Sora" }
  ]
}"#;

fn carpool(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_carpool"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("CARPOOL_NEAR_THRESHOLD_KM")
        .output()
        .expect("failed to run carpool binary")
}

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn plan_prints_text_for_both_legs() {
    let dir = TempDir::new().unwrap();
    let input = write_file(dir.path(), "event.json", SNAPSHOT);

    let output = carpool(&["plan", "--input", input.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let text = stdout(&output);
    assert!(text.starts_with("Cup final"));
    assert!(text.contains("[go]"));
    assert!(text.contains("[back]"));
    assert!(text.contains("Aoki [Ken, Mio, Rin]: Aoki → Baba → Stadium"));
    assert!(text.contains("Unplaced: Sora"));
    assert!(text.contains("Unlocated: Chiba"));
}

#[test]
fn plan_json_for_one_leg_parses() {
    let dir = TempDir::new().unwrap();
    let input = write_file(dir.path(), "event.json", SNAPSHOT);

    let output = carpool(&[
        "plan",
        "--input",
        input.to_str().unwrap(),
        "--direction",
        "back",
        "--format",
        "json",
    ]);
    assert!(output.status.success());

    let plan: Value = serde_json::from_str(&stdout(&output)).unwrap();
    let legs = plan["legs"].as_array().unwrap();
    assert_eq!(legs.len(), 1);
    assert_eq!(legs[0]["direction"], "back");
    assert_eq!(legs[0]["routes"][0]["route"]["stops"][0]["kind"], "meeting_spot");
    assert_eq!(plan["fingerprint"].as_str().unwrap().len(), 64);
}

#[test]
fn geocode_table_resolves_missing_households() {
    let dir = TempDir::new().unwrap();
    let input = write_file(dir.path(), "event.json", SNAPSHOT);
    let table = write_file(
        dir.path(),
        "geocode.json",
        r#"{ "harbour 3": { "lat": 35.025, "lng": 139.0 } }"#,
    );
    let out = dir.path().join("plan.json");

    let output = carpool(&[
        "plan",
        "--input",
        input.to_str().unwrap(),
        "--geocode-table",
        table.to_str().unwrap(),
        "--direction",
        "go",
        "--format",
        "json",
        "--output",
        out.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout(&output).is_empty());

    let plan: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    let assignment = &plan["legs"][0]["assignment"];
    assert!(assignment["unplaced"].as_array().unwrap().is_empty());
    assert!(assignment["unlocated"].as_array().unwrap().is_empty());
}

#[test]
fn route_prints_gathering_order() {
    let dir = TempDir::new().unwrap();
    let input = write_file(dir.path(), "event.json", SNAPSHOT);

    let output = carpool(&["route", "--input", input.to_str().unwrap()]);
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("Aoki → Baba → Stadium"));
}

#[test]
fn route_without_meeting_spot_location_prints_no_route() {
    let dir = TempDir::new().unwrap();
    let input = write_file(
        dir.path(),
        "event.json",
        r#"{
  "title": "Away game",
  "meeting_spot": { "label": "Gate" },
  "households": [
    { "name": "Aoki", "lat": 35.03, "lng": 139.0, "children": "Ken", "capacity": 4, "go_ok": true }
  ]
}"#,
    );
    let input = input.to_str().unwrap();

    let text = carpool(&["route", "--input", input]);
    assert!(text.status.success(), "stderr: {}", String::from_utf8_lossy(&text.stderr));
    assert!(stdout(&text).starts_with("(no route)"));

    let json = carpool(&["route", "--input", input, "--format", "json"]);
    assert!(json.status.success());
    let route: Value = serde_json::from_str(&stdout(&json)).unwrap();
    assert!(route["stops"].as_array().unwrap().is_empty());

    let plan = carpool(&["plan", "--input", input]);
    assert!(plan.status.success(), "stderr: {}", String::from_utf8_lossy(&plan.stderr));
}

#[test]
fn contract_and_input_errors_fail() {
    let dir = TempDir::new().unwrap();

    let missing = carpool(&["plan", "--input", dir.path().join("nope.json").to_str().unwrap()]);
    assert!(!missing.status.success());

    let bad = write_file(
        dir.path(),
        "bad.json",
        r#"{ "households": [
            { "name": "X", "lat": 35.0, "lng": 139.0, "capacity": -1, "go_ok": true }
        ] }"#,
    );
    let negative = carpool(&["plan", "--input", bad.to_str().unwrap()]);
    assert!(!negative.status.success());
    assert!(String::from_utf8_lossy(&negative.stderr).contains("negative capacity"));

    let input = write_file(dir.path(), "event.json", SNAPSHOT);
    let threshold = carpool(&[
        "plan",
        "--input",
        input.to_str().unwrap(),
        "--near-threshold-km",
        "-3",
    ]);
    assert!(!threshold.status.success());
}
