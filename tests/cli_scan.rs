use std::path::PathBuf;
use std::process::Command;

fn data_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

fn bloodbeacon() -> Command {
    Command::new(env!("CARGO_BIN_EXE_bloodbeacon"))
}

#[test]
fn scan_with_config_renders_json() {
    let config = data_path("bloodbeacon.toml");
    let output = bloodbeacon()
        .args([
            "scan",
            "--gender",
            "male",
            "--age",
            "65",
            "--hypertension",
            "1",
            "--heart-disease",
            "0",
            "--hba1c",
            "7.2",
            "--glucose",
            "210",
            "--bmi",
            "31",
            "--format",
            "json",
            "--config",
            config.to_str().expect("path str"),
        ])
        .output()
        .expect("run bloodbeacon cli");

    assert!(output.status.success(), "CLI failed: {output:?}");
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(value["classifier_label"], 1);
    assert_eq!(value["risk_score"]["value"], 1.0);
}

#[test]
fn scan_from_inputs_file_renders_text() {
    let output = bloodbeacon()
        .args([
            "scan",
            "--inputs",
            data_path("patient.toml").to_str().expect("path str"),
            "--model",
            data_path("forest.toml").to_str().expect("path str"),
            "--scaler",
            data_path("scaler.toml").to_str().expect("path str"),
        ])
        .output()
        .expect("run bloodbeacon cli");

    assert!(output.status.success(), "CLI failed: {output:?}");
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    assert!(stdout.contains("Threat Index: 100.0%"));
    assert!(stdout.contains("HIGH RISK DETECTED"));
}

#[test]
fn scan_without_bmi_is_blocked_before_loading_artifacts() {
    let tmp = tempfile::tempdir().expect("temporary directory");
    let status = bloodbeacon()
        .current_dir(tmp.path())
        .args([
            "scan",
            "--gender",
            "female",
            "--age",
            "40",
            "--hypertension",
            "0",
            "--heart-disease",
            "0",
            "--hba1c",
            "5.4",
            "--glucose",
            "100",
            "--weight-kg",
            "70",
        ])
        .status()
        .expect("run bloodbeacon cli");

    // No artifacts exist in the temporary directory; a blocked scan must not care.
    assert_eq!(status.code(), Some(2));
}

#[test]
fn missing_artifacts_exit_with_failure() {
    let tmp = tempfile::tempdir().expect("temporary directory");
    let status = bloodbeacon()
        .current_dir(tmp.path())
        .args([
            "scan",
            "--inputs",
            data_path("patient.toml").to_str().expect("path str"),
        ])
        .status()
        .expect("run bloodbeacon cli");

    assert_eq!(status.code(), Some(1));
}

#[test]
fn bmi_subcommand_prints_two_decimals() {
    let output = bloodbeacon()
        .args(["bmi", "--weight-kg", "70", "--height-cm", "170"])
        .output()
        .expect("run bloodbeacon cli");

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "24.22");
}

#[test]
fn inputs_file_with_coded_indicators_is_accepted() {
    let output = bloodbeacon()
        .args([
            "scan",
            "--inputs",
            data_path("patient_coded.toml").to_str().expect("path str"),
            "--config",
            data_path("bloodbeacon.toml").to_str().expect("path str"),
            "--format",
            "JSON",
        ])
        .output()
        .expect("run bloodbeacon cli");

    assert!(output.status.success(), "CLI failed: {output:?}");
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(value["classifier_label"], 1);
}

#[test]
fn unreadable_inputs_file_exits_as_bad_input() {
    let tmp = tempfile::tempdir().expect("temporary directory");
    let path = tmp.path().join("patient.toml");
    std::fs::write(&path, "gender = \"male\"\nage = 65\nhypertension = 3\n")
        .expect("write inputs");
    let status = bloodbeacon()
        .current_dir(tmp.path())
        .args(["scan", "--inputs", path.to_str().expect("path str")])
        .status()
        .expect("run bloodbeacon cli");

    assert_eq!(status.code(), Some(2));
}

#[test]
fn bmi_subcommand_refuses_zero_height() {
    let output = bloodbeacon()
        .args(["bmi", "--weight-kg", "70", "--height-cm", "0"])
        .output()
        .expect("run bloodbeacon cli");

    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("height_cm"));
}
