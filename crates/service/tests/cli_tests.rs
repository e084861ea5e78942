//! Integration tests for the eclipse-guardian CLI
//!
//! Each test runs the binary in a scratch directory so no stray config file
//! is picked up.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use guardian_test_helpers::prelude::*;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

#[allow(deprecated, reason = "cargo_bin is the stable way to locate the built binary")]
fn guardian(dir: &TempDir) -> Result<Command, Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("eclipse-guardian")?;
    cmd.current_dir(dir.path())
        .env("NO_COLOR", "1")
        .env_remove("ECLIPSE_GUARDIAN_CONFIG")
        .env_remove("RUST_LOG");
    Ok(cmd)
}

fn write_model(dir: &TempDir) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let path = dir.path().join("if_model.json");
    fs::write(&path, model_json(&stump_forest())?)?;
    Ok(path)
}

fn write_config(dir: &TempDir, yaml: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let path = dir.path().join("guardian.yaml");
    fs::write(&path, yaml)?;
    Ok(path)
}

fn stdout_json(output: &std::process::Output) -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::from_slice(&output.stdout)?)
}

#[test]
fn test_help_lists_subcommands() -> TestResult {
    let dir = TempDir::new()?;
    guardian(&dir)?
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("score"))
        .stdout(predicate::str::contains("check-model"));
    Ok(())
}

#[test]
fn test_config_prints_defaults_without_file() -> TestResult {
    let dir = TempDir::new()?;
    guardian(&dir)?
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("sample_rate_hz: 10000"))
        .stdout(predicate::str::contains("dwell_hits: 2"));
    Ok(())
}

#[test]
fn test_config_json_reflects_file() -> TestResult {
    let dir = TempDir::new()?;
    let config = write_config(&dir, "fdir:\n  hold_ms: 25\n")?;
    let output = guardian(&dir)?
        .args(["config", "--json", "--config"])
        .arg(&config)
        .output()?;
    assert!(output.status.success());

    let json = stdout_json(&output)?;
    assert_eq!(json["fdir"]["hold_ms"], 25);
    assert_eq!(json["fdir"]["verify_ms"], 100);
    Ok(())
}

#[test]
fn test_invalid_config_exits_with_code_2() -> TestResult {
    let dir = TempDir::new()?;
    let config = write_config(&dir, "sampling:\n  hop_ms: 0\n")?;
    guardian(&dir)?
        .arg("config")
        .arg("--config")
        .arg(&config)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("hop_ms"));
    Ok(())
}

#[test]
fn test_unknown_config_key_exits_with_code_2() -> TestResult {
    let dir = TempDir::new()?;
    let config = write_config(&dir, "sampling:\n  hop_len: 3\n")?;
    guardian(&dir)?
        .arg("config")
        .arg("--config")
        .arg(&config)
        .assert()
        .code(2);
    Ok(())
}

#[test]
fn test_check_model_json() -> TestResult {
    let dir = TempDir::new()?;
    let model = write_model(&dir)?;
    let output = guardian(&dir)?
        .args(["check-model", "--json", "--model"])
        .arg(&model)
        .output()?;
    assert!(output.status.success());

    let json = stdout_json(&output)?;
    assert_eq!(json["success"], true);
    assert_eq!(json["model"]["num_trees"], 1);
    assert_eq!(json["model"]["num_nodes"], 3);
    Ok(())
}

#[test]
fn test_score_flags_latch_up_vector() -> TestResult {
    let dir = TempDir::new()?;
    let model = write_model(&dir)?;
    let output = guardian(&dir)?
        .args(["score", "--json", "--model"])
        .arg(&model)
        .arg("0.95,0,0,0.78,0")
        .output()?;
    assert!(output.status.success());

    let json = stdout_json(&output)?;
    assert_eq!(json["is_anomaly"], true);
    assert!(json["rule_hit"].is_null());
    let score = json["anomaly_score"].as_f64().ok_or("score missing")?;
    assert!(score > 0.9, "score {score}");
    Ok(())
}

#[test]
fn test_score_human_nominal_vector() -> TestResult {
    let dir = TempDir::new()?;
    let model = write_model(&dir)?;
    guardian(&dir)?
        .args(["score", "--model"])
        .arg(&model)
        .arg("0.01,0.001,0,0.78,0")
        .assert()
        .success()
        .stdout(predicate::str::contains("Is Anomaly: No"))
        .stdout(predicate::str::contains("Guard rail: none"));
    Ok(())
}

#[test]
fn test_score_bad_vector_exits_with_code_2() -> TestResult {
    let dir = TempDir::new()?;
    let model = write_model(&dir)?;
    guardian(&dir)?
        .args(["score", "--model"])
        .arg(&model)
        .arg("0.1,0.2,0.3")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("exactly 5"));
    Ok(())
}

#[test]
fn test_missing_model_exits_with_code_3() -> TestResult {
    let dir = TempDir::new()?;
    guardian(&dir)?
        .args(["score", "0.1,0.2,0.3,0.4,0.5"])
        .assert()
        .code(3);
    Ok(())
}

#[test]
fn test_unreadable_model_exits_with_code_3() -> TestResult {
    let dir = TempDir::new()?;
    let model = dir.path().join("broken.json");
    fs::write(&model, "{ not json")?;
    guardian(&dir)?
        .args(["check-model", "--json", "--model"])
        .arg(&model)
        .assert()
        .code(3)
        .stdout(predicate::str::contains("\"success\": false"));
    Ok(())
}

#[test]
fn test_run_bounded_loop() -> TestResult {
    let dir = TempDir::new()?;
    let model = write_model(&dir)?;
    let config = write_config(
        &dir,
        &format!(
            "model_path: {}\nruntime:\n  realtime: false\n  lock_memory: false\n",
            model.display()
        ),
    )?;
    guardian(&dir)?
        .args(["run", "--max-ticks", "20", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "IF threshold = 0.560000 ; loop hop = 1 ms",
        ));
    Ok(())
}

#[test]
fn test_run_json_summary() -> TestResult {
    let dir = TempDir::new()?;
    let model = write_model(&dir)?;
    let config = write_config(&dir, "runtime:\n  realtime: false\n  lock_memory: false\n")?;
    let output = guardian(&dir)?
        .args(["run", "--json", "--max-ticks", "10", "--config"])
        .arg(&config)
        .arg("--model")
        .arg(&model)
        .output()?;
    assert!(output.status.success());

    let json = stdout_json(&output)?;
    assert_eq!(json["run"]["ticks"], 10);
    assert_eq!(json["run"]["not_ready_ticks"], 1);
    assert_eq!(json["run"]["final_state"], "normal");
    Ok(())
}
