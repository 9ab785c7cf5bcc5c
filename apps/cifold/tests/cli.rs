use assert_cmd::Command;
use cifold_ingest_jsonl::to_jsonl;
use cifold_schema::event::RunEvent;
use cifold_schema::report::Report;
use cifold_schema::result::AggregatedResult;
use cifold_schema::scope::Scope;
use cifold_section::{markers_balanced, scan_markers};
use cifold_testkit::{make_scenario_result, make_step_result};
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn recorded_run() -> Vec<RunEvent> {
    let step = make_step_result("when_user_registers")
        .mark_failed()
        .with_started_at(1.0)
        .with_ended_at(3.0);
    let scope = Scope::new().with("key", "val");
    let failed = make_scenario_result("register user")
        .mark_failed()
        .with_scope(scope.clone())
        .with_step(step.clone());
    vec![
        RunEvent::Startup,
        RunEvent::ScenarioRun {
            scenario_result: make_scenario_result("register user"),
        },
        RunEvent::step_failed(step, Some(scope)),
        RunEvent::ScenarioReported {
            aggregated_result: AggregatedResult::single(failed),
        },
        RunEvent::Cleanup {
            report: Report {
                total: 1,
                failed: 1,
                elapsed: 2.0,
                ..Report::default()
            },
        },
    ]
}

fn write_events(dir: &Path) -> PathBuf {
    let path = dir.join("run.jsonl");
    std::fs::write(&path, to_jsonl(&recorded_run()).unwrap()).unwrap();
    path
}

fn cifold() -> Command {
    let mut cmd = Command::cargo_bin("cifold").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

const STEPS_LOG: &str = concat!(
    "Scenarios\n",
    "* scenarios\n",
    " ✗ register user\n",
    "\x1b[0Ksection_start:1:section-1[collapsed=true]\r\x1b[0K",
    "   ✗ when_user_registers\n",
    "     key: \n",
    "\"val\"\n",
    "\x1b[0Ksection_end:3:section-1\r\x1b[0K",
    "\n",
    "# 1 scenario, 0 passed, 1 failed, 0 skipped (2.00s)\n",
);

#[test]
fn renders_steps_mode_to_stdout() {
    let tmp = TempDir::new().unwrap();
    let events = write_events(tmp.path());

    cifold()
        .args(["render", "--plain", "--deterministic-ids"])
        .arg("--events")
        .arg(&events)
        .args(["--gitlab-collapsable", "steps"])
        .assert()
        .success()
        .stdout(STEPS_LOG);
}

#[test]
fn config_file_selects_mode() {
    let tmp = TempDir::new().unwrap();
    let events = write_events(tmp.path());
    let config = tmp.path().join("cifold.yaml");
    std::fs::write(&config, "collapsable: steps\n").unwrap();

    cifold()
        .args(["render", "--plain", "--deterministic-ids"])
        .arg("--events")
        .arg(&events)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(STEPS_LOG);
}

#[test]
fn no_collapsable_flag_overrides_config_file() {
    let tmp = TempDir::new().unwrap();
    let events = write_events(tmp.path());
    let config = tmp.path().join("cifold.json");
    std::fs::write(&config, r#"{"collapsable": "vars"}"#).unwrap();

    cifold()
        .args(["render", "--plain", "--no-gitlab-collapsable"])
        .arg("--events")
        .arg(&events)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("section_start").not())
        .stdout(predicate::str::contains("   ✗ when_user_registers\n"));
}

#[test]
fn conflicting_mode_flags_fail_before_output() {
    let tmp = TempDir::new().unwrap();
    let events = write_events(tmp.path());

    cifold()
        .args(["render", "--gitlab-collapsable", "vars", "--no-gitlab-collapsable"])
        .arg("--events")
        .arg(&events)
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("cannot be used together"));
}

#[test]
fn random_ids_still_pair_up() {
    let tmp = TempDir::new().unwrap();
    let events = write_events(tmp.path());
    let output = tmp.path().join("job.log");

    cifold()
        .args(["render", "--gitlab-collapsable", "vars"])
        .arg("--events")
        .arg(&events)
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let log = std::fs::read_to_string(&output).unwrap();
    let markers = scan_markers(&log);
    assert_eq!(markers.len(), 2);
    assert!(markers_balanced(&markers));
    assert_eq!(markers[0].id().len(), 36);
}

#[test]
fn malformed_events_report_line() {
    let tmp = TempDir::new().unwrap();
    let events = tmp.path().join("bad.jsonl");
    std::fs::write(&events, "{\"type\":\"startup\"}\n{\"type\":\n").unwrap();

    cifold()
        .arg("render")
        .arg("--events")
        .arg(&events)
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn missing_events_file_fails() {
    let tmp = TempDir::new().unwrap();
    cifold()
        .arg("render")
        .arg("--events")
        .arg(tmp.path().join("absent.jsonl"))
        .assert()
        .failure();
}

#[test]
fn json_diagnostics_without_time_go_to_stderr() {
    let tmp = TempDir::new().unwrap();
    let events = write_events(tmp.path());

    cifold()
        .args(["render", "--plain", "--deterministic-ids"])
        .args(["--log-level", "info", "--log-format", "json", "--log-without-time"])
        .arg("--events")
        .arg(&events)
        .assert()
        .success()
        .stdout(predicate::str::contains("replaying run").not())
        .stderr(predicate::str::contains("replaying run"))
        .stderr(predicate::str::contains("\"timestamp\"").not());
}

#[test]
fn help_lists_reporter_flags() {
    cifold()
        .args(["render", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--gitlab-collapsable"))
        .stdout(predicate::str::contains("--tb-max-frames"));
}
