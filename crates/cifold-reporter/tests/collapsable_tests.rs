use cifold_config::{CollapsableMode, ReporterConfig};
use cifold_ids::{SectionId, SequentialSectionIds};
use cifold_reporter::GitlabReporter;
use cifold_schema::event::RunEvent;
use cifold_schema::result::{AggregatedResult, ScenarioResult};
use cifold_schema::scope::Scope;
use cifold_schema::status::{ScenarioStatus, StepStatus};
use cifold_section::{Marker, markers_balanced, section_end, section_start};
use cifold_testkit::{
    PrinterCall, RecordingPrinter, make_exc_info, make_scenario_result, make_step_result,
};

type Reporter = GitlabReporter<RecordingPrinter, SequentialSectionIds>;

fn reporter(mode: Option<CollapsableMode>) -> Reporter {
    GitlabReporter::with_section_ids(RecordingPrinter::new(), SequentialSectionIds::default())
        .with_config(ReporterConfig::default().with_collapsable(mode))
}

fn key_val_scope() -> Scope {
    Scope::new().with("key", "val")
}

/// One failed step running from 1.0 to 3.0 that leaves `{"key": "val"}`.
fn failed_with_one_step() -> ScenarioResult {
    make_scenario_result("register user")
        .mark_failed()
        .with_scope(key_val_scope())
        .with_step(
            make_step_result("when_user_registers")
                .mark_failed()
                .with_started_at(1.0)
                .with_ended_at(3.0),
        )
}

/// Feed run + step events for `result`, then drop the namespace output.
fn run(reporter: &mut Reporter, result: &ScenarioResult, scopes: &[Scope]) {
    reporter
        .handle(&RunEvent::ScenarioRun {
            scenario_result: make_scenario_result(&result.scenario.subject),
        })
        .unwrap();
    for (step, scope) in result.step_results.iter().zip(scopes) {
        let event = if step.is_failed() {
            RunEvent::step_failed(step.clone(), Some(scope.clone()))
        } else {
            RunEvent::step_passed(step.clone(), Some(scope.clone()))
        };
        reporter.handle(&event).unwrap();
    }
    reporter.printer_mut().take_calls();
}

fn report(reporter: &mut Reporter, aggregated: AggregatedResult) -> Vec<PrinterCall> {
    reporter
        .handle(&RunEvent::ScenarioReported {
            aggregated_result: aggregated,
        })
        .unwrap();
    reporter.printer_mut().take_calls()
}

fn subject_call(status: ScenarioStatus) -> PrinterCall {
    PrinterCall::ScenarioSubject {
        subject: "register user".into(),
        status,
        elapsed: None,
        prefix: " ".into(),
    }
}

fn step_call() -> PrinterCall {
    PrinterCall::StepName {
        name: "when_user_registers".into(),
        status: StepStatus::Failed,
        elapsed: Some(2.0),
        prefix: "   ".into(),
    }
}

fn start(id: &str, ts: i64) -> PrinterCall {
    PrinterCall::Raw(section_start(&SectionId::from(id), ts, true))
}

fn end(id: &str, ts: i64) -> PrinterCall {
    PrinterCall::Raw(section_end(&SectionId::from(id), ts))
}

fn key_val_calls() -> [PrinterCall; 2] {
    [
        PrinterCall::ScopeKey {
            key: "key".into(),
            indent: 5,
            line_break: true,
        },
        PrinterCall::ScopeVal("\"val\"".into()),
    ]
}

#[test]
fn steps_mode_folds_each_step_with_its_timestamps() {
    let mut r = reporter(Some(CollapsableMode::Steps));
    let result = failed_with_one_step();
    run(&mut r, &result, &[key_val_scope()]);

    let calls = report(&mut r, AggregatedResult::single(result));

    let [key, val] = key_val_calls();
    assert_eq!(
        calls,
        [
            subject_call(ScenarioStatus::Failed),
            start("section-1", 1),
            step_call(),
            key,
            val,
            end("section-1", 3),
        ]
    );
}

#[test]
fn vars_mode_folds_each_variable() {
    let mut r = reporter(Some(CollapsableMode::Vars));
    let result = failed_with_one_step();
    run(&mut r, &result, &[key_val_scope()]);

    let calls = report(&mut r, AggregatedResult::single(result));

    let [key, val] = key_val_calls();
    assert_eq!(
        calls,
        [
            subject_call(ScenarioStatus::Failed),
            step_call(),
            start("section-1", 0),
            key,
            val,
            end("section-1", 0),
        ]
    );
}

#[test]
fn scope_mode_folds_the_whole_scope() {
    let mut r = reporter(Some(CollapsableMode::Scope));
    let result = failed_with_one_step();
    run(&mut r, &result, &[key_val_scope()]);

    let calls = report(&mut r, AggregatedResult::single(result));

    assert_eq!(
        calls,
        [
            subject_call(ScenarioStatus::Failed),
            step_call(),
            start("section-1", 0),
            PrinterCall::Scope(key_val_scope()),
            end("section-1", 0),
        ]
    );
}

#[test]
fn flat_mode_writes_no_markers() {
    let mut r = reporter(None);
    let result = failed_with_one_step();
    run(&mut r, &result, &[key_val_scope()]);

    let calls = report(&mut r, AggregatedResult::single(result));

    assert_eq!(calls, [subject_call(ScenarioStatus::Failed), step_call()]);
}

fn three_step_failure() -> (ScenarioResult, Vec<Scope>) {
    let scopes = vec![
        Scope::new().with("user", "bob"),
        Scope::new().with("user", "bob").with("token", "t0k"),
        Scope::new()
            .with("user", "bob")
            .with("token", "t0k")
            .with("response", 500)
            .with("body", "oops"),
    ];
    let result = make_scenario_result("login")
        .mark_failed()
        .with_scope(scopes[2].clone())
        .with_step(make_step_result("given_user").mark_passed())
        .with_step(make_step_result("when_login").mark_passed())
        .with_step(
            make_step_result("then_ok")
                .mark_failed()
                .with_exc_info(make_exc_info("AssertionError", "500 != 200")),
        );
    (result, scopes)
}

fn section_count(calls: &[PrinterCall]) -> usize {
    calls
        .iter()
        .filter(|c| matches!(c, PrinterCall::Raw(raw) if raw.contains("section_start")))
        .count()
}

#[test]
fn section_counts_per_mode() {
    for (mode, expected) in [
        (CollapsableMode::Steps, 3),
        (CollapsableMode::Vars, 4),
        (CollapsableMode::Scope, 1),
    ] {
        let mut r = reporter(Some(mode));
        let (result, scopes) = three_step_failure();
        run(&mut r, &result, &scopes);
        let calls = report(&mut r, AggregatedResult::single(result));
        assert_eq!(section_count(&calls), expected, "mode {mode}");
    }
}

#[test]
fn steps_mode_attributes_keys_to_introducing_step() {
    let mut r = reporter(Some(CollapsableMode::Steps));
    let (result, scopes) = three_step_failure();
    run(&mut r, &result, &scopes);
    let calls = report(&mut r, AggregatedResult::single(result));

    let keys_between = |step: &str| -> Vec<String> {
        calls
            .iter()
            .skip_while(|c| !matches!(c, PrinterCall::StepName { name, .. } if name == step))
            .skip(1)
            .take_while(|c| !c.is_raw())
            .filter_map(|c| match c {
                PrinterCall::ScopeKey { key, .. } => Some(key.clone()),
                _ => None,
            })
            .collect()
    };
    assert_eq!(keys_between("given_user"), ["user"]);
    assert_eq!(keys_between("when_login"), ["token"]);
    assert_eq!(keys_between("then_ok"), ["response", "body"]);
}

fn scope_keys(calls: &[PrinterCall]) -> Vec<String> {
    calls
        .iter()
        .filter_map(|c| match c {
            PrinterCall::ScopeKey { key, .. } => Some(key.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn repeated_step_name_prints_each_key_once() {
    let scopes = vec![
        Scope::new().with("a", 1),
        Scope::new().with("a", 1).with("b", 2),
    ];
    for mode in [CollapsableMode::Steps, CollapsableMode::Vars] {
        let mut r = reporter(Some(mode));
        let result = make_scenario_result("retry step")
            .mark_failed()
            .with_scope(scopes[1].clone())
            .with_step(make_step_result("step").mark_passed())
            .with_step(make_step_result("step").mark_failed());
        run(&mut r, &result, &scopes);
        let calls = report(&mut r, AggregatedResult::single(result));
        assert_eq!(scope_keys(&calls), ["a", "b"], "mode {mode}");

        let second_step = calls
            .iter()
            .rposition(|c| matches!(c, PrinterCall::StepName { .. }))
            .unwrap();
        assert_eq!(scope_keys(&calls[second_step..]), ["b"], "mode {mode}");
    }
}

#[test]
fn exception_follows_failed_step_line() {
    let mut r = reporter(Some(CollapsableMode::Steps));
    let (result, scopes) = three_step_failure();
    run(&mut r, &result, &scopes);
    let calls = report(&mut r, AggregatedResult::single(result));

    let step_at = calls
        .iter()
        .position(|c| matches!(c, PrinterCall::StepName { name, .. } if name == "then_ok"))
        .unwrap();
    match &calls[step_at + 1] {
        PrinterCall::Exception { exc_info, options } => {
            assert_eq!(exc_info.type_name, "AssertionError");
            assert_eq!(options.max_frames, 8);
        }
        other => panic!("expected exception, got {other:?}"),
    }
}

#[test]
fn markers_pair_up_with_distinct_ids() {
    for mode in CollapsableMode::ALL {
        let mut r = reporter(Some(mode));
        let (result, scopes) = three_step_failure();
        run(&mut r, &result, &scopes);
        r.handle(&RunEvent::ScenarioReported {
            aggregated_result: AggregatedResult::single(result),
        })
        .unwrap();
        let markers = r.printer().markers();
        assert!(markers_balanced(&markers), "mode {mode}");
        assert!(matches!(markers.first(), Some(Marker::Start { .. })));
    }
}

#[test]
fn empty_scope_steps_still_get_sections() {
    let mut r = reporter(Some(CollapsableMode::Steps));
    let result = make_scenario_result("no scope")
        .mark_failed()
        .with_step(make_step_result("given").mark_passed())
        .with_step(make_step_result("then").mark_failed());
    run(&mut r, &result, &[Scope::new(), Scope::new()]);
    let calls = report(&mut r, AggregatedResult::single(result));

    assert_eq!(section_count(&calls), 2);
    assert!(!calls.iter().any(|c| matches!(c, PrinterCall::ScopeKey { .. })));
}

#[test]
fn scope_mode_with_absent_scope_wraps_empty_scope() {
    let mut r = reporter(Some(CollapsableMode::Scope));
    let result = make_scenario_result("no scope")
        .mark_failed()
        .with_step(make_step_result("then").mark_failed());
    run(&mut r, &result, &[]);
    let calls = report(&mut r, AggregatedResult::single(result));

    assert_eq!(section_count(&calls), 1);
    assert!(calls.contains(&PrinterCall::Scope(Scope::new())));
}

#[test]
fn passed_scenario_prints_subject_only() {
    let mut r = reporter(Some(CollapsableMode::Steps));
    let result = make_scenario_result("register user")
        .mark_passed()
        .with_step(make_step_result("given").mark_passed());
    run(&mut r, &result, &[key_val_scope()]);
    let calls = report(&mut r, AggregatedResult::single(result));

    assert_eq!(calls, [subject_call(ScenarioStatus::Passed)]);
}

#[test]
fn skipped_scenario_prints_nothing() {
    let mut r = reporter(Some(CollapsableMode::Steps));
    let calls = report(
        &mut r,
        AggregatedResult::single(make_scenario_result("later").mark_skipped()),
    );
    assert!(calls.is_empty());
}

#[test]
fn show_paths_failed_only() {
    let config = ReporterConfig::default().with_show_paths([ScenarioStatus::Failed]);
    let mut r = GitlabReporter::with_section_ids(
        RecordingPrinter::new(),
        SequentialSectionIds::default(),
    )
    .with_config(config);

    let passed = report(
        &mut r,
        AggregatedResult::single(make_scenario_result("register user").mark_passed()),
    );
    assert!(!passed.iter().any(|c| matches!(c, PrinterCall::ScenarioPath { .. })));

    let failed = report(&mut r, AggregatedResult::single(failed_with_one_step()));
    assert_eq!(failed[0], subject_call(ScenarioStatus::Failed));
    assert_eq!(
        failed[1],
        PrinterCall::ScenarioPath {
            path: "scenarios/scenarios/register_user.py".into(),
            prefix: " ".into(),
        }
    );
}

#[test]
fn cleanup_prints_summary_and_stats() {
    let mut r = reporter(None);
    let report_event = RunEvent::Cleanup {
        report: cifold_schema::report::Report {
            summary: vec!["--seed 42".into()],
            total: 3,
            passed: 2,
            failed: 1,
            skipped: 0,
            elapsed: 1.25,
        },
    };
    r.handle(&report_event).unwrap();
    let calls = r.printer().calls();
    assert_eq!(calls[0], PrinterCall::EmptyLine);
    assert_eq!(calls[1], PrinterCall::ReportSummary(vec!["--seed 42".into()]));
    match &calls[2] {
        PrinterCall::ReportStats(stats) => {
            assert_eq!((stats.total, stats.passed, stats.failed), (3, 2, 1));
        }
        other => panic!("expected stats, got {other:?}"),
    }
}
