// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::fixtures::*;
use camino_tempfile::tempdir;
use indoc::indoc;
use ptm_metadata::{OutcomeSummary, TestCaseSummary};
use ptm_runner::{
    errors::{SelectionConfigError, TestSelectionError, WriteCapabilityReportsError},
    list::TestCase,
    reporter::{
        CAPABILITIES_REPORT_DIR, CapabilitiesCollector, Outcome, OutcomeFilter, ProgressReporter,
        ReportGenerator, RunObserver, ShowProgress,
    },
    runner::{AbortHandle, RunStats, TestRunnerBuilder},
    runtime::SuiteRuntime,
    signal::SignalHandlerKind,
    test_filter::{SelectionMode, TestCaseSelector},
};
use pretty_assertions::assert_eq;
use test_case::test_case;

fn names<'a>(cases: impl IntoIterator<Item = &'a TestCase>) -> Vec<&'a str> {
    cases.into_iter().map(|case| case.full_name()).collect()
}

#[test]
fn test_run_by_capabilities() {
    let dir = tempdir().unwrap();
    let spec_file = write_capabilities(dir.path());

    let runtime = FixtureRuntime::new();
    let selector = TestCaseSelector::new(&runtime);
    let selection = selector
        .select(SelectionMode::Capabilities {
            spec_file: &spec_file,
            filter: Some("net, io"),
        })
        .unwrap();
    assert_eq!(
        names(selection.cases().iter().copied()),
        ["A.T1", "A.T3", "A.T4"],
        "union of net and io in suite order, unknown names dropped"
    );

    let index = selection.capabilities().expect("capabilities mode keeps the index");
    let mut collector = CapabilitiesCollector::new(index);
    let mut progress = ProgressReporter::new(ShowProgress::None);

    let runner = TestRunnerBuilder::default()
        .build(&runtime, selection.cases(), SignalHandlerKind::Noop)
        .unwrap();
    let results =
        runner.execute(&mut [&mut progress as &mut dyn RunObserver<'_>, &mut collector]);

    assert_eq!(runtime.executed(), ["A.T1", "A.T3", "A.T4"]);
    assert_eq!(progress.executed_count(), 3);
    assert_eq!(
        results.run_stats(),
        RunStats {
            initial_run_count: 3,
            final_run_count: 3,
            passed: 1,
            failed: 1,
            inconclusive: 1,
            aborted: false,
        }
    );
    assert!(!results.run_stats().is_success());
    assert!(results.get("A.T2").is_none(), "unselected cases are not in the results");

    let tree = collector.into_tree();
    assert_eq!(tree.tags().collect::<Vec<_>>(), ["io", "net"]);
    let io: Vec<_> = tree
        .get("io")
        .unwrap()
        .map(|r| (r.case.full_name(), r.outcome))
        .collect();
    assert_eq!(io, [("A.T3", Outcome::Fail), ("A.T4", Outcome::Inconclusive)]);

    let out_dir = dir.path().join("out");
    let generator = ReportGenerator::new(&results);
    let written = generator
        .write_capability_reports(&tree, &out_dir, "json", OutcomeFilter::default())
        .unwrap();
    let report_dir = out_dir.join(CAPABILITIES_REPORT_DIR);
    assert_eq!(
        written,
        [report_dir.join("io.json"), report_dir.join("net.json")]
    );

    let net = std::fs::read_to_string(report_dir.join("net.json")).unwrap();
    let net = TestCaseSummary::parse_report(&net).unwrap();
    let net: Vec<_> = net
        .iter()
        .map(|s| (s.full_name.as_str(), s.outcome))
        .collect();
    assert_eq!(
        net,
        [
            ("A.T1", OutcomeSummary::Pass),
            ("A.T4", OutcomeSummary::Inconclusive),
        ]
    );
}

#[test]
fn test_capability_reports_include_unrequested_tags() {
    let dir = tempdir().unwrap();
    let spec_file = dir.path().join("overlapping.json");
    std::fs::write(
        &spec_file,
        indoc! {r#"
            {
              "capabilities": {
                "groups": [
                  {
                    "name": "Transport",
                    "categories": [
                      { "name": "net", "tests": ["A.T1", "A.T2"] },
                      { "name": "slow", "tests": ["A.T2"] },
                      { "name": "io", "tests": ["A.T3"] }
                    ]
                  }
                ]
              }
            }
        "#},
    )
    .unwrap();

    let runtime = FixtureRuntime::new();
    let selection = TestCaseSelector::new(&runtime)
        .select(SelectionMode::Capabilities {
            spec_file: &spec_file,
            filter: Some("net"),
        })
        .unwrap();
    assert_eq!(names(selection.cases().iter().copied()), ["A.T1", "A.T2"]);

    let mut collector = CapabilitiesCollector::new(selection.capabilities().unwrap());
    let runner = TestRunnerBuilder::default()
        .build(&runtime, selection.cases(), SignalHandlerKind::Noop)
        .unwrap();
    let results = runner.execute(&mut [&mut collector]);
    let tree = collector.into_tree();

    let out_dir = dir.path().join("out");
    let written = ReportGenerator::new(&results)
        .write_capability_reports(&tree, &out_dir, "json", OutcomeFilter::default())
        .unwrap();
    let report_dir = out_dir.join(CAPABILITIES_REPORT_DIR);
    assert_eq!(
        written,
        [report_dir.join("net.json"), report_dir.join("slow.json")],
        "slow is reported because A.T2 carries it, io is not because nothing ran under it"
    );
    assert!(!report_dir.join("io.json").exists());

    let read_names = |tag: &str| -> Vec<String> {
        let contents = std::fs::read_to_string(report_dir.join(format!("{tag}.json"))).unwrap();
        TestCaseSummary::parse_report(&contents)
            .unwrap()
            .into_iter()
            .map(|summary| summary.full_name)
            .collect()
    };
    assert_eq!(read_names("net"), ["A.T1", "A.T2"]);
    assert_eq!(read_names("slow"), ["A.T2"]);
}

#[test]
fn test_capability_reports_filter_outcomes() {
    let dir = tempdir().unwrap();
    let spec_file = write_capabilities(dir.path());
    let runtime = FixtureRuntime::new();
    let selection = TestCaseSelector::new(&runtime)
        .select(SelectionMode::Capabilities {
            spec_file: &spec_file,
            filter: Some("io"),
        })
        .unwrap();
    let mut collector = CapabilitiesCollector::new(selection.capabilities().unwrap());
    let runner = TestRunnerBuilder::default()
        .build(&runtime, selection.cases(), SignalHandlerKind::Noop)
        .unwrap();
    let results = runner.execute(&mut [&mut collector]);

    let filter = OutcomeFilter {
        pass: false,
        fail: true,
        inconclusive: false,
        not_run: false,
    };
    ReportGenerator::new(&results)
        .write_capability_reports(collector.tree(), dir.path(), "plaintext", filter)
        .unwrap();

    let io = std::fs::read_to_string(dir.path().join(CAPABILITIES_REPORT_DIR).join("io.txt"))
        .unwrap();
    assert_eq!(
        io,
        "Fail          A.T3\n\nTotal: 1, Passed: 0, Failed: 1, Inconclusive: 0, Not run: 0\n"
    );
}

#[test]
fn test_stale_capability_reports_are_replaced() {
    let dir = tempdir().unwrap();
    let report_dir = dir.path().join(CAPABILITIES_REPORT_DIR);
    std::fs::create_dir_all(report_dir.join("nested")).unwrap();
    std::fs::write(report_dir.join("old.xml"), "stale").unwrap();
    std::fs::write(report_dir.join("nested/older.xml"), "stale").unwrap();

    let spec_file = write_capabilities(dir.path());
    let runtime = FixtureRuntime::new();
    let selection = TestCaseSelector::new(&runtime)
        .select(SelectionMode::Capabilities {
            spec_file: &spec_file,
            filter: Some("slow"),
        })
        .unwrap();
    let mut collector = CapabilitiesCollector::new(selection.capabilities().unwrap());
    let runner = TestRunnerBuilder::default()
        .build(&runtime, selection.cases(), SignalHandlerKind::Noop)
        .unwrap();
    let results = runner.execute(&mut [&mut collector]);

    ReportGenerator::new(&results)
        .write_capability_reports(
            collector.tree(),
            dir.path(),
            "xunit",
            OutcomeFilter::default(),
        )
        .unwrap();

    let mut entries: Vec<_> = std::fs::read_dir(&report_dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    entries.sort();
    assert_eq!(entries, ["slow.xml"]);
}

#[test]
fn test_unknown_format_leaves_reports_untouched() {
    let dir = tempdir().unwrap();
    let report_dir = dir.path().join(CAPABILITIES_REPORT_DIR);
    std::fs::create_dir_all(&report_dir).unwrap();
    std::fs::write(report_dir.join("old.txt"), "keep").unwrap();

    let runtime = FixtureRuntime::new();
    let cases: Vec<_> = runtime_cases(&runtime);
    let runner = TestRunnerBuilder::default()
        .build(&runtime, &cases, SignalHandlerKind::Noop)
        .unwrap();
    let results = runner.execute(&mut []);
    let generator = ReportGenerator::new(&results);

    let err = generator
        .write_capability_reports(
            &Default::default(),
            dir.path(),
            "html",
            OutcomeFilter::default(),
        )
        .unwrap_err();
    assert!(
        matches!(err, WriteCapabilityReportsError::UnknownFormat(_)),
        "{err}"
    );
    assert!(report_dir.join("old.txt").exists());

    generator
        .generate("html", OutcomeFilter::default())
        .unwrap_err();
}

fn runtime_cases(runtime: &FixtureRuntime) -> Vec<&TestCase> {
    runtime.test_list().iter().collect()
}

#[test]
fn test_capabilities_without_filter() {
    let dir = tempdir().unwrap();
    // The file doesn't need to exist: the missing filter is reported first.
    let spec_file = dir.path().join("missing.json");
    let runtime = FixtureRuntime::new();
    let selector = TestCaseSelector::new(&runtime);

    for filter in [None, Some(""), Some(" , ,")] {
        let err = selector
            .select(SelectionMode::Capabilities {
                spec_file: &spec_file,
                filter,
            })
            .unwrap_err();
        match err {
            TestSelectionError::Config(SelectionConfigError::MissingCategoryFilter {
                spec_file: path,
            }) => assert_eq!(path, spec_file),
            other => panic!("unexpected error for {filter:?}: {other}"),
        }
    }
    assert!(runtime.executed().is_empty());
}

#[test_case(SelectionMode::Explicit { selected_only: false }; "explicit")]
#[test_case(SelectionMode::Expression("TestCategory=net | Name=T2"); "expression")]
fn test_selection_is_idempotent(mode: SelectionMode<'_>) {
    let runtime = FixtureRuntime::new();
    let selector = TestCaseSelector::new(&runtime);
    let first = names(selector.select(mode).unwrap().cases().iter().copied());
    let second = names(selector.select(mode).unwrap().cases().iter().copied());
    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn test_abort_during_run() {
    let handle = AbortHandle::new();
    let runtime = FixtureRuntime::new().abort_during("A.T2", handle.clone());
    let cases = runtime_cases(&runtime);

    let mut progress = ProgressReporter::new(ShowProgress::None);
    let runner = TestRunnerBuilder::default()
        .set_abort_handle(handle.clone())
        .build(&runtime, &cases, SignalHandlerKind::Noop)
        .unwrap();
    let results = runner.execute(&mut [&mut progress as &mut dyn RunObserver<'_>]);

    // The case running when the abort arrived finishes; nothing after it starts.
    assert_eq!(runtime.executed(), ["A.T1", "A.T2"]);
    assert_eq!(runtime.abort_requests(), 1);
    assert!(handle.is_aborted());

    let stats = results.run_stats();
    assert!(stats.aborted);
    assert!(!stats.is_success());
    assert_eq!(stats.final_run_count, 2);
    assert_eq!(stats.not_run(), 2);
    assert!(progress.executed_count() <= cases.len());

    assert_eq!(results.get("A.T2").unwrap().outcome, Outcome::Pass);
    assert_eq!(results.get("A.T3").unwrap().outcome, Outcome::NotRun);
    assert_eq!(results.get("A.T4").unwrap().outcome, Outcome::NotRun);
}

#[test]
fn test_json_report_round_trip() {
    let runtime = FixtureRuntime::new();
    let cases = runtime_cases(&runtime);
    let runner = TestRunnerBuilder::default()
        .build(&runtime, &cases, SignalHandlerKind::Noop)
        .unwrap();
    let results = runner.execute(&mut []);

    let report = ReportGenerator::new(&results)
        .generate("JSON", OutcomeFilter::default())
        .unwrap();
    let parsed = TestCaseSummary::parse_report(report.payload()).unwrap();

    let expected: Vec<_> = results
        .iter()
        .map(|r| (r.case.full_name().to_owned(), r.outcome.to_summary()))
        .collect();
    let actual: Vec<_> = parsed
        .into_iter()
        .map(|s| (s.full_name, s.outcome))
        .collect();
    assert_eq!(actual, expected);
    assert!(
        results.iter().all(|r| r.start_time.is_some()),
        "every executed case has a start time"
    );
}
