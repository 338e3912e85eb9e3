// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Runs suites on disk through [`ManifestRuntime`].

use camino::Utf8Path;
use camino_tempfile::{Utf8TempDir, tempdir};
use indoc::indoc;
use ptm_runner::{
    config::{ConfigItem, TestProfile},
    reporter::{Outcome, OutcomeFilter, ReportGenerator},
    runner::TestRunnerBuilder,
    runtime::{BIN_DIR, MANIFEST_FILE, ManifestRuntime, VERSION_FILE},
    signal::SignalHandlerKind,
    test_filter::{SelectionMode, TestCaseSelector},
};
use pretty_assertions::assert_eq;

static MANIFEST: &str = indoc! {r#"
    name = "FileServer"

    [[test]]
    full-name = "Smb2.Negotiate.Basic"
    categories = ["net", "bvt"]
    command = ["sh", "-c", "exit 0"]

    [[test]]
    full-name = "Smb2.Negotiate.Dialect"
    categories = ["net"]
    command = ["sh", "-c", "test \"$PTM_PROPERTY_DIALECT\" = 3.1.1"]

    [[test]]
    full-name = "Smb2.Lease.Break"
    categories = ["io", "slow"]
    command = ["sh", "-c", "echo 'lease not granted'; exit 2"]
"#};

fn write_suite(dir: &Utf8Path) {
    let bin = dir.join(BIN_DIR);
    std::fs::create_dir_all(&bin).unwrap();
    std::fs::write(bin.join(VERSION_FILE), "2.4.0\n").unwrap();
    std::fs::write(bin.join(MANIFEST_FILE), MANIFEST).unwrap();
}

fn load_suite() -> (Utf8TempDir, ManifestRuntime) {
    let dir = tempdir().unwrap();
    write_suite(dir.path());
    let runtime = ManifestRuntime::load(dir.path()).unwrap();
    (dir, runtime)
}

#[cfg(unix)]
#[test]
fn test_profile_selection_and_overrides() {
    let (dir, mut runtime) = load_suite();
    let profile = TestProfile::from_toml(indoc! {r#"
        test-suite = "FileServer"
        selected = ["Smb2.Negotiate.Dialect", "Smb2.Lease.Break", "Smb2.Removed"]

        [properties]
        Dialect = "3.0"
    "#})
    .unwrap();
    runtime.apply_profile(&profile).unwrap();

    let overrides: Vec<ConfigItem> = vec!["Dialect=3.1.1".parse().unwrap()];
    runtime.apply_overrides(&overrides);

    let selection = TestCaseSelector::new(&runtime)
        .select(SelectionMode::Explicit {
            selected_only: true,
        })
        .unwrap();
    let runner = TestRunnerBuilder::default()
        .build(&runtime, selection.cases(), SignalHandlerKind::Noop)
        .unwrap();
    let results = runner.execute(&mut []);

    let outcomes: Vec<_> = results
        .iter()
        .map(|r| (r.case.full_name(), r.outcome))
        .collect();
    assert_eq!(
        outcomes,
        [
            ("Smb2.Negotiate.Dialect", Outcome::Pass),
            ("Smb2.Lease.Break", Outcome::Inconclusive),
        ]
    );
    assert_eq!(
        results.get("Smb2.Lease.Break").unwrap().message.as_deref(),
        Some("lease not granted")
    );
    assert!(
        results.run_stats().is_success(),
        "inconclusive results don't fail a run"
    );

    let report_path = dir.path().join("reports/run.txt");
    let report = ReportGenerator::new(&results)
        .generate("txt", OutcomeFilter::default())
        .unwrap();
    report.export(&report_path).unwrap();
    assert_eq!(
        std::fs::read_to_string(&report_path).unwrap(),
        indoc! {"
            Pass          Smb2.Negotiate.Dialect
            Inconclusive  Smb2.Lease.Break

            Total: 2, Passed: 1, Failed: 0, Inconclusive: 1, Not run: 0
        "}
    );
}

#[cfg(unix)]
#[test]
fn test_expression_selection() {
    let (_dir, runtime) = load_suite();
    let selection = TestCaseSelector::new(&runtime)
        .select(SelectionMode::Expression(
            "TestCategory=net & !(Name~dialect)",
        ))
        .unwrap();
    let names: Vec<_> = selection.cases().iter().map(|c| c.full_name()).collect();
    assert_eq!(names, ["Smb2.Negotiate.Basic"]);

    let runner = TestRunnerBuilder::default()
        .build(&runtime, selection.cases(), SignalHandlerKind::Noop)
        .unwrap();
    let results = runner.execute(&mut []);
    assert_eq!(results.run_stats().passed, 1);
}

#[test]
fn test_invalid_expression() {
    let (_dir, runtime) = load_suite();
    let err = TestCaseSelector::new(&runtime)
        .select(SelectionMode::Expression("Owner=alice"))
        .unwrap_err();
    assert!(err.to_string().contains("Owner=alice"), "{err}");
}
