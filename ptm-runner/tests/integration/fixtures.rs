// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use camino::{Utf8Path, Utf8PathBuf};
use indoc::indoc;
use ptm_runner::{
    list::{TestCase, TestList, TestSuiteInfo},
    reporter::Outcome,
    runner::AbortHandle,
    runtime::{ExecutionOutput, SuiteRuntime},
};
use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
};

#[derive(Copy, Clone, Debug)]
pub(crate) struct TestFixture {
    pub(crate) full_name: &'static str,
    pub(crate) categories: &'static [&'static str],
    pub(crate) outcome: Outcome,
}

/// The suite used by most tests:
///
/// - `net`: A.T1, A.T4
/// - `slow`: A.T2
/// - `io`: A.T3, A.T4
pub(crate) static EXPECTED_TESTS: &[TestFixture] = &[
    TestFixture {
        full_name: "A.T1",
        categories: &["net"],
        outcome: Outcome::Pass,
    },
    TestFixture {
        full_name: "A.T2",
        categories: &["slow"],
        outcome: Outcome::Pass,
    },
    TestFixture {
        full_name: "A.T3",
        categories: &["io"],
        outcome: Outcome::Fail,
    },
    TestFixture {
        full_name: "A.T4",
        categories: &["net", "io"],
        outcome: Outcome::Inconclusive,
    },
];

/// A capability file matching [`EXPECTED_TESTS`], plus a test the suite doesn't know about.
pub(crate) static CAPABILITIES_JSON: &str = indoc! {r#"
    {
      "capabilities": {
        "metadata": { "testsuite": "Fixture", "version": "1.0" },
        "groups": [
          {
            "name": "Transport",
            "categories": [
              { "name": "net", "tests": ["A.T1", "A.T4", "Z.Removed"] },
              { "name": "slow", "tests": ["A.T2"] }
            ]
          },
          {
            "name": "Storage",
            "categories": [
              { "name": "io", "tests": ["A.T3", "A.T4"] }
            ]
          }
        ]
      }
    }
"#};

/// Writes [`CAPABILITIES_JSON`] into `dir`, returning its path.
pub(crate) fn write_capabilities(dir: &Utf8Path) -> Utf8PathBuf {
    let path = dir.join("capabilities.json");
    std::fs::write(&path, CAPABILITIES_JSON).unwrap();
    path
}

/// An in-memory suite runtime with fixed outcomes.
#[derive(Debug)]
pub(crate) struct FixtureRuntime {
    info: TestSuiteInfo,
    list: TestList,
    outcomes: HashMap<&'static str, Outcome>,
    abort_on: Option<(&'static str, AbortHandle)>,
    executed: RefCell<Vec<String>>,
    abort_requests: Cell<usize>,
}

impl FixtureRuntime {
    pub(crate) fn new() -> Self {
        let mut list = TestList::new();
        for fixture in EXPECTED_TESTS {
            let case = TestCase::new(fixture.full_name, fixture.categories.iter().copied());
            list.push(case).unwrap();
        }
        Self {
            info: TestSuiteInfo::new("Fixture", "/fixture", "1.0"),
            list,
            outcomes: EXPECTED_TESTS
                .iter()
                .map(|fixture| (fixture.full_name, fixture.outcome))
                .collect(),
            abort_on: None,
            executed: RefCell::new(Vec::new()),
            abort_requests: Cell::new(0),
        }
    }

    /// Aborts `handle` while `full_name` is executing, twice to simulate repeated Ctrl-C.
    pub(crate) fn abort_during(mut self, full_name: &'static str, handle: AbortHandle) -> Self {
        self.abort_on = Some((full_name, handle));
        self
    }

    pub(crate) fn executed(&self) -> Vec<String> {
        self.executed.borrow().clone()
    }

    pub(crate) fn abort_requests(&self) -> usize {
        self.abort_requests.get()
    }
}

impl SuiteRuntime for FixtureRuntime {
    fn suite_info(&self) -> &TestSuiteInfo {
        &self.info
    }

    fn test_list(&self) -> &TestList {
        &self.list
    }

    fn execute(&self, case: &TestCase) -> ExecutionOutput {
        self.executed.borrow_mut().push(case.full_name().to_owned());
        if let Some((name, handle)) = &self.abort_on
            && *name == case.full_name()
        {
            handle.abort();
            handle.abort();
        }
        match self.outcomes[case.full_name()] {
            Outcome::Pass => ExecutionOutput::pass(),
            outcome => ExecutionOutput::new(outcome, format!("{} did not pass", case.name())),
        }
    }

    fn request_abort(&self) {
        self.abort_requests.set(self.abort_requests.get() + 1);
    }
}
