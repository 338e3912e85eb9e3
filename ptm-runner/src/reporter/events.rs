// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    list::{TestCase, TestSuiteInfo},
    runner::RunStats,
};
use chrono::{DateTime, FixedOffset};
use ptm_metadata::{OutcomeSummary, TestCaseSummary};
use std::{fmt, time::Duration};

/// A test event.
///
/// Events are produced by a [`TestRunner`](crate::runner::TestRunner) and delivered to each
/// [`RunObserver`](super::RunObserver) in turn.
#[derive(Clone, Debug)]
pub struct TestEvent<'list> {
    /// The time at which the event was generated, including the offset from UTC.
    pub timestamp: DateTime<FixedOffset>,

    /// The amount of time elapsed since the start of the test run.
    pub elapsed: Duration,

    /// The kind of test event this is.
    pub kind: TestEventKind<'list>,
}

/// The kind of test event this is.
///
/// Forms part of [`TestEvent`].
#[derive(Clone, Debug)]
pub enum TestEventKind<'list> {
    /// The test run started.
    RunStarted {
        /// The suite being run.
        suite_info: &'list TestSuiteInfo,

        /// The number of test cases selected for the run.
        total: usize,
    },

    /// A test case started running.
    TestStarted {
        /// The test case that was started.
        case: &'list TestCase,

        /// The zero-based position of this case in the selection.
        index: usize,

        /// The number of test cases selected for the run.
        total: usize,
    },

    /// A test case finished running.
    TestFinished {
        /// The completion event, carrying the outcome.
        event: RunEvent<'list>,

        /// Run statistics so far, including this test case.
        current_stats: RunStats,
    },

    /// The run was aborted. No further test cases will start.
    RunAborted {
        /// The number of selected test cases that will not run.
        remaining: usize,
    },

    /// The test run finished.
    RunFinished {
        /// The time at which the run was started.
        start_time: DateTime<FixedOffset>,

        /// The amount of time it took for the run to complete.
        elapsed: Duration,

        /// Statistics for the run.
        run_stats: RunStats,
    },
}

/// Emitted once per completed test case.
#[derive(Clone, Debug)]
pub struct RunEvent<'list> {
    /// The outcome group this result belongs to, for example `"Passed"`.
    pub group: &'static str,

    /// A snapshot of the result.
    pub result: TestCaseResult<'list>,
}

impl<'list> RunEvent<'list> {
    /// Creates a new event for a completed result.
    pub fn new(result: TestCaseResult<'list>) -> Self {
        Self {
            group: result.outcome.group_name(),
            result,
        }
    }
}

/// The terminal result of a test case.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Outcome {
    /// The test case passed.
    Pass,

    /// The test case failed.
    Fail,

    /// The test case ran but couldn't determine a result.
    Inconclusive,

    /// The test case was selected but never ran.
    NotRun,
}

impl Outcome {
    /// The name of the outcome group results with this outcome are collected in.
    pub fn group_name(self) -> &'static str {
        match self {
            Self::Pass => "Passed",
            Self::Fail => "Failed",
            Self::Inconclusive => "Inconclusive",
            Self::NotRun => "NotRun",
        }
    }

    /// Converts this outcome to its machine-readable form.
    pub fn to_summary(self) -> OutcomeSummary {
        match self {
            Self::Pass => OutcomeSummary::Pass,
            Self::Fail => OutcomeSummary::Fail,
            Self::Inconclusive => OutcomeSummary::Inconclusive,
            Self::NotRun => OutcomeSummary::NotRun,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pass => "Pass",
            Self::Fail => "Fail",
            Self::Inconclusive => "Inconclusive",
            Self::NotRun => "NotRun",
        };
        // Use pad so that width specifiers work.
        f.pad(s)
    }
}

/// The result of a test case, borrowing its definition from the suite.
#[derive(Clone, Debug)]
pub struct TestCaseResult<'list> {
    /// The test case.
    pub case: &'list TestCase,

    /// The outcome of the test case.
    pub outcome: Outcome,

    /// When the test case started running. `None` if it never ran.
    pub start_time: Option<DateTime<FixedOffset>>,

    /// How long the test case took to run.
    pub duration: Duration,

    /// A failure or inconclusive message, if any.
    pub message: Option<String>,
}

impl<'list> TestCaseResult<'list> {
    /// Creates the initial result for a selected test case.
    pub fn not_run(case: &'list TestCase) -> Self {
        Self {
            case,
            outcome: Outcome::NotRun,
            start_time: None,
            duration: Duration::ZERO,
            message: None,
        }
    }

    /// Converts this result to a JSON report record.
    pub fn to_summary(&self) -> TestCaseSummary {
        TestCaseSummary {
            name: self.case.name().to_owned(),
            full_name: self.case.full_name().to_owned(),
            outcome: self.outcome.to_summary(),
            categories: self.case.categories().iter().cloned().collect(),
            start_time: self.start_time,
            duration_ms: self.duration.as_millis().try_into().unwrap_or(u64::MAX),
            message: self.message.clone(),
        }
    }
}
