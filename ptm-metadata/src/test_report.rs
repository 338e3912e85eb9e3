// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The outcome of a single test case, as recorded in a JSON test report.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutcomeSummary {
    /// The test case passed.
    Pass,

    /// The test case failed.
    Fail,

    /// The test case ran but could not determine a result.
    Inconclusive,

    /// The test case was selected but never ran, typically because the run was aborted.
    NotRun,
}

impl OutcomeSummary {
    /// Returns the string used for this outcome in JSON output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Inconclusive => "inconclusive",
            Self::NotRun => "not-run",
        }
    }
}

impl fmt::Display for OutcomeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single record in a JSON test report.
///
/// A JSON report is an array of these, one per test case, in run order.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TestCaseSummary {
    /// The short name of the test case: the last dotted segment of the full name.
    pub name: String,

    /// The full, dotted name of the test case. Unique within a test suite.
    pub full_name: String,

    /// The outcome of the test case.
    pub outcome: OutcomeSummary,

    /// The category tags the test case belongs to, sorted.
    #[serde(default)]
    pub categories: Vec<String>,

    /// The time at which the test case started running, if it ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<FixedOffset>>,

    /// How long the test case took to run, in milliseconds. Zero if it did not run.
    #[serde(default)]
    pub duration_ms: u64,

    /// A failure or inconclusive message produced by the test case, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TestCaseSummary {
    /// Parses a JSON test report into its records.
    pub fn parse_report(json: &str) -> Result<Vec<Self>, serde_json::Error> {
        serde_json::from_str(json)
    }
}
