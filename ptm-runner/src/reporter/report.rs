// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{Outcome, TestCaseResult};
use crate::errors::{RenderReportError, UnknownReportFormat};
use indexmap::IndexMap;
use quick_junit::{NonSuccessKind, TestCaseStatus, TestSuite};
use std::{fmt, str::FromStr};
use swrite::{SWrite, swriteln};

/// The format a report is rendered in.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ReportFormat {
    /// One line per test case, followed by a summary.
    PlainText,

    /// A JSON array of [`TestCaseSummary`](ptm_metadata::TestCaseSummary) records.
    Json,

    /// XUnit (JUnit-style) XML.
    XUnitXml,
}

impl ReportFormat {
    /// The names accepted by [`FromStr`], one per format.
    pub fn variants() -> &'static [&'static str] {
        &["plaintext", "json", "xunit"]
    }

    /// The file extension for reports in this format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::PlainText => "txt",
            Self::Json => "json",
            Self::XUnitXml => "xml",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = UnknownReportFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plaintext" | "plain" | "txt" => Ok(Self::PlainText),
            "json" => Ok(Self::Json),
            "xunit" | "xml" => Ok(Self::XUnitXml),
            _ => Err(UnknownReportFormat::new(s)),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlainText => write!(f, "plaintext"),
            Self::Json => write!(f, "json"),
            Self::XUnitXml => write!(f, "xunit"),
        }
    }
}

/// Which outcomes to include in a report.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OutcomeFilter {
    /// Include passed test cases.
    pub pass: bool,

    /// Include failed test cases.
    pub fail: bool,

    /// Include inconclusive test cases.
    pub inconclusive: bool,

    /// Include test cases that never ran.
    pub not_run: bool,
}

impl OutcomeFilter {
    /// A filter that includes every outcome.
    pub const ALL: Self = Self {
        pass: true,
        fail: true,
        inconclusive: true,
        not_run: true,
    };

    /// Returns true if results with this outcome are included.
    pub fn includes(&self, outcome: Outcome) -> bool {
        match outcome {
            Outcome::Pass => self.pass,
            Outcome::Fail => self.fail,
            Outcome::Inconclusive => self.inconclusive,
            Outcome::NotRun => self.not_run,
        }
    }
}

impl Default for OutcomeFilter {
    fn default() -> Self {
        Self {
            pass: true,
            fail: true,
            inconclusive: true,
            not_run: false,
        }
    }
}

/// Keeps the results whose outcome `filter` includes, preserving order.
pub fn select_by_outcome<'a, 'list, I>(
    all: I,
    filter: OutcomeFilter,
) -> Vec<&'a TestCaseResult<'list>>
where
    I: IntoIterator<Item = &'a TestCaseResult<'list>>,
    'list: 'a,
{
    all.into_iter()
        .filter(|result| filter.includes(result.outcome))
        .collect()
}

/// A rendered report.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Report {
    format: ReportFormat,
    payload: String,
}

impl Report {
    /// Renders `cases` in the given format.
    pub fn render(
        format: ReportFormat,
        cases: &[&TestCaseResult<'_>],
    ) -> Result<Self, RenderReportError> {
        let payload = match format {
            ReportFormat::PlainText => render_plain_text(cases),
            ReportFormat::Json => render_json(cases)?,
            ReportFormat::XUnitXml => render_xunit(cases)?,
        };
        Ok(Self { format, payload })
    }

    /// The format this report was rendered in.
    pub fn format(&self) -> ReportFormat {
        self.format
    }

    /// The rendered text.
    pub fn payload(&self) -> &str {
        &self.payload
    }
}

fn render_plain_text(cases: &[&TestCaseResult<'_>]) -> String {
    let mut out = String::new();
    let (mut passed, mut failed, mut inconclusive, mut not_run) = (0, 0, 0, 0);
    for result in cases {
        match result.outcome {
            Outcome::Pass => passed += 1,
            Outcome::Fail => failed += 1,
            Outcome::Inconclusive => inconclusive += 1,
            Outcome::NotRun => not_run += 1,
        }
        swriteln!(out, "{:<12}  {}", result.outcome, result.case.full_name());
    }
    if !cases.is_empty() {
        out.push('\n');
    }
    swriteln!(
        out,
        "Total: {}, Passed: {passed}, Failed: {failed}, Inconclusive: {inconclusive}, Not run: {not_run}",
        cases.len(),
    );
    out
}

fn render_json(cases: &[&TestCaseResult<'_>]) -> Result<String, RenderReportError> {
    let summaries: Vec<_> = cases.iter().map(|result| result.to_summary()).collect();
    serde_json::to_string_pretty(&summaries).map_err(RenderReportError::Json)
}

fn render_xunit(cases: &[&TestCaseResult<'_>]) -> Result<String, RenderReportError> {
    let mut test_suites: IndexMap<&str, TestSuite> = IndexMap::new();
    for result in cases {
        let class_name = result.case.class_name();
        let status = match result.outcome {
            Outcome::Pass => TestCaseStatus::success(),
            Outcome::Fail => {
                let mut status = TestCaseStatus::non_success(NonSuccessKind::Failure);
                status.set_type("test failure");
                if let Some(message) = &result.message {
                    status.set_message(message.as_str());
                }
                status
            }
            Outcome::Inconclusive => {
                let mut status = TestCaseStatus::skipped();
                status.set_message("inconclusive");
                status
            }
            Outcome::NotRun => {
                let mut status = TestCaseStatus::skipped();
                status.set_message("not run");
                status
            }
        };

        let mut testcase = quick_junit::TestCase::new(result.case.name(), status);
        testcase.set_classname(class_name).set_time(result.duration);
        if let Some(start_time) = result.start_time {
            testcase.set_timestamp(start_time);
        }

        test_suites
            .entry(class_name)
            .or_insert_with(|| TestSuite::new(class_name))
            .add_test_case(testcase);
    }

    let mut report = quick_junit::Report::new("ptm-run");
    report.add_test_suites(test_suites.into_values());

    let mut buf = Vec::new();
    report.serialize(&mut buf).map_err(RenderReportError::Junit)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
