// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The interface to a loaded test suite.
//!
//! A [`SuiteRuntime`] owns test case discovery and actually invokes test code. The rest of the
//! runner only selects from, drives and reports on what the runtime provides.
//!
//! [`ManifestRuntime`] is the runtime shipped with ptm: it loads a suite described by a TOML
//! manifest and runs each test case as an external command.

mod manifest;

pub use manifest::*;

use crate::{
    errors::InvalidExpressionError,
    list::{TestCase, TestList, TestSuiteInfo},
    reporter::Outcome,
    test_filter::FilterExpression,
};

/// A loaded test suite that can execute its own test cases.
pub trait SuiteRuntime {
    /// Static metadata about the suite.
    fn suite_info(&self) -> &TestSuiteInfo;

    /// Every test case in the suite, in suite order.
    fn test_list(&self) -> &TestList;

    /// Returns the test cases matching a filter expression, in suite order.
    ///
    /// The default implementation evaluates [`FilterExpression`] against [`Self::test_list`].
    fn filter_by_expression(&self, expr: &str) -> Result<Vec<&TestCase>, InvalidExpressionError> {
        let expr = FilterExpression::parse(expr)?;
        Ok(self
            .test_list()
            .iter()
            .filter(|case| expr.matches(case))
            .collect())
    }

    /// Runs a single test case to completion.
    fn execute(&self, case: &TestCase) -> ExecutionOutput;

    /// Called once when a run is aborted, after the current test case has finished.
    fn request_abort(&self) {}
}

/// What a suite runtime reports after running a test case.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExecutionOutput {
    /// The outcome of the test case.
    pub outcome: Outcome,

    /// A message explaining a failure or inconclusive result.
    pub message: Option<String>,
}

impl ExecutionOutput {
    /// A passing result with no message.
    pub fn pass() -> Self {
        Self {
            outcome: Outcome::Pass,
            message: None,
        }
    }

    /// A result with the given outcome and message.
    pub fn new(outcome: Outcome, message: impl Into<String>) -> Self {
        Self {
            outcome,
            message: Some(message.into()),
        }
    }
}
