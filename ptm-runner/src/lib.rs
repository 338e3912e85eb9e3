// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Core functionality for the `ptm` conformance test runner.
//!
//! A run goes through these steps:
//!
//! 1. A [`SuiteRuntime`](runtime::SuiteRuntime) is loaded, for example a
//!    [`ManifestRuntime`](runtime::ManifestRuntime) reading a suite folder.
//! 2. [`TestCaseSelector`](test_filter::TestCaseSelector) picks the test cases to run.
//! 3. [`TestRunner`](runner::TestRunner) executes them one at a time, reporting each step to a
//!    list of [`RunObserver`](reporter::RunObserver)s.
//! 4. [`ReportGenerator`](reporter::ReportGenerator) renders and exports the results.

pub mod capabilities;
pub mod config;
pub mod errors;
pub mod list;
pub mod reporter;
pub mod runner;
pub mod runtime;
pub mod signal;
mod stopwatch;
pub mod test_filter;
