// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Documented exit codes for `ptm` failures.
///
/// `ptm` runs may fail for a variety of reasons. This structure documents the exit codes that may
/// occur in case of expected failures.
///
/// Unknown/unexpected failures will always result in exit code 1.
pub enum PtmExitCode {}

impl PtmExitCode {
    /// No errors occurred and ptm exited normally.
    pub const OK: i32 = 0;

    /// No test cases were selected to run, but no other errors occurred.
    pub const NO_TESTS_RUN: i32 = 4;

    /// One or more test cases failed, or the run was aborted before all selected cases ran.
    pub const TEST_RUN_FAILED: i32 = 100;

    /// The test suite could not be loaded: the version marker was missing or ambiguous, or the
    /// suite manifest or profile could not be read.
    pub const SUITE_LOAD_FAILED: i32 = 104;

    /// Writing a test report to disk produced an error.
    pub const WRITE_OUTPUT_ERROR: i32 = 110;

    /// A user issue happened while setting up a ptm invocation: an invalid combination of
    /// selection options, a malformed capabilities specification or a malformed configuration
    /// item.
    pub const SETUP_ERROR: i32 = 96;

    /// A filter expression failed to parse.
    pub const INVALID_FILTER_EXPRESSION: i32 = 94;

    /// The requested report format is not recognized.
    pub const UNKNOWN_REPORT_FORMAT: i32 = 93;
}
