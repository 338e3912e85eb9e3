// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::output::{NO_HEADING_TARGET, StderrStyles};
use camino::Utf8PathBuf;
use owo_colors::OwoColorize;
use ptm_metadata::PtmExitCode;
use ptm_runner::errors::*;
use std::error::Error;
use thiserror::Error;
use tracing::error;

pub(crate) type Result<T, E = ExpectedError> = std::result::Result<T, E>;

// The #[error()] strings are mostly placeholder messages. Errors are meant to be printed with
// display_to_stderr, which colorizes them.

/// An error that ptm expects to occur, as opposed to a bug in ptm.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("report directory does not exist")]
    ReportDirNotFound { dir: Utf8PathBuf },
    #[error("could not determine the current directory")]
    CurrentDir {
        #[source]
        err: std::io::Error,
    },
    #[error("config item parse error")]
    ConfigItemParseError {
        #[from]
        err: ConfigItemParseError,
    },
    #[error("profile parse error")]
    ProfileParseError {
        #[from]
        err: ProfileParseError,
    },
    #[error("test suite load error")]
    SuiteLoadError {
        #[from]
        err: SuiteLoadError,
    },
    #[error("test selection error")]
    TestSelectionError {
        #[from]
        err: TestSelectionError,
    },
    #[error("unknown report format")]
    UnknownReportFormat {
        #[from]
        err: UnknownReportFormat,
    },
    #[error("signal handler setup error")]
    SignalHandlerSetupError {
        #[from]
        err: SignalHandlerSetupError,
    },
    #[error("no test cases selected")]
    NoTestsSelected,
    #[error("error generating report")]
    GenerateReportError {
        #[from]
        err: GenerateReportError,
    },
    #[error("error writing report")]
    ReportExportError {
        #[from]
        err: ReportExportError,
    },
    #[error("error writing capability reports")]
    WriteCapabilityReportsError {
        #[from]
        err: WriteCapabilityReportsError,
    },
    #[error("error writing to output")]
    WriteOutput {
        #[source]
        err: std::io::Error,
    },
    #[error("test run failed")]
    TestRunFailed,
}

impl ExpectedError {
    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::ReportDirNotFound { .. }
            | Self::CurrentDir { .. }
            | Self::ConfigItemParseError { .. }
            | Self::ProfileParseError { .. }
            | Self::SignalHandlerSetupError { .. } => PtmExitCode::SETUP_ERROR,
            Self::TestSelectionError { err } => match err {
                TestSelectionError::Expression(_) => PtmExitCode::INVALID_FILTER_EXPRESSION,
                _ => PtmExitCode::SETUP_ERROR,
            },
            Self::SuiteLoadError { .. } => PtmExitCode::SUITE_LOAD_FAILED,
            Self::UnknownReportFormat { .. } => PtmExitCode::UNKNOWN_REPORT_FORMAT,
            Self::GenerateReportError { err } => match err {
                GenerateReportError::UnknownFormat(_) => PtmExitCode::UNKNOWN_REPORT_FORMAT,
                _ => PtmExitCode::WRITE_OUTPUT_ERROR,
            },
            Self::WriteCapabilityReportsError { err } => match err {
                WriteCapabilityReportsError::UnknownFormat(_) => {
                    PtmExitCode::UNKNOWN_REPORT_FORMAT
                }
                _ => PtmExitCode::WRITE_OUTPUT_ERROR,
            },
            Self::ReportExportError { .. } | Self::WriteOutput { .. } => {
                PtmExitCode::WRITE_OUTPUT_ERROR
            }
            Self::NoTestsSelected => PtmExitCode::NO_TESTS_RUN,
            Self::TestRunFailed => PtmExitCode::TEST_RUN_FAILED,
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        let mut next_error: Option<&dyn Error> = match &self {
            Self::ReportDirNotFound { dir } => {
                error!(
                    "report directory `{}` does not exist",
                    dir.style(styles.bold)
                );
                None
            }
            Self::CurrentDir { err } => {
                error!("could not determine the current directory");
                Some(err as &dyn Error)
            }
            Self::ConfigItemParseError { err } => {
                error!("{err}");
                err.source()
            }
            Self::ProfileParseError { err } => {
                error!("{err}");
                err.source()
            }
            Self::SuiteLoadError { err } => {
                error!("{err}");
                err.source()
            }
            Self::TestSelectionError { err } => {
                error!("{err}");
                err.source()
            }
            Self::UnknownReportFormat { err } => {
                error!("{err}");
                None
            }
            Self::SignalHandlerSetupError { err } => {
                error!("error setting up signal handler");
                err.source()
            }
            Self::NoTestsSelected => {
                error!("no test cases were selected to run");
                None
            }
            Self::GenerateReportError { err } => {
                error!("error generating report");
                Some(err as &dyn Error)
            }
            Self::ReportExportError { err } => {
                error!("{err}");
                err.source()
            }
            Self::WriteCapabilityReportsError { err } => {
                error!("error writing capability reports");
                Some(err as &dyn Error)
            }
            Self::WriteOutput { err } => {
                error!("error writing to output");
                Some(err as &dyn Error)
            }
            Self::TestRunFailed => {
                error!("test run {}", "failed".style(styles.fail));
                None
            }
        };

        while let Some(err) = next_error {
            error!(target: NO_HEADING_TARGET, "\nCaused by:\n  {}", err);
            next_error = err.source();
        }
    }
}
