// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by ptm.

use crate::reporter::ReportFormat;
use camino::Utf8PathBuf;
use thiserror::Error;

/// An error in how a test selection was configured.
///
/// These are detected before the suite is touched, so no test case runs.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum SelectionConfigError {
    /// A capability file was given, but no category to filter it by.
    #[error(
        "capability file `{spec_file}` was specified, but no categories to select \
         (pass a comma-separated list of categories)"
    )]
    MissingCategoryFilter {
        /// The capability file that was specified.
        spec_file: Utf8PathBuf,
    },
}

/// An error that occurred while reading a capability specification file.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CapabilitiesParseError {
    /// The file could not be read.
    #[error("failed to read capability file `{path}`")]
    Read {
        /// The path to the capability file.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: std::io::Error,
    },

    /// The file was read, but its contents are malformed.
    #[error("failed to parse capability file `{path}`")]
    Deserialize {
        /// The path to the capability file.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: serde_json::Error,
    },
}

/// An error returned while parsing a `key=value` configuration item.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("invalid configuration item `{input}` (expected `key=value`)")]
pub struct ConfigItemParseError {
    input: String,
}

impl ConfigItemParseError {
    pub(crate) fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }

    /// Returns the item that failed to parse.
    pub fn input(&self) -> &str {
        &self.input
    }
}

/// An error that occurred while reading a test profile.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProfileParseError {
    /// The profile could not be read.
    #[error("failed to read profile `{path}`")]
    Read {
        /// The path to the profile.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: std::io::Error,
    },

    /// The profile could not be deserialized.
    #[error("failed to parse profile `{path}`")]
    Deserialize {
        /// The path to the profile.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: toml::de::Error,
    },
}

/// A filter expression could not be parsed.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("invalid filter expression `{input}`: {reason}")]
pub struct InvalidExpressionError {
    input: String,
    reason: String,
}

impl InvalidExpressionError {
    pub(crate) fn new(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Returns the expression that failed to parse.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Returns a description of what went wrong.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// A report format string was not recognized.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error(
    "unrecognized report format: {input}\n(known values: {})",
    ReportFormat::variants().join(", "),
)]
pub struct UnknownReportFormat {
    input: String,
}

impl UnknownReportFormat {
    pub(crate) fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }

    /// Returns the format string that was not recognized.
    pub fn input(&self) -> &str {
        &self.input
    }
}

/// An error that occurred while loading a test suite.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SuiteLoadError {
    /// The suite folder does not exist or is not a directory.
    #[error("test suite folder `{path}` is not a directory")]
    FolderNotFound {
        /// The suite folder.
        path: Utf8PathBuf,
    },

    /// The version file is missing.
    #[error("version file `{path}` not found")]
    VersionFileMissing {
        /// The expected path of the version file.
        path: Utf8PathBuf,
    },

    /// The version file exists but has no version in it.
    #[error("version file `{path}` is empty")]
    VersionFileEmpty {
        /// The path of the version file.
        path: Utf8PathBuf,
    },

    /// A file belonging to the suite could not be read.
    #[error("failed to read `{path}`")]
    Read {
        /// The path that could not be read.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: std::io::Error,
    },

    /// The suite manifest could not be deserialized.
    #[error("failed to parse suite manifest `{path}`")]
    Manifest {
        /// The path to the manifest.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: toml::de::Error,
    },

    /// Two test cases in the manifest share the same full name.
    #[error("test case `{full_name}` is defined more than once in `{path}`")]
    DuplicateTestCase {
        /// The manifest path.
        path: Utf8PathBuf,

        /// The duplicated full name.
        full_name: String,
    },

    /// A test case has an empty command.
    #[error("test case `{full_name}` has an empty command")]
    EmptyCommand {
        /// The full name of the test case.
        full_name: String,
    },

    /// The profile refers to a test suite other than the one being loaded.
    #[error("unknown test suite `{requested}` (the suite folder contains `{actual}`)")]
    UnknownTestSuite {
        /// The suite named by the profile.
        requested: String,

        /// The suite found in the folder.
        actual: String,
    },

    /// The profile could not be loaded.
    #[error(transparent)]
    Profile(#[from] ProfileParseError),
}

/// An error that occurred while rendering a report.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RenderReportError {
    /// JSON serialization failed.
    #[error("error serializing JSON report")]
    Json(#[source] serde_json::Error),

    /// XUnit serialization failed.
    #[error("error serializing XUnit report")]
    Junit(#[source] quick_junit::SerializeError),
}

/// An error that occurred while producing a report payload.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenerateReportError {
    /// The requested format is unknown.
    #[error(transparent)]
    UnknownFormat(#[from] UnknownReportFormat),

    /// The report could not be rendered.
    #[error(transparent)]
    Render(#[from] RenderReportError),
}

/// An error that occurred while writing a report to disk.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReportExportError {
    /// A directory could not be created.
    #[error("error creating directory `{path}`")]
    CreateDir {
        /// The directory being created.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: std::io::Error,
    },

    /// A stale directory could not be removed.
    #[error("error removing directory `{path}`")]
    RemoveDir {
        /// The directory being removed.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: std::io::Error,
    },

    /// The report file could not be written.
    #[error("error writing report to `{path}`")]
    Write {
        /// The report file.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: atomicwrites::Error<std::io::Error>,
    },
}

/// An error that occurred while writing per-capability reports.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WriteCapabilityReportsError {
    /// The requested format is unknown. Nothing was written.
    #[error(transparent)]
    UnknownFormat(#[from] UnknownReportFormat),

    /// A report could not be rendered.
    #[error("error rendering report for capability `{tag}`")]
    Render {
        /// The capability being rendered.
        tag: String,

        /// The underlying error.
        #[source]
        error: RenderReportError,
    },

    /// A report could not be written.
    #[error(transparent)]
    Export(#[from] ReportExportError),
}

/// An error occurred while setting up the signal handler.
#[derive(Debug, Error)]
#[error("error setting up signal handler")]
pub struct SignalHandlerSetupError(#[from] ctrlc::Error);

/// An error that occurred while selecting test cases to run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TestSelectionError {
    /// The selection was misconfigured.
    #[error(transparent)]
    Config(#[from] SelectionConfigError),

    /// The capability file could not be read.
    #[error(transparent)]
    Capabilities(#[from] CapabilitiesParseError),

    /// The filter expression is invalid.
    #[error(transparent)]
    Expression(#[from] InvalidExpressionError),
}
