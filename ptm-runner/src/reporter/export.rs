// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{CapabilitiesResultTree, OutcomeFilter, Report, ReportFormat, select_by_outcome};
use crate::{
    errors::{GenerateReportError, ReportExportError, WriteCapabilityReportsError},
    runner::RunResults,
};
use atomicwrites::{AllowOverwrite, AtomicFile};
use camino::{Utf8Path, Utf8PathBuf};
use std::io::{self, Write};
use tracing::debug;

/// The directory, relative to the output directory, that per-capability reports are written to.
pub const CAPABILITIES_REPORT_DIR: &str = "capabilities_report";

impl Report {
    /// Writes this report to `path`, creating parent directories and replacing any existing file.
    pub fn export(&self, path: &Utf8Path) -> Result<(), ReportExportError> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|error| ReportExportError::CreateDir {
                path: parent.to_owned(),
                error,
            })?;
        }

        AtomicFile::new(path, AllowOverwrite)
            .write(|file| file.write_all(self.payload().as_bytes()))
            .map_err(|error| ReportExportError::Write {
                path: path.to_owned(),
                error,
            })?;
        debug!("wrote {} report to {path}", self.format());
        Ok(())
    }
}

/// Produces reports from the results of a run.
#[derive(Clone, Copy, Debug)]
pub struct ReportGenerator<'a, 'list> {
    results: &'a RunResults<'list>,
}

impl<'a, 'list> ReportGenerator<'a, 'list> {
    /// Creates a new generator over `results`.
    pub fn new(results: &'a RunResults<'list>) -> Self {
        Self { results }
    }

    /// Renders the run's results in `format`, keeping the outcomes `filter` includes.
    pub fn generate(
        &self,
        format: &str,
        filter: OutcomeFilter,
    ) -> Result<Report, GenerateReportError> {
        let format: ReportFormat = format.parse()?;
        let cases = select_by_outcome(self.results.iter(), filter);
        Ok(Report::render(format, &cases)?)
    }

    /// Writes one report per capability tag to `<output_dir>/capabilities_report/<tag>.<ext>`.
    ///
    /// Any existing `capabilities_report` directory is removed first. If `format` is unknown,
    /// nothing is touched on disk. Returns the paths written, in tag order.
    pub fn write_capability_reports(
        &self,
        tree: &CapabilitiesResultTree<'list>,
        output_dir: &Utf8Path,
        format: &str,
        filter: OutcomeFilter,
    ) -> Result<Vec<Utf8PathBuf>, WriteCapabilityReportsError> {
        let format: ReportFormat = format.parse()?;
        let report_dir = output_dir.join(CAPABILITIES_REPORT_DIR);
        recreate_dir(&report_dir)?;

        let mut written = Vec::new();
        for (tag, results) in tree.iter() {
            let cases = select_by_outcome(results, filter);
            let report = Report::render(format, &cases).map_err(|error| {
                WriteCapabilityReportsError::Render {
                    tag: tag.to_owned(),
                    error,
                }
            })?;
            let path = report_dir.join(format!("{tag}.{}", format.extension()));
            report.export(&path)?;
            written.push(path);
        }

        debug!(
            "wrote {} capability reports to {report_dir}",
            written.len()
        );
        Ok(written)
    }
}

fn recreate_dir(dir: &Utf8Path) -> Result<(), ReportExportError> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => debug!("removed stale {dir}"),
        Err(error) if error.kind() == io::ErrorKind::NotFound => {}
        Err(error) => {
            return Err(ReportExportError::RemoveDir {
                path: dir.to_owned(),
                error,
            });
        }
    }
    std::fs::create_dir_all(dir).map_err(|error| ReportExportError::CreateDir {
        path: dir.to_owned(),
        error,
    })
}
