// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    ExpectedError,
    errors::Result,
    output::{NO_HEADING_TARGET, OutputContext, OutputOpts, clap_styles},
};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser, ValueEnum};
use owo_colors::OwoColorize;
use ptm_runner::{
    config::{ConfigItem, TestProfile},
    reporter::{
        CapabilitiesCollector, CapabilitiesResultTree, OutcomeFilter, ProgressReporter,
        ReportFormat, ReportGenerator, RunObserver, ShowProgress,
    },
    runner::{RunResults, TestRunnerBuilder},
    runtime::{ManifestRuntime, SuiteRuntime},
    signal::SignalHandlerKind,
    test_filter::{Selection, SelectionMode, TestCaseSelector},
};
use std::io::Write;
use tracing::{debug, info};

/// Runs protocol conformance test suites.
#[derive(Debug, Parser)]
#[command(name = "ptm", version, styles = clap_styles::style())]
pub struct PtmApp {
    #[command(flatten)]
    output: OutputOpts,

    #[command(flatten)]
    suite_opts: SuiteOpts,

    #[command(flatten)]
    selection_opts: SelectionOpts,

    #[command(flatten)]
    report_opts: ReportOpts,
}

impl PtmApp {
    /// Initializes the output context.
    pub fn init_output(&self) -> OutputContext {
        self.output.init()
    }

    /// Executes the app, writing the console report to `stdout`.
    ///
    /// Returns the exit code on success.
    pub fn exec(self, output: OutputContext, stdout: &mut dyn Write) -> Result<i32> {
        let ctx = RunContext::new(&self.suite_opts, &self.report_opts, output)?;
        let selection = ctx.select(&self.selection_opts)?;
        let (results, tree) = ctx.run(&selection)?;
        ctx.write_reports(&results, tree.as_ref(), stdout)?;

        if results.run_stats().is_success() {
            Ok(0)
        } else {
            Err(ExpectedError::TestRunFailed)
        }
    }
}

#[derive(Debug, Args)]
#[command(next_help_heading = "Suite options")]
struct SuiteOpts {
    /// Path to the test suite folder
    #[arg(long, short = 't', value_name = "PATH")]
    testsuite: Utf8PathBuf,

    /// Profile selecting test cases and setting suite properties
    #[arg(long, short = 'p', value_name = "PATH")]
    profile: Option<Utf8PathBuf>,

    /// Suite property override, for example `ServerName=sut01`
    ///
    /// Overrides take precedence over properties in the profile. May be repeated.
    #[arg(long = "config", short = 'c', value_name = "NAME=VALUE")]
    config_items: Vec<String>,
}

#[derive(Debug, Args)]
#[command(next_help_heading = "Selection options")]
struct SelectionOpts {
    /// Run only the test cases selected in the profile
    #[arg(long, short = 's')]
    selected: bool,

    /// Run the test cases matching a filter expression
    ///
    /// For example: `TestCategory=bvt & !(Name~Negotiate)`.
    #[arg(long, value_name = "EXPR", conflicts_with = "cfile")]
    filter: Option<String>,

    /// Capability specification file to select test cases from
    #[arg(long, value_name = "PATH")]
    cfile: Option<Utf8PathBuf>,

    /// Comma-separated capabilities to run, used with --cfile
    #[arg(long, value_name = "CATEGORIES", requires = "cfile")]
    cfilter: Option<String>,
}

impl SelectionOpts {
    fn mode(&self) -> SelectionMode<'_> {
        if let Some(spec_file) = &self.cfile {
            SelectionMode::Capabilities {
                spec_file,
                filter: self.cfilter.as_deref(),
            }
        } else if let Some(expr) = self.filter.as_deref().filter(|expr| !expr.trim().is_empty()) {
            SelectionMode::Expression(expr)
        } else {
            SelectionMode::Explicit {
                selected_only: self.selected,
            }
        }
    }
}

#[derive(Debug, Args)]
#[command(next_help_heading = "Report options")]
struct ReportOpts {
    /// Write the report to this file instead of printing it
    #[arg(long, short = 'r', value_name = "PATH")]
    report: Option<Utf8PathBuf>,

    /// Report format: plaintext, json or xunit
    #[arg(long, short = 'f', value_name = "FMT", default_value = "plaintext")]
    format: String,

    /// Outcomes to include in reports
    #[arg(
        long,
        short = 'o',
        value_enum,
        value_delimiter = ',',
        value_name = "OUTCOMES",
        default_value = "pass,fail,inconclusive"
    )]
    outcome: Vec<OutcomeOpt>,

    /// Show a progress bar while running
    #[arg(long, value_enum, default_value_t, value_name = "WHEN")]
    show_progress: ShowProgressOpt,
}

impl ReportOpts {
    fn outcome_filter(&self) -> OutcomeFilter {
        OutcomeFilter {
            pass: self.outcome.contains(&OutcomeOpt::Pass),
            fail: self.outcome.contains(&OutcomeOpt::Fail),
            inconclusive: self.outcome.contains(&OutcomeOpt::Inconclusive),
            not_run: false,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutcomeOpt {
    Pass,
    Fail,
    Inconclusive,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
enum ShowProgressOpt {
    #[default]
    Auto,
    None,
    Bar,
}

impl From<ShowProgressOpt> for ShowProgress {
    fn from(opt: ShowProgressOpt) -> Self {
        match opt {
            ShowProgressOpt::Auto => ShowProgress::Auto,
            ShowProgressOpt::None => ShowProgress::None,
            ShowProgressOpt::Bar => ShowProgress::Bar,
        }
    }
}

/// Everything a single invocation needs, passed to each phase in turn.
struct RunContext<'a> {
    runtime: ManifestRuntime,
    report_path: Option<Utf8PathBuf>,
    format: &'a str,
    outcome_filter: OutcomeFilter,
    show_progress: ShowProgress,
    output: OutputContext,
}

impl<'a> RunContext<'a> {
    fn new(
        suite_opts: &SuiteOpts,
        report_opts: &'a ReportOpts,
        output: OutputContext,
    ) -> Result<Self> {
        let report_path = report_opts
            .report
            .as_deref()
            .map(resolve_report_path)
            .transpose()?;

        // Reject bad arguments before touching the suite.
        let format: ReportFormat = report_opts.format.parse()?;
        let config_items = suite_opts
            .config_items
            .iter()
            .map(|item| item.parse::<ConfigItem>())
            .collect::<Result<Vec<_>, _>>()?;

        let mut runtime = ManifestRuntime::load(&suite_opts.testsuite)?;
        if let Some(profile) = &suite_opts.profile {
            let profile = TestProfile::load(profile)?;
            runtime.apply_profile(&profile)?;
        }
        runtime.apply_overrides(&config_items);

        let info = runtime.suite_info();
        debug!(
            "loaded {} {} with {} test cases, report format {format}",
            info.name(),
            info.version(),
            runtime.test_list().len(),
        );

        Ok(Self {
            runtime,
            report_path,
            format: &report_opts.format,
            outcome_filter: report_opts.outcome_filter(),
            show_progress: report_opts.show_progress.into(),
            output,
        })
    }

    fn select(&self, selection_opts: &SelectionOpts) -> Result<Selection<'_>> {
        let selection = TestCaseSelector::new(&self.runtime).select(selection_opts.mode())?;
        if selection.is_empty() {
            return Err(ExpectedError::NoTestsSelected);
        }
        Ok(selection)
    }

    fn run<'list>(
        &'list self,
        selection: &'list Selection<'list>,
    ) -> Result<(RunResults<'list>, Option<CapabilitiesResultTree<'list>>)> {
        let runner = TestRunnerBuilder::default().build(
            &self.runtime,
            selection.cases(),
            SignalHandlerKind::Standard,
        )?;

        let mut progress = ProgressReporter::new(self.show_progress);
        if self
            .output
            .color
            .should_colorize(supports_color::Stream::Stderr)
        {
            progress.colorize();
        }
        progress.watch_abort(&runner.abort_handle());
        let mut collector = selection.capabilities().map(CapabilitiesCollector::new);

        let results = {
            let mut observers: Vec<&mut dyn RunObserver<'list>> = vec![&mut progress];
            if let Some(collector) = &mut collector {
                observers.push(collector);
            }
            runner.execute(&mut observers)
        };

        let styles = self.output.stderr_styles();
        let finished = if results.run_stats().is_success() {
            styles.pass
        } else {
            styles.fail
        };
        info!(
            target: NO_HEADING_TARGET,
            "{} running test cases.",
            "Finished".style(finished)
        );
        Ok((results, collector.map(CapabilitiesCollector::into_tree)))
    }

    fn write_reports(
        &self,
        results: &RunResults<'_>,
        tree: Option<&CapabilitiesResultTree<'_>>,
        stdout: &mut dyn Write,
    ) -> Result<()> {
        let generator = ReportGenerator::new(results);
        let report = generator.generate(self.format, self.outcome_filter)?;

        let Some(report_path) = &self.report_path else {
            return stdout
                .write_all(report.payload().as_bytes())
                .and_then(|()| stdout.flush())
                .map_err(|err| ExpectedError::WriteOutput { err });
        };

        report.export(report_path)?;
        let styles = self.output.stderr_styles();
        info!("report written to {}", report_path.style(styles.bold));

        if let Some(tree) = tree {
            let output_dir = report_path.parent().unwrap_or(Utf8Path::new("."));
            let written = generator.write_capability_reports(
                tree,
                output_dir,
                self.format,
                self.outcome_filter,
            )?;
            info!(
                "{} capability reports written to {}",
                written.len(),
                output_dir.style(styles.bold),
            );
        }
        Ok(())
    }
}

/// Resolves a report path against the current directory and checks that its directory exists.
fn resolve_report_path(path: &Utf8Path) -> Result<Utf8PathBuf> {
    let path = if path.is_absolute() {
        path.to_owned()
    } else {
        let cwd = std::env::current_dir().map_err(|err| ExpectedError::CurrentDir { err })?;
        let cwd = Utf8PathBuf::try_from(cwd).map_err(|err| ExpectedError::CurrentDir {
            err: err.into_io_error(),
        })?;
        cwd.join(path)
    };

    match path.parent() {
        Some(dir) if !dir.is_dir() => Err(ExpectedError::ReportDirNotFound {
            dir: dir.to_owned(),
        }),
        _ => Ok(path),
    }
}
