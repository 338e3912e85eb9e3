// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{RunObserver, TestEvent, TestEventKind};
use crate::runner::{AbortHandle, RunStats};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use owo_colors::{OwoColorize, Style};
use std::{
    collections::HashSet,
    io::{IsTerminal, stderr},
    time::Duration,
};

/// Whether to show a progress bar during a run.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ShowProgress {
    /// Show a progress bar if stderr is a terminal.
    #[default]
    Auto,

    /// Never show a progress bar.
    None,

    /// Always show a progress bar.
    Bar,
}

impl ShowProgress {
    fn should_draw(self) -> bool {
        match self {
            Self::Auto => stderr().is_terminal(),
            Self::None => false,
            Self::Bar => true,
        }
    }
}

/// Shows live progress for a run on stderr.
///
/// Progress counts distinct test cases: a test case finishing twice is counted once, and the count
/// never exceeds the number of selected test cases.
#[derive(Debug)]
pub struct ProgressReporter<'list> {
    bar: ProgressBar,
    seen: HashSet<&'list str>,
    total: usize,
    styles: Styles,
}

impl<'list> ProgressReporter<'list> {
    /// Creates a new progress reporter.
    pub fn new(show_progress: ShowProgress) -> Self {
        let bar = ProgressBar::hidden();
        if show_progress.should_draw() {
            // NOTE: set_draw_target must be called before enable_steady_tick to avoid a spurious
            // extra line from being printed as the draw target changes.
            bar.set_draw_target(ProgressDrawTarget::stderr_with_hz(20));
            bar.enable_steady_tick(Duration::from_millis(100));
        }
        Self {
            bar,
            seen: HashSet::new(),
            total: 0,
            styles: Styles::default(),
        }
    }

    /// Colorizes the prefix shown by the progress bar.
    pub fn colorize(&mut self) {
        self.styles.colorize();
    }

    /// Prints the abort message for `handle` above the progress bar rather than underneath it.
    pub fn watch_abort(&self, handle: &AbortHandle) {
        handle.attach_progress_bar(self.bar.clone());
    }

    /// The number of distinct test cases that have finished, capped at the selection size.
    pub fn executed_count(&self) -> usize {
        self.seen.len().min(self.total)
    }

    fn set_template(&self) {
        // Emulate Cargo's style.
        let width = self.total.to_string().len();
        // {{foo}} is passed through to indicatif, while {width} is substituted by format!.
        let template = format!(
            "{{prefix:>12}} [{{elapsed_precise:>9}}] [{{wide_bar}}] \
             {{pos:>{width}}}/{{len:{width}}}: {{msg}}"
        );
        if let Ok(style) = ProgressStyle::default_bar().template(&template) {
            self.bar.set_style(style.progress_chars("=> "));
        }
    }

    fn running_prefix(&self, stats: &RunStats) -> String {
        let style = if stats.failed > 0 {
            self.styles.fail
        } else {
            self.styles.pass
        };
        format!("{:>12}", "Running".style(style))
    }
}

impl<'list> RunObserver<'list> for ProgressReporter<'list> {
    fn handle_event(&mut self, event: &TestEvent<'list>) {
        match &event.kind {
            TestEventKind::RunStarted { total, .. } => {
                self.total = *total;
                self.seen.clear();
                self.set_template();
                self.bar.set_length(*total as u64);
                self.bar.set_position(0);
                self.bar
                    .set_prefix(format!("{:>12}", "Starting".style(self.styles.pass)));
                self.bar.set_message("Loading test suite");
            }
            TestEventKind::TestStarted { case, .. } => {
                self.bar.set_message(format!("Executing {}", case.name()));
            }
            TestEventKind::TestFinished {
                event,
                current_stats,
            } => {
                self.seen.insert(event.result.case.full_name());
                self.bar.set_prefix(self.running_prefix(current_stats));
                self.bar.set_position(self.executed_count() as u64);
                self.bar
                    .set_message(format!("Executing {}", event.result.case.name()));
            }
            TestEventKind::RunAborted { .. } => {
                self.bar
                    .set_prefix(format!("{:>12}", "Aborting".style(self.styles.fail)));
            }
            TestEventKind::RunFinished { .. } => {
                self.bar.finish_and_clear();
            }
        }
    }
}

#[derive(Clone, Debug, Default)]
struct Styles {
    pass: Style,
    fail: Style,
}

impl Styles {
    fn colorize(&mut self) {
        self.pass = Style::new().green().bold();
        self.fail = Style::new().red().bold();
    }
}
