// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The test runner.
//!
//! The main structure in this module is [`TestRunner`], which drives a [`SuiteRuntime`] through a
//! selection of test cases one at a time and reports each step to a list of observers.

use crate::{
    errors::SignalHandlerSetupError,
    list::TestCase,
    reporter::{Outcome, RunEvent, RunObserver, TestCaseResult, TestEvent, TestEventKind},
    runtime::SuiteRuntime,
    signal::SignalHandlerKind,
    stopwatch::{StopwatchStart, stopwatch},
};
use indexmap::IndexMap;
use indicatif::ProgressBar;
use std::sync::{
    Arc, OnceLock,
    atomic::{AtomicBool, Ordering},
};
use tracing::{debug, info};

/// A cloneable handle used to abort a test run from any thread.
///
/// Aborting is cooperative: the test case that is currently running finishes, and no further test
/// cases start.
#[derive(Clone, Debug, Default)]
pub struct AbortHandle {
    state: Arc<AbortState>,
}

#[derive(Debug, Default)]
struct AbortState {
    aborted: AtomicBool,
    progress_bar: OnceLock<ProgressBar>,
}

impl AbortHandle {
    /// Creates a new handle that hasn't been aborted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes the abort message through `bar`, so that redrawing the bar doesn't erase it.
    ///
    /// Only the first bar attached to a handle is used.
    pub fn attach_progress_bar(&self, bar: ProgressBar) {
        let _ = self.state.progress_bar.set(bar);
    }

    /// Requests that the run be aborted.
    ///
    /// Idempotent: only the first call prints a message or has any other effect.
    pub fn abort(&self) {
        if self.state.aborted.swap(true, Ordering::AcqRel) {
            return;
        }
        match self.state.progress_bar.get() {
            Some(bar) => bar.suspend(announce_abort),
            None => announce_abort(),
        }
    }

    /// Returns true if the run has been aborted.
    pub fn is_aborted(&self) -> bool {
        self.state.aborted.load(Ordering::Acquire)
    }
}

fn announce_abort() {
    info!("Aborting test suite.");
}

/// Test runner options.
#[derive(Debug, Default)]
pub struct TestRunnerBuilder {
    abort_handle: Option<AbortHandle>,
}

impl TestRunnerBuilder {
    /// Sets the handle used to abort the run.
    ///
    /// By default, a fresh handle is created for each runner.
    pub fn set_abort_handle(&mut self, abort_handle: AbortHandle) -> &mut Self {
        self.abort_handle = Some(abort_handle);
        self
    }

    /// Creates a new runner for `cases`, installing the given kind of signal handler.
    pub fn build<'list>(
        &self,
        runtime: &'list dyn SuiteRuntime,
        cases: &[&'list TestCase],
        signal_handler: SignalHandlerKind,
    ) -> Result<TestRunner<'list>, SignalHandlerSetupError> {
        let abort_handle = self.abort_handle.clone().unwrap_or_default();
        signal_handler.install(&abort_handle)?;
        Ok(TestRunner {
            runtime,
            cases: cases.to_vec(),
            abort_handle,
        })
    }
}

/// Runs a selection of test cases against a suite runtime.
pub struct TestRunner<'list> {
    runtime: &'list dyn SuiteRuntime,
    cases: Vec<&'list TestCase>,
    abort_handle: AbortHandle,
}

impl<'list> TestRunner<'list> {
    /// Returns a handle that aborts this run.
    pub fn abort_handle(&self) -> AbortHandle {
        self.abort_handle.clone()
    }

    /// Executes the selected test cases in order, one at a time.
    ///
    /// Every event is delivered to each observer in turn, in the order the observers are given.
    /// Test cases that never start remain [`Outcome::NotRun`] in the returned results.
    pub fn execute(&self, observers: &mut [&mut dyn RunObserver<'list>]) -> RunResults<'list> {
        let mut ctx = DispatcherContext::new(observers);
        let total = self.cases.len();
        let mut results: IndexMap<&'list str, TestCaseResult<'list>> = self
            .cases
            .iter()
            .map(|&case| (case.full_name(), TestCaseResult::not_run(case)))
            .collect();
        let mut run_stats = RunStats {
            initial_run_count: total,
            ..RunStats::default()
        };

        ctx.dispatch(TestEventKind::RunStarted {
            suite_info: self.runtime.suite_info(),
            total,
        });

        for (index, &case) in self.cases.iter().enumerate() {
            if self.abort_handle.is_aborted() {
                self.on_abort(&mut ctx, &mut run_stats, total - index);
                break;
            }

            ctx.dispatch(TestEventKind::TestStarted { case, index, total });

            let case_stopwatch = stopwatch();
            let output = self.runtime.execute(case);
            let snapshot = case_stopwatch.snapshot();
            let result = TestCaseResult {
                case,
                outcome: output.outcome,
                start_time: Some(snapshot.start_time),
                duration: snapshot.duration,
                message: output.message,
            };
            debug!(
                "{} finished with {} in {:?}",
                case.full_name(),
                result.outcome,
                result.duration,
            );

            run_stats.on_test_finished(result.outcome);
            results.insert(case.full_name(), result.clone());
            ctx.dispatch(TestEventKind::TestFinished {
                event: RunEvent::new(result),
                current_stats: run_stats,
            });
        }

        // An abort that arrives during the last test case still counts.
        if !run_stats.aborted && self.abort_handle.is_aborted() {
            self.on_abort(&mut ctx, &mut run_stats, 0);
        }

        let snapshot = ctx.stopwatch.snapshot();
        ctx.dispatch(TestEventKind::RunFinished {
            start_time: snapshot.start_time,
            elapsed: snapshot.duration,
            run_stats,
        });

        RunResults { results, run_stats }
    }

    fn on_abort(
        &self,
        ctx: &mut DispatcherContext<'_, '_, 'list>,
        run_stats: &mut RunStats,
        remaining: usize,
    ) {
        run_stats.aborted = true;
        ctx.dispatch(TestEventKind::RunAborted { remaining });
        self.runtime.request_abort();
    }
}

struct DispatcherContext<'obs, 'refs, 'list> {
    observers: &'obs mut [&'refs mut dyn RunObserver<'list>],
    stopwatch: StopwatchStart,
}

impl<'obs, 'refs, 'list> DispatcherContext<'obs, 'refs, 'list> {
    fn new(observers: &'obs mut [&'refs mut dyn RunObserver<'list>]) -> Self {
        Self {
            observers,
            stopwatch: stopwatch(),
        }
    }

    fn dispatch(&mut self, kind: TestEventKind<'list>) {
        let event = TestEvent {
            timestamp: chrono::Local::now().fixed_offset(),
            elapsed: self.stopwatch.elapsed(),
            kind,
        };
        for observer in self.observers.iter_mut() {
            observer.handle_event(&event);
        }
    }
}

/// Statistics for a test run.
#[derive(Copy, Clone, Default, Debug, Eq, PartialEq)]
pub struct RunStats {
    /// The total number of test cases that were expected to run at the beginning.
    ///
    /// If the run is aborted, this will be more than `final_run_count`.
    pub initial_run_count: usize,

    /// The total number of test cases that actually ran.
    pub final_run_count: usize,

    /// The number of test cases that passed.
    pub passed: usize,

    /// The number of test cases that failed.
    pub failed: usize,

    /// The number of test cases that were inconclusive.
    pub inconclusive: usize,

    /// True if the run was aborted.
    pub aborted: bool,
}

impl RunStats {
    /// Returns true if this run is considered a success.
    ///
    /// A run is not a success if it was aborted, or if any test case failed. Inconclusive test
    /// cases don't fail a run.
    pub fn is_success(&self) -> bool {
        !self.aborted && self.failed == 0
    }

    /// The number of selected test cases that never ran.
    pub fn not_run(&self) -> usize {
        self.initial_run_count - self.final_run_count
    }

    fn on_test_finished(&mut self, outcome: Outcome) {
        self.final_run_count += 1;
        match outcome {
            Outcome::Pass => self.passed += 1,
            Outcome::Fail => self.failed += 1,
            Outcome::Inconclusive => self.inconclusive += 1,
            // A runtime shouldn't report this, but it ran regardless.
            Outcome::NotRun => {}
        }
    }
}

/// The results of a test run.
#[derive(Clone, Debug)]
pub struct RunResults<'list> {
    results: IndexMap<&'list str, TestCaseResult<'list>>,
    run_stats: RunStats,
}

impl<'list> RunResults<'list> {
    /// Statistics for the run.
    pub fn run_stats(&self) -> RunStats {
        self.run_stats
    }

    /// The result for every selected test case, in selection order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &TestCaseResult<'list>> + '_ {
        self.results.values()
    }

    /// Returns the result for a test case by full name.
    pub fn get(&self, full_name: &str) -> Option<&TestCaseResult<'list>> {
        self.results.get(full_name)
    }

    /// The number of selected test cases.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns true if no test cases were selected.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
