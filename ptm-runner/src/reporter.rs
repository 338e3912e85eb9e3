// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Observing a run and reporting its results.
//!
//! Observers implement [`RunObserver`] and are handed to
//! [`TestRunner::execute`](crate::runner::TestRunner::execute). Once the run is over,
//! [`ReportGenerator`] turns its results into a [`Report`].

mod capabilities;
mod events;
mod export;
mod progress;
mod report;

pub use capabilities::*;
pub use events::*;
pub use export::*;
pub use progress::*;
pub use report::*;

/// Receives events from a test run.
///
/// Events are delivered synchronously and in order. An observer must not assume a test case
/// finishes only once.
pub trait RunObserver<'list> {
    /// Handles a single event.
    fn handle_event(&mut self, event: &TestEvent<'list>);
}
