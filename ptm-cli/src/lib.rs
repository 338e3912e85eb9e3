// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `ptm` command-line driver.
//!
//! `ptm` loads a protocol conformance test suite, selects test cases by profile, filter expression
//! or capability, runs them one at a time and writes the results as plain text, JSON or XUnit.

#![warn(missing_docs)]

mod dispatch;
mod errors;
mod output;

#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use errors::*;
#[doc(hidden)]
pub use output::{OutputContext, StderrStyles};
