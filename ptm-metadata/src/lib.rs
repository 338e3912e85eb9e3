// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Machine-readable output for ptm test runs.
//!
//! This crate contains the schema for JSON test reports written by `ptm`, along with the
//! documented exit codes of the `ptm` binary.

mod exit_codes;
mod test_report;

pub use exit_codes::*;
pub use test_report::*;
