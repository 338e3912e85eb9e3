// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for a test run.
//!
//! The main structures in this module are:
//! * [`TestProfile`], which names a suite, the test cases checked for it, and suite properties
//! * [`ConfigItem`], a `key=value` override passed on the command line

mod overrides;
mod profile;

pub use overrides::*;
pub use profile::*;
