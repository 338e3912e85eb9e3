// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Support for handling signals in ptm.
//!
//! Interrupt and termination signals are routed to an [`AbortHandle`]: the test case that is
//! currently running finishes, and no further test cases start.

use crate::{errors::SignalHandlerSetupError, runner::AbortHandle};

/// The kind of signal handling to set up for a test run.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum SignalHandlerKind {
    /// The standard signal handler. Captures Ctrl-C, and SIGTERM and SIGHUP on Unix.
    Standard,

    /// A no-op signal handler. Useful for tests.
    Noop,
}

impl SignalHandlerKind {
    /// Installs the handler, aborting `handle` when a signal arrives.
    ///
    /// The standard handler can only be installed once per process.
    pub fn install(self, handle: &AbortHandle) -> Result<(), SignalHandlerSetupError> {
        match self {
            Self::Standard => {
                let handle = handle.clone();
                ctrlc::set_handler(move || handle.abort())?;
                Ok(())
            }
            Self::Noop => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_does_not_abort() {
        let handle = AbortHandle::new();
        SignalHandlerKind::Noop.install(&handle).unwrap();
        assert!(!handle.is_aborted());
    }
}
