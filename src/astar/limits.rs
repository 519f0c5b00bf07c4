// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use super::{SearchError, DEFAULT_STEP_LIMIT};

/// Shared flag used to abort a query from another thread.
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Returns [SearchError::Cancelled] if the token was cancelled.
    pub fn check(&self) -> Result<(), SearchError> {
        if self.is_cancelled() {
            Err(SearchError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Bounds on the amount of work a single search may perform.
#[derive(Debug, Clone)]
pub struct Limits {
    /// Maximum number of node expansions, see [SearchError::StepLimitExceeded].
    pub step_limit: usize,

    /// Point in time after which the search gives up with [SearchError::Timeout].
    pub deadline: Option<Instant>,

    pub cancel: CancelToken,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            step_limit: DEFAULT_STEP_LIMIT,
            deadline: None,
            cancel: CancelToken::default(),
        }
    }
}

impl Limits {
    /// How many expansions happen between consecutive deadline and cancellation checks.
    const CHECK_INTERVAL: usize = 64;

    /// Checks all limits after `steps` node expansions.
    pub(crate) fn check(&self, steps: usize) -> Result<(), SearchError> {
        if steps > self.step_limit {
            return Err(SearchError::StepLimitExceeded);
        }

        if steps % Self::CHECK_INTERVAL == 0 {
            self.cancel.check()?;
            if let Some(deadline) = self.deadline {
                if Instant::now() >= deadline {
                    return Err(SearchError::Timeout);
                }
            }
        }

        Ok(())
    }
}
