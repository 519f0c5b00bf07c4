// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::time::{Duration, Instant};

use super::{find_path, CancelToken, Limits, Path, SearchError, DEFAULT_STEP_LIMIT};
use crate::cost::{CostFunctionId, HeuristicId};
use crate::model::NodeId;
use crate::session::Session;

/// Parameters of a single path search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub start: NodeId,
    pub end: NodeId,
    pub cost_function: CostFunctionId,
    pub heuristic: HeuristicId,

    /// How long the caller is willing to wait for the result.
    pub timeout: Option<Duration>,
}

/// Boundary between routing and the actual path search.
///
/// The search may run in-process ([LocalService]) or in a separate service,
/// in which case implementations are expected to ship the session's
/// [Annex](crate::Annex) together with the request, and to report transport
/// failures as [SearchError::Unavailable] or [SearchError::Timeout]
/// rather than [SearchError::NoPath].
pub trait PathService: Send + Sync {
    fn find(
        &self,
        session: &Session<'_>,
        request: &SearchRequest,
        cancel: &CancelToken,
    ) -> Result<Path, SearchError>;
}

/// Runs [find_path] in the calling thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalService {
    pub step_limit: usize,
}

impl Default for LocalService {
    fn default() -> Self {
        Self {
            step_limit: DEFAULT_STEP_LIMIT,
        }
    }
}

impl PathService for LocalService {
    fn find(
        &self,
        session: &Session<'_>,
        request: &SearchRequest,
        cancel: &CancelToken,
    ) -> Result<Path, SearchError> {
        let cost_fn = request.cost_function.build();
        let heuristic = request.heuristic.build();
        let limits = Limits {
            step_limit: self.step_limit,
            deadline: request.timeout.map(|t| Instant::now() + t),
            cancel: cancel.clone(),
        };

        find_path(
            session,
            request.start,
            request.end,
            cost_fn.as_ref(),
            heuristic.as_deref(),
            &limits,
        )
    }
}
