// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::model::NodeId;

/// Recommended number of allowed node expansions in [find_path](crate::find_path)
/// before [SearchError::StepLimitExceeded] is returned.
pub const DEFAULT_STEP_LIMIT: usize = 1_000_000;

/// Error conditions which may occur during [find_path](crate::find_path)
/// or when talking to a [PathService](crate::PathService).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// The start or end nodes don't exist in a graph.
    InvalidReference(NodeId),

    /// The end node is not reachable from the start node.
    NoPath { from: NodeId, to: NodeId },

    /// Route search has exceeded its limit of steps.
    /// Either the nodes are really far apart, or no route exists.
    ///
    /// Concluding that no route exists requires traversing the whole graph,
    /// which can result in a denial-of-service. The step limit protects
    /// against resource exhaustion.
    StepLimitExceeded,

    /// Route search didn't finish before its deadline.
    Timeout,

    /// Route search was aborted by the caller.
    Cancelled,

    /// The search service couldn't be reached.
    Unavailable(String),
}

impl SearchError {
    /// Returns true for infrastructure failures, after which the same
    /// request may succeed if retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout | Self::Unavailable(_))
    }
}

impl std::fmt::Display for SearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidReference(node_id) => write!(f, "invalid node: {}", node_id),
            Self::NoPath { from, to } => write!(f, "no path from node {} to node {}", from, to),
            Self::StepLimitExceeded => write!(f, "step limit exceeded"),
            Self::Timeout => write!(f, "search timed out"),
            Self::Cancelled => write!(f, "search cancelled"),
            Self::Unavailable(reason) => write!(f, "search service unavailable: {}", reason),
        }
    }
}

impl std::error::Error for SearchError {}
