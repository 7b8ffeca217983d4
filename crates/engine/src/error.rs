// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine error types

use pt_core::NodeId;
use thiserror::Error;

/// Protocol violation in the item graph a provider returned.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A reported child has no path from the queried node in the response's
    /// own edge set, so its consumed depth cannot be accounted for.
    #[error("node {child} not reachable from {queried} in the returned relationships")]
    UnconnectedNode { queried: NodeId, child: NodeId },
}

/// Failure inside a recursive job handler.
///
/// Handler errors abort the owning job: the orchestrator records
/// [`HandlerError::kind`] as the job's exception name.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("job is missing required parameter {0:?}")]
    MissingParameter(&'static str),
    #[error("malformed job payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl HandlerError {
    /// Short stable name recorded in the job's error details.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingParameter(_) => "missing_parameter",
            Self::Payload(_) => "malformed_payload",
            Self::Graph(GraphError::UnconnectedNode { .. }) => "unconnected_node",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconnected_node_message_names_both_ends() {
        let err = GraphError::UnconnectedNode {
            queried: NodeId::new("root"),
            child: NodeId::new("orphan"),
        };
        assert_eq!(
            err.to_string(),
            "node orphan not reachable from root in the returned relationships"
        );
    }

    #[test]
    fn handler_error_kinds_are_stable() {
        let graph = HandlerError::from(GraphError::UnconnectedNode {
            queried: NodeId::new("a"),
            child: NodeId::new("b"),
        });
        assert_eq!(graph.kind(), "unconnected_node");
        assert_eq!(HandlerError::MissingParameter("request").kind(), "missing_parameter");
    }
}
