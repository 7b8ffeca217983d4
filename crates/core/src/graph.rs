// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Item-graph data model: nodes, relationship edges, partial trees, tombstones.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Identifier of a node in the item graph.
///
/// Node ids are assigned by the upstream registry, never generated locally,
/// so unlike [`crate::JobId`] there is no random constructor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub SmolStr);

impl NodeId {
    pub fn new(id: impl Into<SmolStr>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// One directed edge of the item graph: a parent node and the child built
/// into it, plus provider-supplied metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relationship {
    pub parent: NodeId,
    pub child: NodeId,
    /// Lifecycle context the edge was reported in (e.g. "asBuilt").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle_context: Option<String>,
    /// Business partner number of the child's manufacturer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bpn: Option<String>,
}

impl Relationship {
    pub fn new(parent: impl Into<NodeId>, child: impl Into<NodeId>) -> Self {
        Self {
            parent: parent.into(),
            child: child.into(),
            lifecycle_context: None,
            bpn: None,
        }
    }
}

/// Descriptive entry for one node, deduplicated by full equality when
/// partial trees are merged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeInfo {
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl NodeInfo {
    pub fn new(id: impl Into<NodeId>) -> Self {
        Self { id: id.into(), name: None }
    }
}

/// Recorded per-node failure that does not abort the overall job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tombstone {
    pub node_id: NodeId,
    /// Endpoint that failed to answer for this node.
    pub endpoint_url: String,
    pub error: TombstoneDetail,
    pub last_attempt_ms: u64,
}

/// Error detail carried by a [`Tombstone`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TombstoneDetail {
    /// Name of the error kind that produced the tombstone.
    pub exception: String,
    pub error_detail: String,
    #[serde(default)]
    pub retry_counter: u32,
}

impl Tombstone {
    pub fn new(
        node_id: impl Into<NodeId>,
        endpoint_url: impl Into<String>,
        exception: impl Into<String>,
        error_detail: impl Into<String>,
        last_attempt_ms: u64,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            endpoint_url: endpoint_url.into(),
            error: TombstoneDetail {
                exception: exception.into(),
                error_detail: error_detail.into(),
                retry_counter: 0,
            },
            last_attempt_ms,
        }
    }
}

/// A (partial or assembled) relationship tree.
///
/// `ItemTree::default()` is the identity element for the assembler's merge:
/// merging it with any tree leaves that tree unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemTree {
    #[serde(default)]
    pub items: Vec<NodeInfo>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tombstones: Vec<Tombstone>,
}

impl ItemTree {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.relationships.is_empty() && self.tombstones.is_empty()
    }

    /// Ids of all child nodes reported by this tree's relationships.
    pub fn child_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.relationships.iter().map(|r| &r.child)
    }
}

#[cfg(test)]
#[path = "graph_tests.rs"]
mod tests;
