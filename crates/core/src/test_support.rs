// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::graph::{ItemTree, NodeInfo, Relationship};
use crate::id::TransferId;
use crate::request::{TransferProcess, TransferRequest, TreeQuery};

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for item-graph types.
pub mod strategies {
    use crate::graph::{ItemTree, NodeId, NodeInfo, Relationship};
    use proptest::prelude::*;

    pub fn arb_node_id() -> impl Strategy<Value = NodeId> {
        "[a-e][0-9]{1,2}".prop_map(NodeId::new)
    }

    pub fn arb_relationship() -> impl Strategy<Value = Relationship> {
        (arb_node_id(), arb_node_id()).prop_map(|(parent, child)| Relationship {
            parent,
            child,
            lifecycle_context: None,
            bpn: None,
        })
    }

    pub fn arb_item_tree() -> impl Strategy<Value = ItemTree> {
        (
            proptest::collection::vec(arb_node_id().prop_map(NodeInfo::new), 0..6),
            proptest::collection::vec(arb_relationship(), 0..6),
        )
            .prop_map(|(items, relationships)| ItemTree {
                items,
                relationships,
                tombstones: Vec::new(),
            })
    }
}

// ── Factory functions ───────────────────────────────────────────────────

pub fn relationship(parent: &str, child: &str) -> Relationship {
    Relationship::new(parent, child)
}

pub fn tree_with_edges(edges: &[(&str, &str)]) -> ItemTree {
    let mut tree = ItemTree::default();
    for (parent, child) in edges {
        if tree.items.iter().all(|i| i.id.as_str() != *parent) {
            tree.items.push(NodeInfo::new(*parent));
        }
        if tree.items.iter().all(|i| i.id.as_str() != *child) {
            tree.items.push(NodeInfo::new(*child));
        }
        tree.relationships.push(Relationship::new(*parent, *child));
    }
    tree
}

pub fn transfer_request(provider_url: &str, node: &str, depth: u32) -> TransferRequest {
    TransferRequest {
        provider_url: provider_url.to_string(),
        query: TreeQuery::new(node, depth),
        destination_key: format!("partial/{node}"),
    }
}

pub fn transfer_process(id: &str, provider_url: &str, node: &str, depth: u32) -> TransferProcess {
    TransferProcess::new(TransferId::from_string(id), transfer_request(provider_url, node, depth))
}
