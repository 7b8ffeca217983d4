// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outbound request descriptors and completed-transfer records.

use crate::graph::NodeId;
use crate::id::TransferId;
use serde::{Deserialize, Serialize};

/// One provider query: which node to expand and how much depth budget the
/// provider may spend answering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeQuery {
    pub node: NodeId,
    pub depth: u32,
}

impl TreeQuery {
    pub fn new(node: impl Into<NodeId>, depth: u32) -> Self {
        Self { node: node.into(), depth }
    }

    /// Copy of this query re-targeted at a child with a reduced depth budget.
    pub fn for_child(&self, child: &NodeId, remaining_depth: u32) -> Self {
        Self { node: child.clone(), depth: remaining_depth }
    }
}

/// Descriptor for one outbound transfer to a single remote provider.
///
/// `destination_key` is the blob key where the provider's partial tree lands;
/// the completed-transfer record keeps it so the handler can retrieve the
/// partial result later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub provider_url: String,
    pub query: TreeQuery,
    pub destination_key: String,
}

/// A completed transfer: the process id assigned by the transfer manager
/// plus the request it answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferProcess {
    pub id: TransferId,
    pub request: TransferRequest,
}

impl TransferProcess {
    pub fn new(id: TransferId, request: TransferRequest) -> Self {
        Self { id, request }
    }
}
