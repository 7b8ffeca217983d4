// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registry lookup of the provider hosting a given node.

use pt_core::NodeId;
use std::collections::HashMap;

/// Resolves the provider connector URL responsible for a node.
///
/// A miss is an expected condition, not an error: nodes without a registry
/// entry are simply not expanded further.
pub trait RegistryClient: Send + Sync {
    fn resolve_provider_url(&self, node: &NodeId) -> Option<String>;
}

/// Map-backed registry for tests and statically configured deployments.
#[derive(Default)]
pub struct StaticRegistryClient {
    entries: HashMap<NodeId, String>,
}

impl StaticRegistryClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: impl Into<NodeId>, url: impl Into<String>) {
        self.entries.insert(node.into(), url.into());
    }

    pub fn with_entry(mut self, node: impl Into<NodeId>, url: impl Into<String>) -> Self {
        self.insert(node, url);
        self
    }
}

impl RegistryClient for StaticRegistryClient {
    fn resolve_provider_url(&self, node: &NodeId) -> Option<String> {
        self.entries.get(node).cloned()
    }
}
