// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Generation of follow-up transfer requests for child nodes.

use crate::dijkstra::shortest_path_length;
use crate::error::GraphError;
use crate::registry::RegistryClient;
use pt_core::{NodeId, Relationship, TransferRequest, TreeQuery};

/// Blob key prefix for partial-tree results.
pub(crate) const PARTIAL_KEY_PREFIX: &str = "partial/";

/// Snapshot of one answered query, used to derive the next round of
/// requests. Built fresh per recursion step.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// The query the current hop answered; child queries are
    /// re-parameterized copies of it.
    pub template: TreeQuery,
    /// Provider URL the current hop was served from, `None` on the first.
    pub previous_url: Option<String>,
    /// Node the current hop queried.
    pub queried_node: NodeId,
    /// Relationships returned by the current hop.
    pub edges: Vec<Relationship>,
    /// Depth budget the current hop was issued with.
    pub depth: u32,
}

/// Builds transfer requests for candidate child nodes, skipping the ones
/// that need no further querying.
pub struct RequestFactory<R: RegistryClient> {
    registry: R,
}

impl<R: RegistryClient> RequestFactory<R> {
    pub fn new(registry: R) -> Self {
        Self { registry }
    }

    /// One request per candidate that resolves to a *different* provider
    /// and still has depth budget left.
    ///
    /// Skips are expected outcomes, logged but never errors: a registry
    /// miss means the node is not retrievable, an unchanged provider URL
    /// means the previous response already covered the child, and an
    /// exhausted depth budget means the caller asked for no more hops. A
    /// candidate with no path from the queried node is a protocol
    /// violation and fails the whole operation.
    pub fn create_requests<'a>(
        &self,
        ctx: &RequestContext,
        candidates: impl IntoIterator<Item = &'a NodeId>,
    ) -> Result<Vec<TransferRequest>, GraphError> {
        let mut requests = Vec::new();
        for candidate in candidates {
            if let Some(request) = self.create_request(ctx, candidate)? {
                requests.push(request);
            }
        }
        Ok(requests)
    }

    fn create_request(
        &self,
        ctx: &RequestContext,
        candidate: &NodeId,
    ) -> Result<Option<TransferRequest>, GraphError> {
        let Some(provider_url) = self.registry.resolve_provider_url(candidate) else {
            tracing::info!(node = %candidate, "registry did not resolve node");
            return Ok(None);
        };

        // Same provider as the previous hop: its response already carried
        // this child's subtree up to the remaining depth.
        if ctx.previous_url.as_deref() == Some(provider_url.as_str()) {
            tracing::debug!(node = %candidate, "not issuing a new request, provider url unchanged");
            return Ok(None);
        }

        let mut remaining_depth = ctx.depth;
        if ctx.previous_url.is_some() {
            let used_depth = shortest_path_length(&ctx.edges, &ctx.queried_node, candidate)
                .ok_or_else(|| GraphError::UnconnectedNode {
                    queried: ctx.queried_node.clone(),
                    child: candidate.clone(),
                })?;
            remaining_depth = ctx.depth.saturating_sub(used_depth);
            if remaining_depth == 0 {
                tracing::debug!(node = %candidate, "not issuing a new request, depth exhausted");
                return Ok(None);
            }
        }

        tracing::info!(
            node = %candidate,
            url = %provider_url,
            previous_depth = ctx.depth,
            new_depth = remaining_depth,
            "mapped follow-up request"
        );

        Ok(Some(TransferRequest {
            provider_url,
            query: ctx.template.for_child(candidate, remaining_depth),
            destination_key: format!("{PARTIAL_KEY_PREFIX}{}", nanoid::nanoid!(19)),
        }))
    }
}

#[cfg(test)]
#[path = "factory_tests.rs"]
mod tests;
