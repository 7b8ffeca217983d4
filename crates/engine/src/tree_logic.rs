// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Item-tree retrieval logic behind the [`RecursiveJobHandler`] seam.
//!
//! Each transfer deposits a partial [`ItemTree`] in the blob store under the
//! request's destination key. `recurse` reads the partial back, extracts the
//! child nodes it reports, and asks the factory for follow-up requests;
//! `complete` merges every partial into the final artifact and writes it to
//! the job's destination key.

use crate::assembler::assemble;
use crate::error::HandlerError;
use crate::factory::{RequestContext, RequestFactory};
use crate::handler::RecursiveJobHandler;
use crate::registry::RegistryClient;
use pt_core::{ItemTree, MultiTransferJob, TransferProcess, TransferRequest, TreeQuery};
use pt_storage::BlobStore;
use std::sync::Arc;

/// Job parameter holding the serialized [`TreeQuery`] of the original request.
pub const JOB_PARAM_REQUEST: &str = "request";
/// Job parameter holding the blob key for the assembled final artifact.
pub const JOB_PARAM_DESTINATION: &str = "destination-key";

/// [`RecursiveJobHandler`] assembling multi-provider item trees.
pub struct ItemTreeHandler<B: BlobStore, R: RegistryClient> {
    blobs: Arc<B>,
    factory: RequestFactory<R>,
}

impl<B: BlobStore, R: RegistryClient> ItemTreeHandler<B, R> {
    pub fn new(blobs: Arc<B>, registry: R) -> Self {
        Self { blobs, factory: RequestFactory::new(registry) }
    }

    fn query_of(job: &MultiTransferJob) -> Result<TreeQuery, HandlerError> {
        let raw = job
            .parameter(JOB_PARAM_REQUEST)
            .ok_or(HandlerError::MissingParameter(JOB_PARAM_REQUEST))?;
        Ok(serde_json::from_str(raw)?)
    }

    /// Partial tree a completed transfer deposited, degraded to an empty
    /// tree when the blob is missing or unreadable.
    fn partial_tree_of(&self, process: &TransferProcess) -> ItemTree {
        let key = &process.request.destination_key;
        let bytes = match self.blobs.get(key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                tracing::warn!(process_id = %process.id, %key, "partial tree blob missing");
                return ItemTree::default();
            }
            Err(e) => {
                tracing::warn!(process_id = %process.id, %key, error = %e, "partial tree blob unreadable");
                return ItemTree::default();
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(tree) => tree,
            Err(e) => {
                tracing::warn!(process_id = %process.id, %key, error = %e, "partial tree blob malformed");
                ItemTree::default()
            }
        }
    }
}

impl<B: BlobStore, R: RegistryClient> RecursiveJobHandler for ItemTreeHandler<B, R> {
    fn initiate(&self, job: &MultiTransferJob) -> Result<Vec<TransferRequest>, HandlerError> {
        let query = Self::query_of(job)?;
        let ctx = RequestContext {
            template: query.clone(),
            previous_url: None,
            queried_node: query.node.clone(),
            edges: Vec::new(),
            depth: query.depth,
        };
        Ok(self.factory.create_requests(&ctx, [&query.node])?)
    }

    fn recurse(
        &self,
        job: &MultiTransferJob,
        process: &TransferProcess,
    ) -> Result<Vec<TransferRequest>, HandlerError> {
        let partial = self.partial_tree_of(process);
        tracing::debug!(
            job_id = %job.id(),
            process_id = %process.id,
            relationships = partial.relationships.len(),
            "recursing into partial tree"
        );
        let query = &process.request.query;
        let ctx = RequestContext {
            template: query.clone(),
            previous_url: Some(process.request.provider_url.clone()),
            queried_node: query.node.clone(),
            edges: partial.relationships.clone(),
            depth: query.depth,
        };
        Ok(self.factory.create_requests(&ctx, partial.child_ids())?)
    }

    fn complete(&self, job: &MultiTransferJob) -> Result<(), HandlerError> {
        let destination = job
            .parameter(JOB_PARAM_DESTINATION)
            .ok_or(HandlerError::MissingParameter(JOB_PARAM_DESTINATION))?;

        let assembled =
            assemble(job.completed_transfers().iter().map(|p| self.partial_tree_of(p)));
        tracing::info!(
            job_id = %job.id(),
            items = assembled.items.len(),
            relationships = assembled.relationships.len(),
            tombstones = assembled.tombstones.len(),
            "assembled item tree"
        );

        let bytes = serde_json::to_vec(&assembled)?;
        // The job still completes when the final write fails; the failure is
        // only visible in the logs. Accepted gap.
        if let Err(e) = self.blobs.put(destination, bytes) {
            tracing::warn!(job_id = %job.id(), key = %destination, error = %e, "failed to write assembled tree");
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tree_logic_tests.rs"]
mod tests;
