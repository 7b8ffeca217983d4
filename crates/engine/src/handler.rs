// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recursion seam between the orchestrator and the domain logic.

use crate::error::HandlerError;
use pt_core::{MultiTransferJob, TransferProcess, TransferRequest};

/// Domain logic driven by the orchestrator's job lifecycle.
///
/// `initiate` produces the first requests for a new job, `recurse` produces
/// follow-up requests out of a completed transfer, and `complete` builds
/// the final artifact once no transfers remain pending. `complete` runs
/// under the store's exactly-once completion guard.
pub trait RecursiveJobHandler: Send + Sync {
    fn initiate(&self, job: &MultiTransferJob) -> Result<Vec<TransferRequest>, HandlerError>;

    fn recurse(
        &self,
        job: &MultiTransferJob,
        process: &TransferProcess,
    ) -> Result<Vec<TransferRequest>, HandlerError>;

    fn complete(&self, job: &MultiTransferJob) -> Result<(), HandlerError>;
}

impl<H: RecursiveJobHandler + ?Sized> RecursiveJobHandler for std::sync::Arc<H> {
    fn initiate(&self, job: &MultiTransferJob) -> Result<Vec<TransferRequest>, HandlerError> {
        (**self).initiate(job)
    }

    fn recurse(
        &self,
        job: &MultiTransferJob,
        process: &TransferProcess,
    ) -> Result<Vec<TransferRequest>, HandlerError> {
        (**self).recurse(job, process)
    }

    fn complete(&self, job: &MultiTransferJob) -> Result<(), HandlerError> {
        (**self).complete(job)
    }
}
