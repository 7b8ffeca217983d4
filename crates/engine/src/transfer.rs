// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transfer process manager seam.
//!
//! The engine never talks to the wire itself: the host supplies a
//! [`TransferProcessManager`] that starts transfers and later delivers the
//! completed [`TransferProcess`] on an mpsc channel drained by
//! [`crate::JobOrchestrator::run_completion_loop`].

use async_trait::async_trait;
use pt_core::{TransferId, TransferProcess, TransferRequest};
use tokio::sync::mpsc;

/// Outcome class of a transfer initiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    Ok,
    /// Transient failure; the caller may retry the whole operation.
    ErrorRetry,
    /// Permanent failure; retrying will not help.
    FatalError,
}

pt_core::simple_display! {
    ResponseStatus {
        Ok => "ok",
        ErrorRetry => "error_retry",
        FatalError => "fatal_error",
    }
}

/// Result of asking the manager to start one transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferInitiateResponse {
    /// Id of the started process; `None` when the start failed.
    pub process_id: Option<TransferId>,
    pub status: ResponseStatus,
}

impl TransferInitiateResponse {
    pub fn ok(process_id: TransferId) -> Self {
        Self { process_id: Some(process_id), status: ResponseStatus::Ok }
    }

    pub fn error(status: ResponseStatus) -> Self {
        Self { process_id: None, status }
    }
}

/// Starts transfers against remote providers.
#[async_trait]
pub trait TransferProcessManager: Send + Sync {
    /// Start a transfer for `request`. On success the manager must later
    /// deliver the completed [`TransferProcess`] on the completion channel.
    async fn initiate_request(&self, request: TransferRequest) -> TransferInitiateResponse;
}

#[async_trait]
impl<T: TransferProcessManager + ?Sized> TransferProcessManager for std::sync::Arc<T> {
    async fn initiate_request(&self, request: TransferRequest) -> TransferInitiateResponse {
        (**self).initiate_request(request).await
    }
}

/// Build the completion channel shared by the manager and the orchestrator.
pub fn completion_channel(
    capacity: usize,
) -> (mpsc::Sender<TransferProcess>, mpsc::Receiver<TransferProcess>) {
    mpsc::channel(capacity)
}
