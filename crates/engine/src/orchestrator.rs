// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job lifecycle orchestration.
//!
//! Drives a [`RecursiveJobHandler`] through the job state machine: initiate
//! fans out the first transfers, each completion may fan out more, and once
//! the pending set drains the handler's `complete` runs under the store's
//! exactly-once guard. Faults never escape to the caller of `start_job`;
//! they land in the job record as error details.

use crate::error::HandlerError;
use crate::handler::RecursiveJobHandler;
use crate::transfer::{ResponseStatus, TransferProcessManager};
use pt_core::{Clock, JobId, JobState, MultiTransferJob, TransferProcess, TransferRequest};
use pt_storage::{JobBacking, JobStore, JobStoreError};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Retention windows for terminal job records.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub completed_job_ttl: Duration,
    pub failed_job_ttl: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            completed_job_ttl: Duration::from_secs(60 * 60),
            failed_job_ttl: Duration::from_secs(24 * 60 * 60),
        }
    }
}

/// Outcome of [`JobOrchestrator::start_job`]. The job always exists in the
/// store; a non-ok status means it will not make progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobInitiateResponse {
    pub job_id: JobId,
    pub status: ResponseStatus,
}

pub struct JobOrchestrator<H, T, K, C>
where
    H: RecursiveJobHandler,
    T: TransferProcessManager,
    K: JobBacking,
    C: Clock,
{
    store: Arc<JobStore<K, C>>,
    handler: H,
    transfer_manager: T,
    config: OrchestratorConfig,
    clock: C,
}

impl<H, T, K, C> JobOrchestrator<H, T, K, C>
where
    H: RecursiveJobHandler,
    T: TransferProcessManager,
    K: JobBacking,
    C: Clock,
{
    pub fn new(
        store: Arc<JobStore<K, C>>,
        handler: H,
        transfer_manager: T,
        config: OrchestratorConfig,
        clock: C,
    ) -> Self {
        Self { store, handler, transfer_manager, config, clock }
    }

    pub fn store(&self) -> &JobStore<K, C> {
        &self.store
    }

    /// Register a new job and fan out its initial transfers.
    ///
    /// Never returns an error: faults mark the job `Error` and surface as a
    /// non-ok status. A job whose handler produces zero requests completes
    /// immediately.
    pub async fn start_job(&self, parameters: HashMap<String, String>) -> JobInitiateResponse {
        let job = MultiTransferJob::new(JobId::new(), parameters);
        let job_id = job.id().clone();

        if let Err(e) = self.store.create(job.clone()) {
            tracing::error!(%job_id, error = %e, "failed to register job");
            return JobInitiateResponse { job_id, status: ResponseStatus::FatalError };
        }
        tracing::info!(%job_id, "job started");

        let requests = match self.handler.initiate(&job) {
            Ok(requests) => requests,
            Err(e) => {
                self.mark_job_in_error(&job_id, &e.to_string(), e.kind());
                return JobInitiateResponse { job_id, status: ResponseStatus::FatalError };
            }
        };

        match self.start_transfers(&job_id, requests).await {
            Ok(0) => self.call_complete_handler_if_finished(&job_id),
            Ok(_) => {}
            Err(status) => return JobInitiateResponse { job_id, status },
        }

        JobInitiateResponse { job_id, status: ResponseStatus::Ok }
    }

    /// Handle one completed transfer delivered by the transfer manager.
    ///
    /// Unknown process ids are ignored (the job may have been cleaned up);
    /// so are completions for jobs that are no longer `Running`, which is
    /// how cancellation takes effect on in-flight transfers.
    pub async fn transfer_process_completed(&self, process: TransferProcess) {
        let job = match self.store.find_by_process_id(&process.id) {
            Ok(Some(job)) => job,
            Ok(None) => {
                tracing::warn!(process_id = %process.id, "job not found for transfer, ignoring");
                return;
            }
            Err(e) => {
                tracing::error!(process_id = %process.id, error = %e, "job lookup failed");
                return;
            }
        };
        let job_id = job.id().clone();

        if job.state() != JobState::Running {
            tracing::info!(%job_id, state = %job.state(), "ignoring transfer completion, job not running");
            return;
        }

        let requests = match self.handler.recurse(&job, &process) {
            Ok(requests) => requests,
            Err(e) => {
                self.mark_job_in_error(&job_id, &e.to_string(), e.kind());
                return;
            }
        };

        if let Err(status) = self.start_transfers(&job_id, requests).await {
            self.mark_job_in_error(
                &job_id,
                &format!("failed to start transfer ({status})"),
                "transfer_start_failed",
            );
            return;
        }

        if let Err(e) = self.store.complete_transfer_process(&job_id, process) {
            tracing::error!(%job_id, error = %e, "failed to record transfer completion");
            return;
        }

        self.call_complete_handler_if_finished(&job_id);
    }

    /// Drain the completion channel until every sender is dropped.
    pub async fn run_completion_loop(&self, mut completions: mpsc::Receiver<TransferProcess>) {
        while let Some(process) = completions.recv().await {
            self.transfer_process_completed(process).await;
        }
        tracing::debug!("completion channel closed");
    }

    /// Delete completed jobs older than the configured retention window.
    pub fn find_and_cleanup_completed_jobs(&self) -> Vec<JobId> {
        self.cleanup(JobState::Completed, self.config.completed_job_ttl)
    }

    /// Delete failed jobs older than the configured retention window.
    pub fn find_and_cleanup_failed_jobs(&self) -> Vec<JobId> {
        self.cleanup(JobState::Error, self.config.failed_job_ttl)
    }

    async fn start_transfers(
        &self,
        job_id: &JobId,
        requests: Vec<TransferRequest>,
    ) -> Result<usize, ResponseStatus> {
        let mut started = 0;
        for request in requests {
            let response = self.transfer_manager.initiate_request(request).await;
            match (response.status, response.process_id) {
                (ResponseStatus::Ok, Some(process_id)) => {
                    if let Err(e) = self.store.add_transfer_process(job_id, process_id) {
                        tracing::error!(%job_id, error = %e, "failed to record started transfer");
                        return Err(ResponseStatus::FatalError);
                    }
                    started += 1;
                }
                (ResponseStatus::Ok, None) => {
                    tracing::error!(%job_id, "transfer manager returned ok without a process id");
                    return Err(ResponseStatus::FatalError);
                }
                (status, _) => {
                    tracing::warn!(%job_id, %status, "transfer initiation failed");
                    return Err(status);
                }
            }
        }
        Ok(started)
    }

    fn call_complete_handler_if_finished(&self, job_id: &JobId) {
        let result = self
            .store
            .complete_job(job_id, |job| self.handler.complete(job).map_err(Into::into));
        match result {
            Ok(()) => {}
            Err(JobStoreError::CompletionAction(e)) => {
                let kind = e
                    .downcast_ref::<HandlerError>()
                    .map(HandlerError::kind)
                    .unwrap_or("completion_failed");
                self.mark_job_in_error(job_id, &e.to_string(), kind);
            }
            Err(e) => {
                tracing::error!(%job_id, error = %e, "failed to complete job");
            }
        }
    }

    fn mark_job_in_error(&self, job_id: &JobId, detail: &str, exception: &str) {
        tracing::warn!(%job_id, exception, detail, "marking job in error");
        if let Err(e) = self.store.mark_job_in_error(job_id, detail, exception) {
            tracing::error!(%job_id, error = %e, "failed to mark job in error");
        }
    }

    fn cleanup(&self, state: JobState, ttl: Duration) -> Vec<JobId> {
        let cutoff = self.clock.epoch_ms().saturating_sub(ttl.as_millis() as u64);
        let jobs = match self.store.find_by_state_and_completion_older_than(state, cutoff) {
            Ok(jobs) => jobs,
            Err(e) => {
                tracing::error!(%state, error = %e, "retention sweep lookup failed");
                return Vec::new();
            }
        };

        let mut deleted = Vec::new();
        for job in jobs {
            match self.store.delete_job(job.id()) {
                Ok(_) => {
                    tracing::info!(job_id = %job.id(), %state, "deleted expired job");
                    deleted.push(job.id().clone());
                }
                Err(e) => {
                    tracing::error!(job_id = %job.id(), error = %e, "failed to delete expired job");
                }
            }
        }
        deleted
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
