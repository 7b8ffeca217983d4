// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job aggregate and state machine.
//!
//! A [`MultiTransferJob`] is one end-to-end tree-retrieval request that
//! potentially comprises multiple transfers. Transitions are pure: each
//! method consumes the job and returns the transitioned value or a
//! [`TransitionError`]. The store applies them under its write lock, so no
//! locking shows up here and the state machine is testable as plain values.

use crate::id::{JobId, TransferId};
use crate::request::TransferProcess;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

/// Lifecycle state of a [`MultiTransferJob`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Built but not yet registered with the store
    Unsaved,
    /// Registered, no transfers started yet
    Initial,
    /// At least one transfer pending
    Running,
    /// All transfers completed, final artifact not yet assembled
    TransfersFinished,
    /// Final artifact assembled
    Completed,
    /// Failed with a recorded error
    Error,
    /// Canceled before completion
    Canceled,
}

impl JobState {
    /// Check if this is a terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error | Self::Canceled)
    }
}

crate::simple_display! {
    JobState {
        Unsaved => "unsaved",
        Initial => "initial",
        Running => "running",
        TransfersFinished => "transfers_finished",
        Completed => "completed",
        Error => "error",
        Canceled => "canceled",
    }
}

impl std::str::FromStr for JobState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unsaved" => Ok(Self::Unsaved),
            "initial" => Ok(Self::Initial),
            "running" => Ok(Self::Running),
            "transfers_finished" => Ok(Self::TransfersFinished),
            "completed" => Ok(Self::Completed),
            "error" => Ok(Self::Error),
            "canceled" => Ok(Self::Canceled),
            _ => Err(format!("Invalid job state: {s}")),
        }
    }
}

/// Error detail recorded when a job enters [`JobState::Error`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobErrorDetails {
    /// Name of the error kind that failed the job.
    pub exception: String,
    pub error_detail: String,
    pub exception_at_ms: u64,
}

/// Attempted transition not allowed from the job's current state.
///
/// This indicates a logic bug in the caller, not a recoverable condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot transition job from {from} to {to}")]
pub struct TransitionError {
    pub from: JobState,
    pub to: JobState,
}

/// Entity for recursive jobs that potentially comprise multiple transfers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiTransferJob {
    id: JobId,
    state: JobState,
    /// Opaque job parameters (serialized original request, destination blob key).
    parameters: HashMap<String, String>,
    started_at_ms: Option<u64>,
    completed_at_ms: Option<u64>,
    last_modified_at_ms: u64,
    /// Transfers started but not yet completed.
    transfer_process_ids: BTreeSet<TransferId>,
    /// Transfers that have completed, in completion order.
    completed_transfers: Vec<TransferProcess>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<JobErrorDetails>,
}

impl MultiTransferJob {
    /// Create a new unsaved job. The store transitions it to `Initial` on create.
    pub fn new(id: JobId, parameters: HashMap<String, String>) -> Self {
        Self {
            id,
            state: JobState::Unsaved,
            parameters,
            started_at_ms: None,
            completed_at_ms: None,
            last_modified_at_ms: 0,
            transfer_process_ids: BTreeSet::new(),
            completed_transfers: Vec::new(),
            error: None,
        }
    }

    pub fn id(&self) -> &JobId {
        &self.id
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn parameters(&self) -> &HashMap<String, String> {
        &self.parameters
    }

    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }

    pub fn started_at_ms(&self) -> Option<u64> {
        self.started_at_ms
    }

    pub fn completed_at_ms(&self) -> Option<u64> {
        self.completed_at_ms
    }

    pub fn last_modified_at_ms(&self) -> u64 {
        self.last_modified_at_ms
    }

    /// Ids of transfers started but not yet completed.
    pub fn transfer_process_ids(&self) -> &BTreeSet<TransferId> {
        &self.transfer_process_ids
    }

    pub fn has_pending_transfer(&self, id: &TransferId) -> bool {
        self.transfer_process_ids.contains(id)
    }

    /// Completed transfers, in completion order.
    pub fn completed_transfers(&self) -> &[TransferProcess] {
        &self.completed_transfers
    }

    pub fn error(&self) -> Option<&JobErrorDetails> {
        self.error.as_ref()
    }

    pub fn is_completed(&self) -> bool {
        self.state == JobState::Completed
    }

    /// Transition to `Initial`, recording the start timestamp.
    pub fn transition_initial(self, epoch_ms: u64) -> Result<Self, TransitionError> {
        let mut job = self.transition(JobState::Initial, &[JobState::Unsaved], epoch_ms)?;
        job.started_at_ms = Some(epoch_ms);
        Ok(job)
    }

    /// Register a pending transfer, transitioning to `Running`.
    ///
    /// Adding while already `Running` is legal: fan-out happens incrementally.
    pub fn add_transfer_process(
        self,
        process_id: TransferId,
        epoch_ms: u64,
    ) -> Result<Self, TransitionError> {
        let mut job =
            self.transition(JobState::Running, &[JobState::Initial, JobState::Running], epoch_ms)?;
        job.transfer_process_ids.insert(process_id);
        Ok(job)
    }

    /// Record a completed transfer. Flips to `TransfersFinished` only when the
    /// pending set becomes empty; otherwise the job stays `Running`.
    pub fn complete_transfer_process(
        self,
        process: TransferProcess,
        epoch_ms: u64,
    ) -> Result<Self, TransitionError> {
        let mut job = self;
        job.transfer_process_ids.remove(&process.id);
        job.completed_transfers.push(process);
        if job.transfer_process_ids.is_empty() {
            job.transition(JobState::TransfersFinished, &[JobState::Running], epoch_ms)
        } else {
            job.last_modified_at_ms = epoch_ms;
            Ok(job)
        }
    }

    /// Transition to `Completed`, recording the completion timestamp.
    ///
    /// `Initial` is a legal predecessor: a job whose initial request stream
    /// was empty completes without ever running a transfer.
    pub fn transition_complete(self, epoch_ms: u64) -> Result<Self, TransitionError> {
        let mut job = self.transition(
            JobState::Completed,
            &[JobState::TransfersFinished, JobState::Initial],
            epoch_ms,
        )?;
        job.completed_at_ms = Some(epoch_ms);
        Ok(job)
    }

    /// Transition to `Error` from any non-terminal state, recording detail.
    pub fn transition_error(
        self,
        error_detail: &str,
        exception: &str,
        epoch_ms: u64,
    ) -> Result<Self, TransitionError> {
        let mut job = self.transition(
            JobState::Error,
            &[
                JobState::Unsaved,
                JobState::Initial,
                JobState::Running,
                JobState::TransfersFinished,
            ],
            epoch_ms,
        )?;
        job.completed_at_ms = Some(epoch_ms);
        job.error = Some(JobErrorDetails {
            exception: exception.to_string(),
            error_detail: error_detail.to_string(),
            exception_at_ms: epoch_ms,
        });
        Ok(job)
    }

    /// Transition to `Canceled`. In-flight transfers are not aborted; their
    /// completion callbacks find the job no longer `Running` and are ignored.
    pub fn transition_cancel(self, epoch_ms: u64) -> Result<Self, TransitionError> {
        self.transition(
            JobState::Canceled,
            &[JobState::Unsaved, JobState::Initial, JobState::Running],
            epoch_ms,
        )
    }

    fn transition(
        mut self,
        to: JobState,
        allowed_from: &[JobState],
        epoch_ms: u64,
    ) -> Result<Self, TransitionError> {
        if !allowed_from.contains(&self.state) {
            return Err(TransitionError { from: self.state, to });
        }
        self.state = to;
        self.last_modified_at_ms = epoch_ms;
        Ok(self)
    }
}

crate::builder! {
    pub struct MultiTransferJobBuilder => MultiTransferJob {
        into {
            id: JobId = "job-test-1",
        }
        set {
            state: JobState = JobState::Unsaved,
            parameters: HashMap<String, String> = HashMap::new(),
            started_at_ms: Option<u64> = None,
            completed_at_ms: Option<u64> = None,
            last_modified_at_ms: u64 = 0,
            transfer_process_ids: BTreeSet<TransferId> = BTreeSet::new(),
            completed_transfers: Vec<TransferProcess> = Vec::new(),
        }
        option {
            error: JobErrorDetails = None,
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
