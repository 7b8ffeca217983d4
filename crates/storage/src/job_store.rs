// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock-guarded job store.
//!
//! The job collection is the only shared mutable state in the orchestration
//! core. All operations go through a single reader/writer lock with a bounded
//! acquire timeout; hitting the timeout is fatal (it indicates deadlock or
//! starvation, never a condition to retry silently). State transitions are
//! applied via the pure transition methods on [`MultiTransferJob`] inside the
//! write lock, so per-job mutations never race.

use crate::blob::{BlobStore, BlobStoreError};
use parking_lot::RwLock;
use pt_core::{Clock, JobId, JobState, MultiTransferJob, TransferId, TransferProcess, TransitionError};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Key prefix for persisted job records in a blob-backed store.
pub const JOB_RECORD_PREFIX: &str = "job:";

/// The timeout to try to acquire the store lock.
const LOCK_TIMEOUT: Duration = Duration::from_secs(30);

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by job store operations.
#[derive(Debug, Error)]
pub enum JobStoreError {
    /// Fatal: the store lock could not be acquired within the bounded timeout.
    #[error("timeout acquiring job store lock")]
    LockTimeout,
    /// Fatal: a transition was attempted from a state outside its predecessor set.
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("job record codec error: {0}")]
    Codec(#[from] serde_json::Error),
    #[error("job record storage error: {0}")]
    Storage(#[from] BlobStoreError),
    /// The completion action failed; the job was left un-completed.
    #[error("completion action failed: {0}")]
    CompletionAction(#[source] BoxError),
}

/// Backing collection for job records.
///
/// Implementations only store and retrieve; transition legality, locking,
/// and logging live in [`JobStore`].
pub trait JobBacking: Send + Sync {
    fn get(&self, job_id: &JobId) -> Result<Option<MultiTransferJob>, JobStoreError>;

    fn get_all(&self) -> Result<Vec<MultiTransferJob>, JobStoreError>;

    fn put(&mut self, job: MultiTransferJob) -> Result<(), JobStoreError>;

    fn remove(&mut self, job_id: &JobId) -> Result<Option<MultiTransferJob>, JobStoreError>;
}

/// Map-backed job collection.
#[derive(Default)]
pub struct MemoryBacking {
    jobs: HashMap<JobId, MultiTransferJob>,
}

impl JobBacking for MemoryBacking {
    fn get(&self, job_id: &JobId) -> Result<Option<MultiTransferJob>, JobStoreError> {
        Ok(self.jobs.get(job_id).cloned())
    }

    fn get_all(&self) -> Result<Vec<MultiTransferJob>, JobStoreError> {
        Ok(self.jobs.values().cloned().collect())
    }

    fn put(&mut self, job: MultiTransferJob) -> Result<(), JobStoreError> {
        self.jobs.insert(job.id().clone(), job);
        Ok(())
    }

    fn remove(&mut self, job_id: &JobId) -> Result<Option<MultiTransferJob>, JobStoreError> {
        Ok(self.jobs.remove(job_id))
    }
}

/// Blob-backed job collection: each record is the whole serialized job under
/// a fixed key prefix. Writes always replace the full record, never parts.
pub struct BlobBacking<B: BlobStore> {
    store: Arc<B>,
}

impl<B: BlobStore> BlobBacking<B> {
    pub fn new(store: Arc<B>) -> Self {
        Self { store }
    }

    fn key(job_id: &JobId) -> String {
        format!("{JOB_RECORD_PREFIX}{job_id}")
    }
}

impl<B: BlobStore> JobBacking for BlobBacking<B> {
    fn get(&self, job_id: &JobId) -> Result<Option<MultiTransferJob>, JobStoreError> {
        match self.store.get(&Self::key(job_id))? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn get_all(&self) -> Result<Vec<MultiTransferJob>, JobStoreError> {
        self.store
            .find_by_prefix(JOB_RECORD_PREFIX)?
            .iter()
            .map(|bytes| Ok(serde_json::from_slice(bytes)?))
            .collect()
    }

    fn put(&mut self, job: MultiTransferJob) -> Result<(), JobStoreError> {
        let bytes = serde_json::to_vec(&job)?;
        self.store.put(&Self::key(job.id()), bytes)?;
        Ok(())
    }

    fn remove(&mut self, job_id: &JobId) -> Result<Option<MultiTransferJob>, JobStoreError> {
        let existing = self.get(job_id)?;
        if existing.is_some() {
            self.store.delete(&Self::key(job_id))?;
        }
        Ok(existing)
    }
}

/// Job store over a [`JobBacking`], owning transition legality and locking.
pub struct JobStore<K: JobBacking, C: Clock> {
    backing: RwLock<K>,
    clock: C,
    lock_timeout: Duration,
}

/// Map-backed store for single-process hosts and tests.
pub type InMemoryJobStore<C> = JobStore<MemoryBacking, C>;

/// Blob-backed store for hosts that need jobs to survive restarts.
pub type PersistentJobStore<B, C> = JobStore<BlobBacking<B>, C>;

impl<C: Clock> InMemoryJobStore<C> {
    pub fn in_memory(clock: C) -> Self {
        Self::new(MemoryBacking::default(), clock)
    }
}

impl<B: BlobStore, C: Clock> PersistentJobStore<B, C> {
    pub fn persistent(store: Arc<B>, clock: C) -> Self {
        Self::new(BlobBacking::new(store), clock)
    }
}

impl<K: JobBacking, C: Clock> JobStore<K, C> {
    pub fn new(backing: K, clock: C) -> Self {
        Self { backing: RwLock::new(backing), clock, lock_timeout: LOCK_TIMEOUT }
    }

    /// Override the lock acquire timeout (tests exercising the timeout path).
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Register a new job, transitioning it `Unsaved` → `Initial`.
    pub fn create(&self, job: MultiTransferJob) -> Result<(), JobStoreError> {
        let mut backing = self.write_lock()?;
        let job = job.transition_initial(self.clock.epoch_ms())?;
        tracing::info!(job_id = %job.id(), "adding new job to job store");
        backing.put(job)
    }

    pub fn find(&self, job_id: &JobId) -> Result<Option<MultiTransferJob>, JobStoreError> {
        self.read_lock()?.get(job_id)
    }

    /// Find the job holding the given pending transfer process.
    pub fn find_by_process_id(
        &self,
        process_id: &TransferId,
    ) -> Result<Option<MultiTransferJob>, JobStoreError> {
        Ok(self
            .read_lock()?
            .get_all()?
            .into_iter()
            .find(|job| job.has_pending_transfer(process_id)))
    }

    pub fn find_all(&self) -> Result<Vec<MultiTransferJob>, JobStoreError> {
        self.read_lock()?.get_all()
    }

    pub fn find_by_states(&self, states: &[JobState]) -> Result<Vec<MultiTransferJob>, JobStoreError> {
        Ok(self
            .read_lock()?
            .get_all()?
            .into_iter()
            .filter(|job| states.contains(&job.state()))
            .collect())
    }

    /// Jobs in `state` whose completion timestamp is older than `cutoff_ms`.
    pub fn find_by_state_and_completion_older_than(
        &self,
        state: JobState,
        cutoff_ms: u64,
    ) -> Result<Vec<MultiTransferJob>, JobStoreError> {
        Ok(self
            .read_lock()?
            .get_all()?
            .into_iter()
            .filter(|job| job.state() == state)
            .filter(|job| job.completed_at_ms().is_some_and(|at| at < cutoff_ms))
            .collect())
    }

    /// Record a started transfer as pending, moving the job to `Running`.
    pub fn add_transfer_process(
        &self,
        job_id: &JobId,
        process_id: TransferId,
    ) -> Result<(), JobStoreError> {
        tracing::info!(%job_id, %process_id, "adding transfer process to job");
        self.modify_job(job_id, |job, now| job.add_transfer_process(process_id, now))
    }

    /// Move a transfer from pending to completed; flips the job to
    /// `TransfersFinished` when it was the last pending one.
    pub fn complete_transfer_process(
        &self,
        job_id: &JobId,
        process: TransferProcess,
    ) -> Result<(), JobStoreError> {
        tracing::info!(%job_id, process_id = %process.id, "completing transfer process");
        self.modify_job(job_id, |job, now| {
            let job = job.complete_transfer_process(process, now)?;
            if job.state() == JobState::TransfersFinished {
                tracing::info!(%job_id, "no remaining transfers, job transfers finished");
            } else {
                tracing::debug!(
                    %job_id,
                    remaining = job.transfer_process_ids().len(),
                    "transfers still pending"
                );
            }
            Ok(job)
        })
    }

    /// Run the terminal completion action and transition to `Completed`.
    ///
    /// The action runs at most once per job: it is only invoked when the job
    /// is in `TransfersFinished` or `Initial`, and the transition happens
    /// atomically under the write lock. Calling this on an already-completed
    /// job logs and does nothing. If the action fails the job is left
    /// un-completed and the error is surfaced.
    pub fn complete_job<F>(&self, job_id: &JobId, completion_action: F) -> Result<(), JobStoreError>
    where
        F: FnOnce(&MultiTransferJob) -> Result<(), BoxError>,
    {
        let mut backing = self.write_lock()?;
        let Some(job) = backing.get(job_id)? else {
            tracing::warn!(%job_id, "job not found");
            return Ok(());
        };

        match job.state() {
            JobState::TransfersFinished | JobState::Initial => {
                completion_action(&job).map_err(JobStoreError::CompletionAction)?;
                let job = job.transition_complete(self.clock.epoch_ms())?;
                tracing::info!(%job_id, "job completed");
                backing.put(job)
            }
            state => {
                tracing::info!(%job_id, %state, "job not in a completable state, skipping");
                Ok(())
            }
        }
    }

    /// Transition the job to `Error`, recording the failure detail.
    pub fn mark_job_in_error(
        &self,
        job_id: &JobId,
        error_detail: &str,
        exception: &str,
    ) -> Result<(), JobStoreError> {
        self.modify_job(job_id, |job, now| job.transition_error(error_detail, exception, now))
    }

    /// Cancel a job that has not yet finished its transfers.
    ///
    /// In-flight transfers keep running; their completion callbacks find the
    /// job no longer `Running` and are ignored by the orchestrator.
    pub fn cancel_job(&self, job_id: &JobId) -> Result<Option<MultiTransferJob>, JobStoreError> {
        let mut backing = self.write_lock()?;
        let Some(job) = backing.get(job_id)? else {
            tracing::warn!(%job_id, "job not found");
            return Ok(None);
        };
        let job = job.transition_cancel(self.clock.epoch_ms())?;
        tracing::info!(%job_id, "job canceled");
        backing.put(job.clone())?;
        Ok(Some(job))
    }

    pub fn delete_job(&self, job_id: &JobId) -> Result<Option<MultiTransferJob>, JobStoreError> {
        self.write_lock()?.remove(job_id)
    }

    fn modify_job<F>(&self, job_id: &JobId, action: F) -> Result<(), JobStoreError>
    where
        F: FnOnce(MultiTransferJob, u64) -> Result<MultiTransferJob, TransitionError>,
    {
        let mut backing = self.write_lock()?;
        let Some(job) = backing.get(job_id)? else {
            tracing::warn!(%job_id, "job not found");
            return Ok(());
        };
        let job = action(job, self.clock.epoch_ms())?;
        backing.put(job)
    }

    fn read_lock(&self) -> Result<parking_lot::RwLockReadGuard<'_, K>, JobStoreError> {
        self.backing.try_read_for(self.lock_timeout).ok_or(JobStoreError::LockTimeout)
    }

    fn write_lock(&self) -> Result<parking_lot::RwLockWriteGuard<'_, K>, JobStoreError> {
        self.backing.try_write_for(self.lock_timeout).ok_or(JobStoreError::LockTimeout)
    }
}

#[cfg(test)]
#[path = "job_store_tests.rs"]
mod tests;
