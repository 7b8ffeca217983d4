// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pt-storage: blob persistence and the lock-guarded job store

pub mod blob;
pub mod job_store;

pub use blob::{BlobStore, BlobStoreError, InMemoryBlobStore};
pub use job_store::{
    BlobBacking, InMemoryJobStore, JobBacking, JobStore, JobStoreError, MemoryBacking,
    PersistentJobStore, JOB_RECORD_PREFIX,
};
