// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pt-core: domain model for the parttree recursive job orchestrator

pub mod macros;

pub mod clock;
pub mod graph;
pub mod id;
pub mod job;
pub mod request;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use graph::{ItemTree, NodeId, NodeInfo, Relationship, Tombstone, TombstoneDetail};
pub use id::{JobId, TransferId};
#[cfg(any(test, feature = "test-support"))]
pub use job::MultiTransferJobBuilder;
pub use job::{JobErrorDetails, JobState, MultiTransferJob, TransitionError};
pub use request::{TransferProcess, TransferRequest, TreeQuery};
