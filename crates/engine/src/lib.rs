// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pt-engine: recursive job orchestration over multi-hop item-tree retrieval
//!
//! The orchestrator drives a [`RecursiveJobHandler`] through a fan-out of
//! transfers: the handler's `initiate` produces the first requests, each
//! completed transfer feeds `recurse` to produce follow-up requests for
//! nodes hosted elsewhere, and once no transfers remain pending the
//! handler's `complete` assembles the final artifact. Transfer completions
//! arrive on a `tokio::mpsc` channel fed by the host's
//! [`TransferProcessManager`].

pub mod assembler;
pub mod dijkstra;
pub mod error;
pub mod factory;
pub mod handler;
pub mod orchestrator;
pub mod registry;
pub mod transfer;
pub mod tree_logic;

pub use assembler::assemble;
pub use dijkstra::shortest_path_length;
pub use error::{GraphError, HandlerError};
pub use factory::{RequestContext, RequestFactory};
pub use handler::RecursiveJobHandler;
pub use orchestrator::{JobInitiateResponse, JobOrchestrator, OrchestratorConfig};
pub use registry::{RegistryClient, StaticRegistryClient};
pub use transfer::{
    completion_channel, ResponseStatus, TransferInitiateResponse, TransferProcessManager,
};
pub use tree_logic::{ItemTreeHandler, JOB_PARAM_DESTINATION, JOB_PARAM_REQUEST};
