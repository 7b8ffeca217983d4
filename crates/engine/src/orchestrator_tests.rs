// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::transfer::{completion_channel, TransferInitiateResponse};
use parking_lot::Mutex;
use pt_core::test_support::transfer_request;
use pt_core::{FakeClock, TransferId};
use pt_storage::InMemoryJobStore;
use std::sync::atomic::{AtomicUsize, Ordering};

const PROVIDER_A: &str = "https://provider-a";
const PROVIDER_B: &str = "https://provider-b";

/// Scripted handler: fixed initiate requests, per-call recurse scripts,
/// optional failures at each seam.
#[derive(Default)]
struct StubHandler {
    initiate_requests: Vec<TransferRequest>,
    recurse_scripts: Mutex<Vec<Vec<TransferRequest>>>,
    fail_initiate: bool,
    fail_recurse: bool,
    fail_complete: bool,
    recurse_calls: AtomicUsize,
    complete_calls: AtomicUsize,
}

impl RecursiveJobHandler for StubHandler {
    fn initiate(&self, _job: &MultiTransferJob) -> Result<Vec<TransferRequest>, HandlerError> {
        if self.fail_initiate {
            return Err(HandlerError::MissingParameter("request"));
        }
        Ok(self.initiate_requests.clone())
    }

    fn recurse(
        &self,
        _job: &MultiTransferJob,
        _process: &TransferProcess,
    ) -> Result<Vec<TransferRequest>, HandlerError> {
        self.recurse_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_recurse {
            return Err(HandlerError::MissingParameter("request"));
        }
        let mut scripts = self.recurse_scripts.lock();
        if scripts.is_empty() {
            Ok(Vec::new())
        } else {
            Ok(scripts.remove(0))
        }
    }

    fn complete(&self, _job: &MultiTransferJob) -> Result<(), HandlerError> {
        self.complete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_complete {
            return Err(HandlerError::MissingParameter("destination-key"));
        }
        Ok(())
    }
}

/// Records started transfers and hands out their completion records.
#[derive(Default)]
struct RecordingManager {
    started: Mutex<Vec<TransferProcess>>,
    reject_with: Option<ResponseStatus>,
}

impl RecordingManager {
    fn rejecting(status: ResponseStatus) -> Self {
        Self { reject_with: Some(status), ..Self::default() }
    }

    fn started_count(&self) -> usize {
        self.started.lock().len()
    }

    fn take_started(&self) -> Vec<TransferProcess> {
        std::mem::take(&mut self.started.lock())
    }
}

#[async_trait::async_trait]
impl TransferProcessManager for RecordingManager {
    async fn initiate_request(&self, request: TransferRequest) -> TransferInitiateResponse {
        if let Some(status) = self.reject_with {
            return TransferInitiateResponse::error(status);
        }
        let process = TransferProcess::new(TransferId::new(), request);
        let id = process.id.clone();
        self.started.lock().push(process);
        TransferInitiateResponse::ok(id)
    }
}

struct Fixture {
    orchestrator: JobOrchestrator<
        Arc<StubHandler>,
        Arc<RecordingManager>,
        pt_storage::MemoryBacking,
        FakeClock,
    >,
    handler: Arc<StubHandler>,
    manager: Arc<RecordingManager>,
    store: Arc<InMemoryJobStore<FakeClock>>,
    clock: FakeClock,
}

fn fixture(handler: StubHandler, manager: RecordingManager) -> Fixture {
    let clock = FakeClock::new();
    let store = Arc::new(JobStore::in_memory(clock.clone()));
    let handler = Arc::new(handler);
    let manager = Arc::new(manager);
    let orchestrator = JobOrchestrator::new(
        store.clone(),
        handler.clone(),
        manager.clone(),
        OrchestratorConfig::default(),
        clock.clone(),
    );
    Fixture { orchestrator, handler, manager, store, clock }
}

fn one_request_handler() -> StubHandler {
    StubHandler {
        initiate_requests: vec![transfer_request(PROVIDER_A, "root", 2)],
        ..StubHandler::default()
    }
}

#[tokio::test]
async fn start_job_fans_out_initiate_requests() {
    let handler = StubHandler {
        initiate_requests: vec![
            transfer_request(PROVIDER_A, "root", 2),
            transfer_request(PROVIDER_B, "other", 2),
        ],
        ..StubHandler::default()
    };
    let f = fixture(handler, RecordingManager::default());

    let response = f.orchestrator.start_job(HashMap::new()).await;

    assert_eq!(response.status, ResponseStatus::Ok);
    assert_eq!(f.manager.started_count(), 2);
    let job = f.store.find(&response.job_id).unwrap().unwrap();
    assert_eq!(job.state(), JobState::Running);
    assert_eq!(job.transfer_process_ids().len(), 2);
}

#[tokio::test]
async fn start_job_with_no_requests_completes_immediately() {
    let f = fixture(StubHandler::default(), RecordingManager::default());

    let response = f.orchestrator.start_job(HashMap::new()).await;

    assert_eq!(response.status, ResponseStatus::Ok);
    assert_eq!(f.handler.complete_calls.load(Ordering::SeqCst), 1);
    let job = f.store.find(&response.job_id).unwrap().unwrap();
    assert_eq!(job.state(), JobState::Completed);
}

#[tokio::test]
async fn start_job_marks_job_failed_when_initiate_fails() {
    let handler = StubHandler { fail_initiate: true, ..StubHandler::default() };
    let f = fixture(handler, RecordingManager::default());

    let response = f.orchestrator.start_job(HashMap::new()).await;

    assert_eq!(response.status, ResponseStatus::FatalError);
    let job = f.store.find(&response.job_id).unwrap().unwrap();
    assert_eq!(job.state(), JobState::Error);
    assert_eq!(job.error().unwrap().exception, "missing_parameter");
}

#[tokio::test]
async fn start_job_surfaces_transfer_rejection_status() {
    let f = fixture(one_request_handler(), RecordingManager::rejecting(ResponseStatus::ErrorRetry));

    let response = f.orchestrator.start_job(HashMap::new()).await;

    assert_eq!(response.status, ResponseStatus::ErrorRetry);
    // No transfer recorded, job never left Initial
    let job = f.store.find(&response.job_id).unwrap().unwrap();
    assert_eq!(job.state(), JobState::Initial);
}

#[tokio::test]
async fn completion_fans_out_follow_up_requests() {
    let handler = StubHandler {
        initiate_requests: vec![transfer_request(PROVIDER_A, "root", 2)],
        recurse_scripts: Mutex::new(vec![vec![transfer_request(PROVIDER_B, "child", 1)]]),
        ..StubHandler::default()
    };
    let f = fixture(handler, RecordingManager::default());

    let response = f.orchestrator.start_job(HashMap::new()).await;
    let first = f.take_one_started();
    f.orchestrator.transfer_process_completed(first).await;

    let job = f.store.find(&response.job_id).unwrap().unwrap();
    assert_eq!(job.state(), JobState::Running);
    assert_eq!(job.transfer_process_ids().len(), 1);
    assert_eq!(job.completed_transfers().len(), 1);
    assert_eq!(f.handler.complete_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn last_completion_completes_the_job_exactly_once() {
    let handler = StubHandler {
        initiate_requests: vec![
            transfer_request(PROVIDER_A, "root", 2),
            transfer_request(PROVIDER_B, "other", 2),
        ],
        ..StubHandler::default()
    };
    let f = fixture(handler, RecordingManager::default());

    let response = f.orchestrator.start_job(HashMap::new()).await;
    for process in f.manager.take_started() {
        f.orchestrator.transfer_process_completed(process).await;
    }

    let job = f.store.find(&response.job_id).unwrap().unwrap();
    assert_eq!(job.state(), JobState::Completed);
    assert_eq!(f.handler.complete_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unknown_transfer_completion_is_ignored() {
    let f = fixture(one_request_handler(), RecordingManager::default());
    let response = f.orchestrator.start_job(HashMap::new()).await;

    let stray =
        TransferProcess::new(TransferId::new(), transfer_request(PROVIDER_B, "stray", 1));
    f.orchestrator.transfer_process_completed(stray).await;

    assert_eq!(f.handler.recurse_calls.load(Ordering::SeqCst), 0);
    let job = f.store.find(&response.job_id).unwrap().unwrap();
    assert_eq!(job.state(), JobState::Running);
}

#[tokio::test]
async fn completion_after_cancellation_is_ignored() {
    let f = fixture(one_request_handler(), RecordingManager::default());
    let response = f.orchestrator.start_job(HashMap::new()).await;
    f.store.cancel_job(&response.job_id).unwrap();

    let process = f.take_one_started();
    f.orchestrator.transfer_process_completed(process).await;

    assert_eq!(f.handler.recurse_calls.load(Ordering::SeqCst), 0);
    let job = f.store.find(&response.job_id).unwrap().unwrap();
    assert_eq!(job.state(), JobState::Canceled);
    assert!(job.completed_transfers().is_empty());
}

#[tokio::test]
async fn recurse_failure_marks_job_failed() {
    let handler = StubHandler { fail_recurse: true, ..one_request_handler() };
    let f = fixture(handler, RecordingManager::default());

    let response = f.orchestrator.start_job(HashMap::new()).await;
    let process = f.take_one_started();
    f.orchestrator.transfer_process_completed(process).await;

    let job = f.store.find(&response.job_id).unwrap().unwrap();
    assert_eq!(job.state(), JobState::Error);
    assert_eq!(job.error().unwrap().exception, "missing_parameter");
}

#[tokio::test]
async fn complete_failure_marks_job_failed() {
    let handler = StubHandler { fail_complete: true, ..one_request_handler() };
    let f = fixture(handler, RecordingManager::default());

    let response = f.orchestrator.start_job(HashMap::new()).await;
    let process = f.take_one_started();
    f.orchestrator.transfer_process_completed(process).await;

    let job = f.store.find(&response.job_id).unwrap().unwrap();
    assert_eq!(job.state(), JobState::Error);
    assert_eq!(job.error().unwrap().exception, "missing_parameter");
}

#[tokio::test]
async fn run_completion_loop_drains_until_senders_drop() {
    let f = fixture(one_request_handler(), RecordingManager::default());
    let response = f.orchestrator.start_job(HashMap::new()).await;

    let (tx, rx) = completion_channel(8);
    tx.send(f.take_one_started()).await.unwrap();
    drop(tx);
    f.orchestrator.run_completion_loop(rx).await;

    let job = f.store.find(&response.job_id).unwrap().unwrap();
    assert_eq!(job.state(), JobState::Completed);
}

#[tokio::test]
async fn retention_sweep_deletes_only_expired_completed_jobs() {
    let f = fixture(StubHandler::default(), RecordingManager::default());

    let expired = f.orchestrator.start_job(HashMap::new()).await;
    f.clock.advance(Duration::from_secs(2 * 60 * 60));
    let fresh = f.orchestrator.start_job(HashMap::new()).await;

    let deleted = f.orchestrator.find_and_cleanup_completed_jobs();

    assert_eq!(deleted, vec![expired.job_id.clone()]);
    assert!(f.store.find(&expired.job_id).unwrap().is_none());
    assert!(f.store.find(&fresh.job_id).unwrap().is_some());
}

#[tokio::test]
async fn retention_sweep_keeps_failed_jobs_longer() {
    let handler = StubHandler { fail_initiate: true, ..StubHandler::default() };
    let f = fixture(handler, RecordingManager::default());

    let failed = f.orchestrator.start_job(HashMap::new()).await;

    f.clock.advance(Duration::from_secs(2 * 60 * 60));
    assert!(f.orchestrator.find_and_cleanup_failed_jobs().is_empty());

    f.clock.advance(Duration::from_secs(23 * 60 * 60));
    assert_eq!(f.orchestrator.find_and_cleanup_failed_jobs(), vec![failed.job_id.clone()]);
    assert!(f.store.find(&failed.job_id).unwrap().is_none());
}

impl Fixture {
    fn take_one_started(&self) -> TransferProcess {
        let mut started = self.manager.started.lock();
        assert_eq!(started.len(), 1, "expected exactly one started transfer");
        started.remove(0)
    }
}
