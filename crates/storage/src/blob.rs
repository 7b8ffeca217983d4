// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Content-addressable byte storage keyed by string id.
//!
//! Partial trees, assembled artifacts, and persisted job records all go
//! through this interface; hosts plug in their own durable implementation.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use thiserror::Error;

/// Failure reported by a blob store backend.
#[derive(Debug, Error)]
#[error("blob store failure: {0}")]
pub struct BlobStoreError(pub String);

impl BlobStoreError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self(detail.into())
    }
}

/// Key-value byte store.
pub trait BlobStore: Send + Sync {
    fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), BlobStoreError>;

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BlobStoreError>;

    fn delete(&self, key: &str) -> Result<(), BlobStoreError>;

    /// All values whose key starts with `prefix`, in key order.
    fn find_by_prefix(&self, prefix: &str) -> Result<Vec<Vec<u8>>, BlobStoreError>;
}

/// In-memory blob store for tests and single-process hosts.
#[derive(Default)]
pub struct InMemoryBlobStore {
    // BTreeMap keeps find_by_prefix deterministic
    blobs: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.lock().is_empty()
    }
}

impl BlobStore for InMemoryBlobStore {
    fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), BlobStoreError> {
        self.blobs.lock().insert(key.to_string(), bytes);
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BlobStoreError> {
        Ok(self.blobs.lock().get(key).cloned())
    }

    fn delete(&self, key: &str) -> Result<(), BlobStoreError> {
        self.blobs.lock().remove(key);
        Ok(())
    }

    fn find_by_prefix(&self, prefix: &str) -> Result<Vec<Vec<u8>>, BlobStoreError> {
        Ok(self
            .blobs
            .lock()
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(_, v)| v.clone())
            .collect())
    }
}

#[cfg(test)]
#[path = "blob_tests.rs"]
mod tests;
