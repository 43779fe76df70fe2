//! Observable record of read failures that were answered with a fallback.
//!
//! Read wrappers keep the UI usable by returning an empty list or `None`
//! when a request fails. The failure itself goes here (and to the log), so
//! callers and tests can still see that the data is missing for a reason.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde::Serialize;
use tracing::warn;

use crate::error::ApiError;

const DEFAULT_CAPACITY: usize = 64;

/// One recovered failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadFailure {
    /// Name of the read operation, e.g. `sales_orders.recent`.
    pub operation: String,
    pub collection: String,
    /// Stable code from [`crate::error::error_code`].
    pub code: &'static str,
    pub status: Option<u16>,
    pub message: String,
    /// RFC 3339 time the failure was recorded.
    pub at: String,
}

/// Bounded, most-recent-first log of recovered read failures.
pub struct FailureLog {
    entries: Mutex<VecDeque<ReadFailure>>,
    capacity: usize,
}

impl Default for FailureLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl FailureLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity: capacity.max(1),
        }
    }

    /// Record a failure; the oldest entry is dropped once full.
    pub fn record(&self, operation: &str, collection: &str, err: &ApiError) {
        warn!(
            operation,
            collection,
            code = err.error_code(),
            status = err.status(),
            error = %err,
            "read failed, returning fallback"
        );
        let failure = ReadFailure {
            operation: operation.to_string(),
            collection: collection.to_string(),
            code: err.error_code(),
            status: err.status(),
            message: err.to_string(),
            at: pabrik_core::now_rfc3339(),
        };
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.push_front(failure);
        entries.truncate(self.capacity);
    }

    /// Unwrap `result`, or record the error and return `fallback()`.
    pub fn recover<T, F>(
        &self,
        operation: &str,
        collection: &str,
        result: Result<T, ApiError>,
        fallback: F,
    ) -> T
    where
        F: FnOnce() -> T,
    {
        match result {
            Ok(value) => value,
            Err(err) => {
                self.record(operation, collection, &err);
                fallback()
            }
        }
    }

    /// Most recent first.
    pub fn recent(&self) -> Vec<ReadFailure> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.iter().cloned().collect()
    }

    pub fn last(&self) -> Option<ReadFailure> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.front().cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}
