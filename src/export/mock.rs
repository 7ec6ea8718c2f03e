//! export::mock
//!
//! In-memory sink for deterministic testing.
//!
//! # Example
//!
//! ```
//! use tou_stats_exporter::export::mock::MockSink;
//! use tou_stats_exporter::export::{ExportRecord, SendError, StatsSink};
//!
//! let record: ExportRecord = serde_json::from_value(serde_json::json!({
//!     "token": "t",
//!     "gameInfo": { "gameId": "id", "timestamp": "2025-01-01T00:00:00Z", "lobbyCode": "ABCDEF",
//!                   "gameMode": "Normal", "duration": 1.0, "map": "Polus" },
//!     "players": [],
//!     "gameResult": { "winningTeam": "Unknown" }
//! })).unwrap();
//!
//! # tokio_test::block_on(async {
//! let sink = MockSink::new();
//! sink.send(&record).await.unwrap();
//! assert_eq!(sink.sent().len(), 1);
//!
//! let failing = MockSink::new().fail_with(SendError::Network("down".into()));
//! assert!(failing.send(&record).await.is_err());
//! assert_eq!(failing.attempts(), 1);
//! # });
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::client::{SendError, SendReceipt, StatsSink};
use super::schema::ExportRecord;

/// Sink that records every payload it is given.
///
/// Clones share state, so a test can keep a clone while the pipeline owns
/// another.
#[derive(Debug, Clone, Default)]
pub struct MockSink {
    inner: Arc<Mutex<MockSinkInner>>,
}

#[derive(Debug, Default)]
struct MockSinkInner {
    /// Records accepted by `send`.
    sent: Vec<ExportRecord>,
    /// Number of `send` calls, successful or not.
    attempts: usize,
    /// Error returned by every `send` while set.
    fail_with: Option<SendError>,
}

impl MockSink {
    /// Create a sink that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure every send to fail with `error`.
    pub fn fail_with(self, error: SendError) -> Self {
        self.lock().fail_with = Some(error);
        self
    }

    /// Clear the failure configuration.
    pub fn clear_failure(&self) {
        self.lock().fail_with = None;
    }

    /// Records accepted so far.
    pub fn sent(&self) -> Vec<ExportRecord> {
        self.lock().sent.clone()
    }

    /// Number of send attempts.
    pub fn attempts(&self) -> usize {
        self.lock().attempts
    }

    fn lock(&self) -> MutexGuard<'_, MockSinkInner> {
        // A test that panicked while holding the lock already failed.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl StatsSink for MockSink {
    fn name(&self) -> &str {
        "mock"
    }

    async fn send(&self, record: &ExportRecord) -> Result<SendReceipt, SendError> {
        let mut inner = self.lock();
        inner.attempts += 1;
        if let Some(err) = &inner.fail_with {
            return Err(err.clone());
        }
        inner.sent.push(record.clone());
        Ok(SendReceipt {
            status: 200,
            body: String::new(),
        })
    }
}
