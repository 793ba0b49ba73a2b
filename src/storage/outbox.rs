//! Shared batch buffer and the probe / write / persist flush policy.

use std::sync::Mutex;

use crate::data::Data;

use super::Sink;

/// What happened to a batch on flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing to flush.
    Empty,
    /// Written to the primary store.
    Written(usize),
    /// Primary unavailable; spooled locally.
    Persisted(usize),
    /// Both paths failed; records kept for the next flush.
    Retained(usize),
}

/// Records waiting for the sink.
///
/// Fetch tasks push concurrently, including late finishers after a cycle's
/// barrier; the scheduler drains once per cycle.
#[derive(Debug, Default)]
pub struct Outbox {
    pending: Mutex<Vec<Data>>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Data>> {
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn push(&self, data: Data) {
        self.lock().push(data);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Hand every pending record to `sink`.
    ///
    /// The primary store is probed before any write attempt; a failed probe
    /// or write falls back to `persist`. When persisting fails too, the batch
    /// goes back in front of anything pushed meanwhile, unmodified.
    pub async fn flush(&self, sink: &dyn Sink) -> FlushOutcome {
        let batch = std::mem::take(&mut *self.lock());
        if batch.is_empty() {
            return FlushOutcome::Empty;
        }
        let count = batch.len();

        if sink.probe().await {
            match sink.write(&batch).await {
                Ok(()) => {
                    tracing::info!(records = count, "Batch written");
                    return FlushOutcome::Written(count);
                }
                Err(e) => tracing::warn!(records = count, error = %e, "Batch write failed"),
            }
        } else {
            tracing::warn!(records = count, "Primary sink unreachable");
        }

        match sink.persist(&batch).await {
            Ok(()) => {
                tracing::info!(records = count, "Batch persisted locally");
                FlushOutcome::Persisted(count)
            }
            Err(e) => {
                tracing::error!(records = count, error = %e, "Local fallback failed, retaining batch");
                let mut pending = self.lock();
                let arrived = std::mem::replace(&mut *pending, batch);
                pending.extend(arrived);
                FlushOutcome::Retained(count)
            }
        }
    }
}
