//! Admission gate bounding concurrent fetch tasks.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use super::CollectorError;

/// Fixed-capacity gate; a task runs only while it holds a permit.
///
/// The permit travels into the spawned task and is released when the task
/// finishes, so detached stragglers keep their slot until they are done.
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl AdmissionGate {
    /// Create a gate; capacity is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Wait for a free slot.
    pub async fn admit(&self) -> Result<OwnedSemaphorePermit, CollectorError> {
        self.semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| CollectorError::GateClosed)
    }

    /// Refuse further admissions. Permits already handed out stay valid.
    pub fn close(&self) {
        self.semaphore.close();
    }

    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use tokio::task::JoinSet;

    use super::*;

    #[test]
    fn test_zero_capacity_clamped() {
        let gate = AdmissionGate::new(0);
        assert_eq!(gate.capacity(), 1);
        assert_eq!(gate.available(), 1);
    }

    #[tokio::test]
    async fn test_closed_gate_refuses_admission() {
        let gate = AdmissionGate::new(2);
        let held = gate.admit().await.unwrap();
        gate.close();

        assert!(matches!(gate.admit().await, Err(CollectorError::GateClosed)));
        drop(held);
    }

    #[tokio::test]
    async fn test_never_exceeds_capacity() {
        let capacity = 3;
        let gate = AdmissionGate::new(capacity);
        let running = Arc::new(AtomicUsize::new(0));
        let high_water = Arc::new(AtomicUsize::new(0));

        let mut tasks = JoinSet::new();
        for _ in 0..capacity + 7 {
            let permit = gate.admit().await.unwrap();
            let running = Arc::clone(&running);
            let high_water = Arc::clone(&high_water);
            tasks.spawn(async move {
                let _permit = permit;
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                high_water.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                running.fetch_sub(1, Ordering::SeqCst);
            });
        }
        while tasks.join_next().await.is_some() {}

        let peak = high_water.load(Ordering::SeqCst);
        assert!(peak <= capacity, "peak {peak} exceeded capacity {capacity}");
        assert!(peak >= 1);
        assert_eq!(gate.available(), capacity);
    }
}
