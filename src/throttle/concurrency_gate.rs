use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use crate::error::{Error, Result};
use crate::observability::metrics::SYMBOLS_IN_FLIGHT;

/// Bounds how many symbols are processed at once.
///
/// A slot is held by the returned [`GatePermit`] and released when the permit
/// drops, so every exit path of a symbol task (including unwinding) frees it.
#[derive(Clone)]
pub struct ConcurrencyGate {
    semaphore: Arc<Semaphore>,
    capacity: usize,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

pub struct GatePermit {
    _permit: OwnedSemaphorePermit,
    in_flight: Arc<AtomicUsize>,
}

impl ConcurrencyGate {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        ConcurrencyGate {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub async fn enter(&self) -> Result<GatePermit> {
        let permit = self.semaphore.clone()
            .acquire_owned()
            .await
            .map_err(|_| Error::GateClosed)?;

        let now_in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now_in_flight, Ordering::SeqCst);
        SYMBOLS_IN_FLIGHT.inc();

        Ok(GatePermit {
            _permit: permit,
            in_flight: self.in_flight.clone(),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneous holders seen so far
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}

impl Drop for GatePermit {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        SYMBOLS_IN_FLIGHT.dec();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn permits_are_released_on_drop() {
        let gate = ConcurrencyGate::new(2);

        let first = gate.enter().await.unwrap();
        let second = gate.enter().await.unwrap();
        assert_eq!(gate.available(), 0);
        assert_eq!(gate.in_flight(), 2);

        drop(first);
        assert_eq!(gate.available(), 1);
        drop(second);
        assert_eq!(gate.in_flight(), 0);
        assert_eq!(gate.peak(), 2);
    }

    #[tokio::test]
    async fn permit_is_released_when_task_panics() {
        let gate = ConcurrencyGate::new(1);
        let task_gate = gate.clone();

        let result = tokio::spawn(async move {
            let _permit = task_gate.enter().await.unwrap();
            panic!("symbol task blew up");
        }).await;

        assert!(result.is_err());
        assert_eq!(gate.available(), 1);
        assert_eq!(gate.in_flight(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn never_exceeds_capacity() {
        let gate = ConcurrencyGate::new(3);
        let mut handles = Vec::new();

        for _ in 0..12 {
            let gate = gate.clone();
            handles.push(tokio::spawn(async move {
                let _permit = gate.enter().await.unwrap();
                tokio::time::sleep(Duration::from_millis(10)).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(gate.peak(), 3);
        assert_eq!(gate.available(), 3);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        assert_eq!(ConcurrencyGate::new(0).capacity(), 1);
    }
}
