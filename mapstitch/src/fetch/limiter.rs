//! Concurrency gate for tile fetches.
//!
//! A counting permit pool bounding how many tile fetches run their network
//! phase simultaneously. Acquisition suspends until a permit frees; the
//! underlying tokio semaphore queues waiters fairly, so every waiter
//! eventually acquires as long as work keeps completing. Permits release on
//! drop (RAII), including when a task unwinds through cancellation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::config::FetchConfig;

/// Counting permit pool limiting simultaneous tile fetches.
#[derive(Debug)]
pub struct FetchLimiter {
    semaphore: Arc<Semaphore>,
    capacity: usize,
    in_flight: Arc<AtomicUsize>,
}

impl FetchLimiter {
    /// Create a limiter with the given capacity (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a limiter sized from the fetch configuration.
    pub fn from_config(config: &FetchConfig) -> Self {
        Self::new(config.concurrency())
    }

    /// Acquire a permit, suspending until one is available.
    pub async fn acquire(&self) -> FetchPermit {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("fetch semaphore closed");

        self.in_flight.fetch_add(1, Ordering::Relaxed);
        FetchPermit {
            _permit: permit,
            in_flight: Arc::clone(&self.in_flight),
        }
    }

    /// Configured permit capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Permits currently free.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Permits currently held.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }
}

/// A held permit. Releases its slot when dropped.
pub struct FetchPermit {
    _permit: OwnedSemaphorePermit,
    in_flight: Arc<AtomicUsize>,
}

impl Drop for FetchPermit {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
    }
}
