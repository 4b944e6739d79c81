//! Admission control for page scrapes.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;

pub const DEFAULT_SCRAPE_CONCURRENCY: usize = 5;

/// Caps how many page fetches are in flight at once.
///
/// The limiter only gates admission; it never guards data. Each spawned task
/// returns its own result through its [`JoinHandle`].
#[derive(Clone, Debug)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl ConcurrencyLimiter {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Permits not currently held by a running task.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit, AcquireError> {
        self.semaphore.clone().acquire_owned().await
    }

    /// Run `fut` once a permit is free, holding the permit until it finishes.
    pub async fn run<F>(&self, fut: F) -> Result<F::Output, AcquireError>
    where
        F: Future,
    {
        let _permit = self.acquire().await?;
        Ok(fut.await)
    }

    /// Spawn `fut` on the runtime; it waits for a permit before starting.
    pub fn spawn<F>(&self, fut: F) -> JoinHandle<Result<F::Output, AcquireError>>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let semaphore = self.semaphore.clone();
        tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await?; // Hold permit until the task completes
            Ok(fut.await)
        })
    }
}

impl Default for ConcurrencyLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_SCRAPE_CONCURRENCY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn never_exceeds_capacity() {
        let limiter = ConcurrencyLimiter::new(5);
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let in_flight = in_flight.clone();
                let peak = peak.clone();
                limiter.spawn(async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert!(peak.load(Ordering::SeqCst) <= 5);
        assert!(peak.load(Ordering::SeqCst) >= 1);
        assert_eq!(limiter.available(), 5);
    }

    #[tokio::test]
    async fn results_keep_their_slot() {
        let limiter = ConcurrencyLimiter::new(2);
        let handles: Vec<_> = (0..6u64)
            .map(|i| {
                limiter.spawn(async move {
                    // Later tasks finish first
                    tokio::time::sleep(Duration::from_millis(30 - i * 5)).await;
                    i
                })
            })
            .collect();

        let results: Vec<u64> = futures::future::join_all(handles)
            .await
            .into_iter()
            .map(|r| r.unwrap().unwrap())
            .collect();
        assert_eq!(results, vec![0, 1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn run_releases_permit() {
        let limiter = ConcurrencyLimiter::new(1);
        let value = limiter.run(async { 7 }).await.unwrap();
        assert_eq!(value, 7);
        assert_eq!(limiter.available(), 1);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        assert_eq!(ConcurrencyLimiter::new(0).capacity(), 1);
    }
}
