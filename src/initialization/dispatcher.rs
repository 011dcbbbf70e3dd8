//! Rate-limited request dispatcher.
//!
//! Jobs run under two joint constraints: at most `max_concurrent` in flight,
//! and at least `min_time` between successive starts. Up to `high_water`
//! jobs may wait for admission; beyond that a submission fails immediately
//! with [`DispatchError::QueueFull`] instead of queueing without bound.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{Mutex, Semaphore};
use tokio::time::Instant;

/// Why a job was not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// Too many jobs were already waiting
    #[error("lookup queue is full ({0} waiting)")]
    QueueFull(usize),
    /// The dispatcher's semaphore was closed
    #[error("dispatcher is closed")]
    Closed,
}

/// Decrements the waiting counter when a job leaves the queue, including
/// when its future is dropped while waiting.
struct QueueSlot<'a>(&'a AtomicUsize);

impl Drop for QueueSlot<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Concurrency and spacing limiter shared by every lookup.
pub struct RequestDispatcher {
    permits: Semaphore,
    max_concurrent: usize,
    min_time: Duration,
    high_water: usize,
    waiting: AtomicUsize,
    next_start: Mutex<Option<Instant>>,
}

impl RequestDispatcher {
    /// Creates a dispatcher.
    ///
    /// # Arguments
    ///
    /// * `max_concurrent` - Jobs allowed in flight (clamped to at least 1)
    /// * `min_time` - Minimum spacing between job starts
    /// * `high_water` - Maximum number of jobs waiting for admission
    pub fn new(max_concurrent: usize, min_time: Duration, high_water: usize) -> Self {
        let max_concurrent = max_concurrent.max(1);
        RequestDispatcher {
            permits: Semaphore::new(max_concurrent),
            max_concurrent,
            min_time,
            high_water,
            waiting: AtomicUsize::new(0),
            next_start: Mutex::new(None),
        }
    }

    /// Runs `job` once admitted.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::QueueFull` without running the job when
    /// `high_water` jobs are already waiting.
    pub async fn submit<F, Fut, T>(&self, job: F) -> Result<T, DispatchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let slot = self.reserve_slot()?;

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| DispatchError::Closed)?;
        self.wait_for_start_slot().await;
        drop(slot);

        Ok(job().await)
    }

    fn reserve_slot(&self) -> Result<QueueSlot<'_>, DispatchError> {
        let reserved = self
            .waiting
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |waiting| {
                (waiting < self.high_water).then_some(waiting + 1)
            });
        match reserved {
            Ok(_) => Ok(QueueSlot(&self.waiting)),
            Err(waiting) => {
                log::debug!("Dropping lookup: {} already waiting", waiting);
                Err(DispatchError::QueueFull(waiting))
            }
        }
    }

    /// Sleeps until `min_time` has passed since the previous start.
    ///
    /// The lock is held across the sleep so the next slot is measured from
    /// the instant this job actually starts, not from when it was scheduled.
    async fn wait_for_start_slot(&self) {
        if self.min_time.is_zero() {
            return;
        }
        let mut next_start = self.next_start.lock().await;
        if let Some(at) = *next_start {
            if at > Instant::now() {
                tokio::time::sleep_until(at).await;
            }
        }
        *next_start = Some(Instant::now() + self.min_time);
    }

    /// Number of jobs waiting for admission.
    pub fn waiting(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }

    /// Number of jobs currently running.
    pub fn running(&self) -> usize {
        self.max_concurrent - self.permits.available_permits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_submit_runs_job() {
        let dispatcher = RequestDispatcher::new(2, Duration::ZERO, 10);
        let value = dispatcher.submit(|| async { 41 + 1 }).await;
        assert_eq!(value, Ok(42));
        assert_eq!(dispatcher.waiting(), 0);
        assert_eq!(dispatcher.running(), 0);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let dispatcher = Arc::new(RequestDispatcher::new(2, Duration::ZERO, 100));
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let jobs = (0..8).map(|_| {
            let dispatcher = Arc::clone(&dispatcher);
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);
            async move {
                dispatcher
                    .submit(|| async move {
                        let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        in_flight.fetch_sub(1, Ordering::SeqCst);
                    })
                    .await
            }
        });
        let results = futures::future::join_all(jobs).await;

        assert!(results.iter().all(Result::is_ok));
        assert_eq!(peak.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_min_time_spaces_starts() {
        let dispatcher = RequestDispatcher::new(10, Duration::from_millis(100), 100);
        let origin = Instant::now();

        let jobs = (0..3).map(|_| dispatcher.submit(|| async { Instant::now() }));
        let mut starts: Vec<Instant> = futures::future::join_all(jobs)
            .await
            .into_iter()
            .map(|r| r.expect("job should run"))
            .collect();
        starts.sort();

        assert!(starts[0] - origin < Duration::from_millis(100));
        assert!(starts[1] - starts[0] >= Duration::from_millis(100));
        assert!(starts[2] - starts[1] >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_spacing_measured_from_actual_start() {
        use std::sync::atomic::AtomicBool;

        let min_time = Duration::from_millis(50);
        let dispatcher = RequestDispatcher::new(10, min_time, 100);
        let first = AtomicBool::new(true);

        // The first job yields so the others queue up, then blocks the
        // runtime thread past the second job's slot so that job wakes late.
        let jobs = (0..3).map(|_| {
            dispatcher.submit(|| async {
                let started = Instant::now();
                if first.swap(false, Ordering::SeqCst) {
                    tokio::task::yield_now().await;
                    std::thread::sleep(Duration::from_millis(80));
                }
                started
            })
        });
        let mut starts: Vec<Instant> = futures::future::join_all(jobs)
            .await
            .into_iter()
            .map(|r| r.expect("job should run"))
            .collect();
        starts.sort();

        // Allow for timer granularity
        let tolerance = Duration::from_millis(1);
        assert!(starts[1] - starts[0] + tolerance >= Duration::from_millis(80));
        assert!(
            starts[2] - starts[1] + tolerance >= min_time,
            "third job started {:?} after the late second job",
            starts[2] - starts[1]
        );
    }

    #[tokio::test]
    async fn test_overflow_is_dropped() {
        let dispatcher = Arc::new(RequestDispatcher::new(1, Duration::ZERO, 1));
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();

        // Occupies the only permit until released
        let running = {
            let dispatcher = Arc::clone(&dispatcher);
            tokio::spawn(async move {
                dispatcher
                    .submit(|| async move {
                        let _ = release_rx.await;
                    })
                    .await
            })
        };
        while dispatcher.running() == 0 {
            tokio::task::yield_now().await;
        }

        // Fills the single queue slot
        let queued = {
            let dispatcher = Arc::clone(&dispatcher);
            tokio::spawn(async move { dispatcher.submit(|| async { "queued" }).await })
        };
        while dispatcher.waiting() == 0 {
            tokio::task::yield_now().await;
        }

        let dropped = dispatcher.submit(|| async { "dropped" }).await;
        assert_eq!(dropped, Err(DispatchError::QueueFull(1)));

        release_tx.send(()).expect("running job is waiting");
        assert!(running.await.expect("join").is_ok());
        assert_eq!(queued.await.expect("join"), Ok("queued"));
        assert_eq!(dispatcher.waiting(), 0);
    }

    #[tokio::test]
    async fn test_zero_concurrency_is_clamped() {
        let dispatcher = RequestDispatcher::new(0, Duration::ZERO, 1);
        assert_eq!(dispatcher.submit(|| async { 1 }).await, Ok(1));
    }
}
