//! Fixed-size worker pools
//!
//! A pool owns `size` permits. Every submitted job is spawned immediately but
//! waits for a permit before it runs, and permits are granted in submission
//! order, so the pool behaves like `size` workers draining a FIFO queue.
//! Closing the pool abandons queued jobs and aborts running ones.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Returned when submitting to a pool that has been closed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0} pool is closed")]
pub struct PoolClosed(pub &'static str);

/// A named pool running at most `size` jobs at a time
pub struct WorkerPool {
    name: &'static str,
    size: usize,
    permits: Arc<Semaphore>,
    jobs: Mutex<JoinSet<()>>,
}

impl WorkerPool {
    /// Creates a pool with `size` workers (at least one)
    pub fn new(name: &'static str, size: usize) -> Self {
        let size = size.max(1);
        Self {
            name,
            size,
            permits: Arc::new(Semaphore::new(size)),
            jobs: Mutex::new(JoinSet::new()),
        }
    }

    /// Queues a job on the pool
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The job was queued
    /// * `Err(PoolClosed)` - The pool no longer accepts work
    pub fn submit<F>(&self, job: F) -> Result<(), PoolClosed>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        // Checked under the lock so a job is either refused or seen by close
        let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        if self.permits.is_closed() {
            return Err(PoolClosed(self.name));
        }

        let permits = Arc::clone(&self.permits);

        // Reap finished jobs so a long-lived pool does not accumulate handles
        while jobs.try_join_next().is_some() {}

        jobs.spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                // Pool closed while the job was queued
                return;
            };
            job.await;
        });

        Ok(())
    }

    /// Stops the pool; idempotent
    ///
    /// Queued jobs never start and running jobs are aborted.
    pub fn close(&self) {
        let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        if self.permits.is_closed() {
            return;
        }

        tracing::debug!("Closing {} pool", self.name);
        self.permits.close();
        jobs.abort_all();
    }

    /// Returns whether the pool has been closed
    pub fn is_closed(&self) -> bool {
        self.permits.is_closed()
    }

    /// Number of jobs currently running
    #[cfg(test)]
    fn busy(&self) -> usize {
        if self.is_closed() {
            return 0;
        }
        self.size - self.permits.available_permits()
    }

    /// Configured number of workers
    pub fn size(&self) -> usize {
        self.size
    }

    /// Pool name used in logs and errors
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("closed", &self.is_closed())
            .finish()
    }
}
