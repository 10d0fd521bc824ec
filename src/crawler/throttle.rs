//! Per-host admission control for downloads
//!
//! Every host gets its own FIFO semaphore with `per_host` permits, created on
//! first sight and kept for the lifetime of the crawl. A released permit goes
//! straight to the oldest waiter for that host, so a slot never sits idle while
//! someone is queued for it. Different hosts never wait on each other.
//!
//! Closing the throttle wakes every queued caller with [`ThrottleClosed`];
//! the coordinator does this when its crawl is abandoned.

use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Returned by [`HostThrottle::acquire`] once the throttle has been closed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("download slots for {0} are closed")]
pub struct ThrottleClosed(pub String);

/// A granted download slot for one host
///
/// Dropping the permit releases the slot, so it is returned on every path out
/// of a download, including failures and panics.
#[derive(Debug)]
pub struct HostPermit {
    host: String,
    _permit: OwnedSemaphorePermit,
}

impl HostPermit {
    /// The host this slot belongs to
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the slot to the throttle, handing it to the next waiter if any
    pub fn release(self) {
        tracing::trace!("Releasing download slot for {}", self.host);
    }
}

/// Limits concurrent downloads per host
#[derive(Debug)]
pub struct HostThrottle {
    /// Lazily created per-host slot pools
    hosts: DashMap<String, Arc<Semaphore>>,

    /// Slots per host
    per_host: usize,

    /// Set once by `close`; hosts first seen afterwards are refused too
    closed: AtomicBool,
}

impl HostThrottle {
    /// Creates a throttle allowing `per_host` concurrent downloads per host
    ///
    /// A limit of zero is raised to one so a host can always make progress.
    pub fn new(per_host: usize) -> Self {
        Self {
            hosts: DashMap::new(),
            per_host: per_host.max(1),
            closed: AtomicBool::new(false),
        }
    }

    /// Waits for a free download slot for `host`
    ///
    /// Grants immediately when fewer than `per_host` downloads are active for
    /// the host, otherwise queues behind earlier callers.
    ///
    /// # Returns
    ///
    /// * `Ok(HostPermit)` - The slot, held until the permit is released
    /// * `Err(ThrottleClosed)` - The throttle was closed before a slot was granted
    pub async fn acquire(&self, host: &str) -> Result<HostPermit, ThrottleClosed> {
        let slots = self.slots(host);

        // Checked after the host is registered, so close either sees its
        // semaphore or this check sees the flag
        if self.is_closed() {
            return Err(ThrottleClosed(host.to_string()));
        }

        if slots.available_permits() == 0 {
            tracing::trace!("All {} slots busy for {}, waiting", self.per_host, host);
        }

        let permit = slots
            .acquire_owned()
            .await
            .map_err(|_| ThrottleClosed(host.to_string()))?;
        Ok(HostPermit {
            host: host.to_string(),
            _permit: permit,
        })
    }

    /// Number of downloads currently holding a slot for `host`
    pub fn active(&self, host: &str) -> usize {
        self.hosts
            .get(host)
            .map(|slots| self.per_host - slots.available_permits())
            .unwrap_or(0)
    }

    /// Refuses further acquisitions and wakes every queued caller; idempotent
    ///
    /// Permits already granted stay valid until released.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        tracing::debug!("Closing host throttle ({} hosts)", self.hosts.len());
        for slots in self.hosts.iter() {
            slots.value().close();
        }
    }

    /// Returns whether [`close`](Self::close) has been called
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Configured slots per host
    pub fn per_host(&self) -> usize {
        self.per_host
    }

    /// Number of distinct hosts seen so far
    pub fn host_count(&self) -> usize {
        self.hosts.len()
    }

    fn slots(&self, host: &str) -> Arc<Semaphore> {
        // The map guard must be dropped before awaiting on the semaphore
        self.hosts
            .entry(host.to_string())
            .or_insert_with(|| Arc::new(Semaphore::new(self.per_host)))
            .clone()
    }
}
