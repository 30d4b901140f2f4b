//! Fetch scheduling and rate limiting
//!
//! This module handles:
//! - Global concurrency limiting via a semaphore (one permit per worker)
//! - Request spacing for the crawled host

use super::frontier::QueuedUrl;
use crate::config::CrawlerConfig;
use crate::state::HostState;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use url::Url;

/// A URL cleared for fetching
///
/// The worker waits out `wait` before sending the request and holds the
/// permit until the page has been dispatched.
pub struct ScheduledFetch {
    /// The URL to fetch
    pub url: Url,

    /// Breadcrumb the URL was discovered under
    pub breadcrumb: String,

    /// Politeness delay still owed to the host
    pub wait: Duration,

    /// The semaphore permit for this fetch
    pub _permit: OwnedSemaphorePermit,
}

/// Scheduler hands out worker slots and request times
///
/// The scheduler coordinates:
/// - Global concurrency limits (at most `workers` fetches in flight)
/// - Host rate limits (minimum time between requests)
pub struct Scheduler {
    /// Global semaphore for limiting concurrent fetches
    global_semaphore: Arc<Semaphore>,

    /// Request spacing for the seed host
    host: HostState,
}

impl Scheduler {
    /// Creates a new scheduler
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    ///
    /// # Returns
    ///
    /// A new Scheduler instance
    pub fn new(config: &CrawlerConfig) -> Self {
        let workers = config.workers.max(1) as usize;
        Self {
            global_semaphore: Arc::new(Semaphore::new(workers)),
            host: HostState::new(Duration::from_millis(config.politeness_delay_ms)),
        }
    }

    /// Waits for a free worker slot and reserves a request time for `queued`
    ///
    /// # Returns
    ///
    /// * `Some(ScheduledFetch)` - The URL with its permit and delay
    /// * `None` - The semaphore was closed
    pub async fn schedule(&mut self, queued: QueuedUrl) -> Option<ScheduledFetch> {
        let permit = self.global_semaphore.clone().acquire_owned().await.ok()?;
        let wait = self.host.reserve(Instant::now());

        tracing::trace!(url = %queued.url, wait_ms = wait.as_millis() as u64, "Scheduled");
        Some(ScheduledFetch {
            url: queued.url,
            breadcrumb: queued.breadcrumb,
            wait,
            _permit: permit,
        })
    }

    /// Number of worker slots currently in use
    pub fn in_flight(&self, workers: u32) -> usize {
        (workers.max(1) as usize).saturating_sub(self.global_semaphore.available_permits())
    }

    /// Requests scheduled so far
    pub fn request_count(&self) -> u32 {
        self.host.request_count
    }

    /// Closes the semaphore so pending `schedule` calls return `None`
    pub fn close(&self) {
        self.global_semaphore.close();
    }
}
