//! URL frontier
//!
//! Remembers every canonical URL the crawl has ever seen together with the
//! breadcrumb it was first discovered under, and hands newly discovered URLs
//! to the scheduler queue. The pending counter tracks fetches that have been
//! queued but not yet fully processed.

use crate::url::{canonicalize, extract_host, is_same_host, is_skipped};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use url::Url;

/// A URL waiting to be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedUrl {
    pub url: Url,
    /// Breadcrumb the URL was discovered under
    pub breadcrumb: String,
}

/// Set of known URLs plus the queue feeding the scheduler
#[derive(Debug)]
pub struct Frontier {
    /// Canonical URL to the first breadcrumb it was seen under
    known: HashMap<String, String>,
    host: String,
    strip_query: bool,
    skip: Vec<String>,
    pending: Arc<AtomicUsize>,
    tx: mpsc::UnboundedSender<QueuedUrl>,
}

impl Frontier {
    /// Creates a frontier bound to the host of `seed`
    ///
    /// # Returns
    ///
    /// The frontier and the receiving end of its queue
    pub fn new(
        seed: &Url,
        strip_query: bool,
        skip: Vec<String>,
    ) -> (Self, mpsc::UnboundedReceiver<QueuedUrl>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let frontier = Self {
            known: HashMap::new(),
            host: extract_host(seed).unwrap_or_default(),
            strip_query,
            skip,
            pending: Arc::new(AtomicUsize::new(0)),
            tx,
        };
        (frontier, rx)
    }

    /// Queues a link for fetching if it is new, on the crawl host and not skipped
    ///
    /// # Arguments
    ///
    /// * `base` - Page the link was found on, used to resolve relative links
    /// * `href` - The link as written
    /// * `breadcrumb` - Category path to remember for the link
    ///
    /// # Returns
    ///
    /// `true` if the URL was queued
    pub fn enqueue(&mut self, base: Option<&Url>, href: &str, breadcrumb: &str) -> bool {
        let url = match canonicalize(base, href, self.strip_query) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!(href = %href, error = %e, "Dropping link");
                return false;
            }
        };

        if !is_same_host(&url, &self.host) {
            tracing::trace!(url = %url, "Off-host link");
            return false;
        }
        if is_skipped(url.as_str(), &self.skip) {
            tracing::trace!(url = %url, "Skipped link");
            return false;
        }
        if self.known.contains_key(url.as_str()) {
            return false;
        }

        self.known
            .insert(url.to_string(), breadcrumb.to_string());
        self.pending.fetch_add(1, Ordering::SeqCst);

        let queued = QueuedUrl {
            url,
            breadcrumb: breadcrumb.to_string(),
        };
        if let Err(e) = self.tx.send(queued) {
            tracing::error!(url = %e.0.url, "Scheduler queue closed");
            self.complete();
            return false;
        }
        tracing::debug!(breadcrumb = %breadcrumb, "Enqueued");
        true
    }

    /// Records a URL reached by redirect without scheduling it
    pub fn mark_visited(&mut self, url: &Url, breadcrumb: &str) {
        self.known
            .entry(url.to_string())
            .or_insert_with(|| breadcrumb.to_string());
    }

    pub fn is_known(&self, url: &str) -> bool {
        self.known.contains_key(url)
    }

    /// Breadcrumb the URL was first discovered under
    pub fn breadcrumb_for(&self, url: &str) -> Option<&str> {
        self.known.get(url).map(String::as_str)
    }

    /// Fetches queued but not yet fully processed
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Shared handle to the pending counter
    pub fn pending_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.pending)
    }

    /// Marks one queued fetch as fully processed
    pub fn complete(&self) {
        let _ = self
            .pending
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    }

    pub fn known_count(&self) -> usize {
        self.known.len()
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}
