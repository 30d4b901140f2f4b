//! Shared crawl state
//!
//! One `Context` lives for one crawl behind a single mutex. Workers lock it
//! for the whole of parsing and extracting a page; fetching happens outside
//! the lock.

use super::frontier::Frontier;
use crate::catalog::ReferenceIndex;
use crate::extract::{CategoryMap, ProductLine};
use crate::output::Emitter;
use crate::reconcile::{reconcile, MatchRules, Outcome};
use crate::state::SpiderStatus;
use crate::vendors::VendorProfile;
use std::fmt::Display;
use std::sync::{Mutex, MutexGuard};
use url::Url;

/// Page counters kept while crawling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageCounters {
    pub fetched: u64,
    pub failed: u64,
    pub ignored: u64,
}

/// Everything extraction may read or change
pub struct Context {
    pub frontier: Frontier,
    pub categories: CategoryMap,
    pub emitter: Emitter,
    pub reference: ReferenceIndex,
    pub rules: MatchRules,
    pub profile: &'static VendorProfile,
    /// Only the seed page is processed; nothing is enqueued
    pub single_only: bool,
    pub counters: PageCounters,
    late_pass_done: bool,
}

impl Context {
    pub fn new(
        frontier: Frontier,
        emitter: Emitter,
        reference: ReferenceIndex,
        profile: &'static VendorProfile,
        single_only: bool,
    ) -> Self {
        Self {
            frontier,
            categories: CategoryMap::new(),
            emitter,
            reference,
            rules: profile.match_rules(),
            profile,
            single_only,
            counters: PageCounters::default(),
            late_pass_done: false,
        }
    }

    /// Queues a link found on `base`
    ///
    /// Does nothing in single-page mode.
    pub fn enqueue(&mut self, base: &Url, href: &str, breadcrumb: &str) -> bool {
        if self.single_only {
            tracing::debug!(href = %href, "Single page run, not following");
            return false;
        }
        self.frontier.enqueue(Some(base), href, breadcrumb)
    }

    /// Sets the section for the products that follow
    pub fn output_category(&mut self, breadcrumb: &str, trim_last: bool) {
        self.emitter.output_category(breadcrumb, trim_last);
    }

    /// Writes an error line to the report
    pub fn error(&mut self, message: impl Display) {
        self.emitter.error(message);
    }

    /// Reconciles one product and writes it
    ///
    /// A product matching a reference part that was already written in this
    /// crawl is only counted. The discontinued flag overrides the reconciled
    /// status.
    pub fn output_product(&mut self, line: ProductLine) {
        let part = self.emitter.next_record(
            &line.name,
            &line.sku,
            &line.url,
            &line.model_url,
            &line.extras,
        );

        match reconcile(&mut self.reference, &self.rules, part) {
            Outcome::Duplicate { sku, .. } => {
                self.emitter.note_duplicate(&sku, &line.url);
            }
            Outcome::Matched { mut part, .. } | Outcome::New(mut part) => {
                if line.discontinued {
                    part.spider_status = SpiderStatus::Discontinued;
                }
                self.emitter.write_part(&part);
            }
        }
    }

    /// Queues every reference URL the crawl has not reached yet
    ///
    /// Runs at most once per crawl and never in single-page mode.
    ///
    /// # Returns
    ///
    /// The number of URLs queued
    pub fn late_pass(&mut self) -> usize {
        if self.late_pass_done || self.single_only {
            return 0;
        }
        self.late_pass_done = true;

        let mut queued = 0;
        for (url, section) in self.reference.unseen_urls() {
            if self.frontier.enqueue(None, &url, &section) {
                queued += 1;
            }
        }
        tracing::info!(queued, "Late pass queued unseen reference URLs");
        queued
    }

    pub fn late_pass_done(&self) -> bool {
        self.late_pass_done
    }

    /// Finishes one dequeued URL
    ///
    /// When this is the last pending fetch and the crawl has not been
    /// halted, the late pass runs first so the crawl does not drain early.
    pub fn finish_page(&mut self, halted: bool) {
        if !halted && self.frontier.pending() == 1 {
            self.late_pass();
        }
        self.frontier.complete();
    }

    /// Writes every reference part the crawl never matched, as stored
    ///
    /// # Returns
    ///
    /// The number of parts written
    pub fn terminal_pass(&mut self) -> usize {
        let unseen: Vec<_> = self.reference.unseen().cloned().collect();
        for part in &unseen {
            self.emitter.write_part(part);
        }
        tracing::info!(count = unseen.len(), "Wrote parts not found by the crawl");
        unseen.len()
    }
}

/// Locks the context, recovering it if a worker panicked while holding it
pub fn lock(ctx: &Mutex<Context>) -> MutexGuard<'_, Context> {
    ctx.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
