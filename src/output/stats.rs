//! End-of-run statistics
//!
//! This module collects the counters the crawler and emitter keep during a
//! run and prints them as a summary block.

use super::emitter::EmitTally;
use crate::state::SpiderStatus;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// How the crawl ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlOutcome {
    /// The frontier drained
    Drained,
    /// Stopped by timer or URL; in-flight pages finished
    Stopped,
    /// Cancelled by timer or URL; in-flight pages aborted
    Cancelled,
}

impl CrawlOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Drained => "drained",
            Self::Stopped => "stopped",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    pub outcome: CrawlOutcome,

    /// Pages fetched and dispatched
    pub pages_fetched: u64,

    /// Pages that failed with a transport error or non-2xx status
    pub pages_failed: u64,

    /// Pages skipped for their content type
    pub pages_ignored: u64,

    /// Report lines by spider status
    pub records_by_status: HashMap<SpiderStatus, u64>,

    /// Error lines written to the report
    pub error_lines: u64,

    /// Products that matched an already reported reference part
    pub duplicates: u64,
}

impl CrawlStatistics {
    /// Creates statistics for a run starting now
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            outcome: CrawlOutcome::Drained,
            pages_fetched: 0,
            pages_failed: 0,
            pages_ignored: 0,
            records_by_status: HashMap::new(),
            error_lines: 0,
            duplicates: 0,
        }
    }

    /// Marks the run finished and copies the emitter's counts
    pub fn finish(&mut self, outcome: CrawlOutcome, tally: &EmitTally) {
        self.finished_at = Some(Utc::now());
        self.outcome = outcome;
        self.records_by_status = tally.by_status.clone();
        self.error_lines = tally.error_lines;
        self.duplicates = tally.duplicates;
    }

    pub fn total_records(&self) -> u64 {
        self.records_by_status.values().sum()
    }

    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Run:");
    println!("  Started:  {}", stats.started_at.to_rfc3339());
    if let Some(finished) = stats.finished_at {
        println!("  Finished: {}", finished.to_rfc3339());
    }
    if let Some(secs) = stats.duration_seconds() {
        println!("  Duration: {}s", secs);
    }
    println!("  Outcome:  {}", stats.outcome.as_str());
    println!();

    println!("Pages:");
    println!("  Fetched: {}", stats.pages_fetched);
    println!("  Failed:  {}", stats.pages_failed);
    println!("  Ignored: {}", stats.pages_ignored);
    println!();

    println!("Records by Spider Status:");
    let total = stats.total_records();
    for status in SpiderStatus::all() {
        let count = stats.records_by_status.get(&status).copied().unwrap_or(0);
        if count == 0 {
            continue;
        }
        let percentage = if total > 0 {
            (count as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", status, count, percentage);
    }
    println!();

    println!("Error lines: {}", stats.error_lines);
    if stats.duplicates > 0 {
        println!("Duplicate sightings: {}", stats.duplicates);
    }
}
