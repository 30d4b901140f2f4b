//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! one vendor crawl, including:
//! - Loading the reference catalog and writing the report header
//! - Seeding the frontier
//! - Scheduling fetches onto a bounded pool of worker tasks
//! - Stop and cancel by timer or URL
//! - The terminal pass for reference parts the crawl never saw

use crate::catalog::{load_catalog, ReferenceIndex};
use crate::config::{Config, RunSettings, StopConditions};
use crate::crawler::context::{lock, Context};
use crate::crawler::frontier::Frontier;
use crate::crawler::scheduler::{ScheduledFetch, Scheduler};
use crate::crawler::{build_http_client, fetch_url, FetchResult};
use crate::extract::process_page;
use crate::output::{CrawlOutcome, CrawlStatistics, DelimitedFileWriter, Emitter, ReportWriter};
use crate::url::{canonicalize, is_same_host};
use crate::vendors::{profile, VendorProfile};
use crate::Result;
use reqwest::Client;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::Interval;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Which halt a nominated URL or timer fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Halt {
    Stop,
    Cancel,
}

/// Stop and cancel signals shared with the workers
#[derive(Clone)]
struct Signals {
    /// Finish in-flight pages, schedule nothing new
    stop: CancellationToken,
    /// Abort in-flight pages
    cancel: CancellationToken,
}

impl Signals {
    fn new() -> Self {
        Self {
            stop: CancellationToken::new(),
            cancel: CancellationToken::new(),
        }
    }

    fn fire(&self, halt: Halt) {
        match halt {
            Halt::Stop => self.stop.cancel(),
            Halt::Cancel => self.cancel.cancel(),
        }
    }

    fn halted(&self) -> bool {
        self.stop.is_cancelled() || self.cancel.is_cancelled()
    }
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Config,
    settings: RunSettings,
    profile: &'static VendorProfile,
    client: Client,
    writer: Box<dyn ReportWriter>,
}

impl Coordinator {
    /// Creates a coordinator that writes the report to the configured output file
    ///
    /// # Arguments
    ///
    /// * `config` - The run file configuration
    /// * `settings` - Resolved settings for this run
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(SpiderError)` - The output file could not be created or the client built
    pub fn new(config: Config, settings: RunSettings) -> Result<Self> {
        let writer = DelimitedFileWriter::create(&settings.output_path)?;
        Self::with_writer(config, settings, Box::new(writer))
    }

    /// Creates a coordinator that writes the report to `writer`
    pub fn with_writer(
        config: Config,
        settings: RunSettings,
        writer: Box<dyn ReportWriter>,
    ) -> Result<Self> {
        let timeout = Duration::from_secs(config.crawler.request_timeout_secs.max(1));
        let client = build_http_client(&config.user_agent, timeout)?;

        Ok(Self {
            profile: profile(settings.vendor),
            config,
            settings,
            client,
            writer,
        })
    }

    /// Runs the crawl to completion
    ///
    /// This is the core crawling logic that:
    /// 1. Loads the reference catalog (unless skipped) and writes the header
    /// 2. Seeds the frontier with the seed and preset URLs
    /// 3. Schedules queued URLs onto worker tasks until the frontier drains
    ///    or a stop/cancel fires
    /// 4. Writes the reference parts the crawl never saw
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlStatistics)` - Counters for the finished run
    /// * `Err(SpiderError)` - The catalog or the report header failed
    pub async fn run(self) -> Result<CrawlStatistics> {
        let Self {
            config,
            settings,
            profile,
            client,
            writer,
        } = self;
        let mut stats = CrawlStatistics::start();

        let reference = match &settings.catalog_path {
            Some(path) => {
                let index = load_catalog(path)?;
                tracing::info!(path = %path.display(), parts = index.len(), "Loaded reference catalog");
                index
            }
            None => {
                tracing::info!("Running without a reference catalog");
                ReferenceIndex::new()
            }
        };

        let mut emitter = Emitter::new(writer);
        emitter.write_header()?;

        let (frontier, mut queue) =
            Frontier::new(&settings.seed, settings.strip_query, profile.skip_list());
        let pending = frontier.pending_counter();
        let ctx = Arc::new(Mutex::new(Context::new(
            frontier,
            emitter,
            reference,
            profile,
            settings.single_only,
        )));

        {
            let mut guard = lock(&ctx);
            guard.frontier.enqueue(None, settings.seed.as_str(), "");
            if !settings.single_only {
                for preset in &settings.presets {
                    guard.frontier.enqueue(None, preset.as_str(), "");
                }
            }
        }
        tracing::info!(
            vendor = %settings.vendor,
            seed = %settings.seed,
            workers = config.crawler.workers,
            "Starting crawl"
        );

        let signals = Signals::new();
        let timers = start_timers(&settings.stop, &signals);
        let mut memstats = settings
            .memstats
            .filter(|every| !every.is_zero())
            .map(tokio::time::interval);
        let mut scheduler = Scheduler::new(&config.crawler);
        let mut tasks: JoinSet<()> = JoinSet::new();
        let idle = Duration::from_secs(config.crawler.worker_idle_ttl_secs.max(1));
        let mut outcome = CrawlOutcome::Drained;

        loop {
            let drained = pending.load(Ordering::SeqCst) == 0;
            if tasks.is_empty() && (drained || outcome == CrawlOutcome::Stopped) {
                break;
            }

            tokio::select! {
                biased;

                _ = signals.cancel.cancelled() => {
                    tracing::warn!(in_flight = tasks.len(), "Crawl cancelled");
                    tasks.abort_all();
                    outcome = CrawlOutcome::Cancelled;
                    break;
                }

                _ = signals.stop.cancelled(), if outcome != CrawlOutcome::Stopped => {
                    tracing::info!(in_flight = tasks.len(), "Crawl stopping, finishing in-flight pages");
                    outcome = CrawlOutcome::Stopped;
                }

                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = joined {
                        if e.is_panic() {
                            tracing::error!(error = %e, "Worker panicked");
                        }
                    }
                }

                queued = queue.recv(), if outcome != CrawlOutcome::Stopped => {
                    let Some(queued) = queued else {
                        break;
                    };
                    if let Some(halt) = halt_for(&queued.url, &settings.stop) {
                        tracing::info!(url = %queued.url, halt = ?halt, "Reached halt URL");
                        signals.fire(halt);
                        lock(&ctx).frontier.complete();
                        continue;
                    }
                    let Some(fetch) = scheduler.schedule(queued).await else {
                        break;
                    };
                    tasks.spawn(fetch_page(
                        client.clone(),
                        Arc::clone(&ctx),
                        fetch,
                        settings.strip_query,
                        signals.clone(),
                    ));
                }

                _ = tick(&mut memstats) => {
                    report_memory(&ctx, &scheduler, config.crawler.workers);
                }

                _ = tokio::time::sleep(idle) => {
                    tracing::debug!(
                        pending = pending.load(Ordering::SeqCst),
                        in_flight = tasks.len(),
                        "Waiting for work"
                    );
                }
            }
        }

        if outcome == CrawlOutcome::Drained {
            if signals.cancel.is_cancelled() {
                outcome = CrawlOutcome::Cancelled;
            } else if signals.stop.is_cancelled() {
                outcome = CrawlOutcome::Stopped;
            }
        }
        while tasks.join_next().await.is_some() {}
        for timer in timers {
            timer.abort();
        }
        scheduler.close();

        let mut guard = lock(&ctx);
        guard.terminal_pass();
        guard.emitter.flush();

        stats.pages_fetched = guard.counters.fetched;
        stats.pages_failed = guard.counters.failed;
        stats.pages_ignored = guard.counters.ignored;
        stats.finish(outcome, guard.emitter.tally());

        tracing::info!(
            outcome = outcome.as_str(),
            fetched = stats.pages_fetched,
            known = guard.frontier.known_count(),
            requests = scheduler.request_count(),
            records = stats.total_records(),
            "Crawl finished"
        );
        Ok(stats)
    }
}

/// Fetches one URL and dispatches the page under the context lock
///
/// Every outcome ends with `finish_page`, so the pending count always drops.
async fn fetch_page(
    client: Client,
    ctx: Arc<Mutex<Context>>,
    fetch: ScheduledFetch,
    strip_query: bool,
    signals: Signals,
) {
    if !fetch.wait.is_zero() {
        tokio::time::sleep(fetch.wait).await;
    }
    let result = fetch_url(&client, fetch.url.as_str()).await;

    let mut ctx = lock(&ctx);
    match result {
        FetchResult::Page {
            final_url,
            status_code,
            body,
            ..
        } => {
            let final_url = canonicalize(None, &final_url, strip_query)
                .unwrap_or_else(|_| fetch.url.clone());
            let redirected = final_url != fetch.url;

            if redirected && !is_same_host(&final_url, ctx.frontier.host()) {
                tracing::debug!(url = %fetch.url, target = %final_url, "Redirected off host");
                ctx.counters.ignored += 1;
            } else if redirected && ctx.frontier.is_known(final_url.as_str()) {
                tracing::debug!(url = %fetch.url, target = %final_url, "Redirect target already known");
                ctx.counters.ignored += 1;
            } else {
                tracing::debug!(url = %final_url, status = status_code, "Fetched");
                ctx.counters.fetched += 1;
                if redirected {
                    let crumb = fetch.breadcrumb.clone();
                    ctx.frontier.mark_visited(&final_url, &crumb);
                }
                process_page(&mut ctx, &final_url, &body, redirected);
            }
        }
        FetchResult::ContentMismatch { content_type } => {
            tracing::debug!(url = %fetch.url, content_type = %content_type, "Ignoring content type");
            ctx.counters.ignored += 1;
        }
        FetchResult::HttpError { status_code } => {
            tracing::warn!(url = %fetch.url, status = status_code, "Fetch failed");
            ctx.counters.failed += 1;
        }
        FetchResult::NetworkError { error } => {
            tracing::warn!(url = %fetch.url, error = %error, "Fetch failed");
            ctx.counters.failed += 1;
        }
    }
    ctx.finish_page(signals.halted());
}

/// Returns the halt a URL triggers, if it is a nominated stop or cancel URL
fn halt_for(url: &Url, stop: &StopConditions) -> Option<Halt> {
    if stop.cancel_at.as_deref() == Some(url.as_str()) {
        return Some(Halt::Cancel);
    }
    if stop.stop_at.as_deref() == Some(url.as_str()) {
        return Some(Halt::Stop);
    }
    None
}

fn start_timers(stop: &StopConditions, signals: &Signals) -> Vec<JoinHandle<()>> {
    [(stop.stop_after, Halt::Stop), (stop.cancel_after, Halt::Cancel)]
        .into_iter()
        .filter_map(|(after, halt)| after.map(|after| (after, halt)))
        .map(|(after, halt)| {
            let signals = signals.clone();
            tokio::spawn(async move {
                tokio::time::sleep(after).await;
                tracing::info!(after_secs = after.as_secs(), halt = ?halt, "Halt timer fired");
                signals.fire(halt);
            })
        })
        .collect()
}

async fn tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

fn report_memory(ctx: &Mutex<Context>, scheduler: &Scheduler, workers: u32) {
    let ctx = lock(ctx);
    tracing::info!(
        pending = ctx.frontier.pending(),
        known = ctx.frontier.known_count(),
        fetched = ctx.counters.fetched,
        records = ctx.emitter.tally().records(),
        in_flight = scheduler.in_flight(workers),
        requests = scheduler.request_count(),
        rss_kb = resident_kb().unwrap_or_default(),
        "Memory stats"
    );
}

/// Resident set size in KiB, where `/proc` is available
fn resident_kb() -> Option<u64> {
    let statm = std::fs::read_to_string("/proc/self/statm").ok()?;
    let pages: u64 = statm.split_whitespace().nth(1)?.parse().ok()?;
    Some(pages * 4)
}

/// Runs one crawl with the report written to the configured output file
///
/// # Arguments
///
/// * `config` - The run file configuration
/// * `settings` - Resolved settings for this run
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - The crawl ran (drained, stopped or cancelled)
/// * `Err(SpiderError)` - A fatal startup error
///
/// # Example
///
/// ```no_run
/// use parts_spider::config::{CliOverrides, Config, RunSettings};
/// use parts_spider::crawler::run_crawl;
/// use parts_spider::VendorKey;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::default();
/// let settings = RunSettings::resolve(VendorKey::Gobilda, &config, &CliOverrides::default())?;
/// let stats = run_crawl(config, settings).await?;
/// println!("{} records", stats.total_records());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config, settings: RunSettings) -> Result<CrawlStatistics> {
    Coordinator::new(config, settings)?.run().await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_halt_for() {
        let stop = StopConditions {
            stop_at: Some("https://www.studica.com/motors".to_string()),
            cancel_at: Some("https://www.studica.com/wheels".to_string()),
            ..Default::default()
        };

        assert_eq!(halt_for(&url("https://www.studica.com/motors"), &stop), Some(Halt::Stop));
        assert_eq!(halt_for(&url("https://www.studica.com/wheels"), &stop), Some(Halt::Cancel));
        assert_eq!(halt_for(&url("https://www.studica.com/gears"), &stop), None);
        assert_eq!(halt_for(&url("https://www.studica.com/gears"), &StopConditions::default()), None);
    }

    #[test]
    fn test_signals() {
        let signals = Signals::new();
        assert!(!signals.halted());
        signals.fire(Halt::Stop);
        assert!(signals.halted());
        assert!(!signals.cancel.is_cancelled());
        signals.fire(Halt::Stop);
        assert!(signals.stop.is_cancelled());
    }

    #[tokio::test]
    async fn test_timer_fires_cancel() {
        let signals = Signals::new();
        let stop = StopConditions {
            cancel_after: Some(Duration::from_millis(20)),
            ..Default::default()
        };
        let timers = start_timers(&stop, &signals);
        assert_eq!(timers.len(), 1);

        signals.cancel.cancelled().await;
        assert!(!signals.stop.is_cancelled());
    }
}
