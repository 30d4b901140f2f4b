//! Crawler module for page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The frontier of known URLs and the pending-fetch counter
//! - HTTP fetching
//! - Worker-slot scheduling and host rate limiting
//! - The shared context extraction works against
//! - Overall crawl coordination

mod context;
mod coordinator;
mod fetcher;
mod frontier;
mod scheduler;

pub use context::{lock, Context, PageCounters};
pub use coordinator::{run_crawl, Coordinator};
pub use fetcher::{build_http_client, fetch_url, is_accepted_type, user_agent, FetchResult};
pub use frontier::{Frontier, QueuedUrl};
pub use scheduler::{ScheduledFetch, Scheduler};

#[cfg(test)]
pub(crate) use context::testing;
