//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `SpiderStatus`: Reconciliation outcome of one part record (new, changed, unseen, ...)
//! - `HostState`: Request spacing for the crawled host

mod host_state;
mod spider_status;

// Re-export main types
pub use host_state::HostState;
pub use spider_status::SpiderStatus;
