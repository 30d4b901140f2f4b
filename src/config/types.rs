use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Main configuration structure for Parts-Spider
///
/// Every table is optional; a missing run file behaves like an empty one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    /// Per-vendor overrides, keyed by vendor key (`[vendor.servocity]`)
    #[serde(rename = "vendor")]
    pub vendors: HashMap<String, VendorOverride>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Number of concurrent fetch workers
    pub workers: u32,

    /// Minimum time between requests to the same host (milliseconds, 0 = disabled)
    pub politeness_delay_ms: u64,

    /// Seconds the scheduler waits on an idle queue before re-checking for drain
    pub worker_idle_ttl_secs: u64,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            workers: 8,
            politeness_delay_ms: 0,
            worker_idle_ttl_secs: 5,
            request_timeout_secs: 30,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,

    /// URL with information about the crawler
    pub contact_url: String,

    /// Email address for crawler-related contact
    pub contact_email: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "PartsSpider".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.com/parts-spider".to_string(),
            contact_email: "parts-spider@example.com".to_string(),
        }
    }
}

/// Overrides for one built-in vendor profile
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct VendorOverride {
    pub seed: Option<String>,
    pub out: Option<PathBuf>,
    pub catalog: Option<PathBuf>,
    pub strip_sku: Option<bool>,
    pub presets: Option<Vec<String>>,
}
