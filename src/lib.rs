//! Parts-Spider: a vendor-catalog reconciliation crawler
//!
//! This crate crawls one vendor's public web catalog, extracts the current
//! product set, and reconciles it against a curated reference catalog. The
//! result is a backtick-delimited report that flags new parts, missing parts,
//! and drift in name, section, URL, or model between the site and the record.

pub mod catalog;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod reconcile;
pub mod state;
pub mod url;
pub mod vendors;

use thiserror::Error;

/// Main error type for Parts-Spider operations
#[derive(Debug, Error)]
pub enum SpiderError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid duration '{0}'")]
    InvalidDuration(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,

    #[error("Link is not crawlable: {0}")]
    NotCrawlable(String),
}

/// Reference-catalog errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse catalog {path}: {source}")]
    Parse { path: String, source: csv::Error },

    #[error("Catalog {0} has no rows")]
    Empty(String),

    #[error("Catalog {path} has no '{column}' column")]
    MissingColumn { path: String, column: &'static str },
}

/// Result type alias for Parts-Spider operations
pub type Result<T> = std::result::Result<T, SpiderError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

/// Result type alias for catalog operations
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

// Re-export commonly used types
pub use catalog::{PartData, ReferenceIndex};
pub use config::{Config, RunSettings};
pub use state::SpiderStatus;
pub use url::{canonicalize, clean_url};
pub use vendors::VendorKey;
