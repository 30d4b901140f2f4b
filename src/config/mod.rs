//! Configuration module for Parts-Spider
//!
//! This module loads the optional TOML run file, validates it, and merges it
//! with the command line and the built-in vendor profile into the
//! [`RunSettings`] used for one crawl.
//!
//! # Example
//!
//! ```no_run
//! use parts_spider::config::{load_config, CliOverrides, RunSettings};
//! use parts_spider::VendorKey;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("spider.toml")).unwrap();
//! let settings = RunSettings::resolve(VendorKey::Servocity, &config, &CliOverrides::default()).unwrap();
//! println!("Seed: {}", settings.seed);
//! ```

mod duration;
mod parser;
mod settings;
mod types;
mod validation;

// Re-export types
pub use settings::{CliOverrides, RunSettings, StopConditions};
pub use types::{Config, CrawlerConfig, UserAgentConfig, VendorOverride};

// Re-export parser functions
pub use duration::parse_duration;
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
