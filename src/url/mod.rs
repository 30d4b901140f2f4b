//! URL handling module for Parts-Spider
//!
//! This module provides link canonicalization, query cleaning, host
//! extraction, and the skip-prefix check applied before a URL enters the
//! frontier.

mod host;
mod normalize;

// Re-export main functions
pub use host::{extract_host, is_same_host};
pub use normalize::{canonicalize, clean_url};

/// Returns true if a canonical URL falls under one of the vendor's skip prefixes
///
/// Prefixes are compared byte-exact against the start of the URL string, so
/// `https://www.studica.com/blog` also skips `https://www.studica.com/blog/post-1`.
///
/// # Examples
///
/// ```
/// use parts_spider::url::is_skipped;
///
/// let skip = vec!["https://www.studica.com/blog".to_string()];
/// assert!(is_skipped("https://www.studica.com/blog/news", &skip));
/// assert!(!is_skipped("https://www.studica.com/robotics", &skip));
/// ```
pub fn is_skipped(url: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|prefix| url.starts_with(prefix.as_str()))
}
