use url::Url;

/// Extracts the host from a URL
///
/// The host is lowercased; an explicit port is kept so that two servers on
/// the same machine are still treated as different sites.
///
/// # Arguments
///
/// * `url` - The URL to extract the host from
///
/// # Returns
///
/// * `Some(String)` - The lowercase host, with `:port` when one is present
/// * `None` - If the URL has no host
///
/// # Examples
///
/// ```
/// use url::Url;
/// use parts_spider::url::extract_host;
///
/// let url = Url::parse("https://WWW.GOBILDA.COM/structure/").unwrap();
/// assert_eq!(extract_host(&url), Some("www.gobilda.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/sitemap.xml").unwrap();
/// assert_eq!(extract_host(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}

/// Returns true if `url` lives on `host` (as produced by [`extract_host`])
pub fn is_same_host(url: &Url, host: &str) -> bool {
    extract_host(url).is_some_and(|h| h == host)
}
