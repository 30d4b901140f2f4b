use crate::UrlError;
use url::Url;

/// Canonicalizes a discovered link according to Parts-Spider's frontier rules
///
/// # Canonicalization Steps
///
/// 1. Trim surrounding whitespace from the raw href
/// 2. Resolve it against the page it was found on (when there is one)
/// 3. Reject anything that is not http/https or that has no host
/// 4. Remove the fragment (everything after #)
/// 5. Remove the whole query string when `strip_query` is set
///
/// Equality of canonical URLs is byte-exact on the resulting string, so the
/// function is idempotent: canonicalizing a canonical URL yields itself.
///
/// # Arguments
///
/// * `base` - The page the link was found on, if any
/// * `href` - The raw link text (absolute or relative)
/// * `strip_query` - Whether the vendor wants `?sku=...` style queries dropped
///
/// # Returns
///
/// * `Ok(Url)` - Canonical URL
/// * `Err(UrlError)` - The link could not be resolved or is not crawlable
///
/// # Examples
///
/// ```
/// use parts_spider::url::canonicalize;
///
/// let url = canonicalize(None, "https://www.servocity.com/hubs/?sku=545314#top", true).unwrap();
/// assert_eq!(url.as_str(), "https://www.servocity.com/hubs/");
/// ```
pub fn canonicalize(base: Option<&Url>, href: &str, strip_query: bool) -> Result<Url, UrlError> {
    let href = href.trim();
    if href.is_empty() {
        return Err(UrlError::NotCrawlable(String::from("empty link")));
    }

    let mut url = match base {
        Some(base) => base.join(href),
        None => Url::parse(href),
    }
    .map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);

    if strip_query {
        url.set_query(None);
    }

    Ok(url)
}

/// Removes any query from a URL string
///
/// The query is only removed when the `?` is not the first character, so a
/// bare query never collapses into an empty URL.
///
/// # Returns
///
/// The cleaned string and whether anything was removed.
///
/// # Examples
///
/// ```
/// use parts_spider::url::clean_url;
///
/// assert_eq!(clean_url("https://x.com/a?sku=1"), ("https://x.com/a".to_string(), true));
/// assert_eq!(clean_url("https://x.com/a"), ("https://x.com/a".to_string(), false));
/// ```
pub fn clean_url(url: &str) -> (String, bool) {
    match url.find('?') {
        Some(pos) if pos > 0 => (url[..pos].to_string(), true),
        _ => (url.to_string(), false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://www.gobilda.com/motion/hubs/").unwrap()
    }

    #[test]
    fn test_resolve_relative_link() {
        let result = canonicalize(Some(&base()), "../sprockets/", false).unwrap();
        assert_eq!(result.as_str(), "https://www.gobilda.com/motion/sprockets/");
    }

    #[test]
    fn test_resolve_root_relative_link() {
        let result = canonicalize(Some(&base()), "/structure/", false).unwrap();
        assert_eq!(result.as_str(), "https://www.gobilda.com/structure/");
    }

    #[test]
    fn test_fragment_dropped() {
        let result = canonicalize(None, "https://www.gobilda.com/hubs/#specs", false).unwrap();
        assert_eq!(result.as_str(), "https://www.gobilda.com/hubs/");
    }

    #[test]
    fn test_query_kept_without_strip() {
        let result = canonicalize(None, "https://www.studica.com/item?sku=75001", false).unwrap();
        assert_eq!(result.as_str(), "https://www.studica.com/item?sku=75001");
    }

    #[test]
    fn test_query_stripped() {
        let result = canonicalize(None, "https://www.gobilda.com/hub?sku=1310-0016-4012", true).unwrap();
        assert_eq!(result.as_str(), "https://www.gobilda.com/hub");
        assert!(!result.as_str().contains('?'));
    }

    #[test]
    fn test_canonicalize_is_idempotent() {
        let inputs = [
            "https://www.gobilda.com/a/b/?x=1#frag",
            "HTTP://WWW.GOBILDA.COM/a/./b/../c",
            "https://www.gobilda.com",
        ];
        for strip in [false, true] {
            for input in inputs {
                let once = canonicalize(None, input, strip).unwrap();
                let twice = canonicalize(None, once.as_str(), strip).unwrap();
                assert_eq!(once, twice, "not idempotent for {}", input);
            }
        }
    }

    #[test]
    fn test_whitespace_trimmed() {
        let result = canonicalize(Some(&base()), "  /kits/\n", false).unwrap();
        assert_eq!(result.as_str(), "https://www.gobilda.com/kits/");
    }

    #[test]
    fn test_non_http_rejected() {
        let result = canonicalize(Some(&base()), "mailto:sales@gobilda.com", false);
        assert!(matches!(result.unwrap_err(), UrlError::InvalidScheme(_)));

        let result = canonicalize(Some(&base()), "javascript:void(0)", false);
        assert!(matches!(result.unwrap_err(), UrlError::InvalidScheme(_)));
    }

    #[test]
    fn test_empty_link_rejected() {
        let result = canonicalize(Some(&base()), "   ", false);
        assert!(matches!(result.unwrap_err(), UrlError::NotCrawlable(_)));
    }

    #[test]
    fn test_relative_without_base_rejected() {
        let result = canonicalize(None, "/structure/", false);
        assert!(matches!(result.unwrap_err(), UrlError::Parse(_)));
    }

    #[test]
    fn test_clean_url() {
        assert_eq!(
            clean_url("https://www.servocity.com/a?sku=545314"),
            ("https://www.servocity.com/a".to_string(), true)
        );
        assert_eq!(
            clean_url("https://www.servocity.com/a"),
            ("https://www.servocity.com/a".to_string(), false)
        );
    }

    #[test]
    fn test_clean_url_leading_question_mark_kept() {
        assert_eq!(clean_url("?sku=1"), ("?sku=1".to_string(), false));
    }

    #[test]
    fn test_clean_then_canonicalize_round_trip() {
        let canon = canonicalize(None, "https://www.gobilda.com/hub?sku=1", true).unwrap();
        let (cleaned, _) = clean_url(canon.as_str());
        let again = canonicalize(None, &cleaned, true).unwrap();
        assert_eq!(canon, again);
    }
}
