/// Reconciliation outcome for one part record
///
/// Every part loaded from the reference catalog starts as `NotFoundBySpider`
/// and is moved to another state when the crawl sees it.
use std::fmt;

/// Represents how a part compares between the live site and the reference catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SpiderStatus {
    /// SKU was found on the website but is not in the reference catalog
    New,

    /// SKU from the reference catalog was never seen on the website
    #[default]
    NotFoundBySpider,

    /// SKU was found but some field differs; the notes say which
    Changed,

    /// SKU was found and the page marks it as discontinued
    Discontinued,

    /// SKU was found and everything matches
    Unchanged,
}

impl SpiderStatus {
    /// Returns the label written to the report's Spider Status column
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "New",
            Self::NotFoundBySpider => "Not Found by Spider",
            Self::Changed => "Changed",
            Self::Discontinued => "Discontinued",
            Self::Unchanged => "Unchanged",
        }
    }

    /// Parses a report label back into a status
    ///
    /// Older reports used "Same" and "Not Found" for the unchanged and
    /// missing states; both are still accepted.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "New" => Some(Self::New),
            "Not Found by Spider" | "Not Found" => Some(Self::NotFoundBySpider),
            "Changed" => Some(Self::Changed),
            "Discontinued" => Some(Self::Discontinued),
            "Unchanged" | "Same" => Some(Self::Unchanged),
            _ => None,
        }
    }

    /// Returns true once the crawl has observed the part
    pub fn is_seen(&self) -> bool {
        !matches!(self, Self::NotFoundBySpider)
    }

    /// Returns all possible statuses
    pub fn all() -> [Self; 5] {
        [
            Self::New,
            Self::NotFoundBySpider,
            Self::Changed,
            Self::Discontinued,
            Self::Unchanged,
        ]
    }
}

impl fmt::Display for SpiderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
