use super::part::PartData;
use crate::url::clean_url;
use std::collections::HashMap;

/// In-memory view of the reference catalog
///
/// Owns every loaded part in catalog order. Matchable parts are indexed by
/// SKU and by URL (raw and query-stripped); excluded parts are kept for the
/// final report but can never be matched.
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    parts: Vec<PartData>,
    by_sku: HashMap<String, usize>,
    by_url: HashMap<String, usize>,
    excluded: Vec<usize>,
    /// Crawled SKU that reconciled each matched entry
    claims: HashMap<usize, String>,
}

impl ReferenceIndex {
    /// Creates an empty index (used for `--skipcatalog` runs)
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a part, applying the exclusion filter
    ///
    /// A duplicate SKU is logged and the first occurrence keeps the key.
    /// URL keys follow the same first-wins rule.
    pub fn add_part(&mut self, part: PartData) {
        let idx = self.parts.len();

        if part.is_excluded() {
            self.excluded.push(idx);
            self.parts.push(part);
            return;
        }

        if !part.sku.is_empty() {
            if let Some(&first) = self.by_sku.get(&part.sku) {
                tracing::warn!(
                    sku = %part.sku,
                    row = idx + 1,
                    original_order = self.parts[first].order,
                    "Duplicate part number in reference catalog"
                );
            } else {
                self.by_sku.insert(part.sku.clone(), idx);
            }
        }

        if !part.url.is_empty() {
            let (cleaned, _) = clean_url(&part.url);
            self.by_url.entry(part.url.clone()).or_insert(idx);
            self.by_url.entry(cleaned).or_insert(idx);
        }

        self.parts.push(part);
    }

    /// Finds the matchable part for a SKU, falling back to its URL
    ///
    /// The URL is tried as given, then with its query removed.
    pub fn lookup(&self, sku: &str, url: &str) -> Option<usize> {
        if let Some(&idx) = self.by_sku.get(sku) {
            return Some(idx);
        }
        if let Some(&idx) = self.by_url.get(url) {
            return Some(idx);
        }
        let (cleaned, stripped) = clean_url(url);
        if stripped {
            return self.by_url.get(&cleaned).copied();
        }
        None
    }

    pub fn get(&self, idx: usize) -> Option<&PartData> {
        self.parts.get(idx)
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut PartData> {
        self.parts.get_mut(idx)
    }

    /// Parts kept out of matching
    pub fn excluded(&self) -> impl Iterator<Item = &PartData> {
        self.excluded.iter().map(move |&idx| &self.parts[idx])
    }

    /// Records the crawled SKU that reconciled the entry at `idx`
    pub fn claim(&mut self, idx: usize, sku: &str) {
        self.claims.insert(idx, sku.to_string());
    }

    /// The crawled SKU that reconciled the entry at `idx`, if any
    pub fn claimed_by(&self, idx: usize) -> Option<&str> {
        self.claims.get(&idx).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Parts the crawl has not observed, in catalog order
    pub fn unseen(&self) -> impl Iterator<Item = &PartData> {
        self.parts.iter().filter(|p| !p.spider_status.is_seen())
    }

    /// URL and section of every unseen matchable part, for the late fetch pass
    pub fn unseen_urls(&self) -> Vec<(String, String)> {
        let excluded = &self.excluded;
        self.parts
            .iter()
            .enumerate()
            .filter(|(idx, p)| {
                !p.spider_status.is_seen() && !p.url.is_empty() && !excluded.contains(idx)
            })
            .map(|(_, p)| (p.url.clone(), p.section.clone()))
            .collect()
    }
}
