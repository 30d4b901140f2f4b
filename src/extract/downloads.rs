//! Per-page download index
//!
//! Collects the CAD/model links on a product page under a normalized title
//! and hands one URL to each product by SKU. Entries that no product
//! claimed are reported once the page's products are out.

use super::{attr, select, text_of};
use crate::crawler::Context;
use regex::Regex;
use scraper::ElementRef;
use std::sync::LazyLock;
use url::Url;

/// Key of a page-wide Onshape link
pub const ONSHAPE_LINK: &str = "ONSHAPE MODEL LINK";

/// Key of a page-wide STEP link
pub const STEP_LINK: &str = "STEP FILE";

/// Placeholder recorded when no download fits a SKU
pub fn no_model(sku: &str) -> String {
    format!("<NOMODEL:{}>", sku)
}

/// Title fragments of downloads that are documents rather than models
const NOT_A_MODEL: [&str; 19] = [
    "Instructions",
    "Spec Sheet",
    "Specs",
    "Guide",
    "Diagram",
    "Charts",
    "Manual",
    ".pdf",
    ".docx",
    ".exe",
    "arduino",
    "oboclaw_",
    "RoboclawClassLib",
    "USBRoboclawVirtualComport",
    "Pattern Information",
    "bldc_hsr_",
    "595644_assembly",
    "Hardware Accessory Pack",
    "Use Parameter",
];

const CAD_EXTENSIONS: [&str; 5] = [".STEP", ".STEP.ZIP", ".STP", ".STL", ".SLDDRW"];

static AFTER_FIRST_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ .].*$").expect("hardcoded regex pattern is valid"));

static PACK_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)-PK\d+$").expect("hardcoded regex pattern is valid"));

/// Kind of link, best first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Flavor {
    Onshape,
    Step,
    Drawing,
    Raw,
}

/// Where a download anchor keeps its title
#[derive(Debug, Clone, Copy)]
pub enum TitleFrom {
    Text,
    Attr(&'static str),
}

/// How a title becomes an index key
#[derive(Debug, Clone, Copy)]
pub enum KeyStyle {
    /// Drop " STEP", " File" and similar words from the title
    StripWords,
    /// Keep only CAD files, cut at the first space or dot; page-wide
    /// `STEP FILE` and `ONSHAPE MODEL LINK` anchors are kept by name
    CadExtension,
}

/// Vendor rule for finding download anchors
#[derive(Debug, Clone, Copy)]
pub struct DownloadRule {
    /// Anchor selector, applied under the parent of the product element
    pub anchors: &'static str,
    pub title: TitleFrom,
    pub key_style: KeyStyle,
}

#[derive(Debug, Clone)]
struct Entry {
    key: String,
    url: String,
    flavor: Flavor,
    used: bool,
}

/// Downloads found on one page, in document order
#[derive(Debug, Clone, Default)]
pub struct DownloadIndex {
    entries: Vec<Entry>,
}

impl DownloadIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects the downloads under `scope`
    ///
    /// Anchors missing a title or an href produce an error line.
    pub fn collect(
        ctx: &mut Context,
        page_url: &Url,
        scope: ElementRef<'_>,
        rule: &DownloadRule,
    ) -> Self {
        let mut index = Self::new();

        for anchor in select(scope, rule.anchors) {
            let title = match rule.title {
                TitleFrom::Text => text_of(anchor).trim().to_string(),
                TitleFrom::Attr(name) => attr(anchor, name).unwrap_or_default().trim().to_string(),
            };
            let href = attr(anchor, "href");

            match (title.is_empty(), href) {
                (true, href) => ctx.error(format!(
                    "No Title found for url {} on {}",
                    href.unwrap_or_default(),
                    page_url
                )),
                (false, None) => ctx.error(format!(
                    "No URL found associated with {} on {}",
                    title, page_url
                )),
                (false, Some(href)) => {
                    let url = page_url
                        .join(href)
                        .map(String::from)
                        .unwrap_or_else(|_| href.to_string());
                    if let Some((key, flavor)) = normalize_title(&title, rule.key_style) {
                        tracing::trace!(key = %key, url = %url, "Download");
                        index.insert(&key, &url, flavor);
                    }
                }
            }
        }
        index
    }

    pub fn insert(&mut self, key: &str, url: &str, flavor: Flavor) {
        self.entries.push(Entry {
            key: key.to_string(),
            url: url.to_string(),
            flavor,
            used: false,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finds the model URL for `sku`, marking what it used
    ///
    /// Tries, in order: the SKU as a key (exact, then ignoring case), the
    /// SKU without a `-PK<n>` pack suffix, the page-wide Onshape and STEP
    /// links, an unused URL containing the SKU, the vendor's rename table,
    /// and an unused URL containing the SKU's lower-cased part before the
    /// first dash.
    ///
    /// # Returns
    ///
    /// The URL, or the `<NOMODEL:sku>` placeholder
    pub fn resolve(&mut self, sku: &str, renames: &[(&str, &str)]) -> String {
        if sku.is_empty() {
            return no_model(sku);
        }

        let desuffixed = PACK_SUFFIX.replace(sku, "");
        let mut keys: Vec<&str> = vec![sku];
        if desuffixed != sku {
            keys.push(&desuffixed);
        }
        for key in keys {
            if let Some(url) = self.take_key(key, false) {
                return url;
            }
            if let Some(url) = self.take_key(key, true) {
                return url;
            }
        }

        for key in [ONSHAPE_LINK, STEP_LINK] {
            if let Some(url) = self.take_key(key, false) {
                return url;
            }
        }

        if let Some(url) = self.take_unused_containing(sku) {
            return url;
        }

        if let Some((_, renamed)) = renames.iter().find(|(from, _)| *from == sku) {
            if let Some(url) = self.take_key(renamed, false) {
                return url;
            }
        }

        let lowered = sku.to_lowercase();
        let prefix = lowered.split('-').next().unwrap_or_default();
        if let Some(url) = self.take_unused_containing(prefix) {
            return url;
        }

        no_model(sku)
    }

    /// Writes an error line for every unused model download
    pub fn report_unused(&self, ctx: &mut Context, page_url: &str) {
        for entry in self.unused() {
            ctx.error(format!(
                "Unused download``{}``{}`{}",
                entry.key, page_url, entry.url
            ));
        }
    }

    fn unused(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|entry| {
            !entry.used && !NOT_A_MODEL.iter().any(|word| entry.key.contains(word))
        })
    }

    /// Best-flavored URL for `key`; every entry under the key becomes used
    fn take_key(&mut self, key: &str, ignore_case: bool) -> Option<String> {
        let matches = |entry: &Entry| {
            if ignore_case {
                entry.key.eq_ignore_ascii_case(key)
            } else {
                entry.key == key
            }
        };

        let best = self
            .entries
            .iter()
            .filter(|entry| matches(entry))
            .min_by_key(|entry| entry.flavor)
            .map(|entry| entry.url.clone())?;

        for entry in self.entries.iter_mut().filter(|entry| matches(entry)) {
            entry.used = true;
        }
        Some(best)
    }

    fn take_unused_containing(&mut self, needle: &str) -> Option<String> {
        if needle.is_empty() {
            return None;
        }
        let entry = self
            .entries
            .iter_mut()
            .find(|entry| !entry.used && entry.url.contains(needle))?;
        entry.used = true;
        Some(entry.url.clone())
    }
}

/// Turns an anchor title into an index key and flavor
///
/// Returns `None` for titles the key style does not index.
pub fn normalize_title(title: &str, style: KeyStyle) -> Option<(String, Flavor)> {
    let upper = title.to_uppercase();
    match style {
        KeyStyle::StripWords => {
            let flavor = if upper.contains("ONSHAPE") {
                Flavor::Onshape
            } else if upper.ends_with(".SLDDRW") {
                Flavor::Drawing
            } else if upper.contains("STEP")
                || upper.ends_with(".STP")
                || upper.ends_with(".ZIP")
            {
                Flavor::Step
            } else {
                Flavor::Raw
            };
            let mut key = title.to_string();
            for word in [" STEP", " File", " file", " assembly", ".zip"] {
                key = key.replace(word, "");
            }
            Some((key.trim().to_string(), flavor))
        }
        KeyStyle::CadExtension => {
            if upper == STEP_LINK {
                return Some((STEP_LINK.to_string(), Flavor::Step));
            }
            if upper == ONSHAPE_LINK {
                return Some((ONSHAPE_LINK.to_string(), Flavor::Onshape));
            }
            if !CAD_EXTENSIONS.iter().any(|ext| upper.ends_with(ext)) {
                return None;
            }
            let flavor = if upper.ends_with(".SLDDRW") {
                Flavor::Drawing
            } else {
                Flavor::Step
            };
            let key = AFTER_FIRST_BREAK.replace(title, "").to_string();
            Some((key, flavor))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strip_words() {
        assert_eq!(
            normalize_title("REV-31-1425 STEP File", KeyStyle::StripWords),
            Some(("REV-31-1425".to_string(), Flavor::Step))
        );
        assert_eq!(
            normalize_title("1309-0016-2005.zip", KeyStyle::StripWords),
            Some(("1309-0016-2005".to_string(), Flavor::Step))
        );
        assert_eq!(
            normalize_title("Servo Manual.pdf", KeyStyle::StripWords),
            Some(("Servo Manual.pdf".to_string(), Flavor::Raw))
        );
    }

    #[test]
    fn test_normalize_cad_extension() {
        assert_eq!(
            normalize_title("am-3284 32t Ninja Star Sprocket.STEP", KeyStyle::CadExtension),
            Some(("am-3284".to_string(), Flavor::Step))
        );
        assert_eq!(
            normalize_title("am-0001.SLDDRW", KeyStyle::CadExtension),
            Some(("am-0001".to_string(), Flavor::Drawing))
        );
        assert_eq!(
            normalize_title("Step File", KeyStyle::CadExtension),
            Some((STEP_LINK.to_string(), Flavor::Step))
        );
        assert_eq!(normalize_title("Assembly guide.pdf", KeyStyle::CadExtension), None);
    }

    #[test]
    fn test_resolve_exact_and_case() {
        let mut index = DownloadIndex::new();
        index.insert("545314", "https://v/cad/545314.zip", Flavor::Step);
        index.insert("hda8", "https://v/cad/hda8.zip", Flavor::Step);

        assert_eq!(index.resolve("545314", &[]), "https://v/cad/545314.zip");
        assert_eq!(index.resolve("HDA8", &[]), "https://v/cad/hda8.zip");
    }

    #[test]
    fn test_resolve_prefers_better_flavor() {
        let mut index = DownloadIndex::new();
        index.insert("am-1", "https://v/am-1.SLDDRW", Flavor::Drawing);
        index.insert("am-1", "https://v/am-1.STEP", Flavor::Step);

        assert_eq!(index.resolve("am-1", &[]), "https://v/am-1.STEP");
        assert_eq!(index.unused().count(), 0);
    }

    #[test]
    fn test_resolve_pack_suffix() {
        let mut index = DownloadIndex::new();
        index.insert("2802-0004", "https://v/2802-0004.step", Flavor::Step);
        assert_eq!(index.resolve("2802-0004-PK8", &[]), "https://v/2802-0004.step");
    }

    #[test]
    fn test_resolve_page_wide_links() {
        let mut index = DownloadIndex::new();
        index.insert(STEP_LINK, "https://v/model.step", Flavor::Step);
        index.insert(ONSHAPE_LINK, "https://cad.onshape.com/doc", Flavor::Onshape);

        assert_eq!(index.resolve("75-1234", &[]), "https://cad.onshape.com/doc");
        assert_eq!(index.resolve("75-1235", &[]), "https://cad.onshape.com/doc");
    }

    #[test]
    fn test_resolve_substring_then_rename_then_prefix() {
        let mut index = DownloadIndex::new();
        index.insert("535314", "https://v/file/545314.zip", Flavor::Step);
        index.insert("HS-488HB", "https://v/file/HS-488HB.zip", Flavor::Step);
        index.insert("hda8_assembly_2", "https://v/file/hda8_assembly_2.zip", Flavor::Step);

        assert_eq!(index.resolve("545314", &[]), "https://v/file/545314.zip");
        assert_eq!(
            index.resolve("33488", &[("33488", "HS-488HB")]),
            "https://v/file/HS-488HB.zip"
        );
        assert_eq!(index.resolve("HDA8-30", &[]), "https://v/file/hda8_assembly_2.zip");
        assert_eq!(index.resolve("999", &[]), "<NOMODEL:999>");
    }

    #[test]
    fn test_substring_skips_used_entries() {
        let mut index = DownloadIndex::new();
        index.insert("a", "https://v/555-a.zip", Flavor::Step);

        assert_eq!(index.resolve("555", &[]), "https://v/555-a.zip");
        assert_eq!(index.resolve("555", &[]), "<NOMODEL:555>");
    }

    #[test]
    fn test_unused_skips_documents() {
        let mut index = DownloadIndex::new();
        index.insert("Assembly Instructions", "https://v/i.pdf", Flavor::Raw);
        index.insert("585001", "https://v/585001.zip", Flavor::Step);
        index.insert("585002", "https://v/585002.zip", Flavor::Step);
        index.resolve("585001", &[]);

        let unused: Vec<&str> = index.unused().map(|e| e.key.as_str()).collect();
        assert_eq!(unused, vec!["585002"]);
    }
}
