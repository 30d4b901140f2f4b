//! Matches extracted products against the reference catalog
//!
//! A matched product keeps the curated section and name unless the site
//! really moved or renamed it, in which case the record is marked Changed
//! and the new value goes into the notes.

use super::rules::MatchRules;
use crate::catalog::{PartData, ReferenceIndex};
use crate::state::SpiderStatus;
use crate::url::clean_url;
use regex::Regex;
use std::sync::LazyLock;

/// Trailing pack counts such as " (8 Pack)" or "- 2 pack"
static PACK_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\- (]*[0-9]+ [pP]ack *\)*").expect("hardcoded regex pattern is valid")
});

static MULTI_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" {2,}").expect("hardcoded regex pattern is valid"));

/// Markers the curated catalog adds to names
const STORED_NAME_MARKERS: &[&str] = &["(Pair)", "[DISCONTINUED]", "[OBSOLETE]"];

const NOTE_SEPARATOR: &str = ", ";

/// Result of reconciling one extracted product
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Found in the reference; the record carries the merged fields
    Matched { part: PartData, index: usize },
    /// Not in the reference
    New(PartData),
    /// Matched a reference part that was already reconciled in this run
    Duplicate { sku: String, index: usize },
}

impl Outcome {
    /// The record to emit, if any
    pub fn into_part(self) -> Option<PartData> {
        match self {
            Outcome::Matched { part, .. } | Outcome::New(part) => Some(part),
            Outcome::Duplicate { .. } => None,
        }
    }
}

/// Replaces non-breaking spaces and collapses runs of spaces
pub fn normalize_text(s: &str) -> String {
    let replaced = s.replace('\u{a0}', " ");
    MULTI_SPACE.replace_all(&replaced, " ").into_owned()
}

/// Case-insensitive comparison after normalization
pub fn same_text(a: &str, b: &str) -> bool {
    normalize_text(a).to_lowercase() == normalize_text(b).to_lowercase()
}

fn append_note(notes: &mut String, note: &str) {
    if !notes.is_empty() {
        notes.push_str(NOTE_SEPARATOR);
    }
    notes.push_str(note);
}

/// Reconciles an extracted product against the reference index
///
/// Looks the product up by SKU, then by URL. A match moves the reference
/// entry out of the NotFoundBySpider state so the terminal pass skips it.
/// An entry already claimed by another SKU leaves the product New.
///
/// # Arguments
///
/// * `reference` - Reference index; the matched entry's spider status is updated
/// * `rules` - Vendor section rules
/// * `part` - Product as extracted from the page
///
/// # Returns
///
/// The merged record, a new record, or a duplicate sighting that must not be emitted
pub fn reconcile(reference: &mut ReferenceIndex, rules: &MatchRules, part: PartData) -> Outcome {
    let Some(index) = reference.lookup(&part.sku, &part.url) else {
        return Outcome::New(unmatched(part));
    };

    if reference.get(index).is_some_and(|entry| entry.spider_status.is_seen()) {
        let same_product = reference
            .claimed_by(index)
            .is_some_and(|claimed| claimed.eq_ignore_ascii_case(&part.sku));
        if same_product {
            return Outcome::Duplicate {
                sku: part.sku,
                index,
            };
        }
        // Another product on a page whose reference entry is already taken
        return Outcome::New(unmatched(part));
    }

    let Some(entry) = reference.get_mut(index) else {
        return Outcome::New(unmatched(part));
    };

    let mut part = part;
    merge_into(entry, rules, &mut part);
    entry.spider_status = part.spider_status;
    reference.claim(index, &part.sku);

    Outcome::Matched { part, index }
}

fn unmatched(mut part: PartData) -> PartData {
    part.spider_status = SpiderStatus::New;
    part.status = "Not Done".to_string();
    part
}

/// Merges the stored fields of a reference entry into a crawled record
fn merge_into(entry: &PartData, rules: &MatchRules, part: &mut PartData) {
    let mut status = SpiderStatus::Unchanged;
    let mut notes = part.notes.clone();
    if !entry.notes.is_empty() {
        append_note(&mut notes, &entry.notes);
    }

    if !part.section.is_empty() && !same_text(&part.section, &entry.section) {
        let new_section = rules.strip_section(&part.section);
        let old_section = normalize_text(&entry.section);
        let new_lower = new_section.to_lowercase();
        let old_lower = old_section.to_lowercase();

        let accepted = new_lower == old_lower
            || (old_lower.len() > new_lower.len() && old_lower.starts_with(&new_lower))
            || rules.are_equivalent(&new_section, &old_section)
            || rules
                .allowed_section(&entry.sku)
                .is_some_and(|allowed| same_text(allowed, &old_section));

        if !accepted {
            status = SpiderStatus::Changed;
            append_note(&mut notes, &format!("New Section:{}", new_section));
        }
    }
    part.section = entry.section.clone();

    let new_name = PACK_SUFFIX
        .replace_all(&normalize_text(&part.name), "")
        .trim()
        .to_string();
    let mut old_name = normalize_text(&entry.name);
    for marker in STORED_NAME_MARKERS {
        old_name = old_name.replace(marker, "");
    }
    if same_text(&part.name, &entry.name) || same_text(&new_name, old_name.trim()) {
        part.name = new_name;
    } else {
        status = SpiderStatus::Changed;
        append_note(&mut notes, &format!("New Name:{}", new_name));
        part.name = entry.name.clone();
    }

    if !part.sku.eq_ignore_ascii_case(&entry.sku) {
        status = SpiderStatus::Changed;
        append_note(&mut notes, &format!(" Old SKU:{}", entry.sku));
    }

    if !part.url.eq_ignore_ascii_case(&entry.url) {
        let (new_clean, new_stripped) = clean_url(&part.url);
        let (old_clean, old_stripped) = clean_url(&entry.url);
        if new_clean.eq_ignore_ascii_case(&old_clean) {
            if !new_stripped && old_stripped {
                part.url = entry.url.clone();
            }
        } else {
            status = SpiderStatus::Changed;
            append_note(&mut notes, &format!(" Old URL:{}", entry.url));
        }
    }

    if !part.model_url.eq_ignore_ascii_case(&entry.model_url)
        && part.model_url.to_uppercase().contains("NOMODEL")
    {
        part.model_url = entry.model_url.clone();
    }

    if part.onshape_url.is_empty() {
        part.onshape_url = entry.onshape_url.clone();
    }
    if part.status.is_empty() {
        part.status = entry.status.clone();
    }
    if part.extra.iter().all(String::is_empty) {
        part.extra = entry.extra.clone();
    }

    part.order = if part.order == 0 { entry.order } else { part.order };
    part.notes = notes;
    part.spider_status = status;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_part(section: &str, name: &str, sku: &str, url: &str, model: &str) -> PartData {
        PartData {
            order: 7,
            section: section.to_string(),
            name: name.to_string(),
            sku: sku.to_string(),
            url: url.to_string(),
            model_url: model.to_string(),
            onshape_url: "https://cad.onshape.com/documents/abc".to_string(),
            status: "Done".to_string(),
            ..Default::default()
        }
    }

    fn index_with(part: PartData) -> ReferenceIndex {
        let mut index = ReferenceIndex::new();
        index.add_part(part);
        index
    }

    fn crawled(section: &str, name: &str, sku: &str, url: &str, model: &str) -> PartData {
        PartData {
            order: 12,
            section: section.to_string(),
            name: name.to_string(),
            sku: sku.to_string(),
            url: url.to_string(),
            model_url: model.to_string(),
            ..Default::default()
        }
    }

    fn matched(outcome: Outcome) -> PartData {
        match outcome {
            Outcome::Matched { part, .. } => part,
            other => panic!("expected a match, got {:?}", other),
        }
    }

    #[test]
    fn test_exact_match_is_unchanged() {
        let stored = reference_part(
            "STRUCTURE > X-Rail®",
            "Goodie",
            "REV-41-1562",
            "https://vendor/x/",
            "https://vendor/cad/REV-41-1562.STEP",
        );
        let mut index = index_with(stored.clone());

        let part = matched(reconcile(
            &mut index,
            &MatchRules::default(),
            crawled(
                "STRUCTURE > X-Rail®",
                "Goodie",
                "REV-41-1562",
                "https://vendor/x/",
                "https://vendor/cad/REV-41-1562.STEP",
            ),
        ));

        assert_eq!(part.spider_status, SpiderStatus::Unchanged);
        assert_eq!(part.notes, "");
        assert_eq!(part.section, stored.section);
        assert_eq!(part.name, stored.name);
        assert_eq!(part.url, stored.url);
        assert_eq!(part.model_url, stored.model_url);
        assert_eq!(part.onshape_url, stored.onshape_url);
        assert_eq!(part.status, "Done");
        assert_eq!(part.order, 12);
        assert_eq!(index.get(0).unwrap().spider_status, SpiderStatus::Unchanged);
    }

    #[test]
    fn test_section_equivalence_keeps_reference() {
        let mut index = index_with(reference_part(
            "MOTION > Hubs > Servo Hubs",
            "Servo Hub",
            "525132",
            "https://vendor/hub/",
            "",
        ));
        let rules = MatchRules::new(
            &[],
            &[],
            &[(
                "MOTION > Hubs > Servo Hubs",
                "MOTION > Servos & Accessories > Servo Hubs",
            )],
        );

        let part = matched(reconcile(
            &mut index,
            &rules,
            crawled(
                "MOTION > Servos & Accessories > Servo Hubs",
                "Servo Hub",
                "525132",
                "https://vendor/hub/",
                "",
            ),
        ));

        assert_eq!(part.spider_status, SpiderStatus::Unchanged);
        assert_eq!(part.section, "MOTION > Hubs > Servo Hubs");
        assert_eq!(part.notes, "");
    }

    #[test]
    fn test_section_prefix_of_reference_is_accepted() {
        let mut index = index_with(reference_part(
            "HARDWARE > Screws > Socket Head",
            "Screw",
            "SKU1",
            "https://vendor/s/",
            "",
        ));
        let part = matched(reconcile(
            &mut index,
            &MatchRules::default(),
            crawled("HARDWARE > Screws", "Screw", "SKU1", "https://vendor/s/", ""),
        ));
        assert_eq!(part.spider_status, SpiderStatus::Unchanged);
        assert_eq!(part.section, "HARDWARE > Screws > Socket Head");
    }

    #[test]
    fn test_allowed_section() {
        let mut index = index_with(reference_part(
            "HARDWARE > Lubricants",
            "Grease",
            "ASCC8074",
            "https://vendor/grease/",
            "",
        ));
        let rules = MatchRules::new(&[], &[("ASCC8074", "HARDWARE > Lubricants")], &[]);
        let part = matched(reconcile(
            &mut index,
            &rules,
            crawled("KITS > Linear Motion Kits", "Grease", "ASCC8074", "https://vendor/grease/", ""),
        ));
        assert_eq!(part.spider_status, SpiderStatus::Unchanged);
    }

    #[test]
    fn test_section_change_is_noted() {
        let mut index = index_with(reference_part(
            "MOTION > Gears",
            "Gear",
            "G1",
            "https://vendor/g/",
            "",
        ));
        let part = matched(reconcile(
            &mut index,
            &MatchRules::default(),
            crawled("MOTION > Sprockets", "Gear", "G1", "https://vendor/g/", ""),
        ));
        assert_eq!(part.spider_status, SpiderStatus::Changed);
        assert_eq!(part.notes, "New Section:MOTION > Sprockets");
        assert_eq!(part.section, "MOTION > Gears");
    }

    #[test]
    fn test_pack_suffix_is_ignored() {
        let mut index = index_with(reference_part(
            "MOTION > Bushings",
            "Bronze Bushing",
            "535040",
            "https://vendor/b/",
            "",
        ));
        let part = matched(reconcile(
            &mut index,
            &MatchRules::default(),
            crawled(
                "MOTION > Bushings",
                "Bronze Bushing (8 Pack)",
                "535040",
                "https://vendor/b/",
                "",
            ),
        ));
        assert_eq!(part.spider_status, SpiderStatus::Unchanged);
        assert_eq!(part.name, "Bronze Bushing");
        assert_eq!(part.notes, "");
    }

    #[test]
    fn test_stored_name_markers_and_spacing() {
        let mut index = index_with(reference_part(
            "S",
            "Channel  Bracket (Pair) [DISCONTINUED]",
            "585001",
            "https://vendor/c/",
            "",
        ));
        let part = matched(reconcile(
            &mut index,
            &MatchRules::default(),
            crawled("S", "Channel\u{a0}Bracket", "585001", "https://vendor/c/", ""),
        ));
        assert_eq!(part.spider_status, SpiderStatus::Unchanged);
        assert_eq!(part.name, "Channel Bracket");
    }

    #[test]
    fn test_matching_name_adopts_crawled_spelling() {
        let mut index = index_with(reference_part(
            "MOTION > Bushings",
            "bronze bushing",
            "B1",
            "https://vendor/b/",
            "",
        ));
        let part = matched(reconcile(
            &mut index,
            &MatchRules::default(),
            crawled("MOTION > Bushings", "Bronze Bushing (8 Pack)", "B1", "https://vendor/b/", ""),
        ));
        assert_eq!(part.spider_status, SpiderStatus::Unchanged);
        assert_eq!(part.name, "Bronze Bushing");
        assert_eq!(part.notes, "");
    }

    #[test]
    fn test_name_change_is_noted() {
        let mut index = index_with(reference_part("S", "Old Name", "N1", "https://vendor/n/", ""));
        let part = matched(reconcile(
            &mut index,
            &MatchRules::default(),
            crawled("S", "Brand New Name", "N1", "https://vendor/n/", ""),
        ));
        assert_eq!(part.spider_status, SpiderStatus::Changed);
        assert_eq!(part.notes, "New Name:Brand New Name");
        assert_eq!(part.name, "Old Name");
    }

    #[test]
    fn test_sku_drift_matched_by_url() {
        let mut index = index_with(reference_part(
            "S",
            "Goodie",
            "REV-41-1562",
            "https://vendor/x/",
            "",
        ));
        let part = matched(reconcile(
            &mut index,
            &MatchRules::default(),
            crawled("S", "Goodie", "REV-41-1562X", "https://vendor/x/", ""),
        ));
        assert_eq!(part.spider_status, SpiderStatus::Changed);
        assert!(part.notes.contains("Old SKU:REV-41-1562"));
        assert_eq!(part.sku, "REV-41-1562X");
    }

    #[test]
    fn test_url_with_query_is_preferred() {
        let mut index = index_with(reference_part(
            "S",
            "Bushing",
            "ASCC8074",
            "https://vendor/bushing?sku=ASCC8074",
            "",
        ));
        let part = matched(reconcile(
            &mut index,
            &MatchRules::default(),
            crawled("S", "Bushing", "ASCC8074", "https://vendor/bushing", ""),
        ));
        assert_eq!(part.spider_status, SpiderStatus::Unchanged);
        assert_eq!(part.url, "https://vendor/bushing?sku=ASCC8074");
    }

    #[test]
    fn test_url_change_is_noted() {
        let mut index = index_with(reference_part("S", "P", "U1", "https://vendor/old/", ""));
        let part = matched(reconcile(
            &mut index,
            &MatchRules::default(),
            crawled("S", "P", "U1", "https://vendor/new/", ""),
        ));
        assert_eq!(part.spider_status, SpiderStatus::Changed);
        assert_eq!(part.notes, " Old URL:https://vendor/old/");
        assert_eq!(part.url, "https://vendor/new/");
    }

    #[test]
    fn test_nomodel_adopts_stored_model() {
        let mut index = index_with(reference_part(
            "S",
            "P",
            "M1",
            "https://vendor/m/",
            "https://vendor/cad/M1.STEP",
        ));
        let part = matched(reconcile(
            &mut index,
            &MatchRules::default(),
            crawled("S", "P", "M1", "https://vendor/m/", "<NOMODEL:M1>"),
        ));
        assert_eq!(part.model_url, "https://vendor/cad/M1.STEP");
        assert_eq!(part.spider_status, SpiderStatus::Unchanged);
    }

    #[test]
    fn test_notes_accumulate() {
        let mut stored = reference_part("A > B", "Old", "K1", "https://vendor/k/", "");
        stored.notes = "curated".to_string();
        let mut index = index_with(stored);

        let part = matched(reconcile(
            &mut index,
            &MatchRules::default(),
            crawled("C > D", "New", "K1", "https://vendor/k/", ""),
        ));
        assert_eq!(part.notes, "curated, New Section:C > D, New Name:New");
    }

    #[test]
    fn test_unmatched_is_new() {
        let mut index = ReferenceIndex::new();
        let outcome = reconcile(
            &mut index,
            &MatchRules::default(),
            crawled("S", "Fresh", "NEW-1", "https://vendor/fresh/", ""),
        );
        match outcome {
            Outcome::New(part) => {
                assert_eq!(part.spider_status, SpiderStatus::New);
                assert_eq!(part.status, "Not Done");
            }
            other => panic!("expected New, got {:?}", other),
        }
    }

    #[test]
    fn test_second_sighting_is_duplicate() {
        let mut index = index_with(reference_part("S", "P", "D1", "https://vendor/d/", ""));
        let rules = MatchRules::default();

        assert!(matches!(
            reconcile(&mut index, &rules, crawled("S", "P", "D1", "https://vendor/d/", "")),
            Outcome::Matched { .. }
        ));
        let second = reconcile(&mut index, &rules, crawled("S", "P", "D1", "https://vendor/d/", ""));
        assert_eq!(
            second,
            Outcome::Duplicate {
                sku: "D1".to_string(),
                index: 0
            }
        );
        assert!(second.into_part().is_none());
    }

    #[test]
    fn test_second_product_on_matched_page_is_new() {
        let mut index = index_with(reference_part("S", "Hub", "S1", "https://vendor/hub/", ""));
        let rules = MatchRules::default();

        let first = reconcile(&mut index, &rules, crawled("S", "Hub", "S1", "https://vendor/hub/", ""));
        assert_eq!(matched(first).spider_status, SpiderStatus::Unchanged);

        match reconcile(&mut index, &rules, crawled("S", "Hub 2", "S2", "https://vendor/hub/", "")) {
            Outcome::New(part) => {
                assert_eq!(part.sku, "S2");
                assert_eq!(part.spider_status, SpiderStatus::New);
                assert_eq!(part.status, "Not Done");
            }
            other => panic!("expected New, got {:?}", other),
        }

        // The first product is still only written once
        assert!(matches!(
            reconcile(&mut index, &rules, crawled("S", "Hub", "S1", "https://vendor/hub/", "")),
            Outcome::Duplicate { .. }
        ));
    }

    #[test]
    fn test_reference_sku_after_url_claim_is_new() {
        let mut index = index_with(reference_part("S", "Hub", "S1", "https://vendor/hub/", ""));
        let rules = MatchRules::default();

        // S2 arrives first and takes the entry through its URL
        let first = matched(reconcile(
            &mut index,
            &rules,
            crawled("S", "Hub", "S2", "https://vendor/hub/", ""),
        ));
        assert_eq!(first.spider_status, SpiderStatus::Changed);

        let second = reconcile(&mut index, &rules, crawled("S", "Hub", "S1", "https://vendor/hub/", ""));
        assert!(matches!(second, Outcome::New(_)));
    }

    #[test]
    fn test_reconcile_is_deterministic() {
        let stored = reference_part("A", "Name", "R1", "https://vendor/r/", "");
        let input = crawled("B", "Other", "R1", "https://vendor/r/?x=1", "");

        let first = matched(reconcile(
            &mut index_with(stored.clone()),
            &MatchRules::default(),
            input.clone(),
        ));
        let second = matched(reconcile(
            &mut index_with(stored),
            &MatchRules::default(),
            input,
        ));
        assert_eq!(first, second);
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("a\u{a0}b   c"), "a b c");
        assert!(same_text("X-Rail®  Bracket", "x-rail® bracket"));
    }
}
