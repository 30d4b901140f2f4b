use super::matcher::normalize_text;
use std::collections::HashMap;

/// Vendor-specific rules for accepting a section that differs from the reference
#[derive(Debug, Clone, Default)]
pub struct MatchRules {
    /// Substrings removed from a crawled section before comparison
    pub section_deletes: Vec<String>,
    /// SKU to the section the reference is allowed to keep for it
    pub allowed: HashMap<String, String>,
    /// Section prefix pairs treated as the same place in the taxonomy
    pub equivalents: Vec<(String, String)>,
}

impl MatchRules {
    /// Builds rules from static vendor tables
    pub fn new(deletes: &[&str], allowed: &[(&str, &str)], equivalents: &[(&str, &str)]) -> Self {
        Self {
            section_deletes: deletes.iter().map(|s| s.to_string()).collect(),
            allowed: allowed
                .iter()
                .map(|(sku, section)| (sku.to_string(), section.to_string()))
                .collect(),
            equivalents: equivalents
                .iter()
                .map(|(a, b)| (a.to_string(), b.to_string()))
                .collect(),
        }
    }

    /// Normalizes a crawled section and removes the configured substrings
    pub fn strip_section(&self, section: &str) -> String {
        let mut result = normalize_text(section);
        for delete in &self.section_deletes {
            result = result.replace(delete.as_str(), "");
        }
        normalize_text(result.trim())
    }

    /// Returns true if the two sections start with the members of one equivalence pair
    ///
    /// The pair matches in either orientation. Comparison ignores case.
    pub fn are_equivalent(&self, new_section: &str, old_section: &str) -> bool {
        let new_section = new_section.to_lowercase();
        let old_section = old_section.to_lowercase();
        self.equivalents.iter().any(|(a, b)| {
            let a = a.to_lowercase();
            let b = b.to_lowercase();
            (new_section.starts_with(&a) && old_section.starts_with(&b))
                || (new_section.starts_with(&b) && old_section.starts_with(&a))
        })
    }

    /// Canonical section recorded for a SKU, if it has one
    pub fn allowed_section(&self, sku: &str) -> Option<&str> {
        self.allowed.get(sku).map(String::as_str)
    }
}
