//! Built-in vendor profiles
//!
//! A profile is static data: where to start, what to skip, how to read the
//! breadcrumb and downloads, which strategies recognize the vendor's pages,
//! and the rules that let a crawled section match the reference.

mod andymark;
mod gobilda;
mod revrobotics;
mod servocity;
mod studica;

use crate::extract::{BreadcrumbRule, DownloadRule, Strategy};
use crate::reconcile::MatchRules;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Selects one of the built-in vendors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum VendorKey {
    Gobilda,
    Servocity,
    Revrobotics,
    Andymark,
    Studica,
}

impl VendorKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gobilda => "gobilda",
            Self::Servocity => "servocity",
            Self::Revrobotics => "revrobotics",
            Self::Andymark => "andymark",
            Self::Studica => "studica",
        }
    }

    /// Looks up a vendor by its key, ignoring case
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all()
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(name))
    }

    pub fn all() -> [Self; 5] {
        [
            Self::Gobilda,
            Self::Servocity,
            Self::Revrobotics,
            Self::Andymark,
            Self::Studica,
        ]
    }
}

impl fmt::Display for VendorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the crawler knows about one vendor site
#[derive(Debug)]
pub struct VendorProfile {
    pub key: VendorKey,
    pub seed: &'static str,
    /// Extra start pages fetched alongside the seed
    pub presets: &'static [&'static str],
    /// Default report file
    pub outfile: &'static str,
    /// Default reference catalog file
    pub catalog: &'static str,
    /// Strip the whole query string from crawled URLs
    pub strip_query: bool,
    /// URL prefixes never fetched
    pub skip_prefixes: &'static [&'static str],
    /// Substrings removed from crawled sections before comparison
    pub section_deletes: &'static [&'static str],
    /// SKU to the reference section it may keep
    pub section_allowed: &'static [(&'static str, &'static str)],
    /// Section prefix pairs, new then old, treated as equal
    pub section_equivalents: &'static [(&'static str, &'static str)],
    /// SKU to the download title that holds its model
    pub download_renames: &'static [(&'static str, &'static str)],
    pub breadcrumb: BreadcrumbRule,
    pub downloads: DownloadRule,
    /// Marks every product on the page Discontinued
    pub discontinued_marker: Option<&'static str>,
    /// Page recognizers in priority order
    pub strategies: &'static [Strategy],
}

impl VendorProfile {
    pub fn match_rules(&self) -> MatchRules {
        MatchRules::new(
            self.section_deletes,
            self.section_allowed,
            self.section_equivalents,
        )
    }

    pub fn skip_list(&self) -> Vec<String> {
        self.skip_prefixes.iter().map(|s| s.to_string()).collect()
    }
}

/// The built-in profile for `key`
pub fn profile(key: VendorKey) -> &'static VendorProfile {
    match key {
        VendorKey::Gobilda => &gobilda::PROFILE,
        VendorKey::Servocity => &servocity::PROFILE,
        VendorKey::Revrobotics => &revrobotics::PROFILE,
        VendorKey::Andymark => &andymark::PROFILE,
        VendorKey::Studica => &studica::PROFILE,
    }
}
