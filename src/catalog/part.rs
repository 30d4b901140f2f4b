use crate::state::SpiderStatus;

/// Number of free-form extra columns carried by every record
pub const EXTRA_COLUMNS: usize = 7;

/// Detailed information about one part
///
/// Loaded from the reference catalog, or built by an extractor from a vendor
/// page, then reconciled and written as one report line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartData {
    /// General output order for sorting the report
    pub order: u32,
    /// Taxonomy path where the part occurs (`A > B > C`)
    pub section: String,
    pub name: String,
    /// Vendor part number
    pub sku: String,
    /// Product page on the vendor site
    pub url: String,
    /// CAD/model download, or a `<NOMODEL:sku>` placeholder
    pub model_url: String,
    pub extra: [String; EXTRA_COLUMNS],
    pub onshape_url: String,
    /// Workflow status of the Onshape model (Done, Bundle, Not Done, ...)
    pub status: String,
    pub spider_status: SpiderStatus,
    pub notes: String,
}

impl PartData {
    /// Returns `name + " " + sku`, trimmed
    pub fn combined_name(&self) -> String {
        format!("{} {}", self.name, self.sku).trim().to_string()
    }

    /// Returns true for catalog rows that must never be matched by the crawl
    ///
    /// These are section dividers (`--` names) and placeholder rows for
    /// configurable or unidentified parts.
    pub fn is_excluded(&self) -> bool {
        self.name.starts_with("--")
            || self.sku.starts_with("(Configurable)")
            || self.sku.starts_with("(??")
    }

    /// Copies up to seven extra values into the extra slots; the rest are dropped
    pub fn set_extras<I, S>(&mut self, extras: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for (slot, value) in self.extra.iter_mut().zip(extras) {
            *slot = value.into();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_name() {
        let part = PartData {
            name: "Goodie".to_string(),
            sku: "REV-41-1562".to_string(),
            ..Default::default()
        };
        assert_eq!(part.combined_name(), "Goodie REV-41-1562");
    }

    #[test]
    fn test_combined_name_trims_missing_parts() {
        let part = PartData {
            name: "Spacer".to_string(),
            ..Default::default()
        };
        assert_eq!(part.combined_name(), "Spacer");

        let part = PartData {
            sku: "545314".to_string(),
            ..Default::default()
        };
        assert_eq!(part.combined_name(), "545314");
    }

    #[test]
    fn test_is_excluded() {
        let divider = PartData {
            name: "-- Hubs --".to_string(),
            ..Default::default()
        };
        assert!(divider.is_excluded());

        let configurable = PartData {
            sku: "(Configurable) 3501 Series".to_string(),
            ..Default::default()
        };
        assert!(configurable.is_excluded());

        let unknown = PartData {
            sku: "(??) mystery".to_string(),
            ..Default::default()
        };
        assert!(unknown.is_excluded());

        let normal = PartData {
            name: "Hyper Hub".to_string(),
            sku: "1310-0016-4012".to_string(),
            ..Default::default()
        };
        assert!(!normal.is_excluded());
    }

    #[test]
    fn test_set_extras_caps_at_seven() {
        let mut part = PartData::default();
        part.set_extras((1..=9).map(|i| format!("E{}", i)));
        assert_eq!(part.extra[0], "E1");
        assert_eq!(part.extra[6], "E7");
    }

    #[test]
    fn test_default_status_is_not_found() {
        assert_eq!(PartData::default().spider_status, SpiderStatus::NotFoundBySpider);
    }
}
