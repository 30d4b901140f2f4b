//! Breadcrumb composition and category tracking

use super::{attr, select, text_of};
use crate::crawler::Context;
use scraper::{ElementRef, Html};
use std::collections::HashMap;

/// Separator between breadcrumb segments
pub const CRUMB_SEPARATOR: &str = " > ";

/// Crumb prefix that marks an uninformative breadcrumb
const SHOP_ALL: &str = "Home > Shop All";

/// Where a vendor keeps its breadcrumb and how to read each segment
#[derive(Debug, Clone, Copy)]
pub struct BreadcrumbRule {
    /// Selector for the breadcrumb segments, in order
    pub items: &'static str,
    /// Link inside a segment; its text is the label and its href the category URL
    pub link: &'static str,
    /// Label of the current (unlinked) segment; wins over `link` when both match
    pub current: &'static str,
    /// Category class is the segment's `class` attribute rather than its label
    pub class_from_attr: bool,
    /// Segment label that is never part of the crumb
    pub skip_label: Option<&'static str>,
}

/// One observed category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub url: String,
}

/// Categories seen during the crawl, keyed by class tag
#[derive(Debug, Default)]
pub struct CategoryMap {
    entries: HashMap<String, Category>,
}

impl CategoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a category observation
    ///
    /// The first name for a class sticks; a later different name is only
    /// logged. An empty URL is filled in by the first non-empty one.
    pub fn save(&mut self, name: &str, class: &str, url: &str) {
        match self.entries.get_mut(class) {
            Some(entry) => {
                if entry.name != name {
                    tracing::warn!(
                        class = %class,
                        name = %name,
                        previous = %entry.name,
                        "Category name does not match previous name"
                    );
                }
                if entry.url != url && !url.is_empty() {
                    if entry.url.is_empty() {
                        entry.url = url.to_string();
                    } else {
                        tracing::warn!(
                            class = %class,
                            url = %url,
                            previous = %entry.url,
                            "Category URL does not match previous URL"
                        );
                    }
                }
            }
            None => {
                self.entries.insert(
                    class.to_string(),
                    Category {
                        name: name.to_string(),
                        url: url.to_string(),
                    },
                );
            }
        }
    }

    pub fn get(&self, class: &str) -> Option<&Category> {
        self.entries.get(class)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Appends `segment` to `base` with the crumb separator
///
/// Non-breaking spaces become regular spaces; an empty segment leaves the
/// crumb unchanged.
pub fn make_breadcrumb(base: &str, segment: &str) -> String {
    if segment.is_empty() {
        return base.to_string();
    }
    let segment = segment.replace('\u{00A0}', " ");
    if base.is_empty() {
        segment
    } else {
        format!("{}{}{}", base, CRUMB_SEPARATOR, segment)
    }
}

/// Reads the on-page breadcrumb, recording each segment as a category
///
/// Falls back to `inherited` (the crumb the page was discovered under) when
/// the page has no breadcrumb or its crumb collapses to `Home > Shop All`.
pub(crate) fn page_breadcrumb(
    ctx: &mut Context,
    rule: &BreadcrumbRule,
    doc: &Html,
    inherited: &str,
) -> String {
    let mut result = String::new();
    let mut previous = String::new();

    for item in select(doc.root_element(), rule.items) {
        let (name, url) = read_segment(item, rule);

        let class = if rule.class_from_attr {
            match attr(item, "class") {
                Some(class) => class.to_string(),
                None => {
                    ctx.error(format!("No Class for name: {} url: {}", name, url));
                    String::new()
                }
            }
        } else {
            name.clone()
        };
        ctx.categories.save(&name, &class, &url);

        if rule.skip_label == Some(name.as_str()) {
            continue;
        }
        previous = std::mem::take(&mut result);
        result = make_breadcrumb(&previous, &name);
    }

    if (result.is_empty() || previous.eq_ignore_ascii_case(SHOP_ALL)) && !inherited.is_empty() {
        return inherited.to_string();
    }
    result
}

fn read_segment(item: ElementRef<'_>, rule: &BreadcrumbRule) -> (String, String) {
    let mut name = String::new();
    let mut url = String::new();

    if let Some(link) = select(item, rule.link).into_iter().last() {
        name = text_of(link);
        if let Some(href) = attr(link, "href") {
            url = href.to_string();
        }
    }
    if let Some(current) = select(item, rule.current).into_iter().last() {
        name = text_of(current);
    }
    (name.trim().to_string(), url)
}
