//! Page extraction layer
//!
//! A fetched page is parsed into a DOM once, given a breadcrumb, and then
//! routed through the vendor's ordered strategy list. Strategies emit
//! products and enqueue links through the crawl [`Context`]; they never
//! block and never see the network.
//!
//! # Components
//!
//! - `dispatcher`: Strategy table and first-match-wins routing
//! - `breadcrumb`: Breadcrumb composition and the category map
//! - `downloads`: Per-page CAD/model download index
//! - `table`: Product tables whose columns are identified by header text
//! - `variants`: Radio, select and embedded-JSON variant pickers
//! - `strategies`: Recognizers shared by several vendors

pub mod breadcrumb;
pub mod dispatcher;
pub mod downloads;
pub mod strategies;
pub mod table;
pub mod variants;

pub use breadcrumb::{make_breadcrumb, BreadcrumbRule, Category, CategoryMap};
pub use dispatcher::{dispatch, Mode, Strategy};
pub use downloads::{DownloadIndex, DownloadRule, Flavor};

use crate::crawler::Context;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// A parsed page on its way through the strategy list
pub struct Page<'a> {
    /// Final URL of the page (after redirects)
    pub url: &'a Url,
    pub doc: &'a Html,
    /// Category path of the page
    pub breadcrumb: String,
    /// The page was reached through a redirect
    pub redirected: bool,
    /// The page carries the vendor's discontinued marker
    pub discontinued: bool,
}

impl<'a> Page<'a> {
    pub fn root(&self) -> ElementRef<'a> {
        self.doc.root_element()
    }

    pub fn url_str(&self) -> &str {
        self.url.as_str()
    }
}

/// One product ready to be reconciled and written
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductLine {
    pub name: String,
    pub sku: String,
    pub url: String,
    pub model_url: String,
    pub discontinued: bool,
    pub extras: Vec<String>,
}

impl ProductLine {
    pub fn new(name: &str, sku: &str, url: &str, model_url: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            sku: sku.trim().to_string(),
            url: url.to_string(),
            model_url: model_url.to_string(),
            ..Default::default()
        }
    }

    pub fn discontinued(mut self, discontinued: bool) -> Self {
        self.discontinued = discontinued;
        self
    }

    pub fn with_extras(mut self, extras: Vec<String>) -> Self {
        self.extras = extras;
        self
    }
}

/// Parses a page and runs it through the vendor's strategies
///
/// # Arguments
///
/// * `ctx` - Crawl context, locked by the caller for the whole page
/// * `url` - Final URL of the page
/// * `body` - Page markup (HTML or an XML site map)
/// * `redirected` - Whether the fetch followed a redirect to reach `url`
///
/// # Returns
///
/// `true` if some strategy handled the page
pub fn process_page(ctx: &mut Context, url: &Url, body: &str, redirected: bool) -> bool {
    let doc = Html::parse_document(body);
    let profile = ctx.profile;

    let inherited = ctx
        .frontier
        .breadcrumb_for(url.as_str())
        .unwrap_or_default()
        .to_string();
    let breadcrumb = breadcrumb::page_breadcrumb(ctx, &profile.breadcrumb, &doc, &inherited);
    ctx.frontier.mark_visited(url, &breadcrumb);

    let discontinued = profile
        .discontinued_marker
        .is_some_and(|css| select_first(doc.root_element(), css).is_some());

    tracing::debug!(url = %url, breadcrumb = %breadcrumb, "Dispatching page");

    let page = Page {
        url,
        doc: &doc,
        breadcrumb,
        redirected,
        discontinued,
    };
    dispatch(ctx, &page, profile.strategies)
}

/// Parses a CSS selector, logging and returning `None` when it is invalid
pub(crate) fn parse_selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            tracing::error!(selector = css, error = %e, "Invalid CSS selector");
            None
        }
    }
}

/// All descendants of `root` matching `css`, in document order
pub fn select<'a>(root: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match parse_selector(css) {
        Some(selector) => root.select(&selector).collect(),
        None => Vec::new(),
    }
}

pub fn select_first<'a>(root: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = parse_selector(css)?;
    let found = root.select(&selector).next();
    found
}

/// Concatenated text of every match, like reading the text of a selection
pub fn select_text(root: ElementRef<'_>, css: &str) -> String {
    select(root, css).into_iter().map(text_of).collect()
}

pub fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect()
}

pub fn attr<'a>(el: ElementRef<'a>, name: &str) -> Option<&'a str> {
    el.value().attr(name)
}

/// The parent element, if the parent node is an element
pub fn parent_element<'a>(el: ElementRef<'a>) -> Option<ElementRef<'a>> {
    el.parent().and_then(ElementRef::wrap)
}

/// True if the immediate parent of `el` matches `css`
pub fn parent_matches(el: ElementRef<'_>, css: &str) -> bool {
    match (parent_element(el), parse_selector(css)) {
        (Some(parent), Some(selector)) => selector.matches(&parent),
        _ => false,
    }
}

/// True if `el` has at least one child element
pub fn has_element_children(el: ElementRef<'_>) -> bool {
    el.children().any(|child| child.value().is_element())
}
