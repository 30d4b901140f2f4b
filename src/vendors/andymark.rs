//! AndyMark storefront
//!
//! The top navigation is a set of lazily loaded menus: the nav bar names
//! each menu, and `/menus/<id>` serves its second and third level links.

use super::{VendorKey, VendorProfile};
use crate::crawler::Context;
use crate::extract::downloads::{KeyStyle, TitleFrom};
use crate::extract::strategies::{self, collect_downloads};
use crate::extract::variants::analytics_payload;
use crate::extract::{
    attr, parent_element, select, select_first, text_of, BreadcrumbRule, DownloadRule, Page,
    ProductLine, Strategy,
};
use scraper::ElementRef;

const MENU_PREFIX: &str = "/menus/";

/// Top-level menus that hold no catalog categories
const SKIP_MENUS: &[&str] = &["New & Deals", "View All", "Gift Card"];

/// Crumb endings that read better shortened
const MENU_FIXES: &[(&str, &str)] = &[("Bundles > All Bundles", "Bundles")];

const STRATEGIES: &[Strategy] = &[
    Strategy::additive("primary-nav", primary_nav),
    Strategy::exclusive("menu-page", menu_page),
    Strategy::exclusive("option-select", strategies::option_select),
    Strategy::exclusive("product-browse", strategies::product_browse),
    Strategy::exclusive("product-detail", product_detail),
    Strategy::exclusive("category-summary", strategies::category_summary),
    Strategy::exclusive("meta-refresh", strategies::meta_refresh),
];

pub(super) static PROFILE: VendorProfile = VendorProfile {
    key: VendorKey::Andymark,
    seed: "https://www.andymark.com/structure/",
    presets: &[],
    outfile: "andymark.txt",
    catalog: "andymark_catalog.csv",
    strip_query: false,
    skip_prefixes: &[],
    section_deletes: &[],
    section_allowed: &[],
    section_equivalents: &[],
    download_renames: &[],
    breadcrumb: BreadcrumbRule {
        items: "div.breadcrumbs span.breadcrumbs__node",
        link: "a.breadcrumbs__link",
        current: "strong",
        class_from_attr: true,
        skip_label: None,
    },
    downloads: DownloadRule {
        anchors: "a.product-documents__link",
        title: TitleFrom::Text,
        key_style: KeyStyle::CadExtension,
    },
    discontinued_marker: None,
    strategies: STRATEGIES,
};

/// Queues one `/menus/<id>` page per top-level nav entry
///
/// Present on every page; never marks the page handled.
fn primary_nav(ctx: &mut Context, page: &Page<'_>) -> bool {
    for nav in select(page.root(), "nav.primary-nav") {
        for item in select(nav, "ul li.primary-nav__item") {
            let title = select_first(item, "a.primary-nav__link span.primary-nav__link-text")
                .map(text_of)
                .unwrap_or_default();
            if SKIP_MENUS.contains(&title.as_str()) {
                continue;
            }
            if let Some(content) = attr(item, "data-primary-nav-content") {
                let menu = format!("{}{}", MENU_PREFIX, content);
                ctx.enqueue(page.url, &menu, &title);
            }
        }
    }
    false
}

/// A `/menus/<id>` page: level two and three links under the menu title
fn menu_page(ctx: &mut Context, page: &Page<'_>) -> bool {
    if !page.url.path().contains(MENU_PREFIX) {
        return false;
    }
    let nav_title = ctx
        .frontier
        .breadcrumb_for(page.url_str())
        .filter(|crumb| !crumb.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("XXX-{}-XXX", page.url));

    let mut found = false;
    for block in select(page.root(), "div.taxonomy-content-block") {
        found = true;
        for l2 in select(block, "span a") {
            enqueue_menu_links(ctx, page, &nav_title, l2);
        }
    }
    found
}

fn enqueue_menu_links(ctx: &mut Context, page: &Page<'_>, nav_title: &str, l2: ElementRef<'_>) {
    let mut label = text_of(l2).trim().to_string();
    let mut with_children = true;
    if label.is_empty() {
        if let Some(alt) = select_first(l2, "img").and_then(|img| attr(img, "alt")) {
            label = alt.trim().to_string();
            with_children = false;
        }
    }

    let l2_crumb = format!("{} > {}", nav_title, label);
    let Some(href) = attr(l2, "href").filter(|href| !href.is_empty()) else {
        return;
    };
    ctx.enqueue(page.url, href, &l2_crumb);

    if !with_children {
        return;
    }
    let Some(group) = parent_element(l2).and_then(parent_element) else {
        return;
    };
    for l3 in select(group, "ul li a") {
        let mut crumb = format!("{} > {}", l2_crumb, text_of(l3).trim());
        for (from, to) in MENU_FIXES {
            if let Some(head) = crumb.strip_suffix(from) {
                crumb = format!("{}{}", head, to);
                break;
            }
        }
        if let Some(href) = attr(l3, "href") {
            ctx.enqueue(page.url, href, &crumb);
        }
    }
}

/// Product page whose identity is in a `data-analytics` payload
fn product_detail(ctx: &mut Context, page: &Page<'_>) -> bool {
    let mut found = false;
    for product in select(page.root(), "div.product-detail-container") {
        ctx.output_category(&page.breadcrumb, true);
        let mut downloads = collect_downloads(ctx, page, product);

        let Some(payload) = attr(product, "data-analytics").and_then(analytics_payload) else {
            continue;
        };
        let name = payload.name.clone().unwrap_or_default();
        let sku = payload.sku().unwrap_or_default();
        let model = downloads.resolve(&sku, &[]);
        ctx.output_product(ProductLine::new(&name, &sku, page.url_str(), &model));
        downloads.report_unused(ctx, page.url_str());
        found = true;
    }
    found
}
