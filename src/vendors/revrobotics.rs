//! REV Robotics storefront

use super::servocity::{SECTION_ALLOWED, SECTION_DELETES, SECTION_EQUIVALENTS};
use super::{VendorKey, VendorProfile};
use crate::crawler::Context;
use crate::extract::downloads::{KeyStyle, TitleFrom};
use crate::extract::strategies::{self, collect_downloads};
use crate::extract::variants::{radio_variants, script_variants};
use crate::extract::{
    attr, has_element_children, make_breadcrumb, parent_matches, select, select_first, select_text,
    text_of, BreadcrumbRule, DownloadIndex, DownloadRule, Page, ProductLine, Strategy,
};

const STRATEGIES: &[Strategy] = &[
    Strategy::exclusive("nav-list", strategies::nav_list),
    Strategy::exclusive("product-grid", product_grid),
    Strategy::exclusive("product-view", product_view),
    Strategy::exclusive("script-variants", script_selector),
    Strategy::exclusive("quick-add-list", quick_add_list),
    Strategy::exclusive("simple-table", strategies::simple_table),
];

pub(super) static PROFILE: VendorProfile = VendorProfile {
    key: VendorKey::Revrobotics,
    seed: "https://www.revrobotics.com/ftc/",
    presets: &[],
    outfile: "rev_robotics.txt",
    catalog: "revrobotics_catalog.csv",
    strip_query: false,
    skip_prefixes: &[],
    section_deletes: SECTION_DELETES,
    section_allowed: SECTION_ALLOWED,
    section_equivalents: SECTION_EQUIVALENTS,
    download_renames: &[],
    breadcrumb: BreadcrumbRule {
        items: "ul.breadcrumbs li",
        link: "a.breadcrumb-label",
        current: "strong",
        class_from_attr: true,
        skip_label: None,
    },
    downloads: DownloadRule {
        anchors: "a[download]",
        title: TitleFrom::Text,
        key_style: KeyStyle::StripWords,
    },
    discontinued_marker: None,
    strategies: STRATEGIES,
};

fn product_grid(ctx: &mut Context, page: &Page<'_>) -> bool {
    let mut found = false;
    for grid in select(page.root(), "ul.productGrid") {
        if parent_matches(grid, "div.tab-content") {
            continue;
        }
        found |= enqueue_named_links(ctx, page, grid, "li.product h4.card-title a");
    }
    found
}

/// "Quick add to cart" list of products
fn quick_add_list(ctx: &mut Context, page: &Page<'_>) -> bool {
    let mut found = false;
    for list in select(page.root(), "ul.qaatc__list") {
        if parent_matches(list, "div.tab-content") {
            continue;
        }
        found |= enqueue_named_links(ctx, page, list, "li.qaatc__item a.qaatc__name");
    }
    found
}

/// Enqueues every link under `scope` with its text appended to the crumb
fn enqueue_named_links(
    ctx: &mut Context,
    page: &Page<'_>,
    scope: scraper::ElementRef<'_>,
    css: &str,
) -> bool {
    let mut found = false;
    for link in select(scope, css) {
        let crumb = make_breadcrumb(&page.breadcrumb, &text_of(link));
        if let Some(href) = attr(link, "href") {
            ctx.enqueue(page.url, href, &crumb);
        }
        found = true;
    }
    found
}

/// Product page `div.productView`, optionally with radio variants
fn product_view(ctx: &mut Context, page: &Page<'_>) -> bool {
    let mut found = false;
    for product in select(page.root(), "div.productView") {
        ctx.output_category(&page.breadcrumb, true);
        let name = select_text(product, "div.productView-product h1.productView-title");
        let sku = select_text(product, "div.productSKU .productView-info-value");
        let sku = sku.trim();

        let mut downloads = collect_downloads(ctx, page, product);
        if !sku.is_empty() {
            let model = downloads.resolve(sku, &[]);
            let options = select_first(product, "[data-product-option-change]")
                .filter(|options| has_element_children(*options));
            match options {
                Some(options) => {
                    for variant in radio_variants(options, name.trim(), sku) {
                        ctx.output_product(ProductLine::new(
                            &variant.name,
                            &variant.sku,
                            page.url_str(),
                            &model,
                        ));
                    }
                }
                None => {
                    ctx.output_product(ProductLine::new(&name, sku, page.url_str(), &model));
                }
            }
            found = true;
        }
        downloads.report_unused(ctx, page.url_str());
    }
    found
}

/// Variant list held in `Product.Config(...)` and `var productMap` scripts
fn script_selector(ctx: &mut Context, page: &Page<'_>) -> bool {
    let root = page.root();
    let title = select_text(root, "div.product-name h1");
    let scripts: Vec<String> = select(root, "script").into_iter().map(text_of).collect();
    let variants = script_variants(scripts.iter().map(String::as_str), title.trim());
    if variants.is_empty() {
        return false;
    }

    ctx.output_category(&page.breadcrumb, true);
    let rule = ctx.profile.downloads;
    let mut downloads = DownloadIndex::collect(ctx, page.url, root, &rule);
    for variant in variants {
        let model = downloads.resolve(&variant.sku, &[]);
        ctx.output_product(ProductLine::new(&variant.name, &variant.sku, page.url_str(), &model));
    }
    downloads.report_unused(ctx, page.url_str());
    true
}
