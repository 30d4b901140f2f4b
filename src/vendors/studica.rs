//! Studica storefront
//!
//! Crawled from the XML site map; pages found there carry no breadcrumb of
//! their own until fetched, so links are enqueued with an empty crumb.

use super::{VendorKey, VendorProfile};
use crate::crawler::Context;
use crate::extract::downloads::{KeyStyle, TitleFrom};
use crate::extract::strategies::{self, collect_downloads};
use crate::extract::{
    attr, select, select_first, select_text, BreadcrumbRule, DownloadRule, Page, ProductLine,
    Strategy,
};

const STRATEGIES: &[Strategy] = &[
    Strategy::exclusive("sitemap", strategies::sitemap),
    Strategy::additive("related-products", related_products),
    Strategy::exclusive("tag-page", tag_page),
    Strategy::exclusive("option-select", strategies::option_select),
    Strategy::exclusive("product-browse", strategies::product_browse),
    Strategy::exclusive("product-details", product_details),
    Strategy::exclusive("category-page", category_page),
    Strategy::exclusive("category-summary", strategies::category_summary),
    Strategy::exclusive("meta-refresh", strategies::meta_refresh),
];

/// Site sections with no robotics parts
const SKIP_PREFIXES: &[&str] = &[
    "https://www.studica.com/blog",
    "https://www.studica.com/search",
    "https://www.studica.com/studica-resources",
    "https://www.studica.com/education-webinars-for-teachers",
    "https://www.studica.com/contactus",
    "https://www.studica.com/industry",
    "https://www.studica.com/manufacturer/all",
    "https://www.studica.com/webinars",
    "https://www.studica.com/drones-uav",
    "https://www.studica.com/classroom",
    "https://www.studica.com/animation-cad-modeling",
    "https://www.studica.com/career-tech-education",
    "https://www.studica.com/coding-learn-to-program",
    "https://www.studica.com/curriculum-solutions",
    "https://www.studica.com/engineering-education",
    "https://www.studica.com/kitting-services",
    "https://www.studica.com/education-pricing-babbel-for-classroom",
    "https://www.studica.com/science-education",
    "https://www.studica.com/stem-programs",
    "https://www.studica.com/students",
    "https://www.studica.com/student-software-discounts",
    "https://www.studica.com/school-affiliates",
    "https://www.studica.com/architecture",
    "https://www.studica.com/automation-controls",
    "https://www.studica.com/robotics-3",
    "https://www.studica.com/cnc-machines",
    "https://www.studica.com/clearance",
    "https://blog.studica.com",
];

pub(super) static PROFILE: VendorProfile = VendorProfile {
    key: VendorKey::Studica,
    seed: "https://www.studica.com/sitemap.xml",
    presets: &[],
    outfile: "studica.txt",
    catalog: "studica_catalog.csv",
    strip_query: false,
    skip_prefixes: SKIP_PREFIXES,
    section_deletes: &[],
    section_allowed: &[],
    section_equivalents: &[],
    download_renames: &[],
    breadcrumb: BreadcrumbRule {
        items: "ul[itemtype=\"http://schema.org/BreadcrumbList\"] li[itemprop]",
        link: "a[itemprop='item']",
        current: "span[itemprop='name'],strong[itemprop='name']",
        class_from_attr: false,
        skip_label: Some("Studica Robotics"),
    },
    downloads: DownloadRule {
        anchors: "div.full-description a",
        title: TitleFrom::Text,
        key_style: KeyStyle::CadExtension,
    },
    discontinued_marker: None,
    strategies: STRATEGIES,
};

/// Related product tiles; queued but never handles the page
fn related_products(ctx: &mut Context, page: &Page<'_>) -> bool {
    for link in select(page.root(), "div.related-products-grid a") {
        if let Some(href) = attr(link, "href") {
            ctx.enqueue(page.url, href, "");
        }
    }
    false
}

/// Tag page listing product links; an empty one is reported
fn tag_page(ctx: &mut Context, page: &Page<'_>) -> bool {
    let tag_pages = select(page.root(), "div.product-tag-page");
    if tag_pages.is_empty() {
        return false;
    }
    let mut links = 0;
    for tag_page in tag_pages {
        for link in select(tag_page, ".product-title a") {
            if let Some(href) = attr(link, "href") {
                ctx.enqueue(page.url, href, "");
                links += 1;
            }
        }
    }
    if links == 0 {
        ctx.error(format!("Product Tag Page Empty: {}", page.url));
    }
    true
}

/// Product page: a variant list, or a single SKU in the details form
fn product_details(ctx: &mut Context, page: &Page<'_>) -> bool {
    let mut found = false;
    for product in select(page.root(), "div.product-details-page") {
        ctx.output_category(&page.breadcrumb, true);
        let mut downloads = collect_downloads(ctx, page, product);
        let name = select_text(product, "div.product-name");
        let name = name.trim();

        let variants = select(product, "div.product-variant-list div.product-variant-line");
        if !variants.is_empty() {
            for variant in variants {
                let variant_name = select_text(variant, "div.variant-name");
                let sku = select_text(variant, "div.manufacturer-part-number span.value");
                let model = downloads.resolve(sku.trim(), &[]);
                ctx.output_product(ProductLine::new(
                    &format!("{} - {}", name, variant_name.trim()),
                    &sku,
                    page.url_str(),
                    &model,
                ));
            }
            found = true;
        } else if let Some(form) = select_first(product, "#product-details-form") {
            let sku = select_text(form, "div.manufacturer-part-number span.value");
            let model = downloads.resolve(sku.trim(), &[]);
            ctx.output_product(ProductLine::new(name, &sku, page.url_str(), &model));
            found = true;
        }
        downloads.report_unused(ctx, page.url_str());
    }
    found
}

fn category_page(ctx: &mut Context, page: &Page<'_>) -> bool {
    let mut found = false;
    for category in select(page.root(), "div.category-page") {
        for link in select(category, "div.product-item .product-title a") {
            if let Some(href) = attr(link, "href") {
                ctx.enqueue(page.url, href, "");
            }
        }
        found = true;
    }
    found
}
