//! ServoCity storefront
//!
//! The goBILDA store runs on the same storefront theme, so its profile
//! reuses [`STRATEGIES`], the download rule and the rename table.

use super::{VendorKey, VendorProfile};
use crate::crawler::Context;
use crate::extract::downloads::{KeyStyle, TitleFrom};
use crate::extract::strategies::{self, collect_downloads};
use crate::extract::variants::radio_variants;
use crate::extract::{
    attr, has_element_children, make_breadcrumb, parent_matches, select, select_first, select_text,
    BreadcrumbRule, DownloadRule, Page, ProductLine, Strategy,
};
use crate::url::clean_url;
use scraper::ElementRef;

pub(super) const BREADCRUMB: BreadcrumbRule = BreadcrumbRule {
    items: "ul.breadcrumbs li.breadcrumb",
    link: "a.breadcrumb-label",
    current: "strong",
    class_from_attr: true,
    skip_label: None,
};

pub(super) const DOWNLOADS: DownloadRule = DownloadRule {
    anchors: "a.product-downloadsList-listItem-link",
    title: TitleFrom::Attr("title"),
    key_style: KeyStyle::StripWords,
};

/// SKUs whose model is published under another name
pub(super) const DOWNLOAD_RENAMES: &[(&str, &str)] = &[
    ("1600-0722-0008", "535034_3"),
    ("545361", "545360_1"),
    ("585756", "585717"),
    ("585757", "585718"),
    ("3103-0001-0002", "605632"),
    ("3103-0001-0001", "605634_1"),
    ("1804-0032-0001", "svm275-115"),
    ("638230", "585076"),
    ("639010", "585399"),
    ("33488", "HS-488HB"),
    ("33788", "HS-788HB"),
];

pub(super) const SECTION_DELETES: &[&str] = &[
    "Shop by Electrical Connector Style > ",
    "Shop by Hub Style > ",
    " Aluminum REX Shafting >",
    " Stainless Steel D-Shafting >",
    " > Motor Mounts for AndyMark NeveRest Motors > Motor Mounts for NeveRest Orbital Gear Motors",
    " > Motor Mounts for REV Robotics Motors > Motor Mounts for REV Core Hex Motor",
    " > Motor Mounts for REV Robotics Motors > Motor Mounts for REV UltraPlanetary Gearbox",
    " > XL Series, 3/8\" Width Timing Belts",
    " > XL Series, 3/8\" Width, Cut Length Timing Belts",
];

pub(super) const SECTION_ALLOWED: &[(&str, &str)] = &[
    ("637213", "KITS > Linear Motion Kits"),
    ("ASCC8074", "HARDWARE > Lubricants"),
    (
        "555192",
        "STRUCTURE > Motor Mounts > Motor Mounts for NeveRest Classic Gear Motors",
    ),
    (
        "555104",
        "STRUCTURE > Motor Mounts > Motor Mounts for Econ Spur Gear Motors",
    ),
    ("585074", "STRUCTURE > X-Rail® > X-Rail® Accessories"),
    ("585073", "STRUCTURE > X-Rail® > X-Rail® Accessories"),
    ("605638", "STRUCTURE > X-Rail® > X-Rail® Accessories"),
];

pub(super) const SECTION_EQUIVALENTS: &[(&str, &str)] = &[
    ("MOTION > Bearings", "MOTION > Linear Bearings"),
    ("KITS > FTC Kits", "KITS > Linear Motion Kits"),
    ("MOTION > Couplers > Shop by Coupler Bore", "MOTION > Couplers > "),
    ("ELECTRONICS > Wiring > Connector Style", "ELECTRONICS > Wiring > "),
    ("MOTION > Hubs > Servo Hubs", "MOTION > Servos & Accessories > Servo Hubs"),
    ("MOTION > Servos & Accessories > Servos", "MOTION > Servos & Accessories"),
    ("STRUCTURE > Adaptors", "MOTION > Hubs"),
    ("STRUCTURE > Brackets", "STRUCTURE > X-Rail® > X-Rail® Accessories"),
];

pub(super) const STRATEGIES: &[Strategy] = &[
    Strategy::exclusive("nav-list", strategies::nav_list),
    Strategy::exclusive("product-grid", product_grid),
    Strategy::exclusive("schema-product", schema_product),
    Strategy::additive("lazy-load", strategies::lazy_load),
    Strategy::exclusive("product-table-list", strategies::product_table_list),
    Strategy::exclusive("simple-table", strategies::simple_table),
    Strategy::additive("related-products", related_products),
    Strategy::exclusive("meta-refresh", strategies::meta_refresh),
];

pub(super) static PROFILE: VendorProfile = VendorProfile {
    key: VendorKey::Servocity,
    seed: "https://www.servocity.com/electronics/",
    presets: &[
        "https://www.servocity.com/structure/",
        "https://www.servocity.com/motion/",
        "https://www.servocity.com/electronics/",
        "https://www.servocity.com/hardware/",
        "https://www.servocity.com/kits/",
    ],
    outfile: "servocity.txt",
    catalog: "servocity_catalog.csv",
    strip_query: true,
    skip_prefixes: &[],
    section_deletes: SECTION_DELETES,
    section_allowed: SECTION_ALLOWED,
    section_equivalents: SECTION_EQUIVALENTS,
    download_renames: DOWNLOAD_RENAMES,
    breadcrumb: BREADCRUMB,
    downloads: DOWNLOADS,
    discontinued_marker: Some("p.discontinued"),
    strategies: STRATEGIES,
};

/// Category grid of product cards, each enqueued under `<crumb> > <title>`
fn product_grid(ctx: &mut Context, page: &Page<'_>) -> bool {
    let mut found = false;
    let grids = select(
        page.root(),
        "ul.productGrid,ul.threeColumnProductGrid,div.productTableWrapper",
    );
    for grid in grids {
        if parent_matches(grid, "div.tab-content") {
            continue;
        }
        for card in select(grid, "li.product a[data-card-type],li.product a.card") {
            let title = attr(card, "title").unwrap_or_default();
            let crumb = make_breadcrumb(&page.breadcrumb, title);
            if let Some(href) = attr(card, "href") {
                ctx.enqueue(page.url, href, &crumb);
            }
            found = true;
        }
    }
    found
}

/// Product page marked up with schema.org `Product`
///
/// When the page holds several products each URL gets a `?sku=` suffix so
/// the records stay distinct.
fn schema_product(ctx: &mut Context, page: &Page<'_>) -> bool {
    let products = select(page.root(), r#"div[itemtype="http://schema.org/Product"]"#);
    let add_sku = products.len() > 1;

    let mut found = false;
    for product in products {
        if emit_product(ctx, page, product, add_sku) {
            found = true;
        }
    }
    found
}

fn emit_product(ctx: &mut Context, page: &Page<'_>, product: ElementRef<'_>, add_sku: bool) -> bool {
    ctx.output_category(&page.breadcrumb, false);

    let mut name = select_text(product, ".productView-header h1.productView-title");
    if name.is_empty() {
        name = select_first(product, r#"meta[itemprop="name"]"#)
            .and_then(|meta| attr(meta, "content"))
            .unwrap_or_default()
            .to_string();
    }
    let sku = select_first(product, "span.productView-sku[data-product-sku]")
        .and_then(|span| attr(span, "data-product-sku"))
        .or_else(|| {
            select_first(product, r#"meta[itemprop="sku"]"#).and_then(|meta| attr(meta, "content"))
        });

    let mut downloads = collect_downloads(ctx, page, product);
    let renames = ctx.profile.download_renames;
    let mut found = false;

    if let Some(sku) = sku {
        let options = select_first(product, "[data-product-option-change]")
            .filter(|options| has_element_children(*options));
        match options {
            Some(options) => {
                let model = downloads.resolve(sku, renames);
                for variant in radio_variants(options, &name, sku) {
                    ctx.output_product(
                        ProductLine::new(&variant.name, &variant.sku, page.url_str(), &model)
                            .discontinued(page.discontinued),
                    );
                }
            }
            None => {
                let url = if add_sku {
                    let (base, _) = clean_url(page.url_str());
                    format!("{}?sku={}", base, sku)
                } else {
                    page.url_str().to_string()
                };
                let model = downloads.resolve(sku, renames);
                ctx.output_product(
                    ProductLine::new(&name, sku, &url, &model).discontinued(page.discontinued),
                );
            }
        }
        found = true;
    }

    downloads.report_unused(ctx, page.url_str());
    found
}

/// Related product cards; never marks the page handled
fn related_products(ctx: &mut Context, page: &Page<'_>) -> bool {
    for card in select(page.root(), "div.product-related a[data-card-type]") {
        let title = attr(card, "title").unwrap_or_default();
        let crumb = make_breadcrumb(&page.breadcrumb, title);
        if let Some(href) = attr(card, "href") {
            ctx.enqueue(page.url, href, &crumb);
        }
    }
    false
}
