//! Recognizers shared by several vendors
//!
//! Every function here has the strategy signature and is referenced from
//! the vendors' strategy tables. Vendor-only recognizers live with the
//! vendor.

use super::table::read_table;
use super::variants::{analytics_impression, option_variants};
use super::{attr, make_breadcrumb, select, select_first, text_of, DownloadIndex, Page, ProductLine};
use crate::crawler::Context;
use scraper::ElementRef;

const REFRESH_URL: &str = ";url=";

/// XML site map: enqueues every `<loc>` with an empty breadcrumb
///
/// A `urlset` with no entries still counts as handled.
pub fn sitemap(ctx: &mut Context, page: &Page<'_>) -> bool {
    let Some(urlset) = select_first(page.root(), "urlset") else {
        return false;
    };
    for loc in select(urlset, "url loc") {
        let href = text_of(loc);
        ctx.enqueue(page.url, href.trim(), "");
    }
    true
}

/// Sub-category list `ul.navList`
pub fn nav_list(ctx: &mut Context, page: &Page<'_>) -> bool {
    let mut found = false;
    for list in select(page.root(), "ul.navList") {
        for link in select(list, "li.navList-item a.navList-action") {
            if let Some(href) = attr(link, "href") {
                ctx.enqueue(page.url, href, &page.breadcrumb);
            }
            found = true;
        }
    }
    found
}

/// Product list table `table.productTable`, one link per SKU cell
pub fn product_table_list(ctx: &mut Context, page: &Page<'_>) -> bool {
    let mut found = false;
    for table in select(page.root(), "table.productTable") {
        if super::parent_matches(table, "div.tab-content") {
            continue;
        }
        for link in select(table, "td.productTable-cell a.tableSKU") {
            let product = text_of(link).replace('\n', "");
            let crumb = make_breadcrumb(&page.breadcrumb, product.trim());
            if let Some(href) = attr(link, "href") {
                ctx.enqueue(page.url, href, &crumb);
            }
            found = true;
        }
    }
    found
}

/// Subcategory URLs embedded in the storefront bootstrap script
///
/// The script carries an escaped JSON blob; the `subcategories` array is cut
/// out as text and every `"url":"..."` inside it is enqueued.
pub fn lazy_load(ctx: &mut Context, page: &Page<'_>) -> bool {
    let mut found = false;
    for script in select(page.root(), "script") {
        let text = text_of(script);
        for url in subcategory_urls(&text) {
            ctx.enqueue(page.url, &url, &page.breadcrumb);
            found = true;
        }
    }
    found
}

/// Pulls the subcategory URLs out of a `window.stencilBootstrap(` script
pub fn subcategory_urls(script: &str) -> Vec<String> {
    const URL_KEY: &str = "\"url\":\"";

    if !script.contains("window.stencilBootstrap(") {
        return Vec::new();
    }
    let Some(start) = script.find("subcategories") else {
        return Vec::new();
    };
    let rest = &script[start..];
    let (Some(open), Some(close)) = (rest.find(":["), rest.find("],")) else {
        return Vec::new();
    };
    if close <= open + 2 {
        return Vec::new();
    }

    let list = rest[open + 2..close].replace("\\\"", "\"");
    list.split(',')
        .filter_map(|item| {
            let pos = item.find(URL_KEY)?;
            let tail = &item[pos + URL_KEY.len()..];
            let url = match tail.find('"') {
                Some(end) if end > 0 => &tail[..end],
                _ => tail,
            };
            let url = url.trim_matches('"');
            (!url.is_empty()).then(|| url.to_string())
        })
        .collect()
}

/// Title plus product table in the category description
pub fn simple_table(ctx: &mut Context, page: &Page<'_>) -> bool {
    let root = page.root();
    let Some(title) = select_first(root, "div.page-title h1") else {
        return false;
    };
    let tables = select(root, "div.category-description div.table-widget-container table");
    if tables.is_empty() {
        return false;
    }

    let product_name = text_of(title);
    let profile = ctx.profile;
    let mut downloads = DownloadIndex::collect(ctx, page.url, root, &profile.downloads);
    ctx.output_category(&page.breadcrumb, false);

    let mut found = false;
    for table in tables {
        let Some(rows) = read_table(table, product_name.trim()) else {
            continue;
        };
        found = true;
        for row in rows {
            let model = downloads.resolve(&row.sku, profile.download_renames);
            ctx.output_product(
                ProductLine::new(&row.name, &row.sku, page.url_str(), &model).with_extras(row.extras),
            );
        }
    }
    if found {
        downloads.report_unused(ctx, page.url_str());
    }
    found
}

/// Variant picker built from a `<select>` of `descr (sku)` options
pub fn option_select(ctx: &mut Context, page: &Page<'_>) -> bool {
    let mut found = false;
    for product in select(page.root(), "div.product-details--option_selects") {
        ctx.output_category(&page.breadcrumb, true);
        let heading = super::select_text(product, "h1.product-details__heading");
        let mut downloads = collect_downloads(ctx, page, product);

        for select_el in select(product, "div.select-menu select") {
            if !super::has_element_children(select_el) {
                continue;
            }
            for variant in option_variants(select_el, heading.trim()) {
                let model = downloads.resolve(&variant.sku, ctx.profile.download_renames);
                ctx.output_product(
                    ProductLine::new(&variant.name, &variant.sku, page.url_str(), &model)
                        .discontinued(page.discontinued),
                );
                found = true;
            }
        }
        downloads.report_unused(ctx, page.url_str());
    }
    found
}

/// Product listing whose cards carry an analytics impression
pub fn product_browse(ctx: &mut Context, page: &Page<'_>) -> bool {
    let mut found = false;
    for browse in select(page.root(), "div.product-browse") {
        ctx.output_category(&page.breadcrumb, true);
        for link in select(browse, "div.product-summary a.product-summary__media-link") {
            let (Some(impression), Some(href)) = (
                attr(link, "data-analytics-product-impression"),
                attr(link, "href"),
            ) else {
                continue;
            };
            if let Some(product) = analytics_impression(impression) {
                tracing::trace!(
                    name = product.name.as_deref().unwrap_or_default(),
                    sku = product.sku().unwrap_or_default(),
                    href = %href,
                    "Browse card"
                );
            }
            ctx.enqueue(page.url, href, &page.breadcrumb);
            found = true;
        }
    }
    found
}

/// Category tiles, each enqueued under `<crumb> > <heading>`
pub fn category_summary(ctx: &mut Context, page: &Page<'_>) -> bool {
    let mut found = false;
    for block in select(page.root(), "a.category-summary-content-block__content") {
        let Some(href) = attr(block, "href") else {
            continue;
        };
        for heading in select(block, "span.category-summary-content-block__heading") {
            let crumb = make_breadcrumb(&page.breadcrumb, &text_of(heading));
            ctx.enqueue(page.url, href, &crumb);
            found = true;
        }
    }
    found
}

/// `<meta http-equiv=refresh>` redirect
pub fn meta_refresh(ctx: &mut Context, page: &Page<'_>) -> bool {
    let mut found = false;
    for meta in select(page.root(), "meta[http-equiv=refresh]") {
        let content = attr(meta, "content").unwrap_or_default();
        if let Some(pos) = content.find(REFRESH_URL) {
            let target = &content[pos + REFRESH_URL.len()..];
            ctx.enqueue(page.url, target, &page.breadcrumb);
            found = true;
        }
    }
    found
}

/// Downloads for a product element, read from its parent
pub(crate) fn collect_downloads(
    ctx: &mut Context,
    page: &Page<'_>,
    product: ElementRef<'_>,
) -> DownloadIndex {
    let scope = super::parent_element(product).unwrap_or(product);
    let rule = ctx.profile.downloads;
    DownloadIndex::collect(ctx, page.url, scope, &rule)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subcategory_urls() {
        let script = r#"window.stencilBootstrap("category", "{\"subcategories\":[{\"id\":1,\"url\":\"https://www.gobilda.com/chain/\"},{\"id\":2,\"url\":\"https://www.gobilda.com/sprockets/\"}],\"template\":\"x\"}").load();"#;
        assert_eq!(
            subcategory_urls(script),
            vec![
                "https://www.gobilda.com/chain/".to_string(),
                "https://www.gobilda.com/sprockets/".to_string()
            ]
        );
    }

    #[test]
    fn test_subcategory_urls_needs_bootstrap() {
        assert!(subcategory_urls(r#"{"subcategories":[{"url":"https://x/"}],"#).is_empty());
        assert!(subcategory_urls("window.stencilBootstrap(\"home\", \"{}\")").is_empty());
    }
}
