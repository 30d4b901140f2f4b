//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small Studica-shaped site and drive
//! the full crawl, extract and reconcile cycle end-to-end.

use parts_spider::config::{CliOverrides, Config, CrawlerConfig, RunSettings};
use parts_spider::crawler::Coordinator;
use parts_spider::output::{CrawlOutcome, MemoryWriter};
use parts_spider::{SpiderStatus, VendorKey};
use std::path::PathBuf;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with a small worker pool
fn create_test_config(workers: u32) -> Config {
    Config {
        crawler: CrawlerConfig {
            workers,
            politeness_delay_ms: 0,
            worker_idle_ttl_secs: 1,
            request_timeout_secs: 5,
        },
        ..Default::default()
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html; charset=utf-8")
}

fn xml(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "application/xml")
}

fn sitemap(locs: &[String]) -> String {
    let urls: String = locs
        .iter()
        .map(|loc| format!("<url><loc>{}</loc></url>", loc))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</urlset>"#,
        urls
    )
}

/// A product page with a breadcrumb and one SKU in the details form
fn product_page(name: &str, sku: &str, model_href: &str) -> String {
    format!(
        r#"<html><body>
        <ul itemtype="http://schema.org/BreadcrumbList">
          <li itemprop="itemListElement"><a itemprop="item" href="/"><span itemprop="name">Home</span></a></li>
          <li itemprop="itemListElement"><a itemprop="item" href="/structure"><span itemprop="name">Structure</span></a></li>
          <li itemprop="itemListElement"><strong itemprop="name">{name}</strong></li>
        </ul>
        <div class="master-wrapper">
          <div class="product-details-page">
            <div class="product-name">{name}</div>
            <form id="product-details-form">
              <div class="manufacturer-part-number"><span class="value">{sku}</span></div>
            </form>
          </div>
          <div class="full-description"><a href="{model_href}">{sku}.STEP</a></div>
        </div>
        </body></html>"#
    )
}

fn write_catalog(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("studica_catalog.csv");
    std::fs::write(&path, content).expect("Failed to write catalog");
    path
}

fn resolve(config: &Config, cli: CliOverrides) -> RunSettings {
    RunSettings::resolve(VendorKey::Studica, config, &cli).expect("Failed to resolve settings")
}

fn line_with<'a>(lines: &'a [String], needle: &str) -> &'a str {
    lines
        .iter()
        .find(|line| line.contains(needle))
        .unwrap_or_else(|| panic!("No report line contains {}: {:#?}", needle, lines))
}

#[tokio::test]
async fn test_exact_match_and_unseen_part() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(xml(&sitemap(&[
            format!("{}/hex-shaft", base_url),
            format!("{}/discontinued-gear", base_url),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/hex-shaft"))
        .respond_with(html(&product_page("Hex Shaft", "70160", "/files/70160.STEP")))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Listed in the site map and in the catalog; fetched only once
    Mock::given(method("GET"))
        .and(path("/discontinued-gear"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let catalog = write_catalog(
        &dir,
        &format!(
            "Order,Section,Name,Part #,URL,Model URL,Status,Notes\n\
             1,Home > Structure,Hex Shaft,70160,{base}/hex-shaft,{base}/files/70160.STEP,Done,\n\
             2,Home > Motion,Old Gear,ASCC8074,{base}/discontinued-gear,,Done,\n",
            base = base_url
        ),
    );
    let out = dir.path().join("studica.txt");

    let config = create_test_config(4);
    let settings = resolve(
        &config,
        CliOverrides {
            seed: Some(format!("{}/sitemap.xml", base_url)),
            out: Some(out.clone()),
            spreadsheet: Some(catalog),
            ..Default::default()
        },
    );

    let stats = Coordinator::new(config, settings)
        .expect("Failed to create coordinator")
        .run()
        .await
        .expect("Crawl failed");

    assert_eq!(stats.outcome, CrawlOutcome::Drained);
    assert_eq!(stats.pages_fetched, 2, "site map and product page");
    assert_eq!(stats.pages_failed, 1, "the 404");

    let report = std::fs::read_to_string(&out).expect("Failed to read report");
    let lines: Vec<String> = report.lines().map(str::to_string).collect();
    assert!(lines[0].starts_with("Order`Section`Name`Part #`"));

    let matched = line_with(&lines, "`70160`");
    assert!(matched.contains("`Home > Structure`Hex Shaft`70160`Hex Shaft 70160`"));
    assert!(matched.contains(&format!("`{}/files/70160.STEP`", base_url)));
    assert!(matched.ends_with("`Done`Unchanged`"), "{}", matched);

    let unseen = line_with(&lines, "`ASCC8074`");
    assert!(unseen.starts_with("2`Home > Motion`Old Gear`ASCC8074`"));
    assert!(unseen.contains("`Not Found by Spider`"));

    assert_eq!(stats.records_by_status.get(&SpiderStatus::Unchanged), Some(&1));
    assert_eq!(stats.records_by_status.get(&SpiderStatus::NotFoundBySpider), Some(&1));
    assert_eq!(lines.len(), 3);
}

#[tokio::test]
async fn test_late_pass_fetches_unlinked_reference_urls() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(xml(&sitemap(&[])))
        .mount(&mock_server)
        .await;

    // Not in the site map; only reachable through the reference catalog
    Mock::given(method("GET"))
        .and(path("/hidden-bracket"))
        .respond_with(html(&product_page("Bracket", "70200", "/files/70200.STEP")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let catalog = write_catalog(
        &dir,
        &format!(
            "Order,Section,Name,Part #,URL,Model URL,Status,Notes\n\
             4,Home > Structure,Bracket,70200,{}/hidden-bracket,,Done,\n",
            base_url
        ),
    );

    let config = create_test_config(2);
    let settings = resolve(
        &config,
        CliOverrides {
            seed: Some(format!("{}/sitemap.xml", base_url)),
            spreadsheet: Some(catalog),
            ..Default::default()
        },
    );
    let writer = MemoryWriter::new();
    let stats = Coordinator::with_writer(config, settings, Box::new(writer.clone()))
        .expect("Failed to create coordinator")
        .run()
        .await
        .expect("Crawl failed");

    assert_eq!(stats.pages_fetched, 2);
    let lines = writer.lines();
    let found = line_with(&lines, "`70200`");
    // The crawled model fills a blank reference model without a note
    assert!(found.contains(&format!("`{}/files/70200.STEP`", base_url)));
    assert!(found.ends_with("`Done`Unchanged`"), "{}", found);
    assert_eq!(lines.len(), 2);
}

#[tokio::test]
async fn test_skip_catalog_marks_everything_new() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(xml(&sitemap(&[format!("{}/hex-shaft", base_url)])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/hex-shaft"))
        .respond_with(html(&product_page("Hex Shaft", "70160", "/files/other.pdf")))
        .mount(&mock_server)
        .await;

    let config = create_test_config(4);
    let settings = resolve(
        &config,
        CliOverrides {
            seed: Some(format!("{}/sitemap.xml", base_url)),
            skip_catalog: true,
            ..Default::default()
        },
    );
    let writer = MemoryWriter::new();
    Coordinator::with_writer(config, settings, Box::new(writer.clone()))
        .expect("Failed to create coordinator")
        .run()
        .await
        .expect("Crawl failed");

    let lines = writer.lines();
    let product = line_with(&lines, "`70160`");
    assert!(product.contains("`<NOMODEL:70160>`"));
    assert!(product.ends_with("`Not Done`New`"), "{}", product);
    assert_eq!(lines.len(), 2);
}

#[tokio::test]
async fn test_empty_sitemap_writes_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(xml(&sitemap(&[])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(4);
    let settings = resolve(
        &config,
        CliOverrides {
            seed: Some(format!("{}/sitemap.xml", mock_server.uri())),
            skip_catalog: true,
            ..Default::default()
        },
    );
    let writer = MemoryWriter::new();
    let stats = Coordinator::with_writer(config, settings, Box::new(writer.clone()))
        .expect("Failed to create coordinator")
        .run()
        .await
        .expect("Crawl failed");

    assert_eq!(writer.lines().len(), 1, "header only");
    assert_eq!(stats.error_lines, 0);
    assert_eq!(stats.pages_fetched, 1);
}

#[tokio::test]
async fn test_no_cross_host_fetch_and_unknown_pages() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(xml(&sitemap(&[
            "https://www.studica.com/hex-shaft".to_string(),
            "http://parts.invalid/other".to_string(),
            format!("{}/about-us", base_url),
            format!("{}/manual.pdf", base_url),
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/about-us"))
        .respond_with(html("<html><body><p>We make robot parts.</p></body></html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/manual.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("%PDF-1.4", "application/pdf"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(4);
    let settings = resolve(
        &config,
        CliOverrides {
            seed: Some(format!("{}/sitemap.xml", base_url)),
            skip_catalog: true,
            ..Default::default()
        },
    );
    let writer = MemoryWriter::new();
    let stats = Coordinator::with_writer(config, settings, Box::new(writer.clone()))
        .expect("Failed to create coordinator")
        .run()
        .await
        .expect("Crawl failed");

    assert_eq!(stats.pages_fetched, 2, "site map and about page");
    assert_eq!(stats.pages_ignored, 1, "the PDF");
    assert_eq!(stats.pages_failed, 0);

    let lines = writer.lines();
    assert_eq!(
        lines[1..],
        [format!("1`***Unable to process: {}/about-us", base_url)]
    );
}

#[tokio::test]
async fn test_single_page_mode() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/hex-shaft"))
        .respond_with(html(&format!(
            r#"{}<div class="related-products-grid"><a href="/collar">Collar</a></div>"#,
            product_page("Hex Shaft", "70160", "/files/70160.STEP")
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/collar"))
        .respond_with(html("<html></html>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let catalog = write_catalog(
        &dir,
        &format!(
            "Order,Section,Name,Part #,URL,Model URL,Status,Notes\n\
             1,Home > Structure,Hex Shaft,70160,{base}/hex-shaft,{base}/files/70160.STEP,Done,\n\
             2,Home > Structure,Shaft Collar,70170,{base}/collar,,Done,\n",
            base = base_url
        ),
    );

    let config = create_test_config(4);
    let settings = resolve(
        &config,
        CliOverrides {
            seed: Some(format!("{}/hex-shaft", base_url)),
            spreadsheet: Some(catalog),
            single: true,
            ..Default::default()
        },
    );
    let writer = MemoryWriter::new();
    let stats = Coordinator::with_writer(config, settings, Box::new(writer.clone()))
        .expect("Failed to create coordinator")
        .run()
        .await
        .expect("Crawl failed");

    assert_eq!(stats.pages_fetched, 1);
    let lines = writer.lines();
    assert!(line_with(&lines, "`70160`").ends_with("`Unchanged`"));
    assert!(line_with(&lines, "`70170`").contains("`Not Found by Spider`"));
}

#[tokio::test]
async fn test_stop_at_url() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(xml(&sitemap(&[
            format!("{}/first", base_url),
            format!("{}/second", base_url),
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/first"))
        .respond_with(html("<html></html>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/second"))
        .respond_with(html("<html></html>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(1);
    let settings = resolve(
        &config,
        CliOverrides {
            seed: Some(format!("{}/sitemap.xml", base_url)),
            skip_catalog: true,
            stop_at: Some(format!("{}/first", base_url)),
            ..Default::default()
        },
    );
    let writer = MemoryWriter::new();
    let stats = Coordinator::with_writer(config, settings, Box::new(writer.clone()))
        .expect("Failed to create coordinator")
        .run()
        .await
        .expect("Crawl failed");

    assert_eq!(stats.outcome, CrawlOutcome::Stopped);
    assert_eq!(stats.pages_fetched, 1);
    assert_eq!(writer.lines().len(), 1);
}

#[tokio::test]
async fn test_unreadable_catalog_is_fatal() {
    let mock_server = MockServer::start().await;

    let config = create_test_config(1);
    let settings = resolve(
        &config,
        CliOverrides {
            seed: Some(format!("{}/sitemap.xml", mock_server.uri())),
            spreadsheet: Some(PathBuf::from("/nonexistent/studica_catalog.csv")),
            ..Default::default()
        },
    );
    let result = Coordinator::with_writer(config, settings, Box::new(MemoryWriter::new()))
        .expect("Failed to create coordinator")
        .run()
        .await;

    assert!(result.is_err());
}
