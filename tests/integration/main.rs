//! End-to-end crawl tests against mock vendor sites

mod crawl_tests;
