//! Output module for the reconciliation report and run summary
//!
//! This module handles:
//! - Formatting part records as backtick-delimited report lines
//! - Writing the report through a `ReportWriter`
//! - Recording crawl statistics

mod emitter;
pub mod stats;
mod traits;

pub use emitter::{format_record, EmitTally, Emitter, ERROR_MARKER, HEADER};
pub use stats::{print_statistics, CrawlOutcome, CrawlStatistics};
pub use traits::{DelimitedFileWriter, MemoryWriter, OutputError, OutputResult, ReportWriter};
