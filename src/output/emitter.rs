//! Report emitter
//!
//! Owns the report writer and the line counter. Every product line and
//! every error line consumes one line number; products take the number as
//! their order index.

use super::traits::{OutputResult, ReportWriter};
use crate::catalog::{PartData, REPORT_SEPARATOR};
use crate::state::SpiderStatus;
use std::collections::HashMap;
use std::fmt::Display;

/// Column names of the report, in order
pub const HEADER: [&str; 18] = [
    "Order",
    "Section",
    "Name",
    "Part #",
    "Combined Name",
    "URL",
    "Model URL",
    "Extra 1",
    "Extra 2",
    "Extra 3",
    "Extra 4",
    "Extra 5",
    "Extra 6",
    "Extra 7",
    "Onshape URL",
    "Model Status",
    "Spider Status",
    "Notes",
];

const FIELD_SEPARATOR: &str = "`";

/// Marker that starts the text of an error line
pub const ERROR_MARKER: &str = "***";

/// Counts of what the emitter has written
#[derive(Debug, Clone, Default)]
pub struct EmitTally {
    pub by_status: HashMap<SpiderStatus, u64>,
    pub error_lines: u64,
    pub duplicates: u64,
}

impl EmitTally {
    /// Total number of product lines
    pub fn records(&self) -> u64 {
        self.by_status.values().sum()
    }

    pub fn count(&self, status: SpiderStatus) -> u64 {
        self.by_status.get(&status).copied().unwrap_or(0)
    }
}

/// Formats one part as a report line
pub fn format_record(part: &PartData) -> String {
    let order = part.order.to_string();
    let combined = part.combined_name();
    let status = part.spider_status.as_str();

    let mut fields: Vec<&str> = Vec::with_capacity(HEADER.len());
    fields.extend([
        order.as_str(),
        part.section.as_str(),
        part.name.as_str(),
        part.sku.as_str(),
        combined.as_str(),
        part.url.as_str(),
        part.model_url.as_str(),
    ]);
    fields.extend(part.extra.iter().map(String::as_str));
    fields.extend([
        part.onshape_url.as_str(),
        part.status.as_str(),
        status,
        part.notes.as_str(),
    ]);

    fields.join(FIELD_SEPARATOR)
}

/// Writes records and error lines to the report
pub struct Emitter {
    writer: Box<dyn ReportWriter>,
    line: u32,
    last_category: String,
    tally: EmitTally,
}

impl Emitter {
    /// Creates an emitter whose first line number is 1
    pub fn new(writer: Box<dyn ReportWriter>) -> Self {
        Self {
            writer,
            line: 1,
            last_category: String::new(),
            tally: EmitTally::default(),
        }
    }

    /// Writes the column header line
    ///
    /// Called once at startup, where a failure is fatal.
    pub fn write_header(&mut self) -> OutputResult<()> {
        self.writer.write_line(&HEADER.join(FIELD_SEPARATOR))
    }

    /// The line number the next record or error will take
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Sets the section for the products that follow
    ///
    /// With `trim_last` the final ` > ` segment is cut off; product pages use
    /// it to drop their own name from the breadcrumb.
    pub fn output_category(&mut self, breadcrumb: &str, trim_last: bool) {
        let mut category = breadcrumb;
        if trim_last {
            if let Some(pos) = category.rfind(" > ") {
                category = &category[..pos];
            }
        }
        if category != self.last_category {
            tracing::debug!(category = %category, "Category");
            self.last_category = category.to_string();
        }
    }

    pub fn last_category(&self) -> &str {
        &self.last_category
    }

    /// Starts a product record at the current line
    ///
    /// The record takes the current line number as its order and the last
    /// category as its section; the line counter is advanced.
    pub fn next_record(
        &mut self,
        name: &str,
        sku: &str,
        url: &str,
        model_url: &str,
        extras: &[String],
    ) -> PartData {
        let mut part = PartData {
            order: self.line,
            section: self.last_category.clone(),
            name: name.to_string(),
            sku: sku.to_string(),
            url: url.to_string(),
            model_url: model_url.to_string(),
            ..Default::default()
        };
        part.set_extras(extras.iter().cloned());
        self.line += 1;
        part
    }

    /// Writes a finished product line
    pub fn write_part(&mut self, part: &PartData) {
        tracing::info!(
            status = %part.spider_status,
            sku = %part.sku,
            name = %part.name,
            model = %part.model_url,
            url = %part.url,
            "Product"
        );
        *self.tally.by_status.entry(part.spider_status).or_insert(0) += 1;
        self.write(&format_record(part));
    }

    /// Writes an error line and advances the line counter
    pub fn error(&mut self, message: impl Display) {
        let message = message.to_string();
        tracing::warn!("{}{}", ERROR_MARKER, message);
        let line = format!("{}{}{}{}", self.line, REPORT_SEPARATOR, ERROR_MARKER, message);
        self.write(&line);
        self.tally.error_lines += 1;
        self.line += 1;
    }

    /// Records a product that matched an already reconciled reference part
    pub fn note_duplicate(&mut self, sku: &str, url: &str) {
        tracing::info!(sku = %sku, url = %url, "Duplicate sighting, not emitted");
        self.tally.duplicates += 1;
    }

    pub fn tally(&self) -> &EmitTally {
        &self.tally
    }

    pub fn flush(&mut self) {
        if let Err(e) = self.writer.flush() {
            tracing::error!(error = %e, "Failed to flush report");
        }
    }

    fn write(&mut self, line: &str) {
        if let Err(e) = self.writer.write_line(line) {
            tracing::error!(error = %e, "Failed to write report line");
        }
    }
}
