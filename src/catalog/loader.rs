//! Reference catalog loader
//!
//! Reads a delimited file whose first row names the columns. The separator
//! is picked from the file extension, so a previous backtick report can be
//! fed back in as the next run's reference.

use super::index::ReferenceIndex;
use super::part::{PartData, EXTRA_COLUMNS};
use crate::state::SpiderStatus;
use crate::{CatalogError, CatalogResult};
use std::path::Path;

/// Field separator used by the report format
pub const REPORT_SEPARATOR: char = '`';

/// Returns the field separator for a catalog file
///
/// `.csv` is comma separated, `.tsv` and `.tab` are tab separated, and
/// everything else is treated as a backtick report.
pub fn separator_for(path: &Path) -> u8 {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("csv") => b',',
        Some("tsv") | Some("tab") => b'\t',
        _ => REPORT_SEPARATOR as u8,
    }
}

/// Splits delimited text into rows of fields
///
/// With `quoted` set, double quotes group fields and `""` is an escaped
/// quote. Backtick reports are written unquoted, so vendor names such as
/// `3/8" Bore` must be read with `quoted` off. Rows may have any number of
/// fields and blank lines are dropped.
pub fn parse_rows(text: &str, sep: u8, quoted: bool) -> Result<Vec<Vec<String>>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(sep)
        .quoting(quoted)
        .flexible(true)
        .from_reader(text.as_bytes());

    reader
        .records()
        .map(|record| record.map(|r| r.iter().map(str::to_string).collect()))
        .collect()
}

/// Column positions discovered from the header row
#[derive(Debug, Default, Clone)]
struct Columns {
    order: Option<usize>,
    section: Option<usize>,
    name: Option<usize>,
    sku: Option<usize>,
    url: Option<usize>,
    model_url: Option<usize>,
    onshape_url: Option<usize>,
    extra: Option<usize>,
    status: Option<usize>,
    notes: Option<usize>,
}

impl Columns {
    fn discover(header: &[String]) -> Self {
        let mut cols = Columns::default();
        for (idx, title) in header.iter().enumerate() {
            let slot = match title.trim() {
                "Order" => &mut cols.order,
                "Section" => &mut cols.section,
                "Name" => &mut cols.name,
                "Part #" => &mut cols.sku,
                "URL" => &mut cols.url,
                "Model URL" => &mut cols.model_url,
                "Onshape URL" => &mut cols.onshape_url,
                "Extra 1" => &mut cols.extra,
                "Status" | "Model Status" => &mut cols.status,
                "Notes" => &mut cols.notes,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(idx);
            }
        }
        cols
    }

    fn part_from(&self, row: &[String]) -> PartData {
        let cell = |col: Option<usize>| -> String {
            col.and_then(|i| row.get(i))
                .map(|v| v.trim().to_string())
                .unwrap_or_default()
        };

        let mut part = PartData {
            order: cell(self.order).parse().unwrap_or(1),
            section: cell(self.section),
            name: cell(self.name),
            sku: cell(self.sku),
            url: cell(self.url),
            model_url: cell(self.model_url),
            onshape_url: cell(self.onshape_url),
            status: cell(self.status),
            notes: cell(self.notes),
            spider_status: SpiderStatus::NotFoundBySpider,
            ..Default::default()
        };

        if let Some(first) = self.extra {
            part.set_extras((first..first + EXTRA_COLUMNS).map(|i| cell(Some(i))));
        }

        part
    }
}

/// Builds a reference index from already-split rows
///
/// The first row is the header. Rows with neither a name nor a part number
/// are skipped, as are error lines copied over from an earlier report.
pub fn index_from_rows(source: &str, rows: Vec<Vec<String>>) -> CatalogResult<ReferenceIndex> {
    let mut rows = rows.into_iter();
    let header = rows
        .next()
        .ok_or_else(|| CatalogError::Empty(source.to_string()))?;

    let cols = Columns::discover(&header);
    if cols.sku.is_none() {
        return Err(CatalogError::MissingColumn {
            path: source.to_string(),
            column: "Part #",
        });
    }

    let mut index = ReferenceIndex::new();
    for row in rows {
        if is_error_line(&row) {
            continue;
        }
        let part = cols.part_from(&row);
        if part.name.is_empty() && part.sku.is_empty() {
            continue;
        }
        index.add_part(part);
    }

    Ok(index)
}

/// Loads the reference catalog from a delimited file
///
/// # Arguments
///
/// * `path` - Catalog file; the extension selects the separator
///
/// # Returns
///
/// * `Ok(ReferenceIndex)` - Every row loaded, all parts unseen
/// * `Err(CatalogError)` - The file could not be read or split into rows, was empty, or has no `Part #` column
pub fn load_catalog(path: &Path) -> CatalogResult<ReferenceIndex> {
    let source = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|e| CatalogError::Io {
        path: source.clone(),
        source: e,
    })?;

    let sep = separator_for(path);
    let rows = parse_rows(&text, sep, sep != REPORT_SEPARATOR as u8).map_err(|e| {
        CatalogError::Parse {
            path: source.clone(),
            source: e,
        }
    })?;
    let index = index_from_rows(&source, rows)?;

    tracing::info!(
        path = %source,
        parts = index.len(),
        excluded = index.excluded().count(),
        "Loaded reference catalog"
    );

    Ok(index)
}

fn is_error_line(row: &[String]) -> bool {
    row.get(1).is_some_and(|cell| cell.starts_with("***"))
}
