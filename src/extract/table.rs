//! Product tables
//!
//! Columns are classified by their exact header text. A table is a product
//! table only when some column holds the part number; every body row then
//! becomes one product named after the page product plus the columns that
//! qualify it.

use super::{select, text_of};
use scraper::ElementRef;

/// What to do with a column's cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnAction {
    /// The part number
    Sku,
    Skip,
    /// Append the cell to the name
    KeepName,
    /// Append `value header` to the name
    KeepNameAfter,
    /// Append `header value` to the name
    KeepNameBefore,
    /// Append `value Bore`, unless a real `Bore` column came first
    KeepBore,
    /// Append `value To`
    KeepTo,
    /// Emit as a `header:value` extra field
    Output,
}

/// Header vocabulary; anything not listed is an output column
const COLUMN_ACTIONS: &[(&str, ColumnAction)] = &[
    ("Part #", ColumnAction::Sku),
    ("Part Number", ColumnAction::Sku),
    ("SKU", ColumnAction::Sku),
    ("Meta Title", ColumnAction::Sku),
    ("Wishlist", ColumnAction::Skip),
    ("Price", ColumnAction::Skip),
    ("Purchase", ColumnAction::Skip),
    ("Length", ColumnAction::KeepName),
    ("Bore", ColumnAction::KeepName),
    ("A", ColumnAction::KeepBore),
    ("Tooth", ColumnAction::KeepNameAfter),
    ("Pitch", ColumnAction::KeepNameBefore),
    ("Spline Size", ColumnAction::KeepName),
    ("Thread Size", ColumnAction::KeepName),
    ("Screw Size", ColumnAction::KeepName),
    ("Thread", ColumnAction::KeepName),
    ("Servo Spline", ColumnAction::KeepName),
    ("Thickness", ColumnAction::KeepName),
    ("Bore A", ColumnAction::KeepTo),
    ("Bore B", ColumnAction::KeepName),
    ("Hex Size", ColumnAction::KeepName),
    ("# of teeth", ColumnAction::KeepName),
];

pub fn action_for(header: &str) -> ColumnAction {
    COLUMN_ACTIONS
        .iter()
        .find(|(name, _)| *name == header)
        .map(|(_, action)| *action)
        .unwrap_or(ColumnAction::Output)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Column {
    header: String,
    action: ColumnAction,
}

/// One body row of a product table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub name: String,
    pub sku: String,
    pub extras: Vec<String>,
}

/// Reads a product table
///
/// # Arguments
///
/// * `table` - The `<table>` element
/// * `product_name` - Base name every row's name starts from
///
/// # Returns
///
/// The rows in document order, or `None` when no column holds a part number
pub fn read_table(table: ElementRef<'_>, product_name: &str) -> Option<Vec<TableRow>> {
    let mut header_cells = select(table, "thead tr th");
    let headers_in_body = header_cells.is_empty();
    if headers_in_body {
        header_cells = select(table, "tr:first-child td");
    }

    let columns = classify(&header_cells);
    if !columns.iter().any(|c| c.action == ColumnAction::Sku) {
        return None;
    }

    let body_rows = select(table, "tbody tr");
    let skip = usize::from(headers_in_body);
    let rows = body_rows
        .into_iter()
        .skip(skip)
        .map(|tr| read_row(tr, &columns, product_name))
        .collect();
    Some(rows)
}

fn classify(cells: &[ElementRef<'_>]) -> Vec<Column> {
    let mut found_bore = false;
    cells
        .iter()
        .map(|cell| {
            let header = header_text(*cell);
            let mut action = action_for(&header);
            if header == "Bore" {
                found_bore = true;
            } else if action == ColumnAction::KeepBore && found_bore {
                action = ColumnAction::Skip;
            }
            Column { header, action }
        })
        .collect()
}

fn header_text(cell: ElementRef<'_>) -> String {
    let p = select(cell, "p");
    if !p.is_empty() {
        return p.into_iter().map(text_of).collect::<String>().trim().to_string();
    }
    let strong = select(cell, "strong");
    if !strong.is_empty() {
        return strong.into_iter().map(text_of).collect::<String>().trim().to_string();
    }
    text_of(cell).trim().to_string()
}

fn cell_text(cell: ElementRef<'_>) -> String {
    let p = select(cell, "p");
    let text = if p.is_empty() {
        text_of(cell)
    } else {
        p.into_iter().map(text_of).collect()
    };
    text.trim().to_string()
}

fn read_row(tr: ElementRef<'_>, columns: &[Column], product_name: &str) -> TableRow {
    let mut row = TableRow {
        name: product_name.to_string(),
        sku: String::new(),
        extras: Vec::new(),
    };

    for (td, column) in select(tr, "td").into_iter().zip(columns) {
        let value = cell_text(td);
        match column.action {
            ColumnAction::Sku => row.sku = value,
            ColumnAction::Skip => {}
            ColumnAction::KeepName => {
                row.name = format!("{} {}", row.name, value);
            }
            ColumnAction::KeepNameBefore => {
                row.name = format!("{} {} {}", row.name, column.header, value);
            }
            ColumnAction::KeepNameAfter => {
                row.name = format!("{} {} {}", row.name, value, column.header);
            }
            ColumnAction::KeepBore => {
                row.name = format!("{} {} Bore", row.name, value);
            }
            ColumnAction::KeepTo => {
                row.name = format!("{} {} To", row.name, value);
            }
            ColumnAction::Output => {
                row.extras.push(format!("{}:{}", column.header, value));
            }
        }
    }
    row
}
