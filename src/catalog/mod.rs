//! Reference catalog: the curated table the crawl is reconciled against
//!
//! # Components
//!
//! - `PartData`: One part record, shared by the catalog and the report
//! - `ReferenceIndex`: Parts keyed by SKU and URL, plus the excluded list
//! - `load_catalog`: Reads a delimited file into a `ReferenceIndex`

mod index;
mod loader;
mod part;

pub use index::ReferenceIndex;
pub use loader::{index_from_rows, load_catalog, parse_rows, separator_for, REPORT_SEPARATOR};
pub use part::{PartData, EXTRA_COLUMNS};
