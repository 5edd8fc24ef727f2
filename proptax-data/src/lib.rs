//! Bulk asset import from spreadsheet-exported CSV files.
//!
//! Rows are parsed strictly (a structurally broken file fails as a whole),
//! then imported row by row: recognisable problems in a row's enum cells are
//! auto-corrected and reported as warnings, anything else fails that row
//! alone. The store is written once at the end.

mod import;

pub use import::{AssetRowRecord, ImportError, ImportSummary, import, parse_rows};
