//! # undat64
//!
//! A Rust library for decoding Path of Exile `.dat64` game-data tables and
//! extracting translated strings from them.
//!
//! ## Overview
//!
//! A `.dat64` file is one table: a 4-byte row count, a fixed-width record
//! per row, an 8-byte `0xBB` sentinel, then a variable-data heap holding
//! UTF-16 strings and lists addressed by heap-relative offsets. This
//! library provides:
//!
//! - Parsing the two-section layout and locating the heap boundary
//! - Bounds-checked typed reads at arbitrary offsets
//! - Heap string and string-list resolution (offset 0 means absent)
//! - Declarative table schemas with row-width computation
//! - Configured per-table extractors with row-width estimation, producing
//!   id → display-name mappings and a merged JSON artifact
//!
//! Table bytes come from a [`FileSource`]; archive and bundle readers live
//! outside this crate.
//!
//! ## Example - Batch extraction
//!
//! ```rust,no_run
//! use undat64::{DatExtractor, DirSource};
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut extractor = DatExtractor::new(DirSource::new("poe_data"));
//!
//!     let tables = extractor.extract_all();
//!     undat64::save_json(&tables, std::path::Path::new("korean_dat_data.json"))?;
//!     Ok(())
//! }
//! ```
//!
//! ## Example - Walking one table
//!
//! ```rust,no_run
//! use undat64::Dat64Table;
//!
//! fn main() -> anyhow::Result<()> {
//!     let data = std::fs::read("Data/Korean/Stats.dat64")?;
//!     let table = Dat64Table::parse(&data)?;
//!
//!     for row in 0..table.row_count().max(0) {
//!         let offset = table.row_offset(row as usize, 48);
//!         if let Some(id) = table.read_string(table.read_value_at::<i64>(offset)?) {
//!             println!("{id}");
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod cursor;
pub mod dat64;
pub mod error;
pub mod source;
pub mod utils;

pub use cursor::ReadValue;
pub use dat64::{
    estimate_row_width, extract_rows, extract_table_bytes, korean_tables, row_width_for,
    save_json, Dat64Table, DatExtractor, FieldKind, FieldSchema, RowMapping, TableSchema,
    TableSpec, TranslationTables,
};
pub use error::{Error, Result};
pub use source::{DirSource, FileSource};
pub use utils::{collect_dat_files, create_glob_matcher, format_size, matches_filter};
