//! DAT64 binary table parser
//!
//! DAT64 is the binary table format Path of Exile uses for game data, a
//! 64-bit-offset variant of the older `.dat` layout. Files with the `.dat64`
//! extension hold one table each.
//!
//! ## Format Overview
//!
//! A DAT64 file consists of:
//! - Row count (first 4 bytes, little-endian `i32`)
//! - Fixed section: one fixed-width record per row
//! - Sentinel marker: 8 consecutive `0xBB` bytes
//! - Variable-data heap: string and list payloads, addressed by offsets
//!   relative to the byte after the sentinel
//!
//! Strings are UTF-16LE with a two-byte zero terminator. A heap offset of 0
//! means "absent", not the heap start. Lists are described in the fixed row
//! by a 16-byte header (element count + heap offset of the element array).
//!
//! ## Example
//!
//! ```rust,no_run
//! use undat64::Dat64Table;
//!
//! let data = std::fs::read("Stats.dat64")?;
//! let table = Dat64Table::parse(&data)?;
//!
//! println!("{} rows, heap at {}", table.row_count(), table.variable_data_start());
//! # Ok::<(), anyhow::Error>(())
//! ```

mod extract;
mod reader;
mod schema;

pub use extract::{
    estimate_row_width, extract_rows, extract_table_bytes, korean_tables, row_width_for,
    save_json, DatExtractor, RowMapping, TableSpec, TranslationTables,
};
pub use reader::Dat64Table;
pub use schema::{FieldKind, FieldSchema, TableSchema};
