//! Translation-table extraction: a generic row walker driven by per-table
//! configuration.
//!
//! The original per-table extraction duplicated one five-step loop with
//! different field offsets; here each table is a [`TableSpec`] declaration
//! over a single engine. A batch run never fails as a whole: an absent or
//! malformed table contributes an empty mapping and the rest proceed.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::dat64::reader::Dat64Table;
use crate::dat64::schema::TableSchema;
use crate::error::Result;
use crate::source::FileSource;

/// Merged extraction result: table name → (id → display string)
pub type TranslationTables = BTreeMap<String, BTreeMap<String, String>>;

/// Row-width estimates are trusted only inside this band (exclusive)
const ROW_WIDTH_MIN: usize = 8;
const ROW_WIDTH_MAX: usize = 1000;

/// How one row maps to an (id, display) entry.
///
/// The "first fields are id/name" convention lives here, per table, not in
/// the decoder.
#[derive(Debug, Clone)]
pub enum RowMapping {
    /// Id string offset plus display-name string offset
    IdAndName {
        id_offset: usize,
        name_offset: usize,
    },
    /// Id string offset only; the id doubles as the display value
    IdOnly { id_offset: usize },
    /// No usable name path: emit a `gem_{row}` placeholder carrying the raw
    /// reference value read at `key_offset`. Known limitation for tables
    /// whose display name sits behind an unresolved foreign key.
    SyntheticKey { key_offset: usize },
}

/// Per-table extraction configuration
#[derive(Debug, Clone)]
pub struct TableSpec {
    /// Key for this table in the merged output
    pub table_name: String,
    /// Virtual path handed to the file source
    pub path: String,
    pub mapping: RowMapping,
    /// Declared field layout, when one is known for the current game version
    pub schema: Option<TableSchema>,
    /// Row width used when neither schema nor estimation applies
    pub default_row_width: usize,
}

impl TableSpec {
    pub fn new(
        table_name: &str,
        path: &str,
        mapping: RowMapping,
        default_row_width: usize,
    ) -> Self {
        TableSpec {
            table_name: table_name.to_string(),
            path: path.to_string(),
            mapping,
            schema: None,
            default_row_width,
        }
    }

    pub fn with_schema(mut self, schema: TableSchema) -> Self {
        self.schema = Some(schema);
        self
    }
}

/// The five Korean translation tables covered by the batch export.
///
/// Field layouts drift across game versions, so none declares a schema; the
/// default widths are the last known-good values and estimation does the
/// rest.
pub fn korean_tables() -> Vec<TableSpec> {
    vec![
        TableSpec::new(
            "base_items",
            "Data/Korean/BaseItemTypes.dat64",
            RowMapping::IdAndName {
                id_offset: 0,
                name_offset: 8,
            },
            152,
        ),
        TableSpec::new(
            "active_skills",
            "Data/Korean/ActiveSkills.dat64",
            RowMapping::IdAndName {
                id_offset: 0,
                name_offset: 8,
            },
            120,
        ),
        TableSpec::new(
            "skill_gems",
            "Data/Korean/SkillGems.dat64",
            RowMapping::SyntheticKey { key_offset: 0 },
            80,
        ),
        TableSpec::new(
            "stats",
            "Data/Korean/Stats.dat64",
            RowMapping::IdOnly { id_offset: 0 },
            48,
        ),
        TableSpec::new(
            "passive_skills",
            "Data/Korean/PassiveSkills.dat64",
            RowMapping::IdAndName {
                id_offset: 0,
                name_offset: 8,
            },
            200,
        ),
    ]
}

/// Estimate the per-row byte width from the fixed-section length.
///
/// Skipped entirely for empty tables. The estimate is trusted only inside
/// the plausible band; anything else falls back to `default` with a warning.
pub fn estimate_row_width(table: &Dat64Table, default: usize) -> usize {
    let row_count = table.row_count();
    if row_count <= 0 {
        return default;
    }

    let estimate = table.fixed_data_size() / row_count as usize;
    if estimate > ROW_WIDTH_MIN && estimate < ROW_WIDTH_MAX {
        estimate
    } else {
        warn!(
            estimate,
            default, "row width estimate outside the plausible band"
        );
        default
    }
}

/// Pick the row width for a table: a declared schema whose width evenly
/// divides the fixed section wins, then the estimate, then the default.
pub fn row_width_for(table: &Dat64Table, spec: &TableSpec) -> usize {
    if let Some(schema) = &spec.schema {
        let width = schema.row_byte_width();
        if width > 0 && table.fixed_data_size() % width == 0 {
            return width;
        }
        warn!(
            table = %spec.table_name,
            schema_width = width,
            fixed_size = table.fixed_data_size(),
            "schema width does not divide the fixed section, estimating instead"
        );
    }
    estimate_row_width(table, spec.default_row_width)
}

/// Walk every row of a decoded table, collecting id → display entries.
///
/// A row whose id or required name is absent or empty is skipped; a row
/// whose reads go out of range is skipped with a warning. Production data is
/// known to contain the odd malformed row, so the loop always reaches the
/// next index.
pub fn extract_rows(table: &Dat64Table, spec: &TableSpec) -> BTreeMap<String, String> {
    let row_width = row_width_for(table, spec);
    let mut entries = BTreeMap::new();

    for row in 0..table.row_count().max(0) {
        let offset = table.row_offset(row as usize, row_width);
        match decode_row(table, offset, row as usize, &spec.mapping) {
            Ok(Some((id, display))) => {
                entries.insert(id, display);
            }
            Ok(None) => {}
            Err(err) => {
                warn!(table = %spec.table_name, row, %err, "skipping malformed row");
            }
        }
    }
    entries
}

fn decode_row(
    table: &Dat64Table,
    offset: usize,
    row: usize,
    mapping: &RowMapping,
) -> Result<Option<(String, String)>> {
    match mapping {
        RowMapping::IdAndName {
            id_offset,
            name_offset,
        } => {
            let id = table.read_string(table.read_value_at::<i64>(offset + id_offset)?);
            let name = table.read_string(table.read_value_at::<i64>(offset + name_offset)?);
            match (id, name) {
                (Some(id), Some(name)) if !id.is_empty() && !name.is_empty() => {
                    Ok(Some((id, name)))
                }
                _ => Ok(None),
            }
        }
        RowMapping::IdOnly { id_offset } => {
            match table.read_string(table.read_value_at::<i64>(offset + id_offset)?) {
                Some(id) if !id.is_empty() => Ok(Some((id.clone(), id))),
                _ => Ok(None),
            }
        }
        RowMapping::SyntheticKey { key_offset } => {
            let value = table.read_value_at::<i64>(offset + key_offset)?;
            Ok(Some((format!("gem_{row}"), format!("row_{value}"))))
        }
    }
}

/// Decode one table's bytes into its id → display mapping.
///
/// A parse failure yields an empty mapping; a batch run must never lose the
/// other tables to one bad file.
pub fn extract_table_bytes(data: &[u8], spec: &TableSpec) -> BTreeMap<String, String> {
    let table = match Dat64Table::parse(data) {
        Ok(table) => table,
        Err(err) => {
            warn!(table = %spec.table_name, %err, "failed to parse table");
            return BTreeMap::new();
        }
    };
    info!(table = %spec.table_name, rows = table.row_count(), "decoding table");
    extract_rows(&table, spec)
}

/// Extracts translation tables through a [`FileSource`]
pub struct DatExtractor<S> {
    source: S,
}

impl<S: FileSource> DatExtractor<S> {
    pub fn new(source: S) -> Self {
        DatExtractor { source }
    }

    /// Extract a single table; an absent or unreadable file degrades to an
    /// empty mapping
    pub fn extract_table(&mut self, spec: &TableSpec) -> BTreeMap<String, String> {
        match self.source.file_bytes(&spec.path) {
            Ok(data) => extract_table_bytes(&data, spec),
            Err(err) => {
                warn!(table = %spec.table_name, path = %spec.path, %err, "table unavailable");
                BTreeMap::new()
            }
        }
    }

    /// Extract every table in `specs`, keyed by table name.
    ///
    /// Buffers are fetched up front, then decoded in parallel; each table
    /// owns its bytes, so no locking is involved. Every spec appears in the
    /// output even when its table produced nothing.
    pub fn extract_tables(&mut self, specs: &[TableSpec]) -> TranslationTables {
        let buffers: Vec<Option<Vec<u8>>> = specs
            .iter()
            .map(|spec| match self.source.file_bytes(&spec.path) {
                Ok(data) => Some(data),
                Err(err) => {
                    warn!(table = %spec.table_name, path = %spec.path, %err, "table unavailable");
                    None
                }
            })
            .collect();

        specs
            .par_iter()
            .zip(buffers.into_par_iter())
            .map(|(spec, data)| {
                let entries = match data {
                    Some(data) => extract_table_bytes(&data, spec),
                    None => BTreeMap::new(),
                };
                (spec.table_name.clone(), entries)
            })
            .collect()
    }

    /// Extract the full Korean translation set ([`korean_tables`])
    pub fn extract_all(&mut self) -> TranslationTables {
        self.extract_tables(&korean_tables())
    }
}

/// Write a merged extraction result as one pretty-printed UTF-8 JSON object
pub fn save_json(tables: &TranslationTables, output: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(tables)?;
    fs::write(output, json)?;
    info!(path = %output.display(), "saved extraction artifact");
    Ok(())
}
