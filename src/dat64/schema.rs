//! Declarative field schemas for DAT64 tables

/// Field kinds that can appear in a DAT64 fixed-width row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    /// 8-byte heap offset of a UTF-16 string
    StringRef,
    /// 16-byte list header (count + heap offset)
    ListRef,
    /// 8-byte reference into another table
    ForeignKeyRef,
}

impl FieldKind {
    /// Size of the field within the fixed-width row
    pub fn byte_size(self) -> usize {
        match self {
            FieldKind::Bool | FieldKind::Int8 | FieldKind::UInt8 => 1,
            FieldKind::Int16 | FieldKind::UInt16 => 2,
            FieldKind::Int32 | FieldKind::UInt32 | FieldKind::Float32 => 4,
            FieldKind::Int64
            | FieldKind::UInt64
            | FieldKind::StringRef
            | FieldKind::ForeignKeyRef => 8,
            FieldKind::ListRef => 16,
        }
    }
}

/// A single named field within a row
#[derive(Debug, Clone)]
pub struct FieldSchema {
    pub name: String,
    pub kind: FieldKind,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        FieldSchema {
            name: name.into(),
            kind,
        }
    }
}

/// Ordered field list for one table.
///
/// Declarative only: extractors read fields at the offsets this computes,
/// the decoder itself stays schema-agnostic. Authoritative layouts are not
/// maintained for every game version, so a schema is optional everywhere it
/// is consumed.
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub name: String,
    pub fields: Vec<FieldSchema>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>, fields: Vec<FieldSchema>) -> Self {
        TableSchema {
            name: name.into(),
            fields,
        }
    }

    /// Total fixed-width row size in bytes
    pub fn row_byte_width(&self) -> usize {
        self.fields.iter().map(|field| field.kind.byte_size()).sum()
    }

    /// Byte offset of the named field within a row
    pub fn field_offset(&self, name: &str) -> Option<usize> {
        let mut offset = 0;
        for field in &self.fields {
            if field.name == name {
                return Some(offset);
            }
            offset += field.kind.byte_size();
        }
        None
    }
}
