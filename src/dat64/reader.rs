//! DAT64 table reader: section layout and heap-resident value access

use tracing::debug;

use crate::cursor::ReadValue;
use crate::error::{Error, Result};

/// Byte offset of the first fixed-width row; the row count precedes it
const FIXED_DATA_START: usize = 4;

/// Marker separating the fixed section from the variable-data heap
const VARIABLE_DATA_MARKER: [u8; 8] = [0xBB; 8];

/// A parsed DAT64 table.
///
/// Owns its buffer and is immutable after [`parse`](Dat64Table::parse);
/// independent tables can therefore be decoded on independent threads.
#[derive(Debug)]
pub struct Dat64Table {
    data: Vec<u8>,
    row_count: i32,
    variable_data_start: usize,
}

impl Dat64Table {
    /// Parse a DAT64 buffer.
    ///
    /// Fails only when the buffer cannot hold the 4-byte row count. The row
    /// count itself is not validated against the buffer size; a negative or
    /// absurd value surfaces later as empty iteration or per-row range
    /// errors, never a crash. When no sentinel run exists the heap start is
    /// the buffer length and every heap lookup resolves to absent.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < FIXED_DATA_START {
            return Err(Error::InvalidHeader(format!(
                "need {} bytes for the row count, got {}",
                FIXED_DATA_START,
                data.len()
            )));
        }

        let row_count = i32::read_at(data, 0)?;
        let variable_data_start = find_variable_data_marker(data);
        debug!(
            rows = row_count,
            heap_start = variable_data_start,
            len = data.len(),
            "parsed table"
        );

        Ok(Dat64Table {
            data: data.to_vec(),
            row_count,
            variable_data_start,
        })
    }

    /// Number of rows claimed by the header
    pub fn row_count(&self) -> i32 {
        self.row_count
    }

    /// Byte offset of the variable-data heap (just past the sentinel)
    pub fn variable_data_start(&self) -> usize {
        self.variable_data_start
    }

    /// Length of the fixed section, excluding the 8-byte sentinel.
    ///
    /// Only meaningful for row-width estimation.
    pub fn fixed_data_size(&self) -> usize {
        self.variable_data_start
            .saturating_sub(FIXED_DATA_START + VARIABLE_DATA_MARKER.len())
    }

    /// Byte offset of a row within the fixed section.
    ///
    /// Pure arithmetic; the caller keeps `row_index` inside `0..row_count`
    /// and the resulting reads inside the fixed section.
    pub fn row_offset(&self, row_index: usize, row_width: usize) -> usize {
        FIXED_DATA_START + row_index * row_width
    }

    /// Read a primitive value at an absolute buffer offset
    pub fn read_value_at<T: ReadValue>(&self, offset: usize) -> Result<T> {
        T::read_at(&self.data, offset)
    }

    /// Resolve a heap-relative offset to an absolute buffer offset.
    ///
    /// Offsets landing anywhere inside the buffer resolve, including
    /// (negative) ones pointing before the heap; only out-of-buffer targets
    /// are absent.
    fn heap_offset(&self, relative_offset: i64) -> Option<usize> {
        let absolute = self.variable_data_start as i64 + relative_offset;
        if absolute < 0 || absolute as usize >= self.data.len() {
            return None;
        }
        Some(absolute as usize)
    }

    /// Read a UTF-16LE string from the heap.
    ///
    /// An offset of exactly 0 means absent, as does any offset outside the
    /// buffer. The string runs to the first two-byte zero pair or the end of
    /// the buffer; empty strings are valid.
    pub fn read_string(&self, relative_offset: i64) -> Option<String> {
        if relative_offset == 0 {
            return None;
        }
        let start = self.heap_offset(relative_offset)?;

        let mut end = start;
        while end + 2 <= self.data.len() && (self.data[end] != 0 || self.data[end + 1] != 0) {
            end += 2;
        }

        let units: Vec<u16> = self.data[start..end]
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Some(String::from_utf16_lossy(&units))
    }

    /// Read a 16-byte list header (element count, heap offset) at a
    /// fixed-row field offset
    pub fn read_list_header(&self, offset: usize) -> Result<(i64, i64)> {
        let count = self.read_value_at::<i64>(offset)?;
        let list_offset = self.read_value_at::<i64>(offset + 8)?;
        Ok((count, list_offset))
    }

    /// Read a list of strings described at a fixed-row field offset.
    ///
    /// Each element is an 8-byte heap offset resolved like a single string.
    /// Absent elements are skipped; an element slot past the buffer end
    /// stops the walk, since every later slot of the contiguous array is out
    /// of range too. A zero count returns empty without touching the heap.
    pub fn read_string_list(&self, offset: usize) -> Result<Vec<String>> {
        let (count, list_offset) = self.read_list_header(offset)?;
        let mut items = Vec::new();
        if count <= 0 {
            return Ok(items);
        }

        let Some(base) = self.heap_offset(list_offset) else {
            return Ok(items);
        };
        for i in 0..count as usize {
            let element = match self.read_value_at::<i64>(base + i * 8) {
                Ok(element) => element,
                Err(_) => break,
            };
            if let Some(text) = self.read_string(element) {
                items.push(text);
            }
        }
        Ok(items)
    }
}

/// Position just past the first run of eight `0xBB` bytes at or after the
/// fixed section start, or the buffer length when no run exists
fn find_variable_data_marker(data: &[u8]) -> usize {
    data[FIXED_DATA_START..]
        .windows(VARIABLE_DATA_MARKER.len())
        .position(|window| window == VARIABLE_DATA_MARKER)
        .map(|pos| FIXED_DATA_START + pos + VARIABLE_DATA_MARKER.len())
        .unwrap_or(data.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16(text: &str) -> Vec<u8> {
        let mut bytes: Vec<u8> = text.encode_utf16().flat_map(|u| u.to_le_bytes()).collect();
        bytes.extend([0, 0]);
        bytes
    }

    fn table(row_count: i32, fixed: &[u8], heap: &[u8]) -> Vec<u8> {
        let mut buf = row_count.to_le_bytes().to_vec();
        buf.extend_from_slice(fixed);
        buf.extend_from_slice(&VARIABLE_DATA_MARKER);
        buf.extend_from_slice(heap);
        buf
    }

    #[test]
    fn test_parse_rejects_short_buffer() {
        for len in 0..4 {
            let err = Dat64Table::parse(&vec![0u8; len]).unwrap_err();
            assert!(matches!(err, Error::InvalidHeader(_)), "len {len}: {err:?}");
        }
        assert!(Dat64Table::parse(&[0u8; 4]).is_ok());
    }

    #[test]
    fn test_marker_position() {
        let buf = table(1, &[1, 2, 3, 4, 5, 6, 7, 8], &[9, 9]);
        let t = Dat64Table::parse(&buf).unwrap();
        assert_eq!(t.variable_data_start(), 4 + 8 + 8);
        assert_eq!(t.fixed_data_size(), 8);
    }

    #[test]
    fn test_marker_earliest_run_wins() {
        let mut buf = table(1, &[0u8; 8], &[0u8; 4]);
        buf.extend_from_slice(&VARIABLE_DATA_MARKER);
        let t = Dat64Table::parse(&buf).unwrap();
        assert_eq!(t.variable_data_start(), 4 + 8 + 8);
    }

    #[test]
    fn test_missing_marker_means_no_heap() {
        let buf = [3i32.to_le_bytes().to_vec(), vec![0u8; 16]].concat();
        let t = Dat64Table::parse(&buf).unwrap();
        assert_eq!(t.variable_data_start(), buf.len());
        assert_eq!(t.read_string(4), None);
        assert_eq!(t.read_string_list(4).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_negative_row_count_tolerated() {
        let buf = table(-7, &[], &[]);
        let t = Dat64Table::parse(&buf).unwrap();
        assert_eq!(t.row_count(), -7);
    }

    #[test]
    fn test_read_string_roundtrip() {
        // Offset 0 is reserved for "absent", so the heap leads with an
        // empty-string slot.
        let mut heap = utf16("");
        let ascii_at = heap.len() as i64;
        heap.extend(utf16("x"));
        let korean_at = heap.len() as i64;
        heap.extend(utf16("한국어 이름"));

        let buf = table(0, &[], &heap);
        let t = Dat64Table::parse(&buf).unwrap();

        assert_eq!(t.read_string(ascii_at).unwrap(), "x");
        assert_eq!(t.read_string(korean_at).unwrap(), "한국어 이름");

        // Empty string stored mid-heap, reachable through a nonzero offset.
        let mut heap2 = utf16("a");
        let empty_at = heap2.len() as i64;
        heap2.extend(utf16(""));
        let buf2 = table(0, &[], &heap2);
        let t2 = Dat64Table::parse(&buf2).unwrap();
        assert_eq!(t2.read_string(empty_at).unwrap(), "");
    }

    #[test]
    fn test_read_string_zero_offset_is_absent() {
        let buf = table(0, &[], &utf16("text"));
        let t = Dat64Table::parse(&buf).unwrap();
        assert_eq!(t.read_string(0), None);
    }

    #[test]
    fn test_read_string_out_of_buffer_is_absent() {
        let buf = table(0, &[], &utf16("text"));
        let t = Dat64Table::parse(&buf).unwrap();
        assert_eq!(t.read_string(10_000), None);
        assert_eq!(t.read_string(-(buf.len() as i64) - 1), None);
    }

    #[test]
    fn test_read_string_unterminated_runs_to_buffer_end() {
        let mut heap = utf16("");
        let at = heap.len() as i64;
        heap.extend("ab".encode_utf16().flat_map(|u| u.to_le_bytes()));
        let buf = table(0, &[], &heap);
        let t = Dat64Table::parse(&buf).unwrap();
        assert_eq!(t.read_string(at).unwrap(), "ab");
    }

    #[test]
    fn test_read_string_list() {
        let mut heap = utf16("");
        let first = heap.len() as i64;
        heap.extend(utf16("one"));
        let second = heap.len() as i64;
        heap.extend(utf16("two"));

        // Element array: second string, an absent slot, first string.
        let array_at = heap.len() as i64;
        for element in [second, 0, first] {
            heap.extend(element.to_le_bytes());
        }

        let mut fixed = Vec::new();
        fixed.extend(3i64.to_le_bytes());
        fixed.extend(array_at.to_le_bytes());

        let buf = table(1, &fixed, &heap);
        let t = Dat64Table::parse(&buf).unwrap();
        assert_eq!(t.read_string_list(4).unwrap(), vec!["two", "one"]);
        assert_eq!(t.read_list_header(4).unwrap(), (3, array_at));
    }

    #[test]
    fn test_read_string_list_zero_count_skips_heap() {
        let mut fixed = Vec::new();
        fixed.extend(0i64.to_le_bytes());
        fixed.extend(9_999_999i64.to_le_bytes());
        let buf = table(1, &fixed, &[]);
        let t = Dat64Table::parse(&buf).unwrap();
        assert_eq!(t.read_string_list(4).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_read_string_list_stops_at_buffer_end() {
        let mut heap = utf16("");
        let first = heap.len() as i64;
        heap.extend(utf16("only"));
        let array_at = heap.len() as i64;
        heap.extend(first.to_le_bytes());

        // Claims four elements; only one slot exists.
        let mut fixed = Vec::new();
        fixed.extend(4i64.to_le_bytes());
        fixed.extend(array_at.to_le_bytes());

        let buf = table(1, &fixed, &heap);
        let t = Dat64Table::parse(&buf).unwrap();
        assert_eq!(t.read_string_list(4).unwrap(), vec!["only"]);
    }

    #[test]
    fn test_row_offset_arithmetic() {
        let buf = table(2, &[0u8; 32], &[]);
        let t = Dat64Table::parse(&buf).unwrap();
        assert_eq!(t.row_offset(0, 16), 4);
        assert_eq!(t.row_offset(1, 16), 20);
        assert_eq!(t.row_offset(3, 152), 4 + 3 * 152);
    }

    #[test]
    fn test_read_value_at_out_of_range() {
        let buf = table(1, &[0u8; 8], &[]);
        let t = Dat64Table::parse(&buf).unwrap();
        assert!(t.read_value_at::<i64>(4).is_ok());
        assert!(t.read_value_at::<i64>(buf.len()).is_err());
    }
}
