//! External file-provider boundary.
//!
//! Table bytes come from outside this crate (archive readers, bundle
//! indexes, loose dumps). Extractors consume only the narrow capability
//! below and never open archives themselves.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};

/// Supplies raw bytes for a virtual file path
pub trait FileSource {
    /// Raw bytes of the file at `virtual_path`, or `FileNotFound`
    fn file_bytes(&mut self, virtual_path: &str) -> Result<Vec<u8>>;
}

/// File source backed by a directory of loose files.
///
/// Resolves the full virtual path below the root first, then falls back to
/// the bare file name, so both a mirrored tree (`Data/Korean/Stats.dat64`)
/// and a flat dump directory work.
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirSource { root: root.into() }
    }

    fn candidates(&self, virtual_path: &str) -> Vec<PathBuf> {
        let mut paths = vec![self.root.join(virtual_path)];
        if let Some(file_name) = Path::new(virtual_path).file_name() {
            paths.push(self.root.join(file_name));
        }
        paths
    }
}

impl FileSource for DirSource {
    fn file_bytes(&mut self, virtual_path: &str) -> Result<Vec<u8>> {
        for path in self.candidates(virtual_path) {
            if path.is_file() {
                debug!(path = %path.display(), "reading table file");
                return Ok(fs::read(path)?);
            }
        }
        Err(Error::FileNotFound(virtual_path.to_string()))
    }
}
