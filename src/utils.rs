//! General utility functions for undat64
//!
//! This module contains common helper functions used across the library.

use anyhow::{Context, Result};
use globset::{Glob, GlobMatcher};
use std::fs;
use std::path::{Path, PathBuf};

/// Format a file size in human-readable form (B, KB, MB, GB)
pub fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} B", size)
    }
}

/// Create a glob matcher from a pattern string
///
/// `*.ext` matches in any directory; plain text without wildcards becomes a
/// substring search.
pub fn create_glob_matcher(pattern: &str) -> Result<GlobMatcher> {
    let pattern = if pattern.starts_with("*.") {
        format!("**/{}", pattern)
    } else if !pattern.contains('*') && !pattern.contains('?') {
        format!("**/*{}*", pattern)
    } else {
        pattern.to_string()
    };

    let glob = Glob::new(&pattern).with_context(|| format!("Invalid pattern: {}", pattern))?;
    Ok(glob.compile_matcher())
}

/// Check if a name matches the optional filter
pub fn matches_filter(name: &str, matcher: Option<&GlobMatcher>) -> bool {
    match matcher {
        Some(m) => m.is_match(name),
        None => true,
    }
}

/// Recursively collect every `.dat64` file under `dir`, sorted by path
pub fn collect_dat_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_dat_files_recursive(dir, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_dat_files_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    if !dir.is_dir() {
        return Ok(());
    }
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))? {
        let path = entry?.path();
        if path.is_dir() {
            collect_dat_files_recursive(&path, files)?;
        } else if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("dat64"))
        {
            files.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
        assert_eq!(format_size(5 * 1024 * 1024 * 1024), "5.00 GB");
    }

    #[test]
    fn test_glob_matcher_patterns() {
        let m = create_glob_matcher("*.dat64").unwrap();
        assert!(m.is_match("Data/Korean/Stats.dat64"));
        assert!(!m.is_match("Data/Korean/Stats.dat"));

        let m = create_glob_matcher("Korean").unwrap();
        assert!(m.is_match("Data/Korean/Stats.dat64"));
        assert!(!m.is_match("Data/English/Stats.dat64"));
    }

    #[test]
    fn test_collect_dat_files_filters_and_sorts() {
        let root = std::env::temp_dir().join(format!("undat64-collect-{}", std::process::id()));
        fs::create_dir_all(root.join("Korean")).unwrap();
        fs::write(root.join("Korean/Stats.dat64"), b"").unwrap();
        fs::write(root.join("Korean/ActiveSkills.dat64"), b"").unwrap();
        fs::write(root.join("readme.txt"), b"").unwrap();

        let files = collect_dat_files(&root).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["ActiveSkills.dat64", "Stats.dat64"]);

        fs::remove_dir_all(&root).ok();
    }
}
