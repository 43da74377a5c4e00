use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::{BrowserError, Result};

/// Listing column used for ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Name,
    Size,
    Type,
    Modified,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [SortKey::Name, SortKey::Size, SortKey::Type, SortKey::Modified];

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Name => "Name",
            SortKey::Size => "Size",
            SortKey::Type => "Type",
            SortKey::Modified => "Date Modified",
        }
    }

    /// Next key in selector order, wrapping around.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|k| *k == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

/// One row of the listing, read live from the filesystem.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_directory: bool,
    pub is_symlink: bool,
    /// Zero for directories.
    pub size: u64,
    pub modified: DateTime<Local>,
}

impl DirectoryEntry {
    pub fn from_path(path: &Path) -> Result<Self> {
        let link_meta = fs::symlink_metadata(path)
            .map_err(|e| BrowserError::io("Read metadata", path, e))?;
        // Follow symlinks for type/size, fall back to the link itself when dangling.
        let metadata = fs::metadata(path).unwrap_or_else(|_| link_meta.clone());
        let is_directory = metadata.is_dir();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let modified = metadata
            .modified()
            .ok()
            .map(DateTime::<Local>::from)
            .unwrap_or_else(Local::now);

        Ok(Self {
            name,
            path: path.to_path_buf(),
            is_directory,
            is_symlink: link_meta.file_type().is_symlink(),
            size: if is_directory { 0 } else { metadata.len() },
            modified,
        })
    }

    /// Lower-cased extension, or "folder" for directories.
    pub fn type_label(&self) -> String {
        if self.is_directory {
            return "folder".to_string();
        }
        Path::new(&self.name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    }

    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('.')
    }
}

/// Enumerate `dir` without sorting. Entries whose metadata cannot be read
/// are skipped; failing to open the directory itself is an error.
pub fn read_entries(dir: &Path, show_hidden: bool) -> Result<Vec<DirectoryEntry>> {
    let read_dir = fs::read_dir(dir).map_err(|e| BrowserError::io("List directory", dir, e))?;

    let entries: Vec<DirectoryEntry> = read_dir
        .filter_map(|e| e.ok())
        .filter_map(|entry| DirectoryEntry::from_path(&entry.path()).ok())
        .filter(|entry| show_hidden || !entry.is_hidden())
        .collect();

    tracing::debug!(dir = %dir.display(), count = entries.len(), "listed directory");
    Ok(entries)
}

/// Directories first, then by `key`. The sort is stable, so entries that
/// compare equal keep the order the filesystem returned them in.
pub fn sort_entries(entries: &mut [DirectoryEntry], key: SortKey) {
    entries.sort_by(|a, b| {
        match (a.is_directory, b.is_directory) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => {}
        }
        match key {
            SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortKey::Size => a.size.cmp(&b.size),
            SortKey::Type => a.type_label().cmp(&b.type_label()),
            SortKey::Modified => a.modified.cmp(&b.modified),
        }
    });
}

pub fn list_directory(dir: &Path, key: SortKey, show_hidden: bool) -> Result<Vec<DirectoryEntry>> {
    let mut entries = read_entries(dir, show_hidden)?;
    sort_entries(&mut entries, key);
    Ok(entries)
}

/// Immediate subdirectories of `dir`, sorted by name, for the tree pane.
pub fn list_subdirectories(dir: &Path, show_hidden: bool) -> Vec<PathBuf> {
    let Ok(read_dir) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut dirs: Vec<PathBuf> = read_dir
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .filter(|p| {
            show_hidden
                || !p
                    .file_name()
                    .map(|n| n.to_string_lossy().starts_with('.'))
                    .unwrap_or(false)
        })
        .collect();
    dirs.sort_by_key(|p| {
        p.file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    });
    dirs
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn entry(name: &str, is_directory: bool, size: u64) -> DirectoryEntry {
        DirectoryEntry {
            name: name.to_string(),
            path: PathBuf::from("/x").join(name),
            is_directory,
            is_symlink: false,
            size,
            modified: Local::now(),
        }
    }

    fn names(entries: &[DirectoryEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_list_directory_reads_metadata() {
        let temp = TempDir::new().unwrap();
        let mut file = File::create(temp.path().join("a.txt")).unwrap();
        file.write_all(b"hello").unwrap();
        fs::create_dir(temp.path().join("sub")).unwrap();

        let entries = list_directory(temp.path(), SortKey::Name, true).unwrap();
        assert_eq!(names(&entries), vec!["sub", "a.txt"]);
        assert!(entries[0].is_directory);
        assert_eq!(entries[0].size, 0);
        assert_eq!(entries[1].size, 5);
        assert_eq!(entries[1].path, temp.path().join("a.txt"));
    }

    #[test]
    fn test_list_directory_missing_is_error() {
        let temp = TempDir::new().unwrap();
        let result = list_directory(&temp.path().join("missing"), SortKey::Name, true);
        assert!(matches!(result, Err(BrowserError::Io { .. })));
    }

    #[test]
    fn test_hidden_entries_filtered() {
        let temp = TempDir::new().unwrap();
        File::create(temp.path().join(".secret")).unwrap();
        File::create(temp.path().join("visible")).unwrap();

        let shown = list_directory(temp.path(), SortKey::Name, true).unwrap();
        assert_eq!(shown.len(), 2);
        let hidden = list_directory(temp.path(), SortKey::Name, false).unwrap();
        assert_eq!(names(&hidden), vec!["visible"]);
    }

    #[test]
    fn test_sort_by_name_case_insensitive() {
        let mut entries = vec![entry("beta", false, 0), entry("Alpha", false, 0), entry("zdir", true, 0)];
        sort_entries(&mut entries, SortKey::Name);
        assert_eq!(names(&entries), vec!["zdir", "Alpha", "beta"]);
    }

    #[test]
    fn test_sort_by_size_is_stable_on_ties() {
        let mut entries = vec![
            entry("c", false, 10),
            entry("a", false, 5),
            entry("b", false, 10),
            entry("d", false, 5),
        ];
        sort_entries(&mut entries, SortKey::Size);
        assert_eq!(names(&entries), vec!["a", "d", "c", "b"]);
    }

    #[test]
    fn test_sort_by_type() {
        let mut entries = vec![entry("x.txt", false, 0), entry("y.csv", false, 0), entry("noext", false, 0)];
        sort_entries(&mut entries, SortKey::Type);
        assert_eq!(names(&entries), vec!["noext", "y.csv", "x.txt"]);
    }

    #[test]
    fn test_sort_key_cycles() {
        assert_eq!(SortKey::Name.next(), SortKey::Size);
        assert_eq!(SortKey::Modified.next(), SortKey::Name);
    }

    #[test]
    fn test_list_subdirectories_only_dirs() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("B")).unwrap();
        fs::create_dir(temp.path().join("a")).unwrap();
        File::create(temp.path().join("file")).unwrap();

        let dirs = list_subdirectories(temp.path(), true);
        assert_eq!(dirs, vec![temp.path().join("a"), temp.path().join("B")]);
    }
}
