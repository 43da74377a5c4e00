use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BrowserError, Result};

/// Maximum filename length (POSIX limit)
const MAX_FILENAME_LENGTH: usize = 255;

/// Validate a single path component typed by the user
pub fn is_valid_filename(name: &str) -> std::result::Result<(), &'static str> {
    if name.is_empty() || name.trim().is_empty() {
        return Err("Name cannot be empty");
    }

    // Check for path separators
    if name.contains('/') || name.contains('\\') {
        return Err("Name cannot contain path separators");
    }

    // Check for null bytes
    if name.contains('\0') {
        return Err("Name cannot contain null bytes");
    }

    // Check for reserved names
    if name == "." || name == ".." {
        return Err("Invalid name");
    }

    // Check length limit
    if name.len() > MAX_FILENAME_LENGTH {
        return Err("Name too long (max 255 characters)");
    }

    // Check for control characters
    if name.chars().any(|c| c.is_control()) {
        return Err("Name cannot contain control characters");
    }

    Ok(())
}

/// Create `name` inside `parent`. Fails with `AlreadyExists` when any entry
/// of that name is already present.
pub fn create_directory(parent: &Path, name: &str) -> Result<PathBuf> {
    is_valid_filename(name).map_err(BrowserError::InvalidName)?;

    let path = parent.join(name);
    if fs::symlink_metadata(&path).is_ok() {
        return Err(BrowserError::AlreadyExists(path));
    }

    fs::create_dir(&path).map_err(|e| BrowserError::io("Create folder", &path, e))?;
    tracing::info!(path = %path.display(), "created directory");
    Ok(path)
}

/// Delete a file or directory
pub fn delete_entry(path: &Path) -> Result<()> {
    // Use symlink_metadata to check if it's a symlink
    let metadata = fs::symlink_metadata(path).map_err(|e| BrowserError::io("Delete", path, e))?;

    let result = if metadata.is_symlink() {
        // Just remove the symlink itself, don't follow it
        fs::remove_file(path)
    } else if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };

    result.map_err(|e| BrowserError::io("Delete", path, e))?;
    tracing::info!(path = %path.display(), "deleted");
    Ok(())
}

/// Rename `path` to `new_name` within the same directory.
///
/// Returns `Ok(None)` when there is nothing to do (empty or unchanged name)
/// and `Ok(Some(new_path))` after a successful rename. Existing targets are
/// never overwritten.
pub fn rename_entry(path: &Path, new_name: &str) -> Result<Option<PathBuf>> {
    let old_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    if new_name.is_empty() || new_name == old_name {
        return Ok(None);
    }
    is_valid_filename(new_name).map_err(BrowserError::InvalidName)?;

    let new_path = path
        .parent()
        .map(|p| p.join(new_name))
        .unwrap_or_else(|| PathBuf::from(new_name));

    if fs::symlink_metadata(&new_path).is_ok() {
        return Err(BrowserError::AlreadyExists(new_path));
    }

    fs::rename(path, &new_path).map_err(|e| BrowserError::io("Rename", &new_path, e))?;
    tracing::info!(from = %path.display(), to = %new_path.display(), "renamed");
    Ok(Some(new_path))
}

/// Hand a file to the platform's default application without waiting for it.
pub fn open_with_default(path: &Path) -> Result<()> {
    open::that_detached(path).map_err(|e| BrowserError::io("Open", path, e))?;
    tracing::info!(path = %path.display(), "opened with default application");
    Ok(())
}
