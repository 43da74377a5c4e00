use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::error::{BrowserError, Result};
use crate::utils::format::format_timestamp;

/// Bytes sniffed to decide text vs. binary.
pub const SNIFF_BLOCK_SIZE: usize = 512;
/// Characters shown for a text file.
pub const MAX_PREVIEW_CHARS: usize = 10_000;
/// Upper bound on bytes needed for `MAX_PREVIEW_CHARS` UTF-8 characters.
const MAX_PREVIEW_BYTES: u64 = (MAX_PREVIEW_CHARS * 4) as u64;

/// What the preview pane shows for the current selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Preview {
    #[default]
    Empty,
    Directory { path: PathBuf, items: usize },
    Text { path: PathBuf, content: String },
    Binary { path: PathBuf, size: u64 },
    Error { message: String },
}

impl Preview {
    /// Plain-text rendering of the pane contents.
    pub fn body(&self) -> String {
        match self {
            Preview::Empty => String::new(),
            Preview::Directory { path, items } => {
                format!("Directory: {}\n\nItems: {}", path.display(), items)
            }
            Preview::Text { content, .. } => content.clone(),
            Preview::Binary { path, size } => format!(
                "File: {}\nSize: {} bytes\n\n(Preview not available for binary files.)",
                path.display(),
                size
            ),
            Preview::Error { message } => format!("Could not preview file:\n{}", message),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Preview::Empty => " Preview ",
            Preview::Directory { .. } => " Folder ",
            Preview::Text { .. } => " Text ",
            Preview::Binary { .. } => " Binary ",
            Preview::Error { .. } => " Preview error ",
        }
    }
}

/// Classify a sniffed block: any NUL byte means binary, otherwise it must be
/// valid UTF-8. A sequence cut off by the end of a full block is accepted
/// since the cut comes from the sniff window, not from the file.
pub fn looks_like_text(block: &[u8], block_was_full: bool) -> bool {
    if block.contains(&0) {
        return false;
    }
    match std::str::from_utf8(block) {
        Ok(_) => true,
        Err(e) => block_was_full && e.error_len().is_none(),
    }
}

/// Sniff the first `SNIFF_BLOCK_SIZE` bytes of `path`. Files that cannot be
/// opened are reported as not text.
pub fn is_text_file(path: &Path) -> bool {
    let Ok(file) = File::open(path) else {
        return false;
    };
    let mut block = Vec::with_capacity(SNIFF_BLOCK_SIZE);
    if file.take(SNIFF_BLOCK_SIZE as u64).read_to_end(&mut block).is_err() {
        return false;
    }
    looks_like_text(&block, block.len() == SNIFF_BLOCK_SIZE)
}

/// First `MAX_PREVIEW_CHARS` characters of `path`, invalid UTF-8 replaced.
pub fn read_text_preview(path: &Path) -> io::Result<String> {
    let mut bytes = Vec::new();
    File::open(path)?.take(MAX_PREVIEW_BYTES).read_to_end(&mut bytes)?;
    let decoded = String::from_utf8_lossy(&bytes);
    Ok(decoded.chars().take(MAX_PREVIEW_CHARS).collect())
}

fn preview_directory(path: &Path) -> Result<Preview> {
    let items = fs::read_dir(path)
        .map_err(|e| BrowserError::io("List folder", path, e))?
        .count();
    Ok(Preview::Directory {
        path: path.to_path_buf(),
        items,
    })
}

fn preview_file(path: &Path) -> Result<Preview> {
    let metadata =
        fs::metadata(path).map_err(|e| BrowserError::io("Read file information", path, e))?;
    // Pipes, sockets and devices can block on open; never read them
    if !metadata.is_file() {
        return Ok(Preview::Binary {
            path: path.to_path_buf(),
            size: metadata.len(),
        });
    }
    if is_text_file(path) {
        let content = read_text_preview(path).map_err(|source| BrowserError::PreviewDecode {
            path: path.to_path_buf(),
            source,
        })?;
        return Ok(Preview::Text {
            path: path.to_path_buf(),
            content,
        });
    }
    Ok(Preview::Binary {
        path: path.to_path_buf(),
        size: metadata.len(),
    })
}

/// Build the preview for `path`. Failures become `Preview::Error`.
pub fn build_preview(path: &Path) -> Preview {
    let result = if path.is_dir() {
        preview_directory(path)
    } else {
        preview_file(path)
    };
    result.unwrap_or_else(|e| {
        tracing::debug!(path = %path.display(), error = %e, "preview failed");
        Preview::Error {
            message: e.to_string(),
        }
    })
}

/// Summary shown by the Properties dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Properties {
    pub path: PathBuf,
    pub is_directory: bool,
    pub size: Option<u64>,
    pub modified: Option<DateTime<Local>>,
}

impl Properties {
    pub fn read(path: &Path) -> Self {
        let metadata = fs::metadata(path).ok();
        let is_directory = metadata.as_ref().map(|m| m.is_dir()).unwrap_or(false);
        Self {
            path: path.to_path_buf(),
            is_directory,
            size: metadata
                .as_ref()
                .filter(|m| m.is_file())
                .map(|m| m.len()),
            modified: metadata
                .as_ref()
                .and_then(|m| m.modified().ok())
                .map(DateTime::<Local>::from),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Path: {}", self.path.display()),
            format!("Type: {}", if self.is_directory { "Directory" } else { "File" }),
        ];
        if let Some(size) = self.size {
            lines.push(format!("Size: {} bytes", size));
        }
        if let Some(modified) = &self.modified {
            lines.push(format!("Last Modified: {}", format_timestamp(modified)));
        }
        lines
    }
}
