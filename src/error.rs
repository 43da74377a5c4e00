use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by browser operations.
///
/// Every variant is caught by the UI layer and shown either as a dialog,
/// a status-bar warning or an inline preview message. None of them ends
/// the program.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("'{}' is not a valid directory.", .0.display())]
    InvalidPath(PathBuf),

    #[error("'{}' already exists.", .0.display())]
    AlreadyExists(PathBuf),

    #[error("{0}")]
    InvalidName(&'static str),

    #[error("Invalid search pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("{op} failed: {source}")]
    Io {
        op: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("Could not read '{}': {source}", .path.display())]
    PreviewDecode {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BrowserError {
    /// Wrap an OS error with the name of the operation that produced it.
    ///
    /// `AlreadyExists` errors from the OS are promoted to the dedicated
    /// variant so callers can react to collisions without inspecting kinds.
    pub fn io(op: &'static str, path: &std::path::Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::AlreadyExists {
            return Self::AlreadyExists(path.to_path_buf());
        }
        Self::Io { op, source }
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists(_))
    }
}

pub type Result<T> = std::result::Result<T, BrowserError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_io_promotes_already_exists() {
        let err = BrowserError::io(
            "Create folder",
            Path::new("/tmp/x"),
            io::Error::new(io::ErrorKind::AlreadyExists, "exists"),
        );
        assert!(err.is_already_exists());
    }

    #[test]
    fn test_io_message_names_operation() {
        let err = BrowserError::io(
            "Delete",
            Path::new("/tmp/x"),
            io::Error::new(io::ErrorKind::PermissionDenied, "Permission denied"),
        );
        assert_eq!(err.to_string(), "Delete failed: Permission denied");
    }

    #[test]
    fn test_preview_decode_message() {
        let err = BrowserError::PreviewDecode {
            path: PathBuf::from("/tmp/x.txt"),
            source: io::Error::new(io::ErrorKind::InvalidData, "stream did not contain valid UTF-8"),
        };
        assert_eq!(
            err.to_string(),
            "Could not read '/tmp/x.txt': stream did not contain valid UTF-8"
        );
    }

    #[test]
    fn test_invalid_path_message() {
        let err = BrowserError::InvalidPath(PathBuf::from("/nope"));
        assert_eq!(err.to_string(), "'/nope' is not a valid directory.");
    }
}
