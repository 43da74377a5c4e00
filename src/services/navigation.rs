use std::path::{Path, PathBuf};

use crate::error::{BrowserError, Result};

/// Current directory plus the back-history stack.
///
/// History is only pushed by the forward-navigation entry points
/// (`navigate_forward`, `go_up`); `go_back` pops without re-pushing.
#[derive(Debug, Clone)]
pub struct Navigator {
    current: PathBuf,
    history: Vec<PathBuf>,
}

impl Navigator {
    pub fn new(start: PathBuf) -> Self {
        Self {
            current: start,
            history: Vec::new(),
        }
    }

    pub fn current(&self) -> &Path {
        &self.current
    }

    pub fn history(&self) -> &[PathBuf] {
        &self.history
    }

    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty()
    }

    /// Switch to `path` if it is an existing directory. State is left
    /// untouched otherwise.
    pub fn change_directory(&mut self, path: &Path) -> Result<()> {
        if !path.is_dir() {
            return Err(BrowserError::InvalidPath(path.to_path_buf()));
        }
        self.current = path.to_path_buf();
        tracing::info!(path = %self.current.display(), "changed directory");
        Ok(())
    }

    pub fn push_history(&mut self) {
        self.history.push(self.current.clone());
    }

    /// Push the current directory, then change to `path`. Nothing is pushed
    /// when `path` is not a valid target.
    pub fn navigate_forward(&mut self, path: &Path) -> Result<()> {
        if !path.is_dir() {
            return Err(BrowserError::InvalidPath(path.to_path_buf()));
        }
        self.push_history();
        self.change_directory(path)
    }

    /// Pop the last visited directory and go there. Returns `false` when the
    /// history is empty or the popped directory no longer exists.
    pub fn go_back(&mut self) -> bool {
        let Some(prev) = self.history.pop() else {
            return false;
        };
        self.change_directory(&prev).is_ok()
    }

    /// Move to the parent directory, recording the current one in history.
    pub fn go_up(&mut self) -> bool {
        let Some(parent) = self.current.parent().map(Path::to_path_buf) else {
            return false;
        };
        if parent.as_os_str().is_empty() || parent == self.current || !parent.is_dir() {
            return false;
        }
        self.navigate_forward(&parent).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tree() -> (TempDir, PathBuf, PathBuf, PathBuf) {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a");
        let b = a.join("b");
        let c = b.join("c");
        fs::create_dir_all(&c).unwrap();
        (temp, a, b, c)
    }

    #[test]
    fn test_change_directory_invalid_is_noop() {
        let (temp, a, _, _) = tree();
        let mut nav = Navigator::new(a.clone());

        let missing = temp.path().join("missing");
        assert!(matches!(nav.change_directory(&missing), Err(BrowserError::InvalidPath(_))));
        assert_eq!(nav.current(), a.as_path());

        let file = temp.path().join("file.txt");
        fs::write(&file, "x").unwrap();
        assert!(nav.change_directory(&file).is_err());
        assert_eq!(nav.current(), a.as_path());
        assert!(nav.history().is_empty());
    }

    #[test]
    fn test_forward_then_back_returns_to_start() {
        let (_temp, a, b, c) = tree();
        let mut nav = Navigator::new(a.clone());

        nav.navigate_forward(&b).unwrap();
        nav.navigate_forward(&c).unwrap();
        assert_eq!(nav.current(), c.as_path());

        assert!(nav.go_back());
        assert_eq!(nav.current(), b.as_path());
        assert!(nav.go_back());
        assert_eq!(nav.current(), a.as_path());
        assert!(!nav.go_back());
        assert_eq!(nav.current(), a.as_path());
    }

    #[test]
    fn test_go_back_does_not_push() {
        let (_temp, a, b, _) = tree();
        let mut nav = Navigator::new(a);
        nav.navigate_forward(&b).unwrap();
        assert_eq!(nav.history().len(), 1);
        nav.go_back();
        assert!(nav.history().is_empty());
    }

    #[test]
    fn test_navigate_forward_invalid_does_not_push() {
        let (temp, a, _, _) = tree();
        let mut nav = Navigator::new(a);
        assert!(nav.navigate_forward(&temp.path().join("nope")).is_err());
        assert!(nav.history().is_empty());
    }

    #[test]
    fn test_go_up_pushes_history() {
        let (_temp, a, b, _) = tree();
        let mut nav = Navigator::new(b.clone());
        assert!(nav.go_up());
        assert_eq!(nav.current(), a.as_path());
        assert_eq!(nav.history(), &[b.clone()]);
        assert!(nav.go_back());
        assert_eq!(nav.current(), b.as_path());
    }

    #[test]
    fn test_go_up_at_root_is_noop() {
        let mut nav = Navigator::new(PathBuf::from("/"));
        assert!(!nav.go_up());
        assert_eq!(nav.current(), Path::new("/"));
        assert!(nav.history().is_empty());
    }

    #[test]
    fn test_go_back_skips_deleted_directory() {
        let (_temp, a, b, _) = tree();
        let mut nav = Navigator::new(b.clone());
        nav.navigate_forward(&a).unwrap();
        fs::remove_dir_all(&b).unwrap();
        assert!(!nav.go_back());
        assert_eq!(nav.current(), a.as_path());
    }
}
