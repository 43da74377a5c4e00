//! Recursive filename search with shell-style wildcards.
//!
//! Patterns support `*`, `?`, `[abc]`, `[a-z]` and `[!abc]`, matched
//! case-sensitively against the file's basename. They are translated once
//! into an anchored regex.

use std::path::{Path, PathBuf};

use regex::Regex;
use walkdir::WalkDir;

use crate::error::{BrowserError, Result};

/// Default cap on collected matches.
pub const DEFAULT_SEARCH_LIMIT: usize = 1000;

/// A compiled wildcard pattern. An empty pattern matches every name.
#[derive(Debug, Clone)]
pub struct Wildcard {
    regex: Option<Regex>,
}

impl Wildcard {
    pub fn new(pattern: &str) -> Result<Self> {
        if pattern.is_empty() {
            return Ok(Self { regex: None });
        }
        let regex = Regex::new(&translate(pattern)).map_err(|e| BrowserError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { regex: Some(regex) })
    }

    pub fn matches(&self, name: &str) -> bool {
        match &self.regex {
            Some(re) => re.is_match(name),
            None => true,
        }
    }
}

/// Translate a wildcard into regex source.
fn translate(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let len = chars.len();
    let mut out = String::from("(?s)^");
    let mut i = 0;

    while i < len {
        let c = chars[i];
        i += 1;
        match c {
            '*' => {
                // Collapse runs of '*'
                while i < len && chars[i] == '*' {
                    i += 1;
                }
                out.push_str(".*");
            }
            '?' => out.push('.'),
            '[' => {
                let mut j = i;
                if j < len && chars[j] == '!' {
                    j += 1;
                }
                // A ']' right after the opening (or '!') is a literal member
                if j < len && chars[j] == ']' {
                    j += 1;
                }
                while j < len && chars[j] != ']' {
                    j += 1;
                }
                if j >= len {
                    // Unclosed bracket matches itself
                    out.push_str("\\[");
                } else {
                    out.push_str(&translate_class(&chars[i..j]));
                    i = j + 1;
                }
            }
            other => out.push_str(&escape_char(other)),
        }
    }

    out.push('$');
    out
}

/// Regex class for a bracket body. `lo-hi` pairs become ranges with escaped
/// endpoints, every other member is escaped on its own. A reversed range
/// contributes nothing, so `[z-a]` matches no character.
fn translate_class(body: &[char]) -> String {
    let (negated, members) = match body.split_first() {
        Some(('!', tail)) => (true, tail),
        _ => (false, body),
    };

    let mut items = String::new();
    let mut k = 0;
    while k < members.len() {
        if k + 2 < members.len() && members[k + 1] == '-' {
            let (lo, hi) = (members[k], members[k + 2]);
            if lo <= hi {
                items.push_str(&escape_char(lo));
                items.push('-');
                items.push_str(&escape_char(hi));
            }
            k += 3;
        } else {
            items.push_str(&escape_char(members[k]));
            k += 1;
        }
    }

    match (items.is_empty(), negated) {
        // Nothing left: a negated class accepts any character
        (true, true) => ".".to_string(),
        (true, false) => r"[^\x00-\x{10FFFF}]".to_string(),
        (false, true) => format!("[^{}]", items),
        (false, false) => format!("[{}]", items),
    }
}

fn escape_char(ch: char) -> String {
    let mut buf = [0u8; 4];
    regex::escape(ch.encode_utf8(&mut buf))
}

fn is_file_like(entry: &walkdir::DirEntry) -> bool {
    if entry.file_type().is_dir() {
        return false;
    }
    // Symlinks to directories count as directories, like the directory walk
    // the listing shows, but are never descended into.
    !(entry.path_is_symlink() && entry.path().is_dir())
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

/// Walk `root` depth-first and collect up to `limit` files whose basename
/// matches `pattern`. Unreadable directories are skipped. Unless
/// `show_hidden` is set, dot-files and dot-directories are left out.
pub fn search(pattern: &str, root: &Path, limit: usize, show_hidden: bool) -> Result<Vec<PathBuf>> {
    let wildcard = Wildcard::new(pattern)?;
    let mut matches = Vec::new();
    if limit == 0 {
        return Ok(matches);
    }

    let walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| show_hidden || e.depth() == 0 || !is_hidden(e))
        .filter_map(|e| e.ok());

    for entry in walker {
        if !is_file_like(&entry) {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if wildcard.matches(&name) {
            matches.push(entry.into_path());
            if matches.len() >= limit {
                break;
            }
        }
    }

    tracing::debug!(
        pattern,
        root = %root.display(),
        found = matches.len(),
        capped = matches.len() >= limit,
        "search finished"
    );
    Ok(matches)
}
