/*!
 * Core types shared by the walker, dumper and reporter
 */

use std::path::{Path, PathBuf};

use serde::Serialize;

/// Kind of entry yielded by the walker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Directory that survived pruning
    Directory,
    /// Regular file, or a symlink that does not point at a directory
    File,
}

/// A filesystem entry discovered during traversal
#[derive(Debug, Clone)]
pub struct WalkEntry {
    /// Absolute path on disk
    pub path: PathBuf,
    /// Path relative to the scan root
    pub relative: PathBuf,
    /// Depth below the root (the root itself is 0)
    pub depth: usize,
    /// Entry kind
    pub kind: EntryKind,
}

impl WalkEntry {
    /// Bare file or directory name
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string()
    }

    /// Relative path rendered with `/` separators
    pub fn display_path(&self) -> String {
        display_path(&self.relative)
    }
}

/// A file selected for the dump, alive only while it is being written
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// Relative path with `/` separators
    pub path: String,
    /// Extension including the leading dot, if any
    pub extension: Option<String>,
    /// Decoded text content
    pub content: String,
}

/// A file that was eligible but could not be dumped
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SkippedFile {
    /// Relative path with `/` separators
    pub path: String,
    /// Human readable reason
    pub reason: String,
}

/// Render a relative path with forward slashes regardless of platform
pub fn display_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
