/*!
 * Directory traversal with pre-descent pruning
 *
 * Entries are produced lazily, depth first, with siblings sorted by file
 * name so repeated runs over the same tree see the same order. Ignored
 * directories are rejected in `filter_entry`, which means their children are
 * never read.
 */

use std::fs;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use walkdir::WalkDir;

use crate::filter::FilterRules;
use crate::types::{display_path, EntryKind, SkippedFile, WalkEntry};

/// Item produced by the walker: an entry, or a failure to enumerate one
pub type WalkItem = Result<WalkEntry, SkippedFile>;

/// Walker over a root directory
#[derive(Debug, Clone)]
pub struct Walker {
    root: PathBuf,
    rules: FilterRules,
    respect_gitignore: bool,
    excluded: Vec<PathBuf>,
}

impl Walker {
    /// Create a walker; `root` should already be canonical
    pub fn new(
        root: impl Into<PathBuf>,
        rules: &FilterRules,
        respect_gitignore: bool,
    ) -> Self {
        Self {
            root: root.into(),
            rules: rules.clone(),
            respect_gitignore,
            excluded: Vec::new(),
        }
    }

    /// Never yield this path
    pub fn exclude(&mut self, path: impl Into<PathBuf>) {
        self.excluded.push(path.into());
    }

    /// Lazily enumerate every surviving entry, root included at depth 0
    pub fn entries(&self) -> Box<dyn Iterator<Item = WalkItem> + '_> {
        if self.respect_gitignore {
            Box::new(self.ignore_entries())
        } else {
            Box::new(self.walkdir_entries())
        }
    }

    fn walkdir_entries(&self) -> impl Iterator<Item = WalkItem> + '_ {
        let rules = &self.rules;
        WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |e| {
                e.depth() == 0
                    || !e.file_type().is_dir()
                    || !rules.prunes_dir(&e.file_name().to_string_lossy())
            })
            .filter_map(move |item| match item {
                Ok(e) => self.classify(
                    e.path(),
                    e.depth(),
                    e.file_type().is_dir(),
                    e.path_is_symlink(),
                ),
                Err(err) => Some(Err(self.walk_failure(err.path(), &err.to_string()))),
            })
    }

    fn ignore_entries(&self) -> impl Iterator<Item = WalkItem> + '_ {
        let rules = self.rules.clone();
        let mut builder = WalkBuilder::new(&self.root);
        builder
            .hidden(false)
            .require_git(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |e| {
                e.depth() == 0
                    || !e.file_type().map_or(false, |ft| ft.is_dir())
                    || !rules.prunes_dir(&e.file_name().to_string_lossy())
            });

        builder.build().filter_map(move |item| match item {
            Ok(e) => {
                let ft = e.file_type();
                let is_dir = ft.map_or(false, |ft| ft.is_dir());
                let is_symlink = ft.map_or(false, |ft| ft.is_symlink());
                self.classify(e.path(), e.depth(), is_dir, is_symlink)
            }
            Err(err) => {
                let path = ignore_error_path(&err);
                Some(Err(self.walk_failure(path, &err.to_string())))
            }
        })
    }

    fn classify(
        &self,
        path: &Path,
        depth: usize,
        is_dir: bool,
        is_symlink: bool,
    ) -> Option<WalkItem> {
        if self.excluded.iter().any(|p| p == path) {
            log::trace!("Excluding {}", path.display());
            return None;
        }

        let kind = if is_dir {
            EntryKind::Directory
        } else if is_symlink && fs::metadata(path).map_or(false, |m| m.is_dir()) {
            log::debug!("Not following directory symlink {}", path.display());
            return None;
        } else {
            EntryKind::File
        };

        Some(Ok(WalkEntry {
            path: path.to_path_buf(),
            relative: self.relative(path),
            depth,
            kind,
        }))
    }

    fn relative(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.to_path_buf())
    }

    fn walk_failure(&self, path: Option<&Path>, message: &str) -> SkippedFile {
        let path = path
            .map(|p| display_path(&self.relative(p)))
            .unwrap_or_else(|| "<unknown>".to_string());
        SkippedFile {
            path,
            reason: message.to_string(),
        }
    }
}

/// Path an `ignore` walk error refers to, looking through depth and line wrappers
fn ignore_error_path(err: &ignore::Error) -> Option<&Path> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            ignore_error_path(err)
        }
        ignore::Error::Loop { child, .. } => Some(child),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use tempfile::tempdir;

    #[test]
    fn ignore_errors_keep_their_path() {
        let inner = ignore::Error::WithPath {
            path: PathBuf::from("/work/private"),
            err: Box::new(ignore::Error::Io(io::Error::from(
                io::ErrorKind::PermissionDenied,
            ))),
        };
        let err = ignore::Error::WithDepth {
            depth: 1,
            err: Box::new(inner),
        };

        assert_eq!(ignore_error_path(&err), Some(Path::new("/work/private")));
        assert_eq!(
            ignore_error_path(&ignore::Error::Io(io::Error::from(io::ErrorKind::Other))),
            None
        );
    }

    #[test]
    fn ignore_failures_are_reported_relative_to_root() {
        let walker = Walker::new("/work", &FilterRules::default(), true);
        let err = ignore::Error::WithDepth {
            depth: 2,
            err: Box::new(ignore::Error::WithPath {
                path: PathBuf::from("/work/src/private"),
                err: Box::new(ignore::Error::Io(io::Error::from(
                    io::ErrorKind::PermissionDenied,
                ))),
            }),
        };

        let skipped = walker.walk_failure(ignore_error_path(&err), &err.to_string());
        assert_eq!(skipped.path, "src/private");
    }

    #[test]
    fn walks_sorted_and_pruned() -> io::Result<()> {
        let dir = tempdir()?;
        fs::create_dir_all(dir.path().join("node_modules/pkg"))?;
        fs::create_dir_all(dir.path().join("src"))?;
        fs::write(dir.path().join("src/b.ts"), "b")?;
        fs::write(dir.path().join("src/a.ts"), "a")?;
        fs::write(dir.path().join("node_modules/pkg/index.js"), "x")?;

        let mut rules = FilterRules::default();
        rules.ignored_dirs.insert("node_modules".to_string());
        for gitignore in [false, true] {
            let walker = Walker::new(dir.path(), &rules, gitignore);
            let paths: Vec<String> = walker
                .entries()
                .filter_map(Result::ok)
                .map(|e| e.display_path())
                .collect();
            assert_eq!(paths, vec!["", "src", "src/a.ts", "src/b.ts"]);
        }
        Ok(())
    }
}
