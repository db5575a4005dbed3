/*!
 * File selection rules
 *
 * A file either passes the filter or it doesn't. The decision is made from
 * the bare file name and its extension alone, following a fixed precedence
 * where the first matching rule wins. Directories are handled separately by
 * [`FilterRules::prunes_dir`], which the walker applies before descending.
 */

use std::collections::BTreeSet;
use std::path::Path;

use glob_match::glob_match;

/// Ignore and include rule sets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterRules {
    /// Directory names pruned during traversal (exact match)
    pub ignored_dirs: BTreeSet<String>,
    /// Extensions, including the leading dot, that are always excluded
    pub ignored_extensions: BTreeSet<String>,
    /// File names that are always excluded
    pub ignored_filenames: BTreeSet<String>,
    /// Glob patterns matched against bare file and directory names
    pub ignore_patterns: Vec<String>,
    /// File names included regardless of extension
    pub always_include: BTreeSet<String>,
    /// Allow-listed extensions
    pub include_extensions: BTreeSet<String>,
    /// Allow-listed file names
    pub include_filenames: BTreeSet<String>,
}

/// Outcome of evaluating a file against the rules, tagged with the deciding rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Name is in the ignored file names or matches an ignore pattern
    IgnoredName,
    /// Name is in the always-include set
    AlwaysIncluded,
    /// Extension is ignored
    IgnoredExtension,
    /// Extension or name is on the allow-list
    AllowListed,
    /// Dockerfile, Dockerfile.<suffix> or Makefile
    ConventionalName,
    /// Allow-list mode and nothing matched
    NotAllowListed,
    /// Block-list mode and nothing excluded it
    BlockListDefault,
}

impl Verdict {
    /// Whether this verdict includes the file
    pub fn is_included(self) -> bool {
        matches!(
            self,
            Verdict::AlwaysIncluded
                | Verdict::AllowListed
                | Verdict::ConventionalName
                | Verdict::BlockListDefault
        )
    }
}

/// Extension of a file name including the leading dot.
///
/// Dotfiles such as `.bashrc` have no extension.
pub fn extension_of(name: &str) -> Option<&str> {
    let ext = Path::new(name).extension()?.to_str()?;
    Some(&name[name.len() - ext.len() - 1..])
}

/// Normalize a user supplied extension to carry a leading dot
pub fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim();
    if ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{}", ext)
    }
}

fn is_conventional_name(name: &str) -> bool {
    name == "Dockerfile" || name == "Makefile" || name.starts_with("Dockerfile.")
}

impl FilterRules {
    /// True when an include allow-list is configured
    pub fn allow_list_mode(&self) -> bool {
        !self.include_extensions.is_empty() || !self.include_filenames.is_empty()
    }

    fn matches_pattern(&self, name: &str) -> bool {
        self.ignore_patterns
            .iter()
            .any(|pattern| glob_match(pattern, name))
    }

    /// Whether a directory with this name is pruned
    pub fn prunes_dir(&self, name: &str) -> bool {
        self.ignored_dirs.contains(name) || self.matches_pattern(name)
    }

    /// Evaluate a file name and extension against the rules
    pub fn evaluate(&self, name: &str, extension: Option<&str>) -> Verdict {
        if self.ignored_filenames.contains(name) || self.matches_pattern(name) {
            return Verdict::IgnoredName;
        }

        if self.always_include.contains(name) {
            return Verdict::AlwaysIncluded;
        }

        if let Some(ext) = extension {
            if self.ignored_extensions.contains(ext) {
                return Verdict::IgnoredExtension;
            }
        }

        let allow_list = self.allow_list_mode();
        if allow_list {
            let ext_listed = extension.map_or(false, |ext| self.include_extensions.contains(ext));
            if ext_listed || self.include_filenames.contains(name) {
                return Verdict::AllowListed;
            }
        }

        if is_conventional_name(name) {
            return Verdict::ConventionalName;
        }

        if allow_list {
            Verdict::NotAllowListed
        } else {
            Verdict::BlockListDefault
        }
    }

    /// Pure inclusion predicate
    pub fn should_include(&self, name: &str, extension: Option<&str>) -> bool {
        self.evaluate(name, extension).is_included()
    }
}
