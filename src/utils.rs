/*!
 * Utility functions and default rule tables for treedump
 */

use once_cell::sync::Lazy;

use crate::filter::{extension_of, FilterRules};
use crate::types::EntryKind;
use crate::walker::Walker;

/// Count files that pass the filter, for progress tracking
pub fn count_files(walker: &Walker, rules: &FilterRules) -> u64 {
    walker
        .entries()
        .filter_map(Result::ok)
        .filter(|entry| entry.kind == EntryKind::File)
        .filter(|entry| {
            let name = entry.name();
            rules.should_include(&name, extension_of(&name))
        })
        .count() as u64
}

/// Format a human-readable file size
pub fn format_file_size(size: u64) -> String {
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
        format!("{} bytes", size)
    }
}

/// Directories pruned by every preset
pub static CORE_IGNORED_DIRS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![".git", "node_modules", "dist", "build", ".next", "coverage"]
});

/// Editor and interpreter caches pruned by the broader presets
pub static EXTRA_IGNORED_DIRS: Lazy<Vec<&'static str>> =
    Lazy::new(|| vec!["__pycache__", ".vscode", ".idea"]);

/// Binary, archive and lock extensions
pub static DEFAULT_IGNORED_EXTENSIONS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        // Images
        ".png", ".jpg", ".jpeg", ".gif", ".ico", ".svg",
        // Documents
        ".pdf",
        // Archives
        ".zip", ".tar", ".gz", ".7z", ".rar",
        // Native binaries
        ".exe", ".dll", ".so", ".dylib", ".class", ".pyc",
        // Lock files
        ".lock",
    ]
});

/// Narrower extension block-list used alongside an allow-list
pub static DUMP_IGNORED_EXTENSIONS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![".png", ".jpg", ".jpeg", ".gif", ".ico", ".pdf", ".zip", ".lock", ".pyc"]
});

/// File names never worth dumping
pub static DEFAULT_IGNORED_FILENAMES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![".DS_Store", "thumbs.db", ".env", "package-lock.json", "yarn.lock"]
});

/// Allow-listed extensions for the `dump` preset
pub static DUMP_INCLUDE_EXTENSIONS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        ".ts", ".tsx", ".js", ".json", ".sql", ".yaml", ".yml", ".dockerfile", ".sh", ".md",
    ]
});

/// Allow-listed extensions for the `codebase` preset
pub static CODEBASE_INCLUDE_EXTENSIONS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![".ts", ".js", ".tsx", ".jsx", ".json", ".yaml", ".yml", ".sh", ".md"]
});

/// Project files the `codebase` preset always includes
pub static CODEBASE_ALWAYS_INCLUDE: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "Dockerfile",
        "docker-compose.yml",
        "package.json",
        "tsconfig.json",
        // Real .env files stay out
        ".env.example",
        "cloudbuild.yaml",
        "cloudbuild_splitter.yaml",
        "cloudbuild_processor.yaml",
        "cloudbuild_aggregator.yaml",
        "cloudbuild_dispatcher.yaml",
        "cloudbuild_media.yaml",
    ]
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io;
    use tempfile::tempdir;

    #[test]
    fn counts_only_included_files() -> io::Result<()> {
        let dir = tempdir()?;
        fs::create_dir_all(dir.path().join("node_modules/pkg"))?;
        fs::create_dir_all(dir.path().join("src"))?;
        fs::write(dir.path().join("node_modules/pkg/index.js"), "x")?;
        fs::write(dir.path().join("src/main.ts"), "x")?;
        fs::write(dir.path().join("logo.png"), "x")?;
        fs::write(dir.path().join("README.md"), "x")?;

        let mut rules = FilterRules::default();
        rules.ignored_dirs.insert("node_modules".to_string());
        rules.ignored_extensions.insert(".png".to_string());
        let walker = Walker::new(dir.path(), &rules, false);

        assert_eq!(count_files(&walker, &rules), 2);
        Ok(())
    }

    #[test]
    fn formats_sizes() {
        assert_eq!(format_file_size(12), "12 bytes");
        assert_eq!(format_file_size(2048), "2.00 KB");
        assert_eq!(format_file_size(3 * 1024 * 1024), "3.00 MB");
    }
}
