/*!
 * The dump pass: enumerate, filter, read, write
 */

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use indicatif::ProgressBar;

use crate::config::Config;
use crate::error::Result;
use crate::filter::extension_of;
use crate::reader::ContentReader;
use crate::report::{FileReportInfo, ScanReport};
use crate::tree::TreeRenderer;
use crate::types::{EntryKind, FileRecord, SkippedFile, WalkEntry};
use crate::utils::count_files;
use crate::walker::Walker;
use crate::writer::{timestamp, DumpWriter, Header};

/// Dumper statistics
#[derive(Debug, Clone, Default)]
pub struct ScannerStatistics {
    /// Files written to the dump
    pub files_processed: usize,
    /// Eligible files or entries that could not be read
    pub files_skipped: usize,
    /// Files rejected by the filter
    pub files_filtered: usize,
    /// Total number of lines dumped
    pub total_lines: usize,
    /// Total bytes of content dumped
    pub total_bytes: usize,
    /// Details for each dumped file
    pub file_details: BTreeMap<String, FileReportInfo>,
    /// Skipped entries with reasons
    pub skipped: Vec<SkippedFile>,
}

/// Dumps a directory into a single file
pub struct Dumper {
    /// Dumper configuration
    config: Config,
    /// Progress bar
    pub progress: Arc<ProgressBar>,
    /// Statistics of the last run
    statistics: ScannerStatistics,
}

impl Dumper {
    /// Create a new dumper
    pub fn new(config: Config, progress: Arc<ProgressBar>) -> Self {
        Self {
            config,
            progress,
            statistics: ScannerStatistics::default(),
        }
    }

    /// Statistics of the last run
    pub fn statistics(&self) -> &ScannerStatistics {
        &self.statistics
    }

    /// Run a complete dump. Per-file failures are recorded and skipped;
    /// any returned error is fatal and leaves the previous output in place.
    pub fn run(&mut self) -> Result<ScanReport> {
        let start_time = Instant::now();
        self.statistics = ScannerStatistics::default();

        self.config.validate()?;
        let root = fs::canonicalize(&self.config.target_dir)?;
        log::info!("Dumping {}", root.display());

        let mut writer = DumpWriter::create(&self.config.output_file, self.config.style)?;
        let mut walker = Walker::new(&root, &self.config.rules, self.config.respect_gitignore);
        walker.exclude(writer.destination());
        walker.exclude(writer.temp_path());

        if !self.progress.is_hidden() {
            self.progress
                .set_length(count_files(&walker, &self.config.rules));
        }

        let tree = if self.config.include_tree {
            let renderer = TreeRenderer::new(&self.config.rules);
            Some(renderer.render(&root_name(&root), walker.entries()))
        } else {
            None
        };

        let header = Header {
            title: self.config.title.clone(),
            root: root.display().to_string(),
            generated: self.config.timestamp.then(timestamp),
        };
        writer.begin(&header, tree.as_deref())?;

        let reader = ContentReader::new(self.config.lossy, self.config.max_file_size);
        for item in walker.entries() {
            match item {
                Ok(entry) if entry.kind == EntryKind::Directory => continue,
                Ok(entry) => self.process_file(&entry, &reader, &mut writer)?,
                Err(skipped) => self.record_skip(skipped),
            }
        }

        let output = writer.finish()?;
        log::info!(
            "Wrote {} files to {} ({} skipped)",
            self.statistics.files_processed,
            output.display(),
            self.statistics.files_skipped
        );

        let stats = self.statistics.clone();
        Ok(ScanReport {
            output_file: output.display().to_string(),
            duration: start_time.elapsed(),
            files_processed: stats.files_processed,
            files_skipped: stats.files_skipped,
            files_filtered: stats.files_filtered,
            total_lines: stats.total_lines,
            total_bytes: stats.total_bytes,
            file_details: stats.file_details,
            skipped: stats.skipped,
        })
    }

    /// Filter, read and write a single file. Only writer failures propagate.
    fn process_file(
        &mut self,
        entry: &WalkEntry,
        reader: &ContentReader,
        writer: &mut DumpWriter,
    ) -> Result<()> {
        let name = entry.name();
        let extension = extension_of(&name);
        let path = entry.display_path();

        let verdict = self.config.rules.evaluate(&name, extension);
        if !verdict.is_included() {
            log::trace!("Filtered {}: {:?}", path, verdict);
            self.statistics.files_filtered += 1;
            return Ok(());
        }
        log::debug!("Selected {}: {:?}", path, verdict);

        self.progress.inc(1);
        self.progress.set_message(format!("Current file: {}", path));

        let content = match reader.read(&entry.path) {
            Ok(content) => content,
            Err(e) => {
                self.record_skip(SkippedFile {
                    path,
                    reason: e.to_string(),
                });
                return Ok(());
            }
        };

        let record = FileRecord {
            path,
            extension: extension.map(str::to_string),
            content,
        };
        writer.write_file(&record)?;
        self.progress.suspend(|| log::info!("Added {}", record.path));

        let info = FileReportInfo {
            lines: record.content.lines().count(),
            bytes: record.content.len(),
        };
        self.statistics.files_processed += 1;
        self.statistics.total_lines += info.lines;
        self.statistics.total_bytes += info.bytes;
        self.statistics.file_details.insert(record.path, info);

        Ok(())
    }

    fn record_skip(&mut self, skipped: SkippedFile) {
        self.progress
            .suspend(|| log::warn!("Skipping {}: {}", skipped.path, skipped.reason));
        self.statistics.files_skipped += 1;
        self.statistics.skipped.push(skipped);
    }
}

fn root_name(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| root.display().to_string())
}
