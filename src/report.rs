/*!
 * Reporting functionality for treedump
 *
 * Summarises a run as console tables (via `tabled`) or as JSON.
 */

use std::collections::BTreeMap;
use std::time::Duration;

use clap::ValueEnum;
use serde::{Serialize, Serializer};
use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::error::Result;
use crate::types::SkippedFile;
use crate::utils::format_file_size;

/// Information about a dumped file
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct FileReportInfo {
    /// Number of lines in the file
    pub lines: usize,
    /// Size of the decoded content in bytes
    pub bytes: usize,
}

/// Statistics for one run
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    /// Output file path
    pub output_file: String,
    /// Time taken to scan and write
    #[serde(rename = "duration_ms", serialize_with = "as_millis")]
    pub duration: Duration,
    /// Files written to the dump
    pub files_processed: usize,
    /// Eligible files that could not be read
    pub files_skipped: usize,
    /// Files rejected by the filter
    pub files_filtered: usize,
    /// Total number of lines dumped
    pub total_lines: usize,
    /// Total bytes of content dumped
    pub total_bytes: usize,
    /// Details for each dumped file
    pub file_details: BTreeMap<String, FileReportInfo>,
    /// Skipped files with reasons
    pub skipped: Vec<SkippedFile>,
}

fn as_millis<S: Serializer>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u128(duration.as_millis())
}

/// Format of the report output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Console tables
    Table,
    /// Pretty printed JSON
    Json,
    /// Print nothing
    None,
}

/// Report generator for run results
pub struct Reporter {
    format: ReportFormat,
}

impl Reporter {
    /// Create a new reporter
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Format a number with human-readable units
    fn format_number(&self, num: usize) -> String {
        if num >= 1_000_000 {
            format!("{:.1}M", num as f64 / 1_000_000.0)
        } else if num >= 1_000 {
            format!("{:.1}K", num as f64 / 1_000.0)
        } else {
            num.to_string()
        }
    }

    /// Generate a report string
    pub fn generate_report(&self, report: &ScanReport) -> Result<String> {
        Ok(match self.format {
            ReportFormat::Table => self.generate_console_report(report),
            ReportFormat::Json => serde_json::to_string_pretty(report)?,
            ReportFormat::None => String::new(),
        })
    }

    /// Print the report to stdout
    pub fn print_report(&self, report: &ScanReport) -> Result<()> {
        if self.format != ReportFormat::None {
            println!("\n{}", self.generate_report(report)?);
        }
        Ok(())
    }

    // Keep the tail of long paths, which carries the file name
    fn format_path(&self, path: &str, max_len: usize) -> String {
        if path.chars().count() <= max_len {
            return path.to_string();
        }

        let mut segments = Vec::new();
        let mut current_len = 3;
        for part in path.split('/').rev() {
            let part_len = part.chars().count() + 1;
            if current_len + part_len > max_len {
                break;
            }
            segments.push(part);
            current_len += part_len;
        }

        if segments.is_empty() {
            let tail: String = path
                .chars()
                .rev()
                .take(max_len.saturating_sub(3))
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            return format!("...{}", tail);
        }

        let mut result = String::from("...");
        for part in segments.iter().rev() {
            result.push('/');
            result.push_str(part);
        }
        result
    }

    fn styled(mut table: Table) -> String {
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));
        table.to_string()
    }

    fn create_summary_table(&self, report: &ScanReport) -> String {
        #[derive(Tabled)]
        struct SummaryRow {
            #[tabled(rename = "Metric")]
            key: String,

            #[tabled(rename = "Value")]
            value: String,
        }

        let rows = vec![
            SummaryRow {
                key: "Output File".to_string(),
                value: report.output_file.clone(),
            },
            SummaryRow {
                key: "Process Time".to_string(),
                value: format!("{:.4?}", report.duration),
            },
            SummaryRow {
                key: "Files Processed".to_string(),
                value: self.format_number(report.files_processed),
            },
            SummaryRow {
                key: "Files Skipped".to_string(),
                value: self.format_number(report.files_skipped),
            },
            SummaryRow {
                key: "Files Filtered Out".to_string(),
                value: self.format_number(report.files_filtered),
            },
            SummaryRow {
                key: "Total Lines".to_string(),
                value: self.format_number(report.total_lines),
            },
            SummaryRow {
                key: "Total Size".to_string(),
                value: format_file_size(report.total_bytes as u64),
            },
        ];

        Self::styled(Table::new(rows))
    }

    fn create_files_table(&self, report: &ScanReport) -> String {
        #[derive(Tabled)]
        struct FileRow {
            #[tabled(rename = "File Path")]
            path: String,

            #[tabled(rename = "Lines")]
            lines: String,

            #[tabled(rename = "Size")]
            size: String,
        }

        // Largest first, ties broken by path
        let mut files: Vec<_> = report.file_details.iter().collect();
        files.sort_by(|(pa, a), (pb, b)| b.bytes.cmp(&a.bytes).then_with(|| pa.cmp(pb)));

        let files_to_show = if files.len() > 15 { &files[..10] } else { &files[..] };

        let rows: Vec<FileRow> = files_to_show
            .iter()
            .map(|(path, info)| FileRow {
                path: self.format_path(path, 60),
                lines: self.format_number(info.lines),
                size: format_file_size(info.bytes as u64),
            })
            .collect();

        Self::styled(Table::new(rows))
    }

    fn create_skipped_table(&self, report: &ScanReport) -> String {
        #[derive(Tabled)]
        struct SkippedRow {
            #[tabled(rename = "File Path")]
            path: String,

            #[tabled(rename = "Reason")]
            reason: String,
        }

        let rows: Vec<SkippedRow> = report
            .skipped
            .iter()
            .map(|s| SkippedRow {
                path: self.format_path(&s.path, 60),
                reason: s.reason.clone(),
            })
            .collect();

        Self::styled(Table::new(rows))
    }

    fn generate_console_report(&self, report: &ScanReport) -> String {
        let files_title = if report.file_details.len() > 15 {
            "TOP 10 LARGEST FILES"
        } else {
            "PROCESSED FILES"
        };

        let mut out = format!("{}\n{}\n", files_title, self.create_files_table(report));
        if !report.skipped.is_empty() {
            out.push_str(&format!(
                "\nSKIPPED FILES\n{}\n",
                self.create_skipped_table(report)
            ));
        }
        out.push_str(&format!(
            "\nDUMP COMPLETE\n{}",
            self.create_summary_table(report)
        ));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> ScanReport {
        let mut file_details = BTreeMap::new();
        file_details.insert("src/index.ts".to_string(), FileReportInfo { lines: 3, bytes: 100 });
        ScanReport {
            output_file: "dump.txt".to_string(),
            duration: Duration::from_millis(42),
            files_processed: 1,
            files_skipped: 1,
            files_filtered: 2,
            total_lines: 3,
            total_bytes: 100,
            file_details,
            skipped: vec![SkippedFile {
                path: "broken.ts".to_string(),
                reason: "No such file or directory (os error 2)".to_string(),
            }],
        }
    }

    #[test]
    fn console_report_lists_files_and_skips() -> Result<()> {
        let text = Reporter::new(ReportFormat::Table).generate_report(&report())?;
        assert!(text.contains("PROCESSED FILES"));
        assert!(text.contains("src/index.ts"));
        assert!(text.contains("SKIPPED FILES"));
        assert!(text.contains("broken.ts"));
        assert!(text.contains("Files Skipped"));
        Ok(())
    }

    #[test]
    fn json_report_is_machine_readable() -> Result<()> {
        let text = Reporter::new(ReportFormat::Json).generate_report(&report())?;
        let value: serde_json::Value = serde_json::from_str(&text)?;
        assert_eq!(value["files_processed"], 1);
        assert_eq!(value["files_skipped"], 1);
        assert_eq!(value["duration_ms"], 42);
        assert_eq!(value["skipped"][0]["path"], "broken.ts");
        Ok(())
    }

    #[test]
    fn long_paths_keep_their_tail() {
        let reporter = Reporter::new(ReportFormat::Table);
        let path = "a/very/long/directory/structure/that/keeps/going/and/going/file.rs";
        let shown = reporter.format_path(path, 30);
        assert!(shown.starts_with("..."));
        assert!(shown.ends_with("/going/file.rs"));
        assert!(shown.chars().count() <= 30);
    }
}
