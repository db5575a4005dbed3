/*!
 * Output writer for treedump
 *
 * The dump is written to a temporary file next to the destination and moved
 * into place only when every block has been written. A run that fails part
 * way leaves any previous output untouched, and the temporary file is
 * removed when the writer is dropped.
 */

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use clap::ValueEnum;
use tempfile::NamedTempFile;

use crate::error::Result;
use crate::types::FileRecord;

const BANNER_WIDTH: usize = 80;
const SECTION_WIDTH: usize = 40;

/// Delimiter style for file blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputStyle {
    /// `=` rules around a `FILE:` line
    Banner,
    /// `--- START FILE ---` / `--- END FILE ---` markers
    Markers,
    /// Markdown headings with fenced code blocks
    Markdown,
}

/// Values rendered into the dump header
#[derive(Debug, Clone)]
pub struct Header {
    /// Markdown heading
    pub title: String,
    /// Root directory as shown to the reader
    pub root: String,
    /// Generation time, if requested
    pub generated: Option<String>,
}

impl OutputStyle {
    /// Text written before the first file block
    pub fn preamble(self, header: &Header, tree: Option<&str>) -> String {
        let mut out = String::new();
        match self {
            Self::Banner => {
                if let Some(tree) = tree {
                    let rule = "=".repeat(BANNER_WIDTH);
                    out.push_str(&format!("{rule}\nDIRECTORY STRUCTURE\n{rule}\n{tree}\n"));
                }
            }
            Self::Markers => {
                let rule = "=".repeat(SECTION_WIDTH);
                if let Some(tree) = tree {
                    out.push_str(&format!(
                        "{rule}\nPROJECT DIRECTORY STRUCTURE\n{rule}\n\n{tree}\n\n"
                    ));
                }
                out.push_str(&format!("{rule}\nFILE CONTENTS\n{rule}\n\n"));
            }
            Self::Markdown => {
                out.push_str(&format!("# {}\n", header.title));
                if let Some(generated) = &header.generated {
                    out.push_str(&format!("Generated: {}\n", generated));
                }
                out.push_str(&format!("Root: {}\n", header.root));
                out.push_str(&"-".repeat(BANNER_WIDTH));
                out.push_str("\n\n");
                if let Some(tree) = tree {
                    out.push_str(&format!("## Directory Structure\n```text\n{tree}```\n\n"));
                }
            }
        }
        out
    }

    /// Framed block for one file
    pub fn block(self, record: &FileRecord) -> String {
        let path = &record.path;
        let content = &record.content;
        let newline = if content.is_empty() || content.ends_with('\n') {
            ""
        } else {
            "\n"
        };

        match self {
            Self::Banner => {
                let rule = "=".repeat(BANNER_WIDTH);
                format!("{rule}\nFILE: {path}\n{rule}\n{content}{newline}{rule}\nEND FILE: {path}\n\n")
            }
            Self::Markers => {
                format!("--- START FILE: {path} ---\n{content}{newline}--- END FILE: {path} ---\n\n")
            }
            Self::Markdown => {
                let fence = fence_for(content);
                let lang = fence_language(record);
                let rule = "-".repeat(SECTION_WIDTH);
                format!("## File: {path}\n{fence}{lang}\n{content}{newline}{fence}\n{rule}\n\n")
            }
        }
    }
}

/// Backtick fence longer than any run inside the content
fn fence_for(content: &str) -> String {
    let mut longest = 0;
    let mut run = 0;
    for c in content.chars() {
        if c == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    "`".repeat((longest + 1).max(3))
}

fn fence_language(record: &FileRecord) -> String {
    let name = record.path.rsplit('/').next().unwrap_or_default();
    if name.starts_with("Dockerfile") {
        return "dockerfile".to_string();
    }
    if name == "Makefile" {
        return "makefile".to_string();
    }
    match &record.extension {
        Some(ext) if ext.len() > 1 => ext.trim_start_matches('.').to_string(),
        _ => "text".to_string(),
    }
}

/// Streams framed blocks into the output file
pub struct DumpWriter {
    style: OutputStyle,
    destination: PathBuf,
    temp_path: PathBuf,
    out: BufWriter<NamedTempFile>,
}

impl DumpWriter {
    /// Open a temporary file beside `destination`
    pub fn create(destination: &Path, style: OutputStyle) -> Result<Self> {
        let parent = match destination.parent() {
            Some(p) if p != Path::new("") => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let dir = fs::canonicalize(&parent)?;
        let file_name = destination.file_name().ok_or_else(|| {
            crate::error!(InvalidArgument, "Output path has no file name: {}", destination.display())
        })?;

        let destination = dir.join(file_name);

        let mut builder = tempfile::Builder::new();
        builder.prefix(".treedump-").suffix(".tmp");
        // A fresh dump gets the mode a plain create would give it (0666 less umask)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(fs::Permissions::from_mode(0o666));
        }
        let temp = builder.tempfile_in(&dir)?;

        // Replacing a dump keeps its permissions
        if let Ok(existing) = fs::metadata(&destination) {
            if let Err(e) = fs::set_permissions(temp.path(), existing.permissions()) {
                log::warn!(
                    "Could not carry permissions of {} over: {}",
                    destination.display(),
                    e
                );
            }
        }

        Ok(Self {
            style,
            destination,
            temp_path: temp.path().to_path_buf(),
            out: BufWriter::new(temp),
        })
    }

    /// Canonical destination path
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Path of the in-flight temporary file
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Write the header and optional tree listing
    pub fn begin(&mut self, header: &Header, tree: Option<&str>) -> Result<()> {
        self.out
            .write_all(self.style.preamble(header, tree).as_bytes())?;
        Ok(())
    }

    /// Write one file block
    pub fn write_file(&mut self, record: &FileRecord) -> Result<()> {
        self.out.write_all(self.style.block(record).as_bytes())?;
        Ok(())
    }

    /// Flush and move the dump over the destination
    pub fn finish(self) -> Result<PathBuf> {
        let temp = self.out.into_inner().map_err(|e| e.into_error())?;
        temp.as_file().sync_all()?;
        temp.persist(&self.destination)?;
        Ok(self.destination)
    }
}

/// Current local time for the markdown header
pub fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use tempfile::tempdir;

    fn record(path: &str, ext: Option<&str>, content: &str) -> FileRecord {
        FileRecord {
            path: path.to_string(),
            extension: ext.map(str::to_string),
            content: content.to_string(),
        }
    }

    fn header() -> Header {
        Header {
            title: "CODEBASE DUMP".to_string(),
            root: "/work/app".to_string(),
            generated: None,
        }
    }

    #[test]
    fn markers_block_keeps_content_verbatim() {
        let block = OutputStyle::Markers.block(&record("src/a.ts", Some(".ts"), "let a = 1;\n"));
        assert_eq!(
            block,
            "--- START FILE: src/a.ts ---\nlet a = 1;\n--- END FILE: src/a.ts ---\n\n"
        );

        let unterminated = OutputStyle::Markers.block(&record("b.ts", Some(".ts"), "x"));
        assert!(unterminated.contains("x\n--- END FILE: b.ts ---"));
    }

    #[test]
    fn banner_block_frames_path() {
        let block = OutputStyle::Banner.block(&record("a.sql", Some(".sql"), "select 1;\n"));
        let rule = "=".repeat(80);
        assert!(block.starts_with(&format!("{rule}\nFILE: a.sql\n{rule}\nselect 1;\n")));
        assert!(block.ends_with("END FILE: a.sql\n\n"));
    }

    #[test]
    fn markdown_fence_outgrows_content_backticks() {
        let block = OutputStyle::Markdown.block(&record(
            "README.md",
            Some(".md"),
            "```rust\nfn main() {}\n```\n",
        ));
        assert!(block.starts_with("## File: README.md\n````md\n"));
        assert!(block.contains("```\n````\n"));

        let docker = OutputStyle::Markdown.block(&record("Dockerfile", None, "FROM scratch\n"));
        assert!(docker.starts_with("## File: Dockerfile\n```dockerfile\n"));
    }

    #[test]
    fn markdown_preamble_includes_tree_and_timestamp() {
        let mut h = header();
        h.generated = Some("2024-01-01 00:00:00".to_string());
        let text = OutputStyle::Markdown.preamble(&h, Some("app/\n    a.ts\n"));
        assert!(text.starts_with("# CODEBASE DUMP\nGenerated: 2024-01-01 00:00:00\nRoot: /work/app\n"));
        assert!(text.contains("```text\napp/\n    a.ts\n```"));
    }

    #[test]
    fn markers_preamble_always_opens_contents_section() {
        let text = OutputStyle::Markers.preamble(&header(), None);
        assert!(!text.contains("PROJECT DIRECTORY STRUCTURE"));
        assert!(text.contains("FILE CONTENTS"));
    }

    #[test]
    fn dropped_writer_leaves_destination_untouched() -> io::Result<()> {
        let dir = tempdir()?;
        let destination = dir.path().join("dump.txt");
        fs::write(&destination, "previous run\n")?;

        {
            let mut writer = DumpWriter::create(&destination, OutputStyle::Markers)?;
            writer.begin(&header(), None)?;
            writer.write_file(&record("a.ts", Some(".ts"), "partial"))?;
            assert!(writer.temp_path().exists());
        }

        assert_eq!(fs::read_to_string(&destination)?, "previous run\n");
        let leftovers = fs::read_dir(dir.path())?.count();
        assert_eq!(leftovers, 1);
        Ok(())
    }

    #[test]
    fn finish_replaces_destination() -> io::Result<()> {
        let dir = tempdir()?;
        let destination = dir.path().join("dump.txt");
        fs::write(&destination, "previous run\n")?;

        let mut writer = DumpWriter::create(&destination, OutputStyle::Markers)?;
        writer.begin(&header(), None)?;
        writer.write_file(&record("a.ts", Some(".ts"), "const a = 1;\n"))?;
        writer.finish()?;

        let text = fs::read_to_string(&destination)?;
        assert!(!text.contains("previous run"));
        assert!(text.contains("--- START FILE: a.ts ---\nconst a = 1;\n"));
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn finish_keeps_destination_permissions() -> io::Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir()?;
        let destination = dir.path().join("dump.txt");
        fs::write(&destination, "previous run\n")?;
        fs::set_permissions(&destination, fs::Permissions::from_mode(0o640))?;

        let mut writer = DumpWriter::create(&destination, OutputStyle::Markers)?;
        writer.begin(&header(), None)?;
        writer.finish()?;

        let mode = fs::metadata(&destination)?.permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn new_dump_mode_stays_within_0666() -> io::Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir()?;
        let destination = dir.path().join("dump.txt");
        let writer = DumpWriter::create(&destination, OutputStyle::Markers)?;
        writer.finish()?;

        let mode = fs::metadata(&destination)?.permissions().mode() & 0o777;
        assert_eq!(mode & !0o666, 0);
        assert_ne!(mode & 0o600, 0);
        Ok(())
    }
}
