/*!
 * Configuration handling for treedump
 */

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use clap_complete::Shell;

use crate::error::Result;
use crate::filter::{normalize_extension, FilterRules};
use crate::report::ReportFormat;
use crate::utils::{
    CODEBASE_ALWAYS_INCLUDE, CODEBASE_INCLUDE_EXTENSIONS, CORE_IGNORED_DIRS,
    DEFAULT_IGNORED_EXTENSIONS, DEFAULT_IGNORED_FILENAMES, DUMP_IGNORED_EXTENSIONS,
    DUMP_INCLUDE_EXTENSIONS, EXTRA_IGNORED_DIRS,
};
use crate::writer::OutputStyle;

/// Built-in rule sets and output layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// Block-list everything binary, tree preamble, START/END markers (default)
    Context,
    /// Allow-list of web and infra sources, banner delimiters
    Dump,
    /// Allow-list plus always-included project files, Markdown fences
    Codebase,
}

impl Default for Preset {
    fn default() -> Self {
        Self::Context
    }
}

impl Preset {
    /// Output file name used when none is given
    pub fn default_output(self) -> &'static str {
        match self {
            Self::Context => "project_context_dump.txt",
            Self::Dump => "full_project_context.txt",
            Self::Codebase => "CODEBASE_DUMP.md",
        }
    }

    /// Filter rules seeded by this preset
    pub fn rules(self) -> FilterRules {
        let mut rules = FilterRules {
            ignored_dirs: to_set(CORE_IGNORED_DIRS.iter()),
            ..FilterRules::default()
        };

        match self {
            Self::Context => {
                rules.ignored_dirs.extend(to_set(EXTRA_IGNORED_DIRS.iter()));
                rules.ignored_extensions = to_set(DEFAULT_IGNORED_EXTENSIONS.iter());
                rules.ignored_filenames = to_set(DEFAULT_IGNORED_FILENAMES.iter());
            }
            Self::Dump => {
                rules.ignored_extensions = to_set(DUMP_IGNORED_EXTENSIONS.iter());
                rules.include_extensions = to_set(DUMP_INCLUDE_EXTENSIONS.iter());
                rules.include_filenames = to_set(["Dockerfile"].iter());
            }
            Self::Codebase => {
                rules.ignored_dirs.extend(to_set(EXTRA_IGNORED_DIRS.iter()));
                rules.include_extensions = to_set(CODEBASE_INCLUDE_EXTENSIONS.iter());
                rules.include_filenames = to_set(["Dockerfile", "Makefile"].iter());
                rules.always_include = to_set(CODEBASE_ALWAYS_INCLUDE.iter());
            }
        }

        rules
    }

    /// Output style used by this preset
    pub fn style(self) -> OutputStyle {
        match self {
            Self::Context => OutputStyle::Markers,
            Self::Dump => OutputStyle::Banner,
            Self::Codebase => OutputStyle::Markdown,
        }
    }

    /// Whether the preset emits the directory tree before file contents
    pub fn include_tree(self) -> bool {
        matches!(self, Self::Context)
    }
}

fn to_set<'a, I, S>(items: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a S>,
    S: AsRef<str> + ?Sized + 'a,
{
    items.into_iter().map(|s| s.as_ref().to_string()).collect()
}

/// Command-line arguments for treedump
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "treedump",
    version = env!("CARGO_PKG_VERSION"),
    about = "Concatenate a filtered directory tree into a single text file",
    long_about = "Walks a directory, skips ignored folders and files, and writes every selected text file into one output file, optionally preceded by a directory tree listing."
)]
pub struct Args {
    /// Directory to dump
    #[clap(default_value = ".")]
    pub directory_path: String,

    /// Output file (overwritten on every run)
    #[clap(short, long)]
    pub output: Option<String>,

    /// Rule set and layout to start from
    #[clap(long, value_enum, default_value_t = Preset::default())]
    pub preset: Preset,

    /// Clear the preset's ignored directories, extensions and file names
    #[clap(long)]
    pub no_default_ignores: bool,

    /// Comma-separated directory names to prune
    #[clap(long, value_delimiter = ',')]
    pub ignore_dir: Vec<String>,

    /// Comma-separated extensions to exclude
    #[clap(long, value_delimiter = ',')]
    pub ignore_ext: Vec<String>,

    /// Comma-separated file names to exclude
    #[clap(long, value_delimiter = ',')]
    pub ignore_file: Vec<String>,

    /// Comma-separated glob patterns matched against file and directory names
    #[clap(long, value_delimiter = ',')]
    pub ignore_patterns: Vec<String>,

    /// Comma-separated file names to include regardless of extension
    #[clap(long, value_delimiter = ',')]
    pub always_include: Vec<String>,

    /// Comma-separated extensions to allow (switches to allow-list mode)
    #[clap(long, value_delimiter = ',')]
    pub include_ext: Vec<String>,

    /// Comma-separated file names to allow (switches to allow-list mode)
    #[clap(long, value_delimiter = ',')]
    pub include_file: Vec<String>,

    /// Emit the directory tree before file contents
    #[clap(long, overrides_with = "no_tree")]
    pub tree: bool,

    /// Do not emit the directory tree
    #[clap(long, overrides_with = "tree")]
    pub no_tree: bool,

    /// Delimiter style for file blocks
    #[clap(long, value_enum)]
    pub style: Option<OutputStyle>,

    /// Heading used by the markdown style
    #[clap(long)]
    pub title: Option<String>,

    /// Add a generation timestamp to the markdown header
    #[clap(long)]
    pub timestamp: bool,

    /// Respect .gitignore and .ignore files
    #[clap(long)]
    pub gitignore: bool,

    /// Replace invalid UTF-8 instead of skipping the file
    #[clap(long)]
    pub lossy: bool,

    /// Skip files larger than this many bytes
    #[clap(long, value_name = "BYTES")]
    pub max_size: Option<u64>,

    /// Summary printed after the run
    #[clap(long, value_enum, default_value_t = ReportFormat::Table)]
    pub report: ReportFormat,

    /// Silence progress and logging
    #[clap(short, long)]
    pub quiet: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[clap(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Directory to dump
    pub target_dir: PathBuf,

    /// Output file path
    pub output_file: PathBuf,

    /// Ignore and include rules
    pub rules: FilterRules,

    /// Delimiter style
    pub style: OutputStyle,

    /// Emit the tree listing first
    pub include_tree: bool,

    /// Heading used by the markdown style
    pub title: String,

    /// Add a generation timestamp (markdown style only)
    pub timestamp: bool,

    /// Respect .gitignore files
    pub respect_gitignore: bool,

    /// Decode invalid UTF-8 lossily
    pub lossy: bool,

    /// Size cap for file contents
    pub max_file_size: Option<u64>,
}

/// Default markdown heading
pub const DEFAULT_TITLE: &str = "CODEBASE DUMP";

impl Config {
    /// Configuration seeded entirely from a preset
    pub fn from_preset(preset: Preset, target_dir: impl Into<PathBuf>) -> Self {
        Self {
            target_dir: target_dir.into(),
            output_file: PathBuf::from(preset.default_output()),
            rules: preset.rules(),
            style: preset.style(),
            include_tree: preset.include_tree(),
            title: DEFAULT_TITLE.to_string(),
            timestamp: false,
            respect_gitignore: false,
            lossy: false,
            max_file_size: None,
        }
    }

    /// Create configuration from command-line arguments
    pub fn from_args(args: Args) -> Self {
        let mut config = Self::from_preset(args.preset, &args.directory_path);

        if let Some(output) = args.output {
            config.output_file = PathBuf::from(output);
        }

        let rules = &mut config.rules;
        if args.no_default_ignores {
            rules.ignored_dirs.clear();
            rules.ignored_extensions.clear();
            rules.ignored_filenames.clear();
        }
        rules.ignored_dirs.extend(args.ignore_dir);
        rules
            .ignored_extensions
            .extend(args.ignore_ext.iter().map(|e| normalize_extension(e)));
        rules.ignored_filenames.extend(args.ignore_file);
        rules.ignore_patterns.extend(args.ignore_patterns);
        rules.always_include.extend(args.always_include);
        rules
            .include_extensions
            .extend(args.include_ext.iter().map(|e| normalize_extension(e)));
        rules.include_filenames.extend(args.include_file);

        if args.tree {
            config.include_tree = true;
        } else if args.no_tree {
            config.include_tree = false;
        }
        if let Some(style) = args.style {
            config.style = style;
        }
        if let Some(title) = args.title {
            config.title = title;
        }
        config.timestamp = args.timestamp;
        config.respect_gitignore = args.gitignore;
        config.lossy = args.lossy;
        config.max_file_size = args.max_size;

        config
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        crate::ensure!(
            self.target_dir.is_dir(),
            PathNotFound,
            "Target directory not found: {}",
            self.target_dir.display()
        );

        crate::ensure!(
            !self.output_file.is_dir(),
            InvalidArgument,
            "Output path is a directory: {}",
            self.output_file.display()
        );

        // Check if output file directory exists
        if let Some(parent) = self.output_file.parent() {
            crate::ensure!(
                parent == Path::new("") || parent.is_dir(),
                PathNotFound,
                "Output directory not found: {}",
                parent.display()
            );
        }

        crate::ensure!(
            self.rules
                .ignore_patterns
                .iter()
                .all(|p| !p.trim().is_empty()),
            Config,
            "Empty ignore pattern"
        );

        Ok(())
    }
}
