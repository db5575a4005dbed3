/*!
 * treedump - Concatenate a filtered directory tree into a single text file
 *
 * Walks a root directory, prunes ignored folders before descending, keeps the
 * files that pass the filter rules, and writes their contents as framed
 * blocks into one output file, optionally preceded by a tree listing.
 */

pub mod config;
pub mod dumper;
pub mod error;
pub mod filter;
pub mod reader;
pub mod report;
pub mod tree;
pub mod types;
pub mod utils;
pub mod walker;
pub mod writer;


// Re-export main components for easier access
pub use config::{Config, Preset};
pub use dumper::{Dumper, ScannerStatistics};
pub use error::{DumpError, Result};
pub use filter::{extension_of, FilterRules, Verdict};
pub use reader::{ContentReader, ReadError};
pub use report::{FileReportInfo, ReportFormat, Reporter, ScanReport};
pub use tree::TreeRenderer;
pub use types::{EntryKind, FileRecord, SkippedFile, WalkEntry};
pub use walker::Walker;
pub use writer::{DumpWriter, OutputStyle};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
