/*!
 * Fallible text reading
 *
 * Every read returns a `Result`; callers decide whether a failure skips the
 * file. Nothing here aborts a run.
 */

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;
use std::str;

use thiserror::Error;

/// Bytes inspected by the text/binary pre-check
pub const PEEK_LEN: usize = 1024;

/// Reasons a single file could not be read as text
#[derive(Error, Debug)]
pub enum ReadError {
    /// Open, stat or read failed
    #[error("{0}")]
    Io(#[from] io::Error),

    /// A NUL byte was found in the leading bytes
    #[error("binary content")]
    Binary,

    /// Content is not valid UTF-8
    #[error("invalid UTF-8: {0}")]
    Decode(#[from] str::Utf8Error),

    /// Larger than the configured cap
    #[error("file too large ({size} bytes, limit {limit})")]
    TooLarge { size: u64, limit: u64 },

    /// FIFO, socket, device or anything else that is not a regular file
    #[error("not a regular file")]
    NotRegular,
}

/// Result of the cheap pre-check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    /// Leading bytes look like UTF-8 text
    Text,
    /// Leading bytes contain a NUL
    Binary,
    /// Leading bytes are not UTF-8
    Undecodable,
}

/// Reads file contents as UTF-8 text
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentReader {
    lossy: bool,
    max_file_size: Option<u64>,
}

impl ContentReader {
    /// Create a reader. With `lossy`, invalid sequences are replaced instead
    /// of failing the read.
    pub fn new(lossy: bool, max_file_size: Option<u64>) -> Self {
        Self {
            lossy,
            max_file_size,
        }
    }

    /// Classify a file from its first kilobyte
    pub fn peek(&self, path: &Path) -> Result<TextKind, ReadError> {
        if !fs::metadata(path)?.is_file() {
            return Err(ReadError::NotRegular);
        }
        Ok(classify(&self.sample(path)?))
    }

    // Opening must only happen after the regular-file check: a FIFO with no
    // writer blocks in open(2).
    fn sample(&self, path: &Path) -> Result<Vec<u8>, ReadError> {
        let mut buffer = vec![0u8; PEEK_LEN];
        let mut file = File::open(path)?;
        let mut filled = 0;
        while filled < PEEK_LEN {
            match file.read(&mut buffer[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        buffer.truncate(filled);
        Ok(buffer)
    }

    /// Read the whole file as text
    pub fn read(&self, path: &Path) -> Result<String, ReadError> {
        let metadata = fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(ReadError::NotRegular);
        }
        if let Some(limit) = self.max_file_size {
            if metadata.len() > limit {
                return Err(ReadError::TooLarge {
                    size: metadata.len(),
                    limit,
                });
            }
        }

        let prefix = self.sample(path)?;
        match classify(&prefix) {
            TextKind::Binary => return Err(ReadError::Binary),
            TextKind::Undecodable if !self.lossy => {
                if let Err(e) = str::from_utf8(&prefix) {
                    return Err(e.into());
                }
            }
            _ => {}
        }

        let bytes = fs::read(path)?;
        if self.lossy {
            return Ok(String::from_utf8_lossy(&bytes).into_owned());
        }
        let text = str::from_utf8(&bytes)?;
        Ok(text.to_string())
    }
}

/// Classify a byte prefix. A multi-byte sequence cut off at the end of the
/// prefix is not treated as a decode failure.
pub fn classify(bytes: &[u8]) -> TextKind {
    if bytes.contains(&0) {
        return TextKind::Binary;
    }
    match str::from_utf8(bytes) {
        Ok(_) => TextKind::Text,
        Err(e) if e.error_len().is_none() => TextKind::Text,
        Err(_) => TextKind::Undecodable,
    }
}
