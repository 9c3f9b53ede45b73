//! Tunable settings for reading and writing env files.
//!
//! Responsibilities:
//! - Define `ParseOptions` (line terminators, size ceiling) and
//!   `WriteOptions` (permission bits) with their defaults.
//!
//! Does NOT handle:
//! - Validation of keys or values.
//!
//! Invariants:
//! - `ParseOptions::newlines` is never empty; an empty set falls back to
//!   the defaults.

use crate::constants::{DEFAULT_FILE_MODE, DEFAULT_NEWLINES, MAX_FILE_SIZE};

/// Settings for reading and parsing an env file.
///
/// # Default Values
///
/// - `newlines`: `"\n\r"`
/// - `max_size`: 4 MiB
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    newlines: Vec<u8>,
    max_size: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            newlines: DEFAULT_NEWLINES.to_vec(),
            max_size: MAX_FILE_SIZE,
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the bytes that terminate a line.
    ///
    /// An empty set restores the default `"\n\r"`.
    pub fn newlines(mut self, newlines: impl AsRef<[u8]>) -> Self {
        let newlines = newlines.as_ref();
        self.newlines = if newlines.is_empty() {
            DEFAULT_NEWLINES.to_vec()
        } else {
            newlines.to_vec()
        };
        self
    }

    /// Sets the largest file, in bytes, that will be read.
    pub fn max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn newline_set(&self) -> &[u8] {
        &self.newlines
    }

    pub fn size_limit(&self) -> usize {
        self.max_size
    }
}

/// Settings for writing an env file.
///
/// # Default Values
///
/// - `mode`: `0o644`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    mode: u32,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            mode: DEFAULT_FILE_MODE,
        }
    }
}

impl WriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the permission bits of the written file, before the process
    /// umask is applied (ignored off Unix).
    pub fn mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }

    pub fn file_mode(&self) -> u32 {
        self.mode
    }
}
