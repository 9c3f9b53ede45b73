//! Read-modify-write handle for a single env file.
//!
//! Responsibilities:
//! - Load an env file into an ordered `KEY=value` list.
//! - Look up, set and remove keys in that list.
//! - Save the list back atomically.
//!
//! Does NOT handle:
//! - Detecting changes made on disk since `open`; `save` overwrites them.
//! - Validating key names.
//!
//! Invariants:
//! - Entry order is file order; `set` on an existing key keeps its position.
//! - A missing file opens as an empty list and is created on `save`.
//! - Lookups are last-wins, matching how a shell sources the file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{EnvFileError, Result};
use crate::load::load_env_file;
use crate::options::{ParseOptions, WriteOptions};
use crate::writer::write_env_file_with;

/// An env file loaded into memory.
#[derive(Debug, Clone)]
pub struct EnvFile {
    path: PathBuf,
    entries: Vec<String>,
    write_options: WriteOptions,
}

fn entry_key(entry: &str) -> &str {
    entry.split_once('=').map_or(entry, |(key, _)| key)
}

impl EnvFile {
    /// Loads `path` with default options.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open_with(path, &ParseOptions::default(), WriteOptions::default())
    }

    /// Loads `path`, treating a missing file as empty.
    pub fn open_with(
        path: impl Into<PathBuf>,
        parse_options: &ParseOptions,
        write_options: WriteOptions,
    ) -> Result<Self> {
        let path = path.into();
        let entries = match load_env_file(&path, parse_options) {
            Ok(entries) => entries,
            Err(EnvFileError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Env file does not exist, starting empty");
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            path,
            entries,
            write_options,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the last value recorded for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find_map(|entry| match entry.split_once('=') {
                Some((k, v)) if k == key => Some(v),
                _ => None,
            })
    }

    /// Sets `key` to `value`.
    ///
    /// The first existing entry for `key` is replaced in place and any later
    /// duplicates are dropped; otherwise the entry is appended.
    pub fn set(&mut self, key: &str, value: &str) {
        let entry = format!("{key}={value}");
        match self.entries.iter().position(|e| entry_key(e) == key) {
            Some(first) => {
                self.entries[first] = entry;
                let mut index = 0;
                self.entries.retain(|e| {
                    let keep = index <= first || entry_key(e) != key;
                    index += 1;
                    keep
                });
            }
            None => self.entries.push(entry),
        }
    }

    /// Removes every entry for `key`. Returns true if anything was removed.
    pub fn unset(&mut self, key: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| entry_key(e) != key);
        self.entries.len() != before
    }

    /// Writes the entries back to the file atomically.
    pub fn save(&self) -> Result<()> {
        write_env_file_with(&self.path, &self.entries, &self.write_options)?;

        tracing::debug!(
            path = %self.path.display(),
            entries = self.entries.len(),
            "Env file saved"
        );

        Ok(())
    }
}
