//! Error types for env file reading and writing.
//!
//! Responsibilities:
//! - Define the error variants for every reader, parser, sink and writer failure.
//! - Attach the offending path to I/O failures.
//!
//! Does NOT handle:
//! - Retrying failed operations (callers decide).
//! - Rolling back selective sink slots that were filled before a failure.
//!
//! Invariants:
//! - Error messages include paths, sizes and key names, never values, so
//!   secrets stored in env files cannot leak into logs.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = EnvFileError> = std::result::Result<T, E>;

/// Errors that can occur while reading, parsing or writing env files.
#[derive(Error, Debug)]
pub enum EnvFileError {
    /// Open, stat, read, write, flush, rename or unlink failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A buffer could not grow to hold more input.
    #[error("Out of memory while growing a parse buffer")]
    OutOfMemory,

    /// The file exceeds the configured read ceiling.
    #[error("File {path} is too large ({size} bytes, limit is {limit} bytes)")]
    TooLarge {
        path: PathBuf,
        size: u64,
        limit: usize,
    },

    /// A sink refused a parsed pair.
    #[error("Sink rejected key '{key}': {reason}")]
    SinkRejected { key: String, reason: String },
}

/// Coarse classification of an [`EnvFileError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    OutOfMemory,
    TooLarge,
    SinkRejected,
}

impl EnvFileError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        EnvFileError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Returns the coarse kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EnvFileError::Io { .. } => ErrorKind::Io,
            EnvFileError::OutOfMemory => ErrorKind::OutOfMemory,
            EnvFileError::TooLarge { .. } => ErrorKind::TooLarge,
            EnvFileError::SinkRejected { .. } => ErrorKind::SinkRejected,
        }
    }

    /// Returns the underlying OS error for I/O failures.
    pub fn io_error(&self) -> Option<&std::io::Error> {
        match self {
            EnvFileError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<std::collections::TryReserveError> for EnvFileError {
    fn from(_: std::collections::TryReserveError) -> Self {
        EnvFileError::OutOfMemory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind as IoErrorKind;

    #[test]
    fn test_kind_matches_variant() {
        let err = EnvFileError::io(
            Path::new("/etc/locale.conf"),
            std::io::Error::from(IoErrorKind::NotFound),
        );
        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(
            err.io_error().map(std::io::Error::kind),
            Some(IoErrorKind::NotFound)
        );

        assert_eq!(EnvFileError::OutOfMemory.kind(), ErrorKind::OutOfMemory);
        assert!(EnvFileError::OutOfMemory.io_error().is_none());
    }

    #[test]
    fn test_too_large_message_includes_size_and_limit() {
        let err = EnvFileError::TooLarge {
            path: PathBuf::from("big.env"),
            size: 5_000_000,
            limit: 4_194_304,
        };
        let msg = err.to_string();
        assert!(msg.contains("big.env"));
        assert!(msg.contains("5000000"));
        assert!(msg.contains("4194304"));
    }

    #[test]
    fn test_sink_rejected_message_names_key_only() {
        let err = EnvFileError::SinkRejected {
            key: "PASSWORD".to_string(),
            reason: "duplicate".to_string(),
        };
        assert_eq!(err.to_string(), "Sink rejected key 'PASSWORD': duplicate");
    }
}
