//! Centralized constants for env file reading and writing.
//!
//! This module contains default values used across the reader, parser and
//! writer to avoid magic number duplication.

// =============================================================================
// Reader Limits
// =============================================================================

/// Hard ceiling on the size of a file read into memory (4 MiB).
///
/// Protects against unbounded allocation on corrupt or adversarial files.
pub const MAX_FILE_SIZE: usize = 4 * 1024 * 1024;

/// Initial buffer size when the file size cannot be determined up front.
///
/// Matches the POSIX `LINE_MAX` minimum, so a single line usually fits.
pub const DEFAULT_READ_BUFFER: usize = 2048;

// =============================================================================
// Lexical Classes
// =============================================================================

/// Default line terminators.
pub const DEFAULT_NEWLINES: &[u8] = b"\n\r";

/// Bytes treated as whitespace for skipping and trimming.
pub const WHITESPACE: &[u8] = b" \t\n\r";

/// Bytes that start a comment when seen where a key would begin.
pub const COMMENT_LEADERS: &[u8] = b"#;";

/// Bytes that are backslash-escaped inside a double-quoted value on write.
pub const SHELL_SPECIAL_CHARS: &[u8] = b"'\"\\`$";

// =============================================================================
// Writer Defaults
// =============================================================================

/// Permission bits applied to freshly written files.
pub const DEFAULT_FILE_MODE: u32 = 0o644;

/// Prefix for the sibling temporary file used during atomic replace.
///
/// The target's file name is appended, followed by a random suffix.
pub const TEMP_FILE_PREFIX: &str = ".#";
