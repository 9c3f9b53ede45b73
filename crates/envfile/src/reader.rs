//! Bounded whole-file reads.
//!
//! Responsibilities:
//! - Read an entire file into memory with a hard size ceiling.
//! - Read the first line of a file.
//!
//! Does NOT handle:
//! - Parsing (see `parser.rs`).
//! - Non-seekable or streaming sources beyond what `Read` gives us.
//!
//! Invariants:
//! - Files larger than the ceiling fail with `TooLarge`; a file of exactly
//!   the ceiling is accepted.
//! - The returned buffer holds exactly the bytes read, nothing more.
//! - The buffer grows by doubling and never past `limit + 1` bytes.

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::path::Path;

use crate::constants::{DEFAULT_NEWLINES, DEFAULT_READ_BUFFER, MAX_FILE_SIZE};
use crate::error::{EnvFileError, Result};

/// Reads a whole file, failing if it is larger than 4 MiB.
pub fn read_full_file(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    read_full_file_limited(path, MAX_FILE_SIZE)
}

/// Reads a whole file, failing if it is larger than `limit` bytes.
///
/// The size reported by the filesystem is only a hint: files that report
/// zero (procfs, sysfs) or that grow while being read are still bounded,
/// since the read loop itself enforces the limit.
pub fn read_full_file_limited(path: impl AsRef<Path>, limit: usize) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let mut file = File::open(path).map_err(|e| EnvFileError::io(path, e))?;
    let size = file.metadata().map_err(|e| EnvFileError::io(path, e))?.len();

    if size > limit as u64 {
        return Err(EnvFileError::TooLarge {
            path: path.to_path_buf(),
            size,
            limit,
        });
    }

    // One byte of headroom lets us see EOF without a further doubling and
    // tells an exactly-at-limit file apart from an oversized one.
    let ceiling = limit.saturating_add(1);
    let initial = if size > 0 {
        (size as usize).saturating_add(1)
    } else {
        DEFAULT_READ_BUFFER
    }
    .min(ceiling);

    let mut buf: Vec<u8> = Vec::new();
    let mut len = 0;

    loop {
        if len == buf.len() {
            let next = if buf.is_empty() {
                initial
            } else {
                buf.len().saturating_mul(2).min(ceiling)
            };
            buf.try_reserve_exact(next - buf.len())?;
            buf.resize(next, 0);
        }

        match file.read(&mut buf[len..]) {
            Ok(0) => break,
            Ok(k) => {
                len += k;
                if len > limit {
                    return Err(EnvFileError::TooLarge {
                        path: path.to_path_buf(),
                        size: len as u64,
                        limit,
                    });
                }
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(EnvFileError::io(path, e)),
        }
    }

    buf.truncate(len);

    tracing::debug!(path = %path.display(), bytes = len, "Read file");

    Ok(buf)
}

/// Reads the first line of a file with trailing newline bytes removed.
///
/// At most `LINE_MAX - 1` bytes are read. An empty file yields an empty
/// string.
pub fn read_one_line_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| EnvFileError::io(path, e))?;

    let mut line = Vec::new();
    BufReader::new(file)
        .take(DEFAULT_READ_BUFFER as u64 - 1)
        .read_until(b'\n', &mut line)
        .map_err(|e| EnvFileError::io(path, e))?;

    while line.last().is_some_and(|b| DEFAULT_NEWLINES.contains(b)) {
        line.pop();
    }

    Ok(String::from_utf8_lossy(&line).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn file_with(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_read_full_file_returns_exact_bytes() {
        let file = file_with(b"A=1\nB=2\n");
        let buf = read_full_file(file.path()).unwrap();
        assert_eq!(buf, b"A=1\nB=2\n");
    }

    #[test]
    fn test_read_empty_file() {
        let file = file_with(b"");
        assert!(read_full_file(file.path()).unwrap().is_empty());
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_full_file(dir.path().join("missing.env")).unwrap_err();
        assert!(matches!(err, EnvFileError::Io { .. }));
        assert_eq!(
            err.io_error().map(std::io::Error::kind),
            Some(ErrorKind::NotFound)
        );
    }

    #[test]
    fn test_limit_is_inclusive() {
        let file = file_with(&[b'x'; 64]);
        assert_eq!(read_full_file_limited(file.path(), 64).unwrap().len(), 64);

        let err = read_full_file_limited(file.path(), 63).unwrap_err();
        match err {
            EnvFileError::TooLarge { size, limit, .. } => {
                assert_eq!(size, 64);
                assert_eq!(limit, 63);
            }
            other => panic!("expected TooLarge, got {other:?}"),
        }
    }

    #[test]
    fn test_growth_beyond_default_buffer() {
        // The size hint sizes the buffer in one step here; the doubling path
        // is covered by the procfs tests below.
        let content = vec![b'k'; DEFAULT_READ_BUFFER * 5 + 3];
        let file = file_with(&content);
        assert_eq!(read_full_file(file.path()).unwrap(), content);
    }

    // procfs files report a size of zero, so the reader has to grow its
    // buffer from the default and can only detect oversize while reading.
    #[cfg(target_os = "linux")]
    #[test]
    fn test_unsized_file_is_read_completely() {
        let content = read_full_file("/proc/self/maps").unwrap();

        assert_eq!(fs::metadata("/proc/self/maps").unwrap().len(), 0);
        assert!(content.ends_with(b"\n"));
        for line in content.split(|&b| b == b'\n').filter(|l| !l.is_empty()) {
            let fields = line.split(|&b| b == b' ').filter(|f| !f.is_empty()).count();
            assert!(fields >= 5, "truncated maps line: {:?}", String::from_utf8_lossy(line));
        }
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_unsized_file_over_limit_is_too_large() {
        let err = read_full_file_limited("/proc/self/maps", 100).unwrap_err();

        match err {
            EnvFileError::TooLarge { size, limit, .. } => {
                assert_eq!(limit, 100);
                assert_eq!(size, 101);
            }
            other => panic!("expected TooLarge, got {other:?}"),
        }
    }

    #[test]
    fn test_read_one_line_file_strips_newline() {
        let file = file_with(b"first line\r\nsecond\n");
        assert_eq!(read_one_line_file(file.path()).unwrap(), "first line");
    }

    #[test]
    fn test_read_one_line_file_empty() {
        let file = file_with(b"");
        assert_eq!(read_one_line_file(file.path()).unwrap(), "");
    }

    #[test]
    fn test_read_one_line_file_without_newline() {
        let file = file_with(b"suspend");
        assert_eq!(read_one_line_file(file.path()).unwrap(), "suspend");
    }
}
