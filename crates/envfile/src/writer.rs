//! Writing strings and env files to disk.
//!
//! Responsibilities:
//! - Atomically replace a file: write a sibling temp file, flush, rename.
//! - Write a single line directly or atomically.
//! - Serialize an ordered `KEY=value` list with shell-safe quoting.
//!
//! Does NOT handle:
//! - Coordinating concurrent writers. The last rename wins.
//! - fsync of the file or its directory; durability across power loss is
//!   left to the caller.
//!
//! Invariants:
//! - The temp file lives in the target's directory so the rename never
//!   crosses filesystems.
//! - Every failure after the temp file exists removes it before returning.
//! - The target is either untouched or holds exactly the new content.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::constants::TEMP_FILE_PREFIX;
use crate::error::{EnvFileError, Result};
use crate::options::WriteOptions;
use crate::quote::serialize_pair_into;

/// Writes `line` to `writer`, adding a trailing newline if missing, and
/// flushes.
pub fn write_string_to<W: Write + ?Sized>(writer: &mut W, line: &str) -> io::Result<()> {
    writer.write_all(line.as_bytes())?;
    if !line.ends_with('\n') {
        writer.write_all(b"\n")?;
    }
    writer.flush()
}

/// Writes `line` to `path` in place, truncating any previous content.
///
/// Readers may observe a partially written file; use
/// [`write_string_file_atomic`] when that matters.
pub fn write_string_file(path: impl AsRef<Path>, line: &str) -> Result<()> {
    let path = path.as_ref();
    let mut file = File::create(path).map_err(|e| EnvFileError::io(path, e))?;
    write_string_to(&mut file, line).map_err(|e| EnvFileError::io(path, e))
}

/// Atomically replaces `path` with `line` (plus a trailing newline if missing).
pub fn write_string_file_atomic(path: impl AsRef<Path>, line: &str) -> Result<()> {
    write_atomic(path, |w| write_string_to(w, line))
}

/// Atomically replaces `path` with the serialized `entries`.
///
/// Each entry is a `KEY=value` string; values are double-quoted and
/// escaped when they contain whitespace, control characters or shell
/// metacharacters.
pub fn write_env_file<S: AsRef<str>>(path: impl AsRef<Path>, entries: &[S]) -> Result<()> {
    write_env_file_with(path, entries, &WriteOptions::default())
}

/// Like [`write_env_file`], with explicit options.
pub fn write_env_file_with<S: AsRef<str>>(
    path: impl AsRef<Path>,
    entries: &[S],
    options: &WriteOptions,
) -> Result<()> {
    let mut line = Vec::new();
    write_atomic_with(path, options, |w| {
        for entry in entries {
            line.clear();
            serialize_pair_into(entry.as_ref(), &mut line);
            w.write_all(&line)?;
        }
        Ok(())
    })
}

/// Atomically replaces `path` with whatever `produce` writes.
pub fn write_atomic<F>(path: impl AsRef<Path>, produce: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    write_atomic_with(path, &WriteOptions::default(), produce)
}

/// Atomically replaces `path` with whatever `produce` writes, applying the
/// permission bits from `options` as filtered by the process umask.
///
/// The temp file is created with owner-only permissions and only widened to
/// the requested mode before any content is written.
pub fn write_atomic_with<F>(path: impl AsRef<Path>, options: &WriteOptions, produce: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let prefix = format!(
        "{}{}",
        TEMP_FILE_PREFIX,
        path.file_name().unwrap_or_default().to_string_lossy()
    );

    let mut temp = tempfile::Builder::new()
        .prefix(&prefix)
        .tempfile_in(dir)
        .map_err(|e| EnvFileError::io(dir, e))?;

    if let Err(e) = fill(&mut temp, options, produce) {
        discard(temp);
        return Err(EnvFileError::io(path, e));
    }

    if let Err(e) = temp.persist(path) {
        discard(e.file);
        return Err(EnvFileError::io(path, e.error));
    }

    tracing::debug!(
        path = %path.display(),
        mode = format_args!("{:o}", options.file_mode()),
        "File saved atomically"
    );

    Ok(())
}

fn fill<F>(temp: &mut NamedTempFile, options: &WriteOptions, produce: F) -> io::Result<()>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    set_mode(temp.as_file(), options.file_mode())?;

    let mut writer = BufWriter::new(temp.as_file_mut());
    produce(&mut writer)?;
    writer.flush()
}

/// Applies `mode` minus the bits cleared by the process umask.
#[cfg(unix)]
fn set_mode(file: &File, mode: u32) -> io::Result<()> {
    use nix::sys::stat::{Mode, umask};
    use std::os::unix::fs::PermissionsExt;

    // umask(2) can only be read by setting it; put the old value straight back.
    let mask = umask(Mode::empty());
    umask(mask);

    let effective = mode & !u32::from(mask.bits()) & 0o7777;
    file.set_permissions(std::fs::Permissions::from_mode(effective))
}

#[cfg(not(unix))]
fn set_mode(_file: &File, _mode: u32) -> io::Result<()> {
    Ok(())
}

/// Unlinks a temp file that will not be renamed into place.
fn discard(temp: NamedTempFile) {
    let temp_path = temp.path().to_path_buf();
    if let Err(e) = temp.close() {
        tracing::warn!(
            path = %temp_path.display(),
            error = %e,
            "Failed to remove temporary file"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn dir_entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_write_string_to_appends_newline_once() {
        let mut out = Vec::new();
        write_string_to(&mut out, "hello").unwrap();
        write_string_to(&mut out, "world\n").unwrap();
        assert_eq!(out, b"hello\nworld\n");
    }

    #[test]
    fn test_write_string_file_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state");
        fs::write(&path, "much longer previous content\n").unwrap();

        write_string_file(&path, "mem").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "mem\n");
    }

    #[test]
    fn test_write_string_file_atomic_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hostname");
        fs::write(&path, "old\n").unwrap();

        write_string_file_atomic(&path, "new-host").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new-host\n");
        assert_eq!(dir_entries(dir.path()), vec!["hostname"]);
    }

    #[test]
    fn test_producer_error_leaves_target_and_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locale.conf");
        fs::write(&path, "LANG=C\n").unwrap();

        let err = write_atomic(&path, |w| {
            w.write_all(b"LANG=de_DE.UTF-8\n")?;
            Err(io::Error::other("simulated write failure"))
        })
        .unwrap_err();

        assert!(matches!(err, EnvFileError::Io { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "LANG=C\n");
        assert_eq!(dir_entries(dir.path()), vec!["locale.conf"]);
    }

    #[test]
    fn test_rename_failure_removes_temp() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("occupied");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep"), "x").unwrap();

        let err = write_string_file_atomic(&target, "data").unwrap_err();

        assert!(matches!(err, EnvFileError::Io { .. }));
        assert_eq!(dir_entries(dir.path()), vec!["occupied"]);
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("file.env");
        let err = write_env_file(&path, &["A=1"]).unwrap_err();
        assert_eq!(
            err.io_error().map(io::Error::kind),
            Some(io::ErrorKind::NotFound)
        );
    }

    #[test]
    fn test_write_env_file_quotes_as_needed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vconsole.conf");

        write_env_file(&path, &["A=hello world", "B=simple", "garbage"]).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "A=\"hello world\"\nB=simple\ngarbage\n"
        );
    }

    #[test]
    fn test_write_empty_list_creates_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.env");
        let entries: [&str; 0] = [];

        write_env_file(&path, &entries).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"");
    }
}
