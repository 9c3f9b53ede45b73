//! File-level read entry points.
//!
//! Responsibilities:
//! - Read a file with the bounded reader and run it through the parser.
//! - Expose the selective (`parse_env_file`) and collecting
//!   (`load_env_file`) variants.
//!
//! Does NOT handle:
//! - Writing (see `writer.rs`).
//!
//! Invariants:
//! - On error, `load_env_file` returns no partial list. `parse_env_file`
//!   may already have filled some slots.

use std::path::Path;

use crate::error::Result;
use crate::options::ParseOptions;
use crate::parser::{ParseSummary, parse};
use crate::reader::read_full_file_limited;
use crate::sink::{CollectorSink, SelectiveSink, Sink};

/// Reads `path` and pushes every pair into `sink`.
pub fn parse_env_file_into<S>(
    path: impl AsRef<Path>,
    options: &ParseOptions,
    sink: &mut S,
) -> Result<ParseSummary>
where
    S: Sink + ?Sized,
{
    let path = path.as_ref();
    let contents = read_full_file_limited(path, options.size_limit())?;
    let summary = parse(&contents, options.newline_set(), sink)?;

    tracing::debug!(
        path = %path.display(),
        pairs = summary.pairs(),
        consumed = summary.consumed,
        "Parsed env file"
    );

    Ok(summary)
}

/// Reads the values of the keys named in `sink` from `path`.
///
/// Keys not in the file leave their slot untouched. Keys that appear more
/// than once end up with the last value.
///
/// ```no_run
/// use envfile::{ParseOptions, SelectiveSink, parse_env_file};
///
/// let mut mode = None;
/// let mut state = None;
/// parse_env_file(
///     "/etc/systemd/sleep.conf",
///     &ParseOptions::default(),
///     SelectiveSink::new()
///         .bind("SuspendMode", &mut mode)
///         .bind("SuspendState", &mut state),
/// )?;
/// # Ok::<(), envfile::EnvFileError>(())
/// ```
pub fn parse_env_file(
    path: impl AsRef<Path>,
    options: &ParseOptions,
    mut sink: SelectiveSink<'_>,
) -> Result<()> {
    parse_env_file_into(path, options, &mut sink).map(|_| ())
}

/// Reads every pair from `path` as an ordered list of `KEY=value` strings.
///
/// Absent values become empty strings. Repeated keys are all kept, in file
/// order.
pub fn load_env_file(path: impl AsRef<Path>, options: &ParseOptions) -> Result<Vec<String>> {
    let mut sink = CollectorSink::new();
    parse_env_file_into(path, options, &mut sink)?;
    Ok(sink.into_entries())
}
