//! Reader and atomic writer for shell-style `KEY=value` files.
//!
//! This crate parses files in the format used by `/etc/os-release`,
//! `/etc/locale.conf` and friends: one assignment per line, `#`/`;` comments,
//! single- and double-quoted values, backslash escapes and
//! backslash-newline continuation. Writes go through a sibling temp file and
//! a rename, so readers never see a half-written file.

pub mod constants;
mod error;
mod load;
mod manager;
mod options;
mod parser;
mod quote;
mod reader;
mod sink;
mod writer;

pub use error::{EnvFileError, ErrorKind, Result};
pub use load::{load_env_file, parse_env_file, parse_env_file_into};
pub use manager::EnvFile;
pub use options::{ParseOptions, WriteOptions};
pub use parser::{ParseSummary, parse};
pub use quote::{needs_quoting, serialize_pair, serialize_pair_into};
pub use reader::{read_full_file, read_full_file_limited, read_one_line_file};
pub use sink::{CollectorSink, Outcome, SelectiveSink, Sink};
pub use writer::{
    write_atomic, write_atomic_with, write_env_file, write_env_file_with, write_string_file,
    write_string_file_atomic, write_string_to,
};
