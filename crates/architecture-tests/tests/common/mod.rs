//! Helpers shared by the architecture test binaries.

// Not every test binary uses every helper.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Finds the workspace root by looking for a Cargo.toml with `[workspace]`.
///
/// Test binaries run from their package directory, so this walks up from
/// the current directory. Falls back to the current directory.
pub fn find_workspace_root() -> PathBuf {
    let current_dir = std::env::current_dir().expect("Failed to get current directory");
    current_dir
        .ancestors()
        .find(|dir| {
            fs::read_to_string(dir.join("Cargo.toml"))
                .is_ok_and(|content| content.contains("[workspace]"))
        })
        .map(Path::to_path_buf)
        .unwrap_or(current_dir)
}

/// The `crates/` directory of the workspace.
pub fn crates_dir() -> PathBuf {
    find_workspace_root().join("crates")
}
