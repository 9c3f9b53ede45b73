//! Shell-safe serialization of `KEY=value` entries.
//!
//! Responsibilities:
//! - Decide whether a value must be quoted.
//! - Render one entry as a line the parser reads back unchanged.
//!
//! Does NOT handle:
//! - Validating keys; the key side is written verbatim.
//! - Unicode-aware quoting. Classification is per byte.
//!
//! Invariants:
//! - Every serialized entry ends with exactly one `\n`.
//! - Quoted values escape `'`, `"`, `\`, `` ` `` and `$`, nothing else.

use crate::constants::{SHELL_SPECIAL_CHARS, WHITESPACE};

/// Returns true if `value` contains a control character, whitespace or a
/// shell metacharacter and therefore has to be double-quoted.
pub fn needs_quoting(value: &str) -> bool {
    value
        .bytes()
        .any(|b| b.is_ascii_control() || WHITESPACE.contains(&b) || SHELL_SPECIAL_CHARS.contains(&b))
}

/// Appends the serialized form of `entry` to `out`.
///
/// Entries without `=` are passed through as-is.
pub fn serialize_pair_into(entry: &str, out: &mut Vec<u8>) {
    let Some((key, value)) = entry.split_once('=') else {
        out.extend_from_slice(entry.as_bytes());
        out.push(b'\n');
        return;
    };

    out.extend_from_slice(key.as_bytes());
    out.push(b'=');

    if needs_quoting(value) {
        out.push(b'"');
        for b in value.bytes() {
            if SHELL_SPECIAL_CHARS.contains(&b) {
                out.push(b'\\');
            }
            out.push(b);
        }
        out.push(b'"');
    } else {
        out.extend_from_slice(value.as_bytes());
    }

    out.push(b'\n');
}

/// Serializes one `KEY=value` entry into a newline-terminated line.
pub fn serialize_pair(entry: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(entry.len() + 3);
    serialize_pair_into(entry, &mut out);
    out
}
