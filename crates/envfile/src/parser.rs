//! Byte-driven state machine for shell-style `KEY=value` files.
//!
//! Responsibilities:
//! - Split a buffer into `(key, value)` pairs and push them into a `Sink`.
//! - Handle `#`/`;` comments, single and double quotes, backslash escapes
//!   and backslash-newline continuation.
//! - Trim trailing whitespace from keys and unquoted values.
//!
//! Does NOT handle:
//! - Reading files (see `reader.rs`).
//! - Deciding which keys matter (see `sink.rs`).
//! - Variable expansion or command substitution; `$` and `` ` `` are literal.
//!
//! Invariants:
//! - Exactly one state is active; at most one accumulator changes per byte.
//! - A pair is emitted on a newline after the `=`, or at end of input while
//!   in a value state. Keys without `=` and comments never emit.
//! - A newline byte inside a line (key, unquoted value or comment) ends it
//!   unless escaped; inside quotes it is kept verbatim.
//! - A NUL byte ends the input, wherever it appears.

use crate::constants::{COMMENT_LEADERS, WHITESPACE};
use crate::error::Result;
use crate::sink::{Outcome, Sink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    PreKey,
    Key,
    PreValue,
    Value,
    ValueEscape,
    SingleQuoteValue,
    SingleQuoteValueEscape,
    DoubleQuoteValue,
    DoubleQuoteValueEscape,
    Comment,
    CommentEscape,
}

impl State {
    /// States in which end of input still completes a pair.
    fn flushes_at_eof(self) -> bool {
        matches!(
            self,
            State::PreValue
                | State::Value
                | State::ValueEscape
                | State::SingleQuoteValue
                | State::SingleQuoteValueEscape
                | State::DoubleQuoteValue
                | State::DoubleQuoteValueEscape
        )
    }
}

fn is_whitespace(c: u8) -> bool {
    WHITESPACE.contains(&c)
}

/// Growable field buffer with a trailing-whitespace marker.
#[derive(Debug, Default)]
struct Accumulator {
    buf: Vec<u8>,
    /// Index where the current run of trailing whitespace began.
    trailing: Option<usize>,
}

impl Accumulator {
    fn push(&mut self, c: u8) -> Result<()> {
        self.buf.try_reserve(1)?;
        self.buf.push(c);
        Ok(())
    }

    /// Pushes `c`, moving the trim marker: whitespace opens a run if none is
    /// open, anything else closes it.
    fn push_tracked(&mut self, c: u8) -> Result<()> {
        if !is_whitespace(c) {
            self.trailing = None;
        } else if self.trailing.is_none() {
            self.trailing = Some(self.buf.len());
        }
        self.push(c)
    }

    fn forget_trailing(&mut self) {
        self.trailing = None;
    }

    fn trim(&mut self) {
        if let Some(at) = self.trailing.take() {
            self.buf.truncate(at);
        }
    }

    fn clear(&mut self) {
        self.buf.clear();
        self.trailing = None;
    }

    fn take_string(&mut self) -> String {
        self.trailing = None;
        into_string(std::mem::take(&mut self.buf))
    }
}

/// Decodes a field, replacing invalid UTF-8 sequences with U+FFFD.
fn into_string(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            tracing::debug!("Env file field is not valid UTF-8, decoding lossily");
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    }
}

/// Counts of what the sink did with the emitted pairs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ParseSummary {
    pub consumed: usize,
    pub ignored: usize,
}

impl ParseSummary {
    pub fn pairs(&self) -> usize {
        self.consumed + self.ignored
    }
}

struct Lexer<'n, 's, S: ?Sized> {
    newlines: &'n [u8],
    sink: &'s mut S,
    state: State,
    key: Accumulator,
    value: Accumulator,
    /// Whether any byte has been added to the value since the `=`.
    has_value: bool,
    summary: ParseSummary,
}

impl<S: Sink + ?Sized> Lexer<'_, '_, S> {
    fn is_newline(&self, c: u8) -> bool {
        self.newlines.contains(&c)
    }

    fn push_value(&mut self, c: u8) -> Result<()> {
        self.has_value = true;
        self.value.push(c)
    }

    fn push_value_tracked(&mut self, c: u8) -> Result<()> {
        self.has_value = true;
        self.value.push_tracked(c)
    }

    /// Trims both fields and hands the pair to the sink.
    fn emit(&mut self) -> Result<()> {
        self.key.trim();
        self.value.trim();

        let key = self.key.take_string();
        let value = if self.has_value {
            Some(self.value.take_string())
        } else {
            None
        };
        self.has_value = false;

        tracing::trace!(key = %key, has_value = value.is_some(), "Parsed env pair");

        match self.sink.push(key, value)? {
            Outcome::Consumed => self.summary.consumed += 1,
            Outcome::Ignored => self.summary.ignored += 1,
        }
        Ok(())
    }

    fn feed(&mut self, c: u8) -> Result<()> {
        match self.state {
            State::PreKey => {
                if COMMENT_LEADERS.contains(&c) {
                    self.state = State::Comment;
                } else if !is_whitespace(c) {
                    self.state = State::Key;
                    self.key.forget_trailing();
                    self.key.push(c)?;
                }
            }

            State::Key => {
                if self.is_newline(c) {
                    self.state = State::PreKey;
                    self.key.clear();
                } else if c == b'=' {
                    self.state = State::PreValue;
                    self.value.forget_trailing();
                } else {
                    self.key.push_tracked(c)?;
                }
            }

            State::PreValue => {
                if self.is_newline(c) {
                    self.state = State::PreKey;
                    self.emit()?;
                } else if c == b'\'' {
                    self.state = State::SingleQuoteValue;
                } else if c == b'"' {
                    self.state = State::DoubleQuoteValue;
                } else if c == b'\\' {
                    self.state = State::ValueEscape;
                } else if !is_whitespace(c) {
                    self.state = State::Value;
                    self.push_value(c)?;
                }
            }

            State::Value => {
                if self.is_newline(c) {
                    self.state = State::PreKey;
                    self.emit()?;
                } else if c == b'\\' {
                    self.state = State::ValueEscape;
                    self.value.forget_trailing();
                } else {
                    self.push_value_tracked(c)?;
                }
            }

            State::ValueEscape => {
                self.state = State::Value;
                // Escaped newlines are eaten up entirely.
                if !self.is_newline(c) {
                    self.push_value(c)?;
                }
            }

            State::SingleQuoteValue => {
                if c == b'\'' {
                    self.state = State::PreValue;
                } else if c == b'\\' {
                    self.state = State::SingleQuoteValueEscape;
                } else {
                    self.push_value(c)?;
                }
            }

            State::SingleQuoteValueEscape => {
                self.state = State::SingleQuoteValue;
                if !self.is_newline(c) {
                    self.push_value(c)?;
                }
            }

            State::DoubleQuoteValue => {
                if c == b'"' {
                    self.state = State::PreValue;
                } else if c == b'\\' {
                    self.state = State::DoubleQuoteValueEscape;
                } else {
                    self.push_value(c)?;
                }
            }

            State::DoubleQuoteValueEscape => {
                self.state = State::DoubleQuoteValue;
                if !self.is_newline(c) {
                    self.push_value(c)?;
                }
            }

            State::Comment => {
                if c == b'\\' {
                    self.state = State::CommentEscape;
                } else if self.is_newline(c) {
                    self.state = State::PreKey;
                }
            }

            State::CommentEscape => {
                self.state = State::Comment;
            }
        }

        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if self.state.flushes_at_eof() {
            self.emit()?;
        }
        self.state = State::PreKey;
        Ok(())
    }
}

/// Parses `buffer` and pushes every completed pair into `sink`.
///
/// `newlines` is the set of line-terminating bytes, usually `b"\n\r"`.
/// Input ends at the first NUL byte, if any; nothing after it is parsed.
/// A sink error aborts the parse and is returned unchanged; pairs already
/// pushed stay wherever the sink put them.
pub fn parse<S>(buffer: &[u8], newlines: &[u8], sink: &mut S) -> Result<ParseSummary>
where
    S: Sink + ?Sized,
{
    let mut lexer = Lexer {
        newlines,
        sink,
        state: State::PreKey,
        key: Accumulator::default(),
        value: Accumulator::default(),
        has_value: false,
        summary: ParseSummary::default(),
    };

    let end = match buffer.iter().position(|&b| b == 0) {
        Some(nul) => {
            tracing::debug!(offset = nul, "Input truncated at NUL byte");
            nul
        }
        None => buffer.len(),
    };

    for &c in &buffer[..end] {
        lexer.feed(c)?;
    }
    lexer.finish()?;

    Ok(lexer.summary)
}
