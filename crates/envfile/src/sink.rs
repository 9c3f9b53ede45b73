//! Consumers for parsed key/value pairs.
//!
//! Responsibilities:
//! - Define the `Sink` trait the parser pushes every pair into.
//! - Provide `SelectiveSink` (fill caller-owned slots for named keys) and
//!   `CollectorSink` (record every pair as `KEY=value` in file order).
//!
//! Does NOT handle:
//! - Deduplicating keys. The collector keeps every occurrence; callers that
//!   want last-wins semantics apply them when reading the list.
//!
//! Invariants:
//! - Key matching is case-sensitive and exact.
//! - A selective binding is overwritten every time its key recurs; the
//!   first binding with a matching name wins for a given push.

use crate::error::{EnvFileError, Result};

/// What a sink did with a pushed pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The pair was stored.
    Consumed,
    /// The pair was dropped.
    Ignored,
}

/// Receives each `(key, value)` pair produced by the parser.
///
/// `value` is `None` when nothing followed the `=` on the line. Returning
/// an error aborts the parse immediately.
pub trait Sink {
    fn push(&mut self, key: String, value: Option<String>) -> Result<Outcome>;
}

impl<F> Sink for F
where
    F: FnMut(String, Option<String>) -> Result<Outcome>,
{
    fn push(&mut self, key: String, value: Option<String>) -> Result<Outcome> {
        self(key, value)
    }
}

/// A named key and the caller-owned slot that receives its value.
#[derive(Debug)]
struct Binding<'a> {
    name: &'a str,
    slot: &'a mut Option<String>,
}

impl<'a> Binding<'a> {
    fn new(name: &'a str, slot: &'a mut Option<String>) -> Self {
        Self { name, slot }
    }
}

/// Fills caller-supplied slots for a fixed set of keys and ignores the rest.
///
/// ```
/// use envfile::SelectiveSink;
///
/// let mut mode = None;
/// let mut delay = None;
/// let sink = SelectiveSink::new()
///     .bind("SuspendMode", &mut mode)
///     .bind("HibernateDelaySec", &mut delay);
/// # drop(sink);
/// ```
#[derive(Debug, Default)]
pub struct SelectiveSink<'a> {
    bindings: Vec<Binding<'a>>,
}

impl<'a> SelectiveSink<'a> {
    pub fn new() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Adds a binding. Earlier bindings take priority over later ones
    /// with the same name.
    pub fn bind(mut self, name: &'a str, slot: &'a mut Option<String>) -> Self {
        self.bindings.push(Binding::new(name, slot));
        self
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, &'a mut Option<String>)> for SelectiveSink<'a> {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a mut Option<String>)>>(iter: I) -> Self {
        Self {
            bindings: iter
                .into_iter()
                .map(|(name, slot)| Binding::new(name, slot))
                .collect(),
        }
    }
}

impl Sink for SelectiveSink<'_> {
    fn push(&mut self, key: String, value: Option<String>) -> Result<Outcome> {
        match self.bindings.iter_mut().find(|b| b.name == key) {
            Some(binding) => {
                *binding.slot = value;
                Ok(Outcome::Consumed)
            }
            None => Ok(Outcome::Ignored),
        }
    }
}

/// Records every pair as a `KEY=value` string, in file order.
#[derive(Debug, Default, Clone)]
pub struct CollectorSink {
    entries: Vec<String>,
}

impl CollectorSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<String> {
        self.entries
    }
}

impl Sink for CollectorSink {
    fn push(&mut self, key: String, value: Option<String>) -> Result<Outcome> {
        let value = value.unwrap_or_default();

        let mut line = String::new();
        line.try_reserve_exact(key.len() + 1 + value.len())
            .and_then(|()| self.entries.try_reserve(1))
            .map_err(|_| EnvFileError::SinkRejected {
                key: key.clone(),
                reason: "out of memory".to_string(),
            })?;

        line.push_str(&key);
        line.push('=');
        line.push_str(&value);
        self.entries.push(line);

        Ok(Outcome::Consumed)
    }
}
