use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::key::Key;

/// The chain of components being resolved on the current call stack,
/// innermost last.
#[derive(Clone)]
pub(crate) struct ResolutionTrace<'a> {
    key: &'a Key,
    previous: Option<&'a ResolutionTrace<'a>>,
}

impl<'a> ResolutionTrace<'a> {
    pub fn new(key: &'a Key) -> Self {
        Self {
            key,
            previous: None,
        }
    }

    /// Starts a new trace or extends `previous` with `key`.
    pub fn extend(previous: Option<&'a ResolutionTrace<'a>>, key: &'a Key) -> Self {
        Self { key, previous }
    }

    pub fn append<'b>(&'b self, key: &'b Key) -> ResolutionTrace<'b> {
        ResolutionTrace {
            key,
            previous: Some(self),
        }
    }

    pub fn key(&self) -> &Key {
        self.key
    }

    pub fn path(&self) -> KeyPath {
        let mut keys = Vec::new();
        let mut this = Some(self);
        while let Some(trace) = this {
            keys.push(trace.key.clone());
            this = trace.previous;
        }
        keys.reverse();
        KeyPath(keys)
    }
}

/// An ordered chain of keys, outermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPath(Vec<Key>);

impl KeyPath {
    pub fn new(keys: Vec<Key>) -> Self {
        Self(keys)
    }

    pub(crate) fn of(trace: Option<&ResolutionTrace<'_>>) -> Self {
        trace.map(ResolutionTrace::path).unwrap_or_default()
    }

    /// Builds the path of a cycle closed by `key`: the keys from the first
    /// occurrence of `key` in `trace` up to the innermost one, followed by
    /// `key` again.
    pub(crate) fn cycle(trace: Option<&ResolutionTrace<'_>>, key: &Key) -> Self {
        let mut keys = Self::of(trace).0;
        if let Some(start) = keys.iter().position(|k| k == key) {
            keys.drain(..start);
        }
        keys.push(key.clone());
        Self(keys)
    }

    pub fn keys(&self) -> &[Key] {
        &self.0
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.0.contains(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for KeyPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        for (i, key) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{key}")?;
        }
        Ok(())
    }
}
