//! Method signatures and per-generic method tables

use crate::class::{ANY, MISSING};
use crate::dispatch::MethodCall;
use crate::error::Result;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Method implementation; receives the bound call and its next-method chain
pub type MethodFn = Arc<dyn Fn(&mut MethodCall<'_>) -> Result<Value> + Send + Sync>;

/// One position of a method signature
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Specializer {
    /// Matches the class and its subclasses
    Class(String),
    /// Matches anything, scored below every concrete class
    Any,
    /// Matches only an omitted argument
    Missing,
}

impl Specializer {
    /// Name used in messages and for the lexicographic tie-break
    pub fn label(&self) -> &str {
        match self {
            Specializer::Class(name) => name,
            Specializer::Any => ANY,
            Specializer::Missing => MISSING,
        }
    }
}

impl From<&str> for Specializer {
    fn from(name: &str) -> Self {
        match name {
            ANY => Specializer::Any,
            MISSING => Specializer::Missing,
            _ => Specializer::Class(name.to_string()),
        }
    }
}

impl From<String> for Specializer {
    fn from(name: String) -> Self {
        Specializer::from(name.as_str())
    }
}

impl fmt::Display for Specializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ordered specializers, one per dispatched parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Signature(Vec<Specializer>);

impl Signature {
    pub fn new<I, S>(specializers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Specializer>,
    {
        Self(specializers.into_iter().map(Into::into).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Specializer> {
        self.0.iter()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.0.iter().map(Specializer::label).collect()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let quoted: Vec<String> = self.0.iter().map(|s| format!("\"{}\"", s.label())).collect();
        write!(f, "({})", quoted.join(", "))
    }
}

impl IntoIterator for Signature {
    type Item = Specializer;
    type IntoIter = std::vec::IntoIter<Specializer>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Signature {
    type Item = &'a Specializer;
    type IntoIter = std::slice::Iter<'a, Specializer>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A method registered on a generic
#[derive(Clone)]
pub struct MethodEntry {
    pub generic: String,
    pub signature: Signature,
    pub(crate) implementation: MethodFn,
}

impl MethodEntry {
    pub fn new(generic: impl Into<String>, signature: Signature, implementation: MethodFn) -> Self {
        Self {
            generic: generic.into(),
            signature,
            implementation,
        }
    }
}

impl fmt::Debug for MethodEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodEntry")
            .field("generic", &self.generic)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// Methods of one generic, at most one per signature
#[derive(Debug, Clone, Default)]
pub struct MethodTable {
    entries: Vec<MethodEntry>,
}

impl MethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a method, replacing any method with the same signature
    pub fn insert(&mut self, entry: MethodEntry) {
        if let Some(existing) = self
            .entries
            .iter_mut()
            .find(|existing| existing.signature == entry.signature)
        {
            *existing = entry;
        } else {
            self.entries.push(entry);
        }
    }

    pub fn remove(&mut self, signature: &Signature) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| &entry.signature != signature);
        self.entries.len() != before
    }

    pub fn get(&self, signature: &Signature) -> Option<&MethodEntry> {
        self.entries.iter().find(|entry| &entry.signature == signature)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MethodEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
