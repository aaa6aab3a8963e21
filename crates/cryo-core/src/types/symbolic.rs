//! Namespaced symbolic names: keywords and symbols.
//!
//! Both carry an optional namespace and a name. On the wire they are a
//! single UTF-8 string with the namespace joined by `'/'`.

use std::fmt;

/// An interned-style keyword, e.g. `:user/id`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Keyword {
    ns: Option<String>,
    name: String,
}

impl Keyword {
    /// Creates a bare keyword with no namespace.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { ns: None, name: name.into() }
    }

    /// Creates a namespaced keyword.
    #[must_use]
    pub fn namespaced(ns: impl Into<String>, name: impl Into<String>) -> Self {
        Self { ns: Some(ns.into()), name: name.into() }
    }

    /// The namespace, if any.
    #[must_use]
    pub fn ns(&self) -> Option<&str> {
        self.ns.as_deref()
    }

    /// The name part.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The wire form: `ns/name`, or the bare name.
    #[must_use]
    pub fn qualified(&self) -> String {
        qualified(self.ns.as_deref(), &self.name)
    }

    /// Parses the wire form, splitting on the first `'/'`.
    #[must_use]
    pub fn from_qualified(s: &str) -> Self {
        let (ns, name) = split_qualified(s);
        Self { ns, name }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.qualified())
    }
}

/// A symbol, e.g. `my.lib/frobnicate`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol {
    ns: Option<String>,
    name: String,
}

impl Symbol {
    /// Creates a bare symbol with no namespace.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { ns: None, name: name.into() }
    }

    /// Creates a namespaced symbol.
    #[must_use]
    pub fn namespaced(ns: impl Into<String>, name: impl Into<String>) -> Self {
        Self { ns: Some(ns.into()), name: name.into() }
    }

    /// The namespace, if any.
    #[must_use]
    pub fn ns(&self) -> Option<&str> {
        self.ns.as_deref()
    }

    /// The name part.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The wire form: `ns/name`, or the bare name.
    #[must_use]
    pub fn qualified(&self) -> String {
        qualified(self.ns.as_deref(), &self.name)
    }

    /// Parses the wire form, splitting on the first `'/'`.
    #[must_use]
    pub fn from_qualified(s: &str) -> Self {
        let (ns, name) = split_qualified(s);
        Self { ns, name }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified())
    }
}

fn qualified(ns: Option<&str>, name: &str) -> String {
    match ns {
        Some(ns) => format!("{ns}/{name}"),
        None => name.to_owned(),
    }
}

fn split_qualified(s: &str) -> (Option<String>, String) {
    match s.split_once('/') {
        Some((ns, name)) if !ns.is_empty() && !name.is_empty() => {
            (Some(ns.to_owned()), name.to_owned())
        }
        _ => (None, s.to_owned()),
    }
}
