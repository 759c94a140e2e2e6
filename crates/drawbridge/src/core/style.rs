//! draw.io cell style strings
//!
//! draw.io encodes cell appearance as a `;`-terminated list of entries,
//! each either a bare shape name (`text`) or a `key=value` pair
//! (`fillColor=#d5e8d4`). [`Style`] keeps entries in insertion order so the
//! emitted string is stable.

use std::fmt;

/// One entry of a draw.io style string
#[derive(Debug, Clone, PartialEq, Eq)]
enum StyleEntry {
    Flag(String),
    Pair(String, String),
}

/// Ordered draw.io style declaration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Style {
    entries: Vec<StyleEntry>,
}

impl Style {
    /// Create an empty style
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a style that starts with a bare shape name such as `text`
    pub fn named(shape: impl Into<String>) -> Self {
        Self {
            entries: vec![StyleEntry::Flag(shape.into())],
        }
    }

    /// Append a `key=value` entry, replacing an existing entry for `key`
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    /// Set a `key=value` entry in place
    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) {
        let key = key.into();
        let value = value.to_string();
        for entry in &mut self.entries {
            if let StyleEntry::Pair(existing, slot) = entry {
                if *existing == key {
                    *slot = value;
                    return;
                }
            }
        }
        self.entries.push(StyleEntry::Pair(key, value));
    }

    /// Look up the value for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.iter().find_map(|entry| match entry {
            StyleEntry::Pair(k, v) if k == key => Some(v.as_str()),
            _ => None,
        })
    }

    /// Check whether the style is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            match entry {
                StyleEntry::Flag(name) => write!(f, "{};", name)?,
                StyleEntry::Pair(key, value) => write!(f, "{}={};", key, value)?,
            }
        }
        Ok(())
    }
}
