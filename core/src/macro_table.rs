//! Macro (abbreviation) table.
//!
//! Maps a typed abbreviation to its expansion text, e.g. `"vs"` to
//! `"Vietnamese"`. Exact lookups ignore case; the prefix test used to decide
//! whether more typing could still reach a macro does not.

use ahash::AHashMap;
use anyhow::{Context, Result};
use std::path::Path;

use crate::utils::is_word_break_symbol;

/// Case pattern of a typed abbreviation, used to re-case its expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroCase {
    /// "vs" - expansion is lower-cased
    AllSmall,
    /// "VS" - expansion is upper-cased
    AllCapital,
    /// "Vs" - expansion is used as stored
    NoChange,
}

impl MacroCase {
    /// Classify the case of a typed abbreviation.
    pub fn of(text: &str) -> Self {
        let mut chars = text.chars();
        let Some(first) = chars.next() else {
            return MacroCase::NoChange;
        };
        if first.is_lowercase() {
            return MacroCase::AllSmall;
        }
        for ch in chars {
            if ch.is_lowercase() || is_word_break_symbol(ch) {
                return MacroCase::NoChange;
            }
        }
        MacroCase::AllCapital
    }

    /// Apply this case pattern to an expansion.
    pub fn apply(self, expansion: &str) -> String {
        match self {
            MacroCase::AllSmall => expansion.to_lowercase(),
            MacroCase::AllCapital => expansion.to_uppercase(),
            MacroCase::NoChange => expansion.to_string(),
        }
    }
}

/// Shared, read-only abbreviation table.
#[derive(Debug, Clone, Default)]
pub struct MacroTable {
    table: AHashMap<String, String>,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(abbreviation, expansion)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut table = Self::new();
        for (key, text) in pairs {
            table.insert(key, text);
        }
        table
    }

    /// Parse a JSON object of `"abbreviation": "expansion"` entries.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let entries: AHashMap<String, String> =
            serde_json::from_str(content).context("parse macro table json")?;
        Ok(Self { table: entries })
    }

    /// Load a JSON macro table from disk.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read macro table {}", path.display()))?;
        let table = Self::from_json_str(&content)
            .with_context(|| format!("load macro table {}", path.display()))?;
        tracing::info!(entries = table.len(), path = %path.display(), "loaded macro table");
        Ok(table)
    }

    /// Add an entry. The key is stored as given.
    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, key: K, text: V) {
        self.table.insert(key.into(), text.into());
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Whether `key` (any case) maps to a non-empty expansion.
    pub fn has(&self, key: &str) -> bool {
        !self.get(key).is_empty()
    }

    /// Expansion for `key` (any case), or `""` when there is none.
    pub fn get(&self, key: &str) -> &str {
        self.table
            .get(&key.to_lowercase())
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Whether typing could still complete a stored abbreviation.
    ///
    /// Unlike `has`, this compares case-sensitively against the stored keys.
    pub fn has_prefix(&self, key: &str) -> bool {
        if self.table.get(key).is_some_and(|text| !text.is_empty()) {
            return true;
        }
        self.table.keys().any(|k| k.starts_with(key))
    }

    /// Expansion of `key`, re-cased after the typed abbreviation when
    /// `auto_capitalize` is set. Empty when there is no macro.
    pub fn expand(&self, key: &str, auto_capitalize: bool) -> String {
        let text = self.get(key);
        if auto_capitalize {
            MacroCase::of(key).apply(text)
        } else {
            text.to_string()
        }
    }
}
