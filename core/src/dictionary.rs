//! Dictionary of known Vietnamese words used for spell checking.
//!
//! Words are stored lower-cased. Small word lists live in an in-memory set;
//! large ones can be compiled into an FST set (see `viet-tools build-dict`)
//! and memory loaded from disk.

use ahash::AHashSet;
use anyhow::{Context, Result};
use fst::Set;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    // In-memory words
    words: AHashSet<String>,
    // Compiled FST artifact
    fst_set: Option<Set<Vec<u8>>>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dictionary from words. Words are lower-cased.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dict = Self::new();
        for word in words {
            dict.insert(word.as_ref());
        }
        dict
    }

    /// Read a word list, one word per line. Blank lines are skipped.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut dict = Self::new();
        for line in reader.lines() {
            let line = line.context("read dictionary line")?;
            let word = line.trim_end_matches('\r');
            if word.is_empty() {
                continue;
            }
            dict.insert(word);
        }
        Ok(dict)
    }

    /// Load a plain-text word list from disk.
    pub fn load_word_list<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("open dictionary {}", path.display()))?;
        let dict = Self::from_reader(BufReader::new(file))?;
        tracing::info!(words = dict.words.len(), path = %path.display(), "loaded word list");
        Ok(dict)
    }

    /// Wrap the bytes of a compiled FST set.
    pub fn from_fst_bytes(bytes: Vec<u8>) -> Result<Self> {
        let set = Set::new(bytes).context("parse dictionary fst")?;
        Ok(Self {
            words: AHashSet::new(),
            fst_set: Some(set),
        })
    }

    /// Load a compiled FST set from disk.
    pub fn load_fst<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut f = File::open(path).with_context(|| format!("open fst {}", path.display()))?;
        let mut buf = Vec::new();
        f.read_to_end(&mut buf)
            .with_context(|| format!("read fst {}", path.display()))?;
        let dict = Self::from_fst_bytes(buf)?;
        tracing::info!(words = dict.len(), path = %path.display(), "loaded dictionary fst");
        Ok(dict)
    }

    /// Add a word (lower-cased).
    pub fn insert(&mut self, word: &str) {
        self.words.insert(word.to_lowercase());
    }

    /// Whether `word` is known. `word` is expected in lower case.
    pub fn contains(&self, word: &str) -> bool {
        if self.words.contains(word) {
            return true;
        }
        self.fst_set.as_ref().is_some_and(|set| set.contains(word))
    }

    /// Number of entries across both stores (words present in both are
    /// counted twice).
    pub fn len(&self) -> usize {
        self.words.len() + self.fst_set.as_ref().map_or(0, Set::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
