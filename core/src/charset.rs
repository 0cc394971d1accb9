//! Output charsets.
//!
//! The controller composes text as precomposed Unicode. Before a string
//! reaches the host it is re-rendered into the charset the user selected.
//! Legacy 8-bit tables are not bundled; hosts register them as additional
//! `Charset` implementations.

use std::sync::Arc;

use ahash::AHashMap;
use unicode_normalization::char::compose;
use unicode_normalization::UnicodeNormalization;

use crate::utils::is_vietnamese_mark;

pub const UNICODE: &str = "Unicode";
pub const UNICODE_COMPOUND: &str = "Unicode Compound";
pub const VIQR: &str = "VIQR";

/// A target encoding for composed Vietnamese text.
pub trait Charset: Send + Sync {
    fn name(&self) -> &str;

    /// Re-render NFC or NFD input. Encoding an already encoded string again
    /// must not change it.
    fn encode(&self, text: &str) -> String;
}

/// Precomposed Unicode (NFC).
#[derive(Debug, Clone, Copy, Default)]
pub struct Unicode;

impl Charset for Unicode {
    fn name(&self) -> &str {
        UNICODE
    }

    fn encode(&self, text: &str) -> String {
        text.nfc().collect()
    }
}

fn is_modifier_mark(mark: char) -> bool {
    matches!(mark, '\u{0302}' | '\u{0306}' | '\u{031B}')
}

/// Split a character into its base letter, vowel modifiers and tone marks.
///
/// Returns `None` for characters that are not a Latin letter carrying only
/// Vietnamese marks.
fn split_marks(ch: char) -> Option<(char, Vec<char>, Vec<char>)> {
    let mut decomposed = ch.nfd();
    let base = decomposed.next()?;
    if !base.is_ascii_alphabetic() {
        return None;
    }
    let mut modifiers = Vec::new();
    let mut tones = Vec::new();
    for mark in decomposed {
        if !is_vietnamese_mark(mark) {
            return None;
        }
        if is_modifier_mark(mark) {
            modifiers.push(mark);
        } else {
            tones.push(mark);
        }
    }
    Some((base, modifiers, tones))
}

/// Base letters keep their vowel modifiers (â, ơ, ư...), tones are emitted as
/// combining characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeCompound;

impl Charset for UnicodeCompound {
    fn name(&self) -> &str {
        UNICODE_COMPOUND
    }

    fn encode(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + 4);
        for ch in text.nfc() {
            match split_marks(ch) {
                Some((base, modifiers, tones)) if !tones.is_empty() => {
                    let letter = modifiers
                        .iter()
                        .fold(base, |acc, &m| compose(acc, m).unwrap_or(acc));
                    out.push(letter);
                    out.extend(tones);
                }
                _ => out.push(ch),
            }
        }
        out
    }
}

/// VIQR mnemonic spelling: `â`→`a^`, `ơ`→`o+`, `ấ`→`a^'`, `đ`→`dd`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Viqr;

impl Viqr {
    fn mnemonic(mark: char) -> Option<char> {
        Some(match mark {
            '\u{0302}' => '^',
            '\u{0306}' => '(',
            '\u{031B}' => '+',
            '\u{0301}' => '\'',
            '\u{0300}' => '`',
            '\u{0309}' => '?',
            '\u{0303}' => '~',
            '\u{0323}' => '.',
            _ => return None,
        })
    }
}

impl Charset for Viqr {
    fn name(&self) -> &str {
        VIQR
    }

    fn encode(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() * 2);
        for ch in text.nfc() {
            match ch {
                'đ' => out.push_str("dd"),
                'Đ' => out.push_str("DD"),
                _ => match split_marks(ch) {
                    Some((base, modifiers, tones)) => {
                        out.push(base);
                        out.extend(modifiers.into_iter().filter_map(Self::mnemonic));
                        out.extend(tones.into_iter().filter_map(Self::mnemonic));
                    }
                    None => out.push(ch),
                },
            }
        }
        out
    }
}

/// Charsets available to sessions, looked up by name.
#[derive(Clone)]
pub struct CharsetRegistry {
    charsets: AHashMap<String, Arc<dyn Charset>>,
    // Registration order, for listing
    names: Vec<String>,
}

impl CharsetRegistry {
    /// Registry holding the built-in charsets.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(Unicode));
        registry.register(Arc::new(UnicodeCompound));
        registry.register(Arc::new(Viqr));
        registry
    }

    /// Registry without any charset; every name encodes as identity.
    pub fn empty() -> Self {
        Self {
            charsets: AHashMap::new(),
            names: Vec::new(),
        }
    }

    /// Add or replace a charset.
    pub fn register(&mut self, charset: Arc<dyn Charset>) {
        let name = charset.name().to_string();
        if self.charsets.insert(name.clone(), charset).is_none() {
            self.names.push(name);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Charset>> {
        self.charsets.get(name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Encode `text` into the charset called `name`. Unknown names leave the
    /// text unchanged.
    pub fn encode(&self, name: &str, text: &str) -> String {
        match self.charsets.get(name) {
            Some(charset) => charset.encode(text),
            None => {
                tracing::warn!(charset = name, "unknown output charset, passing text through");
                text.to_string()
            }
        }
    }
}

impl Default for CharsetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CharsetRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CharsetRegistry")
            .field("names", &self.names)
            .finish()
    }
}
