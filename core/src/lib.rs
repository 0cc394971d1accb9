//! libviet-core
//!
//! Per-keystroke composition controller for Vietnamese input methods.
//!
//! The controller sits between a host text-input framework and a diacritic
//! composition engine (Telex, VNI, VIQR, ...). For every key it decides
//! whether to extend the preedit, commit text, fall back to the literal
//! English spelling or expand a macro.
//!
//! Public API:
//! - `ImeEngine` - Key event controller (one per focused input context)
//! - `CompositionEngine` - Contract the external diacritic engine implements
//! - `Fallback` - Vietnamese vs. English classification of the buffer
//! - `MacroTable` - Case-insensitive abbreviation expansion
//! - `Dictionary` - Known Vietnamese words for spell checking
//! - `CharsetRegistry` - Output charset encoders
//! - `Config` - Options and feature flags
use serde::{Deserialize, Serialize};

pub mod engine;
pub use engine::{CompositionEngine, EngineFlags, Mode};

pub mod macro_table;
pub use macro_table::{MacroCase, MacroTable};

pub mod dictionary;
pub use dictionary::Dictionary;

pub mod fallback;
pub use fallback::Fallback;

pub mod charset;
pub use charset::{Charset, CharsetRegistry};

pub mod context;
pub use context::ImeContext;

pub mod session;
pub use session::ImeSession;

pub mod ime_engine;
pub use ime_engine::{keysym, ImeEngine, KeyEvent, KeyResult, Modifiers};

/// Tone mark placement style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToneMarkStyle {
    /// òa, úy
    #[default]
    Classic,
    /// oà, uý
    Modern,
}

/// What the controller reports back to the host for keys it did not compose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyReporting {
    /// Only keys the controller consumed are reported as handled.
    #[default]
    Strict,
    /// Printable keys are let through and reported by their printability.
    Printable,
}

/// Options of a Vietnamese input session.
///
/// All fields have defaults, so a TOML file only needs to list the options
/// it changes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Restore the typed keys when the buffer is not a Vietnamese word
    pub auto_non_vn_restore: bool,
    /// Keep "dd"/"đ" sequences even outside Vietnamese words (abbreviations)
    pub dd_free_style: bool,
    /// Expand macros from the shared macro table
    pub macro_enabled: bool,
    /// Follow the case of the typed abbreviation when expanding a macro
    pub auto_capitalize_macro: bool,
    /// Use the dictionary instead of syllable rules for word-break decisions
    pub spell_check_with_dicts: bool,
    /// Name of the output charset (see `CharsetRegistry::names`)
    pub output_charset: String,
    pub tone_mark_style: ToneMarkStyle,
    pub free_tone_marking: bool,
    pub key_reporting: KeyReporting,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auto_non_vn_restore: true,
            dd_free_style: true,
            macro_enabled: false,
            auto_capitalize_macro: false,
            spell_check_with_dicts: true,
            output_charset: charset::UNICODE.to_string(),
            tone_mark_style: ToneMarkStyle::Classic,
            free_tone_marking: true,
            key_reporting: KeyReporting::Strict,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(
        path: P,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Flags to hand to the composition engine for these options.
    pub fn engine_flags(&self) -> EngineFlags {
        let mut flags = EngineFlags::STD;
        flags.set(
            EngineFlags::STD_TONE_STYLE,
            self.tone_mark_style == ToneMarkStyle::Classic,
        );
        flags.set(EngineFlags::FREE_TONE_MARKING, self.free_tone_marking);
        flags
    }
}

/// Character classification helpers.
pub mod utils {
    use unicode_normalization::UnicodeNormalization;

    /// Normalize input strings (NFC).
    pub fn normalize(s: &str) -> String {
        s.nfc().collect()
    }

    /// Keys that end a word: space, ASCII punctuation and digits.
    pub fn is_word_break_symbol(ch: char) -> bool {
        ch == ' ' || ch.is_ascii_digit() || ch.is_ascii_punctuation()
    }

    /// Combining marks used by Vietnamese letters: the three vowel modifiers
    /// (circumflex, breve, horn) and the five tones.
    pub fn is_vietnamese_mark(mark: char) -> bool {
        matches!(
            mark,
            '\u{0300}' | '\u{0301}' | '\u{0302}' | '\u{0303}' | '\u{0306}' | '\u{0309}'
                | '\u{031B}' | '\u{0323}'
        )
    }

    /// Whether `ch` is a Vietnamese vowel, with or without diacritics.
    pub fn is_vietnamese_vowel(ch: char) -> bool {
        match ch.nfd().next() {
            Some(base) => matches!(base.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u' | 'y'),
            None => false,
        }
    }

    /// Whether `ch` only exists in Vietnamese spelling (đ or a vowel with a
    /// Vietnamese diacritic).
    pub fn is_vietnamese_rune(ch: char) -> bool {
        if matches!(ch, 'đ' | 'Đ') {
            return true;
        }
        if ch.is_ascii() || !is_vietnamese_vowel(ch) {
            return false;
        }
        let mut marks = ch.nfd().skip(1).peekable();
        marks.peek().is_some() && marks.all(is_vietnamese_mark)
    }

    pub fn has_any_vietnamese_rune(s: &str) -> bool {
        s.chars().any(is_vietnamese_rune)
    }

    pub fn has_any_vietnamese_vowel(s: &str) -> bool {
        s.chars().any(is_vietnamese_vowel)
    }
}
