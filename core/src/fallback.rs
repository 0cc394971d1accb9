//! Vietnamese vs. English classification of the uncommitted buffer.
//!
//! Two checks share one view of the session:
//! - `should_fallback_to_english` drives the transient preedit rendering and
//!   the mode new keys are composed in.
//! - `must_fallback_to_english` is the stricter check consulted at word
//!   boundaries, where the decision is committed to the host.

use crate::dictionary::Dictionary;
use crate::engine::{CompositionEngine, Mode};
use crate::macro_table::MacroTable;
use crate::utils::{has_any_vietnamese_rune, has_any_vietnamese_vowel};
use crate::Config;

/// Borrowed view of everything the classifier reads. Never mutates.
pub struct Fallback<'a, E: ?Sized> {
    engine: &'a E,
    config: &'a Config,
    macros: &'a MacroTable,
    dictionary: &'a Dictionary,
}

impl<'a, E: CompositionEngine + ?Sized> Fallback<'a, E> {
    pub fn new(
        engine: &'a E,
        config: &'a Config,
        macros: &'a MacroTable,
        dictionary: &'a Dictionary,
    ) -> Self {
        Self {
            engine,
            config,
            macros,
            dictionary,
        }
    }

    /// Expansion of the buffer when it spells a macro and macros are enabled.
    pub fn macro_text(&self) -> Option<String> {
        if !self.config.macro_enabled {
            return None;
        }
        let text = self.engine.processed_string(Mode::PUNCTUATION);
        if self.macros.has(&text) {
            Some(self.macros.expand(&text, self.config.auto_capitalize_macro))
        } else {
            None
        }
    }

    /// Whether the preedit should show the literal key strokes.
    ///
    /// With `check_vn_rune`, a buffer without any Vietnamese-only character
    /// never falls back, since both spellings are the same.
    pub fn should_fallback_to_english(&self, check_vn_rune: bool) -> bool {
        if !self.config.auto_non_vn_restore {
            return false;
        }
        let vn_seq = self
            .engine
            .processed_string(Mode::VIETNAMESE | Mode::LOWER_CASE);
        if vn_seq.is_empty() {
            return false;
        }
        if self.macro_text().is_some() {
            return false;
        }
        // "dd" stays usable in abbreviations outside Vietnamese words
        if self.config.dd_free_style
            && !has_any_vietnamese_vowel(&vn_seq)
            && (vn_seq.ends_with('d') || vn_seq.contains('đ'))
        {
            return false;
        }
        if check_vn_rune && !has_any_vietnamese_rune(&vn_seq) {
            return false;
        }
        !self.engine.is_valid(false)
    }

    /// Whether the word must be committed in its literal spelling.
    pub fn must_fallback_to_english(&self) -> bool {
        if !self.config.auto_non_vn_restore {
            return false;
        }
        let vn_seq = self
            .engine
            .processed_string(Mode::VIETNAMESE | Mode::LOWER_CASE);
        if vn_seq.is_empty() {
            return false;
        }
        if self.config.dd_free_style && vn_seq.contains('đ') {
            return false;
        }
        if self.config.spell_check_with_dicts {
            return !self.dictionary.contains(&vn_seq);
        }
        !self.engine.is_valid(true)
    }

    /// Mode new keys should be composed in.
    pub fn input_mode(&self) -> Mode {
        if self.should_fallback_to_english(false) {
            Mode::ENGLISH
        } else {
            Mode::VIETNAMESE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineFlags;

    /// Engine double with fixed renderings.
    struct Fixed {
        vietnamese: &'static str,
        english: &'static str,
        valid: bool,
        strict_valid: bool,
    }

    impl Fixed {
        fn new(vietnamese: &'static str, english: &'static str, valid: bool) -> Self {
            Self {
                vietnamese,
                english,
                valid,
                strict_valid: valid,
            }
        }
    }

    impl CompositionEngine for Fixed {
        fn can_process_key(&self, key: char) -> bool {
            key.is_ascii_alphabetic()
        }
        fn process_key(&mut self, _key: char, _mode: Mode) {}
        fn remove_last_char(&mut self, _restore_raw_on_empty: bool) {}
        fn restore_last_word(&mut self, _to_vietnamese: bool) {}
        fn reset(&mut self) {}
        fn processed_string(&self, mode: Mode) -> String {
            let text = if mode.contains(Mode::ENGLISH) {
                self.english
            } else {
                self.vietnamese
            };
            if mode.contains(Mode::LOWER_CASE) {
                text.to_lowercase()
            } else {
                text.to_string()
            }
        }
        fn is_valid(&self, strict: bool) -> bool {
            if strict {
                self.strict_valid
            } else {
                self.valid
            }
        }
        fn appending_keys(&self) -> &[char] {
            &[]
        }
        fn set_flags(&mut self, _flags: EngineFlags) {}
    }

    #[test]
    fn test_disabled_auto_restore_never_falls_back() {
        let engine = Fixed::new("fư", "f]", false);
        let config = Config {
            auto_non_vn_restore: false,
            ..Config::default()
        };
        let macros = MacroTable::default();
        let dict = Dictionary::default();
        let fallback = Fallback::new(&engine, &config, &macros, &dict);
        assert!(!fallback.should_fallback_to_english(true));
        assert!(!fallback.must_fallback_to_english());
    }

    #[test]
    fn test_invalid_syllable_falls_back() {
        let engine = Fixed::new("fư", "f]", false);
        let config = Config::default();
        let macros = MacroTable::default();
        let dict = Dictionary::default();
        let fallback = Fallback::new(&engine, &config, &macros, &dict);
        assert!(fallback.should_fallback_to_english(true));
        assert_eq!(fallback.input_mode(), Mode::ENGLISH);
    }

    #[test]
    fn test_plain_ascii_does_not_fall_back_when_checking_runes() {
        let engine = Fixed::new("xyz", "xyz", false);
        let config = Config::default();
        let macros = MacroTable::default();
        let dict = Dictionary::default();
        let fallback = Fallback::new(&engine, &config, &macros, &dict);
        assert!(!fallback.should_fallback_to_english(true));
        assert!(fallback.should_fallback_to_english(false));
    }

    #[test]
    fn test_empty_buffer_never_falls_back() {
        let engine = Fixed::new("", "", false);
        let config = Config::default();
        let macros = MacroTable::default();
        let dict = Dictionary::default();
        let fallback = Fallback::new(&engine, &config, &macros, &dict);
        assert!(!fallback.should_fallback_to_english(false));
        assert!(!fallback.must_fallback_to_english());
    }

    #[test]
    fn test_macro_match_wins_over_fallback() {
        let engine = Fixed::new("vs", "vs", false);
        let config = Config {
            macro_enabled: true,
            ..Config::default()
        };
        let macros = MacroTable::from_pairs([("vs", "Vietnamese")]);
        let dict = Dictionary::default();
        let fallback = Fallback::new(&engine, &config, &macros, &dict);
        assert_eq!(fallback.macro_text().as_deref(), Some("Vietnamese"));
        assert!(!fallback.should_fallback_to_english(false));
    }

    #[test]
    fn test_macro_text_requires_macro_mode() {
        let engine = Fixed::new("vs", "vs", false);
        let config = Config::default();
        let macros = MacroTable::from_pairs([("vs", "Vietnamese")]);
        let dict = Dictionary::default();
        let fallback = Fallback::new(&engine, &config, &macros, &dict);
        assert_eq!(fallback.macro_text(), None);
        assert!(fallback.should_fallback_to_english(false));
    }

    #[test]
    fn test_dd_free_style_keeps_abbreviations() {
        let macros = MacroTable::default();
        let dict = Dictionary::default();
        let config = Config::default();

        let engine = Fixed::new("đc", "ddc", false);
        let fallback = Fallback::new(&engine, &config, &macros, &dict);
        assert!(!fallback.should_fallback_to_english(false));
        assert!(!fallback.must_fallback_to_english());

        let engine = Fixed::new("hd", "hd", false);
        let fallback = Fallback::new(&engine, &config, &macros, &dict);
        assert!(!fallback.should_fallback_to_english(false));

        let strict = Config {
            dd_free_style: false,
            ..Config::default()
        };
        let engine = Fixed::new("đc", "ddc", false);
        let fallback = Fallback::new(&engine, &strict, &macros, &dict);
        assert!(fallback.should_fallback_to_english(false));
    }

    #[test]
    fn test_must_fallback_uses_dictionary() {
        let engine = Fixed::new("Tôi", "Tooi", true);
        let config = Config::default();
        let macros = MacroTable::default();

        let known = Dictionary::from_words(["tôi"]);
        let fallback = Fallback::new(&engine, &config, &macros, &known);
        assert!(!fallback.must_fallback_to_english());

        let unknown = Dictionary::from_words(["anh"]);
        let fallback = Fallback::new(&engine, &config, &macros, &unknown);
        assert!(fallback.must_fallback_to_english());
    }

    #[test]
    fn test_must_fallback_uses_strict_validity_without_dictionary() {
        let mut engine = Fixed::new("tô", "too", true);
        engine.strict_valid = false;
        let config = Config {
            spell_check_with_dicts: false,
            ..Config::default()
        };
        let macros = MacroTable::default();
        let dict = Dictionary::default();
        let fallback = Fallback::new(&engine, &config, &macros, &dict);
        assert!(!fallback.should_fallback_to_english(true));
        assert!(fallback.must_fallback_to_english());
    }
}
