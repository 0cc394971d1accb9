// core/src/engine.rs
//
// Contract between the key event controller and the diacritic composition
// engine. The engine owns the tone/vowel rules of an input method (Telex, VNI,
// VIQR, custom keymaps); the controller only drives it and reads rendered
// projections of its buffer.

use bitflags::bitflags;

bitflags! {
    /// Rendering and processing mode passed to the composition engine.
    ///
    /// Flags combine: `VIETNAMESE | LOWER_CASE` asks for the composed text in
    /// lower case, `ENGLISH | FULL_TEXT` for every raw key stroke in the buffer.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Mode: u32 {
        /// Apply diacritic composition rules.
        const VIETNAMESE = 1 << 0;
        /// Treat keys as literal characters.
        const ENGLISH = 1 << 1;
        /// Keep punctuation typed inside the buffer in the rendering.
        const PUNCTUATION = 1 << 2;
        /// Lower-case the rendering.
        const LOWER_CASE = 1 << 3;
        /// Render the whole buffer, not only the last word.
        const FULL_TEXT = 1 << 4;
    }
}

bitflags! {
    /// Behaviour flags understood by the composition engine.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EngineFlags: u32 {
        /// Tone marks may be typed anywhere in the syllable.
        const FREE_TONE_MARKING = 1 << 0;
        /// Classic tone placement (òa, úy) instead of the modern one (oà, uý).
        const STD_TONE_STYLE = 1 << 1;
        /// Let the engine correct common misspellings.
        const AUTO_CORRECT = 1 << 2;
        /// Default flag set of a freshly created engine.
        const STD = Self::FREE_TONE_MARKING.bits()
            | Self::STD_TONE_STYLE.bits()
            | Self::AUTO_CORRECT.bits();
    }
}

/// Capability set the controller requires from a composition engine.
///
/// Implementations are selected when a session is created (one per input
/// method) and are driven by exactly one controller, so methods take
/// `&mut self` without any synchronisation.
pub trait CompositionEngine {
    /// Whether `key` takes part in composition for this input method.
    fn can_process_key(&self, key: char) -> bool;

    /// Append `key` to the buffer, composing it according to `mode`.
    ///
    /// Keys the engine does not compose are stored literally.
    fn process_key(&mut self, key: char, mode: Mode);

    /// Undo the last composed unit. With `restore_raw_on_empty` the raw key
    /// strokes of the word come back once its composed form is exhausted.
    fn remove_last_char(&mut self, restore_raw_on_empty: bool);

    /// Re-spell the last word: towards its Vietnamese composition when
    /// `to_vietnamese` is true, otherwise back to the literal key strokes.
    fn restore_last_word(&mut self, to_vietnamese: bool);

    /// Drop the whole buffer.
    fn reset(&mut self);

    /// Render the buffer in the given mode.
    fn processed_string(&self, mode: Mode) -> String;

    /// Whether the buffer forms a structurally valid syllable. `strict`
    /// requires a complete word rather than a valid prefix of one.
    fn is_valid(&self, strict: bool) -> bool;

    /// Keys that double as composition triggers and literal punctuation
    /// (for Telex: `[`, `]`, `{`, `}`).
    fn appending_keys(&self) -> &[char];

    /// Replace the engine's behaviour flags.
    fn set_flags(&mut self, flags: EngineFlags);
}

impl<E: CompositionEngine + ?Sized> CompositionEngine for Box<E> {
    fn can_process_key(&self, key: char) -> bool {
        (**self).can_process_key(key)
    }

    fn process_key(&mut self, key: char, mode: Mode) {
        (**self).process_key(key, mode);
    }

    fn remove_last_char(&mut self, restore_raw_on_empty: bool) {
        (**self).remove_last_char(restore_raw_on_empty);
    }

    fn restore_last_word(&mut self, to_vietnamese: bool) {
        (**self).restore_last_word(to_vietnamese);
    }

    fn reset(&mut self) {
        (**self).reset();
    }

    fn processed_string(&self, mode: Mode) -> String {
        (**self).processed_string(mode)
    }

    fn is_valid(&self, strict: bool) -> bool {
        (**self).is_valid(strict)
    }

    fn appending_keys(&self) -> &[char] {
        (**self).appending_keys()
    }

    fn set_flags(&mut self, flags: EngineFlags) {
        (**self).set_flags(flags);
    }
}
