//! IME engine with session management and key event processing.
//!
//! The `ImeEngine` drives a `CompositionEngine` from raw host key events. For
//! every key it decides whether to extend the preedit, commit text and reset,
//! or hand the key back to the host. All outcomes go through
//! `ImeEngine::apply`, which keeps the preedit and the commit outbox from
//! being filled by the same key.

use std::sync::Arc;

use bitflags::bitflags;

use crate::charset::CharsetRegistry;
use crate::context::ImeContext;
use crate::dictionary::Dictionary;
use crate::engine::{CompositionEngine, Mode};
use crate::fallback::Fallback;
use crate::macro_table::MacroTable;
use crate::session::ImeSession;
use crate::utils::{has_any_vietnamese_rune, is_word_break_symbol};
use crate::{Config, KeyReporting};

/// X11-style keysyms the controller treats specially.
pub mod keysym {
    pub const BACKSPACE: u32 = 0xff08;
    pub const TAB: u32 = 0xff09;
    pub const SPACE: u32 = 0x0020;
    /// Offset of keysyms that encode a Unicode scalar directly.
    pub const UNICODE_OFFSET: u32 = 0x0100_0000;
}

bitflags! {
    /// Modifier state delivered with a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u32 {
        const SHIFT = 1 << 0;
        const LOCK = 1 << 1;
        const CONTROL = 1 << 2;
        const MOD1 = 1 << 3;
        /// Event forwarded back by the framework; never composed again.
        const FORWARD = 1 << 25;
        const SUPER = 1 << 26;
        const HYPER = 1 << 27;
        const META = 1 << 28;
    }
}

impl Modifiers {
    /// Modifiers that turn a key into a shortcut the IME must not touch.
    pub const BLOCKING: Self = Self::CONTROL
        .union(Self::MOD1)
        .union(Self::FORWARD)
        .union(Self::SUPER)
        .union(Self::HYPER)
        .union(Self::META);
}

/// A key press as delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub sym: u32,
    pub state: Modifiers,
}

impl KeyEvent {
    pub fn new(sym: u32, state: Modifiers) -> Self {
        Self { sym, state }
    }

    /// Key event for a character, without modifiers.
    pub fn char(ch: char) -> Self {
        let code = ch as u32;
        let sym = if code < 0x100 {
            code
        } else {
            keysym::UNICODE_OFFSET + code
        };
        Self::new(sym, Modifiers::empty())
    }

    pub fn backspace() -> Self {
        Self::new(keysym::BACKSPACE, Modifiers::empty())
    }

    pub fn tab() -> Self {
        Self::new(keysym::TAB, Modifiers::empty())
    }

    pub fn space() -> Self {
        Self::new(keysym::SPACE, Modifiers::empty())
    }

    /// Same key with additional modifiers held.
    pub fn with(self, modifiers: Modifiers) -> Self {
        Self::new(self.sym, self.state | modifiers)
    }

    /// Character this key types, if any. Function keys have none.
    pub fn to_char(&self) -> Option<char> {
        if self.sym & 0xff00_0000 == keysym::UNICODE_OFFSET {
            return char::from_u32(self.sym - keysym::UNICODE_OFFSET);
        }
        if self.sym < 0xff00 {
            return char::from_u32(self.sym);
        }
        None
    }
}

/// Result of processing a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResult {
    /// Key was handled by the IME
    Handled,
    /// Key was not handled (pass through to application)
    NotHandled,
}

impl From<bool> for KeyResult {
    fn from(handled: bool) -> Self {
        if handled {
            KeyResult::Handled
        } else {
            KeyResult::NotHandled
        }
    }
}

/// Text produced by the commit decision for a regular key.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Decision {
    text: String,
    word_break: bool,
}

impl Decision {
    fn preedit(text: String) -> Self {
        Self {
            text,
            word_break: false,
        }
    }

    fn word_break(text: String) -> Self {
        Self {
            text,
            word_break: true,
        }
    }
}

/// State change caused by one key event.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Transition {
    /// Show the text as the new preedit.
    Preedit(String),
    /// Commit the text and reset the buffer.
    Commit(String),
    /// Leave everything as it is.
    Keep,
}

/// IME engine for one focused input context.
///
/// Shared tables (macros, dictionary) are read-only and may be used by many
/// engines at once; the composition engine and session belong to this one.
pub struct ImeEngine<E: CompositionEngine> {
    /// Diacritic composition engine (owns the buffer)
    engine: E,

    /// Per-context flags and options
    session: ImeSession,

    /// Outbox read by the host
    context: ImeContext,

    macros: Arc<MacroTable>,
    dictionary: Arc<Dictionary>,
    charsets: Arc<CharsetRegistry>,
}

impl<E: CompositionEngine> ImeEngine<E> {
    /// Create an IME engine around a composition engine and shared tables.
    pub fn new(
        mut engine: E,
        macros: Arc<MacroTable>,
        dictionary: Arc<Dictionary>,
        config: Config,
    ) -> Self {
        engine.set_flags(config.engine_flags());
        Self {
            engine,
            session: ImeSession::new(config),
            context: ImeContext::new(),
            macros,
            dictionary,
            charsets: Arc::new(CharsetRegistry::new()),
        }
    }

    /// Use a shared charset registry (with externally registered charsets).
    pub fn with_charsets(mut self, charsets: Arc<CharsetRegistry>) -> Self {
        self.charsets = charsets;
        self
    }

    pub fn context(&self) -> &ImeContext {
        &self.context
    }

    pub fn session(&self) -> &ImeSession {
        &self.session
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn config(&self) -> &Config {
        self.session.config()
    }

    /// Replace the options. They apply from the next key event on.
    pub fn set_config(&mut self, config: Config) {
        tracing::debug!(?config, "ime config updated");
        self.engine.set_flags(config.engine_flags());
        self.session.set_config(config);
    }

    /// Current preedit. Reading it does not consume anything.
    pub fn preedit(&self) -> &str {
        &self.context.preedit_text
    }

    /// Take the pending commit, if any.
    pub fn take_commit(&mut self) -> Option<String> {
        self.context.take_commit()
    }

    /// Take the pending commit; `""` when there is none.
    pub fn pull_commit(&mut self) -> String {
        self.take_commit().unwrap_or_default()
    }

    /// Whether the last composable key was typed with Shift.
    pub fn last_key_with_shift(&self) -> bool {
        self.session.last_key_with_shift()
    }

    /// Restore the last word on the next key event (Shift+Space style).
    pub fn request_restore(&mut self) {
        self.session.request_restore();
    }

    /// Commit whatever is displayed and reset (focus loss).
    pub fn commit_preedit(&mut self) {
        let text = self.preedit_string();
        self.commit_and_reset(&text);
    }

    /// Drop the composition without committing any text.
    pub fn reset(&mut self) {
        self.commit_and_reset("");
    }

    /// Process a key event and update IME state.
    ///
    /// After calling this, the host should read `preedit()` and drain
    /// `take_commit()`. A commit the host did not drain from a previous
    /// event is dropped here.
    pub fn process_key(&mut self, key: KeyEvent) -> KeyResult {
        tracing::trace!(sym = key.sym, state = ?key.state, "key event");
        self.context.discard_commit();

        let (transition, handled) = self.transition(key);
        self.apply(transition);
        self.update_last_key_with_shift(key);

        KeyResult::from(handled)
    }

    fn fallback(&self) -> Fallback<'_, E> {
        Fallback::new(
            &self.engine,
            self.session.config(),
            &self.macros,
            &self.dictionary,
        )
    }

    fn processed(&self, mode: Mode) -> String {
        self.engine.processed_string(mode)
    }

    fn has_raw_keys(&self) -> bool {
        !self.processed(Mode::ENGLISH | Mode::FULL_TEXT).is_empty()
    }

    /// Rendering of the buffer as the host should see it.
    fn preedit_string(&self) -> String {
        if self.session.config().macro_enabled {
            return self.processed(Mode::PUNCTUATION);
        }
        if self.fallback().should_fallback_to_english(true) {
            return self.processed(Mode::ENGLISH);
        }
        self.processed(Mode::VIETNAMESE)
    }

    /// Text to commit for a word that ends without a word-break key.
    fn composed_string(&self, old_text: &str) -> String {
        if has_any_vietnamese_rune(old_text) && self.fallback().must_fallback_to_english() {
            return self.processed(Mode::ENGLISH);
        }
        old_text.to_string()
    }

    /// With Caps Lock on, bracket trigger keys type their shifted pair.
    fn lock_upper(&self, key: char) -> char {
        let paired = match key {
            '[' => '{',
            ']' => '}',
            '{' => '[',
            '}' => ']',
            _ => return key,
        };
        if self.engine.appending_keys().contains(&key) {
            paired
        } else {
            key
        }
    }

    /// Whether the controller takes part in a key without shortcut modifiers.
    fn accepts(&self, key: KeyEvent) -> bool {
        let config = self.session.config();
        let ch = key.to_char();
        let composable = ch.is_some_and(|c| self.engine.can_process_key(c));
        let has_raw_keys = self.has_raw_keys();
        let printable = config.key_reporting == KeyReporting::Printable;

        let tab = key.sym == keysym::TAB
            && (self.fallback().macro_text().is_some() || (printable && has_raw_keys));
        let passthrough = printable
            && config.macro_enabled
            && ch.is_some_and(|c| !c.is_control());
        let recognised = key.sym == keysym::SPACE
            || key.sym == keysym::BACKSPACE
            || ch.is_some_and(is_word_break_symbol)
            || tab
            || composable
            || passthrough;

        if !recognised {
            return false;
        }
        config.macro_enabled || has_raw_keys || composable
    }

    fn transition(&mut self, key: KeyEvent) -> (Transition, bool) {
        let old_text = self.preedit_string();

        if self.session.take_restore() {
            let to_vietnamese = !has_any_vietnamese_rune(&old_text);
            tracing::debug!(to_vietnamese, "restoring last word");
            self.engine.restore_last_word(to_vietnamese);
            return (Transition::Preedit(self.preedit_string()), true);
        }

        if key.state.intersects(Modifiers::BLOCKING) {
            return (Transition::Keep, false);
        }

        if !self.accepts(key) {
            // Keep host text equal to what was already shown
            let transition = if self.has_raw_keys() {
                Transition::Commit(old_text)
            } else {
                Transition::Keep
            };
            return (transition, false);
        }

        match key.sym {
            keysym::BACKSPACE => self.backspace(&old_text),
            keysym::TAB => match self.fallback().macro_text() {
                Some(expansion) => (Transition::Commit(expansion), true),
                None => (Transition::Commit(self.composed_string(&old_text)), false),
            },
            _ => {
                let handled = match self.session.config().key_reporting {
                    KeyReporting::Strict => true,
                    KeyReporting::Printable => key.to_char().is_some_and(|c| !c.is_control()),
                };
                let decision = self.decide(key, old_text);
                let transition = if decision.word_break {
                    Transition::Commit(decision.text)
                } else {
                    Transition::Preedit(decision.text)
                };
                (transition, handled)
            }
        }
    }

    fn backspace(&mut self, old_text: &str) -> (Transition, bool) {
        if old_text.chars().count() == 1 {
            return (Transition::Commit(String::new()), true);
        }
        if self.has_raw_keys() {
            self.engine.remove_last_char(true);
            return (Transition::Preedit(self.preedit_string()), true);
        }
        (Transition::Keep, false)
    }

    /// Swap the key just composed for a plain space, so the engine's last
    /// word ends the way the host text does.
    fn replace_last_with_space(&mut self) {
        self.engine.remove_last_char(false);
        self.engine.process_key(' ', Mode::ENGLISH);
    }

    /// Commit decision for a regular (non Backspace/Tab) key.
    fn decide(&mut self, key: KeyEvent, old_text: String) -> Decision {
        let Some(mut ch) = key.to_char() else {
            return Decision::word_break(String::new());
        };
        let macro_enabled = self.session.config().macro_enabled;

        if self.engine.can_process_key(ch) {
            if key.state.contains(Modifiers::LOCK) {
                ch = self.lock_upper(ch);
            }
            let mode = self.fallback().input_mode();
            self.engine.process_key(ch, mode);

            if self.engine.appending_keys().contains(&ch) {
                let new_text = if self.fallback().should_fallback_to_english(true) {
                    self.processed(Mode::ENGLISH)
                } else {
                    self.processed(Mode::VIETNAMESE)
                };
                if self.processed(Mode::VIETNAMESE).ends_with(ch) {
                    // [[ => [
                    let text = self.preedit_string();
                    let word_break = text.chars().last().is_some_and(is_word_break_symbol);
                    if word_break {
                        self.replace_last_with_space();
                    }
                    return Decision { text, word_break };
                }
                if new_text.ends_with(ch) {
                    // f] => f]
                    let word_break = is_word_break_symbol(ch);
                    if word_break {
                        self.replace_last_with_space();
                    }
                    return Decision {
                        text: format!("{old_text}{ch}"),
                        word_break,
                    };
                }
                // ] => ư
                return Decision::preedit(self.preedit_string());
            }
            if macro_enabled {
                return Decision::preedit(self.processed(Mode::PUNCTUATION));
            }
            return Decision::preedit(self.preedit_string());
        }

        if is_word_break_symbol(ch) {
            if macro_enabled {
                if key.sym == keysym::SPACE && self.macros.has(&old_text) {
                    let expansion = self
                        .macros
                        .expand(&old_text, self.session.config().auto_capitalize_macro);
                    tracing::debug!(abbreviation = %old_text, "expanding macro");
                    self.engine.reset();
                    return Decision::word_break(format!("{expansion}{ch}"));
                }
                let mode = self.fallback().input_mode();
                self.engine.process_key(ch, mode);
                return Decision::word_break(format!("{old_text}{ch}"));
            }
            if has_any_vietnamese_rune(&old_text) && self.fallback().must_fallback_to_english() {
                tracing::debug!(word = %old_text, "restoring non-Vietnamese word");
                self.engine.restore_last_word(false);
                let text = format!("{}{ch}", self.processed(Mode::ENGLISH));
                self.engine.process_key(ch, Mode::ENGLISH);
                return Decision::word_break(text);
            }
            self.engine.process_key(ch, Mode::ENGLISH);
            return Decision::word_break(format!("{old_text}{ch}"));
        }

        if macro_enabled && self.session.config().key_reporting == KeyReporting::Printable {
            let text = format!("{old_text}{ch}");
            if self.macros.has_prefix(&text) {
                self.engine.process_key(ch, Mode::ENGLISH);
                return Decision::preedit(text);
            }
            return Decision::word_break(text);
        }

        Decision::word_break(String::new())
    }

    /// The single place key outcomes reach the outbox.
    fn apply(&mut self, transition: Transition) {
        match transition {
            Transition::Preedit(text) => self.update_preedit(&text),
            Transition::Commit(text) => self.commit_and_reset(&text),
            Transition::Keep => {}
        }
    }

    fn encode(&self, text: &str) -> String {
        self.charsets
            .encode(&self.session.config().output_charset, text)
    }

    fn update_preedit(&mut self, text: &str) {
        let encoded = self.encode(text);
        if encoded.is_empty() {
            self.context.clear();
            return;
        }
        self.context.preedit_text = encoded;
    }

    fn commit_and_reset(&mut self, text: &str) {
        let encoded = self.encode(text);
        tracing::debug!(commit = %encoded, "commit and reset");
        self.context.set_commit(encoded);
        self.engine.reset();
    }

    fn update_last_key_with_shift(&mut self, key: KeyEvent) {
        let composable = key.to_char().is_some_and(|c| self.engine.can_process_key(c));
        self.session
            .set_last_key_with_shift(composable && key.state.contains(Modifiers::SHIFT));
    }
}
