//! Minimal Telex-like composition engine used by the integration tests.
//!
//! Rules: `dd`→đ, `aa`/`ee`/`oo`→â/ê/ô, `w` after a/o/u→ă/ơ/ư, tone keys
//! `s f r x j` mark the last vowel, `[ ]`→ơ ư and `{ }`→Ơ Ư (a repeated
//! bracket types the bracket itself). Keys composed in English mode stay
//! literal.

#![allow(dead_code)]

use libviet_core::{CompositionEngine, EngineFlags, Mode};
use unicode_normalization::UnicodeNormalization;

const INITIALS: &[&str] = &[
    "ngh", "ng", "nh", "ch", "gh", "gi", "kh", "ph", "qu", "th", "tr", "b", "c", "d", "đ", "g",
    "h", "k", "l", "m", "n", "p", "q", "r", "s", "t", "v", "x", "",
];
const FINALS: &[&str] = &["", "c", "ch", "m", "n", "ng", "nh", "p", "t"];
const BRACKETS: &[char] = &['[', ']', '{', '}'];

fn is_vowel(ch: char) -> bool {
    libviet_core::utils::is_vietnamese_vowel(ch)
}

fn tone_mark(key: char) -> Option<char> {
    Some(match key.to_ascii_lowercase() {
        's' => '\u{0301}',
        'f' => '\u{0300}',
        'r' => '\u{0309}',
        'x' => '\u{0303}',
        'j' => '\u{0323}',
        _ => return None,
    })
}

fn bracket_letter(key: char) -> char {
    match key {
        '[' => 'ơ',
        ']' => 'ư',
        '{' => 'Ơ',
        _ => 'Ư',
    }
}

fn with_tone(vowel: char, tone: char) -> char {
    let mut decomposed: String = vowel
        .to_string()
        .nfd()
        .filter(|&m| !matches!(m, '\u{0300}' | '\u{0301}' | '\u{0303}' | '\u{0309}' | '\u{0323}'))
        .collect();
    decomposed.push(tone);
    decomposed.nfc().next().unwrap_or(vowel)
}

fn same_letter(a: char, b: char) -> bool {
    a.to_lowercase().eq(b.to_lowercase())
}

/// dd, aa, ee, oo: the second key turns the plain letter into đ, â, ê, ô.
fn doubled_letter(last: char, key: char) -> Option<char> {
    if !last.is_ascii() || !same_letter(last, key) {
        return None;
    }
    let composed = match last.to_ascii_lowercase() {
        'd' => 'đ',
        'a' => 'â',
        'e' => 'ê',
        'o' => 'ô',
        _ => return None,
    };
    Some(keep_case(last, composed))
}

fn keep_case(like: char, ch: char) -> char {
    if like.is_uppercase() {
        ch.to_uppercase().next().unwrap_or(ch)
    } else {
        ch
    }
}

#[derive(Debug, Default)]
pub struct ToyTelex {
    keys: Vec<(char, Mode)>,
    pub flags: Option<EngineFlags>,
}

impl ToyTelex {
    pub fn new() -> Self {
        Self::default()
    }

    fn compose(&self) -> Vec<char> {
        let mut out: Vec<char> = Vec::new();
        let mut prev_key: Option<(char, Mode)> = None;
        for &(key, mode) in &self.keys {
            let vietnamese = !mode.contains(Mode::ENGLISH);
            let last = out.last().copied();
            if !vietnamese {
                out.push(key);
            } else if BRACKETS.contains(&key) {
                let letter = bracket_letter(key);
                if prev_key == Some((key, mode)) && last == Some(letter) {
                    out.pop();
                    out.push(key);
                } else {
                    out.push(letter);
                }
            } else if let Some(doubled) = last.and_then(|l| doubled_letter(l, key)) {
                out.pop();
                out.push(doubled);
            } else if key.to_ascii_lowercase() == 'w'
                && last.is_some_and(|l| matches!(l.to_ascii_lowercase(), 'a' | 'o' | 'u'))
            {
                let l = last.unwrap_or('a');
                let composed = match l.to_ascii_lowercase() {
                    'a' => 'ă',
                    'o' => 'ơ',
                    _ => 'ư',
                };
                out.pop();
                out.push(keep_case(l, composed));
            } else if let (Some(tone), Some(pos)) =
                (tone_mark(key), out.iter().rposition(|&c| is_vowel(c)))
            {
                out[pos] = with_tone(out[pos], tone);
            } else {
                out.push(key);
            }
            prev_key = Some((key, mode));
        }
        out
    }

    fn render(&self, mode: Mode) -> String {
        let text: String = if mode.contains(Mode::ENGLISH) {
            self.keys.iter().map(|&(key, _)| key).collect()
        } else {
            self.compose().into_iter().collect()
        };
        if mode.contains(Mode::LOWER_CASE) {
            text.to_lowercase()
        } else {
            text
        }
    }
}

fn parses(word: &str, strict: bool) -> bool {
    INITIALS.iter().filter(|i| word.starts_with(*i)).any(|initial| {
        let rest = &word[initial.len()..];
        let vowels: String = rest.chars().take_while(|&c| is_vowel(c)).collect();
        if vowels.is_empty() {
            return !strict && rest.is_empty();
        }
        let tail = &rest[vowels.len()..];
        FINALS.contains(&tail) || (!strict && FINALS.iter().any(|f| f.starts_with(tail)))
    })
}

impl CompositionEngine for ToyTelex {
    fn can_process_key(&self, key: char) -> bool {
        key.is_ascii_alphabetic() || BRACKETS.contains(&key)
    }

    fn process_key(&mut self, key: char, mode: Mode) {
        self.keys.push((key, mode));
    }

    fn remove_last_char(&mut self, _restore_raw_on_empty: bool) {
        let before = self.render(Mode::VIETNAMESE);
        while self.keys.pop().is_some() {
            if self.render(Mode::VIETNAMESE) != before {
                break;
            }
        }
    }

    fn restore_last_word(&mut self, to_vietnamese: bool) {
        let mode = if to_vietnamese {
            Mode::VIETNAMESE
        } else {
            Mode::ENGLISH
        };
        for key in &mut self.keys {
            key.1 = mode;
        }
    }

    fn reset(&mut self) {
        self.keys.clear();
    }

    fn processed_string(&self, mode: Mode) -> String {
        self.render(mode)
    }

    fn is_valid(&self, strict: bool) -> bool {
        parses(&self.render(Mode::VIETNAMESE | Mode::LOWER_CASE), strict)
    }

    fn appending_keys(&self) -> &[char] {
        BRACKETS
    }

    fn set_flags(&mut self, flags: EngineFlags) {
        self.flags = Some(flags);
    }
}
