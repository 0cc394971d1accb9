//! IME session state.
//!
//! Per-input-context flags that live across key events. The composition
//! buffer itself belongs to the composition engine; the session only tracks
//! what the controller needs to remember between keys.

use crate::Config;

/// Session flags of one focused input context.
#[derive(Debug, Clone, Default)]
pub struct ImeSession {
    /// Options in effect for the next key event
    config: Config,

    /// The next key event restores the last word instead of composing
    restore_pending: bool,

    /// Whether the previous composable key was typed with Shift
    last_key_with_shift: bool,
}

impl ImeSession {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            restore_pending: false,
            last_key_with_shift: false,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn set_config(&mut self, config: Config) {
        self.config = config;
    }

    /// Arm a restore of the last word for the next key event.
    pub fn request_restore(&mut self) {
        self.restore_pending = true;
    }

    pub fn is_restore_pending(&self) -> bool {
        self.restore_pending
    }

    /// Consume the restore request. Returns whether one was pending.
    pub fn take_restore(&mut self) -> bool {
        std::mem::take(&mut self.restore_pending)
    }

    pub fn last_key_with_shift(&self) -> bool {
        self.last_key_with_shift
    }

    pub fn set_last_key_with_shift(&mut self, shift: bool) {
        self.last_key_with_shift = shift;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session() {
        let session = ImeSession::new(Config::default());
        assert!(!session.is_restore_pending());
        assert!(!session.last_key_with_shift());
        assert_eq!(session.config(), &Config::default());
    }

    #[test]
    fn test_restore_is_consumed_once() {
        let mut session = ImeSession::default();
        session.request_restore();
        assert!(session.is_restore_pending());

        assert!(session.take_restore());
        assert!(!session.take_restore());
        assert!(!session.is_restore_pending());
    }

    #[test]
    fn test_set_config() {
        let mut session = ImeSession::default();
        let config = Config {
            macro_enabled: true,
            ..Config::default()
        };
        session.set_config(config.clone());
        assert_eq!(session.config(), &config);
    }
}
