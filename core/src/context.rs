//! IME context for host communication.
//!
//! The `ImeContext` struct is the outbox the host reads after every key
//! event: the preedit to display and, at most once, the text to commit.
//!
//! Design philosophy: Zero abstraction - just data transfer. The host reads
//! `preedit_text` and drains the commit with `take_commit()`.

/// IME context for host communication.
///
/// # Fields
///
/// - `preedit_text`: Text being composed (displayed with underline)
/// - `commit`: Text to commit, consumed once by the host. `Some("")` is a
///   commit of nothing, it still tells the host the composition ended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImeContext {
    /// Text being composed
    pub preedit_text: String,

    /// Pending commit (a queue of at most one string)
    commit: Option<String>,
}

impl ImeContext {
    /// Create a new empty IME context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `text` for commit and clear the preedit.
    pub fn set_commit(&mut self, text: String) {
        self.preedit_text.clear();
        self.commit = Some(text);
    }

    /// Peek at the pending commit.
    pub fn commit(&self) -> Option<&str> {
        self.commit.as_deref()
    }

    /// Take the commit text, leaving the outbox empty.
    pub fn take_commit(&mut self) -> Option<String> {
        self.commit.take()
    }

    /// Drop a commit the host did not pull.
    pub fn discard_commit(&mut self) {
        self.commit = None;
    }

    /// Clear preedit and commit.
    pub fn clear(&mut self) {
        self.preedit_text.clear();
        self.commit = None;
    }

    /// Check if there's text to commit.
    pub fn has_commit(&self) -> bool {
        self.commit.as_deref().is_some_and(|text| !text.is_empty())
    }

    /// Check if there's a preedit to show.
    pub fn has_preedit(&self) -> bool {
        !self.preedit_text.is_empty()
    }
}
