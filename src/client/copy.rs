//! Copy-to-clipboard control with a transient "Copied" confirmation.
//!
//! Reverting the label and note is a deadline checked by [`CopyControl::tick`]
//! and [`CopyNote::tick`]; a new activation replaces any pending deadline.

use std::time::{Duration, Instant};

/// How long the "Copied" confirmation stays up.
pub const REVERT_DELAY: Duration = Duration::from_millis(1800);

/// Label and note text after a successful copy.
pub const COPIED_TEXT: &str = "Copied";

/// Note text after a failed copy.
pub const COPY_FAILED_TEXT: &str = "Copy failed";

/// Note text at rest.
pub const NOTE_IDLE_TEXT: &str = "Contract ready";

/// Clipboard write failures.
#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    /// No clipboard mechanism can be used in this context.
    #[error("clipboard unavailable")]
    Unavailable,

    /// The clipboard refused the write.
    #[error("clipboard write rejected: {0}")]
    Rejected(String),
}

/// A place text can be copied to.
pub trait Clipboard {
    /// Whether this clipboard can be used right now.
    fn is_available(&self) -> bool;

    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// Prefers the secure clipboard and falls back to the legacy one when the
/// secure one is unavailable.
#[derive(Debug, Default)]
pub struct ClipboardChain<S, L> {
    pub secure: S,
    pub legacy: L,
}

impl<S: Clipboard, L: Clipboard> ClipboardChain<S, L> {
    pub fn new(secure: S, legacy: L) -> Self {
        Self { secure, legacy }
    }
}

impl<S: Clipboard, L: Clipboard> Clipboard for ClipboardChain<S, L> {
    fn is_available(&self) -> bool {
        self.secure.is_available() || self.legacy.is_available()
    }

    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if self.secure.is_available() {
            self.secure.write_text(text)
        } else {
            self.legacy.write_text(text)
        }
    }
}

/// In-memory clipboard.
#[derive(Debug, Clone)]
pub struct MemoryClipboard {
    available: bool,
    rejects: bool,
    contents: Option<String>,
}

impl Default for MemoryClipboard {
    fn default() -> Self {
        Self {
            available: true,
            rejects: false,
            contents: None,
        }
    }
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clipboard that reports itself unavailable.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::default()
        }
    }

    /// A clipboard that is available but refuses every write.
    pub fn rejecting() -> Self {
        Self {
            rejects: true,
            ..Self::default()
        }
    }

    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl Clipboard for MemoryClipboard {
    fn is_available(&self) -> bool {
        self.available
    }

    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if !self.available {
            return Err(ClipboardError::Unavailable);
        }
        if self.rejects {
            return Err(ClipboardError::Rejected("permission denied".into()));
        }
        self.contents = Some(text.to_string());
        Ok(())
    }
}

/// Result of activating a [`CopyControl`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    /// The control carries no text; nothing happened.
    Skipped,
    Copied,
    Failed,
}

/// Status note shared by the copy controls on a page.
#[derive(Debug, Clone)]
pub struct CopyNote {
    text: String,
    idle_text: String,
    revert_at: Option<Instant>,
}

impl Default for CopyNote {
    fn default() -> Self {
        Self::new(NOTE_IDLE_TEXT)
    }
}

impl CopyNote {
    pub fn new(idle_text: impl Into<String>) -> Self {
        let idle_text = idle_text.into();
        Self {
            text: idle_text.clone(),
            idle_text,
            revert_at: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Restores the idle text once the pending deadline has passed.
    /// Returns true if it reverted.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.revert_at {
            Some(deadline) if now >= deadline => {
                self.text = self.idle_text.clone();
                self.revert_at = None;
                true
            }
            _ => false,
        }
    }

    fn show_copied(&mut self, now: Instant) {
        self.text = COPIED_TEXT.to_string();
        self.revert_at = Some(now + REVERT_DELAY);
    }

    fn show_failed(&mut self) {
        self.text = COPY_FAILED_TEXT.to_string();
        self.revert_at = None;
    }
}

/// A button that copies a fixed text.
#[derive(Debug, Clone)]
pub struct CopyControl {
    label: String,
    default_label: String,
    text: String,
    revert_at: Option<Instant>,
}

impl CopyControl {
    /// Creates a control showing `label` that copies `text`.
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            default_label: label.clone(),
            label,
            text: text.into(),
            revert_at: None,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Copies the control's text.
    ///
    /// On success the label and `note` read "Copied" until
    /// [`REVERT_DELAY`] after `now`. On failure only `note` changes.
    pub fn activate(
        &mut self,
        clipboard: &mut dyn Clipboard,
        note: Option<&mut CopyNote>,
        now: Instant,
    ) -> CopyOutcome {
        if self.text.is_empty() {
            return CopyOutcome::Skipped;
        }

        match clipboard.write_text(&self.text) {
            Ok(()) => {
                if let Some(note) = note {
                    note.show_copied(now);
                }
                self.label = COPIED_TEXT.to_string();
                self.revert_at = Some(now + REVERT_DELAY);
                CopyOutcome::Copied
            }
            Err(err) => {
                tracing::debug!(error = %err, "copy failed");
                if let Some(note) = note {
                    note.show_failed();
                }
                CopyOutcome::Failed
            }
        }
    }

    /// Restores the default label once the pending deadline has passed.
    /// Returns true if it reverted.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.revert_at {
            Some(deadline) if now >= deadline => {
                self.label = self.default_label.clone();
                self.revert_at = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_then_revert() {
        let mut clipboard = MemoryClipboard::new();
        let mut note = CopyNote::default();
        let mut control = CopyControl::new("Copy CA", "0xC0FFEE");
        let start = Instant::now();

        let outcome = control.activate(&mut clipboard, Some(&mut note), start);
        assert_eq!(outcome, CopyOutcome::Copied);
        assert_eq!(clipboard.contents(), Some("0xC0FFEE"));
        assert_eq!(control.label(), "Copied");
        assert_eq!(note.text(), "Copied");

        let just_before = start + REVERT_DELAY - Duration::from_millis(1);
        assert!(!control.tick(just_before));
        assert!(!note.tick(just_before));
        assert_eq!(control.label(), "Copied");

        assert!(control.tick(start + REVERT_DELAY));
        assert!(note.tick(start + REVERT_DELAY));
        assert_eq!(control.label(), "Copy CA");
        assert_eq!(note.text(), "Contract ready");
    }

    #[test]
    fn test_empty_text_is_skipped() {
        let mut clipboard = MemoryClipboard::new();
        let mut note = CopyNote::default();
        let mut control = CopyControl::new("Copy", "");

        let outcome = control.activate(&mut clipboard, Some(&mut note), Instant::now());
        assert_eq!(outcome, CopyOutcome::Skipped);
        assert!(clipboard.contents().is_none());
        assert_eq!(control.label(), "Copy");
        assert_eq!(note.text(), "Contract ready");
    }

    #[test]
    fn test_failure_only_touches_note() {
        let mut clipboard = MemoryClipboard::rejecting();
        let mut note = CopyNote::default();
        let mut control = CopyControl::new("Copy", "abc");

        let outcome = control.activate(&mut clipboard, Some(&mut note), Instant::now());
        assert_eq!(outcome, CopyOutcome::Failed);
        assert_eq!(control.label(), "Copy");
        assert_eq!(note.text(), "Copy failed");
    }

    #[test]
    fn test_reactivation_replaces_deadline() {
        let mut clipboard = MemoryClipboard::new();
        let mut control = CopyControl::new("Copy", "abc");
        let start = Instant::now();

        control.activate(&mut clipboard, None, start);
        let second = start + Duration::from_millis(1000);
        control.activate(&mut clipboard, None, second);

        // The first deadline no longer applies.
        assert!(!control.tick(start + REVERT_DELAY));
        assert_eq!(control.label(), "Copied");
        assert!(control.tick(second + REVERT_DELAY));
        assert_eq!(control.label(), "Copy");
    }

    #[test]
    fn test_chain_prefers_secure_clipboard() {
        let mut chain = ClipboardChain::new(MemoryClipboard::new(), MemoryClipboard::new());
        chain.write_text("x").unwrap();
        assert_eq!(chain.secure.contents(), Some("x"));
        assert!(chain.legacy.contents().is_none());
    }

    #[test]
    fn test_chain_falls_back_to_legacy() {
        let mut chain = ClipboardChain::new(MemoryClipboard::unavailable(), MemoryClipboard::new());
        assert!(chain.is_available());
        chain.write_text("x").unwrap();
        assert!(chain.secure.contents().is_none());
        assert_eq!(chain.legacy.contents(), Some("x"));
    }

    #[test]
    fn test_chain_without_any_clipboard_fails() {
        let mut chain =
            ClipboardChain::new(MemoryClipboard::unavailable(), MemoryClipboard::unavailable());
        assert!(!chain.is_available());
        assert!(matches!(chain.write_text("x"), Err(ClipboardError::Unavailable)));
    }
}
