//! Shared error taxonomy for the input front-end.
//!
//! `EngineError` enumerates the failure kinds that cross crate boundaries.
//! Only `TerminalUnavailable` is fatal (the process cannot continue without
//! a controllable terminal); every other variant is recoverable and callers
//! are expected to degrade gracefully and log at debug/info, never error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("terminal unavailable: {0}")]
    TerminalUnavailable(String),

    #[error("persistence store unreadable: {0}")]
    PersistenceUnreadable(String),

    #[error("marker collision while encoding badge: {0}")]
    MarkerCollision(String),

    #[error("paste stream timed out waiting for completion")]
    PasteTimeout,

    #[error("render operation failed: {0}")]
    RenderError(String),

    #[error("clipboard unavailable: {0}")]
    ClipboardUnavailable(String),
}

impl EngineError {
    /// Only `TerminalUnavailable` should abort the process; every other
    /// variant represents a condition the caller can fall back from.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::TerminalUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_terminal_unavailable_is_fatal() {
        assert!(EngineError::TerminalUnavailable("no tty".into()).is_fatal());
        assert!(!EngineError::PasteTimeout.is_fatal());
        assert!(!EngineError::MarkerCollision("x".into()).is_fatal());
        assert!(!EngineError::PersistenceUnreadable("x".into()).is_fatal());
        assert!(!EngineError::RenderError("x".into()).is_fatal());
        assert!(!EngineError::ClipboardUnavailable("x".into()).is_fatal());
    }

    #[test]
    fn display_messages_are_human_readable() {
        let e = EngineError::ClipboardUnavailable("no X11 display".into());
        assert_eq!(e.to_string(), "clipboard unavailable: no X11 display");
    }
}
