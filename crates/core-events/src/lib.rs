//! Event types shared between the async input task and the main loop.
//!
//! `InputEvent` is the normalized surface the rest of the application reacts
//! to; everything terminal- and crossterm-specific stays behind `core-input`.

use std::time::Instant;

/// Capacity of the bounded channel bridging the async input task and the
/// single-threaded main loop. Sized generously so a burst of paste chunks or
/// fast typing never forces the producer to block noticeably.
pub const EVENT_CHANNEL_CAP: usize = 8192;

// Telemetry counters (fetch_add relaxed, no locking). Exercised by the
// async-input tests and available for anyone instrumenting a running
// session; there is no metrics exporter in this stack.
pub static CHANNEL_SEND_FAILURES: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);
pub static CHANNEL_BLOCKING_SENDS: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);
pub static PASTE_SESSIONS: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);
pub static PASTE_CHUNKS: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);
pub static PASTE_BYTES: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);
pub static KEYPRESS_TOTAL: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);
pub static KEYPRESS_REPEAT: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);
pub static ASYNC_INPUT_STARTS: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);
pub static ASYNC_INPUT_STOP_SIGNAL: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);
pub static ASYNC_INPUT_STOP_CHANNEL: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);
pub static ASYNC_INPUT_STOP_STREAM: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);
pub static ASYNC_INPUT_STOP_ERROR: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);

/// Top-level event consumed by the main loop.
#[derive(Debug, Clone)]
pub enum Event {
    Input(InputEvent),
    Shutdown,
}

/// Normalized input events the async input task emits onto the channel.
#[derive(Debug, Clone)]
pub enum InputEvent {
    /// A logical key press: richer token model, timestamp, and repeat flag.
    KeyPress(KeyEventExt),
    /// Terminal resize (columns, rows).
    Resize(u16, u16),
    /// Synthetic interrupt (Ctrl-C), surfaced distinctly from a plain keypress
    /// so the main loop can run its exit sequence without pattern-matching on
    /// the raw token.
    CtrlC,
    /// Start of a bracketed paste sequence (size unknown until `PasteEnd`).
    PasteStart,
    /// A chunk within a bracketed paste. Never logged verbatim; callers must
    /// only log length.
    PasteChunk(String),
    /// End of a bracketed paste sequence.
    PasteEnd,
}

/// Rich keypress metadata emitted by the async input task.
///
/// `repeat` is `true` only for auto-repeat events reported by the terminal;
/// it must never be synthesized downstream. `timestamp` is the instant the
/// input task observed the event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyEventExt {
    pub token: KeyToken,
    pub repeat: bool,
    pub timestamp: Instant,
}

impl KeyEventExt {
    pub fn new(token: KeyToken) -> Self {
        Self::from_parts(token, false, Instant::now())
    }

    pub fn with_repeat(token: KeyToken, repeat: bool) -> Self {
        Self::from_parts(token, repeat, Instant::now())
    }

    pub fn from_parts(token: KeyToken, repeat: bool, timestamp: Instant) -> Self {
        Self {
            token,
            repeat,
            timestamp,
        }
    }
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ModMask: u16 { const CTRL=1; const ALT=2; const SHIFT=4; const META=8; const SUPER=16; }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Enter,
    Esc,
    Backspace,
    Tab,
    F(u8),
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,
}

/// Canonical logical key tokens. `Chord` wraps a base token plus a modifier
/// mask so combinations like Ctrl+Enter or Shift+Tab are representable
/// without a combinatorial explosion of named variants.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyToken {
    Char(char),
    Named(NamedKey),
    Chord { base: Box<KeyToken>, mods: ModMask },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn key_event_ext_new_defaults() {
        let token = KeyToken::Char('a');
        let evt = KeyEventExt::new(token.clone());
        assert_eq!(evt.token, token);
        assert!(!evt.repeat, "new() must default repeat to false");
        assert!(evt.timestamp <= Instant::now());
    }

    #[test]
    fn key_event_ext_with_repeat_and_from_parts() {
        let token = KeyToken::Named(NamedKey::Enter);
        let ts = Instant::now();
        let evt = KeyEventExt::from_parts(token.clone(), true, ts);
        assert_eq!(evt.token, token);
        assert!(evt.repeat);
        assert_eq!(evt.timestamp, ts);

        let repeat_evt = KeyEventExt::with_repeat(token.clone(), false);
        assert_eq!(repeat_evt.token, token);
        assert!(!repeat_evt.repeat);
        assert!(repeat_evt.timestamp >= ts);
    }

    #[test]
    fn key_token_chord_round_trip() {
        let mods = ModMask::CTRL | ModMask::ALT;
        let base = KeyToken::Named(NamedKey::Down);
        let chord = KeyToken::Chord {
            base: Box::new(base.clone()),
            mods,
        };
        let evt = KeyEventExt::with_repeat(chord.clone(), true);
        match evt.token {
            KeyToken::Chord {
                base: boxed_base,
                mods: observed_mods,
            } => {
                assert_eq!(*boxed_base, base);
                assert_eq!(observed_mods, mods);
            }
            other => panic!("expected chord token, got {:?}", other),
        }
        assert!(evt.repeat);
    }
}
