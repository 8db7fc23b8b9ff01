//! Named-style table (§4.7): roles map to an opaque attribute handle. No
//! curses backend exists in this stack, so handles are always ANSI SGR
//! strings; `monochrome()` is the degrade path when colour is unavailable
//! (e.g. `ansi_colors = false` in config, or stdout/stderr is not a tty).

use std::collections::HashMap;
use std::io::{self, Write};

const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Border,
    Prompt,
    Success,
    Warning,
    Error,
    Accent,
    Info,
    Dim,
    Text,
    Title,
    Symbol,
    Bold,
    Underline,
    Reverse,
}

impl Role {
    const ALL: [Role; 14] = [
        Role::Border,
        Role::Prompt,
        Role::Success,
        Role::Warning,
        Role::Error,
        Role::Accent,
        Role::Info,
        Role::Dim,
        Role::Text,
        Role::Title,
        Role::Symbol,
        Role::Bold,
        Role::Underline,
        Role::Reverse,
    ];
}

/// An opaque attribute handle; on this stack, always a raw SGR escape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr(String);

impl Attr {
    pub fn sgr(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone)]
pub struct Theme {
    name: String,
    attrs: HashMap<Role, Attr>,
}

impl Theme {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The default theme (§6): a 256-colour purple/magenta palette.
    pub fn mystic_purple() -> Self {
        let mut attrs = HashMap::new();
        attrs.insert(Role::Border, Attr("\x1b[38;5;97m".into()));
        attrs.insert(Role::Prompt, Attr("\x1b[38;5;135m".into()));
        attrs.insert(Role::Success, Attr("\x1b[38;5;42m".into()));
        attrs.insert(Role::Warning, Attr("\x1b[38;5;214m".into()));
        attrs.insert(Role::Error, Attr("\x1b[38;5;196m".into()));
        attrs.insert(Role::Accent, Attr("\x1b[38;5;213m".into()));
        attrs.insert(Role::Info, Attr("\x1b[38;5;111m".into()));
        attrs.insert(Role::Dim, Attr("\x1b[38;5;240m".into()));
        attrs.insert(Role::Text, Attr("\x1b[38;5;253m".into()));
        attrs.insert(Role::Title, Attr("\x1b[1;38;5;141m".into()));
        attrs.insert(Role::Symbol, Attr("\x1b[38;5;177m".into()));
        attrs.insert(Role::Bold, Attr("\x1b[1m".into()));
        attrs.insert(Role::Underline, Attr("\x1b[4m".into()));
        attrs.insert(Role::Reverse, Attr("\x1b[7m".into()));
        Self {
            name: "mystic_purple".to_string(),
            attrs,
        }
    }

    /// All roles resolve to the empty attribute: no colour, no emphasis.
    pub fn monochrome() -> Self {
        let attrs = Role::ALL.into_iter().map(|r| (r, Attr(String::new()))).collect();
        Self {
            name: "monochrome".to_string(),
            attrs,
        }
    }

    /// Resolve a theme by configured name, falling back to the default for
    /// anything unrecognised (never an error: a bad config value degrades).
    pub fn by_name(name: &str) -> Self {
        match name {
            "monochrome" | "plain" => Self::monochrome(),
            _ => Self::mystic_purple(),
        }
    }

    pub fn get_attr(&self, role: Role) -> &Attr {
        // every variant is populated in both constructors above
        self.attrs.get(&role).expect("theme covers every role")
    }

    pub fn styled_text(&self, text: &str, role: Role) -> String {
        let attr = self.get_attr(role);
        if attr.sgr().is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", attr.sgr(), text, RESET)
        }
    }

    pub fn apply<W: Write>(&self, out: &mut W, role: Role) -> io::Result<()> {
        write!(out, "{}", self.get_attr(role).sgr())
    }

    pub fn reset<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "{RESET}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_theme_is_mystic_purple() {
        assert_eq!(Theme::by_name("anything_unrecognised").name(), "mystic_purple");
    }

    #[test]
    fn monochrome_strips_styling() {
        let theme = Theme::monochrome();
        assert_eq!(theme.styled_text("hi", Role::Error), "hi");
    }

    #[test]
    fn mystic_purple_wraps_and_resets() {
        let theme = Theme::mystic_purple();
        let styled = theme.styled_text("hi", Role::Error);
        assert!(styled.starts_with("\x1b[38;5;196m"));
        assert!(styled.ends_with(RESET));
    }

    #[test]
    fn apply_then_reset_round_trips() {
        let theme = Theme::mystic_purple();
        let mut buf = Vec::new();
        theme.apply(&mut buf, Role::Border).unwrap();
        theme.reset(&mut buf).unwrap();
        let s = String::from_utf8(buf).unwrap();
        assert!(s.starts_with("\x1b[38;5;97m"));
        assert!(s.ends_with(RESET));
    }
}
