//! Slash-command registry and the dropdown matcher driven by it.

use core_text::display::{Align, pad_text, visible_len};
use std::path::Path;

/// `(name, display_label, agent_file)`; `name` always begins with `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDescriptor {
    pub name: String,
    pub display_label: String,
    pub agent_file: String,
}

impl CommandDescriptor {
    pub fn new(
        name: impl Into<String>,
        display_label: impl Into<String>,
        agent_file: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            display_label: display_label.into(),
            agent_file: agent_file.into(),
        }
    }
}

/// Ordered registry of commands; order is preserved since tie-break matching
/// is defined in terms of registration order.
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    commands: Vec<CommandDescriptor>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    pub fn register(&mut self, descriptor: CommandDescriptor) {
        self.commands.push(descriptor);
    }

    pub fn get(&self, name: &str) -> Option<&CommandDescriptor> {
        self.commands.iter().find(|c| c.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandDescriptor> {
        self.commands.iter()
    }

    /// Commands matching `query` (which must begin with `/`), ordered
    /// prefix-matches-first then substring-matches, each group preserving
    /// registration order.
    pub fn matching(&self, query: &str) -> Vec<&CommandDescriptor> {
        debug_assert!(query.starts_with('/'));
        if query == "/" {
            return self.commands.iter().collect();
        }
        let needle = query[1..].to_lowercase();
        let mut starts = Vec::new();
        let mut contains = Vec::new();
        for c in &self.commands {
            let lowered = c.name.trim_start_matches('/').to_lowercase();
            if lowered.starts_with(&needle) {
                starts.push(c);
            } else if lowered.contains(&needle) {
                contains.push(c);
            }
        }
        starts.extend(contains);
        starts
    }

    /// Build a registry from every `*.agent.md` file under `<root>/.github/agents`.
    /// A command named after the file stem (`ouroboros.agent.md` → `/ouroboros`)
    /// is registered for each one, in directory listing order. A missing or
    /// unreadable directory yields an empty registry rather than an error:
    /// the command matcher simply has nothing to offer.
    pub fn discover(root: &Path) -> Self {
        let mut registry = Self::new();
        let agents_dir = root.join(".github").join("agents");
        let entries = match std::fs::read_dir(&agents_dir) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::debug!(
                    target: "commands",
                    dir = %agents_dir.display(),
                    error = %err,
                    "agents_dir_unreadable"
                );
                return registry;
            }
        };
        let mut files: Vec<_> = entries.filter_map(Result::ok).map(|e| e.path()).collect();
        files.sort();
        for path in files {
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(stem) = file_name.strip_suffix(".agent.md") else {
                continue;
            };
            registry.register(CommandDescriptor::new(
                format!("/{stem}"),
                stem.to_string(),
                file_name.to_string(),
            ));
        }
        registry
    }
}

/// Matcher state for the in-progress `/command` dropdown.
#[derive(Debug, Clone, Default)]
pub struct CommandMatcher {
    active: bool,
    prefix: String,
    matches: Vec<CommandDescriptor>,
    selected: usize,
}

impl CommandMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn matches(&self) -> &[CommandDescriptor] {
        &self.matches
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// (Re)compute matches from the current line content against `registry`.
    /// `line` is expected to start with `/`; anything else deactivates the matcher.
    pub fn update(&mut self, line: &str, registry: &CommandRegistry) {
        if !line.starts_with('/') {
            self.deactivate();
            return;
        }
        self.active = true;
        self.prefix = line.to_string();
        self.matches = registry.matching(line).into_iter().cloned().collect();
        if self.selected >= self.matches.len() {
            self.selected = self.matches.len().saturating_sub(1);
        }
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.prefix.clear();
        self.matches.clear();
        self.selected = 0;
    }

    pub fn move_up(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    pub fn move_down(&mut self) {
        if self.selected + 1 < self.matches.len() {
            self.selected += 1;
        }
    }

    /// Returns the currently selected command name, if any.
    pub fn complete(&self) -> Option<&str> {
        self.matches.get(self.selected).map(|c| c.name.as_str())
    }

    /// Accept the current selection (append a trailing space) and deactivate
    /// when there's exactly one candidate, else cycle the selection,
    /// wrapping back to index 0 after the last match.
    pub fn tab_complete(&mut self) -> Option<String> {
        if self.matches.is_empty() {
            return None;
        }
        let name = self.matches[self.selected].name.clone();
        if self.matches.len() == 1 {
            self.deactivate();
            return Some(format!("{name} "));
        }
        self.selected = (self.selected + 1) % self.matches.len();
        Some(format!("{name} "))
    }

    /// Render the dropdown as fixed-width `marker name — description` lines,
    /// each capped at `max_width` display columns, the selected row prefixed
    /// with `>` and the rest with two spaces.
    pub fn render_dropdown(&self, max_width: usize) -> Vec<String> {
        self.matches
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let marker = if i == self.selected { "> " } else { "  " };
                let line = format!("{marker}{} — {}", c.name, c.display_label);
                if visible_len(&line) > max_width {
                    pad_text(&line, max_width, Align::Left, ' ', true)
                } else {
                    line
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> CommandRegistry {
        let mut r = CommandRegistry::new();
        r.register(CommandDescriptor::new("/ouroboros", "Ouroboros", "ouroboros.agent.md"));
        r.register(CommandDescriptor::new("/outline", "Outline", "outline.agent.md"));
        r.register(CommandDescriptor::new("/review", "Review", "review.agent.md"));
        r
    }

    #[test]
    fn bare_slash_matches_everything_in_registration_order() {
        let r = registry();
        let names: Vec<&str> = r.matching("/").iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["/ouroboros", "/outline", "/review"]);
    }

    #[test]
    fn prefix_matches_precede_substring_matches() {
        let r = registry();
        let names: Vec<&str> = r.matching("/o").iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["/ouroboros", "/outline"]);
    }

    #[test]
    fn substring_match_without_prefix_still_found() {
        let mut r = registry();
        r.register(CommandDescriptor::new("/preview", "Preview", "preview.agent.md"));
        let names: Vec<&str> = r.matching("/view").iter().map(|c| c.name.as_str()).collect();
        // "preview" contains "view" but doesn't start with it; "outline" doesn't contain "view".
        assert_eq!(names, vec!["/preview"]);
    }

    #[test]
    fn tab_complete_single_match_appends_space_and_deactivates() {
        let r = registry();
        let mut m = CommandMatcher::new();
        m.update("/rev", &r);
        let out = m.tab_complete().unwrap();
        assert_eq!(out, "/review ");
        assert!(!m.is_active());
    }

    #[test]
    fn tab_complete_cycles_and_wraps() {
        let r = registry();
        let mut m = CommandMatcher::new();
        m.update("/o", &r);
        assert_eq!(m.tab_complete().unwrap(), "/ouroboros ");
        assert_eq!(m.selected_index(), 1);
        assert_eq!(m.tab_complete().unwrap(), "/outline ");
        assert_eq!(m.selected_index(), 0); // wrapped
    }

    #[test]
    fn move_up_down_do_not_wrap() {
        let r = registry();
        let mut m = CommandMatcher::new();
        m.update("/", &r);
        m.move_up(); // already at 0, no-op
        assert_eq!(m.selected_index(), 0);
        m.move_down();
        m.move_down();
        assert_eq!(m.selected_index(), 2);
        m.move_down(); // at end, no-op
        assert_eq!(m.selected_index(), 2);
    }

    #[test]
    fn selection_clamps_when_match_set_shrinks() {
        let r = registry();
        let mut m = CommandMatcher::new();
        m.update("/", &r);
        m.move_down();
        m.move_down();
        assert_eq!(m.selected_index(), 2);
        m.update("/rev", &r); // now only one match
        assert_eq!(m.selected_index(), 0);
    }

    #[test]
    fn non_slash_line_deactivates() {
        let r = registry();
        let mut m = CommandMatcher::new();
        m.update("/o", &r);
        assert!(m.is_active());
        m.update("hello", &r);
        assert!(!m.is_active());
    }

    #[test]
    fn discover_registers_one_command_per_agent_file() {
        let tmp = tempfile::tempdir().unwrap();
        let agents_dir = tmp.path().join(".github").join("agents");
        std::fs::create_dir_all(&agents_dir).unwrap();
        std::fs::write(agents_dir.join("ouroboros.agent.md"), "# prompt").unwrap();
        std::fs::write(agents_dir.join("outline.agent.md"), "# prompt").unwrap();
        std::fs::write(agents_dir.join("README.md"), "not an agent").unwrap();

        let registry = CommandRegistry::discover(tmp.path());
        let names: Vec<&str> = registry.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["/outline", "/ouroboros"]);
        let outline = registry.get("/outline").unwrap();
        assert_eq!(outline.agent_file, "outline.agent.md");
    }

    #[test]
    fn discover_missing_dir_yields_empty_registry() {
        let tmp = tempfile::tempdir().unwrap();
        let registry = CommandRegistry::discover(tmp.path());
        assert_eq!(registry.iter().count(), 0);
    }
}
