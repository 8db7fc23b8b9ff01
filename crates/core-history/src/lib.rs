//! Persistent command history: an append-only log with a reverse-substring
//! search engine and a browse cursor for the Up/Down and `CtrlR` UI flows.
//!
//! The store owns its own persistence: one entry per line, oldest to newest,
//! capped at `max_entries`. Corrupt or missing files degrade to an empty
//! history rather than surfacing an error — history is a convenience, never
//! a reason to refuse to start.

use std::path::PathBuf;

pub const DEFAULT_MAX_ENTRIES: usize = 1000;

/// Append-only history log with a recency-ordered substring search and a
/// browse cursor used by Up/Down navigation and `CtrlR` search.
#[derive(Debug)]
pub struct HistoryStore {
    entries: Vec<String>,
    max_entries: usize,
    path: Option<PathBuf>,
    /// Index into `entries`; `entries.len()` denotes "not browsing" (the live
    /// in-progress edit).
    browse_pos: usize,
    working_draft: Option<String>,
}

impl HistoryStore {
    /// Load from `path` (if given), capped at `max_entries`. A missing file,
    /// unreadable file, or (by construction, since we read as UTF-8) invalid
    /// encoding all degrade to an empty history.
    pub fn load(path: Option<PathBuf>, max_entries: usize) -> Self {
        let mut entries: Vec<String> = path
            .as_ref()
            .and_then(|p| std::fs::read_to_string(p).ok())
            .map(|content| content.lines().map(str::to_string).collect())
            .unwrap_or_default();
        truncate_to_cap(&mut entries, max_entries);
        let browse_pos = entries.len();
        Self {
            entries,
            max_entries,
            path,
            browse_pos,
            working_draft: None,
        }
    }

    pub fn in_memory(max_entries: usize) -> Self {
        Self::load(None, max_entries)
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Trim `s`; reject empty or a repeat of the current last entry; else
    /// append, persist, and reset the browse cursor to the live position.
    /// Returns whether an entry was actually appended.
    pub fn add(&mut self, s: &str) -> bool {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return false;
        }
        if self.entries.last().map(String::as_str) == Some(trimmed) {
            self.reset_browse();
            return false;
        }
        self.entries.push(trimmed.to_string());
        truncate_to_cap(&mut self.entries, self.max_entries);
        self.reset_browse();
        self.persist();
        true
    }

    /// Step one entry further into the past. If already at the live
    /// position, caches `current` as the working draft first. At the oldest
    /// entry, repeated calls keep returning that entry.
    pub fn go_back(&mut self, current: &str) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        if self.browse_pos == self.entries.len() {
            self.working_draft = Some(current.to_string());
        }
        if self.browse_pos > 0 {
            self.browse_pos -= 1;
        }
        self.entries.get(self.browse_pos).map(String::as_str)
    }

    /// Step one entry toward the present. At the live position, returns the
    /// cached working draft (the text that was being typed before Up/CtrlR).
    pub fn go_forward(&mut self) -> Option<&str> {
        if self.browse_pos < self.entries.len() {
            self.browse_pos += 1;
        }
        if self.browse_pos >= self.entries.len() {
            self.working_draft.as_deref()
        } else {
            self.entries.get(self.browse_pos).map(String::as_str)
        }
    }

    /// Reset the browse cursor to the live position and drop any cached
    /// working draft (used when a search or browse is cancelled).
    pub fn reset_browse(&mut self) {
        self.browse_pos = self.entries.len();
        self.working_draft = None;
    }

    /// Case-insensitive substring search, most-recent-first. An empty query
    /// returns the ten most recent entries (also most-recent-first).
    pub fn search(&self, query: &str) -> Vec<&str> {
        if query.is_empty() {
            return self.entries.iter().rev().take(10).map(String::as_str).collect();
        }
        let needle = query.to_lowercase();
        self.entries
            .iter()
            .rev()
            .filter(|e| e.to_lowercase().contains(&needle))
            .map(String::as_str)
            .collect()
    }

    /// Scan from `start` toward older entries (exclusive of `start`) for the
    /// first entry containing `query` case-insensitively. On a hit, advances
    /// the browse cursor to the found index.
    pub fn search_backward(&mut self, query: &str, start: usize) -> Option<(usize, &str)> {
        if self.entries.is_empty() {
            return None;
        }
        let needle = query.to_lowercase();
        let mut i = start.min(self.entries.len());
        while i > 0 {
            i -= 1;
            if self.entries[i].to_lowercase().contains(&needle) {
                self.browse_pos = i;
                return Some((i, self.entries[i].as_str()));
            }
        }
        None
    }

    /// Current browse cursor position (`entries.len()` means "live").
    pub fn browse_pos(&self) -> usize {
        self.browse_pos
    }

    fn persist(&self) {
        let Some(path) = &self.path else { return };
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            let _ = std::fs::create_dir_all(parent);
        }
        let mut content = String::with_capacity(self.entries.iter().map(|e| e.len() + 1).sum());
        for entry in &self.entries {
            content.push_str(entry);
            content.push('\n');
        }
        if let Err(err) = std::fs::write(path, content) {
            tracing::debug!(target: "history", ?err, path = %path.display(), "persist_failed");
        }
    }
}

fn truncate_to_cap(entries: &mut Vec<String>, max_entries: usize) {
    if entries.len() > max_entries {
        let excess = entries.len() - max_entries;
        entries.drain(0..excess);
    }
}
