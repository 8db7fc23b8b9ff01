//! Multi-line edit buffer with a cursor and badge-atomic motion/deletion.
//!
//! Lines never contain a line terminator; a "badge" (file or paste marker,
//! see `core-badge`) lives entirely inside one line even when it represents
//! multi-line pasted content, since paste markers encode their embedded
//! newlines as `⏎` rather than literal `\n`. That means marker-awareness is
//! always a per-line concern here.

use core_badge::{Marker, find_markers, get_marker_at_position};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    lines: Vec<String>,
    cursor: (usize, usize),
    scroll_offset: usize,
    /// remembered column for vertical motion across lines of unequal length
    sticky_col: usize,
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Buffer {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            cursor: (0, 0),
            scroll_offset: 0,
            sticky_col: 0,
        }
    }

    pub fn cursor(&self) -> (usize, usize) {
        self.cursor
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line(&self, row: usize) -> &str {
        &self.lines[row]
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    fn line_len(&self, row: usize) -> usize {
        self.lines[row].chars().count()
    }

    fn chars(&self, row: usize) -> Vec<char> {
        self.lines[row].chars().collect()
    }

    fn set_line(&mut self, row: usize, chars: Vec<char>) {
        self.lines[row] = chars.into_iter().collect();
    }

    /// If `col` lands strictly inside a marker on `row`, snap to the nearer boundary.
    fn snapped(&self, row: usize, col: usize) -> usize {
        match get_marker_at_position(&self.lines[row], col) {
            Some(Marker { start, end, .. }) if col > start => {
                if col - start <= end - col {
                    start
                } else {
                    end
                }
            }
            _ => col,
        }
    }

    /// If `col` lands strictly inside a marker on `row`, snap to the boundary
    /// in the direction of travel: `end` moving right, `start` moving left.
    /// This is what makes badge-atomic motion actually cross the badge rather
    /// than bounce off its near edge.
    fn snapped_towards(&self, row: usize, col: usize, forward: bool) -> usize {
        match get_marker_at_position(&self.lines[row], col) {
            Some(Marker { start, end, .. }) => {
                if forward {
                    end
                } else {
                    start
                }
            }
            None => col,
        }
    }

    fn clamp_cursor(&mut self) {
        if self.cursor.0 >= self.lines.len() {
            self.cursor.0 = self.lines.len() - 1;
        }
        let len = self.line_len(self.cursor.0);
        if self.cursor.1 > len {
            self.cursor.1 = len;
        }
        self.cursor.1 = self.snapped(self.cursor.0, self.cursor.1);
    }

    // -- insertion -----------------------------------------------------

    pub fn insert_char(&mut self, c: char) {
        let (row, col) = self.cursor;
        let mut chars = self.chars(row);
        chars.insert(col, c);
        self.set_line(row, chars);
        self.cursor.1 += 1;
        self.sticky_col = self.cursor.1;
    }

    /// Insert raw text, splitting on `\n` into new lines.
    pub fn insert_text(&mut self, s: &str) {
        let mut first = true;
        for part in s.split('\n') {
            if !first {
                self.newline();
            }
            first = false;
            for c in part.chars() {
                self.insert_char(c);
            }
        }
    }

    /// Normalize line endings, right-trim each line, drop leading/trailing
    /// empty lines, then insert as text.
    pub fn insert_formatted_paste(&mut self, s: &str) {
        let normalized = s.replace("\r\n", "\n").replace('\r', "\n");
        let mut lines: Vec<&str> = normalized.split('\n').map(|l| l.trim_end()).collect();
        while lines.first().is_some_and(|l| l.is_empty()) {
            lines.remove(0);
        }
        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }
        self.insert_text(&lines.join("\n"));
    }

    pub fn newline(&mut self) {
        let (row, col) = self.cursor;
        let chars = self.chars(row);
        let (head, tail) = chars.split_at(col.min(chars.len()));
        let head: Vec<char> = head.to_vec();
        let tail: Vec<char> = tail.to_vec();
        self.set_line(row, head);
        self.lines.insert(row + 1, tail.into_iter().collect());
        self.cursor = (row + 1, 0);
        self.sticky_col = 0;
    }

    // -- deletion --------------------------------------------------------

    pub fn backspace(&mut self) {
        let (row, col) = self.cursor;
        if col > 0 {
            if let Some(m) = get_marker_at_position(&self.lines[row], col - 1) {
                if m.end == col {
                    let mut chars = self.chars(row);
                    chars.drain(m.start..m.end);
                    self.set_line(row, chars);
                    self.cursor.1 = m.start;
                    self.sticky_col = self.cursor.1;
                    return;
                }
            }
            let mut chars = self.chars(row);
            chars.remove(col - 1);
            self.set_line(row, chars);
            self.cursor.1 -= 1;
            self.sticky_col = self.cursor.1;
        } else if row > 0 {
            let joined_at = self.line_len(row - 1);
            let tail = self.lines.remove(row);
            self.lines[row - 1].push_str(&tail);
            self.cursor = (row - 1, joined_at);
            self.sticky_col = joined_at;
        }
    }

    pub fn delete(&mut self) {
        let (row, col) = self.cursor;
        let len = self.line_len(row);
        if col < len {
            if let Some(m) = get_marker_at_position(&self.lines[row], col) {
                if m.start == col {
                    let mut chars = self.chars(row);
                    chars.drain(m.start..m.end);
                    self.set_line(row, chars);
                    return;
                }
            }
            let mut chars = self.chars(row);
            chars.remove(col);
            self.set_line(row, chars);
        } else if row + 1 < self.lines.len() {
            let next = self.lines.remove(row + 1);
            self.lines[row].push_str(&next);
        }
    }

    pub fn clear(&mut self) {
        self.lines = vec![String::new()];
        self.cursor = (0, 0);
        self.scroll_offset = 0;
        self.sticky_col = 0;
    }

    pub fn clear_line(&mut self) {
        let row = self.cursor.0;
        self.lines[row].clear();
        self.cursor.1 = 0;
        self.sticky_col = 0;
    }

    pub fn kill_to_line_end(&mut self) {
        let (row, col) = self.cursor;
        let mut chars = self.chars(row);
        chars.truncate(col);
        self.set_line(row, chars);
    }

    // -- motion ------------------------------------------------------------

    pub fn move_left(&mut self) {
        let (row, col) = self.cursor;
        if col > 0 {
            let target = col - 1;
            self.cursor.1 = self.snapped_towards(row, target, false);
        } else if row > 0 {
            self.cursor = (row - 1, self.line_len(row - 1));
        }
        self.sticky_col = self.cursor.1;
    }

    pub fn move_right(&mut self) {
        let (row, col) = self.cursor;
        let len = self.line_len(row);
        if col < len {
            let target = col + 1;
            self.cursor.1 = self.snapped_towards(row, target, true);
        } else if row + 1 < self.lines.len() {
            self.cursor = (row + 1, 0);
        }
        self.sticky_col = self.cursor.1;
    }

    pub fn move_up(&mut self) {
        if self.cursor.0 > 0 {
            self.cursor.0 -= 1;
            self.reapply_sticky_col();
        }
    }

    pub fn move_down(&mut self) {
        if self.cursor.0 + 1 < self.lines.len() {
            self.cursor.0 += 1;
            self.reapply_sticky_col();
        }
    }

    fn reapply_sticky_col(&mut self) {
        let len = self.line_len(self.cursor.0);
        self.cursor.1 = self.snapped(self.cursor.0, self.sticky_col.min(len));
    }

    pub fn home(&mut self) {
        self.cursor.1 = 0;
        self.sticky_col = 0;
    }

    pub fn end(&mut self) {
        self.cursor.1 = self.line_len(self.cursor.0);
        self.sticky_col = self.cursor.1;
    }

    pub fn word_left(&mut self) {
        let (row, col) = self.cursor;
        let chars = self.chars(row);
        let mut i = col;
        while i > 0 && chars[i - 1].is_whitespace() {
            i -= 1;
        }
        while i > 0 && !chars[i - 1].is_whitespace() {
            i -= 1;
        }
        self.cursor.1 = self.snapped(row, i);
        self.sticky_col = self.cursor.1;
    }

    pub fn word_right(&mut self) {
        let (row, col) = self.cursor;
        let chars = self.chars(row);
        let len = chars.len();
        let mut i = col;
        while i < len && !chars[i].is_whitespace() {
            i += 1;
        }
        while i < len && chars[i].is_whitespace() {
            i += 1;
        }
        self.cursor.1 = self.snapped(row, i);
        self.sticky_col = self.cursor.1;
    }

    // -- viewport ------------------------------------------------------------

    /// Adjust scroll so the cursor row stays within the viewport, then return
    /// the visible slice of lines.
    pub fn get_visible_lines(&mut self, viewport_height: usize) -> &[String] {
        if viewport_height == 0 {
            return &[];
        }
        let row = self.cursor.0;
        if row < self.scroll_offset {
            self.scroll_offset = row;
        } else if row >= self.scroll_offset + viewport_height {
            self.scroll_offset = row + 1 - viewport_height;
        }
        let end = (self.scroll_offset + viewport_height).min(self.lines.len());
        &self.lines[self.scroll_offset..end]
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// All markers present across every line, tagged with their row.
    pub fn all_markers(&self) -> Vec<(usize, Marker)> {
        self.lines
            .iter()
            .enumerate()
            .flat_map(|(row, l)| find_markers(l).into_iter().map(move |m| (row, m)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_one_empty_line() {
        let b = Buffer::new();
        assert_eq!(b.line_count(), 1);
        assert_eq!(b.line(0), "");
        assert_eq!(b.cursor(), (0, 0));
    }

    #[test]
    fn insert_char_advances_cursor() {
        let mut b = Buffer::new();
        b.insert_char('h');
        b.insert_char('i');
        assert_eq!(b.line(0), "hi");
        assert_eq!(b.cursor(), (0, 2));
    }

    #[test]
    fn newline_splits_line_at_cursor() {
        let mut b = Buffer::new();
        b.insert_text("hello world");
        // Move cursor to index 5 (right after "hello")
        b.cursor = (0, 5);
        let prev_count = b.line_count();
        b.newline();
        assert_eq!(b.line(0), "hello");
        assert_eq!(b.line(1), " world");
        assert_eq!(b.cursor(), (1, 0));
        assert_eq!(b.line_count(), prev_count + 1);
    }

    #[test]
    fn insert_text_with_embedded_newlines_creates_lines() {
        let mut b = Buffer::new();
        b.insert_text("line one\nline two");
        assert_eq!(b.line_count(), 2);
        assert_eq!(b.line(0), "line one");
        assert_eq!(b.line(1), "line two");
    }

    #[test]
    fn backspace_joins_previous_line() {
        let mut b = Buffer::new();
        b.insert_text("ab\ncd");
        b.cursor = (1, 0);
        b.backspace();
        assert_eq!(b.line_count(), 1);
        assert_eq!(b.line(0), "abcd");
        assert_eq!(b.cursor(), (0, 2));
    }

    #[test]
    fn backspace_deletes_whole_marker_atomically() {
        let marker = core_badge::create_file_marker("notes.md").unwrap();
        let mut b = Buffer::new();
        b.insert_text(&format!("x{marker}y"));
        // cursor sits right after the marker, before 'y'
        let marker_len = marker.chars().count();
        b.cursor = (0, 1 + marker_len);
        b.backspace();
        assert_eq!(b.line(0), "xy");
        assert_eq!(b.cursor(), (0, 1));
    }

    #[test]
    fn delete_removes_whole_marker_atomically() {
        let marker = core_badge::create_file_marker("notes.md").unwrap();
        let mut b = Buffer::new();
        b.insert_text(&format!("x{marker}y"));
        b.cursor = (0, 1);
        b.delete();
        assert_eq!(b.line(0), "xy");
        assert_eq!(b.cursor(), (0, 1));
    }

    #[test]
    fn move_right_snaps_over_marker_atomically() {
        let marker = core_badge::create_file_marker("notes.md").unwrap();
        let mut b = Buffer::new();
        b.insert_text(&format!("x{marker}y"));
        b.cursor = (0, 1);
        b.move_right();
        assert_eq!(b.cursor(), (0, 1 + marker.chars().count()));
    }

    #[test]
    fn move_left_snaps_over_marker_atomically() {
        let marker = core_badge::create_file_marker("notes.md").unwrap();
        let mut b = Buffer::new();
        b.insert_text(&format!("x{marker}y"));
        let end = 1 + marker.chars().count();
        b.cursor = (0, end + 1); // right after 'y'
        b.move_left(); // step over 'y'
        assert_eq!(b.cursor(), (0, end));
        b.move_left(); // should atomically cross the whole marker
        assert_eq!(b.cursor(), (0, 1));
    }

    #[test]
    fn move_up_down_preserve_sticky_column() {
        let mut b = Buffer::new();
        b.insert_text("longer line\nhi");
        b.cursor = (0, 8);
        b.move_down();
        // "hi" has length 2, so column clamps
        assert_eq!(b.cursor(), (1, 2));
        b.move_up();
        // sticky column restored on the longer line
        assert_eq!(b.cursor(), (0, 8));
    }

    #[test]
    fn word_motion_is_whitespace_delimited() {
        let mut b = Buffer::new();
        b.insert_text("foo bar baz");
        b.cursor = (0, 11);
        b.word_left();
        assert_eq!(b.cursor(), (0, 8));
        b.word_left();
        assert_eq!(b.cursor(), (0, 4));
        b.word_right();
        assert_eq!(b.cursor(), (0, 8));
    }

    #[test]
    fn get_visible_lines_scrolls_to_keep_cursor_in_view() {
        let mut b = Buffer::new();
        for i in 0..10 {
            if i > 0 {
                b.newline();
            }
            b.insert_char('a');
        }
        b.cursor = (9, 1);
        let visible = b.get_visible_lines(3);
        assert_eq!(visible.len(), 3);
        assert_eq!(b.scroll_offset(), 7);
    }

    #[test]
    fn clear_resets_to_single_empty_line() {
        let mut b = Buffer::new();
        b.insert_text("a\nb\nc");
        b.clear();
        assert_eq!(b.line_count(), 1);
        assert_eq!(b.line(0), "");
        assert_eq!(b.cursor(), (0, 0));
    }

    #[test]
    fn kill_to_line_end_truncates_after_cursor() {
        let mut b = Buffer::new();
        b.insert_text("hello world");
        b.cursor = (0, 5);
        b.kill_to_line_end();
        assert_eq!(b.line(0), "hello");
    }

    #[test]
    fn insert_formatted_paste_trims_and_drops_blank_edges() {
        let mut b = Buffer::new();
        b.insert_formatted_paste("\r\n\r\nfirst line  \r\nsecond line\r\n\r\n");
        assert_eq!(b.line_count(), 2);
        assert_eq!(b.line(0), "first line");
        assert_eq!(b.line(1), "second line");
    }
}
