//! `Window`: a rectangle with its own cell buffer that writes through to a
//! [`crate::screen::Screen`] on `refresh()` (§4.6).

use crate::box_style::BoxStyle;
use crate::{CellFlags, Frame};
use core_text::egc_width;
use unicode_segmentation::UnicodeSegmentation;

pub struct Window {
    pub y: u16,
    pub x: u16,
    pub h: u16,
    pub w: u16,
    buffer: Frame,
    dirty: bool,
}

impl Window {
    pub fn new(y: u16, x: u16, h: u16, w: u16) -> Self {
        Self {
            y,
            x,
            h,
            w,
            buffer: Frame::new(w, h),
            dirty: true,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Clear the window's buffer back to blank cells.
    pub fn clear(&mut self) {
        self.buffer = Frame::new(self.w, self.h);
        self.dirty = true;
    }

    /// Write text starting at local `(row, col)`; clamps to the window
    /// bounds and silently truncates anything that would overflow.
    pub fn write_text(&mut self, row: u16, col: u16, text: &str, flags: CellFlags) {
        if row >= self.h || col >= self.w {
            return;
        }
        let mut cursor = col;
        for g in text.graphemes(true) {
            if cursor >= self.w {
                break;
            }
            let gw = egc_width(g).max(1);
            self.buffer.set_cluster(cursor, row, g, gw, flags);
            cursor = cursor.saturating_add(gw);
        }
        self.dirty = true;
    }

    /// Draw a border around the full window using one of the four box
    /// character sets; a window smaller than 2x2 draws nothing.
    pub fn draw_box(&mut self, style: BoxStyle, flags: CellFlags) {
        if self.w < 2 || self.h < 2 {
            return;
        }
        let c = style.chars();
        let last_row = self.h - 1;
        let last_col = self.w - 1;

        self.buffer
            .set_cluster(0, 0, &c.top_left.to_string(), 1, flags);
        self.buffer
            .set_cluster(last_col, 0, &c.top_right.to_string(), 1, flags);
        self.buffer
            .set_cluster(0, last_row, &c.bottom_left.to_string(), 1, flags);
        self.buffer
            .set_cluster(last_col, last_row, &c.bottom_right.to_string(), 1, flags);

        for x in 1..last_col {
            self.buffer
                .set_cluster(x, 0, &c.horizontal.to_string(), 1, flags);
            self.buffer
                .set_cluster(x, last_row, &c.horizontal.to_string(), 1, flags);
        }
        for y in 1..last_row {
            self.buffer
                .set_cluster(0, y, &c.vertical.to_string(), 1, flags);
            self.buffer
                .set_cluster(last_col, y, &c.vertical.to_string(), 1, flags);
        }
        self.dirty = true;
    }

    /// Blit this window's buffer into `target` at its anchored position,
    /// clamping to whatever of the window actually fits in `target`.
    pub fn refresh(&mut self, target: &mut Frame) {
        for row in 0..self.h {
            let ty = self.y + row;
            if ty >= target.height {
                break;
            }
            for (cluster, width, flags, local_x) in self.buffer.row_leaders(row) {
                let tx = self.x + local_x;
                if tx >= target.width {
                    continue;
                }
                target.set_cluster(tx, ty, cluster, width, flags);
            }
        }
        self.dirty = false;
    }

    pub fn buffer(&self) -> &Frame {
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_text_clamps_to_bounds() {
        let mut win = Window::new(0, 0, 3, 5);
        win.write_text(0, 3, "hello", CellFlags::empty());
        // only "he" fits before the 5-wide buffer ends
        assert_eq!(win.buffer().line_clusters(0), vec!["h", "e"]);
    }

    #[test]
    fn draw_box_ascii_places_corners() {
        let mut win = Window::new(0, 0, 3, 4);
        win.draw_box(BoxStyle::Ascii, CellFlags::empty());
        assert_eq!(win.buffer().line_clusters(0), vec!["+", "-", "-", "+"]);
        assert_eq!(win.buffer().line_clusters(2), vec!["+", "-", "-", "+"]);
    }

    #[test]
    fn refresh_blits_at_anchor() {
        let mut win = Window::new(2, 3, 2, 2);
        win.write_text(0, 0, "X", CellFlags::empty());
        let mut screen_frame = Frame::new(10, 10);
        win.refresh(&mut screen_frame);
        assert_eq!(screen_frame.line_clusters(2)[3], "X");
        assert!(!win.is_dirty());
    }

    #[test]
    fn refresh_off_screen_window_is_clamped_not_panicking() {
        let mut win = Window::new(8, 8, 5, 5);
        win.write_text(4, 4, "Z", CellFlags::empty());
        let mut screen_frame = Frame::new(10, 10);
        win.refresh(&mut screen_frame);
    }
}
