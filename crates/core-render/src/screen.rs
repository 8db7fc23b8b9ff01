//! Double-buffered screen compositor (§4.6). All output goes through the
//! writer handed to [`Screen::new`]; the application wires that writer to
//! stderr, never stdout.

use crate::{CellFlags, Frame};
use core_terminal::TerminalCapabilities;
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{Clear, ClearType};
use crossterm::{cursor, execute, queue};
use std::io::{self, Write};

const RESIZE_NOTICE: &str = "Resize";

pub struct Screen<W: Write> {
    current: Frame,
    previous: Frame,
    out: W,
    dirty_all: bool,
}

impl<W: Write> Screen<W> {
    pub fn new(out: W, width: u16, height: u16) -> Self {
        Self {
            current: Frame::new(width, height),
            previous: Frame::new(width, height),
            out,
            dirty_all: true,
        }
    }

    pub fn width(&self) -> u16 {
        self.current.width
    }

    pub fn height(&self) -> u16 {
        self.current.height
    }

    /// Reallocate both buffers for a new terminal size, preserving whatever
    /// of the old frame overlaps the new dimensions, and mark every row
    /// dirty so the next [`Screen::render`] repaints unconditionally.
    pub fn resize(&mut self, width: u16, height: u16) {
        let mut preserved = Frame::new(width, height);
        for y in 0..height.min(self.current.height) {
            for (cluster, w, flags, x) in self.current.row_leaders(y) {
                if x < width {
                    preserved.set_cluster(x, y, cluster, w, flags);
                }
            }
        }
        self.current = preserved;
        self.previous = Frame::new(width, height);
        self.dirty_all = true;
    }

    /// Replace the composed frame and repaint only the rows that differ
    /// from the previous frame (or every row, if `dirty_all` is set).
    /// Cursor is hidden for the duration of the repaint.
    pub fn render(&mut self, content: Frame) -> io::Result<()> {
        self.current = content;
        execute!(self.out, cursor::Hide)?;
        for y in 0..self.current.height {
            let unchanged =
                !self.dirty_all && y < self.previous.height && self.current.row_eq(&self.previous, y);
            if unchanged {
                continue;
            }
            queue!(
                self.out,
                cursor::MoveTo(0, y),
                Clear(ClearType::CurrentLine)
            )?;
            for (cluster, _w, flags, x) in self.current.row_leaders(y) {
                queue!(self.out, cursor::MoveTo(x, y))?;
                if flags.contains(CellFlags::REVERSE) {
                    queue!(self.out, SetAttribute(Attribute::Reverse), Print(cluster), SetAttribute(Attribute::Reset))?;
                } else {
                    queue!(self.out, Print(cluster))?;
                }
            }
        }
        self.out.flush()?;
        self.previous = self.current.clone();
        self.dirty_all = false;
        Ok(())
    }

    /// Position and reveal the real terminal cursor; callers do this last,
    /// after the frame has been repainted, so it never flickers mid-paint.
    pub fn show_cursor_at(&mut self, x: u16, y: u16) -> io::Result<()> {
        execute!(self.out, cursor::MoveTo(x, y), cursor::Show)
    }

    pub fn hide_cursor(&mut self) -> io::Result<()> {
        execute!(self.out, cursor::Hide)
    }

    /// Suspend composition and show a single centered word until the
    /// terminal grows back past the minimum size.
    pub fn render_resize_notice(&mut self) -> io::Result<()> {
        let (width, height) = (self.current.width, self.current.height);
        execute!(self.out, cursor::Hide, Clear(ClearType::All))?;
        let x = width.saturating_sub(RESIZE_NOTICE.len() as u16) / 2;
        let y = height / 2;
        execute!(self.out, cursor::MoveTo(x, y), Print(RESIZE_NOTICE))?;
        self.out.flush()?;
        self.dirty_all = true;
        Ok(())
    }
}

pub fn too_small(caps: TerminalCapabilities) -> bool {
    caps.too_small()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_render_repaints_every_row() {
        let mut screen = Screen::new(Vec::new(), 10, 2);
        let mut frame = Frame::new(10, 2);
        frame.set_cluster(0, 0, "a", 1, CellFlags::empty());
        screen.render(frame).unwrap();
        let written = String::from_utf8(screen.out.clone()).unwrap();
        // both rows were touched even though row 1 is blank, same as previous
        assert!(written.contains('a'));
    }

    #[test]
    fn unchanged_row_is_skipped_on_second_render() {
        let mut screen = Screen::new(Vec::new(), 10, 2);
        let frame = Frame::new(10, 2);
        screen.render(frame.clone()).unwrap();
        screen.out.clear();
        screen.render(frame).unwrap();
        // nothing changed since the last render; no MoveTo/Clear should be queued beyond the cursor hide
        assert!(screen.out.len() < 8);
    }

    #[test]
    fn resize_preserves_overlap_and_forces_dirty() {
        let mut screen = Screen::new(Vec::new(), 10, 2);
        let mut frame = Frame::new(10, 2);
        frame.set_cluster(0, 0, "x", 1, CellFlags::empty());
        screen.render(frame).unwrap();
        screen.resize(5, 2);
        assert_eq!(screen.width(), 5);
        assert_eq!(screen.current.line_clusters(0)[0], "x");
    }

    #[test]
    fn too_small_matches_capabilities() {
        assert!(too_small(TerminalCapabilities::new(5, 5)));
        assert!(!too_small(TerminalCapabilities::new(80, 24)));
    }
}
