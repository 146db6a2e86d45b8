//! TerminalRenderer: flushes a framebuffer to a real terminal.
//!
//! The first frame (and any frame after a resize) is a full redraw. Later
//! frames only rewrite runs of changed cells. Half-block pixels change a lot
//! while the view rotates, so the encoder tracks the terminal pen and sends
//! only the colour that actually changed between neighbouring cells.

use std::io::{self, Write};

use anyhow::Result;

use crossterm::{
    cursor,
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, QueueableCommand,
};

use crate::fb::{CellStyle, FrameBuffer, Rgb};

pub struct TerminalRenderer {
    stdout: io::Stdout,
    last: Option<FrameBuffer>,
    buf: Vec<u8>,
    /// Key release events were requested from the terminal.
    release_events: bool,
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            last: None,
            buf: Vec::with_capacity(64 * 1024),
            release_events: false,
        }
    }

    /// Enter raw mode and the alternate screen.
    ///
    /// Returns true when the terminal will report key releases.
    pub fn enter(&mut self) -> Result<bool> {
        terminal::enable_raw_mode()?;
        self.release_events = terminal::supports_keyboard_enhancement().unwrap_or(false);
        self.buf.clear();
        self.buf.queue(terminal::EnterAlternateScreen)?;
        self.buf.queue(cursor::Hide)?;
        self.buf.queue(terminal::DisableLineWrap)?;
        if self.release_events {
            self.buf.queue(PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
            ))?;
        }
        self.flush_buf()?;
        Ok(self.release_events)
    }

    pub fn exit(&mut self) -> Result<()> {
        self.buf.clear();
        if self.release_events {
            self.buf.queue(PopKeyboardEnhancementFlags)?;
        }
        self.buf.queue(ResetColor)?;
        self.buf.queue(SetAttribute(Attribute::Reset))?;
        self.buf.queue(terminal::EnableLineWrap)?;
        self.buf.queue(cursor::Show)?;
        self.buf.queue(terminal::LeaveAlternateScreen)?;
        self.flush_buf()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Force the next draw to be a full redraw.
    ///
    /// Useful on terminal resize events.
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    /// Draw a framebuffer, swapping it into internal state.
    ///
    /// Callers should keep one `FrameBuffer` and pass it in every frame.
    /// The renderer will diff against the previous frame and then swap buffers
    /// so the caller can reuse the old one without cloning.
    pub fn draw_swap(&mut self, fb: &mut FrameBuffer) -> Result<()> {
        // Take previous out to avoid borrow conflicts (no cloning).
        let (mut prev, needs_full) = match self.last.take() {
            Some(prev) => {
                let resized = prev.width() != fb.width() || prev.height() != fb.height();
                (prev, resized)
            }
            None => (FrameBuffer::new(fb.width(), fb.height()), true),
        };

        self.buf.clear();
        if needs_full {
            encode_full_into(fb, &mut self.buf)?;
            prev.resize(fb.width(), fb.height());
        } else {
            encode_diff_into(&prev, fb, &mut self.buf)?;
        }
        if !self.buf.is_empty() {
            self.flush_buf()?;
        }

        // Swap current into prev so next frame can diff without cloning.
        std::mem::swap(&mut prev, fb);
        self.last = Some(prev);
        Ok(())
    }

    fn flush_buf(&mut self) -> Result<()> {
        self.stdout.write_all(&self.buf)?;
        self.stdout.flush()?;
        Ok(())
    }
}

/// Unchanged cells bridged inside one run. Reprinting a few half blocks is
/// shorter than the cursor move it replaces.
const RUN_GAP: u16 = 4;

/// What the terminal currently has selected.
#[derive(Debug, Default)]
struct Pen {
    fg: Option<Rgb>,
    bg: Option<Rgb>,
    attrs: Option<(bool, bool)>,
}

impl Pen {
    fn apply(&mut self, out: &mut Vec<u8>, style: CellStyle) -> Result<()> {
        let attrs = (style.bold, style.dim);
        if self.attrs != Some(attrs) {
            // SGR reset drops both colours as well.
            out.queue(SetAttribute(Attribute::Reset))?;
            if style.bold {
                out.queue(SetAttribute(Attribute::Bold))?;
            }
            if style.dim {
                out.queue(SetAttribute(Attribute::Dim))?;
            }
            *self = Pen {
                attrs: Some(attrs),
                ..Pen::default()
            };
        }
        if self.fg != Some(style.fg) {
            out.queue(SetForegroundColor(rgb_to_color(style.fg)))?;
            self.fg = Some(style.fg);
        }
        if self.bg != Some(style.bg) {
            out.queue(SetBackgroundColor(rgb_to_color(style.bg)))?;
            self.bg = Some(style.bg);
        }
        Ok(())
    }

    /// Print `len` cells of row `y` starting at column `x`.
    fn print_row(
        &mut self,
        out: &mut Vec<u8>,
        fb: &FrameBuffer,
        x: u16,
        y: u16,
        len: u16,
    ) -> Result<()> {
        for col in x..x + len {
            let cell = fb.get(col, y).unwrap_or_default();
            self.apply(out, cell.style)?;
            out.queue(Print(cell.ch))?;
        }
        Ok(())
    }
}

/// Encode a full-frame redraw into `out`.
///
/// This builds a sequence of crossterm commands without writing to stdout.
pub fn encode_full_into(fb: &FrameBuffer, out: &mut Vec<u8>) -> Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    out.queue(cursor::MoveTo(0, 0))?;

    let mut pen = Pen::default();
    for y in 0..fb.height() {
        pen.print_row(out, fb, 0, y, fb.width())?;
        if y + 1 < fb.height() {
            out.queue(Print("\r\n"))?;
        }
    }
    reset_pen(out)
}

/// Encode the runs that differ between `prev` and `next` into `out`.
///
/// Leaves `out` untouched when the frames are equal.
pub fn encode_diff_into(prev: &FrameBuffer, next: &FrameBuffer, out: &mut Vec<u8>) -> Result<()> {
    let mut pen = Pen::default();
    let mut dirty = false;
    for_each_changed_run(prev, next, |x, y, len| {
        out.queue(cursor::MoveTo(x, y))?;
        dirty = true;
        pen.print_row(out, next, x, y, len)
    })?;
    if dirty {
        reset_pen(out)?;
    }
    Ok(())
}

fn reset_pen(out: &mut Vec<u8>) -> Result<()> {
    out.queue(ResetColor)?;
    out.queue(SetAttribute(Attribute::Reset))?;
    Ok(())
}

fn rgb_to_color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}

/// Call `f(x, y, len)` for every run of changed cells, row by row.
///
/// Changes separated by at most [`RUN_GAP`] equal cells share a run.
fn for_each_changed_run(
    prev: &FrameBuffer,
    next: &FrameBuffer,
    mut f: impl FnMut(u16, u16, u16) -> Result<()>,
) -> Result<()> {
    if prev.width() != next.width() || prev.height() != next.height() {
        for y in 0..next.height() {
            f(0, y, next.width())?;
        }
        return Ok(());
    }

    let w = next.width();
    for y in 0..next.height() {
        let changed = |x: u16| prev.get(x, y) != next.get(x, y);
        let mut x = 0;
        while x < w {
            if !changed(x) {
                x += 1;
                continue;
            }
            let start = x;
            let mut end = x + 1;
            let mut scan = end;
            while scan < w && scan - end <= RUN_GAP {
                if changed(scan) {
                    end = scan + 1;
                }
                scan += 1;
            }
            f(start, y, end - start)?;
            x = scan;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fb::Cell;

    const RED: Rgb = Rgb::new(255, 0, 0);
    const BLUE: Rgb = Rgb::new(0, 0, 255);
    const GREEN: Rgb = Rgb::new(0, 255, 0);

    fn encoded(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn runs(a: &FrameBuffer, b: &FrameBuffer) -> Vec<(u16, u16, u16)> {
        let mut runs = Vec::new();
        for_each_changed_run(a, b, |x, y, len| {
            runs.push((x, y, len));
            Ok(())
        })
        .unwrap();
        runs
    }

    fn mark(fb: &mut FrameBuffer, xs: &[u16]) {
        for &x in xs {
            fb.set(x, 0, CellStyle::default().into_cell('X'));
        }
    }

    #[test]
    fn full_encode_prints_every_half_block() {
        let mut fb = FrameBuffer::new(2, 2);
        let style = CellStyle::colors(RED, BLUE);
        for y in 0..2 {
            for x in 0..2 {
                fb.set(x, y, Cell { ch: '▀', style });
            }
        }
        let text = encoded(|out| encode_full_into(&fb, out));
        assert_eq!(text.matches('▀').count(), 4);
        // One style switch for a uniform frame.
        assert_eq!(text.matches("38;2;255;0;0").count(), 1);
    }

    #[test]
    fn only_the_changed_colour_is_sent() {
        let mut fb = FrameBuffer::new(2, 1);
        fb.set(0, 0, CellStyle::colors(RED, BLUE).into_cell('▀'));
        fb.set(1, 0, CellStyle::colors(RED, GREEN).into_cell('▀'));
        let text = encoded(|out| encode_full_into(&fb, out));
        assert_eq!(text.matches("38;2;255;0;0").count(), 1);
        assert_eq!(text.matches("48;2;0;0;255").count(), 1);
        assert_eq!(text.matches("48;2;0;255;0").count(), 1);
    }

    #[test]
    fn attribute_change_resends_both_colours() {
        let mut fb = FrameBuffer::new(2, 1);
        let plain = CellStyle::colors(RED, BLUE);
        fb.set(0, 0, plain.into_cell('a'));
        fb.set(1, 0, plain.bold().into_cell('b'));
        let text = encoded(|out| encode_full_into(&fb, out));
        let b = text.find('b').unwrap();
        let between = &text[text.find('a').unwrap()..b];
        assert!(between.contains("38;2;255;0;0"), "{between:?}");
        assert!(between.contains("48;2;0;0;255"), "{between:?}");
    }

    #[test]
    fn diff_of_identical_frames_is_empty() {
        let fb = FrameBuffer::new(4, 3);
        assert!(encoded(|out| encode_diff_into(&fb, &fb, out)).is_empty());
    }

    #[test]
    fn diff_prints_only_changed_cells() {
        let a = FrameBuffer::new(12, 1);
        let mut b = a.clone();
        mark(&mut b, &[2, 9]);
        let text = encoded(|out| encode_diff_into(&a, &b, out));
        assert_eq!(text.matches('X').count(), 2);
    }

    #[test]
    fn changed_run_iterator_coalesces_adjacent_cells() {
        let a = FrameBuffer::new(12, 1);
        let mut b = a.clone();
        mark(&mut b, &[1, 2, 3]);
        assert_eq!(runs(&a, &b), vec![(1, 0, 3)]);
    }

    #[test]
    fn short_gaps_join_runs_and_long_gaps_split_them() {
        let a = FrameBuffer::new(12, 1);
        let mut near = a.clone();
        mark(&mut near, &[0, 3]);
        assert_eq!(runs(&a, &near), vec![(0, 0, 4)]);

        let mut far = a.clone();
        mark(&mut far, &[0, 6]);
        assert_eq!(runs(&a, &far), vec![(0, 0, 1), (6, 0, 1)]);
    }

    #[test]
    fn resized_frames_redraw_every_row() {
        let a = FrameBuffer::new(3, 1);
        let b = FrameBuffer::new(4, 2);
        assert_eq!(runs(&a, &b), vec![(0, 0, 4), (0, 1, 4)]);
    }
}
