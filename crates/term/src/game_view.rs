//! GameView: maps `core::GameState` into a terminal framebuffer.
//!
//! The board and the next-piece preview go through the core render pipeline
//! into half-block canvases; the side panel and overlays are plain text.
//! This module is pure (no I/O). It can be unit-tested.

use crate::core::pipeline::Viewport as PixelRect;
use crate::core::{GameSnapshot, GameState, RenderPipeline, TutorialSnapshot};
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::input::key_label;
use crate::raster::Canvas;
use crate::types::{BlockedRotation, GameKey};

/// Columns reserved for the side panel.
pub const PANEL_WIDTH: u16 = 26;
/// Below this many board columns the panel is dropped.
const MIN_BOARD_WIDTH: u16 = 16;
const PREVIEW_COLS: u16 = 12;
const PREVIEW_ROWS: u16 = 6;
const PROGRESS_BAR: u16 = 12;

const BOARD_BG: Rgb = Rgb::new(24, 24, 32);
const PANEL_BG: Rgb = Rgb::new(0, 0, 0);
const TEXT: Rgb = Rgb::new(220, 220, 220);
const ACCENT: Rgb = Rgb::new(255, 255, 255);
const MUTED: Rgb = Rgb::new(120, 120, 130);

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Board and panel placement for one viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub board_width: u16,
    pub board_height: u16,
    /// First panel column, if the panel fits.
    pub panel_x: Option<u16>,
}

impl Layout {
    pub fn for_viewport(viewport: Viewport) -> Self {
        let with_panel = viewport.width >= PANEL_WIDTH + MIN_BOARD_WIDTH + 1;
        let board_width = if with_panel {
            viewport.width - PANEL_WIDTH - 1
        } else {
            viewport.width
        };
        Self {
            board_width,
            board_height: viewport.height,
            panel_x: with_panel.then_some(board_width + 1),
        }
    }
}

pub struct GameView {
    pipeline: RenderPipeline,
    board: Canvas,
    preview: Canvas,
    snapshot: GameSnapshot,
}

impl Default for GameView {
    fn default() -> Self {
        Self::new(RenderPipeline::default())
    }
}

impl GameView {
    pub fn new(pipeline: RenderPipeline) -> Self {
        Self {
            pipeline,
            board: Canvas::new(0, 0, BOARD_BG),
            preview: Canvas::new(PREVIEW_COLS, PREVIEW_ROWS * 2, PANEL_BG),
            snapshot: GameSnapshot::default(),
        }
    }

    pub fn pipeline(&self) -> &RenderPipeline {
        &self.pipeline
    }

    /// Render the game into an existing framebuffer.
    ///
    /// Canvases and the framebuffer are reused across frames and only
    /// reallocated when the viewport size changes.
    pub fn render_into(&mut self, game: &GameState, viewport: Viewport, fb: &mut FrameBuffer) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::colors(TEXT, PANEL_BG).into_cell(' '));
        game.snapshot_into(&mut self.snapshot);

        let layout = Layout::for_viewport(viewport);
        self.draw_board(game, layout, fb);

        if let Some(panel_x) = layout.panel_x {
            self.draw_side_panel(game, fb, panel_x, viewport);
        }

        let snap = self.snapshot;
        if snap.paused {
            draw_overlay(fb, layout, "PAUSED", "press P to resume");
        } else if snap.game_over {
            draw_overlay(fb, layout, "GAME OVER", "press R for a new game");
        }
        if let Some(tutorial) = snap.tutorial {
            draw_tutorial(fb, layout, &tutorial);
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&mut self, game: &GameState, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(game, viewport, &mut fb);
        fb
    }

    fn draw_board(&mut self, game: &GameState, layout: Layout, fb: &mut FrameBuffer) {
        let (w, h) = (layout.board_width, layout.board_height.saturating_mul(2));
        if self.board.width() != w || self.board.height() != h {
            self.board.resize(w, h);
        } else {
            self.board.clear();
        }
        let rect = PixelRect::new(0.0, 0.0, w as f32, h as f32);
        self.pipeline.render_scene(game, rect, &mut self.board);
        self.board.blit(fb, 0, 0);
    }

    fn draw_side_panel(&mut self, game: &GameState, fb: &mut FrameBuffer, x: u16, viewport: Viewport) {
        let label = CellStyle::colors(TEXT, PANEL_BG).bold();
        let value = CellStyle::colors(ACCENT, PANEL_BG);
        let muted = CellStyle::colors(MUTED, PANEL_BG);
        let snap = self.snapshot;

        for y in 0..viewport.height {
            fb.put_char(x.saturating_sub(1), y, '│', muted);
        }

        let mut y = 0;
        fb.put_str(x + 1, y, "SCORE", label);
        fb.put_i32(x + 8, y, snap.score, value);
        y += 1;
        fb.put_str(x + 1, y, "BEST", label);
        fb.put_i32(x + 8, y, snap.best.max(snap.score), value);
        y += 2;

        fb.put_str(x + 1, y, "LEVEL", label);
        fb.put_i32(x + 8, y, snap.level as i32, value);
        y += 1;
        draw_progress_bar(fb, x + 1, y, snap.level_progress);
        y += 2;

        fb.put_str(x + 1, y, "NEXT", label);
        y += 1;
        self.preview.clear();
        let rect = PixelRect::new(
            0.0,
            0.0,
            self.preview.width() as f32,
            self.preview.height() as f32,
        );
        self.pipeline.render_preview(
            game.registry(),
            snap.next_archetype,
            game.preview_yaw(),
            rect,
            &mut self.preview,
        );
        self.preview.blit(fb, x + 1, y);
        y += PREVIEW_ROWS + 1;

        let ghost = if snap.show_ghost { "on" } else { "off" };
        let next = fb.put_str(x + 1, y, "GHOST ", muted);
        fb.put_str(next, y, ghost, value);
        y += 2;

        for (keys, what) in [
            ("W S A D", "move"),
            ("E Q C Z", "rotate"),
            ("J L I K", "view"),
            ("Space", "drop"),
            ("P R G", "pause/reset/ghost"),
            ("Esc", "quit"),
        ] {
            if y >= viewport.height {
                break;
            }
            let next = fb.put_str(x + 1, y, keys, value);
            fb.put_str(next + 1, y, what, muted);
            y += 1;
        }
    }
}

fn draw_progress_bar(fb: &mut FrameBuffer, x: u16, y: u16, progress: f32) {
    let filled = ((progress.clamp(0.0, 1.0) * PROGRESS_BAR as f32).round() as u16).min(PROGRESS_BAR);
    let on = CellStyle::colors(Rgb::new(90, 200, 120), PANEL_BG);
    let off = CellStyle::colors(MUTED, PANEL_BG);
    for i in 0..PROGRESS_BAR {
        let (ch, style) = if i < filled { ('█', on) } else { ('░', off) };
        fb.put_char(x + i, y, ch, style);
    }
}

fn draw_overlay(fb: &mut FrameBuffer, layout: Layout, title: &str, hint: &str) {
    let mid = layout.board_height / 2;
    let title_style = CellStyle::colors(ACCENT, PANEL_BG).bold();
    let hint_style = CellStyle::colors(TEXT, PANEL_BG);
    put_centered(fb, layout.board_width, mid.saturating_sub(1), title, title_style);
    put_centered(fb, layout.board_width, mid, hint, hint_style);
}

fn put_centered(fb: &mut FrameBuffer, width: u16, y: u16, text: &str, style: CellStyle) {
    let w = text.chars().count() as u16;
    fb.put_str(width.saturating_sub(w) / 2, y, text, style);
}

fn put_keys(fb: &mut FrameBuffer, x: u16, y: u16, prefix: &str, keys: &[GameKey], style: CellStyle) {
    let mut cx = fb.put_str(x, y, prefix, style);
    for &key in keys {
        cx = fb.put_str(cx + 1, y, key_label(key), style);
    }
}

fn draw_tutorial(fb: &mut FrameBuffer, layout: Layout, t: &TutorialSnapshot) {
    let text = CellStyle::colors(ACCENT.blend_over(PANEL_BG, t.text_alpha), PANEL_BG);
    let x = 1;
    match t.stage {
        0 => {
            put_keys(fb, x, 0, "Pause:", &[GameKey::Pause], text);
            put_keys(fb, x, 1, "Restart:", &[GameKey::Reset], text);
        }
        1 => {
            fb.put_str(x, 0, "Move the piece:", text);
            put_keys(
                fb,
                x,
                1,
                "",
                &[GameKey::Push, GameKey::Pull, GameKey::Right, GameKey::Left],
                text,
            );
        }
        2 => {
            fb.put_str(x, 0, "Rotate the piece:", text);
            put_keys(
                fb,
                x,
                1,
                "",
                &[
                    GameKey::RotateCw,
                    GameKey::RotateCcw,
                    GameKey::RotateYawCw,
                    GameKey::RotateYawCcw,
                ],
                text,
            );
        }
        3 => {
            fb.put_str(x, 0, "Rotate the view with", text);
            fb.put_str(x, 1, "J L I K.", text);
        }
        _ => {
            put_keys(fb, x, 0, "Hold", &[GameKey::Down], text);
            fb.put_str(x, 1, "to lower the piece", text);
            fb.put_str(x, 2, "until it lands.", text);
        }
    }
    if t.stage <= 2 {
        put_keys(fb, x, 2, "Continue:", &[GameKey::Advance], text);
    }

    let bottom = layout.board_height.saturating_sub(3);
    if let Some((blocked, fade)) = t.blocked {
        let style = CellStyle::colors(ACCENT.blend_over(PANEL_BG, fade), PANEL_BG);
        let (what, key) = match blocked {
            BlockedRotation::Cw => ("Clockwise rotation", GameKey::RotateCw),
            BlockedRotation::Ccw => ("Counter-clockwise rotation", GameKey::RotateCcw),
            BlockedRotation::YawCw => ("Clockwise Y rotation", GameKey::RotateYawCw),
            BlockedRotation::YawCcw => ("Counter-clockwise Y rotation", GameKey::RotateYawCcw),
        };
        let next = fb.put_str(x, bottom, what, style);
        fb.put_str(next + 1, bottom, key_label(key), style);
        fb.put_str(x, bottom + 1, "blocked: it would hit the stack.", style);
    }
    if let Some(fade) = t.camera_note {
        let style = CellStyle::colors(ACCENT.blend_over(PANEL_BG, fade), PANEL_BG);
        fb.put_str(x, bottom, "Moves and rotations follow", style);
        fb.put_str(x, bottom + 1, "the camera.", style);
    }
}
