//! Pixel canvas for the render pipeline.
//!
//! The pipeline draws projected polygons and lines through the core
//! [`Surface`] trait; this canvas rasterizes them into RGB pixels. A terminal
//! cell shows two pixels stacked vertically using the upper half block, so a
//! `w × h` cell area needs a `w × 2h` canvas.

use glam::Vec2;

use crate::core::{Stroke, Surface};
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::Rgba;

const UPPER_HALF: char = '▀';

/// Stroke widths are authored for full-resolution pixels; terminal pixels are
/// far coarser.
pub const DEFAULT_LINE_SCALE: f32 = 0.35;

#[derive(Debug, Clone)]
pub struct Canvas {
    width: u16,
    height: u16,
    pixels: Vec<Rgb>,
    background: Rgb,
    line_scale: f32,
    /// Scanline crossings, reused across polygons.
    crossings: Vec<f32>,
}

impl Canvas {
    pub fn new(width: u16, height: u16, background: Rgb) -> Self {
        Self {
            width,
            height,
            pixels: vec![background; width as usize * height as usize],
            background,
            line_scale: DEFAULT_LINE_SCALE,
            crossings: Vec::with_capacity(16),
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn background(&self) -> Rgb {
        self.background
    }

    /// Resize and clear.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.pixels
            .resize(width as usize * height as usize, self.background);
        self.clear();
    }

    pub fn clear(&mut self) {
        self.pixels.fill(self.background);
    }

    pub fn pixel(&self, x: u16, y: u16) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y as usize * self.width as usize + x as usize])
    }

    fn blend(&mut self, x: i32, y: i32, color: Rgb, alpha: f32) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let i = y as usize * self.width as usize + x as usize;
        self.pixels[i] = color.blend_over(self.pixels[i], alpha);
    }

    /// Even-odd scanline fill, sampling pixel centres.
    fn fill_path(&mut self, path: &[Vec2], color: Rgba) {
        if path.len() < 3 {
            return;
        }
        let (min_y, max_y) = path
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.y), hi.max(p.y))
            });
        if !min_y.is_finite() || !max_y.is_finite() {
            return;
        }
        let rgb = Rgb::from(color);
        let alpha = color.a as f32 / 255.0;
        let y0 = (min_y - 0.5).ceil().max(0.0) as i32;
        let y1 = (max_y - 0.5).floor().min(self.height as f32 - 1.0) as i32;

        let mut crossings = std::mem::take(&mut self.crossings);
        for py in y0..=y1 {
            let sy = py as f32 + 0.5;
            crossings.clear();
            for (i, a) in path.iter().enumerate() {
                let b = path[(i + 1) % path.len()];
                if (a.y <= sy && b.y > sy) || (b.y <= sy && a.y > sy) {
                    crossings.push(a.x + (sy - a.y) / (b.y - a.y) * (b.x - a.x));
                }
            }
            crossings.sort_by(f32::total_cmp);
            for pair in crossings.chunks_exact(2) {
                let x0 = (pair[0] - 0.5).ceil().max(0.0) as i32;
                let x1 = (pair[1] - 0.5).ceil().min(self.width as f32) as i32;
                for px in x0..x1 {
                    self.blend(px, py, rgb, alpha);
                }
            }
        }
        self.crossings = crossings;
    }

    fn stroke_segment(&mut self, a: Vec2, b: Vec2, stroke: Stroke) {
        let width = stroke.thickness * self.line_scale;
        if width <= 1.0 {
            self.hairline(a, b, stroke.color);
            return;
        }
        let dir = (b - a).normalize_or_zero();
        if dir == Vec2::ZERO {
            return;
        }
        let n = dir.perp() * (width * 0.5);
        self.fill_path(&[a + n, b + n, b - n, a - n], stroke.color);
    }

    /// One-pixel line, stepping along the major axis.
    fn hairline(&mut self, a: Vec2, b: Vec2, color: Rgba) {
        let rgb = Rgb::from(color);
        let alpha = color.a as f32 / 255.0;
        let d = b - a;
        let steps = d.x.abs().max(d.y.abs()).ceil().clamp(1.0, 4096.0) as i32;
        for i in 0..=steps {
            let p = a + d * (i as f32 / steps as f32);
            self.blend(p.x.floor() as i32, p.y.floor() as i32, rgb, alpha);
        }
    }

    /// Copy into `fb` at `(x, y)`, two pixels per cell.
    pub fn blit(&self, fb: &mut FrameBuffer, x: u16, y: u16) {
        for row in 0..self.height / 2 {
            for col in 0..self.width {
                let top = self.pixel(col, row * 2).unwrap_or(self.background);
                let bottom = self.pixel(col, row * 2 + 1).unwrap_or(self.background);
                let cell = if top == bottom {
                    CellStyle::colors(top, bottom).into_cell(' ')
                } else {
                    CellStyle::colors(top, bottom).into_cell(UPPER_HALF)
                };
                fb.set(x.saturating_add(col), y.saturating_add(row), cell);
            }
        }
    }
}

impl Surface for Canvas {
    fn draw_polygon(&mut self, path: &[Vec2], fill: Option<Rgba>, outline: Option<Stroke>) {
        if let Some(fill) = fill {
            self.fill_path(path, fill);
        }
        if let Some(stroke) = outline {
            for (i, &a) in path.iter().enumerate() {
                let b = path[(i + 1) % path.len()];
                self.stroke_segment(a, b, stroke);
            }
        }
    }

    fn draw_polyline(&mut self, path: &[Vec2], stroke: Stroke) {
        for seg in path.windows(2) {
            self.stroke_segment(seg[0], seg[1], stroke);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BG: Rgb = Rgb::new(0, 0, 0);

    fn square(x0: f32, y0: f32, x1: f32, y1: f32) -> [Vec2; 4] {
        [
            Vec2::new(x0, y0),
            Vec2::new(x1, y0),
            Vec2::new(x1, y1),
            Vec2::new(x0, y1),
        ]
    }

    #[test]
    fn fills_pixels_whose_centres_are_inside() {
        let mut c = Canvas::new(6, 6, BG);
        c.draw_polygon(&square(1.0, 1.0, 4.0, 3.0), Some(Rgba::hex(0xff0000)), None);
        let red = Rgb::new(255, 0, 0);
        let count = (0..6)
            .flat_map(|y| (0..6).map(move |x| (x, y)))
            .filter(|&(x, y)| c.pixel(x, y) == Some(red))
            .count();
        assert_eq!(count, 3 * 2);
        assert_eq!(c.pixel(1, 1), Some(red));
        assert_eq!(c.pixel(4, 1), Some(BG));
    }

    #[test]
    fn translucent_fill_blends_with_background() {
        let mut c = Canvas::new(2, 2, BG);
        let half = Rgba::hex(0xffffff).with_alpha(0.5);
        c.draw_polygon(&square(0.0, 0.0, 2.0, 2.0), Some(half), None);
        assert_eq!(c.pixel(0, 0), Some(Rgb::new(128, 128, 128)));
    }

    #[test]
    fn polygon_clipped_to_canvas() {
        let mut c = Canvas::new(4, 4, BG);
        c.draw_polygon(&square(-10.0, -10.0, 20.0, 20.0), Some(Rgba::hex(0x00ff00)), None);
        assert!((0..4).all(|y| (0..4).all(|x| c.pixel(x, y) == Some(Rgb::new(0, 255, 0)))));
    }

    #[test]
    fn hairline_touches_both_ends() {
        let mut c = Canvas::new(8, 8, BG);
        let stroke = Stroke::new(Rgba::hex(0xffffff), 1.0);
        c.draw_polyline(&[Vec2::new(0.5, 0.5), Vec2::new(6.5, 3.5)], stroke);
        assert_eq!(c.pixel(0, 0), Some(Rgb::new(255, 255, 255)));
        assert_eq!(c.pixel(6, 3), Some(Rgb::new(255, 255, 255)));
    }

    #[test]
    fn blit_packs_two_rows_per_cell() {
        let mut c = Canvas::new(2, 4, BG);
        c.draw_polygon(&square(0.0, 0.0, 2.0, 1.0), Some(Rgba::hex(0x0000ff)), None);
        let mut fb = FrameBuffer::new(2, 2);
        c.blit(&mut fb, 0, 0);

        let top = fb.get(0, 0).unwrap();
        assert_eq!(top.ch, UPPER_HALF);
        assert_eq!(top.style.fg, Rgb::new(0, 0, 255));
        assert_eq!(top.style.bg, BG);
        assert_eq!(fb.get(0, 1).unwrap().ch, ' ');
    }
}
