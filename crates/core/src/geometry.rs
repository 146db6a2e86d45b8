//! Geometry module - drawable primitives referencing a shared vertex pool
//!
//! A [`Geometry`] never owns vertex positions; it owns indices into the pool
//! of the [`Mesh`](crate::mesh::Mesh) it belongs to. Cloning a geometry copies
//! its index list, so merged meshes never share mutable state.

use glam::{Vec2, Vec3};

use crate::surface::Surface;
use crate::types::Rgba;

/// Line color and width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Rgba,
    pub thickness: f32,
}

impl Stroke {
    pub const fn new(color: Rgba, thickness: f32) -> Self {
        Self { color, thickness }
    }

    /// Visible strokes have a positive width and non-zero alpha.
    pub fn is_visible(&self) -> bool {
        self.thickness > 0.0 && !self.color.is_transparent()
    }
}

/// Filled polygon with an optional outline.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub indices: Vec<u32>,
    pub fill: Rgba,
    pub outline: Option<Stroke>,
    /// Flat light intensity in `0.0..=1.0`, set by [`Mesh::light`](crate::mesh::Mesh::light).
    pub intensity: f32,
}

impl Face {
    pub fn new(indices: Vec<u32>, fill: Rgba, outline: Option<Stroke>) -> Self {
        debug_assert!(indices.len() >= 3, "face needs at least 3 vertices");
        Self {
            indices,
            fill,
            outline,
            intensity: 1.0,
        }
    }
}

/// Open or closed line strip.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub indices: Vec<u32>,
    pub stroke: Stroke,
}

impl Polyline {
    pub fn new(indices: Vec<u32>, stroke: Stroke) -> Self {
        debug_assert!(indices.len() >= 2, "polyline needs at least 2 vertices");
        Self { indices, stroke }
    }
}

/// A drawable primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Face(Face),
    Polyline(Polyline),
}

impl Geometry {
    pub fn indices(&self) -> &[u32] {
        match self {
            Geometry::Face(face) => &face.indices,
            Geometry::Polyline(line) => &line.indices,
        }
    }

    pub fn indices_mut(&mut self) -> &mut [u32] {
        match self {
            Geometry::Face(face) => &mut face.indices,
            Geometry::Polyline(line) => &mut line.indices,
        }
    }

    /// Add `offset` to every index.
    pub fn shift(&mut self, offset: u32) {
        for id in self.indices_mut() {
            *id += offset;
        }
    }

    /// Cross product of the first two edges, or `None` with fewer than 3 indices.
    pub fn raw_normal(&self, vertices: &[Vec3]) -> Option<Vec3> {
        let ids = self.indices();
        if ids.len() < 3 {
            return None;
        }
        let p0 = vertices[ids[0] as usize];
        let p1 = vertices[ids[1] as usize];
        let p2 = vertices[ids[2] as usize];
        Some((p1 - p0).cross(p2 - p0))
    }

    /// Backface test against a camera at the origin.
    ///
    /// Applies to any geometry with at least 3 indices, polylines included.
    pub fn is_backfacing(&self, vertices: &[Vec3]) -> bool {
        let Some(n) = self.raw_normal(vertices) else {
            return false;
        };
        n.dot(vertices[self.indices()[0] as usize]) < 0.0
    }

    /// Mean z of the referenced vertices.
    pub fn average_depth(&self, vertices: &[Vec3]) -> f32 {
        let ids = self.indices();
        if ids.is_empty() {
            return 0.0;
        }
        let sum: f32 = ids.iter().map(|&id| vertices[id as usize].z).sum();
        sum / ids.len() as f32
    }

    /// Compute flat light intensity for faces; polylines are left unlit.
    pub fn light(&mut self, vertices: &[Vec3], direction: Vec3) {
        let Some(n) = self.raw_normal(vertices) else {
            return;
        };
        if let Geometry::Face(face) = self {
            face.intensity = n.normalize_or_zero().dot(direction) * 0.5 + 0.5;
        }
    }

    /// Force the fill alpha of faces.
    pub fn set_fill_alpha(&mut self, alpha: f32) {
        if let Geometry::Face(face) = self {
            face.fill = face.fill.with_alpha(alpha);
        }
    }

    /// Drop face outlines.
    pub fn clear_outline(&mut self) {
        if let Geometry::Face(face) = self {
            face.outline = None;
        }
    }

    /// Draw with projected vertices. `path` is scratch space reused across calls.
    pub fn draw<S: Surface + ?Sized>(&self, vertices: &[Vec3], path: &mut Vec<Vec2>, surface: &mut S) {
        path.clear();
        path.extend(
            self.indices()
                .iter()
                .map(|&id| vertices[id as usize].truncate()),
        );

        match self {
            Geometry::Face(face) => {
                let fill = if face.fill.is_transparent() {
                    None
                } else {
                    Some(face.fill.scaled(face.intensity))
                };
                let outline = face
                    .outline
                    .filter(Stroke::is_visible)
                    .map(|s| Stroke::new(s.color.scaled(face.intensity), s.thickness));
                if fill.is_some() || outline.is_some() {
                    surface.draw_polygon(path, fill, outline);
                }
            }
            Geometry::Polyline(line) => {
                if line.stroke.is_visible() {
                    surface.draw_polyline(path, line.stroke);
                }
            }
        }
    }
}
