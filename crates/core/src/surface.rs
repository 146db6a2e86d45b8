//! 2D drawing surface consumed by the render pipeline.
//!
//! Everything the pipeline draws reaches the host through these two
//! primitives. Coordinates are in surface pixels, y pointing down.

use glam::Vec2;

use crate::geometry::Stroke;
use crate::types::Rgba;

pub trait Surface {
    /// Fill and/or outline a closed polygon.
    fn draw_polygon(&mut self, path: &[Vec2], fill: Option<Rgba>, outline: Option<Stroke>);

    /// Stroke consecutive points of `path`.
    fn draw_polyline(&mut self, path: &[Vec2], stroke: Stroke);
}

/// A recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Polygon {
        path: Vec<Vec2>,
        fill: Option<Rgba>,
        outline: Option<Stroke>,
    },
    Polyline {
        path: Vec<Vec2>,
        stroke: Stroke,
    },
}

/// Recording surface, handy for headless tests.
impl Surface for Vec<DrawCommand> {
    fn draw_polygon(&mut self, path: &[Vec2], fill: Option<Rgba>, outline: Option<Stroke>) {
        self.push(DrawCommand::Polygon {
            path: path.to_vec(),
            fill,
            outline,
        });
    }

    fn draw_polyline(&mut self, path: &[Vec2], stroke: Stroke) {
        self.push(DrawCommand::Polyline {
            path: path.to_vec(),
            stroke,
        });
    }
}
