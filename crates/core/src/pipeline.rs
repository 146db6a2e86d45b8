//! Render pipeline - turns the game into 2D draw calls
//!
//! # Board
//!
//! ```text
//! grid lines + surface + piece + shadow (+ ghost)
//!   -> world transform -> cull -> light -> project -> depth sort -> draw
//! ```
//!
//! # Next-piece preview
//!
//! The archetype mesh spins about its own pivot at a fixed pitch:
//!
//! ```text
//! mesh -> spin transform -> cull -> depth sort -> light -> project -> draw
//! ```
//!
//! Both pipelines reuse one scratch mesh across frames.

use glam::{IVec3, Mat4, Vec2, Vec3};

use crate::game::GameState;
use crate::mesh::Mesh;
use crate::piece::ArchetypeRegistry;
use crate::surface::Surface;
use crate::types::{CAMERA_DEPTH, LIGHT_DIRECTION, PREVIEW_FILL, PREVIEW_PITCH, VOXELS_PER_PIECE};

/// Pixel rectangle of a drawing area.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn centre(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Projection scale that fits a grid of `dims` into a `width × height` area.
pub fn board_scale(dims: IVec3, width: f32, height: f32) -> f32 {
    let across = dims.x.max(dims.z).max(1) as f32;
    let tall = (dims.y + 3) as f32;
    (width / across).min(height / tall) * CAMERA_DEPTH
}

/// Projection scale of the preview: four voxels span most of the smaller side.
pub fn preview_scale(width: f32, height: f32) -> f32 {
    width.min(height) * CAMERA_DEPTH * PREVIEW_FILL / VOXELS_PER_PIECE as f32
}

/// Camera transform of the preview for `pivot` at spin `yaw`.
pub fn preview_transform(pivot: Vec3, yaw: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(0.0, 0.0, CAMERA_DEPTH))
        * Mat4::from_rotation_x(PREVIEW_PITCH)
        * Mat4::from_rotation_y(yaw)
        * Mat4::from_translation(-pivot)
}

/// Default light direction, normalised.
pub fn default_light() -> Vec3 {
    Vec3::from(LIGHT_DIRECTION).normalize()
}

#[derive(Debug, Clone)]
pub struct RenderPipeline {
    light: Vec3,
    scene: Mesh,
}

impl Default for RenderPipeline {
    fn default() -> Self {
        Self::new(default_light())
    }
}

impl RenderPipeline {
    /// `light` must be a unit vector.
    pub fn new(light: Vec3) -> Self {
        Self {
            light,
            scene: Mesh::new(),
        }
    }

    /// Mesh produced by the last render call, already projected and sorted.
    pub fn scene(&self) -> &Mesh {
        &self.scene
    }

    /// Collect the board meshes in grid-local space.
    pub fn compose_scene(&mut self, game: &GameState) -> &Mesh {
        let grid = game.grid();
        let piece = game.piece();
        self.scene.clear();
        self.scene.append(grid.grid_lines());
        self.scene.append(grid.surface());
        self.scene.append(&piece.mesh());
        self.scene.append(&piece.shadow_mesh(grid));
        if game.show_ghost() {
            self.scene.append(&piece.ghost_mesh(grid));
        }
        &self.scene
    }

    /// Draw the board into `viewport`.
    pub fn render_scene<S: Surface + ?Sized>(
        &mut self,
        game: &GameState,
        viewport: Viewport,
        surface: &mut S,
    ) {
        if viewport.is_empty() {
            return;
        }
        self.compose_scene(game);
        let grid = game.grid();
        let scale = board_scale(grid.dims(), viewport.width, viewport.height);

        self.scene.transform(&grid.world_transform());
        self.scene.cull();
        self.scene.light(self.light);
        self.scene.project(scale, viewport.centre());
        self.scene.sort_by_depth();
        self.scene.draw(surface);
    }

    /// Draw `archetype` spinning at `yaw` into `viewport`.
    pub fn render_preview<S: Surface + ?Sized>(
        &mut self,
        registry: &ArchetypeRegistry,
        archetype: usize,
        yaw: f32,
        viewport: Viewport,
        surface: &mut S,
    ) {
        if viewport.is_empty() {
            return;
        }
        let a = registry.get(archetype);
        self.scene.clear();
        self.scene.append(a.mesh());

        self.scene.transform(&preview_transform(a.preview_pivot, yaw));
        self.scene.cull();
        self.scene.sort_by_depth();
        self.scene.light(self.light);
        self.scene
            .project(preview_scale(viewport.width, viewport.height), viewport.centre());
        self.scene.draw(surface);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;
    use crate::surface::DrawCommand;

    #[test]
    fn board_scale_fits_tallest_axis() {
        // 4x10x4 in 80x60: min(80/4, 60/13) * 20
        let s = board_scale(IVec3::new(4, 10, 4), 80.0, 60.0);
        assert!((s - 60.0 / 13.0 * 20.0).abs() < 1e-4);
    }

    #[test]
    fn scene_contains_every_layer() {
        let game = GameState::default();
        let mut pipeline = RenderPipeline::default();
        let grid = game.grid();
        let piece = game.piece();
        let expected = grid.grid_lines().geometries().len()
            + grid.surface().geometries().len()
            + piece.local_mesh().geometries().len()
            + piece.shadow_mesh(grid).geometries().len()
            + piece.ghost_mesh(grid).geometries().len();
        let scene = pipeline.compose_scene(&game);
        assert_eq!(scene.geometries().len(), expected);
        assert!(scene.is_valid());
    }

    #[test]
    fn render_culls_and_sorts_back_to_front() {
        let game = GameState::default();
        let mut pipeline = RenderPipeline::default();
        let composed = pipeline.compose_scene(&game).geometries().len();
        let mut out: Vec<DrawCommand> = Vec::new();
        pipeline.render_scene(&game, Viewport::new(0.0, 0.0, 160.0, 96.0), &mut out);

        let scene = pipeline.scene();
        assert!(!out.is_empty());
        assert!(scene.geometries().len() < composed);
        let depths: Vec<f32> = scene
            .geometries()
            .iter()
            .map(|g| g.average_depth(scene.vertices()))
            .collect();
        assert!(depths.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn projected_board_is_centred_in_viewport() {
        let game = GameState::default();
        let mut pipeline = RenderPipeline::default();
        let viewport = Viewport::new(10.0, 5.0, 120.0, 90.0);
        let mut out: Vec<DrawCommand> = Vec::new();
        pipeline.render_scene(&game, viewport, &mut out);

        let scene = pipeline.scene();
        let (sum, n) = scene
            .vertices()
            .iter()
            .fold((Vec2::ZERO, 0.0f32), |(s, n), v| (s + v.truncate(), n + 1.0));
        let mean = sum / n;
        assert!((mean.x - viewport.centre().x).abs() < viewport.width * 0.25);
    }

    #[test]
    fn preview_shows_only_front_faces_lit() {
        let registry = ArchetypeRegistry::new();
        let mut pipeline = RenderPipeline::default();
        let mut out: Vec<DrawCommand> = Vec::new();
        pipeline.render_preview(&registry, 0, 0.4, Viewport::new(0.0, 0.0, 40.0, 40.0), &mut out);

        let scene = pipeline.scene();
        assert!(scene.geometries().len() < 24);
        assert_eq!(out.len(), scene.geometries().len());
        for g in scene.geometries() {
            let Geometry::Face(face) = g else {
                panic!("preview holds faces only");
            };
            assert!((0.0..=1.0).contains(&face.intensity));
        }
    }

    #[test]
    fn empty_viewport_draws_nothing() {
        let game = GameState::default();
        let mut pipeline = RenderPipeline::default();
        let mut out: Vec<DrawCommand> = Vec::new();
        pipeline.render_scene(&game, Viewport::new(0.0, 0.0, 0.0, 10.0), &mut out);
        assert!(out.is_empty());
    }
}
