//! Voxel grid module - the play field
//!
//! The grid is a `dx × dy × dz` well where each cell is empty (0) or holds the
//! id + 1 of the archetype that filled it. Uses a flat array indexed
//! `x + z*dx + y*dx*dz`, so a horizontal layer is one contiguous slice.
//! y grows upwards; pieces spawn above the roof at `y = dy + 2`.
//!
//! Besides occupancy the grid owns two render meshes:
//! - the static grid-line mesh (walls and floor), rebuilt on resize
//! - the dynamic surface mesh of the stack, rebuilt after every placement

use std::ops::{BitOr, BitOrAssign};

use glam::{IVec2, IVec3, Mat4, Vec3};

use crate::geometry::Stroke;
use crate::mesh::{Mesh, MeshBuilder};
use crate::types::{Rgba, CAMERA_DEPTH, MAX_GRID_DIM, MIN_GRID_HEIGHT, MIN_GRID_WIDTH};

/// Fill of the stack surface.
pub const STACK_FILL: Rgba = Rgba::hex(0xd4d4d4);
/// Outline of the stack surface.
pub const STACK_OUTLINE: Stroke = Stroke::new(Rgba::hex(0x969696), 1.8);
/// Grid wall and floor lines.
pub const GRID_LINE: Stroke = Stroke::new(Rgba::hex(0xa0a0a0), 1.2);

const TAU: f32 = std::f32::consts::TAU;

/// Result flags of [`VoxelGrid::test_placement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Placement(u8);

impl Placement {
    pub const NONE: Placement = Placement(0);
    /// Some voxel is out of bounds, below the floor or on an occupied cell.
    pub const COLLISION: Placement = Placement(1);
    /// Some voxel is at or above the roof.
    pub const OVER_ROOF: Placement = Placement(2);

    pub fn contains(self, other: Placement) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn collides(self) -> bool {
        self.contains(Placement::COLLISION)
    }

    pub fn over_roof(self) -> bool {
        self.contains(Placement::OVER_ROOF)
    }
}

impl BitOr for Placement {
    type Output = Placement;

    fn bitor(self, rhs: Placement) -> Placement {
        Placement(self.0 | rhs.0)
    }
}

impl BitOrAssign for Placement {
    fn bitor_assign(&mut self, rhs: Placement) {
        self.0 |= rhs.0;
    }
}

/// The play field.
#[derive(Debug, Clone)]
pub struct VoxelGrid {
    dims: IVec3,
    cells: Vec<u8>,
    /// Render offset of the grid origin relative to the camera.
    position: Vec3,
    pitch: f32,
    yaw: f32,
    grid_lines: Mesh,
    surface: Mesh,
}

impl VoxelGrid {
    /// Create an empty grid. Each dimension is clamped to the supported range.
    pub fn new(dims: IVec3) -> Self {
        let mut grid = Self {
            dims: IVec3::ZERO,
            cells: Vec::new(),
            position: Vec3::ZERO,
            pitch: 0.0,
            yaw: 0.0,
            grid_lines: Mesh::new(),
            surface: Mesh::new(),
        };
        grid.resize(dims);
        grid
    }

    /// Get grid dimensions
    pub fn dims(&self) -> IVec3 {
        self.dims
    }

    /// Get width (x) of the grid
    pub fn width(&self) -> i32 {
        self.dims.x
    }

    /// Get height (y) of the grid
    pub fn height(&self) -> i32 {
        self.dims.y
    }

    /// Get depth (z) of the grid
    pub fn depth(&self) -> i32 {
        self.dims.z
    }

    /// Cells of one horizontal layer.
    pub fn layer_area(&self) -> i32 {
        self.dims.x * self.dims.z
    }

    /// Raw occupancy, `x + z*dx + y*dx*dz` order
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Calculate flat index from (x, y, z) coordinates
    #[inline(always)]
    fn index(&self, x: i32, y: i32, z: i32) -> Option<usize> {
        if x < 0 || x >= self.dims.x || y < 0 || y >= self.dims.y || z < 0 || z >= self.dims.z {
            return None;
        }
        Some((x + z * self.dims.x + y * self.dims.x * self.dims.z) as usize)
    }

    /// Get cell at (x, y, z)
    /// Returns None if out of bounds
    pub fn get(&self, x: i32, y: i32, z: i32) -> Option<u8> {
        self.index(x, y, z).map(|i| self.cells[i])
    }

    /// Set cell at (x, y, z)
    /// Returns false if out of bounds
    ///
    /// Does not rebuild the surface mesh; see [`VoxelGrid::rebuild_surface`].
    pub fn set(&mut self, x: i32, y: i32, z: i32, value: u8) -> bool {
        match self.index(x, y, z) {
            Some(i) => {
                self.cells[i] = value;
                true
            }
            None => false,
        }
    }

    /// Check if position is within bounds and filled
    pub fn is_occupied(&self, x: i32, y: i32, z: i32) -> bool {
        matches!(self.get(x, y, z), Some(v) if v != 0)
    }

    /// Check if a layer is completely filled
    pub fn layer_is_full(&self, y: i32) -> bool {
        if y < 0 || y >= self.dims.y {
            return false;
        }
        let area = self.layer_area() as usize;
        let start = y as usize * area;
        self.cells[start..start + area].iter().all(|&c| c != 0)
    }

    /// Test `shape` translated by `position` against the grid.
    ///
    /// Cells above the roof never collide; they only raise `OVER_ROOF`.
    pub fn test_placement(&self, shape: &[IVec3], position: IVec3) -> Placement {
        let mut flags = Placement::NONE;
        for &voxel in shape {
            let p = position + voxel;
            let outside = p.x < 0 || p.x >= self.dims.x || p.z < 0 || p.z >= self.dims.z || p.y < 0;
            if outside || (p.y < self.dims.y && self.is_occupied(p.x, p.y, p.z)) {
                flags |= Placement::COLLISION;
            }
            if p.y >= self.dims.y {
                flags |= Placement::OVER_ROOF;
            }
        }
        flags
    }

    /// Write a piece into the grid, clear full layers and rebuild the surface.
    ///
    /// Returns the number of cleared layers.
    pub fn place(&mut self, archetype: usize, shape: &[IVec3], position: IVec3) -> u32 {
        let value = archetype as u8 + 1;
        for &voxel in shape {
            let p = position + voxel;
            self.set(p.x, p.y, p.z, value);
        }

        let cleared = self.clear_full_layers();
        self.rebuild_surface();
        cleared
    }

    /// Remove every full layer, shifting the stack above it down.
    ///
    /// Scans bottom to top and re-examines the same y after a removal, so
    /// adjacent full layers are all caught.
    pub fn clear_full_layers(&mut self) -> u32 {
        let area = self.layer_area() as usize;
        let total = self.cells.len();
        let mut cleared = 0;
        let mut y = 0;
        while y < self.dims.y {
            if self.layer_is_full(y) {
                cleared += 1;
                let start = y as usize * area;
                self.cells.copy_within(start + area..total, start);
                self.cells[total - area..].fill(0);
            } else {
                y += 1;
            }
        }
        if cleared > 0 {
            log::debug!("cleared {cleared} layer(s)");
        }
        cleared
    }

    /// Empty every cell and drop the surface mesh. Grid lines are kept.
    pub fn clear(&mut self) {
        self.cells.fill(0);
        self.surface.clear();
    }

    /// Reallocate for new dimensions, rebuild grid lines and clear.
    pub fn resize(&mut self, dims: IVec3) {
        let min = IVec3::new(MIN_GRID_WIDTH, MIN_GRID_HEIGHT, MIN_GRID_WIDTH);
        let dims = dims.clamp(min, IVec3::splat(MAX_GRID_DIM));
        self.dims = dims;
        self.cells.resize((dims.x * dims.y * dims.z) as usize, 0);
        self.position = Vec3::new(-0.5 * dims.x as f32, -0.5 * dims.y as f32, CAMERA_DEPTH);
        self.grid_lines = build_grid_lines(dims);
        self.clear();
    }

    /// Get the static wall/floor line mesh
    pub fn grid_lines(&self) -> &Mesh {
        &self.grid_lines
    }

    /// Get the stack surface mesh
    pub fn surface(&self) -> &Mesh {
        &self.surface
    }

    /// Rebuild the stack surface: one quad per voxel side with no occupied neighbour.
    pub fn rebuild_surface(&mut self) {
        let mut b = MeshBuilder::new();
        let outline = Some(STACK_OUTLINE);
        for y in 0..self.dims.y {
            for z in 0..self.dims.z {
                for x in 0..self.dims.x {
                    if !self.is_occupied(x, y, z) {
                        continue;
                    }
                    let p = IVec3::new(x, y, z);
                    for side in VoxelSide::ALL {
                        let n = p + side.neighbour();
                        if !self.is_occupied(n.x, n.y, n.z) {
                            let (origin, u, w) = side.quad(p);
                            b.face(origin, u, w, STACK_FILL, outline);
                        }
                    }
                }
            }
        }
        self.surface = b.finish();
    }

    /// Get view pitch in radians
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Get view yaw in radians
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Apply a camera rotation delta. An angle snaps back to 0 on reaching a full turn.
    pub fn rotate_view(&mut self, dyaw: f32, dpitch: f32) {
        self.yaw += dyaw;
        if self.yaw.abs() >= TAU {
            self.yaw = 0.0;
        }
        self.pitch += dpitch;
        if self.pitch.abs() >= TAU {
            self.pitch = 0.0;
        }
    }

    pub fn reset_view(&mut self) {
        self.pitch = 0.0;
        self.yaw = 0.0;
    }

    /// Grid-local to camera space: recentre, rotate by the view, push away from the camera.
    pub fn world_transform(&self) -> Mat4 {
        let d = self.dims.as_vec3();
        let pivot = 0.5 * Vec3::new(d.x, 4.0, d.z);
        let anchor = self.position + 0.5 * Vec3::new(d.x, 3.5, d.z);
        Mat4::from_translation(anchor)
            * Mat4::from_rotation_x(self.pitch)
            * Mat4::from_rotation_y(self.yaw)
            * Mat4::from_translation(-pivot)
    }

    /// Camera facing snapped to the nearest quarter turn, as grid-local `(x, z)`.
    pub fn unit_y_vector(&self) -> IVec2 {
        let snapped = (self.yaw / std::f32::consts::FRAC_PI_2).round() * std::f32::consts::FRAC_PI_2;
        IVec2::new(snapped.cos().round() as i32, snapped.sin().round() as i32)
    }
}

/// One of the six sides of a unit voxel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum VoxelSide {
    NegX,
    PosX,
    NegZ,
    PosZ,
    NegY,
    PosY,
}

impl VoxelSide {
    pub(crate) const ALL: [VoxelSide; 6] = [
        VoxelSide::NegX,
        VoxelSide::PosX,
        VoxelSide::NegZ,
        VoxelSide::PosZ,
        VoxelSide::NegY,
        VoxelSide::PosY,
    ];

    pub(crate) fn neighbour(self) -> IVec3 {
        match self {
            VoxelSide::NegX => IVec3::NEG_X,
            VoxelSide::PosX => IVec3::X,
            VoxelSide::NegZ => IVec3::NEG_Z,
            VoxelSide::PosZ => IVec3::Z,
            VoxelSide::NegY => IVec3::NEG_Y,
            VoxelSide::PosY => IVec3::Y,
        }
    }

    /// `(origin, u, w)` of this side of the voxel at `p`, wound to be seen from outside.
    pub(crate) fn quad(self, p: IVec3) -> (IVec3, IVec3, IVec3) {
        match self {
            VoxelSide::NegX => (p, IVec3::Y, IVec3::Z),
            VoxelSide::PosX => (p + IVec3::X, IVec3::Z, IVec3::Y),
            VoxelSide::NegZ => (p, IVec3::X, IVec3::Y),
            VoxelSide::PosZ => (p + IVec3::Z, IVec3::Y, IVec3::X),
            VoxelSide::NegY => (p, IVec3::Z, IVec3::X),
            VoxelSide::PosY => (p + IVec3::Y, IVec3::X, IVec3::Z),
        }
    }
}

/// Per-cell outlines of the four walls and the floor, wound to be seen from inside.
fn build_grid_lines(d: IVec3) -> Mesh {
    let mut b = MeshBuilder::new();
    for y in 0..d.y {
        for z in 0..d.z {
            b.outline(IVec3::new(0, y, z), IVec3::Z, IVec3::Y, GRID_LINE);
            b.outline(IVec3::new(d.x, y, z), IVec3::Y, IVec3::Z, GRID_LINE);
        }
        for x in 0..d.x {
            b.outline(IVec3::new(x, y, 0), IVec3::Y, IVec3::X, GRID_LINE);
            b.outline(IVec3::new(x, y, d.z), IVec3::X, IVec3::Y, GRID_LINE);
        }
    }
    for z in 0..d.z {
        for x in 0..d.x {
            b.outline(IVec3::new(x, 0, z), IVec3::X, IVec3::Z, GRID_LINE);
        }
    }
    b.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_layer(grid: &mut VoxelGrid, y: i32, value: u8) {
        for z in 0..grid.depth() {
            for x in 0..grid.width() {
                grid.set(x, y, z, value);
            }
        }
    }

    #[test]
    fn new_grid_is_empty() {
        let grid = VoxelGrid::new(IVec3::new(4, 10, 4));
        assert_eq!(grid.cells().len(), 160);
        assert!(grid.cells().iter().all(|&c| c == 0));
        assert!(grid.surface().is_empty());
        assert!(!grid.grid_lines().is_empty());
    }

    #[test]
    fn dims_are_clamped() {
        let grid = VoxelGrid::new(IVec3::new(0, 100, 3));
        assert_eq!(grid.dims(), IVec3::new(MIN_GRID_WIDTH, MAX_GRID_DIM, 3));
        let grid = VoxelGrid::new(IVec3::new(2, 2, 2));
        assert_eq!(grid.dims(), IVec3::new(3, 4, 3));
    }

    #[test]
    fn placement_flags() {
        let mut grid = VoxelGrid::new(IVec3::new(4, 10, 4));
        grid.set(1, 0, 1, 3);
        let one = [IVec3::ZERO];

        assert!(grid.test_placement(&one, IVec3::new(0, 0, 0)).is_empty());
        assert!(grid.test_placement(&one, IVec3::new(1, 0, 1)).collides());
        assert!(grid.test_placement(&one, IVec3::new(-1, 0, 0)).collides());
        assert!(grid.test_placement(&one, IVec3::new(0, 0, 4)).collides());
        assert!(grid.test_placement(&one, IVec3::new(0, -1, 0)).collides());

        let above = grid.test_placement(&one, IVec3::new(0, 10, 0));
        assert!(above.over_roof());
        assert!(!above.collides());

        let both = grid.test_placement(&[IVec3::ZERO, IVec3::new(0, 12, 0)], IVec3::new(-1, 0, 0));
        assert_eq!(both, Placement::COLLISION | Placement::OVER_ROOF);
    }

    #[test]
    fn rotate_view_wraps_to_zero() {
        let mut grid = VoxelGrid::new(IVec3::new(4, 10, 4));
        grid.rotate_view(TAU - 0.1, 0.5);
        assert!(grid.yaw() > 0.0);
        grid.rotate_view(0.2, 0.0);
        assert_eq!(grid.yaw(), 0.0);
        assert_eq!(grid.pitch(), 0.5);
    }

    #[test]
    fn unit_y_vector_snaps_to_quarter_turns() {
        let mut grid = VoxelGrid::new(IVec3::new(4, 10, 4));
        assert_eq!(grid.unit_y_vector(), IVec2::new(1, 0));
        grid.rotate_view(1.4, 0.0);
        assert_eq!(grid.unit_y_vector(), IVec2::new(0, 1));
        grid.rotate_view(1.7, 0.0);
        assert_eq!(grid.unit_y_vector(), IVec2::new(-1, 0));
        grid.reset_view();
        grid.rotate_view(-1.6, 0.0);
        assert_eq!(grid.unit_y_vector(), IVec2::new(0, -1));
    }

    #[test]
    fn surface_hides_shared_sides() {
        let mut grid = VoxelGrid::new(IVec3::new(4, 10, 4));
        grid.place(0, &[IVec3::ZERO, IVec3::X], IVec3::ZERO);
        // Two voxels side by side expose 10 sides.
        assert_eq!(grid.surface().geometries().len(), 10);
        assert_eq!(grid.surface().vertices().len(), 12);
        assert!(grid.surface().is_valid());
    }

    #[test]
    fn clear_keeps_grid_lines() {
        let mut grid = VoxelGrid::new(IVec3::new(4, 10, 4));
        fill_layer(&mut grid, 2, 1);
        grid.rebuild_surface();
        let lines = grid.grid_lines().geometries().len();
        grid.clear();
        assert!(grid.cells().iter().all(|&c| c == 0));
        assert!(grid.surface().is_empty());
        assert_eq!(grid.grid_lines().geometries().len(), lines);
    }

    #[test]
    fn grid_lines_count_every_wall_cell() {
        let grid = VoxelGrid::new(IVec3::new(4, 10, 4));
        // 2 side walls of 10x4, 2 of 10x4, floor 4x4.
        assert_eq!(grid.grid_lines().geometries().len(), 4 * 40 + 16);
        assert_eq!(grid.grid_lines().vertices().len(), 5 * 5 * 11 - 3 * 3 * 10);
    }
}
