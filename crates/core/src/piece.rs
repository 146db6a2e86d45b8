//! Piece module - archetype registry and the falling piece
//!
//! Every piece is four voxels. Voxel offsets are relative to a pivot: the
//! voxel at offset `o` fills the unit cube `[o, o+1]`, so the pivot sits on a
//! lattice corner. Shape and mesh are rotated together by the same exact
//! quarter-turn matrix and can never drift apart.

use arrayvec::ArrayVec;
use glam::{IVec3, Vec3};

use crate::geometry::Stroke;
use crate::grid::{VoxelGrid, VoxelSide};
use crate::math::{quarter_turn, rotate_corner, rotate_voxel};
use crate::mesh::{Mesh, MeshBuilder};
use crate::types::{
    Axis, Rgba, ARCHETYPE_COUNT, GHOST_ALPHA, SHADOW_ALPHA, SPAWN_HEIGHT_OFFSET, VOXELS_PER_PIECE,
};

/// Four voxel offsets.
pub type Shape = [IVec3; VOXELS_PER_PIECE];

/// Outline width of piece faces.
pub const PIECE_OUTLINE_WIDTH: f32 = 1.8;

/// Lifts shadow quads off the surface they rest on.
const SHADOW_NUDGE: f32 = 0.00001;

/// Static description of one piece kind.
#[derive(Debug, Clone)]
pub struct Archetype {
    pub shape: Shape,
    pub fill: Rgba,
    pub outline: Rgba,
    /// Point the next-piece preview spins around.
    pub preview_pivot: Vec3,
    mesh: Mesh,
}

impl Archetype {
    fn new(shape: Shape, fill: u32, outline: u32, preview_pivot: Vec3) -> Self {
        let fill = Rgba::hex(fill);
        let outline = Rgba::hex(outline);
        let mesh = build_piece_mesh(&shape, fill, Stroke::new(outline, PIECE_OUTLINE_WIDTH));
        Self {
            shape,
            fill,
            outline,
            preview_pivot,
            mesh,
        }
    }

    /// Mesh of the unrotated piece around its pivot
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }
}

/// All piece kinds, indexed by archetype id.
#[derive(Debug, Clone)]
pub struct ArchetypeRegistry {
    archetypes: [Archetype; ARCHETYPE_COUNT],
}

impl Default for ArchetypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchetypeRegistry {
    pub fn new() -> Self {
        let v = IVec3::new;
        let p = Vec3::new;
        Self {
            archetypes: [
                // Bar
                Archetype::new(
                    [v(0, -2, 0), v(0, -1, 0), v(0, 0, 0), v(0, 1, 0)],
                    0xff5050,
                    0xaa0000,
                    p(0.5, 0.0, 0.5),
                ),
                // Square
                Archetype::new(
                    [v(-1, -1, 0), v(0, -1, 0), v(-1, 0, 0), v(0, 0, 0)],
                    0xffff40,
                    0x888800,
                    p(0.0, 0.0, 0.5),
                ),
                // L
                Archetype::new(
                    [v(-1, -1, 0), v(0, -1, 0), v(0, 0, 0), v(0, 1, 0)],
                    0xff8844,
                    0x884400,
                    p(0.5, 0.5, 0.5),
                ),
                // T
                Archetype::new(
                    [v(-1, -1, 0), v(0, -1, 0), v(1, -1, 0), v(0, 0, 0)],
                    0x008000,
                    0x006000,
                    p(0.5, 0.0, 0.5),
                ),
                // Corner
                Archetype::new(
                    [v(-1, -1, -1), v(-1, -1, 0), v(0, -1, 0), v(-1, 0, 0)],
                    0x50ff50,
                    0x107710,
                    p(0.0, 0.0, 0.0),
                ),
                // Step
                Archetype::new(
                    [v(-1, -1, 0), v(0, -1, 0), v(0, 0, 0), v(1, 0, 0)],
                    0x3f48cc,
                    0x2b339d,
                    p(0.5, 0.0, 0.5),
                ),
                // Right screw
                Archetype::new(
                    [v(-1, -1, -1), v(-1, -1, 0), v(0, -1, 0), v(0, 0, 0)],
                    0xa349a4,
                    0x7b377b,
                    p(0.0, 0.0, 0.0),
                ),
                // Left screw
                Archetype::new(
                    [v(0, -1, -1), v(-1, -1, 0), v(0, -1, 0), v(-1, 0, 0)],
                    0x00a2e8,
                    0x0079ae,
                    p(0.0, 0.0, 0.0),
                ),
            ],
        }
    }

    /// Get archetype by id, wrapping ids past the end.
    pub fn get(&self, id: usize) -> &Archetype {
        &self.archetypes[id % ARCHETYPE_COUNT]
    }

    pub fn len(&self) -> usize {
        ARCHETYPE_COUNT
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = &Archetype> {
        self.archetypes.iter()
    }
}

/// Six outlined faces per voxel, corners shared through the builder.
fn build_piece_mesh(shape: &Shape, fill: Rgba, outline: Stroke) -> Mesh {
    let mut b = MeshBuilder::new();
    for &voxel in shape {
        for side in VoxelSide::ALL {
            let (origin, u, w) = side.quad(voxel);
            b.face(origin, u, w, fill, Some(outline));
        }
    }
    b.finish()
}

/// Rotate a shape in place by `turns` quarter turns about `axis`.
pub fn rotate_shape(shape: &mut Shape, axis: Axis, turns: i32) {
    if turns.rem_euclid(4) == 0 {
        return;
    }
    let m = quarter_turn(axis, turns);
    for voxel in shape.iter_mut() {
        *voxel = rotate_voxel(&m, *voxel);
    }
}

/// The falling piece.
#[derive(Debug, Clone)]
pub struct Piece {
    archetype: usize,
    shape: Shape,
    /// Quarter turns applied per axis, `[x, y, z]`, each in `0..4`.
    orientation: [u8; 3],
    position: IVec3,
    mesh: Mesh,
    fill: Rgba,
}

impl Piece {
    /// Create a piece of the given archetype at the spawn position of `grid`.
    pub fn new(registry: &ArchetypeRegistry, archetype: usize, grid: &VoxelGrid) -> Self {
        let a = registry.get(archetype);
        Self {
            archetype: archetype % ARCHETYPE_COUNT,
            shape: a.shape,
            orientation: [0; 3],
            position: spawn_position(grid),
            mesh: a.mesh.clone(),
            fill: a.fill,
        }
    }

    /// Get archetype id
    pub fn archetype(&self) -> usize {
        self.archetype
    }

    /// Get current voxel offsets
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Get per-axis quarter-turn counters `[x, y, z]`
    pub fn orientation(&self) -> [u8; 3] {
        self.orientation
    }

    /// Get grid position of the pivot
    pub fn position(&self) -> IVec3 {
        self.position
    }

    pub fn set_position(&mut self, position: IVec3) {
        self.position = position;
    }

    /// Local mesh around the pivot
    pub fn local_mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Switch to `archetype`, reloading its shape and mesh and clearing orientation.
    pub fn reset(&mut self, registry: &ArchetypeRegistry, archetype: usize) {
        let a = registry.get(archetype);
        self.archetype = archetype % ARCHETYPE_COUNT;
        self.shape = a.shape;
        self.orientation = [0; 3];
        self.mesh.clone_from(&a.mesh);
        self.fill = a.fill;
    }

    /// Occupied grid cells.
    pub fn cells(&self) -> impl Iterator<Item = IVec3> + '_ {
        self.shape.iter().map(move |&v| self.position + v)
    }

    /// Rotate shape and mesh by `turns` quarter turns about `axis`.
    pub fn rotate(&mut self, axis: Axis, turns: i32) {
        if turns.rem_euclid(4) == 0 {
            return;
        }
        rotate_shape(&mut self.shape, axis, turns);
        let slot = match axis {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        };
        self.orientation[slot] = ((self.orientation[slot] as i32 + turns).rem_euclid(4)) as u8;
        let m = quarter_turn(axis, turns);
        for v in self.mesh.vertices_mut() {
            *v = rotate_corner(&m, *v);
        }
    }

    /// Mesh placed at the current grid position.
    pub fn mesh(&self) -> Mesh {
        let mut mesh = self.mesh.clone();
        mesh.translate(self.position.as_vec3());
        mesh
    }

    /// Lowest y the piece can drop to from its current position.
    pub fn landing_y(&self, grid: &VoxelGrid) -> i32 {
        let mut y = self.position.y;
        loop {
            let below = IVec3::new(self.position.x, y - 1, self.position.z);
            if grid.test_placement(&self.shape, below).collides() {
                return y;
            }
            y -= 1;
        }
    }

    /// Translucent copy of the mesh at the landing position, no outlines.
    pub fn ghost_mesh(&self, grid: &VoxelGrid) -> Mesh {
        let mut ghost = self.mesh.clone();
        let landing = IVec3::new(self.position.x, self.landing_y(grid), self.position.z);
        ghost.translate(landing.as_vec3());
        ghost.set_fill_alpha(GHOST_ALPHA);
        ghost.clear_outlines();
        ghost
    }

    /// Translucent quads where the piece would touch the floor and the walls or stack around it.
    pub fn shadow_mesh(&self, grid: &VoxelGrid) -> Mesh {
        let dims = grid.dims();
        let fill = self.fill.with_alpha(SHADOW_ALPHA);
        let mut b = MeshBuilder::new();
        let mut seen: ArrayVec<(i32, i32), VOXELS_PER_PIECE> = ArrayVec::new();

        // Along z: back and front walls.
        for &a in &self.shape {
            let c = self.position + a;
            if c.y < 0 || c.y >= dims.y || seen.contains(&(a.x, a.y)) {
                continue;
            }
            seen.push((a.x, a.y));
            let mut z = c.z + 1;
            while z < dims.z && !grid.is_occupied(c.x, c.y, z) {
                z += 1;
            }
            b.face(IVec3::new(c.x, c.y, z), IVec3::X, IVec3::Y, fill, None);
            let mut z = c.z - 1;
            while z >= 0 && !grid.is_occupied(c.x, c.y, z) {
                z -= 1;
            }
            b.face(IVec3::new(c.x, c.y, z + 1), IVec3::Y, IVec3::X, fill, None);
        }

        // Along x: right and left walls.
        seen.clear();
        for &a in &self.shape {
            let c = self.position + a;
            if c.y < 0 || c.y >= dims.y || seen.contains(&(a.z, a.y)) {
                continue;
            }
            seen.push((a.z, a.y));
            let mut x = c.x + 1;
            while x < dims.x && !grid.is_occupied(x, c.y, c.z) {
                x += 1;
            }
            b.face(IVec3::new(x, c.y, c.z), IVec3::Y, IVec3::Z, fill, None);
            let mut x = c.x - 1;
            while x >= 0 && !grid.is_occupied(x, c.y, c.z) {
                x -= 1;
            }
            b.face(IVec3::new(x + 1, c.y, c.z), IVec3::Z, IVec3::Y, fill, None);
        }

        // Along y: the floor or the stack top, always emitted.
        seen.clear();
        for &a in &self.shape {
            if seen.contains(&(a.x, a.z)) {
                continue;
            }
            seen.push((a.x, a.z));
            let c = self.position + a;
            let mut y = c.y.clamp(0, dims.y - 1);
            while y >= 0 && !grid.is_occupied(c.x, y, c.z) {
                y -= 1;
            }
            b.face(IVec3::new(c.x, y + 1, c.z), IVec3::X, IVec3::Z, fill, None);
        }

        let mut mesh = b.finish();
        mesh.translate(Vec3::new(0.0, SHADOW_NUDGE, 0.0));
        mesh
    }
}

/// Spawn position: centred, two layers above the roof.
pub fn spawn_position(grid: &VoxelGrid) -> IVec3 {
    let d = grid.dims();
    IVec3::new(d.x / 2, d.y + SPAWN_HEIGHT_OFFSET, d.z / 2)
}
