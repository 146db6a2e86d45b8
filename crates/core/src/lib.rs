//! Core game logic - voxel simulation and the software render pipeline
//!
//! Everything here is deterministic and free of terminal or file-handle
//! state, apart from the best-record helpers in [`progress`]. The host
//! supplies key levels through [`KeyState`], elapsed time per update, and a
//! [`Surface`] to draw on.
//!
//! # Module Structure
//!
//! - [`geometry`]: faces and polylines indexing a shared vertex pool
//! - [`mesh`]: vertex pool + geometries; merge, transform, cull, light, project, sort
//! - [`math`]: exact quarter-turn matrices
//! - [`grid`]: the `dx × dy × dz` well, collision tests, layer clearing, grid meshes
//! - [`piece`]: archetype registry, the falling piece, ghost and shadow meshes
//! - [`progress`]: score, level, gravity and the best-record file
//! - [`rng`]: uniform archetype draws with one-piece lookahead
//! - [`input`]: press/hold/auto-repeat tracking per logical key
//! - [`tutorial`]: staged control unlocking
//! - [`game`]: the drop state machine tying it all together
//! - [`pipeline`]: board and next-piece render pipelines
//! - [`surface`]: the 2D drawing trait consumed by the pipeline
//! - [`snapshot`]: HUD data for the host
//!
//! # Example
//!
//! ```
//! use glam::IVec3;
//! use tetris3d_core::{DrawCommand, GameState, RenderPipeline, Viewport};
//! use tetris3d_core::types::GameKey;
//!
//! let mut game = GameState::new(IVec3::new(4, 10, 4), 12345);
//! assert!(game.update(0.016, &[GameKey::Right]));
//!
//! let mut pipeline = RenderPipeline::default();
//! let mut calls: Vec<DrawCommand> = Vec::new();
//! pipeline.render_scene(&game, Viewport::new(0.0, 0.0, 320.0, 200.0), &mut calls);
//! assert!(!calls.is_empty());
//! ```
//!
//! # Timing
//!
//! Call [`GameState::update`] once per tick (16 ms in the terminal host) with
//! the elapsed seconds. Gravity steps the piece every `1 / speed` seconds,
//! `speed` growing from 1 to 5 with the number of locked pieces.

pub mod game;
pub mod geometry;
pub mod grid;
pub mod input;
pub mod math;
pub mod mesh;
pub mod piece;
pub mod pipeline;
pub mod progress;
pub mod rng;
pub mod snapshot;
pub mod surface;
pub mod tutorial;

pub use tetris3d_types as types;

// Re-export commonly used types for convenience
pub use game::{DropState, GameState, StepResult};
pub use geometry::{Face, Geometry, Polyline, Stroke};
pub use grid::{Placement, VoxelGrid};
pub use input::{KeyState, KeyTracker, KeyTrackers};
pub use mesh::{Mesh, MeshBuilder};
pub use piece::{Archetype, ArchetypeRegistry, Piece, Shape};
pub use pipeline::{board_scale, RenderPipeline, Viewport};
pub use progress::{calculate_score, load_best, save_best, GameProgress, PersistError};
pub use rng::{NextPiece, SimpleRng};
pub use snapshot::{GameSnapshot, TutorialSnapshot};
pub use surface::{DrawCommand, Surface};
pub use tutorial::Tutorial;
