//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (simulation, software rendering, terminal front end).
//!
//! # Grid Dimensions
//!
//! The default play field is a 4x10x4 voxel well:
//!
//! - **Width (x)**: 4 columns
//! - **Height (y)**: 10 layers, y grows upwards
//! - **Depth (z)**: 4 rows
//! - **Spawn position**: `(dx/2, dy+2, dz/2)`, two layers above the roof
//!
//! # Timing Constants
//!
//! Timing values are in seconds unless the name says otherwise:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Host loop interval (~60 FPS) |
//! | `AUTO_REPEAT_DELAY_S` | 0.3 | Hold time before a key starts repeating |
//! | `AUTO_REPEAT_INTERVAL_S` | 0.1 | Interval between repeats |
//! | `BASE_GRAVITY_SPEED` | 1.0 | Gravity steps per second at level 1 |
//! | `MAX_GRAVITY_SPEED` | 5.0 | Gravity cap |
//! | `SOFT_DROP_BOOST` | 7.0 | Extra steps per second while Down is held |
//! | `PREVIEW_SPIN_PERIOD_S` | 6.0 | One full turn of the next-piece preview |
//!
//! # Examples
//!
//! ```
//! use tetris3d_types::{GameKey, Rgba, DEFAULT_GRID_DIMS};
//!
//! let red = Rgba::hex(0xff5050);
//! assert_eq!(red.with_alpha(0.5).a, 128);
//!
//! assert_eq!(GameKey::ALL[GameKey::RotateCw.index()], GameKey::RotateCw);
//! assert_eq!(DEFAULT_GRID_DIMS, [4, 10, 4]);
//! ```

/// Default play field dimensions `[x, y, z]`.
pub const DEFAULT_GRID_DIMS: [i32; 3] = [4, 10, 4];

/// Smallest accepted width and depth. Pieces span three cells around the spawn column.
pub const MIN_GRID_WIDTH: i32 = 3;

/// Smallest accepted height. The upright bar is four layers tall.
pub const MIN_GRID_HEIGHT: i32 = 4;

/// Largest accepted play field dimension on any axis.
pub const MAX_GRID_DIM: i32 = 32;

/// Layers above the roof at which new pieces spawn.
pub const SPAWN_HEIGHT_OFFSET: i32 = 2;

/// Number of piece archetypes.
pub const ARCHETYPE_COUNT: usize = 8;

/// Voxels per piece.
pub const VOXELS_PER_PIECE: usize = 4;

/// Fixed host loop interval in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Hold time before a held key starts auto-repeating.
pub const AUTO_REPEAT_DELAY_S: f32 = 0.3;

/// Interval between auto-repeats once repeating.
pub const AUTO_REPEAT_INTERVAL_S: f32 = 0.1;

/// Gravity speed (steps per second) of a fresh game.
pub const BASE_GRAVITY_SPEED: f32 = 1.0;

/// Gravity speed cap.
pub const MAX_GRAVITY_SPEED: f32 = 5.0;

/// Gravity speed added while the Down key is held.
pub const SOFT_DROP_BOOST: f32 = 7.0;

/// Locked pieces per level.
pub const PIECES_PER_LEVEL: u32 = 10;

/// Distance from the camera at which the play field is drawn.
pub const CAMERA_DEPTH: f32 = 20.0;

/// Unnormalized light direction in camera space.
pub const LIGHT_DIRECTION: [f32; 3] = [0.0, -0.125, 1.0];

/// Fixed pitch of the next-piece preview, in radians.
pub const PREVIEW_PITCH: f32 = -std::f32::consts::PI / 5.0;

/// Seconds per full turn of the next-piece preview.
pub const PREVIEW_SPIN_PERIOD_S: f32 = 6.0;

/// Fraction of the smaller preview side covered by a 4-voxel span.
pub const PREVIEW_FILL: f32 = 0.8;

/// Alpha of the ghost piece fill.
pub const GHOST_ALPHA: f32 = 0.5;

/// Alpha of projected piece shadows.
pub const SHADOW_ALPHA: f32 = 0.4;

/// Tutorial hint display time.
pub const TUTORIAL_HINT_S: f32 = 4.5;

/// RGBA color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from a `0xRRGGBB` literal.
    pub const fn hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as u8,
            g: ((rgb >> 8) & 0xff) as u8,
            b: (rgb & 0xff) as u8,
            a: 0xff,
        }
    }

    /// Same color with alpha set from a `0.0..=1.0` fraction.
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            a: (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
            ..self
        }
    }

    /// Scale the color channels by a light intensity, keeping alpha.
    pub fn scaled(self, intensity: f32) -> Self {
        let k = intensity.clamp(0.0, 1.0);
        Self {
            r: (self.r as f32 * k).round() as u8,
            g: (self.g as f32 * k).round() as u8,
            b: (self.b as f32 * k).round() as u8,
            a: self.a,
        }
    }

    pub fn is_transparent(self) -> bool {
        self.a == 0
    }
}

/// Rotation axes of the voxel grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Logical game keys.
///
/// The simulation only ever asks whether one of these is held; the host
/// decides which physical keys map to which logical key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameKey {
    Reset,
    Pause,
    ToggleGhost,
    RotateCw,
    RotateCcw,
    RotateYawCw,
    RotateYawCcw,
    Push,
    Pull,
    Right,
    Left,
    Down,
    /// Advances the tutorial.
    Advance,
}

impl GameKey {
    /// Number of logical keys.
    pub const COUNT: usize = 13;

    /// Every key, in index order.
    pub const ALL: [GameKey; Self::COUNT] = [
        GameKey::Reset,
        GameKey::Pause,
        GameKey::ToggleGhost,
        GameKey::RotateCw,
        GameKey::RotateCcw,
        GameKey::RotateYawCw,
        GameKey::RotateYawCcw,
        GameKey::Push,
        GameKey::Pull,
        GameKey::Right,
        GameKey::Left,
        GameKey::Down,
        GameKey::Advance,
    ];

    /// Dense index for per-key tables.
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Events surfaced to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameEvent {
    Pause,
    GameOver,
    Resume,
}

/// Rotation the tutorial reports as blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockedRotation {
    Cw,
    Ccw,
    YawCw,
    YawCcw,
}
