//! Terminal "game renderer" module.
//!
//! A small, game-oriented rendering layer for terminal gameplay. The core
//! render pipeline draws polygons into a pixel [`Canvas`]; canvases are packed
//! into a framebuffer of half-block cells that is flushed to the terminal
//! with run-length diffs.
//!
//! Goals:
//! - Keep `core` deterministic and free of terminal state
//! - Square-ish pixels from half blocks, two per cell
//! - Reuse every buffer across frames

pub mod fb;
pub mod game_view;
pub mod raster;
pub mod renderer;

pub use tetris3d_core as core;
pub use tetris3d_input as input;
pub use tetris3d_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{GameView, Layout, Viewport};
pub use raster::Canvas;
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
