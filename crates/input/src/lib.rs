//! Terminal input module (engine-facing).
//!
//! Maps `crossterm` key events to logical [`GameKey`](crate::types::GameKey)s
//! and camera commands, and tracks which keys are held so the game can poll
//! them through [`KeyState`](crate::core::KeyState), including on terminals
//! without key-release events.

pub mod handler;
pub mod map;

pub use tetris3d_core as core;
pub use tetris3d_types as types;

pub use handler::InputHandler;
pub use map::{handle_key_event, key_label, should_quit, InputCommand};
