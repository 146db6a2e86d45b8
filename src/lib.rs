//! 3D voxel falling-block puzzle (workspace facade crate).
//!
//! The implementation lives in dedicated crates under `crates/`; this package
//! re-exports them as `tetris3d::{core,input,term,types}` and hosts the
//! terminal runner's configuration.

pub mod config;

pub use tetris3d_core as core;
pub use tetris3d_input as input;
pub use tetris3d_term as term;
pub use tetris3d_types as types;

pub use config::HostConfig;
