//! Host configuration from environment variables.
//!
//! | variable | default | meaning |
//! |----------|---------|---------|
//! | `TETRIS3D_DIMS` | `4x10x4` | grid size, `XxYxZ` |
//! | `TETRIS3D_SAVE_PATH` | `tetris3d.dat` | best-record file |
//! | `TETRIS3D_LOG_PATH` | `tetris3d.log` | log file |
//! | `TETRIS3D_TUTORIAL` | off | start in the tutorial (`1`/`true`) |
//! | `TETRIS3D_SEED` | clock | archetype RNG seed |
//!
//! Invalid values fall back to the defaults.

use std::path::PathBuf;

use glam::IVec3;

use crate::types::{DEFAULT_GRID_DIMS, MAX_GRID_DIM, MIN_GRID_HEIGHT, MIN_GRID_WIDTH};

pub const DEFAULT_SAVE_PATH: &str = "tetris3d.dat";
pub const DEFAULT_LOG_PATH: &str = "tetris3d.log";

#[derive(Debug, Clone, PartialEq)]
pub struct HostConfig {
    pub dims: IVec3,
    pub save_path: PathBuf,
    pub log_path: PathBuf,
    pub tutorial: bool,
    pub seed: Option<u32>,
}

impl Default for HostConfig {
    fn default() -> Self {
        let [x, y, z] = DEFAULT_GRID_DIMS;
        Self {
            dims: IVec3::new(x, y, z),
            save_path: PathBuf::from(DEFAULT_SAVE_PATH),
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
            tutorial: false,
            seed: None,
        }
    }
}

impl HostConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup, e.g. a map in tests.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| {
            lookup(key)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        Self {
            dims: non_empty("TETRIS3D_DIMS")
                .and_then(|s| parse_dims(&s))
                .unwrap_or(defaults.dims),
            save_path: non_empty("TETRIS3D_SAVE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.save_path),
            log_path: non_empty("TETRIS3D_LOG_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_path),
            tutorial: non_empty("TETRIS3D_TUTORIAL")
                .map(|s| parse_flag(&s))
                .unwrap_or(defaults.tutorial),
            seed: non_empty("TETRIS3D_SEED").and_then(|s| s.parse().ok()),
        }
    }
}

/// Parse `XxYxZ`. Width and depth need at least 3 cells, height at least 4.
pub fn parse_dims(s: &str) -> Option<IVec3> {
    let mut parts = s.split(['x', 'X']).map(|p| p.trim().parse::<i32>().ok());
    let (x, y, z) = (parts.next()??, parts.next()??, parts.next()??);
    if parts.next().is_some() {
        return None;
    }
    let dims = IVec3::new(x, y, z);
    let in_range = |v: i32, min: i32| (min..=MAX_GRID_DIM).contains(&v);
    let ok = in_range(x, MIN_GRID_WIDTH)
        && in_range(y, MIN_GRID_HEIGHT)
        && in_range(z, MIN_GRID_WIDTH);
    ok.then_some(dims)
}

fn parse_flag(s: &str) -> bool {
    matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
