//! Progress module - score, level and gravity bookkeeping plus the best-record file
//!
//! # Scoring
//!
//! Clearing `n` layers at once on a grid of area `A = dx*dz` scores `n² * A`.
//! Every locked piece counts toward the level: level = pieces / 10 + 1.
//!
//! # Gravity
//!
//! Gravity speed (steps per second) = `min(5, pieces * 4 / 300 + 1)`.
//!
//! # Best record file
//!
//! An 8-byte little-endian record `{score: i32, pieces_locked: i32}`. A file of
//! any other length reads as "no best score yet".

use std::fs;
use std::io;
use std::path::Path;

use bytemuck::{Pod, Zeroable};

use crate::types::{BASE_GRAVITY_SPEED, MAX_GRAVITY_SPEED, PIECES_PER_LEVEL};

/// Score and locked-piece count of one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GameProgress {
    pub score: i32,
    pub pieces_locked: i32,
}

impl GameProgress {
    /// Get level (starts at 1)
    pub fn level(&self) -> u32 {
        self.pieces_locked.max(0) as u32 / PIECES_PER_LEVEL + 1
    }

    /// Fraction of the current level completed, in `0.0..1.0`.
    pub fn level_progress(&self) -> f32 {
        (self.pieces_locked.max(0) as u32 % PIECES_PER_LEVEL) as f32 * 0.1
    }

    /// Gravity speed for the current piece count.
    pub fn gravity_speed(&self) -> f32 {
        (self.pieces_locked as f32 * 4.0 / 300.0 + BASE_GRAVITY_SPEED).min(MAX_GRAVITY_SPEED)
    }

    /// Account for a locked piece that cleared `cleared` layers. Returns the points awarded.
    pub fn record_lock(&mut self, cleared: u32, layer_area: i32) -> i32 {
        let points = calculate_score(cleared, layer_area);
        self.score = self.score.saturating_add(points);
        self.pieces_locked = self.pieces_locked.saturating_add(1);
        points
    }
}

/// Points for clearing `cleared` layers at once.
pub fn calculate_score(cleared: u32, layer_area: i32) -> i32 {
    let n = cleared as i32;
    n.saturating_mul(n).saturating_mul(layer_area)
}

/// On-disk layout of the best record.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct BestRecord {
    pub score: i32,
    pub pieces_locked: i32,
}

/// Size of the best record in bytes.
pub const BEST_RECORD_SIZE: usize = std::mem::size_of::<BestRecord>();

impl From<GameProgress> for BestRecord {
    fn from(p: GameProgress) -> Self {
        Self {
            score: p.score.to_le(),
            pieces_locked: p.pieces_locked.to_le(),
        }
    }
}

impl From<BestRecord> for GameProgress {
    fn from(r: BestRecord) -> Self {
        Self {
            score: i32::from_le(r.score),
            pieces_locked: i32::from_le(r.pieces_locked),
        }
    }
}

/// Errors reading or writing the best record.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("best record I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("best record has {actual} bytes, expected {expected}")]
    WrongSize { expected: usize, actual: usize },
}

/// Decode a best record from raw bytes.
pub fn decode_best(bytes: &[u8]) -> Result<GameProgress, PersistError> {
    if bytes.len() != BEST_RECORD_SIZE {
        return Err(PersistError::WrongSize {
            expected: BEST_RECORD_SIZE,
            actual: bytes.len(),
        });
    }
    let record: BestRecord = bytemuck::pod_read_unaligned(bytes);
    Ok(record.into())
}

/// Encode a best record.
pub fn encode_best(progress: GameProgress) -> [u8; BEST_RECORD_SIZE] {
    let record = BestRecord::from(progress);
    let mut out = [0u8; BEST_RECORD_SIZE];
    out.copy_from_slice(bytemuck::bytes_of(&record));
    out
}

/// Read the best record at `path`.
pub fn try_load_best(path: &Path) -> Result<GameProgress, PersistError> {
    let bytes = fs::read(path)?;
    decode_best(&bytes)
}

/// Read the best record at `path`, treating any failure as "no best yet".
pub fn load_best(path: &Path) -> GameProgress {
    match try_load_best(path) {
        Ok(best) => {
            log::info!("loaded best record from {}: score {}", path.display(), best.score);
            best
        }
        Err(err) => {
            log::debug!("no best record at {}: {err}", path.display());
            GameProgress::default()
        }
    }
}

/// Overwrite the best record at `path`.
pub fn save_best(path: &Path, best: GameProgress) -> Result<(), PersistError> {
    fs::write(path, encode_best(best))?;
    Ok(())
}
