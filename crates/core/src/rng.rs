//! RNG module - uniform archetype selection and the next-piece slot
//!
//! Each new archetype is drawn uniformly from all 8 kinds, independently of
//! the previous draws. The upcoming archetype is always known one piece
//! ahead so the host can preview it.

use crate::types::ARCHETYPE_COUNT;

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    ///
    /// The seed is scrambled first so that nearby seeds start far apart.
    pub fn new(seed: u32) -> Self {
        let mixed = mix_seed(seed);
        // Avoid 0 seed which would produce all zeros
        let state = if mixed == 0 { 1 } else { mixed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    ///
    /// Uses the high bits; the low bits of an LCG have short periods.
    pub fn next_range(&mut self, max: u32) -> u32 {
        ((self.next_u32() as u64 * max as u64) >> 32) as u32
    }
}

// Murmur3 32-bit finalizer.
fn mix_seed(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}

/// One-slot lookahead of upcoming archetypes.
#[derive(Debug, Clone)]
pub struct NextPiece {
    next: usize,
    rng: SimpleRng,
}

impl NextPiece {
    pub fn new(seed: u32) -> Self {
        let mut rng = SimpleRng::new(seed);
        let next = rng.next_range(ARCHETYPE_COUNT as u32) as usize;
        Self { next, rng }
    }

    /// Archetype the next [`NextPiece::take`] returns.
    pub fn peek(&self) -> usize {
        self.next
    }

    /// Return the upcoming archetype and roll a fresh one.
    pub fn take(&mut self) -> usize {
        let out = self.next;
        self.next = self.rng.next_range(ARCHETYPE_COUNT as u32) as usize;
        out
    }
}

impl Default for NextPiece {
    fn default() -> Self {
        Self::new(1)
    }
}
