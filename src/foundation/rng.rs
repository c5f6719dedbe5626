//! Seedable pseudo-random stream used for reproducible generation.
//!
//! Every generation entry point takes `&mut R where R: rand::Rng + ?Sized`, so any `rand`
//! generator can be injected. [`SplitMix64`] is the crate's default: tiny, fast, and stable
//! across platforms and crate versions, which keeps seeded fixtures valid.

use rand::{RngCore, SeedableRng};

use crate::foundation::math::mix64;

/// SplitMix64 generator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Derive an independent child stream for partition `index` (e.g. a grid row).
    pub fn derive(seed: u64, index: u64) -> Self {
        Self::new(mix64(seed ^ index.wrapping_mul(0xD6E8_FEB8_6659_FD93)))
    }
}

impl RngCore for SplitMix64 {
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        mix64(self.state)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for SplitMix64 {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u64::from_le_bytes(seed))
    }

    fn seed_from_u64(state: u64) -> Self {
        Self::new(state)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/rng.rs"]
mod tests;
