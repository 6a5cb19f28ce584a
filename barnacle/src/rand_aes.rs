//! Fixed-key AES random number generator.

use crate::{Aes128, Block};
use rand::{CryptoRng, Error, Rng, RngCore, SeedableRng};

/// Implementation of a random number generator based on AES in counter mode.
///
/// The counter always starts at zero, so two generators built from the same
/// seed produce identical streams. This is exactly what the OT-extension
/// column expansion relies on.
#[derive(Clone)]
pub struct AesRng {
    aes: Aes128,
    counter: u128,
    buffer: [u8; 16],
    used: usize,
}

impl RngCore for AesRng {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        let mut b = [0u8; 4];
        self.fill_bytes(&mut b);
        u32::from_le_bytes(b)
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        let mut b = [0u8; 8];
        self.fill_bytes(&mut b);
        u64::from_le_bytes(b)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        let mut filled = 0;
        while filled < dest.len() {
            if self.used == 16 {
                self.buffer = self
                    .aes
                    .encrypt(Block::from(self.counter))
                    .to_bytes();
                self.counter += 1;
                self.used = 0;
            }
            let n = std::cmp::min(16 - self.used, dest.len() - filled);
            dest[filled..filled + n].copy_from_slice(&self.buffer[self.used..self.used + n]);
            self.used += n;
            filled += n;
        }
    }

    #[inline]
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for AesRng {
    type Seed = Block;

    #[inline]
    fn from_seed(seed: Self::Seed) -> Self {
        AesRng {
            aes: Aes128::new(seed),
            counter: 0,
            buffer: [0u8; 16],
            used: 16,
        }
    }
}

impl CryptoRng for AesRng {}

impl AesRng {
    /// Create a new random number generator using a random seed from
    /// `rand::random`.
    #[inline]
    pub fn new() -> Self {
        let seed = rand::random::<Block>();
        AesRng::from_seed(seed)
    }

    /// Create a new RNG using a random seed from this one.
    #[inline]
    pub fn fork(&mut self) -> Self {
        let seed = self.gen::<Block>();
        AesRng::from_seed(seed)
    }
}

impl Default for AesRng {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate() {
        let mut rng = AesRng::new();
        let a = rng.gen::<[u64; 8]>();
        let b = rng.gen::<[u64; 8]>();
        assert_ne!(a, b);
    }

    #[test]
    fn test_deterministic() {
        let seed = rand::random::<Block>();
        let mut rng = AesRng::from_seed(seed);
        let mut rng_ = AesRng::from_seed(seed);
        let mut a = [0u8; 117];
        let mut b = [0u8; 117];
        rng.fill_bytes(&mut a);
        rng_.fill_bytes(&mut b);
        assert_eq!(a.to_vec(), b.to_vec());
    }

    #[test]
    fn test_chunked_fill_matches_bulk_fill() {
        let seed = rand::random::<Block>();
        let mut rng = AesRng::from_seed(seed);
        let mut rng_ = AesRng::from_seed(seed);
        let mut bulk = [0u8; 64];
        rng.fill_bytes(&mut bulk);
        let mut chunked = [0u8; 64];
        for chunk in chunked.chunks_mut(5) {
            rng_.fill_bytes(chunk);
        }
        assert_eq!(bulk.to_vec(), chunked.to_vec());
    }
}
