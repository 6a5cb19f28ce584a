//! Correlation-robust hash function based on fixed-key AES.

use crate::{Aes128, Block};

/// The key used by [`AesHash::fixed_key`].
pub const FIXED_KEY: [u8; 16] = [
    0x61, 0x7E, 0x8D, 0xA2, 0xB7, 0x3C, 0x49, 0xD6, 0xE3, 0xF0, 0x05, 0x1A, 0x2F, 0x44, 0x59,
    0x6E,
];

/// AES-based correlation-robust hash function.
///
/// The function computes `π(x) ⊕ x` (cf. <https://eprint.iacr.org/2019/074>,
/// §7.2), where `π` is AES with a key fixed at construction time.
#[derive(Clone)]
pub struct AesHash {
    aes: Aes128,
}

impl AesHash {
    /// Initialize the hash function using `key`.
    #[inline]
    pub fn new(key: Block) -> Self {
        let aes = Aes128::new(key);
        AesHash { aes }
    }

    /// The hash function keyed with [`FIXED_KEY`].
    #[inline]
    pub fn fixed_key() -> Self {
        Self::new(Block::from(FIXED_KEY))
    }

    /// Correlation-robust hash function for 128-bit inputs.
    #[inline]
    pub fn cr_hash(&self, _i: Block, x: Block) -> Block {
        self.aes.encrypt(x) ^ x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cr_hash() {
        let h = AesHash::fixed_key();
        let x = rand::random::<Block>();
        let y = rand::random::<Block>();
        assert_eq!(h.cr_hash(Block::default(), x), h.cr_hash(Block::default(), x));
        if x != y {
            assert_ne!(h.cr_hash(Block::default(), x), h.cr_hash(Block::default(), y));
        }
    }
}
