//! Thin wrappers around the AES block cipher, specialized to `Block`
//! plaintexts and ciphertexts.

use crate::Block;
use ::aes::cipher::{generic_array::GenericArray, BlockEncrypt, KeyInit};

/// AES-128, keyed once at construction.
#[derive(Clone)]
pub struct Aes128(::aes::Aes128);

impl Aes128 {
    /// Create a new cipher with key `key`.
    #[inline]
    pub fn new(key: Block) -> Self {
        let key = GenericArray::from(key.to_bytes());
        Aes128(::aes::Aes128::new(&key))
    }

    /// Encrypt block `m`.
    #[inline]
    pub fn encrypt(&self, m: Block) -> Block {
        let mut b = GenericArray::from(m.to_bytes());
        self.0.encrypt_block(&mut b);
        Block::from(<[u8; 16]>::from(b))
    }
}

/// AES-256, keyed once at construction.
#[derive(Clone)]
pub struct Aes256(::aes::Aes256);

impl Aes256 {
    /// Create a new cipher with key `key`.
    #[inline]
    pub fn new(key: &[u8; 32]) -> Self {
        let key = GenericArray::from(*key);
        Aes256(::aes::Aes256::new(&key))
    }

    /// Encrypt block `m`.
    #[inline]
    pub fn encrypt(&self, m: Block) -> Block {
        let mut b = GenericArray::from(m.to_bytes());
        self.0.encrypt_block(&mut b);
        Block::from(<[u8; 16]>::from(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aes128_deterministic() {
        let key = rand::random::<Block>();
        let m = rand::random::<Block>();
        let c = Aes128::new(key);
        assert_eq!(c.encrypt(m), c.encrypt(m));
        assert_ne!(c.encrypt(m), m);
    }

    #[test]
    fn test_aes128_fips197_vector() {
        // FIPS-197 appendix C.1.
        let key = Block::from([
            0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d,
            0x0e, 0x0f,
        ]);
        let pt = Block::from([
            0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd,
            0xee, 0xff,
        ]);
        let ct = Aes128::new(key).encrypt(pt);
        assert_eq!(
            ct.to_bytes(),
            [
                0x69, 0xc4, 0xe0, 0xd8, 0x6a, 0x7b, 0x04, 0x30, 0xd8, 0xcd, 0xb7, 0x80, 0x70,
                0xb4, 0xc5, 0x5a,
            ]
        );
    }
}
