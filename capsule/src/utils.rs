//! Helpers shared by the cwPRF-based protocols.

use barnacle::Block;
use curve25519_dalek::montgomery::MontgomeryPoint;
use rand::{CryptoRng, Rng, RngCore};
use sha2::{Digest, Sha256};

/// A commutative weak PRF key: 32 raw bytes fed to the clamped X25519
/// scalar multiplication.
pub type PrfKey = [u8; 32];

/// Sample a fresh PRF key.
pub fn gen_key<RNG: CryptoRng + RngCore>(rng: &mut RNG) -> PrfKey {
    let mut key = [0u8; 32];
    rng.fill_bytes(&mut key);
    key
}

/// Hash a block to a curve25519 point encoding.
pub fn hash_to_curve(x: &Block) -> MontgomeryPoint {
    let digest = Sha256::digest(x.as_ref());
    MontgomeryPoint(digest.into())
}

/// Evaluate `F_k(p) = X25519(k, p)`.
///
/// `F` is a commutative weak PRF: scalar multiplications compose in either
/// order, so `F_{k1}(F_{k2}(p)) = F_{k2}(F_{k1}(p))`.
pub fn prf(key: &PrfKey, p: &MontgomeryPoint) -> MontgomeryPoint {
    p.mul_clamped(*key)
}

/// Generate `size` random blocks.
pub fn rand_block_vec<RNG: CryptoRng + RngCore>(size: usize, rng: &mut RNG) -> Vec<Block> {
    (0..size).map(|_| rng.gen::<Block>()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use barnacle::AesRng;

    #[test]
    fn test_prf_commutes() {
        let mut rng = AesRng::new();
        for _ in 0..8 {
            let k1 = gen_key(&mut rng);
            let k2 = gen_key(&mut rng);
            let x = rng.gen::<Block>();
            let p = hash_to_curve(&x);
            assert_eq!(prf(&k1, &prf(&k2, &p)), prf(&k2, &prf(&k1, &p)));
        }
    }

    #[test]
    fn test_hash_to_curve_deterministic() {
        let x = rand::random::<Block>();
        assert_eq!(hash_to_curve(&x), hash_to_curve(&x));
    }
}
