//! Twisted ElGamal over the Ristretto group.
//!
//! A ciphertext for value `v` under public key `pk` with randomness `r` is
//! the pair `(X, Y) = (pk·r, g·r + h·v)` for fixed independent generators
//! `g` and `h`. Decryption is not needed by the protocols here; the
//! ciphertext exists as the statement of the plaintext-knowledge proof.

use curve25519_dalek::{
    constants::RISTRETTO_BASEPOINT_POINT,
    ristretto::{CompressedRistretto, RistrettoPoint},
    scalar::Scalar,
};
use rand::{CryptoRng, Rng};
use sha2::Sha512;

/// Public parameters: the two generators.
#[derive(Clone, Copy, Debug)]
pub struct Params {
    /// Randomness generator.
    pub g: RistrettoPoint,
    /// Value generator, independent of `g`.
    pub h: RistrettoPoint,
}

impl Params {
    /// The standard parameter set: `g` is the Ristretto basepoint and `h` is
    /// derived by hashing the encoding of `g`, so nobody knows their relative
    /// discrete logarithm.
    pub fn standard() -> Self {
        let g = RISTRETTO_BASEPOINT_POINT;
        let h = RistrettoPoint::hash_from_bytes::<Sha512>(g.compress().as_bytes());
        Params { g, h }
    }
}

/// A twisted ElGamal ciphertext.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ciphertext {
    /// `pk·r`.
    pub x: RistrettoPoint,
    /// `g·r + h·v`.
    pub y: RistrettoPoint,
}

impl Ciphertext {
    /// The 64-byte compressed encoding `X ‖ Y`.
    pub fn to_bytes(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(self.x.compress().as_bytes());
        out[32..].copy_from_slice(self.y.compress().as_bytes());
        out
    }

    /// Decode a ciphertext from its 64-byte encoding.
    pub fn from_bytes(bytes: &[u8; 64]) -> Option<Self> {
        let x = CompressedRistretto::from_slice(&bytes[..32]).ok()?.decompress()?;
        let y = CompressedRistretto::from_slice(&bytes[32..]).ok()?.decompress()?;
        Some(Ciphertext { x, y })
    }
}

/// Generate a keypair `(sk, pk = g·sk)`.
pub fn keygen<RNG: CryptoRng + Rng>(params: &Params, rng: &mut RNG) -> (Scalar, RistrettoPoint) {
    let sk = Scalar::random(rng);
    (sk, params.g * sk)
}

/// Encrypt `v` under `pk` with explicit randomness `r`.
pub fn encrypt(params: &Params, pk: &RistrettoPoint, v: &Scalar, r: &Scalar) -> Ciphertext {
    Ciphertext {
        x: pk * r,
        y: params.g * r + params.h * v,
    }
}
