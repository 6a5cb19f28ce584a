//! Non-interactive sigma-protocol proofs via the Fiat–Shamir transform.
//!
//! The transcript is a caller-owned byte buffer: a caller may prepend
//! protocol-binding context before handing it to `prove`/`verify`, and both
//! sides must append identical bytes in identical order. The challenge is a
//! domain-separated SHA-512 hash of the transcript reduced to a scalar.

pub mod dlog_equality;
pub mod plaintext_knowledge;

use curve25519_dalek::{
    ristretto::{CompressedRistretto, RistrettoPoint},
    scalar::Scalar,
};
use sha2::{Digest, Sha512};

/// Errors produced when decoding a proof.
#[derive(Debug)]
pub enum Error {
    /// A group element or scalar encoding was malformed.
    InvalidEncoding,
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::InvalidEncoding => "invalid proof encoding".fmt(f),
        }
    }
}

/// Append the compressed encoding of `pt` to `transcript`.
#[inline]
pub fn append_point(transcript: &mut Vec<u8>, pt: &RistrettoPoint) {
    transcript.extend_from_slice(pt.compress().as_bytes());
}

/// Hash the transcript to the challenge scalar under a domain label.
#[inline]
pub fn challenge(label: &'static [u8], transcript: &[u8]) -> Scalar {
    let mut h = Sha512::new();
    h.update(label);
    h.update(transcript);
    Scalar::from_hash(h)
}

#[inline]
fn decode_point(bytes: &[u8]) -> Result<RistrettoPoint, Error> {
    CompressedRistretto::from_slice(bytes)
        .map_err(|_| Error::InvalidEncoding)?
        .decompress()
        .ok_or(Error::InvalidEncoding)
}

#[inline]
fn decode_scalar(bytes: &[u8]) -> Result<Scalar, Error> {
    let arr: [u8; 32] = bytes.try_into().map_err(|_| Error::InvalidEncoding)?;
    Option::<Scalar>::from(Scalar::from_canonical_bytes(arr)).ok_or(Error::InvalidEncoding)
}
