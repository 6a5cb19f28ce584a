//! NIZK proof of knowledge of the plaintext and randomness of a twisted
//! ElGamal ciphertext: `(v, r)` with `X = pk·r` and `Y = g·r + h·v`.

use super::{append_point, challenge, decode_point, decode_scalar, Error};
use crate::elgamal::{Ciphertext, Params};
use curve25519_dalek::{ristretto::RistrettoPoint, scalar::Scalar};
use rand::{CryptoRng, Rng};

const LABEL: &[u8] = b"nizk-plaintext-knowledge";

/// The statement: a public key and a ciphertext under it.
#[derive(Clone, Copy, Debug)]
pub struct Instance {
    pub pk: RistrettoPoint,
    pub ct: Ciphertext,
}

/// The witness: the encrypted value and the encryption randomness.
#[derive(Clone, Copy, Debug)]
pub struct Witness {
    pub v: Scalar,
    pub r: Scalar,
}

/// A proof: two commitments and two responses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Proof {
    pub a: RistrettoPoint,
    pub b: RistrettoPoint,
    pub z1: Scalar,
    pub z2: Scalar,
}

impl Proof {
    /// Encode as `A ‖ B ‖ z1 ‖ z2`.
    pub fn to_bytes(&self) -> [u8; 128] {
        let mut out = [0u8; 128];
        out[..32].copy_from_slice(self.a.compress().as_bytes());
        out[32..64].copy_from_slice(self.b.compress().as_bytes());
        out[64..96].copy_from_slice(self.z1.as_bytes());
        out[96..].copy_from_slice(self.z2.as_bytes());
        out
    }

    /// Decode a proof encoded with [`Proof::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != 128 {
            return Err(Error::InvalidEncoding);
        }
        Ok(Proof {
            a: decode_point(&bytes[..32])?,
            b: decode_point(&bytes[32..64])?,
            z1: decode_scalar(&bytes[64..96])?,
            z2: decode_scalar(&bytes[96..])?,
        })
    }
}

fn append_instance(transcript: &mut Vec<u8>, instance: &Instance) {
    append_point(transcript, &instance.pk);
    append_point(transcript, &instance.ct.x);
    append_point(transcript, &instance.ct.y);
}

/// Generate a proof of plaintext knowledge for `instance` under the
/// generators in `params`.
pub fn prove<RNG: CryptoRng + Rng>(
    params: &Params,
    instance: &Instance,
    witness: &Witness,
    transcript: &mut Vec<u8>,
    rng: &mut RNG,
) -> Proof {
    append_instance(transcript, instance);

    let a = Scalar::random(rng);
    let b = Scalar::random(rng);
    let cap_a = instance.pk * a;
    let cap_b = params.g * a + params.h * b;

    append_point(transcript, &cap_a);
    append_point(transcript, &cap_b);
    let e = challenge(LABEL, transcript);

    Proof {
        a: cap_a,
        b: cap_b,
        z1: a + e * witness.r,
        z2: b + e * witness.v,
    }
}

/// Check a plaintext-knowledge proof.
pub fn verify(
    params: &Params,
    instance: &Instance,
    transcript: &mut Vec<u8>,
    proof: &Proof,
) -> bool {
    append_instance(transcript, instance);
    append_point(transcript, &proof.a);
    append_point(transcript, &proof.b);
    let e = challenge(LABEL, transcript);

    let v1 = instance.pk * proof.z1 == proof.a + instance.ct.x * e;
    let v2 = params.g * proof.z1 + params.h * proof.z2 == proof.b + instance.ct.y * e;
    v1 && v2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{elgamal, AesRng};

    fn random_instance_witness<RNG: CryptoRng + Rng>(
        params: &Params,
        rng: &mut RNG,
    ) -> (Instance, Witness) {
        let v = Scalar::random(rng);
        let r = Scalar::random(rng);
        let pk = RistrettoPoint::random(rng);
        let ct = elgamal::encrypt(params, &pk, &v, &r);
        (Instance { pk, ct }, Witness { v, r })
    }

    #[test]
    fn test_prove_verify() {
        let mut rng = AesRng::new();
        let params = Params::standard();
        let (instance, witness) = random_instance_witness(&params, &mut rng);
        let mut transcript = Vec::new();
        let proof = prove(&params, &instance, &witness, &mut transcript, &mut rng);
        let mut transcript = Vec::new();
        assert!(verify(&params, &instance, &mut transcript, &proof));
    }

    #[test]
    fn test_reject_wrong_ciphertext() {
        let mut rng = AesRng::new();
        let params = Params::standard();
        let (mut instance, witness) = random_instance_witness(&params, &mut rng);
        let mut transcript = Vec::new();
        let proof = prove(&params, &instance, &witness, &mut transcript, &mut rng);
        instance.ct.y += RistrettoPoint::random(&mut rng);
        let mut transcript = Vec::new();
        assert!(!verify(&params, &instance, &mut transcript, &proof));
    }

    #[test]
    fn test_proof_roundtrip() {
        let mut rng = AesRng::new();
        let params = Params::standard();
        let (instance, witness) = random_instance_witness(&params, &mut rng);
        let mut transcript = Vec::new();
        let proof = prove(&params, &instance, &witness, &mut transcript, &mut rng);
        let decoded = Proof::from_bytes(&proof.to_bytes()).unwrap();
        assert_eq!(proof, decoded);
    }
}
