//! NIZK proof of knowledge of `w` such that `h1 = g1·w` and `h2 = g2·w`.

use super::{append_point, challenge, decode_point, decode_scalar, Error};
use curve25519_dalek::{ristretto::RistrettoPoint, scalar::Scalar};
use rand::{CryptoRng, Rng};

const LABEL: &[u8] = b"nizk-dlog-equality";

/// The statement: two base/image pairs claimed to share a discrete log.
#[derive(Clone, Copy, Debug)]
pub struct Instance {
    pub g1: RistrettoPoint,
    pub h1: RistrettoPoint,
    pub g2: RistrettoPoint,
    pub h2: RistrettoPoint,
}

/// The witness: the shared discrete log.
#[derive(Clone, Copy, Debug)]
pub struct Witness {
    pub w: Scalar,
}

/// A proof: the prover's commitments and response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Proof {
    pub a1: RistrettoPoint,
    pub a2: RistrettoPoint,
    pub z: Scalar,
}

impl Proof {
    /// Encode as `A1 ‖ A2 ‖ z`.
    pub fn to_bytes(&self) -> [u8; 96] {
        let mut out = [0u8; 96];
        out[..32].copy_from_slice(self.a1.compress().as_bytes());
        out[32..64].copy_from_slice(self.a2.compress().as_bytes());
        out[64..].copy_from_slice(self.z.as_bytes());
        out
    }

    /// Decode a proof encoded with [`Proof::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != 96 {
            return Err(Error::InvalidEncoding);
        }
        Ok(Proof {
            a1: decode_point(&bytes[..32])?,
            a2: decode_point(&bytes[32..64])?,
            z: decode_scalar(&bytes[64..])?,
        })
    }
}

fn append_instance(transcript: &mut Vec<u8>, instance: &Instance) {
    append_point(transcript, &instance.g1);
    append_point(transcript, &instance.g2);
    append_point(transcript, &instance.h1);
    append_point(transcript, &instance.h2);
}

/// Generate a proof for `h1 = g1·w ∧ h2 = g2·w`, appending the instance and
/// commitments to the caller's transcript.
pub fn prove<RNG: CryptoRng + Rng>(
    instance: &Instance,
    witness: &Witness,
    transcript: &mut Vec<u8>,
    rng: &mut RNG,
) -> Proof {
    append_instance(transcript, instance);

    let a = Scalar::random(rng);
    let a1 = instance.g1 * a;
    let a2 = instance.g2 * a;

    append_point(transcript, &a1);
    append_point(transcript, &a2);
    let e = challenge(LABEL, transcript);

    let z = a + e * witness.w;
    Proof { a1, a2, z }
}

/// Check a proof against an instance. The verifier's transcript must start
/// from the same prefix the prover used.
pub fn verify(instance: &Instance, transcript: &mut Vec<u8>, proof: &Proof) -> bool {
    append_instance(transcript, instance);
    append_point(transcript, &proof.a1);
    append_point(transcript, &proof.a2);
    let e = challenge(LABEL, transcript);

    let v1 = instance.g1 * proof.z == proof.a1 + instance.h1 * e;
    let v2 = instance.g2 * proof.z == proof.a2 + instance.h2 * e;
    v1 && v2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AesRng;

    fn random_instance_witness<RNG: CryptoRng + Rng>(rng: &mut RNG) -> (Instance, Witness) {
        let w = Scalar::random(rng);
        let g1 = RistrettoPoint::random(rng);
        let g2 = RistrettoPoint::random(rng);
        (
            Instance {
                g1,
                h1: g1 * w,
                g2,
                h2: g2 * w,
            },
            Witness { w },
        )
    }

    #[test]
    fn test_prove_verify() {
        let mut rng = AesRng::new();
        let (instance, witness) = random_instance_witness(&mut rng);
        let mut transcript = Vec::new();
        let proof = prove(&instance, &witness, &mut transcript, &mut rng);
        let mut transcript = Vec::new();
        assert!(verify(&instance, &mut transcript, &proof));
    }

    #[test]
    fn test_reject_perturbed_statement() {
        let mut rng = AesRng::new();
        let (mut instance, witness) = random_instance_witness(&mut rng);
        let mut transcript = Vec::new();
        let proof = prove(&instance, &witness, &mut transcript, &mut rng);
        instance.h2 += RistrettoPoint::random(&mut rng);
        let mut transcript = Vec::new();
        assert!(!verify(&instance, &mut transcript, &proof));
    }

    #[test]
    fn test_transcript_prefix_binds() {
        let mut rng = AesRng::new();
        let (instance, witness) = random_instance_witness(&mut rng);
        let mut transcript = b"context-a".to_vec();
        let proof = prove(&instance, &witness, &mut transcript, &mut rng);
        let mut transcript = b"context-a".to_vec();
        assert!(verify(&instance, &mut transcript, &proof));
        let mut transcript = b"context-b".to_vec();
        assert!(!verify(&instance, &mut transcript, &proof));
    }

    #[test]
    fn test_proof_roundtrip() {
        let mut rng = AesRng::new();
        let (instance, witness) = random_instance_witness(&mut rng);
        let mut transcript = Vec::new();
        let proof = prove(&instance, &witness, &mut transcript, &mut rng);
        let decoded = Proof::from_bytes(&proof.to_bytes()).unwrap();
        assert_eq!(proof, decoded);
    }
}
