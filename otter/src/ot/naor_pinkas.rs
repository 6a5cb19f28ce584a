//! Implementation of the Naor-Pinkas oblivious transfer protocol (cf.
//! <https://dl.acm.org/citation.cfm?id=365502>).
//!
//! This implementation uses the Ristretto prime order elliptic curve group
//! from the `curve25519-dalek` library. Both parties must agree on the
//! published generator, so it lives in a serializable [`Params`] record
//! rather than being fixed to the curve basepoint.

use crate::{
    errors::Error,
    ot::{Receiver as OtReceiver, Sender as OtSender},
};
use barnacle::{AbstractChannel, Block, SemiHonest};
use curve25519_dalek::{
    ristretto::{CompressedRistretto, RistrettoPoint},
    scalar::Scalar,
};
use rand::{CryptoRng, Rng};

/// Public parameters: a random generator of the group.
#[derive(Clone, Copy, Debug)]
pub struct Params {
    /// The generator every exponentiation in the protocol is relative to.
    pub g: RistrettoPoint,
}

impl Params {
    /// Sample fresh public parameters.
    pub fn setup<RNG: CryptoRng + Rng>(rng: &mut RNG) -> Self {
        Params {
            g: RistrettoPoint::random(rng),
        }
    }

    /// The compressed encoding of the generator.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.g.compress().to_bytes()
    }

    /// Decode parameters from their serialized form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != 32 {
            return Err(Error::SerializationError(
                "base OT parameters must be 32 bytes".to_string(),
            ));
        }
        let mut buf = [0u8; 32];
        buf.copy_from_slice(bytes);
        match CompressedRistretto(buf).decompress() {
            Some(g) => Ok(Params { g }),
            None => Err(Error::SerializationError(
                "invalid generator encoding".to_string(),
            )),
        }
    }

    /// Write the parameters to a file.
    pub fn save(&self, path: &str) -> Result<(), Error> {
        std::fs::write(path, self.to_bytes())?;
        Ok(())
    }

    /// Read parameters previously written with [`Params::save`].
    pub fn fetch(path: &str) -> Result<Self, Error> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }
}

/// Oblivious transfer sender.
pub struct Sender {
    params: Params,
}

/// Oblivious transfer receiver.
pub struct Receiver {
    params: Params,
}

impl Sender {
    /// Create a sender from shared public parameters.
    pub fn new(params: Params) -> Self {
        Self { params }
    }
}

impl Receiver {
    /// Create a receiver from shared public parameters.
    pub fn new(params: Params) -> Self {
        Self { params }
    }
}

impl OtSender for Sender {
    type Msg = Block;

    fn send<C: AbstractChannel, RNG: CryptoRng + Rng>(
        &mut self,
        channel: &mut C,
        inputs: &[(Block, Block)],
        rng: &mut RNG,
    ) -> Result<(), Error> {
        let m = inputs.len();
        let mut bs = Vec::with_capacity(m);
        for _ in 0..m {
            bs.push(channel.read_pt()?);
        }
        let r = Scalar::random(rng);
        let a = self.params.g * r;
        channel.write_pt(&a)?;
        for (i, (input, b)) in inputs.iter().zip(bs.into_iter()).enumerate() {
            // The receiver's point is g^alpha for choice 0 and g^(1+alpha)
            // for choice 1, so exactly one of these keys is recoverable.
            let k0 = Block::hash_pt(i as u128, &(b * r));
            let k1 = Block::hash_pt(i as u128, &((b - self.params.g) * r));
            channel.write_block(&(input.0 ^ k0))?;
            channel.write_block(&(input.1 ^ k1))?;
        }
        channel.flush()?;
        Ok(())
    }
}

impl OtReceiver for Receiver {
    type Msg = Block;

    fn receive<C: AbstractChannel, RNG: CryptoRng + Rng>(
        &mut self,
        channel: &mut C,
        inputs: &[bool],
        rng: &mut RNG,
    ) -> Result<Vec<Block>, Error> {
        let mut alphas = Vec::with_capacity(inputs.len());
        for c in inputs.iter() {
            let alpha = Scalar::random(rng);
            let mut b = self.params.g * alpha;
            if *c {
                b += self.params.g;
            }
            channel.write_pt(&b)?;
            alphas.push(alpha);
        }
        channel.flush()?;
        let a = channel.read_pt()?;
        inputs
            .iter()
            .zip(alphas.into_iter())
            .enumerate()
            .map(|(i, (c, alpha))| {
                let c0 = channel.read_block()?;
                let c1 = channel.read_block()?;
                let k = Block::hash_pt(i as u128, &(a * alpha));
                Ok(if *c { c1 } else { c0 } ^ k)
            })
            .collect()
    }
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Naor-Pinkas Sender")
    }
}

impl std::fmt::Display for Receiver {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Naor-Pinkas Receiver")
    }
}

impl SemiHonest for Sender {}
impl SemiHonest for Receiver {}

#[cfg(test)]
mod tests {
    use super::*;
    use barnacle::AesRng;

    #[test]
    fn test_params_roundtrip() {
        let mut rng = AesRng::new();
        let params = Params::setup(&mut rng);
        let params_ = Params::from_bytes(&params.to_bytes()).unwrap();
        assert_eq!(params.g, params_.g);
        assert!(Params::from_bytes(&[0u8; 31]).is_err());
    }
}
