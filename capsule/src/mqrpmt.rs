//! Multi-query reverse private membership test from the cwPRF transcript.
//!
//! The sender holds set X, the receiver holds set Y. The receiver ends up
//! with an indication bit vector `b` with `b[i] = 1 ⇔ X[i] ∈ Y`, and the
//! sender learns nothing beyond `|Y|`. It is the cwPRF intersection
//! transcript run in reverse: the sender's double encodings of Y land in a
//! Bloom filter instead of being handed over element by element, and the
//! receiver probes the filter with its own double encodings of X, one per
//! index.
//!
//! The filter's false-positive rate is set to `2^{-σ}` so that membership
//! errors stay inside the statistical security budget.

use crate::{utils, Error};
use barnacle::{bloomfilter::BloomFilter, AbstractChannel, Block};
use curve25519_dalek::montgomery::MontgomeryPoint;
use log::debug;
use rand::{CryptoRng, RngCore};
use rayon::prelude::*;

pub use crate::psi::Params;

/// mqRPMT sender; holds the queried set X.
pub struct Sender {
    params: Params,
}

/// mqRPMT receiver; holds set Y and learns the indication vector.
pub struct Receiver {
    params: Params,
}

impl Sender {
    /// Create a sender from shared public parameters.
    pub fn new(params: Params) -> Self {
        Self { params }
    }

    /// Run the mqRPMT protocol over `inputs` (the set X). The receiver
    /// learns, for every index `i`, whether `inputs[i]` lies in its own set.
    pub fn send<C: AbstractChannel, RNG: CryptoRng + RngCore>(
        &mut self,
        inputs: &[Block],
        channel: &mut C,
        rng: &mut RNG,
    ) -> Result<(), Error> {
        if inputs.len() != self.params.sender_size {
            return Err(Error::InvalidInputLength);
        }
        let key = utils::gen_key(rng);

        // F_{k1}(x_i), in index order: the receiver's bit vector is aligned
        // with this order.
        let encoded = inputs
            .par_iter()
            .map(|x| utils::prf(&key, &utils::hash_to_curve(x)))
            .collect::<Vec<MontgomeryPoint>>();
        for pt in encoded.iter() {
            channel.write_mont(pt)?;
        }
        channel.flush()?;
        debug!("mqRPMT sender: {} encodings sent", encoded.len());

        let theirs = (0..self.params.receiver_size)
            .map(|_| channel.read_mont())
            .collect::<std::io::Result<Vec<MontgomeryPoint>>>()?;

        let tau = self.params.truncate_len;
        let products = theirs
            .par_iter()
            .map(|p| utils::prf(&key, p))
            .collect::<Vec<MontgomeryPoint>>();

        let p = 0.5f64.powi(self.params.stat_sec as i32);
        let mut filter = BloomFilter::new(self.params.receiver_size, p);
        for product in products.iter() {
            filter.insert(&product.as_bytes()[..tau]);
        }
        let bytes = filter.to_bytes();
        channel.write_u64(bytes.len() as u64)?;
        channel.write_bytes(&bytes)?;
        channel.flush()?;
        debug!(
            "mqRPMT sender: bloom filter of {} bytes over {} double encodings sent",
            bytes.len(),
            products.len()
        );
        Ok(())
    }
}

impl Receiver {
    /// Create a receiver from shared public parameters.
    pub fn new(params: Params) -> Self {
        Self { params }
    }

    /// Run the mqRPMT protocol over `inputs` (the set Y), returning one
    /// indication byte per element of the sender's set.
    pub fn receive<C: AbstractChannel, RNG: CryptoRng + RngCore>(
        &mut self,
        inputs: &[Block],
        channel: &mut C,
        rng: &mut RNG,
    ) -> Result<Vec<u8>, Error> {
        if inputs.len() != self.params.receiver_size {
            return Err(Error::InvalidInputLength);
        }
        let key = utils::gen_key(rng);

        let encoded = inputs
            .par_iter()
            .map(|y| utils::prf(&key, &utils::hash_to_curve(y)))
            .collect::<Vec<MontgomeryPoint>>();

        let theirs = (0..self.params.sender_size)
            .map(|_| channel.read_mont())
            .collect::<std::io::Result<Vec<MontgomeryPoint>>>()?;

        for pt in encoded.iter() {
            channel.write_mont(pt)?;
        }
        channel.flush()?;
        debug!("mqRPMT receiver: {} encodings sent", encoded.len());

        let tau = self.params.truncate_len;
        let probes = theirs
            .par_iter()
            .map(|p| utils::prf(&key, p).as_bytes()[..tau].to_vec())
            .collect::<Vec<Vec<u8>>>();

        let len = channel.read_u64()? as usize;
        let buf = channel.read_vec(len)?;
        let filter = BloomFilter::from_bytes(&buf)?;

        let bits = probes
            .iter()
            .map(|probe| filter.contains(probe) as u8)
            .collect::<Vec<u8>>();
        debug!(
            "mqRPMT receiver: indication vector of weight {} recovered",
            bits.iter().filter(|b| **b == 1).count()
        );
        Ok(bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barnacle::{unix_channel_pair, AesRng};
    use std::collections::HashSet;

    #[test]
    fn test_mqrpmt_indication_bits() {
        let mut rng = AesRng::new();
        let params = Params::new(128, 40, 7, 7);

        // Half of X comes from Y, the other half is fresh.
        let receiver_set = utils::rand_block_vec(128, &mut rng);
        let mut sender_set = utils::rand_block_vec(64, &mut rng);
        sender_set.extend_from_slice(&receiver_set[..64]);

        let expected = {
            let y: HashSet<Block> = receiver_set.iter().copied().collect();
            sender_set
                .iter()
                .map(|x| y.contains(x) as u8)
                .collect::<Vec<u8>>()
        };

        let sender_set_ = sender_set.clone();
        let (mut channel_s, mut channel_r) = unix_channel_pair();
        let handle = std::thread::spawn(move || {
            let mut rng = AesRng::new();
            let mut mq = Sender::new(params);
            mq.send(&sender_set_, &mut channel_s, &mut rng).unwrap();
        });
        let mut rng = AesRng::new();
        let mut mq = Receiver::new(params);
        let bits = mq.receive(&receiver_set, &mut channel_r, &mut rng).unwrap();
        handle.join().unwrap();

        assert_eq!(bits, expected);
    }
}
