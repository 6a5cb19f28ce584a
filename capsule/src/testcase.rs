//! Reproducible test cases for the set-union protocols.
//!
//! A test case fixes both parties' sets, the expected indication vector, and
//! the expected union, and can be written to a file so a sender and a
//! receiver process started separately agree on their inputs.
//!
//! File layout: `log n_S ‖ log n_R ‖ n_S ‖ n_R ‖ |∩| ‖ |∪|` as little-endian
//! `u64`s, followed by `X[n_S]` and `Y[n_R]` as 16-byte blocks, the
//! indication bits as one byte each, and the union blocks.

use crate::{utils, Error};
use barnacle::Block;
use rand::{seq::SliceRandom, CryptoRng, Rng};

/// A fixed protocol input with its expected outputs.
#[derive(Clone, Debug)]
pub struct TestCase {
    /// log₂ of the sender's set size.
    pub log_sender_size: usize,
    /// log₂ of the receiver's set size.
    pub log_receiver_size: usize,
    /// The sender's set size.
    pub sender_size: usize,
    /// The receiver's set size.
    pub receiver_size: usize,
    /// The intersection cardinality (the indication vector's Hamming weight).
    pub intersection_size: usize,
    /// The union cardinality.
    pub union_size: usize,
    /// The sender's set X.
    pub sender_set: Vec<Block>,
    /// The receiver's set Y.
    pub receiver_set: Vec<Block>,
    /// `indication_bits[i] = 1` iff `X[i] ∈ Y`.
    pub indication_bits: Vec<u8>,
    /// The expected union X ∪ Y.
    pub union: Vec<Block>,
}

impl TestCase {
    /// Generate a test case whose intersection size is half the smaller set:
    /// a random indication vector of that Hamming weight is drawn, and the
    /// flagged sender elements are overwritten with receiver elements.
    pub fn gen<RNG: CryptoRng + Rng>(
        log_sender_size: usize,
        log_receiver_size: usize,
        rng: &mut RNG,
    ) -> Self {
        let sender_size = 1 << log_sender_size;
        let receiver_size = 1 << log_receiver_size;
        let mut sender_set = utils::rand_block_vec(sender_size, rng);
        let mut receiver_set = utils::rand_block_vec(receiver_size, rng);

        let intersection_size = std::cmp::min(sender_size, receiver_size) / 2;
        let union_size = sender_size + receiver_size - intersection_size;

        let mut indication_bits = vec![0u8; sender_size];
        for b in indication_bits.iter_mut().take(intersection_size) {
            *b = 1;
        }
        indication_bits.shuffle(rng);

        let mut union = receiver_set.clone();
        let mut j = 0;
        for (i, bit) in indication_bits.iter().enumerate() {
            if *bit == 1 {
                sender_set[i] = receiver_set[j];
                j += 1;
            } else {
                union.push(sender_set[i]);
            }
        }
        receiver_set.shuffle(rng);

        TestCase {
            log_sender_size,
            log_receiver_size,
            sender_size,
            receiver_size,
            intersection_size,
            union_size,
            sender_set,
            receiver_set,
            indication_bits,
            union,
        }
    }

    /// Serialize the test case.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for f in [
            self.log_sender_size,
            self.log_receiver_size,
            self.sender_size,
            self.receiver_size,
            self.intersection_size,
            self.union_size,
        ] {
            out.extend_from_slice(&(f as u64).to_le_bytes());
        }
        for x in self.sender_set.iter() {
            out.extend_from_slice(x.as_ref());
        }
        for y in self.receiver_set.iter() {
            out.extend_from_slice(y.as_ref());
        }
        out.extend_from_slice(&self.indication_bits);
        for u in self.union.iter() {
            out.extend_from_slice(u.as_ref());
        }
        out
    }

    /// Decode a test case serialized with [`TestCase::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let short = || Error::SerializationError("truncated test case".to_string());
        if bytes.len() < 48 {
            return Err(short());
        }
        let mut fields = [0usize; 6];
        for (i, f) in fields.iter_mut().enumerate() {
            *f = u64::from_le_bytes(bytes[i * 8..(i + 1) * 8].try_into().unwrap()) as usize;
        }
        let [log_sender_size, log_receiver_size, sender_size, receiver_size, intersection_size, union_size] =
            fields;
        let expected =
            48 + 16 * (sender_size + receiver_size + union_size) + sender_size;
        if bytes.len() != expected {
            return Err(short());
        }

        fn read_blocks(bytes: &[u8], offset: &mut usize, n: usize) -> Vec<Block> {
            let mut out = Vec::with_capacity(n);
            for _ in 0..n {
                // Length already validated, so the slice is always 16 bytes.
                out.push(Block::try_from_slice(&bytes[*offset..*offset + 16]).unwrap());
                *offset += 16;
            }
            out
        }

        let mut offset = 48;
        let sender_set = read_blocks(bytes, &mut offset, sender_size);
        let receiver_set = read_blocks(bytes, &mut offset, receiver_size);
        let indication_bits = bytes[offset..offset + sender_size].to_vec();
        offset += sender_size;
        let union = read_blocks(bytes, &mut offset, union_size);

        Ok(TestCase {
            log_sender_size,
            log_receiver_size,
            sender_size,
            receiver_size,
            intersection_size,
            union_size,
            sender_set,
            receiver_set,
            indication_bits,
            union,
        })
    }

    /// Write the test case to a file.
    pub fn save(&self, path: &str) -> Result<(), Error> {
        std::fs::write(path, self.to_bytes())?;
        Ok(())
    }

    /// Read a test case previously written with [`TestCase::save`].
    pub fn load(path: &str) -> Result<Self, Error> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barnacle::AesRng;
    use std::collections::HashSet;

    #[test]
    fn test_gen_consistent() {
        let mut rng = AesRng::new();
        let tc = TestCase::gen(8, 7, &mut rng);
        assert_eq!(tc.sender_size, 256);
        assert_eq!(tc.receiver_size, 128);
        assert_eq!(tc.intersection_size, 64);
        assert_eq!(tc.union_size, 256 + 128 - 64);
        assert_eq!(tc.union.len(), tc.union_size);

        let y: HashSet<Block> = tc.receiver_set.iter().copied().collect();
        for (x, bit) in tc.sender_set.iter().zip(tc.indication_bits.iter()) {
            assert_eq!(y.contains(x) as u8, *bit);
        }
        let union: HashSet<Block> = tc.union.iter().copied().collect();
        for x in tc.sender_set.iter().chain(tc.receiver_set.iter()) {
            assert!(union.contains(x));
        }
    }

    #[test]
    fn test_roundtrip() {
        let mut rng = AesRng::new();
        let tc = TestCase::gen(7, 8, &mut rng);
        let bytes = tc.to_bytes();
        let tc_ = TestCase::from_bytes(&bytes).unwrap();
        assert_eq!(tc.sender_set, tc_.sender_set);
        assert_eq!(tc.receiver_set, tc_.receiver_set);
        assert_eq!(tc.indication_bits, tc_.indication_bits);
        assert_eq!(tc.union, tc_.union);
        assert_eq!(tc.intersection_size, tc_.intersection_size);
        assert!(TestCase::from_bytes(&bytes[..bytes.len() - 1]).is_err());
    }
}
