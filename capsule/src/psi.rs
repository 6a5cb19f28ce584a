//! Private set intersection from a commutative weak PRF (cf.
//! <https://eprint.iacr.org/2021/1159> for the key-agreement view).
//!
//! `F_k(x) = X25519(k, H(x))` where `H` hashes a block to a curve25519
//! point encoding. Both parties encode their sets under their own key, swap
//! encodings, and apply their key again; equal items collide in
//! `F_{k1k2}`. The sender truncates the double encodings to `τ` bytes
//! before returning them, which keeps correctness up to statistical
//! security `σ` against the `n_S · n_R` off-intersection pairs while
//! shrinking the last message.
//!
//! The message order is fixed — sender: send, receive, send; receiver:
//! receive, send, receive — and must not be rearranged, since the channel
//! is a single bidirectional stream.

use crate::{utils, Error};
use barnacle::{AbstractChannel, Block};
use curve25519_dalek::montgomery::MontgomeryPoint;
use itertools::Itertools;
use log::debug;
use rand::{CryptoRng, RngCore};
use rayon::prelude::*;
use std::collections::HashSet;

/// Public parameters for the cwPRF protocols.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Params {
    /// Statistical security parameter σ (default 40).
    pub stat_sec: usize,
    /// Computational security parameter κ (default 128).
    pub comp_sec: usize,
    /// log₂ of the sender's set size.
    pub log_sender_size: usize,
    /// The sender's set size.
    pub sender_size: usize,
    /// log₂ of the receiver's set size.
    pub log_receiver_size: usize,
    /// The receiver's set size.
    pub receiver_size: usize,
    /// The truncation length τ in bytes.
    pub truncate_len: usize,
}

impl Params {
    /// Derive parameters from the security levels and log set sizes.
    ///
    /// The truncation length is `(σ + log n_S + log n_R + 7) / 8` bytes,
    /// following the SpOT-light analysis of PRF-output truncation.
    pub fn new(
        comp_sec: usize,
        stat_sec: usize,
        log_sender_size: usize,
        log_receiver_size: usize,
    ) -> Self {
        Params {
            stat_sec,
            comp_sec,
            log_sender_size,
            sender_size: 1 << log_sender_size,
            log_receiver_size,
            receiver_size: 1 << log_receiver_size,
            truncate_len: (stat_sec + log_sender_size + log_receiver_size + 7) / 8,
        }
    }

    /// Serialize as seven little-endian `u64`s:
    /// `σ ‖ κ ‖ log n_S ‖ n_S ‖ log n_R ‖ n_R ‖ τ`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let fields = [
            self.stat_sec,
            self.comp_sec,
            self.log_sender_size,
            self.sender_size,
            self.log_receiver_size,
            self.receiver_size,
            self.truncate_len,
        ];
        let mut out = Vec::with_capacity(56);
        for f in fields {
            out.extend_from_slice(&(f as u64).to_le_bytes());
        }
        out
    }

    /// Decode parameters serialized with [`Params::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != 56 {
            return Err(Error::SerializationError(
                "cwPRF parameters must be 56 bytes".to_string(),
            ));
        }
        let mut fields = [0usize; 7];
        for (i, f) in fields.iter_mut().enumerate() {
            *f = u64::from_le_bytes(bytes[i * 8..(i + 1) * 8].try_into().unwrap()) as usize;
        }
        Ok(Params {
            stat_sec: fields[0],
            comp_sec: fields[1],
            log_sender_size: fields[2],
            sender_size: fields[3],
            log_receiver_size: fields[4],
            receiver_size: fields[5],
            truncate_len: fields[6],
        })
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

/// Private set intersection sender.
pub struct Sender {
    params: Params,
}

/// Private set intersection receiver.
pub struct Receiver {
    params: Params,
}

impl Sender {
    /// Create a sender from shared public parameters.
    pub fn new(params: Params) -> Self {
        Self { params }
    }

    /// Run the PSI protocol over `inputs`. The receiver learns the
    /// intersection; the sender learns nothing.
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

        let encoded = inputs
            .par_iter()
            .map(|y| utils::prf(&key, &utils::hash_to_curve(y)))
            .collect::<Vec<MontgomeryPoint>>();
        for pt in encoded.iter() {
            channel.write_mont(pt)?;
        }
        channel.flush()?;
        debug!("cwPRF PSI sender: {} encodings sent", encoded.len());

        let theirs = (0..self.params.receiver_size)
            .map(|_| channel.read_mont())
            .collect::<std::io::Result<Vec<MontgomeryPoint>>>()?;

        let products = theirs
            .par_iter()
            .map(|p| utils::prf(&key, p))
            .collect::<Vec<MontgomeryPoint>>();
        let tau = self.params.truncate_len;
        for p in products.iter() {
            channel.write_bytes(&p.as_bytes()[..tau])?;
        }
        channel.flush()?;
        debug!(
            "cwPRF PSI sender: {} double encodings truncated to {} bytes and sent",
            products.len(),
            tau
        );
        Ok(())
    }
}

impl Receiver {
    /// Create a receiver from shared public parameters.
    pub fn new(params: Params) -> Self {
        Self { params }
    }

    /// Run the PSI protocol over `inputs`, returning the intersection with
    /// the sender's set.
    pub fn receive<C: AbstractChannel, RNG: CryptoRng + RngCore>(
        &mut self,
        inputs: &[Block],
        channel: &mut C,
        rng: &mut RNG,
    ) -> Result<Vec<Block>, Error> {
        if inputs.len() != self.params.receiver_size {
            return Err(Error::InvalidInputLength);
        }
        let key = utils::gen_key(rng);

        let encoded = inputs
            .par_iter()
            .map(|x| utils::prf(&key, &utils::hash_to_curve(x)))
            .collect::<Vec<MontgomeryPoint>>();

        let theirs = (0..self.params.sender_size)
            .map(|_| channel.read_mont())
            .collect::<std::io::Result<Vec<MontgomeryPoint>>>()?;

        for pt in encoded.iter() {
            channel.write_mont(pt)?;
        }
        channel.flush()?;
        debug!("cwPRF PSI receiver: {} encodings sent", encoded.len());

        let tau = self.params.truncate_len;
        let prf_set = theirs
            .par_iter()
            .map(|p| utils::prf(&key, p).as_bytes()[..tau].to_vec())
            .collect::<HashSet<Vec<u8>>>();

        let truncs = (0..self.params.receiver_size)
            .map(|_| channel.read_vec(tau))
            .collect::<std::io::Result<Vec<Vec<u8>>>>()?;

        let intersection = inputs
            .iter()
            .zip(truncs.into_iter())
            .filter(|(_, t)| prf_set.contains(t))
            .map(|(x, _)| *x)
            .collect_vec();
        debug!(
            "cwPRF PSI receiver: intersection of size {} recovered",
            intersection.len()
        );
        Ok(intersection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barnacle::{unix_channel_pair, AesRng};
    use std::collections::HashSet;

    fn run_psi(
        params: Params,
        sender_set: Vec<Block>,
        receiver_set: Vec<Block>,
    ) -> Vec<Block> {
        let (mut channel_s, mut channel_r) = unix_channel_pair();
        let handle = std::thread::spawn(move || {
            let mut rng = AesRng::new();
            let mut psi = Sender::new(params);
            psi.send(&sender_set, &mut channel_s, &mut rng).unwrap();
        });
        let mut rng = AesRng::new();
        let mut psi = Receiver::new(params);
        let intersection = psi
            .receive(&receiver_set, &mut channel_r, &mut rng)
            .unwrap();
        handle.join().unwrap();
        intersection
    }

    #[test]
    fn test_psi_empty_intersection() {
        let params = Params::new(128, 40, 0, 0);
        assert_eq!(params.truncate_len, 5);
        let intersection = run_psi(
            params,
            vec![Block::from_u64s(0, 1)],
            vec![Block::from_u64s(0, 2)],
        );
        assert!(intersection.is_empty());
    }

    #[test]
    fn test_psi_full_overlap() {
        let params = Params::new(128, 40, 4, 4);
        let set = (0..16).map(|i| Block::from_u64s(0, i)).collect::<Vec<_>>();
        let intersection = run_psi(params, set.clone(), set.clone());
        assert_eq!(
            intersection.iter().collect::<HashSet<_>>(),
            set.iter().collect::<HashSet<_>>()
        );
    }

    #[test]
    fn test_psi_partial_overlap() {
        let mut rng = AesRng::new();
        let params = Params::new(128, 40, 6, 6);
        let shared = utils::rand_block_vec(32, &mut rng);
        let mut sender_set = utils::rand_block_vec(32, &mut rng);
        let mut receiver_set = utils::rand_block_vec(32, &mut rng);
        sender_set.extend_from_slice(&shared);
        receiver_set.extend_from_slice(&shared);
        let intersection = run_psi(params, sender_set, receiver_set);
        assert_eq!(
            intersection.into_iter().collect::<HashSet<_>>(),
            shared.into_iter().collect::<HashSet<_>>()
        );
    }

    #[test]
    fn test_psi_rejects_wrong_input_size() {
        let params = Params::new(128, 40, 4, 4);
        let mut rng = AesRng::new();
        let (mut channel_s, _channel_r) = unix_channel_pair();
        let mut psi = Sender::new(params);
        let too_small = utils::rand_block_vec(8, &mut rng);
        assert!(matches!(
            psi.send(&too_small, &mut channel_s, &mut rng),
            Err(Error::InvalidInputLength)
        ));
    }

    #[test]
    fn test_params_roundtrip() {
        let params = Params::new(128, 40, 10, 12);
        let params_ = Params::from_bytes(&params.to_bytes()).unwrap();
        assert_eq!(params, params_);
        assert!(Params::from_bytes(&params.to_bytes()[..40]).is_err());
    }
}
