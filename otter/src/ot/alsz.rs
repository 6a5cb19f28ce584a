//! Implementation of the Asharov-Lindell-Schneider-Zohner oblivious transfer
//! extension protocol (cf. <https://eprint.iacr.org/2013/552>).
//!
//! The extension turns 128 base OTs into `N` OTs on block-sized messages.
//! The receiver expands two seed vectors into tall pseudorandom matrices `T`
//! and `U`, transfers the seeds under base-OT keys, and sends the correction
//! matrix `P = T ⊕ U ⊕ r`. The sender reconstructs `Q` column-wise from the
//! seeds it can decrypt, folds `s ∧ P` back in row-wise after the bit-matrix
//! transpose, and derives one key pair per extended OT. Network operations
//! are strictly ordered: base OT, then encrypted seeds, then `P`, then (for
//! the full OT) the masked payload vectors.

use crate::{
    errors::Error,
    ot::{
        naor_pinkas, Receiver as OtReceiver, RandomReceiver, RandomSender, Sender as OtSender,
    },
    utils,
};
use barnacle::{utils as butils, AbstractChannel, AesHash, AesRng, Block, SemiHonest};
use log::debug;
use rand::{CryptoRng, Rng, RngCore, SeedableRng};
use rayon::prelude::*;

/// The number of base OTs, equal to the column count of the extension
/// matrices and the computational security parameter.
pub const BASE_LEN: usize = 128;

/// Check that the extension matrix dimensions are legal: both the number of
/// extended OTs and the number of base OTs must be multiples of 128.
pub fn check_parameters(rows: usize, cols: usize) -> Result<(), Error> {
    if rows == 0 || rows % 128 != 0 || cols % 128 != 0 {
        return Err(Error::InvalidDimensions { rows, cols });
    }
    Ok(())
}

/// Public parameters for the extension: the base-OT parameters plus the
/// (fixed) base OT count. The `malicious` flag is carried on the wire for
/// compatibility but only the semi-honest protocol exists.
#[derive(Clone, Copy, Debug)]
pub struct Params {
    /// Base OT public parameters.
    pub base: naor_pinkas::Params,
    /// Whether the malicious-secure variant was requested. Always `false`.
    pub malicious: bool,
    /// The number of base OTs. Always [`BASE_LEN`].
    pub base_len: usize,
}

impl Params {
    /// Sample fresh public parameters.
    pub fn setup<RNG: CryptoRng + Rng>(rng: &mut RNG) -> Self {
        Params {
            base: naor_pinkas::Params::setup(rng),
            malicious: false,
            base_len: BASE_LEN,
        }
    }

    /// Serialize as `base ‖ malicious(u8) ‖ base_len(u64)`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(41);
        out.extend_from_slice(&self.base.to_bytes());
        out.push(self.malicious as u8);
        out.extend_from_slice(&(self.base_len as u64).to_le_bytes());
        out
    }

    /// Decode parameters serialized with [`Params::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != 41 {
            return Err(Error::SerializationError(
                "OT extension parameters must be 41 bytes".to_string(),
            ));
        }
        let base = naor_pinkas::Params::from_bytes(&bytes[..32])?;
        let malicious = bytes[32] != 0;
        let base_len = u64::from_le_bytes(bytes[33..41].try_into().unwrap()) as usize;
        if base_len != BASE_LEN {
            return Err(Error::SerializationError(format!(
                "unsupported base OT count {}",
                base_len
            )));
        }
        Ok(Params {
            base,
            malicious,
            base_len,
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

/// Oblivious transfer extension sender.
pub struct Sender {
    params: Params,
    hash: AesHash,
}

/// Oblivious transfer extension receiver.
pub struct Receiver {
    params: Params,
    hash: AesHash,
}

impl Sender {
    /// Create a sender from shared public parameters.
    pub fn new(params: Params) -> Self {
        Self {
            params,
            hash: AesHash::fixed_key(),
        }
    }

    /// Run the extension up to key derivation, returning one `(k0, k1)` pair
    /// per extended OT. The receiver's matching call learns `k_{r[i]}` and
    /// nothing about the other key.
    fn send_setup<C: AbstractChannel, RNG: CryptoRng + Rng>(
        &mut self,
        channel: &mut C,
        m: usize,
        rng: &mut RNG,
    ) -> Result<Vec<(Block, Block)>, Error> {
        let nrows = m;
        let ncols = self.params.base_len;
        check_parameters(nrows, ncols)?;
        debug_assert_eq!(ncols, BASE_LEN);

        // Base OT, playing the receiver with a random choice vector s.
        let s = (0..ncols).map(|_| rng.gen::<bool>()).collect::<Vec<bool>>();
        let mut base = naor_pinkas::Receiver::new(self.params.base);
        let ks = base.receive(channel, &s, rng)?;
        debug!("OTE sender: {} base-OT keys received", ncols);

        // Encrypted seeds; the choice bit picks which one decrypts.
        let c0s = channel.read_blocks(ncols)?;
        let c1s = channel.read_blocks(ncols)?;
        let seeds = s
            .iter()
            .zip(ks.into_iter())
            .zip(c0s.into_iter().zip(c1s.into_iter()))
            .map(|((b, k), (c0, c1))| if *b { c1 ^ k } else { c0 ^ k })
            .collect::<Vec<Block>>();

        // Expand each seed into a column of nrows bits; the matrix is stored
        // column-per-chunk, i.e. as its own ncols x nrows transpose.
        let mut qs = vec![0u8; ncols * nrows / 8];
        qs.par_chunks_mut(nrows / 8)
            .zip(seeds.par_iter())
            .for_each(|(col, seed)| {
                AesRng::from_seed(*seed).fill_bytes(col);
            });
        let qs = utils::transpose(&qs, ncols, nrows)?;

        let mut ps = vec![0u8; ncols * nrows / 8];
        channel.read_bytes(&mut ps)?;
        let ps = utils::transpose(&ps, ncols, nrows)?;
        debug!("OTE sender: matrices Q and P transposed");

        let mut s_ = [0u8; 16];
        s_.copy_from_slice(&utils::boolvec_to_u8vec(&s));
        let s_ = Block::from(s_);

        let hash = &self.hash;
        let out = (0..nrows)
            .into_par_iter()
            .map(|i| {
                let q: [u8; 16] = qs[i * 16..(i + 1) * 16].try_into().unwrap();
                let p: [u8; 16] = ps[i * 16..(i + 1) * 16].try_into().unwrap();
                let q = Block::from(q) ^ (s_ & Block::from(p));
                let k0 = hash.cr_hash(Block::from(i as u128), q);
                let k1 = hash.cr_hash(Block::from(i as u128), q ^ s_);
                (k0, k1)
            })
            .collect::<Vec<(Block, Block)>>();
        Ok(out)
    }
}

impl Receiver {
    /// Create a receiver from shared public parameters.
    pub fn new(params: Params) -> Self {
        Self {
            params,
            hash: AesHash::fixed_key(),
        }
    }

    /// Run the extension up to key derivation, returning key `k_{r[i]}` per
    /// extended OT for choice vector `r`.
    fn receive_setup<C: AbstractChannel, RNG: CryptoRng + Rng>(
        &mut self,
        channel: &mut C,
        r: &[bool],
        rng: &mut RNG,
    ) -> Result<Vec<Block>, Error> {
        let nrows = r.len();
        let ncols = self.params.base_len;
        check_parameters(nrows, ncols)?;
        debug_assert_eq!(ncols, BASE_LEN);

        let t_seeds = (0..ncols).map(|_| rng.gen::<Block>()).collect::<Vec<_>>();
        let u_seeds = (0..ncols).map(|_| rng.gen::<Block>()).collect::<Vec<_>>();
        let r_ = utils::boolvec_to_u8vec(r);

        // T and the correction matrix P = T ⊕ U ⊕ r, column by column.
        let mut ts = vec![0u8; ncols * nrows / 8];
        let mut ps = vec![0u8; ncols * nrows / 8];
        ts.par_chunks_mut(nrows / 8)
            .zip(ps.par_chunks_mut(nrows / 8))
            .zip(t_seeds.par_iter().zip(u_seeds.par_iter()))
            .for_each(|((t, p), (t_seed, u_seed))| {
                AesRng::from_seed(*t_seed).fill_bytes(t);
                AesRng::from_seed(*u_seed).fill_bytes(p);
                butils::xor_inplace(p, t);
                butils::xor_inplace(p, &r_);
            });

        // Base OT, playing the sender with fresh key pairs.
        let k_pairs = (0..ncols)
            .map(|_| (rng.gen::<Block>(), rng.gen::<Block>()))
            .collect::<Vec<(Block, Block)>>();
        let mut base = naor_pinkas::Sender::new(self.params.base);
        base.send(channel, &k_pairs, rng)?;
        debug!("OTE receiver: {} base-OT key pairs transferred", ncols);

        // Seeds encrypted under the base-OT keys, then the correction matrix.
        let c0s = k_pairs
            .iter()
            .zip(t_seeds.iter())
            .map(|((k0, _), seed)| *k0 ^ *seed)
            .collect::<Vec<Block>>();
        let c1s = k_pairs
            .iter()
            .zip(u_seeds.iter())
            .map(|((_, k1), seed)| *k1 ^ *seed)
            .collect::<Vec<Block>>();
        channel.write_blocks(&c0s)?;
        channel.write_blocks(&c1s)?;
        channel.write_bytes(&ps)?;
        channel.flush()?;
        debug!("OTE receiver: encrypted seeds and correction matrix sent");

        let ts = utils::transpose(&ts, ncols, nrows)?;
        let hash = &self.hash;
        let out = (0..nrows)
            .into_par_iter()
            .map(|i| {
                let t: [u8; 16] = ts[i * 16..(i + 1) * 16].try_into().unwrap();
                hash.cr_hash(Block::from(i as u128), Block::from(t))
            })
            .collect::<Vec<Block>>();
        Ok(out)
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
        let ks = self.send_setup(channel, inputs.len(), rng)?;
        let c0s = inputs
            .par_iter()
            .zip(ks.par_iter())
            .map(|(input, k)| input.0 ^ k.0)
            .collect::<Vec<Block>>();
        let c1s = inputs
            .par_iter()
            .zip(ks.par_iter())
            .map(|(input, k)| input.1 ^ k.1)
            .collect::<Vec<Block>>();
        channel.write_blocks(&c0s)?;
        channel.write_blocks(&c1s)?;
        channel.flush()?;
        debug!("OTE sender: {} masked message pairs sent", inputs.len());
        Ok(())
    }
}

impl RandomSender for Sender {
    fn send_random<C: AbstractChannel, RNG: CryptoRng + Rng>(
        &mut self,
        channel: &mut C,
        m: usize,
        rng: &mut RNG,
    ) -> Result<Vec<(Block, Block)>, Error> {
        self.send_setup(channel, m, rng)
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
        let ks = self.receive_setup(channel, inputs, rng)?;
        let c0s = channel.read_blocks(inputs.len())?;
        let c1s = channel.read_blocks(inputs.len())?;
        let out = inputs
            .iter()
            .zip(ks.into_iter())
            .zip(c0s.into_iter().zip(c1s.into_iter()))
            .map(|((b, k), (c0, c1))| if *b { c1 ^ k } else { c0 ^ k })
            .collect();
        Ok(out)
    }
}

impl RandomReceiver for Receiver {
    fn receive_random<C: AbstractChannel, RNG: CryptoRng + Rng>(
        &mut self,
        channel: &mut C,
        inputs: &[bool],
        rng: &mut RNG,
    ) -> Result<Vec<Block>, Error> {
        self.receive_setup(channel, inputs, rng)
    }
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "ALSZ Sender")
    }
}

impl std::fmt::Display for Receiver {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "ALSZ Receiver")
    }
}

impl SemiHonest for Sender {}
impl SemiHonest for Receiver {}

#[cfg(test)]
mod tests {
    use super::*;
    use barnacle::AesRng;

    #[test]
    fn test_check_parameters() {
        assert!(check_parameters(1024, 128).is_ok());
        assert!(check_parameters(1024 + 1, 128).is_err());
        assert!(check_parameters(0, 128).is_err());
        assert!(check_parameters(1024, 64).is_err());
    }

    #[test]
    fn test_params_roundtrip() {
        let mut rng = AesRng::new();
        let params = Params::setup(&mut rng);
        let bytes = params.to_bytes();
        assert_eq!(bytes.len(), 41);
        let params_ = Params::from_bytes(&bytes).unwrap();
        assert_eq!(params.base.g, params_.base.g);
        assert_eq!(params.malicious, params_.malicious);
        assert_eq!(params.base_len, params_.base_len);

        let mut bad = bytes.clone();
        bad[33] = 64; // unsupported base OT count
        assert!(Params::from_bytes(&bad).is_err());
    }
}
