//! Private set union: mqRPMT composed with OT extension.
//!
//! The receiver first learns the indication vector `b` over the sender's
//! set X, then uses it as its OT-extension choice vector: index `i` selects
//! the zero block when `X[i]` is already in Y (`b[i] = 1`) and `X[i]`
//! itself otherwise. Discarding the zero sentinel and appending the rest to
//! Y yields `X ∪ Y`. A genuine element colliding with the sentinel is
//! possible but negligible in the block size.

use crate::{mqrpmt, Error};
use barnacle::{AbstractChannel, Block};
use log::debug;
use otter::ot::{alsz, Receiver as OtReceiver, Sender as OtSender};
use rand::{CryptoRng, Rng};

/// Public parameters: the mqRPMT record plus the OT-extension record.
#[derive(Clone, Copy, Debug)]
pub struct Params {
    /// Parameters of the mqRPMT sub-protocol.
    pub mqrpmt: mqrpmt::Params,
    /// Parameters of the OT-extension sub-protocol.
    pub ote: alsz::Params,
}

impl Params {
    /// Derive parameters from the security levels and log set sizes. The
    /// sender's set size must be a multiple of 128 (the OT-extension
    /// dimension contract), so `log_sender_size` must be at least 7.
    pub fn new<RNG: CryptoRng + Rng>(
        comp_sec: usize,
        stat_sec: usize,
        log_sender_size: usize,
        log_receiver_size: usize,
        rng: &mut RNG,
    ) -> Self {
        Params {
            mqrpmt: mqrpmt::Params::new(comp_sec, stat_sec, log_sender_size, log_receiver_size),
            ote: alsz::Params::setup(rng),
        }
    }

    /// Serialize as the mqRPMT record followed by the OT-extension record.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = self.mqrpmt.to_bytes();
        out.extend_from_slice(&self.ote.to_bytes());
        out
    }

    /// Decode parameters serialized with [`Params::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != 56 + 41 {
            return Err(Error::SerializationError(
                "PSU parameters must be 97 bytes".to_string(),
            ));
        }
        Ok(Params {
            mqrpmt: mqrpmt::Params::from_bytes(&bytes[..56])?,
            ote: alsz::Params::from_bytes(&bytes[56..])?,
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

/// Private set union sender; holds set X and learns nothing but `|Y|`.
pub struct Sender {
    params: Params,
}

/// Private set union receiver; holds set Y and learns `X ∪ Y`.
pub struct Receiver {
    params: Params,
}

impl Sender {
    /// Create a sender from shared public parameters.
    pub fn new(params: Params) -> Self {
        Self { params }
    }

    /// Run the PSU protocol over `inputs` (the set X).
    pub fn send<C: AbstractChannel, RNG: CryptoRng + Rng>(
        &mut self,
        inputs: &[Block],
        channel: &mut C,
        rng: &mut RNG,
    ) -> Result<(), Error> {
        let mut mq = mqrpmt::Sender::new(self.params.mqrpmt);
        mq.send(inputs, channel, rng)?;
        debug!("PSU sender: mqRPMT finished");

        // For choice bit 0 (not in Y) the receiver obtains the element, for
        // choice bit 1 it obtains the zero sentinel.
        let ms = inputs
            .iter()
            .map(|x| (*x, Block::default()))
            .collect::<Vec<(Block, Block)>>();
        let mut ote = alsz::Sender::new(self.params.ote);
        ote.send(channel, &ms, rng)?;
        debug!("PSU sender: {} elements obliviously transferred", ms.len());
        Ok(())
    }
}

impl Receiver {
    /// Create a receiver from shared public parameters.
    pub fn new(params: Params) -> Self {
        Self { params }
    }

    /// Run the PSU protocol over `inputs` (the set Y), returning the union
    /// of both sets.
    pub fn receive<C: AbstractChannel, RNG: CryptoRng + Rng>(
        &mut self,
        inputs: &[Block],
        channel: &mut C,
        rng: &mut RNG,
    ) -> Result<Vec<Block>, Error> {
        let mut mq = mqrpmt::Receiver::new(self.params.mqrpmt);
        let bits = mq.receive(inputs, channel, rng)?;
        debug!("PSU receiver: mqRPMT finished");

        let choices = bits.iter().map(|b| *b != 0).collect::<Vec<bool>>();
        let mut ote = alsz::Receiver::new(self.params.ote);
        let transferred = ote.receive(channel, &choices, rng)?;

        let mut union = inputs.to_vec();
        union.extend(
            transferred
                .into_iter()
                .filter(|m| *m != Block::default()),
        );
        debug!("PSU receiver: union of size {} assembled", union.len());
        Ok(union)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testcase::TestCase;
    use barnacle::{unix_channel_pair, AesRng};

    fn sorted(mut v: Vec<Block>) -> Vec<Block> {
        v.sort();
        v
    }

    fn run_psu(log_sender_size: usize, log_receiver_size: usize) {
        let mut rng = AesRng::new();
        let params = Params::new(128, 40, log_sender_size, log_receiver_size, &mut rng);
        let tc = TestCase::gen(log_sender_size, log_receiver_size, &mut rng);

        let sender_set = tc.sender_set.clone();
        let (mut channel_s, mut channel_r) = unix_channel_pair();
        let handle = std::thread::spawn(move || {
            let mut rng = AesRng::new();
            let mut psu = Sender::new(params);
            psu.send(&sender_set, &mut channel_s, &mut rng).unwrap();
        });
        let mut rng = AesRng::new();
        let mut psu = Receiver::new(params);
        let union = psu
            .receive(&tc.receiver_set, &mut channel_r, &mut rng)
            .unwrap();
        handle.join().unwrap();

        assert_eq!(union.len(), tc.union_size);
        assert_eq!(sorted(union), sorted(tc.union));
    }

    #[test]
    fn test_psu_half_overlap() {
        run_psu(10, 10);
    }

    #[test]
    fn test_psu_asymmetric_sizes() {
        run_psu(7, 9);
    }

    #[test]
    fn test_params_roundtrip() {
        let mut rng = AesRng::new();
        let params = Params::new(128, 40, 10, 10, &mut rng);
        let params_ = Params::from_bytes(&params.to_bytes()).unwrap();
        assert_eq!(params.mqrpmt, params_.mqrpmt);
        assert_eq!(params.ote.base.g, params_.ote.base.g);
        assert!(Params::from_bytes(&params.to_bytes()[..96]).is_err());
    }
}
