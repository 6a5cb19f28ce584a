//! `otter` provides oblivious transfer for the PSI/PSU suite: a Naor-Pinkas
//! base OT over the Ristretto group and the ALSZ OT extension on top of it,
//! together with the bit-matrix transpose the extension is built around.

mod errors;
pub mod ot;
pub mod utils;

pub use crate::errors::Error;
