#![allow(clippy::many_single_char_names)]

//! Two-party private set operations over 128-bit elements: a commutative
//! weak PRF private set intersection, a multi-query reverse private
//! membership test built from the same transcript, and private set union
//! from mqRPMT composed with OT extension.

mod errors;
pub mod mqrpmt;
pub mod psi;
pub mod psu;
pub mod testcase;
pub mod utils;

pub use crate::errors::Error;
