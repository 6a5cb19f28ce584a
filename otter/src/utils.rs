//! Bit-matrix utilities shared by the OT extension.
//!
//! Bit addressing is fixed once for the whole crate: bit `(r, c)` of an
//! `nrows x ncols` matrix lives at byte `r * ncols / 8 + c / 8`, bit
//! position `7 - (c % 8)` (MSB-first within each byte). The OT extension is
//! brittle to this convention; it must match the packing in
//! `barnacle::utils`.

use crate::errors::Error;

/// Transpose an 8x8 bit matrix packed row-major into a `u64`, row 0 in the
/// most significant byte, MSB-first within each byte.
#[inline(always)]
fn transpose8x8(x: u64) -> u64 {
    let x = x & 0xAA55_AA55_AA55_AA55
        | (x & 0x00AA_00AA_00AA_00AA) << 7
        | (x >> 7) & 0x00AA_00AA_00AA_00AA;
    let x = x & 0xCCCC_3333_CCCC_3333
        | (x & 0x0000_CCCC_0000_CCCC) << 14
        | (x >> 14) & 0x0000_CCCC_0000_CCCC;
    x & 0xF0F0_F0F0_0F0F_0F0F
        | (x & 0x0000_0000_F0F0_F0F0) << 28
        | (x >> 28) & 0x0000_0000_F0F0_F0F0
}

/// Transpose an `nrows x ncols` bit matrix. Both dimensions must be
/// multiples of 8.
pub fn transpose(m: &[u8], nrows: usize, ncols: usize) -> Result<Vec<u8>, Error> {
    if nrows % 8 != 0 || ncols % 8 != 0 || m.len() != nrows * ncols / 8 {
        return Err(Error::InvalidDimensions {
            rows: nrows,
            cols: ncols,
        });
    }
    let mut out = vec![0u8; nrows * ncols / 8];
    let in_stride = ncols / 8;
    let out_stride = nrows / 8;
    for rb in 0..nrows / 8 {
        for cb in 0..ncols / 8 {
            let mut block = [0u8; 8];
            for (i, b) in block.iter_mut().enumerate() {
                *b = m[(rb * 8 + i) * in_stride + cb];
            }
            let t = transpose8x8(u64::from_be_bytes(block)).to_be_bytes();
            for (j, b) in t.iter().enumerate() {
                out[(cb * 8 + j) * out_stride + rb] = *b;
            }
        }
    }
    Ok(out)
}

/// Pack a bool vector into bytes, MSB-first, matching the transpose's bit
/// addressing.
#[inline]
pub fn boolvec_to_u8vec(bv: &[bool]) -> Vec<u8> {
    barnacle::utils::pack_bits(bv)
}

/// Unpack bytes into a bool vector, MSB-first.
#[inline]
pub fn u8vec_to_boolvec(v: &[u8]) -> Vec<bool> {
    barnacle::utils::unpack_bits(v, v.len() * 8)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Bit-addressed reference implementation of the same contract.
    fn transpose_naive(m: &[u8], nrows: usize, ncols: usize) -> Vec<u8> {
        let mut out = vec![0u8; nrows * ncols / 8];
        for r in 0..nrows {
            for c in 0..ncols {
                let bit = m[r * ncols / 8 + c / 8] >> (7 - c % 8) & 1;
                out[c * nrows / 8 + r / 8] |= bit << (7 - r % 8);
            }
        }
        out
    }

    fn rand_matrix(nrows: usize, ncols: usize) -> Vec<u8> {
        (0..nrows * ncols / 8)
            .map(|_| rand::random::<u8>())
            .collect()
    }

    fn check(nrows: usize, ncols: usize) {
        let m = rand_matrix(nrows, ncols);
        let t = transpose(&m, nrows, ncols).unwrap();
        assert_eq!(t, transpose_naive(&m, nrows, ncols));
        let tt = transpose(&t, ncols, nrows).unwrap();
        assert_eq!(tt, m);
    }

    #[test]
    fn test_transpose() {
        check(8, 8);
        check(16, 16);
        check(24, 16);
        check(128, 16);
        check(128, 128);
        check(128, 1 << 12);
        check(32, 64);
    }

    #[test]
    fn test_transpose_bit_exact() {
        let nrows = 16;
        let ncols = 32;
        let m = rand_matrix(nrows, ncols);
        let t = transpose(&m, nrows, ncols).unwrap();
        for r in 0..nrows {
            for c in 0..ncols {
                let a = m[r * ncols / 8 + c / 8] >> (7 - c % 8) & 1;
                let b = t[c * nrows / 8 + r / 8] >> (7 - r % 8) & 1;
                assert_eq!(a, b, "mismatch at ({}, {})", r, c);
            }
        }
    }

    #[test]
    fn test_transpose_rejects_bad_dimensions() {
        let m = vec![0u8; 4];
        assert!(transpose(&m, 4, 8).is_err());
        assert!(transpose(&m, 8, 4).is_err());
        let m = vec![0u8; 15];
        assert!(transpose(&m, 8, 16).is_err());
    }

    #[test]
    fn test_boolvec_roundtrip() {
        let v = (0..128)
            .map(|_| rand::random::<bool>())
            .collect::<Vec<bool>>();
        let v_ = boolvec_to_u8vec(&v);
        let v__ = u8vec_to_boolvec(&v_);
        assert_eq!(v, v__);
    }
}
