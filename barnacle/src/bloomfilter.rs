//! Implementation of a Bloom filter with a deterministic salt schedule.
//!
//! The filter is guaranteed to return `true` if an element is in the set,
//! and returns `true` with probability ~`p` (settable) if an item is not in
//! the set. Two parties constructing a filter from the same `(k, seed)` pair
//! derive identical salts, so a serialized filter can be queried remotely.

use rand::{rngs::StdRng, Rng, SeedableRng};
use sha2::{Digest, Sha256};

/// Errors produced when deserializing a Bloom filter.
#[derive(Debug)]
pub enum Error {
    /// The buffer is too short to contain the advertised filter.
    Truncated,
    /// The bit table length disagrees with the recorded table size.
    TableSizeMismatch {
        /// Expected number of table bytes.
        expected: usize,
        /// Number of bytes actually present.
        actual: usize,
    },
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Truncated => "truncated bloom filter encoding".fmt(f),
            Error::TableSizeMismatch { expected, actual } => write!(
                f,
                "bloom filter bit table size mismatch: expected {} bytes, got {}",
                expected, actual
            ),
        }
    }
}

/// The seed mixed into every salt. Derived once from a fixed pattern so both
/// parties of a protocol agree on it without communication.
pub const DEFAULT_SEED: u32 =
    (0xA5A5_A5A5_5A5A_5A5Au64.wrapping_mul(0xA5A5_A5A5).wrapping_add(1)) as u32;

// A distinct hash function need not be implementation-wise distinct: seeding
// a common keyed hash with different salts is adequate.
const PREDEFINED_SALTS: [u32; 128] = [
    0xAAAAAAAA, 0x55555555, 0x33333333, 0xCCCCCCCC, 0x66666666, 0x99999999, 0xB5B5B5B5, 0x4B4B4B4B,
    0xAA55AA55, 0x55335533, 0x33CC33CC, 0xCC66CC66, 0x66996699, 0x99B599B5, 0xB54BB54B, 0x4BAA4BAA,
    0xAA33AA33, 0x55CC55CC, 0x33663366, 0xCC99CC99, 0x66B566B5, 0x994B994B, 0xB5AAB5AA, 0xAAAAAA33,
    0x555555CC, 0x33333366, 0xCCCCCC99, 0x666666B5, 0x9999994B, 0xB5B5B5AA, 0xFFFFFFFF, 0xFFFF0000,
    0xB823D5EB, 0xC1191CDF, 0xF623AEB3, 0xDB58499F, 0xC8D42E70, 0xB173F616, 0xA91A5967, 0xDA427D63,
    0xB1E8A2EA, 0xF6C0D155, 0x4909FEA3, 0xA68CC6A7, 0xC395E782, 0xA26057EB, 0x0CD5DA28, 0x467C5492,
    0xF15E6982, 0x61C6FAD3, 0x9615E352, 0x6E9E355A, 0x689B563E, 0x0C9831A8, 0x6753C18B, 0xA622689B,
    0x8CA63C47, 0x42CC2884, 0x8E89919B, 0x6EDBD7D3, 0x15B6796C, 0x1D6FDFE4, 0x63FF9092, 0xE7401432,
    0xEFFE9412, 0xAEAEDF79, 0x9F245A31, 0x83C136FC, 0xC3DA4A8C, 0xA5112C8C, 0x5271F491, 0x9A948DAB,
    0xCEE59A8D, 0xB5F525AB, 0x59D13217, 0x24E7C331, 0x697C2103, 0x84B0A460, 0x86156DA9, 0xAEF2AC68,
    0x23243DA5, 0x3F649643, 0x5FA495A8, 0x67710DF8, 0x9A6C499E, 0xDCFB0227, 0x46A43433, 0x1832B07A,
    0xC46AFF3C, 0xB9C8FFF0, 0xC9500467, 0x34431BDF, 0xB652432B, 0xE367F12B, 0x427F4C1B, 0x224C006E,
    0x2E7E5A89, 0x96F99AA5, 0x0BEB452A, 0x2FD87C39, 0x74B2E1FB, 0x222EFD24, 0xF357F60C, 0x440FCB1E,
    0x8BBE030F, 0x6704DC29, 0x1144D12F, 0x948B1355, 0x6D8FD7E9, 0x1C11A014, 0xADD1592F, 0xFB3C712E,
    0xFC77642F, 0xF9C4CE8C, 0x31312FB9, 0x08B0DD79, 0x318FA6E7, 0xC040D23D, 0xC0589AA7, 0x0CA5C075,
    0xF874B172, 0x0CF914D5, 0x784D3280, 0x4E8CFEBC, 0xC569F575, 0xCDB2A091, 0x2CC016B4, 0x5C5F4421,
];

/// Derive the `hash_num` salts determined by `(hash_num, seed)`.
///
/// The first `min(hash_num, 128)` salts come from a fixed table and are mixed
/// in place with the seed; any further salts are drawn from a seeded `StdRng`
/// and de-duplicated against the ones already present.
pub fn derive_salts(hash_num: usize, seed: u32) -> Vec<u32> {
    if hash_num <= PREDEFINED_SALTS.len() {
        let mut salts = PREDEFINED_SALTS[..hash_num].to_vec();
        for i in 0..hash_num {
            salts[i] = salts[i]
                .wrapping_mul(salts[(i + 3) % hash_num])
                .wrapping_add(seed);
        }
        salts
    } else {
        let mut salts = PREDEFINED_SALTS.to_vec();
        let mut rng = StdRng::seed_from_u64(seed as u64);
        while salts.len() < hash_num {
            let salt = rng.gen::<u32>();
            if salt == 0 || salts.contains(&salt) {
                continue;
            }
            salts.push(salt);
        }
        salts
    }
}

#[inline]
fn keyed_hash(salt: u32, data: &[u8]) -> u64 {
    let mut h = Sha256::new();
    h.update(salt.to_le_bytes());
    h.update(data);
    let digest = h.finalize();
    u64::from_le_bytes(<[u8; 8]>::try_from(&digest[0..8]).unwrap())
}

/// A Bloom filter sized for `n` insertions at false-positive rate `p`.
pub struct BloomFilter {
    hash_num: u32,
    salts: Vec<u32>,
    /// Table size in bits; always a multiple of 8.
    table_size: u32,
    bit_table: Vec<u8>,
    seed: u32,
    inserted: u64,
}

impl BloomFilter {
    /// Create a filter that supports up to `n` insertions with false positive
    /// probability `p`.
    ///
    /// Uses `k = ⌈−log₂ p⌉` hash functions and `⌈1.44 · k · n⌉` table bits,
    /// rounded up to a byte boundary.
    pub fn new(n: usize, p: f64) -> Self {
        assert!(p > 0.0 && p < 1.0, "false positive rate must be in (0, 1)");
        let hash_num = (-p.log2()).ceil() as u32;
        let seed = DEFAULT_SEED;
        let salts = derive_salts(hash_num as usize, seed);
        let bits = (n as f64 * 1.44 * (-p.log2())).ceil() as u64;
        let table_size = ((bits + 7) / 8 * 8) as u32;
        BloomFilter {
            hash_num,
            salts,
            table_size,
            bit_table: vec![0u8; table_size as usize / 8],
            seed,
            inserted: 0,
        }
    }

    /// The number of bits in the table.
    pub fn len(&self) -> usize {
        self.table_size as usize
    }

    /// Whether any element has been inserted yet.
    pub fn is_empty(&self) -> bool {
        self.inserted == 0
    }

    /// The number of hash functions.
    pub fn num_hashes(&self) -> usize {
        self.hash_num as usize
    }

    /// The number of elements inserted so far.
    pub fn inserted(&self) -> u64 {
        self.inserted
    }

    /// The size of the serialized filter in bytes.
    pub fn object_size(&self) -> usize {
        3 * std::mem::size_of::<u32>() + self.table_size as usize / 8
    }

    /// Insert anything that can be viewed as a byte slice.
    pub fn insert<V: AsRef<[u8]> + ?Sized>(&mut self, value: &V) {
        let data = value.as_ref();
        for salt in self.salts.iter() {
            let bit_index = keyed_hash(*salt, data) % self.table_size as u64;
            self.bit_table[(bit_index >> 3) as usize] |= 1 << (bit_index & 0x07);
        }
        self.inserted += 1;
    }

    /// Insert every element of an iterator.
    pub fn extend<V: AsRef<[u8]>, I: IntoIterator<Item = V>>(&mut self, values: I) {
        for v in values {
            self.insert(&v);
        }
    }

    /// Check whether an item exists in the filter. Never returns `false` for
    /// an inserted item; returns `true` for a non-member with probability ~`p`.
    pub fn contains<V: AsRef<[u8]> + ?Sized>(&self, value: &V) -> bool {
        let data = value.as_ref();
        for salt in self.salts.iter() {
            let bit_index = keyed_hash(*salt, data) % self.table_size as u64;
            if self.bit_table[(bit_index >> 3) as usize] & (1 << (bit_index & 0x07)) == 0 {
                return false;
            }
        }
        true
    }

    /// Reset the filter to empty.
    pub fn clear(&mut self) {
        for byte in self.bit_table.iter_mut() {
            *byte = 0;
        }
        self.inserted = 0;
    }

    /// Serialize as `hash_num ‖ seed ‖ table_size ‖ bit_table`, all
    /// little-endian, no trailer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.object_size());
        out.extend_from_slice(&self.hash_num.to_le_bytes());
        out.extend_from_slice(&self.seed.to_le_bytes());
        out.extend_from_slice(&self.table_size.to_le_bytes());
        out.extend_from_slice(&self.bit_table);
        out
    }

    /// Deserialize a filter, rederiving its salts from the recorded
    /// `(hash_num, seed)`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() < 12 {
            return Err(Error::Truncated);
        }
        let hash_num = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
        let seed = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
        let table_size = u32::from_le_bytes(bytes[8..12].try_into().unwrap());
        let expected = table_size as usize / 8;
        let actual = bytes.len() - 12;
        if expected != actual {
            return Err(Error::TableSizeMismatch { expected, actual });
        }
        Ok(BloomFilter {
            hash_num,
            salts: derive_salts(hash_num as usize, seed),
            table_size,
            bit_table: bytes[12..].to_vec(),
            seed,
            inserted: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AesRng, Block};
    use rand::Rng;

    #[test]
    fn test_salts_deterministic() {
        let a = derive_salts(40, DEFAULT_SEED);
        let b = derive_salts(40, DEFAULT_SEED);
        assert_eq!(a, b);
        let c = derive_salts(40, DEFAULT_SEED ^ 1);
        assert_ne!(a, c);
        let d = derive_salts(200, DEFAULT_SEED);
        assert_eq!(d.len(), 200);
        assert_eq!(d, derive_salts(200, DEFAULT_SEED));
    }

    #[test]
    fn test_membership() {
        let mut rng = AesRng::new();
        let mut filter = BloomFilter::new(1000, 1e-3);
        for _ in 0..128 {
            let x = rng.gen::<Block>();
            filter.insert(&x);
            assert!(filter.contains(&x));
        }
        assert_eq!(filter.inserted(), 128);
    }

    #[test]
    fn test_sizing() {
        let filter = BloomFilter::new(10_000, 1e-3);
        assert_eq!(filter.num_hashes(), 10);
        assert_eq!(filter.len() % 8, 0);
        assert_eq!(filter.object_size(), 12 + filter.len() / 8);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let mut filter = BloomFilter::new(10_000, 1e-3);
        let words: Vec<String> = (0..10_000).map(|i| format!("item-{}", i)).collect();
        filter.extend(words.iter());
        filter.insert(&"mnop");

        let buffer = filter.to_bytes();
        let filter2 = BloomFilter::from_bytes(&buffer).unwrap();
        assert!(filter2.contains(&"mnop"));
        for w in words.iter().take(512) {
            assert!(filter2.contains(w));
        }
        assert_eq!(filter2.to_bytes(), buffer);
    }

    #[test]
    fn test_false_positive_rate() {
        let p = 1e-3;
        let n = 10_000;
        let mut filter = BloomFilter::new(n, p);
        for i in 0..n {
            filter.insert(&format!("member-{}", i));
        }
        let trials = 20_000;
        let false_positives = (0..trials)
            .filter(|i| filter.contains(&format!("outsider-{}", i)))
            .count();
        // Expected p * trials = 20; triple gives plenty of slack.
        assert!(false_positives as f64 <= 3.0 * p * trials as f64);
    }

    #[test]
    fn test_from_bytes_rejects_bad_lengths() {
        let filter = BloomFilter::new(100, 0.01);
        let buffer = filter.to_bytes();
        assert!(BloomFilter::from_bytes(&buffer[..8]).is_err());
        assert!(BloomFilter::from_bytes(&buffer[..buffer.len() - 1]).is_err());
    }
}
