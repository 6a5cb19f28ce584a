use crate::Block;
use curve25519_dalek::{
    montgomery::MontgomeryPoint,
    ristretto::{CompressedRistretto, RistrettoPoint},
    scalar::Scalar,
};
use std::{
    cell::RefCell,
    io::{Read, Result, Write},
    rc::Rc,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
};

/// A trait for managing I/O. `AbstractChannel`s are clonable, and provide
/// read/write capabilities for both common and protocol-specific types.
///
/// The underlying stream is assumed reliable and ordered; a read that hits
/// end-of-file mid-message is surfaced as an error by the caller.
pub trait AbstractChannel {
    /// Read a slice of `u8`s from the channel.
    fn read_bytes(&mut self, bytes: &mut [u8]) -> Result<()>;
    /// Write a slice of `u8`s to the channel.
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()>;
    /// Flush the channel.
    fn flush(&mut self) -> Result<()>;
    /// Clone the channel.
    fn clone(&self) -> Self
    where
        Self: Sized;

    /// Read `nbytes` from the channel, and return it as a `Vec`.
    fn read_vec(&mut self, nbytes: usize) -> Result<Vec<u8>> {
        let mut data = vec![0; nbytes];
        self.read_bytes(&mut data)?;
        Ok(data)
    }

    /// Write a `bool` to the channel.
    #[inline(always)]
    fn write_bool(&mut self, b: bool) -> Result<()> {
        self.write_bytes(&[b as u8])
    }

    /// Read a `bool` from the channel.
    #[inline(always)]
    fn read_bool(&mut self) -> Result<bool> {
        let mut data = [0u8; 1];
        self.read_bytes(&mut data)?;
        Ok(data[0] != 0)
    }

    /// Write a `u8` to the channel.
    #[inline(always)]
    fn write_u8(&mut self, s: u8) -> Result<()> {
        self.write_bytes(&[s])
    }

    /// Read a `u8` from the channel.
    #[inline(always)]
    fn read_u8(&mut self) -> Result<u8> {
        let mut data = [0];
        self.read_bytes(&mut data)?;
        Ok(data[0])
    }

    /// Write a `u32` to the channel.
    #[inline(always)]
    fn write_u32(&mut self, s: u32) -> Result<()> {
        self.write_bytes(&s.to_le_bytes())
    }

    /// Read a `u32` from the channel.
    #[inline(always)]
    fn read_u32(&mut self) -> Result<u32> {
        let mut data = [0u8; 4];
        self.read_bytes(&mut data)?;
        Ok(u32::from_le_bytes(data))
    }

    /// Write a `u64` to the channel.
    #[inline(always)]
    fn write_u64(&mut self, s: u64) -> Result<()> {
        self.write_bytes(&s.to_le_bytes())
    }

    /// Read a `u64` from the channel.
    #[inline(always)]
    fn read_u64(&mut self) -> Result<u64> {
        let mut data = [0u8; 8];
        self.read_bytes(&mut data)?;
        Ok(u64::from_le_bytes(data))
    }

    /// Write a `usize` to the channel as a `u64`.
    #[inline(always)]
    fn write_usize(&mut self, s: usize) -> Result<()> {
        self.write_u64(s as u64)
    }

    /// Read a `usize` from the channel.
    #[inline(always)]
    fn read_usize(&mut self) -> Result<usize> {
        Ok(self.read_u64()? as usize)
    }

    /// Write a `Block` to the channel.
    #[inline(always)]
    fn write_block(&mut self, b: &Block) -> Result<()> {
        self.write_bytes(b.as_ref())
    }

    /// Read a `Block` from the channel.
    #[inline(always)]
    fn read_block(&mut self) -> Result<Block> {
        let mut v = Block::default();
        self.read_bytes(v.as_mut())?;
        Ok(v)
    }

    /// Write a slice of `Block`s to the channel.
    #[inline(always)]
    fn write_blocks(&mut self, blocks: &[Block]) -> Result<()> {
        for b in blocks.iter() {
            self.write_block(b)?;
        }
        Ok(())
    }

    /// Read `n` `Block`s from the channel.
    #[inline(always)]
    fn read_blocks(&mut self, n: usize) -> Result<Vec<Block>> {
        (0..n).map(|_| self.read_block()).collect()
    }

    /// Write a `RistrettoPoint` to the channel.
    #[inline(always)]
    fn write_pt(&mut self, pt: &RistrettoPoint) -> Result<()> {
        self.write_bytes(pt.compress().as_bytes())
    }

    /// Read a `RistrettoPoint` from the channel.
    #[inline(always)]
    fn read_pt(&mut self) -> Result<RistrettoPoint> {
        let mut data = [0u8; 32];
        self.read_bytes(&mut data)?;
        match CompressedRistretto(data).decompress() {
            Some(pt) => Ok(pt),
            None => Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "unable to decompress ristretto point",
            )),
        }
    }

    /// Write a `Scalar` to the channel.
    #[inline(always)]
    fn write_scalar(&mut self, s: &Scalar) -> Result<()> {
        self.write_bytes(s.as_bytes())
    }

    /// Read a `Scalar` from the channel.
    #[inline(always)]
    fn read_scalar(&mut self) -> Result<Scalar> {
        let mut data = [0u8; 32];
        self.read_bytes(&mut data)?;
        match Option::<Scalar>::from(Scalar::from_canonical_bytes(data)) {
            Some(s) => Ok(s),
            None => Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "non-canonical scalar encoding",
            )),
        }
    }

    /// Write a Montgomery-form curve25519 point to the channel.
    #[inline(always)]
    fn write_mont(&mut self, pt: &MontgomeryPoint) -> Result<()> {
        self.write_bytes(pt.as_bytes())
    }

    /// Read a Montgomery-form curve25519 point from the channel.
    #[inline(always)]
    fn read_mont(&mut self) -> Result<MontgomeryPoint> {
        let mut data = [0u8; 32];
        self.read_bytes(&mut data)?;
        Ok(MontgomeryPoint(data))
    }
}

/// A standard read/write channel that implements `AbstractChannel`.
pub struct Channel<R, W> {
    reader: Rc<RefCell<R>>,
    writer: Rc<RefCell<W>>,
}

impl<R: Read, W: Write> Channel<R, W> {
    /// Make a new `Channel` from a `reader` and a `writer`.
    pub fn new(reader: R, writer: W) -> Self {
        let reader = Rc::new(RefCell::new(reader));
        let writer = Rc::new(RefCell::new(writer));
        Self { reader, writer }
    }

    /// Return a reader object wrapped in `Rc<RefCell>`.
    pub fn reader(self) -> Rc<RefCell<R>> {
        self.reader
    }

    /// Return a writer object wrapped in `Rc<RefCell>`.
    pub fn writer(self) -> Rc<RefCell<W>> {
        self.writer
    }
}

impl<R: Read, W: Write> AbstractChannel for Channel<R, W> {
    #[inline(always)]
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.borrow_mut().write_all(bytes)
    }

    #[inline(always)]
    fn read_bytes(&mut self, bytes: &mut [u8]) -> Result<()> {
        self.reader.borrow_mut().read_exact(bytes)
    }

    #[inline(always)]
    fn flush(&mut self) -> Result<()> {
        self.writer.borrow_mut().flush()
    }

    #[inline(always)]
    fn clone(&self) -> Self {
        Self {
            reader: self.reader.clone(),
            writer: self.writer.clone(),
        }
    }
}

/// A `Send + Sync` channel that additionally accounts for the traffic in
/// each direction, so a party can report the total communication of a
/// protocol session once it finishes. Clones share both the streams and the
/// counters.
pub struct SyncChannel<R, W> {
    reader: Arc<Mutex<R>>,
    writer: Arc<Mutex<W>>,
    nbytes_read: Arc<AtomicU64>,
    nbytes_written: Arc<AtomicU64>,
}

impl<R: Read, W: Write> SyncChannel<R, W> {
    /// Make a new `SyncChannel` from a `reader` and a `writer`, with both
    /// traffic counters at zero.
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader: Arc::new(Mutex::new(reader)),
            writer: Arc::new(Mutex::new(writer)),
            nbytes_read: Arc::new(AtomicU64::new(0)),
            nbytes_written: Arc::new(AtomicU64::new(0)),
        }
    }

    /// The number of bytes received over this channel so far.
    pub fn bytes_read(&self) -> u64 {
        self.nbytes_read.load(Ordering::Relaxed)
    }

    /// The number of bytes sent over this channel so far.
    pub fn bytes_written(&self) -> u64 {
        self.nbytes_written.load(Ordering::Relaxed)
    }

    /// The session's total communication, both directions combined.
    pub fn total_bytes(&self) -> u64 {
        self.bytes_read() + self.bytes_written()
    }
}

impl<R: Read, W: Write> AbstractChannel for SyncChannel<R, W> {
    #[inline(always)]
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.lock().unwrap().write_all(bytes)?;
        self.nbytes_written
            .fetch_add(bytes.len() as u64, Ordering::Relaxed);
        Ok(())
    }

    #[inline(always)]
    fn read_bytes(&mut self, bytes: &mut [u8]) -> Result<()> {
        self.reader.lock().unwrap().read_exact(bytes)?;
        self.nbytes_read
            .fetch_add(bytes.len() as u64, Ordering::Relaxed);
        Ok(())
    }

    #[inline(always)]
    fn flush(&mut self) -> Result<()> {
        self.writer.lock().unwrap().flush()
    }

    #[inline(always)]
    fn clone(&self) -> Self {
        Self {
            reader: self.reader.clone(),
            writer: self.writer.clone(),
            nbytes_read: self.nbytes_read.clone(),
            nbytes_written: self.nbytes_written.clone(),
        }
    }
}

/// The channel both parties of an in-process protocol test run over: one
/// end of a Unix socket pair, buffered in each direction.
#[cfg(unix)]
pub type UnixChannel = SyncChannel<
    std::io::BufReader<std::os::unix::net::UnixStream>,
    std::io::BufWriter<std::os::unix::net::UnixStream>,
>;

/// Create the two connected ends of a [`UnixChannel`]; one goes to the
/// party under test on the main thread, the other to its peer on a spawned
/// thread.
#[cfg(unix)]
pub fn unix_channel_pair() -> (UnixChannel, UnixChannel) {
    use std::io::{BufReader, BufWriter};
    use std::os::unix::net::UnixStream;

    fn wrap(stream: UnixStream) -> UnixChannel {
        let reader = BufReader::new(stream.try_clone().unwrap());
        SyncChannel::new(reader, BufWriter::new(stream))
    }
    let (left, right) = UnixStream::pair().unwrap();
    (wrap(left), wrap(right))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_sync_channel_counts_traffic() {
        let (mut left, mut right) = unix_channel_pair();
        let handle = std::thread::spawn(move || {
            left.write_block(&Block::from(7u128)).unwrap();
            left.write_u64(42).unwrap();
            left.flush().unwrap();
            left.bytes_written()
        });
        assert_eq!(right.read_block().unwrap(), Block::from(7u128));
        assert_eq!(right.read_u64().unwrap(), 42);
        let written = handle.join().unwrap();
        assert_eq!(written, 24);
        assert_eq!(right.bytes_read(), 24);
        assert_eq!(right.bytes_written(), 0);
        assert_eq!(right.total_bytes(), 24);
    }

    #[test]
    fn test_clones_share_counters() {
        let (mut left, mut right) = unix_channel_pair();
        let mut left_ = AbstractChannel::clone(&left);
        left.write_u32(1).unwrap();
        left_.write_u32(2).unwrap();
        left.flush().unwrap();
        assert_eq!(left.bytes_written(), 8);
        assert_eq!(left_.bytes_written(), 8);
        assert_eq!(right.read_u32().unwrap(), 1);
        assert_eq!(right.read_u32().unwrap(), 2);
    }
}
