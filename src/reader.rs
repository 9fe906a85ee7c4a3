use std::io::Read;

use log::debug;

use crate::cursor::Cursor;
use crate::error::{Error, PartialRead, Result};

/// Reads bits from an underlying byte source, one chunk at a time.
///
/// Bits are read from the leftmost byte of a chunk to the rightmost, going
/// from the most significant bit to the least significant bit of each byte.
pub struct BitReader<R> {
    /// Underlying byte source.
    source: R,

    /// Bytes of the last refill. Its length is the chunk size.
    buf: Vec<u8>,

    ix: Cursor,

    /// How many bytes of `buf` the last refill actually delivered.
    avail: usize,

    /// What the source reported on the last refill. Surfaced once the
    /// delivered bytes run out.
    pending: Option<Error>,
}

impl<R: Read> BitReader<R> {
    /// Creates a reader fetching `chunk_size` bytes from `source` per refill.
    ///
    /// Panics if `chunk_size` is zero.
    pub fn new(source: R, chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk size must be positive");
        Self {
            source,
            buf: vec![0; chunk_size],
            ix: Cursor::new(),
            avail: 0,
            pending: None,
        }
    }

    /// Reads a single bit.
    ///
    /// Once the source is exhausted, the error it reported is returned by
    /// this and every later call, and the source is left alone.
    pub fn read_bit(&mut self) -> Result<bool> {
        if self.ix.is_start() && self.pending.is_none() {
            self.refill();
        }

        if self.avail == 0 || self.ix.byte_ix() >= self.avail {
            return Err(self.pending.clone().unwrap_or(Error::EndOfStream));
        }

        let bit = self.buf[self.ix.byte_ix()] & self.ix.mask() != 0;
        // Wrap at the delivered bytes, so a short chunk triggers the next
        // refill instead of exposing stale bytes.
        self.ix.advance(self.avail);
        Ok(bit)
    }

    /// Reads `n` bits into an integer, the first bit read ending up as the
    /// most significant one. Only the last 64 bits are kept for `n > 64`.
    ///
    /// On failure the bits collected so far are handed back in the error.
    pub fn read_bits(&mut self, n: usize) -> Result<u64, PartialRead> {
        let mut value = 0u64;
        for read in 0..n {
            match self.read_bit() {
                Ok(bit) => value = (value << 1) | bit as u64,
                Err(error) => return Err(PartialRead { value, read, error }),
            }
        }
        Ok(value)
    }

    /// Number of bytes fetched per refill.
    pub fn chunk_size(&self) -> usize {
        self.buf.len()
    }

    pub fn get_ref(&self) -> &R {
        &self.source
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.source
    }

    /// Gives the source back. Buffered bits that were not read are lost.
    pub fn into_inner(self) -> R {
        self.source
    }

    fn refill(&mut self) {
        match self.source.read(&mut self.buf) {
            Ok(0) => {
                debug!("refill: source exhausted");
                self.avail = 0;
                self.pending = Some(Error::EndOfStream);
            }
            Ok(n) => {
                debug!("refill: got {} of {} bytes", n, self.buf.len());
                self.avail = n;
            }
            Err(e) => {
                debug!("refill: source failed: {}", e);
                self.avail = 0;
                self.pending = Some(e.into());
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io;

    /// Hands out at most `step` bytes per read, and counts the reads.
    struct Trickle<'a> {
        data: &'a [u8],
        step: usize,
        reads: usize,
    }

    impl<'a> Trickle<'a> {
        fn new(data: &'a [u8], step: usize) -> Self {
            Trickle {
                data,
                step,
                reads: 0,
            }
        }
    }

    impl<'a> Read for Trickle<'a> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.reads += 1;
            let n = self.step.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    /// Fails on the first read and would succeed afterwards.
    struct Flaky {
        reads: usize,
    }

    impl Read for Flaky {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.reads += 1;
            if self.reads == 1 {
                Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
            } else {
                buf[0] = 0xFF;
                Ok(1)
            }
        }
    }

    #[test]
    fn test_read_bits_12_by_12() {
        let data = [0x12u8, 0x34, 0x56];
        let mut reader = BitReader::new(&data[..], 3);
        assert_eq!(reader.read_bits(12).unwrap(), 0x123);
        assert_eq!(reader.read_bits(12).unwrap(), 0x456);
    }

    #[test]
    fn test_read_bit_msb_first() {
        let data = [0b0101_1010u8, 0b1111_0000];
        let mut reader = BitReader::new(&data[..], 2);
        let expected = [
            false, true, false, true, true, false, true, false, true, true, true, true, false,
            false, false, false,
        ];
        for &bit in expected.iter() {
            assert_eq!(reader.read_bit().unwrap(), bit);
        }
        assert!(reader.read_bit().unwrap_err().is_end_of_stream());
    }

    #[test]
    fn test_read_bits_reports_progress() {
        let data = [0xABu8];
        let mut reader = BitReader::new(&data[..], 4);
        let err = reader.read_bits(12).unwrap_err();
        assert_eq!(err.value, 0xAB);
        assert_eq!(err.read, 8);
        assert!(err.error.is_end_of_stream());

        let err = reader.read_bits(3).unwrap_err();
        assert_eq!((err.value, err.read), (0, 0));
    }

    #[test]
    fn test_read_zero_bits() {
        let mut source = Trickle::new(&[0xFF], 1);
        let mut reader = BitReader::new(&mut source, 1);
        assert_eq!(reader.read_bits(0).unwrap(), 0);
        drop(reader);
        assert_eq!(source.reads, 0);
    }

    #[test]
    fn test_read_more_than_64_bits() {
        let data = [0xFFu8, 0xFF, 0x00, 0, 0, 0, 0, 0, 0, 0x01];
        let mut reader = BitReader::new(&data[..], 3);
        // Leading bits shift out of the accumulator.
        assert_eq!(reader.read_bits(80).unwrap(), 1);
        assert!(reader.read_bit().is_err());
    }

    #[test]
    fn test_short_chunk_stops_at_delivered_bytes() {
        // Chunk of 4, but only 3 bytes exist: the cursor lands exactly on
        // `avail` after 24 bits.
        let data = [0x12u8, 0x34, 0x56];
        let mut reader = BitReader::new(&data[..], 4);
        assert_eq!(reader.read_bits(24).unwrap(), 0x123456);
        assert!(reader.read_bit().unwrap_err().is_end_of_stream());
    }

    #[test]
    fn test_trickling_source() {
        // One byte per refill into a chunk of 4.
        let data = [0x12u8, 0x34, 0x56];
        let mut source = Trickle::new(&data, 1);
        let mut reader = BitReader::new(&mut source, 4);
        assert_eq!(reader.read_bits(20).unwrap(), 0x12345);
        assert_eq!(reader.read_bits(4).unwrap(), 0x6);
        let err = reader.read_bits(1).unwrap_err();
        assert_eq!(err.read, 0);
        drop(reader);
        assert_eq!(source.reads, 4);
    }

    #[test]
    fn test_error_replayed_without_reading_again() {
        let mut source = Flaky { reads: 0 };
        let mut reader = BitReader::new(&mut source, 2);
        for _ in 0..3 {
            match reader.read_bit() {
                Err(Error::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::ConnectionReset),
                other => panic!("unexpected {:?}", other),
            }
        }
        drop(reader);
        assert_eq!(source.reads, 1);
    }

    #[test]
    fn test_end_of_stream_replayed() {
        let mut source = Trickle::new(&[], 1);
        let mut reader = BitReader::new(&mut source, 2);
        assert!(reader.read_bit().unwrap_err().is_end_of_stream());
        assert!(reader.read_bits(5).unwrap_err().error.is_end_of_stream());
        drop(reader);
        assert_eq!(source.reads, 1);
    }

    #[test]
    #[should_panic]
    fn test_zero_chunk_size() {
        BitReader::new(&[0u8][..], 0);
    }

    #[quickcheck]
    fn test_exhaustion(bytes: Vec<u8>, chunk_size: u8, step: u8) -> bool {
        let chunk_size = chunk_size as usize % 16 + 1;
        let step = step as usize % 8 + 1;
        let mut reader = BitReader::new(Trickle::new(&bytes, step), chunk_size);

        let mut bits = vec![];
        while let Ok(bit) = reader.read_bit() {
            bits.push(bit);
        }

        let expected: Vec<bool> = bytes
            .iter()
            .flat_map(|&b| (0..8).rev().map(move |i| (b >> i) & 1 == 1))
            .collect();
        bits == expected
    }
}
