use std::io::Write;

use log::debug;

use crate::cursor::{Cursor, BYTE_BITS};
use crate::error::{Error, PartialWrite, Result};

/// Writes bits to an underlying byte sink, one chunk at a time.
///
/// Bits are written from the leftmost byte of a chunk to the rightmost,
/// going from the most significant bit to the least significant bit of
/// each byte. A chunk goes to the sink as soon as it is full; a partially
/// filled one only when [`BitWriter::commit`] or
/// [`BitWriter::commit_pending`] is called.
///
/// Dropping the writer discards pending bits.
pub struct BitWriter<W> {
    /// Underlying byte sink.
    sink: W,

    /// Chunk being filled. Bits that were not written yet are always 0,
    /// so a partial chunk is zero-padded for free.
    buf: Vec<u8>,

    ix: Cursor,
}

impl<W: Write> BitWriter<W> {
    /// Creates a writer flushing `chunk_size` bytes to `sink` at a time.
    ///
    /// Panics if `chunk_size` is zero.
    pub fn new(sink: W, chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk size must be positive");
        Self {
            sink,
            buf: vec![0; chunk_size],
            ix: Cursor::new(),
        }
    }

    /// Writes a single bit.
    ///
    /// Returns how many bits went to the sink: the whole chunk if this
    /// bit filled it, 0 otherwise.
    pub fn write_bit(&mut self, bit: bool) -> Result<usize, PartialWrite> {
        if bit {
            self.buf[self.ix.byte_ix()] |= self.ix.mask();
        }

        if self.ix.advance(self.buf.len()) {
            self.flush_chunk()
        } else {
            Ok(0)
        }
    }

    /// Writes the lowest `length` bits of `bits`, bit `length - 1` first.
    /// Positions past the width of `bits` are written as 0.
    ///
    /// Returns how many bits went to the sink across all the chunks
    /// filled along the way. Stops at the first failed flush.
    pub fn write_bits(&mut self, bits: u64, length: usize) -> Result<usize, PartialWrite> {
        let mut written = 0;
        for offset in (0..length).rev() {
            let bit = offset < 64 && (bits >> offset) & 1 == 1;
            match self.write_bit(bit) {
                Ok(n) => written += n,
                Err(e) => {
                    return Err(PartialWrite {
                        written: written + e.written,
                        error: e.error,
                    })
                }
            }
        }
        Ok(written)
    }

    /// Sends the current chunk to the sink, however full it is. Bits not
    /// written yet go out as 0.
    ///
    /// Always accounts for the whole chunk, in bits.
    pub fn commit(&mut self) -> Result<usize, PartialWrite> {
        self.flush_chunk()
    }

    /// Like [`BitWriter::commit`], but does nothing if no bit was written
    /// since the last flush. Safe to call once at the end of the output,
    /// whether or not it ended on a chunk boundary.
    pub fn commit_pending(&mut self) -> Result<usize, PartialWrite> {
        if self.has_pending_bits() {
            self.commit()
        } else {
            Ok(0)
        }
    }

    /// Whether bits were written since the last flush.
    pub fn has_pending_bits(&self) -> bool {
        !self.ix.is_start()
    }

    /// Number of bits written since the last flush.
    pub fn pending_bits(&self) -> usize {
        self.ix.index()
    }

    /// Number of bytes sent to the sink per flush.
    pub fn chunk_size(&self) -> usize {
        self.buf.len()
    }

    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    /// Gives the sink back. Pending bits are lost; commit them first.
    pub fn into_inner(self) -> W {
        self.sink
    }

    fn flush_chunk(&mut self) -> Result<usize, PartialWrite> {
        let written = self.buf.len() * BYTE_BITS;
        debug!(
            "flush_chunk: writing {} bytes, {} bits pending",
            self.buf.len(),
            self.ix.index()
        );

        let res = write_chunk(&mut self.sink, &self.buf);

        // The chunk is gone either way. A failed writer is not retried.
        for b in self.buf.iter_mut() {
            *b = 0;
        }
        self.ix.reset();

        match res {
            Ok(()) => Ok(written),
            Err(error) => {
                debug!("flush_chunk: sink failed: {}", error);
                Err(PartialWrite { written, error })
            }
        }
    }
}

/// Hands the whole of `chunk` to `sink`, one `write` call after another.
fn write_chunk<W: Write>(sink: &mut W, mut chunk: &[u8]) -> Result<()> {
    while !chunk.is_empty() {
        match sink.write(chunk)? {
            0 => return Err(Error::EndOfStream),
            n => chunk = &chunk[n..],
        }
    }
    Ok(())
}
