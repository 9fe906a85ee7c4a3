/// Number of bits in a byte of the chunk buffer.
pub const BYTE_BITS: usize = 8;

/// Position of the current bit inside a chunk buffer.
///
/// Index goes from the leftmost byte of the buffer, and from the most
/// significant bit to the least significant bit of each byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Cursor {
    ix: usize,
}

impl Cursor {
    pub(crate) fn new() -> Self {
        Cursor { ix: 0 }
    }

    pub(crate) fn index(&self) -> usize {
        self.ix
    }

    /// Index of the current byte.
    pub(crate) fn byte_ix(&self) -> usize {
        self.ix / BYTE_BITS
    }

    /// Index of the current bit within the byte, 0 being the most
    /// significant one.
    pub(crate) fn bit_ix(&self) -> usize {
        self.ix % BYTE_BITS
    }

    /// Mask selecting the current bit in the current byte.
    pub(crate) fn mask(&self) -> u8 {
        0x80 >> self.bit_ix()
    }

    /// Moves to the next bit, wrapping around after `limit_bytes` bytes.
    /// Returns true if the cursor went back to the start of the buffer.
    pub(crate) fn advance(&mut self, limit_bytes: usize) -> bool {
        debug_assert!(limit_bytes > 0);
        self.ix = (self.ix + 1) % (limit_bytes * BYTE_BITS);
        self.ix == 0
    }

    pub(crate) fn is_start(&self) -> bool {
        self.ix == 0
    }

    pub(crate) fn reset(&mut self) {
        self.ix = 0;
    }
}
