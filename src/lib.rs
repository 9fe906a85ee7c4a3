//! Bit-granular access over byte streams.
//!
//! [`BitReader`] pulls bits out of any [`std::io::Read`], and [`BitWriter`]
//! packs bits into any [`std::io::Write`]. Both buffer a fixed-size chunk of
//! bytes between calls to the underlying stream. Bits are processed from
//! the most significant to the least significant bit of each byte, bytes
//! from left to right.
//!
//! ```
//! use bitio::{BitReader, BitWriter};
//!
//! let mut out: Vec<u8> = vec![];
//! let mut writer = BitWriter::new(&mut out, 2);
//! writer.write_bits(0xFFF, 12).unwrap();
//! assert_eq!(writer.commit_pending().unwrap(), 16);
//! drop(writer);
//! assert_eq!(out, [0xFF, 0xF0]);
//!
//! let mut reader = BitReader::new(&out[..], 2);
//! assert_eq!(reader.read_bits(12).unwrap(), 0xFFF);
//! ```

#[cfg(test)]
extern crate quickcheck;
#[cfg(test)]
#[macro_use(quickcheck)]
extern crate quickcheck_macros;

mod cursor;
pub use cursor::BYTE_BITS;

mod error;
pub use error::{Error, PartialRead, PartialWrite, Result};

mod reader;
pub use reader::BitReader;

mod writer;
pub use writer::BitWriter;
