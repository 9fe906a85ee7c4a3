use std::{io, sync::Arc};

use thiserror::Error;

/// A failure reported by the underlying byte stream.
#[derive(Clone, Debug, Error)]
pub enum Error {
    /// The source has no more bytes to give, or the sink refused to
    /// accept any.
    #[error("end of byte stream")]
    EndOfStream,

    /// Any other I/O failure, as reported by the stream.
    #[error(transparent)]
    Io(Arc<io::Error>),
}

impl Error {
    /// The [`io::ErrorKind`] this error corresponds to.
    pub fn kind(&self) -> io::ErrorKind {
        match self {
            Error::EndOfStream => io::ErrorKind::UnexpectedEof,
            Error::Io(e) => e.kind(),
        }
    }

    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Error::EndOfStream)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(Arc::new(e))
    }
}

impl From<Error> for io::Error {
    fn from(e: Error) -> Self {
        io::Error::new(e.kind(), e)
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error of a multi-bit read, with the bits collected before the
/// stream failed.
#[derive(Clone, Debug, Error)]
#[error("{error} after reading {read} bits")]
pub struct PartialRead {
    /// Bits read so far, the first one being the most significant.
    pub value: u64,
    /// How many bits were read before the failure.
    pub read: usize,
    #[source]
    pub error: Error,
}

/// Error of a write, with the number of bits physically written up to
/// and including the failed flush.
#[derive(Clone, Debug, Error)]
#[error("{error} after writing {written} bits")]
pub struct PartialWrite {
    pub written: usize,
    #[source]
    pub error: Error,
}

impl From<PartialRead> for io::Error {
    fn from(e: PartialRead) -> Self {
        e.error.into()
    }
}

impl From<PartialWrite> for io::Error {
    fn from(e: PartialWrite) -> Self {
        e.error.into()
    }
}
