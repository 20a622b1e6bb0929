use std::io;

use thiserror::Error;

/// Result type alias for chunk codec operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while reading or writing chunk streams.
///
/// Every variant is fatal to the decode or encode call in progress. Unknown
/// chunk tags are never reported through this type; they are skipped.
#[derive(Error, Debug)]
pub enum Error {
    /// The stream ended before an expected field.
    #[error("unexpected end of stream")]
    Truncated,

    /// A specific chunk tag was required but another one was found.
    #[error("expected chunk {expected:#06x}, found {found:#06x}")]
    BadTag { expected: u16, found: u16 },

    /// A fixed-size string field has no terminator within its maximum length.
    #[error("string exceeds {max} bytes including terminator")]
    StringTooLong { max: usize },

    /// A string contains a NUL byte and cannot be written as a C string.
    #[error("string contains an interior NUL byte")]
    InteriorNul,

    /// The underlying stream rejected a write.
    #[error("write failed: {0}")]
    WriteFailed(#[source] io::Error),

    /// A chunk header or chunk payload is inconsistent with its declared size.
    #[error("corrupt chunk {tag:#06x} at offset {offset}: {reason}")]
    CorruptChunk {
        tag: u16,
        offset: u64,
        reason: String,
    },

    /// Any other I/O failure (seek, open, flush).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Maps a read failure, folding end-of-stream into [`Error::Truncated`].
    pub(crate) fn from_read(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Self::Truncated
        } else {
            Self::Io(err)
        }
    }

    pub(crate) fn corrupt(tag: u16, offset: u64, reason: impl Into<String>) -> Self {
        Self::CorruptChunk {
            tag,
            offset,
            reason: reason.into(),
        }
    }
}
