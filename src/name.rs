use std::borrow::Cow;
use std::fmt;
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::chunk::{self, HEADER_SIZE};
use crate::error::{Error, Result};
use crate::io::{StreamRead, StreamWrite};

/// Size of a name field on the wire, terminator included.
pub const NAME_LEN: usize = 64;

/// Material or texture file name that fits a 64 byte C string field.
///
/// The bytes are kept exactly as stored, so names written by tools using a
/// single-byte codepage are written back unchanged. Text views decode them
/// as UTF-8, replacing invalid sequences. Every `Name`, constructed or
/// decoded, holds at most 63 bytes and no NUL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Name(Vec<u8>);

impl Name {
    /// Creates a name from text, failing if it does not fit the field.
    pub fn new(value: impl Into<String>) -> Result<Self> {
        Self::from_bytes(value.into().into_bytes())
    }

    /// Creates a name from raw field bytes, failing if they do not fit the
    /// field.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.contains(&0) {
            return Err(Error::InteriorNul);
        }
        if bytes.len() + 1 > NAME_LEN {
            return Err(Error::StringTooLong { max: NAME_LEN });
        }
        Ok(Self(bytes))
    }

    /// The stored bytes, without terminator.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The name as text; bytes that are not UTF-8 show as U+FFFD.
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }

    /// True for the empty name, which marks an absent texture map.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reads a NUL-terminated name field.
    pub(crate) fn read<S: Read + ?Sized>(stream: &mut S) -> Result<Self> {
        Ok(Self(stream.read_c_string(NAME_LEN)?))
    }

    /// Writes a complete `tag` chunk holding this name.
    pub(crate) fn write_chunk<S: Write + ?Sized>(&self, stream: &mut S, tag: u16) -> Result<()> {
        // At most NAME_LEN - 1 bytes.
        let size = HEADER_SIZE + self.0.len() as u32 + 1;
        chunk::write_header(stream, tag, size)?;
        stream.write_c_string(&self.0, NAME_LEN)
    }
}

impl TryFrom<String> for Name {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Name {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Name> for String {
    fn from(name: Name) -> Self {
        match String::from_utf8(name.0) {
            Ok(text) => text,
            Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
        }
    }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}
