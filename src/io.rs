//! Little-endian primitives over byte streams.
//!
//! [`StreamRead`] and [`StreamWrite`] are blanket-implemented for every
//! `std::io::Read` / `std::io::Write`, so files, `Cursor`s and buffered
//! wrappers can be handed to the codec directly. Each call moves the stream
//! cursor by exactly the number of bytes it consumes or produces.

use std::io::{Read, Write};

use byteorder::LittleEndian;

use crate::error::{Error, Result};

/// Reads wire primitives from a stream.
pub trait StreamRead: Read {
    fn read_u8(&mut self) -> Result<u8> {
        byteorder::ReadBytesExt::read_u8(self).map_err(Error::from_read)
    }

    fn read_i8(&mut self) -> Result<i8> {
        byteorder::ReadBytesExt::read_i8(self).map_err(Error::from_read)
    }

    fn read_u16(&mut self) -> Result<u16> {
        byteorder::ReadBytesExt::read_u16::<LittleEndian>(self).map_err(Error::from_read)
    }

    fn read_i16(&mut self) -> Result<i16> {
        byteorder::ReadBytesExt::read_i16::<LittleEndian>(self).map_err(Error::from_read)
    }

    fn read_u32(&mut self) -> Result<u32> {
        byteorder::ReadBytesExt::read_u32::<LittleEndian>(self).map_err(Error::from_read)
    }

    fn read_i32(&mut self) -> Result<i32> {
        byteorder::ReadBytesExt::read_i32::<LittleEndian>(self).map_err(Error::from_read)
    }

    fn read_f32(&mut self) -> Result<f32> {
        byteorder::ReadBytesExt::read_f32::<LittleEndian>(self).map_err(Error::from_read)
    }

    /// Reads a NUL-terminated byte string occupying at most `max_len` bytes,
    /// terminator included. The terminator is not returned.
    ///
    /// The bytes are returned as stored; no text encoding is assumed.
    fn read_c_string(&mut self, max_len: usize) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        loop {
            if bytes.len() >= max_len {
                return Err(Error::StringTooLong { max: max_len });
            }
            match self.read_u8()? {
                0 => return Ok(bytes),
                byte => bytes.push(byte),
            }
        }
    }
}

impl<R: Read + ?Sized> StreamRead for R {}

/// Writes wire primitives to a stream.
pub trait StreamWrite: Write {
    fn write_u8(&mut self, value: u8) -> Result<()> {
        byteorder::WriteBytesExt::write_u8(self, value).map_err(Error::WriteFailed)
    }

    fn write_i8(&mut self, value: i8) -> Result<()> {
        byteorder::WriteBytesExt::write_i8(self, value).map_err(Error::WriteFailed)
    }

    fn write_u16(&mut self, value: u16) -> Result<()> {
        byteorder::WriteBytesExt::write_u16::<LittleEndian>(self, value)
            .map_err(Error::WriteFailed)
    }

    fn write_i16(&mut self, value: i16) -> Result<()> {
        byteorder::WriteBytesExt::write_i16::<LittleEndian>(self, value)
            .map_err(Error::WriteFailed)
    }

    fn write_u32(&mut self, value: u32) -> Result<()> {
        byteorder::WriteBytesExt::write_u32::<LittleEndian>(self, value)
            .map_err(Error::WriteFailed)
    }

    fn write_i32(&mut self, value: i32) -> Result<()> {
        byteorder::WriteBytesExt::write_i32::<LittleEndian>(self, value)
            .map_err(Error::WriteFailed)
    }

    fn write_f32(&mut self, value: f32) -> Result<()> {
        byteorder::WriteBytesExt::write_f32::<LittleEndian>(self, value)
            .map_err(Error::WriteFailed)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_all(bytes).map_err(Error::WriteFailed)
    }

    /// Writes `bytes` followed by a NUL terminator, refusing strings that
    /// would not fit a `max_len` byte field once terminated.
    fn write_c_string(&mut self, bytes: &[u8], max_len: usize) -> Result<()> {
        if bytes.contains(&0) {
            return Err(Error::InteriorNul);
        }
        if bytes.len() + 1 > max_len {
            return Err(Error::StringTooLong { max: max_len });
        }
        self.write_bytes(bytes)?;
        self.write_u8(0)
    }
}

impl<W: Write + ?Sized> StreamWrite for W {}
