//! Chunk envelope framing.
//!
//! Every record in a 3DS stream is a `u16` tag, a `u32` size that counts the
//! six header bytes, and a payload that may hold further chunks. A
//! [`ChunkReader`] is opened at a chunk header and hands out the tags of its
//! children one at a time; a [`ChunkWriter`] reserves the size field and
//! back-patches it once the payload is written.

use std::io::{self, Read, Seek, SeekFrom, Write};

use log::{debug, trace};

use crate::error::{Error, Result};
use crate::io::{StreamRead, StreamWrite};

/// Size of the tag + length prefix in bytes.
pub const HEADER_SIZE: u32 = 6;

/// Decoded chunk header together with its absolute position in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub tag: u16,
    pub size: u32,
    pub offset: u64,
}

impl ChunkHeader {
    /// Absolute offset of the first byte after this chunk.
    pub fn end(&self) -> u64 {
        self.offset + u64::from(self.size)
    }

    /// Absolute offset of the first payload byte.
    pub fn payload_start(&self) -> u64 {
        self.offset + u64::from(HEADER_SIZE)
    }

    /// Number of payload bytes after the header.
    pub fn payload_len(&self) -> u32 {
        self.size - HEADER_SIZE
    }
}

fn read_header<S: Read + Seek + ?Sized>(stream: &mut S) -> Result<ChunkHeader> {
    let offset = stream.stream_position()?;
    let tag = stream.read_u16()?;
    let size = stream.read_u32()?;
    if size < HEADER_SIZE {
        return Err(Error::corrupt(
            tag,
            offset,
            format!("declared size {size} is smaller than the chunk header"),
        ));
    }
    Ok(ChunkHeader { tag, size, offset })
}

/// Moves the stream from `position` to `target` with a relative seek, so
/// buffered readers keep their buffer when the target is already loaded.
fn seek_to<S: Seek + ?Sized>(stream: &mut S, position: u64, target: u64) -> Result<()> {
    if position == target {
        return Ok(());
    }
    let delta = i128::from(target) - i128::from(position);
    let delta = i64::try_from(delta)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "seek distance out of range"))?;
    stream.seek_relative(delta)?;
    Ok(())
}

/// Reader for one open chunk and the iteration over its children.
///
/// At most one child is pending at a time: its header has been read by
/// [`ChunkReader::next_child`] and the stream sits at its payload. Whatever
/// the caller does with that payload, the following `next_child` call seeks
/// to the next sibling header.
#[derive(Debug)]
pub struct ChunkReader {
    header: ChunkHeader,
    next: u64,
    pending: Option<ChunkHeader>,
}

impl ChunkReader {
    /// Opens the chunk at the current stream position.
    ///
    /// When `expected` is given, a different tag fails with [`Error::BadTag`].
    pub fn begin_read<S: Read + Seek + ?Sized>(
        stream: &mut S,
        expected: Option<u16>,
    ) -> Result<Self> {
        let header = read_header(stream)?;
        if let Some(expected) = expected {
            if header.tag != expected {
                return Err(Error::BadTag {
                    expected,
                    found: header.tag,
                });
            }
        }
        trace!(
            "enter chunk {:#06x} ({} bytes) at {}",
            header.tag,
            header.size,
            header.offset
        );
        Ok(Self {
            header,
            next: header.payload_start(),
            pending: None,
        })
    }

    /// Header of the open chunk.
    pub fn header(&self) -> ChunkHeader {
        self.header
    }

    /// Tag of the open chunk.
    pub fn tag(&self) -> u16 {
        self.header.tag
    }

    /// Advances to the next child chunk and returns its tag, or `None` once
    /// this chunk's span is exhausted.
    ///
    /// The stream is left at the child's payload.
    pub fn next_child<S: Read + Seek + ?Sized>(&mut self, stream: &mut S) -> Result<Option<u16>> {
        let position = self.check_overrun(stream, self.next)?;
        let end = self.header.end();
        // Fewer bytes than a header are left: nothing more to iterate.
        if self.next + u64::from(HEADER_SIZE) > end {
            self.pending = None;
            return Ok(None);
        }
        seek_to(stream, position, self.next)?;
        let child = read_header(stream)?;
        if child.end() > end {
            return Err(Error::corrupt(
                child.tag,
                child.offset,
                format!(
                    "declared size {} runs {} bytes past parent chunk {:#06x}",
                    child.size,
                    child.end() - end,
                    self.header.tag
                ),
            ));
        }
        self.next = child.end();
        self.pending = Some(child);
        Ok(Some(child.tag))
    }

    /// Rewinds the stream to the header of the pending child so a nested
    /// [`ChunkReader`] can be opened on it.
    pub fn reset_child<S: Seek + ?Sized>(&mut self, stream: &mut S) -> Result<()> {
        let child = self.pending.ok_or_else(no_pending_child)?;
        let position = stream.stream_position()?;
        seek_to(stream, position, child.offset)
    }

    /// Opens the pending child as a chunk of its own, for payloads that are
    /// themselves chunk streams.
    pub fn open_child<S: Read + Seek + ?Sized>(&mut self, stream: &mut S) -> Result<ChunkReader> {
        let child = self.pending.ok_or_else(no_pending_child)?;
        self.reset_child(stream)?;
        ChunkReader::begin_read(stream, Some(child.tag))
    }

    /// Moves the stream to the end of the pending child, discarding any
    /// payload the caller did not consume.
    pub fn skip_child<S: Seek + ?Sized>(&mut self, stream: &mut S) -> Result<()> {
        if let Some(child) = self.pending.take() {
            let position = self.check_overrun(stream, child.end())?;
            seek_to(stream, position, child.end())?;
        }
        Ok(())
    }

    /// Logs the pending child as unrecognised and skips it.
    pub fn skip_unknown<S: Seek + ?Sized>(&mut self, stream: &mut S) -> Result<()> {
        if let Some(child) = self.pending {
            debug!(
                "skipping unknown chunk {:#06x} ({} payload bytes) at {} inside {:#06x}",
                child.tag,
                child.payload_len(),
                child.offset,
                self.header.tag
            );
        }
        self.skip_child(stream)
    }

    /// Closes the chunk, leaving the stream at its declared end.
    ///
    /// Unconsumed trailing bytes are discarded. Reading past the declared end
    /// fails with [`Error::CorruptChunk`].
    pub fn end_read<S: Seek + ?Sized>(self, stream: &mut S) -> Result<()> {
        let end = self.header.end();
        let position = self.check_overrun(stream, end)?;
        if position < end {
            debug!(
                "discarding {} trailing bytes of chunk {:#06x} at {}",
                end - position,
                self.header.tag,
                position
            );
            seek_to(stream, position, end)?;
        }
        trace!("leave chunk {:#06x} at {}", self.header.tag, end);
        Ok(())
    }

    fn check_overrun<S: Seek + ?Sized>(&self, stream: &mut S, limit: u64) -> Result<u64> {
        let position = stream.stream_position()?;
        if position > limit {
            let (tag, offset) = self
                .pending
                .map_or((self.header.tag, self.header.offset), |child| {
                    (child.tag, child.offset)
                });
            return Err(Error::corrupt(
                tag,
                offset,
                format!("payload read {} bytes past its declared end", position - limit),
            ));
        }
        Ok(position)
    }
}

fn no_pending_child() -> Error {
    Error::Io(io::Error::new(
        io::ErrorKind::InvalidInput,
        "no pending child chunk to rewind to",
    ))
}

/// Writer for a chunk whose size is only known once its payload is written.
#[derive(Debug)]
pub struct ChunkWriter {
    tag: u16,
    offset: u64,
}

impl ChunkWriter {
    /// Writes the tag and a placeholder size at the current position.
    pub fn begin_write<S: Write + Seek + ?Sized>(stream: &mut S, tag: u16) -> Result<Self> {
        let offset = stream.stream_position()?;
        stream.write_u16(tag)?;
        stream.write_u32(0)?;
        Ok(Self { tag, offset })
    }

    /// Back-patches the size field with everything written since
    /// [`ChunkWriter::begin_write`] and returns it.
    pub fn end_write<S: Write + Seek + ?Sized>(self, stream: &mut S) -> Result<u32> {
        let end = stream.stream_position()?;
        let size = u32::try_from(end - self.offset)
            .map_err(|_| Error::corrupt(self.tag, self.offset, "chunk exceeds 4 GiB"))?;
        stream.seek(SeekFrom::Start(self.offset + 2))?;
        stream.write_u32(size)?;
        stream.seek(SeekFrom::Start(end))?;
        Ok(size)
    }
}

/// Writes a header for a chunk whose total size is known up front.
pub fn write_header<S: Write + ?Sized>(stream: &mut S, tag: u16, size: u32) -> Result<()> {
    stream.write_u16(tag)?;
    stream.write_u32(size)
}

/// Writes a payload-less chunk.
pub fn write_empty<S: Write + ?Sized>(stream: &mut S, tag: u16) -> Result<()> {
    write_header(stream, tag, HEADER_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor};

    /// Counts the reads that reach the underlying stream.
    struct CountingReader {
        inner: Cursor<Vec<u8>>,
        reads: usize,
    }

    impl Read for CountingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.reads += 1;
            self.inner.read(buf)
        }
    }

    impl Seek for CountingReader {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.inner.seek(pos)
        }
    }

    fn chunk(tag: u16, payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&tag.to_le_bytes());
        out.extend_from_slice(&(payload.len() as u32 + 6).to_le_bytes());
        out.extend_from_slice(payload);
        out
    }

    fn parent(tag: u16, children: &[Vec<u8>]) -> Vec<u8> {
        chunk(tag, &children.concat())
    }

    #[test]
    fn wrong_tag_is_rejected() {
        let mut stream = Cursor::new(chunk(0x1234, &[]));
        let err = ChunkReader::begin_read(&mut stream, Some(0xAFFF)).unwrap_err();
        assert!(matches!(
            err,
            Error::BadTag {
                expected: 0xAFFF,
                found: 0x1234
            }
        ));
    }

    #[test]
    fn iterates_children_and_skips_unread_payloads() {
        let bytes = parent(
            0x0100,
            &[chunk(0x0001, &[1, 2, 3]), chunk(0x0002, &[]), chunk(0x0003, &[9])],
        );
        let total = bytes.len() as u64;
        let mut stream = Cursor::new(bytes);
        let mut reader = ChunkReader::begin_read(&mut stream, None).unwrap();
        let mut tags = Vec::new();
        while let Some(tag) = reader.next_child(&mut stream).unwrap() {
            tags.push(tag);
            if tag == 0x0003 {
                assert_eq!(stream.read_u8().unwrap(), 9);
            }
        }
        reader.end_read(&mut stream).unwrap();
        assert_eq!(tags, vec![0x0001, 0x0002, 0x0003]);
        assert_eq!(stream.position(), total);
    }

    #[test]
    fn end_read_discards_trailing_bytes() {
        let mut bytes = chunk(0x0100, &[0xAA, 0xBB, 0xCC, 0xDD]);
        bytes.extend_from_slice(&chunk(0x0200, &[]));
        let mut stream = Cursor::new(bytes);
        let reader = ChunkReader::begin_read(&mut stream, Some(0x0100)).unwrap();
        reader.end_read(&mut stream).unwrap();
        assert_eq!(stream.position(), 10);
        assert!(ChunkReader::begin_read(&mut stream, Some(0x0200)).is_ok());
    }

    #[test]
    fn short_tail_ends_iteration() {
        let mut stream = Cursor::new(chunk(0x0100, &[1, 2, 3]));
        let mut reader = ChunkReader::begin_read(&mut stream, None).unwrap();
        assert_eq!(reader.next_child(&mut stream).unwrap(), None);
        reader.end_read(&mut stream).unwrap();
        assert_eq!(stream.position(), 9);
    }

    #[test]
    fn reset_child_allows_nested_reader() {
        let inner = parent(0x0010, &[chunk(0x0011, &[7])]);
        let mut stream = Cursor::new(parent(0x0100, &[inner]));
        let mut outer = ChunkReader::begin_read(&mut stream, None).unwrap();
        assert_eq!(outer.next_child(&mut stream).unwrap(), Some(0x0010));
        outer.reset_child(&mut stream).unwrap();
        let mut nested = ChunkReader::begin_read(&mut stream, Some(0x0010)).unwrap();
        assert_eq!(nested.next_child(&mut stream).unwrap(), Some(0x0011));
        assert_eq!(stream.read_u8().unwrap(), 7);
        assert_eq!(nested.next_child(&mut stream).unwrap(), None);
        nested.end_read(&mut stream).unwrap();
        assert_eq!(outer.next_child(&mut stream).unwrap(), None);
        outer.end_read(&mut stream).unwrap();
    }

    #[test]
    fn reset_without_pending_child_fails() {
        let mut stream = Cursor::new(chunk(0x0100, &[]));
        let mut reader = ChunkReader::begin_read(&mut stream, None).unwrap();
        assert!(reader.reset_child(&mut stream).is_err());
    }

    #[test]
    fn undersized_child_is_corrupt() {
        let mut child = Vec::new();
        child.extend_from_slice(&0x0001u16.to_le_bytes());
        child.extend_from_slice(&2u32.to_le_bytes());
        let mut stream = Cursor::new(chunk(0x0100, &child));
        let mut reader = ChunkReader::begin_read(&mut stream, None).unwrap();
        assert!(matches!(
            reader.next_child(&mut stream),
            Err(Error::CorruptChunk { tag: 0x0001, .. })
        ));
    }

    #[test]
    fn child_past_parent_end_is_corrupt() {
        let mut child = chunk(0x0001, &[0; 4]);
        child[2..6].copy_from_slice(&40u32.to_le_bytes());
        let mut bytes = chunk(0x0100, &child);
        bytes.extend_from_slice(&[0; 40]);
        let mut stream = Cursor::new(bytes);
        let mut reader = ChunkReader::begin_read(&mut stream, None).unwrap();
        assert!(matches!(
            reader.next_child(&mut stream),
            Err(Error::CorruptChunk { .. })
        ));
    }

    #[test]
    fn reading_past_a_child_is_corrupt() {
        let bytes = parent(0x0100, &[chunk(0x0001, &[1]), chunk(0x0002, &[2])]);
        let mut stream = Cursor::new(bytes);
        let mut reader = ChunkReader::begin_read(&mut stream, None).unwrap();
        reader.next_child(&mut stream).unwrap();
        stream.read_u16().unwrap();
        assert!(matches!(
            reader.next_child(&mut stream),
            Err(Error::CorruptChunk { tag: 0x0001, .. })
        ));
    }

    #[test]
    fn end_read_rejects_cursor_past_declared_end() {
        let mut bytes = chunk(0x0100, &[1, 2]);
        bytes.extend_from_slice(&chunk(0x0200, &[]));
        let mut stream = Cursor::new(bytes);
        let reader = ChunkReader::begin_read(&mut stream, Some(0x0100)).unwrap();
        assert_eq!(reader.header().payload_len(), 2);
        // A four byte field read from a two byte payload.
        stream.read_u32().unwrap();
        assert!(matches!(
            reader.end_read(&mut stream),
            Err(Error::CorruptChunk {
                tag: 0x0100,
                offset: 0,
                ..
            })
        ));
    }

    #[test]
    fn relative_seeks_keep_the_read_buffer() {
        let bytes = parent(
            0x0100,
            &[
                chunk(0x0001, &[0; 32]),
                parent(0x0002, &[chunk(0x0003, &[5])]),
                chunk(0x0004, &[0; 16]),
            ],
        );
        let mut stream = BufReader::new(CountingReader {
            inner: Cursor::new(bytes),
            reads: 0,
        });
        let mut reader = ChunkReader::begin_read(&mut stream, None).unwrap();
        let mut tags = Vec::new();
        while let Some(tag) = reader.next_child(&mut stream).unwrap() {
            tags.push(tag);
            if tag == 0x0002 {
                let mut nested = reader.open_child(&mut stream).unwrap();
                assert_eq!(nested.next_child(&mut stream).unwrap(), Some(0x0003));
                assert_eq!(stream.read_u8().unwrap(), 5);
                nested.end_read(&mut stream).unwrap();
            } else {
                reader.skip_unknown(&mut stream).unwrap();
            }
        }
        reader.end_read(&mut stream).unwrap();
        assert_eq!(tags, vec![0x0001, 0x0002, 0x0004]);
        // One fill covers the whole chunk tree.
        assert_eq!(stream.get_ref().reads, 1);
    }

    #[test]
    fn truncated_header_is_reported() {
        let mut stream = Cursor::new(vec![0xFF, 0xAF, 0x10]);
        assert!(matches!(
            ChunkReader::begin_read(&mut stream, None),
            Err(Error::Truncated)
        ));
    }

    #[test]
    fn writer_back_patches_nested_sizes() {
        let mut stream = Cursor::new(Vec::new());
        let outer = ChunkWriter::begin_write(&mut stream, 0x0100).unwrap();
        let inner = ChunkWriter::begin_write(&mut stream, 0x0200).unwrap();
        stream.write_u32(0xDEAD_BEEF).unwrap();
        assert_eq!(inner.end_write(&mut stream).unwrap(), 10);
        write_empty(&mut stream, 0x0300).unwrap();
        assert_eq!(outer.end_write(&mut stream).unwrap(), 22);

        let bytes = stream.into_inner();
        let expected = parent(
            0x0100,
            &[chunk(0x0200, &0xDEAD_BEEFu32.to_le_bytes()), chunk(0x0300, &[])],
        );
        assert_eq!(bytes, expected);
    }
}
