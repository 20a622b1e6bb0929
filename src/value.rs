//! Sub-codecs for the small value chunks shared by materials and texture
//! maps: colors, percentages and byte tint triples.

use std::io::{Read, Seek, Write};

use glam::{Vec3, Vec4};

use crate::chunk::{self, ChunkReader, HEADER_SIZE};
use crate::error::Result;
use crate::io::{StreamRead, StreamWrite};
use crate::tags;

const RGB24_CHUNK_SIZE: u32 = HEADER_SIZE + 3;
const INT_PERCENTAGE_CHUNK_SIZE: u32 = HEADER_SIZE + 2;

/// Total size of a color attribute chunk holding a gamma and a linear triple.
pub const COLOR_CHUNK_SIZE: u32 = HEADER_SIZE + 2 * RGB24_CHUNK_SIZE;
/// Total size of a percentage attribute chunk holding one `INT_PERCENTAGE`.
pub const PERCENTAGE_CHUNK_SIZE: u32 = HEADER_SIZE + INT_PERCENTAGE_CHUNK_SIZE;

/// Converts a fraction to whole percent, rounding half up.
pub fn percent_to_wire(value: f32) -> i16 {
    (100.0 * value + 0.5).floor() as i16
}

/// Converts whole percent to a fraction.
pub fn percent_from_wire(percent: i16) -> f32 {
    f32::from(percent) / 100.0
}

/// Converts a normalized channel to a byte, rounding half up.
pub fn channel_to_wire(value: f32) -> u8 {
    (255.0 * value + 0.5).floor() as u8
}

/// Converts a channel byte to a normalized value.
pub fn channel_from_wire(byte: u8) -> f32 {
    f32::from(byte) / 255.0
}

pub(crate) fn read_rgb24<S: Read + ?Sized>(stream: &mut S) -> Result<Vec3> {
    let r = stream.read_u8()?;
    let g = stream.read_u8()?;
    let b = stream.read_u8()?;
    Ok(Vec3::new(
        channel_from_wire(r),
        channel_from_wire(g),
        channel_from_wire(b),
    ))
}

fn read_rgb_f<S: Read + ?Sized>(stream: &mut S) -> Result<Vec3> {
    Ok(Vec3::new(
        stream.read_f32()?,
        stream.read_f32()?,
        stream.read_f32()?,
    ))
}

pub(crate) fn write_rgb24<S: Write + ?Sized>(stream: &mut S, rgb: Vec3) -> Result<()> {
    stream.write_u8(channel_to_wire(rgb.x))?;
    stream.write_u8(channel_to_wire(rgb.y))?;
    stream.write_u8(channel_to_wire(rgb.z))
}

/// Writes a complete `tag` chunk carrying three tint bytes.
pub(crate) fn write_rgb24_chunk<S: Write + ?Sized>(
    stream: &mut S,
    tag: u16,
    rgb: Vec3,
) -> Result<()> {
    chunk::write_header(stream, tag, RGB24_CHUNK_SIZE)?;
    write_rgb24(stream, rgb)
}

/// Decodes the color attribute chunk pending in `parent` into `color`.
///
/// A linear triple always overwrites the color. A gamma triple only does so
/// until the first linear triple of this attribute has been seen. Alpha is
/// forced to 1.
pub fn read_color<S: Read + Seek + ?Sized>(
    stream: &mut S,
    parent: &mut ChunkReader,
    color: &mut Vec4,
) -> Result<()> {
    let mut chunk = parent.open_child(stream)?;
    let mut have_linear = false;
    while let Some(tag) = chunk.next_child(stream)? {
        match tag {
            tags::LIN_COLOR_24 => {
                *color = read_rgb24(stream)?.extend(1.0);
                have_linear = true;
            }
            tags::LIN_COLOR_F => {
                *color = read_rgb_f(stream)?.extend(1.0);
                have_linear = true;
            }
            tags::COLOR_24 if !have_linear => *color = read_rgb24(stream)?.extend(1.0),
            tags::COLOR_F if !have_linear => *color = read_rgb_f(stream)?.extend(1.0),
            tags::COLOR_24 | tags::COLOR_F => chunk.skip_child(stream)?,
            _ => chunk.skip_unknown(stream)?,
        }
    }
    chunk.end_read(stream)
}

/// Writes a `tag` color attribute chunk with identical gamma and linear
/// byte triples.
pub fn write_color<S: Write + ?Sized>(stream: &mut S, tag: u16, color: Vec4) -> Result<()> {
    let rgb = color.truncate();
    chunk::write_header(stream, tag, COLOR_CHUNK_SIZE)?;
    write_rgb24_chunk(stream, tags::COLOR_24, rgb)?;
    write_rgb24_chunk(stream, tags::LIN_COLOR_24, rgb)
}

/// Reads the payload of an `INT_PERCENTAGE` chunk as a fraction.
pub fn read_int_percentage<S: Read + ?Sized>(stream: &mut S) -> Result<f32> {
    Ok(percent_from_wire(stream.read_i16()?))
}

/// Writes a complete `INT_PERCENTAGE` chunk.
pub fn write_int_percentage<S: Write + ?Sized>(stream: &mut S, value: f32) -> Result<()> {
    chunk::write_header(stream, tags::INT_PERCENTAGE, INT_PERCENTAGE_CHUNK_SIZE)?;
    stream.write_i16(percent_to_wire(value))
}

/// Decodes the percentage attribute chunk pending in `parent` into `value`.
pub fn read_percentage<S: Read + Seek + ?Sized>(
    stream: &mut S,
    parent: &mut ChunkReader,
    value: &mut f32,
) -> Result<()> {
    let mut chunk = parent.open_child(stream)?;
    while let Some(tag) = chunk.next_child(stream)? {
        match tag {
            tags::INT_PERCENTAGE => *value = read_int_percentage(stream)?,
            tags::FLOAT_PERCENTAGE => *value = stream.read_f32()?,
            _ => chunk.skip_unknown(stream)?,
        }
    }
    chunk.end_read(stream)
}

/// Writes a `tag` percentage attribute chunk.
pub fn write_percentage<S: Write + ?Sized>(stream: &mut S, tag: u16, value: f32) -> Result<()> {
    chunk::write_header(stream, tag, PERCENTAGE_CHUNK_SIZE)?;
    write_int_percentage(stream, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn chunk(tag: u16, payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&tag.to_le_bytes());
        out.extend_from_slice(&(payload.len() as u32 + 6).to_le_bytes());
        out.extend_from_slice(payload);
        out
    }

    fn float_triple(v: f32) -> Vec<u8> {
        [v, v, v].iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Wraps `attribute` in a parent chunk and decodes it with `decode`.
    fn decode_in_parent<T>(
        attribute: Vec<u8>,
        decode: impl FnOnce(&mut Cursor<Vec<u8>>, &mut ChunkReader) -> T,
    ) -> T {
        let mut stream = Cursor::new(chunk(0xAFFF, &attribute));
        let mut parent = ChunkReader::begin_read(&mut stream, None).unwrap();
        parent.next_child(&mut stream).unwrap().unwrap();
        let result = decode(&mut stream, &mut parent);
        assert_eq!(parent.next_child(&mut stream).unwrap(), None);
        parent.end_read(&mut stream).unwrap();
        result
    }

    fn decode_color(attribute: Vec<u8>) -> Vec4 {
        decode_in_parent(attribute, |stream, parent| {
            let mut color = Vec4::ZERO;
            read_color(stream, parent, &mut color).unwrap();
            color
        })
    }

    #[test]
    fn linear_color_overrides_earlier_gamma() {
        let attribute = chunk(
            tags::MAT_AMBIENT,
            &[
                chunk(tags::COLOR_24, &[128, 128, 128]),
                chunk(tags::LIN_COLOR_24, &[64, 64, 64]),
            ]
            .concat(),
        );
        let v = 64.0 / 255.0;
        assert_eq!(decode_color(attribute), Vec4::new(v, v, v, 1.0));
    }

    #[test]
    fn gamma_after_linear_is_ignored() {
        let attribute = chunk(
            tags::MAT_AMBIENT,
            &[
                chunk(tags::LIN_COLOR_24, &[64, 64, 64]),
                chunk(tags::COLOR_24, &[128, 128, 128]),
            ]
            .concat(),
        );
        let v = 64.0 / 255.0;
        assert_eq!(decode_color(attribute), Vec4::new(v, v, v, 1.0));
    }

    #[test]
    fn float_triples_follow_the_same_rule() {
        let attribute = chunk(
            tags::MAT_DIFFUSE,
            &[
                chunk(tags::LIN_COLOR_F, &float_triple(0.25)),
                chunk(tags::COLOR_F, &float_triple(0.75)),
            ]
            .concat(),
        );
        assert_eq!(decode_color(attribute), Vec4::new(0.25, 0.25, 0.25, 1.0));
    }

    #[test]
    fn gamma_only_color_is_used() {
        let attribute = chunk(tags::MAT_SPECULAR, &chunk(tags::COLOR_24, &[255, 0, 51]));
        assert_eq!(decode_color(attribute), Vec4::new(1.0, 0.0, 0.2, 1.0));
    }

    #[test]
    fn color_chunk_layout() {
        let mut out = Vec::new();
        write_color(&mut out, tags::MAT_DIFFUSE, Vec4::new(1.0, 0.5, 0.0, 0.3)).unwrap();
        let expected = chunk(
            tags::MAT_DIFFUSE,
            &[
                chunk(tags::COLOR_24, &[255, 128, 0]),
                chunk(tags::LIN_COLOR_24, &[255, 128, 0]),
            ]
            .concat(),
        );
        assert_eq!(out, expected);
        assert_eq!(out.len() as u32, COLOR_CHUNK_SIZE);
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percent_to_wire(0.755), 76);
        assert!((percent_from_wire(percent_to_wire(0.755)) - 0.76).abs() < 1e-6);
        assert_eq!(percent_to_wire(0.0), 0);
        assert_eq!(percent_to_wire(1.0), 100);
    }

    #[test]
    fn percentage_saturates_instead_of_wrapping() {
        assert_eq!(percent_to_wire(1_000.0), i16::MAX);
        assert_eq!(percent_to_wire(-1_000.0), i16::MIN);
    }

    #[test]
    fn percentage_chunk_round_trip() {
        let mut out = Vec::new();
        write_percentage(&mut out, tags::MAT_SHININESS, 0.42).unwrap();
        assert_eq!(out.len() as u32, PERCENTAGE_CHUNK_SIZE);
        let value = decode_in_parent(out, |stream, parent| {
            let mut value = 0.0;
            read_percentage(stream, parent, &mut value).unwrap();
            value
        });
        assert!((value - 0.42).abs() < 0.005);
    }

    #[test]
    fn float_percentage_is_accepted() {
        let attribute = chunk(
            tags::MAT_TRANSPARENCY,
            &chunk(tags::FLOAT_PERCENTAGE, &0.125f32.to_le_bytes()),
        );
        let value = decode_in_parent(attribute, |stream, parent| {
            let mut value = 0.0;
            read_percentage(stream, parent, &mut value).unwrap();
            value
        });
        assert_eq!(value, 0.125);
    }

    #[test]
    fn channel_quantization() {
        assert_eq!(channel_to_wire(0.2), 51);
        assert_eq!(channel_to_wire(1.5), 255);
        assert_eq!(channel_from_wire(51), 0.2);
    }
}
