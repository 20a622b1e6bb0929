use std::io::{Read, Seek, Write};

use bitflags::bitflags;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::chunk::{self, ChunkReader, ChunkWriter, HEADER_SIZE};
use crate::error::Result;
use crate::io::{StreamRead, StreamWrite};
use crate::name::Name;
use crate::tags;
use crate::value;

const U16_CHUNK_SIZE: u32 = HEADER_SIZE + 2;
const F32_CHUNK_SIZE: u32 = HEADER_SIZE + 4;

bitflags! {
    /// Texture map option bits as stored in `MAT_MAP_TILING`.
    ///
    /// Bits without a name are kept so they survive a round trip.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct TextureFlags: u16 {
        const DECALE = 0x0001;
        const MIRROR = 0x0002;
        const NEGATE = 0x0008;
        const NO_TILE = 0x0010;
        const SUMMED_AREA = 0x0020;
        const ALPHA_SOURCE = 0x0040;
        const TINT = 0x0080;
        const IGNORE_ALPHA = 0x0100;
        const RGB_TINT = 0x0200;
    }
}

impl Default for TextureFlags {
    /// The tiling-control bit is set on every fresh texture map.
    fn default() -> Self {
        Self::NO_TILE
    }
}

/// One texture reference of a material.
///
/// A map with an empty name is absent and is not written at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureMap {
    pub name: Name,
    pub flags: TextureFlags,
    pub percent: f32,
    pub blur: f32,
    pub scale: Vec2,
    pub offset: Vec2,
    pub rotation: f32,
    pub tint_1: Vec3,
    pub tint_2: Vec3,
    pub tint_r: Vec3,
    pub tint_g: Vec3,
    pub tint_b: Vec3,
}

impl Default for TextureMap {
    fn default() -> Self {
        Self {
            name: Name::default(),
            flags: TextureFlags::default(),
            percent: 1.0,
            blur: 0.0,
            scale: Vec2::ONE,
            offset: Vec2::ZERO,
            rotation: 0.0,
            tint_1: Vec3::ZERO,
            tint_2: Vec3::ZERO,
            tint_r: Vec3::ZERO,
            tint_g: Vec3::ZERO,
            tint_b: Vec3::ZERO,
        }
    }
}

impl TextureMap {
    /// Creates a default map referencing `name`.
    pub fn named(name: &str) -> Result<Self> {
        Ok(Self {
            name: Name::new(name)?,
            ..Self::default()
        })
    }

    /// True when the map references a file.
    pub fn is_present(&self) -> bool {
        !self.name.is_empty()
    }

    /// Decodes the texture map chunk pending in `parent` into `self`.
    pub fn read<S: Read + Seek + ?Sized>(
        &mut self,
        stream: &mut S,
        parent: &mut ChunkReader,
    ) -> Result<()> {
        let mut chunk = parent.open_child(stream)?;
        while let Some(tag) = chunk.next_child(stream)? {
            match tag {
                tags::INT_PERCENTAGE => self.percent = value::read_int_percentage(stream)?,
                tags::MAT_MAPNAME => self.name = Name::read(stream)?,
                tags::MAT_MAP_TILING => {
                    self.flags = TextureFlags::from_bits_retain(stream.read_u16()?);
                }
                tags::MAT_MAP_TEXBLUR => self.blur = stream.read_f32()?,
                tags::MAT_MAP_USCALE => self.scale.x = stream.read_f32()?,
                tags::MAT_MAP_VSCALE => self.scale.y = stream.read_f32()?,
                tags::MAT_MAP_UOFFSET => self.offset.x = stream.read_f32()?,
                tags::MAT_MAP_VOFFSET => self.offset.y = stream.read_f32()?,
                tags::MAT_MAP_ANG => self.rotation = stream.read_f32()?,
                tags::MAT_MAP_COL1 => self.tint_1 = value::read_rgb24(stream)?,
                tags::MAT_MAP_COL2 => self.tint_2 = value::read_rgb24(stream)?,
                tags::MAT_MAP_RCOL => self.tint_r = value::read_rgb24(stream)?,
                tags::MAT_MAP_GCOL => self.tint_g = value::read_rgb24(stream)?,
                tags::MAT_MAP_BCOL => self.tint_b = value::read_rgb24(stream)?,
                _ => chunk.skip_unknown(stream)?,
            }
        }
        chunk.end_read(stream)
    }

    /// Writes this map as a `tag` chunk, or nothing when the map is absent.
    pub fn write<S: Write + Seek + ?Sized>(&self, stream: &mut S, tag: u16) -> Result<()> {
        if !self.is_present() {
            return Ok(());
        }
        let writer = ChunkWriter::begin_write(stream, tag)?;
        value::write_int_percentage(stream, self.percent)?;
        self.name.write_chunk(stream, tags::MAT_MAPNAME)?;

        chunk::write_header(stream, tags::MAT_MAP_TILING, U16_CHUNK_SIZE)?;
        stream.write_u16(self.flags.bits())?;

        for (tag, field) in [
            (tags::MAT_MAP_TEXBLUR, self.blur),
            (tags::MAT_MAP_USCALE, self.scale.x),
            (tags::MAT_MAP_VSCALE, self.scale.y),
            (tags::MAT_MAP_UOFFSET, self.offset.x),
            (tags::MAT_MAP_VOFFSET, self.offset.y),
            (tags::MAT_MAP_ANG, self.rotation),
        ] {
            chunk::write_header(stream, tag, F32_CHUNK_SIZE)?;
            stream.write_f32(field)?;
        }

        for (tag, tint) in [
            (tags::MAT_MAP_COL1, self.tint_1),
            (tags::MAT_MAP_COL2, self.tint_2),
            (tags::MAT_MAP_RCOL, self.tint_r),
            (tags::MAT_MAP_GCOL, self.tint_g),
            (tags::MAT_MAP_BCOL, self.tint_b),
        ] {
            value::write_rgb24_chunk(stream, tag, tint)?;
        }

        writer.end_write(stream)?;
        Ok(())
    }
}

/// The sixteen texture slots of a material, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureSlot {
    Texture1Map,
    Texture1Mask,
    Texture2Map,
    Texture2Mask,
    OpacityMap,
    OpacityMask,
    BumpMap,
    BumpMask,
    SpecularMap,
    SpecularMask,
    ShininessMap,
    ShininessMask,
    SelfIllumMap,
    SelfIllumMask,
    ReflectionMap,
    ReflectionMask,
}

/// Slot, chunk tag and display label for each texture slot. Encode, decode
/// and dump all walk this table.
const SLOTS: [(TextureSlot, u16, &str); TextureSlot::COUNT] = [
    (TextureSlot::Texture1Map, tags::MAT_TEXMAP, "texture1_map"),
    (TextureSlot::Texture1Mask, tags::MAT_TEXMASK, "texture1_mask"),
    (TextureSlot::Texture2Map, tags::MAT_TEX2MAP, "texture2_map"),
    (TextureSlot::Texture2Mask, tags::MAT_TEX2MASK, "texture2_mask"),
    (TextureSlot::OpacityMap, tags::MAT_OPACMAP, "opacity_map"),
    (TextureSlot::OpacityMask, tags::MAT_OPACMASK, "opacity_mask"),
    (TextureSlot::BumpMap, tags::MAT_BUMPMAP, "bump_map"),
    (TextureSlot::BumpMask, tags::MAT_BUMPMASK, "bump_mask"),
    (TextureSlot::SpecularMap, tags::MAT_SPECMAP, "specular_map"),
    (TextureSlot::SpecularMask, tags::MAT_SPECMASK, "specular_mask"),
    (TextureSlot::ShininessMap, tags::MAT_SHINMAP, "shininess_map"),
    (TextureSlot::ShininessMask, tags::MAT_SHINMASK, "shininess_mask"),
    (TextureSlot::SelfIllumMap, tags::MAT_SELFIMAP, "self_illum_map"),
    (TextureSlot::SelfIllumMask, tags::MAT_SELFIMASK, "self_illum_mask"),
    (TextureSlot::ReflectionMap, tags::MAT_REFLMAP, "reflection_map"),
    (TextureSlot::ReflectionMask, tags::MAT_REFLMASK, "reflection_mask"),
];

impl TextureSlot {
    pub const COUNT: usize = 16;

    /// Every slot in wire order.
    pub fn all() -> impl Iterator<Item = TextureSlot> {
        SLOTS.iter().map(|(slot, _, _)| *slot)
    }

    /// Slot whose container chunk has `tag`.
    pub fn from_tag(tag: u16) -> Option<Self> {
        SLOTS
            .iter()
            .find(|(_, slot_tag, _)| *slot_tag == tag)
            .map(|(slot, _, _)| *slot)
    }

    /// Container chunk tag of this slot.
    pub fn tag(self) -> u16 {
        SLOTS[self.index()].1
    }

    /// Label used by the text dump.
    pub fn label(self) -> &'static str {
        SLOTS[self.index()].2
    }

    /// Position in wire order, also the index into `Material::textures`.
    pub fn index(self) -> usize {
        self as usize
    }
}
