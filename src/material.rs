use std::io::{Read, Seek, Write};
use std::ops::{Index, IndexMut};

use glam::Vec4;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::chunk::{self, ChunkReader, ChunkWriter, HEADER_SIZE};
use crate::error::Result;
use crate::io::{StreamRead, StreamWrite};
use crate::name::Name;
use crate::tags;
use crate::texture::{TextureMap, TextureSlot};
use crate::value;

const SHADING_CHUNK_SIZE: u32 = HEADER_SIZE + 2;
const WIRE_SIZE_CHUNK_SIZE: u32 = HEADER_SIZE + 4;
const ACUBIC_CHUNK_SIZE: u32 = HEADER_SIZE + 12;

/// Shading modes understood by renderers.
///
/// [`Material::shading`] keeps the raw wire value, which may lie outside this
/// range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shading {
    Wire = 0,
    Flat = 1,
    Gouraud = 2,
    Phong = 3,
    Metal = 4,
}

impl Shading {
    /// Maps a `MAT_SHADING` value to a known mode.
    pub fn from_raw(raw: i16) -> Option<Self> {
        Some(match raw {
            0 => Self::Wire,
            1 => Self::Flat,
            2 => Self::Gouraud,
            3 => Self::Phong,
            4 => Self::Metal,
            _ => return None,
        })
    }

    /// Value stored in `MAT_SHADING`.
    pub fn raw(self) -> i16 {
        self as i16
    }
}

/// Automatic cubic reflection map settings (`MAT_ACUBIC`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoReflectionMap {
    pub flags: u16,
    pub level: i8,
    pub size: i32,
    pub frame_step: i32,
}

impl AutoReflectionMap {
    /// True when every field is zero, in which case no chunk is written.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A named set of shading parameters and texture references.
///
/// Colors are normalized RGBA with alpha fixed at 1. Percent-like fields are
/// fractions in `[0, 1]`; on the wire they are whole percent, so they come
/// back quantized to 0.01.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: Name,
    pub ambient: Vec4,
    pub diffuse: Vec4,
    pub specular: Vec4,
    pub shininess: f32,
    pub shin_strength: f32,
    pub transparency: f32,
    pub falloff: f32,
    pub self_illum_percent: f32,
    pub blur: f32,
    pub use_falloff: bool,
    pub use_blur: bool,
    pub self_illum: bool,
    pub two_sided: bool,
    pub map_decal: bool,
    pub additive: bool,
    pub face_map: bool,
    pub soften: bool,
    pub use_wire: bool,
    pub use_wire_abs: bool,
    pub shading: i16,
    pub wire_size: f32,
    pub textures: [TextureMap; TextureSlot::COUNT],
    pub auto_reflection: AutoReflectionMap,
}

impl Default for Material {
    /// A shiny grey Phong material with every texture slot empty.
    fn default() -> Self {
        Self {
            name: Name::default(),
            ambient: Vec4::new(0.588, 0.588, 0.588, 1.0),
            diffuse: Vec4::new(0.588, 0.588, 0.588, 1.0),
            specular: Vec4::new(0.898, 0.898, 0.898, 1.0),
            shininess: 0.1,
            shin_strength: 0.0,
            transparency: 0.0,
            falloff: 0.0,
            self_illum_percent: 0.0,
            blur: 0.0,
            use_falloff: false,
            use_blur: false,
            self_illum: false,
            two_sided: false,
            map_decal: false,
            additive: false,
            face_map: false,
            soften: false,
            use_wire: false,
            use_wire_abs: false,
            shading: Shading::Phong.raw(),
            wire_size: 1.0,
            textures: Default::default(),
            auto_reflection: AutoReflectionMap::default(),
        }
    }
}

impl Material {
    /// Creates an unnamed default material.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a default material called `name`.
    pub fn named(name: &str) -> Result<Self> {
        Ok(Self {
            name: Name::new(name)?,
            ..Self::default()
        })
    }

    /// Interprets [`Material::shading`], if it is a known mode.
    pub fn shading_mode(&self) -> Option<Shading> {
        Shading::from_raw(self.shading)
    }

    /// Texture map held in `slot`.
    pub fn texture(&self, slot: TextureSlot) -> &TextureMap {
        &self.textures[slot.index()]
    }

    pub fn texture_mut(&mut self, slot: TextureSlot) -> &mut TextureMap {
        &mut self.textures[slot.index()]
    }

    /// Texture slots that reference a file.
    pub fn present_textures(&self) -> impl Iterator<Item = (TextureSlot, &TextureMap)> {
        TextureSlot::all()
            .map(move |slot| (slot, self.texture(slot)))
            .filter(|(_, map)| map.is_present())
    }

    /// Payload-less chunks and the flags their presence sets.
    fn presence_flags(&self) -> [(u16, bool); 10] {
        [
            (tags::MAT_USE_XPFALL, self.use_falloff),
            (tags::MAT_USE_REFBLUR, self.use_blur),
            (tags::MAT_SELF_ILLUM, self.self_illum),
            (tags::MAT_TWO_SIDE, self.two_sided),
            (tags::MAT_DECAL, self.map_decal),
            (tags::MAT_ADDITIVE, self.additive),
            (tags::MAT_WIRE, self.use_wire),
            (tags::MAT_FACEMAP, self.face_map),
            (tags::MAT_PHONGSOFT, self.soften),
            (tags::MAT_WIREABS, self.use_wire_abs),
        ]
    }

    fn presence_flag_mut(&mut self, tag: u16) -> Option<&mut bool> {
        Some(match tag {
            tags::MAT_USE_XPFALL => &mut self.use_falloff,
            tags::MAT_USE_REFBLUR => &mut self.use_blur,
            tags::MAT_SELF_ILLUM => &mut self.self_illum,
            tags::MAT_TWO_SIDE => &mut self.two_sided,
            tags::MAT_DECAL => &mut self.map_decal,
            tags::MAT_ADDITIVE => &mut self.additive,
            tags::MAT_WIRE => &mut self.use_wire,
            tags::MAT_FACEMAP => &mut self.face_map,
            tags::MAT_PHONGSOFT => &mut self.soften,
            tags::MAT_WIREABS => &mut self.use_wire_abs,
            _ => return None,
        })
    }

    fn percentage_mut(&mut self, tag: u16) -> Option<&mut f32> {
        Some(match tag {
            tags::MAT_SHININESS => &mut self.shininess,
            tags::MAT_SHIN2PCT => &mut self.shin_strength,
            tags::MAT_TRANSPARENCY => &mut self.transparency,
            tags::MAT_XPFALL => &mut self.falloff,
            tags::MAT_SELF_ILPCT => &mut self.self_illum_percent,
            tags::MAT_REFBLUR => &mut self.blur,
            _ => return None,
        })
    }

    fn color_mut(&mut self, tag: u16) -> Option<&mut Vec4> {
        Some(match tag {
            tags::MAT_AMBIENT => &mut self.ambient,
            tags::MAT_DIFFUSE => &mut self.diffuse,
            tags::MAT_SPECULAR => &mut self.specular,
            _ => return None,
        })
    }

    /// Decodes a `MAT_ENTRY` chunk at the current stream position into
    /// `self`, overwriting the fields it carries.
    pub fn read<S: Read + Seek + ?Sized>(&mut self, stream: &mut S) -> Result<()> {
        let mut chunk = ChunkReader::begin_read(stream, Some(tags::MAT_ENTRY))?;
        while let Some(tag) = chunk.next_child(stream)? {
            match tag {
                tags::MAT_NAME => {
                    self.name = Name::read(stream)?;
                    debug!("reading material {:?}", self.name.to_string_lossy());
                }
                tags::MAT_SHADING => self.shading = stream.read_i16()?,
                tags::MAT_WIRE_SIZE => self.wire_size = stream.read_f32()?,
                tags::MAT_ACUBIC => {
                    stream.read_i8()?;
                    self.auto_reflection.level = stream.read_i8()?;
                    self.auto_reflection.flags = stream.read_u16()?;
                    self.auto_reflection.size = stream.read_i32()?;
                    self.auto_reflection.frame_step = stream.read_i32()?;
                }
                tag => {
                    if let Some(color) = self.color_mut(tag) {
                        value::read_color(stream, &mut chunk, color)?;
                    } else if let Some(percent) = self.percentage_mut(tag) {
                        value::read_percentage(stream, &mut chunk, percent)?;
                    } else if let Some(flag) = self.presence_flag_mut(tag) {
                        *flag = true;
                    } else if let Some(slot) = TextureSlot::from_tag(tag) {
                        self.texture_mut(slot).read(stream, &mut chunk)?;
                    } else {
                        chunk.skip_unknown(stream)?;
                    }
                }
            }
        }
        chunk.end_read(stream)
    }

    /// Encodes `self` as one `MAT_ENTRY` chunk at the current stream
    /// position.
    pub fn write<S: Write + Seek + ?Sized>(&self, stream: &mut S) -> Result<()> {
        let writer = ChunkWriter::begin_write(stream, tags::MAT_ENTRY)?;
        self.name.write_chunk(stream, tags::MAT_NAME)?;

        value::write_color(stream, tags::MAT_AMBIENT, self.ambient)?;
        value::write_color(stream, tags::MAT_DIFFUSE, self.diffuse)?;
        value::write_color(stream, tags::MAT_SPECULAR, self.specular)?;

        value::write_percentage(stream, tags::MAT_SHININESS, self.shininess)?;
        value::write_percentage(stream, tags::MAT_SHIN2PCT, self.shin_strength)?;
        value::write_percentage(stream, tags::MAT_TRANSPARENCY, self.transparency)?;
        value::write_percentage(stream, tags::MAT_XPFALL, self.falloff)?;
        value::write_percentage(stream, tags::MAT_SELF_ILPCT, self.self_illum_percent)?;

        chunk::write_header(stream, tags::MAT_SHADING, SHADING_CHUNK_SIZE)?;
        stream.write_i16(self.shading)?;

        value::write_percentage(stream, tags::MAT_REFBLUR, self.blur)?;

        chunk::write_header(stream, tags::MAT_WIRE_SIZE, WIRE_SIZE_CHUNK_SIZE)?;
        stream.write_f32(self.wire_size)?;

        if !self.auto_reflection.is_empty() {
            let acubic = &self.auto_reflection;
            chunk::write_header(stream, tags::MAT_ACUBIC, ACUBIC_CHUNK_SIZE)?;
            stream.write_i8(0)?;
            stream.write_i8(acubic.level)?;
            stream.write_u16(acubic.flags)?;
            stream.write_i32(acubic.size)?;
            stream.write_i32(acubic.frame_step)?;
        }

        for (tag, set) in self.presence_flags() {
            if set {
                chunk::write_empty(stream, tag)?;
            }
        }

        for slot in TextureSlot::all() {
            self.texture(slot).write(stream, slot.tag())?;
        }

        writer.end_write(stream)?;
        Ok(())
    }
}

impl Index<TextureSlot> for Material {
    type Output = TextureMap;

    fn index(&self, slot: TextureSlot) -> &TextureMap {
        self.texture(slot)
    }
}

impl IndexMut<TextureSlot> for Material {
    fn index_mut(&mut self, slot: TextureSlot) -> &mut TextureMap {
        self.texture_mut(slot)
    }
}

/// Decodes the `MAT_ENTRY` chunk at the current stream position.
pub fn decode_material<S: Read + Seek + ?Sized>(stream: &mut S) -> Result<Material> {
    let mut material = Material::default();
    material.read(stream)?;
    Ok(material)
}

/// Encodes `material` as a `MAT_ENTRY` chunk at the current stream position.
pub fn encode_material<S: Write + Seek + ?Sized>(material: &Material, stream: &mut S) -> Result<()> {
    material.write(stream)
}
