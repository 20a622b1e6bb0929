use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::chunk::{self, ChunkReader, ChunkWriter, HEADER_SIZE};
use crate::error::{Error, Result};
use crate::io::{StreamRead, StreamWrite};
use crate::material::{decode_material, Material};
use crate::tags;

const VERSION_CHUNK_SIZE: u32 = HEADER_SIZE + 4;
const DEFAULT_VERSION: u32 = 3;

/// Outer container of a 3D Studio file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileKind {
    /// `.3ds` scene (`M3DMAGIC`).
    #[default]
    Scene,
    /// `.prj` project (`CMAGIC`).
    Project,
    /// `.mli` material library (`MLIBMAGIC`).
    Library,
}

impl FileKind {
    /// Container kind for a top-level chunk tag.
    pub fn from_tag(tag: u16) -> Option<Self> {
        match tag {
            tags::M3DMAGIC => Some(Self::Scene),
            tags::CMAGIC => Some(Self::Project),
            tags::MLIBMAGIC => Some(Self::Library),
            _ => None,
        }
    }

    /// Top-level chunk tag written for this kind.
    pub fn tag(self) -> u16 {
        match self {
            Self::Scene => tags::M3DMAGIC,
            Self::Project => tags::CMAGIC,
            Self::Library => tags::MLIBMAGIC,
        }
    }
}

/// The materials of a 3D Studio file.
///
/// Everything other than materials and version numbers (meshes, cameras,
/// lights, keyframes) is skipped on read and not written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialFile {
    pub kind: FileKind,
    pub version: u32,
    pub mesh_version: u32,
    pub materials: Vec<Material>,
}

impl Default for MaterialFile {
    fn default() -> Self {
        Self::new(FileKind::default())
    }
}

impl MaterialFile {
    /// Creates an empty file of `kind` at format version 3.
    pub fn new(kind: FileKind) -> Self {
        Self {
            kind,
            version: DEFAULT_VERSION,
            mesh_version: DEFAULT_VERSION,
            materials: Vec::new(),
        }
    }

    /// Reads the file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut reader = BufReader::new(File::open(path)?);
        Self::read(&mut reader)
    }

    /// Writes the file to `path`, replacing any existing file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write(&mut writer)?;
        writer.flush().map_err(Error::WriteFailed)
    }

    /// Returns the first material called `name`.
    pub fn find(&self, name: &str) -> Option<&Material> {
        self.materials
            .iter()
            .find(|material| material.name == name)
    }

    /// Reads a file starting at the current stream position.
    ///
    /// A top-level chunk that is not one of the [`FileKind`] containers fails
    /// with [`Error::BadTag`].
    pub fn read<S: Read + Seek + ?Sized>(stream: &mut S) -> Result<Self> {
        let mut chunk = ChunkReader::begin_read(stream, None)?;
        let kind = FileKind::from_tag(chunk.tag()).ok_or(Error::BadTag {
            expected: tags::M3DMAGIC,
            found: chunk.tag(),
        })?;
        let mut file = Self {
            version: 0,
            mesh_version: 0,
            ..Self::new(kind)
        };
        while let Some(tag) = chunk.next_child(stream)? {
            match tag {
                tags::M3D_VERSION => file.version = stream.read_u32()?,
                tags::MDATA => file.read_mdata(stream, &mut chunk)?,
                tags::MAT_ENTRY => {
                    chunk.reset_child(stream)?;
                    file.materials.push(decode_material(stream)?);
                }
                _ => chunk.skip_unknown(stream)?,
            }
        }
        chunk.end_read(stream)?;
        debug!(
            "read {:?} file version {} with {} material(s)",
            file.kind,
            file.version,
            file.materials.len()
        );
        Ok(file)
    }

    fn read_mdata<S: Read + Seek + ?Sized>(
        &mut self,
        stream: &mut S,
        parent: &mut ChunkReader,
    ) -> Result<()> {
        let mut chunk = parent.open_child(stream)?;
        while let Some(tag) = chunk.next_child(stream)? {
            match tag {
                tags::MESH_VERSION => self.mesh_version = stream.read_u32()?,
                tags::MAT_ENTRY => {
                    chunk.reset_child(stream)?;
                    self.materials.push(decode_material(stream)?);
                }
                _ => chunk.skip_unknown(stream)?,
            }
        }
        chunk.end_read(stream)
    }

    /// Writes the file at the current stream position.
    ///
    /// Libraries hold their materials directly; scenes and projects wrap them
    /// in an editor data chunk after the version chunks.
    pub fn write<S: Write + Seek + ?Sized>(&self, stream: &mut S) -> Result<()> {
        let writer = ChunkWriter::begin_write(stream, self.kind.tag())?;
        if self.kind == FileKind::Library {
            self.write_materials(stream)?;
        } else {
            chunk::write_header(stream, tags::M3D_VERSION, VERSION_CHUNK_SIZE)?;
            stream.write_u32(self.version)?;
            let data = ChunkWriter::begin_write(stream, tags::MDATA)?;
            chunk::write_header(stream, tags::MESH_VERSION, VERSION_CHUNK_SIZE)?;
            stream.write_u32(self.mesh_version)?;
            self.write_materials(stream)?;
            data.end_write(stream)?;
        }
        writer.end_write(stream)?;
        Ok(())
    }

    fn write_materials<S: Write + Seek + ?Sized>(&self, stream: &mut S) -> Result<()> {
        for material in &self.materials {
            material.write(stream)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::{TextureMap, TextureSlot};
    use std::io::Cursor;
    use tempfile::NamedTempFile;

    fn sample(kind: FileKind) -> MaterialFile {
        let mut file = MaterialFile::new(kind);
        let mut red = Material::named("Red").unwrap();
        red.diffuse = glam::Vec4::new(1.0, 0.0, 0.0, 1.0);
        let mut wood = Material::named("Wood").unwrap();
        wood[TextureSlot::Texture1Map] = TextureMap::named("wood.jpg").unwrap();
        file.materials = vec![red, wood];
        file
    }

    fn encode(file: &MaterialFile) -> Vec<u8> {
        let mut stream = Cursor::new(Vec::new());
        file.write(&mut stream).unwrap();
        stream.into_inner()
    }

    #[test]
    fn scene_round_trip() {
        let file = sample(FileKind::Scene);
        let bytes = encode(&file);
        assert_eq!(&bytes[..2], &tags::M3DMAGIC.to_le_bytes());
        let back = MaterialFile::read(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(back.kind, FileKind::Scene);
        assert_eq!(back.version, 3);
        assert_eq!(back.mesh_version, 3);
        assert_eq!(back.materials.len(), 2);
        assert_eq!(back.find("Red").unwrap().diffuse.x, 1.0);
        assert_eq!(
            back.find("Wood").unwrap()[TextureSlot::Texture1Map].name,
            "wood.jpg"
        );
        assert!(back.find("Missing").is_none());
    }

    #[test]
    fn library_round_trip() {
        let bytes = encode(&sample(FileKind::Library));
        assert_eq!(&bytes[..2], &tags::MLIBMAGIC.to_le_bytes());
        let back = MaterialFile::read(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(back.kind, FileKind::Library);
        assert_eq!(back.materials.len(), 2);
    }

    #[test]
    fn non_material_chunks_are_skipped() {
        let mut file = sample(FileKind::Scene);
        file.materials.truncate(1);
        let mut bytes = encode(&file);
        let expected = MaterialFile::read(&mut Cursor::new(bytes.clone())).unwrap();

        // Append a named object (0x4000) after the material inside MDATA and
        // grow both enclosing sizes to match.
        let mut object = Vec::new();
        object.extend_from_slice(&0x4000u16.to_le_bytes());
        object.extend_from_slice(&12u32.to_le_bytes());
        object.extend_from_slice(b"Box01\0");
        bytes.extend_from_slice(&object);
        let total = bytes.len() as u32;
        bytes[2..6].copy_from_slice(&total.to_le_bytes());
        let mdata_offset = 16;
        assert_eq!(&bytes[mdata_offset..mdata_offset + 2], &tags::MDATA.to_le_bytes());
        let mdata_size = total - mdata_offset as u32;
        bytes[mdata_offset + 2..mdata_offset + 6].copy_from_slice(&mdata_size.to_le_bytes());

        let back = MaterialFile::read(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(back.materials, expected.materials);
    }

    #[test]
    fn foreign_container_is_rejected() {
        let mut bytes = encode(&sample(FileKind::Scene));
        bytes[..2].copy_from_slice(&0x1234u16.to_le_bytes());
        assert!(matches!(
            MaterialFile::read(&mut Cursor::new(bytes)),
            Err(Error::BadTag {
                expected: tags::M3DMAGIC,
                found: 0x1234
            })
        ));
    }

    #[test]
    fn save_and_open() {
        let tmp = NamedTempFile::new().expect("tmp file");
        let file = sample(FileKind::Project);
        file.save(tmp.path()).unwrap();
        let back = MaterialFile::open(tmp.path()).unwrap();
        assert_eq!(back.kind, FileKind::Project);
        assert_eq!(back.materials.len(), 2);
    }
}
