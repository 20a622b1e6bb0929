//! Chunk codec for 3D Studio material records.
//!
//! A `.3ds` stream is a tree of length-prefixed chunks. The crate provides
//! the byte-level primitives, the chunk envelope reader and writer, and the
//! material record built on top of them, including its color, percentage and
//! texture-map sub-records. Chunks the codec does not understand are skipped,
//! so files written by newer tools still load.

pub mod chunk;
pub mod dump;
pub mod error;
pub mod file;
pub mod io;
pub mod material;
pub mod name;
pub mod tags;
pub mod texture;
pub mod value;

pub use chunk::{ChunkHeader, ChunkReader, ChunkWriter};
pub use dump::{dump_material, MaterialDump};
pub use error::{Error, Result};
pub use file::{FileKind, MaterialFile};
pub use io::{StreamRead, StreamWrite};
pub use material::{decode_material, encode_material, AutoReflectionMap, Material, Shading};
pub use name::Name;
pub use texture::{TextureFlags, TextureMap, TextureSlot};
