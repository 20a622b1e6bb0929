//! Chunk tags understood by the codec.
//!
//! The numeric values are format constants shared by every `.3ds` tool and
//! must not change.

pub const COLOR_F: u16 = 0x0010;
pub const COLOR_24: u16 = 0x0011;
pub const LIN_COLOR_24: u16 = 0x0012;
pub const LIN_COLOR_F: u16 = 0x0013;
pub const INT_PERCENTAGE: u16 = 0x0030;
pub const FLOAT_PERCENTAGE: u16 = 0x0031;

pub const M3D_VERSION: u16 = 0x0002;
pub const M3DMAGIC: u16 = 0x4D4D;
pub const CMAGIC: u16 = 0xC23D;
pub const MLIBMAGIC: u16 = 0x3DAA;
pub const MDATA: u16 = 0x3D3D;
pub const MESH_VERSION: u16 = 0x3D3E;

pub const MAT_ENTRY: u16 = 0xAFFF;
pub const MAT_NAME: u16 = 0xA000;
pub const MAT_AMBIENT: u16 = 0xA010;
pub const MAT_DIFFUSE: u16 = 0xA020;
pub const MAT_SPECULAR: u16 = 0xA030;
pub const MAT_SHININESS: u16 = 0xA040;
pub const MAT_SHIN2PCT: u16 = 0xA041;
pub const MAT_TRANSPARENCY: u16 = 0xA050;
pub const MAT_XPFALL: u16 = 0xA052;
pub const MAT_REFBLUR: u16 = 0xA053;
pub const MAT_SELF_ILLUM: u16 = 0xA080;
pub const MAT_TWO_SIDE: u16 = 0xA081;
pub const MAT_DECAL: u16 = 0xA082;
pub const MAT_ADDITIVE: u16 = 0xA083;
pub const MAT_SELF_ILPCT: u16 = 0xA084;
pub const MAT_WIRE: u16 = 0xA085;
pub const MAT_WIRE_SIZE: u16 = 0xA087;
pub const MAT_FACEMAP: u16 = 0xA088;
pub const MAT_PHONGSOFT: u16 = 0xA08C;
pub const MAT_WIREABS: u16 = 0xA08E;
pub const MAT_SHADING: u16 = 0xA100;
pub const MAT_USE_XPFALL: u16 = 0xA240;
pub const MAT_USE_REFBLUR: u16 = 0xA250;
pub const MAT_ACUBIC: u16 = 0xA310;

pub const MAT_TEXMAP: u16 = 0xA200;
pub const MAT_SPECMAP: u16 = 0xA204;
pub const MAT_OPACMAP: u16 = 0xA210;
pub const MAT_REFLMAP: u16 = 0xA220;
pub const MAT_BUMPMAP: u16 = 0xA230;
pub const MAT_TEX2MAP: u16 = 0xA33A;
pub const MAT_SHINMAP: u16 = 0xA33C;
pub const MAT_SELFIMAP: u16 = 0xA33D;
pub const MAT_TEXMASK: u16 = 0xA33E;
pub const MAT_TEX2MASK: u16 = 0xA340;
pub const MAT_OPACMASK: u16 = 0xA342;
pub const MAT_BUMPMASK: u16 = 0xA344;
pub const MAT_SHINMASK: u16 = 0xA346;
pub const MAT_SPECMASK: u16 = 0xA348;
pub const MAT_SELFIMASK: u16 = 0xA34A;
pub const MAT_REFLMASK: u16 = 0xA34C;

pub const MAT_MAPNAME: u16 = 0xA300;
pub const MAT_MAP_TILING: u16 = 0xA351;
pub const MAT_MAP_TEXBLUR: u16 = 0xA353;
pub const MAT_MAP_USCALE: u16 = 0xA354;
pub const MAT_MAP_VSCALE: u16 = 0xA356;
pub const MAT_MAP_UOFFSET: u16 = 0xA358;
pub const MAT_MAP_VOFFSET: u16 = 0xA35A;
pub const MAT_MAP_ANG: u16 = 0xA35C;
pub const MAT_MAP_COL1: u16 = 0xA360;
pub const MAT_MAP_COL2: u16 = 0xA362;
pub const MAT_MAP_RCOL: u16 = 0xA364;
pub const MAT_MAP_GCOL: u16 = 0xA366;
pub const MAT_MAP_BCOL: u16 = 0xA368;
