//! Human readable rendering of decoded materials.
//!
//! The layout is fixed: one `label: value` line per field in declaration
//! order, floats with six decimals, flags as `yes`/`no`, and one block per
//! texture map that references a file.

use std::fmt;

use glam::{Vec2, Vec3, Vec4};

use crate::material::Material;
use crate::texture::TextureMap;

/// [`fmt::Display`] adapter producing the dump of one material.
pub struct MaterialDump<'a>(pub &'a Material);

/// Renders `material` as text.
pub fn dump_material(material: &Material) -> String {
    MaterialDump(material).to_string()
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

struct Rgb(Vec4);

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6}, {:.6})", self.0.x, self.0.y, self.0.z)
    }
}

struct Triple(Vec3);

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6}, {:.6})", self.0.x, self.0.y, self.0.z)
    }
}

struct Pair(Vec2);

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.0.x, self.0.y)
    }
}

impl fmt::Display for MaterialDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.0;
        writeln!(f, "  name:          {}", m.name)?;
        writeln!(f, "  ambient:       {}", Rgb(m.ambient))?;
        writeln!(f, "  diffuse:       {}", Rgb(m.diffuse))?;
        writeln!(f, "  specular:      {}", Rgb(m.specular))?;
        writeln!(f, "  shininess:     {:.6}", m.shininess)?;
        writeln!(f, "  shin_strength: {:.6}", m.shin_strength)?;
        writeln!(f, "  transparency:  {:.6}", m.transparency)?;
        writeln!(f, "  use_falloff:   {}", yes_no(m.use_falloff))?;
        writeln!(f, "  falloff:       {:.6}", m.falloff)?;
        writeln!(f, "  additive:      {}", yes_no(m.additive))?;
        writeln!(f, "  use_blur:      {}", yes_no(m.use_blur))?;
        writeln!(f, "  blur:          {:.6}", m.blur)?;
        writeln!(f, "  self_illum:    {}", yes_no(m.self_illum))?;
        writeln!(f, "  self_ilpct:    {:.6}", m.self_illum_percent)?;
        writeln!(f, "  two_sided:     {}", yes_no(m.two_sided))?;
        writeln!(f, "  map_decal:     {}", yes_no(m.map_decal))?;
        writeln!(f, "  face_map:      {}", yes_no(m.face_map))?;
        writeln!(f, "  soften:        {}", yes_no(m.soften))?;
        writeln!(f, "  shading:       {}", m.shading)?;
        writeln!(f, "  use_wire:      {}", yes_no(m.use_wire))?;
        writeln!(f, "  use_wire_abs:  {}", yes_no(m.use_wire_abs))?;
        writeln!(f, "  wire_size:     {:.6}", m.wire_size)?;
        let acubic = &m.auto_reflection;
        writeln!(
            f,
            "  autorefl_map:  flags={:X} level={} size={} frame_step={}",
            acubic.flags, acubic.level, acubic.size, acubic.frame_step
        )?;
        for (slot, map) in m.present_textures() {
            write_texture(f, slot.label(), map)?;
        }
        Ok(())
    }
}

fn write_texture(f: &mut fmt::Formatter<'_>, label: &str, map: &TextureMap) -> fmt::Result {
    writeln!(f, "  {label}:")?;
    writeln!(f, "    name:        {}", map.name)?;
    writeln!(f, "    flags:       {:X}", map.flags.bits())?;
    writeln!(f, "    percent:     {:.6}", map.percent)?;
    writeln!(f, "    blur:        {:.6}", map.blur)?;
    writeln!(f, "    scale:       {}", Pair(map.scale))?;
    writeln!(f, "    offset:      {}", Pair(map.offset))?;
    writeln!(f, "    rotation:    {:.6}", map.rotation)?;
    writeln!(f, "    tint_1:      {}", Triple(map.tint_1))?;
    writeln!(f, "    tint_2:      {}", Triple(map.tint_2))?;
    writeln!(f, "    tint_r:      {}", Triple(map.tint_r))?;
    writeln!(f, "    tint_g:      {}", Triple(map.tint_g))?;
    writeln!(f, "    tint_b:      {}", Triple(map.tint_b))
}
