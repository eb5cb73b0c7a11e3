use crate::world::WALL_VARIANTS;

/// All surfaces are square TEX_SIZE x TEX_SIZE texel grids.
pub const TEX_SIZE: usize = 64;

#[inline]
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    // BGRA8 in little-endian memory, alpha at 0
    (b as u32) | ((g as u32) << 8) | ((r as u32) << 16)
}

/// Read-only 64x64 RGB surface.
pub struct Texture {
    pixels: Vec<u32>,
}

impl Texture {
    fn from_fn(mut f: impl FnMut(usize, usize) -> u32) -> Self {
        let mut pixels = Vec::with_capacity(TEX_SIZE * TEX_SIZE);
        for v in 0..TEX_SIZE {
            for u in 0..TEX_SIZE {
                pixels.push(f(u, v));
            }
        }
        Self { pixels }
    }

    #[inline]
    pub fn texel(&self, u: usize, v: usize) -> u32 {
        self.pixels[v * TEX_SIZE + u]
    }
}

/// The full surface set: one texture per wall variant plus floor and
/// ceiling. Generated once at startup, never mutated.
pub struct TextureSet {
    walls: Vec<Texture>,
    pub floor: Texture,
    pub ceiling: Texture,
}

impl TextureSet {
    pub fn generate() -> Self {
        let walls = vec![
            brick(pack_rgb(0x00, 0x62, 0x5c), pack_rgb(0x00, 0x22, 0x20)),
            brick(pack_rgb(0x8c, 0x20, 0x18), pack_rgb(0x55, 0x00, 0x00)),
            panel(pack_rgb(0x2a, 0x3e, 0x8c), pack_rgb(0x14, 0x1c, 0x44)),
        ];
        debug_assert_eq!(walls.len(), WALL_VARIANTS as usize);
        Self {
            walls,
            floor: checker(pack_rgb(0x5c, 0x5c, 0x5c), pack_rgb(0x48, 0x48, 0x48)),
            ceiling: checker(pack_rgb(0x38, 0x38, 0x38), pack_rgb(0x2e, 0x2e, 0x30)),
        }
    }

    /// Texture for a nonzero wall variant code. Codes were validated at
    /// map load, so an unknown code here is a bug.
    #[inline]
    pub fn wall(&self, variant: u8) -> &Texture {
        &self.walls[variant as usize - 1]
    }
}

// Small deterministic hash for per-texel grain.
#[inline]
fn grain(u: usize, v: usize) -> u32 {
    let mut h = (u as u32).wrapping_mul(0x9e37_79b9) ^ (v as u32).wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    (h >> 28) & 0x07
}

#[inline]
fn darken(color: u32, sub: u32) -> u32 {
    let r = ((color >> 16) & 0xFF).saturating_sub(sub);
    let g = ((color >> 8) & 0xFF).saturating_sub(sub);
    let b = (color & 0xFF).saturating_sub(sub);
    (r << 16) | (g << 8) | b
}

/// Staggered 32x16 bricks with 2-texel mortar joints.
fn brick(face: u32, mortar: u32) -> Texture {
    Texture::from_fn(|u, v| {
        let course = v / 16;
        let shift = if course % 2 == 0 { 0 } else { 16 };
        let bu = (u + shift) % 32;
        if v % 16 < 2 || bu < 2 {
            mortar
        } else {
            darken(face, grain(u, v) * 4)
        }
    })
}

/// Vertical slats with a darker seam every 16 texels.
fn panel(face: u32, seam: u32) -> Texture {
    Texture::from_fn(|u, v| {
        if u % 16 < 2 {
            seam
        } else {
            darken(face, grain(u, v) * 3)
        }
    })
}

fn checker(a: u32, b: u32) -> Texture {
    Texture::from_fn(|u, v| {
        let base = if (u / 32 + v / 32) % 2 == 0 { a } else { b };
        darken(base, grain(u, v) * 2)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_texture_per_wall_variant() {
        let set = TextureSet::generate();
        for code in 1..=WALL_VARIANTS {
            let _ = set.wall(code);
        }
    }

    #[test]
    fn textures_are_deterministic() {
        let a = TextureSet::generate();
        let b = TextureSet::generate();
        assert_eq!(a.wall(1).texel(5, 9), b.wall(1).texel(5, 9));
        assert_eq!(a.floor.texel(63, 63), b.floor.texel(63, 63));
    }

    #[test]
    fn pack_rgb_is_bgra_layout() {
        assert_eq!(pack_rgb(0x12, 0x34, 0x56), 0x0012_3456);
    }
}
