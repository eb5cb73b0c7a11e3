use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

use crate::camera::{Player, Projection};
use crate::raycast::cast_ray;
use crate::texture::{TEX_SIZE, TextureSet};
use crate::world::WorldGrid;

/// Distances at or below this render at full brightness.
pub const MIN_DIST: f32 = 0.3;
/// Distances at or beyond this render at the darkness floor.
pub const DARKEST_DIST: f32 = 6.0;
/// Minimal lighting, so far geometry never goes fully black.
pub const DARKNESS_FLOOR: u32 = 40;

/// Distance shading: 255 up to MIN_DIST, linear falloff to DARKNESS_FLOOR
/// at DARKEST_DIST, flat beyond. Walls feed this their fisheye-corrected
/// distance; floor and ceiling feed the per-row corrected distance.
#[inline]
pub fn shade(corrected: f32) -> u32 {
    if corrected <= MIN_DIST {
        255
    } else if corrected > DARKEST_DIST {
        DARKNESS_FLOOR
    } else {
        ((corrected - MIN_DIST) * (DARKNESS_FLOOR as f32 - 255.0) / (DARKEST_DIST - MIN_DIST)
            + 255.0) as u32
    }
}

/// Multiplies the color channels by intensity/255. Modulation, not alpha.
#[inline]
fn modulate(color: u32, intensity: u32) -> u32 {
    let r = ((color >> 16) & 0xFF) * intensity / 255;
    let g = ((color >> 8) & 0xFF) * intensity / 255;
    let b = (color & 0xFF) * intensity / 255;
    (r << 16) | (g << 8) | b
}

#[inline]
pub fn projected_height(screen_h: usize, corrected: f32) -> i32 {
    (screen_h as f32 / corrected) as i32
}

/// One column of the framebuffer. All writes go through `put`, which
/// carries the slice bounds check, so sampling math can never scribble
/// into a neighboring column.
pub struct PixelColumn<'a> {
    px: &'a mut [u32],
}

impl<'a> PixelColumn<'a> {
    pub fn new(px: &'a mut [u32]) -> Self {
        Self { px }
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.px.len()
    }

    #[inline]
    pub fn put(&mut self, y: usize, color: u32) {
        self.px[y] = color;
    }
}

/// Renders every column of the frame. The framebuffer is column-major
/// (`fb[col * fb_h + row]`): each column is an independent chunk, written
/// by exactly one rayon task while the grid, tables and textures are read
/// shared.
pub fn render_frame(
    fb: &mut [u32],
    fb_h: usize,
    grid: &WorldGrid,
    proj: &Projection,
    textures: &TextureSet,
    player: &Player,
) {
    debug_assert_eq!(fb.len(), proj.width() * fb_h);
    fb.par_chunks_mut(fb_h).enumerate().for_each(|(i, chunk)| {
        render_column(grid, proj, textures, player, i, PixelColumn::new(chunk));
    });
}

/// Paints a single screen column: textured wall strip in the middle,
/// ceiling rows above it, floor rows below it. Pure with respect to the
/// shared state; output goes only to `col`.
pub fn render_column(
    grid: &WorldGrid,
    proj: &Projection,
    textures: &TextureSet,
    player: &Player,
    column: usize,
    mut col: PixelColumn<'_>,
) {
    let screen_h = col.height();
    let dir = proj.ray_dir(column, player.heading);
    let hit = cast_ray(grid, player.pos, dir);

    let corrected = hit.distance * proj.distortion(column);
    let height = projected_height(screen_h, corrected);
    let top = (screen_h as i32 - height) / 2;

    // Wall strip, v interpolated along the unclamped strip so close walls
    // zoom instead of squashing.
    if height > 0 {
        let tex = textures.wall(hit.variant);
        let intensity = shade(corrected);
        let y0 = top.max(0);
        let y1 = (top + height).min(screen_h as i32);
        for y in y0..y1 {
            let v = ((y - top) as usize * TEX_SIZE) / height as usize;
            col.put(y as usize, modulate(tex.texel(hit.texel_u, v), intensity));
        }
    }

    // Ceiling above the strip, floor below it. A floor row r mirrors
    // ceiling row screen_h-1-r through the same projection inverse; the
    // bands differ by one row when screen_h - height is odd, so each side
    // iterates its own rows.
    let ceil_end = top.max(0) as usize;
    for j in 0..ceil_end {
        let row_corr = screen_h as f32 / (screen_h - 2 * j) as f32;
        let ((tx, ty), intensity) = sample_flat(row_corr, proj, player, dir, column);
        col.put(j, modulate(textures.ceiling.texel(tx, ty), intensity));
    }
    let floor_start = (top + height).clamp(0, screen_h as i32) as usize;
    for row in floor_start..screen_h {
        let j = screen_h - 1 - row;
        let row_corr = screen_h as f32 / (screen_h - 2 * j) as f32;
        let ((tx, ty), intensity) = sample_flat(row_corr, proj, player, dir, column);
        col.put(row, modulate(textures.floor.texel(tx, ty), intensity));
    }
}

/// Inverts the wall projection for one floor/ceiling row: `row_corr` is
/// the fisheye-corrected distance that would project to this row, so the
/// true sample distance divides the column's distortion back out.
#[inline]
fn sample_flat(
    row_corr: f32,
    proj: &Projection,
    player: &Player,
    dir: [f32; 2],
    column: usize,
) -> ((usize, usize), u32) {
    let sample_dist = row_corr / proj.distortion(column);
    let sx = player.pos[0] + dir[0] * sample_dist;
    let sy = player.pos[1] + dir[1] * sample_dist;
    (wrap_texel(sx, sy), shade(row_corr))
}

/// Fractional part wrapped into [0, 1) regardless of sign, scaled to the
/// texel grid.
#[inline]
fn wrap_texel(x: f32, y: f32) -> (usize, usize) {
    let u = x - x.floor();
    let v = y - y.floor();
    ((u * TEX_SIZE as f32) as usize, (v * TEX_SIZE as f32) as usize)
}
