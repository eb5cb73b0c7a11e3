/// Horizontal field of view, 75 degrees.
pub const FOV: f32 = 1.308_997;

pub struct Player {
    pub pos: [f32; 2], // (x, y) position in grid units
    pub heading: f32,  // radians, 0 = facing +X
    pub speed: f32,    // grid units / s, signed (negative walks backwards)
    pub turn: f32,     // rad / s, signed
}

impl Player {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            pos: [x, y],
            heading: 0.0,
            speed: 0.0,
            turn: 0.0,
        }
    }

    /// Unit direction vector for the current heading.
    #[inline]
    pub fn dir(&self) -> [f32; 2] {
        [self.heading.cos(), self.heading.sin()]
    }
}

/// Per-column ray geometry, precomputed once per framebuffer width.
///
/// `offset[i]` is the tangent-plane y coordinate of column i's ray for a
/// unit-depth direction (1, offset), sampled at the column center so the
/// table is symmetric about the middle of the screen. `distortion[i]`
/// rescales a ray's true hit distance to its distance from the flat
/// projection plane, removing the fisheye bulge.
pub struct Projection {
    offsets: Vec<f32>,
    distortion: Vec<f32>,
}

impl Projection {
    pub fn new(width: usize, fov: f32) -> Self {
        let tan_half = (fov / 2.0).tan();
        let mut offsets = vec![0.0; width];
        let mut distortion = vec![0.0; width];
        // Compute the left half only and mirror it; computing mirrored
        // columns independently would let f32 rounding break the exact
        // symmetry of the table.
        for i in 0..width.div_ceil(2) {
            let offset = tan_half * (1.0 - (2.0 * i as f32 + 1.0) / width as f32);
            let d = 1.0 / (1.0 + offset * offset).sqrt();
            offsets[i] = offset;
            distortion[i] = d;
            offsets[width - 1 - i] = -offset;
            distortion[width - 1 - i] = d;
        }
        Self {
            offsets,
            distortion,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.offsets.len()
    }

    #[inline]
    pub fn distortion(&self, column: usize) -> f32 {
        self.distortion[column]
    }

    /// Unit ray direction for a column, rotated into world space by the
    /// player's heading.
    #[inline]
    pub fn ray_dir(&self, column: usize, heading: f32) -> [f32; 2] {
        let offset = self.offsets[column];
        let base = (1.0 + offset * offset).sqrt();
        let rx = 1.0 / base;
        let ry = offset / base;
        let c = heading.cos();
        let s = heading.sin();
        [c * rx - s * ry, s * rx + c * ry]
    }
}
