use thiserror::Error;

/// Number of wall texture variants the renderer knows about.
/// Map cells must stay within 0..=WALL_VARIANTS.
pub const WALL_VARIANTS: u8 = 3;

#[derive(Debug, Error)]
pub enum MapError {
    #[error("map row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("map must be at least 3x3, got {width}x{height}")]
    TooSmall { width: usize, height: usize },
    #[error("unreadable cell {token:?} at row {row}, column {col}")]
    BadToken {
        token: String,
        row: usize,
        col: usize,
    },
    #[error("wall variant {code} at ({col}, {row}) has no texture (max {max})")]
    UnknownVariant {
        code: u8,
        col: usize,
        row: usize,
        max: u8,
    },
    #[error("border cell ({col}, {row}) is empty; the map edge must be solid")]
    OpenBorder { col: usize, row: usize },
    #[error("map is empty")]
    Empty,
}

/// Immutable tile map. Cell code 0 is passable, 1..=WALL_VARIANTS pick a
/// wall texture. Rows are stored with row 0 at the BOTTOM of the map so
/// continuous y grows upward, matching the ray and movement math.
pub struct WorldGrid {
    cells: Vec<u8>,
    width: usize,
    height: usize,
}

impl WorldGrid {
    /// Parses a whitespace-separated integer grid. The first text line is
    /// the top row of the map. Rejects ragged rows, unknown wall variants
    /// and any hole in the border.
    pub fn parse(text: &str) -> Result<Self, MapError> {
        let mut rows: Vec<Vec<u8>> = Vec::new();
        for (row, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let mut cells = Vec::new();
            for (col, token) in line.split_whitespace().enumerate() {
                let code: u8 = token.parse().map_err(|_| MapError::BadToken {
                    token: token.to_string(),
                    row,
                    col,
                })?;
                cells.push(code);
            }
            rows.push(cells);
        }

        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if height == 0 || width == 0 {
            return Err(MapError::Empty);
        }
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != width {
                return Err(MapError::RaggedRow {
                    row,
                    expected: width,
                    found: cells.len(),
                });
            }
        }
        if width < 3 || height < 3 {
            return Err(MapError::TooSmall { width, height });
        }

        // Flip so that cells[0..width] is the bottom row.
        rows.reverse();
        let cells: Vec<u8> = rows.into_iter().flatten().collect();

        let grid = Self {
            cells,
            width,
            height,
        };
        grid.validate()?;
        Ok(grid)
    }

    fn validate(&self) -> Result<(), MapError> {
        for row in 0..self.height {
            for col in 0..self.width {
                let code = self.cell(col, row);
                if code > WALL_VARIANTS {
                    return Err(MapError::UnknownVariant {
                        code,
                        col,
                        row,
                        max: WALL_VARIANTS,
                    });
                }
                let on_border =
                    row == 0 || col == 0 || row == self.height - 1 || col == self.width - 1;
                if on_border && code == 0 {
                    return Err(MapError::OpenBorder { col, row });
                }
            }
        }
        Ok(())
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Cell code at integer coordinates, row 0 at the bottom.
    /// Out-of-bounds indices are a caller bug and panic.
    #[inline]
    pub fn cell(&self, col: usize, row: usize) -> u8 {
        assert!(col < self.width && row < self.height, "cell out of bounds");
        self.cells[row * self.width + col]
    }

    /// Whether the cell containing the continuous point (x, y) is solid.
    /// Coordinates truncate toward zero; callers keep the player strictly
    /// inside the bordered interior, so x and y are never negative here.
    #[inline]
    pub fn is_wall(&self, x: f32, y: f32) -> bool {
        self.cell(x as usize, y as usize) != 0
    }
}

/// The built-in level: 18x10, three wall variants, fully bordered.
pub const DEFAULT_MAP: &str = "\
1 1 1 1 1 1 1 1 1 1 1 1 1 1 1 1 1 1
1 0 0 0 0 1 0 0 0 0 0 1 0 0 0 0 0 1
1 0 2 1 0 1 1 0 1 1 0 1 0 0 0 0 0 1
1 0 2 0 0 0 1 0 1 0 1 0 0 0 0 0 0 1
1 0 0 0 1 0 1 0 1 0 0 0 0 0 0 0 0 1
1 1 1 1 1 0 1 0 0 0 1 0 0 1 0 0 0 1
1 0 0 0 0 0 0 0 1 0 0 0 0 1 0 0 0 1
1 0 1 1 0 2 1 1 1 0 0 0 0 0 0 0 0 1
1 0 0 0 0 3 0 0 0 0 0 0 0 0 0 0 0 1
1 1 1 1 1 1 1 1 1 1 1 1 1 1 1 1 1 1
";
