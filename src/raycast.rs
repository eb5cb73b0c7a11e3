use crate::texture::TEX_SIZE;
use crate::world::WorldGrid;

/// Result of one ray query: where the wall was struck, how far away it is,
/// which texture column to sample and which wall variant to sample from.
pub struct WallHit {
    pub point: [f32; 2],
    pub distance: f32,
    pub texel_u: usize, // 0..TEX_SIZE
    pub variant: u8,
}

#[inline]
fn sgn(v: f32) -> i32 {
    if v < 0.0 {
        -1
    } else if v > 0.0 {
        1
    } else {
        0
    }
}

/// Walks the grid-line lattice from `origin` along unit direction `dir`
/// until it enters a solid cell.
///
/// Two candidate crossings are kept live, the next vertical grid line and
/// the next horizontal one, each computed lazily when missing. The nearer
/// candidate (compared by signed travel along its stepping axis) is
/// consumed each step; an axis-aligned ray only ever produces one kind of
/// candidate. The crossed line tells us which cell the ray is entering,
/// picked by stepping sign.
///
/// The bordered map guarantees a hit; the step bound exists to turn a
/// violated border invariant into a loud failure instead of a hang.
pub fn cast_ray(grid: &WorldGrid, origin: [f32; 2], dir: [f32; 2]) -> WallHit {
    let [px, py] = origin;
    let [dx, dy] = dir;

    let step_x = sgn(dx);
    let step_y = sgn(dy);

    // Next vertical line x = v_line, and the ray's y there (lazy).
    let mut v_line = (px + 0.5 * step_x as f32).round() as i32;
    let mut v_y: Option<f32> = None;
    // Next horizontal line y = h_line, and the ray's x there (lazy).
    let mut h_line = (py + 0.5 * step_y as f32).round() as i32;
    let mut h_x: Option<f32> = None;

    let max_steps = 2 * (grid.width() + grid.height());
    for _ in 0..max_steps {
        if v_y.is_none() && step_x != 0 {
            v_y = Some(py + (v_line as f32 - px) * (dy / dx));
        }
        if h_x.is_none() && step_y != 0 {
            h_x = Some(px + (h_line as f32 - py) * (dx / dy));
        }

        // The vertical candidate wins iff it is strictly nearer along the
        // stepping axis; with a single candidate there is nothing to compare.
        let vert_wins = match (v_y, h_x) {
            (Some(_), Some(hx)) => {
                step_x as f32 * (v_line as f32 - px) < step_x as f32 * (hx - px)
            }
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => unreachable!("ray direction has no nonzero component"),
        };

        let (col, row, point, texel_u) = if vert_wins {
            let hy = v_y.take().expect("winning vertical candidate");
            let point = [v_line as f32, hy];

            let mut u = (TEX_SIZE as f32 * hy.fract()) as usize;
            if step_x == 1 {
                // Seen from the left the face would read mirrored.
                u = TEX_SIZE - 1 - u;
            }

            let col = if step_x < 0 { v_line - 1 } else { v_line };
            let row = hy as i32;
            v_line += step_x;
            (col, row, point, u)
        } else {
            let hx = h_x.take().expect("winning horizontal candidate");
            let point = [hx, h_line as f32];

            let mut u = (TEX_SIZE as f32 * hx.fract()) as usize;
            if step_y == -1 {
                // Seen from above the face would read mirrored.
                u = TEX_SIZE - 1 - u;
            }

            let row = if step_y < 0 { h_line - 1 } else { h_line };
            let col = hx as i32;
            h_line += step_y;
            (col, row, point, u)
        };

        let variant = grid.cell(col as usize, row as usize);
        if variant != 0 {
            let ex = point[0] - px;
            let ey = point[1] - py;
            return WallHit {
                point,
                distance: (ex * ex + ey * ey).sqrt(),
                texel_u,
                variant,
            };
        }
    }

    panic!(
        "ray from ({px}, {py}) took more than {max_steps} steps: \
         the map border invariant is violated"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed_3x3() -> WorldGrid {
        WorldGrid::parse("1 1 1\n1 0 1\n1 1 1").unwrap()
    }

    #[test]
    fn axis_rays_from_cell_center_hit_the_near_face() {
        let grid = boxed_3x3();
        let cases = [
            ([1.0, 0.0], [2.0, 1.5]),
            ([-1.0, 0.0], [1.0, 1.5]),
            ([0.0, 1.0], [1.5, 2.0]),
            ([0.0, -1.0], [1.5, 1.0]),
        ];
        for (dir, expected) in cases {
            let hit = cast_ray(&grid, [1.5, 1.5], dir);
            assert_eq!(hit.point, expected);
            assert_eq!(hit.distance, 0.5);
            assert_eq!(hit.variant, 1);
        }
    }

    #[test]
    fn hit_distance_is_exact_on_grid_lines() {
        // Standing on the line between two empty cells, both axis
        // directions strike a border face exactly one unit away.
        let grid = WorldGrid::parse("1 1 1 1\n1 0 0 1\n1 1 1 1").unwrap();
        let right = cast_ray(&grid, [2.0, 1.5], [1.0, 0.0]);
        assert_eq!(right.point, [3.0, 1.5]);
        assert_eq!(right.distance, 1.0);
        let left = cast_ray(&grid, [2.0, 1.5], [-1.0, 0.0]);
        assert_eq!(left.point, [1.0, 1.5]);
        assert_eq!(left.distance, 1.0);
    }

    #[test]
    fn axis_aligned_rays_only_use_one_candidate_kind() {
        // A ray with zero x component must never consult vertical lines;
        // if it did, the division by dx would poison the result with NaN.
        let grid = boxed_3x3();
        let hit = cast_ray(&grid, [1.5, 1.5], [0.0, 1.0]);
        assert!(hit.distance.is_finite());
        assert_eq!(hit.point, [1.5, 2.0]);
    }

    #[test]
    fn texel_u_mirrors_by_approach_side() {
        let grid = boxed_3x3();
        // Hitting a vertical face from the left mirrors u.
        let hit = cast_ray(&grid, [1.25, 1.5], [1.0, 0.0]);
        assert_eq!(hit.texel_u, TEX_SIZE - 1 - TEX_SIZE / 2);
        // From the right it does not.
        let hit = cast_ray(&grid, [1.75, 1.5], [-1.0, 0.0]);
        assert_eq!(hit.texel_u, TEX_SIZE / 2);
        // Horizontal faces mirror when looking down (-y).
        let hit = cast_ray(&grid, [1.5, 1.75], [0.0, -1.0]);
        assert_eq!(hit.texel_u, TEX_SIZE - 1 - TEX_SIZE / 2);
        let hit = cast_ray(&grid, [1.5, 1.25], [0.0, 1.0]);
        assert_eq!(hit.texel_u, TEX_SIZE / 2);
    }

    #[test]
    fn diagonal_hit_reports_straight_line_distance() {
        let grid = boxed_3x3();
        let inv = std::f32::consts::FRAC_1_SQRT_2;
        let hit = cast_ray(&grid, [1.5, 1.5], [inv, inv]);
        // First crossing is the corner at (2, 2); either candidate lands
        // on a wall cell at the same point.
        assert!((hit.distance - 0.5_f32.hypot(0.5)).abs() < 1e-5);
    }

    #[test]
    fn every_direction_terminates_within_the_step_bound() {
        let grid = WorldGrid::parse(crate::world::DEFAULT_MAP).unwrap();
        for i in 0..720 {
            let a = i as f32 * std::f32::consts::PI / 360.0;
            let hit = cast_ray(&grid, [9.3, 4.7], [a.cos(), a.sin()]);
            assert!(hit.distance > 0.0);
            assert!(hit.variant >= 1 && hit.variant <= crate::world::WALL_VARIANTS);
        }
    }

    #[test]
    fn picks_the_entered_cell_by_stepping_sign() {
        // Wall only on the right of a 1x3 corridor interior: stepping +x
        // must report the variant of the cell being entered.
        let grid = WorldGrid::parse("1 1 1 1 1\n1 0 0 2 1\n1 1 1 1 1").unwrap();
        let hit = cast_ray(&grid, [1.5, 1.5], [1.0, 0.0]);
        assert_eq!(hit.variant, 2);
        assert_eq!(hit.point, [3.0, 1.5]);
        let hit = cast_ray(&grid, [2.5, 1.5], [-1.0, 0.0]);
        assert_eq!(hit.variant, 1);
        assert_eq!(hit.point, [1.0, 1.5]);
    }
}
