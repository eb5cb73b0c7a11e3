use crate::camera::Player;
use crate::world::WorldGrid;

/// Walking speed, grid units per second.
pub const DEFAULT_SPEED: f32 = 3.0;
/// Turn rate, radians per second.
pub const TURN_SPEED: f32 = std::f32::consts::PI;
/// Minimum distance kept between the player and any wall cell.
pub const CLEARANCE: f32 = 0.3;

/// Held-key snapshot for one frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct InputState {
    pub forward: bool,
    pub backward: bool,
    pub turn_left: bool,
    pub turn_right: bool,
    pub sprint: bool,
}

/// Derives signed speed and turn rate from the held keys. Sprint doubles
/// both.
pub fn apply_input(player: &mut Player, input: InputState) {
    let mut speed = 0.0;
    let mut turn = 0.0;
    if input.forward {
        speed += DEFAULT_SPEED;
    }
    if input.backward {
        speed -= DEFAULT_SPEED;
    }
    if input.turn_left {
        turn += TURN_SPEED;
    }
    if input.turn_right {
        turn -= TURN_SPEED;
    }
    if input.sprint {
        speed *= 2.0;
        turn *= 2.0;
    }
    player.speed = speed;
    player.turn = turn;
}

#[inline]
fn sgn(v: f32) -> f32 {
    if v < 0.0 {
        -1.0
    } else if v > 0.0 {
        1.0
    } else {
        0.0
    }
}

/// Integrates one tick and resolves collisions against the grid.
///
/// The proposed position is probed at the clearance margin along the
/// direction of travel on both axes. Full move if the leading corners are
/// clear; otherwise try the x-only move, then the y-only move, so a
/// near-diagonal push against a wall slides along the open axis. If both
/// axes are blocked (a corner) the position stays put. Turning is never
/// blocked.
pub fn step(player: &mut Player, grid: &WorldGrid, dt: f32) {
    let [px, py] = player.pos;
    let [cos, sin] = player.dir();

    // Walking backwards leads with the opposite corners.
    let dsgn = sgn(player.speed);
    let sx = sgn(cos) * dsgn;
    let sy = sgn(sin) * dsgn;

    let dp = player.speed * dt;
    let nx = px + cos * dp;
    let ny = py + sin * dp;

    let cx_f = nx + sx * CLEARANCE;
    let cx_b = nx - sx * CLEARANCE;
    let cy_f = ny + sy * CLEARANCE;
    let cy_b = ny - sy * CLEARANCE;

    if !grid.is_wall(cx_f, cy_f) && !grid.is_wall(cx_b, cy_f) && !grid.is_wall(cx_f, cy_b) {
        player.pos = [nx, ny];
    } else if !grid.is_wall(cx_f, py + CLEARANCE) && !grid.is_wall(cx_f, py - CLEARANCE) {
        player.pos[0] = nx;
    } else if !grid.is_wall(px + CLEARANCE, cy_f) && !grid.is_wall(px - CLEARANCE, cy_f) {
        player.pos[1] = ny;
    }
    // else: both axes blocked, stuck on a corner this tick

    player.heading += player.turn * dt;
    // Keep the heading in [-pi, pi] to avoid float drift
    if player.heading > std::f32::consts::PI {
        player.heading -= 2.0 * std::f32::consts::PI;
    }
    if player.heading < -std::f32::consts::PI {
        player.heading += 2.0 * std::f32::consts::PI;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room_4x4() -> WorldGrid {
        // 2x2 open interior
        WorldGrid::parse("1 1 1 1\n1 0 0 1\n1 0 0 1\n1 1 1 1").unwrap()
    }

    #[test]
    fn sprint_doubles_speed_and_turn() {
        let mut player = Player::new(1.5, 1.5);
        apply_input(
            &mut player,
            InputState {
                forward: true,
                turn_left: true,
                ..Default::default()
            },
        );
        assert_eq!(player.speed, DEFAULT_SPEED);
        assert_eq!(player.turn, TURN_SPEED);

        apply_input(
            &mut player,
            InputState {
                forward: true,
                turn_left: true,
                sprint: true,
                ..Default::default()
            },
        );
        assert_eq!(player.speed, 2.0 * DEFAULT_SPEED);
        assert_eq!(player.turn, 2.0 * TURN_SPEED);
    }

    #[test]
    fn opposite_keys_cancel() {
        let mut player = Player::new(1.5, 1.5);
        apply_input(
            &mut player,
            InputState {
                forward: true,
                backward: true,
                turn_left: true,
                turn_right: true,
                ..Default::default()
            },
        );
        assert_eq!(player.speed, 0.0);
        assert_eq!(player.turn, 0.0);
    }

    #[test]
    fn head_on_wall_at_margin_distance_stays_put() {
        let grid = room_4x4();
        let mut player = Player::new(2.7, 1.5); // exactly CLEARANCE from x=3
        player.heading = 0.0;
        player.speed = DEFAULT_SPEED;
        step(&mut player, &grid, 0.1);
        assert_eq!(player.pos, [2.7, 1.5]);
    }

    #[test]
    fn diagonal_into_wall_slides_along_the_open_axis() {
        let grid = room_4x4();
        let mut player = Player::new(1.5, 2.6);
        player.heading = std::f32::consts::FRAC_PI_4; // up-right, top wall at y=3
        player.speed = DEFAULT_SPEED;
        step(&mut player, &grid, 0.05);

        let [x, y] = player.pos;
        assert_eq!(y, 2.6, "blocked axis must not move");
        assert!(x > 1.5, "open axis must slide");
    }

    #[test]
    fn corner_blocks_both_axes() {
        let grid = room_4x4();
        let mut player = Player::new(2.65, 2.65);
        player.heading = std::f32::consts::FRAC_PI_4; // into the (3, 3) corner
        player.speed = DEFAULT_SPEED;
        step(&mut player, &grid, 0.05);
        assert_eq!(player.pos, [2.65, 2.65]);
    }

    #[test]
    fn turning_is_never_blocked() {
        let grid = room_4x4();
        let mut player = Player::new(2.65, 2.65);
        player.heading = std::f32::consts::FRAC_PI_4;
        player.speed = DEFAULT_SPEED;
        player.turn = TURN_SPEED;
        step(&mut player, &grid, 0.05);
        assert_eq!(player.pos, [2.65, 2.65]);
        assert!(player.heading > std::f32::consts::FRAC_PI_4);
    }

    #[test]
    fn backward_walk_leads_with_the_rear_corners() {
        let grid = room_4x4();
        let mut player = Player::new(1.3, 1.5); // CLEARANCE from x=1 behind us
        player.heading = 0.0;
        player.speed = -DEFAULT_SPEED;
        step(&mut player, &grid, 0.1);
        assert_eq!(player.pos, [1.3, 1.5]);
    }

    #[test]
    fn free_movement_integrates_heading_and_speed() {
        let grid = room_4x4();
        let mut player = Player::new(1.5, 1.5);
        player.heading = 0.0;
        player.speed = DEFAULT_SPEED;
        step(&mut player, &grid, 0.1);
        let [x, y] = player.pos;
        assert!((x - 1.8).abs() < 1e-6);
        assert_eq!(y, 1.5);
    }

    #[test]
    fn heading_wraps_to_pi_range() {
        let grid = room_4x4();
        let mut player = Player::new(1.5, 1.5);
        player.heading = std::f32::consts::PI - 0.01;
        player.turn = TURN_SPEED;
        step(&mut player, &grid, 0.1);
        assert!(player.heading <= std::f32::consts::PI);
        assert!(player.heading >= -std::f32::consts::PI);
    }
}
