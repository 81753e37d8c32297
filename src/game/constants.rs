use super::types::Point;

pub const GROUND_Y: f64 = 0.5;
pub const FIXED_GAP: f64 = 0.2;
pub const MOVE_SPEED: f64 = 5.0;
pub const HEAD_STEP_FACTOR: f64 = 0.5;
pub const FOLLOW_HYSTERESIS: f64 = 1.2;
pub const GAP_ROUNDING_SCALE: f64 = 1000.0;

pub const PATH_POINTS_PER_SEGMENT: f64 = 3.0;
pub const PATH_MIN_POINTS: usize = 50;

pub const MIN_SEGMENT_VALUE: u32 = 2;
pub const BONUS_MIN_EXPONENT: u32 = 1;
pub const BONUS_MAX_EXPONENT: u32 = 6;
pub const MAX_BONUS_ITEMS: usize = 20;
pub const BONUS_SPAWN_INTERVAL_SECS: f64 = 5.0;
pub const BONUS_SPACING_FACTOR: f64 = 1.5;
pub const ABSORB_RADIUS_FACTOR: f64 = 0.75;
pub const MAX_PLACEMENT_ATTEMPTS: usize = 32;

pub const ABSORB_MOVE_SECS: f64 = 0.5;
pub const SWAP_MOVE_SECS: f64 = 0.2;

pub const FIXED_TICK_MS: u64 = 20;
pub const FRAME_TICK_MS: u64 = 16;

pub const GROUND_HALF_EXTENT: f64 = 25.0;
pub const DEFAULT_DIRECTION: Point = Point {
    x: 0.0,
    y: 0.0,
    z: 1.0,
};
pub const TRAIL_FALLBACK_DIRECTION: Point = Point {
    x: 0.0,
    y: 0.0,
    z: -1.0,
};
