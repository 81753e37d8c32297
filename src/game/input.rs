use super::types::Point;

/// Snaps a client axis onto the nearest cardinal direction of the ground
/// plane. Zero or non-finite input yields `None`.
pub fn parse_direction(value: Point) -> Option<Point> {
    if !value.x.is_finite() || !value.z.is_finite() {
        return None;
    }
    if value.x == 0.0 && value.z == 0.0 {
        return None;
    }
    let direction = if value.x.abs() > value.z.abs() {
        Point::new(value.x.signum(), 0.0, 0.0)
    } else {
        Point::new(0.0, 0.0, value.z.signum())
    };
    Some(direction)
}
