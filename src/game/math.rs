use super::types::Point;

pub fn add(a: Point, b: Point) -> Point {
    Point {
        x: a.x + b.x,
        y: a.y + b.y,
        z: a.z + b.z,
    }
}

pub fn sub(a: Point, b: Point) -> Point {
    Point {
        x: a.x - b.x,
        y: a.y - b.y,
        z: a.z - b.z,
    }
}

pub fn scale(point: Point, factor: f64) -> Point {
    Point {
        x: point.x * factor,
        y: point.y * factor,
        z: point.z * factor,
    }
}

pub fn length(point: Point) -> f64 {
    (point.x * point.x + point.y * point.y + point.z * point.z).sqrt()
}

pub fn distance(a: Point, b: Point) -> f64 {
    length(sub(a, b))
}

/// Distance on the ground plane, ignoring height.
pub fn planar_distance(a: Point, b: Point) -> f64 {
    ((a.x - b.x).powi(2) + (a.z - b.z).powi(2)).sqrt()
}

pub fn normalize(point: Point) -> Point {
    let len = length(point);
    if !len.is_finite() || len == 0.0 {
        return Point::ZERO;
    }
    scale(point, 1.0 / len)
}

pub fn is_zero(point: Point) -> bool {
    point.x == 0.0 && point.y == 0.0 && point.z == 0.0
}

pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.min(max).max(min)
}

/// Catmull-Rom segment from `p1` to `p2`, with `p0`/`p3` shaping the tangents.
pub fn catmull_rom(p0: Point, p1: Point, p2: Point, p3: Point, t: f64) -> Point {
    let t2 = t * t;
    let t3 = t2 * t;
    let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let h10 = (t3 - 2.0 * t2 + t) * 0.5;
    let h01 = -2.0 * t3 + 3.0 * t2;
    let h11 = (t3 - t2) * 0.5;
    add(
        add(scale(p1, h00), scale(sub(p2, p0), h10)),
        add(scale(p2, h01), scale(sub(p3, p1), h11)),
    )
}

/// Hermite blend with zero end tangents: eases out of `start` and into `end`.
pub fn ease_between(start: Point, end: Point, t: f64) -> Point {
    let t = clamp(t, 0.0, 1.0);
    let t2 = t * t;
    let t3 = t2 * t;
    add(
        scale(start, 2.0 * t3 - 3.0 * t2 + 1.0),
        scale(end, -2.0 * t3 + 3.0 * t2),
    )
}
