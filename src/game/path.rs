use super::error::ChainError;
use super::math::{catmull_rom, distance, is_zero, normalize, sub};
use super::types::Point;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy)]
pub struct PathCapacity {
    pub points_per_segment: f64,
    pub min_points: usize,
}

impl PathCapacity {
    /// Waypoints retained for a chain of `segment_count` moving at `speed`.
    pub fn for_chain(&self, speed: f64, segment_count: usize) -> usize {
        let per_segment = (speed * self.points_per_segment * segment_count as f64)
            .ceil()
            .max(0.0) as usize;
        per_segment
            .saturating_mul(segment_count + 1)
            .max(self.min_points)
    }
}

/// Trail of the head, newest waypoint first.
#[derive(Debug, Clone, Default)]
pub struct PathHistory {
    points: VecDeque<Point>,
}

impl PathHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[cfg(test)]
    pub fn newest(&self) -> Option<Point> {
        self.points.front().copied()
    }

    #[cfg(test)]
    pub fn oldest(&self) -> Option<Point> {
        self.points.back().copied()
    }

    pub fn record(&mut self, point: Point, capacity: usize) {
        self.points.push_front(point);
        while self.points.len() > capacity.max(1) {
            self.points.pop_back();
        }
    }

    #[cfg(test)]
    pub fn total_length(&self) -> f64 {
        self.points
            .iter()
            .zip(self.points.iter().skip(1))
            .map(|(a, b)| distance(*a, *b))
            .sum()
    }

    /// Direction pointing past the oldest waypoint, away from the trail.
    pub fn trailing_direction(&self) -> Option<Point> {
        let len = self.points.len();
        if len < 2 {
            return None;
        }
        let oldest = self.points[len - 1];
        let before = self.points[len - 2];
        let direction = normalize(sub(oldest, before));
        if is_zero(direction) {
            return None;
        }
        Some(direction)
    }

    pub fn try_position_at_distance(&self, target: f64) -> Result<Point, ChainError> {
        let last = self.points.len().checked_sub(1).ok_or(ChainError::EmptyPath)?;
        let mut covered = 0.0;
        for i in 1..self.points.len() {
            let p1 = self.points[i - 1];
            let p2 = self.points[i];
            let segment = distance(p1, p2);
            covered += segment;
            if covered < target {
                continue;
            }
            let t = if segment > f64::EPSILON {
                1.0 - (covered - target) / segment
            } else {
                0.0
            };
            let p0 = if i > 1 { self.points[i - 2] } else { p1 };
            let p3 = if i < last { self.points[i + 1] } else { p2 };
            return Ok(catmull_rom(p0, p1, p2, p3, t));
        }
        Ok(self.points[last])
    }

    /// Point `target` units behind the newest waypoint, measured along the trail.
    /// An empty history yields the origin.
    pub fn position_at_distance(&self, target: f64) -> Point {
        match self.try_position_at_distance(target) {
            Ok(point) => point,
            Err(error) => {
                tracing::warn!(%error, target, "path query without waypoints");
                Point::ZERO
            }
        }
    }
}
