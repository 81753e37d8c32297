use super::math::ease_between;
use super::types::{MoveCompletion, Point, SegmentId};
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct SmoothMove {
    start: Point,
    target: Point,
    duration: f64,
    elapsed: f64,
    completion: Option<MoveCompletion>,
}

/// Position writes produced by one scheduler step.
#[derive(Debug, Default)]
pub struct MotionStep {
    pub positions: Vec<(SegmentId, Point)>,
    pub completions: Vec<MoveCompletion>,
}

/// In-flight smooth moves, polled once per frame.
///
/// A move never writes on the call that starts it. Each later `advance`
/// adds its delta to the elapsed time and eases the segment toward the
/// target; the `advance` that brings elapsed time to the duration snaps to
/// the target and hands back the completion. Starting a move on a segment
/// that is already moving replaces the old move and releases its completion
/// on the next `advance`.
#[derive(Debug, Default)]
pub struct MotionScheduler {
    moves: HashMap<SegmentId, SmoothMove>,
    released: Vec<MoveCompletion>,
}

impl MotionScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(
        &mut self,
        id: SegmentId,
        from: Point,
        target: Point,
        duration: f64,
        completion: Option<MoveCompletion>,
    ) {
        let next = SmoothMove {
            start: from,
            target,
            duration: duration.max(0.0),
            elapsed: 0.0,
            completion,
        };
        if let Some(previous) = self.moves.insert(id, next) {
            if let Some(completion) = previous.completion {
                self.released.push(completion);
            }
        }
    }

    #[cfg(test)]
    pub fn is_moving(&self, id: SegmentId) -> bool {
        self.moves.contains_key(&id)
    }

    pub fn target_of(&self, id: SegmentId) -> Option<Point> {
        self.moves.get(&id).map(|entry| entry.target)
    }

    #[cfg(test)]
    pub fn in_flight(&self) -> usize {
        self.moves.len()
    }

    /// Drops a move without firing its completion; used when the segment is destroyed.
    pub fn cancel(&mut self, id: SegmentId) {
        self.moves.remove(&id);
    }

    pub fn advance(&mut self, dt: f64) -> MotionStep {
        let mut step = MotionStep {
            positions: Vec::with_capacity(self.moves.len()),
            completions: std::mem::take(&mut self.released),
        };
        let mut finished: Vec<SegmentId> = Vec::new();

        for (id, entry) in self.moves.iter_mut() {
            entry.elapsed += dt.max(0.0);
            if entry.elapsed >= entry.duration {
                step.positions.push((*id, entry.target));
                finished.push(*id);
                continue;
            }
            let t = entry.elapsed / entry.duration;
            step.positions
                .push((*id, ease_between(entry.start, entry.target, t)));
        }

        finished.sort();
        for id in finished {
            if let Some(entry) = self.moves.remove(&id) {
                if let Some(completion) = entry.completion {
                    step.completions.push(completion);
                }
            }
        }
        step
    }
}
