use super::constants::{
    DEFAULT_DIRECTION, FOLLOW_HYSTERESIS, HEAD_STEP_FACTOR, TRAIL_FALLBACK_DIRECTION,
};
use super::error::ChainError;
use super::events::EventBus;
use super::math::{add, distance, is_zero, normalize, scale};
use super::motion::MotionScheduler;
use super::path::PathHistory;
use super::spacing::{size_for_value, validate_value, SpacingModel};
use super::types::{
    ChainEvent, ChainSnapshot, MoveCompletion, Point, Segment, SegmentId, SegmentView,
};
use crate::config::EngineConfig;
use tokio::sync::mpsc::UnboundedReceiver;

/// Ordered body of segments following the head's recorded trail.
///
/// Index 0 is the head. Bonus items live beside the chain until the head
/// reaches one; while an absorbed item travels to the tail it sits in
/// `absorbing` and the `merging` flag blocks further merges and absorptions.
#[derive(Debug)]
pub struct ChainController {
    pub(super) config: EngineConfig,
    pub(super) spacing: SpacingModel,
    pub(super) chain: Vec<Segment>,
    pub(super) bonus: Vec<Segment>,
    pub(super) absorbing: Vec<Segment>,
    pub(super) offsets: Vec<f64>,
    pub(super) path: PathHistory,
    pub(super) motion: MotionScheduler,
    pub(super) direction: Point,
    pub(super) merging: bool,
    pub(super) events: EventBus,
    next_id: u64,
}

impl ChainController {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            spacing: SpacingModel::new(config.fixed_gap),
            config,
            chain: Vec::new(),
            bonus: Vec::new(),
            absorbing: Vec::new(),
            offsets: Vec::new(),
            path: PathHistory::new(),
            motion: MotionScheduler::new(),
            direction: DEFAULT_DIRECTION,
            merging: false,
            events: EventBus::new(),
            next_id: 1,
        }
    }

    pub fn subscribe(&mut self) -> UnboundedReceiver<ChainEvent> {
        self.events.subscribe()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.chain
    }

    pub fn bonus_items(&self) -> &[Segment] {
        &self.bonus
    }

    #[cfg(test)]
    pub fn offsets(&self) -> &[f64] {
        &self.offsets
    }

    pub fn path(&self) -> &PathHistory {
        &self.path
    }

    pub fn direction(&self) -> Point {
        self.direction
    }

    pub fn is_merging(&self) -> bool {
        self.merging
    }

    pub fn head_id(&self) -> Option<SegmentId> {
        self.chain.first().map(|segment| segment.id)
    }

    pub fn values(&self) -> Vec<u32> {
        self.chain.iter().map(|segment| segment.value).collect()
    }

    /// Ignores zero or non-finite input; otherwise steers the head along `direction`.
    pub fn set_direction(&mut self, direction: Point) {
        if !(direction.x.is_finite() && direction.y.is_finite() && direction.z.is_finite()) {
            return;
        }
        let direction = normalize(direction);
        if is_zero(direction) {
            return;
        }
        self.direction = direction;
    }

    pub(super) fn allocate_id(&mut self) -> SegmentId {
        let id = SegmentId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Lifts `point` so a segment of `value` rests on the ground.
    pub(super) fn pinned(&self, point: Point, value: u32) -> Point {
        Point {
            y: self.config.ground.y + size_for_value(value) / 2.0,
            ..point
        }
    }

    pub(super) fn find_mut(&mut self, id: SegmentId) -> Option<&mut Segment> {
        self.chain
            .iter_mut()
            .chain(self.bonus.iter_mut())
            .chain(self.absorbing.iter_mut())
            .find(|segment| segment.id == id)
    }

    pub(super) fn refresh_offsets(&mut self) {
        let values = self.values();
        self.offsets = self.spacing.cumulative_offsets(&values);
    }

    fn path_capacity(&self) -> usize {
        self.config
            .path_capacity()
            .for_chain(self.config.move_speed, self.chain.len())
    }

    /// Appends a segment at the tail, then runs a merge pass.
    pub fn spawn_segment(&mut self, value: u32) -> Result<SegmentId, ChainError> {
        let value = validate_value(value)?;
        let position = match self.chain.last() {
            None => self.config.spawn_point,
            Some(tail) => {
                let direction = self
                    .path
                    .trailing_direction()
                    .unwrap_or(TRAIL_FALLBACK_DIRECTION);
                let gap = self.spacing.gap_between(tail.value, value);
                add(tail.position, scale(direction, gap))
            }
        };
        let id = self.allocate_id();
        let position = self.pinned(position, value);
        self.chain.push(Segment {
            id,
            value,
            position,
            facing: self.direction,
        });
        self.refresh_offsets();
        tracing::debug!(id = id.0, value, length = self.chain.len(), "segment spawned");
        self.merge_pass();
        Ok(id)
    }

    /// Movement tick followed by a merge pass. A failed movement step is
    /// logged and dropped; the chain stays usable for the next tick.
    pub fn fixed_tick(&mut self, dt: f64) {
        if let Err(error) = self.advance_chain(dt) {
            tracing::error!(%error, "chain tick abandoned");
        }
        let report = self.merge_pass();
        if !report.is_empty() {
            tracing::debug!(
                merges = report.merges,
                swaps = report.swaps,
                length = self.chain.len(),
                "merge pass settled chain"
            );
        }
    }

    pub(super) fn advance_chain(&mut self, dt: f64) -> Result<(), ChainError> {
        let Some(head) = self.chain.first() else { return Ok(()) };
        let (head_id, head_position, head_value) = (head.id, head.position, head.value);
        // An unfinished head move counts as already travelled.
        let head_origin = self.motion.target_of(head_id).unwrap_or(head_position);

        let step = scale(
            self.direction,
            self.config.move_speed * dt * HEAD_STEP_FACTOR,
        );
        let mut waypoint = add(head_origin, step);
        waypoint.y = self.config.ground.y;
        let capacity = self.path_capacity();
        self.path.record(waypoint, capacity);

        let head_target = self.pinned(waypoint, head_value);
        self.motion.start(
            head_id,
            head_position,
            head_target,
            dt,
            Some(MoveCompletion::HeadArrived),
        );

        if self.offsets.len() != self.chain.len() {
            return Err(ChainError::StaleOffsets {
                chain: self.chain.len(),
                offsets: self.offsets.len(),
            });
        }
        let threshold = self.config.fixed_gap * FOLLOW_HYSTERESIS;
        for index in 1..self.chain.len() {
            let follower = &self.chain[index];
            let (id, position, value) = (follower.id, follower.position, follower.value);
            let trail_point = self.path.position_at_distance(self.offsets[index]);
            let target = self.pinned(trail_point, value);
            if distance(position, target) > threshold {
                self.motion.start(id, position, target, dt, None);
            }
        }

        if !is_zero(self.direction) {
            if let Some(head) = self.chain.first_mut() {
                head.facing = self.direction;
            }
        }

        self.check_bonus_collision();
        Ok(())
    }

    /// Advances in-flight smooth moves and applies whatever completed.
    pub fn frame_tick(&mut self, dt: f64) {
        let step = self.motion.advance(dt);
        for (id, point) in step.positions {
            let ground_y = self.config.ground.y;
            if let Some(segment) = self.find_mut(id) {
                segment.position = Point {
                    y: ground_y + size_for_value(segment.value) / 2.0,
                    ..point
                };
            }
        }
        for completion in step.completions {
            if let Err(error) = self.apply_completion(completion) {
                tracing::warn!(%error, ?completion, "move completion failed");
            }
        }
    }

    fn apply_completion(&mut self, completion: MoveCompletion) -> Result<(), ChainError> {
        match completion {
            MoveCompletion::HeadArrived => {
                let head = self.head_id();
                self.events.emit(ChainEvent::HeadChanged { head });
                Ok(())
            }
            MoveCompletion::Absorbed { item, value } => {
                let spawned = self.spawn_segment(value);
                let removed = self.destroy_absorbed(item);
                self.merging = false;
                spawned?;
                removed?;
                self.events.emit(ChainEvent::Absorbed { value });
                Ok(())
            }
        }
    }

    fn destroy_absorbed(&mut self, item: SegmentId) -> Result<(), ChainError> {
        self.motion.cancel(item);
        let index = self
            .absorbing
            .iter()
            .position(|segment| segment.id == item)
            .ok_or(ChainError::MissingSegment(item))?;
        self.absorbing.remove(index);
        Ok(())
    }

    pub fn snapshot(&self) -> ChainSnapshot {
        let view = |segment: &Segment| SegmentView {
            id: segment.id,
            value: segment.value,
            size: size_for_value(segment.value),
            position: segment.position,
            facing: segment.facing,
        };
        ChainSnapshot {
            segments: self.chain.iter().map(view).collect(),
            bonus: self
                .bonus
                .iter()
                .chain(self.absorbing.iter())
                .map(view)
                .collect(),
            head: self.head_id(),
            merging: self.merging,
        }
    }
}
