use super::chain::ChainController;
use super::constants::{
    ABSORB_MOVE_SECS, ABSORB_RADIUS_FACTOR, BONUS_MAX_EXPONENT, BONUS_MIN_EXPONENT,
    BONUS_SPACING_FACTOR,
};
use super::error::ChainError;
use super::math::planar_distance;
use super::spacing::{size_for_value, validate_value};
use super::types::{MoveCompletion, Point, Segment, SegmentId};
use rand::Rng;

pub fn random_bonus_value<R: Rng>(rng: &mut R) -> u32 {
    1u32 << rng.gen_range(BONUS_MIN_EXPONENT..=BONUS_MAX_EXPONENT)
}

impl ChainController {
    /// True when a bonus item of `value` at `candidate` keeps clear of every
    /// chain segment and every waiting bonus item.
    pub fn is_clear_for_bonus(&self, candidate: Point, value: u32) -> bool {
        let size = size_for_value(value);
        let clear_of_chain = self.chain.iter().all(|segment| {
            planar_distance(segment.position, candidate)
                >= self.spacing.gap(size_for_value(segment.value), size)
        });
        if !clear_of_chain {
            return false;
        }
        self.bonus.iter().all(|item| {
            let spacing =
                (size_for_value(item.value) + self.config.fixed_gap) * BONUS_SPACING_FACTOR;
            planar_distance(item.position, candidate) >= spacing
        })
    }

    /// Places one bonus item by rejection sampling over the ground bounds.
    ///
    /// Returns `Ok(None)` when the bonus set is already full and
    /// `PlacementExhausted` when no candidate passed within the attempt cap.
    pub fn spawn_bonus<R: Rng>(
        &mut self,
        rng: &mut R,
    ) -> Result<Option<SegmentId>, ChainError> {
        if self.bonus.len() >= self.config.max_bonus_count {
            return Ok(None);
        }
        let value = random_bonus_value(rng);
        let ground = self.config.ground;
        let attempts = self.config.placement_attempts;
        for _ in 0..attempts {
            let candidate = Point {
                x: rng.gen_range(ground.min_x..ground.max_x),
                y: ground.y,
                z: rng.gen_range(ground.min_z..ground.max_z),
            };
            if !self.is_clear_for_bonus(candidate, value) {
                continue;
            }
            return Ok(Some(self.place_bonus(value, candidate)?));
        }
        Err(ChainError::PlacementExhausted { attempts })
    }

    /// Drops a bonus item at an explicit point, bypassing placement rules.
    pub fn place_bonus(&mut self, value: u32, position: Point) -> Result<SegmentId, ChainError> {
        let value = validate_value(value)?;
        let id = self.allocate_id();
        let position = self.pinned(position, value);
        self.bonus.push(Segment {
            id,
            value,
            position,
            facing: self.direction,
        });
        tracing::debug!(id = id.0, value, count = self.bonus.len(), "bonus item placed");
        Ok(id)
    }

    /// Starts absorbing the first bonus item within reach of the head. At most
    /// one absorption runs at a time.
    pub fn check_bonus_collision(&mut self) -> Option<SegmentId> {
        if self.merging {
            return None;
        }
        let head = self.chain.first()?;
        let reach = size_for_value(head.value) * ABSORB_RADIUS_FACTOR;
        let head_position = head.position;
        let index = self
            .bonus
            .iter()
            .position(|item| planar_distance(item.position, head_position) <= reach)?;
        let tail_position = self.chain.last()?.position;

        self.merging = true;
        let item = self.bonus.remove(index);
        let target = self.pinned(tail_position, item.value);
        self.motion.start(
            item.id,
            item.position,
            target,
            ABSORB_MOVE_SECS,
            Some(MoveCompletion::Absorbed {
                item: item.id,
                value: item.value,
            }),
        );
        tracing::debug!(id = item.id.0, value = item.value, "bonus item absorbed");
        let id = item.id;
        self.absorbing.push(item);
        Some(id)
    }
}

/// Timer that tops up the bonus set every `interval` seconds.
#[derive(Debug, Clone)]
pub struct BonusSpawner {
    interval: f64,
    elapsed: f64,
}

impl BonusSpawner {
    pub fn new(interval: f64) -> Self {
        Self {
            interval,
            elapsed: 0.0,
        }
    }

    pub fn tick<R: Rng>(
        &mut self,
        dt: f64,
        chain: &mut ChainController,
        rng: &mut R,
    ) -> Option<SegmentId> {
        self.elapsed += dt;
        if self.elapsed < self.interval {
            return None;
        }
        self.elapsed = 0.0;
        match chain.spawn_bonus(rng) {
            Ok(spawned) => spawned,
            Err(error) => {
                tracing::debug!(%error, "bonus spawn skipped");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::game::types::{ChainEvent, GroundBounds};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn drain(rx: &mut tokio::sync::mpsc::UnboundedReceiver<ChainEvent>) -> Vec<ChainEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn bonus_values_are_powers_of_two_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let value = random_bonus_value(&mut rng);
            assert!(value.is_power_of_two());
            assert!((2..=64).contains(&value));
        }
    }

    #[test]
    fn placed_bonus_keeps_clear_of_chain_and_other_items() {
        let mut chain = ChainController::new(EngineConfig::default());
        chain.spawn_segment(8).unwrap();
        chain.spawn_segment(4).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..10 {
            chain.spawn_bonus(&mut rng).unwrap();
        }
        let items = chain.bonus_items();
        assert_eq!(items.len(), 10);
        for (index, item) in items.iter().enumerate() {
            assert_eq!(item.position.y, 0.5 + size_for_value(item.value) / 2.0);
            for segment in chain.segments() {
                let gap = chain.spacing.gap_between(segment.value, item.value);
                assert!(planar_distance(segment.position, item.position) >= gap);
            }
            for earlier in &items[..index] {
                let spacing = (size_for_value(earlier.value) + 0.2) * 1.5;
                assert!(planar_distance(earlier.position, item.position) >= spacing);
            }
        }
    }

    #[test]
    fn full_bonus_set_skips_spawn() {
        let config = EngineConfig {
            max_bonus_count: 1,
            ..EngineConfig::default()
        };
        let mut chain = ChainController::new(config);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(chain.spawn_bonus(&mut rng).unwrap().is_some());
        assert_eq!(chain.spawn_bonus(&mut rng), Ok(None));
        assert_eq!(chain.bonus_items().len(), 1);
    }

    #[test]
    fn saturated_ground_exhausts_placement() {
        let config = EngineConfig {
            ground: GroundBounds {
                min_x: -0.5,
                max_x: 0.5,
                min_z: -0.5,
                max_z: 0.5,
                y: 0.5,
            },
            placement_attempts: 8,
            ..EngineConfig::default()
        };
        let mut chain = ChainController::new(config);
        chain.spawn_segment(2).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(
            chain.spawn_bonus(&mut rng),
            Err(ChainError::PlacementExhausted { attempts: 8 })
        );
        assert!(chain.bonus_items().is_empty());
    }

    #[test]
    fn spawner_fires_on_interval_and_survives_exhaustion() {
        let config = EngineConfig {
            ground: GroundBounds {
                min_x: -0.5,
                max_x: 0.5,
                min_z: -0.5,
                max_z: 0.5,
                y: 0.5,
            },
            ..EngineConfig::default()
        };
        let mut chain = ChainController::new(config);
        let mut spawner = BonusSpawner::new(1.0);
        let mut rng = StdRng::seed_from_u64(9);
        assert!(spawner.tick(0.5, &mut chain, &mut rng).is_none());
        assert!(spawner.tick(0.5, &mut chain, &mut rng).is_some());
        assert!(spawner.tick(0.5, &mut chain, &mut rng).is_none());
        assert!(spawner.tick(0.5, &mut chain, &mut rng).is_none());
        assert_eq!(chain.bonus_items().len(), 1);
    }

    #[test]
    fn head_absorbs_nearby_bonus_into_new_tail() {
        let mut chain = ChainController::new(EngineConfig::default());
        let mut rx = chain.subscribe();
        chain.spawn_segment(2).unwrap();
        let head = chain.segments()[0].position;
        let item = chain
            .place_bonus(4, Point::new(head.x + 0.5, 0.5, head.z))
            .unwrap();
        let offsets_before = chain.offsets().len();

        assert_eq!(chain.check_bonus_collision(), Some(item));
        assert!(chain.is_merging());
        assert!(chain.bonus_items().is_empty());
        assert_eq!(chain.segments().len(), 1);
        assert_eq!(chain.check_bonus_collision(), None);

        chain.frame_tick(0.25);
        assert_eq!(chain.segments().len(), 1);
        chain.frame_tick(0.25);

        assert!(!chain.is_merging());
        assert_eq!(chain.values(), vec![2, 4]);
        assert_eq!(chain.segments().len(), 2);
        assert_eq!(chain.offsets().len(), offsets_before + 1);
        assert!(chain.snapshot().bonus.is_empty());
        assert!(drain(&mut rx).contains(&ChainEvent::Absorbed { value: 4 }));
    }

    #[test]
    fn bonus_out_of_reach_is_ignored() {
        let mut chain = ChainController::new(EngineConfig::default());
        chain.spawn_segment(2).unwrap();
        chain.place_bonus(4, Point::new(0.8, 0.5, 0.0)).unwrap();
        assert_eq!(chain.check_bonus_collision(), None);
        assert!(!chain.is_merging());
        assert_eq!(chain.bonus_items().len(), 1);
    }

    #[test]
    fn only_one_absorption_per_check() {
        let mut chain = ChainController::new(EngineConfig::default());
        chain.spawn_segment(8).unwrap();
        let first = chain.place_bonus(2, Point::new(0.2, 0.5, 0.0)).unwrap();
        chain.place_bonus(2, Point::new(-0.2, 0.5, 0.0)).unwrap();
        assert_eq!(chain.check_bonus_collision(), Some(first));
        assert_eq!(chain.bonus_items().len(), 1);
        assert_eq!(chain.check_bonus_collision(), None);
    }
}
