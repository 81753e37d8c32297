use crate::game::constants::{
    BONUS_SPAWN_INTERVAL_SECS, FIXED_GAP, FIXED_TICK_MS, FRAME_TICK_MS, GROUND_HALF_EXTENT,
    GROUND_Y, MAX_BONUS_ITEMS, MAX_PLACEMENT_ATTEMPTS, MOVE_SPEED, PATH_MIN_POINTS,
    PATH_POINTS_PER_SEGMENT,
};
use crate::game::path::PathCapacity;
use crate::game::types::{GroundBounds, Point};
use serde::Deserialize;
use std::env;
use std::str::FromStr;

/// Tunables for one chain and the loop that drives it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub fixed_gap: f64,
    pub move_speed: f64,
    pub max_bonus_count: usize,
    pub bonus_spawn_interval: f64,
    pub path_points_per_segment: f64,
    pub path_min_points: usize,
    pub placement_attempts: usize,
    pub ground: GroundBounds,
    pub spawn_point: Point,
    pub fixed_tick_ms: u64,
    pub frame_tick_ms: u64,
    pub port: u16,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fixed_gap: FIXED_GAP,
            move_speed: MOVE_SPEED,
            max_bonus_count: MAX_BONUS_ITEMS,
            bonus_spawn_interval: BONUS_SPAWN_INTERVAL_SECS,
            path_points_per_segment: PATH_POINTS_PER_SEGMENT,
            path_min_points: PATH_MIN_POINTS,
            placement_attempts: MAX_PLACEMENT_ATTEMPTS,
            ground: GroundBounds {
                min_x: -GROUND_HALF_EXTENT,
                max_x: GROUND_HALF_EXTENT,
                min_z: -GROUND_HALF_EXTENT,
                max_z: GROUND_HALF_EXTENT,
                y: GROUND_Y,
            },
            spawn_point: Point::new(0.0, GROUND_Y, 0.0),
            fixed_tick_ms: FIXED_TICK_MS,
            frame_tick_ms: FRAME_TICK_MS,
            port: 8787,
        }
    }
}

fn env_or<T: FromStr>(name: &str, fallback: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<T>().ok())
        .unwrap_or(fallback)
}

impl EngineConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        let ground_y = env_or("CHAIN_GROUND_Y", defaults.ground.y);
        let config = Self {
            fixed_gap: env_or("CHAIN_FIXED_GAP", defaults.fixed_gap),
            move_speed: env_or("CHAIN_MOVE_SPEED", defaults.move_speed),
            max_bonus_count: env_or("CHAIN_MAX_BONUS", defaults.max_bonus_count),
            bonus_spawn_interval: env_or("CHAIN_BONUS_INTERVAL", defaults.bonus_spawn_interval),
            path_points_per_segment: env_or(
                "CHAIN_PATH_RESOLUTION",
                defaults.path_points_per_segment,
            ),
            path_min_points: env_or("CHAIN_PATH_MIN_POINTS", defaults.path_min_points),
            placement_attempts: env_or("CHAIN_PLACEMENT_ATTEMPTS", defaults.placement_attempts),
            ground: GroundBounds {
                min_x: env_or("CHAIN_GROUND_MIN_X", defaults.ground.min_x),
                max_x: env_or("CHAIN_GROUND_MAX_X", defaults.ground.max_x),
                min_z: env_or("CHAIN_GROUND_MIN_Z", defaults.ground.min_z),
                max_z: env_or("CHAIN_GROUND_MAX_Z", defaults.ground.max_z),
                y: ground_y,
            },
            spawn_point: Point::new(
                env_or("CHAIN_SPAWN_X", defaults.spawn_point.x),
                ground_y,
                env_or("CHAIN_SPAWN_Z", defaults.spawn_point.z),
            ),
            fixed_tick_ms: env_or("CHAIN_FIXED_TICK_MS", defaults.fixed_tick_ms),
            frame_tick_ms: env_or("CHAIN_FRAME_TICK_MS", defaults.frame_tick_ms),
            port: env_or("PORT", defaults.port),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let positive = [
            ("fixed_gap", self.fixed_gap),
            ("move_speed", self.move_speed),
            ("bonus_spawn_interval", self.bonus_spawn_interval),
            ("path_points_per_segment", self.path_points_per_segment),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                anyhow::bail!("{name} must be a positive number, got {value}");
            }
        }
        let ground = &self.ground;
        let bounds = [ground.min_x, ground.max_x, ground.min_z, ground.max_z, ground.y];
        if bounds.iter().any(|value| !value.is_finite()) {
            anyhow::bail!("ground bounds must be finite");
        }
        if ground.min_x >= ground.max_x || ground.min_z >= ground.max_z {
            anyhow::bail!("ground bounds are empty or inverted");
        }
        if self.placement_attempts == 0 {
            anyhow::bail!("placement_attempts must be at least 1");
        }
        if self.fixed_tick_ms == 0 || self.frame_tick_ms == 0 {
            anyhow::bail!("tick intervals must be at least 1ms");
        }
        Ok(())
    }

    pub fn path_capacity(&self) -> PathCapacity {
        PathCapacity {
            points_per_segment: self.path_points_per_segment,
            min_points: self.path_min_points,
        }
    }

    pub fn fixed_dt(&self) -> f64 {
        self.fixed_tick_ms as f64 / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.fixed_dt(), 0.02);
    }

    #[test]
    fn validate_rejects_inverted_ground() {
        let mut config = EngineConfig::default();
        config.ground.min_x = 10.0;
        config.ground.max_x = -10.0;
        let error = config.validate().expect_err("inverted bounds should fail");
        assert!(error.to_string().contains("inverted"));
    }

    #[test]
    fn validate_rejects_non_positive_speed() {
        let mut config = EngineConfig::default();
        config.move_speed = 0.0;
        assert!(config.validate().is_err());
        config.move_speed = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"move_speed": 8.0, "max_bonus_count": 3}"#).unwrap();
        assert_eq!(config.move_speed, 8.0);
        assert_eq!(config.max_bonus_count, 3);
        assert_eq!(config.fixed_gap, FIXED_GAP);
    }
}
