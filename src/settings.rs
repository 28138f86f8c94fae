//! World configuration
//!
//! Loaded once at startup from JSON. Every field has a default, so a config
//! file only needs the values it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::sim::collision::ContactParams;

/// Tunables for one simulated world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    // === Storage ===
    /// Maximum live actors
    pub capacity: usize,
    /// Maximum registered views (three are built in)
    pub max_views: usize,

    // === Stepping ===
    /// Fixed physics step in seconds
    pub fixed_dt: f32,
    /// Cap on steps per frame; excess whole steps are dropped. `None` drains
    /// everything.
    pub max_substeps: Option<u32>,
    /// Most unconsumed time kept between frames, in seconds. Whole steps
    /// beyond it are dropped so one frame never drains without bound.
    pub max_backlog: f32,

    // === Contacts ===
    pub restitution: f32,
    pub slop: f32,
    pub correction_percent: f32,

    // === Behaviors ===
    pub player_speed: f32,
    /// Blend rate toward the target velocity, per second
    pub player_accel: f32,
    pub player_turn_rate: f32,
    pub enemy_speed: f32,
    pub enemy_accel: f32,
    pub enemy_turn_rate: f32,
    /// Arc distance between neighbouring allies on a ring
    pub ally_spacing: f32,
    pub ally_speed: f32,
    /// Approach speed per unit of distance from the ring slot
    pub ally_gain: f32,
    pub ally_accel: f32,

    // === Camera ===
    pub camera_view_height: f32,
    pub camera_follow_rate: f32,

    // === Spawning ===
    pub enemy_count: u32,
    pub ally_count: u32,
    /// Enemies spawn uniformly in [-extent, extent]²
    pub spawn_extent: f32,
    /// RNG seed for spawn positions
    pub seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            capacity: MAX_ACTORS,
            max_views: MAX_VIEWS,

            fixed_dt: FIXED_DT,
            max_substeps: None,
            max_backlog: MAX_BACKLOG,

            restitution: RESTITUTION,
            slop: PENETRATION_SLOP,
            correction_percent: CORRECTION_PERCENT,

            player_speed: 10.0,
            player_accel: 10.0,
            player_turn_rate: 20.0,
            enemy_speed: 10.0,
            enemy_accel: 5.0,
            enemy_turn_rate: 5.0,
            ally_spacing: 2.0,
            ally_speed: 10.0,
            ally_gain: 10.0,
            ally_accel: 5.0,

            camera_view_height: 15.0,
            camera_follow_rate: 2.0,

            enemy_count: 1,
            ally_count: 0,
            spawn_extent: 10.0,
            seed: 0,
        }
    }
}

impl WorldConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded world config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let json =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, json)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        log::info!("World config saved to {}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.capacity == 0 || self.capacity >= u32::MAX as usize {
            return invalid("capacity must be in 1..u32::MAX");
        }
        if self.max_views < 3 {
            return invalid("max_views must leave room for the 3 built-in views");
        }
        if !(self.fixed_dt > 0.0 && self.fixed_dt.is_finite()) {
            return invalid("fixed_dt must be positive");
        }
        if self.max_substeps == Some(0) {
            return invalid("max_substeps must be at least 1");
        }
        if !(self.max_backlog >= self.fixed_dt && self.max_backlog.is_finite()) {
            return invalid("max_backlog must be finite and at least one fixed_dt");
        }
        if self.restitution < 0.0 {
            return invalid("restitution must not be negative");
        }
        if !(0.0..=1.0).contains(&self.correction_percent) {
            return invalid("correction_percent must be within 0..=1");
        }
        if self.slop < 0.0 {
            return invalid("slop must not be negative");
        }
        if self.ally_gain < 0.0 {
            return invalid("ally_gain must not be negative");
        }
        if self.ally_spacing <= 0.0 {
            return invalid("ally_spacing must be positive");
        }
        if !(self.spawn_extent >= 0.0 && self.spawn_extent.is_finite()) {
            return invalid("spawn_extent must be finite and not negative");
        }
        let spawned = 1 + self.enemy_count as usize + self.ally_count as usize;
        if spawned > self.capacity {
            return invalid("initial actors exceed capacity");
        }
        Ok(())
    }

    pub fn contact_params(&self) -> ContactParams {
        ContactParams {
            restitution: self.restitution,
            slop: self.slop,
            correction_percent: self.correction_percent,
        }
    }
}
