//! World state
//!
//! Everything the host frame loop drives: actors, camera, the player's
//! handle and input, and the fixed-step accumulator.

use glam::{Vec2, Vec4};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::actor::{ActorStore, CreateCtx, Transform, kind};
use super::camera::Camera;
use crate::error::SimError;
use crate::index::Handle;
use crate::input::InputMap;
use crate::settings::WorldConfig;

pub const PLAYER_COLOR: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0);
pub const ENEMY_COLOR: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0);
pub const ALLY_COLOR: Vec4 = Vec4::new(0.2, 0.4, 1.0, 1.0);

/// The controlled actor and what the host feeds it
#[derive(Debug, Clone, Copy, Default)]
pub struct Player {
    pub handle: Handle,
    pub input: InputMap,
}

/// A complete simulated world
pub struct World {
    pub config: WorldConfig,
    pub actors: ActorStore,
    pub camera: Camera,
    pub player: Player,
    /// Unconsumed simulation time in seconds
    pub(crate) physics_tick: f32,
    /// Physics steps run so far
    pub(crate) steps: u64,
    /// Wall-clock time fed in so far
    pub(crate) elapsed: f64,
    /// Set once the missing-player warning has been logged
    pub(crate) player_lost: bool,
    rng: Pcg32,
}

impl World {
    /// Build a world and spawn the player, enemies and allies.
    pub fn new(config: WorldConfig) -> Result<Self, SimError> {
        config.validate()?;

        let actors = ActorStore::new(config.capacity, config.max_views)?;
        let mut world = Self {
            camera: Camera::new(config.camera_view_height),
            rng: Pcg32::seed_from_u64(config.seed),
            actors,
            player: Player::default(),
            physics_tick: 0.0,
            steps: 0,
            elapsed: 0.0,
            player_lost: false,
            config,
        };

        world.player.handle = world.spawn(&CreateCtx {
            kind: kind::PLAYER,
            color: PLAYER_COLOR,
            transform: Transform::at(Vec2::new(2.0, 0.0)),
            drag: 3.0,
            ..Default::default()
        })?;

        for _ in 0..world.config.enemy_count {
            world.spawn_enemy()?;
        }
        for _ in 0..world.config.ally_count {
            world.spawn_ally()?;
        }

        log::info!(
            "World initialized: {} actors, capacity {}, seed {}",
            world.actors.len(),
            world.config.capacity,
            world.config.seed
        );
        Ok(world)
    }

    pub fn spawn(&mut self, ctx: &CreateCtx) -> Result<Handle, SimError> {
        Ok(self.actors.create(ctx)?)
    }

    /// Spawn an enemy at a random spot within the spawn extent.
    pub fn spawn_enemy(&mut self) -> Result<Handle, SimError> {
        let e = self.config.spawn_extent;
        let position = Vec2::new(self.rng.random_range(-e..=e), self.rng.random_range(-e..=e));
        self.spawn(&CreateCtx {
            kind: kind::ENEMY,
            color: ENEMY_COLOR,
            transform: Transform {
                z: -1.0,
                ..Transform::at(position)
            },
            ..Default::default()
        })
    }

    /// Spawn an ally next to the player (or the origin without one).
    pub fn spawn_ally(&mut self) -> Result<Handle, SimError> {
        let center = self.player_position().unwrap_or(Vec2::ZERO);
        let offset = Vec2::new(
            self.rng.random_range(-3.0..=3.0),
            self.rng.random_range(-3.0..=3.0),
        );
        self.spawn(&CreateCtx {
            kind: kind::ALLY,
            color: ALLY_COLOR,
            transform: Transform {
                z: -0.5,
                ..Transform::at(center + offset)
            },
            ..Default::default()
        })
    }

    pub fn despawn(&mut self, handle: Handle) -> Result<(), SimError> {
        Ok(self.actors.remove(handle)?)
    }

    /// Advance by one frame's wall-clock delta. Returns the number of
    /// physics steps taken.
    pub fn update(&mut self, frame_dt: f32) -> u32 {
        super::tick::advance(self, frame_dt)
    }

    pub fn player_position(&self) -> Option<Vec2> {
        self.actors.transform(self.player.handle).map(|t| t.position)
    }

    /// Leftover time after the last drained step, in [0, fixed_dt)
    pub fn physics_remainder(&self) -> f32 {
        self.physics_tick
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Tear down the world and release all storage.
    pub fn shutdown(self) {
        log::info!(
            "World shut down after {} steps ({:.2}s), {} actors alive",
            self.steps,
            self.elapsed,
            self.actors.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IndexError;

    #[test]
    fn test_new_world_spawns_configured_actors() {
        let world = World::new(WorldConfig {
            enemy_count: 3,
            ally_count: 2,
            ..Default::default()
        })
        .unwrap();

        assert_eq!(world.actors.len(), 6);
        assert_eq!(world.actors.enemies().len(), 3);
        assert_eq!(world.actors.allies().len(), 2);
        assert!(world.actors.is_valid(world.player.handle));
        assert_eq!(world.player_position(), Some(Vec2::new(2.0, 0.0)));
    }

    #[test]
    fn test_enemies_spawn_inside_extent() {
        let world = World::new(WorldConfig {
            enemy_count: 20,
            spawn_extent: 4.0,
            ..Default::default()
        })
        .unwrap();
        for i in world.actors.enemies().iter() {
            let p = world.actors.transforms[i as usize].position;
            assert!(p.x.abs() <= 4.0 && p.y.abs() <= 4.0);
        }
    }

    #[test]
    fn test_same_seed_same_spawns() {
        let config = WorldConfig {
            enemy_count: 5,
            seed: 7,
            ..Default::default()
        };
        let a = World::new(config.clone()).unwrap();
        let b = World::new(config).unwrap();
        for i in a.actors.alive().iter() {
            assert_eq!(a.actors.transforms[i as usize], b.actors.transforms[i as usize]);
        }
    }

    #[test]
    fn test_spawn_past_capacity_fails() {
        let mut world = World::new(WorldConfig {
            capacity: 2,
            enemy_count: 1,
            ..Default::default()
        })
        .unwrap();

        assert_eq!(
            world.spawn_enemy(),
            Err(SimError::Index(IndexError::CapacityExhausted { capacity: 2 }))
        );
        assert_eq!(world.actors.len(), 2);
    }

    #[test]
    fn test_despawn_twice() {
        let mut world = World::new(WorldConfig::default()).unwrap();
        let enemy = world.actors.enemies().members()[0];
        let handle = Handle::new(enemy, 0);

        world.despawn(handle).unwrap();
        assert!(world.actors.enemies().is_empty());
        assert_eq!(
            world.despawn(handle),
            Err(SimError::Index(IndexError::StaleHandle(handle)))
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = World::new(WorldConfig {
            fixed_dt: -1.0,
            ..Default::default()
        });
        assert!(matches!(result, Err(SimError::Config(_))));
    }
}
