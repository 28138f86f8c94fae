//! Fixed timestep simulation tick
//!
//! Frame deltas accumulate and are drained in whole fixed steps. Each step
//! runs the pairwise collision pass over the alive view, integrates, then
//! runs the per-category behaviors. The leftover fraction is only used to
//! extrapolate render transforms.

use std::f32::consts::TAU;

use glam::Vec2;

use super::actor::{ActorStore, Transform};
use super::collision::{Body, ContactParams, intersect, resolve, world_triangle};
use super::state::World;
use crate::error::SimError;
use crate::index::Handle;
use crate::input::InputMap;
use crate::settings::WorldConfig;
use crate::{angle_delta, normalize_angle};

/// Feed one frame's delta into the accumulator, run every whole step it
/// covers, then refresh render transforms. Returns the number of steps.
///
/// Negative deltas count as zero and non-finite ones are ignored. The
/// backlog is clamped to the whole steps that fit in `max_backlog`, which
/// bounds the steps per call.
pub fn advance(world: &mut World, frame_dt: f32) -> u32 {
    let fixed_dt = world.config.fixed_dt;
    let frame_dt = if frame_dt.is_finite() {
        frame_dt.max(0.0)
    } else {
        log::warn!("Ignoring non-finite frame delta {}", frame_dt);
        0.0
    };
    world.physics_tick += frame_dt;
    world.elapsed += f64::from(frame_dt);
    clamp_backlog(world);

    let mut substeps = 0;
    while world.physics_tick >= fixed_dt {
        if world.config.max_substeps.is_some_and(|max| substeps >= max) {
            let dropped = (world.physics_tick / fixed_dt) as u32;
            log::warn!("Falling behind, dropping {} physics steps", dropped);
            world.physics_tick %= fixed_dt;
            break;
        }

        step(world, fixed_dt);
        world.physics_tick -= fixed_dt;
        substeps += 1;
    }

    extrapolate(&mut world.actors, world.physics_tick);
    substeps
}

/// Drop whole steps above `max_backlog`, keeping the fractional remainder.
fn clamp_backlog(world: &mut World) {
    let fixed_dt = world.config.fixed_dt;
    if !world.physics_tick.is_finite() {
        world.physics_tick = 0.0;
    }
    if world.physics_tick <= world.config.max_backlog {
        return;
    }

    let kept = (world.config.max_backlog / fixed_dt).floor() * fixed_dt;
    log::warn!(
        "Backlog of {:.2}s exceeds {:.2}s, dropping {} physics steps",
        world.physics_tick,
        world.config.max_backlog,
        ((world.physics_tick - kept) / fixed_dt) as u64
    );
    world.physics_tick = kept + world.physics_tick % fixed_dt;
}

/// One fixed step: collisions, integration, behaviors, camera.
pub fn step(world: &mut World, dt: f32) {
    let params = world.config.contact_params();
    let contacts = physics_step(&mut world.actors, dt, &params);
    log::trace!("step {}: {} contacts", world.steps, contacts);

    match update_behaviors(world, dt) {
        Ok(()) => world.player_lost = false,
        Err(e) => {
            if !world.player_lost {
                log::warn!("Skipping behavior updates: {}", e);
                world.player_lost = true;
            }
        }
    }

    world.steps += 1;
}

fn update_behaviors(world: &mut World, dt: f32) -> Result<(), SimError> {
    let player = world.player.handle;
    let aim = world.camera.aim_point();

    player_update(&mut world.actors, player, &world.player.input, aim, &world.config, dt)?;
    ally_update(&mut world.actors, player, &world.config, dt)?;
    enemy_update(&mut world.actors, player, &world.config, dt)?;

    if let Some(target) = world.actors.transform(player).map(|t| t.position) {
        world.camera.follow(target, dt, world.config.camera_follow_rate);
    }
    Ok(())
}

/// Pairwise collision pass in ascending index order, then integration.
///
/// Pairs are resolved in place and once each, so later pairs see the
/// corrections made by earlier ones. Returns the number of resolved contacts.
pub fn physics_step(actors: &mut ActorStore, dt: f32, params: &ContactParams) -> usize {
    let alive = actors.index.view(actors.alive_view).members();
    let mut contacts = 0;

    for (n, &idx1) in alive.iter().enumerate() {
        for &idx2 in &alive[n + 1..] {
            let (a, b) = (idx1 as usize, idx2 as usize);
            let (ta, tb) = (actors.transforms[a], actors.transforms[b]);

            let (tri_a, tri_b) = (world_triangle(&ta), world_triangle(&tb));
            let hit = intersect(ta.position, tb.position, &tri_a, &tri_b);
            if !hit.hit {
                continue;
            }

            let (i1, i2) = if hit.a_is_origin { (a, b) } else { (b, a) };
            let mut first = Body {
                position: actors.transforms[i1].position,
                linear: actors.velocities[i1].linear,
                mass: actors.masses[i1],
            };
            let mut second = Body {
                position: actors.transforms[i2].position,
                linear: actors.velocities[i2].linear,
                mass: actors.masses[i2],
            };

            if resolve(&hit, &mut first, &mut second, params) {
                actors.transforms[i1].position = first.position;
                actors.velocities[i1].linear = first.linear;
                actors.transforms[i2].position = second.position;
                actors.velocities[i2].linear = second.linear;
                contacts += 1;
            }
        }
    }

    integrate(actors, dt);
    contacts
}

/// Explicit Euler step with per-actor linear drag.
pub fn integrate(actors: &mut ActorStore, dt: f32) {
    for &i in actors.index.view(actors.alive_view).members() {
        let i = i as usize;
        let vel = &mut actors.velocities[i];
        let transform = &mut actors.transforms[i];

        transform.position += vel.linear * dt;
        transform.rotation = normalize_angle(transform.rotation + vel.angular * dt);
        vel.linear -= vel.linear * (actors.drags[i] * dt);
    }
}

fn player_slot(actors: &ActorStore, player: Handle) -> Result<usize, SimError> {
    if actors.is_valid(player) {
        Ok(player.index as usize)
    } else {
        Err(SimError::NoPlayer)
    }
}

/// Blend toward the input velocity and turn toward the aim point.
pub fn player_update(
    actors: &mut ActorStore,
    player: Handle,
    input: &InputMap,
    aim: Vec2,
    config: &WorldConfig,
    dt: f32,
) -> Result<(), SimError> {
    let i = player_slot(actors, player)?;
    let transform = actors.transforms[i];
    let vel = &mut actors.velocities[i];

    let target_vel = input.direction * config.player_speed;
    vel.linear = vel.linear.lerp(target_vel, (dt * config.player_accel).min(1.0));

    let to_aim = aim - transform.position;
    let facing = to_aim.y.atan2(to_aim.x);
    vel.angular = angle_delta(transform.rotation, facing) * config.player_turn_rate;

    Ok(())
}

/// Slot offsets on concentric rings; each ring holds as many slots as fit
/// its circumference at `spacing`.
#[derive(Debug, Clone)]
pub struct RingSlots {
    spacing: f32,
    radius: f32,
    count: u32,
    slot: u32,
}

impl RingSlots {
    pub fn new(spacing: f32) -> Self {
        let mut slots = Self {
            spacing,
            radius: 0.0,
            count: 0,
            slot: 0,
        };
        slots.next_ring();
        slots
    }

    fn next_ring(&mut self) {
        self.radius += self.spacing;
        self.count = ((self.radius * TAU / self.spacing) as u32).max(1);
        self.slot = 0;
    }
}

impl Iterator for RingSlots {
    type Item = Vec2;

    fn next(&mut self) -> Option<Vec2> {
        if self.slot >= self.count {
            self.next_ring();
        }
        let theta = self.slot as f32 * TAU / self.count as f32;
        self.slot += 1;
        Some(crate::polar_to_cartesian(self.radius, theta))
    }
}

/// Steer allies toward their ring slot around the player.
pub fn ally_update(
    actors: &mut ActorStore,
    player: Handle,
    config: &WorldConfig,
    dt: f32,
) -> Result<(), SimError> {
    let center = actors.transforms[player_slot(actors, player)?].position;
    let allies = actors.index.view(actors.ally_view).members();
    let blend = (dt * config.ally_accel).min(1.0);

    for (&idx, offset) in allies.iter().zip(RingSlots::new(config.ally_spacing)) {
        let i = idx as usize;
        let to_slot = center + offset - actors.transforms[i].position;
        let dist = to_slot.length();
        if dist <= 1e-4 {
            continue;
        }

        let desired = to_slot / dist * (dist * config.ally_gain).min(config.ally_speed);
        let vel = &mut actors.velocities[i];
        vel.linear += (desired - vel.linear) * blend;
    }

    Ok(())
}

/// Turn enemies toward the player and push them to full speed along their
/// current facing.
pub fn enemy_update(
    actors: &mut ActorStore,
    player: Handle,
    config: &WorldConfig,
    dt: f32,
) -> Result<(), SimError> {
    let target = actors.transforms[player_slot(actors, player)?].position;
    let enemies = actors.index.view(actors.enemy_view).members();

    for &idx in enemies {
        let i = idx as usize;
        let transform = actors.transforms[i];
        let vel = &mut actors.velocities[i];

        let to_player = target - transform.position;
        let facing = to_player.y.atan2(to_player.x);
        vel.angular = angle_delta(transform.rotation, facing) * config.enemy_turn_rate;

        let full_speed = Vec2::from_angle(transform.rotation) * config.enemy_speed;
        vel.linear += (full_speed - vel.linear) * (dt * config.enemy_accel);
    }

    Ok(())
}

/// Project every live actor forward by `remainder` seconds with its current
/// velocity and store the render matrix. Reads simulated state only.
pub fn extrapolate(actors: &mut ActorStore, remainder: f32) {
    for &i in actors.index.view(actors.alive_view).members() {
        let i = i as usize;
        let t = actors.transforms[i];
        let v = actors.velocities[i];

        let projected = Transform {
            position: t.position + v.linear * remainder,
            rotation: t.rotation + v.angular * remainder,
            ..t
        };
        actors.global_transforms[i] = projected.model_matrix();
    }
}
