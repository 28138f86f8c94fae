//! Tri Swarm - a fixed-timestep 2D triangle swarm simulation
//!
//! Core modules:
//! - `index`: Generational slot allocator with mask-filtered views
//! - `sim`: Deterministic simulation (actors, collisions, fixed-step driver)
//! - `render`: Draw-list export for an external renderer
//! - `input`: Key state to movement direction
//! - `settings`: Data-driven world configuration

pub mod error;
pub mod index;
pub mod input;
pub mod render;
pub mod settings;
pub mod sim;

pub use error::{ConfigError, IndexError, SimError};
pub use index::{Handle, Mask, StableIndex, View, ViewId};
pub use settings::WorldConfig;
pub use sim::World;

use glam::Vec2;

/// Simulation constants
pub mod consts {
    /// Fixed simulation timestep (64 Hz)
    pub const FIXED_DT: f32 = 1.0 / 64.0;
    /// Default cap on unconsumed simulation time, in seconds
    pub const MAX_BACKLOG: f32 = 60.0;

    /// Default actor capacity
    pub const MAX_ACTORS: usize = 1024;
    /// Default view capacity
    pub const MAX_VIEWS: usize = 8;

    /// Bounciness applied along the contact normal
    pub const RESTITUTION: f32 = 0.5;
    /// Penetration allowance before positional correction kicks in
    pub const PENETRATION_SLOP: f32 = 0.01;
    /// Share of the remaining penetration corrected per step (0.2 to 0.8)
    pub const CORRECTION_PERCENT: f32 = 0.6;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    // rem_euclid can round up to TAU for tiny negative inputs
    if wrapped >= PI { wrapped - TAU } else { wrapped }
}

/// Shortest signed turn from `from` to `to`, in [-π, π)
#[inline]
pub fn angle_delta(from: f32, to: f32) -> f32 {
    normalize_angle(to - from)
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}
