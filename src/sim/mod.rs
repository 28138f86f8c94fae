//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (ascending slot index)
//! - No rendering or platform dependencies

pub mod actor;
pub mod camera;
pub mod collision;
pub mod state;
pub mod tick;

pub use actor::{ActorStore, CreateCtx, Transform, Velocity, kind};
pub use camera::Camera;
pub use collision::{ContactParams, Intersection, UNIT_TRIANGLE, intersect, resolve, world_triangle};
pub use state::{Player, World};
pub use tick::{RingSlots, advance, extrapolate, physics_step};
