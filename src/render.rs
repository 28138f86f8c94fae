//! Draw-list export
//!
//! The simulation never draws. A host renderer uploads the unit triangle
//! once as a vertex buffer and, each frame, one [`ActorInstance`] per live
//! actor taken from the extrapolated global transforms.

use bytemuck::{Pod, Zeroable};

use crate::index::Handle;
use crate::sim::UNIT_TRIANGLE;
use crate::sim::World;

/// 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }
}

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// The shared actor mesh; tinted per instance
pub const UNIT_TRIANGLE_VERTICES: [Vertex; 3] = [
    Vertex::new(UNIT_TRIANGLE[0].x, UNIT_TRIANGLE[0].y, WHITE),
    Vertex::new(UNIT_TRIANGLE[1].x, UNIT_TRIANGLE[1].y, WHITE),
    Vertex::new(UNIT_TRIANGLE[2].x, UNIT_TRIANGLE[2].y, WHITE),
];

/// Per-instance data: column-major model matrix and tint
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ActorInstance {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

/// Fill `out` with one instance per live actor, in ascending slot order.
pub fn collect_instances(world: &World, out: &mut Vec<ActorInstance>) {
    let actors = &world.actors;
    out.clear();
    out.extend(actors.alive().iter().map(|i| {
        let i = i as usize;
        ActorInstance {
            model: actors.global_transforms[i].to_cols_array_2d(),
            color: actors.colors[i].to_array(),
        }
    }));
}

/// Instance for a single actor, `None` for a stale handle.
pub fn instance_for(world: &World, handle: Handle) -> Option<ActorInstance> {
    let actors = &world.actors;
    Some(ActorInstance {
        model: actors.global_transform(handle)?.to_cols_array_2d(),
        color: actors.color(handle)?.to_array(),
    })
}

#[inline]
pub fn instances_as_bytes(instances: &[ActorInstance]) -> &[u8] {
    bytemuck::cast_slice(instances)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::WorldConfig;
    use crate::sim::state::{ENEMY_COLOR, PLAYER_COLOR};

    #[test]
    fn test_one_instance_per_live_actor() {
        let mut world = World::new(WorldConfig {
            enemy_count: 3,
            ..Default::default()
        })
        .unwrap();
        world.update(0.1);

        let mut instances = vec![ActorInstance::zeroed(); 10];
        collect_instances(&world, &mut instances);
        assert_eq!(instances.len(), 4);
        assert_eq!(instances[0].color, PLAYER_COLOR.to_array());
        assert!(instances[1..].iter().all(|inst| inst.color == ENEMY_COLOR.to_array()));

        let bytes = instances_as_bytes(&instances);
        assert_eq!(bytes.len(), 4 * std::mem::size_of::<ActorInstance>());
    }

    #[test]
    fn test_instance_tracks_global_transform() {
        let mut world = World::new(WorldConfig::default()).unwrap();
        world.update(0.05);

        let player = world.player.handle;
        let inst = instance_for(&world, player).unwrap();
        let m = world.actors.global_transform(player).unwrap();
        assert_eq!(inst.model, m.to_cols_array_2d());

        world.despawn(player).unwrap();
        assert!(instance_for(&world, player).is_none());
    }

    #[test]
    fn test_layouts_are_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
        assert_eq!(std::mem::size_of::<ActorInstance>(), 80);
        assert_eq!(UNIT_TRIANGLE_VERTICES[0].position, [0.5, 0.0]);
    }
}
