//! Actor storage
//!
//! Struct-of-arrays attribute store indexed by slot index. Lifecycle and
//! categorization live in the [`StableIndex`]; this module only keeps the
//! per-slot attributes next to it.

use glam::{Affine2, Mat4, Quat, Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::error::IndexError;
use crate::index::{Handle, Mask, StableIndex, View, ViewId};

/// Actor category bits
pub mod kind {
    use crate::index::Mask;

    pub const ALIVE: Mask = Mask(1 << 0);
    pub const PLAYER: Mask = Mask(1 << 1);
    pub const ALLY: Mask = Mask(1 << 2);
    pub const ENEMY: Mask = Mask(1 << 3);

    /// Hostile to the player
    #[inline]
    pub fn is_hostile(mask: Mask) -> bool {
        mask.contains(ENEMY)
    }
}

/// Pose of an actor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec2,
    /// Rotation in radians
    pub rotation: f32,
    pub scale: Vec2,
    /// Depth, only used for draw ordering
    pub z: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
            z: 0.0,
        }
    }
}

impl Transform {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// 2D model transform: translate, then rotate, then scale.
    pub fn model_2d(&self) -> Affine2 {
        Affine2::from_scale_angle_translation(self.scale, self.rotation, self.position)
    }

    /// 3D model matrix with `z` as depth.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale.extend(1.0),
            Quat::from_rotation_z(self.rotation),
            Vec3::new(self.position.x, self.position.y, self.z),
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub linear: Vec2,
    /// Radians per second
    pub angular: f32,
}

/// Everything needed to write a new actor's attributes
#[derive(Debug, Clone, Copy)]
pub struct CreateCtx {
    /// Category bits; `kind::ALIVE` is always added
    pub kind: Mask,
    pub color: Vec4,
    pub transform: Transform,
    pub velocity: Velocity,
    /// Multiplier on the linear damping
    pub drag: f32,
    /// Zero or negative means immovable
    pub mass: f32,
}

impl Default for CreateCtx {
    fn default() -> Self {
        Self {
            kind: kind::ALIVE,
            color: Vec4::ONE,
            transform: Transform::default(),
            velocity: Velocity::default(),
            drag: 1.0,
            mass: 1.0,
        }
    }
}

/// Actor attributes in parallel fixed-size arrays.
///
/// Attributes of a freed slot are stale until the slot is reused; they are
/// only reachable through the views or a validated [`Handle`].
pub struct ActorStore {
    pub(crate) index: StableIndex,
    pub(crate) alive_view: ViewId,
    pub(crate) enemy_view: ViewId,
    pub(crate) ally_view: ViewId,

    pub(crate) colors: Box<[Vec4]>,
    pub(crate) transforms: Box<[Transform]>,
    pub(crate) global_transforms: Box<[Mat4]>,
    pub(crate) velocities: Box<[Velocity]>,
    pub(crate) drags: Box<[f32]>,
    pub(crate) masses: Box<[f32]>,
}

impl ActorStore {
    /// Allocate storage and register the alive, enemy and ally views.
    pub fn new(capacity: usize, max_views: usize) -> Result<Self, IndexError> {
        let mut index = StableIndex::new(capacity, max_views);
        let alive_view = index.add_view(kind::ALIVE)?;
        let enemy_view = index.add_view(kind::ENEMY | kind::ALIVE)?;
        let ally_view = index.add_view(kind::ALLY | kind::ALIVE)?;

        Ok(Self {
            index,
            alive_view,
            enemy_view,
            ally_view,
            colors: vec![Vec4::ONE; capacity].into_boxed_slice(),
            transforms: vec![Transform::default(); capacity].into_boxed_slice(),
            global_transforms: vec![Mat4::IDENTITY; capacity].into_boxed_slice(),
            velocities: vec![Velocity::default(); capacity].into_boxed_slice(),
            drags: vec![0.0; capacity].into_boxed_slice(),
            masses: vec![0.0; capacity].into_boxed_slice(),
        })
    }

    /// Allocate a slot and write its attributes from `ctx`.
    pub fn create(&mut self, ctx: &CreateCtx) -> Result<Handle, IndexError> {
        let handle = self.index.create(ctx.kind | kind::ALIVE)?;
        let i = handle.index as usize;

        self.colors[i] = ctx.color;
        self.transforms[i] = ctx.transform;
        self.global_transforms[i] = ctx.transform.model_matrix();
        self.velocities[i] = ctx.velocity;
        self.drags[i] = ctx.drag;
        self.masses[i] = ctx.mass;

        Ok(handle)
    }

    pub fn remove(&mut self, handle: Handle) -> Result<(), IndexError> {
        self.index.remove(handle)
    }

    #[inline]
    pub fn is_valid(&self, handle: Handle) -> bool {
        self.index.is_valid(handle)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn index(&self) -> &StableIndex {
        &self.index
    }

    pub fn alive(&self) -> &View {
        self.index.view(self.alive_view)
    }

    pub fn enemies(&self) -> &View {
        self.index.view(self.enemy_view)
    }

    pub fn allies(&self) -> &View {
        self.index.view(self.ally_view)
    }

    fn slot(&self, handle: Handle) -> Option<usize> {
        self.is_valid(handle).then_some(handle.index as usize)
    }

    pub fn transform(&self, handle: Handle) -> Option<&Transform> {
        self.slot(handle).map(|i| &self.transforms[i])
    }

    pub fn transform_mut(&mut self, handle: Handle) -> Option<&mut Transform> {
        self.slot(handle).map(|i| &mut self.transforms[i])
    }

    pub fn velocity(&self, handle: Handle) -> Option<&Velocity> {
        self.slot(handle).map(|i| &self.velocities[i])
    }

    pub fn velocity_mut(&mut self, handle: Handle) -> Option<&mut Velocity> {
        self.slot(handle).map(|i| &mut self.velocities[i])
    }

    pub fn color(&self, handle: Handle) -> Option<Vec4> {
        self.slot(handle).map(|i| self.colors[i])
    }

    pub fn mass(&self, handle: Handle) -> Option<f32> {
        self.slot(handle).map(|i| self.masses[i])
    }

    /// Render transform computed by the last extrapolation pass.
    pub fn global_transform(&self, handle: Handle) -> Option<&Mat4> {
        self.slot(handle).map(|i| &self.global_transforms[i])
    }
}
