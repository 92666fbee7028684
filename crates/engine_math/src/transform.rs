//! 2.5D transform component.
//!
//! [`TransformComponent`] places an entity in the world: a 3D position whose
//! `z` doubles as draw depth, a 2D scale, and a rotation about the view axis.
//! Most other spatial components resolve it as a sibling.

use engine_component::{Component, Standalone};
use glam::{Mat4, Quat, Vec2, Vec3};

/// Position, scale, and rotation of an entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformComponent {
    /// World-space position.
    pub position: Vec3,
    /// Per-axis scale in the view plane.
    pub scale: Vec2,
    /// Rotation about the z axis, in radians.
    pub rotation: f32,
}

impl TransformComponent {
    /// The identity transform: origin, unit scale, no rotation.
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        scale: Vec2::ONE,
        rotation: 0.0,
    };

    /// Create an identity transform.
    #[must_use]
    pub fn new() -> Self {
        Self::IDENTITY
    }

    /// Create a transform at `position` with unit scale and no rotation.
    #[must_use]
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Create a transform from all three parts.
    #[must_use]
    pub fn with(position: Vec3, scale: Vec2, rotation: f32) -> Self {
        Self {
            position,
            scale,
            rotation,
        }
    }

    /// Move by `offset`.
    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
    }

    /// Compute the 4×4 model matrix for this transform.
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale.extend(1.0),
            Quat::from_rotation_z(self.rotation),
            self.position,
        )
    }
}

impl Default for TransformComponent {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Component for TransformComponent {
    type Kind = Standalone;

    fn type_name() -> &'static str {
        "TransformComponent"
    }
}
