//! # engine_math
//!
//! Math types for the component runtime. Re-exports [`glam`] for linear
//! algebra and defines the spatial [`TransformComponent`].

pub mod transform;

// Re-export glam types for convenience.
pub use glam::{Mat4, Quat, Vec2, Vec3};

pub use transform::TransformComponent;
