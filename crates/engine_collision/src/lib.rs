//! # engine_collision
//!
//! Collider components. Each collider is a dependent component that resolves
//! the entity's [`TransformComponent`](engine_math::TransformComponent) when
//! attached and tests points against a shape centred on it.
//!
//! All colliders provide the `dyn` [`Collider`] capability, so
//! `registry.query::<dyn Collider>()` finds every shape on an entity.

pub mod collider;

pub use collider::{BoxCollider, Collider, SphereCollider};
