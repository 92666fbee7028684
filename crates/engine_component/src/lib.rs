//! # engine_component
//!
//! The entity-component runtime: heterogeneous components attached to
//! entities, sibling lookup at construction time, and iteration by
//! capability rather than by concrete type.
//!
//! This crate provides:
//!
//! - [`Component`]: the contract every component satisfies, split into
//!   [`Standalone`] and [`Dependent`] classes.
//! - [`Resolver`] / [`Sibling`]: read-only sibling lookup for dependent
//!   components.
//! - [`ComponentRegistry`]: the per-entity, one-per-type store.
//! - [`Capabilities`] / [`Capable`]: capability registration and queries.
//! - [`Entity`]: identity, owned registry, and destruction observers.
//! - [`IdIssuer`]: explicit id counters for entities and components.
//!
//! Everything here is single-threaded: entities are `!Send`.

pub mod capability;
pub mod component;
pub mod entity;
pub mod error;
pub mod id;
pub mod registry;
pub mod resolver;

pub use capability::{Capabilities, Capable};
pub use component::{
    Component, ComponentKind, ComponentMeta, ComponentTypeId, Dependent, DependentComponent,
    Detached, Standalone,
};
pub use entity::{DestructionObserver, Entity};
pub use error::ComponentError;
pub use id::{COMPONENT_IDS, ComponentId, ENTITY_IDS, EntityId, IdIssuer};
pub use registry::{ComponentMut, ComponentRef, ComponentRegistry};
pub use resolver::{Resolver, Sibling};
