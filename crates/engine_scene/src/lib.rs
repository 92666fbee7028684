//! # engine_scene
//!
//! The collaborators that drive the component runtime each frame.
//!
//! This crate provides:
//!
//! - [`AppContext`]: viewport, frame timing and input, plus a headless draw sink.
//! - [`Tickable`] / [`Drawable`]: the two capabilities drivers dispatch on.
//! - [`HealthComponent`] / [`ContinuousForceComponent`]: stock gameplay
//!   components.
//! - [`GameplayEntity`]: an entity that ticks and draws its own components.
//! - [`SceneContext`]: a scene's live list of entities, pruned on destruction.
//! - [`Scene`] / [`SceneManager`]: the current screen and switching between
//!   screens.

pub mod behavior;
pub mod components;
pub mod context;
pub mod error;
pub mod gameplay;
pub mod manager;
pub mod scene;

pub use behavior::{Drawable, Tickable};
pub use components::{ContinuousForceComponent, HealthComponent};
pub use context::{
    AppContext, Canvas, Color, DrawCommand, FrameClock, InputState, Key, Millis, Rect,
};
pub use error::SceneError;
pub use gameplay::GameplayEntity;
pub use manager::SceneManager;
pub use scene::{SCENE_IDS, Scene, SceneContext, SceneId};
