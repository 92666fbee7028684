//! Scene-layer error types.

use engine_component::EntityId;

/// Errors raised by scene bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    /// The entity is already tracked by this scene context.
    #[error("{0} is already registered with the scene")]
    AlreadyRegistered(EntityId),

    /// A frame was driven with no scene loaded.
    #[error("no active scene")]
    NoActiveScene,
}
