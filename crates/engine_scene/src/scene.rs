//! Scenes and their shared context.

use std::cell::RefCell;
use std::rc::Rc;

use engine_component::{ComponentRegistry, Entity, EntityId, IdIssuer};
use tracing::trace;

use crate::behavior::{Drawable, Tickable};
use crate::error::SceneError;

/// Issuer for scene ids.
pub static SCENE_IDS: IdIssuer = IdIssuer::new();

/// Identity of one scene instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneId(pub u64);

impl SceneId {
    /// Issues a fresh scene id from [`SCENE_IDS`].
    #[must_use]
    pub fn issue() -> Self {
        Self(SCENE_IDS.issue())
    }
}

impl std::fmt::Display for SceneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Scene({})", self.0)
    }
}

/// State shared by everything in one scene.
///
/// Keeps the ids of the scene's live entities. The entities themselves are
/// owned elsewhere; each registered entity carries a destruction observer
/// that removes its id from this list. The context is also an entity of its
/// own, so scene-wide components can be attached to it.
#[derive(Debug)]
pub struct SceneContext {
    entities: Rc<RefCell<Vec<EntityId>>>,
    state: Entity,
}

impl SceneContext {
    /// Create an empty scene context.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entities: Rc::default(),
            state: Entity::new(),
        }
    }

    /// Start tracking `entity`. Its id is dropped from the list automatically
    /// when the entity is destroyed.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::AlreadyRegistered`] if the entity is already
    /// tracked.
    pub fn register(&self, entity: &mut Entity) -> Result<(), SceneError> {
        let id = entity.id();
        if self.contains(id) {
            return Err(SceneError::AlreadyRegistered(id));
        }
        self.entities.borrow_mut().push(id);

        let entities = Rc::downgrade(&self.entities);
        entity.on_destruction(move |dying| {
            if let Some(entities) = entities.upgrade() {
                entities.borrow_mut().retain(|tracked| *tracked != dying);
                trace!(entity = %dying, "entity pruned from scene");
            }
        });
        Ok(())
    }

    /// Ids of the live registered entities, in registration order.
    #[must_use]
    pub fn entities(&self) -> Vec<EntityId> {
        self.entities.borrow().clone()
    }

    /// Returns `true` if `id` is tracked.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.borrow().contains(&id)
    }

    /// Number of tracked entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.borrow().len()
    }

    /// Returns `true` if no entities are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.borrow().is_empty()
    }

    /// Scene-wide components.
    #[must_use]
    pub fn components(&self) -> &ComponentRegistry {
        self.state.components()
    }

    /// Scene-wide components, for attaching and removing.
    pub fn components_mut(&mut self) -> &mut ComponentRegistry {
        self.state.components_mut()
    }
}

impl Default for SceneContext {
    fn default() -> Self {
        Self::new()
    }
}

/// A screen: something ticked and drawn as a whole every frame.
pub trait Scene: Tickable + Drawable {
    /// This scene's id.
    fn id(&self) -> SceneId;

    /// Called once per frame before drawing.
    fn on_frame_start(&mut self) {}

    /// Called when the scene is being replaced.
    fn on_tear_down(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_prune() {
        let scene = SceneContext::new();
        let mut a = Entity::new();
        let mut b = Entity::new();
        scene.register(&mut a).unwrap();
        scene.register(&mut b).unwrap();
        assert_eq!(scene.entities(), vec![a.id(), b.id()]);

        let b_id = b.id();
        drop(a);
        assert_eq!(scene.entities(), vec![b_id]);

        drop(b);
        assert!(scene.is_empty());
    }

    #[test]
    fn test_register_twice_fails() {
        let scene = SceneContext::new();
        let mut entity = Entity::new();
        scene.register(&mut entity).unwrap();
        assert_eq!(
            scene.register(&mut entity),
            Err(SceneError::AlreadyRegistered(entity.id()))
        );
        assert_eq!(scene.len(), 1);
        assert_eq!(entity.observer_count(), 1);
    }

    #[test]
    fn test_entity_outliving_scene_is_harmless() {
        let mut entity = Entity::new();
        {
            let scene = SceneContext::new();
            scene.register(&mut entity).unwrap();
        }
        drop(entity);
    }

    #[test]
    fn test_scene_ids_increase() {
        let a = SceneId::issue();
        let b = SceneId::issue();
        assert!(b > a);
    }
}
