//! Entities and destruction notification.
//!
//! An [`Entity`] is an identity plus an owned [`ComponentRegistry`].
//! Collaborators that track entities without owning them (a scene's entity
//! list, for instance) register a destruction observer and keep only the
//! [`EntityId`]; the observer tells them when to forget it.

use tracing::debug;

use crate::id::{COMPONENT_IDS, ENTITY_IDS, EntityId, IdIssuer};
use crate::registry::ComponentRegistry;

/// Callback run once when an entity is destroyed.
pub type DestructionObserver = Box<dyn FnOnce(EntityId)>;

/// An identity plus the components attached to it.
///
/// Dropping the entity destroys it: every observer runs, in registration
/// order, before any component is dropped.
pub struct Entity {
    id: EntityId,
    components: ComponentRegistry,
    observers: Vec<DestructionObserver>,
}

impl Entity {
    /// Create an entity using the process-wide id issuers.
    #[must_use]
    pub fn new() -> Self {
        Self::with_issuers(&ENTITY_IDS, &COMPONENT_IDS)
    }

    /// Create an entity drawing its own id from `entity_ids` and its
    /// components' ids from `component_ids`.
    #[must_use]
    pub fn with_issuers(entity_ids: &IdIssuer, component_ids: &'static IdIssuer) -> Self {
        let id = EntityId::issue(entity_ids);
        debug!(entity = %id, "entity created");
        Self {
            id,
            components: ComponentRegistry::with_issuer(component_ids),
            observers: Vec::new(),
        }
    }

    /// This entity's id. Never changes.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// The components attached to this entity.
    #[must_use]
    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    /// The components attached to this entity, for attaching and removing.
    pub fn components_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.components
    }

    /// Register a callback to run when this entity is destroyed.
    ///
    /// The callback receives the entity's id, to be used as a lookup key only.
    /// There is no way to unregister.
    pub fn on_destruction(&mut self, observer: impl FnOnce(EntityId) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Number of registered destruction observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Destroy the entity now. Equivalent to dropping it.
    pub fn destroy(self) {
        drop(self);
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("components", &self.components)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Drop for Entity {
    fn drop(&mut self) {
        debug!(
            entity = %self.id,
            components = self.components.len(),
            observers = self.observers.len(),
            "entity destroyed"
        );
        for observer in std::mem::take(&mut self.observers) {
            observer(self.id);
        }
    }
}
