//! Gameplay entities.
//!
//! A [`GameplayEntity`] is an [`Entity`] that knows how to tick and draw
//! itself: it forwards to every attached [`Tickable`] and [`Drawable`]
//! component, whatever their concrete types.

use std::cell::RefCell;

use engine_component::{ComponentRegistry, Entity, EntityId};
use engine_math::TransformComponent;

use crate::behavior::{Drawable, Tickable};
use crate::context::AppContext;
use crate::scene::SceneContext;

/// Anything in a scene that is ticked and drawn.
#[derive(Debug, Default)]
pub struct GameplayEntity {
    entity: Entity,
}

impl GameplayEntity {
    /// Create a gameplay entity with no components.
    #[must_use]
    pub fn new() -> Self {
        Self::from_entity(Entity::new())
    }

    /// Wrap an existing entity.
    #[must_use]
    pub fn from_entity(entity: Entity) -> Self {
        Self { entity }
    }

    /// The wrapped entity's id.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.entity.id()
    }

    /// The wrapped entity.
    #[must_use]
    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    /// The wrapped entity, for registering destruction observers.
    pub fn entity_mut(&mut self) -> &mut Entity {
        &mut self.entity
    }

    /// The entity's components.
    #[must_use]
    pub fn components(&self) -> &ComponentRegistry {
        self.entity.components()
    }

    /// The entity's components, for attaching and removing.
    pub fn components_mut(&mut self) -> &mut ComponentRegistry {
        self.entity.components_mut()
    }

    /// Tick every tickable component. Returns how many ran.
    pub fn tick(&self, app: &AppContext, scene: &SceneContext) -> usize {
        self.components()
            .for_each::<dyn Tickable>(|tickable| tickable.tick_in_scene(app, scene))
    }

    /// Draw every drawable component, lowest `z_index` first. Returns how
    /// many ran.
    pub fn draw(&self, app: &AppContext) -> usize {
        let mut drawables: Vec<(f64, &RefCell<dyn Drawable>)> = self
            .components()
            .query::<dyn Drawable>()
            .filter_map(|cell| Some((cell.try_borrow().ok()?.z_index(), cell)))
            .collect();
        drawables.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut drawn = 0;
        for (_, cell) in drawables {
            if let Ok(mut drawable) = cell.try_borrow_mut() {
                drawable.draw(app);
                drawn += 1;
            }
        }
        drawn
    }

    /// Depth used to order whole entities. The transform's `z`, or `0.0`
    /// without a transform.
    #[must_use]
    pub fn z_index(&self) -> f64 {
        self.components()
            .get::<TransformComponent>()
            .map_or(0.0, |t| f64::from(t.position.z))
    }
}

impl From<Entity> for GameplayEntity {
    fn from(entity: Entity) -> Self {
        Self::from_entity(entity)
    }
}
