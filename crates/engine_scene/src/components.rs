//! Stock gameplay components.

use std::cell::RefCell;
use std::rc::Rc;

use engine_component::{
    Capabilities, Component, ComponentError, Dependent, DependentComponent, Resolver, Sibling,
    Standalone,
};
use engine_math::{TransformComponent, Vec3};

use crate::behavior::Tickable;
use crate::context::AppContext;

/// Hit points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthComponent {
    pub health: i32,
}

impl HealthComponent {
    /// Create a health component with `health` hit points.
    #[must_use]
    pub fn new(health: i32) -> Self {
        Self { health }
    }

    /// Returns `true` while hit points remain.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Apply damage, clamping to zero.
    pub fn damage(&mut self, amount: i32) {
        self.health = self.health.saturating_sub(amount).max(0);
    }
}

impl Default for HealthComponent {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Component for HealthComponent {
    type Kind = Standalone;

    fn type_name() -> &'static str {
        "HealthComponent"
    }
}

/// Pushes the entity's transform in a fixed direction every tick. Gravity,
/// wind, conveyor belts.
#[derive(Debug)]
pub struct ContinuousForceComponent {
    transform: Sibling<TransformComponent>,
    pub direction: Vec3,
    pub force: f32,
}

impl ContinuousForceComponent {
    /// Displacement applied for a frame of length `delta_t`.
    #[must_use]
    pub fn displacement(&self, delta_t: f32) -> Vec3 {
        self.direction * (self.force * delta_t)
    }
}

impl Tickable for ContinuousForceComponent {
    fn tick(&mut self, app: &AppContext) {
        let offset = self.displacement(app.frames().delta_t());
        self.transform.with_mut(|t| t.translate(offset));
    }
}

impl Component for ContinuousForceComponent {
    type Kind = Dependent;

    fn type_name() -> &'static str {
        "ContinuousForceComponent"
    }

    fn provide(this: &Rc<RefCell<Self>>, capabilities: &mut Capabilities) {
        capabilities.provide::<dyn Tickable>(this.clone());
    }
}

impl DependentComponent for ContinuousForceComponent {
    /// Direction and force.
    type Args = (Vec3, f32);

    fn construct(resolver: &Resolver<'_>, (direction, force): (Vec3, f32)) -> Result<Self, ComponentError> {
        let transform = resolver
            .require::<TransformComponent>("ContinuousForceComponent requires a TransformComponent")?;
        Ok(Self {
            transform,
            direction,
            force,
        })
    }
}

#[cfg(test)]
mod tests {
    use engine_component::{Entity, IdIssuer};
    use engine_math::Vec2;

    use super::*;

    #[test]
    fn test_health_reads_are_idempotent() {
        static IDS: IdIssuer = IdIssuer::starting_at(50);
        let mut first = Entity::with_issuers(&IdIssuer::new(), &IDS);
        let mut second = Entity::with_issuers(&IdIssuer::new(), &IDS);

        let a = first.components_mut().insert(HealthComponent::new(200));
        let b = second.components_mut().insert(HealthComponent::new(200));
        assert_eq!(b.id(), a.id() + 1);

        for entity in [&first, &second] {
            let health = entity.components().get::<HealthComponent>().unwrap();
            assert_eq!(health.health, 200);
            assert_eq!(health.health, 200);
        }
    }

    #[test]
    fn test_health_default_and_damage() {
        let mut health = HealthComponent::default();
        assert_eq!(health.health, 1);
        assert!(health.is_alive());
        health.damage(5);
        assert_eq!(health.health, 0);
        assert!(!health.is_alive());
    }

    #[test]
    fn test_force_requires_transform() {
        let mut entity = Entity::new();
        let err = entity
            .components_mut()
            .attach::<ContinuousForceComponent>((Vec3::Y, 1.0))
            .unwrap_err();
        assert_eq!(
            err,
            ComponentError::misconfigured("ContinuousForceComponent requires a TransformComponent")
        );
    }

    #[test]
    fn test_force_moves_transform_each_tick() {
        let app = AppContext::new(Vec2::new(800.0, 600.0), 0);
        let mut entity = Entity::new();
        entity.components_mut().insert(TransformComponent::new());
        entity
            .components_mut()
            .attach::<ContinuousForceComponent>((Vec3::Y, 2.0))
            .unwrap();

        for _ in 0..3 {
            entity
                .components()
                .for_each::<dyn Tickable>(|t| t.tick(&app));
        }

        let transform = entity.components().get::<TransformComponent>().unwrap();
        assert!((transform.position - Vec3::new(0.0, 6.0, 0.0)).length() < 1e-5);
    }
}
