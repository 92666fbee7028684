//! Sphere and box colliders.

use std::cell::RefCell;
use std::rc::Rc;

use engine_component::{
    Capabilities, Component, ComponentError, Dependent, DependentComponent, Resolver, Sibling,
};
use engine_math::{TransformComponent, Vec3};

const TRANSFORM_REQUIREMENT: &str = "Any collider requires a base TransformComponent";

/// A shape that can be tested for point overlap.
pub trait Collider {
    /// Returns `true` if `point` lies inside or on the shape.
    ///
    /// A collider whose transform has been replaced or removed overlaps
    /// nothing.
    fn overlaps(&self, point: Vec3) -> bool;

    /// Centre of the shape, if its transform is still attached.
    fn origin(&self) -> Option<Vec3>;
}

/// Sphere centred on the entity's transform.
#[derive(Debug, Clone)]
pub struct SphereCollider {
    transform: Sibling<TransformComponent>,
    radius_sq: f32,
}

impl SphereCollider {
    /// The sphere's radius.
    #[must_use]
    pub fn radius(&self) -> f32 {
        self.radius_sq.sqrt()
    }
}

impl Collider for SphereCollider {
    fn overlaps(&self, point: Vec3) -> bool {
        self.origin()
            .is_some_and(|centre| centre.distance_squared(point) <= self.radius_sq)
    }

    fn origin(&self) -> Option<Vec3> {
        self.transform.with(|t| t.position)
    }
}

impl Component for SphereCollider {
    type Kind = Dependent;

    fn type_name() -> &'static str {
        "SphereCollider"
    }

    fn provide(this: &Rc<RefCell<Self>>, capabilities: &mut Capabilities) {
        capabilities.provide::<dyn Collider>(this.clone());
    }
}

impl DependentComponent for SphereCollider {
    /// Radius.
    type Args = f32;

    fn construct(resolver: &Resolver<'_>, radius: f32) -> Result<Self, ComponentError> {
        let transform = resolver.require::<TransformComponent>(TRANSFORM_REQUIREMENT)?;
        Ok(Self {
            transform,
            radius_sq: radius * radius,
        })
    }
}

/// Axis-aligned box centred on the entity's transform.
#[derive(Debug, Clone)]
pub struct BoxCollider {
    transform: Sibling<TransformComponent>,
    half_extents: Vec3,
}

impl BoxCollider {
    /// Distance from the centre to each face, per axis.
    #[must_use]
    pub fn half_extents(&self) -> Vec3 {
        self.half_extents
    }
}

impl Collider for BoxCollider {
    fn overlaps(&self, point: Vec3) -> bool {
        self.origin().is_some_and(|centre| {
            let min = centre - self.half_extents;
            let max = centre + self.half_extents;
            point.cmpge(min).all() && point.cmple(max).all()
        })
    }

    fn origin(&self) -> Option<Vec3> {
        self.transform.with(|t| t.position)
    }
}

impl Component for BoxCollider {
    type Kind = Dependent;

    fn type_name() -> &'static str {
        "BoxCollider"
    }

    fn provide(this: &Rc<RefCell<Self>>, capabilities: &mut Capabilities) {
        capabilities.provide::<dyn Collider>(this.clone());
    }
}

impl DependentComponent for BoxCollider {
    /// Half extents.
    type Args = Vec3;

    fn construct(resolver: &Resolver<'_>, half_extents: Vec3) -> Result<Self, ComponentError> {
        let transform = resolver.require::<TransformComponent>(TRANSFORM_REQUIREMENT)?;
        Ok(Self {
            transform,
            half_extents: half_extents.abs(),
        })
    }
}
