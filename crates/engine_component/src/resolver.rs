//! Sibling lookup for dependent components.
//!
//! A [`Resolver`] is a read-only view of one entity's components, handed to
//! [`DependentComponent::construct`](crate::DependentComponent::construct)
//! while the registry is attaching. It never mutates the registry.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::component::{Component, ComponentTypeId};
use crate::error::ComponentError;
use crate::id::ComponentId;
use crate::registry::Slot;

/// Entity-scoped, read-only component lookup.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    slots: Option<&'a HashMap<ComponentTypeId, Slot>>,
}

impl<'a> Resolver<'a> {
    pub(crate) fn bound(slots: &'a HashMap<ComponentTypeId, Slot>) -> Self {
        Self { slots: Some(slots) }
    }

    /// A resolver attached to no entity. Every lookup through it fails with
    /// [`ComponentError::InvalidResolver`], so a dependent constructed with it
    /// fails on its first sibling access.
    #[must_use]
    pub fn unbound() -> Self {
        Self { slots: None }
    }

    /// Returns `true` if this resolver is bound to an entity.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.slots.is_some()
    }

    fn bound_slots(
        &self,
        requested: &'static str,
    ) -> Result<&'a HashMap<ComponentTypeId, Slot>, ComponentError> {
        self.slots
            .ok_or(ComponentError::InvalidResolver { requested })
    }

    /// Probes for a component by type identity.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::InvalidResolver`] when this resolver is
    /// unbound.
    pub fn lookup(&self, type_id: ComponentTypeId) -> Result<Option<ComponentId>, ComponentError> {
        let slots = self.bound_slots("an erased component type")?;
        Ok(slots.get(&type_id).map(|slot| slot.id))
    }

    /// Looks up the sibling of type `T`. `Ok(None)` if the entity has none.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::InvalidResolver`] when this resolver is
    /// unbound.
    pub fn resolve<T: Component>(&self) -> Result<Option<Sibling<T>>, ComponentError> {
        let slots = self.bound_slots(T::type_name())?;
        let sibling = slots.get(&ComponentTypeId::of::<T>()).and_then(|slot| {
            let cell = Rc::clone(&slot.cell).downcast::<RefCell<T>>().ok()?;
            Some(Sibling {
                id: slot.id,
                cell: Rc::downgrade(&cell),
            })
        });
        Ok(sibling)
    }

    /// Looks up the sibling of type `T`, failing construction if it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::Misconfigured`] carrying `requirement` when
    /// the entity has no `T`, and [`ComponentError::InvalidResolver`] when
    /// this resolver is unbound.
    pub fn require<T: Component>(&self, requirement: &str) -> Result<Sibling<T>, ComponentError> {
        self.resolve::<T>()?
            .ok_or_else(|| ComponentError::misconfigured(requirement))
    }
}

/// Non-owning handle to a sibling component found during construction.
///
/// The handle tracks the exact instance that was resolved. If that instance
/// is later replaced or removed, the handle goes stale and every access
/// returns `None`.
#[derive(Debug)]
pub struct Sibling<T> {
    id: ComponentId,
    cell: Weak<RefCell<T>>,
}

impl<T> Sibling<T> {
    /// The id of the sibling instance.
    #[must_use]
    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// Returns `true` while the sibling instance is still alive.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.cell.strong_count() > 0
    }

    /// Runs `f` against the sibling. Returns `None` if the sibling is gone or
    /// currently mutably borrowed.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let cell = self.cell.upgrade()?;
        let guard = cell.try_borrow().ok()?;
        Some(f(&guard))
    }

    /// Runs `f` against the sibling mutably. Returns `None` if the sibling is
    /// gone or currently borrowed.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let cell = self.cell.upgrade()?;
        let mut guard = cell.try_borrow_mut().ok()?;
        Some(f(&mut guard))
    }
}

impl<T> Clone for Sibling<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            cell: Weak::clone(&self.cell),
        }
    }
}
