//! Per-entity component storage.
//!
//! A [`ComponentRegistry`] maps each concrete component type to the single
//! instance of that type an entity owns. Instances live in
//! `Rc<RefCell<T>>` slots so that capability lists and sibling handles can
//! point at them without owning them; the slot map holds the only strong
//! reference that outlives a call.

use std::any::Any;
use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::capability::{Capabilities, Capable, CapabilityIndex};
use crate::component::{
    Component, ComponentMeta, ComponentTypeId, DependentComponent, Detached, Standalone,
};
use crate::error::ComponentError;
use crate::id::{COMPONENT_IDS, ComponentId, IdIssuer};
use crate::resolver::Resolver;

/// One stored component instance.
#[derive(Debug)]
pub(crate) struct Slot {
    pub(crate) id: ComponentId,
    pub(crate) meta: ComponentMeta,
    /// Always an `Rc<RefCell<T>>` for the slot's component type.
    pub(crate) cell: Rc<dyn Any>,
}

/// The per-entity store of at most one component per concrete type.
#[derive(Debug)]
pub struct ComponentRegistry {
    ids: &'static IdIssuer,
    slots: HashMap<ComponentTypeId, Slot>,
    capabilities: CapabilityIndex,
}

impl ComponentRegistry {
    /// Create an empty registry drawing ids from [`COMPONENT_IDS`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_issuer(&COMPONENT_IDS)
    }

    /// Create an empty registry drawing ids from `ids`.
    #[must_use]
    pub fn with_issuer(ids: &'static IdIssuer) -> Self {
        Self {
            ids,
            slots: HashMap::new(),
            capabilities: CapabilityIndex::default(),
        }
    }

    /// Attach a standalone component, discarding any previous instance of the
    /// same type. Returns the id of the new instance.
    pub fn insert<T: Component<Kind = Standalone>>(&mut self, component: T) -> ComponentId {
        let (id, _previous) = self.put(component);
        id
    }

    /// Attach a standalone component and hand back the instance it replaced.
    pub fn replace<T: Component<Kind = Standalone>>(&mut self, component: T) -> Option<Detached<T>> {
        let (_, previous) = self.put(component);
        previous.and_then(reclaim::<T>)
    }

    /// Construct and attach a dependent component, discarding any previous
    /// instance of the same type. Returns the id of the new instance.
    ///
    /// # Errors
    ///
    /// Propagates the constructor's error. On failure the registry is left
    /// exactly as it was, including any previous instance of `T`.
    pub fn attach<T: DependentComponent>(&mut self, args: T::Args) -> Result<ComponentId, ComponentError> {
        let (id, _previous) = self.construct::<T>(args)?;
        Ok(id)
    }

    /// Construct and attach a dependent component and hand back the instance
    /// it replaced.
    ///
    /// # Errors
    ///
    /// Same as [`ComponentRegistry::attach`].
    pub fn attach_replace<T: DependentComponent>(
        &mut self,
        args: T::Args,
    ) -> Result<Option<Detached<T>>, ComponentError> {
        let (_, previous) = self.construct::<T>(args)?;
        Ok(previous.and_then(reclaim::<T>))
    }

    /// Returns the component of type `T`, if attached.
    ///
    /// Returns `None` both when no `T` is attached and while the attached `T`
    /// is mutably borrowed. Use [`ComponentRegistry::require`] to tell the two
    /// apart.
    #[must_use]
    pub fn get<T: Component>(&self) -> Option<ComponentRef<'_, T>> {
        let slot = self.slots.get(&ComponentTypeId::of::<T>())?;
        let cell = slot.cell.downcast_ref::<RefCell<T>>()?;
        let value = cell.try_borrow().ok()?;
        Some(ComponentRef { id: slot.id, value })
    }

    /// Returns the component of type `T` mutably, if attached and not borrowed.
    /// Like [`ComponentRegistry::get`], `None` covers both cases.
    #[must_use]
    pub fn get_mut<T: Component>(&self) -> Option<ComponentMut<'_, T>> {
        let slot = self.slots.get(&ComponentTypeId::of::<T>())?;
        let cell = slot.cell.downcast_ref::<RefCell<T>>()?;
        let value = cell.try_borrow_mut().ok()?;
        Some(ComponentMut { id: slot.id, value })
    }

    /// Like [`ComponentRegistry::get`], for callers that cannot proceed
    /// without the component.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::Missing`] if no `T` is attached, and
    /// [`ComponentError::Borrowed`] if the attached `T` is mutably borrowed.
    pub fn require<T: Component>(&self) -> Result<ComponentRef<'_, T>, ComponentError> {
        let component = T::type_name();
        match self.get::<T>() {
            Some(found) => Ok(found),
            None if self.contains::<T>() => Err(ComponentError::Borrowed { component }),
            None => Err(ComponentError::Missing { component }),
        }
    }

    /// Detach and drop the component of type `T`. Returns `true` if one was
    /// attached.
    pub fn remove<T: Component>(&mut self) -> bool {
        self.remove_by_type(ComponentTypeId::of::<T>())
    }

    /// Detach and drop the component with the given type identity.
    pub fn remove_by_type(&mut self, type_id: ComponentTypeId) -> bool {
        match self.detach(type_id) {
            Some(slot) => {
                trace!(component = slot.meta.name, id = %slot.id, "component removed");
                true
            }
            None => false,
        }
    }

    /// Every attached component that provides capability `C`.
    ///
    /// Order follows attach order within the capability and carries no
    /// meaning beyond that.
    #[must_use]
    pub fn query<C: ?Sized + 'static>(&self) -> Capable<'_, C> {
        self.capabilities.query::<C>()
    }

    /// Run `f` once against every component providing capability `C`.
    ///
    /// Returns how many components were invoked. A component that is already
    /// borrowed elsewhere is skipped.
    pub fn for_each<C: ?Sized + 'static>(&self, mut f: impl FnMut(&mut C)) -> usize {
        let mut invoked = 0;
        for cell in self.query::<C>() {
            match cell.try_borrow_mut() {
                Ok(mut component) => {
                    f(&mut component);
                    invoked += 1;
                }
                Err(_) => warn!(
                    capability = std::any::type_name::<C>(),
                    "skipping component that is already borrowed"
                ),
            }
        }
        invoked
    }

    /// Number of attached components providing capability `C`.
    #[must_use]
    pub fn capability_count<C: ?Sized + 'static>(&self) -> usize {
        self.capabilities.count::<C>()
    }

    /// Returns `true` if a component of type `T` is attached.
    #[must_use]
    pub fn contains<T: Component>(&self) -> bool {
        self.contains_type(ComponentTypeId::of::<T>())
    }

    /// Returns `true` if a component with the given type identity is attached.
    #[must_use]
    pub fn contains_type(&self, type_id: ComponentTypeId) -> bool {
        self.slots.contains_key(&type_id)
    }

    /// Returns the id of the attached `T`, if any.
    #[must_use]
    pub fn id_of<T: Component>(&self) -> Option<ComponentId> {
        self.slots.get(&ComponentTypeId::of::<T>()).map(|slot| slot.id)
    }

    /// Names of all attached component types, in no particular order.
    pub fn type_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.slots.values().map(|slot| slot.meta.name)
    }

    /// Number of attached components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if no components are attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn put<T: Component>(&mut self, component: T) -> (ComponentId, Option<Slot>) {
        let previous = self.detach(ComponentTypeId::of::<T>());
        let id = ComponentId::issue(self.ids);
        self.place(id, Rc::new(RefCell::new(component)));
        (id, previous)
    }

    /// The previous instance is detached before the constructor runs, so the
    /// constructor's resolver sees the entity without any `T`.
    fn construct<T: DependentComponent>(
        &mut self,
        args: T::Args,
    ) -> Result<(ComponentId, Option<Slot>), ComponentError> {
        let previous = self.detach(ComponentTypeId::of::<T>());

        let constructed = T::construct(&Resolver::bound(&self.slots), args);
        match constructed {
            Ok(component) => {
                let id = ComponentId::issue(self.ids);
                self.place(id, Rc::new(RefCell::new(component)));
                Ok((id, previous))
            }
            Err(err) => {
                debug!(component = T::type_name(), %err, "component construction failed");
                if let Some(slot) = previous {
                    self.restore::<T>(slot);
                }
                Err(err)
            }
        }
    }

    fn place<T: Component>(&mut self, id: ComponentId, cell: Rc<RefCell<T>>) {
        let meta = ComponentMeta::of::<T>();

        let mut capabilities = Capabilities::new();
        T::provide(&cell, &mut capabilities);
        let provided = capabilities.len();
        self.capabilities.register(meta.type_id, capabilities);

        self.slots.insert(meta.type_id, Slot { id, meta, cell });
        trace!(component = meta.name, %id, capabilities = provided, "component attached");
    }

    fn restore<T: Component>(&mut self, slot: Slot) {
        let Slot { id, meta, cell } = slot;
        match cell.downcast::<RefCell<T>>() {
            Ok(cell) => {
                self.place(id, cell);
                debug!(component = meta.name, %id, "previous component restored");
            }
            Err(_) => warn!(component = meta.name, %id, "slot type mismatch, previous component dropped"),
        }
    }

    fn detach(&mut self, type_id: ComponentTypeId) -> Option<Slot> {
        let slot = self.slots.remove(&type_id)?;
        self.capabilities.unregister(type_id);
        Some(slot)
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Take sole ownership of a detached slot's value.
fn reclaim<T: Component>(slot: Slot) -> Option<Detached<T>> {
    let Slot { id, meta, cell } = slot;
    let cell = cell.downcast::<RefCell<T>>().ok()?;
    match Rc::try_unwrap(cell) {
        Ok(cell) => Some(Detached::new(id, cell.into_inner())),
        Err(_) => {
            warn!(component = meta.name, %id, "detached component is still shared, dropping it");
            None
        }
    }
}

/// Shared borrow of an attached component.
#[derive(Debug)]
pub struct ComponentRef<'a, T> {
    id: ComponentId,
    value: Ref<'a, T>,
}

impl<T> ComponentRef<'_, T> {
    /// The id of the borrowed instance.
    #[must_use]
    pub fn id(&self) -> ComponentId {
        self.id
    }
}

impl<T> std::ops::Deref for ComponentRef<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

/// Mutable borrow of an attached component.
#[derive(Debug)]
pub struct ComponentMut<'a, T> {
    id: ComponentId,
    value: RefMut<'a, T>,
}

impl<T> ComponentMut<'_, T> {
    /// The id of the borrowed instance.
    #[must_use]
    pub fn id(&self) -> ComponentId {
        self.id
    }
}

impl<T> std::ops::Deref for ComponentMut<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> std::ops::DerefMut for ComponentMut<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Dependent;
    use crate::resolver::Sibling;

    #[derive(Debug, Default)]
    struct Position {
        x: f32,
    }

    impl Component for Position {
        type Kind = Standalone;
        fn type_name() -> &'static str {
            "Position"
        }
    }

    #[derive(Debug)]
    struct Health {
        health: i32,
    }

    impl Component for Health {
        type Kind = Standalone;
        fn type_name() -> &'static str {
            "Health"
        }
    }

    /// Follows a [`Position`] and remembers where it was when attached.
    #[derive(Debug)]
    struct Follower {
        target: Sibling<Position>,
        start_x: f32,
        saw_itself: bool,
    }

    impl Component for Follower {
        type Kind = Dependent;
        fn type_name() -> &'static str {
            "Follower"
        }
    }

    impl DependentComponent for Follower {
        type Args = ();

        fn construct(resolver: &Resolver<'_>, _args: ()) -> Result<Self, ComponentError> {
            let target = resolver.require::<Position>("Follower requires a Position")?;
            let start_x = target.with(|p| p.x).unwrap_or_default();
            Ok(Self {
                target,
                start_x,
                saw_itself: resolver.resolve::<Follower>()?.is_some(),
            })
        }
    }

    trait Tick {
        fn tick(&mut self);
        fn count(&self) -> u32;
    }

    macro_rules! tick_counter {
        ($name:ident) => {
            #[derive(Debug, Default)]
            struct $name {
                ticks: u32,
            }

            impl Tick for $name {
                fn tick(&mut self) {
                    self.ticks += 1;
                }
                fn count(&self) -> u32 {
                    self.ticks
                }
            }

            impl Component for $name {
                type Kind = Standalone;
                fn type_name() -> &'static str {
                    stringify!($name)
                }
                fn provide(this: &Rc<RefCell<Self>>, capabilities: &mut Capabilities) {
                    capabilities.provide::<dyn Tick>(this.clone());
                }
            }
        };
    }

    tick_counter!(CounterA);
    tick_counter!(CounterB);
    tick_counter!(CounterC);

    #[test]
    fn test_component_ids_strictly_increase() {
        static IDS: IdIssuer = IdIssuer::starting_at(10);
        let mut first = ComponentRegistry::with_issuer(&IDS);
        let mut second = ComponentRegistry::with_issuer(&IDS);

        assert_eq!(first.insert(Position::default()), ComponentId(10));
        assert_eq!(first.insert(Health { health: 200 }), ComponentId(11));
        assert_eq!(second.insert(Position::default()), ComponentId(12));
        assert_eq!(second.insert(Health { health: 200 }), ComponentId(13));
        // Replacement still draws a fresh id.
        assert_eq!(first.insert(Position::default()), ComponentId(14));
        assert_eq!(first.attach::<Follower>(()), Ok(ComponentId(15)));
    }

    #[test]
    fn test_insert_and_get() {
        let mut registry = ComponentRegistry::new();
        let id = registry.insert(Position { x: 1.0 });

        let position = registry.get::<Position>().unwrap();
        assert_eq!(position.id(), id);
        assert!((position.x - 1.0).abs() < f32::EPSILON);
        drop(position);

        assert!(registry.get::<Health>().is_none());
    }

    #[test]
    fn test_replace_returns_previous() {
        let mut registry = ComponentRegistry::new();
        let first = registry.insert(Position { x: 1.0 });

        let previous = registry.replace(Position { x: 4.0 }).unwrap();
        assert_eq!(previous.id(), first);
        assert!((previous.x - 1.0).abs() < f32::EPSILON);

        let current = registry.get::<Position>().unwrap();
        assert_ne!(current.id(), first);
        assert!((current.x - 4.0).abs() < f32::EPSILON);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_replace_on_empty_returns_none() {
        let mut registry = ComponentRegistry::new();
        assert!(registry.replace(Position::default()).is_none());
    }

    #[test]
    fn test_multiple_components() {
        let mut registry = ComponentRegistry::new();
        let position_id = registry.insert(Position { x: 2.0 });
        let health_id = registry.insert(Health { health: 200 });

        assert_ne!(position_id, health_id);
        assert_eq!(registry.get::<Position>().unwrap().id(), position_id);
        assert!((registry.get::<Position>().unwrap().x - 2.0).abs() < f32::EPSILON);
        assert_eq!(registry.get::<Health>().unwrap().health, 200);
        assert_eq!(registry.get::<Health>().unwrap().health, 200);
    }

    #[test]
    fn test_empty_registry() {
        let registry = ComponentRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get::<Position>().is_none());
        assert!(!registry.contains::<Position>());
    }

    #[test]
    fn test_require_missing() {
        let mut registry = ComponentRegistry::new();
        let err = registry.require::<Health>().unwrap_err();
        assert_eq!(err, ComponentError::Missing { component: "Health" });

        registry.insert(Health { health: 5 });
        assert_eq!(registry.require::<Health>().unwrap().health, 5);
    }

    #[test]
    fn test_require_borrowed_is_not_missing() {
        let mut registry = ComponentRegistry::new();
        registry.insert(Health { health: 5 });

        let held = registry.get_mut::<Health>().unwrap();
        assert!(registry.contains::<Health>());
        assert!(registry.get::<Health>().is_none());
        let err = registry.require::<Health>().unwrap_err();
        assert_eq!(err, ComponentError::Borrowed { component: "Health" });
        assert_eq!(err.to_string(), "component Health is already borrowed");
        drop(held);

        assert_eq!(registry.require::<Health>().unwrap().health, 5);
    }

    #[test]
    fn test_get_mut_updates_value() {
        let mut registry = ComponentRegistry::new();
        registry.insert(Health { health: 5 });
        registry.get_mut::<Health>().unwrap().health -= 2;
        assert_eq!(registry.get::<Health>().unwrap().health, 3);
    }

    #[test]
    fn test_remove() {
        let mut registry = ComponentRegistry::new();
        registry.insert(Health { health: 1 });
        assert!(registry.remove::<Health>());
        assert!(!registry.remove::<Health>());
        assert!(registry.get::<Health>().is_none());
    }

    #[test]
    fn test_dependent_requires_sibling() {
        let mut registry = ComponentRegistry::new();

        let err = registry.attach::<Follower>(()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "misconfigured component:\n\tFollower requires a Position"
        );
        assert!(registry.is_empty());

        registry.insert(Position { x: 3.0 });
        registry.attach::<Follower>(()).unwrap();

        let follower = registry.get::<Follower>().unwrap();
        assert!((follower.start_x - 3.0).abs() < f32::EPSILON);
        assert_eq!(follower.target.id(), registry.id_of::<Position>().unwrap());
    }

    #[test]
    fn test_constructor_sees_pre_insertion_view() {
        let mut registry = ComponentRegistry::new();
        registry.insert(Position::default());
        registry.attach::<Follower>(()).unwrap();

        let previous = registry.attach_replace::<Follower>(()).unwrap().unwrap();
        assert!(!previous.saw_itself);
        assert!(!registry.get::<Follower>().unwrap().saw_itself);
    }

    #[test]
    fn test_failed_replacement_rolls_back() {
        let mut registry = ComponentRegistry::new();
        registry.insert(Position::default());
        let original = registry.attach::<Follower>(()).unwrap();

        registry.remove::<Position>();
        assert!(registry.attach::<Follower>(()).is_err());

        assert_eq!(registry.id_of::<Follower>(), Some(original));
    }

    #[test]
    fn test_failed_replacement_restores_capabilities() {
        struct Fragile;

        impl Component for Fragile {
            type Kind = Dependent;
            fn type_name() -> &'static str {
                "Fragile"
            }
            fn provide(this: &Rc<RefCell<Self>>, capabilities: &mut Capabilities) {
                capabilities.provide::<Fragile>(this.clone());
            }
        }

        impl DependentComponent for Fragile {
            type Args = bool;
            fn construct(_resolver: &Resolver<'_>, fail: bool) -> Result<Self, ComponentError> {
                if fail {
                    Err(ComponentError::misconfigured("told to fail"))
                } else {
                    Ok(Fragile)
                }
            }
        }

        let mut registry = ComponentRegistry::new();
        registry.attach::<Fragile>(false).unwrap();
        assert!(registry.attach::<Fragile>(true).is_err());
        assert_eq!(registry.capability_count::<Fragile>(), 1);
        assert!(registry.contains::<Fragile>());
    }

    #[test]
    fn test_sibling_goes_stale_after_replacement() {
        let mut registry = ComponentRegistry::new();
        registry.insert(Position { x: 1.0 });
        registry.attach::<Follower>(()).unwrap();

        registry.insert(Position { x: 9.0 });
        let follower = registry.get::<Follower>().unwrap();
        assert!(!follower.target.is_alive());
        assert_eq!(follower.target.with(|p| p.x), None);
    }

    #[test]
    fn test_sibling_sees_mutations() {
        let mut registry = ComponentRegistry::new();
        registry.insert(Position { x: 1.0 });
        registry.attach::<Follower>(()).unwrap();

        registry.get_mut::<Position>().unwrap().x = 5.0;
        let follower = registry.get::<Follower>().unwrap();
        assert_eq!(follower.target.with(|p| p.x), Some(5.0));
    }

    #[test]
    fn test_query_by_capability() {
        let mut registry = ComponentRegistry::new();
        registry.insert(CounterA::default());
        registry.insert(CounterB::default());
        registry.insert(CounterC::default());
        registry.insert(Position::default());
        registry.insert(Health { health: 1 });

        assert_eq!(registry.len(), 5);
        assert_eq!(registry.query::<dyn Tick>().count(), 3);

        let cycles = 10;
        for _ in 0..cycles {
            assert_eq!(registry.for_each::<dyn Tick>(|t| t.tick()), 3);
        }

        assert_eq!(registry.get::<CounterA>().unwrap().ticks, cycles);
        assert_eq!(registry.get::<CounterB>().unwrap().ticks, cycles);
        assert_eq!(registry.get::<CounterC>().unwrap().ticks, cycles);
        for counter in registry.query::<dyn Tick>() {
            assert_eq!(counter.borrow().count(), cycles);
        }
    }

    #[test]
    fn test_replacement_does_not_duplicate_capabilities() {
        let mut registry = ComponentRegistry::new();
        registry.insert(CounterA::default());
        registry.insert(CounterA { ticks: 7 });

        assert_eq!(registry.capability_count::<dyn Tick>(), 1);
        let counts: Vec<u32> = registry
            .query::<dyn Tick>()
            .map(|t| t.borrow().count())
            .collect();
        assert_eq!(counts, vec![7]);
    }

    #[test]
    fn test_remove_drops_capabilities() {
        let mut registry = ComponentRegistry::new();
        registry.insert(CounterA::default());
        registry.remove::<CounterA>();
        assert_eq!(registry.query::<dyn Tick>().count(), 0);
    }

    #[test]
    fn test_for_each_skips_borrowed_component() {
        let mut registry = ComponentRegistry::new();
        registry.insert(CounterA::default());
        registry.insert(CounterB::default());

        let held = registry.get_mut::<CounterA>().unwrap();
        assert_eq!(registry.for_each::<dyn Tick>(|t| t.tick()), 1);
        drop(held);

        assert_eq!(registry.get::<CounterA>().unwrap().ticks, 0);
        assert_eq!(registry.get::<CounterB>().unwrap().ticks, 1);
    }
}
