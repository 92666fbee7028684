//! Capability indexing.
//!
//! A capability is any `dyn Trait` a component may implement (tickable,
//! drawable, collider, ...). Components announce what they provide through
//! [`Component::provide`](crate::Component::provide) when they are placed
//! into a registry; the registry files them into one list per capability.
//! Queries then read a single list instead of probing every component.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::component::ComponentTypeId;

/// Collects the capability handles one component provides.
#[derive(Debug, Default)]
pub struct Capabilities {
    provided: Vec<(TypeId, Box<dyn Any>)>,
}

impl Capabilities {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Declares that the component behind `handle` implements capability `C`.
    ///
    /// Name the capability explicitly so the handle is coerced to the trait
    /// object: `capabilities.provide::<dyn Tickable>(this.clone())`.
    pub fn provide<C: ?Sized + 'static>(&mut self, handle: Rc<RefCell<C>>) {
        self.provided.push((TypeId::of::<C>(), Box::new(handle)));
    }

    /// Number of capabilities declared so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.provided.len()
    }

    /// Returns `true` if nothing has been declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.provided.is_empty()
    }
}

#[derive(Debug)]
struct CapabilityEntry {
    owner: ComponentTypeId,
    /// Always an `Rc<RefCell<C>>` for the list's capability `C`.
    handle: Box<dyn Any>,
}

/// Per-capability lists of component handles, owned by one registry.
#[derive(Debug, Default)]
pub(crate) struct CapabilityIndex {
    lists: HashMap<TypeId, Vec<CapabilityEntry>>,
}

impl CapabilityIndex {
    /// Files every handle in `capabilities` under its capability.
    pub(crate) fn register(&mut self, owner: ComponentTypeId, capabilities: Capabilities) {
        for (capability, handle) in capabilities.provided {
            self.lists
                .entry(capability)
                .or_default()
                .push(CapabilityEntry { owner, handle });
        }
    }

    /// Drops every handle registered by `owner`. Returns how many were removed.
    pub(crate) fn unregister(&mut self, owner: ComponentTypeId) -> usize {
        let mut removed = 0;
        self.lists.retain(|_, entries| {
            let before = entries.len();
            entries.retain(|entry| entry.owner != owner);
            removed += before - entries.len();
            !entries.is_empty()
        });
        removed
    }

    pub(crate) fn query<C: ?Sized + 'static>(&self) -> Capable<'_, C> {
        let entries = self
            .lists
            .get(&TypeId::of::<C>())
            .map(|entries| entries.iter())
            .unwrap_or_default();
        Capable {
            entries,
            _capability: PhantomData,
        }
    }

    pub(crate) fn count<C: ?Sized + 'static>(&self) -> usize {
        self.lists.get(&TypeId::of::<C>()).map_or(0, Vec::len)
    }
}

/// Iterator over every component in one registry that provides capability `C`.
///
/// A clone continues from the current position. Call
/// [`ComponentRegistry::query`](crate::ComponentRegistry::query) again for a
/// fresh pass; nothing is cached between calls.
pub struct Capable<'a, C: ?Sized + 'static> {
    entries: std::slice::Iter<'a, CapabilityEntry>,
    _capability: PhantomData<&'a C>,
}

impl<'a, C: ?Sized + 'static> Iterator for Capable<'a, C> {
    type Item = &'a RefCell<C>;

    fn next(&mut self) -> Option<Self::Item> {
        self.entries
            .by_ref()
            .find_map(|entry| entry.handle.downcast_ref::<Rc<RefCell<C>>>())
            .map(|handle| &**handle)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.entries.len()))
    }
}

impl<C: ?Sized + 'static> Clone for Capable<'_, C> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            _capability: PhantomData,
        }
    }
}

impl<C: ?Sized + 'static> std::fmt::Debug for Capable<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capable")
            .field("remaining", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Component, Standalone};

    trait Greeter {
        fn greet(&self) -> String;
    }

    struct English;
    struct French;

    impl Greeter for English {
        fn greet(&self) -> String {
            "hello".to_string()
        }
    }

    impl Greeter for French {
        fn greet(&self) -> String {
            "bonjour".to_string()
        }
    }

    impl Component for English {
        type Kind = Standalone;
        fn type_name() -> &'static str {
            "English"
        }
    }

    impl Component for French {
        type Kind = Standalone;
        fn type_name() -> &'static str {
            "French"
        }
    }

    fn index_with_both() -> CapabilityIndex {
        let mut index = CapabilityIndex::default();

        let mut caps = Capabilities::new();
        caps.provide::<dyn Greeter>(Rc::new(RefCell::new(English)));
        index.register(ComponentTypeId::of::<English>(), caps);

        let mut caps = Capabilities::new();
        caps.provide::<dyn Greeter>(Rc::new(RefCell::new(French)));
        index.register(ComponentTypeId::of::<French>(), caps);

        index
    }

    #[test]
    fn test_query_returns_every_provider() {
        let index = index_with_both();
        let mut greetings: Vec<String> = index
            .query::<dyn Greeter>()
            .map(|g| g.borrow().greet())
            .collect();
        greetings.sort();
        assert_eq!(greetings, vec!["bonjour", "hello"]);
        assert_eq!(index.count::<dyn Greeter>(), 2);
    }

    #[test]
    fn test_query_unknown_capability_is_empty() {
        let index = index_with_both();
        assert_eq!(index.query::<dyn std::fmt::Debug>().count(), 0);
    }

    #[test]
    fn test_unregister_removes_owner_entries() {
        let mut index = index_with_both();
        assert_eq!(index.unregister(ComponentTypeId::of::<English>()), 1);
        assert_eq!(index.count::<dyn Greeter>(), 1);
        assert_eq!(index.unregister(ComponentTypeId::of::<English>()), 0);
    }

    #[test]
    fn test_query_is_restartable() {
        let index = index_with_both();
        let query = index.query::<dyn Greeter>();
        assert_eq!(query.clone().count(), 2);
        assert_eq!(query.count(), 2);
    }
}
