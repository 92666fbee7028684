//! Core [`Component`] trait and associated metadata.
//!
//! Every piece of behavior attached to an entity implements [`Component`].
//! Components come in exactly one of two classes, selected by the associated
//! [`Component::Kind`] type:
//!
//! - [`Standalone`]: built by the caller and handed to the registry as a value.
//! - [`Dependent`]: built by the registry through
//!   [`DependentComponent::construct`], which receives a [`Resolver`] bound to
//!   the owning entity so the component can look up its siblings.
//!
//! Because `Kind` is an associated type, a concrete type cannot be both.

use std::any::TypeId;
use std::cell::RefCell;
use std::rc::Rc;

use crate::capability::Capabilities;
use crate::error::ComponentError;
use crate::id::ComponentId;
use crate::resolver::Resolver;

/// Identity of a concrete component type.
///
/// Lookups in a registry are keyed by this value and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentTypeId(TypeId);

impl ComponentTypeId {
    /// Returns the [`ComponentTypeId`] for the Rust type `T`.
    #[must_use]
    pub fn of<T: Component>() -> Self {
        Self(TypeId::of::<T>())
    }

    /// Returns the underlying [`TypeId`].
    #[must_use]
    pub fn type_id(self) -> TypeId {
        self.0
    }
}

/// Metadata about a component type, kept next to each stored instance.
#[derive(Debug, Clone, Copy)]
pub struct ComponentMeta {
    /// The unique type identifier.
    pub type_id: ComponentTypeId,
    /// The human-readable name of the component (e.g. `"TransformComponent"`).
    pub name: &'static str,
}

impl ComponentMeta {
    /// Returns the [`ComponentMeta`] descriptor for `T`.
    #[must_use]
    pub fn of<T: Component>() -> Self {
        Self {
            type_id: ComponentTypeId::of::<T>(),
            name: T::type_name(),
        }
    }
}

mod sealed {
    pub trait Sealed {}
}

/// The capability class of a component type. Sealed: implemented only by
/// [`Standalone`] and [`Dependent`].
pub trait ComponentKind: sealed::Sealed + 'static {}

/// Marker for components that need no sibling lookup to be built.
#[derive(Debug)]
pub enum Standalone {}

/// Marker for components that are built with a [`Resolver`].
#[derive(Debug)]
pub enum Dependent {}

impl sealed::Sealed for Standalone {}
impl sealed::Sealed for Dependent {}
impl ComponentKind for Standalone {}
impl ComponentKind for Dependent {}

/// The core component trait.
///
/// # Examples
///
/// ```rust
/// use engine_component::{Component, Standalone};
///
/// #[derive(Debug)]
/// struct Health {
///     current: i32,
/// }
///
/// impl Component for Health {
///     type Kind = Standalone;
///
///     fn type_name() -> &'static str {
///         "Health"
///     }
/// }
/// ```
pub trait Component: 'static {
    /// Whether this type is [`Standalone`] or [`Dependent`].
    type Kind: ComponentKind;

    /// A human-readable name for this component type.
    fn type_name() -> &'static str;

    /// Registers the capabilities this component provides.
    ///
    /// Called once each time an instance is placed into a registry. The
    /// default provides nothing.
    ///
    /// ```rust,ignore
    /// fn provide(this: &Rc<RefCell<Self>>, capabilities: &mut Capabilities) {
    ///     capabilities.provide::<dyn Tickable>(this.clone());
    /// }
    /// ```
    fn provide(_this: &Rc<RefCell<Self>>, _capabilities: &mut Capabilities)
    where
        Self: Sized,
    {
    }
}

/// Components that look up siblings while being built.
///
/// The resolver is always the first argument. A constructor that cannot find
/// a required sibling returns [`ComponentError::Misconfigured`], which aborts
/// the attach.
pub trait DependentComponent: Component<Kind = Dependent> + Sized {
    /// Component-specific constructor arguments.
    type Args;

    /// Builds the component against the owning entity's current components.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::Misconfigured`] when a required sibling is
    /// absent and [`ComponentError::InvalidResolver`] when `resolver` is not
    /// bound to an entity.
    fn construct(resolver: &Resolver<'_>, args: Self::Args) -> Result<Self, ComponentError>;
}

/// A component that has been taken out of a registry.
///
/// The registry keeps no knowledge of it; the holder owns it outright.
#[derive(Debug)]
pub struct Detached<T> {
    id: ComponentId,
    component: T,
}

impl<T> Detached<T> {
    pub(crate) fn new(id: ComponentId, component: T) -> Self {
        Self { id, component }
    }

    /// The id the component had while attached.
    #[must_use]
    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// Unwraps the component value.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.component
    }
}

impl<T> std::ops::Deref for Detached<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.component
    }
}

impl<T> std::ops::DerefMut for Detached<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.component
    }
}
