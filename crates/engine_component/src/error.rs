//! Component runtime error types.

/// Errors raised while attaching or requiring components.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComponentError {
    /// A dependent component could not find a sibling it needs.
    #[error("misconfigured component:\n\t{requirement}")]
    Misconfigured {
        /// Description of the unmet requirement.
        requirement: String,
    },

    /// A caller required a component the entity does not have.
    #[error("required component {component} does not exist")]
    Missing {
        /// Name of the missing component type.
        component: &'static str,
    },

    /// A caller required a component that is attached but currently
    /// mutably borrowed.
    #[error("component {component} is already borrowed")]
    Borrowed {
        /// Name of the borrowed component type.
        component: &'static str,
    },

    /// A dependent component was constructed without a bound resolver.
    #[error("resolver is not bound to an entity, cannot look up {requested}")]
    InvalidResolver {
        /// Name of the sibling type that was looked up.
        requested: &'static str,
    },
}

impl ComponentError {
    /// Shorthand for [`ComponentError::Misconfigured`].
    #[must_use]
    pub fn misconfigured(requirement: impl Into<String>) -> Self {
        Self::Misconfigured {
            requirement: requirement.into(),
        }
    }
}
