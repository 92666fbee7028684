//! Identifier issuing.
//!
//! Entities and components each carry a `u64` identifier drawn from an
//! [`IdIssuer`]. The runtime uses two process-scoped issuers,
//! [`COMPONENT_IDS`] and [`ENTITY_IDS`], but any entity can be built against
//! its own issuers so tests can assert exact sequences.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Issuer shared by every component type in the process.
pub static COMPONENT_IDS: IdIssuer = IdIssuer::new();

/// Issuer shared by every entity in the process.
pub static ENTITY_IDS: IdIssuer = IdIssuer::new();

/// Hands out monotonically increasing identifiers.
///
/// Identifiers are never reused. IDs start at 1; 0 is reserved as an
/// invalid sentinel.
#[derive(Debug)]
pub struct IdIssuer {
    next: AtomicU64,
}

impl IdIssuer {
    /// Creates an issuer whose first identifier is 1.
    #[must_use]
    pub const fn new() -> Self {
        Self::starting_at(1)
    }

    /// Creates an issuer whose first identifier is `first`. An issuer starting
    /// at 0 is already exhausted.
    #[must_use]
    pub const fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    /// Issues the next identifier.
    ///
    /// # Panics
    ///
    /// Panics once the `u64` space is exhausted rather than wrapping back to
    /// the invalid id.
    pub fn issue(&self) -> u64 {
        match self.try_issue() {
            Some(id) => id,
            None => panic!("identifier space exhausted"),
        }
    }

    /// Issues the next identifier, or `None` once the `u64` space is
    /// exhausted. `u64::MAX` is the last identifier handed out.
    pub fn try_issue(&self) -> Option<u64> {
        let mut issued = None;
        let _ = self
            .next
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |next| {
                if next == 0 {
                    return None;
                }
                issued = Some(next);
                Some(next.checked_add(1).unwrap_or(0))
            });
        issued
    }

    /// Returns the identifier the next call to [`IdIssuer::issue`] will return,
    /// or 0 once the issuer is exhausted.
    #[must_use]
    pub fn peek(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}

impl Default for IdIssuer {
    fn default() -> Self {
        Self::new()
    }
}

/// Identity of one attached component instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(pub u64);

impl ComponentId {
    /// Issues a fresh component id from `issuer`.
    #[must_use]
    pub fn issue(issuer: &IdIssuer) -> Self {
        Self(issuer.issue())
    }

    /// Returns the raw `u64` identifier.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ComponentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Component({})", self.0)
    }
}

/// Identity of one entity.
///
/// Entity IDs are plain values. Observers that outlive an entity keep the
/// id, never the entity itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl EntityId {
    /// The null / invalid entity sentinel.
    pub const INVALID: EntityId = EntityId(0);

    /// Issues a fresh entity id from `issuer`.
    #[must_use]
    pub fn issue(issuer: &IdIssuer) -> Self {
        Self(issuer.issue())
    }

    /// Returns the raw `u64` identifier.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }

    /// Returns `true` if this is a valid (non-zero) entity id.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}
