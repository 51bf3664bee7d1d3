use std::collections::HashMap;

use log::debug;

use super::{
    contact::ContactManifold,
    rect::{RectProvider, SolidHooks},
};
use crate::{
    core::{
        body::Body,
        collider::{ColliderKind, ColliderView},
    },
    dynamics::policy::ResolutionPolicy,
    error::{PhysicsError, Result},
};

/// One side of a contact handed to [`ContactProvider::solve`].
pub struct Operand<'a> {
    pub body: &'a mut Body,
    pub collider: ColliderView,
}

impl<'a> Operand<'a> {
    pub fn new(body: &'a mut Body, collider: ColliderView) -> Self {
        Self { body, collider }
    }
}

/// Narrow-phase test and resolution for one ordered pair of collider kinds.
pub trait ContactProvider: Send + Sync {
    /// Exact overlap test. The broad phase has already run; the manifold normal
    /// points from `a` toward `b`.
    fn test(&self, a: &ColliderView, b: &ColliderView) -> Option<ContactManifold>;

    /// Resolves the contact. Returns false when the contact is not treated as solid
    /// this step, which also suppresses its contact events.
    fn solve(
        &self,
        a: Operand<'_>,
        b: Operand<'_>,
        manifold: &ContactManifold,
        policy: &dyn ResolutionPolicy,
    ) -> bool;
}

struct Registration {
    declared: (ColliderKind, ColliderKind),
    provider: Box<dyn ContactProvider>,
}

/// Table of providers keyed by unordered pairs of collider kinds.
///
/// The registry is a plain value owned by a world; providers are registered before
/// simulation starts. A pair without a provider never collides.
pub struct ProviderRegistry {
    table: HashMap<(ColliderKind, ColliderKind), Registration>,
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ProviderRegistry {
    /// Empty registry: nothing collides until a provider is registered.
    pub fn empty() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Registry with the built-in rect/rect provider.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.table.insert(
            (ColliderKind::RECT, ColliderKind::RECT),
            Registration {
                declared: (ColliderKind::RECT, ColliderKind::RECT),
                provider: Box::new(RectProvider::<SolidHooks>::default()),
            },
        );
        registry
    }

    /// Registers `provider` for colliders of kinds `first` and `second`, in that order.
    pub fn register<P>(&mut self, first: ColliderKind, second: ColliderKind, provider: P) -> Result<()>
    where
        P: ContactProvider + 'static,
    {
        let key = canonical(first, second);
        if self.table.contains_key(&key) {
            return Err(PhysicsError::DuplicateProvider { first, second });
        }
        debug!("registered contact provider for ({first}, {second})");
        self.table.insert(
            key,
            Registration {
                declared: (first, second),
                provider: Box::new(provider),
            },
        );
        Ok(())
    }

    /// Looks up the provider for `a`/`b`. `swapped` is true when the provider expects
    /// its arguments in the opposite order.
    pub fn try_get(&self, a: ColliderKind, b: ColliderKind) -> Option<(&dyn ContactProvider, bool)> {
        let registration = self.table.get(&canonical(a, b))?;
        let swapped = registration.declared != (a, b);
        Some((registration.provider.as_ref(), swapped))
    }

    pub fn contains(&self, a: ColliderKind, b: ColliderKind) -> bool {
        self.table.contains_key(&canonical(a, b))
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Runs the narrow phase with the provider's argument order and reports the
    /// manifold from `a` toward `b`. `None` means no provider or no overlap.
    pub fn test(&self, a: &ColliderView, b: &ColliderView) -> Option<ContactManifold> {
        let (provider, swapped) = self.try_get(a.kind, b.kind)?;
        if swapped {
            provider.test(b, a).map(|manifold| manifold.flipped())
        } else {
            provider.test(a, b)
        }
    }

    /// Resolves a contact whose manifold points from `a` toward `b`. Returns `None`
    /// when no provider is registered, otherwise whether the contact was solid.
    pub fn solve(
        &self,
        a: Operand<'_>,
        b: Operand<'_>,
        manifold: &ContactManifold,
        policy: &dyn ResolutionPolicy,
    ) -> Option<bool> {
        let (provider, swapped) = self.try_get(a.collider.kind, b.collider.kind)?;
        let solid = if swapped {
            provider.solve(b, a, &manifold.flipped(), policy)
        } else {
            provider.solve(a, b, manifold, policy)
        };
        Some(solid)
    }
}

fn canonical(a: ColliderKind, b: ColliderKind) -> (ColliderKind, ColliderKind) {
    if b < a {
        (b, a)
    } else {
        (a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GATE: ColliderKind = ColliderKind::custom(3);

    struct Never;

    impl ContactProvider for Never {
        fn test(&self, _a: &ColliderView, _b: &ColliderView) -> Option<ContactManifold> {
            None
        }

        fn solve(
            &self,
            _a: Operand<'_>,
            _b: Operand<'_>,
            _manifold: &ContactManifold,
            _policy: &dyn ResolutionPolicy,
        ) -> bool {
            false
        }
    }

    #[test]
    fn lookup_reports_swapped_order() {
        let mut registry = ProviderRegistry::with_defaults();
        registry
            .register(GATE, ColliderKind::RECT, Never)
            .expect("first registration");

        let (_, swapped) = registry.try_get(GATE, ColliderKind::RECT).expect("registered");
        assert!(!swapped);
        let (_, swapped) = registry.try_get(ColliderKind::RECT, GATE).expect("registered");
        assert!(swapped);
        let (_, swapped) = registry
            .try_get(ColliderKind::RECT, ColliderKind::RECT)
            .expect("built in");
        assert!(!swapped);
    }

    #[test]
    fn duplicate_pairs_are_rejected_in_either_order() {
        let mut registry = ProviderRegistry::empty();
        registry.register(GATE, ColliderKind::RECT, Never).expect("first");
        assert_eq!(
            registry.register(ColliderKind::RECT, GATE, Never),
            Err(PhysicsError::DuplicateProvider {
                first: ColliderKind::RECT,
                second: GATE,
            })
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn default_registry_handles_rect_pairs() {
        let registry = ProviderRegistry::default();
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(ColliderKind::RECT, ColliderKind::RECT));
    }

    #[test]
    fn unregistered_pairs_never_collide() {
        let registry = ProviderRegistry::empty();
        assert!(registry.is_empty());
        assert!(registry.try_get(ColliderKind::RECT, ColliderKind::RECT).is_none());
        assert!(!registry.contains(GATE, GATE));
    }
}
