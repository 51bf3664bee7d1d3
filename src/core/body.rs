use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use glam::Vec2;

use super::{
    collider::{Collider, ColliderBuilder, ColliderSlot, ColliderView},
    types::{Aabb, BodyKind},
};
use crate::{
    config::{DEFAULT_FRICTION, DEFAULT_LINEAR_DAMPING, DEFAULT_MASS, DEFAULT_RESTITUTION},
    error::{PhysicsError, Result},
    utils::allocator::BodyId,
};

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(0);

/// Process-unique identity of a body object, independent of any world registration.
/// Colliders carry their body's token so they cannot be attached elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyToken(u64);

impl BodyToken {
    fn next() -> Self {
        Self(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed))
    }
}

/// Opaque handle to whatever game object owns a body. Compared by identity.
#[derive(Clone)]
pub struct OwnerRef(Arc<dyn Any + Send + Sync>);

impl OwnerRef {
    pub fn new<T: Any + Send + Sync>(owner: T) -> Self {
        Self(Arc::new(owner))
    }

    pub fn from_arc(owner: Arc<dyn Any + Send + Sync>) -> Self {
        Self(owner)
    }

    pub fn ptr_eq(&self, other: &OwnerRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl fmt::Debug for OwnerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OwnerRef({:p})", Arc::as_ptr(&self.0))
    }
}

/// Axis-aligned, non-rotating rigid body owning a set of colliders.
///
/// A clone is a new, unregistered body: it gets its own token and its colliders are
/// rebound to it, so nothing built from the clone can be attached to the original.
#[derive(Debug)]
pub struct Body {
    token: BodyToken,
    id: Option<BodyId>,
    pub kind: BodyKind,
    position: Vec2,
    /// Written by the caller once per step for interpolation; the engine never touches it.
    pub previous_position: Vec2,
    pub velocity: Vec2,
    pub mass: f32,
    pub restitution: f32,
    pub friction: f32,
    pub linear_damping: f32,
    /// Zero means unbounded.
    pub max_speed: f32,
    pub gravity_scale: f32,
    pub can_sleep: bool,
    is_sleeping: bool,
    /// Informational movement constraint in radians; zero means free.
    pub constraint_angle: f32,
    pub is_enabled: bool,
    owner: Option<OwnerRef>,
    colliders: Vec<Collider>,
    next_slot: u32,
    bounds: OnceLock<Aabb>,
}

impl Clone for Body {
    fn clone(&self) -> Self {
        let token = BodyToken::next();
        let mut colliders = self.colliders.clone();
        for collider in &mut colliders {
            collider.rebind(token);
        }
        Self {
            token,
            id: None,
            kind: self.kind,
            position: self.position,
            previous_position: self.previous_position,
            velocity: self.velocity,
            mass: self.mass,
            restitution: self.restitution,
            friction: self.friction,
            linear_damping: self.linear_damping,
            max_speed: self.max_speed,
            gravity_scale: self.gravity_scale,
            can_sleep: self.can_sleep,
            is_sleeping: self.is_sleeping,
            constraint_angle: self.constraint_angle,
            is_enabled: self.is_enabled,
            owner: self.owner.clone(),
            colliders,
            next_slot: self.next_slot,
            bounds: self.bounds.clone(),
        }
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::new(BodyKind::Dynamic)
    }
}

impl Body {
    pub fn new(kind: BodyKind) -> Self {
        Self {
            token: BodyToken::next(),
            id: None,
            kind,
            position: Vec2::ZERO,
            previous_position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            mass: DEFAULT_MASS,
            restitution: DEFAULT_RESTITUTION,
            friction: DEFAULT_FRICTION,
            linear_damping: DEFAULT_LINEAR_DAMPING,
            max_speed: 0.0,
            gravity_scale: 1.0,
            can_sleep: true,
            is_sleeping: false,
            constraint_angle: 0.0,
            is_enabled: true,
            owner: None,
            colliders: Vec::new(),
            next_slot: 0,
            bounds: OnceLock::new(),
        }
    }

    pub fn builder(kind: BodyKind) -> BodyBuilder {
        BodyBuilder::new(kind)
    }

    /// Stable index assigned by the world; `None` while detached.
    pub fn id(&self) -> Option<BodyId> {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: Option<BodyId>) {
        self.id = id;
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        if self.position != position {
            self.position = position;
            self.invalidate_bounds();
        }
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.set_position(self.position + delta);
    }

    /// Zero for static, kinematic, massless, or disabled bodies.
    pub fn inverse_mass(&self) -> f32 {
        let massless = !(self.mass > 0.0) || !self.mass.is_finite();
        if !self.is_enabled || !self.kind.is_dynamic() || massless {
            0.0
        } else {
            1.0 / self.mass
        }
    }

    pub fn is_movable(&self) -> bool {
        self.inverse_mass() > 0.0
    }

    pub fn apply_impulse(&mut self, impulse: Vec2) {
        let inverse_mass = self.inverse_mass();
        if inverse_mass == 0.0 {
            return;
        }
        self.velocity += impulse * inverse_mass;
        self.is_sleeping = false;
    }

    pub fn is_sleeping(&self) -> bool {
        self.is_sleeping
    }

    /// Marks the body asleep if it is allowed to sleep. Returns whether it is now asleep.
    pub fn sleep(&mut self) -> bool {
        if self.can_sleep {
            self.is_sleeping = true;
        }
        self.is_sleeping
    }

    pub fn wake(&mut self) {
        self.is_sleeping = false;
    }

    pub fn owner(&self) -> Option<&OwnerRef> {
        self.owner.as_ref()
    }

    pub fn set_owner(&mut self, owner: Option<OwnerRef>) {
        self.owner = owner;
    }

    /// Starts a collider bound to this body; finish it with [`Body::attach_collider`].
    pub fn collider_builder(&self) -> ColliderBuilder {
        Collider::builder_for(self.token)
    }

    /// Shorthand for a solid rectangle with the default filter.
    pub fn add_rect(&mut self, offset: Vec2, size: Vec2) -> ColliderSlot {
        let collider = self.collider_builder().rect(offset, size).build();
        self.push_collider(collider)
    }

    /// Attaches a collider built for this body. A collider whose slot is still attached
    /// replaces the stored one in place and keeps its slot.
    pub fn attach_collider(&mut self, collider: Collider) -> Result<ColliderSlot> {
        if collider.owner_token() != self.token {
            return Err(PhysicsError::ColliderOwnedByOtherBody);
        }
        if let Some(slot) = collider.slot() {
            if let Some(stored) = self.colliders.iter_mut().find(|c| c.slot() == Some(slot)) {
                *stored = collider;
                self.invalidate_bounds();
                return Ok(slot);
            }
        }
        Ok(self.push_collider(collider))
    }

    fn push_collider(&mut self, mut collider: Collider) -> ColliderSlot {
        let slot = ColliderSlot(self.next_slot);
        self.next_slot += 1;
        collider.set_slot(Some(slot));
        self.colliders.push(collider);
        self.invalidate_bounds();
        slot
    }

    /// Detaches a collider without destroying it. It can later be re-attached to this body only.
    pub fn detach_collider(&mut self, slot: ColliderSlot) -> Option<Collider> {
        let index = self.colliders.iter().position(|c| c.slot() == Some(slot))?;
        let mut collider = self.colliders.remove(index);
        collider.set_slot(None);
        self.invalidate_bounds();
        Some(collider)
    }

    pub fn colliders(&self) -> &[Collider] {
        &self.colliders
    }

    pub fn collider(&self, slot: ColliderSlot) -> Option<&Collider> {
        self.colliders.iter().find(|c| c.slot() == Some(slot))
    }

    /// Mutable collider access; the cached bounds are invalidated up front.
    pub fn collider_mut(&mut self, slot: ColliderSlot) -> Option<&mut Collider> {
        self.invalidate_bounds();
        self.colliders.iter_mut().find(|c| c.slot() == Some(slot))
    }

    pub fn collider_world_rect(&self, slot: ColliderSlot) -> Option<Aabb> {
        self.collider(slot).map(|c| c.world_rect(self.position))
    }

    /// Union of the enabled colliders' world rectangles, or a zero-size box at the
    /// body position when there are none. Recomputed lazily after invalidation.
    pub fn bounding_box(&self) -> Aabb {
        *self.bounds.get_or_init(|| self.bounds_at(self.position))
    }

    /// The bounding box this body would have at `position`.
    pub fn bounds_at(&self, position: Vec2) -> Aabb {
        self.colliders
            .iter()
            .filter(|c| c.is_enabled)
            .map(|c| c.world_rect(position))
            .reduce(|acc, rect| acc.union(&rect))
            .unwrap_or_else(|| Aabb::point(position))
    }

    /// Enabled colliders placed at `position`, tagged with `id`.
    pub fn collider_views_at(
        &self,
        id: BodyId,
        position: Vec2,
    ) -> impl Iterator<Item = ColliderView> + '_ {
        self.colliders
            .iter()
            .filter(|c| c.is_enabled)
            .filter_map(move |c| c.slot().map(|slot| ColliderView::new(id, c, slot, position)))
    }

    fn invalidate_bounds(&mut self) {
        self.bounds.take();
    }

    #[cfg(test)]
    pub(crate) fn bounds_cached(&self) -> bool {
        self.bounds.get().is_some()
    }
}

/// Fluent body configuration.
pub struct BodyBuilder {
    body: Body,
}

impl BodyBuilder {
    pub fn new(kind: BodyKind) -> Self {
        Self {
            body: Body::new(kind),
        }
    }

    pub fn position(mut self, position: Vec2) -> Self {
        self.body.position = position;
        self.body.previous_position = position;
        self
    }

    pub fn velocity(mut self, velocity: Vec2) -> Self {
        self.body.velocity = velocity;
        self
    }

    pub fn mass(mut self, mass: f32) -> Self {
        self.body.mass = mass.max(0.0);
        self
    }

    pub fn restitution(mut self, restitution: f32) -> Self {
        self.body.restitution = restitution.clamp(0.0, 1.0);
        self
    }

    pub fn friction(mut self, friction: f32) -> Self {
        self.body.friction = friction.clamp(0.0, 1.0);
        self
    }

    pub fn linear_damping(mut self, damping: f32) -> Self {
        self.body.linear_damping = damping.max(0.0);
        self
    }

    pub fn max_speed(mut self, max_speed: f32) -> Self {
        self.body.max_speed = max_speed.max(0.0);
        self
    }

    pub fn gravity_scale(mut self, scale: f32) -> Self {
        self.body.gravity_scale = scale;
        self
    }

    pub fn can_sleep(mut self, can_sleep: bool) -> Self {
        self.body.can_sleep = can_sleep;
        self
    }

    pub fn constraint_angle(mut self, angle: f32) -> Self {
        self.body.constraint_angle = angle;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.body.is_enabled = enabled;
        self
    }

    pub fn owner(mut self, owner: OwnerRef) -> Self {
        self.body.owner = Some(owner);
        self
    }

    pub fn rect(mut self, offset: Vec2, size: Vec2) -> Self {
        self.body.add_rect(offset, size);
        self
    }

    /// Adds a collider configured through a builder bound to this body.
    pub fn collider(mut self, configure: impl FnOnce(ColliderBuilder) -> ColliderBuilder) -> Self {
        let collider = configure(self.body.collider_builder()).build();
        self.body.push_collider(collider);
        self
    }

    pub fn build(self) -> Body {
        self.body
    }
}
