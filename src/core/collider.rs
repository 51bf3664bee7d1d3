use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{body::BodyToken, types::Aabb};
use crate::utils::allocator::BodyId;

/// Stable identifier of a collider kind, used to dispatch narrow phase and resolution.
///
/// [`ColliderKind::RECT`] is built in; game code may declare further rect-based kinds
/// (one-way gates, hazards, ...) and register providers for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColliderKind(pub u16);

impl ColliderKind {
    pub const RECT: Self = Self(0);

    pub const fn custom(id: u16) -> Self {
        Self(id)
    }
}

impl fmt::Display for ColliderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::RECT {
            f.write_str("rect")
        } else {
            write!(f, "kind#{}", self.0)
        }
    }
}

/// Enumeration of supported collider geometries, in body-local space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ColliderShape {
    Rect { offset: Vec2, size: Vec2 },
}

impl ColliderShape {
    pub fn local_bounds(&self) -> Aabb {
        match self {
            ColliderShape::Rect { offset, size } => Aabb::from_position_size(*offset, *size),
        }
    }
}

/// Simple collision filtering mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollisionFilter {
    pub layer: u32,
    pub mask: u32,
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self {
            layer: 1,
            mask: u32::MAX,
        }
    }
}

impl CollisionFilter {
    pub const fn new(layer: u32, mask: u32) -> Self {
        Self { layer, mask }
    }

    /// Both sides must accept the other's layer.
    pub const fn matches(&self, other: &CollisionFilter) -> bool {
        (self.mask & other.layer) != 0 && (other.mask & self.layer) != 0
    }
}

/// Per-body slot number of an attached collider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColliderSlot(pub u32);

/// World-wide identity of an attached collider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColliderKey {
    pub body: BodyId,
    pub slot: ColliderSlot,
}

/// Shape attached to a body. It has no position of its own: its world rectangle is the
/// local rectangle translated by the owning body's position.
#[derive(Debug, Clone, PartialEq)]
pub struct Collider {
    owner: BodyToken,
    slot: Option<ColliderSlot>,
    pub shape: ColliderShape,
    pub kind: ColliderKind,
    pub is_enabled: bool,
    pub is_sensor: bool,
    pub filter: CollisionFilter,
    /// Opaque classification for gameplay code.
    pub tag: u32,
}

impl Collider {
    pub(crate) fn builder_for(owner: BodyToken) -> ColliderBuilder {
        ColliderBuilder::new(owner)
    }

    pub(crate) fn owner_token(&self) -> BodyToken {
        self.owner
    }

    pub(crate) fn rebind(&mut self, owner: BodyToken) {
        self.owner = owner;
    }

    pub(crate) fn set_slot(&mut self, slot: Option<ColliderSlot>) {
        self.slot = slot;
    }

    /// Slot within the owning body; `None` while detached.
    pub fn slot(&self) -> Option<ColliderSlot> {
        self.slot
    }

    pub fn local_rect(&self) -> Aabb {
        self.shape.local_bounds()
    }

    pub fn world_rect(&self, body_position: Vec2) -> Aabb {
        self.local_rect().translated(body_position)
    }

    /// True when this collider takes part in solid resolution.
    pub fn is_solid(&self) -> bool {
        self.is_enabled && !self.is_sensor
    }
}

/// Value snapshot of one collider placed in world space, handed to providers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderView {
    pub key: ColliderKey,
    pub kind: ColliderKind,
    pub rect: Aabb,
    pub is_sensor: bool,
    pub filter: CollisionFilter,
    pub tag: u32,
}

impl ColliderView {
    pub fn new(body: BodyId, collider: &Collider, slot: ColliderSlot, body_position: Vec2) -> Self {
        Self {
            key: ColliderKey { body, slot },
            kind: collider.kind,
            rect: collider.world_rect(body_position),
            is_sensor: collider.is_sensor,
            filter: collider.filter,
            tag: collider.tag,
        }
    }
}

/// Fluent collider configuration, bound to one body from the start.
pub struct ColliderBuilder {
    owner: BodyToken,
    shape: ColliderShape,
    kind: ColliderKind,
    is_enabled: bool,
    is_sensor: bool,
    filter: CollisionFilter,
    tag: u32,
}

impl ColliderBuilder {
    fn new(owner: BodyToken) -> Self {
        Self {
            owner,
            shape: ColliderShape::Rect {
                offset: Vec2::ZERO,
                size: Vec2::ONE,
            },
            kind: ColliderKind::RECT,
            is_enabled: true,
            is_sensor: false,
            filter: CollisionFilter::default(),
            tag: 0,
        }
    }

    pub fn rect(mut self, offset: Vec2, size: Vec2) -> Self {
        self.shape = ColliderShape::Rect {
            offset,
            size: size.abs(),
        };
        self
    }

    pub fn kind(mut self, kind: ColliderKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.is_enabled = enabled;
        self
    }

    pub fn sensor(mut self, is_sensor: bool) -> Self {
        self.is_sensor = is_sensor;
        self
    }

    pub fn filter(mut self, layer: u32, mask: u32) -> Self {
        self.filter = CollisionFilter { layer, mask };
        self
    }

    pub fn tag(mut self, tag: u32) -> Self {
        self.tag = tag;
        self
    }

    pub fn build(self) -> Collider {
        Collider {
            owner: self.owner,
            slot: None,
            shape: self.shape,
            kind: self.kind,
            is_enabled: self.is_enabled,
            is_sensor: self.is_sensor,
            filter: self.filter,
            tag: self.tag,
        }
    }
}
