use std::any::Any;
use std::hash::{Hash, Hasher};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{
    core::{body::OwnerRef, collider::ColliderKey, types::Aabb},
    utils::allocator::BodyId,
};

/// Result of one narrow-phase test. Not cached across steps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContactManifold {
    /// Unit vector from the first operand toward the second along the resolution axis.
    pub normal: Vec2,
    /// Non-negative overlap along `normal`.
    pub penetration: f32,
    /// Intersection of the two world rectangles.
    pub overlap: Aabb,
}

impl ContactManifold {
    /// The same contact seen from the second operand.
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            ..*self
        }
    }
}

/// Enter/Stay/Exit transition of a tracked pair between steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContactPhase {
    Enter,
    Stay,
    Exit,
}

/// Canonically ordered pair of colliders, used to track contacts between steps.
///
/// Equality and hashing only look at the collider keys; the owner handles ride
/// along for event receivers.
#[derive(Debug, Clone)]
pub struct ContactPair {
    first: ColliderKey,
    second: ColliderKey,
    owners: [Option<OwnerRef>; 2],
}

impl ContactPair {
    /// Orders the operands by body stable index, then by collider slot.
    pub fn new(
        a: ColliderKey,
        owner_a: Option<OwnerRef>,
        b: ColliderKey,
        owner_b: Option<OwnerRef>,
    ) -> Self {
        if b < a {
            Self {
                first: b,
                second: a,
                owners: [owner_b, owner_a],
            }
        } else {
            Self {
                first: a,
                second: b,
                owners: [owner_a, owner_b],
            }
        }
    }

    pub fn first(&self) -> ColliderKey {
        self.first
    }

    pub fn second(&self) -> ColliderKey {
        self.second
    }

    pub fn bodies(&self) -> (BodyId, BodyId) {
        (self.first.body, self.second.body)
    }

    pub fn involves_body(&self, body: BodyId) -> bool {
        self.first.body == body || self.second.body == body
    }

    pub fn involves_owner(&self, owner: &OwnerRef) -> bool {
        self.owners
            .iter()
            .flatten()
            .any(|candidate| candidate.ptr_eq(owner))
    }

    /// The collider on the other side of `key`, if `key` is part of this pair.
    pub fn other(&self, key: ColliderKey) -> Option<ColliderKey> {
        if key == self.first {
            Some(self.second)
        } else if key == self.second {
            Some(self.first)
        } else {
            None
        }
    }

    /// First owner (in pair order) whose concrete type is `T`.
    pub fn owner_of<T: Any>(&self) -> Option<&T> {
        self.owners
            .iter()
            .flatten()
            .find_map(|owner| owner.downcast_ref::<T>())
    }

    pub fn owners(&self) -> (Option<&OwnerRef>, Option<&OwnerRef>) {
        (self.owners[0].as_ref(), self.owners[1].as_ref())
    }
}

impl PartialEq for ContactPair {
    fn eq(&self, other: &Self) -> bool {
        self.first == other.first && self.second == other.second
    }
}

impl Eq for ContactPair {}

impl Hash for ContactPair {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.first.hash(state);
        self.second.hash(state);
    }
}
