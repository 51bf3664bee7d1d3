//! Core types describing bodies, colliders, and shared geometry.

pub mod body;
pub mod collider;
pub mod layers;
pub mod types;

pub use body::{Body, BodyBuilder, OwnerRef};
pub use collider::{
    Collider, ColliderBuilder, ColliderKey, ColliderKind, ColliderShape, ColliderSlot,
    ColliderView, CollisionFilter,
};
pub use layers::{layer_bit, mask_includes, mask_of, LayerCategory};
pub use types::{Aabb, BodyKind};
