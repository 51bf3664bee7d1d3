//! Arcade Physics – 2D rigid-body collision for tile and arcade games.
//!
//! Bodies carry axis-aligned rectangle colliders and live in a [`World`], which
//! buckets them in a sharded [`SpatialGrid`], runs narrow-phase tests through a
//! [`ProviderRegistry`] keyed by collider kind, and separates overlapping bodies
//! with a pluggable [`ResolutionPolicy`].
//!
//! ```
//! use arcade_physics::{Body, BodyKind, Vec2, World};
//!
//! let mut world = World::new();
//! let floor = world.register(
//!     Body::builder(BodyKind::Static)
//!         .position(Vec2::new(0.0, 0.0))
//!         .rect(Vec2::ZERO, Vec2::new(100.0, 10.0))
//!         .build(),
//! );
//! let crate_id = world.register(
//!     Body::builder(BodyKind::Dynamic)
//!         .position(Vec2::new(10.0, 8.0))
//!         .rect(Vec2::ZERO, Vec2::splat(10.0))
//!         .build(),
//! );
//!
//! world.resolve_contacts();
//! assert_eq!(world.body(crate_id).map(|b| b.position().y), Some(10.0));
//! assert!(world.contains(floor));
//! ```

pub mod collision;
pub mod config;
pub mod core;
pub mod dynamics;
pub mod error;
pub mod utils;
pub mod world;

pub use glam::Vec2;

pub use collision::{
    contact::{ContactManifold, ContactPair, ContactPhase},
    grid::{QueryScratch, SpatialGrid},
    provider::{ContactProvider, Operand, ProviderRegistry},
    rect::{rect_contact, RectHooks, RectProvider, SolidHooks},
};
pub use config::WorldSettings;
pub use core::{
    body::{Body, BodyBuilder, OwnerRef},
    collider::{
        Collider, ColliderBuilder, ColliderKey, ColliderKind, ColliderShape, ColliderSlot,
        ColliderView, CollisionFilter,
    },
    layers::{layer_bit, mask_includes, mask_of, LayerCategory},
    types::{Aabb, BodyKind},
};
pub use dynamics::{
    integrator::Integrator,
    policy::{MassWeightedPolicy, ResolutionPolicy},
};
pub use error::{PhysicsError, Result};
pub use utils::allocator::BodyId;
pub use world::{
    BodyMut, ContactEvent, EventReceiver, GridMover, MoveOutcome, QueryContact, World,
    WorldBuilder,
};
