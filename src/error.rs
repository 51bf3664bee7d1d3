//! Error types for world and body configuration.

use thiserror::Error;

use crate::core::collider::ColliderKind;
use crate::utils::allocator::BodyId;

/// Configuration errors. These signal a contract violation by the caller and are
/// never retried or recovered internally.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PhysicsError {
    /// The collider was minted for a different body.
    #[error("collider belongs to another body")]
    ColliderOwnedByOtherBody,

    /// Two providers were registered for the same unordered pair of collider kinds.
    #[error("a provider is already registered for ({first}, {second})")]
    DuplicateProvider {
        first: ColliderKind,
        second: ColliderKind,
    },

    /// World settings failed validation.
    #[error("invalid world settings: {0}")]
    InvalidSettings(String),

    /// The body id is not registered with this world.
    #[error("{0} is not registered with this world")]
    UnknownBody(BodyId),
}

pub type Result<T> = std::result::Result<T, PhysicsError>;
