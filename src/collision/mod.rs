//! Collision detection modules: spatial grid, contact types, provider registry, rect narrow phase.

pub mod contact;
pub mod grid;
pub mod provider;
pub mod rect;

pub use contact::{ContactManifold, ContactPair, ContactPhase};
pub use grid::{CellRange, QueryScratch, SpatialGrid};
pub use provider::{ContactProvider, Operand, ProviderRegistry};
pub use rect::{rect_contact, RectHooks, RectProvider, SolidHooks};
