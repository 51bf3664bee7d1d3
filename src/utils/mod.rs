//! Utility helpers: stable-id arena, logging timers, and small math extensions.

pub mod allocator;
pub mod logging;
pub mod math;

pub use allocator::{Arena, BodyId};
pub use math::*;
