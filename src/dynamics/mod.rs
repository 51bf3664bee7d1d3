//! Simulation dynamics: integration, resolution policies, and impulse response.

pub mod impulse;
pub mod integrator;
pub mod policy;

pub use impulse::{resolve_velocity, ImpulseResult};
pub use integrator::Integrator;
pub use policy::{MassWeightedPolicy, ResolutionPolicy};
