use crate::core::body::Body;

/// Decides how much of a penetration correction each body of a contact receives.
pub trait ResolutionPolicy: Send + Sync {
    /// Fractions `(push_a, push_b)`; immovable bodies must get zero.
    fn split(&self, a: &Body, b: &Body) -> (f32, f32);
}

/// Splits corrections by inverse mass: heavier bodies move less, immovable bodies
/// never move, and a single movable body takes the whole correction.
#[derive(Debug, Default, Clone, Copy)]
pub struct MassWeightedPolicy;

impl ResolutionPolicy for MassWeightedPolicy {
    fn split(&self, a: &Body, b: &Body) -> (f32, f32) {
        let inv_a = a.inverse_mass();
        let inv_b = b.inverse_mass();
        let total = inv_a + inv_b;
        if total <= 0.0 {
            return (0.0, 0.0);
        }
        (inv_a / total, inv_b / total)
    }
}
