use glam::Vec2;

use crate::{core::body::Body, utils::math::DIRECTION_EPSILON};

/// Impulse magnitudes applied by one call to [`resolve_velocity`].
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ImpulseResult {
    pub normal_impulse: f32,
    pub tangent_impulse: f32,
}

/// Single-pass impulse response for one contact with `normal` pointing from `a` to `b`.
///
/// Uses the larger restitution of the two bodies and the average friction, with the
/// tangential impulse clamped to the Coulomb cone. Separating contacts and pairs of
/// immovable bodies are left alone.
pub fn resolve_velocity(a: &mut Body, b: &mut Body, normal: Vec2) -> ImpulseResult {
    let inv_a = a.inverse_mass();
    let inv_b = b.inverse_mass();
    let inv_sum = inv_a + inv_b;
    if inv_sum <= 0.0 {
        return ImpulseResult::default();
    }

    let relative = b.velocity - a.velocity;
    let along_normal = relative.dot(normal);
    if along_normal >= 0.0 {
        return ImpulseResult::default();
    }

    let restitution = a.restitution.max(b.restitution);
    let normal_impulse = -(1.0 + restitution) * along_normal / inv_sum;
    a.apply_impulse(-normal * normal_impulse);
    b.apply_impulse(normal * normal_impulse);

    let relative = b.velocity - a.velocity;
    let tangent = relative - normal * relative.dot(normal);
    let tangent_speed = tangent.length();
    if tangent_speed <= DIRECTION_EPSILON {
        return ImpulseResult {
            normal_impulse,
            tangent_impulse: 0.0,
        };
    }

    let direction = tangent / tangent_speed;
    let friction = 0.5 * (a.friction + b.friction);
    let limit = friction * normal_impulse;
    let tangent_impulse = (-relative.dot(direction) / inv_sum).clamp(-limit, limit);
    a.apply_impulse(-direction * tangent_impulse);
    b.apply_impulse(direction * tangent_impulse);

    ImpulseResult {
        normal_impulse,
        tangent_impulse,
    }
}
