//! Additional math helpers layered on top of `glam`.

use glam::Vec2;

/// Tolerance used when comparing directions and tangential speeds.
pub const DIRECTION_EPSILON: f32 = 1e-5;

/// Rounds each component of `value` to the nearest multiple of `ratio`.
///
/// A non-positive or non-finite ratio leaves the value untouched.
pub fn round_to_multiple(value: Vec2, ratio: f32) -> Vec2 {
    if !(ratio > 0.0) || !ratio.is_finite() {
        return value;
    }
    (value / ratio).round() * ratio
}

/// Returns true when both vectors point the same way (zero only matches zero).
pub fn same_direction(a: Vec2, b: Vec2) -> bool {
    let a = a.normalize_or_zero();
    let b = b.normalize_or_zero();
    (a - b).length_squared() <= DIRECTION_EPSILON * DIRECTION_EPSILON
}

/// Clamps the length of `velocity` to `max_speed`; zero means unbounded.
pub fn clamp_speed(velocity: Vec2, max_speed: f32) -> Vec2 {
    if max_speed <= 0.0 {
        return velocity;
    }
    velocity.clamp_length_max(max_speed)
}
