use glam::Vec2;

use crate::{
    core::{body::Body, types::BodyKind},
    utils::math::clamp_speed,
};

/// Integrator responsible for stepping bodies forward in time.
#[derive(Debug, Clone)]
pub struct Integrator {
    pub gravity: Vec2,
}

impl Integrator {
    pub fn new(gravity: Vec2) -> Self {
        Self { gravity }
    }

    pub fn integrate_velocity(&self, body: &mut Body, dt: f32) {
        if body.kind != BodyKind::Dynamic {
            return;
        }

        body.velocity += self.gravity * body.gravity_scale * dt;
        if body.linear_damping > 0.0 {
            body.velocity /= 1.0 + body.linear_damping * dt;
        }
        body.velocity = clamp_speed(body.velocity, body.max_speed);
    }

    pub fn integrate_position(&self, body: &mut Body, dt: f32) {
        if body.kind == BodyKind::Static {
            return;
        }
        let velocity = clamp_speed(body.velocity, body.max_speed);
        if velocity != Vec2::ZERO {
            body.translate(velocity * dt);
        }
    }

    /// Advances one body. Disabled and sleeping bodies are skipped.
    pub fn step(&self, body: &mut Body, dt: f32) {
        if !body.is_enabled || body.is_sleeping() {
            return;
        }
        self.integrate_velocity(body, dt);
        self.integrate_position(body, dt);
    }
}
