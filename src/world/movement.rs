//! Tile-aligned movement for characters that walk on a grid.

use crate::{
    core::types::Vec2,
    error::{PhysicsError, Result},
    utils::{allocator::BodyId, math::{round_to_multiple, same_direction}},
};

use super::World;

/// What a [`GridMover`] did with one movement request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveOutcome {
    Moved { from: Vec2, to: Vec2 },
    /// The tentative position overlapped `contacts` solid colliders; nothing changed.
    Blocked { contacts: usize },
}

impl MoveOutcome {
    pub fn moved(&self) -> bool {
        matches!(self, MoveOutcome::Moved { .. })
    }
}

/// Moves bodies only to positions that are free of solid contacts, snapping to
/// multiples of `rounding` whenever the direction of travel changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMover {
    /// Snap unit for direction changes; zero or negative disables snapping.
    pub rounding: f32,
    /// Layers that block movement.
    pub mask: u32,
}

impl Default for GridMover {
    fn default() -> Self {
        Self {
            rounding: 1.0,
            mask: u32::MAX,
        }
    }
}

impl GridMover {
    pub fn new(rounding: f32, mask: u32) -> Self {
        Self { rounding, mask }
    }

    /// Tries to move `id` by `desired * dt`.
    ///
    /// When `desired` points elsewhere than the body's current velocity the start
    /// position is rounded first, which keeps walkers aligned to corridors. A
    /// blocked move leaves position and velocity untouched. A free move commits the
    /// new position and, unless `desired` is zero, stores it as the velocity.
    pub fn step(&self, world: &mut World, id: BodyId, desired: Vec2, dt: f32) -> Result<MoveOutcome> {
        let body = world.body(id).ok_or(PhysicsError::UnknownBody(id))?;
        let from = body.position();

        let origin = if same_direction(desired, body.velocity) {
            from
        } else {
            round_to_multiple(from, self.rounding)
        };
        let to = origin + desired * dt;

        let contacts = world.query_contacts(id, to, self.mask).count();
        if contacts > 0 {
            return Ok(MoveOutcome::Blocked { contacts });
        }

        let mut body = world.body_mut(id).ok_or(PhysicsError::UnknownBody(id))?;
        body.set_position(to);
        if desired != Vec2::ZERO {
            body.velocity = desired;
        }
        Ok(MoveOutcome::Moved { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{body::Body, types::BodyKind};
    use approx::assert_relative_eq;

    fn walker(world: &mut World, x: f32, y: f32) -> BodyId {
        world.register(
            Body::builder(BodyKind::Kinematic)
                .position(Vec2::new(x, y))
                .rect(Vec2::ZERO, Vec2::splat(16.0))
                .build(),
        )
    }

    fn wall(world: &mut World, x: f32, y: f32) -> BodyId {
        world.register(
            Body::builder(BodyKind::Static)
                .position(Vec2::new(x, y))
                .rect(Vec2::ZERO, Vec2::splat(16.0))
                .build(),
        )
    }

    #[test]
    fn turning_snaps_to_the_rounding_unit() {
        let mut world = World::new();
        let id = walker(&mut world, 10.4, 20.0);
        let mover = GridMover::new(1.0, u32::MAX);

        let outcome = mover
            .step(&mut world, id, Vec2::new(0.0, 2.0), 1.0)
            .expect("registered");
        assert_eq!(
            outcome,
            MoveOutcome::Moved {
                from: Vec2::new(10.4, 20.0),
                to: Vec2::new(10.0, 22.0),
            }
        );
        assert_eq!(world.body(id).map(|b| b.velocity), Some(Vec2::new(0.0, 2.0)));

        // Same heading: no rounding.
        world
            .body_mut(id)
            .expect("registered")
            .translate(Vec2::new(0.0, 0.3));
        mover
            .step(&mut world, id, Vec2::new(0.0, 4.0), 0.5)
            .expect("registered");
        let position = world.body(id).map(Body::position).expect("registered");
        assert_relative_eq!(position.y, 24.3, epsilon = 1e-4);
    }

    #[test]
    fn blocked_moves_change_nothing() {
        let mut world = World::new();
        let id = walker(&mut world, 0.0, 0.0);
        wall(&mut world, 20.0, 0.0);
        let mover = GridMover::default();

        let outcome = mover
            .step(&mut world, id, Vec2::new(8.0, 0.0), 1.0)
            .expect("registered");
        assert_eq!(outcome, MoveOutcome::Blocked { contacts: 1 });
        let body = world.body(id).expect("registered");
        assert_eq!(body.position(), Vec2::ZERO);
        assert_eq!(body.velocity, Vec2::ZERO);
    }

    #[test]
    fn masked_out_layers_do_not_block() {
        let mut world = World::new();
        let id = walker(&mut world, 0.0, 0.0);
        wall(&mut world, 20.0, 0.0);
        let mover = GridMover::new(1.0, 0b10);

        let outcome = mover
            .step(&mut world, id, Vec2::new(8.0, 0.0), 1.0)
            .expect("registered");
        assert!(outcome.moved());
    }

    #[test]
    fn zero_request_keeps_last_heading() {
        let mut world = World::new();
        let id = walker(&mut world, 3.4, 3.0);
        world.set_velocity(id, Vec2::X).expect("registered");

        let outcome = GridMover::default()
            .step(&mut world, id, Vec2::ZERO, 1.0)
            .expect("registered");
        assert_eq!(
            outcome,
            MoveOutcome::Moved {
                from: Vec2::new(3.4, 3.0),
                to: Vec2::new(3.0, 3.0),
            }
        );
        let body = world.body(id).expect("registered");
        assert_eq!(body.velocity, Vec2::X);
        assert_eq!(body.position(), Vec2::new(3.0, 3.0));
    }

    #[test]
    fn unknown_bodies_are_an_error() {
        let mut world = World::new();
        let id = walker(&mut world, 0.0, 0.0);
        world.unregister(id);
        assert_eq!(
            GridMover::default().step(&mut world, id, Vec2::X, 1.0),
            Err(PhysicsError::UnknownBody(id))
        );
    }
}
