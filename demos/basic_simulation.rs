use arcade_physics::*;

struct Announcer;

impl EventReceiver for Announcer {
    fn on_contact(&mut self, phase: ContactPhase, pair: &ContactPair, manifold: &ContactManifold) {
        println!(
            "{phase:?}: {} <-> {} (depth {:.3})",
            pair.first().body,
            pair.second().body,
            manifold.penetration
        );
    }
}

fn main() -> Result<()> {
    let mut world = World::builder()
        .settings(WorldSettings::default().with_gravity(Vec2::new(0.0, -300.0)))
        .build()?;

    world.register(
        Body::builder(BodyKind::Static)
            .rect(Vec2::ZERO, Vec2::new(320.0, 16.0))
            .build(),
    );

    let crate_id = world.register(
        Body::builder(BodyKind::Dynamic)
            .position(Vec2::new(40.0, 80.0))
            .mass(2.0)
            .restitution(0.3)
            .rect(Vec2::ZERO, Vec2::splat(16.0))
            .build(),
    );
    world.add_event_receiver(crate_id, Announcer)?;

    for frame in 0..120 {
        world.step(1.0 / 60.0);
        if frame % 20 == 0 {
            if let Some(body) = world.body(crate_id) {
                println!("frame {frame}: position {}", body.position());
            }
        }
    }
    Ok(())
}
