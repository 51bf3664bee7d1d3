use approx::assert_relative_eq;
use arcade_physics::*;
use std::sync::{Arc, Mutex};

fn boxed(kind: BodyKind, x: f32, y: f32, size: f32) -> BodyBuilder {
    Body::builder(kind)
        .position(Vec2::new(x, y))
        .rect(Vec2::ZERO, Vec2::splat(size))
}

fn view(body: &Body, raw: u64) -> ColliderView {
    body.collider_views_at(BodyId::from_raw(raw), body.position())
        .next()
        .expect("body has a collider")
}

#[test]
fn mass_weighted_split_moves_the_heavier_body_less() {
    let registry = ProviderRegistry::with_defaults();
    let mut light = boxed(BodyKind::Dynamic, 0.0, 0.0, 10.0).mass(1.0).build();
    let mut heavy = boxed(BodyKind::Dynamic, 6.0, 0.0, 10.0).mass(3.0).build();

    let (view_light, view_heavy) = (view(&light, 0), view(&heavy, 1));
    let manifold = registry
        .test(&view_light, &view_heavy)
        .expect("overlapping rects");
    assert_eq!(manifold.normal, Vec2::X);
    assert_relative_eq!(manifold.penetration, 4.0);

    let solid = registry.solve(
        Operand::new(&mut light, view_light),
        Operand::new(&mut heavy, view_heavy),
        &manifold,
        &MassWeightedPolicy,
    );
    assert_eq!(solid, Some(true));

    let light_shift = light.position().x;
    let heavy_shift = heavy.position().x - 6.0;
    assert_relative_eq!(light_shift, -3.0, epsilon = 1e-5);
    assert_relative_eq!(heavy_shift, 1.0, epsilon = 1e-5);
}

#[test]
fn no_penetration_persists_after_one_solve() {
    let registry = ProviderRegistry::with_defaults();
    let mut a = boxed(BodyKind::Dynamic, 0.0, 0.0, 8.0).mass(2.0).build();
    let mut b = boxed(BodyKind::Dynamic, 3.0, 5.0, 8.0).mass(5.0).build();

    let (view_a, view_b) = (view(&a, 0), view(&b, 1));
    let manifold = registry.test(&view_a, &view_b).expect("overlapping");
    registry.solve(
        Operand::new(&mut a, view_a),
        Operand::new(&mut b, view_b),
        &manifold,
        &MassWeightedPolicy,
    );

    let depth = registry
        .test(&view(&a, 0), &view(&b, 1))
        .map_or(0.0, |m| m.penetration);
    assert!(depth <= 1e-4, "residual penetration {depth}");
}

#[test]
fn partially_contained_rects_separate_in_one_solve() {
    let registry = ProviderRegistry::with_defaults();
    let mut outer = boxed(BodyKind::Dynamic, 0.0, 0.0, 10.0).build();
    let mut inner = Body::builder(BodyKind::Dynamic)
        .position(Vec2::new(2.0, 3.0))
        .rect(Vec2::ZERO, Vec2::new(2.0, 4.0))
        .build();

    let (view_outer, view_inner) = (view(&outer, 0), view(&inner, 1));
    let manifold = registry.test(&view_outer, &view_inner).expect("contained");
    assert_eq!(manifold.normal, -Vec2::X);
    assert_relative_eq!(manifold.penetration, 4.0);

    registry.solve(
        Operand::new(&mut outer, view_outer),
        Operand::new(&mut inner, view_inner),
        &manifold,
        &MassWeightedPolicy,
    );

    assert_relative_eq!(outer.position().x, 2.0, epsilon = 1e-5);
    assert_relative_eq!(inner.position().x, 0.0, epsilon = 1e-5);
    assert!(registry.test(&view(&outer, 0), &view(&inner, 1)).is_none());
}

#[test]
fn immovable_pairs_are_left_alone() {
    let registry = ProviderRegistry::with_defaults();
    let mut a = boxed(BodyKind::Static, 0.0, 0.0, 10.0).build();
    let mut b = boxed(BodyKind::Static, 5.0, 5.0, 10.0)
        .velocity(Vec2::new(1.0, 2.0))
        .build();

    let (view_a, view_b) = (view(&a, 0), view(&b, 1));
    let manifold = registry.test(&view_a, &view_b).expect("overlapping");
    registry.solve(
        Operand::new(&mut a, view_a),
        Operand::new(&mut b, view_b),
        &manifold,
        &MassWeightedPolicy,
    );

    assert_eq!(a.position(), Vec2::ZERO);
    assert_eq!(b.position(), Vec2::new(5.0, 5.0));
    assert_eq!(a.velocity, Vec2::ZERO);
    assert_eq!(b.velocity, Vec2::new(1.0, 2.0));
}

#[test]
fn restitution_bounds_the_rebound() {
    let registry = ProviderRegistry::with_defaults();

    for (restitution, expected) in [(0.0, 0.0), (1.0, -5.0)] {
        let mut ball = boxed(BodyKind::Dynamic, 0.0, 0.0, 10.0)
            .velocity(Vec2::new(5.0, 0.0))
            .restitution(restitution)
            .build();
        let mut wall = boxed(BodyKind::Static, 8.0, -20.0, 50.0).build();

        let (view_ball, view_wall) = (view(&ball, 0), view(&wall, 1));
        let manifold = registry.test(&view_ball, &view_wall).expect("overlapping");
        assert_eq!(manifold.normal, Vec2::X);
        registry.solve(
            Operand::new(&mut ball, view_ball),
            Operand::new(&mut wall, view_wall),
            &manifold,
            &MassWeightedPolicy,
        );

        assert!(ball.velocity.x <= 0.0);
        assert_relative_eq!(ball.velocity.x, expected, epsilon = 1e-5);
        assert_eq!(wall.velocity, Vec2::ZERO);
        assert_relative_eq!(ball.position().x, -2.0, epsilon = 1e-5);
    }
}

#[test]
fn friction_slows_sliding_contacts() {
    let mut world = World::new();
    world.register(
        boxed(BodyKind::Static, 0.0, 0.0, 100.0)
            .friction(1.0)
            .build(),
    );
    let slider = world.register(
        boxed(BodyKind::Dynamic, 10.0, 99.0, 10.0)
            .velocity(Vec2::new(4.0, -2.0))
            .friction(1.0)
            .build(),
    );

    world.resolve_contacts();
    let body = world.body(slider).expect("registered");
    assert_relative_eq!(body.position().y, 100.0, epsilon = 1e-5);
    assert_relative_eq!(body.velocity.y, 0.0, epsilon = 1e-5);
    assert!(body.velocity.x < 4.0 && body.velocity.x >= 0.0);
}

const ONE_WAY: ColliderKind = ColliderKind::custom(7);

/// Lets bodies jump up through the platform and land on it from above.
struct OneWay;

impl RectHooks for OneWay {
    fn allow(&self, _platform: &Operand<'_>, other: &Operand<'_>, _manifold: &ContactManifold) -> bool {
        other.body.velocity.y <= 0.0
    }
}

fn one_way_world() -> (World, BodyId) {
    let mut registry = ProviderRegistry::with_defaults();
    registry
        .register(ONE_WAY, ColliderKind::RECT, RectProvider::with_hooks(OneWay))
        .expect("first registration");
    let mut world = World::builder()
        .provider_registry(registry)
        .build()
        .expect("valid settings");
    let platform = world.register(
        Body::builder(BodyKind::Static)
            .collider(|c| c.rect(Vec2::ZERO, Vec2::new(50.0, 4.0)).kind(ONE_WAY))
            .build(),
    );
    (world, platform)
}

#[test]
fn one_way_platform_lets_rising_bodies_through() {
    let (mut world, _platform) = one_way_world();
    let jumper = world.register(
        boxed(BodyKind::Dynamic, 10.0, 2.0, 10.0)
            .velocity(Vec2::new(0.0, 5.0))
            .build(),
    );

    world.resolve_contacts();
    let body = world.body(jumper).expect("registered");
    assert_eq!(body.position(), Vec2::new(10.0, 2.0));
    assert_eq!(body.velocity, Vec2::new(0.0, 5.0));
    assert!(world.events().is_empty());
}

#[test]
fn one_way_platform_catches_falling_bodies() {
    let (mut world, platform) = one_way_world();
    let faller = world.register(
        boxed(BodyKind::Dynamic, 10.0, 2.0, 10.0)
            .velocity(Vec2::new(0.0, -5.0))
            .build(),
    );

    world.resolve_contacts();
    let body = world.body(faller).expect("registered");
    assert_eq!(body.position(), Vec2::new(10.0, 4.0));
    assert_relative_eq!(body.velocity.y, 0.0);

    let events = world.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].phase(), ContactPhase::Enter);
    assert!(events[0].pair().involves_body(platform));
}

#[test]
fn unregistered_kind_pairs_never_collide() {
    let mut world = World::new();
    let ghost_kind = ColliderKind::custom(42);
    let ghost = world.register(
        Body::builder(BodyKind::Dynamic)
            .collider(|c| c.rect(Vec2::ZERO, Vec2::splat(10.0)).kind(ghost_kind))
            .build(),
    );
    world.register(boxed(BodyKind::Static, 2.0, 2.0, 10.0).build());

    world.resolve_contacts();
    assert_eq!(world.body(ghost).map(Body::position), Some(Vec2::ZERO));
    assert!(world.events().is_empty());
}

const GATE: ColliderKind = ColliderKind::custom(9);

/// Records the first operand's kind and the normal each resolved contact was handed.
#[derive(Clone, Default)]
struct SeenByGate(Arc<Mutex<Vec<(ColliderKind, Vec2)>>>);

impl RectHooks for SeenByGate {
    fn resolved(&self, gate: &mut Operand<'_>, _other: &mut Operand<'_>, manifold: &ContactManifold) {
        self.0.lock().unwrap().push((gate.collider.kind, manifold.normal));
    }
}

#[test]
fn providers_see_operands_in_their_declared_order() {
    let seen = SeenByGate::default();
    let mut registry = ProviderRegistry::with_defaults();
    registry
        .register(GATE, ColliderKind::RECT, RectProvider::with_hooks(seen.clone()))
        .expect("first registration");
    let mut world = World::builder()
        .provider_registry(registry)
        .build()
        .expect("valid settings");

    // The rect body gets the lower id, so the pair arrives as (RECT, GATE).
    let mover = world.register(boxed(BodyKind::Dynamic, 0.0, 0.0, 10.0).build());
    let gate = world.register(
        Body::builder(BodyKind::Static)
            .position(Vec2::new(8.0, 0.0))
            .collider(|c| c.rect(Vec2::ZERO, Vec2::splat(10.0)).kind(GATE))
            .build(),
    );
    assert!(mover < gate);

    let view_mover = view(world.body(mover).expect("registered"), mover.index());
    let view_gate = view(world.body(gate).expect("registered"), gate.index());
    let manifold = world
        .providers()
        .test(&view_mover, &view_gate)
        .expect("overlapping");
    assert_eq!(manifold.normal, Vec2::X);
    assert_relative_eq!(manifold.penetration, 2.0);

    world.resolve_contacts();

    assert_eq!(*seen.0.lock().unwrap(), vec![(GATE, -Vec2::X)]);
    assert_eq!(world.body(mover).map(Body::position), Some(Vec2::new(-2.0, 0.0)));
    assert_eq!(world.body(gate).map(Body::position), Some(Vec2::new(8.0, 0.0)));
}
