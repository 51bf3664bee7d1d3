use arcade_physics::*;

const TILE: f32 = 16.0;

const MAZE: [&str; 5] = [
    "#######",
    "#.....#",
    "#.###.#",
    "#.....#",
    "#######",
];

fn main() -> Result<()> {
    let mut world = World::builder()
        .settings(WorldSettings::default().with_cell_size(TILE * 2.0))
        .build()?;

    for (row, line) in MAZE.iter().enumerate() {
        for (col, cell) in line.chars().enumerate() {
            if cell == '#' {
                world.register(
                    Body::builder(BodyKind::Static)
                        .position(Vec2::new(col as f32 * TILE, row as f32 * TILE))
                        .rect(Vec2::ZERO, Vec2::splat(TILE))
                        .build(),
                );
            }
        }
    }

    let walker = world.register(
        Body::builder(BodyKind::Kinematic)
            .position(Vec2::splat(TILE))
            .rect(Vec2::ZERO, Vec2::splat(TILE))
            .build(),
    );

    let mover = GridMover::new(TILE / 4.0, u32::MAX);
    let route = [
        (Vec2::new(64.0, 0.0), 20),
        (Vec2::new(0.0, 64.0), 10),
        (Vec2::new(-64.0, 0.0), 20),
    ];
    for (heading, frames) in route {
        let mut blocked = 0;
        for _ in 0..frames {
            if !mover.step(&mut world, walker, heading, 1.0 / 60.0)?.moved() {
                blocked += 1;
            }
        }
        let position = world.body(walker).map(Body::position).unwrap_or_default();
        println!("heading {heading}: now at {position}, blocked {blocked} frames");
    }
    Ok(())
}
