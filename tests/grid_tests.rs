use arcade_physics::*;

fn populated_grid() -> (SpatialGrid<u32>, Vec<(u32, Aabb)>) {
    let grid = SpatialGrid::new(32.0);
    let mut items = Vec::new();
    for row in 0..8 {
        for col in 0..8 {
            let id = row * 8 + col;
            let bounds = Aabb::from_position_size(
                Vec2::new(col as f32 * 24.0, row as f32 * 24.0),
                Vec2::splat(12.0),
            );
            grid.add(id, bounds);
            items.push((id, bounds));
        }
    }
    (grid, items)
}

fn brute_force(items: &[(u32, Aabb)], rect: &Aabb) -> Vec<u32> {
    let mut hits: Vec<u32> = items
        .iter()
        .filter(|(_, bounds)| bounds.intersects(rect))
        .map(|(id, _)| *id)
        .collect();
    hits.sort_unstable();
    hits
}

fn sorted(mut ids: Vec<u32>) -> Vec<u32> {
    ids.sort_unstable();
    ids
}

#[test]
fn rect_queries_match_brute_force() {
    let (grid, items) = populated_grid();
    let rects = [
        // Inside one cell.
        Aabb::from_position_size(Vec2::new(2.0, 2.0), Vec2::splat(20.0)),
        // Spans several cells.
        Aabb::from_position_size(Vec2::new(30.0, 40.0), Vec2::new(70.0, 45.0)),
        // Touches item edges only.
        Aabb::from_position_size(Vec2::new(12.0, 0.0), Vec2::new(12.0, 12.0)),
        // Everything.
        Aabb::from_position_size(Vec2::splat(-1000.0), Vec2::splat(4000.0)),
        // Nothing.
        Aabb::from_position_size(Vec2::splat(5000.0), Vec2::splat(10.0)),
    ];

    let mut scratch = QueryScratch::new();
    for rect in &rects {
        let found = sorted(grid.query_rect(rect, &mut scratch).to_vec());
        assert_eq!(found, brute_force(&items, rect), "query {rect:?}");
    }
    assert_eq!(grid.len(), items.len());
}

#[test]
fn items_spanning_cells_are_reported_once() {
    let grid = SpatialGrid::new(16.0);
    grid.add(1u32, Aabb::from_position_size(Vec2::ZERO, Vec2::splat(100.0)));

    let found = grid.query_rect_vec(&Aabb::from_position_size(
        Vec2::splat(10.0),
        Vec2::splat(60.0),
    ));
    assert_eq!(found, vec![1]);
}

#[test]
fn moved_items_leave_their_old_cells() {
    let (grid, _) = populated_grid();
    let moved = Aabb::from_position_size(Vec2::new(500.0, 500.0), Vec2::splat(12.0));
    assert!(grid.update(0, moved));
    assert!(!grid.update(0, moved));

    let old = Aabb::from_position_size(Vec2::ZERO, Vec2::splat(12.0));
    assert!(!grid.query_rect_vec(&old).contains(&0));
    assert_eq!(grid.query_rect_vec(&moved), vec![0]);
    assert_eq!(grid.bounds_of(0), Some(moved));
}

#[test]
fn removal_is_idempotent() {
    let (grid, items) = populated_grid();
    assert!(grid.remove(9).is_some());
    assert!(grid.remove(9).is_none());
    assert!(!grid.contains(9));
    assert_eq!(grid.len(), items.len() - 1);

    grid.clear();
    assert!(grid.is_empty());
    assert_eq!(grid.occupied_cells(), 0);
}

#[test]
fn point_queries_return_the_whole_cell() {
    let grid = SpatialGrid::new(32.0);
    grid.add(1u32, Aabb::from_position_size(Vec2::new(0.0, 0.0), Vec2::splat(4.0)));
    grid.add(2u32, Aabb::from_position_size(Vec2::new(20.0, 20.0), Vec2::splat(4.0)));
    grid.add(3u32, Aabb::from_position_size(Vec2::new(40.0, 0.0), Vec2::splat(4.0)));

    let mut scratch = QueryScratch::new();
    let found = sorted(grid.query_point(Vec2::new(10.0, 10.0), &mut scratch).to_vec());
    assert_eq!(found, vec![1, 2]);
    assert_eq!(grid.query_point(Vec2::new(-5.0, 0.0), &mut scratch), &[] as &[u32]);
}

#[test]
fn oversized_items_are_still_found() {
    let grid = SpatialGrid::with_options(1.0, 4, 16);
    let huge = Aabb::from_position_size(Vec2::splat(-500.0), Vec2::splat(1000.0));
    grid.add(7u32, huge);
    grid.add(8u32, Aabb::from_position_size(Vec2::splat(2.0), Vec2::splat(0.5)));

    let found = sorted(grid.query_rect_vec(&Aabb::from_position_size(
        Vec2::splat(1.5),
        Vec2::splat(2.0),
    )));
    assert_eq!(found, vec![7, 8]);

    let mut scratch = QueryScratch::new();
    let found = sorted(grid.query_point(Vec2::new(300.0, -300.0), &mut scratch).to_vec());
    assert_eq!(found, vec![7]);

    assert!(grid.remove(7).is_some());
    assert!(grid.query_rect_vec(&huge).iter().all(|id| *id == 8));
}
