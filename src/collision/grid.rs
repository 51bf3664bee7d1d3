use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};

use glam::Vec2;
use log::warn;
use parking_lot::RwLock;

use crate::{
    config::{DEFAULT_GRID_SHARDS, DEFAULT_MAX_CELLS_PER_ITEM},
    core::types::Aabb,
};

type CellKey = (i32, i32);

#[derive(Debug, Clone, Copy)]
struct Entry<T> {
    item: T,
    bounds: Aabb,
}

/// Inclusive range of cells covered by a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub min: CellKey,
    pub max: CellKey,
}

impl CellRange {
    /// Number of cells in the range, saturating instead of overflowing.
    pub fn cell_count(&self) -> u64 {
        let width = (self.max.0 as i64 - self.min.0 as i64 + 1).max(0) as u64;
        let height = (self.max.1 as i64 - self.min.1 as i64 + 1).max(0) as u64;
        width.saturating_mul(height)
    }

    pub fn contains(&self, cell: CellKey) -> bool {
        (self.min.0..=self.max.0).contains(&cell.0) && (self.min.1..=self.max.1).contains(&cell.1)
    }

    fn cells(&self) -> impl Iterator<Item = CellKey> {
        let (min, max) = (self.min, self.max);
        (min.0..=max.0).flat_map(move |x| (min.1..=max.1).map(move |y| (x, y)))
    }
}

/// Reusable result buffer for grid queries.
///
/// Each thread (or task) keeps its own scratch and hands it to every query. The slice a
/// query returns borrows the scratch, so it cannot outlive the next query on it.
#[derive(Debug)]
pub struct QueryScratch<T> {
    items: Vec<T>,
    seen: HashSet<T>,
}

impl<T> Default for QueryScratch<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
        }
    }
}

impl<T: Copy + Eq + Hash> QueryScratch<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            seen: HashSet::with_capacity(capacity),
        }
    }

    fn clear(&mut self) {
        self.items.clear();
        self.seen.clear();
    }

    fn push(&mut self, item: T) {
        if self.seen.insert(item) {
            self.items.push(item);
        }
    }
}

/// Uniform-cell hash index over axis-aligned boxes.
///
/// An item is stored in every cell its box overlaps, together with the box it was
/// stored under. The cell map and the ledger of recorded boxes are split into shards
/// guarded by `parking_lot` locks, so adds, removals, updates and queries may run from
/// several threads at once. Writers lock the item's ledger shard first and then one cell
/// shard at a time; queries only ever take cell-shard read locks.
pub struct SpatialGrid<T> {
    cell_size: f32,
    inv_cell_size: f32,
    max_cells_per_item: u64,
    shard_mask: usize,
    cells: Box<[RwLock<HashMap<CellKey, Vec<Entry<T>>>>]>,
    ledger: Box<[RwLock<HashMap<T, Aabb>>]>,
    oversized: RwLock<Vec<Entry<T>>>,
    occupied_cells: AtomicUsize,
}

impl<T> SpatialGrid<T>
where
    T: Copy + Eq + Hash + Send + Sync,
{
    pub fn new(cell_size: f32) -> Self {
        Self::with_options(cell_size, DEFAULT_GRID_SHARDS, DEFAULT_MAX_CELLS_PER_ITEM)
    }

    /// `cell_size` must be positive and finite; the shard count is rounded up to a power of two.
    pub fn with_options(cell_size: f32, shards: usize, max_cells_per_item: usize) -> Self {
        debug_assert!(cell_size > 0.0 && cell_size.is_finite());
        let shards = shards.max(1).next_power_of_two();
        Self {
            cell_size,
            inv_cell_size: 1.0 / cell_size,
            max_cells_per_item: max_cells_per_item.max(1) as u64,
            shard_mask: shards - 1,
            cells: (0..shards).map(|_| RwLock::new(HashMap::new())).collect(),
            ledger: (0..shards).map(|_| RwLock::new(HashMap::new())).collect(),
            oversized: RwLock::new(Vec::new()),
            occupied_cells: AtomicUsize::new(0),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn cell_of(&self, point: Vec2) -> CellKey {
        (
            (point.x * self.inv_cell_size).floor() as i32,
            (point.y * self.inv_cell_size).floor() as i32,
        )
    }

    pub fn cell_range(&self, bounds: &Aabb) -> CellRange {
        CellRange {
            min: self.cell_of(bounds.min),
            max: self.cell_of(bounds.max),
        }
    }

    /// Inserts `item` under `bounds`. Adding an item that is already present moves it.
    pub fn add(&self, item: T, bounds: Aabb) {
        let mut ledger = self.ledger_shard(&item).write();
        if let Some(previous) = ledger.insert(item, bounds) {
            self.erase(item, &previous);
        }
        self.insert_cells(item, bounds);
    }

    /// Removes `item` using the box it was recorded under. Unknown items are a no-op.
    pub fn remove(&self, item: T) -> Option<Aabb> {
        let mut ledger = self.ledger_shard(&item).write();
        let previous = ledger.remove(&item)?;
        self.erase(item, &previous);
        Some(previous)
    }

    /// Re-buckets `item` if `bounds` differs from its recorded box. Returns whether
    /// anything changed; unknown items are added.
    pub fn update(&self, item: T, bounds: Aabb) -> bool {
        let mut ledger = self.ledger_shard(&item).write();
        match ledger.get_mut(&item) {
            Some(previous) if *previous == bounds => false,
            Some(previous) => {
                let old = std::mem::replace(previous, bounds);
                self.erase(item, &old);
                self.insert_cells(item, bounds);
                true
            }
            None => {
                ledger.insert(item, bounds);
                self.insert_cells(item, bounds);
                true
            }
        }
    }

    pub fn contains(&self, item: T) -> bool {
        self.ledger_shard(&item).read().contains_key(&item)
    }

    pub fn bounds_of(&self, item: T) -> Option<Aabb> {
        self.ledger_shard(&item).read().get(&item).copied()
    }

    pub fn len(&self) -> usize {
        self.ledger.iter().map(|shard| shard.read().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn occupied_cells(&self) -> usize {
        self.occupied_cells.load(Ordering::Relaxed)
    }

    pub fn clear(&self) {
        for shard in self.ledger.iter() {
            let mut ledger = shard.write();
            for (item, bounds) in ledger.drain() {
                self.erase(item, &bounds);
            }
        }
    }

    /// Items whose recorded box intersects `rect`.
    pub fn query_rect<'s>(&self, rect: &Aabb, scratch: &'s mut QueryScratch<T>) -> &'s [T] {
        scratch.clear();
        let range = self.cell_range(rect);

        if range.cell_count() > self.occupied_cells() as u64 {
            // Cheaper to walk what exists than every cell in a huge range.
            for shard in self.cells.iter() {
                for (cell, bucket) in shard.read().iter() {
                    if range.contains(*cell) {
                        Self::collect_intersecting(bucket, rect, scratch);
                    }
                }
            }
        } else {
            for cell in range.cells() {
                if let Some(bucket) = self.cell_shard(cell).read().get(&cell) {
                    Self::collect_intersecting(bucket, rect, scratch);
                }
            }
        }

        Self::collect_intersecting(&self.oversized.read(), rect, scratch);
        &scratch.items
    }

    /// Items bucketed in the cell containing `point`. Neighbouring cells are not
    /// inspected and entries are not filtered by their exact box, so the cell size
    /// acts as the query tolerance.
    pub fn query_point<'s>(&self, point: Vec2, scratch: &'s mut QueryScratch<T>) -> &'s [T] {
        scratch.clear();
        let cell = self.cell_of(point);

        if let Some(bucket) = self.cell_shard(cell).read().get(&cell) {
            for entry in bucket {
                scratch.push(entry.item);
            }
        }
        for entry in self.oversized.read().iter() {
            if self.cell_range(&entry.bounds).contains(cell) {
                scratch.push(entry.item);
            }
        }
        &scratch.items
    }

    /// Allocating convenience around [`SpatialGrid::query_rect`].
    pub fn query_rect_vec(&self, rect: &Aabb) -> Vec<T> {
        let mut scratch = QueryScratch::new();
        self.query_rect(rect, &mut scratch).to_vec()
    }

    fn collect_intersecting(entries: &[Entry<T>], rect: &Aabb, scratch: &mut QueryScratch<T>) {
        for entry in entries {
            if entry.bounds.intersects(rect) {
                scratch.push(entry.item);
            }
        }
    }

    fn is_oversized(&self, range: &CellRange) -> bool {
        range.cell_count() > self.max_cells_per_item
    }

    fn insert_cells(&self, item: T, bounds: Aabb) {
        let range = self.cell_range(&bounds);
        let entry = Entry { item, bounds };

        if self.is_oversized(&range) {
            warn!(
                "grid item spans {} cells (limit {}); keeping it in the oversized list",
                range.cell_count(),
                self.max_cells_per_item
            );
            self.oversized.write().push(entry);
            return;
        }

        for cell in range.cells() {
            let mut shard = self.cell_shard(cell).write();
            let bucket = shard.entry(cell).or_insert_with(|| {
                self.occupied_cells.fetch_add(1, Ordering::Relaxed);
                Vec::new()
            });
            bucket.push(entry);
        }
    }

    fn erase(&self, item: T, recorded: &Aabb) {
        let range = self.cell_range(recorded);

        if self.is_oversized(&range) {
            self.oversized.write().retain(|entry| entry.item != item);
            return;
        }

        for cell in range.cells() {
            let mut shard = self.cell_shard(cell).write();
            let emptied = match shard.get_mut(&cell) {
                Some(bucket) => {
                    bucket.retain(|entry| entry.item != item);
                    bucket.is_empty()
                }
                None => false,
            };
            if emptied {
                shard.remove(&cell);
                self.occupied_cells.fetch_sub(1, Ordering::Relaxed);
            }
        }
    }

    fn cell_shard(&self, cell: CellKey) -> &RwLock<HashMap<CellKey, Vec<Entry<T>>>> {
        let hash = (cell.0 as u32 as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
            ^ (cell.1 as u32 as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
        &self.cells[(hash >> 32) as usize & self.shard_mask]
    }

    fn ledger_shard(&self, item: &T) -> &RwLock<HashMap<T, Aabb>> {
        let mut hasher = DefaultHasher::new();
        item.hash(&mut hasher);
        &self.ledger[hasher.finish() as usize & self.shard_mask]
    }
}
