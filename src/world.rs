use std::collections::HashMap;
use std::ops::{Deref, DerefMut};

use log::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{
    collision::{
        contact::{ContactManifold, ContactPair},
        grid::{QueryScratch, SpatialGrid},
        provider::{Operand, ProviderRegistry},
    },
    config::WorldSettings,
    core::{
        body::Body,
        collider::{ColliderKey, ColliderSlot, ColliderView},
        types::{BodyKind, Vec2},
    },
    dynamics::{
        integrator::Integrator,
        policy::{MassWeightedPolicy, ResolutionPolicy},
    },
    error::{PhysicsError, Result},
    utils::{
        allocator::{Arena, BodyId},
        logging::{warn_if_frame_budget_exceeded, ScopedTimer},
    },
};

pub mod events;
pub mod movement;

pub use events::{ContactEvent, ContactTracker, EventReceiver};
pub use movement::{GridMover, MoveOutcome};

/// One overlap reported by [`World::query_contacts`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryContact {
    /// Collider of the queried body, placed at the queried position.
    pub collider: ColliderKey,
    pub other: ColliderKey,
    /// Normal points from the queried collider toward `other`.
    pub manifold: ContactManifold,
}

/// Owns every registered body together with the grid, providers and policy that act on them.
pub struct World {
    settings: WorldSettings,
    bodies: Arena<Body>,
    grid: SpatialGrid<BodyId>,
    providers: ProviderRegistry,
    policy: Box<dyn ResolutionPolicy>,
    integrator: Integrator,
    tracker: ContactTracker,
    receivers: HashMap<BodyId, Vec<Box<dyn EventReceiver>>>,
    events: Vec<ContactEvent>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// World with default settings, the built-in rect provider and mass-weighted resolution.
    pub fn new() -> Self {
        Self::from_parts(
            WorldSettings::default(),
            ProviderRegistry::with_defaults(),
            Box::new(MassWeightedPolicy),
        )
    }

    pub fn builder() -> WorldBuilder {
        WorldBuilder::default()
    }

    fn from_parts(
        settings: WorldSettings,
        providers: ProviderRegistry,
        policy: Box<dyn ResolutionPolicy>,
    ) -> Self {
        Self {
            bodies: Arena::new(),
            grid: SpatialGrid::with_options(
                settings.cell_size,
                settings.grid_shards,
                settings.max_cells_per_item,
            ),
            providers,
            policy,
            integrator: Integrator::new(settings.gravity),
            tracker: ContactTracker::new(),
            receivers: HashMap::new(),
            events: Vec::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &WorldSettings {
        &self.settings
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    pub fn policy(&self) -> &dyn ResolutionPolicy {
        self.policy.as_ref()
    }

    pub fn grid(&self) -> &SpatialGrid<BodyId> {
        &self.grid
    }

    pub fn gravity(&self) -> Vec2 {
        self.integrator.gravity
    }

    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.integrator.gravity = gravity;
        self.settings.gravity = gravity;
    }

    /// Takes ownership of `body`, assigns its stable index and buckets it in the grid.
    pub fn register(&mut self, mut body: Body) -> BodyId {
        if let Some(previous) = body.id() {
            debug!("re-registering a body that carried {previous}; assigning a fresh id");
        }
        let bounds = body.bounding_box();
        let id = self.bodies.insert_with(|id| {
            body.set_id(Some(id));
            body
        });
        self.grid.add(id, bounds);
        debug!("registered {id} at {bounds:?}");
        id
    }

    /// Removes a body and drops its event receivers. Unknown ids are ignored.
    pub fn unregister(&mut self, id: BodyId) -> &mut Self {
        self.detach(id);
        self
    }

    /// Removes a body and hands it back to the caller, detached from this world.
    pub fn detach(&mut self, id: BodyId) -> Option<Body> {
        let Some(mut body) = self.bodies.remove(id) else {
            debug!("unregister ignored for unknown {id}");
            return None;
        };
        self.grid.remove(id);
        self.receivers.remove(&id);
        body.set_id(None);
        debug!("unregistered {id}");
        Some(body)
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.bodies.contains(id)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id)
    }

    /// Mutable access that re-buckets the body in the grid when the guard drops.
    pub fn body_mut(&mut self, id: BodyId) -> Option<BodyMut<'_>> {
        let body = self.bodies.get_mut(id)?;
        Some(BodyMut {
            id,
            body,
            grid: &self.grid,
        })
    }

    /// Registered bodies in stable index order.
    pub fn bodies(&self) -> impl Iterator<Item = (BodyId, &Body)> + '_ {
        self.bodies.iter()
    }

    pub fn set_position(&mut self, id: BodyId, position: Vec2) -> Result<()> {
        let mut body = self.body_mut(id).ok_or(PhysicsError::UnknownBody(id))?;
        body.set_position(position);
        Ok(())
    }

    pub fn set_velocity(&mut self, id: BodyId, velocity: Vec2) -> Result<()> {
        let body = self.bodies.get_mut(id).ok_or(PhysicsError::UnknownBody(id))?;
        body.velocity = velocity;
        Ok(())
    }

    /// Delivers this body's contact and trigger events to `receiver` until the body
    /// is unregistered.
    pub fn add_event_receiver<R>(&mut self, id: BodyId, receiver: R) -> Result<()>
    where
        R: EventReceiver + 'static,
    {
        if !self.bodies.contains(id) {
            return Err(PhysicsError::UnknownBody(id));
        }
        self.receivers.entry(id).or_default().push(Box::new(receiver));
        Ok(())
    }

    /// Events produced by the most recent resolution pass, in dispatch order.
    pub fn events(&self) -> &[ContactEvent] {
        &self.events
    }

    /// Speculative overlap test: which solid colliders would `id`'s solid colliders
    /// touch if the body stood at `position`. Only colliders whose layer intersects
    /// `mask` are reported. Nothing is mutated.
    pub fn query_contacts(
        &self,
        id: BodyId,
        position: Vec2,
        mask: u32,
    ) -> impl Iterator<Item = QueryContact> {
        let mut scratch = QueryScratch::new();
        let mut found = Vec::new();
        self.query_contacts_into(id, position, mask, &mut scratch, &mut found);
        found.into_iter()
    }

    /// [`World::query_contacts`] with caller-owned buffers. `out` is appended to, sorted
    /// by collider keys.
    pub fn query_contacts_into(
        &self,
        id: BodyId,
        position: Vec2,
        mask: u32,
        scratch: &mut QueryScratch<BodyId>,
        out: &mut Vec<QueryContact>,
    ) {
        debug_assert!(self.bodies.contains(id), "query_contacts on unregistered {id}");
        let Some(body) = self.bodies.get(id) else {
            return;
        };
        if !body.is_enabled {
            return;
        }

        let start = out.len();
        let footprint = body.bounds_at(position);
        for &other_id in self.grid.query_rect(&footprint, scratch) {
            if other_id == id {
                continue;
            }
            let Some(other) = self.bodies.get(other_id).filter(|b| b.is_enabled) else {
                continue;
            };
            for mine in body.collider_views_at(id, position).filter(|v| !v.is_sensor) {
                let candidates = other
                    .collider_views_at(other_id, other.position())
                    .filter(|v| !v.is_sensor && v.filter.layer & mask != 0);
                for theirs in candidates {
                    if let Some(manifold) = self.providers.test(&mine, &theirs) {
                        out.push(QueryContact {
                            collider: mine.key,
                            other: theirs.key,
                            manifold,
                        });
                    }
                }
            }
        }
        out[start..].sort_by_key(|contact| (contact.collider, contact.other));
    }

    /// Integrates every enabled, awake body over `dt`, then resolves contacts.
    pub fn step(&mut self, dt: f32) {
        let timer = ScopedTimer::new("world::step");
        {
            let _integrate = ScopedTimer::new("world::integrate");
            for body in self.bodies.values_mut() {
                self.integrator.step(body, dt);
            }
        }
        self.resolve_contacts();
        warn_if_frame_budget_exceeded(timer.elapsed(), self.settings.frame_budget_ms);
    }

    /// Broad phase, narrow phase, resolution and event dispatch without integration.
    pub fn resolve_contacts(&mut self) {
        let _timer = ScopedTimer::new("world::resolve_contacts");
        self.sync_grid();

        let pairs = candidate_pairs(&self.bodies, &self.grid);
        let mut contacts = Vec::new();
        let mut triggers = Vec::new();
        for (id_a, id_b) in pairs {
            let Some((a, b)) = self.bodies.get2_mut(id_a, id_b) else {
                continue;
            };
            let slots_a = enabled_slots(a);
            let slots_b = enabled_slots(b);
            for &slot_a in &slots_a {
                for &slot_b in &slots_b {
                    let (Some(view_a), Some(view_b)) =
                        (view_of(a, id_a, slot_a), view_of(b, id_b, slot_b))
                    else {
                        continue;
                    };
                    if !view_a.filter.matches(&view_b.filter) {
                        continue;
                    }
                    let Some(manifold) = self.providers.test(&view_a, &view_b) else {
                        continue;
                    };
                    let pair =
                        ContactPair::new(view_a.key, a.owner().cloned(), view_b.key, b.owner().cloned());
                    if view_a.is_sensor || view_b.is_sensor {
                        triggers.push(pair);
                        continue;
                    }
                    // The tracked manifold is expressed in pair order.
                    let tracked = if pair.first() == view_a.key {
                        manifold
                    } else {
                        manifold.flipped()
                    };
                    let solid = self
                        .providers
                        .solve(
                            Operand::new(&mut *a, view_a),
                            Operand::new(&mut *b, view_b),
                            &manifold,
                            self.policy.as_ref(),
                        )
                        .unwrap_or(false);
                    if solid {
                        contacts.push((pair, tracked));
                    }
                }
            }
        }

        self.sync_grid();
        let events = self.tracker.advance(contacts, triggers);
        self.dispatch(&events);
        self.events = events;
    }

    fn sync_grid(&self) {
        for (id, body) in self.bodies.iter() {
            self.grid.update(id, body.bounding_box());
        }
    }

    fn dispatch(&mut self, events: &[ContactEvent]) {
        if self.receivers.is_empty() {
            return;
        }
        for event in events {
            let (a, b) = event.pair().bodies();
            let targets = if a == b { [Some(a), None] } else { [Some(a), Some(b)] };
            for id in targets.into_iter().flatten() {
                if let Some(receivers) = self.receivers.get_mut(&id) {
                    for receiver in receivers.iter_mut() {
                        event.deliver(receiver.as_mut());
                    }
                }
            }
        }
    }
}

fn enabled_slots(body: &Body) -> Vec<ColliderSlot> {
    body.colliders()
        .iter()
        .filter(|c| c.is_enabled)
        .filter_map(|c| c.slot())
        .collect()
}

fn view_of(body: &Body, id: BodyId, slot: ColliderSlot) -> Option<ColliderView> {
    body.collider(slot)
        .filter(|c| c.is_enabled)
        .map(|c| ColliderView::new(id, c, slot, body.position()))
}

/// Candidate pairs `(a, b)` with `a < b`, sorted. Static/static pairs never resolve.
fn candidate_pairs(bodies: &Arena<Body>, grid: &SpatialGrid<BodyId>) -> Vec<(BodyId, BodyId)> {
    let ids: Vec<BodyId> = bodies.ids().collect();

    #[cfg(feature = "parallel")]
    let mut pairs: Vec<(BodyId, BodyId)> = ids
        .par_iter()
        .map_init(QueryScratch::new, |scratch, &id| {
            candidates_for(bodies, grid, id, scratch)
        })
        .flatten()
        .collect();

    #[cfg(not(feature = "parallel"))]
    let mut pairs: Vec<(BodyId, BodyId)> = {
        let mut scratch = QueryScratch::new();
        ids.iter()
            .flat_map(|&id| candidates_for(bodies, grid, id, &mut scratch))
            .collect()
    };

    pairs.sort_unstable();
    pairs.dedup();
    pairs
}

fn candidates_for(
    bodies: &Arena<Body>,
    grid: &SpatialGrid<BodyId>,
    id: BodyId,
    scratch: &mut QueryScratch<BodyId>,
) -> Vec<(BodyId, BodyId)> {
    let Some(body) = bodies.get(id).filter(|b| b.is_enabled) else {
        return Vec::new();
    };
    let mut pairs = Vec::new();
    for &other_id in grid.query_rect(&body.bounding_box(), scratch) {
        if other_id <= id {
            continue;
        }
        let Some(other) = bodies.get(other_id).filter(|b| b.is_enabled) else {
            continue;
        };
        if body.kind == BodyKind::Static && other.kind == BodyKind::Static {
            continue;
        }
        pairs.push((id, other_id));
    }
    pairs
}

/// Mutable body borrowed from a [`World`]; the grid is refreshed when it drops.
pub struct BodyMut<'w> {
    id: BodyId,
    body: &'w mut Body,
    grid: &'w SpatialGrid<BodyId>,
}

impl BodyMut<'_> {
    pub fn id(&self) -> BodyId {
        self.id
    }
}

impl Deref for BodyMut<'_> {
    type Target = Body;

    fn deref(&self) -> &Body {
        self.body
    }
}

impl DerefMut for BodyMut<'_> {
    fn deref_mut(&mut self) -> &mut Body {
        self.body
    }
}

impl Drop for BodyMut<'_> {
    fn drop(&mut self) {
        self.grid.update(self.id, self.body.bounding_box());
    }
}

/// Fallible world construction with validated settings.
#[derive(Default)]
pub struct WorldBuilder {
    settings: WorldSettings,
    providers: Option<ProviderRegistry>,
    policy: Option<Box<dyn ResolutionPolicy>>,
}

impl WorldBuilder {
    pub fn settings(mut self, settings: WorldSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn provider_registry(mut self, providers: ProviderRegistry) -> Self {
        self.providers = Some(providers);
        self
    }

    pub fn resolution_policy<P>(mut self, policy: P) -> Self
    where
        P: ResolutionPolicy + 'static,
    {
        self.policy = Some(Box::new(policy));
        self
    }

    pub fn build(self) -> Result<World> {
        self.settings.validate()?;
        Ok(World::from_parts(
            self.settings,
            self.providers.unwrap_or_default(),
            self.policy.unwrap_or_else(|| Box::new(MassWeightedPolicy)),
        ))
    }
}
