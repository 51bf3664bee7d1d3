use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Stable index handed to a body when it joins a world.
///
/// Indices increase monotonically and are never reused within one arena,
/// so they double as a deterministic ordering key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct BodyId(u64);

impl BodyId {
    pub const fn from_raw(index: u64) -> Self {
        Self(index)
    }

    pub const fn index(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "body#{}", self.0)
    }
}

/// Slot arena keyed by monotonically assigned [`BodyId`]s.
///
/// Storage slots are recycled through a free list, ids are not.
pub struct Arena<T> {
    slots: Vec<Option<T>>,
    free_list: Vec<usize>,
    index: BTreeMap<BodyId, usize>,
    next_id: u64,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            index: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Stores `item` under a fresh id. The closure sees the id before the item is stored.
    pub fn insert_with(&mut self, make: impl FnOnce(BodyId) -> T) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;

        let item = make(id);
        let slot = match self.free_list.pop() {
            Some(slot) => {
                self.slots[slot] = Some(item);
                slot
            }
            None => {
                self.slots.push(Some(item));
                self.slots.len() - 1
            }
        };
        self.index.insert(id, slot);
        id
    }

    pub fn insert(&mut self, item: T) -> BodyId {
        self.insert_with(|_| item)
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: BodyId) -> Option<&T> {
        let slot = *self.index.get(&id)?;
        self.slots.get(slot).and_then(|slot| slot.as_ref())
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut T> {
        let slot = *self.index.get(&id)?;
        self.slots.get_mut(slot).and_then(|slot| slot.as_mut())
    }

    pub fn get2_mut(&mut self, id_a: BodyId, id_b: BodyId) -> Option<(&mut T, &mut T)> {
        if id_a == id_b {
            return None;
        }
        let slot_a = *self.index.get(&id_a)?;
        let slot_b = *self.index.get(&id_b)?;

        let (first, second, flipped) = if slot_a < slot_b {
            (slot_a, slot_b, false)
        } else {
            (slot_b, slot_a, true)
        };

        let (left, right) = self.slots.split_at_mut(second);
        let first_slot = left.get_mut(first).and_then(|slot| slot.as_mut())?;
        let second_slot = right.get_mut(0).and_then(|slot| slot.as_mut())?;

        if flipped {
            Some((second_slot, first_slot))
        } else {
            Some((first_slot, second_slot))
        }
    }

    pub fn remove(&mut self, id: BodyId) -> Option<T> {
        let slot = self.index.remove(&id)?;
        let item = self.slots.get_mut(slot).and_then(|slot| slot.take());
        self.free_list.push(slot);
        item
    }

    /// Ids in ascending (registration) order.
    pub fn ids(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.index.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyId, &T)> + '_ {
        self.index
            .iter()
            .filter_map(|(id, slot)| self.slots[*slot].as_ref().map(|item| (*id, item)))
    }

    /// Mutable access to every live item, in storage order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> + '_ {
        self.slots.iter_mut().flatten()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// The id the next insertion will receive.
    pub fn peek_next_id(&self) -> BodyId {
        BodyId(self.next_id)
    }
}
