//! Generational arena that owns every body in an engine.
//!
//! Slots are reused after removal, but each reuse bumps the slot's
//! generation, so a [`BodyId`] captured before the removal never resolves to
//! the new occupant.

use std::fmt;

use super::rigid_body::Body;

/// Non-owning handle to a body: slot index plus the slot generation it was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId {
    index: u32,
    generation: u32,
}

impl BodyId {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Arena slot this id points at. Slots are recycled, so the index alone
    /// does not identify a body.
    pub fn index(&self) -> usize {
        self.index as usize
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    body: Option<Body>,
}

#[derive(Debug, Clone, Default)]
pub struct BodyArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl BodyArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the body produced by `make`, which receives the id the body will own.
    pub fn insert_with(&mut self, make: impl FnOnce(BodyId) -> Body) -> BodyId {
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                let id = BodyId::new(index, slot.generation);
                slot.body = Some(make(id));
                id
            }
            None => {
                let index = self.slots.len() as u32;
                let id = BodyId::new(index, 0);
                self.slots.push(Slot {
                    generation: 0,
                    body: Some(make(id)),
                });
                id
            }
        };
        self.len += 1;
        id
    }

    /// Removes the body, frees its slot and invalidates `id`.
    pub fn remove(&mut self, id: BodyId) -> Option<Body> {
        let slot = self.slots.get_mut(id.index())?;
        if slot.generation != id.generation {
            return None;
        }
        let body = slot.body.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        Some(body)
    }

    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.body.as_ref())
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.body.as_mut())
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots, live or free. Valid raw indices are `0..capacity()`.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Body in raw slot `index`, if occupied.
    pub(crate) fn get_by_index(&self, index: usize) -> Option<&Body> {
        self.slots.get(index).and_then(|slot| slot.body.as_ref())
    }

    /// Mutable access to two distinct occupied slots at once.
    pub(crate) fn pair_mut(&mut self, a: usize, b: usize) -> Option<(&mut Body, &mut Body)> {
        if a == b || a.max(b) >= self.slots.len() {
            return None;
        }
        let (low, high) = (a.min(b), a.max(b));
        let (head, tail) = self.slots.split_at_mut(high);
        let low_body = head[low].body.as_mut()?;
        let high_body = tail[0].body.as_mut()?;
        if a < b {
            Some((low_body, high_body))
        } else {
            Some((high_body, low_body))
        }
    }

    /// Live bodies in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Body> {
        self.slots.iter().filter_map(|slot| slot.body.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Body> {
        self.slots.iter_mut().filter_map(|slot| slot.body.as_mut())
    }

    /// Removes every body; all previously issued ids become stale.
    pub fn clear(&mut self) {
        self.free.clear();
        for (index, slot) in self.slots.iter_mut().enumerate().rev() {
            if slot.body.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
            self.free.push(index as u32);
        }
        self.len = 0;
    }
}
