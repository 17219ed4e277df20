//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! Slot-stable collections.
//!
//! The LSDB and area table hand out `(slot_index, generation)` handles
//! instead of aliased shared pointers, so a handle held across an event
//! (e.g. a DD-exchange iterator, a timer closure) is either still valid
//! or detectably stale — never dangling. `generational_arena` is the
//! concrete implementation of that pair.

use std::marker::PhantomData;

use generational_arena::Arena as GenArena;
pub use generational_arena::Index;

// A typed wrapper around `generational_arena::Arena` so callers don't
// reach for the untyped crate directly.
#[derive(Debug)]
pub struct Arena<T>(GenArena<T>);

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Arena(GenArena::new())
    }
}

impl<T> Arena<T> {
    pub fn insert(&mut self, value: T) -> Index {
        self.0.insert(value)
    }

    pub fn remove(&mut self, index: Index) -> Option<T> {
        self.0.remove(index)
    }

    pub fn get(&self, index: Index) -> Option<&T> {
        self.0.get(index)
    }

    pub fn get_mut(&mut self, index: Index) -> Option<&mut T> {
        self.0.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Index, &T)> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Index, &mut T)> {
        self.0.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// Opaque handle to an area, a level removed from the raw arena index so
// `Areas` can be swapped for a different storage strategy without
// rippling through the rest of the crate.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct AreaId(Index);

// Opaque handle to an LSDB slot: (index, generation). Stable across
// compaction because compaction never reuses a live generation.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct LsaEntryId(Index);

impl LsaEntryId {
    pub(crate) fn from_index(index: Index) -> Self {
        LsaEntryId(index)
    }

    pub(crate) fn index(&self) -> Index {
        self.0
    }
}

// Per-version arena of areas, keyed by `AreaId`.
#[derive(Debug)]
pub struct Areas<V> {
    arena: Arena<crate::area::Area<V>>,
    _marker: PhantomData<V>,
}

impl<V> Default for Areas<V> {
    fn default() -> Self {
        Areas { arena: Arena::default(), _marker: PhantomData }
    }
}

impl<V> Areas<V> {
    pub fn insert(&mut self, area: crate::area::Area<V>) -> AreaId {
        AreaId(self.arena.insert(area))
    }

    pub fn remove(&mut self, id: AreaId) -> Option<crate::area::Area<V>> {
        self.arena.remove(id.0)
    }

    pub fn get(&self, id: AreaId) -> Option<&crate::area::Area<V>> {
        self.arena.get(id.0)
    }

    pub fn get_mut(&mut self, id: AreaId) -> Option<&mut crate::area::Area<V>> {
        self.arena.get_mut(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (AreaId, &crate::area::Area<V>)> {
        self.arena.iter().map(|(idx, area)| (AreaId(idx), area))
    }

    pub fn iter_mut(
        &mut self,
    ) -> impl Iterator<Item = (AreaId, &mut crate::area::Area<V>)> {
        self.arena.iter_mut().map(|(idx, area)| (AreaId(idx), area))
    }

    pub fn find_by_area_id(
        &self,
        area_id: u32,
    ) -> Option<(AreaId, &crate::area::Area<V>)> {
        self.iter().find(|(_, area)| area.area_id == area_id)
    }
}
