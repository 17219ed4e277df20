//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! Per-area Link State Database (C3).

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::marker::PhantomData;
use std::net::Ipv4Addr;
use std::sync::Arc;

use ospfd_types::task::TimeoutTask;

use crate::collections::{Arena, LsaEntryId};
use crate::debug::Debug;
use crate::packet::lsa::{Lsa, LsaKey, LSA_INIT_SEQ_NO, LSA_MAX_SEQ_NO};
use crate::version::Version;

pub const LSA_REFRESH_TIME: u16 = 1800;
pub const LSA_MAX_AGE: u16 = 3600;
pub const LSA_MAX_AGE_DIFF: u16 = 900;
pub const LSA_MIN_INTERVAL: u16 = 5;
pub const LSA_MIN_ARRIVAL: u16 = 1;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LsaCompare {
    Nomatch,
    Newer,
    Older,
    Equivalent,
}

// A single LSDB slot: the LSA plus everything that isn't on the wire but
// travels with it for the duration of its database lifetime.
pub struct LsaEntry<V> {
    pub lsa: Arc<Lsa>,
    // Neighbors that have not yet acknowledged this LSA.
    pub nack_set: HashSet<Ipv4Addr>,
    // Set when `delete()` is called while a reader holds the database
    // open; the slot is reclaimed once the last reader closes it.
    pub tombstoned: bool,
    pub maxage_timer: Option<TimeoutTask>,
    pub refresh_timer: Option<TimeoutTask>,
    _marker: PhantomData<V>,
}

impl<V> LsaEntry<V> {
    fn new(lsa: Arc<Lsa>) -> Self {
        LsaEntry {
            lsa,
            nack_set: HashSet::new(),
            tombstoned: false,
            maxage_timer: None,
            refresh_timer: None,
            _marker: PhantomData,
        }
    }
}

// Per-area LSDB.
//
// Backed by a generation-tagged arena, which already gives every handle
// the `(slot_index, generation)` shape recommended for avoiding aliased
// references: a handle to a removed-then-reused slot simply fails to
// resolve rather than aliasing new data. `reader_count` layers the
// spec's iteration-stability requirement on top: while it is non-zero,
// `delete()` tombstones instead of physically removing, so a caller
// working through a snapshot of IDs never sees a slot repopulated
// underneath it.
pub struct Lsdb<V> {
    entries: Arena<LsaEntry<V>>,
    reader_count: u32,
    pending_removals: Vec<LsaEntryId>,
    // LSAs MaxAged after a sequence-number wrap, waiting for their nack
    // set to drain before being reincarnated with InitialSequenceNumber.
    reincarnate_queue: HashSet<LsaKey>,
    // Self-originated LSAs awaiting MinLSInterval before the next
    // re-origination is allowed to go out.
    delayed_orig: HashMap<LsaKey, Arc<Lsa>>,
}

impl<V> Default for Lsdb<V> {
    fn default() -> Self {
        Lsdb {
            entries: Arena::default(),
            reader_count: 0,
            pending_removals: Vec::new(),
            reincarnate_queue: HashSet::new(),
            delayed_orig: HashMap::new(),
        }
    }
}

impl<V> Lsdb<V>
where
    V: Version,
{
    // ===== iteration stability =====

    pub fn open_database(&mut self) {
        self.reader_count += 1;
    }

    pub fn close_database(&mut self) {
        debug_assert!(self.reader_count > 0);
        self.reader_count -= 1;
        if self.reader_count == 0 {
            for id in self.pending_removals.drain(..) {
                self.entries.remove(id.index());
            }
        }
    }

    // ===== lookup =====

    pub fn find(&self, key: &LsaKey) -> Option<LsaEntryId> {
        self.entries
            .iter()
            .find(|(_, entry)| !entry.tombstoned && entry.lsa.hdr.key() == *key)
            .map(|(idx, _)| LsaEntryId::from_index(idx))
    }

    pub fn get(&self, id: LsaEntryId) -> Option<&LsaEntry<V>> {
        self.entries.get(id.index()).filter(|e| !e.tombstoned)
    }

    pub fn get_mut(&mut self, id: LsaEntryId) -> Option<&mut LsaEntry<V>> {
        self.entries.get_mut(id.index()).filter(|e| !e.tombstoned)
    }

    pub fn iter(&self) -> impl Iterator<Item = (LsaEntryId, &LsaEntry<V>)> {
        self.entries
            .iter()
            .filter(|(_, entry)| !entry.tombstoned)
            .map(|(idx, entry)| (LsaEntryId::from_index(idx), entry))
    }

    pub fn iter_by_type(
        &self,
        lsa_type: crate::packet::lsa::LsaType,
    ) -> impl Iterator<Item = (LsaEntryId, &LsaEntry<V>)> {
        self.iter().filter(move |(_, entry)| entry.lsa.hdr.lsa_type == lsa_type)
    }

    // ===== mutation =====

    // Asserts no triple collision: at most one entry per (type, LSID,
    // adv-rtr).
    pub fn add(&mut self, lsa: Arc<Lsa>) -> LsaEntryId {
        debug_assert!(
            self.find(&lsa.hdr.key()).is_none(),
            "LSDB already contains an entry with this key"
        );
        Debug::LsaInstall(lsa.as_ref()).log::<V>();
        let id = self.entries.insert(LsaEntry::new(lsa));
        LsaEntryId::from_index(id)
    }

    // Required for sequence-number resequencing and Type-7/Type-5
    // suppression-and-revival: the slot index never changes.
    pub fn update_in_place(&mut self, id: LsaEntryId, new_lsa: Arc<Lsa>) {
        Debug::LsaUpdateInPlace(&new_lsa.hdr.key()).log::<V>();
        if let Some(entry) = self.entries.get_mut(id.index()) {
            entry.lsa = new_lsa;
            entry.maxage_timer = None;
            entry.refresh_timer = None;
        }
    }

    // `invalidate` marks the slot tombstoned instead of physically
    // removing it, for callers that still hold a shared `Arc<Lsa>`
    // reference obtained before the delete (SPT vertices, in-flight
    // retransmissions).
    pub fn delete(&mut self, id: LsaEntryId, invalidate: bool) {
        if let Some(entry) = self.entries.get(id.index()) {
            Debug::LsaFlush(&entry.lsa.hdr.key()).log::<V>();
        }
        if invalidate || self.reader_count > 0 {
            if let Some(entry) = self.entries.get_mut(id.index()) {
                entry.tombstoned = true;
                entry.maxage_timer = None;
                entry.refresh_timer = None;
            }
            self.pending_removals.push(id);
        } else {
            self.entries.remove(id.index());
        }
    }

    // Premature-ages every self-originated LSA of the given type (used
    // when an area transitions Normal -> Stub and Summary-LSAs must be
    // flushed).
    pub fn maxage_sweep_type(
        &mut self,
        lsa_type: crate::packet::lsa::LsaType,
        our_router_id: Ipv4Addr,
    ) -> Vec<LsaEntryId> {
        let mut flushed = Vec::new();
        let ids: Vec<_> = self
            .iter_by_type(lsa_type)
            .filter(|(_, entry)| entry.lsa.hdr.adv_rtr == our_router_id)
            .map(|(id, _)| id)
            .collect();
        for id in ids {
            if let Some(entry) = self.entries.get_mut(id.index()) {
                let lsa = Arc::make_mut(&mut entry.lsa);
                lsa.set_maxage::<V>();
                entry.refresh_timer = None;
            }
            flushed.push(id);
        }
        flushed
    }

    // ===== RFC 2328 §13.1 comparison =====

    pub fn compare(&self, current: &Lsa, incoming: &Lsa) -> LsaCompare {
        debug_assert_eq!(current.hdr.key(), incoming.hdr.key());
        lsa_compare(current, incoming)
    }

    // ===== sequence-number wraparound =====

    pub fn begin_reincarnation(&mut self, key: LsaKey) {
        self.reincarnate_queue.insert(key);
    }

    // Called by the 1 Hz reaper; returns the keys whose nack set has
    // drained and are ready to be re-originated with InitialSequenceNumber.
    pub fn drain_ready_reincarnations(&mut self) -> Vec<LsaKey> {
        let mut ready = Vec::new();
        for key in self.reincarnate_queue.iter() {
            if let Some(id) = self.find(key) {
                if let Some(entry) = self.get(id) {
                    if entry.nack_set.is_empty() {
                        ready.push(*key);
                    }
                }
            } else {
                // Already gone (e.g. deleted out from under us); drop it.
                ready.push(*key);
            }
        }
        for key in &ready {
            self.reincarnate_queue.remove(key);
        }
        ready
    }

    // ===== MinLSInterval delay queue =====

    // Returns `Some(lsa)` if origination may proceed immediately;
    // `None` if the re-origination has been queued because the LSA was
    // re-originated less than MinLSInterval ago (the caller should
    // re-attempt when the flood-delay timer fires).
    pub fn originate_check(
        &mut self,
        key: LsaKey,
        candidate: Arc<Lsa>,
        last_orig_age: Option<u16>,
    ) -> Option<Arc<Lsa>> {
        let within_min_interval = last_orig_age
            .map(|age| age < LSA_MIN_INTERVAL)
            .unwrap_or(false);
        if within_min_interval {
            self.delayed_orig.insert(key, candidate);
            None
        } else {
            Some(candidate)
        }
    }

    pub fn take_delayed_originations(&mut self) -> Vec<(LsaKey, Arc<Lsa>)> {
        self.delayed_orig.drain().collect()
    }
}

// RFC 2328 §13.1: newer = higher sequence; tie-break higher checksum;
// tie-break age == MaxAge wins; tie-break |ageA - ageB| > MaxAgeDiff with
// the younger winning; else equivalent.
pub fn lsa_compare(current: &Lsa, incoming: &Lsa) -> LsaCompare {
    let cur_seq = current.hdr.seq_no as i32;
    let new_seq = incoming.hdr.seq_no as i32;
    match new_seq.cmp(&cur_seq) {
        Ordering::Greater => return LsaCompare::Newer,
        Ordering::Less => return LsaCompare::Older,
        Ordering::Equal => {}
    }

    match incoming.hdr.cksum.cmp(&current.hdr.cksum) {
        Ordering::Greater => return LsaCompare::Newer,
        Ordering::Less => return LsaCompare::Older,
        Ordering::Equal => {}
    }

    let cur_age = current.age();
    let new_age = incoming.age();
    if cur_age == LSA_MAX_AGE && new_age != LSA_MAX_AGE {
        return LsaCompare::Older;
    }
    if new_age == LSA_MAX_AGE && cur_age != LSA_MAX_AGE {
        return LsaCompare::Newer;
    }

    let diff = cur_age.abs_diff(new_age);
    if diff > LSA_MAX_AGE_DIFF {
        if new_age < cur_age {
            return LsaCompare::Newer;
        } else {
            return LsaCompare::Older;
        }
    }

    LsaCompare::Equivalent
}

// Bumps a self-originated LSA's sequence number past an intruder's,
// MaxAging-then-reincarnating if already at MaxSequenceNumber (RFC 2328
// §13.4: self-origination intrusion).
pub fn bump_sequence_past(current_seq: u32, intruder_seq: u32) -> u32 {
    let target = intruder_seq.wrapping_add(1);
    if target > LSA_MAX_SEQ_NO || target <= intruder_seq {
        // Would wrap past MaxSequenceNumber: MaxAge-and-reincarnate is the
        // caller's responsibility; this returns the last valid sequence.
        LSA_MAX_SEQ_NO
    } else {
        std::cmp::max(target, current_seq.wrapping_add(1).min(LSA_MAX_SEQ_NO))
    }
}

pub const fn initial_seq_no() -> u32 {
    LSA_INIT_SEQ_NO
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::lsa::{LsaBody, RouterLsa, RouterLsaFlags};
    use crate::version::Ospfv2;

    fn router_lsa(seq: u32, age: u16) -> Lsa {
        let body = LsaBody::Router(RouterLsa { flags: RouterLsaFlags::empty(), links: vec![] });
        let mut lsa = Lsa::new::<Ospfv2>(
            age,
            0,
            "1.1.1.1".parse().unwrap(),
            "1.1.1.1".parse().unwrap(),
            seq,
            body,
        );
        lsa.hdr.age = age;
        lsa
    }

    #[test]
    fn compare_prefers_higher_sequence() {
        let cur = router_lsa(LSA_INIT_SEQ_NO, 0);
        let newer = router_lsa(LSA_INIT_SEQ_NO + 1, 0);
        assert_eq!(lsa_compare(&cur, &newer), LsaCompare::Newer);
        assert_eq!(lsa_compare(&newer, &cur), LsaCompare::Older);
    }

    #[test]
    fn compare_maxage_wins_on_tie() {
        let cur = router_lsa(LSA_INIT_SEQ_NO, 100);
        let mut maxaged = router_lsa(LSA_INIT_SEQ_NO, LSA_MAX_AGE);
        maxaged.hdr.cksum = cur.hdr.cksum;
        assert_eq!(lsa_compare(&cur, &maxaged), LsaCompare::Newer);
    }

    #[test]
    fn lsdb_rejects_duplicate_triples_in_debug() {
        let mut lsdb: Lsdb<Ospfv2> = Lsdb::default();
        let lsa = Arc::new(router_lsa(LSA_INIT_SEQ_NO, 0));
        let id = lsdb.add(lsa.clone());
        assert!(lsdb.find(&lsa.hdr.key()).is_some());
        lsdb.delete(id, false);
        assert!(lsdb.find(&lsa.hdr.key()).is_none());
    }

    #[test]
    fn reader_count_defers_slot_reuse() {
        let mut lsdb: Lsdb<Ospfv2> = Lsdb::default();
        let lsa = Arc::new(router_lsa(LSA_INIT_SEQ_NO, 0));
        let id = lsdb.add(lsa.clone());
        lsdb.open_database();
        lsdb.delete(id, false);
        assert!(lsdb.find(&lsa.hdr.key()).is_none());
        assert_eq!(lsdb.pending_removals.len(), 1);
        lsdb.close_database();
        assert!(lsdb.pending_removals.is_empty());
    }
}
