//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! Reliable flooding engine (C4): the RFC 2328 §13 receive path plus
//! publication to every other peer on the area.
//!
//! Interface and neighbor state machines (Hello, Database Description,
//! LS Request/Update/Acknowledgment framing) live above this crate, behind
//! [`crate::peer::PeerManager`]. This module never touches an interface or
//! neighbor directly; it only classifies an already-decoded, already-
//! validated-on-the-wire LSA against the area's LSDB and tells the peer
//! manager what to do with it.

use std::net::Ipv4Addr;
use std::sync::Arc;

use crate::area::{Area, AreaType};
use crate::debug::Debug;
use crate::lsdb::{bump_sequence_past, LsaCompare, LSA_MIN_ARRIVAL};
use crate::packet::lsa::{Lsa, LsaType, LSA_MAX_SEQ_NO};
use crate::peer::{PeerId, PeerManager};
use crate::version::Version;

// What the caller should do with the neighbor that sent us `lsa`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Ack {
    None,
    Delayed,
    Direct,
}

#[derive(Debug)]
pub enum ReceiveOutcome {
    // Installed (new or in-place update); `spf_dirty` says whether this
    // LSA's content actually changed the topology/route set, i.e. whether
    // a routing recompute should be scheduled.
    Installed { ack: Ack, spf_dirty: bool },
    // An intruder's self-originated-lookalike; handled in place, L itself
    // was never installed.
    SelfOriginationIntrusion,
    // L was not installed; `ack` still says what the caller owes the
    // neighbor (RFC 2328 §13 steps 3 and 7 both drop the LSA while still
    // owing an ack), `reason` is a diagnostic label only.
    Dropped { reason: &'static str, ack: Ack },
    // L was older than our database copy and not on N's LS-Request list:
    // our copy has already been unicast back to N.
    SentOurCopy,
    // L was older than our copy *and* on N's LS-Request list: a protocol
    // violation for the peer manager to act on.
    BadLsReq,
}

pub struct ReceiveContext {
    pub peer: PeerId,
    pub neighbor: Ipv4Addr,
    // Whether N is in Exchange or Loading state (RFC 2328 §13, step 3's
    // "no database copy and neighbor not in Exchange or Loading").
    pub neighbor_in_exchange_or_loading: bool,
    pub neighbor_is_dr: bool,
    pub we_are_bdr: bool,
}

// RFC 2328 §13: classify and act on a just-decoded, just-validated LSA
// received from `ctx.neighbor` on `ctx.peer`. `peers` lists every other
// peer attached to this area, for publication.
pub fn receive<V: Version>(
    area: &mut Area<V>,
    peer_mgr: &mut impl PeerManager<V>,
    peers: &[PeerId],
    ctx: &ReceiveContext,
    lsa: Lsa,
) -> ReceiveOutcome {
    if area_filters_lsa_type(area.config.area_type, lsa.hdr.lsa_type) {
        let key = lsa.hdr.key();
        Debug::LsaDiscard(&key, "not permitted in this area type").log::<V>();
        return ReceiveOutcome::Dropped { reason: "not permitted in this area type", ack: Ack::None };
    }

    let key = lsa.hdr.key();
    let existing_id = area.lsdb.find(&key);

    // Step: MaxAge, no database copy, no neighbor in Exchange/Loading ->
    // immediately acknowledge (delayed) and discard without installing.
    if lsa.hdr.is_maxage() && existing_id.is_none() && !ctx.neighbor_in_exchange_or_loading {
        return ReceiveOutcome::Dropped { reason: "unmatched MaxAge LSA", ack: Ack::Delayed };
    }

    // Self-origination-intrusion defense takes priority over ordinary
    // comparison: an LSA claiming to be ours but that we didn't originate
    // is never installed as received.
    if is_self_origination_intrusion::<V>(area, peer_mgr, &lsa) {
        Debug::SelfOriginationIntrusion(&key, lsa.hdr.adv_rtr).log::<V>();
        let reflood = handle_self_origination_intrusion(area, &lsa);
        publish(peer_mgr, peers, &reflood, Some((ctx.peer, ctx.neighbor)));
        return ReceiveOutcome::SelfOriginationIntrusion;
    }

    let Some(existing_id) = existing_id else {
        // NOMATCH: no database copy at all.
        let lsa = Arc::new(lsa);
        publish(peer_mgr, peers, &lsa, Some((ctx.peer, ctx.neighbor)));
        area.lsdb.add(lsa);
        return ReceiveOutcome::Installed { ack: Ack::Delayed, spf_dirty: true };
    };

    let cmp = {
        let existing = area.lsdb.get(existing_id).expect("looked up above");
        area.lsdb.compare(&existing.lsa, &lsa)
    };

    match cmp {
        LsaCompare::Newer => {
            let existing = area.lsdb.get(existing_id).expect("looked up above");
            if recently_received(existing) {
                Debug::LsaMinArrivalDiscard(&key).log::<V>();
                return ReceiveOutcome::Dropped { reason: "received within MinLSArrival", ack: Ack::None };
            }
            let spf_dirty = existing.lsa.body != lsa.body;
            let lsa = Arc::new(lsa);
            publish(peer_mgr, peers, &lsa, Some((ctx.peer, ctx.neighbor)));
            area.lsdb.update_in_place(existing_id, lsa);
            ReceiveOutcome::Installed { ack: Ack::Delayed, spf_dirty }
        }
        LsaCompare::Older => {
            if peer_mgr.on_link_state_request_list(ctx.peer, area.area_id, ctx.neighbor, &lsa) {
                ReceiveOutcome::BadLsReq
            } else {
                let existing = area.lsdb.get(existing_id).expect("looked up above");
                let stale = existing.lsa.hdr.is_maxage()
                    && existing.lsa.hdr.seq_no == LSA_MAX_SEQ_NO;
                if stale {
                    ReceiveOutcome::Dropped {
                        reason: "stale database copy at MaxSequenceNumber",
                        ack: Ack::None,
                    }
                } else {
                    peer_mgr.send_lsa(ctx.peer, area.area_id, ctx.neighbor, &existing.lsa);
                    ReceiveOutcome::SentOurCopy
                }
            }
        }
        LsaCompare::Equivalent => {
            let implicit_ack = area
                .lsdb
                .get_mut(existing_id)
                .map(|entry| entry.nack_set.remove(&ctx.neighbor))
                .unwrap_or(false);
            if implicit_ack {
                ReceiveOutcome::Dropped {
                    reason: "implicit ack via retransmission list",
                    ack: Ack::None,
                }
            } else if ctx.we_are_bdr && ctx.neighbor_is_dr {
                ReceiveOutcome::Dropped {
                    reason: "equivalent, delayed ack owed to DR/BDR",
                    ack: Ack::Delayed,
                }
            } else {
                ReceiveOutcome::Dropped { reason: "equivalent, direct ack owed", ack: Ack::Direct }
            }
        }
        LsaCompare::Nomatch => unreachable!("existing_id implies a matching triple"),
    }
}

// Enqueues `lsa` on every peer's retransmission list except the
// neighbor it arrived from, and reports whether it was observed flooded
// back to us on the peer it arrived from (used by the caller to suppress
// an otherwise-owed direct ack).
pub fn publish<V: Version>(
    peer_mgr: &mut impl PeerManager<V>,
    peers: &[PeerId],
    lsa: &Arc<Lsa>,
    origin: Option<(PeerId, Ipv4Addr)>,
) -> bool {
    let (origin_peer, origin_neighbor) = match origin {
        Some((p, n)) => (Some(p), Some(n)),
        None => (None, None),
    };
    let mut multicast_back = false;
    for &peer in peers {
        if peer_mgr.queue_lsa(peer, origin_peer, origin_neighbor, lsa) {
            multicast_back = true;
        }
    }
    Debug::FloodPublish(&lsa.hdr.key(), peers.len()).log::<V>();
    multicast_back
}

// Flushes every peer's delay queue; called when the MinLSInterval
// flood-delay timer fires.
pub fn flush_delayed<V: Version>(peer_mgr: &mut impl PeerManager<V>, peers: &[PeerId]) {
    for &peer in peers {
        peer_mgr.push_lsas(peer);
    }
}

fn area_filters_lsa_type(area_type: AreaType, lsa_type: LsaType) -> bool {
    match area_type {
        AreaType::Normal => false,
        AreaType::Stub => matches!(lsa_type, LsaType::AsExternal | LsaType::Nssa),
        AreaType::Nssa => matches!(lsa_type, LsaType::AsExternal),
    }
}

fn recently_received<V>(entry: &crate::lsdb::LsaEntry<V>) -> bool {
    match entry.lsa.base_time {
        Some(t) => t.elapsed().as_secs() < LSA_MIN_ARRIVAL as u64,
        None => false,
    }
}

fn is_self_origination_intrusion<V: Version>(
    area: &Area<V>,
    peer_mgr: &impl PeerManager<V>,
    lsa: &Lsa,
) -> bool {
    if lsa.hdr.adv_rtr == area.router_id {
        return true;
    }
    V::network_lsa_self_orig_by_interface()
        && lsa.hdr.lsa_type == LsaType::Network
        && peer_mgr.known_interface_address(lsa.hdr.lsa_id)
}

// RFC 2328 §13 (self-origination defense): if we hold a local copy,
// bump its sequence number past the intruder's and reflood that; if we
// don't, MaxAge a throwaway copy of the intruder's LSA and reflood
// *that* instead, so it drains from the network without ever being
// installed.
fn handle_self_origination_intrusion<V: Version>(area: &mut Area<V>, intruder: &Lsa) -> Arc<Lsa> {
    let key = intruder.hdr.key();
    let Some(id) = area.lsdb.find(&key) else {
        let mut maxaged = intruder.clone();
        maxaged.set_maxage::<V>();
        return Arc::new(maxaged);
    };

    let current_seq = area.lsdb.get(id).expect("looked up above").lsa.hdr.seq_no;
    let bumped = bump_sequence_past(current_seq, intruder.hdr.seq_no);

    if bumped == LSA_MAX_SEQ_NO && current_seq != LSA_MAX_SEQ_NO {
        Debug::LsaSeqNoWrap(&key).log::<V>();
        let mut ours = (*area.lsdb.get(id).unwrap().lsa).clone();
        ours.set_maxage::<V>();
        let lsa = Arc::new(ours);
        area.lsdb.update_in_place(id, lsa.clone());
        area.lsdb.begin_reincarnation(key);
        lsa
    } else {
        let mut ours = (*area.lsdb.get(id).unwrap().lsa).clone();
        ours.hdr.seq_no = bumped;
        ours.hdr.age = 0;
        ours.encode::<V>();
        let lsa = Arc::new(ours);
        area.lsdb.update_in_place(id, lsa.clone());
        lsa
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::packet::lsa::{LsaBody, RouterLsa, RouterLsaFlags};
    use crate::peer::VirtualLinkError;
    use crate::version::Ospfv2;

    struct MockPeerManager {
        router_id: Ipv4Addr,
        queued: HashMap<PeerId, Vec<Lsa>>,
        interfaces: Vec<Ipv4Addr>,
    }

    impl MockPeerManager {
        fn new(router_id: Ipv4Addr) -> Self {
            MockPeerManager { router_id, queued: HashMap::new(), interfaces: Vec::new() }
        }
    }

    impl PeerManager<Ospfv2> for MockPeerManager {
        fn router_id(&self) -> Ipv4Addr {
            self.router_id
        }

        fn get_interface_id(&self, _peer: PeerId) -> Option<u32> {
            None
        }

        fn get_attached_routers(&self, _peer: PeerId, _area: u32) -> Vec<Ipv4Addr> {
            Vec::new()
        }

        fn get_neighbour_address(
            &self,
            _router_id: Ipv4Addr,
            _interface_id: u32,
        ) -> Option<Ipv4Addr> {
            None
        }

        fn known_interface_address(&self, addr: Ipv4Addr) -> bool {
            self.interfaces.contains(&addr)
        }

        fn configured_network(&self, _addr: Ipv4Addr) -> Option<ipnetwork::Ipv4Network> {
            None
        }

        fn queue_lsa(
            &mut self,
            peer: PeerId,
            _origin_peer: Option<PeerId>,
            _origin_neighbor: Option<Ipv4Addr>,
            lsa: &Lsa,
        ) -> bool {
            self.queued.entry(peer).or_default().push(lsa.clone());
            false
        }

        fn push_lsas(&mut self, _peer: PeerId) {}

        fn on_link_state_request_list(
            &self,
            _peer: PeerId,
            _area: u32,
            _neighbour: Ipv4Addr,
            _lsa: &Lsa,
        ) -> bool {
            false
        }

        fn send_lsa(&mut self, peer: PeerId, _area: u32, _neighbour: Ipv4Addr, lsa: &Lsa) {
            self.queued.entry(peer).or_default().push(lsa.clone());
        }

        fn up_virtual_link(
            &mut self,
            _remote_router_id: Ipv4Addr,
            _local: Ipv4Addr,
            _cost: u16,
            _remote: Ipv4Addr,
        ) -> Result<(), VirtualLinkError> {
            Ok(())
        }

        fn down_virtual_link(&mut self, _remote_router_id: Ipv4Addr) {}

        fn area_range_covered(&self, _area: u32, _net: ipnetwork::Ipv4Network) -> bool {
            false
        }
    }

    fn router_lsa(adv_rtr: Ipv4Addr, seq: u32, age: u16) -> Lsa {
        let body = LsaBody::Router(RouterLsa { flags: RouterLsaFlags::empty(), links: vec![] });
        Lsa::new::<Ospfv2>(age, 0, adv_rtr, adv_rtr, seq, body)
    }

    fn ctx(peer: PeerId, neighbor: Ipv4Addr) -> ReceiveContext {
        ReceiveContext {
            peer,
            neighbor,
            neighbor_in_exchange_or_loading: false,
            neighbor_is_dr: false,
            we_are_bdr: false,
        }
    }

    #[test]
    fn nomatch_installs_and_floods() {
        let mut area: Area<Ospfv2> = Area::new(0, "1.1.1.1".parse().unwrap());
        let mut peer_mgr = MockPeerManager::new("1.1.1.1".parse().unwrap());
        let neighbor: Ipv4Addr = "2.2.2.2".parse().unwrap();
        let lsa = router_lsa(neighbor, crate::packet::lsa::LSA_INIT_SEQ_NO, 0);

        let outcome = receive(&mut area, &mut peer_mgr, &[7], &ctx(1, neighbor), lsa.clone());
        assert!(matches!(
            outcome,
            ReceiveOutcome::Installed { ack: Ack::Delayed, spf_dirty: true }
        ));
        assert!(area.lsdb.find(&lsa.hdr.key()).is_some());
        assert_eq!(peer_mgr.queued.get(&7).map(Vec::len), Some(1));
    }

    #[test]
    fn newer_updates_in_place() {
        let mut area: Area<Ospfv2> = Area::new(0, "1.1.1.1".parse().unwrap());
        let mut peer_mgr = MockPeerManager::new("1.1.1.1".parse().unwrap());
        let neighbor: Ipv4Addr = "2.2.2.2".parse().unwrap();
        let first = router_lsa(neighbor, crate::packet::lsa::LSA_INIT_SEQ_NO, 0);
        let id = area.lsdb.add(Arc::new(first.clone()));

        let second = router_lsa(neighbor, crate::packet::lsa::LSA_INIT_SEQ_NO + 1, 0);
        let outcome = receive(&mut area, &mut peer_mgr, &[], &ctx(1, neighbor), second.clone());
        assert!(matches!(outcome, ReceiveOutcome::Installed { .. }));
        assert_eq!(area.lsdb.get(id).unwrap().lsa.hdr.seq_no, second.hdr.seq_no);
    }

    #[test]
    fn older_sends_our_copy_back() {
        let mut area: Area<Ospfv2> = Area::new(0, "1.1.1.1".parse().unwrap());
        let mut peer_mgr = MockPeerManager::new("1.1.1.1".parse().unwrap());
        let neighbor: Ipv4Addr = "2.2.2.2".parse().unwrap();
        let newer = router_lsa(neighbor, crate::packet::lsa::LSA_INIT_SEQ_NO + 5, 0);
        area.lsdb.add(Arc::new(newer));

        let stale = router_lsa(neighbor, crate::packet::lsa::LSA_INIT_SEQ_NO, 0);
        let outcome = receive(&mut area, &mut peer_mgr, &[], &ctx(1, neighbor), stale);
        assert!(matches!(outcome, ReceiveOutcome::SentOurCopy));
        assert_eq!(peer_mgr.queued.get(&1).map(Vec::len), Some(1));
    }

    #[test]
    fn unmatched_maxage_owes_delayed_ack() {
        let mut area: Area<Ospfv2> = Area::new(0, "1.1.1.1".parse().unwrap());
        let mut peer_mgr = MockPeerManager::new("1.1.1.1".parse().unwrap());
        let neighbor: Ipv4Addr = "2.2.2.2".parse().unwrap();
        let maxaged = router_lsa(
            neighbor,
            crate::packet::lsa::LSA_INIT_SEQ_NO,
            crate::packet::lsa::LSA_MAX_AGE,
        );

        let outcome = receive(&mut area, &mut peer_mgr, &[], &ctx(1, neighbor), maxaged);
        assert!(matches!(
            outcome,
            ReceiveOutcome::Dropped { reason: "unmatched MaxAge LSA", ack: Ack::Delayed }
        ));
        assert!(area.lsdb.find(&router_lsa(neighbor, 0, 0).hdr.key()).is_none());
    }

    #[test]
    fn equivalent_owes_direct_ack_when_not_relayed_by_bdr() {
        let mut area: Area<Ospfv2> = Area::new(0, "1.1.1.1".parse().unwrap());
        let mut peer_mgr = MockPeerManager::new("1.1.1.1".parse().unwrap());
        let neighbor: Ipv4Addr = "2.2.2.2".parse().unwrap();
        let lsa = router_lsa(neighbor, crate::packet::lsa::LSA_INIT_SEQ_NO, 0);
        area.lsdb.add(Arc::new(lsa.clone()));

        let outcome = receive(&mut area, &mut peer_mgr, &[], &ctx(1, neighbor), lsa);
        assert!(matches!(
            outcome,
            ReceiveOutcome::Dropped { reason: "equivalent, direct ack owed", ack: Ack::Direct }
        ));
    }

    #[test]
    fn equivalent_owes_delayed_ack_when_we_are_bdr_and_neighbor_is_dr() {
        let mut area: Area<Ospfv2> = Area::new(0, "1.1.1.1".parse().unwrap());
        let mut peer_mgr = MockPeerManager::new("1.1.1.1".parse().unwrap());
        let neighbor: Ipv4Addr = "2.2.2.2".parse().unwrap();
        let lsa = router_lsa(neighbor, crate::packet::lsa::LSA_INIT_SEQ_NO, 0);
        area.lsdb.add(Arc::new(lsa.clone()));

        let mut dr_ctx = ctx(1, neighbor);
        dr_ctx.we_are_bdr = true;
        dr_ctx.neighbor_is_dr = true;
        let outcome = receive(&mut area, &mut peer_mgr, &[], &dr_ctx, lsa);
        assert!(matches!(
            outcome,
            ReceiveOutcome::Dropped {
                reason: "equivalent, delayed ack owed to DR/BDR",
                ack: Ack::Delayed
            }
        ));
    }

    #[test]
    fn self_origination_intrusion_never_installs_intruder() {
        let our_router_id: Ipv4Addr = "1.1.1.1".parse().unwrap();
        let mut area: Area<Ospfv2> = Area::new(0, our_router_id);
        let mut peer_mgr = MockPeerManager::new(our_router_id);
        let ours = router_lsa(our_router_id, crate::packet::lsa::LSA_INIT_SEQ_NO, 0);
        let id = area.lsdb.add(Arc::new(ours));

        let neighbor: Ipv4Addr = "2.2.2.2".parse().unwrap();
        let intruder = router_lsa(our_router_id, crate::packet::lsa::LSA_INIT_SEQ_NO, 0);
        let outcome =
            receive(&mut area, &mut peer_mgr, &[9], &ctx(1, neighbor), intruder.clone());
        assert!(matches!(outcome, ReceiveOutcome::SelfOriginationIntrusion));
        assert_eq!(
            area.lsdb.get(id).unwrap().lsa.hdr.seq_no,
            crate::packet::lsa::LSA_INIT_SEQ_NO + 1
        );
        assert!(area.lsdb.find(&intruder.hdr.key()) == Some(id));
    }
}
