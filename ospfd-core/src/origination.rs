//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! LSA origination (C5): builds this router's own Router-, Network-,
//! Summary- and AS-External/NSSA-LSAs, sequences them against whatever
//! this router last originated under the same key, and enforces
//! MinLSInterval via the per-area delay queue. Flooding the result is
//! [`crate::flood::publish`]'s job, not this module's; everything here
//! returns an `Arc<Lsa>` (or asks the caller to wait) rather than
//! touching a peer.

use std::net::Ipv4Addr;
use std::sync::Arc;

use ospfd_types::ip::Ipv4NetworkExt;

use crate::area::{Area, AreaRange, NssaTranslatorRole, NssaTranslatorState};
use crate::broker::ExternalBroker;
use crate::debug::Debug;
use crate::lsdb::Lsdb;
use crate::packet::lsa::{
    AsExternalFlags, AsExternalLsa, Lsa, LsaBody, LsaKey, LsaType, NetworkLsa, PrefixOptions,
    RouterLink, RouterLsa, RouterLsaFlags, SummaryNetworkLsa, SummaryRouterLsa,
    LSA_INIT_SEQ_NO, LSA_MAX_SEQ_NO,
};
use crate::route::{PathType, RouteEntry};
use crate::spf::LS_INFINITY;
use crate::version::Version;

// Either a freshly-built LSA ready to install and flood, or a notice
// that origination was deferred because this key was last originated
// less than MinLSInterval ago; the caller should retry once the area's
// flood-delay timer fires (see `Lsdb::take_delayed_originations`).
#[derive(Debug)]
pub enum OriginateResult {
    Originated(Arc<Lsa>),
    Delayed,
}

fn next_seq_no<V>(lsdb: &Lsdb<V>, key: &LsaKey) -> u32 {
    match lsdb.find(key).and_then(|id| lsdb.get(id)) {
        Some(entry) if entry.lsa.hdr.seq_no < LSA_MAX_SEQ_NO => entry.lsa.hdr.seq_no + 1,
        _ => LSA_INIT_SEQ_NO,
    }
}

// OSPFv3's Link State IDs carry no address semantics for these LSA
// types; a router handing out more than one under the same
// (type, advertising-router) just needs them to be distinct.
fn next_locally_assigned_lsid<V>(lsdb: &Lsdb<V>, lsa_type: LsaType, adv_rtr: Ipv4Addr) -> Ipv4Addr {
    let max = lsdb
        .iter_by_type(lsa_type)
        .filter(|(_, e)| e.lsa.hdr.adv_rtr == adv_rtr)
        .map(|(_, e)| u32::from(e.lsa.hdr.lsa_id))
        .max()
        .unwrap_or(0);
    Ipv4Addr::from(max.wrapping_add(1))
}

fn try_originate<V: Version>(area: &mut Area<V>, key: LsaKey, candidate: Lsa) -> OriginateResult {
    Debug::LsaOriginate(&key).log::<V>();
    let last_orig_age = area.lsdb.find(&key).and_then(|id| area.lsdb.get(id)).map(|e| e.lsa.age());
    match area.lsdb.originate_check(key, Arc::new(candidate), last_orig_age) {
        Some(lsa) => OriginateResult::Originated(lsa),
        None => OriginateResult::Delayed,
    }
}

// ===== Router-LSA (RFC 2328 §12.4.1 / RFC 5340 §A.4.3) =====

// V/E/B-bit rules: V set iff this router is the endpoint of an active
// virtual link through the area under computation; E set iff this
// router originates AS-External-LSAs anywhere; B set iff this router is
// an area border router (has at least one other active area).
pub fn router_lsa_flags(is_vlink_endpoint: bool, is_asbr: bool, is_abr: bool) -> RouterLsaFlags {
    let mut flags = RouterLsaFlags::empty();
    if is_vlink_endpoint {
        flags |= RouterLsaFlags::V;
    }
    if is_asbr {
        flags |= RouterLsaFlags::E;
    }
    if is_abr {
        flags |= RouterLsaFlags::B;
    }
    flags
}

pub fn originate_router_lsa<V: Version>(
    area: &mut Area<V>,
    our_router_id: Ipv4Addr,
    options: u32,
    flags: RouterLsaFlags,
    links: Vec<RouterLink>,
) -> OriginateResult {
    let key = LsaKey::new(LsaType::Router, our_router_id, our_router_id);
    let body = LsaBody::Router(RouterLsa { flags, links });
    let seq = next_seq_no(&area.lsdb, &key);
    let lsa = Lsa::new::<V>(0, options, our_router_id, our_router_id, seq, body);
    try_originate(area, key, lsa)
}

// ===== Network-LSA (DR-only) =====

pub fn originate_network_lsa<V: Version>(
    area: &mut Area<V>,
    our_router_id: Ipv4Addr,
    lsid: Ipv4Addr,
    options: u32,
    network_mask: Option<Ipv4Addr>,
    attached_rtrs: Vec<Ipv4Addr>,
) -> OriginateResult {
    let key = LsaKey::new(LsaType::Network, our_router_id, lsid);
    let body = LsaBody::Network(NetworkLsa {
        network_mask,
        options: if V::HAS_LINK_LSA { Some(options) } else { None },
        attached_rtrs,
    });
    let seq = next_seq_no(&area.lsdb, &key);
    let lsa = Lsa::new::<V>(0, options, lsid, our_router_id, seq, body);
    try_originate(area, key, lsa)
}

// ===== Intra-Area-Prefix-LSA (OSPFv3 only) =====

// Merges candidate prefixes gathered from one or more Link-LSAs,
// dropping no-unicast and local-address (interface-address) entries and
// the placeholder zero-length/zero-metric ones a Link-LSA uses for "no
// prefixes configured", and OR-ing together the prefix-options bits
// when the same prefix is offered by more than one source.
pub fn build_prefix_list(
    candidates: impl Iterator<Item = (PrefixOptions, u16, ipnetwork::IpNetwork)>,
) -> Vec<(PrefixOptions, u16, ipnetwork::IpNetwork)> {
    let mut merged: std::collections::HashMap<ipnetwork::IpNetwork, (PrefixOptions, u16)> =
        std::collections::HashMap::new();
    for (options, metric, prefix) in candidates {
        if options.contains(PrefixOptions::NU) || options.contains(PrefixOptions::LA) {
            continue;
        }
        if metric == 0 && prefix.prefix() == 0 {
            continue;
        }
        merged
            .entry(prefix)
            .and_modify(|(o, m)| {
                *o |= options;
                *m = (*m).min(metric);
            })
            .or_insert((options, metric));
    }
    merged.into_iter().map(|(prefix, (options, metric))| (options, metric, prefix)).collect()
}

pub fn next_intra_area_prefix_lsid<V>(lsdb: &Lsdb<V>, our_router_id: Ipv4Addr) -> Ipv4Addr {
    next_locally_assigned_lsid(lsdb, LsaType::IntraAreaPrefix, our_router_id)
}

pub fn originate_intra_area_prefix_lsa<V: Version>(
    area: &mut Area<V>,
    our_router_id: Ipv4Addr,
    lsid: Ipv4Addr,
    ref_lsa_type: LsaType,
    ref_lsa_id: Ipv4Addr,
    prefixes: Vec<(PrefixOptions, u16, ipnetwork::IpNetwork)>,
) -> OriginateResult {
    let key = LsaKey::new(LsaType::IntraAreaPrefix, our_router_id, lsid);
    let body = LsaBody::IntraAreaPrefix(crate::packet::lsa::IntraAreaPrefixLsa {
        ref_lsa_type,
        ref_lsa_id,
        ref_adv_rtr: our_router_id,
        prefixes,
    });
    let seq = next_seq_no(&area.lsdb, &key);
    let lsa = Lsa::new::<V>(0, 0, lsid, our_router_id, seq, body);
    try_originate(area, key, lsa)
}

// ===== Summary-LSA (Type-3/Type-4, RFC 2328 §12.4.3) =====

// RFC 2328 §12.4.3: a destination is never summarized when it is
// reached only via an AS-external route (those are advertised as
// AS-External-LSAs instead) or when its cost has saturated to
// LSInfinity (effectively unreachable).
pub fn should_suppress_summary(route: &RouteEntry) -> bool {
    matches!(route.path_type, PathType::Type1External | PathType::Type2External)
        || route.total_cost() >= LS_INFINITY
}

// Whether `source_area`'s configured ranges suppress the individual
// constituent route for `prefix` (it is covered by *some* range, whether
// advertised-as-aggregate or DoNotAdvertise — both suppress the
// constituent either way).
pub fn covered_by_area_range<V: Version>(source_area: &Area<V>, prefix: &ipnetwork::IpNetwork) -> bool {
    source_area.covering_range(prefix).is_some()
}

pub fn should_advertise_range(range: &AreaRange) -> bool {
    range.advertise
}

// Full decision for whether an ABR should originate a Summary-LSA for
// `route`/`prefix` (reachable via `source_area`) into `target_area`:
// never back into the route's own area, never a Type-4 into a
// stub-like area (ASBR reachability is meaningless there), never when
// the only next hop out lies inside the target area itself (would
// create a routing loop), and never when area-range coverage or
// LSInfinity already rules it out — except an intra-area route out of
// the backbone into a transit area, which bypasses range suppression.
pub fn should_originate_summary_into<V: Version>(
    source_area: &Area<V>,
    target_area: &Area<V>,
    prefix: ipnetwork::IpNetwork,
    route: &RouteEntry,
    is_asbr_reachability: bool,
    nexthop_in_target_area: bool,
) -> bool {
    if source_area.area_id == target_area.area_id {
        return false;
    }
    if is_asbr_reachability && target_area.config.area_type.is_stub_like() {
        return false;
    }
    if nexthop_in_target_area {
        return false;
    }
    // RFC 2328 §12.4.3 exception: an intra-area route learned from the
    // backbone bypasses area-range suppression when re-announced into a
    // transit area, since the transit area needs the granularity to
    // forward traffic across it rather than seeing only the aggregate.
    let transit_bypass = !is_asbr_reachability
        && source_area.is_backbone()
        && target_area.transit_capability
        && route.path_type == PathType::IntraArea;
    if !transit_bypass && covered_by_area_range(source_area, &prefix) {
        return false;
    }
    !should_suppress_summary(route)
}

// RFC 2328 §12.4.3's Link State ID uniqueness rule for OSPFv2: two
// Summary-Network-LSAs with different masks but the same network
// address would otherwise collide on the natural (address-only) LSID;
// when that happens, the LSID for the second one gets its host bits
// set instead.
fn summary_network_lsid_v2<V>(
    lsdb: &Lsdb<V>,
    our_router_id: Ipv4Addr,
    prefix: ipnetwork::Ipv4Network,
) -> Ipv4Addr {
    let base = prefix.network();
    let collides = lsdb.iter_by_type(LsaType::SummaryNetwork).any(|(_, e)| {
        e.lsa.hdr.adv_rtr == our_router_id
            && e.lsa.hdr.lsa_id == base
            && matches!(&e.lsa.body, LsaBody::SummaryNetwork(s) if s.prefix != ipnetwork::IpNetwork::V4(prefix))
    });
    if collides {
        prefix.set_host_bits().ip()
    } else {
        base
    }
}

pub fn originate_summary_network<V: Version>(
    area: &mut Area<V>,
    our_router_id: Ipv4Addr,
    prefix: ipnetwork::IpNetwork,
    metric: u32,
) -> OriginateResult {
    let lsid = match prefix {
        ipnetwork::IpNetwork::V4(p) if !V::HAS_LINK_LSA => {
            summary_network_lsid_v2(&area.lsdb, our_router_id, p)
        }
        _ => next_locally_assigned_lsid(&area.lsdb, LsaType::SummaryNetwork, our_router_id),
    };
    let key = LsaKey::new(LsaType::SummaryNetwork, our_router_id, lsid);
    let body = LsaBody::SummaryNetwork(SummaryNetworkLsa { prefix, metric });
    let seq = next_seq_no(&area.lsdb, &key);
    let lsa = Lsa::new::<V>(0, 0, lsid, our_router_id, seq, body);
    try_originate(area, key, lsa)
}

// Type-4: the Link State ID is simply the described ASBR's Router ID,
// already globally unique, so there is no host-bit trick to apply here.
pub fn originate_summary_router<V: Version>(
    area: &mut Area<V>,
    our_router_id: Ipv4Addr,
    dest_router_id: Ipv4Addr,
    metric: u32,
) -> OriginateResult {
    let key = LsaKey::new(LsaType::SummaryRouter, our_router_id, dest_router_id);
    let body = LsaBody::SummaryRouter(SummaryRouterLsa { dest_router_id, metric });
    let seq = next_seq_no(&area.lsdb, &key);
    let lsa = Lsa::new::<V>(0, 0, dest_router_id, our_router_id, seq, body);
    try_originate(area, key, lsa)
}

// ===== Stub/NSSA default route (RFC 2328 §12.4.3, RFC 3101 §3.2) =====

fn default_prefix(v6: bool) -> ipnetwork::IpNetwork {
    if v6 {
        ipnetwork::IpNetwork::V6(ipnetwork::Ipv6Network::new(std::net::Ipv6Addr::UNSPECIFIED, 0).unwrap())
    } else {
        ipnetwork::IpNetwork::V4(ipnetwork::Ipv4Network::new(Ipv4Addr::UNSPECIFIED, 0).unwrap())
    }
}

// Originates this area's default route if it is stub-like and
// configured to announce one. Re-entering Stub after a stint as Normal
// (or vice versa) needs no special-cased sequence-number bookkeeping:
// the withdrawn LSA is only MaxAged, not deleted, so the next
// origination's `next_seq_no` naturally continues past it once it is
// found in the LSDB again.
pub fn originate_stub_default<V: Version>(
    area: &mut Area<V>,
    our_router_id: Ipv4Addr,
) -> Option<OriginateResult> {
    if !area.config.area_type.is_stub_like() || !area.config.stub_default_announce {
        return None;
    }
    let prefix = default_prefix(V::HAS_LINK_LSA);
    Some(originate_summary_network(area, our_router_id, prefix, area.config.stub_default_cost))
}

// Withdraws a previously-announced default route (area left Stub/NSSA,
// or default announcement was turned off) by MaxAging it in place.
pub fn withdraw_stub_default<V: Version>(area: &mut Area<V>, our_router_id: Ipv4Addr) {
    let prefix = default_prefix(V::HAS_LINK_LSA);
    let lsid = match prefix {
        ipnetwork::IpNetwork::V4(p) => p.network(),
        ipnetwork::IpNetwork::V6(_) => {
            match area
                .lsdb
                .iter_by_type(LsaType::SummaryNetwork)
                .find(|(_, e)| e.lsa.hdr.adv_rtr == our_router_id)
            {
                Some((_, e)) => e.lsa.hdr.lsa_id,
                None => return,
            }
        }
    };
    let key = LsaKey::new(LsaType::SummaryNetwork, our_router_id, lsid);
    if let Some(id) = area.lsdb.find(&key) {
        if let Some(entry) = area.lsdb.get_mut(id) {
            let lsa = Arc::make_mut(&mut entry.lsa);
            lsa.set_maxage::<V>();
        }
    }
}

// ===== AS-External-LSA / NSSA Type-7 (RFC 2328 §12.4.4 / RFC 3101 §3) =====

#[derive(Clone, Debug)]
pub struct ExternalRoute {
    pub prefix: ipnetwork::IpNetwork,
    pub metric: u32,
    pub type2: bool,
    pub fwd_addr: Option<std::net::IpAddr>,
    pub tag: u32,
}

fn as_external_flags(route: &ExternalRoute) -> AsExternalFlags {
    let mut flags = AsExternalFlags::empty();
    if route.type2 {
        flags |= AsExternalFlags::E;
    }
    if route.fwd_addr.is_some() {
        flags |= AsExternalFlags::F;
    }
    if route.tag != 0 {
        flags |= AsExternalFlags::T;
    }
    flags
}

fn as_external_lsa_body(route: &ExternalRoute) -> LsaBody {
    LsaBody::AsExternal(AsExternalLsa {
        prefix: route.prefix,
        flags: as_external_flags(route),
        metric: route.metric,
        fwd_addr: route.fwd_addr,
        tag: route.tag,
    })
}

fn nssa_lsa_body(route: &ExternalRoute, p_bit: bool) -> LsaBody {
    let mut flags = as_external_flags(route);
    if p_bit {
        flags |= AsExternalFlags::P;
    }
    LsaBody::Nssa(AsExternalLsa {
        prefix: route.prefix,
        flags,
        metric: route.metric,
        fwd_addr: route.fwd_addr,
        tag: route.tag,
    })
}

// Mirrors `summary_network_lsid_v2`'s host-bits trick for the
// process-wide AS-External-LSA store (OSPFv2); OSPFv3 falls back to the
// same locally-assigned monotonic handle used elsewhere.
fn external_lsid<V: Version>(broker: &ExternalBroker<V>, prefix: ipnetwork::IpNetwork) -> Ipv4Addr {
    if V::HAS_LINK_LSA {
        let max = broker.iter().map(|(k, _)| u32::from(k.lsa_id)).max().unwrap_or(0);
        Ipv4Addr::from(max.wrapping_add(1))
    } else {
        match prefix {
            ipnetwork::IpNetwork::V4(p) => {
                let base = p.network();
                let collides = broker.iter().any(|(k, e)| {
                    k.lsa_id == base
                        && matches!(e.lsa.body.as_external(), Some(a) if a.prefix != prefix)
                });
                if collides { p.set_host_bits().ip() } else { base }
            }
            ipnetwork::IpNetwork::V6(_) => unreachable!("OSPFv2 external prefixes are always IPv4"),
        }
    }
}

pub fn originate_as_external<V: Version>(
    broker: &mut ExternalBroker<V>,
    our_router_id: Ipv4Addr,
    route: &ExternalRoute,
) -> Arc<Lsa> {
    let lsid = external_lsid(broker, route.prefix);
    let key = LsaKey::new(LsaType::AsExternal, our_router_id, lsid);
    let seq = match broker.get(&key) {
        Some(entry) if entry.lsa.hdr.seq_no < LSA_MAX_SEQ_NO => entry.lsa.hdr.seq_no + 1,
        _ => LSA_INIT_SEQ_NO,
    };
    Debug::LsaOriginate(&key).log::<V>();
    let lsa = Arc::new(Lsa::new::<V>(0, 0, lsid, our_router_id, seq, as_external_lsa_body(route)));
    broker.insert(lsa.clone());
    lsa
}

// RFC 2328 §12.4.4: this router also originates a route it is
// redistributing itself. If a better-advertised external route for the
// same destination already exists elsewhere in the AS, ours is
// suppressed (MaxAged and stashed) rather than flooded, and silently
// revived the moment that condition no longer holds. `suppress` is the
// caller's evaluation of `ExternalBroker::should_suppress_self` against
// whatever competing route it found.
pub fn announce_external<V: Version>(
    broker: &mut ExternalBroker<V>,
    our_router_id: Ipv4Addr,
    route: &ExternalRoute,
    suppress: bool,
) -> Option<Arc<Lsa>> {
    let lsid = external_lsid(broker, route.prefix);
    let key = LsaKey::new(LsaType::AsExternal, our_router_id, lsid);
    let already_suppressed = broker.get(&key).is_some_and(|e| e.suppressed_self.is_some());

    if suppress {
        let candidate = Arc::new(Lsa::new::<V>(
            0,
            0,
            lsid,
            our_router_id,
            LSA_INIT_SEQ_NO,
            as_external_lsa_body(route),
        ));
        if broker.get(&key).is_none() {
            let mut placeholder = (*candidate).clone();
            placeholder.set_maxage::<V>();
            broker.insert(Arc::new(placeholder));
        }
        if let Some(entry) = broker.get_mut(&key) {
            entry.suppressed_self = Some(candidate);
        }
        return None;
    }

    if already_suppressed {
        if let Some(entry) = broker.get_mut(&key) {
            entry.suppressed_self = None;
        }
        Debug::LsaSelfOriginated(&key).log::<V>();
    }
    Some(originate_as_external(broker, our_router_id, route))
}

// RFC 3101 §3.1: NSSA ABR translator election. `Always`/`Never` bypass
// the election outright; `Candidate` wins iff no other candidate
// advertises a higher router-id.
pub fn elect_nssa_translator(
    role: NssaTranslatorRole,
    our_router_id: Ipv4Addr,
    other_candidates: &[Ipv4Addr],
) -> NssaTranslatorState {
    match role {
        NssaTranslatorRole::Always => NssaTranslatorState::Elected,
        NssaTranslatorRole::Never => NssaTranslatorState::Disabled,
        NssaTranslatorRole::Candidate => {
            if other_candidates.iter().all(|&c| c < our_router_id) {
                NssaTranslatorState::Elected
            } else {
                NssaTranslatorState::Disabled
            }
        }
    }
}

fn nssa_lsid_v2<V>(lsdb: &Lsdb<V>, our_router_id: Ipv4Addr, prefix: ipnetwork::Ipv4Network) -> Ipv4Addr {
    let base = prefix.network();
    let collides = lsdb.iter_by_type(LsaType::Nssa).any(|(_, e)| {
        e.lsa.hdr.adv_rtr == our_router_id
            && e.lsa.hdr.lsa_id == base
            && matches!(e.lsa.body.as_external(), Some(a) if a.prefix != ipnetwork::IpNetwork::V4(prefix))
    });
    if collides { prefix.set_host_bits().ip() } else { base }
}

pub fn originate_nssa<V: Version>(
    area: &mut Area<V>,
    our_router_id: Ipv4Addr,
    route: &ExternalRoute,
    p_bit: bool,
) -> OriginateResult {
    let lsid = match route.prefix {
        ipnetwork::IpNetwork::V4(p) if !V::HAS_LINK_LSA => {
            nssa_lsid_v2(&area.lsdb, our_router_id, p)
        }
        _ => next_locally_assigned_lsid(&area.lsdb, LsaType::Nssa, our_router_id),
    };
    let key = LsaKey::new(LsaType::Nssa, our_router_id, lsid);
    let body = nssa_lsa_body(route, p_bit);
    let seq = next_seq_no(&area.lsdb, &key);
    let lsa = Lsa::new::<V>(0, 0, lsid, our_router_id, seq, body);
    try_originate(area, key, lsa)
}

// RFC 3101 §3.2: translate a P-bit-set Type-7 into a Type-5, performed
// only by the area's elected translator. The translated copy is
// advertised under the translator's own router-id, sequenced against
// whatever the translator last put out for this destination.
pub fn translate_7_to_5<V: Version>(
    broker: &ExternalBroker<V>,
    nssa_lsa: &Lsa,
    translator_router_id: Ipv4Addr,
) -> Option<Arc<Lsa>> {
    let LsaBody::Nssa(n7) = &nssa_lsa.body else { return None };
    if nssa_lsa.hdr.is_maxage() || !n7.p_bit() {
        return None;
    }
    let lsid = external_lsid(broker, n7.prefix);
    let key = LsaKey::new(LsaType::AsExternal, translator_router_id, lsid);
    let seq = match broker.get(&key) {
        Some(entry) if entry.lsa.hdr.seq_no < LSA_MAX_SEQ_NO => entry.lsa.hdr.seq_no + 1,
        _ => LSA_INIT_SEQ_NO,
    };
    Debug::Nssa7To5Translate(&nssa_lsa.hdr.key()).log::<V>();
    let body = LsaBody::AsExternal(AsExternalLsa {
        prefix: n7.prefix,
        flags: n7.flags & !AsExternalFlags::P,
        metric: n7.metric,
        fwd_addr: n7.fwd_addr,
        tag: n7.tag,
    });
    Some(Arc::new(Lsa::new::<V>(0, 0, lsid, translator_router_id, seq, body)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::Ospfv2;

    #[test]
    fn router_lsa_flags_match_roles() {
        let flags = router_lsa_flags(true, true, true);
        assert!(flags.contains(RouterLsaFlags::V));
        assert!(flags.contains(RouterLsaFlags::E));
        assert!(flags.contains(RouterLsaFlags::B));
        assert_eq!(router_lsa_flags(false, false, false), RouterLsaFlags::empty());
    }

    #[test]
    fn summary_suppresses_externals_and_ls_infinity() {
        let intra = RouteEntry {
            path_type: PathType::IntraArea,
            cost: 10,
            type2_metric: 0,
            nexthops: vec![],
            adv_rtr: "1.1.1.1".parse().unwrap(),
            nssa_p_bit: false,
            discard: false,
        };
        assert!(!should_suppress_summary(&intra));

        let external = RouteEntry { path_type: PathType::Type1External, ..intra.clone() };
        assert!(should_suppress_summary(&external));

        let unreachable = RouteEntry { cost: LS_INFINITY, ..intra };
        assert!(should_suppress_summary(&unreachable));
    }

    #[test]
    fn originate_router_lsa_bumps_sequence_on_reorigination() {
        let our_router_id: Ipv4Addr = "1.1.1.1".parse().unwrap();
        let mut area: Area<Ospfv2> = Area::new(0, our_router_id);

        let OriginateResult::Originated(first) = originate_router_lsa(
            &mut area,
            our_router_id,
            0x02,
            RouterLsaFlags::empty(),
            vec![],
        ) else {
            panic!("expected immediate origination");
        };
        assert_eq!(first.hdr.seq_no, LSA_INIT_SEQ_NO);
        area.lsdb.add(first);

        let OriginateResult::Originated(second) = originate_router_lsa(
            &mut area,
            our_router_id,
            0x02,
            RouterLsaFlags::B,
            vec![],
        ) else {
            panic!("expected immediate origination");
        };
        assert_eq!(second.hdr.seq_no, LSA_INIT_SEQ_NO + 1);
    }

    #[test]
    fn translator_election_prefers_always_then_highest_id() {
        let us: Ipv4Addr = "5.5.5.5".parse().unwrap();
        assert_eq!(
            elect_nssa_translator(NssaTranslatorRole::Never, us, &[]),
            NssaTranslatorState::Disabled
        );
        assert_eq!(
            elect_nssa_translator(NssaTranslatorRole::Always, us, &["9.9.9.9".parse().unwrap()]),
            NssaTranslatorState::Elected
        );
        assert_eq!(
            elect_nssa_translator(
                NssaTranslatorRole::Candidate,
                us,
                &["9.9.9.9".parse().unwrap()]
            ),
            NssaTranslatorState::Disabled
        );
        assert_eq!(
            elect_nssa_translator(
                NssaTranslatorRole::Candidate,
                us,
                &["1.1.1.1".parse().unwrap()]
            ),
            NssaTranslatorState::Elected
        );
    }

    #[test]
    fn announce_external_suppresses_then_revives() {
        let our_router_id: Ipv4Addr = "1.1.1.1".parse().unwrap();
        let mut broker: ExternalBroker<Ospfv2> = ExternalBroker::default();
        let route = ExternalRoute {
            prefix: "10.0.0.0/24".parse().unwrap(),
            metric: 20,
            type2: false,
            fwd_addr: None,
            tag: 0,
        };

        assert!(announce_external(&mut broker, our_router_id, &route, true).is_none());
        let key = LsaKey::new(LsaType::AsExternal, our_router_id, "10.0.0.0".parse().unwrap());
        assert!(broker.get(&key).unwrap().lsa.hdr.is_maxage());
        assert!(broker.get(&key).unwrap().suppressed_self.is_some());

        let revived = announce_external(&mut broker, our_router_id, &route, false);
        assert!(revived.is_some());
        assert!(broker.get(&key).unwrap().suppressed_self.is_none());
    }
}
