//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! SPF and post-passes (C6): Dijkstra over the Router-/Network-LSA
//! graph, followed by inter-area, transit-area and AS-external passes.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::net::Ipv4Addr;

use crate::area::Area;
use crate::debug::Debug;
use crate::lsdb::Lsdb;
use crate::packet::lsa::{LinkTarget, LsaType, RouterLinkType, RouterLsaFlags};
use crate::route::{AreaRouteTable, Nexthop, PathType, RouteEntry};
use crate::version::Version;

pub const LS_INFINITY: u32 = 0x00ff_ffff;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum VertexId {
    Router(Ipv4Addr),
    // The Network-LSA's link-state-id: (v2) the DR's interface address;
    // (v3) the DR's interface ID. A Network-LSA is looked up by this
    // value alone, never together with its advertising router, since a
    // Router-LSA's link only ever carries the former (RFC 2328 §12.4.1.3,
    // RFC 5340 §A.4.3).
    Network(Ipv4Addr),
}

#[derive(Clone, Debug)]
struct Vertex {
    id: VertexId,
    cost: u32,
    nexthops: Vec<Nexthop>,
    // True for router vertices whose Router-LSA has the E-bit or B-bit
    // set (candidates for host-route installation).
    router_flags: RouterLsaFlags,
}

// Directed edge discovered while walking a Router-LSA's link list; the
// reverse edge is validated separately for bidirectional reachability.
// `target` is the originating link's identity, kept only so the root's
// direct edges can resolve a real next-hop address; edges synthesized
// from a Network-LSA's attached-router list (no corresponding link)
// carry `None`.
struct Edge {
    to: VertexId,
    metric: u16,
    target: Option<LinkTarget>,
}

// Walks every valid (non-MaxAge) Router-LSA and Network-LSA in the area
// and returns, for each vertex, its outgoing bidirectionally-reachable
// edges.
fn build_adjacency<V: Version>(
    lsdb: &Lsdb<V>,
) -> HashMap<VertexId, Vec<Edge>> {
    let mut adjacency: HashMap<VertexId, Vec<Edge>> = HashMap::new();

    for (_, entry) in lsdb.iter_by_type(LsaType::Router) {
        if entry.lsa.hdr.is_maxage() {
            continue;
        }
        let Some(router) = entry.lsa.body.as_router() else { continue };
        let from = VertexId::Router(entry.lsa.hdr.adv_rtr);

        for link in &router.links {
            match link.link_type {
                RouterLinkType::PointToPoint | RouterLinkType::Virtual => {
                    let peer_rid = link.target.nbr_router_id();
                    if router_has_reverse_link::<V>(lsdb, peer_rid, entry.lsa.hdr.adv_rtr, link.link_type) {
                        adjacency.entry(from).or_default().push(Edge {
                            to: VertexId::Router(peer_rid),
                            metric: link.metric,
                            target: Some(link.target),
                        });
                    }
                }
                RouterLinkType::Transit => {
                    let lsid = link.target.transit_lsid();
                    if network_lists_router::<V>(lsdb, lsid, entry.lsa.hdr.adv_rtr) {
                        adjacency.entry(from).or_default().push(Edge {
                            to: VertexId::Network(lsid),
                            metric: link.metric,
                            target: Some(link.target),
                        });
                    }
                }
                RouterLinkType::Stub => {
                    // Stub links are leaves, not SPT edges; they are
                    // consumed directly during route installation
                    // instead (v2 host/LAN routes are folded into the
                    // Network-LSA / Intra-Area-Prefix path instead).
                }
            }
        }
    }

    for (_, entry) in lsdb.iter_by_type(LsaType::Network) {
        if entry.lsa.hdr.is_maxage() {
            continue;
        }
        let Some(network) = entry.lsa.body.as_network() else { continue };
        let from = VertexId::Network(entry.lsa.hdr.lsa_id);
        for rtr in &network.attached_rtrs {
            adjacency.entry(from).or_default().push(Edge {
                to: VertexId::Router(*rtr),
                metric: 0,
                target: None,
            });
        }
    }

    adjacency
}

fn router_has_reverse_link<V: Version>(
    lsdb: &Lsdb<V>,
    peer_rid: Ipv4Addr,
    our_rid: Ipv4Addr,
    link_type: RouterLinkType,
) -> bool {
    lsdb.iter_by_type(LsaType::Router)
        .filter(|(_, e)| e.lsa.hdr.adv_rtr == peer_rid && !e.lsa.hdr.is_maxage())
        .filter_map(|(_, e)| e.lsa.body.as_router())
        .any(|router| {
            router.links.iter().any(|l| {
                l.link_type == link_type && l.target.nbr_router_id() == our_rid
            })
        })
}

// A Network-LSA is identified solely by its link-state-id, never jointly
// with an advertising router: a Router-LSA's Transit link only ever
// carries the former (the DR's own interface identity), never the DR's
// router-id.
fn network_lists_router<V: Version>(
    lsdb: &Lsdb<V>,
    lsid: Ipv4Addr,
    router_id: Ipv4Addr,
) -> bool {
    lsdb.iter_by_type(LsaType::Network)
        .filter(|(_, e)| e.lsa.hdr.lsa_id == lsid && !e.lsa.hdr.is_maxage())
        .filter_map(|(_, e)| e.lsa.body.as_network())
        .any(|network| network.attached_rtrs.contains(&router_id))
}

// Runs Dijkstra from `root` over the area's Router-/Network-LSA graph.
// Tie-breaks equal-cost paths on the lower advertising-router.
//
// Next-hop resolution follows RFC 2328 §16.1 step 3: a vertex inherits
// its parent's next-hops unless the parent is the root itself or a
// transit network directly attached to the root, in which case the
// next-hop is resolved afresh from the LSDB (the peer's own interface
// address, never the root's or the DR's). This is what keeps a
// non-designated router from misrouting traffic for a neighbor through
// the DR instead of straight to that neighbor.
pub fn run<V: Version>(
    lsdb: &Lsdb<V>,
    root: Ipv4Addr,
) -> HashMap<VertexId, Vertex> {
    let adjacency = build_adjacency(lsdb);
    let mut result: HashMap<VertexId, Vertex> = HashMap::new();
    let mut visited: HashSet<VertexId> = HashSet::new();
    let mut heap: BinaryHeap<Reverse<(u32, u32, VertexId)>> = BinaryHeap::new();

    let root_id = VertexId::Router(root);
    result.insert(
        root_id,
        Vertex { id: root_id, cost: 0, nexthops: vec![], router_flags: router_flags::<V>(lsdb, root) },
    );
    heap.push(Reverse((0, tie_break_key(root), root_id)));

    let root_adjacent_networks: HashSet<VertexId> = adjacency
        .get(&root_id)
        .into_iter()
        .flatten()
        .filter(|e| matches!(e.to, VertexId::Network(_)))
        .map(|e| e.to)
        .collect();

    while let Some(Reverse((cost, _, id))) = heap.pop() {
        if !visited.insert(id) {
            continue;
        }

        let Some(edges) = adjacency.get(&id) else { continue };
        for edge in edges {
            let new_cost = cost.saturating_add(edge.metric as u32);
            let nexthops = if id == root_id || root_adjacent_networks.contains(&id) {
                vec![resolve_fresh_nexthop::<V>(lsdb, root, id, edge)]
            } else {
                result.get(&id).map(|v| v.nexthops.clone()).unwrap_or_default()
            };

            match result.get(&edge.to) {
                Some(existing) if existing.cost < new_cost => continue,
                Some(existing) if existing.cost == new_cost => {
                    // Equal-cost: merge next-hops (ECMP) rather than
                    // discard, keeping the lowest-adv-rtr tie-break only
                    // for deciding which *vertex* wins expansion order.
                    let mut merged = existing.nexthops.clone();
                    for nh in &nexthops {
                        if !merged.contains(nh) {
                            merged.push(*nh);
                        }
                    }
                    result.insert(
                        edge.to,
                        Vertex {
                            id: edge.to,
                            cost: new_cost,
                            nexthops: merged,
                            router_flags: vertex_router_flags::<V>(lsdb, edge.to),
                        },
                    );
                    continue;
                }
                _ => {}
            }

            result.insert(
                edge.to,
                Vertex {
                    id: edge.to,
                    cost: new_cost,
                    nexthops,
                    router_flags: vertex_router_flags::<V>(lsdb, edge.to),
                },
            );
            heap.push(Reverse((new_cost, tie_break_id(edge.to), edge.to)));
        }
    }

    result
}

fn tie_break_key(rid: Ipv4Addr) -> u32 {
    u32::from(rid)
}

fn tie_break_id(id: VertexId) -> u32 {
    match id {
        VertexId::Router(rid) => u32::from(rid),
        VertexId::Network(lsid) => u32::from(lsid),
    }
}

fn router_flags<V: Version>(lsdb: &Lsdb<V>, rid: Ipv4Addr) -> RouterLsaFlags {
    lsdb.iter_by_type(LsaType::Router)
        .filter(|(_, e)| e.lsa.hdr.adv_rtr == rid && !e.lsa.hdr.is_maxage())
        .find_map(|(_, e)| e.lsa.body.as_router().map(|r| r.flags))
        .unwrap_or(RouterLsaFlags::empty())
}

fn vertex_router_flags<V: Version>(lsdb: &Lsdb<V>, id: VertexId) -> RouterLsaFlags {
    match id {
        VertexId::Router(rid) => router_flags::<V>(lsdb, rid),
        VertexId::Network(..) => RouterLsaFlags::empty(),
    }
}

// Resolves a next-hop that RFC 2328 §16.1 requires to be computed afresh:
// `parent` is either the root itself (edge is one of the root's own
// links) or a transit network directly attached to the root (edge is
// that network's attached-router list).
fn resolve_fresh_nexthop<V: Version>(
    lsdb: &Lsdb<V>,
    root: Ipv4Addr,
    parent: VertexId,
    edge: &Edge,
) -> Nexthop {
    match parent {
        VertexId::Router(r) if r == root => nexthop_from_root_link::<V>(lsdb, edge),
        VertexId::Network(lsid) => match edge.to {
            VertexId::Router(rid) => nexthop_on_network::<V>(lsdb, lsid, rid),
            VertexId::Network(_) => Nexthop { addr: None, interface_id: None },
        },
        _ => Nexthop { addr: None, interface_id: None },
    }
}

// The root's own edge: `edge.target` is one of the root's own
// Router-LSA links, so its address fields already describe either the
// peer's address (v2 point-to-point/virtual) or our own interface
// identity (v2 transit, v3 everything).
fn nexthop_from_root_link<V: Version>(lsdb: &Lsdb<V>, edge: &Edge) -> Nexthop {
    let Some(target) = &edge.target else {
        return Nexthop { addr: None, interface_id: None };
    };
    match target {
        LinkTarget::V2 { .. } => match edge.to {
            VertexId::Router(rid) => Nexthop {
                addr: reverse_v2_link_data::<V>(lsdb, rid, target.nbr_router_id())
                    .map(std::net::IpAddr::V4),
                interface_id: None,
            },
            // A root-adjacent transit network is directly connected;
            // its attached routers get a fresh next-hop individually
            // via `nexthop_on_network` instead.
            VertexId::Network(_) => Nexthop { addr: None, interface_id: None },
        },
        LinkTarget::V3 { iface_id, nbr_iface_id, .. } => {
            let addr = match edge.to {
                VertexId::Router(rid) => v3_linklocal_addr::<V>(lsdb, rid, *nbr_iface_id)
                    .or_else(|| v3_fallback_global_addr::<V>(lsdb, rid)),
                VertexId::Network(_) => None,
            };
            Nexthop { addr, interface_id: Some(*iface_id) }
        }
    }
}

// A router attached to a root-adjacent transit network: its own
// interface address/link-local address on that network, never the
// root's and never the DR's, so traffic is never falsely relayed
// through the designated router.
fn nexthop_on_network<V: Version>(
    lsdb: &Lsdb<V>,
    lsid: Ipv4Addr,
    rid: Ipv4Addr,
) -> Nexthop {
    if V::HAS_LINK_LSA {
        let iface_id = v3_iface_id_on_network::<V>(lsdb, rid, lsid);
        let addr = iface_id
            .and_then(|id| v3_linklocal_addr::<V>(lsdb, rid, id))
            .or_else(|| v3_fallback_global_addr::<V>(lsdb, rid));
        Nexthop { addr, interface_id: iface_id }
    } else {
        let addr = reverse_v2_link_data::<V>(lsdb, rid, lsid).map(std::net::IpAddr::V4);
        Nexthop { addr, interface_id: None }
    }
}

// `on_router`'s own Router-LSA carries its own address for every link it
// advertises (RFC 2328 §12.4.1.3): a point-to-point/virtual link's Link
// Data is its own interface address, and a transit link's Link Data is
// its own address on that network. `link_id` is the value the link is
// keyed by from the other side (the peer's router-id for point-to-point,
// the network's link-state-id for transit), so both callers share this
// lookup.
fn reverse_v2_link_data<V: Version>(
    lsdb: &Lsdb<V>,
    on_router: Ipv4Addr,
    link_id: Ipv4Addr,
) -> Option<Ipv4Addr> {
    lsdb.iter_by_type(LsaType::Router)
        .filter(|(_, e)| e.lsa.hdr.adv_rtr == on_router && !e.lsa.hdr.is_maxage())
        .filter_map(|(_, e)| e.lsa.body.as_router())
        .flat_map(|r| r.links.iter())
        .find_map(|l| match l.target {
            LinkTarget::V2 { link_id: id, link_data } if id == link_id => Some(link_data),
            _ => None,
        })
}

// The interface ID `router` itself uses on the transit network
// identified by `lsid`, read back out of its own Transit-type link
// (RFC 5340 §A.4.3's "Neighbor Interface ID" as seen from the DR's
// side is this router's own "Interface ID" field).
fn v3_iface_id_on_network<V: Version>(
    lsdb: &Lsdb<V>,
    router: Ipv4Addr,
    lsid: Ipv4Addr,
) -> Option<u32> {
    let dr_iface = u32::from(lsid);
    lsdb.iter_by_type(LsaType::Router)
        .filter(|(_, e)| e.lsa.hdr.adv_rtr == router && !e.lsa.hdr.is_maxage())
        .filter_map(|(_, e)| e.lsa.body.as_router())
        .flat_map(|r| r.links.iter())
        .find_map(|l| match l.target {
            LinkTarget::V3 { iface_id, nbr_iface_id, .. }
                if l.link_type == RouterLinkType::Transit && nbr_iface_id == dr_iface =>
            {
                Some(iface_id)
            }
            _ => None,
        })
}

// `router`'s link-local address on the interface it calls `iface_id`,
// read from its own Link-LSA (RFC 5340 §A.4.9). Link-LSAs are
// link-local in scope and keyed by (advertising-router, interface-id).
fn v3_linklocal_addr<V: Version>(
    lsdb: &Lsdb<V>,
    router: Ipv4Addr,
    iface_id: u32,
) -> Option<std::net::IpAddr> {
    let lsid = Ipv4Addr::from(iface_id);
    lsdb.iter_by_type(LsaType::Link)
        .find(|(_, e)| {
            e.lsa.hdr.adv_rtr == router && e.lsa.hdr.lsa_id == lsid && !e.lsa.hdr.is_maxage()
        })
        .and_then(|(_, e)| e.lsa.body.as_link())
        .map(|link| std::net::IpAddr::V6(link.linklocal_addr))
}

// No Link-LSA exists over a virtual link (it crosses a transit area
// rather than a real shared link), so fall back to a global address
// pulled from the peer's own Intra-Area-Prefix-LSA, per spec.md §4.4.
fn v3_fallback_global_addr<V: Version>(
    lsdb: &Lsdb<V>,
    router: Ipv4Addr,
) -> Option<std::net::IpAddr> {
    use ospfd_types::ip::IpAddrExt;
    use ospfd_types::ip::IpNetworkKind;

    lsdb.iter_by_type(LsaType::IntraAreaPrefix)
        .filter(|(_, e)| e.lsa.hdr.adv_rtr == router && !e.lsa.hdr.is_maxage())
        .filter_map(|(_, e)| e.lsa.body.as_intra_area_prefix())
        .filter(|p| p.ref_lsa_type == LsaType::Router && p.ref_adv_rtr == router)
        .flat_map(|p| p.prefixes.iter())
        .map(|(_, _, prefix)| prefix.ip())
        .find(|addr| !addr.is_linklocal())
}

// Installs the Dijkstra result into the area's intra-area table:
// host routes for E/B-bit routers, one entry per transit network.
pub fn install_intra_area<V: Version>(
    lsdb: &Lsdb<V>,
    vertices: &HashMap<VertexId, Vertex>,
    table: &mut AreaRouteTable,
) {
    table.clear();
    for vertex in vertices.values() {
        match vertex.id {
            VertexId::Router(rid) => {
                if !vertex
                    .router_flags
                    .intersects(RouterLsaFlags::E | RouterLsaFlags::B)
                {
                    continue;
                }
                table.routers.insert(
                    rid,
                    RouteEntry {
                        path_type: PathType::IntraArea,
                        cost: vertex.cost,
                        type2_metric: 0,
                        nexthops: vertex.nexthops.clone(),
                        adv_rtr: rid,
                        nssa_p_bit: false,
                        discard: false,
                    },
                );
            }
            VertexId::Network(lsid) => {
                install_transit_network::<V>(lsdb, lsid, vertex, table);
            }
        }
    }
}

// RFC 2328 §12.4.1.3: a v2 transit network's prefix is carried in its
// own Network-LSA. RFC 5340 §A.4.4/§A.4.9.1: a v3 transit network has
// no prefix of its own; its prefixes live in the DR's Intra-Area-
// Prefix-LSA, one routing-table entry per prefix, each costed at the
// SPT weight plus that prefix's own metric and suppressed if it
// contains the already-computed next-hop (the link's own subnet).
fn install_transit_network<V: Version>(
    lsdb: &Lsdb<V>,
    lsid: Ipv4Addr,
    vertex: &Vertex,
    table: &mut AreaRouteTable,
) {
    let Some(dr_adv_rtr) = lsdb
        .iter_by_type(LsaType::Network)
        .find(|(_, e)| e.lsa.hdr.lsa_id == lsid && !e.lsa.hdr.is_maxage())
        .map(|(_, e)| e.lsa.hdr.adv_rtr)
    else {
        return;
    };

    if V::HAS_LINK_LSA {
        for (_, entry) in lsdb.iter_by_type(LsaType::IntraAreaPrefix) {
            if entry.lsa.hdr.is_maxage() {
                continue;
            }
            let Some(p) = entry.lsa.body.as_intra_area_prefix() else { continue };
            if p.ref_lsa_type != LsaType::Network
                || p.ref_lsa_id != lsid
                || p.ref_adv_rtr != dr_adv_rtr
            {
                continue;
            }
            for (_, metric, prefix) in &p.prefixes {
                if vertex
                    .nexthops
                    .iter()
                    .any(|nh| nh.addr.is_some_and(|a| prefix.contains(a)))
                {
                    continue;
                }
                table.networks.insert(
                    *prefix,
                    RouteEntry {
                        path_type: PathType::IntraArea,
                        cost: vertex.cost.saturating_add(*metric as u32),
                        type2_metric: 0,
                        nexthops: vertex.nexthops.clone(),
                        adv_rtr: dr_adv_rtr,
                        nssa_p_bit: false,
                        discard: false,
                    },
                );
            }
        }
    } else {
        use ospfd_types::ip::Ipv4NetworkExt;

        let Some(mask) = lsdb
            .iter_by_type(LsaType::Network)
            .find(|(_, e)| e.lsa.hdr.lsa_id == lsid && !e.lsa.hdr.is_maxage())
            .and_then(|(_, e)| e.lsa.body.as_network())
            .and_then(|n| n.network_mask)
        else {
            return;
        };
        let prefixlen = u32::from(mask).count_ones() as u8;
        let Ok(raw) = ipnetwork::Ipv4Network::new(lsid, prefixlen) else { return };
        table.networks.insert(
            ipnetwork::IpNetwork::V4(raw.apply_mask()),
            RouteEntry {
                path_type: PathType::IntraArea,
                cost: vertex.cost,
                type2_metric: 0,
                nexthops: vertex.nexthops.clone(),
                adv_rtr: dr_adv_rtr,
                nssa_p_bit: false,
                discard: false,
            },
        );
    }
}

// RFC 2328 §16.2: for each non-self Summary-LSA with finite metric,
// check area-range coverage, resolve the advertising router via
// intra-area reachability only, and install/replace under the documented
// rules.
pub fn inter_area_pass<V: Version>(
    area: &Area<V>,
    candidate_prefix: ipnetwork::IpNetwork,
    candidate_metric: u32,
    adv_rtr: Ipv4Addr,
) -> Option<RouteEntry> {
    if candidate_metric >= LS_INFINITY {
        return None;
    }
    if let Some((_, range)) = area.covering_range(&candidate_prefix) {
        if range.advertise {
            return None;
        }
    }
    let rt = area.table.router_reachable_intra_area(adv_rtr)?;
    let cost = rt.cost + candidate_metric;
    Some(RouteEntry {
        path_type: PathType::InterArea,
        cost,
        type2_metric: 0,
        nexthops: rt.nexthops.clone(),
        adv_rtr,
        nssa_p_bit: false,
        discard: false,
    })
}

pub fn should_replace_inter_area(current: Option<&RouteEntry>, candidate: &RouteEntry) -> bool {
    match current {
        None => true,
        Some(cur) => match cur.path_type {
            PathType::Type1External | PathType::Type2External => true,
            PathType::InterArea => candidate.cost < cur.cost,
            PathType::IntraArea => false,
        },
    }
}

// RFC 2328 §16.3: evaluated only when computing the backbone's routing
// table and only for transit areas (`transit_capability` set, i.e. some
// Router-LSA in the area carries the V-bit). For an inter-area
// destination already reached via the backbone itself, check whether
// routing instead through one of the transit area's ABRs is cheaper.
pub fn transit_area_pass<V: Version>(
    transit_area: &Area<V>,
    abr: Ipv4Addr,
    candidate_metric: u32,
) -> Option<RouteEntry> {
    if !transit_area.transit_capability || candidate_metric >= LS_INFINITY {
        return None;
    }
    let rt = transit_area.table.router_reachable_intra_area(abr)?;
    let cost = rt.cost + candidate_metric;
    Some(RouteEntry {
        path_type: PathType::InterArea,
        cost,
        type2_metric: 0,
        nexthops: rt.nexthops.clone(),
        adv_rtr: abr,
        nssa_p_bit: false,
        discard: false,
    })
}

// A transit-area path only ever *improves* a destination already
// reachable as an inter-area route via the backbone; it never
// originates a new destination and never overrides an intra-area route.
pub fn should_replace_via_transit_area(
    current: Option<&RouteEntry>,
    candidate: &RouteEntry,
) -> bool {
    match current {
        Some(cur) => cur.path_type == PathType::InterArea && candidate.cost < cur.cost,
        None => false,
    }
}

// RFC 2328 §16.4 / RFC 3101 §2.5: AS-external and Type-7 installation
// partial order and tie-break rules.
pub fn as_external_better(
    candidate: &RouteEntry,
    current: &RouteEntry,
) -> bool {
    use PathType::*;
    match (candidate.path_type, current.path_type) {
        (IntraArea, IntraArea) | (InterArea, InterArea) => false,
        (a, b) if a < b => true,
        (a, b) if a > b => false,
        (Type1External, Type1External) => candidate.total_cost() < current.total_cost(),
        (Type2External, Type2External) => {
            match candidate.type2_metric.cmp(&current.type2_metric) {
                std::cmp::Ordering::Less => true,
                std::cmp::Ordering::Greater => false,
                std::cmp::Ordering::Equal => candidate.cost < current.cost,
            }
        }
        _ => false,
    }
}

// RFC 3101 §2.5.e tie-break for otherwise-equal AS-external candidates:
// prefer a Type-7 with the P-bit set over a Type-5, else higher
// advertising-router.
pub fn as_external_tie_break(candidate: &RouteEntry, current: &RouteEntry) -> bool {
    if candidate.nssa_p_bit != current.nssa_p_bit {
        return candidate.nssa_p_bit;
    }
    candidate.adv_rtr > current.adv_rtr
}

pub fn log_spf_start<V: Version>(area_id: u32) {
    Debug::SpfRunStart(area_id).log::<V>();
}

pub fn log_spf_finish<V: Version>(area_id: u32, nroutes: usize) {
    Debug::SpfRunFinish(area_id, nroutes).log::<V>();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::lsa::{LsaBody, LinkTarget, NetworkLsa, RouterLink, RouterLsa};
    use crate::version::Ospfv2;

    fn make_router_lsa(adv_rtr: Ipv4Addr, links: Vec<RouterLink>, flags: RouterLsaFlags) -> std::sync::Arc<crate::packet::lsa::Lsa> {
        let body = LsaBody::Router(RouterLsa { flags, links });
        std::sync::Arc::new(crate::packet::lsa::Lsa::new::<Ospfv2>(
            0, 0x02, adv_rtr, adv_rtr, crate::packet::lsa::LSA_INIT_SEQ_NO, body,
        ))
    }

    #[test]
    fn two_router_p2p_spf() {
        let a: Ipv4Addr = "1.1.1.1".parse().unwrap();
        let b: Ipv4Addr = "2.2.2.2".parse().unwrap();
        let mut lsdb: Lsdb<Ospfv2> = Lsdb::default();

        lsdb.add(make_router_lsa(
            a,
            vec![RouterLink {
                link_type: RouterLinkType::PointToPoint,
                metric: 10,
                target: LinkTarget::V2 { link_id: b, link_data: "10.0.0.1".parse().unwrap() },
            }],
            RouterLsaFlags::empty(),
        ));
        lsdb.add(make_router_lsa(
            b,
            vec![RouterLink {
                link_type: RouterLinkType::PointToPoint,
                metric: 10,
                target: LinkTarget::V2 { link_id: a, link_data: "10.0.0.2".parse().unwrap() },
            }],
            RouterLsaFlags::empty(),
        ));

        let result = run::<Ospfv2>(&lsdb, a);
        let peer = result.get(&VertexId::Router(b)).unwrap();
        assert_eq!(peer.cost, 10);
        assert_eq!(
            peer.nexthops,
            vec![Nexthop { addr: Some("10.0.0.2".parse().unwrap()), interface_id: None }]
        );
    }

    #[test]
    fn one_sided_link_is_not_bidirectional() {
        let a: Ipv4Addr = "1.1.1.1".parse().unwrap();
        let b: Ipv4Addr = "2.2.2.2".parse().unwrap();
        let mut lsdb: Lsdb<Ospfv2> = Lsdb::default();
        lsdb.add(make_router_lsa(
            a,
            vec![RouterLink {
                link_type: RouterLinkType::PointToPoint,
                metric: 10,
                target: LinkTarget::V2 { link_id: b, link_data: "10.0.0.1".parse().unwrap() },
            }],
            RouterLsaFlags::empty(),
        ));
        // B never advertises a reverse link.
        lsdb.add(make_router_lsa(b, vec![], RouterLsaFlags::empty()));

        let result = run::<Ospfv2>(&lsdb, a);
        assert!(result.get(&VertexId::Router(b)).is_none());
    }

    fn make_network_lsa(
        dr: Ipv4Addr,
        lsid: Ipv4Addr,
        mask: Ipv4Addr,
        attached_rtrs: Vec<Ipv4Addr>,
    ) -> std::sync::Arc<crate::packet::lsa::Lsa> {
        let body = LsaBody::Network(NetworkLsa {
            network_mask: Some(mask),
            options: None,
            attached_rtrs,
        });
        std::sync::Arc::new(crate::packet::lsa::Lsa::new::<Ospfv2>(
            0, 0x02, lsid, dr, crate::packet::lsa::LSA_INIT_SEQ_NO, body,
        ))
    }

    fn transit_link(dr_lsid: Ipv4Addr, own_addr: Ipv4Addr, metric: u16) -> RouterLink {
        RouterLink {
            link_type: RouterLinkType::Transit,
            metric,
            target: LinkTarget::V2 { link_id: dr_lsid, link_data: own_addr },
        }
    }

    // Root is a non-DR router on a shared transit network with two other
    // routers, one of which is the DR. Every neighbor's next-hop must be
    // its own address on the network, never the DR's, and the root's own
    // entry must stay at cost 0 rather than being overwritten via the
    // network's attached-router fan-out.
    #[test]
    fn transit_network_nexthops_resolve_to_each_router_own_address() {
        let r1: Ipv4Addr = "1.1.1.1".parse().unwrap();
        let r2_dr: Ipv4Addr = "2.2.2.2".parse().unwrap();
        let r3: Ipv4Addr = "3.3.3.3".parse().unwrap();
        let dr_lsid: Ipv4Addr = "10.0.0.2".parse().unwrap();
        let mask: Ipv4Addr = "255.255.255.0".parse().unwrap();

        let mut lsdb: Lsdb<Ospfv2> = Lsdb::default();
        lsdb.add(make_router_lsa(
            r1,
            vec![transit_link(dr_lsid, "10.0.0.1".parse().unwrap(), 10)],
            RouterLsaFlags::empty(),
        ));
        lsdb.add(make_router_lsa(
            r2_dr,
            vec![transit_link(dr_lsid, "10.0.0.2".parse().unwrap(), 10)],
            RouterLsaFlags::empty(),
        ));
        lsdb.add(make_router_lsa(
            r3,
            vec![transit_link(dr_lsid, "10.0.0.3".parse().unwrap(), 10)],
            RouterLsaFlags::empty(),
        ));
        lsdb.add(make_network_lsa(r2_dr, dr_lsid, mask, vec![r1, r2_dr, r3]));

        let result = run::<Ospfv2>(&lsdb, r1);

        let root = result.get(&VertexId::Router(r1)).unwrap();
        assert_eq!(root.cost, 0);

        let dr = result.get(&VertexId::Router(r2_dr)).unwrap();
        assert_eq!(dr.cost, 10);
        assert_eq!(
            dr.nexthops,
            vec![Nexthop { addr: Some("10.0.0.2".parse().unwrap()), interface_id: None }]
        );

        let other = result.get(&VertexId::Router(r3)).unwrap();
        assert_eq!(other.cost, 10);
        assert_eq!(
            other.nexthops,
            vec![Nexthop { addr: Some("10.0.0.3".parse().unwrap()), interface_id: None }]
        );

        let network = result.get(&VertexId::Network(dr_lsid)).unwrap();
        assert_eq!(network.cost, 10);

        let mut table = AreaRouteTable::default();
        install_intra_area::<Ospfv2>(&lsdb, &result, &mut table);
        let prefix: ipnetwork::IpNetwork = "10.0.0.0/24".parse().unwrap();
        let entry = table.networks.get(&prefix).expect("transit network route installed");
        assert_eq!(entry.cost, 10);
        assert_eq!(entry.adv_rtr, r2_dr);
    }

    #[test]
    fn transit_area_pass_only_improves_existing_inter_area_route() {
        let abr: Ipv4Addr = "3.3.3.3".parse().unwrap();
        let mut area: Area<Ospfv2> = Area::new(1, "1.1.1.1".parse().unwrap());
        area.transit_capability = true;
        area.table.routers.insert(
            abr,
            RouteEntry {
                path_type: PathType::IntraArea,
                cost: 5,
                type2_metric: 0,
                nexthops: vec![],
                adv_rtr: abr,
                nssa_p_bit: false,
                discard: false,
            },
        );

        let candidate = transit_area_pass(&area, abr, 3).unwrap();
        assert_eq!(candidate.cost, 8);

        let cheaper_existing = RouteEntry {
            path_type: PathType::InterArea,
            cost: 20,
            type2_metric: 0,
            nexthops: vec![],
            adv_rtr: abr,
            nssa_p_bit: false,
            discard: false,
        };
        assert!(should_replace_via_transit_area(Some(&cheaper_existing), &candidate));

        let already_better = RouteEntry { cost: 2, ..cheaper_existing };
        assert!(!should_replace_via_transit_area(Some(&already_better), &candidate));

        assert!(!should_replace_via_transit_area(None, &candidate));

        area.transit_capability = false;
        assert!(transit_area_pass(&area, abr, 3).is_none());
    }
}
