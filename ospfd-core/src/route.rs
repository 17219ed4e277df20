//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! Per-area routing entries produced by SPF and its post-passes (C6).
//! The cross-area merge these feed into lives in [`crate::table`] (C7).

use std::collections::{BTreeMap, HashMap};
use std::net::{IpAddr, Ipv4Addr};

// Route path type, ordered cheapest-preferred per RFC 2328 §11.1 / RFC
// 3101 §2.5: intra-area < inter-area < type-1 external < type-2 external.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum PathType {
    IntraArea,
    InterArea,
    Type1External,
    Type2External,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Nexthop {
    pub addr: Option<IpAddr>,
    pub interface_id: Option<u32>,
}

// A single area's routing-table entry for a destination (network or
// router).
#[derive(Clone, Debug)]
pub struct RouteEntry {
    pub path_type: PathType,
    // For Type2External, `cost` holds X (cost to the forwarding
    // address/ASBR) and `type2_metric` holds Y (the external metric);
    // for every other path type `type2_metric` is unused.
    pub cost: u32,
    pub type2_metric: u32,
    pub nexthops: Vec<Nexthop>,
    // Advertising router of the LSA that produced this entry (used for
    // SPF tie-breaking and RFC 3101 §2.5.e tie-breaking).
    pub adv_rtr: Ipv4Addr,
    // Set when the LSA that produced this entry is a Type-7 with the
    // P-bit set (needed for the Type-7-over-Type-5 tie-break).
    pub nssa_p_bit: bool,
    pub discard: bool,
}

impl RouteEntry {
    // Total comparable cost for ordering within a path type.
    pub fn total_cost(&self) -> u32 {
        match self.path_type {
            PathType::Type1External => self.cost + self.type2_metric,
            PathType::Type2External => self.type2_metric,
            _ => self.cost,
        }
    }
}

// Per-area table: one area's view of reachable networks (keyed by
// prefix) and routers (keyed by router-id, used by the inter-area and
// AS-external post-passes to resolve ABR/ASBR reachability).
#[derive(Debug, Default)]
pub struct AreaRouteTable {
    pub networks: HashMap<ipnetwork::IpNetwork, RouteEntry>,
    pub routers: BTreeMap<Ipv4Addr, RouteEntry>,
}

impl AreaRouteTable {
    pub fn clear(&mut self) {
        self.networks.clear();
        self.routers.clear();
    }

    pub fn router_reachable_intra_area(&self, router_id: Ipv4Addr) -> Option<&RouteEntry> {
        self.routers
            .get(&router_id)
            .filter(|entry| entry.path_type == PathType::IntraArea)
    }

    pub fn router_reachable(&self, router_id: Ipv4Addr) -> Option<&RouteEntry> {
        self.routers.get(&router_id)
    }

    // Longest-prefix match of `addr` among this area's own network
    // routes, used to resolve an AS-external LSA's forwarding address to
    // the route that actually carries traffic to it (RFC 2328 §16.4).
    pub fn longest_match_network(
        &self,
        addr: IpAddr,
    ) -> Option<(&ipnetwork::IpNetwork, &RouteEntry)> {
        use ospfd_types::ip::IpNetworkKind;

        self.networks
            .iter()
            .filter(|(prefix, _)| prefix.contains(addr))
            .max_by_key(|(prefix, _)| prefix.prefix_len())
    }
}
