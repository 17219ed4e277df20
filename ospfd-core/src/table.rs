//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! Area routing table (C7): a prefix trie merging every area's
//! contribution for a destination into one deterministic winner, with
//! `begin`/`end`-framed transactions driving RIB deltas.

use std::collections::BTreeMap;

use ipnetwork::IpNetwork;
use prefix_trie::joint::map::JointPrefixMap;

use crate::debug::Debug;
use crate::rib::{RibClient, RibNexthop, RibRoute};
use crate::route::RouteEntry;
use crate::version::Version;

// One destination's per-area contributions. The winner is recomputed on
// every mutation (§4.5): lower path-type ordinal, then lower cost, then
// higher area-id.
#[derive(Debug, Default)]
pub struct InternalRouteEntry {
    pub by_area: BTreeMap<u32, RouteEntry>,
}

impl InternalRouteEntry {
    pub fn winner(&self) -> Option<(u32, &RouteEntry)> {
        self.by_area.iter().max_by(|(area_a, a), (area_b, b)| {
            // Reversed because we want *lower* path-type/cost to win but
            // *higher* area-id to win the final tie-break, and
            // `max_by` picks the greatest.
            b.path_type
                .cmp(&a.path_type)
                .then(b.total_cost().cmp(&a.total_cost()))
                .then(area_a.cmp(area_b))
        }).map(|(area, entry)| (*area, entry))
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum PendingDelta {
    Add,
    Replace,
    Delete,
}

// The fields of a winning route that matter to the RIB client; used to
// detect whether a recompute actually changed anything observable.
#[derive(Clone, Debug, Eq, PartialEq)]
struct RouteFingerprint {
    path_type: u32,
    cost: u32,
    nexthops: Vec<(Option<std::net::IpAddr>, Option<u32>)>,
}

fn fingerprint(route: &RouteEntry) -> RouteFingerprint {
    RouteFingerprint {
        path_type: route.path_type as u32,
        cost: route.total_cost(),
        nexthops: route.nexthops.iter().map(|nh| (nh.addr, nh.interface_id)).collect(),
    }
}

pub struct AreaRoutingTable {
    entries: JointPrefixMap<IpNetwork, InternalRouteEntry>,
    // Snapshot of each winner's fingerprint taken at `begin()`, keyed by
    // prefix; used to compute the add/replace/delete delta set at
    // `end()`.
    snapshot: Option<BTreeMap<IpNetwork, RouteFingerprint>>,
    in_transaction_area: Option<u32>,
}

impl Default for AreaRoutingTable {
    fn default() -> Self {
        AreaRoutingTable {
            entries: Default::default(),
            snapshot: None,
            in_transaction_area: None,
        }
    }
}

impl AreaRoutingTable {
    // Opens a transaction scoped to `area`; concurrent `begin()` from a
    // second area is disallowed.
    pub fn begin(&mut self, area: u32) {
        assert!(
            self.in_transaction_area.is_none(),
            "concurrent area-routing-table transaction"
        );
        self.in_transaction_area = Some(area);

        let mut snapshot = BTreeMap::new();
        for (prefix, entry) in self.entries.iter() {
            if let Some((_, route)) = entry.winner() {
                snapshot.insert(prefix, fingerprint(route));
            }
        }
        self.snapshot = Some(snapshot);
    }

    pub fn add(&mut self, prefix: IpNetwork, entry: RouteEntry) {
        let area = self.current_area();
        self.entries.entry(prefix).or_default().by_area.insert(area, entry);
    }

    pub fn replace(&mut self, prefix: IpNetwork, entry: RouteEntry) {
        self.add(prefix, entry);
    }

    pub fn delete(&mut self, prefix: IpNetwork) {
        let area = self.current_area();
        if let Some(internal) = self.entries.get_mut(&prefix) {
            internal.by_area.remove(&area);
        }
    }

    fn current_area(&self) -> u32 {
        self.in_transaction_area.expect("no open area-routing-table transaction")
    }

    // Diffs the current winners against the `begin()` snapshot and
    // pushes add/replace/delete to `rib`.
    pub fn end<V: Version>(&mut self, rib: &mut impl RibClient) {
        let snapshot = self.snapshot.take().expect("end() without begin()");
        self.in_transaction_area = None;

        let mut seen = std::collections::HashSet::new();
        for (prefix, entry) in self.entries.iter() {
            seen.insert(prefix);
            let winner = entry.winner();
            match (snapshot.get(&prefix), winner) {
                (None, Some((_, route))) => {
                    Debug::RouteAdd(&prefix).log::<V>();
                    let _ = rib.add_route(to_rib_route(prefix, route));
                }
                (Some(old), Some((_, route))) if *old != fingerprint(route) => {
                    Debug::RouteReplace(&prefix).log::<V>();
                    let _ = rib.replace_route(to_rib_route(prefix, route));
                }
                (Some(_), None) => {
                    Debug::RouteDelete(&prefix).log::<V>();
                    let _ = rib.delete_route(prefix);
                }
                _ => {}
            }
        }
        for prefix in snapshot.keys() {
            if !seen.contains(prefix) {
                Debug::RouteDelete(prefix).log::<V>();
                let _ = rib.delete_route(*prefix);
            }
        }
    }

    pub fn get(&self, prefix: &IpNetwork) -> Option<&InternalRouteEntry> {
        self.entries.get(prefix)
    }
}

fn to_rib_route(prefix: IpNetwork, route: &RouteEntry) -> RibRoute {
    RibRoute {
        prefix,
        nexthops: route
            .nexthops
            .iter()
            .map(|nh| RibNexthop { addr: nh.addr, interface_id: nh.interface_id })
            .collect(),
        metric: route.total_cost(),
        equal_cost: route.nexthops.len() > 1,
        discard: route.discard,
        tag: None,
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;
    use crate::route::PathType;
    use crate::version::Ospfv2;

    #[derive(Default)]
    struct RecordingRib {
        added: Vec<IpNetwork>,
        replaced: Vec<IpNetwork>,
        deleted: Vec<IpNetwork>,
    }

    impl RibClient for RecordingRib {
        fn add_route(&mut self, route: RibRoute) -> Result<(), crate::rib::RibError> {
            self.added.push(route.prefix);
            Ok(())
        }

        fn replace_route(&mut self, route: RibRoute) -> Result<(), crate::rib::RibError> {
            self.replaced.push(route.prefix);
            Ok(())
        }

        fn delete_route(&mut self, prefix: IpNetwork) -> Result<(), crate::rib::RibError> {
            self.deleted.push(prefix);
            Ok(())
        }
    }

    fn route(path_type: PathType, cost: u32, adv_rtr: Ipv4Addr) -> RouteEntry {
        RouteEntry {
            path_type,
            cost,
            type2_metric: 0,
            nexthops: vec![],
            adv_rtr,
            nssa_p_bit: false,
            discard: false,
        }
    }

    #[test]
    fn winner_prefers_lower_path_type_then_cost_then_higher_area() {
        let mut entry = InternalRouteEntry::default();
        let rid: Ipv4Addr = "1.1.1.1".parse().unwrap();
        entry.by_area.insert(0, route(PathType::InterArea, 10, rid));
        entry.by_area.insert(1, route(PathType::IntraArea, 20, rid));
        let (area, winner) = entry.winner().unwrap();
        assert_eq!(area, 1);
        assert_eq!(winner.path_type, PathType::IntraArea);

        let mut tie = InternalRouteEntry::default();
        tie.by_area.insert(0, route(PathType::IntraArea, 10, rid));
        tie.by_area.insert(2, route(PathType::IntraArea, 10, rid));
        let (area, _) = tie.winner().unwrap();
        assert_eq!(area, 2);
    }

    #[test]
    fn transaction_diffs_produce_add_replace_delete() {
        let rid: Ipv4Addr = "1.1.1.1".parse().unwrap();
        let prefix: IpNetwork = "10.0.0.0/24".parse().unwrap();
        let other: IpNetwork = "10.0.1.0/24".parse().unwrap();
        let mut table = AreaRoutingTable::default();
        let mut rib = RecordingRib::default();

        table.begin(0);
        table.add(prefix, route(PathType::IntraArea, 10, rid));
        table.end::<Ospfv2>(&mut rib);
        assert_eq!(rib.added, vec![prefix]);

        table.begin(0);
        table.add(prefix, route(PathType::IntraArea, 5, rid));
        table.add(other, route(PathType::IntraArea, 10, rid));
        table.end::<Ospfv2>(&mut rib);
        assert_eq!(rib.replaced, vec![prefix]);
        assert_eq!(rib.added, vec![prefix, other]);

        table.begin(0);
        table.delete(prefix);
        table.end::<Ospfv2>(&mut rib);
        assert_eq!(rib.deleted, vec![prefix]);
    }

    #[test]
    #[should_panic(expected = "concurrent area-routing-table transaction")]
    fn concurrent_begin_panics() {
        let mut table = AreaRoutingTable::default();
        table.begin(0);
        table.begin(1);
    }
}
