//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! Top-level per-instance state: the router ID, every configured area,
//! the process-wide external-LSA broker (C8), and the cross-area routing
//! table (C7) that merges each area's contribution before handing deltas
//! to the RIB client. `Instance` owns no socket or timer-runtime state of
//! its own beyond the SPF debounce timer; everything else upward
//! (interfaces, neighbors, DR election) lives behind [`crate::peer::PeerManager`].

use std::collections::{HashMap, HashSet};
use std::net::Ipv4Addr;
use std::sync::Arc;

use ospfd_types::task::TimeoutTask;
use tokio::sync::mpsc::UnboundedSender;

use crate::area::{Area, AreaConfig, AreaType, NssaTranslatorState};
use crate::broker::ExternalBroker;
use crate::collections::{AreaId, Areas};
use crate::flood::{self, ReceiveContext, ReceiveOutcome};
use crate::origination::{self, ExternalRoute};
use crate::packet::lsa::{Lsa, LsaBody, LsaType, RouterLsaFlags};
use crate::peer::{PeerId, PeerManager};
use crate::rib::RibClient;
use crate::route::{PathType, RouteEntry};
use crate::spf;
use crate::table::AreaRoutingTable;
use crate::tasks::{self, Event};
use crate::version::Version;

// AS-external routes aren't owned by any single area, but the cross-area
// table's transactions are keyed by area-id; reserve a sentinel key so
// they still flow through the same begin/add/end diffing as everything
// else instead of needing a parallel code path.
const EXTERNAL_AREA_KEY: u32 = u32::MAX;

pub struct Instance<V> {
    pub router_id: Ipv4Addr,
    pub areas: Areas<V>,
    pub broker: ExternalBroker<V>,
    pub table: AreaRoutingTable,
    // What each area (or `EXTERNAL_AREA_KEY`) last contributed to `table`,
    // so the next recompute knows which prefixes to withdraw.
    contributed: HashMap<u32, HashSet<ipnetwork::IpNetwork>>,
    spf_pending: HashSet<u32>,
    spf_delay_timer: Option<TimeoutTask>,
}

impl<V> Instance<V>
where
    V: Version,
{
    pub fn new(router_id: Ipv4Addr) -> Self {
        Instance {
            router_id,
            areas: Areas::default(),
            broker: ExternalBroker::default(),
            table: AreaRoutingTable::default(),
            contributed: HashMap::new(),
            spf_pending: HashSet::new(),
            spf_delay_timer: None,
        }
    }

    pub fn add_area(&mut self, area_id: u32, config: AreaConfig) -> AreaId {
        let mut area = Area::new(area_id, self.router_id);
        area.config = config;
        self.areas.insert(area)
    }

    pub fn remove_area(&mut self, id: AreaId) -> Option<Area<V>> {
        self.areas.remove(id)
    }

    pub fn area(&self, area_id: u32) -> Option<&Area<V>> {
        self.areas.iter().find(|(_, a)| a.area_id == area_id).map(|(_, a)| a)
    }

    pub fn area_mut(&mut self, area_id: u32) -> Option<&mut Area<V>> {
        self.areas.iter_mut().find(|(_, a)| a.area_id == area_id).map(|(_, a)| a)
    }

    // This crate has no notion of "active interface" of its own: the peer
    // layer is expected to keep an area out of `areas` once it has no
    // interfaces left in it, so "configured in more than one area" is
    // equivalent to the usual ABR definition here.
    pub fn is_abr(&self) -> bool {
        self.areas.iter().count() > 1
    }

    // ===== Inbound LSA handling (C4, delegated) =====

    pub fn receive_lsa(
        &mut self,
        area_id: u32,
        peer_mgr: &mut impl PeerManager<V>,
        peers: &[PeerId],
        ctx: &ReceiveContext,
        lsa: Lsa,
    ) -> Option<ReceiveOutcome> {
        let area = self.area_mut(area_id)?;
        Some(flood::receive(area, peer_mgr, peers, ctx, lsa))
    }

    // ===== Recompute scheduling (§4.4 debouncing / §5 timer kinds) =====

    pub fn schedule_recompute(&mut self, area_id: u32, tx: UnboundedSender<Event>) {
        self.spf_pending.insert(area_id);
        if self.spf_delay_timer.is_none() {
            self.spf_delay_timer =
                Some(tasks::spf_delay_timer(tasks::spf_default_delay(), tx));
        }
    }

    // Called once the debounce timer fires; drains and returns the set of
    // areas queued since it was armed.
    pub fn take_pending_recompute(&mut self) -> HashSet<u32> {
        self.spf_delay_timer = None;
        std::mem::take(&mut self.spf_pending)
    }

    // ===== Full recompute: SPF + post-passes + cross-area table push =====

    pub fn recompute<RC: RibClient>(
        &mut self,
        areas_dirty: &HashSet<u32>,
        rib: &mut RC,
    ) {
        for &area_id in areas_dirty {
            self.run_intra_area(area_id);
        }
        for &area_id in areas_dirty {
            self.run_inter_area(area_id);
        }
        // A backbone ABR schedules recompute of every transit area (§4.4);
        // since the transit pass only ever improves a route already
        // installed by the inter-area pass, running it unconditionally
        // after every dirty-area batch is equivalent and simpler.
        self.run_transit_area();
        self.run_as_external(rib);

        let area_ids: Vec<u32> = self.areas.iter().map(|(_, a)| a.area_id).collect();
        for area_id in area_ids {
            self.push_area_routes(area_id, rib);
        }
    }

    fn run_intra_area(&mut self, area_id: u32) {
        spf::log_spf_start::<V>(area_id);
        let Some(area) = self.area(area_id) else { return };
        let vertices = spf::run(&area.lsdb, self.router_id);
        let transit_capability = area
            .lsdb
            .iter_by_type(LsaType::Router)
            .filter(|(_, e)| !e.lsa.hdr.is_maxage())
            .filter_map(|(_, e)| e.lsa.body.as_router())
            .any(|r| r.flags.contains(RouterLsaFlags::V));
        let nroutes = vertices.len();

        if let Some(area) = self.area_mut(area_id) {
            spf::install_intra_area(&area.lsdb, &vertices, &mut area.table);
            area.transit_capability = transit_capability;
        }
        spf::log_spf_finish::<V>(area_id, nroutes);
    }

    // RFC 2328 §16.2, both Summary-Network (Type-3) and Summary-Router
    // (Type-4) destinations; the latter has no standalone pass in
    // `crate::spf` since its candidate has no area-range to check.
    fn run_inter_area(&mut self, area_id: u32) {
        let our_router_id = self.router_id;
        let Some(area) = self.area(area_id) else { return };

        let mut network_updates = Vec::new();
        for (_, entry) in area.lsdb.iter_by_type(LsaType::SummaryNetwork) {
            if entry.lsa.hdr.adv_rtr == our_router_id || entry.lsa.hdr.is_maxage() {
                continue;
            }
            let LsaBody::SummaryNetwork(summary) = &entry.lsa.body else { continue };
            let Some(candidate) = spf::inter_area_pass(
                area,
                summary.prefix,
                summary.metric,
                entry.lsa.hdr.adv_rtr,
            ) else {
                continue;
            };
            if spf::should_replace_inter_area(area.table.networks.get(&summary.prefix), &candidate) {
                network_updates.push((summary.prefix, candidate));
            }
        }

        let mut router_updates = Vec::new();
        for (_, entry) in area.lsdb.iter_by_type(LsaType::SummaryRouter) {
            if entry.lsa.hdr.adv_rtr == our_router_id || entry.lsa.hdr.is_maxage() {
                continue;
            }
            let LsaBody::SummaryRouter(summary) = &entry.lsa.body else { continue };
            if summary.metric >= spf::LS_INFINITY {
                continue;
            }
            let Some(rt) = area.table.router_reachable_intra_area(entry.lsa.hdr.adv_rtr) else {
                continue;
            };
            let candidate = RouteEntry {
                path_type: PathType::InterArea,
                cost: rt.cost + summary.metric,
                type2_metric: 0,
                nexthops: rt.nexthops.clone(),
                adv_rtr: entry.lsa.hdr.adv_rtr,
                nssa_p_bit: false,
                discard: false,
            };
            if spf::should_replace_inter_area(area.table.routers.get(&summary.dest_router_id), &candidate) {
                router_updates.push((summary.dest_router_id, candidate));
            }
        }

        if let Some(area) = self.area_mut(area_id) {
            for (prefix, route) in network_updates {
                area.table.networks.insert(prefix, route);
            }
            for (rid, route) in router_updates {
                area.table.routers.insert(rid, route);
            }
        }
    }

    // RFC 2328 §16.3, evaluated against the backbone's own table once
    // every transit area has finished its own intra-area SPF.
    fn run_transit_area(&mut self) {
        if !self.is_abr() {
            return;
        }
        let our_router_id = self.router_id;
        let Some(backbone) = self.area(0) else { return };

        let mut network_candidates = Vec::new();
        for (_, entry) in backbone.lsdb.iter_by_type(LsaType::SummaryNetwork) {
            if entry.lsa.hdr.adv_rtr == our_router_id || entry.lsa.hdr.is_maxage() {
                continue;
            }
            if let LsaBody::SummaryNetwork(s) = &entry.lsa.body {
                network_candidates.push((s.prefix, entry.lsa.hdr.adv_rtr, s.metric));
            }
        }
        let mut router_candidates = Vec::new();
        for (_, entry) in backbone.lsdb.iter_by_type(LsaType::SummaryRouter) {
            if entry.lsa.hdr.adv_rtr == our_router_id || entry.lsa.hdr.is_maxage() {
                continue;
            }
            if let LsaBody::SummaryRouter(s) = &entry.lsa.body {
                router_candidates.push((s.dest_router_id, entry.lsa.hdr.adv_rtr, s.metric));
            }
        }

        let transit_area_ids: Vec<u32> = self
            .areas
            .iter()
            .filter(|(_, a)| a.area_id != 0 && a.transit_capability)
            .map(|(_, a)| a.area_id)
            .collect();

        let mut network_updates = Vec::new();
        let mut router_updates = Vec::new();
        for transit_id in transit_area_ids {
            let Some(transit) = self.area(transit_id) else { continue };
            for &(prefix, abr, metric) in &network_candidates {
                let Some(candidate) = spf::transit_area_pass(transit, abr, metric) else { continue };
                let current = self.area(0).and_then(|b| b.table.networks.get(&prefix));
                if spf::should_replace_via_transit_area(current, &candidate) {
                    network_updates.push((prefix, candidate));
                }
            }
            for &(dest, abr, metric) in &router_candidates {
                let Some(candidate) = spf::transit_area_pass(transit, abr, metric) else { continue };
                let current = self.area(0).and_then(|b| b.table.routers.get(&dest));
                if spf::should_replace_via_transit_area(current, &candidate) {
                    router_updates.push((dest, candidate));
                }
            }
        }

        if let Some(backbone) = self.area_mut(0) {
            for (prefix, route) in network_updates {
                backbone.table.networks.insert(prefix, route);
            }
            for (dest, route) in router_updates {
                backbone.table.routers.insert(dest, route);
            }
        }
    }

    // RFC 2328 §16.4 / RFC 3101 §2.5: pick the single best AS-external (or
    // NSSA Type-7) candidate per destination across every attached area's
    // own database, then install the winner into the AS-wide slot of the
    // cross-area table. A forwarding address is resolved against the
    // area's own routing table via longest-prefix match, same as the
    // no-forwarding-address case resolves the ASBR itself.
    fn run_as_external<RC: RibClient>(&mut self, rib: &mut RC) {
        let mut raw: Vec<(ipnetwork::IpNetwork, RouteEntry)> = Vec::new();
        for (_, area) in self.areas.iter() {
            let lsa_type = if area.config.area_type == AreaType::Nssa {
                LsaType::Nssa
            } else {
                LsaType::AsExternal
            };
            for (_, entry) in area.lsdb.iter_by_type(lsa_type) {
                if entry.lsa.hdr.is_maxage() {
                    continue;
                }
                let Some(ext) = entry.lsa.body.as_external() else { continue };
                if ext.metric >= spf::LS_INFINITY {
                    continue;
                }
                let adv_rtr = entry.lsa.hdr.adv_rtr;
                let via = match ext.fwd_addr {
                    None => area.table.router_reachable(adv_rtr),
                    Some(fwd_addr) => area
                        .table
                        .longest_match_network(fwd_addr)
                        .map(|(_, route)| route),
                };
                let Some(asbr_rt) = via else {
                    crate::debug::Debug::SpfUnreachableAsbr(adv_rtr).log::<V>();
                    continue;
                };
                let candidate = RouteEntry {
                    path_type: if ext.is_type2() { PathType::Type2External } else { PathType::Type1External },
                    cost: asbr_rt.cost,
                    type2_metric: ext.metric,
                    nexthops: asbr_rt.nexthops.clone(),
                    adv_rtr,
                    nssa_p_bit: matches!(&entry.lsa.body, LsaBody::Nssa(n) if n.p_bit()),
                    discard: false,
                };
                raw.push((ext.prefix, candidate));
            }
        }

        let mut best: HashMap<ipnetwork::IpNetwork, RouteEntry> = HashMap::new();
        for (prefix, candidate) in raw {
            match best.get(&prefix) {
                None => {
                    best.insert(prefix, candidate);
                }
                Some(current) => {
                    let replace = if spf::as_external_better(&candidate, current) {
                        true
                    } else if spf::as_external_better(current, &candidate) {
                        false
                    } else {
                        spf::as_external_tie_break(&candidate, current)
                    };
                    if replace {
                        best.insert(prefix, candidate);
                    }
                }
            }
        }

        self.table.begin(EXTERNAL_AREA_KEY);
        let mut still = HashSet::new();
        for (prefix, route) in best {
            still.insert(prefix);
            self.table.add(prefix, route);
        }
        let previous = self.contributed.remove(&EXTERNAL_AREA_KEY).unwrap_or_default();
        for prefix in previous.difference(&still) {
            self.table.delete(*prefix);
        }
        self.contributed.insert(EXTERNAL_AREA_KEY, still);
        self.table.end::<V>(rib);
    }

    fn push_area_routes<RC: RibClient>(&mut self, area_id: u32, rib: &mut RC) {
        let Some(area) = self.area(area_id) else { return };
        let entries: Vec<_> = area.table.networks.iter().map(|(p, r)| (*p, r.clone())).collect();

        self.table.begin(area_id);
        let mut still = HashSet::new();
        for (prefix, route) in entries {
            still.insert(prefix);
            self.table.add(prefix, route);
        }
        let previous = self.contributed.remove(&area_id).unwrap_or_default();
        for prefix in previous.difference(&still) {
            self.table.delete(*prefix);
        }
        self.contributed.insert(area_id, still);
        self.table.end::<V>(rib);
    }

    // ===== Summary-LSA origination (ABR only) =====

    // `nexthop_in_area` tells whether `route`'s next-hop lies inside
    // `target_area` (would create a routing loop); that mapping depends on
    // interface-to-area assignment the peer layer owns, so it is supplied
    // by the caller rather than guessed at here.
    pub fn originate_summaries(&mut self, nexthop_in_area: impl Fn(&RouteEntry, u32) -> bool) {
        if !self.is_abr() {
            return;
        }
        let our_router_id = self.router_id;
        let area_ids: Vec<u32> = self.areas.iter().map(|(_, a)| a.area_id).collect();

        struct NetworkJob {
            target: u32,
            prefix: ipnetwork::IpNetwork,
            metric: u32,
        }
        struct RouterJob {
            target: u32,
            dest: Ipv4Addr,
            metric: u32,
        }
        let mut network_jobs: Vec<NetworkJob> = Vec::new();
        let mut router_jobs: Vec<RouterJob> = Vec::new();

        for &source_id in &area_ids {
            let Some(source) = self.area(source_id) else { continue };
            for &target_id in &area_ids {
                if source_id == target_id {
                    continue;
                }
                let Some(target) = self.area(target_id) else { continue };

                for (prefix, route) in &source.table.networks {
                    if origination::should_originate_summary_into(
                        source,
                        target,
                        *prefix,
                        route,
                        false,
                        nexthop_in_area(route, target_id),
                    ) {
                        network_jobs.push(NetworkJob {
                            target: target_id,
                            prefix: *prefix,
                            metric: route.total_cost(),
                        });
                    }
                }

                if target.config.area_type.is_stub_like() {
                    continue;
                }
                for (dest, route) in &source.table.routers {
                    if route.path_type != PathType::IntraArea {
                        continue;
                    }
                    let is_asbr = source
                        .lsdb
                        .iter_by_type(LsaType::Router)
                        .filter(|(_, e)| e.lsa.hdr.adv_rtr == *dest && !e.lsa.hdr.is_maxage())
                        .filter_map(|(_, e)| e.lsa.body.as_router())
                        .any(|r| r.flags.contains(RouterLsaFlags::E));
                    if !is_asbr
                        || origination::should_suppress_summary(route)
                        || nexthop_in_area(route, target_id)
                    {
                        continue;
                    }
                    router_jobs.push(RouterJob {
                        target: target_id,
                        dest: *dest,
                        metric: route.total_cost(),
                    });
                }
            }
        }

        for job in network_jobs {
            if let Some(target) = self.area_mut(job.target) {
                origination::originate_summary_network(target, our_router_id, job.prefix, job.metric);
            }
        }
        for job in router_jobs {
            if let Some(target) = self.area_mut(job.target) {
                origination::originate_summary_router(target, our_router_id, job.dest, job.metric);
            }
        }
    }

    // For every advertised area-range with at least one covered intra-area
    // network route, originate a single aggregate Summary-LSA for the
    // range itself into every other area, with metric equal to the
    // largest cost among the routes it covers (RFC 2328 §12.4.3). The
    // constituent routes remain suppressed via `covered_by_area_range` in
    // `should_originate_summary_into`, called from `originate_summaries`.
    pub fn originate_area_ranges(&mut self) {
        if !self.is_abr() {
            return;
        }
        let our_router_id = self.router_id;
        let area_ids: Vec<u32> = self.areas.iter().map(|(_, a)| a.area_id).collect();

        struct RangeJob {
            source: u32,
            prefix: ipnetwork::IpNetwork,
            metric: u32,
        }
        let mut jobs: Vec<RangeJob> = Vec::new();

        for &source_id in &area_ids {
            let Some(source) = self.area(source_id) else { continue };
            for (&range_prefix, range) in &source.ranges {
                if !origination::should_advertise_range(range) {
                    continue;
                }
                let metric = source
                    .table
                    .networks
                    .iter()
                    .filter(|(prefix, _)| {
                        source
                            .covering_range(prefix)
                            .is_some_and(|(r, _)| *r == range_prefix)
                    })
                    .map(|(_, route)| route.total_cost())
                    .max();
                if let Some(metric) = metric {
                    jobs.push(RangeJob { source: source_id, prefix: range_prefix, metric });
                }
            }
        }

        for job in jobs {
            for &target_id in &area_ids {
                if target_id == job.source {
                    continue;
                }
                if let Some(target) = self.area_mut(target_id) {
                    origination::originate_summary_network(target, our_router_id, job.prefix, job.metric);
                }
            }
        }
    }

    // ===== AS-external redistribution (RFC 2328 §12.4.4) =====

    // Installs (or withdraws the suppression of) a self-originated
    // AS-External-LSA for `route`, then fans the result into every
    // non-stub area's own database so each area's own `run_as_external`
    // sees it. `reachable_fwd_addr` resolves whether a competing route's
    // forwarding address is reachable, another peer-layer fact.
    pub fn redistribute(&mut self, route: &ExternalRoute, reachable_fwd_addr: impl Fn(Option<std::net::IpAddr>) -> bool) {
        let our_router_id = self.router_id;
        let competing = self.broker.iter().find(|(k, e)| {
            k.adv_rtr != our_router_id
                && !e.lsa.hdr.is_maxage()
                && matches!(e.lsa.body.as_external(), Some(a) if a.prefix == route.prefix)
        });
        let suppress = match competing {
            Some((k, e)) => {
                let ext = e.lsa.body.as_external().expect("matched above");
                ExternalBroker::<V>::should_suppress_self(
                    our_router_id,
                    route.metric,
                    ext.metric,
                    k.adv_rtr,
                    reachable_fwd_addr(ext.fwd_addr),
                )
            }
            None => false,
        };

        if let Some(lsa) = origination::announce_external(&mut self.broker, our_router_id, route, suppress) {
            self.install_external_everywhere(lsa);
        }
    }

    // Originates a locally-redistributed route as an NSSA Type-7 in
    // `area_id`, always with the P-bit set (this router always wants its
    // own redistributed routes propagated out of the NSSA, per RFC 3101
    // §3.2).
    pub fn redistribute_into_nssa(&mut self, area_id: u32, route: &ExternalRoute) {
        let our_router_id = self.router_id;
        let Some(area) = self.area_mut(area_id) else { return };
        if area.config.area_type != AreaType::Nssa {
            return;
        }
        origination::originate_nssa(area, our_router_id, route, true);
    }

    // Re-elects `area_id`'s NSSA translator and, if newly elected,
    // translates every P-bit Type-7 currently in its database into a
    // Type-5 fed into the process-wide broker and every non-stub area.
    pub fn elect_and_translate(&mut self, area_id: u32, other_candidates: &[Ipv4Addr]) {
        let our_router_id = self.router_id;
        let role = match self.area(area_id) {
            Some(a) if a.config.area_type == AreaType::Nssa => a.config.nssa_translator_role,
            _ => return,
        };
        let state = origination::elect_nssa_translator(role, our_router_id, other_candidates);
        if let Some(area) = self.area_mut(area_id) {
            area.nssa_translator_state = state;
        }
        if state != NssaTranslatorState::Elected {
            return;
        }

        let translations: Vec<Arc<Lsa>> = match self.area(area_id) {
            Some(area) => area
                .lsdb
                .iter_by_type(LsaType::Nssa)
                .filter_map(|(_, e)| origination::translate_7_to_5(&self.broker, &e.lsa, our_router_id))
                .collect(),
            None => return,
        };
        for lsa in translations {
            self.broker.insert(lsa.clone());
            self.install_external_everywhere(lsa);
        }
    }

    fn install_external_everywhere(&mut self, lsa: Arc<Lsa>) {
        let key = lsa.hdr.key();
        for (_, area) in self.areas.iter_mut() {
            if area.config.area_type.is_stub_like() {
                continue;
            }
            match area.lsdb.find(&key) {
                Some(id) => area.lsdb.update_in_place(id, lsa.clone()),
                None => {
                    area.lsdb.add(lsa.clone());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::lsa::{LinkTarget, RouterLink, RouterLinkType, LSA_INIT_SEQ_NO};
    use crate::rib::{RibError, RibRoute};
    use crate::version::Ospfv2;

    #[derive(Default)]
    struct MockRib {
        routes: HashMap<ipnetwork::IpNetwork, RibRoute>,
    }

    impl RibClient for MockRib {
        fn add_route(&mut self, route: RibRoute) -> Result<(), RibError> {
            self.routes.insert(route.prefix, route);
            Ok(())
        }

        fn replace_route(&mut self, route: RibRoute) -> Result<(), RibError> {
            self.routes.insert(route.prefix, route);
            Ok(())
        }

        fn delete_route(&mut self, prefix: ipnetwork::IpNetwork) -> Result<(), RibError> {
            self.routes.remove(&prefix);
            Ok(())
        }
    }

    fn router_lsa(adv_rtr: Ipv4Addr, links: Vec<RouterLink>) -> Arc<Lsa> {
        let body = LsaBody::Router(crate::packet::lsa::RouterLsa { flags: RouterLsaFlags::empty(), links });
        Arc::new(Lsa::new::<Ospfv2>(0, 0x02, adv_rtr, adv_rtr, LSA_INIT_SEQ_NO, body))
    }

    #[test]
    fn recompute_installs_intra_area_host_route() {
        let our: Ipv4Addr = "1.1.1.1".parse().unwrap();
        let peer: Ipv4Addr = "2.2.2.2".parse().unwrap();

        let mut instance: Instance<Ospfv2> = Instance::new(our);
        instance.add_area(0, AreaConfig { summaries: true, ..Default::default() });

        {
            let area = instance.area_mut(0).unwrap();
            area.lsdb.add(router_lsa(
                our,
                vec![RouterLink {
                    link_type: RouterLinkType::PointToPoint,
                    metric: 10,
                    target: LinkTarget::V2 { link_id: peer, link_data: "10.0.0.1".parse().unwrap() },
                }],
            ));
            area.lsdb.add(router_lsa(
                peer,
                vec![RouterLink {
                    link_type: RouterLinkType::PointToPoint,
                    metric: 10,
                    target: LinkTarget::V2 { link_id: our, link_data: "10.0.0.2".parse().unwrap() },
                }],
            ));
        }

        let mut dirty = HashSet::new();
        dirty.insert(0);
        let mut rib = MockRib::default();
        instance.recompute(&dirty, &mut rib);

        let area = instance.area(0).unwrap();
        assert_eq!(area.table.routers.get(&peer).unwrap().cost, 10);
    }

    #[test]
    fn run_inter_area_installs_summary_route() {
        let our: Ipv4Addr = "1.1.1.1".parse().unwrap();
        let abr: Ipv4Addr = "3.3.3.3".parse().unwrap();
        let prefix: ipnetwork::IpNetwork =
            ipnetwork::IpNetwork::V4("192.0.2.0/24".parse().unwrap());

        let mut instance: Instance<Ospfv2> = Instance::new(our);
        instance.add_area(1, AreaConfig { summaries: true, ..Default::default() });

        {
            let area = instance.area_mut(1).unwrap();
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
            let lsid: Ipv4Addr = "192.0.2.0".parse().unwrap();
            let body = LsaBody::SummaryNetwork(crate::packet::lsa::SummaryNetworkLsa { prefix, metric: 7 });
            area.lsdb.add(Arc::new(Lsa::new::<Ospfv2>(0, 0, lsid, abr, LSA_INIT_SEQ_NO, body)));
        }

        instance.run_inter_area(1);

        let route = instance.area(1).unwrap().table.networks.get(&prefix).unwrap();
        assert_eq!(route.cost, 12);
        assert_eq!(route.path_type, PathType::InterArea);
    }

    #[test]
    fn is_abr_requires_more_than_one_area() {
        let our: Ipv4Addr = "1.1.1.1".parse().unwrap();
        let mut instance: Instance<Ospfv2> = Instance::new(our);
        assert!(!instance.is_abr());
        instance.add_area(0, AreaConfig::default());
        assert!(!instance.is_abr());
        instance.add_area(1, AreaConfig::default());
        assert!(instance.is_abr());
    }
}
