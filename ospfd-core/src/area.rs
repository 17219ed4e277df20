//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::net::Ipv4Addr;

use crate::lsdb::Lsdb;
use crate::route::AreaRouteTable;
use crate::version::Version;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum AreaType {
    #[default]
    Normal,
    Stub,
    Nssa,
}

impl AreaType {
    pub fn is_stub_like(&self) -> bool {
        matches!(self, AreaType::Stub | AreaType::Nssa)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct AreaRange {
    pub advertise: bool,
}

#[derive(Clone, Debug, Default)]
pub struct AreaConfig {
    pub area_type: AreaType,
    // Default true; for Stub/NSSA, controls whether Type-3 Summary-LSAs
    // are imported from the backbone.
    pub summaries: bool,
    pub stub_default_announce: bool,
    pub stub_default_cost: u32,
    // NSSA: whether a locally redistributed route should be propagated
    // (translated to Type-5) by the elected ABR translator.
    pub nssa_translator_role: NssaTranslatorRole,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum NssaTranslatorRole {
    #[default]
    Candidate,
    Always,
    Never,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum NssaTranslatorState {
    #[default]
    Disabled,
    Elected,
}

pub struct Area<V> {
    pub area_id: u32,
    pub router_id: Ipv4Addr,
    pub config: AreaConfig,
    // Area-range prefixes keyed by the prefix itself for quick
    // longest-match suppression lookups during origination.
    pub ranges: BTreeMap<ipnetwork::IpNetwork, AreaRange>,
    // Remote router-ids of configured virtual-link peers.
    pub virtual_links: Vec<Ipv4Addr>,
    pub lsdb: Lsdb<V>,
    pub table: AreaRouteTable,
    // Set iff some Router-LSA in this area has the V-bit (virtual-link
    // endpoint), i.e. this area is a transit for a virtual link.
    pub transit_capability: bool,
    pub nssa_translator_state: NssaTranslatorState,
    _marker: PhantomData<V>,
}

impl<V> Area<V>
where
    V: Version,
{
    pub fn new(area_id: u32, router_id: Ipv4Addr) -> Self {
        Area {
            area_id,
            router_id,
            config: AreaConfig { summaries: true, ..Default::default() },
            ranges: BTreeMap::new(),
            virtual_links: Vec::new(),
            lsdb: Lsdb::default(),
            table: AreaRouteTable::default(),
            transit_capability: false,
            nssa_translator_state: NssaTranslatorState::Disabled,
            _marker: PhantomData,
        }
    }

    pub fn is_backbone(&self) -> bool {
        self.area_id == 0
    }

    // The area-range (if any) that covers `prefix`, chosen as the
    // longest (most specific) match.
    pub fn covering_range(
        &self,
        prefix: &ipnetwork::IpNetwork,
    ) -> Option<(&ipnetwork::IpNetwork, &AreaRange)> {
        use ospfd_types::ip::{IpNetworkExt, IpNetworkKind};

        self.ranges
            .iter()
            .filter(|(range, _)| {
                IpNetworkKind::is_supernet_of(**range, *prefix) || *range == prefix
            })
            .max_by_key(|(range, _)| IpNetworkExt::overlap(*range, prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::Ospfv2;

    #[test]
    fn covering_range_picks_longest_match() {
        let mut area: Area<Ospfv2> = Area::new(1, "1.1.1.1".parse().unwrap());
        area.ranges.insert("10.0.0.0/8".parse().unwrap(), AreaRange { advertise: true });
        area.ranges.insert("10.1.0.0/16".parse().unwrap(), AreaRange { advertise: false });

        let prefix = "10.1.2.0/24".parse().unwrap();
        let (range, matched) = area.covering_range(&prefix).unwrap();
        assert_eq!(*range, "10.1.0.0/16".parse::<ipnetwork::IpNetwork>().unwrap());
        assert!(!matched.advertise);
    }

    #[test]
    fn covering_range_none_when_disjoint() {
        let mut area: Area<Ospfv2> = Area::new(1, "1.1.1.1".parse().unwrap());
        area.ranges.insert("10.0.0.0/8".parse().unwrap(), AreaRange { advertise: true });

        let prefix = "192.168.1.0/24".parse().unwrap();
        assert!(area.covering_range(&prefix).is_none());
    }
}
