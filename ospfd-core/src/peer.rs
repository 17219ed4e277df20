//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! Upward interface: what the core consumes from the peer/interface
//! layer (Hello/DD/LSR neighbor state machines, socket I/O, DR
//! election), none of which lives in this crate.

use std::net::Ipv4Addr;

use crate::packet::lsa::Lsa;
use crate::version::Version;

// Opaque identifiers handed to us by the peer layer; this crate never
// interprets them beyond equality.
pub type PeerId = u32;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VirtualLinkError {
    ThroughStubArea,
    ThroughNssa,
    NoCommonInterface,
}

pub trait PeerManager<V: Version> {
    fn router_id(&self) -> Ipv4Addr;

    fn get_interface_id(&self, peer: PeerId) -> Option<u32>;

    fn get_attached_routers(&self, peer: PeerId, area: u32) -> Vec<Ipv4Addr>;

    fn get_neighbour_address(
        &self,
        router_id: Ipv4Addr,
        interface_id: u32,
    ) -> Option<V::NetIpAddr>;

    // OSPFv2 self-origination check: is `addr` configured on one of our
    // own interfaces?
    fn known_interface_address(&self, addr: Ipv4Addr) -> bool;

    fn configured_network(&self, addr: V::NetIpAddr) -> Option<V::IpNetwork>;

    // Enqueues `lsa` for transmission on `peer`'s retransmission list.
    // Returns whether the LSA was observed multicast back to us on the
    // peer it arrived from (used to suppress an explicit ack).
    fn queue_lsa(
        &mut self,
        peer: PeerId,
        origin_peer: Option<PeerId>,
        origin_neighbor: Option<Ipv4Addr>,
        lsa: &Lsa,
    ) -> bool;

    fn push_lsas(&mut self, peer: PeerId);

    fn on_link_state_request_list(
        &self,
        peer: PeerId,
        area: u32,
        neighbour: Ipv4Addr,
        lsa: &Lsa,
    ) -> bool;

    fn send_lsa(&mut self, peer: PeerId, area: u32, neighbour: Ipv4Addr, lsa: &Lsa);

    fn up_virtual_link(
        &mut self,
        remote_router_id: Ipv4Addr,
        local: V::NetIpAddr,
        cost: u16,
        remote: V::NetIpAddr,
    ) -> Result<(), VirtualLinkError>;

    fn down_virtual_link(&mut self, remote_router_id: Ipv4Addr);

    fn area_range_covered(&self, area: u32, net: V::IpNetwork) -> bool;
}
