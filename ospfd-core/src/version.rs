//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! Address-family specialization.
//!
//! Factors the version-independent flooding and LSDB logic into a single
//! generic implementation parameterized by this trait, rather than
//! duplicating it per address family. `Version` is trimmed to the handful
//! of axes OSPFv2 and OSPFv3 actually vary on: address width, Link-LSA /
//! Intra-Area-Prefix-LSA applicability, and the v2-only
//! self-origination-by-interface check.

use std::net::Ipv4Addr;

use ospfd_types::ip::{AddressFamily, IpAddrKind, IpNetworkKind};

// OSPF version-specific behavior.
pub trait Version
where
    Self: 'static + Send + Sync + Clone + Copy + Default + Eq + std::fmt::Debug,
{
    const PROTOCOL: &'static str;
    const ADDRESS_FAMILY: AddressFamily;

    // Whether this version carries Link-LSAs and Intra-Area-Prefix-LSAs
    // (OSPFv3 only; a no-op for OSPFv2).
    const HAS_LINK_LSA: bool;

    type NetIpAddr: IpAddrKind;
    type IpNetwork: IpNetworkKind<Self::NetIpAddr>;

    // RFC 2328 §13's self-origination check also fires when a received
    // Network-LSA's Link State ID equals one of our own interface
    // addresses. This only makes sense in OSPFv2, where the Network-LSA's
    // LSID *is* an IP address; in OSPFv3 it is a locally assigned
    // interface identifier with no such collision to check for.
    fn network_lsa_self_orig_by_interface() -> bool;
}

// OSPFv2 (RFC 2328, IPv4).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Ospfv2();

impl Version for Ospfv2 {
    const PROTOCOL: &'static str = "OSPFv2";
    const ADDRESS_FAMILY: AddressFamily = AddressFamily::Ipv4;
    const HAS_LINK_LSA: bool = false;

    type NetIpAddr = Ipv4Addr;
    type IpNetwork = ipnetwork::Ipv4Network;

    fn network_lsa_self_orig_by_interface() -> bool {
        true
    }
}

// OSPFv3 (RFC 5340, IPv6).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Ospfv3();

impl Version for Ospfv3 {
    const PROTOCOL: &'static str = "OSPFv3";
    const ADDRESS_FAMILY: AddressFamily = AddressFamily::Ipv6;
    const HAS_LINK_LSA: bool = true;

    type NetIpAddr = std::net::IpAddr;
    type IpNetwork = ipnetwork::IpNetwork;

    fn network_lsa_self_orig_by_interface() -> bool {
        false
    }
}
