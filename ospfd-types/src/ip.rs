//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use ipnetwork::{IpNetwork, IpNetworkError, Ipv4Network, Ipv6Network};
use num_derive::{FromPrimitive, ToPrimitive};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

// Address Family identifier.
//
// IANA registry:
// http://www.iana.org/assignments/address-family-numbers
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
#[derive(FromPrimitive, ToPrimitive)]
#[derive(Deserialize, Serialize)]
pub enum AddressFamily {
    Ipv4 = 1,
    Ipv6 = 2,
}

// Container for storing separate values for IPv4 and IPv6.
#[derive(Debug, Default)]
pub struct AddressFamilies<T> {
    pub ipv4: T,
    pub ipv6: T,
}

// Extension methods for IpAddr.
pub trait IpAddrExt {
    // Returns length of the IP address in bytes.
    fn length(&self) -> usize;

    // Returns true if this is an usable unicast address.
    fn is_usable(&self) -> bool;

    // Returns true if this is a link-local unicast address.
    fn is_linklocal(&self) -> bool;

    // Converts this IP address into a host prefix network.
    fn to_host_prefix(&self) -> IpNetwork;

    // Returns an unspecified address of the given address family.
    fn unspecified(af: AddressFamily) -> IpAddr;
}

// Extension methods for Ipv4Addr.
pub trait Ipv4AddrExt {
    const LENGTH: usize;

    fn is_usable(&self) -> bool;
    fn to_host_prefix(&self) -> Ipv4Network;
}

// Extension methods for Ipv6Addr.
pub trait Ipv6AddrExt {
    const LENGTH: usize;

    fn is_usable(&self) -> bool;
    fn to_host_prefix(&self) -> Ipv6Network;
}

// Extension methods for IpNetwork.
pub trait IpNetworkExt {
    // Zeroes every bit beyond the prefix length.
    #[must_use]
    fn apply_mask(&self) -> IpNetwork;

    // Sets every bit beyond the prefix length, yielding the broadcast /
    // all-ones address of the network.
    #[must_use]
    fn set_host_bits(&self) -> IpNetwork;

    // Returns true if this is a routable (non-reserved, non-multicast)
    // network.
    fn is_routable(&self) -> bool;

    // Length, in bits, of the longest prefix shared between `self` and
    // `other`, capped at `min(self.prefix_len(), other.prefix_len())`.
    fn overlap(&self, other: &IpNetwork) -> u8;
}

// Extension methods for Ipv4Network.
pub trait Ipv4NetworkExt {
    const MAX_PREFIXLEN: u8;

    #[must_use]
    fn apply_mask(&self) -> Ipv4Network;
    #[must_use]
    fn set_host_bits(&self) -> Ipv4Network;
    fn is_host_prefix(&self) -> bool;
    fn is_routable(&self) -> bool;
    fn overlap(&self, other: &Ipv4Network) -> u8;
}

// Extension methods for Ipv6Network.
pub trait Ipv6NetworkExt {
    const MAX_PREFIXLEN: u8;

    #[must_use]
    fn apply_mask(&self) -> Ipv6Network;
    #[must_use]
    fn set_host_bits(&self) -> Ipv6Network;
    fn is_host_prefix(&self) -> bool;
    fn is_routable(&self) -> bool;
    fn overlap(&self, other: &Ipv6Network) -> u8;
}

pub trait IpAddrKind:
    std::fmt::Debug
    + std::fmt::Display
    + Clone
    + Copy
    + Eq
    + std::hash::Hash
    + Ord
    + PartialEq
    + PartialOrd
    + Send
    + Sync
    + DeserializeOwned
    + Serialize
    + Into<IpAddr>
{
    fn address_family(&self) -> AddressFamily;
    fn get(addr: IpAddr) -> Option<Self>;
    fn is_usable(&self) -> bool;
}

pub trait IpNetworkKind<I: IpAddrKind>:
    std::fmt::Debug
    + std::fmt::Display
    + Clone
    + Copy
    + Eq
    + std::hash::Hash
    + Ord
    + PartialEq
    + PartialOrd
    + Send
    + Sync
    + DeserializeOwned
    + Serialize
    + Into<IpNetwork>
{
    fn new(addr: I, prefix: u8) -> Result<Self, IpNetworkError>;
    fn default(af: AddressFamily) -> Self;
    fn address_family(&self) -> AddressFamily;
    fn get(prefix: IpNetwork) -> Option<Self>;
    fn prefix_len(&self) -> u8;
    fn contains(&self, ip: I) -> bool;
    fn is_supernet_of(self, other: Self) -> bool;
    fn ip(&self) -> I;
    fn mask(&self) -> I;
    #[must_use]
    fn apply_mask(&self) -> Self;
    fn is_routable(&self) -> bool;
    fn is_default(&self) -> bool {
        self.prefix_len() == 0
    }
}

// ===== impl AddressFamily =====

impl AddressFamily {
    pub fn addr_len(&self) -> usize {
        match self {
            AddressFamily::Ipv4 => Ipv4Addr::LENGTH,
            AddressFamily::Ipv6 => Ipv6Addr::LENGTH,
        }
    }

    pub fn max_prefixlen(&self) -> u8 {
        match self {
            AddressFamily::Ipv4 => Ipv4Network::MAX_PREFIXLEN,
            AddressFamily::Ipv6 => Ipv6Network::MAX_PREFIXLEN,
        }
    }
}

impl std::fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AddressFamily::Ipv4 => write!(f, "IPv4"),
            AddressFamily::Ipv6 => write!(f, "IPv6"),
        }
    }
}

// ===== impl AddressFamilies =====

impl<T> AddressFamilies<T> {
    pub fn get(&self, af: AddressFamily) -> &T {
        match af {
            AddressFamily::Ipv4 => &self.ipv4,
            AddressFamily::Ipv6 => &self.ipv6,
        }
    }

    pub fn get_mut(&mut self, af: AddressFamily) -> &mut T {
        match af {
            AddressFamily::Ipv4 => &mut self.ipv4,
            AddressFamily::Ipv6 => &mut self.ipv6,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (AddressFamily, &T)> {
        [
            (AddressFamily::Ipv4, &self.ipv4),
            (AddressFamily::Ipv6, &self.ipv6),
        ]
        .into_iter()
    }
}

// ===== impl IpAddr =====

impl IpAddrExt for IpAddr {
    fn length(&self) -> usize {
        match self {
            IpAddr::V4(_) => Ipv4Addr::LENGTH,
            IpAddr::V6(_) => Ipv6Addr::LENGTH,
        }
    }

    fn is_usable(&self) -> bool {
        match self {
            IpAddr::V4(addr) => Ipv4AddrExt::is_usable(addr),
            IpAddr::V6(addr) => Ipv6AddrExt::is_usable(addr),
        }
    }

    fn is_linklocal(&self) -> bool {
        match self {
            IpAddr::V4(addr) => addr.is_link_local(),
            IpAddr::V6(addr) => (addr.segments()[0] & 0xffc0) == 0xfe80,
        }
    }

    fn to_host_prefix(&self) -> IpNetwork {
        match self {
            IpAddr::V4(addr) => addr.to_host_prefix().into(),
            IpAddr::V6(addr) => addr.to_host_prefix().into(),
        }
    }

    fn unspecified(af: AddressFamily) -> IpAddr {
        match af {
            AddressFamily::Ipv4 => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            AddressFamily::Ipv6 => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
        }
    }
}

impl IpAddrKind for IpAddr {
    fn address_family(&self) -> AddressFamily {
        match self {
            IpAddr::V4(_) => AddressFamily::Ipv4,
            IpAddr::V6(_) => AddressFamily::Ipv6,
        }
    }

    fn get(addr: IpAddr) -> Option<Self> {
        Some(addr)
    }

    fn is_usable(&self) -> bool {
        IpAddrExt::is_usable(self)
    }
}

// ===== impl Ipv4Addr =====

impl Ipv4AddrExt for Ipv4Addr {
    const LENGTH: usize = 4;

    fn is_usable(&self) -> bool {
        !(self.is_loopback()
            || self.is_broadcast()
            || self.is_multicast()
            || self.is_unspecified())
    }

    fn to_host_prefix(&self) -> Ipv4Network {
        Ipv4Network::new(*self, Ipv4Network::MAX_PREFIXLEN).unwrap()
    }
}

impl IpAddrKind for Ipv4Addr {
    fn address_family(&self) -> AddressFamily {
        AddressFamily::Ipv4
    }

    fn get(addr: IpAddr) -> Option<Self> {
        match addr {
            IpAddr::V4(addr) => Some(addr),
            _ => None,
        }
    }

    fn is_usable(&self) -> bool {
        Ipv4AddrExt::is_usable(self)
    }
}

// ===== impl Ipv6Addr =====

impl Ipv6AddrExt for Ipv6Addr {
    const LENGTH: usize = 16;

    fn is_usable(&self) -> bool {
        !(self.is_loopback() || self.is_multicast() || self.is_unspecified())
    }

    fn to_host_prefix(&self) -> Ipv6Network {
        Ipv6Network::new(*self, Ipv6Network::MAX_PREFIXLEN).unwrap()
    }
}

impl IpAddrKind for Ipv6Addr {
    fn address_family(&self) -> AddressFamily {
        AddressFamily::Ipv6
    }

    fn get(addr: IpAddr) -> Option<Self> {
        match addr {
            IpAddr::V6(addr) => Some(addr),
            _ => None,
        }
    }

    fn is_usable(&self) -> bool {
        Ipv6AddrExt::is_usable(self)
    }
}

// ===== impl IpNetwork =====

impl IpNetworkExt for IpNetwork {
    fn apply_mask(&self) -> IpNetwork {
        match self {
            IpNetwork::V4(prefix) => {
                IpNetwork::V4(Ipv4NetworkExt::apply_mask(prefix))
            }
            IpNetwork::V6(prefix) => {
                IpNetwork::V6(Ipv6NetworkExt::apply_mask(prefix))
            }
        }
    }

    fn set_host_bits(&self) -> IpNetwork {
        match self {
            IpNetwork::V4(prefix) => {
                IpNetwork::V4(Ipv4NetworkExt::set_host_bits(prefix))
            }
            IpNetwork::V6(prefix) => {
                IpNetwork::V6(Ipv6NetworkExt::set_host_bits(prefix))
            }
        }
    }

    fn is_routable(&self) -> bool {
        match self {
            IpNetwork::V4(prefix) => Ipv4NetworkExt::is_routable(prefix),
            IpNetwork::V6(prefix) => Ipv6NetworkExt::is_routable(prefix),
        }
    }

    fn overlap(&self, other: &IpNetwork) -> u8 {
        match (self, other) {
            (IpNetwork::V4(a), IpNetwork::V4(b)) => a.overlap(b),
            (IpNetwork::V6(a), IpNetwork::V6(b)) => a.overlap(b),
            _ => 0,
        }
    }
}

impl IpNetworkKind<IpAddr> for IpNetwork {
    fn new(addr: IpAddr, prefix: u8) -> Result<Self, IpNetworkError> {
        IpNetwork::new(addr, prefix)
    }

    fn default(af: AddressFamily) -> Self {
        IpNetwork::new(IpAddr::unspecified(af), 0).unwrap()
    }

    fn address_family(&self) -> AddressFamily {
        match self {
            IpNetwork::V4(_) => AddressFamily::Ipv4,
            IpNetwork::V6(_) => AddressFamily::Ipv6,
        }
    }

    fn get(prefix: IpNetwork) -> Option<Self> {
        Some(prefix)
    }

    fn prefix_len(&self) -> u8 {
        IpNetwork::prefix(self)
    }

    fn contains(&self, ip: IpAddr) -> bool {
        IpNetwork::contains(self, ip)
    }

    fn is_supernet_of(self, other: Self) -> bool {
        match (self, other) {
            (IpNetwork::V4(a), IpNetwork::V4(b)) => {
                Ipv4Network::is_supernet_of(a, b)
            }
            (IpNetwork::V6(a), IpNetwork::V6(b)) => {
                Ipv6Network::is_supernet_of(a, b)
            }
            _ => false,
        }
    }

    fn ip(&self) -> IpAddr {
        IpNetwork::ip(self)
    }

    fn mask(&self) -> IpAddr {
        IpNetwork::mask(self)
    }

    fn apply_mask(&self) -> Self {
        IpNetworkExt::apply_mask(self)
    }

    fn is_routable(&self) -> bool {
        IpNetworkExt::is_routable(self)
    }
}

// ===== impl Ipv4Network =====

impl Ipv4NetworkExt for Ipv4Network {
    const MAX_PREFIXLEN: u8 = 32;

    fn apply_mask(&self) -> Ipv4Network {
        Ipv4Network::new(self.network(), self.prefix()).unwrap()
    }

    fn set_host_bits(&self) -> Ipv4Network {
        let mask = u32::from(self.mask());
        let broadcast = u32::from(self.network()) | !mask;
        Ipv4Network::new(Ipv4Addr::from(broadcast), self.prefix()).unwrap()
    }

    fn is_host_prefix(&self) -> bool {
        self.prefix() == Self::MAX_PREFIXLEN
    }

    fn is_routable(&self) -> bool {
        !self.ip().is_broadcast()
            && !self.ip().is_loopback()
            && !self.ip().is_multicast()
            // Treat addresses in the 240.0.0.0/4 block (reserved for future
            // use) as non-routable.
            && self.ip().octets()[0] < 240
    }

    fn overlap(&self, other: &Ipv4Network) -> u8 {
        let max = self.prefix().min(other.prefix());
        let a = u32::from(self.ip());
        let b = u32::from(other.ip());
        let common = (a ^ b).leading_zeros().min(max as u32);
        common as u8
    }
}

impl IpNetworkKind<Ipv4Addr> for Ipv4Network {
    fn new(addr: Ipv4Addr, prefix: u8) -> Result<Self, IpNetworkError> {
        Ipv4Network::new(addr, prefix)
    }

    fn default(_family: AddressFamily) -> Self {
        Ipv4Network::new(Ipv4Addr::UNSPECIFIED, 0).unwrap()
    }

    fn address_family(&self) -> AddressFamily {
        AddressFamily::Ipv4
    }

    fn get(prefix: IpNetwork) -> Option<Self> {
        match prefix {
            IpNetwork::V4(prefix) => Some(prefix),
            _ => None,
        }
    }

    fn prefix_len(&self) -> u8 {
        self.prefix()
    }

    fn contains(&self, ip: Ipv4Addr) -> bool {
        Ipv4Network::contains(*self, ip)
    }

    fn is_supernet_of(self, other: Self) -> bool {
        Ipv4Network::is_supernet_of(self, other)
    }

    fn ip(&self) -> Ipv4Addr {
        Ipv4Network::ip(*self)
    }

    fn mask(&self) -> Ipv4Addr {
        Ipv4Network::mask(*self)
    }

    fn apply_mask(&self) -> Self {
        Ipv4NetworkExt::apply_mask(self)
    }

    fn is_routable(&self) -> bool {
        Ipv4NetworkExt::is_routable(self)
    }
}

// ===== impl Ipv6Network =====

impl Ipv6NetworkExt for Ipv6Network {
    const MAX_PREFIXLEN: u8 = 128;

    fn apply_mask(&self) -> Ipv6Network {
        Ipv6Network::new(self.network(), self.prefix()).unwrap()
    }

    fn set_host_bits(&self) -> Ipv6Network {
        let mask = u128::from(self.mask());
        let bcast = u128::from(self.network()) | !mask;
        Ipv6Network::new(Ipv6Addr::from(bcast), self.prefix()).unwrap()
    }

    fn is_host_prefix(&self) -> bool {
        self.prefix() == Self::MAX_PREFIXLEN
    }

    fn is_routable(&self) -> bool {
        !self.ip().is_loopback()
            && !self.ip().is_multicast()
            && !self.ip().is_unicast_link_local()
    }

    fn overlap(&self, other: &Ipv6Network) -> u8 {
        let max = self.prefix().min(other.prefix());
        let a = u128::from(self.ip());
        let b = u128::from(other.ip());
        let common = (a ^ b).leading_zeros().min(max as u32);
        common as u8
    }
}

impl IpNetworkKind<Ipv6Addr> for Ipv6Network {
    fn new(addr: Ipv6Addr, prefix: u8) -> Result<Self, IpNetworkError> {
        Ipv6Network::new(addr, prefix)
    }

    fn default(_family: AddressFamily) -> Self {
        Ipv6Network::new(Ipv6Addr::UNSPECIFIED, 0).unwrap()
    }

    fn address_family(&self) -> AddressFamily {
        AddressFamily::Ipv6
    }

    fn get(prefix: IpNetwork) -> Option<Self> {
        match prefix {
            IpNetwork::V6(prefix) => Some(prefix),
            _ => None,
        }
    }

    fn prefix_len(&self) -> u8 {
        self.prefix()
    }

    fn contains(&self, ip: Ipv6Addr) -> bool {
        Ipv6Network::contains(self, ip)
    }

    fn is_supernet_of(self, other: Self) -> bool {
        Ipv6Network::is_supernet_of(self, other)
    }

    fn ip(&self) -> Ipv6Addr {
        Ipv6Network::ip(self)
    }

    fn mask(&self) -> Ipv6Addr {
        Ipv6Network::mask(self)
    }

    fn apply_mask(&self) -> Self {
        Ipv6NetworkExt::apply_mask(self)
    }

    fn is_routable(&self) -> bool {
        Ipv6NetworkExt::is_routable(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_caps_at_shorter_prefix() {
        let a: Ipv4Network = "10.0.1.0/24".parse().unwrap();
        let b: Ipv4Network = "10.0.2.0/24".parse().unwrap();
        assert_eq!(a.overlap(&b), 23);

        let c: Ipv4Network = "10.0.0.0/16".parse().unwrap();
        assert_eq!(a.overlap(&c), 16);
    }

    #[test]
    fn set_host_bits_fills_broadcast() {
        let net: Ipv4Network = "10.0.1.0/24".parse().unwrap();
        assert_eq!(net.set_host_bits().ip(), "10.0.1.255".parse::<Ipv4Addr>().unwrap());
    }
}
