//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! Downward interface: the RIB-client contract (§6). Routes are pushed
//! through import-policy filtering that lives outside this crate;
//! `RibClient` is the seam.

use std::net::IpAddr;

#[derive(Clone, Debug)]
pub struct RibNexthop {
    pub addr: Option<IpAddr>,
    pub interface_id: Option<u32>,
}

#[derive(Clone, Debug)]
pub struct RibRoute {
    pub prefix: ipnetwork::IpNetwork,
    pub nexthops: Vec<RibNexthop>,
    pub metric: u32,
    pub equal_cost: bool,
    pub discard: bool,
    pub tag: Option<u32>,
}

#[derive(Clone, Debug)]
pub struct RibError(pub String);

impl std::fmt::Display for RibError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for RibError {}

pub trait RibClient {
    fn add_route(&mut self, route: RibRoute) -> Result<(), RibError>;
    fn replace_route(&mut self, route: RibRoute) -> Result<(), RibError>;
    fn delete_route(&mut self, prefix: ipnetwork::IpNetwork) -> Result<(), RibError>;
}
