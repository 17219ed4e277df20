//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! OSPF routing-daemon core: per-area Link State Database, reliable LSA
//! flooding, area routing computation, and LSA origination, for both
//! OSPFv2 and OSPFv3 (including NSSA). Hello/DD/LSR neighbor state
//! machines, socket I/O, DR election and northbound configuration all
//! live above this crate, behind the [`peer::PeerManager`] and
//! [`rib::RibClient`] seams.

#![cfg_attr(feature = "testing", allow(dead_code, unused_variables, unused_imports))]

pub mod area;
pub mod broker;
pub mod collections;
pub mod debug;
pub mod error;
pub mod flood;
pub mod instance;
pub mod lsdb;
pub mod origination;
pub mod packet;
pub mod peer;
pub mod rib;
pub mod route;
pub mod spf;
pub mod table;
pub mod tasks;
pub mod version;
