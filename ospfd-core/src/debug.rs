//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::Ipv4Addr;

use tracing::debug;

use crate::packet::lsa::{Lsa, LsaKey};
use crate::version::Version;

// Loggable events, one variant per notable LSDB/flooding/origination/SPF
// transition. Kept separate from `Error` since none of these indicate a
// fault.
#[derive(Debug)]
pub enum Debug<'a> {
    LsaInstall(&'a Lsa),
    LsaUpdateInPlace(&'a LsaKey),
    LsaDiscard(&'a LsaKey, &'static str),
    LsaMinArrivalDiscard(&'a LsaKey),
    LsaSelfOriginated(&'a LsaKey),
    LsaFlush(&'a LsaKey),
    LsaRefresh(&'a LsaKey),
    LsaOriginate(&'a LsaKey),
    LsaSeqNoWrap(&'a LsaKey),
    LsaReincarnate(&'a LsaKey),
    FloodPublish(&'a LsaKey, usize),
    FloodAckDelayed(&'a LsaKey, Ipv4Addr),
    FloodAckDirect(&'a LsaKey, Ipv4Addr),
    SelfOriginationIntrusion(&'a LsaKey, Ipv4Addr),
    SpfRunStart(u32),
    SpfRunFinish(u32, usize),
    SpfUnreachableAsbr(Ipv4Addr),
    Nssa7To5Translate(&'a LsaKey),
    RouteAdd(&'a ipnetwork::IpNetwork),
    RouteReplace(&'a ipnetwork::IpNetwork),
    RouteDelete(&'a ipnetwork::IpNetwork),
}

impl Debug<'_> {
    pub fn log<V: Version>(&self) {
        match self {
            Debug::LsaInstall(lsa) => {
                let key = lsa.hdr.key();
                match serde_json::to_string(&lsa.body) {
                    Ok(body) => {
                        debug!(protocol = %V::PROTOCOL, ?key, %body, "installing LSA")
                    }
                    Err(_) => debug!(protocol = %V::PROTOCOL, ?key, "installing LSA"),
                }
            }
            Debug::LsaUpdateInPlace(key) => {
                debug!(protocol = %V::PROTOCOL, ?key, "updating LSA in place");
            }
            Debug::LsaDiscard(key, reason) => {
                debug!(protocol = %V::PROTOCOL, ?key, %reason, "discarding LSA");
            }
            Debug::LsaMinArrivalDiscard(key) => {
                debug!(protocol = %V::PROTOCOL, ?key, "discarding LSA received within MinLSArrival");
            }
            Debug::LsaSelfOriginated(key) => {
                debug!(protocol = %V::PROTOCOL, ?key, "LSA is self-originated");
            }
            Debug::LsaFlush(key) => {
                debug!(protocol = %V::PROTOCOL, ?key, "flushing LSA");
            }
            Debug::LsaRefresh(key) => {
                debug!(protocol = %V::PROTOCOL, ?key, "refreshing self-originated LSA");
            }
            Debug::LsaOriginate(key) => {
                debug!(protocol = %V::PROTOCOL, ?key, "originating LSA");
            }
            Debug::LsaSeqNoWrap(key) => {
                debug!(protocol = %V::PROTOCOL, ?key, "sequence number wrapped, MaxAging for reincarnation");
            }
            Debug::LsaReincarnate(key) => {
                debug!(protocol = %V::PROTOCOL, ?key, "reincarnating LSA with InitialSequenceNumber");
            }
            Debug::FloodPublish(key, npeers) => {
                debug!(protocol = %V::PROTOCOL, ?key, npeers, "publishing LSA to peers");
            }
            Debug::FloodAckDelayed(key, neighbor) => {
                debug!(protocol = %V::PROTOCOL, ?key, %neighbor, "scheduling delayed ack");
            }
            Debug::FloodAckDirect(key, neighbor) => {
                debug!(protocol = %V::PROTOCOL, ?key, %neighbor, "sending direct ack");
            }
            Debug::SelfOriginationIntrusion(key, origin) => {
                debug!(protocol = %V::PROTOCOL, ?key, %origin, "self-origination intrusion detected");
            }
            Debug::SpfRunStart(area_id) => {
                debug!(protocol = %V::PROTOCOL, area_id, "starting SPF run");
            }
            Debug::SpfRunFinish(area_id, nroutes) => {
                debug!(protocol = %V::PROTOCOL, area_id, nroutes, "SPF run finished");
            }
            Debug::SpfUnreachableAsbr(router_id) => {
                debug!(protocol = %V::PROTOCOL, %router_id, "ASBR unreachable, skipping its external routes");
            }
            Debug::Nssa7To5Translate(key) => {
                debug!(protocol = %V::PROTOCOL, ?key, "translating Type-7 to Type-5");
            }
            Debug::RouteAdd(prefix) => {
                debug!(protocol = %V::PROTOCOL, %prefix, "adding route");
            }
            Debug::RouteReplace(prefix) => {
                debug!(protocol = %V::PROTOCOL, %prefix, "replacing route");
            }
            Debug::RouteDelete(prefix) => {
                debug!(protocol = %V::PROTOCOL, %prefix, "deleting route");
            }
        }
    }
}
