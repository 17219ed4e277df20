//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! External-LSA broker (C8): a process-wide, not per-area, store of
//! AS-External-LSAs. Model it as an explicit value owned by the
//! top-level `Instance` and passed by reference into each area, rather
//! than a singleton.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use ospfd_types::task::TimeoutTask;

use crate::packet::lsa::{Lsa, LsaKey};
use crate::tasks::LSA_REFRESH_TIME;
use crate::version::Version;

pub struct ExternalEntry {
    pub lsa: Arc<Lsa>,
    pub refresh_timer: Option<TimeoutTask>,
    // When a locally-redistributed route is suppressed in favor of a
    // better-advertised external route (RFC 2328 §12.4.4), the
    // suppressed LSA is stashed here until the suppressing route
    // disappears.
    pub suppressed_self: Option<Arc<Lsa>>,
}

// Process-wide AS-External-LSA store, fanned out to every non-stub area.
#[derive(Default)]
pub struct ExternalBroker<V> {
    entries: HashMap<LsaKey, ExternalEntry>,
    _marker: PhantomData<V>,
}

impl<V> ExternalBroker<V>
where
    V: Version,
{
    pub fn get(&self, key: &LsaKey) -> Option<&ExternalEntry> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &LsaKey) -> Option<&mut ExternalEntry> {
        self.entries.get_mut(key)
    }

    pub fn insert(&mut self, lsa: Arc<Lsa>) {
        let key = lsa.hdr.key();
        self.entries.insert(
            key,
            ExternalEntry { lsa, refresh_timer: None, suppressed_self: None },
        );
    }

    pub fn remove(&mut self, key: &LsaKey) -> Option<ExternalEntry> {
        self.entries.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LsaKey, &ExternalEntry)> {
        self.entries.iter()
    }

    // RFC 2328 §12.4.4: suppress the self-originated LSA `self_key` in
    // favor of an externally-advertised one, iff the external route's
    // forwarding address is reachable, its metric equals ours, and its
    // advertising router outranks ours.
    pub fn should_suppress_self(
        our_router_id: std::net::Ipv4Addr,
        self_metric: u32,
        external_metric: u32,
        external_adv_rtr: std::net::Ipv4Addr,
        fwd_addr_reachable: bool,
    ) -> bool {
        fwd_addr_reachable
            && external_metric == self_metric
            && external_adv_rtr > our_router_id
    }

    pub fn refresh_interval() -> std::time::Duration {
        std::time::Duration::from_secs(LSA_REFRESH_TIME)
    }
}
