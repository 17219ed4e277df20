//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! Deferred work. The four timer kinds the core schedules, all built on
//! top of `ospfd_types::task::{TimeoutTask, IntervalTask}`: dropping the
//! handle cancels the timer, so an LSA or area never outlives its timers.

use std::time::Duration;

use ospfd_types::task::TimeoutTask;
use tokio::sync::mpsc::UnboundedSender;

use crate::lsdb::LSA_MAX_AGE;
use crate::packet::lsa::LsaKey;

pub const LSA_REFRESH_TIME: u64 = 1800;
pub const MIN_LS_INTERVAL: u64 = 5;
pub const SPF_DELAY: u64 = 1;

#[derive(Debug)]
pub enum Event {
    LsaMaxAge(LsaKey),
    LsaRefresh(LsaKey),
    FloodDelayExpire,
    SpfRun,
}

// Per-LSA age timer, firing when the LSA reaches MaxAge.
pub fn lsa_maxage_timer(key: LsaKey, tx: UnboundedSender<Event>) -> TimeoutTask {
    TimeoutTask::new(Duration::from_secs(LSA_MAX_AGE as u64), move || async move {
        let _ = tx.send(Event::LsaMaxAge(key));
    })
}

// Per-self-LSA refresh timer, firing at LSRefreshTime.
pub fn lsa_refresh_timer(key: LsaKey, tx: UnboundedSender<Event>) -> TimeoutTask {
    TimeoutTask::new(Duration::from_secs(LSA_REFRESH_TIME), move || async move {
        let _ = tx.send(Event::LsaRefresh(key));
    })
}

// Flood-delay one-shot enforcing MinLSInterval between origination
// announcements for a given LSA.
pub fn flood_delay_timer(tx: UnboundedSender<Event>) -> TimeoutTask {
    TimeoutTask::new(Duration::from_secs(MIN_LS_INTERVAL), move || async move {
        let _ = tx.send(Event::FloodDelayExpire);
    })
}

// Routing-recompute one-shot (default 1 s debounce).
pub fn spf_delay_timer(delay: Duration, tx: UnboundedSender<Event>) -> TimeoutTask {
    TimeoutTask::new(delay, move || async move {
        let _ = tx.send(Event::SpfRun);
    })
}

pub fn spf_default_delay() -> Duration {
    Duration::from_secs(SPF_DELAY)
}
