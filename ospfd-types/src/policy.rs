//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use serde::{Deserialize, Serialize};

// Outcome of an import/export policy evaluation.
//
// The core never evaluates policy itself; this type is the shape of the
// verdict an external policy engine hands back across that boundary.
#[derive(Debug)]
#[derive(Deserialize, Serialize)]
pub enum PolicyResult<T> {
    Accept(T),
    Reject,
}

// Default behavior when no configured policy matches a route.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum DefaultPolicyType {
    AcceptRoute,
    #[default]
    RejectRoute,
}

// Opaque route tag attached by policy and carried downward to the RIB
// client. The core never interprets the value.
pub type RouteTag = u32;
