//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::marker::PhantomData;
use std::net::Ipv4Addr;

use tracing::{error, warn};

use crate::packet::error::{DecodeError, LsaValidationError};
use crate::packet::lsa::LsaKey;
use crate::version::Version;

// Configuration errors (a sub-class of `Error`, kept separate so callers
// can match on it without unpacking the whole enum).
#[derive(Debug)]
pub enum ConfigError {
    VirtualLinkThroughStubArea(u32),
    VirtualLinkThroughNssa(u32),
    InvalidAreaRange(ipnetwork::IpNetwork),
    UnknownArea(u32),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::VirtualLinkThroughStubArea(area) => {
                write!(f, "virtual link cannot transit stub area {}", area)
            }
            ConfigError::VirtualLinkThroughNssa(area) => {
                write!(f, "virtual link cannot transit NSSA area {}", area)
            }
            ConfigError::InvalidAreaRange(range) => {
                write!(f, "invalid area range: {}", range)
            }
            ConfigError::UnknownArea(area) => {
                write!(f, "unknown area: {}", area)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// Crate-wide error type. Variants correspond to the error classes named
// in the core's error-handling design, not to individual type names.
#[derive(Debug)]
pub enum Error<V: Version> {
    // Bad checksum, bad length, unknown type: packet dropped, no state
    // change.
    WireFormat(DecodeError),
    LsaValidation(LsaKey, LsaValidationError),
    // BadLSReq and similar neighbor-state mismatches: surfaced to the
    // peer manager, which tears down the adjacency. The core itself
    // never tears down adjacencies.
    ProtocolViolation(ProtocolViolation),
    // Never expected on a correctly sized router; origination of the
    // offending LSA alone is aborted.
    ResourceExhaustion(&'static str),
    Configuration(ConfigError),
    RibPush(ipnetwork::IpNetwork, String),
    _Version(PhantomData<V>),
}

#[derive(Debug)]
pub enum ProtocolViolation {
    BadLsReq { neighbor: Ipv4Addr, key: LsaKey },
    UnexpectedNeighborState { neighbor: Ipv4Addr, state: &'static str },
}

impl std::fmt::Display for ProtocolViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProtocolViolation::BadLsReq { neighbor, key } => {
                write!(f, "bad LS request from {} for {:?}", neighbor, key)
            }
            ProtocolViolation::UnexpectedNeighborState { neighbor, state } => {
                write!(f, "unexpected neighbor state for {}: {}", neighbor, state)
            }
        }
    }
}

impl<V> std::fmt::Display for Error<V>
where
    V: Version,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::WireFormat(err) => write!(f, "wire-format error: {}", err),
            Error::LsaValidation(key, err) => {
                write!(f, "LSA validation error for {:?}: {}", key, err)
            }
            Error::ProtocolViolation(err) => write!(f, "protocol violation: {}", err),
            Error::ResourceExhaustion(what) => {
                write!(f, "resource exhaustion: {}", what)
            }
            Error::Configuration(err) => write!(f, "configuration error: {}", err),
            Error::RibPush(prefix, reason) => {
                write!(f, "RIB push failed for {}: {}", prefix, reason)
            }
            Error::_Version(_) => unreachable!(),
        }
    }
}

impl<V> std::error::Error for Error<V>
where
    V: Version,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::WireFormat(err) => Some(err),
            Error::LsaValidation(_, err) => Some(err),
            Error::Configuration(err) => Some(err),
            _ => None,
        }
    }
}

impl<V> Error<V>
where
    V: Version,
{
    pub fn log(&self) {
        match self {
            Error::WireFormat(err) => {
                warn!(protocol = %V::PROTOCOL, %err, "dropping packet");
            }
            Error::LsaValidation(key, err) => {
                warn!(protocol = %V::PROTOCOL, ?key, %err, "dropping invalid LSA");
            }
            Error::ProtocolViolation(err) => {
                warn!(protocol = %V::PROTOCOL, %err, "protocol violation");
            }
            Error::ResourceExhaustion(what) => {
                error!(protocol = %V::PROTOCOL, %what, "resource exhaustion");
            }
            Error::Configuration(err) => {
                warn!(protocol = %V::PROTOCOL, %err, "rejecting configuration change");
            }
            Error::RibPush(prefix, reason) => {
                warn!(protocol = %V::PROTOCOL, %prefix, %reason, "RIB push failed, will retry on next recompute");
            }
            Error::_Version(_) => unreachable!(),
        }
    }
}
