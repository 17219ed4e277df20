//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! Wire-format types: the LSA model and its decode/validation errors.
//!
//! Hello/Database-Description/LS-Request/LS-Update/LS-Acknowledgment
//! packet framing and the Hello/DD/cryptographic-authentication layers
//! that wrap LSAs in transit belong to the interface/neighbor FSM layer,
//! which sits above this crate's scope.

pub mod error;
pub mod lsa;
