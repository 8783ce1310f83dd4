// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Repository Ports
//!
//! Storage contracts implemented by the infrastructure layer.

pub mod decision_cache;

pub use decision_cache::{CacheLookup, DecisionCache, MissReason};
