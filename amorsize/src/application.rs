// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Application Layer
//!
//! The coordinator façade orchestrating fingerprinting, cache tiers,
//! profiling, and decision making into one `optimize` call.

pub mod coordinator;

pub use coordinator::{Coordinator, OptimizeOptions};
