// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Infrastructure Layer
//!
//! Everything that touches the world outside the planning logic: the cache
//! tiers and their transports, runtime configuration, the diagnostics
//! sink, and logging initialization.

pub mod cache;
pub mod config;
pub mod diagnostics;
pub mod logging;

pub use cache::{CachedFlag, KeyValueTransport, LocalDecisionCache, SharedDecisionCache};
pub use config::AmorsizeConfig;
pub use diagnostics::{Diagnostics, RecordingDiagnostics, TracingDiagnostics};
