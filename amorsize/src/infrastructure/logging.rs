// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Logging Initialization
//!
//! Convenience initializer for embedding applications that do not already
//! configure `tracing`. A library must never install a global subscriber
//! behind its caller's back, so this is opt-in and idempotent: calling it
//! when a subscriber is already installed is a no-op.

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Installs a formatted `tracing` subscriber at the given level.
///
/// Returns `false` when a global subscriber was already installed (the
/// existing one stays in place).
pub fn init_tracing(level: Level) -> bool {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber).is_ok()
}
