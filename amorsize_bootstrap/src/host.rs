// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # System Host Capabilities Adapter
//!
//! Implements the domain's [`HostCapabilities`] port on top of the
//! [`Platform`](crate::platform::Platform) abstraction. Every accessor is a
//! fresh probe; probe failures degrade to conservative defaults - one
//! core, 512 MiB, spawned workers - with a warning, because a degraded
//! plan beats no plan.

use tracing::warn;

use amorsize_domain::{HostCapabilities, SpawnModel};

use crate::platform::{create_platform, Platform};

/// Conservative memory default when probing fails: 512 MiB.
const FALLBACK_AVAILABLE_MEMORY: u64 = 512 * 1024 * 1024;

/// Host capability probe backed by native platform APIs.
pub struct SystemHostCapabilities {
    platform: Box<dyn Platform>,
}

impl SystemHostCapabilities {
    /// Creates a probe for the current operating system.
    pub fn new() -> Self {
        Self {
            platform: create_platform(),
        }
    }

    /// Creates a probe over an explicit platform, for tests.
    pub fn with_platform(platform: Box<dyn Platform>) -> Self {
        Self { platform }
    }
}

impl Default for SystemHostCapabilities {
    fn default() -> Self {
        Self::new()
    }
}

impl HostCapabilities for SystemHostCapabilities {
    fn physical_cores(&self) -> usize {
        self.platform.physical_cores().max(1)
    }

    fn available_memory_bytes(&self) -> u64 {
        match self.platform.available_memory() {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(
                    error = %e,
                    "available-memory probe failed; assuming 512 MiB"
                );
                FALLBACK_AVAILABLE_MEMORY
            }
        }
    }

    fn worker_spawn_model(&self) -> SpawnModel {
        self.platform.worker_spawn_model()
    }
}
