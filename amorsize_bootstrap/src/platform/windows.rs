// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Windows Platform Implementation
//!
//! Windows API implementation.
//!
//! ## Windows APIs Used
//!
//! - `GlobalMemoryStatusEx` - total and available memory
//! - `num_cpus` - physical and logical core counts
//!
//! Windows has no fork; pool workers are spawned fresh, so the spawn
//! model is `Spawned`.

use super::{Platform, PlatformError};
use amorsize_domain::SpawnModel;

/// Windows platform implementation
pub struct WindowsPlatform;

impl WindowsPlatform {
    /// Create a new Windows platform instance
    pub fn new() -> Self {
        Self
    }

    fn memory_status() -> Result<(u64, u64), PlatformError> {
        use std::mem;
        use winapi::um::sysinfoapi::{GlobalMemoryStatusEx, MEMORYSTATUSEX};

        unsafe {
            let mut mem_status: MEMORYSTATUSEX = mem::zeroed();
            mem_status.dwLength = mem::size_of::<MEMORYSTATUSEX>() as u32;

            if GlobalMemoryStatusEx(&mut mem_status) != 0 {
                Ok((mem_status.ullTotalPhys, mem_status.ullAvailPhys))
            } else {
                Err(PlatformError::Other(
                    "GlobalMemoryStatusEx failed".to_string(),
                ))
            }
        }
    }
}

impl Default for WindowsPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for WindowsPlatform {
    fn physical_cores(&self) -> usize {
        num_cpus::get_physical().max(1)
    }

    fn logical_cores(&self) -> usize {
        num_cpus::get().max(1)
    }

    fn total_memory(&self) -> Result<u64, PlatformError> {
        Self::memory_status().map(|(total, _)| total)
    }

    fn available_memory(&self) -> Result<u64, PlatformError> {
        Self::memory_status().map(|(_, available)| available)
    }

    fn worker_spawn_model(&self) -> SpawnModel {
        SpawnModel::Spawned
    }

    fn platform_name(&self) -> &'static str {
        "windows"
    }
}
