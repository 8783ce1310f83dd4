// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Unix Platform Implementation
//!
//! POSIX implementation covering Linux and macOS.
//!
//! ## APIs Used
//!
//! - `/proc/meminfo` - available memory on Linux (`MemAvailable` accounts
//!   for reclaimable page cache, which raw free-page counters miss)
//! - `sysctlbyname("hw.memsize")` - total memory on macOS
//! - `sysconf(_SC_PHYS_PAGES)` / `_SC_PAGE_SIZE` - generic POSIX fallback
//! - `num_cpus` - physical and logical core counts
//!
//! Unix hosts fork their pool workers, so the spawn model is `Forked`.

use super::{Platform, PlatformError};
use amorsize_domain::SpawnModel;

/// Unix platform implementation (Linux + macOS)
pub struct UnixPlatform;

impl UnixPlatform {
    /// Create a new Unix platform instance
    pub fn new() -> Self {
        Self
    }

    /// Total memory from POSIX sysconf page accounting.
    fn total_memory_sysconf() -> Result<u64, PlatformError> {
        let pages = unsafe { libc::sysconf(libc::_SC_PHYS_PAGES) };
        let page_size = unsafe { libc::sysconf(libc::_SC_PAGE_SIZE) };
        if pages <= 0 || page_size <= 0 {
            return Err(PlatformError::Other(
                "sysconf page accounting unavailable".to_string(),
            ));
        }
        Ok((pages as u64) * (page_size as u64))
    }

    #[cfg(target_os = "linux")]
    fn read_meminfo_field(field: &str) -> Result<u64, PlatformError> {
        let meminfo = std::fs::read_to_string("/proc/meminfo")?;
        for line in meminfo.lines() {
            if let Some(rest) = line.strip_prefix(field) {
                let kib: u64 = rest
                    .trim_start_matches(':')
                    .split_whitespace()
                    .next()
                    .unwrap_or("")
                    .parse()
                    .map_err(|e| {
                        PlatformError::Other(format!("malformed {} in /proc/meminfo: {}", field, e))
                    })?;
                return Ok(kib * 1024);
            }
        }
        Err(PlatformError::NotSupported(format!(
            "{} not present in /proc/meminfo",
            field
        )))
    }

    #[cfg(target_os = "macos")]
    fn total_memory_sysctl() -> Result<u64, PlatformError> {
        let mut memsize: u64 = 0;
        let mut len = std::mem::size_of::<u64>();
        let name = std::ffi::CString::new("hw.memsize")
            .map_err(|e| PlatformError::Other(e.to_string()))?;
        let rc = unsafe {
            libc::sysctlbyname(
                name.as_ptr(),
                &mut memsize as *mut u64 as *mut libc::c_void,
                &mut len,
                std::ptr::null_mut(),
                0,
            )
        };
        if rc != 0 {
            return Err(PlatformError::Other(
                "sysctlbyname(hw.memsize) failed".to_string(),
            ));
        }
        Ok(memsize)
    }
}

impl Default for UnixPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for UnixPlatform {
    fn physical_cores(&self) -> usize {
        num_cpus::get_physical().max(1)
    }

    fn logical_cores(&self) -> usize {
        num_cpus::get().max(1)
    }

    fn total_memory(&self) -> Result<u64, PlatformError> {
        #[cfg(target_os = "linux")]
        {
            Self::read_meminfo_field("MemTotal").or_else(|_| Self::total_memory_sysconf())
        }
        #[cfg(target_os = "macos")]
        {
            Self::total_memory_sysctl().or_else(|_| Self::total_memory_sysconf())
        }
        #[cfg(not(any(target_os = "linux", target_os = "macos")))]
        {
            Self::total_memory_sysconf()
        }
    }

    fn available_memory(&self) -> Result<u64, PlatformError> {
        #[cfg(target_os = "linux")]
        {
            Self::read_meminfo_field("MemAvailable")
        }
        #[cfg(not(target_os = "linux"))]
        {
            // No portable available-memory counter outside Linux. Half of
            // total is a conservative stand-in that still scales with the
            // machine.
            Ok(self.total_memory()? / 2)
        }
    }

    fn worker_spawn_model(&self) -> SpawnModel {
        SpawnModel::Forked
    }

    fn platform_name(&self) -> &'static str {
        #[cfg(target_os = "linux")]
        {
            "linux"
        }
        #[cfg(target_os = "macos")]
        {
            "macos"
        }
        #[cfg(not(any(target_os = "linux", target_os = "macos")))]
        {
            "unix"
        }
    }
}
