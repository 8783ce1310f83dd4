// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Platform Abstraction Module
//!
//! This module provides platform-specific abstractions for the host
//! attributes the advisor plans against: physical core count, available
//! memory, and the worker-spawn model.
//!
//! ## Architecture Pattern
//!
//! Following hexagonal architecture principles:
//! - **Interface**: `Platform` trait defines the contract
//! - **Implementations**:
//!   - `UnixPlatform`: POSIX implementation (Linux + macOS)
//!   - `WindowsPlatform`: Windows API implementation
//! - **Selection**: Compile-time platform selection via `#[cfg]`
//!
//! ## Design Philosophy
//!
//! The bootstrap module sits OUTSIDE the enterprise application layers,
//! so it can access platform-specific APIs directly. This abstraction:
//!
//! 1. **Isolates** OS-specific code to one module
//! 2. **Enables** testing via trait mocking
//! 3. **Provides** a consistent API across platforms
//! 4. **Avoids** scattered conditional compilation
//!
//! ## Usage
//!
//! ```rust
//! use amorsize_bootstrap::platform::create_platform;
//!
//! let platform = create_platform();
//! println!("Running on: {}", platform.platform_name());
//! println!("Physical cores: {}", platform.physical_cores());
//! ```

use thiserror::Error;

use amorsize_domain::SpawnModel;

#[cfg(unix)]
mod unix;

#[cfg(windows)]
mod windows;

// Re-export implementations
#[cfg(unix)]
pub use unix::UnixPlatform;

#[cfg(windows)]
pub use windows::WindowsPlatform;

/// Platform-specific errors
#[derive(Debug, Error)]
pub enum PlatformError {
    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Feature not supported on this platform
    #[error("Not supported on this platform: {0}")]
    NotSupported(String),

    /// Generic platform error
    #[error("Platform error: {0}")]
    Other(String),
}

/// Platform abstraction trait for host probing.
///
/// ## Design Principles
///
/// - **Stateless**: All methods are stateless and thread-safe
/// - **Fresh observations**: Every call re-probes; values are treated as
///   instantaneous
/// - **Error-handling**: Fallible probes return `Result`; the adapter
///   layer above converts failures into conservative defaults
///
/// ## Implementation Notes
///
/// Implementations should use native platform APIs:
/// - Unix: POSIX APIs via `libc`, `/proc`
/// - Windows: Windows API via `winapi`
/// - Fallbacks: Standard Rust APIs when platform APIs unavailable
pub trait Platform: Send + Sync {
    /// Get the number of physical CPU cores
    ///
    /// Physical cores, not hyperthreads: a plan wider than the physical
    /// core count buys contention, not throughput, for compute-bound work.
    ///
    /// # Returns
    /// Number of physical cores (at least 1)
    fn physical_cores(&self) -> usize;

    /// Get the number of logical processors
    ///
    /// # Returns
    /// Number of logical processors (at least 1)
    fn logical_cores(&self) -> usize;

    /// Get total system memory in bytes
    ///
    /// # Errors
    /// Returns error if system information cannot be retrieved
    fn total_memory(&self) -> Result<u64, PlatformError>;

    /// Get available system memory in bytes
    ///
    /// # Errors
    /// Returns error if system information cannot be retrieved
    fn available_memory(&self) -> Result<u64, PlatformError>;

    /// Get the process-creation semantics of this host
    ///
    /// # Returns
    /// - Unix: [`SpawnModel::Forked`] (workers inherit memory copy-on-write)
    /// - Windows: [`SpawnModel::Spawned`] (workers boot a fresh image)
    fn worker_spawn_model(&self) -> SpawnModel;

    /// Get the platform name
    ///
    /// # Returns
    /// Platform identifier: "linux", "macos", "windows", etc.
    fn platform_name(&self) -> &'static str;
}

// === Platform Selection ===

#[cfg(unix)]
type PlatformImpl = UnixPlatform;

#[cfg(windows)]
type PlatformImpl = WindowsPlatform;

/// Create the platform-specific implementation
///
/// This function returns the appropriate platform implementation
/// for the current operating system, selected at compile time.
///
/// # Returns
/// Boxed platform implementation
pub fn create_platform() -> Box<dyn Platform> {
    Box::new(PlatformImpl::new())
}
