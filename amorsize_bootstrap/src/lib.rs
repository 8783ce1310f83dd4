// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Amorsize Bootstrap
//!
//! Host probing for the amorsize parallelism advisor. This crate sits
//! OUTSIDE the enterprise application layers so it may talk to operating
//! system APIs directly; everything above it consumes the probed values
//! through the domain's `HostCapabilities` port.
//!
//! ## Modules
//!
//! - [`platform`] - the `Platform` trait with Unix and Windows
//!   implementations, selected at compile time
//! - [`host`] - the `SystemHostCapabilities` adapter wiring the platform
//!   probe into the domain port, with conservative fallbacks

pub mod host;
pub mod platform;

pub use host::SystemHostCapabilities;
pub use platform::{create_platform, Platform, PlatformError};
