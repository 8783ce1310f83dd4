// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Error Types
//!
//! This module defines the error types used throughout the amorsize domain
//! layer. The error hierarchy separates failures the caller must act on
//! (a broken work function, an exhausted profiling budget) from failures the
//! advisor absorbs by degrading its recommendation (cache and encoder
//! trouble).
//!
//! ## Design Principles
//!
//! - **Specific**: Each variant represents one failure mode
//! - **Actionable**: Messages carry enough context for debugging
//! - **Cloneable**: Errors cross the in-process single-flight boundary, so
//!   waiting callers receive a clone of the leading caller's outcome
//!
//! ## Error Handling Strategy
//!
//! Only [`AmorsizeError::UserFunctionFailed`], [`AmorsizeError::ProfileTimeout`]
//! and [`AmorsizeError::InvalidInput`] may interrupt a planning call. Every
//! other variant is absorbed: cache failures fall through to the next tier,
//! encoder failures force a pessimistic memory estimate, and the resulting
//! [`Decision`](crate::entities::Decision) carries the degradation as an
//! advisory string rather than an error.

use thiserror::Error;

/// Domain-specific errors for the parallelism advisor.
///
/// Each variant includes a descriptive message designed to explain what went
/// wrong and, where possible, how to fix it.
#[derive(Error, Debug, Clone)]
pub enum AmorsizeError {
    /// The user-supplied work function returned an error on a profiling
    /// sample. The function is broken for this input; the caller must fix it.
    #[error("user function failed during profiling: {0}")]
    UserFunctionFailed(String),

    /// Sampling exceeded the wall-clock budget before gathering enough
    /// measurements to characterize the workload.
    #[error("profiling timed out: {0}")]
    ProfileTimeout(String),

    /// A local cache file was malformed. Treated as a miss after the file is
    /// unlinked; surfaces only through diagnostics.
    #[error("cache entry corrupt: {0}")]
    CacheCorrupt(String),

    /// The shared cache backend could not be reached or answered with a
    /// transport-level failure. Always degrades to the local tier.
    #[error("cache backend unavailable: {0}")]
    CacheBackendUnavailable(String),

    /// The caller-supplied encoder failed. Forces a pessimistic memory
    /// estimate; never fatal.
    #[error("encoder failed: {0}")]
    EncoderFailed(String),

    /// The planning inputs were structurally invalid (empty workload,
    /// nonsensical options). Converted to a serial decision with an advisory
    /// at the API boundary.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("serialization error: {0}")]
    SerializationError(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

impl AmorsizeError {
    /// Creates a new user-function failure
    pub fn user_function_failed(msg: impl Into<String>) -> Self {
        Self::UserFunctionFailed(msg.into())
    }

    /// Creates a new profile-timeout error
    pub fn profile_timeout(msg: impl Into<String>) -> Self {
        Self::ProfileTimeout(msg.into())
    }

    /// Creates a new cache-corruption error
    pub fn cache_corrupt(msg: impl Into<String>) -> Self {
        Self::CacheCorrupt(msg.into())
    }

    /// Creates a new backend-unavailable error
    pub fn backend_unavailable(msg: impl Into<String>) -> Self {
        Self::CacheBackendUnavailable(msg.into())
    }

    /// Creates a new encoder failure
    pub fn encoder_failed(msg: impl Into<String>) -> Self {
        Self::EncoderFailed(msg.into())
    }

    /// Creates a new invalid-input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Creates a new IO error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::IoError(msg.into())
    }

    /// Creates a new serialization error
    pub fn serialization_error(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Creates a new internal error
    pub fn internal_error(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }

    /// Checks whether the advisor absorbs this error by degrading instead of
    /// surfacing it to the caller.
    pub fn is_degradable(&self) -> bool {
        matches!(
            self,
            AmorsizeError::CacheCorrupt(_)
                | AmorsizeError::CacheBackendUnavailable(_)
                | AmorsizeError::EncoderFailed(_)
        )
    }

    /// Checks whether retrying the same call could plausibly succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AmorsizeError::ProfileTimeout(_)
                | AmorsizeError::CacheBackendUnavailable(_)
                | AmorsizeError::IoError(_)
        )
    }
}

impl From<std::io::Error> for AmorsizeError {
    fn from(err: std::io::Error) -> Self {
        AmorsizeError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for AmorsizeError {
    fn from(err: serde_json::Error) -> Self {
        AmorsizeError::SerializationError(err.to_string())
    }
}
