// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Encoder Port
//!
//! The serialization capability the profiler uses to estimate transfer
//! cost and output size. The advisor never decodes anything - it only needs
//! the byte length and the time encoding takes, because that is exactly the
//! tax a process-pool executor pays per item.
//!
//! The codec is required to be deterministic and side-effect-free. Errors
//! during encoding are caught by the profiler and treated as an infinite
//! byte size, which forces a pessimistic memory estimate; they are never
//! fatal to planning.

use serde::Serialize;

use crate::AmorsizeError;

/// Serialization capability: `encode(value) -> bytes`.
pub trait Codec<T> {
    /// Encodes one value to its wire representation.
    fn encode(&self, value: &T) -> Result<Vec<u8>, AmorsizeError>;
}

/// JSON codec over any `Serialize` type, the default interchange encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl JsonCodec {
    pub fn new() -> Self {
        Self
    }
}

impl<T: Serialize> Codec<T> for JsonCodec {
    fn encode(&self, value: &T) -> Result<Vec<u8>, AmorsizeError> {
        serde_json::to_vec(value).map_err(|e| AmorsizeError::encoder_failed(e.to_string()))
    }
}

/// Closure adapter for callers with a bespoke encoding.
pub struct FnCodec<F> {
    func: F,
}

impl<F> FnCodec<F> {
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<T, F> Codec<T> for FnCodec<F>
where
    F: Fn(&T) -> Result<Vec<u8>, AmorsizeError>,
{
    fn encode(&self, value: &T) -> Result<Vec<u8>, AmorsizeError> {
        (self.func)(value)
    }
}
