// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Services
//!
//! The planning pipeline's three stages - Profiler, CostModel,
//! DecisionEngine - plus the capability ports through which the advisor
//! sees the caller's world: the work function, its encoder, and the host.

pub mod codec;
pub mod cost_model;
pub mod decision_engine;
pub mod host_capabilities;
pub mod profiler;
pub mod work_function;

pub use codec::{Codec, FnCodec, JsonCodec};
pub use cost_model::CostModel;
pub use decision_engine::DecisionEngine;
pub use host_capabilities::{HostCapabilities, StaticHostCapabilities};
pub use profiler::Profiler;
pub use work_function::{Describe, FnWorker, Worker};
