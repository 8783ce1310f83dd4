// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Worker Spawn Model
//!
//! How the host creates process-pool workers. `Forked` workers inherit the
//! parent's memory copy-on-write and start cheaply; `Spawned` workers boot a
//! fresh process image and pay a far larger startup cost. The tag also
//! gates cache compatibility: a plan tuned for forked workers is not valid
//! on a host that can only spawn.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Process-creation semantics of the current host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnModel {
    /// Workers are forked; memory is inherited copy-on-write.
    Forked,
    /// Workers are spawned fresh; startup cost is dominated by image boot.
    Spawned,
}

impl SpawnModel {
    /// Stable lowercase tag used in cache compatibility checks.
    pub fn tag(&self) -> &'static str {
        match self {
            SpawnModel::Forked => "forked",
            SpawnModel::Spawned => "spawned",
        }
    }
}

impl fmt::Display for SpawnModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}
