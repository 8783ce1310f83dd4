// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Function Identity Value Object
//!
//! The opaque identity token of a user-supplied work function, produced by
//! the [`Describe`](crate::services::Describe) capability. The identity is
//! the function-side half of every workload fingerprint: a module-qualified
//! name plus, when the caller's ecosystem can produce one, a stable content
//! digest of the function's source.
//!
//! When the digest is absent, identity degrades to the name alone.
//! Fingerprint stability decreases (renaming-in-place or editing the body
//! will not invalidate cached plans) but correctness is preserved, because
//! a stale plan is merely suboptimal, never wrong.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity token of a work function, used for fingerprinting.
///
/// Immutable per program run. Two functions with equal identities are
/// assumed interchangeable for the purpose of planning.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionIdentity {
    qualified_name: String,
    content_digest: Option<String>,
}

impl FunctionIdentity {
    /// Creates an identity from a module-qualified name alone.
    pub fn named(qualified_name: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            content_digest: None,
        }
    }

    /// Creates an identity carrying a stable content digest of the
    /// function's source.
    pub fn with_digest(qualified_name: impl Into<String>, digest: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            content_digest: Some(digest.into()),
        }
    }

    /// The module-qualified name of the function.
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    /// The optional content digest.
    pub fn content_digest(&self) -> Option<&str> {
        self.content_digest.as_deref()
    }
}

impl fmt::Display for FunctionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.content_digest {
            Some(digest) => write!(f, "{}@{}", self.qualified_name, digest),
            None => write!(f, "{}", self.qualified_name),
        }
    }
}
