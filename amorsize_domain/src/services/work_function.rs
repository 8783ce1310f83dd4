// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Work Function Ports
//!
//! The capability interfaces through which the advisor sees user code. The
//! advisor never owns the work function; it borrows it for profiling and
//! extracts an identity token for fingerprinting.
//!
//! ## Ports
//!
//! - [`Describe`] - yields the function's [`FunctionIdentity`]
//! - [`Worker`] - one input item in, one output item out
//! - [`FnWorker`] - adapter wrapping a plain closure together with an
//!   explicitly supplied identity, for callers whose functions are ordinary
//!   Rust closures rather than named, introspectable entities

use crate::value_objects::FunctionIdentity;
use crate::AmorsizeError;

/// Capability to describe a work function's identity for fingerprinting.
pub trait Describe {
    /// Returns the identity token used in workload fingerprints.
    fn describe(&self) -> FunctionIdentity;
}

/// A user-supplied compute function: one input item to one output item.
///
/// The advisor executes this only during profiling, serially, on the
/// calling thread; the outputs are measured and discarded. An error return
/// is a precondition violation - the caller's function is broken for this
/// input - and aborts the planning call.
pub trait Worker<In, Out>: Describe {
    /// Executes the function on one input item.
    fn call(&self, input: &In) -> Result<Out, AmorsizeError>;
}

/// Closure adapter implementing [`Worker`] with an explicit identity.
///
/// # Examples
///
/// ```
/// use amorsize_domain::services::{FnWorker, Worker};
///
/// let double = FnWorker::new("examples.double", |x: &u64| Ok(x * 2));
/// assert_eq!(double.call(&21).unwrap(), 42);
/// ```
pub struct FnWorker<F> {
    identity: FunctionIdentity,
    func: F,
}

impl<F> FnWorker<F> {
    /// Wraps a closure under a module-qualified name.
    pub fn new(qualified_name: impl Into<String>, func: F) -> Self {
        Self {
            identity: FunctionIdentity::named(qualified_name),
            func,
        }
    }

    /// Wraps a closure under a name plus a stable content digest, for
    /// callers that can hash their function's source.
    pub fn with_digest(
        qualified_name: impl Into<String>,
        digest: impl Into<String>,
        func: F,
    ) -> Self {
        Self {
            identity: FunctionIdentity::with_digest(qualified_name, digest),
            func,
        }
    }
}

impl<F> Describe for FnWorker<F> {
    fn describe(&self) -> FunctionIdentity {
        self.identity.clone()
    }
}

impl<In, Out, F> Worker<In, Out> for FnWorker<F>
where
    F: Fn(&In) -> Result<Out, AmorsizeError>,
{
    fn call(&self, input: &In) -> Result<Out, AmorsizeError> {
        (self.func)(input)
    }
}
