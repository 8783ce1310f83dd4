// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Diagnostics Sink
//!
//! The coordinator's side channel for recoverable trouble: cache
//! corruption cleaned up, shared tier outages degraded around, encoder
//! hiccups absorbed. These are not errors (the call succeeds) and not
//! advisories (those live on the decision itself); they are operational
//! signals the embedding application may want in its logs.
//!
//! ## Design
//!
//! A minimal trait with three severities, a tracing-backed default, and a
//! recording implementation for tests. The trait keeps the coordinator
//! decoupled from any particular logging backend - the embedding
//! application chooses stderr, structured logs, or silence.

use parking_lot::Mutex;
use tracing::{debug, info, warn};

/// Severity-tagged operational messages from the planning path.
pub trait Diagnostics: Send + Sync {
    /// Degradations worth surfacing: backend outages, corrupt entries.
    fn warn(&self, message: &str);

    /// Normal planning milestones: cache hits, fresh profiles.
    fn info(&self, message: &str);

    /// Detail useful only when debugging the advisor itself.
    fn debug(&self, message: &str);
}

/// Routes diagnostics through the `tracing` ecosystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl TracingDiagnostics {
    pub fn new() -> Self {
        Self
    }
}

impl Diagnostics for TracingDiagnostics {
    fn warn(&self, message: &str) {
        warn!(target: "amorsize", "{message}");
    }

    fn info(&self, message: &str) {
        info!(target: "amorsize", "{message}");
    }

    fn debug(&self, message: &str) {
        debug!(target: "amorsize", "{message}");
    }
}

/// Captures diagnostics in memory for assertions.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    messages: Mutex<Vec<(DiagnosticLevel, String)>>,
}

/// Severity recorded alongside each captured message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Warn,
    Info,
    Debug,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured messages in emission order.
    pub fn messages(&self) -> Vec<(DiagnosticLevel, String)> {
        self.messages.lock().clone()
    }

    /// True when any warning contains `needle`.
    pub fn has_warning_containing(&self, needle: &str) -> bool {
        self.messages
            .lock()
            .iter()
            .any(|(level, msg)| *level == DiagnosticLevel::Warn && msg.contains(needle))
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn warn(&self, message: &str) {
        self.messages
            .lock()
            .push((DiagnosticLevel::Warn, message.to_string()));
    }

    fn info(&self, message: &str) {
        self.messages
            .lock()
            .push((DiagnosticLevel::Info, message.to_string()));
    }

    fn debug(&self, message: &str) {
        self.messages
            .lock()
            .push((DiagnosticLevel::Debug, message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink_captures_in_order() {
        let sink = RecordingDiagnostics::new();
        sink.info("profiling started");
        sink.warn("shared cache unreachable");
        sink.debug("fingerprint computed");

        let messages = sink.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].0, DiagnosticLevel::Warn);
        assert!(sink.has_warning_containing("unreachable"));
        assert!(!sink.has_warning_containing("profiling"));
    }
}
