// /////////////////////////////////////////////////////////////////////////////
// Amorsize RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Coordinator
//!
//! The façade a caller interacts with. One call to
//! [`Coordinator::optimize`] walks the whole planning state machine:
//!
//! ```text
//! Start
//!   │  compute fingerprint
//!   ▼
//! Check SharedCache (if available) ──► hit ──► validate ──► return
//!   │ miss/unavailable
//!   ▼
//! Check LocalCache ──► hit ──► validate ──► (propagate to SharedCache) ──► return
//!   │ miss
//!   ▼
//! Profile ──► CostModel ──► DecisionEngine ──► Decision
//!   │
//!   ├─ write LocalCache (always)
//!   ├─ write SharedCache (if available)
//!   ▼
//! Return
//! ```
//!
//! ## Single-Flight Profiling
//!
//! Within one process, concurrent `optimize` calls with the same
//! fingerprint deduplicate: the first caller profiles, the rest block on a
//! per-fingerprint gate and receive a clone of the leader's outcome -
//! decision or error alike. Across a fleet duplicate profiling is
//! permitted instead of holding distributed locks; the shared cache merely
//! makes it unlikely.
//!
//! ## Degradation
//!
//! Shared-tier trouble never surfaces as an error. It is logged through
//! the [`Diagnostics`] sink and, when a fresh decision is being built,
//! recorded as an advisory on the decision itself.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use amorsize_domain::services::profiler::{DEFAULT_MAX_SAMPLES, DEFAULT_PROFILE_BUDGET};
use amorsize_domain::{
    AmorsizeError, CacheLookup, Codec, CostModel, Decision, DecisionCache, DecisionEngine,
    Fingerprint, HostCapabilities, HostSnapshot, Profiler, Worker,
};
use amorsize_domain::services::decision_engine::SMALL_N_THRESHOLD;

use amorsize_bootstrap::SystemHostCapabilities;

use crate::infrastructure::cache::transport::resp::RespTransport;
use crate::infrastructure::{
    AmorsizeConfig, Diagnostics, LocalDecisionCache, SharedDecisionCache, TracingDiagnostics,
};

/// How many leading items are encoded to estimate the item magnitude.
const MAGNITUDE_PREFIX_SAMPLES: usize = 5;

/// Per-call planning options.
#[derive(Debug, Clone)]
pub struct OptimizeOptions {
    /// Consult and populate the cache tiers.
    pub use_cache: bool,
    /// Skip cache reads (still writes the fresh result).
    pub force_refresh: bool,
    /// Overrides the configured TTL for entries written by this call.
    pub ttl_override: Option<Duration>,
    /// Overrides the profiler's sample cap (clamped into [10, 100]).
    pub max_samples: Option<usize>,
    /// Overrides the profiler's wall-clock budget.
    pub profile_timeout: Option<Duration>,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            force_refresh: false,
            ttl_override: None,
            max_samples: None,
            profile_timeout: None,
        }
    }
}

/// Per-fingerprint single-flight gate.
struct ProfileGate {
    state: Mutex<Option<Result<Decision, AmorsizeError>>>,
    cond: Condvar,
}

impl ProfileGate {
    fn new() -> Self {
        Self {
            state: Mutex::new(None),
            cond: Condvar::new(),
        }
    }
}

/// Orchestrates fingerprinting, cache lookups, profiling, and decision
/// making.
pub struct Coordinator {
    host: Arc<dyn HostCapabilities>,
    local_cache: LocalDecisionCache,
    shared_cache: Option<SharedDecisionCache>,
    diagnostics: Arc<dyn Diagnostics>,
    cost_model: CostModel,
    engine: DecisionEngine,
    default_ttl: Duration,
    inflight: Mutex<HashMap<Fingerprint, Arc<ProfileGate>>>,
}

impl Coordinator {
    /// Builds a coordinator from configuration: system host probing, the
    /// configured local cache directory, and - when an endpoint is
    /// configured - a RESP-backed shared tier.
    ///
    /// # Errors
    /// [`AmorsizeError::InvalidInput`] for unusable configuration,
    /// including an unresolvable shared-cache endpoint.
    pub fn from_config(config: &AmorsizeConfig) -> Result<Self, AmorsizeError> {
        config.validate()?;

        let shared_cache = match &config.shared_cache_url {
            Some(url) => {
                let transport = RespTransport::new(url, config.socket_timeout)
                    .map_err(|e| AmorsizeError::invalid_input(e.to_string()))?;
                Some(SharedDecisionCache::new(
                    Arc::new(transport),
                    config.key_prefix.clone(),
                ))
            }
            None => None,
        };

        Ok(Self::new(
            Arc::new(SystemHostCapabilities::new()),
            LocalDecisionCache::new(&config.cache_dir, config.default_ttl),
            shared_cache,
            Arc::new(TracingDiagnostics::new()),
            config.default_ttl,
        ))
    }

    /// Builds a coordinator from explicit collaborators. This is the
    /// injection seam tests and embedding applications use.
    pub fn new(
        host: Arc<dyn HostCapabilities>,
        local_cache: LocalDecisionCache,
        shared_cache: Option<SharedDecisionCache>,
        diagnostics: Arc<dyn Diagnostics>,
        default_ttl: Duration,
    ) -> Self {
        Self {
            host,
            local_cache,
            shared_cache,
            diagnostics,
            cost_model: CostModel::new(),
            engine: DecisionEngine::new(),
            default_ttl,
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Plans the execution of `worker` over `items`.
    ///
    /// # Arguments
    /// * `worker` - The user function (profiled on a prefix of the items)
    /// * `items` - The full workload
    /// * `input_codec` / `output_codec` - Encoders used to estimate
    ///   transfer cost and output size
    /// * `opts` - Per-call options
    ///
    /// # Errors
    /// Only [`AmorsizeError::UserFunctionFailed`] and
    /// [`AmorsizeError::ProfileTimeout`] interrupt a call; every cache or
    /// encoder failure degrades into advisories on the returned decision.
    pub fn optimize<In, Out>(
        &self,
        worker: &dyn Worker<In, Out>,
        items: &[In],
        input_codec: &dyn Codec<In>,
        output_codec: &dyn Codec<Out>,
        opts: &OptimizeOptions,
    ) -> Result<Decision, AmorsizeError> {
        let n = items.len();

        if n == 0 {
            return Ok(Decision::serial(0, "workload too small")
                .with_advisory("invalid input: empty workload"));
        }

        // Tiny workloads bypass fingerprinting, caching, and profiling
        // outright: profiling would cost more than the plan saves, and a
        // serial plan for so few items carries no reusable information.
        if n <= SMALL_N_THRESHOLD {
            return Ok(Decision::serial(n, "workload too small"));
        }

        let snapshot = self.host.snapshot();
        let (magnitude, magnitude_degraded) = self.estimate_item_magnitude(items, input_codec);
        let fingerprint = Fingerprint::derive(&worker.describe(), n, magnitude);

        let mut backend_degraded = false;
        if opts.use_cache && !opts.force_refresh {
            if let Some(decision) =
                self.lookup_caches(&fingerprint, &snapshot, &mut backend_degraded)
            {
                return Ok(decision);
            }
        }

        self.run_singleflight(fingerprint, || {
            self.profile_and_decide(
                worker,
                items,
                input_codec,
                output_codec,
                opts,
                &fingerprint,
                &snapshot,
                magnitude_degraded,
                backend_degraded,
            )
        })
    }

    /// Removes cached plans matching `pattern` from both tiers. Returns
    /// the number of entries removed locally.
    pub fn clear_cache(&self, pattern: &str) -> Result<usize, AmorsizeError> {
        if let Some(shared) = &self.shared_cache {
            if shared.available() {
                if let Err(e) = shared.clear(pattern) {
                    self.diagnostics
                        .warn(&format!("shared cache clear failed: {e}"));
                }
            }
        }
        self.local_cache.clear(pattern)
    }

    /// Mean encoded byte length of a small item prefix. An encoder
    /// failure degrades to an infinite magnitude (the pessimistic bucket)
    /// rather than failing the call.
    fn estimate_item_magnitude<In>(
        &self,
        items: &[In],
        input_codec: &dyn Codec<In>,
    ) -> (u64, bool) {
        let prefix = items.len().min(MAGNITUDE_PREFIX_SAMPLES);
        let mut total = 0u64;
        for item in &items[..prefix] {
            match input_codec.encode(item) {
                Ok(bytes) => total += bytes.len() as u64,
                Err(e) => {
                    self.diagnostics
                        .warn(&format!("encoder failed estimating item magnitude: {e}"));
                    return (u64::MAX, true);
                }
            }
        }
        (total / (prefix as u64), false)
    }

    /// The cache-tier walk: shared first when available, then local, with
    /// a local hit propagated outward.
    fn lookup_caches(
        &self,
        fingerprint: &Fingerprint,
        snapshot: &HostSnapshot,
        backend_degraded: &mut bool,
    ) -> Option<Decision> {
        if let Some(shared) = &self.shared_cache {
            if shared.available() {
                match shared.load(fingerprint, snapshot) {
                    CacheLookup::Hit(decision) => {
                        self.diagnostics
                            .info(&format!("shared cache hit for {fingerprint}"));
                        return Some(decision);
                    }
                    CacheLookup::BackendDown(detail) => {
                        *backend_degraded = true;
                        self.diagnostics
                            .warn(&format!("shared cache down ({detail}); using local tier"));
                    }
                    CacheLookup::Miss(reason) => {
                        self.diagnostics
                            .debug(&format!("shared cache miss for {fingerprint}: {reason}"));
                    }
                }
            } else {
                *backend_degraded = true;
                self.diagnostics
                    .warn("shared cache unavailable; using local tier");
            }
        }

        match self.local_cache.load(fingerprint, snapshot) {
            CacheLookup::Hit(decision) => {
                self.diagnostics
                    .info(&format!("local cache hit for {fingerprint}"));
                self.propagate_to_shared(fingerprint, &decision, snapshot);
                Some(decision)
            }
            CacheLookup::Miss(reason) => {
                self.diagnostics
                    .debug(&format!("local cache miss for {fingerprint}: {reason}"));
                None
            }
            CacheLookup::BackendDown(detail) => {
                // The local tier never reports this; treat it as a miss.
                self.diagnostics
                    .warn(&format!("local cache reported backend down: {detail}"));
                None
            }
        }
    }

    /// Writes a locally-hit decision outward so the rest of the fleet can
    /// skip its own profile.
    fn propagate_to_shared(
        &self,
        fingerprint: &Fingerprint,
        decision: &Decision,
        snapshot: &HostSnapshot,
    ) {
        let Some(shared) = &self.shared_cache else {
            return;
        };
        if !shared.available() {
            return;
        }
        if let Err(e) = shared.save(fingerprint, decision, snapshot, self.default_ttl) {
            self.diagnostics
                .warn(&format!("propagating local hit to shared cache failed: {e}"));
        }
    }

    /// Runs `work` under the per-fingerprint gate: one leader executes,
    /// followers receive a clone of its outcome.
    fn run_singleflight(
        &self,
        fingerprint: Fingerprint,
        work: impl FnOnce() -> Result<Decision, AmorsizeError>,
    ) -> Result<Decision, AmorsizeError> {
        let (gate, is_leader) = {
            let mut inflight = self.inflight.lock();
            match inflight.get(&fingerprint) {
                Some(gate) => (Arc::clone(gate), false),
                None => {
                    let gate = Arc::new(ProfileGate::new());
                    inflight.insert(fingerprint, Arc::clone(&gate));
                    (gate, true)
                }
            }
        };

        if is_leader {
            // A panicking work function must not strand the followers on
            // the gate; it is converted to the same error a failing
            // function produces.
            let result = catch_unwind(AssertUnwindSafe(work)).unwrap_or_else(|_| {
                Err(AmorsizeError::user_function_failed(
                    "work function panicked during profiling",
                ))
            });
            *gate.state.lock() = Some(result.clone());
            gate.cond.notify_all();
            self.inflight.lock().remove(&fingerprint);
            result
        } else {
            let mut state = gate.state.lock();
            loop {
                if let Some(result) = state.as_ref() {
                    return result.clone();
                }
                gate.cond.wait(&mut state);
            }
        }
    }

    /// The miss path: profile, model, decide, attach degradation
    /// advisories, populate both tiers.
    #[allow(clippy::too_many_arguments)]
    fn profile_and_decide<In, Out>(
        &self,
        worker: &dyn Worker<In, Out>,
        items: &[In],
        input_codec: &dyn Codec<In>,
        output_codec: &dyn Codec<Out>,
        opts: &OptimizeOptions,
        fingerprint: &Fingerprint,
        snapshot: &HostSnapshot,
        magnitude_degraded: bool,
        backend_degraded: bool,
    ) -> Result<Decision, AmorsizeError> {
        let profiler = Profiler::with_limits(
            opts.max_samples.unwrap_or(DEFAULT_MAX_SAMPLES),
            opts.profile_timeout.unwrap_or(DEFAULT_PROFILE_BUDGET),
        );
        let profile = profiler.profile(worker, items, input_codec, output_codec)?;
        self.diagnostics.info(&format!(
            "profiled {} samples for {fingerprint}",
            profile.sample_count()
        ));

        let estimate = self.cost_model.estimate(&profile, snapshot, items.len());
        let mut decision = self.engine.decide(&estimate, snapshot, items.len());

        if profile.stopped_early() {
            decision.push_advisory("profiling stopped early - wall-clock budget exhausted");
        }
        if magnitude_degraded {
            decision
                .push_advisory("encoder failed while estimating item magnitude - assuming huge items");
        }
        if backend_degraded {
            decision.push_advisory("shared cache unavailable - continuing with local cache only");
        }

        if opts.use_cache {
            let ttl = opts.ttl_override.unwrap_or(self.default_ttl);
            if let Err(e) = self
                .local_cache
                .save(fingerprint, &decision, snapshot, ttl)
            {
                self.diagnostics
                    .warn(&format!("local cache save failed: {e}"));
            }
            if let Some(shared) = &self.shared_cache {
                if shared.available() {
                    if let Err(e) = shared.save(fingerprint, &decision, snapshot, ttl) {
                        self.diagnostics
                            .warn(&format!("shared cache save failed: {e}"));
                    }
                }
            }
        }

        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::cache::transport::memory::InMemoryTransport;
    use crate::infrastructure::RecordingDiagnostics;
    use amorsize_domain::{ExecutorKind, FnWorker, JsonCodec, SpawnModel, StaticHostCapabilities};
    use tempfile::TempDir;

    fn host() -> Arc<dyn HostCapabilities> {
        Arc::new(StaticHostCapabilities {
            physical_cores: 8,
            available_memory_bytes: 8 << 30,
            spawn_model: SpawnModel::Forked,
        })
    }

    fn coordinator(dir: &TempDir) -> Coordinator {
        Coordinator::new(
            host(),
            LocalDecisionCache::new(dir.path(), Duration::from_secs(3600)),
            None,
            Arc::new(RecordingDiagnostics::new()),
            Duration::from_secs(3600),
        )
    }

    fn busy(iterations: u64) -> u64 {
        let mut acc = 0u64;
        for i in 0..iterations {
            acc = acc.wrapping_mul(31).wrapping_add(i);
        }
        acc
    }

    #[test]
    fn test_empty_workload_yields_serial_advisory() {
        let dir = TempDir::new().unwrap();
        let worker = FnWorker::new("tests.id", |x: &u64| Ok(*x));
        let d = coordinator(&dir)
            .optimize(&worker, &[], &JsonCodec::new(), &JsonCodec::new(), &OptimizeOptions::default())
            .unwrap();
        assert_eq!(d.executor_kind(), ExecutorKind::Serial);
        assert_eq!(d.worker_count().count(), 1);
        assert_eq!(d.chunk_size().items(), 1);
        assert!(d.advisories().iter().any(|a| a.contains("invalid input")));
    }

    #[test]
    fn test_tiny_workload_skips_profiling_entirely() {
        let dir = TempDir::new().unwrap();
        // A worker that fails loudly if ever called.
        let worker = FnWorker::new("tests.never_called", |_: &u64| -> Result<u64, AmorsizeError> {
            panic!("profiler must not run for tiny workloads")
        });
        let items: Vec<u64> = (0..10).collect();
        let d = coordinator(&dir)
            .optimize(&worker, &items, &JsonCodec::new(), &JsonCodec::new(), &OptimizeOptions::default())
            .unwrap();
        assert_eq!(d.executor_kind(), ExecutorKind::Serial);
        assert_eq!(d.reason(), "workload too small");
        assert_eq!(d.chunk_size().items(), 10);
        assert_eq!(d.estimated_speedup(), 1.0);
    }

    #[test]
    fn test_user_function_failure_surfaces() {
        let dir = TempDir::new().unwrap();
        let worker = FnWorker::new("tests.broken", |_: &u64| -> Result<u64, AmorsizeError> {
            Err(AmorsizeError::user_function_failed("bad input"))
        });
        let items: Vec<u64> = (0..1_000).collect();
        let result = coordinator(&dir).optimize(
            &worker,
            &items,
            &JsonCodec::new(),
            &JsonCodec::new(),
            &OptimizeOptions::default(),
        );
        assert!(matches!(result, Err(AmorsizeError::UserFunctionFailed(_))));
    }

    #[test]
    fn test_panicking_function_becomes_user_function_failed() {
        let dir = TempDir::new().unwrap();
        let worker = FnWorker::new("tests.panics", |_: &u64| -> Result<u64, AmorsizeError> {
            panic!("boom")
        });
        let items: Vec<u64> = (0..1_000).collect();
        let result = coordinator(&dir).optimize(
            &worker,
            &items,
            &JsonCodec::new(),
            &JsonCodec::new(),
            &OptimizeOptions::default(),
        );
        match result {
            Err(AmorsizeError::UserFunctionFailed(msg)) => assert!(msg.contains("panicked")),
            other => panic!("expected UserFunctionFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_second_call_hits_local_cache() {
        let dir = TempDir::new().unwrap();
        let coordinator = coordinator(&dir);
        let items: Vec<u64> = vec![50_000; 2_000];

        let worker = FnWorker::new("tests.busy", |x: &u64| Ok(busy(*x)));
        let first = coordinator
            .optimize(&worker, &items, &JsonCodec::new(), &JsonCodec::new(), &OptimizeOptions::default())
            .unwrap();

        // Second run: a worker that must not be profiled again.
        let sentinel = FnWorker::new("tests.busy", |_: &u64| -> Result<u64, AmorsizeError> {
            panic!("second call must be served from cache")
        });
        let second = coordinator
            .optimize(&sentinel, &items, &JsonCodec::new(), &JsonCodec::new(), &OptimizeOptions::default())
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_force_refresh_skips_cache_reads() {
        let dir = TempDir::new().unwrap();
        let coordinator = coordinator(&dir);
        let items: Vec<u64> = vec![50_000; 2_000];
        let worker = FnWorker::new("tests.busy", |x: &u64| Ok(busy(*x)));

        coordinator
            .optimize(&worker, &items, &JsonCodec::new(), &JsonCodec::new(), &OptimizeOptions::default())
            .unwrap();

        // With force_refresh the sentinel IS profiled: expect the panic to
        // surface as UserFunctionFailed rather than a cache hit.
        let sentinel = FnWorker::new("tests.busy", |_: &u64| -> Result<u64, AmorsizeError> {
            panic!("profiling again as ordered")
        });
        let opts = OptimizeOptions {
            force_refresh: true,
            ..OptimizeOptions::default()
        };
        let result = coordinator.optimize(
            &sentinel,
            &items,
            &JsonCodec::new(),
            &JsonCodec::new(),
            &opts,
        );
        assert!(matches!(result, Err(AmorsizeError::UserFunctionFailed(_))));
    }

    #[test]
    fn test_use_cache_false_never_touches_the_store() {
        let dir = TempDir::new().unwrap();
        let coordinator = coordinator(&dir);
        let items: Vec<u64> = vec![50_000; 2_000];
        let worker = FnWorker::new("tests.busy", |x: &u64| Ok(busy(*x)));
        let opts = OptimizeOptions {
            use_cache: false,
            ..OptimizeOptions::default()
        };
        coordinator
            .optimize(&worker, &items, &JsonCodec::new(), &JsonCodec::new(), &opts)
            .unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).map(|d| d.count()).unwrap_or(0), 0);
    }

    #[test]
    fn test_shared_outage_degrades_with_advisory() {
        let dir = TempDir::new().unwrap();
        let transport = Arc::new(InMemoryTransport::new());
        transport.set_failing(true);
        let diagnostics = Arc::new(RecordingDiagnostics::new());
        let coordinator = Coordinator::new(
            host(),
            LocalDecisionCache::new(dir.path(), Duration::from_secs(3600)),
            Some(SharedDecisionCache::new(
                Arc::clone(&transport) as Arc<dyn crate::infrastructure::KeyValueTransport>,
                "amorsize",
            )),
            Arc::clone(&diagnostics) as Arc<dyn crate::infrastructure::Diagnostics>,
            Duration::from_secs(3600),
        );

        let items: Vec<u64> = vec![50_000; 2_000];
        let worker = FnWorker::new("tests.busy", |x: &u64| Ok(busy(*x)));
        let d = coordinator
            .optimize(&worker, &items, &JsonCodec::new(), &JsonCodec::new(), &OptimizeOptions::default())
            .unwrap();

        assert!(d
            .advisories()
            .iter()
            .any(|a| a.contains("shared cache unavailable")));
        assert!(diagnostics.has_warning_containing("shared cache"));
    }

    #[test]
    fn test_concurrent_same_fingerprint_profiles_once() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Barrier;

        let dir = TempDir::new().unwrap();
        let coordinator = Arc::new(Coordinator::new(
            host(),
            LocalDecisionCache::new(dir.path(), Duration::from_secs(3600)),
            None,
            Arc::new(RecordingDiagnostics::new()),
            Duration::from_secs(3600),
        ));
        let worker_calls = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(8));

        // use_cache=false so every thread reaches the single-flight gate;
        // only the leader may actually profile. The worker is slow enough
        // (1ms/item, 20 samples) that the barrier-released followers all
        // arrive while the leader is still inside its flight.
        let opts = OptimizeOptions {
            use_cache: false,
            ..OptimizeOptions::default()
        };
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let coordinator = Arc::clone(&coordinator);
                let worker_calls = Arc::clone(&worker_calls);
                let barrier = Arc::clone(&barrier);
                let opts = opts.clone();
                std::thread::spawn(move || {
                    let calls = Arc::clone(&worker_calls);
                    let worker = FnWorker::new("tests.same", move |x: &u64| {
                        calls.fetch_add(1, Ordering::SeqCst);
                        std::thread::sleep(Duration::from_millis(1));
                        Ok(busy(*x))
                    });
                    let items: Vec<u64> = vec![1_000; 2_000];
                    barrier.wait();
                    coordinator
                        .optimize(&worker, &items, &JsonCodec::new(), &JsonCodec::new(), &opts)
                        .unwrap()
                })
            })
            .collect();

        let decisions: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        // All callers observe the same plan...
        for d in &decisions[1..] {
            assert_eq!(d, &decisions[0]);
        }
        // ...from far fewer worker executions than eight independent
        // profiles (8 x 20 samples) would have cost. Scheduling can
        // stagger a straggler into its own flight, so allow a little
        // slack above the single-flight ideal of 20.
        assert!(worker_calls.load(Ordering::SeqCst) <= 2 * 20);
    }
}
