//! Thread-safe pipeline metrics (spec.md §4.7).
//!
//! Every counter is an atomic primitive so the struct can be shared across
//! concurrently running pipelines without an external lock. `reset()` exists
//! purely for test isolation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::state::DocumentState;

#[derive(Debug, Default)]
struct AgentStats {
    invocations: AtomicU64,
    cumulative_millis: AtomicU64,
}

/// Process-wide or per-run counters and gauges.
pub struct Metrics {
    started_at: Instant,

    pipelines_started: AtomicU64,
    pipelines_completed: AtomicU64,
    pipelines_failed: AtomicU64,
    revision_cycles: AtomicU64,
    approvals_requested: AtomicU64,
    approvals_granted: AtomicU64,
    approvals_rejected: AtomicU64,

    failures_by_state: Mutex<HashMap<DocumentState, u64>>,
    agent_stats: Mutex<HashMap<String, AgentStats>>,

    total_processing_millis: AtomicU64,
    min_processing_millis: AtomicI64,
    max_processing_millis: AtomicI64,
    processing_samples: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            pipelines_started: AtomicU64::new(0),
            pipelines_completed: AtomicU64::new(0),
            pipelines_failed: AtomicU64::new(0),
            revision_cycles: AtomicU64::new(0),
            approvals_requested: AtomicU64::new(0),
            approvals_granted: AtomicU64::new(0),
            approvals_rejected: AtomicU64::new(0),
            failures_by_state: Mutex::new(HashMap::new()),
            agent_stats: Mutex::new(HashMap::new()),
            total_processing_millis: AtomicU64::new(0),
            min_processing_millis: AtomicI64::new(-1),
            max_processing_millis: AtomicI64::new(-1),
            processing_samples: AtomicU64::new(0),
        }
    }

    pub fn record_pipeline_started(&self) {
        self.pipelines_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_pipeline_completed(&self, elapsed: Duration) {
        self.pipelines_completed.fetch_add(1, Ordering::Relaxed);
        self.record_processing_time(elapsed);
    }

    pub fn record_pipeline_failed(&self, failed_at: DocumentState, elapsed: Duration) {
        self.pipelines_failed.fetch_add(1, Ordering::Relaxed);
        self.failures_by_state
            .lock()
            .expect("metrics lock poisoned")
            .entry(failed_at)
            .and_modify(|c| *c += 1)
            .or_insert(1);
        self.record_processing_time(elapsed);
    }

    pub fn record_revision_cycle(&self) {
        self.revision_cycles.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_approval_requested(&self) {
        self.approvals_requested.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_approval_granted(&self) {
        self.approvals_granted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_approval_rejected(&self) {
        self.approvals_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_agent_invocation(&self, role: &str, elapsed: Duration) {
        let mut stats = self.agent_stats.lock().expect("metrics lock poisoned");
        let entry = stats.entry(role.to_string()).or_default();
        entry.invocations.fetch_add(1, Ordering::Relaxed);
        entry
            .cumulative_millis
            .fetch_add(elapsed.as_millis() as u64, Ordering::Relaxed);
    }

    fn record_processing_time(&self, elapsed: Duration) {
        let millis = elapsed.as_millis() as i64;
        self.total_processing_millis
            .fetch_add(millis as u64, Ordering::Relaxed);
        self.processing_samples.fetch_add(1, Ordering::Relaxed);

        self.min_processing_millis
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                Some(if current < 0 { millis } else { current.min(millis) })
            })
            .ok();
        self.max_processing_millis
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                Some(current.max(millis))
            })
            .ok();
    }

    pub fn pipelines_started(&self) -> u64 {
        self.pipelines_started.load(Ordering::Relaxed)
    }

    pub fn pipelines_completed(&self) -> u64 {
        self.pipelines_completed.load(Ordering::Relaxed)
    }

    pub fn pipelines_failed(&self) -> u64 {
        self.pipelines_failed.load(Ordering::Relaxed)
    }

    pub fn revision_cycles(&self) -> u64 {
        self.revision_cycles.load(Ordering::Relaxed)
    }

    pub fn approvals_requested(&self) -> u64 {
        self.approvals_requested.load(Ordering::Relaxed)
    }

    pub fn approvals_granted(&self) -> u64 {
        self.approvals_granted.load(Ordering::Relaxed)
    }

    pub fn approvals_rejected(&self) -> u64 {
        self.approvals_rejected.load(Ordering::Relaxed)
    }

    pub fn failures_by_state(&self) -> HashMap<DocumentState, u64> {
        self.failures_by_state.lock().expect("metrics lock poisoned").clone()
    }

    /// Completed / (completed + failed); `0.0` when nothing has finished.
    pub fn success_rate(&self) -> f64 {
        let completed = self.pipelines_completed() as f64;
        let failed = self.pipelines_failed() as f64;
        let total = completed + failed;
        if total == 0.0 {
            0.0
        } else {
            completed / total
        }
    }

    /// Average time spent per invocation of `role`, in milliseconds.
    pub fn agent_average_millis(&self, role: &str) -> Option<f64> {
        let stats = self.agent_stats.lock().expect("metrics lock poisoned");
        stats.get(role).map(|s| {
            let invocations = s.invocations.load(Ordering::Relaxed);
            if invocations == 0 {
                0.0
            } else {
                s.cumulative_millis.load(Ordering::Relaxed) as f64 / invocations as f64
            }
        })
    }

    pub fn agent_invocation_count(&self, role: &str) -> u64 {
        self.agent_stats
            .lock()
            .expect("metrics lock poisoned")
            .get(role)
            .map(|s| s.invocations.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    pub fn min_processing_millis(&self) -> Option<i64> {
        let v = self.min_processing_millis.load(Ordering::Relaxed);
        if v < 0 {
            None
        } else {
            Some(v)
        }
    }

    pub fn max_processing_millis(&self) -> Option<i64> {
        let v = self.max_processing_millis.load(Ordering::Relaxed);
        if v < 0 {
            None
        } else {
            Some(v)
        }
    }

    pub fn avg_processing_millis(&self) -> Option<f64> {
        let samples = self.processing_samples.load(Ordering::Relaxed);
        if samples == 0 {
            None
        } else {
            Some(self.total_processing_millis.load(Ordering::Relaxed) as f64 / samples as f64)
        }
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Reset every counter to zero. Intended for test isolation only.
    pub fn reset(&self) {
        self.pipelines_started.store(0, Ordering::Relaxed);
        self.pipelines_completed.store(0, Ordering::Relaxed);
        self.pipelines_failed.store(0, Ordering::Relaxed);
        self.revision_cycles.store(0, Ordering::Relaxed);
        self.approvals_requested.store(0, Ordering::Relaxed);
        self.approvals_granted.store(0, Ordering::Relaxed);
        self.approvals_rejected.store(0, Ordering::Relaxed);
        self.failures_by_state.lock().expect("metrics lock poisoned").clear();
        self.agent_stats.lock().expect("metrics lock poisoned").clear();
        self.total_processing_millis.store(0, Ordering::Relaxed);
        self.min_processing_millis.store(-1, Ordering::Relaxed);
        self.max_processing_millis.store(-1, Ordering::Relaxed);
        self.processing_samples.store(0, Ordering::Relaxed);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
