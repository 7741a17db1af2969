//! Metrics registry
//!
//! - Counters only, monotonic
//! - Reset only on process start
//! - Relaxed atomics; exactness per counter, not across counters

use std::sync::atomic::{AtomicU64, Ordering};

static GLOBAL: MetricsRegistry = MetricsRegistry::new();

/// Translation and execution counters
#[derive(Debug)]
pub struct MetricsRegistry {
    translations: AtomicU64,
    translations_rejected: AtomicU64,
    parameter_errors: AtomicU64,
    fatal_errors: AtomicU64,
    joins_planned: AtomicU64,
    joins_reused: AtomicU64,
    queries_executed: AtomicU64,
    rows_returned: AtomicU64,
}

impl MetricsRegistry {
    pub const fn new() -> Self {
        Self {
            translations: AtomicU64::new(0),
            translations_rejected: AtomicU64::new(0),
            parameter_errors: AtomicU64::new(0),
            fatal_errors: AtomicU64::new(0),
            joins_planned: AtomicU64::new(0),
            joins_reused: AtomicU64::new(0),
            queries_executed: AtomicU64::new(0),
            rows_returned: AtomicU64::new(0),
        }
    }

    /// Process-wide registry
    pub fn global() -> &'static MetricsRegistry {
        &GLOBAL
    }

    pub fn increment_translations(&self) {
        self.translations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_translations_rejected(&self) {
        self.translations_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_parameter_errors(&self, count: u64) {
        self.parameter_errors.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_fatal_errors(&self) {
        self.fatal_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_joins_planned(&self, count: u64) {
        self.joins_planned.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_joins_reused(&self, count: u64) {
        self.joins_reused.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_queries_executed(&self) {
        self.queries_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_rows_returned(&self, count: u64) {
        self.rows_returned.fetch_add(count, Ordering::Relaxed);
    }

    pub fn to_json(&self) -> String {
        let s = self.snapshot();
        format!(
            r#"{{"translations":{},"translations_rejected":{},"parameter_errors":{},"fatal_errors":{},"joins_planned":{},"joins_reused":{},"queries_executed":{},"rows_returned":{}}}"#,
            s.translations,
            s.translations_rejected,
            s.parameter_errors,
            s.fatal_errors,
            s.joins_planned,
            s.joins_reused,
            s.queries_executed,
            s.rows_returned,
        )
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            translations: self.translations.load(Ordering::Relaxed),
            translations_rejected: self.translations_rejected.load(Ordering::Relaxed),
            parameter_errors: self.parameter_errors.load(Ordering::Relaxed),
            fatal_errors: self.fatal_errors.load(Ordering::Relaxed),
            joins_planned: self.joins_planned.load(Ordering::Relaxed),
            joins_reused: self.joins_reused.load(Ordering::Relaxed),
            queries_executed: self.queries_executed.load(Ordering::Relaxed),
            rows_returned: self.rows_returned.load(Ordering::Relaxed),
        }
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub translations: u64,
    pub translations_rejected: u64,
    pub parameter_errors: u64,
    pub fatal_errors: u64,
    pub joins_planned: u64,
    pub joins_reused: u64,
    pub queries_executed: u64,
    pub rows_returned: u64,
}
