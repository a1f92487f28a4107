//! Translation metrics and observability module.
//!
//! Process-wide counters for provider usage and per-locale outcomes across
//! both the batch translator and streaming sessions.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

/// Global translation metrics singleton.
#[derive(Debug, Default)]
pub struct TranslationMetrics {
    /// Number of calls made to the text-generation provider
    provider_calls: AtomicUsize,

    /// Number of provider calls that failed or returned unusable output
    provider_failures: AtomicUsize,

    /// Locales that produced a usable translation
    locales_translated: AtomicUsize,

    /// Locales that failed in a streaming session
    locales_failed: AtomicUsize,

    /// Streaming sessions started
    sessions_started: AtomicUsize,

    /// Streaming sessions stopped early because the caller went away
    sessions_cancelled: AtomicUsize,
}

/// Global metrics instance (initialized lazily)
static METRICS: OnceLock<TranslationMetrics> = OnceLock::new();

impl TranslationMetrics {
    /// Get the global translation metrics instance.
    pub fn global() -> &'static TranslationMetrics {
        METRICS.get_or_init(TranslationMetrics::default)
    }

    pub fn record_provider_call(&self) {
        self.provider_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_provider_failure(&self) {
        self.provider_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_locales_translated(&self, count: usize) {
        self.locales_translated.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_locale_failed(&self) {
        self.locales_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_session_started(&self) {
        self.sessions_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_session_cancelled(&self) {
        self.sessions_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let calls = self.provider_calls.load(Ordering::Relaxed);
        let failures = self.provider_failures.load(Ordering::Relaxed);
        let provider_success_rate = if calls > 0 {
            (calls.saturating_sub(failures) as f64 / calls as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            provider_calls: calls,
            provider_failures: failures,
            provider_success_rate,
            locales_translated: self.locales_translated.load(Ordering::Relaxed),
            locales_failed: self.locales_failed.load(Ordering::Relaxed),
            sessions_started: self.sessions_started.load(Ordering::Relaxed),
            sessions_cancelled: self.sessions_cancelled.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of translation metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    pub provider_calls: usize,
    pub provider_failures: usize,
    /// Percentage of provider calls that yielded usable output
    pub provider_success_rate: f64,
    pub locales_translated: usize,
    pub locales_failed: usize,
    pub sessions_started: usize,
    pub sessions_cancelled: usize,
}
