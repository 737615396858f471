//! Metrics collection and registry.

use crate::session::{Phase, SessionStats};
use prometheus::{Encoder, Gauge, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Registration or encoding failed.
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A snapshot of session state for metrics update.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Whether the session currently holds a submittable pair.
    pub ready_to_submit: bool,
    /// Whether a request is in flight.
    pub submitting: bool,
    /// Stills captured.
    pub captures: u64,
    /// Stills rejected as blurry.
    pub blurry_rejections: u64,
    /// Capture attempts without a frame.
    pub capture_failures: u64,
    /// Requests sent.
    pub submissions: u64,
    /// Requests that produced a result.
    pub successes: u64,
    /// Requests that failed.
    pub failures: u64,
    /// Responses missing required fields.
    pub incomplete_responses: u64,
    /// Luma variance of the most recent capture.
    pub last_variance: Option<f64>,
}

/// Prometheus metrics registry for capture sessions.
pub struct MetricsRegistry {
    registry: Registry,

    // Phase metrics
    ready_to_submit: IntGauge,
    submitting: IntGauge,

    // Capture metrics
    captures_total: IntCounter,
    blurry_total: IntCounter,
    capture_failures_total: IntCounter,
    last_variance: Gauge,

    // Submission metrics
    submissions_total: IntCounter,
    successes_total: IntCounter,
    failures_total: IntCounter,
    incomplete_total: IntCounter,
}

/// Raises a counter to `target`; counters never go down.
fn advance(counter: &IntCounter, target: u64) {
    let current = counter.get();
    if target > current {
        counter.inc_by(target - current);
    }
}

impl MetricsRegistry {
    /// Creates a new metrics registry with all session metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let ready_to_submit = IntGauge::new(
            "capture_verify_ready_to_submit",
            "Whether a document and clear selfie are held (1=yes, 0=no)",
        )?;
        let submitting = IntGauge::new(
            "capture_verify_submitting",
            "Whether a verification request is in flight",
        )?;

        let captures_total = IntCounter::new(
            "capture_verify_captures_total",
            "Total selfie stills captured and evaluated",
        )?;
        let blurry_total = IntCounter::new(
            "capture_verify_blurry_rejections_total",
            "Total selfie stills rejected as blurry",
        )?;
        let capture_failures_total = IntCounter::new(
            "capture_verify_capture_failures_total",
            "Total capture attempts that produced no frame",
        )?;
        let last_variance = Gauge::new(
            "capture_verify_last_luma_variance",
            "Luma variance of the most recent selfie",
        )?;

        let submissions_total = IntCounter::new(
            "capture_verify_submissions_total",
            "Total verification requests sent",
        )?;
        let successes_total = IntCounter::new(
            "capture_verify_submission_successes_total",
            "Total verification requests that produced a result",
        )?;
        let failures_total = IntCounter::new(
            "capture_verify_submission_failures_total",
            "Total verification requests that failed",
        )?;
        let incomplete_total = IntCounter::new(
            "capture_verify_incomplete_responses_total",
            "Total responses missing required fields",
        )?;

        registry.register(Box::new(ready_to_submit.clone()))?;
        registry.register(Box::new(submitting.clone()))?;
        registry.register(Box::new(captures_total.clone()))?;
        registry.register(Box::new(blurry_total.clone()))?;
        registry.register(Box::new(capture_failures_total.clone()))?;
        registry.register(Box::new(last_variance.clone()))?;
        registry.register(Box::new(submissions_total.clone()))?;
        registry.register(Box::new(successes_total.clone()))?;
        registry.register(Box::new(failures_total.clone()))?;
        registry.register(Box::new(incomplete_total.clone()))?;

        Ok(Self {
            registry,
            ready_to_submit,
            submitting,
            captures_total,
            blurry_total,
            capture_failures_total,
            last_variance,
            submissions_total,
            successes_total,
            failures_total,
            incomplete_total,
        })
    }

    /// Updates all metrics from a snapshot of session state.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        self.ready_to_submit
            .set(if snapshot.ready_to_submit { 1 } else { 0 });
        self.submitting.set(if snapshot.submitting { 1 } else { 0 });

        advance(&self.captures_total, snapshot.captures);
        advance(&self.blurry_total, snapshot.blurry_rejections);
        advance(&self.capture_failures_total, snapshot.capture_failures);
        if let Some(variance) = snapshot.last_variance {
            self.last_variance.set(variance);
        }

        advance(&self.submissions_total, snapshot.submissions);
        advance(&self.successes_total, snapshot.successes);
        advance(&self.failures_total, snapshot.failures);
        advance(&self.incomplete_total, snapshot.incomplete_responses);
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

impl MetricsSnapshot {
    /// Creates a snapshot from session counters and the current phase.
    pub fn from_session(stats: &SessionStats, phase: Phase) -> Self {
        Self {
            ready_to_submit: phase == Phase::ReadyToSubmit,
            submitting: phase == Phase::Submitting,
            captures: stats.captures,
            blurry_rejections: stats.blurry_rejections,
            capture_failures: stats.capture_failures,
            submissions: stats.submissions,
            successes: stats.successes,
            failures: stats.failures,
            incomplete_responses: stats.incomplete_responses,
            last_variance: stats.last_variance,
        }
    }
}
