//! Prometheus metrics for capture sessions.
//!
//! # Metrics Exposed
//!
//! ## Phase
//! - `capture_verify_ready_to_submit` - 1 while a document and clear selfie are held
//! - `capture_verify_submitting` - 1 while a request is in flight
//!
//! ## Capture
//! - `capture_verify_captures_total` - Stills captured and evaluated
//! - `capture_verify_blurry_rejections_total` - Stills rejected as blurry
//! - `capture_verify_capture_failures_total` - Attempts that produced no frame
//! - `capture_verify_last_luma_variance` - Luma variance of the latest still
//!
//! ## Submission
//! - `capture_verify_submissions_total` - Requests sent
//! - `capture_verify_submission_successes_total` - Requests that produced a result
//! - `capture_verify_submission_failures_total` - Requests that failed
//! - `capture_verify_incomplete_responses_total` - Responses missing required fields
//!
//! # Example
//!
//! ```
//! use capture_verify::metrics::{MetricsRegistry, MetricsSnapshot};
//! use capture_verify::session::{Phase, SessionStats};
//!
//! let registry = MetricsRegistry::new().expect("Failed to create registry");
//! let stats = SessionStats { captures: 2, blurry_rejections: 1, ..Default::default() };
//!
//! registry.update(&MetricsSnapshot::from_session(&stats, Phase::Capturing));
//! assert!(registry.encode().unwrap().contains("capture_verify_captures_total 2"));
//! ```

mod collector;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
