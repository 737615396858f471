//! Session phases and the read-only snapshot handed to presentation.

use serde::Serialize;
use std::fmt;

/// Discrete state of the capture/submission workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Phase {
    /// Nothing captured and no live camera.
    Idle,
    /// The camera could not be acquired.
    CameraError,
    /// Camera live, waiting for a usable selfie.
    Capturing,
    /// Clear selfie captured, waiting for the document.
    Validating,
    /// Document and clear selfie present.
    ReadyToSubmit,
    /// A verification request is in flight.
    Submitting,
    /// The last submission produced a result.
    Succeeded,
    /// The last submission failed.
    Failed,
}

impl Phase {
    /// Snake-case name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::CameraError => "camera_error",
            Phase::Capturing => "capturing",
            Phase::Validating => "validating",
            Phase::ReadyToSubmit => "ready_to_submit",
            Phase::Submitting => "submitting",
            Phase::Succeeded => "succeeded",
            Phase::Failed => "failed",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sharpness verdict of the current selfie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum BlurVerdict {
    /// No selfie evaluated yet.
    #[default]
    Unknown,
    /// Sharp enough to submit.
    Clear,
    /// Below the sharpness threshold.
    Blurry,
}

/// What a presentation layer needs to render the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionState {
    /// Current phase.
    pub phase: Phase,
    /// Verdict on the held selfie.
    pub blur_verdict: BlurVerdict,
    /// Whether a document is attached.
    pub has_document: bool,
    /// Whether a selfie is held, sharp or not.
    pub has_selfie: bool,
    /// Whether a verification result is held.
    pub has_result: bool,
    /// Error text of a failed submission; only set in [`Phase::Failed`].
    pub last_error: Option<String>,
    /// Message for the latest recoverable problem (camera, capture, blur, preconditions).
    pub notice: Option<String>,
}

impl SessionState {
    /// Whether `submit` would pass its local preconditions.
    pub fn can_submit(&self) -> bool {
        self.has_document
            && self.has_selfie
            && self.blur_verdict == BlurVerdict::Clear
            && self.phase != Phase::Submitting
    }
}

/// Counters accumulated over the lifetime of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SessionStats {
    /// Stills successfully captured and evaluated.
    pub captures: u64,
    /// Captured stills rejected as blurry.
    pub blurry_rejections: u64,
    /// Capture attempts that produced no frame.
    pub capture_failures: u64,
    /// Submissions sent to the service.
    pub submissions: u64,
    /// Submissions that produced a result.
    pub successes: u64,
    /// Failed submissions, including incomplete responses.
    pub failures: u64,
    /// Responses missing a required field.
    pub incomplete_responses: u64,
    /// Luma variance of the most recent capture.
    pub last_variance: Option<f64>,
}
