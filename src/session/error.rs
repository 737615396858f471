//! Session error taxonomy.
//!
//! Every error is recoverable: the session records it and the user can
//! retry the step that failed.

use std::fmt;
use thiserror::Error;

/// A local submission precondition that was not met.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    /// No identity document attached.
    MissingDocument,
    /// No selfie captured.
    MissingSelfie,
    /// The selfie was judged blurry.
    SelfieNotCleared,
}

impl fmt::Display for Precondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precondition::MissingDocument => f.write_str("Aadhaar document is required."),
            Precondition::MissingSelfie => f.write_str("Selfie is required."),
            Precondition::SelfieNotCleared => f.write_str("Blurry selfie. Please recapture."),
        }
    }
}

/// Errors surfaced by [`CaptureSession`](super::CaptureSession) operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SessionError {
    /// The camera could not be opened.
    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),

    /// The camera produced no usable frame.
    #[error("capture failed: {0}")]
    CaptureFailure(String),

    /// The selfie fell below the sharpness threshold.
    #[error("selfie rejected as blurry (luma variance {variance:.2})")]
    QualityRejected {
        /// Measured luma variance.
        variance: f64,
    },

    /// Submission was blocked locally.
    #[error("precondition failed: {0}")]
    PreconditionFailed(Precondition),

    /// The service was unreachable or answered with an error.
    #[error("verification transport error: {0}")]
    TransportError(String),

    /// The service answered without a required field.
    #[error("verification response missing required field `{missing}`")]
    IncompleteResponse {
        /// Wire name of the missing field.
        missing: &'static str,
    },

    /// The caller abandoned the submission before the service answered.
    #[error("verification cancelled before a response arrived")]
    Cancelled,

    /// Another submission is still in flight.
    #[error("a verification request is already in flight")]
    SubmissionInProgress,
}

impl SessionError {
    /// Text shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            SessionError::CameraUnavailable(_) => "Camera not available.".to_string(),
            SessionError::CaptureFailure(_) => "Camera capture failed.".to_string(),
            SessionError::QualityRejected { .. } => "Image is blurry. Please retake.".to_string(),
            SessionError::PreconditionFailed(p) => p.to_string(),
            SessionError::TransportError(msg) => format!("Verification failed: {msg}"),
            SessionError::IncompleteResponse { .. } => {
                "Verification failed: Incomplete data from server".to_string()
            }
            SessionError::Cancelled => "Verification cancelled.".to_string(),
            SessionError::SubmissionInProgress => "Verification already in progress.".to_string(),
        }
    }
}
