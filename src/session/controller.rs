//! The capture/submission state machine.

use super::error::{Precondition, SessionError};
use super::state::{BlurVerdict, Phase, SessionState, SessionStats};
use crate::analysis::{SharpnessEstimator, SharpnessVerdict};
use crate::capture::{jpeg_bytes, Camera, CaptureConfig, Frame};
use crate::config::FileConfig;
use crate::service::{
    DocumentArtifact, ServiceError, SubmissionPayload, VerificationResult, VerificationService,
};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Mutable session data, guarded as one unit.
#[derive(Debug)]
struct Inner {
    phase: Phase,
    document: Option<DocumentArtifact>,
    selfie: Option<Frame>,
    blur: BlurVerdict,
    result: Option<VerificationResult>,
    last_error: Option<String>,
    notice: Option<String>,
    stats: SessionStats,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            document: None,
            selfie: None,
            blur: BlurVerdict::Unknown,
            result: None,
            last_error: None,
            notice: None,
            stats: SessionStats::default(),
        }
    }
}

impl Inner {
    fn transition(&mut self, to: Phase) {
        if self.phase != to {
            tracing::debug!(from = %self.phase, to = %to, "Session phase changed");
        }
        if to != Phase::Failed {
            self.last_error = None;
        }
        self.phase = to;
    }

    /// Phase implied by the artifacts currently held.
    fn artifact_phase(&self, camera_live: bool) -> Phase {
        match (self.document.is_some(), self.blur) {
            (true, BlurVerdict::Clear) => Phase::ReadyToSubmit,
            (false, BlurVerdict::Clear) => Phase::Validating,
            _ if camera_live => Phase::Capturing,
            _ if self.phase == Phase::CameraError => Phase::CameraError,
            _ => Phase::Idle,
        }
    }

    fn precondition(&self) -> Option<Precondition> {
        if self.document.is_none() {
            Some(Precondition::MissingDocument)
        } else if self.selfie.is_none() {
            Some(Precondition::MissingSelfie)
        } else if self.blur != BlurVerdict::Clear {
            Some(Precondition::SelfieNotCleared)
        } else {
            None
        }
    }

    /// Records a recoverable problem without changing phase.
    fn notify(&mut self, err: &SessionError) {
        self.notice = Some(err.user_message());
    }

    fn fail(&mut self, err: &SessionError) {
        self.stats.failures += 1;
        self.transition(Phase::Failed);
        self.last_error = Some(err.user_message());
        self.notice = None;
    }
}

/// Settles a submission whose future is dropped before the service answers.
///
/// Armed once the session enters [`Phase::Submitting`]; the normal
/// completion path disarms it.
struct InFlight<'a> {
    inner: &'a Mutex<Inner>,
    armed: bool,
}

impl<'a> InFlight<'a> {
    fn arm(inner: &'a Mutex<Inner>) -> Self {
        Self { inner, armed: true }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if inner.phase == Phase::Submitting {
            tracing::warn!(kind = "cancelled", "Verification abandoned before a response");
            inner.fail(&SessionError::Cancelled);
        }
    }
}

/// Drives capture, validation and submission for one user.
///
/// Operations take `&self` so the session can be shared with a UI task,
/// but they are serialized: while a submission is in flight every other
/// mutating operation is rejected with
/// [`SessionError::SubmissionInProgress`]. Internal locks are never held
/// across the network call.
pub struct CaptureSession<C, V> {
    camera: Mutex<C>,
    service: V,
    estimator: SharpnessEstimator,
    capture_config: CaptureConfig,
    inner: Mutex<Inner>,
}

impl<C: Camera, V: VerificationService> CaptureSession<C, V> {
    /// Creates a session with default capture and sharpness settings.
    pub fn new(camera: C, service: V) -> Self {
        Self {
            camera: Mutex::new(camera),
            service,
            estimator: SharpnessEstimator::new(),
            capture_config: CaptureConfig::default(),
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Creates a session using the capture and sharpness sections of a config file.
    pub fn from_config(camera: C, service: V, config: &FileConfig) -> Self {
        Self::new(camera, service)
            .with_capture_config(config.capture.clone())
            .with_estimator(SharpnessEstimator::from_config(&config.sharpness))
    }

    /// Replaces the capture settings used when the camera is opened.
    pub fn with_capture_config(mut self, config: CaptureConfig) -> Self {
        self.capture_config = config;
        self
    }

    /// Replaces the sharpness estimator.
    pub fn with_estimator(mut self, estimator: SharpnessEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    /// Returns the verification service.
    pub fn service(&self) -> &V {
        &self.service
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn camera(&self) -> MutexGuard<'_, C> {
        self.camera.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_idle_network(inner: &Inner) -> Result<(), SessionError> {
        if inner.phase == Phase::Submitting {
            tracing::warn!("Operation rejected while a submission is in flight");
            return Err(SessionError::SubmissionInProgress);
        }
        Ok(())
    }

    /// Snapshot of the session for rendering.
    pub fn state(&self) -> SessionState {
        let inner = self.inner();
        SessionState {
            phase: inner.phase,
            blur_verdict: inner.blur,
            has_document: inner.document.is_some(),
            has_selfie: inner.selfie.is_some(),
            has_result: inner.result.is_some(),
            last_error: inner.last_error.clone(),
            notice: inner.notice.clone(),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.inner().phase
    }

    /// The most recent successful verification result.
    pub fn result(&self) -> Option<VerificationResult> {
        self.inner().result.clone()
    }

    /// Counters accumulated since the session was created.
    pub fn stats(&self) -> SessionStats {
        self.inner().stats
    }

    /// Acquires the live camera.
    ///
    /// Failure moves the session to [`Phase::CameraError`]; the caller may
    /// retry.
    pub fn request_camera(&self) -> Result<(), SessionError> {
        let mut inner = self.inner();
        Self::ensure_idle_network(&inner)?;

        let opened = self.camera().open(&self.capture_config);
        match opened {
            Ok(()) => {
                inner.notice = None;
                let next = inner.artifact_phase(true);
                inner.transition(next);
                tracing::info!(phase = %inner.phase, "Camera acquired");
                Ok(())
            }
            Err(e) => {
                let err = SessionError::CameraUnavailable(e.to_string());
                tracing::warn!(error = %e, "Camera unavailable");
                inner.transition(Phase::CameraError);
                inner.notify(&err);
                Err(err)
            }
        }
    }

    /// Takes a still from the live camera and gates it on sharpness.
    ///
    /// A camera that yields nothing is a capture failure and leaves the
    /// session untouched. A blurry still is kept but blocks submission.
    pub fn capture_selfie(&self) -> Result<SharpnessVerdict, SessionError> {
        Self::ensure_idle_network(&self.inner())?;

        // Decoding a still can be slow; only the camera is locked meanwhile.
        let captured = {
            let mut camera = self.camera();
            if camera.is_open() {
                camera.capture().map_err(|e| e.to_string()).and_then(|frame| {
                    if frame.is_valid() {
                        Ok(frame)
                    } else {
                        Err("camera returned an empty frame".to_string())
                    }
                })
            } else {
                Err("camera is not active".to_string())
            }
        };

        let mut inner = self.inner();
        Self::ensure_idle_network(&inner)?;

        let frame = match captured {
            Ok(frame) => frame,
            Err(reason) => {
                let err = SessionError::CaptureFailure(reason);
                tracing::warn!(error = %err, "Selfie capture failed");
                inner.stats.capture_failures += 1;
                inner.notify(&err);
                return Err(err);
            }
        };

        let verdict = self.estimator.evaluate(&frame);
        inner.stats.captures += 1;
        inner.stats.last_variance = Some(verdict.variance());
        inner.result = None;
        inner.selfie = Some(frame);

        if verdict.is_blurry {
            let err = SessionError::QualityRejected {
                variance: verdict.variance(),
            };
            tracing::info!(variance = verdict.variance(), "Selfie rejected as blurry");
            inner.blur = BlurVerdict::Blurry;
            inner.stats.blurry_rejections += 1;
            inner.transition(Phase::Capturing);
            inner.notify(&err);
            return Err(err);
        }

        inner.blur = BlurVerdict::Clear;
        inner.notice = None;
        let next = inner.artifact_phase(true);
        inner.transition(next);
        tracing::info!(variance = verdict.variance(), phase = %next, "Selfie accepted");
        Ok(verdict)
    }

    /// Stores the identity document as given.
    pub fn attach_document(&self, document: DocumentArtifact) -> Result<Phase, SessionError> {
        let mut inner = self.inner();
        Self::ensure_idle_network(&inner)?;

        tracing::info!(
            file_name = document.file_name(),
            media_type = document.media_type(),
            bytes = document.bytes().len(),
            "Document attached"
        );
        inner.document = Some(document);
        inner.notice = None;

        let camera_live = self.camera().is_open();
        let next = inner.artifact_phase(camera_live);
        inner.transition(next);
        Ok(next)
    }

    /// Sends the document and selfie for verification.
    ///
    /// Local preconditions are checked first and never reach the network.
    /// The phase is `Submitting` only while the request is outstanding;
    /// it is `Succeeded` or `Failed` by the time this returns. There is no
    /// retry; call again to resubmit.
    pub async fn submit(&self) -> Result<VerificationResult, SessionError> {
        let payload = {
            let mut inner = self.inner();
            Self::ensure_idle_network(&inner)?;

            if let Some(missing) = inner.precondition() {
                let err = SessionError::PreconditionFailed(missing);
                tracing::info!(precondition = ?missing, "Submission blocked locally");
                inner.notify(&err);
                return Err(err);
            }

            let (Some(document), Some(selfie)) = (inner.document.as_ref(), inner.selfie.as_ref())
            else {
                return Err(SessionError::PreconditionFailed(Precondition::MissingDocument));
            };

            let jpeg = match jpeg_bytes(selfie, self.capture_config.jpeg_quality) {
                Ok(jpeg) => jpeg,
                Err(e) => {
                    let err = SessionError::CaptureFailure(format!("selfie could not be encoded: {e}"));
                    tracing::warn!(error = %e, "Selfie encoding failed");
                    inner.notify(&err);
                    return Err(err);
                }
            };

            let payload = SubmissionPayload::new(document.clone(), jpeg);
            inner.stats.submissions += 1;
            inner.notice = None;
            inner.transition(Phase::Submitting);
            payload
        };

        let in_flight = InFlight::arm(&self.inner);
        tracing::info!(?payload, "Submitting for verification");
        let outcome = self.service.verify(&payload).await;
        in_flight.disarm();

        let mut inner = self.inner();
        match outcome {
            Ok(result) => {
                tracing::info!(
                    age = result.age,
                    is_18_plus = result.is_18_plus,
                    is_match = ?result.is_match,
                    "Verification succeeded"
                );
                inner.result = Some(result.clone());
                inner.stats.successes += 1;
                inner.transition(Phase::Succeeded);
                Ok(result)
            }
            Err(ServiceError::Incomplete(missing)) => {
                let err = SessionError::IncompleteResponse { missing };
                tracing::warn!(kind = "incomplete_response", missing, "Verification response incomplete");
                inner.stats.incomplete_responses += 1;
                inner.fail(&err);
                Err(err)
            }
            Err(e) => {
                let err = SessionError::TransportError(e.to_string());
                tracing::warn!(kind = "transport", error = %e, "Verification request failed");
                inner.fail(&err);
                Err(err)
            }
        }
    }

    /// Releases the camera device.
    ///
    /// Held artifacts are kept; a session that was only waiting on the
    /// camera drops back out of [`Phase::Capturing`].
    pub fn close_camera(&self) -> Result<(), SessionError> {
        let mut inner = self.inner();
        Self::ensure_idle_network(&inner)?;

        self.camera().close();
        if inner.phase == Phase::Capturing {
            let next = inner.artifact_phase(false);
            inner.transition(next);
        }
        tracing::info!(phase = %inner.phase, "Camera released");
        Ok(())
    }

    /// Clears every artifact and returns to [`Phase::Idle`].
    ///
    /// The camera stays open; counters are kept.
    pub fn reset(&self) -> Result<(), SessionError> {
        let mut inner = self.inner();
        Self::ensure_idle_network(&inner)?;

        let stats = inner.stats;
        *inner = Inner {
            stats,
            ..Inner::default()
        };
        tracing::info!("Session reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{MockCamera, MockPattern};
    use crate::service::QualityReport;

    /// Service that answers every request with a fixed outcome.
    struct FixedService(Result<VerificationResult, ServiceError>);

    impl VerificationService for FixedService {
        async fn verify(
            &self,
            _payload: &SubmissionPayload,
        ) -> Result<VerificationResult, ServiceError> {
            self.0.clone()
        }
    }

    fn adult() -> VerificationResult {
        VerificationResult {
            dob: "01/01/1990".to_string(),
            age: 35,
            is_18_plus: true,
            is_match: Some(true),
            match_score: Some(92.5),
            quality: QualityReport::default(),
        }
    }

    fn document() -> DocumentArtifact {
        DocumentArtifact::new(vec![0x25, 0x50, 0x44, 0x46], "application/pdf", "id.pdf")
    }

    fn session(camera: MockCamera) -> CaptureSession<MockCamera, FixedService> {
        CaptureSession::new(camera, FixedService(Ok(adult())))
            .with_capture_config(CaptureConfig::with_dimensions(16, 16))
    }

    #[test]
    fn test_starts_idle() {
        let session = session(MockCamera::new());
        let state = session.state();

        assert_eq!(state.phase, Phase::Idle);
        assert_eq!(state.blur_verdict, BlurVerdict::Unknown);
        assert!(!state.has_document && !state.has_selfie && !state.has_result);
    }

    #[test]
    fn test_camera_error_is_recoverable() {
        let session = session(MockCamera::unavailable());
        let err = session.request_camera().unwrap_err();

        assert!(matches!(err, SessionError::CameraUnavailable(_)));
        let state = session.state();
        assert_eq!(state.phase, Phase::CameraError);
        assert_eq!(state.notice.as_deref(), Some("Camera not available."));
        assert_eq!(state.last_error, None);
    }

    #[test]
    fn test_capture_without_camera_leaves_state() {
        let session = session(MockCamera::new());
        let err = session.capture_selfie().unwrap_err();

        assert!(matches!(err, SessionError::CaptureFailure(_)));
        assert_eq!(session.phase(), Phase::Idle);
        assert!(!session.state().has_selfie);
        assert_eq!(session.stats().capture_failures, 1);
    }

    #[test]
    fn test_clear_selfie_then_document() {
        let session = session(MockCamera::new());
        session.request_camera().unwrap();
        assert_eq!(session.phase(), Phase::Capturing);

        let verdict = session.capture_selfie().unwrap();
        assert!(!verdict.is_blurry);
        assert_eq!(session.phase(), Phase::Validating);

        assert_eq!(session.attach_document(document()).unwrap(), Phase::ReadyToSubmit);
        assert!(session.state().can_submit());
    }

    #[test]
    fn test_document_then_clear_selfie() {
        let session = session(MockCamera::new());
        session.request_camera().unwrap();
        assert_eq!(session.attach_document(document()).unwrap(), Phase::Capturing);

        session.capture_selfie().unwrap();
        assert_eq!(session.phase(), Phase::ReadyToSubmit);
    }

    #[test]
    fn test_blurry_selfie_blocks() {
        let session = session(MockCamera::with_pattern(MockPattern::Uniform([90, 90, 90])));
        session.request_camera().unwrap();
        session.attach_document(document()).unwrap();

        let err = session.capture_selfie().unwrap_err();
        assert!(matches!(err, SessionError::QualityRejected { .. }));

        let state = session.state();
        assert_eq!(state.phase, Phase::Capturing);
        assert_eq!(state.blur_verdict, BlurVerdict::Blurry);
        assert!(state.has_selfie);
        assert_eq!(state.notice.as_deref(), Some("Image is blurry. Please retake."));
    }

    #[test]
    fn test_retake_after_blur() {
        let session = session(MockCamera::scripted([
            MockPattern::Uniform([0, 0, 0]),
            MockPattern::Checkerboard,
        ]));
        session.request_camera().unwrap();
        session.attach_document(document()).unwrap();

        assert!(session.capture_selfie().is_err());
        session.capture_selfie().unwrap();

        let state = session.state();
        assert_eq!(state.phase, Phase::ReadyToSubmit);
        assert_eq!(state.blur_verdict, BlurVerdict::Clear);
        assert_eq!(state.notice, None);
        assert_eq!(session.stats().captures, 2);
        assert_eq!(session.stats().blurry_rejections, 1);
    }

    #[test]
    fn test_empty_frame_is_capture_failure() {
        let session = session(MockCamera::scripted([MockPattern::Empty]));
        session.request_camera().unwrap();

        let err = session.capture_selfie().unwrap_err();
        assert!(matches!(err, SessionError::CaptureFailure(_)));
        assert_eq!(session.phase(), Phase::Capturing);
        assert_eq!(session.state().blur_verdict, BlurVerdict::Unknown);
    }

    #[test]
    fn test_attach_without_camera_stays_idle() {
        let session = session(MockCamera::new());
        assert_eq!(session.attach_document(document()).unwrap(), Phase::Idle);
        assert!(session.state().has_document);
    }

    #[test]
    fn test_reset_keeps_counters() {
        let session = session(MockCamera::new());
        session.request_camera().unwrap();
        session.capture_selfie().unwrap();
        session.attach_document(document()).unwrap();

        session.reset().unwrap();
        let state = session.state();
        assert_eq!(state.phase, Phase::Idle);
        assert!(!state.has_selfie && !state.has_document);
        assert_eq!(session.stats().captures, 1);
    }

    #[test]
    fn test_close_camera_keeps_artifacts() {
        let session = session(MockCamera::new());
        session.request_camera().unwrap();
        session.capture_selfie().unwrap();
        session.attach_document(document()).unwrap();

        session.close_camera().unwrap();
        assert_eq!(session.phase(), Phase::ReadyToSubmit);
        assert!(matches!(
            session.capture_selfie(),
            Err(SessionError::CaptureFailure(_))
        ));
        assert!(session.state().can_submit());
    }

    #[test]
    fn test_close_camera_while_capturing() {
        let session = session(MockCamera::with_pattern(MockPattern::Uniform([10, 10, 10])));
        session.request_camera().unwrap();
        assert!(session.capture_selfie().is_err());
        assert_eq!(session.phase(), Phase::Capturing);

        session.close_camera().unwrap();
        let state = session.state();
        assert_eq!(state.phase, Phase::Idle);
        assert_eq!(state.blur_verdict, BlurVerdict::Blurry);
        assert!(state.has_selfie);
    }
}
