#![allow(dead_code)]

use axum::body::Bytes;
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use capture_verify::capture::{CaptureConfig, MockCamera};
use capture_verify::service::{
    DocumentArtifact, QualityReport, ServiceError, SubmissionPayload, VerificationResult,
    VerificationService,
};
use capture_verify::session::CaptureSession;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const ADULT_JSON: &str = r#"{
    "dob": "15/08/2001",
    "age": 23,
    "is18Plus": true,
    "isMatch": true,
    "matchScore": 87.5,
    "quality": {"id_quality": "good", "selfie_quality": "good"}
}"#;

pub fn adult() -> VerificationResult {
    VerificationResult {
        dob: "15/08/2001".to_string(),
        age: 23,
        is_18_plus: true,
        is_match: Some(true),
        match_score: Some(87.5),
        quality: QualityReport {
            id_quality: Some("good".to_string()),
            selfie_quality: Some("good".to_string()),
        },
    }
}

pub fn document() -> DocumentArtifact {
    DocumentArtifact::new(b"%PDF-1.4 test".to_vec(), "application/pdf", "id.pdf")
}

pub fn small_capture() -> CaptureConfig {
    CaptureConfig::with_dimensions(16, 16)
}

/// Service double that replays queued replies and records every payload.
#[derive(Default)]
pub struct ScriptedService {
    replies: Mutex<VecDeque<Result<VerificationResult, ServiceError>>>,
    payloads: Mutex<Vec<SubmissionPayload>>,
    calls: AtomicUsize,
}

impl ScriptedService {
    pub fn replying(replies: impl IntoIterator<Item = Result<VerificationResult, ServiceError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_payload(&self) -> Option<SubmissionPayload> {
        self.payloads.lock().unwrap().last().cloned()
    }
}

impl VerificationService for ScriptedService {
    async fn verify(
        &self,
        payload: &SubmissionPayload,
    ) -> Result<VerificationResult, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.payloads.lock().unwrap().push(payload.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(adult()))
    }
}

pub fn session_with(
    camera: MockCamera,
    service: ScriptedService,
) -> CaptureSession<MockCamera, ScriptedService> {
    CaptureSession::new(camera, service).with_capture_config(small_capture())
}

/// Session holding a document and a clear selfie.
pub fn ready_session<V: VerificationService>(service: V) -> CaptureSession<MockCamera, V> {
    let session = CaptureSession::new(MockCamera::new(), service).with_capture_config(small_capture());
    session.request_camera().unwrap();
    session.capture_selfie().unwrap();
    session.attach_document(document()).unwrap();
    session
}

/// What the fake backend saw.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub content_type: String,
    pub body: Vec<u8>,
}

/// Starts a fake verification backend answering every `POST /verify`
/// with `status` and `body`. Returns its base URL.
pub async fn spawn_backend(
    status: StatusCode,
    body: &'static str,
) -> (String, Arc<Mutex<Vec<SeenRequest>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&seen);

    let app = Router::new().route(
        "/verify",
        post(move |headers: HeaderMap, request: Bytes| {
            let recorder = Arc::clone(&recorder);
            async move {
                let content_type = headers
                    .get(header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                recorder.lock().unwrap().push(SeenRequest {
                    content_type,
                    body: request.to_vec(),
                });
                (status, [(header::CONTENT_TYPE, "application/json")], body)
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), seen)
}
