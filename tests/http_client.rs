mod common;

use axum::http::StatusCode;
use capture_verify::capture::MockCamera;
use capture_verify::service::{
    HttpVerificationClient, ServiceConfig, ServiceError, SubmissionPayload, VerificationService,
    GENERIC_SERVER_ERROR,
};
use capture_verify::session::{CaptureSession, Phase, SessionError};
use common::{adult, document, small_capture, spawn_backend, ADULT_JSON};

fn client_for(base_url: &str) -> HttpVerificationClient {
    HttpVerificationClient::new(&ServiceConfig::with_base_url(base_url)).unwrap()
}

fn payload() -> SubmissionPayload {
    SubmissionPayload::new(document(), vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10])
}

#[tokio::test]
async fn sends_multipart_and_parses_result() {
    let (url, seen) = spawn_backend(StatusCode::OK, ADULT_JSON).await;

    let result = client_for(&url).verify(&payload()).await.unwrap();
    assert_eq!(result, adult());

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].content_type.starts_with("multipart/form-data"));

    let body = String::from_utf8_lossy(&seen[0].body).to_lowercase();
    assert!(body.contains(r#"name="aadhar""#));
    assert!(body.contains(r#"filename="id.pdf""#));
    assert!(body.contains("content-type: application/pdf"));
    assert!(body.contains(r#"name="selfie""#));
    assert!(body.contains(r#"filename="selfie.jpg""#));
    assert!(body.contains("content-type: image/jpeg"));
}

#[tokio::test]
async fn server_error_field_is_used() {
    let (url, _) = spawn_backend(
        StatusCode::BAD_REQUEST,
        r#"{"error":"Both Aadhaar and Selfie images are required"}"#,
    )
    .await;

    let err = client_for(&url).verify(&payload()).await.unwrap_err();
    assert_eq!(
        err,
        ServiceError::Rejected {
            status: 400,
            message: "Both Aadhaar and Selfie images are required".to_string(),
        }
    );
}

#[tokio::test]
async fn unrecognized_error_body_falls_back() {
    let (url, _) = spawn_backend(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>").await;

    let err = client_for(&url).verify(&payload()).await.unwrap_err();
    assert_eq!(
        err,
        ServiceError::Rejected {
            status: 502,
            message: GENERIC_SERVER_ERROR.to_string(),
        }
    );
}

#[tokio::test]
async fn malformed_success_body_is_invalid() {
    let (url, _) = spawn_backend(StatusCode::OK, "not json").await;

    let err = client_for(&url).verify(&payload()).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidResponse(_)));
}

#[tokio::test]
async fn missing_required_field_is_incomplete() {
    let (url, _) = spawn_backend(StatusCode::OK, r#"{"dob":"15/08/2001","is18Plus":true}"#).await;

    let err = client_for(&url).verify(&payload()).await.unwrap_err();
    assert_eq!(err, ServiceError::Incomplete("age"));
}

#[tokio::test]
async fn unreachable_service() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client_for(&format!("http://{addr}"))
        .verify(&payload())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Unreachable(_)));
}

#[tokio::test]
async fn session_over_http_fails_on_missing_age() {
    let (url, seen) = spawn_backend(StatusCode::OK, r#"{"dob":"15/08/2001","is18Plus":true}"#).await;

    let session = CaptureSession::new(MockCamera::new(), client_for(&url))
        .with_capture_config(small_capture());
    session.request_camera().unwrap();
    session.capture_selfie().unwrap();
    session.attach_document(document()).unwrap();

    let err = session.submit().await.unwrap_err();
    assert_eq!(err, SessionError::IncompleteResponse { missing: "age" });
    assert_eq!(session.phase(), Phase::Failed);
    assert!(session.result().is_none());
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn session_over_http_succeeds() {
    let (url, _) = spawn_backend(StatusCode::OK, ADULT_JSON).await;

    let session = CaptureSession::new(MockCamera::new(), client_for(&url))
        .with_capture_config(small_capture());
    session.request_camera().unwrap();
    session.capture_selfie().unwrap();
    session.attach_document(document()).unwrap();

    let result = session.submit().await.unwrap();
    assert_eq!(result.date_of_birth().map(|d| d.to_string()), Some("2001-08-15".to_string()));
    assert_eq!(session.phase(), Phase::Succeeded);
}
