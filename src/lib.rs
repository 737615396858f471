//! Capture Verify Library
//!
//! Client-side capture front end for remote identity verification.
//! Collects an identity document and a live selfie, rejects blurry
//! selfies locally, and performs a single request/response exchange
//! with a verification service.
//!
//! # Architecture
//!
//! ```text
//! camera/file → capture → analysis (sharpness gate)
//!                   ↓            ↓
//!                 session (state machine) → service (HTTP)
//!                   ↓
//!                 metrics
//! ```
//!
//! # Design Principles
//!
//! - **Gate locally, decide remotely**: the only local check is a luma
//!   variance focus proxy; face matching, OCR and age are server-side
//! - **Explicit phases**: illegal combinations such as "ready to submit"
//!   without a document are not representable
//! - **At most one request in flight**: overlapping submissions are rejected
//! - **No silent retries**: biometric data is only re-sent on request
//!
//! # Example
//!
//! ```no_run
//! use capture_verify::{
//!     capture::MockCamera,
//!     service::{DocumentArtifact, HttpVerificationClient, ServiceConfig},
//!     session::CaptureSession,
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpVerificationClient::new(&ServiceConfig::default())?;
//! let session = CaptureSession::new(MockCamera::new(), client);
//!
//! session.request_camera()?;
//! session.capture_selfie()?;
//! session.attach_document(DocumentArtifact::from_path("aadhaar.pdf")?)?;
//!
//! let result = session.submit().await?;
//! println!("{result}");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod analysis;
pub mod capture;
pub mod config;
pub mod metrics;
pub mod service;
pub mod session;

// Re-export commonly used types at crate root
pub use analysis::{SharpnessConfig, SharpnessEstimator, SharpnessVerdict};
pub use capture::{Camera, CaptureConfig, Frame, MockCamera, StillImageCamera};
pub use config::{ConfigError, FileConfig};
pub use service::{
    DocumentArtifact, HttpVerificationClient, ServiceConfig, SubmissionPayload,
    VerificationResult, VerificationService,
};
pub use session::{BlurVerdict, CaptureSession, Phase, SessionError, SessionState};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
