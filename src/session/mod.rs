//! Capture and submission workflow.
//!
//! [`CaptureSession`] owns the document, the selfie, its blur verdict and
//! the outcome of the last submission. Presentation code reads a
//! [`SessionState`] snapshot and drives the session through four
//! mutating operations plus camera acquisition.
//!
//! ```text
//! Idle ──request_camera──► Capturing ──capture(clear)──► Validating
//!   │                        │  ▲                            │
//!   ▼                        │  └─capture(blurry)            │ attach_document
//! CameraError                └──capture(clear)+document──► ReadyToSubmit
//!                                                            │ submit
//!                                                            ▼
//!                                          Succeeded ◄── Submitting ──► Failed
//! ```

mod controller;
mod error;
mod state;

pub use controller::CaptureSession;
pub use error::{Precondition, SessionError};
pub use state::{BlurVerdict, Phase, SessionState, SessionStats};
