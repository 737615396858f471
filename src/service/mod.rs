//! Remote verification service boundary.
//!
//! The service is opaque: document parsing, age computation and face
//! matching all happen server-side. This module only builds the request
//! and validates the shape of the response.

mod client;
mod config;
mod payload;
mod response;

pub use client::{HttpVerificationClient, ServiceError, VerificationService};
pub use config::ServiceConfig;
pub use payload::{media_type_for, DocumentArtifact, SubmissionPayload, OCTET_STREAM};
pub use response::{
    ErrorBody, QualityReport, RawVerifyResponse, VerificationResult, DOB_FORMAT,
    GENERIC_SERVER_ERROR,
};
