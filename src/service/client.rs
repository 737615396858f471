//! HTTP client for the verification service.

use super::payload::SubmissionPayload;
use super::response::{ErrorBody, RawVerifyResponse, VerificationResult};
use super::ServiceConfig;
use reqwest::multipart::{Form, Part};
use std::future::Future;
use thiserror::Error;

/// Errors returned by a verification exchange.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ServiceError {
    /// The service could not be reached or timed out.
    #[error("service unreachable: {0}")]
    Unreachable(String),
    /// The service answered with a non-success status.
    #[error("{message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Server message, or the generic fallback.
        message: String,
    },
    /// The response body was not valid JSON of the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    /// The response parsed but lacked a required field.
    #[error("Incomplete data from server (missing {0})")]
    Incomplete(&'static str),
    /// The request itself could not be built.
    #[error("failed to build request: {0}")]
    Request(String),
}

/// The remote verification collaborator.
///
/// One call carries one document and one selfie; implementations do not
/// retry.
pub trait VerificationService {
    /// Submits one payload and validates the answer.
    fn verify(
        &self,
        payload: &SubmissionPayload,
    ) -> impl Future<Output = Result<VerificationResult, ServiceError>> + Send;
}

/// Sends submissions to the service as `multipart/form-data`.
///
/// Parts: `aadhar` carries the document under its own media type and
/// file name, `selfie` carries the JPEG as `selfie.jpg`.
pub struct HttpVerificationClient {
    /// HTTP client (reusable connection pool).
    http_client: reqwest::Client,
    endpoint: String,
}

impl HttpVerificationClient {
    /// Creates a client for the configured endpoint.
    pub fn new(config: &ServiceConfig) -> Result<Self, ServiceError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| ServiceError::Request(e.to_string()))?;
        Ok(Self {
            http_client,
            endpoint: config.endpoint(),
        })
    }

    /// Returns the endpoint URL requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn form(payload: &SubmissionPayload) -> Result<Form, ServiceError> {
        let document = payload.document();
        let aadhar = Part::bytes(document.bytes().to_vec())
            .file_name(document.file_name().to_string())
            .mime_str(document.media_type())
            .map_err(|e| ServiceError::Request(e.to_string()))?;
        let selfie = Part::bytes(payload.selfie_jpeg().to_vec())
            .file_name(SubmissionPayload::SELFIE_FILE_NAME)
            .mime_str("image/jpeg")
            .map_err(|e| ServiceError::Request(e.to_string()))?;

        Ok(Form::new().part("aadhar", aadhar).part("selfie", selfie))
    }
}

impl VerificationService for HttpVerificationClient {
    async fn verify(
        &self,
        payload: &SubmissionPayload,
    ) -> Result<VerificationResult, ServiceError> {
        let form = Self::form(payload)?;

        let response = self
            .http_client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ServiceError::Unreachable(format!("request timed out: {e}"))
                } else if e.is_connect() {
                    ServiceError::Unreachable(format!("connection failed: {e}"))
                } else {
                    ServiceError::Unreachable(e.to_string())
                }
            })?;
        tracing::debug!(endpoint = %self.endpoint, status = %response.status(), "Verification request sent");

        let status = response.status();
        if !status.is_success() {
            // A body that is not JSON still maps to the generic message.
            let body = response.json::<ErrorBody>().await.unwrap_or_default();
            return Err(ServiceError::Rejected {
                status: status.as_u16(),
                message: body.message(),
            });
        }

        let raw: RawVerifyResponse = response.json().await.map_err(|e| {
            ServiceError::InvalidResponse(format!("failed to parse verification response: {e}"))
        })?;

        VerificationResult::try_from(raw).map_err(ServiceError::Incomplete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_uses_configured_endpoint() {
        let config = ServiceConfig::with_base_url("http://localhost:8080/");
        let client = HttpVerificationClient::new(&config).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8080/verify");
    }

    #[test]
    fn test_rejected_displays_server_message() {
        let err = ServiceError::Rejected {
            status: 400,
            message: "Invalid file format".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid file format");
    }

    #[test]
    fn test_incomplete_display() {
        assert_eq!(
            ServiceError::Incomplete("age").to_string(),
            "Incomplete data from server (missing age)"
        );
    }
}
