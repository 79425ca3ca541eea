use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Failure modes of a comparison. The two no-face causes stay distinct
/// because the check-in response reports them differently.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FaceVerifyError {
    #[error("No face detected in the check-in image.")]
    NoFaceInSubmitted,
    #[error("No face detected in the reference image.")]
    NoFaceInReference,
    #[error("face service failure: {0}")]
    Service(String),
}

/// "Do these two images depict the same person?" as a black-box predicate.
#[async_trait]
pub trait FaceVerifier: Send + Sync {
    async fn compare(
        &self,
        submitted_url: &str,
        reference_url: &str,
    ) -> Result<bool, FaceVerifyError>;
}

#[derive(Deserialize)]
struct CompareResponse {
    verified: bool,
}

#[derive(Deserialize)]
struct CompareError {
    error: String,
}

/// Adapter for the HTTP comparison service. Owns transport details only:
/// request shape, timeout, and mapping the service's error codes onto
/// `FaceVerifyError`.
pub struct HttpFaceVerifier {
    client: Client,
    endpoint: String,
}

impl HttpFaceVerifier {
    pub fn new(base_url: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/compare", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl FaceVerifier for HttpFaceVerifier {
    async fn compare(
        &self,
        submitted_url: &str,
        reference_url: &str,
    ) -> Result<bool, FaceVerifyError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({
                "image_a": submitted_url,
                "image_b": reference_url,
            }))
            .send()
            .await
            .map_err(|e| FaceVerifyError::Service(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNPROCESSABLE_ENTITY {
            let body: CompareError = response
                .json()
                .await
                .map_err(|e| FaceVerifyError::Service(e.to_string()))?;
            return Err(match body.error.as_str() {
                "no_face_in_image_a" => FaceVerifyError::NoFaceInSubmitted,
                "no_face_in_image_b" => FaceVerifyError::NoFaceInReference,
                other => FaceVerifyError::Service(other.to_string()),
            });
        }
        if !status.is_success() {
            return Err(FaceVerifyError::Service(format!(
                "unexpected status {status}"
            )));
        }

        let body: CompareResponse = response
            .json()
            .await
            .map_err(|e| FaceVerifyError::Service(e.to_string()))?;
        Ok(body.verified)
    }
}
