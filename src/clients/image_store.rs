use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ImageStoreError {
    #[error("image store failure: {0}")]
    Service(String),
}

/// What the store hands back after an upload: a public URL for the face
/// service to fetch, and the opaque handle needed to delete the object.
#[derive(Debug, Clone, Deserialize)]
pub struct StoredImage {
    pub url: String,
    pub handle: String,
}

/// Binary-object storage for images, addressed by opaque handle.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        folder: &str,
    ) -> Result<StoredImage, ImageStoreError>;
    async fn delete(&self, handle: &str) -> Result<(), ImageStoreError>;
}

pub struct HttpImageStore {
    client: Client,
    base_url: String,
}

impl HttpImageStore {
    pub fn new(base_url: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ImageStore for HttpImageStore {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        folder: &str,
    ) -> Result<StoredImage, ImageStoreError> {
        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(filename.to_string()))
            .text("folder", folder.to_string());

        let response = self
            .client
            .post(format!("{}/upload", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ImageStoreError::Service(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageStoreError::Service(format!(
                "upload failed with status {status}"
            )));
        }

        response
            .json::<StoredImage>()
            .await
            .map_err(|e| ImageStoreError::Service(e.to_string()))
    }

    async fn delete(&self, handle: &str) -> Result<(), ImageStoreError> {
        let response = self
            .client
            .post(format!("{}/delete", self.base_url))
            .json(&serde_json::json!({ "handle": handle }))
            .send()
            .await
            .map_err(|e| ImageStoreError::Service(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageStoreError::Service(format!(
                "delete failed with status {status}"
            )));
        }
        Ok(())
    }
}
