pub mod admins;
pub mod users;

use crate::error::{ApiError, ApiResult};
use actix_multipart::Multipart;
use futures_util::TryStreamExt;
use std::collections::HashMap;

pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// A drained multipart form: text fields by name, plus the optional
/// `face_image` file part.
pub struct MultipartForm {
    fields: HashMap<String, String>,
    pub face_image: Option<UploadedFile>,
}

impl MultipartForm {
    pub fn take(&mut self, name: &str) -> Option<String> {
        self.fields.remove(name)
    }

    pub fn require(&mut self, name: &str) -> ApiResult<String> {
        self.take(name)
            .ok_or_else(|| ApiError::invalid_request(format!("Missing form field: {name}")))
    }
}

pub async fn read_form(mut payload: Multipart) -> ApiResult<MultipartForm> {
    let malformed = |e: actix_multipart::MultipartError| {
        ApiError::invalid_request(format!("Malformed multipart body: {e}"))
    };

    let mut fields = HashMap::new();
    let mut face_image = None;

    while let Some(mut field) = payload.try_next().await.map_err(malformed)? {
        let disposition = field.content_disposition();
        let name = disposition.get_name().unwrap_or("").to_string();
        let filename = disposition.get_filename().map(|f| f.to_string());

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(malformed)? {
            bytes.extend_from_slice(&chunk);
        }

        if name == "face_image" {
            // Browsers send an empty part for an unfilled file input.
            if let Some(filename) = filename {
                if !bytes.is_empty() {
                    face_image = Some(UploadedFile { filename, bytes });
                }
            }
        } else if !name.is_empty() {
            fields.insert(name, String::from_utf8_lossy(&bytes).into_owned());
        }
    }

    Ok(MultipartForm { fields, face_image })
}
