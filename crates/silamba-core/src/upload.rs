//! Hosted image upload.
//!
//! Admin forms take image URLs. This uploads a local file to ImageKit or
//! Cloudinary (unsigned) and returns a delivery URL with automatic format
//! and quality transforms applied.

use std::path::{Path, PathBuf};

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use crate::utils::truncate_string;

const IMAGEKIT_UPLOAD_URL: &str = "https://upload.imagekit.io/api/v1/files/upload";
const CLOUDINARY_UPLOAD_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Unsigned preset used when none is configured.
pub const DEFAULT_CLOUDINARY_PRESET: &str = "ml_default";

const FALLBACK_MESSAGE: &str = "Upload failed";

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Image upload is not configured: {0} is missing")]
    NotConfigured(&'static str),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Upload request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{message} (HTTP {status})")]
    Rejected { status: u16, message: String },

    #[error("Unexpected upload response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadProvider {
    #[default]
    ImageKit,
    Cloudinary,
}

/// Provider plus the account details it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadTarget {
    ImageKit { public_key: String },
    Cloudinary { cloud_name: String, upload_preset: String },
}

impl UploadTarget {
    pub fn provider(&self) -> UploadProvider {
        match self {
            UploadTarget::ImageKit { .. } => UploadProvider::ImageKit,
            UploadTarget::Cloudinary { .. } => UploadProvider::Cloudinary,
        }
    }

    fn endpoint(&self) -> String {
        match self {
            UploadTarget::ImageKit { .. } => IMAGEKIT_UPLOAD_URL.to_string(),
            UploadTarget::Cloudinary { cloud_name, .. } => {
                format!("{}/{}/image/upload", CLOUDINARY_UPLOAD_BASE, cloud_name)
            }
        }
    }
}

/// ImageKit delivery URL with auto format and 80% quality.
pub fn imagekit_optimized(url: &str) -> String {
    format!("{}?tr=f-auto,q-80", url)
}

/// Cloudinary delivery URL with auto format and quality.
pub fn cloudinary_optimized(secure_url: &str) -> String {
    secure_url.replacen("/upload/", "/upload/f_auto,q_auto/", 1)
}

/// Error text from a provider's error body: `message`, then
/// `error.message`, else a generic fallback.
pub fn provider_error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return FALLBACK_MESSAGE.to_string();
    };
    value
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| value.pointer("/error/message").and_then(Value::as_str))
        .filter(|m| !m.is_empty())
        .unwrap_or(FALLBACK_MESSAGE)
        .to_string()
}

pub struct ImageUploader {
    client: Client,
    target: UploadTarget,
    endpoint: String,
}

impl ImageUploader {
    pub fn new(target: UploadTarget) -> Result<Self, UploadError> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(client, target))
    }

    pub fn with_client(client: Client, target: UploadTarget) -> Self {
        let endpoint = target.endpoint();
        Self {
            client,
            target,
            endpoint,
        }
    }

    /// Send uploads somewhere other than the provider's public endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn target(&self) -> &UploadTarget {
        &self.target
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn upload_file(&self, path: &Path) -> Result<String, UploadError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| UploadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        self.upload_bytes(&file_name, bytes).await
    }

    pub async fn upload_bytes(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, UploadError> {
        let file = Part::bytes(bytes).file_name(file_name.to_string());
        let form = match &self.target {
            UploadTarget::ImageKit { public_key } => Form::new()
                .part("file", file)
                .text("fileName", file_name.to_string())
                .text("publicKey", public_key.clone())
                .text("upload_preset", "default"),
            UploadTarget::Cloudinary { upload_preset, .. } => Form::new()
                .part("file", file)
                .text("upload_preset", upload_preset.clone()),
        };

        debug!(provider = ?self.target.provider(), file_name, "Uploading image");
        let response = self.client.post(&self.endpoint).multipart(form).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = provider_error_message(&body);
            error!(status = status.as_u16(), body = %truncate_string(&body, 200), "Image upload rejected");
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let value: Value = serde_json::from_str(&body)
            .map_err(|e| UploadError::InvalidResponse(e.to_string()))?;
        match &self.target {
            UploadTarget::ImageKit { .. } => value
                .get("url")
                .and_then(Value::as_str)
                .map(imagekit_optimized)
                .ok_or_else(|| UploadError::InvalidResponse("missing `url`".to_string())),
            UploadTarget::Cloudinary { .. } => value
                .get("secure_url")
                .and_then(Value::as_str)
                .map(cloudinary_optimized)
                .ok_or_else(|| UploadError::InvalidResponse("missing `secure_url`".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_imagekit_transform() {
        assert_eq!(
            imagekit_optimized("https://ik.imagekit.io/studio/a.jpg"),
            "https://ik.imagekit.io/studio/a.jpg?tr=f-auto,q-80"
        );
    }

    #[test]
    fn test_cloudinary_transform_first_segment_only() {
        assert_eq!(
            cloudinary_optimized("https://res.cloudinary.com/demo/image/upload/v1/upload/a.jpg"),
            "https://res.cloudinary.com/demo/image/upload/f_auto,q_auto/v1/upload/a.jpg"
        );
    }

    #[test]
    fn test_error_message_sources() {
        assert_eq!(provider_error_message(r#"{"message":"Invalid key"}"#), "Invalid key");
        assert_eq!(
            provider_error_message(r#"{"error":{"message":"Upload preset not found"}}"#),
            "Upload preset not found"
        );
        assert_eq!(provider_error_message(r#"{"status":"bad"}"#), "Upload failed");
        assert_eq!(provider_error_message("<html>502</html>"), "Upload failed");
    }

    #[test]
    fn test_cloudinary_endpoint_uses_cloud_name() {
        let target = UploadTarget::Cloudinary {
            cloud_name: "studio".to_string(),
            upload_preset: DEFAULT_CLOUDINARY_PRESET.to_string(),
        };
        assert_eq!(
            target.endpoint(),
            "https://api.cloudinary.com/v1_1/studio/image/upload"
        );
        assert_eq!(target.provider(), UploadProvider::Cloudinary);
    }
}
