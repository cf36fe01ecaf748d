// ABOUTME: Cloudpaste SDK providing a single-shot multipart upload client for Cloudinary
// ABOUTME: Includes shared asset types, the uploader trait, errors, and client configuration

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use url::Url;

pub mod asset;
pub mod builder;
pub mod constants;
pub mod error;

#[cfg(test)]
mod test_helpers;

pub use asset::{ImageAsset, RemoteConfig, UploadOutcome, UploadedImage};
pub use builder::UploadClientConfig;
pub use error::UploadError;

pub type Result<T> = std::result::Result<T, UploadError>;

use constants::{fields, urls};

/// Capability the editor integration needs from an image host.
#[async_trait]
pub trait ImageUploader: Send + Sync {
    async fn upload(
        &self,
        asset: &ImageAsset,
        desired_name: Option<&str>,
        config: &RemoteConfig,
    ) -> Result<UploadedImage>;
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    secure_url: Option<String>,
    #[serde(default)]
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Clone)]
pub struct UploadClient {
    client: reqwest::Client,
    base_url: String,
}

impl UploadClient {
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn from_config(config: UploadClientConfig) -> Result<Self> {
        let base_url = config.resolved_base_url()?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| UploadError::Client(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Endpoint for unsigned uploads into the given cloud.
    ///
    /// The cloud name is a single path segment, so reserved characters are escaped.
    pub fn upload_url(&self, cloud_name: &str) -> Result<Url> {
        let invalid = |reason: String| {
            UploadError::Client(format!("Invalid base URL '{}': {}", self.base_url, reason))
        };

        let mut url = Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("cannot hold a path".to_string()))?
            .pop_if_empty()
            .push(urls::API_VERSION)
            .push(cloud_name)
            .push(urls::RESOURCE_TYPE)
            .push("upload");
        Ok(url)
    }

    fn build_form(
        asset: &ImageAsset,
        desired_name: Option<&str>,
        config: &RemoteConfig,
    ) -> Result<Form> {
        let file_name = format!(
            "{}.{}",
            desired_name.filter(|n| !n.is_empty()).unwrap_or("image"),
            asset.extension()
        );

        let file_part = Part::bytes(asset.bytes().to_vec())
            .file_name(file_name)
            .mime_str(asset.mime_type())
            .map_err(|e| {
                UploadError::Client(format!("Invalid MIME type '{}': {}", asset.mime_type(), e))
            })?;

        let mut form = Form::new()
            .part(fields::FILE, file_part)
            .text(fields::UPLOAD_PRESET, config.upload_preset.clone());

        if let Some(folder) = config.folder.as_deref().filter(|f| !f.is_empty()) {
            form = form.text(fields::FOLDER, folder.to_string());
        }
        if let Some(name) = desired_name.filter(|n| !n.is_empty()) {
            form = form.text(fields::PUBLIC_ID, name.to_string());
        }

        Ok(form)
    }

    /// Upload an image with exactly one POST request.
    ///
    /// Fails with [`UploadError::Configuration`] before touching the network when
    /// the cloud name or upload preset is empty. Success requires a `secure_url`
    /// in the response body; everything else is an error carrying the server or
    /// transport message. Failures are never retried.
    pub async fn upload_image(
        &self,
        asset: &ImageAsset,
        desired_name: Option<&str>,
        config: &RemoteConfig,
    ) -> Result<UploadedImage> {
        let missing = config.missing_fields();
        if !missing.is_empty() {
            return Err(UploadError::Configuration(missing.join(", ")));
        }

        let url = self.upload_url(config.cloud_name.trim())?;
        let form = Self::build_form(asset, desired_name, config)?;

        log::debug!(
            "Uploading {} ({} bytes) to {}",
            asset.mime_type(),
            asset.len(),
            url
        );

        let response = self.client.post(url).multipart(form).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<UploadResponse>(&body)
                .ok()
                .and_then(|r| r.error)
                .map(|e| e.message)
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("unexpected status")
                        .to_string()
                });
            return Err(UploadError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: UploadResponse = serde_json::from_str(&body)?;
        match parsed.secure_url.filter(|u| !u.is_empty()) {
            Some(secure_url) => {
                log::info!("Upload complete: {}", secure_url);
                Ok(UploadedImage { secure_url })
            }
            None => Err(UploadError::MissingSecureUrl),
        }
    }
}

#[async_trait]
impl ImageUploader for UploadClient {
    async fn upload(
        &self,
        asset: &ImageAsset,
        desired_name: Option<&str>,
        config: &RemoteConfig,
    ) -> Result<UploadedImage> {
        self.upload_image(asset, desired_name, config).await
    }
}
