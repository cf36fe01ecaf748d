// ABOUTME: Builder pattern implementation for UploadClient configuration
// ABOUTME: Provides typed configuration with defaults for timeout, endpoint and user agent

use crate::constants::{timeouts, urls, USER_AGENT};
use crate::error::UploadError;
use crate::UploadClient;
use std::time::Duration;
use typed_builder::TypedBuilder;
use url::Url;

#[derive(Debug, TypedBuilder)]
#[builder(build_method(into = Result<UploadClient, UploadError>))]
pub struct UploadClientConfig {
    #[builder(default = timeouts::HTTP_REQUEST_TIMEOUT)]
    pub timeout: Duration,

    /// Overrides the API host, e.g. to point at a local mock server
    #[builder(default = None)]
    pub base_url: Option<String>,

    #[builder(default = USER_AGENT.to_string())]
    pub user_agent: String,
}

impl From<UploadClientConfig> for Result<UploadClient, UploadError> {
    fn from(config: UploadClientConfig) -> Self {
        UploadClient::from_config(config)
    }
}

impl UploadClientConfig {
    /// Parse and normalise the configured base URL (no trailing slash)
    pub fn resolved_base_url(&self) -> Result<String, UploadError> {
        let raw = self.base_url.as_deref().unwrap_or(urls::CLOUDINARY_API_BASE);
        let parsed = Url::parse(raw)
            .map_err(|e| UploadError::Client(format!("Invalid base URL '{}': {}", raw, e)))?;

        match parsed.scheme() {
            "http" | "https" => Ok(parsed.as_str().trim_end_matches('/').to_string()),
            other => Err(UploadError::Client(format!(
                "Unsupported base URL scheme '{}'",
                other
            ))),
        }
    }
}

impl UploadClient {
    pub fn builder() -> UploadClientConfigBuilder<((), (), ())> {
        UploadClientConfig::builder()
    }
}
