// ABOUTME: Custom error types for the upload SDK with user-friendly messages
// ABOUTME: Distinguishes configuration problems from transport and response failures

use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Cloudinary settings not configured (missing {0})")]
    Configuration(String),

    #[error("Upload failed: {0}")]
    Network(String),

    #[error("Upload failed: request timed out")]
    Timeout,

    #[error("Upload failed: server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Upload failed: response did not include a secure_url")]
    MissingSecureUrl,

    #[error("Upload failed: invalid response body: {0}")]
    InvalidResponse(String),

    #[error("Invalid client configuration: {0}")]
    Client(String),
}

impl UploadError {
    pub fn help_text(&self) -> Option<&'static str> {
        match self {
            UploadError::Configuration(_) => Some(
                "Set your cloud name and an unsigned upload preset:\n  cloudpaste config set cloud_name <name>\n  cloudpaste config set upload_preset <preset>",
            ),
            UploadError::Network(_) | UploadError::Timeout => {
                Some("Check your internet connection and paste the image again")
            }
            UploadError::Status { status: 400..=499, .. } => Some(
                "Check that the upload preset exists and is configured for unsigned uploads",
            ),
            _ => None,
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, UploadError::Configuration(_))
    }
}

impl From<reqwest::Error> for UploadError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UploadError::Timeout
        } else if let Some(status) = err.status() {
            UploadError::Status {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else if err.is_decode() {
            UploadError::InvalidResponse(err.to_string())
        } else {
            UploadError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for UploadError {
    fn from(err: serde_json::Error) -> Self {
        UploadError::InvalidResponse(err.to_string())
    }
}
