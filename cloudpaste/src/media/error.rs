// ABOUTME: Error type for the decode, resize and encode stages of image processing
// ABOUTME: Keeps decode and encode failures distinguishable for callers and notifications

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Failed to load image: {0}")]
    Decode(String),

    #[error("Failed to encode image as {mime_type}: {message}")]
    Encode { mime_type: String, message: String },
}

impl ImageError {
    pub fn encode(mime_type: &str, message: impl Into<String>) -> Self {
        ImageError::Encode {
            mime_type: mime_type.to_string(),
            message: message.into(),
        }
    }
}
