// ABOUTME: Top-level error type for the paste pipeline
// ABOUTME: Wraps image processing and upload failures so one handler can report both

use crate::media::ImageError;
use cloudpaste_sdk::UploadError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasteError {
    #[error(transparent)]
    Image(#[from] ImageError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("Image processing task failed: {0}")]
    Task(String),
}

impl PasteError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, PasteError::Upload(e) if e.is_configuration())
    }

    pub fn help_text(&self) -> Option<&'static str> {
        match self {
            PasteError::Upload(e) => e.help_text(),
            PasteError::Image(ImageError::Decode(_)) => {
                Some("The pasted data could not be read as an image. Check the file is not truncated")
            }
            PasteError::Image(ImageError::Encode { .. }) => {
                Some("Try again without compression to keep the original format")
            }
            PasteError::Task(_) => None,
        }
    }
}

impl From<tokio::task::JoinError> for PasteError {
    fn from(err: tokio::task::JoinError) -> Self {
        PasteError::Task(err.to_string())
    }
}
