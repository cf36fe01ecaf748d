// ABOUTME: Immutable image payload and remote destination types shared by the SDK and callers
// ABOUTME: An ImageAsset is never mutated; every processing step produces a new one

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Raw image bytes together with their declared MIME type.
///
/// The buffer is reference counted so cloning an asset (for example to hand it
/// to a background preview) never copies the pixels.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageAsset {
    bytes: Arc<[u8]>,
    mime_type: String,
}

impl ImageAsset {
    pub fn new(bytes: impl Into<Arc<[u8]>>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// File extension matching the declared MIME type, used for the multipart file name
    pub fn extension(&self) -> &'static str {
        match self.mime_type.to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/png" => "png",
            "image/webp" => "webp",
            "image/gif" => "gif",
            "image/bmp" => "bmp",
            "image/tiff" => "tiff",
            "image/svg+xml" => "svg",
            "image/avif" => "avif",
            _ => "bin",
        }
    }
}

impl fmt::Debug for ImageAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageAsset")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Where and how an upload is stored on the remote host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub cloud_name: String,
    pub upload_preset: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
}

impl RemoteConfig {
    pub fn new(cloud_name: impl Into<String>, upload_preset: impl Into<String>) -> Self {
        Self {
            cloud_name: cloud_name.into(),
            upload_preset: upload_preset.into(),
            folder: None,
        }
    }

    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        let folder = folder.into();
        self.folder = (!folder.is_empty()).then_some(folder);
        self
    }

    /// Names of the required settings that are still empty
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.cloud_name.trim().is_empty() {
            missing.push("cloud_name");
        }
        if self.upload_preset.trim().is_empty() {
            missing.push("upload_preset");
        }
        missing
    }
}

/// A successfully stored image.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadedImage {
    pub secure_url: String,
}

/// Result of one upload attempt as seen by the editor integration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Success { url: String },
    Failure { reason: String },
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UploadOutcome::Success { .. })
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            UploadOutcome::Success { url } => Some(url),
            UploadOutcome::Failure { .. } => None,
        }
    }
}

impl<E: fmt::Display> From<Result<UploadedImage, E>> for UploadOutcome {
    fn from(result: Result<UploadedImage, E>) -> Self {
        match result {
            Ok(image) => UploadOutcome::Success {
                url: image.secure_url,
            },
            Err(err) => UploadOutcome::Failure {
                reason: err.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_accessors() {
        let asset = ImageAsset::new(vec![1u8, 2, 3], "image/png");
        assert_eq!(asset.len(), 3);
        assert!(!asset.is_empty());
        assert_eq!(asset.mime_type(), "image/png");
        assert_eq!(asset.bytes(), &[1, 2, 3]);
    }

    #[test]
    fn test_clone_shares_buffer() {
        let asset = ImageAsset::new(vec![0u8; 16], "image/jpeg");
        let copy = asset.clone();
        assert_eq!(asset.bytes().as_ptr(), copy.bytes().as_ptr());
        assert_eq!(asset, copy);
    }

    #[test]
    fn test_extension_mapping() {
        assert_eq!(ImageAsset::new(Vec::<u8>::new(), "image/JPEG").extension(), "jpg");
        assert_eq!(ImageAsset::new(Vec::<u8>::new(), "image/jpg").extension(), "jpg");
        assert_eq!(ImageAsset::new(Vec::<u8>::new(), "image/webp").extension(), "webp");
        assert_eq!(ImageAsset::new(Vec::<u8>::new(), "image/x-unknown").extension(), "bin");
    }

    #[test]
    fn test_debug_hides_bytes() {
        let asset = ImageAsset::new(vec![42u8; 4], "image/png");
        let debug = format!("{:?}", asset);
        assert!(debug.contains("len: 4"));
        assert!(!debug.contains("42"));
    }

    #[test]
    fn test_remote_config_missing_fields() {
        assert_eq!(
            RemoteConfig::default().missing_fields(),
            vec!["cloud_name", "upload_preset"]
        );
        assert_eq!(
            RemoteConfig::new("demo", "  ").missing_fields(),
            vec!["upload_preset"]
        );
        assert!(RemoteConfig::new("demo", "preset").missing_fields().is_empty());
    }

    #[test]
    fn test_empty_folder_is_none() {
        let config = RemoteConfig::new("demo", "preset").with_folder("");
        assert_eq!(config.folder, None);
        let config = RemoteConfig::new("demo", "preset").with_folder("notes");
        assert_eq!(config.folder.as_deref(), Some("notes"));
    }

    #[test]
    fn test_outcome_from_result() {
        let ok: Result<UploadedImage, String> = Ok(UploadedImage {
            secure_url: "https://x/y.png".to_string(),
        });
        let outcome = UploadOutcome::from(ok);
        assert!(outcome.is_success());
        assert_eq!(outcome.url(), Some("https://x/y.png"));

        let err: Result<UploadedImage, String> = Err("boom".to_string());
        assert_eq!(
            UploadOutcome::from(err),
            UploadOutcome::Failure {
                reason: "boom".to_string()
            }
        );
    }
}
