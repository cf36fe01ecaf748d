// ABOUTME: Test helper utilities for mocking Cloudinary upload responses and server
// ABOUTME: Provides mockito-based helpers for unit testing the upload client

use crate::ImageAsset;
use mockito::{Server, ServerGuard};
use serde_json::json;

pub async fn mock_upload_server() -> ServerGuard {
    Server::new_async().await
}

/// Small ASCII payload so multipart bodies stay regex-matchable
pub fn sample_asset() -> ImageAsset {
    ImageAsset::new(b"fake-png-bytes".to_vec(), "image/png")
}

pub fn mock_success_response(secure_url: &str) -> serde_json::Value {
    json!({
        "asset_id": "3515c6000a548515f1134043f9785c2f",
        "public_id": "notes/my-note-abc123",
        "version": 1719304891,
        "format": "png",
        "resource_type": "image",
        "bytes": 14,
        "url": secure_url.replacen("https://", "http://", 1),
        "secure_url": secure_url
    })
}

pub fn mock_error_response(message: &str) -> serde_json::Value {
    json!({
        "error": {
            "message": message
        }
    })
}

pub fn mock_response_without_url() -> serde_json::Value {
    json!({
        "public_id": "notes/orphan",
        "resource_type": "image"
    })
}
