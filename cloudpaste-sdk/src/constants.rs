// ABOUTME: Centralized constants for the upload SDK
// ABOUTME: Contains endpoint URLs, timeouts, and multipart field names of the wire contract

/// HTTP and request timeouts
pub mod timeouts {
    use std::time::Duration;

    /// Default timeout for the upload request
    pub const HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
}

/// Cloudinary API URLs
pub mod urls {
    /// Base URL for the Cloudinary upload API
    pub const CLOUDINARY_API_BASE: &str = "https://api.cloudinary.com";

    /// API version segment of the upload path
    pub const API_VERSION: &str = "v1_1";

    /// Resource type segment; `auto` lets the host detect the media type
    pub const RESOURCE_TYPE: &str = "auto";
}

/// Multipart form fields
pub mod fields {
    pub const FILE: &str = "file";
    pub const UPLOAD_PRESET: &str = "upload_preset";
    pub const FOLDER: &str = "folder";
    pub const PUBLIC_ID: &str = "public_id";
}

pub const USER_AGENT: &str = concat!("cloudpaste/", env!("CARGO_PKG_VERSION"));

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_timeout_constants() {
        assert_eq!(timeouts::HTTP_REQUEST_TIMEOUT, Duration::from_secs(30));
    }

    #[test]
    fn test_url_constants() {
        assert!(urls::CLOUDINARY_API_BASE.starts_with("https://"));
        assert_eq!(urls::API_VERSION, "v1_1");
        assert_eq!(urls::RESOURCE_TYPE, "auto");
    }

    #[test]
    fn test_wire_fields() {
        assert_eq!(fields::FILE, "file");
        assert_eq!(fields::UPLOAD_PRESET, "upload_preset");
        assert_eq!(fields::FOLDER, "folder");
        assert_eq!(fields::PUBLIC_ID, "public_id");
    }

    #[test]
    fn test_user_agent() {
        assert!(USER_AGENT.starts_with("cloudpaste/"));
    }
}
