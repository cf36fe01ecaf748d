// ABOUTME: Centralized constants for the cloudpaste application
// ABOUTME: Contains processing factors, MIME sets, placeholder syntax, and UI strings

/// Image processing policy
pub mod processing {
    /// Linear scale applied to each axis when downsampling
    pub const DOWNSAMPLE_FACTOR: f64 = 0.25;

    /// Encode quality per compression level, in `0.0..=1.0`
    pub const QUALITY_NONE: f32 = 1.0;
    pub const QUALITY_LOW: f32 = 0.8;
    pub const QUALITY_MEDIUM: f32 = 0.6;
    pub const QUALITY_HIGH: f32 = 0.4;
}

/// MIME type sets used when choosing the output encoding
pub mod mime {
    /// Formats whose size responds to an encode quality factor
    pub const LOSSY: &[&str] = &["image/jpeg", "image/jpg", "image/webp"];

    /// Target for lossless inputs when compression is requested
    pub const LOSSY_FALLBACK: &str = "image/webp";

    /// Prefix a paste payload must carry to be handled
    pub const IMAGE_PREFIX: &str = "image/";
}

/// Placeholder markdown written while an upload is pending
pub mod placeholder {
    pub const ALT_TEXT: &str = "uploading...";

    /// Base-36 alphabet for tokens and generated names
    pub const TOKEN_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    /// 36^12 possible tokens
    pub const TOKEN_LENGTH: usize = 12;

    /// Random suffix appended to note names for default upload names
    pub const NAME_SUFFIX_LENGTH: usize = 6;
}

/// UI and messaging constants
pub mod ui {
    pub const PREVIEW_CALCULATING: &str = "Calculating preview size...";
    pub const PREVIEW_FAILED: &str = "Failed to calculate preview size";
    pub const PREVIEW_FAILED_NOTICE: &str = "Failed to generate size preview";

    /// Progress bar tick interval for smooth animation
    pub const PROGRESS_BAR_TICK_MS: u64 = 80;
}
