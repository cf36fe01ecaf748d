// ABOUTME: Client-side image processing: options, scaling, transcoding and size reporting
// ABOUTME: Pure services taking plain data in and out, independent of any editor host

use cloudpaste_sdk::ImageAsset;

/// Turns an input asset into the asset that will be uploaded.
///
/// Implementations must be deterministic in output dimensions and MIME type for
/// a fixed asset and options; live previews rely on that.
pub trait Transcode: Send + Sync {
    fn transcode(
        &self,
        asset: &ImageAsset,
        options: ProcessingOptions,
    ) -> Result<ImageAsset, ImageError>;
}

pub mod error;
pub mod options;
pub mod scaling;
pub mod size;
pub mod transcoder;

pub use error::ImageError;
pub use options::{CompressionLevel, ProcessingOptions, UploadOptions};
pub use scaling::{ImageScaler, ScalingConfig};
pub use size::{format_size, reduction_percent};
pub use transcoder::{is_lossy, output_settings, OutputSettings, Transcoder};
