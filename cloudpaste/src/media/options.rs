// ABOUTME: Value types describing how an image is processed before upload
// ABOUTME: Compression tiers map to fixed encode quality factors

use crate::constants::processing;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl CompressionLevel {
    pub const ALL: [CompressionLevel; 4] = [
        CompressionLevel::None,
        CompressionLevel::Low,
        CompressionLevel::Medium,
        CompressionLevel::High,
    ];

    pub fn quality(self) -> f32 {
        match self {
            CompressionLevel::None => processing::QUALITY_NONE,
            CompressionLevel::Low => processing::QUALITY_LOW,
            CompressionLevel::Medium => processing::QUALITY_MEDIUM,
            CompressionLevel::High => processing::QUALITY_HIGH,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CompressionLevel::None => "none",
            CompressionLevel::Low => "low",
            CompressionLevel::Medium => "medium",
            CompressionLevel::High => "high",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CompressionLevel::None => "No compression",
            CompressionLevel::Low => "Low compression",
            CompressionLevel::Medium => "Medium compression",
            CompressionLevel::High => "High compression",
        }
    }
}

impl fmt::Display for CompressionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompressionLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "off" => Ok(CompressionLevel::None),
            "low" => Ok(CompressionLevel::Low),
            "medium" | "med" => Ok(CompressionLevel::Medium),
            "high" => Ok(CompressionLevel::High),
            other => Err(format!(
                "Invalid compression level '{}'. Must be one of: none, low, medium, high",
                other
            )),
        }
    }
}

/// Everything that determines a transcode for a fixed input asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ProcessingOptions {
    pub downsample: bool,
    pub compression: CompressionLevel,
}

impl ProcessingOptions {
    pub fn new(downsample: bool, compression: CompressionLevel) -> Self {
        Self {
            downsample,
            compression,
        }
    }

    /// True when the options leave the image untouched
    pub fn is_identity(&self) -> bool {
        !self.downsample && self.compression == CompressionLevel::None
    }
}

/// Options confirmed by the user for one paste.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    /// Desired public id; empty means the host picks one
    pub file_name: String,
    pub processing: ProcessingOptions,
}

impl UploadOptions {
    /// Starting point offered to the user: downsampled, not recompressed
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            processing: ProcessingOptions::new(true, CompressionLevel::None),
        }
    }

    pub fn desired_name(&self) -> Option<&str> {
        let name = self.file_name.trim();
        (!name.is_empty()).then_some(name)
    }
}
