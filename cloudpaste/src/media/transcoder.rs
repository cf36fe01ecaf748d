// ABOUTME: Image transcoding pipeline run before upload and for size previews
// ABOUTME: Decodes, optionally downsamples, and re-encodes under the chosen quality policy

use super::{ImageError, ImageScaler, ProcessingOptions, Transcode};
use crate::constants::mime;
use crate::media::CompressionLevel;
use cloudpaste_sdk::ImageAsset;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat};
use std::io::Cursor;

/// Encoding chosen for a transcode: target MIME type and, for lossy targets, quality.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSettings {
    pub mime_type: String,
    pub quality: Option<f32>,
}

/// Whether a declared MIME type belongs to the lossy set (case-insensitive)
pub fn is_lossy(mime_type: &str) -> bool {
    let normalized = mime_type.trim().to_ascii_lowercase();
    mime::LOSSY.contains(&normalized.as_str())
}

/// Pick the output type and quality for an input type and compression level.
///
/// Lossy inputs keep their type and always get the level's quality. Other
/// inputs are converted to WebP when compression is requested and otherwise
/// keep their type with no quality.
pub fn output_settings(input_mime: &str, level: CompressionLevel) -> OutputSettings {
    if is_lossy(input_mime) {
        OutputSettings {
            mime_type: input_mime.to_string(),
            quality: Some(level.quality()),
        }
    } else if level != CompressionLevel::None {
        OutputSettings {
            mime_type: mime::LOSSY_FALLBACK.to_string(),
            quality: Some(level.quality()),
        }
    } else {
        OutputSettings {
            mime_type: input_mime.to_string(),
            quality: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Transcoder {
    scaler: ImageScaler,
}

impl Transcoder {
    pub fn new() -> Self {
        Self::default()
    }

    fn decode(&self, asset: &ImageAsset) -> Result<DynamicImage, ImageError> {
        image::load_from_memory(asset.bytes()).map_err(|e| ImageError::Decode(e.to_string()))
    }

    fn encode(&self, img: &DynamicImage, settings: &OutputSettings) -> Result<Vec<u8>, ImageError> {
        let quality = settings.quality.unwrap_or(1.0);
        let target = settings.mime_type.trim().to_ascii_lowercase();

        let buffer = match target.as_str() {
            "image/jpeg" | "image/jpg" => encode_jpeg(img, quality)?,
            "image/webp" => encode_webp(img, quality)?,
            other => encode_with_format(img, other)?,
        };

        if buffer.is_empty() {
            return Err(ImageError::encode(&settings.mime_type, "encoder produced no output"));
        }

        log::debug!(
            "Encoded {}x{} image as {} (quality {:?}, {} bytes)",
            img.width(),
            img.height(),
            settings.mime_type,
            settings.quality,
            buffer.len()
        );

        Ok(buffer)
    }
}

impl Transcode for Transcoder {
    fn transcode(
        &self,
        asset: &ImageAsset,
        options: ProcessingOptions,
    ) -> Result<ImageAsset, ImageError> {
        if options.is_identity() {
            return Ok(asset.clone());
        }

        let img = self.decode(asset)?;
        let scaled = self.scaler.scale(img, options.downsample);
        let settings = output_settings(asset.mime_type(), options.compression);
        let bytes = self.encode(&scaled, &settings)?;

        Ok(ImageAsset::new(bytes, settings.mime_type))
    }
}

fn quality_percent(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

fn encode_jpeg(img: &DynamicImage, quality: f32) -> Result<Vec<u8>, ImageError> {
    let rgb = img.to_rgb8();
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality_percent(quality))
        .write_image(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| ImageError::encode("image/jpeg", e.to_string()))?;
    Ok(buffer)
}

fn encode_webp(img: &DynamicImage, quality: f32) -> Result<Vec<u8>, ImageError> {
    let rgba = img.to_rgba8();
    let encoder = webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height());
    let memory = encoder
        .encode_simple(false, f32::from(quality_percent(quality)))
        .map_err(|e| ImageError::encode("image/webp", format!("{:?}", e)))?;
    Ok(memory.to_vec())
}

fn encode_with_format(img: &DynamicImage, mime_type: &str) -> Result<Vec<u8>, ImageError> {
    let format = ImageFormat::from_mime_type(mime_type)
        .ok_or_else(|| ImageError::encode(mime_type, "unsupported output type"))?;

    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), format)
        .map_err(|e| ImageError::encode(mime_type, e.to_string()))?;
    Ok(buffer)
}
