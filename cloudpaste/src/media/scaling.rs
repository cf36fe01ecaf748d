// ABOUTME: Fixed-factor downsampling of decoded images
// ABOUTME: Each axis is scaled and rounded independently, then resampled with a smooth filter

use crate::constants::processing::DOWNSAMPLE_FACTOR;
use image::{imageops::FilterType, DynamicImage};

#[derive(Debug, Clone)]
pub struct ScalingConfig {
    pub factor: f64,
    pub filter: FilterType,
}

impl Default for ScalingConfig {
    fn default() -> Self {
        Self {
            factor: DOWNSAMPLE_FACTOR,
            filter: FilterType::Lanczos3, // High quality scaling
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ImageScaler {
    config: ScalingConfig,
}

impl ImageScaler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ScalingConfig) -> Self {
        Self { config }
    }

    /// Dimensions after scaling; `round(side * factor)` per axis, never below one pixel
    pub fn target_dimensions(&self, width: u32, height: u32, downsample: bool) -> (u32, u32) {
        if !downsample {
            return (width, height);
        }
        (
            scale_axis(width, self.config.factor),
            scale_axis(height, self.config.factor),
        )
    }

    /// Resample to the target size, returning the input untouched when nothing changes
    pub fn scale(&self, img: DynamicImage, downsample: bool) -> DynamicImage {
        let (width, height) = (img.width(), img.height());
        let (target_width, target_height) = self.target_dimensions(width, height, downsample);

        if (target_width, target_height) == (width, height) {
            log::debug!("Image scaling skipped - already {}x{}", width, height);
            return img;
        }

        log::debug!(
            "Scaling image from {}x{} to {}x{} ({:?})",
            width,
            height,
            target_width,
            target_height,
            self.config.filter
        );
        img.resize_exact(target_width, target_height, self.config.filter)
    }
}

fn scale_axis(side: u32, factor: f64) -> u32 {
    ((side as f64 * factor).round() as u32).max(1)
}
