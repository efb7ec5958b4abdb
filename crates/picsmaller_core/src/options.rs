use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_QUALITY: u8 = 75;

/// Configuration handed to the transformer with every submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressOptions {
    /// Encoder quality, 1..=100. Lossless formats map it to effort.
    pub quality: u8,
    /// Downscale so the output is at most this wide. Never upscales.
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            max_width: None,
            max_height: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionsError {
    #[error("quality must be within 1..=100, got {0}")]
    Quality(u8),
    #[error("resize limits must be non-zero")]
    ZeroDimension,
}

impl CompressOptions {
    pub fn validate(&self) -> Result<(), OptionsError> {
        if !(1..=100).contains(&self.quality) {
            return Err(OptionsError::Quality(self.quality));
        }
        if self.max_width == Some(0) || self.max_height == Some(0) {
            return Err(OptionsError::ZeroDimension);
        }
        Ok(())
    }

    /// Target size for an image of `width`x`height`: fits inside the
    /// limits and keeps the aspect ratio.
    pub fn fit(&self, width: u32, height: u32) -> (u32, u32) {
        let max_w = self.max_width.unwrap_or(u32::MAX);
        let max_h = self.max_height.unwrap_or(u32::MAX);
        if width <= max_w && height <= max_h {
            return (width, height);
        }
        let scale = f64::min(
            f64::from(max_w) / f64::from(width),
            f64::from(max_h) / f64::from(height),
        );
        let w = (f64::from(width) * scale).round().max(1.0) as u32;
        let h = (f64::from(height) * scale).round().max(1.0) as u32;
        (w.min(max_w), h.min(max_h))
    }
}
