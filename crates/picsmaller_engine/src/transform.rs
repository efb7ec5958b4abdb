use std::fmt;
use std::io::Cursor;

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use picsmaller_core::{CompressOptions, ImageData, Origin};
use picsmaller_logging::pipeline_trace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformFailure {
    UnsupportedFormat,
    Decode,
    Encode,
    InvalidOptions,
    /// The worker running the transform went away before reporting.
    Interrupted,
}

impl fmt::Display for TransformFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformFailure::UnsupportedFormat => write!(f, "unsupported format"),
            TransformFailure::Decode => write!(f, "decode failed"),
            TransformFailure::Encode => write!(f, "encode failed"),
            TransformFailure::InvalidOptions => write!(f, "invalid options"),
            TransformFailure::Interrupted => write!(f, "interrupted"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct TransformError {
    pub kind: TransformFailure,
    pub message: String,
}

impl TransformError {
    pub fn new(kind: TransformFailure, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// The compression step. Implementations must never mutate the origin and
/// must report either a complete output or an error.
#[async_trait::async_trait]
pub trait Transformer: Send + Sync {
    async fn compress(
        &self,
        origin: &Origin,
        options: &CompressOptions,
    ) -> Result<ImageData, TransformError>;
}

/// Re-encodes images with the `image` crate on the blocking pool.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageTransformer;

#[async_trait::async_trait]
impl Transformer for ImageTransformer {
    async fn compress(
        &self,
        origin: &Origin,
        options: &CompressOptions,
    ) -> Result<ImageData, TransformError> {
        options
            .validate()
            .map_err(|err| TransformError::new(TransformFailure::InvalidOptions, err.to_string()))?;
        let bytes = origin.image.bytes.clone();
        let options = *options;
        tokio::task::spawn_blocking(move || reencode(&bytes, &options))
            .await
            .map_err(|err| TransformError::new(TransformFailure::Interrupted, err.to_string()))?
    }
}

/// Decodes `bytes`, downscales to fit `options`, and encodes again in the
/// source format.
pub fn reencode(bytes: &[u8], options: &CompressOptions) -> Result<ImageData, TransformError> {
    let format = image::guess_format(bytes)
        .map_err(|err| TransformError::new(TransformFailure::UnsupportedFormat, err.to_string()))?;
    let decoded = image::load_from_memory_with_format(bytes, format)
        .map_err(|err| TransformError::new(TransformFailure::Decode, err.to_string()))?;

    let (width, height) = options.fit(decoded.width(), decoded.height());
    let resized = if (width, height) == (decoded.width(), decoded.height()) {
        decoded
    } else {
        pipeline_trace!(
            "Resizing {}x{} -> {}x{}",
            decoded.width(),
            decoded.height(),
            width,
            height
        );
        decoded.resize_exact(width, height, FilterType::Lanczos3)
    };

    let mut out = Vec::new();
    encode(&resized, format, options.quality, &mut out)
        .map_err(|err| TransformError::new(TransformFailure::Encode, err.to_string()))?;
    Ok(ImageData::new(out, resized.width(), resized.height()))
}

fn encode(
    image: &DynamicImage,
    format: ImageFormat,
    quality: u8,
    out: &mut Vec<u8>,
) -> image::ImageResult<()> {
    match format {
        ImageFormat::Jpeg => {
            // JPEG has no alpha channel.
            let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
            rgb.write_with_encoder(JpegEncoder::new_with_quality(out, quality))
        }
        ImageFormat::Png => image.write_with_encoder(PngEncoder::new_with_quality(
            out,
            png_compression(quality),
            PngFilter::Adaptive,
        )),
        other => image.write_to(&mut Cursor::new(out), other),
    }
}

/// PNG is lossless, so quality only trades encode time for size.
fn png_compression(quality: u8) -> CompressionType {
    match quality {
        0..=50 => CompressionType::Best,
        51..=85 => CompressionType::Default,
        _ => CompressionType::Fast,
    }
}

/// Reads the dimensions of a newly accepted file without decoding pixels.
pub fn probe_origin(name: impl Into<String>, bytes: impl Into<Bytes>) -> Result<Origin, TransformError> {
    let bytes = bytes.into();
    let reader = ImageReader::new(Cursor::new(&bytes[..]))
        .with_guessed_format()
        .map_err(|err| TransformError::new(TransformFailure::Decode, err.to_string()))?;
    if reader.format().is_none() {
        return Err(TransformError::new(
            TransformFailure::UnsupportedFormat,
            "unrecognised image signature",
        ));
    }
    let (width, height) = reader
        .into_dimensions()
        .map_err(|err| TransformError::new(TransformFailure::Decode, err.to_string()))?;
    Ok(Origin::new(name, ImageData::new(bytes, width, height)))
}
