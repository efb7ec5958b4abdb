use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbaImage};
use picsmaller_core::{CompressOptions, ImageData, Origin};
use picsmaller_engine::{probe_origin, ImageTransformer, TransformFailure, Transformer};
use pretty_assertions::assert_eq;

fn encoded(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let pixels = RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x * 7 % 256) as u8, (y * 13 % 256) as u8, 90, 255])
    });
    let image = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(pixels).to_rgb8()),
        _ => DynamicImage::ImageRgba8(pixels),
    };
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, format).unwrap();
    out.into_inner()
}

#[test]
fn probe_reads_dimensions() {
    let origin = probe_origin("a.png", encoded(12, 7, ImageFormat::Png)).unwrap();
    assert_eq!(origin.name, "a.png");
    assert_eq!((origin.image.width, origin.image.height), (12, 7));
}

#[test]
fn probe_rejects_non_images() {
    let err = probe_origin("notes.txt", b"just some text".to_vec()).unwrap_err();
    assert_eq!(err.kind, TransformFailure::UnsupportedFormat);
}

#[tokio::test]
async fn png_is_reencoded_and_downscaled() {
    let origin = probe_origin("wide.png", encoded(64, 32, ImageFormat::Png)).unwrap();
    let options = CompressOptions {
        max_width: Some(16),
        ..Default::default()
    };

    let output = ImageTransformer.compress(&origin, &options).await.unwrap();
    assert_eq!((output.width, output.height), (16, 8));
    assert_eq!(
        image::guess_format(&output.bytes).unwrap(),
        ImageFormat::Png
    );
}

#[tokio::test]
async fn jpeg_quality_controls_size() {
    let origin = probe_origin("photo.jpg", encoded(96, 96, ImageFormat::Jpeg)).unwrap();
    let low = CompressOptions {
        quality: 10,
        ..Default::default()
    };
    let high = CompressOptions {
        quality: 95,
        ..Default::default()
    };

    let small = ImageTransformer.compress(&origin, &low).await.unwrap();
    let large = ImageTransformer.compress(&origin, &high).await.unwrap();
    assert_eq!((small.width, small.height), (96, 96));
    assert!(small.size() < large.size());
    assert_eq!(image::guess_format(&small.bytes).unwrap(), ImageFormat::Jpeg);
}

#[tokio::test]
async fn corrupt_input_fails_without_touching_origin() {
    let mut bytes = encoded(8, 8, ImageFormat::Png);
    bytes.truncate(40);
    let origin = Origin::new("broken.png", ImageData::new(bytes.clone(), 8, 8));

    let err = ImageTransformer
        .compress(&origin, &CompressOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind, TransformFailure::Decode);
    assert_eq!(origin.image.bytes.as_ref(), bytes.as_slice());
}

#[tokio::test]
async fn invalid_options_are_reported() {
    let origin = probe_origin("a.png", encoded(4, 4, ImageFormat::Png)).unwrap();
    let options = CompressOptions {
        quality: 0,
        ..Default::default()
    };

    let err = ImageTransformer.compress(&origin, &options).await.unwrap_err();
    assert_eq!(err.kind, TransformFailure::InvalidOptions);
}
