//! Transform pipeline: decode, resize, recolor, encode

use anyhow::{ensure, Result};
use image::GenericImageView;
use tracing::debug;

use crate::service::{is_valid_dimension, TargetSettings, MAX_DIMENSION};

use super::color::apply_color_mode;
use super::encode::{encode, encoded_dimensions};
use super::preprocess::{decode_image, resize_fill, resize_fit};

/// Encoded output of one transform
#[derive(Debug, Clone)]
pub struct TransformedImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Run the full pipeline over an uploaded buffer.
///
/// CPU-bound; call from `spawn_blocking` in async code.
pub fn transform(data: &[u8], target: &TargetSettings) -> Result<TransformedImage> {
    ensure!(
        is_valid_dimension(target.width) && is_valid_dimension(target.height),
        "Target {}x{} is outside 1..={} pixels per side",
        target.width,
        target.height,
        MAX_DIMENSION
    );

    let image = decode_image(data)?;
    let (orig_w, orig_h) = image.dimensions();
    debug!(
        "Decoded {}x{} image ({:?}, {} bytes)",
        orig_w,
        orig_h,
        image.color(),
        data.len()
    );

    let resized = if target.maintain_aspect_ratio {
        resize_fit(&image, target.width, target.height, target.allow_enlargement)
    } else {
        resize_fill(&image, target.width, target.height)
    };

    let recolored = apply_color_mode(resized, target.color_mode);
    let encoded = encode(&recolored, target.format, target.quality)?;
    let (width, height) = encoded_dimensions(&encoded)?;

    debug!(
        "Encoded {} {}x{} at quality {} ({} bytes)",
        target.format.as_str(),
        width,
        height,
        target.quality,
        encoded.len()
    );

    Ok(TransformedImage {
        data: encoded,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{ColorMode, ImageSettings, OutputFormat};
    use image::{DynamicImage, Rgb, RgbImage};
    use std::io::Cursor;

    fn png_fixture(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        }));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png).unwrap();
        buf
    }

    fn target(width: u32, height: u32) -> TargetSettings {
        ImageSettings {
            width: Some(width),
            height: Some(height),
            ..ImageSettings::default()
        }
        .resolve()
    }

    #[test]
    fn test_fill_produces_exact_size() {
        let data = png_fixture(640, 480);
        for (w, h) in [(100, 100), (300, 50), (50, 300), (1000, 900)] {
            let out = transform(&data, &target(w, h)).unwrap();
            assert_eq!((out.width, out.height), (w, h));
        }
    }

    #[test]
    fn test_fit_stays_within_bounds_and_keeps_ratio() {
        let data = png_fixture(640, 480);
        let mut settings = target(200, 200);
        settings.maintain_aspect_ratio = true;

        let out = transform(&data, &settings).unwrap();
        assert!(out.width <= 200 && out.height <= 200);
        assert_eq!((out.width, out.height), (200, 150));
    }

    #[test]
    fn test_fit_without_enlargement_keeps_original() {
        let data = png_fixture(64, 32);
        let mut settings = target(640, 640);
        settings.maintain_aspect_ratio = true;
        settings.allow_enlargement = false;

        let out = transform(&data, &settings).unwrap();
        assert_eq!((out.width, out.height), (64, 32));
    }

    #[test]
    fn test_grayscale_png_has_one_channel() {
        let data = png_fixture(40, 30);
        let mut settings = target(40, 30);
        settings.format = OutputFormat::Png;
        settings.color_mode = ColorMode::Grayscale;

        let out = transform(&data, &settings).unwrap();
        let decoded = image::load_from_memory(&out.data).unwrap();
        assert_eq!(decoded.color(), image::ColorType::L8);
    }

    #[test]
    fn test_output_matches_requested_format() {
        let data = png_fixture(20, 20);
        for (format, expected) in [
            (OutputFormat::Jpeg, image::ImageFormat::Jpeg),
            (OutputFormat::Png, image::ImageFormat::Png),
            (OutputFormat::Webp, image::ImageFormat::WebP),
        ] {
            let mut settings = target(10, 10);
            settings.format = format;
            let out = transform(&data, &settings).unwrap();
            assert_eq!(image::guess_format(&out.data).unwrap(), expected);
        }
    }

    #[test]
    fn test_oversized_target_rejected_before_resize() {
        let data = png_fixture(4, 4);
        let err = transform(&data, &target(200_000, 200_000)).unwrap_err();
        assert!(err.to_string().contains("200000x200000"));
    }

    #[test]
    fn test_corrupt_input_fails() {
        let mut data = png_fixture(20, 20);
        data.truncate(30);
        assert!(transform(&data, &target(10, 10)).is_err());
    }
}
