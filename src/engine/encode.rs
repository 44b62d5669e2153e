//! Output encoding and data URLs

use std::io::Cursor;

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ImageReader};

use crate::service::OutputFormat;

/// Encode an image in the requested format.
///
/// JPEG honours `quality` directly and drops alpha. PNG maps quality onto
/// zlib effort. WebP is always lossless.
pub fn encode(image: &DynamicImage, format: OutputFormat, quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());

    match format {
        OutputFormat::Jpeg => {
            let flattened = flatten_for_jpeg(image);
            let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
            flattened
                .write_with_encoder(encoder)
                .context("Failed to encode JPEG")?;
        }
        OutputFormat::Png => {
            let encoder =
                PngEncoder::new_with_quality(&mut buffer, png_compression(quality), PngFilter::Adaptive);
            image.write_with_encoder(encoder).context("Failed to encode PNG")?;
        }
        OutputFormat::Webp => {
            let encoder = WebPEncoder::new_lossless(&mut buffer);
            to_webp_layout(image)
                .write_with_encoder(encoder)
                .context("Failed to encode WebP")?;
        }
    }

    Ok(buffer.into_inner())
}

/// Higher quality trades file size for encode speed
fn png_compression(quality: u8) -> CompressionType {
    match quality {
        90.. => CompressionType::Fast,
        50..=89 => CompressionType::Default,
        _ => CompressionType::Best,
    }
}

fn flatten_for_jpeg(image: &DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => image.clone(),
        DynamicImage::ImageLumaA8(_) | DynamicImage::ImageLuma16(_) | DynamicImage::ImageLumaA16(_) => {
            DynamicImage::ImageLuma8(image.to_luma8())
        }
        _ => DynamicImage::ImageRgb8(image.to_rgb8()),
    }
}

/// The WebP encoder takes 8-bit layouts only
fn to_webp_layout(image: &DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageLuma8(_)
        | DynamicImage::ImageLumaA8(_)
        | DynamicImage::ImageRgb8(_)
        | DynamicImage::ImageRgba8(_) => image.clone(),
        DynamicImage::ImageLuma16(_) => DynamicImage::ImageLuma8(image.to_luma8()),
        DynamicImage::ImageLumaA16(_) => DynamicImage::ImageLumaA8(image.to_luma_alpha8()),
        _ if image.color().has_alpha() => DynamicImage::ImageRgba8(image.to_rgba8()),
        _ => DynamicImage::ImageRgb8(image.to_rgb8()),
    }
}

/// Pixel size of already-encoded bytes
pub fn encoded_dimensions(data: &[u8]) -> Result<(u32, u32)> {
    let dims = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .context("Failed to sniff encoded image")?
        .into_dimensions()
        .context("Failed to read encoded image dimensions")?;
    Ok(dims)
}

/// Wrap encoded bytes in a `data:` URL
pub fn to_data_url(data: &[u8], format: OutputFormat) -> String {
    format!("data:{};base64,{}", format.mime_type(), STANDARD.encode(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgba, RgbaImage};

    fn translucent() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(6, 4, Rgba([30, 60, 90, 128])))
    }

    #[test]
    fn test_jpeg_drops_alpha() {
        let bytes = encode(&translucent(), OutputFormat::Jpeg, 80).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (6, 4));
        assert!(!decoded.color().has_alpha());
    }

    #[test]
    fn test_each_format_round_trips_dimensions() {
        for format in [OutputFormat::Jpeg, OutputFormat::Png, OutputFormat::Webp] {
            let bytes = encode(&translucent(), format, 75).unwrap();
            assert_eq!(encoded_dimensions(&bytes).unwrap(), (6, 4), "{:?}", format);
        }
    }

    #[test]
    fn test_lower_jpeg_quality_is_smaller() {
        let noisy = DynamicImage::ImageRgba8(RgbaImage::from_fn(64, 64, |x, y| {
            Rgba([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x ^ y) * 5 % 256) as u8, 255])
        }));
        let high = encode(&noisy, OutputFormat::Jpeg, 95).unwrap();
        let low = encode(&noisy, OutputFormat::Jpeg, 10).unwrap();
        assert!(low.len() < high.len());
    }

    #[test]
    fn test_data_url_prefix() {
        let url = to_data_url(&[1, 2, 3], OutputFormat::Png);
        assert_eq!(url, "data:image/png;base64,AQID");
        assert!(to_data_url(&[], OutputFormat::Webp).starts_with("data:image/webp;base64,"));
        assert!(to_data_url(&[], OutputFormat::Jpeg).starts_with("data:image/jpeg;base64,"));
    }
}
