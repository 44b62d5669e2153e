//! Decoding and geometry for the transform pipeline

use image::{imageops::FilterType, DynamicImage, GenericImageView};
use anyhow::{Context, Result};

/// Resampling filter used for every resize
pub const RESIZE_FILTER: FilterType = FilterType::Lanczos3;

/// Decode image from bytes with EXIF orientation handling
/// Phones often store a rotation tag instead of rotating pixels
pub fn decode_image(data: &[u8]) -> Result<DynamicImage> {
    let image = image::load_from_memory(data).context("Unsupported or corrupt image data")?;

    let oriented_image = apply_exif_orientation(data, image);

    Ok(oriented_image)
}

/// Read the EXIF orientation tag, defaulting to 1 (normal)
pub fn exif_orientation(data: &[u8]) -> u8 {
    use std::io::Cursor;

    match exif::Reader::new().read_from_container(&mut Cursor::new(data)) {
        Ok(exif_data) => exif_data
            .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .unwrap_or(1) as u8,
        Err(_) => 1,
    }
}

/// Apply EXIF orientation to correct image rotation
fn apply_exif_orientation(data: &[u8], image: DynamicImage) -> DynamicImage {
    // See: https://exiftool.org/TagNames/EXIF.html (Orientation)
    match exif_orientation(data) {
        2 => image.fliph(),
        3 => image.rotate180(),
        4 => image.flipv(),
        5 => image.rotate90().fliph(),
        6 => image.rotate90(),
        7 => image.rotate270().fliph(),
        8 => image.rotate270(),
        _ => image,
    }
}

/// Size of the image fitted inside a `box_w` x `box_h` box, aspect ratio kept.
///
/// With `allow_enlargement` false the image is never scaled above its
/// original size. Both sides are at least 1 pixel.
pub fn fit_dimensions(
    original: (u32, u32),
    bounds: (u32, u32),
    allow_enlargement: bool,
) -> (u32, u32) {
    let (orig_w, orig_h) = original;
    let (box_w, box_h) = bounds;

    if orig_w == 0 || orig_h == 0 {
        return (box_w.max(1), box_h.max(1));
    }

    let mut scale = f64::min(
        box_w as f64 / orig_w as f64,
        box_h as f64 / orig_h as f64,
    );
    if !allow_enlargement {
        scale = scale.min(1.0);
    }

    let new_w = ((orig_w as f64 * scale).round() as u32).clamp(1, box_w.max(1));
    let new_h = ((orig_h as f64 * scale).round() as u32).clamp(1, box_h.max(1));

    (new_w, new_h)
}

/// Scale to fit inside the box, keeping aspect ratio
pub fn resize_fit(image: &DynamicImage, width: u32, height: u32, allow_enlargement: bool) -> DynamicImage {
    let (new_w, new_h) = fit_dimensions(image.dimensions(), (width, height), allow_enlargement);

    if (new_w, new_h) == image.dimensions() {
        return image.clone();
    }

    image.resize_exact(new_w, new_h, RESIZE_FILTER)
}

/// Cover the box and center-crop to exactly `width` x `height`
pub fn resize_fill(image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    let (width, height) = (width.max(1), height.max(1));

    if image.dimensions() == (width, height) {
        return image.clone();
    }

    image.resize_to_fill(width, height, RESIZE_FILTER)
}
